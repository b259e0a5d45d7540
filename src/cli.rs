use clap::Parser;
use std::path::{Path, PathBuf};

use crate::config::AppConfig;
use crate::error::Result;
use crate::render::OutputFormat;

/// Render one mean-MSE heatmap per dataset from a headerless results CSV.
///
/// With no arguments, reads `combined.csv` and writes `heatmap_<id>.pdf`
/// into the working directory.
#[derive(Parser, Debug, Clone, Default)]
#[command(author, version, about)]
pub struct Args {
    /// Path to config TOML
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Results CSV (overrides config)
    #[arg(long)]
    pub input: Option<String>,

    /// Output directory (overrides config)
    #[arg(long)]
    pub outdir: Option<String>,

    /// Output file format (overrides config)
    #[arg(long, value_enum)]
    pub format: Option<OutputFormat>,

    /// Render resolution (overrides config)
    #[arg(long)]
    pub dpi: Option<u32>,

    /// Also write each pivot grid as CSV
    #[arg(long, default_value_t = false)]
    pub summary_csv: bool,

    /// Write a commented default config to PATH and exit
    #[arg(long, value_name = "PATH")]
    pub init_config: Option<PathBuf>,
}

impl Args {
    /// Config file (or defaults) with flags applied, validated as a whole.
    pub fn resolve(&self) -> Result<AppConfig> {
        let mut cfg = match &self.config {
            Some(path) => AppConfig::load(path)?,
            None => AppConfig::default(),
        };
        self.apply(&mut cfg);
        let origin = self
            .config
            .as_deref()
            .unwrap_or(Path::new("<command line>"));
        cfg.validate(origin)?;
        Ok(cfg)
    }

    /// Fold command-line overrides into `cfg`.
    pub fn apply(&self, cfg: &mut AppConfig) {
        if let Some(input) = &self.input {
            cfg.input.path = input.clone();
        }
        if let Some(dir) = &self.outdir {
            cfg.output.dir = dir.clone();
        }
        if let Some(format) = self.format {
            cfg.output.format = format;
        }
        if let Some(dpi) = self.dpi {
            cfg.plot.dpi = dpi;
        }
        if self.summary_csv {
            cfg.output.summary_csv = true;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::HeatmapError;

    #[test]
    fn no_arguments_keeps_defaults() {
        let args = Args::try_parse_from(["mse-heatmap"]).unwrap();
        let mut cfg = AppConfig::default();
        args.apply(&mut cfg);
        assert_eq!(cfg, AppConfig::default());
        assert!(args.config.is_none());
        assert!(args.init_config.is_none());
    }

    #[test]
    fn flags_override_config() {
        let args = Args::try_parse_from([
            "mse-heatmap",
            "--input",
            "combined5.csv",
            "--outdir",
            "plots",
            "--format",
            "svg",
            "--dpi",
            "96",
            "--summary-csv",
        ])
        .unwrap();
        let mut cfg = AppConfig::default();
        args.apply(&mut cfg);
        assert_eq!(cfg.input.path, "combined5.csv");
        assert_eq!(cfg.output.dir, "plots");
        assert_eq!(cfg.output.format, OutputFormat::Svg);
        assert_eq!(cfg.plot.dpi, 96);
        assert!(cfg.output.summary_csv);
    }

    #[test]
    fn out_of_range_dpi_flag_is_rejected() {
        for dpi in ["0", "100000"] {
            let args = Args::try_parse_from(["mse-heatmap", "--dpi", dpi]).unwrap();
            assert!(
                matches!(args.resolve(), Err(HeatmapError::Config { .. })),
                "--dpi {dpi} accepted"
            );
        }
        let args = Args::try_parse_from(["mse-heatmap", "--dpi", "300"]).unwrap();
        assert_eq!(args.resolve().unwrap().plot.dpi, 300);
    }

    #[test]
    fn unknown_format_is_rejected() {
        assert!(Args::try_parse_from(["mse-heatmap", "--format", "gif"]).is_err());
    }
}
