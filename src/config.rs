use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::error::{HeatmapError, Result};
use crate::render::OutputFormat;
use crate::render::colormap::Colormap;

pub const MIN_DPI: u32 = 1;
pub const MAX_DPI: u32 = 1200;
const MAX_FIGURE_IN: f64 = 100.0;
// 64 MP; a bitmap canvas is allocated up front.
const MAX_PIXELS: f64 = 64.0e6;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InputConfig {
    #[serde(default = "InputConfig::default_path")]
    pub path: String,
    #[serde(default = "InputConfig::default_delimiter")]
    pub delimiter: char,
}

impl InputConfig {
    fn default_path() -> String {
        "combined.csv".to_string()
    }
    fn default_delimiter() -> char {
        ','
    }

    /// Delimiter as the single byte the CSV reader expects.
    pub fn delimiter_byte(&self) -> Result<u8> {
        u8::try_from(self.delimiter)
            .ok()
            .filter(u8::is_ascii)
            .ok_or_else(|| HeatmapError::Config {
                path: self.path.clone().into(),
                message: format!("delimiter {:?} is not a single ASCII byte", self.delimiter),
            })
    }
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            path: Self::default_path(),
            delimiter: Self::default_delimiter(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OutputConfig {
    #[serde(default = "OutputConfig::default_dir")]
    pub dir: String,
    #[serde(default = "OutputConfig::default_file_prefix")]
    pub file_prefix: String,
    #[serde(default)]
    pub format: OutputFormat,
    /// Also write each pivot grid as `<prefix><id>.csv`.
    #[serde(default)]
    pub summary_csv: bool,
}

impl OutputConfig {
    fn default_dir() -> String {
        ".".to_string()
    }
    fn default_file_prefix() -> String {
        "heatmap_".to_string()
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: Self::default_dir(),
            file_prefix: Self::default_file_prefix(),
            format: OutputFormat::default(),
            summary_csv: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlotConfig {
    #[serde(default = "PlotConfig::default_width_in")]
    pub width_in: f64,
    #[serde(default = "PlotConfig::default_height_in")]
    pub height_in: f64,
    #[serde(default = "PlotConfig::default_dpi")]
    pub dpi: u32,
    #[serde(default = "PlotConfig::default_title")]
    pub title: String,
    #[serde(default = "PlotConfig::default_x_label")]
    pub x_label: String,
    #[serde(default = "PlotConfig::default_y_label")]
    pub y_label: String,
    #[serde(default = "PlotConfig::default_colorbar_label")]
    pub colorbar_label: String,
    #[serde(default = "PlotConfig::default_annotation_decimals")]
    pub annotation_decimals: usize,
    #[serde(default)]
    pub colormap: Colormap,
}

impl PlotConfig {
    fn default_width_in() -> f64 {
        8.0
    }
    fn default_height_in() -> f64 {
        4.0
    }
    fn default_dpi() -> u32 {
        200
    }
    fn default_title() -> String {
        "Imitation MSE heatmap".to_string()
    }
    fn default_x_label() -> String {
        "PCA dimension k".to_string()
    }
    fn default_y_label() -> String {
        "Buffer size B".to_string()
    }
    fn default_colorbar_label() -> String {
        "Mean MSE (lower is better)".to_string()
    }
    fn default_annotation_decimals() -> usize {
        4
    }
}

impl Default for PlotConfig {
    fn default() -> Self {
        Self {
            width_in: Self::default_width_in(),
            height_in: Self::default_height_in(),
            dpi: Self::default_dpi(),
            title: Self::default_title(),
            x_label: Self::default_x_label(),
            y_label: Self::default_y_label(),
            colorbar_label: Self::default_colorbar_label(),
            annotation_decimals: Self::default_annotation_decimals(),
            colormap: Colormap::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct AppConfig {
    #[serde(default)]
    pub input: InputConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub plot: PlotConfig,
}

impl AppConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path).map_err(|e| HeatmapError::io(path, e))?;
        let cfg: Self = toml::from_str(&contents).map_err(|e| HeatmapError::Config {
            path: path.into(),
            message: e.to_string(),
        })?;
        cfg.validate(path)?;
        Ok(cfg)
    }

    /// Check ranges. `origin` names where the values came from (config
    /// file or command line) for the error message.
    pub fn validate(&self, origin: &Path) -> Result<()> {
        let bad = |message: String| HeatmapError::Config {
            path: origin.into(),
            message,
        };
        let size_ok = |v: f64| v > 0.0 && v <= MAX_FIGURE_IN;
        if !(size_ok(self.plot.width_in) && size_ok(self.plot.height_in)) {
            return Err(bad(format!(
                "figure size must be in (0, {MAX_FIGURE_IN}] in, got {}x{} in",
                self.plot.width_in, self.plot.height_in
            )));
        }
        if !(MIN_DPI..=MAX_DPI).contains(&self.plot.dpi) {
            return Err(bad(format!(
                "dpi must be in {MIN_DPI}..={MAX_DPI}, got {}",
                self.plot.dpi
            )));
        }
        let dpi = self.plot.dpi as f64;
        let pixels = (self.plot.width_in * dpi).round() * (self.plot.height_in * dpi).round();
        if pixels > MAX_PIXELS {
            return Err(bad(format!(
                "canvas of {pixels} pixels exceeds the {MAX_PIXELS} pixel limit"
            )));
        }
        self.input.delimiter_byte().map_err(|_| {
            bad(format!(
                "delimiter {:?} is not a single ASCII byte",
                self.input.delimiter
            ))
        })?;
        Ok(())
    }

    /// Defaults as TOML with every value commented out, so the file
    /// documents the knobs without pinning them.
    pub fn default_toml() -> Result<String> {
        let text = toml::to_string_pretty(&Self::default()).map_err(|e| HeatmapError::Config {
            path: "<default>".into(),
            message: e.to_string(),
        })?;
        let mut commented = String::new();
        for line in text.lines() {
            let trimmed = line.trim();
            if trimmed.is_empty() {
                commented.push('\n');
            } else if trimmed.starts_with('[') && trimmed.ends_with(']') {
                commented.push_str(line);
                commented.push('\n');
            } else {
                commented.push_str("# ");
                commented.push_str(line);
                commented.push('\n');
            }
        }
        Ok(commented)
    }

    /// Write the commented defaults to `path`; refuses to overwrite.
    pub fn write_default(path: &Path) -> Result<()> {
        if path.exists() {
            return Err(HeatmapError::Config {
                path: path.into(),
                message: "refusing to overwrite existing file".to_string(),
            });
        }
        let text = Self::default_toml()?;
        fs::write(path, text).map_err(|e| HeatmapError::io(path, e))
    }
}
