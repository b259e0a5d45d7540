// Entry point: parse flags, load config, render every dataset.
use std::error::Error;

use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use mse_heatmap::cli::Args;
use mse_heatmap::config::AppConfig;
use mse_heatmap::pipeline;
use mse_heatmap::render::HeatmapRenderer;

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();
    init_tracing();

    if let Some(path) = &args.init_config {
        AppConfig::write_default(path)?;
        println!("Wrote default config to {}", path.display());
        return Ok(());
    }

    let config = args.resolve()?;
    let mut renderer = HeatmapRenderer::new(config.plot.clone(), config.output.format);
    let report = pipeline::run(&config, &mut renderer)?;
    info!(files = report.outputs.len(), "done");
    Ok(())
}
