//! Mean-MSE heatmaps for buffer-size × PCA-dimension parameter sweeps.
//!
//! `combined.csv` (headerless: `dataset_id, simulation_id, buffer_size, pca, mse`)
//! → one `heatmap_<dataset_id>.pdf` per dataset.

pub mod cli;
pub mod config;
pub mod error;
pub mod loader;
pub mod pipeline;
pub mod pivot;
pub mod record;
pub mod render;

pub use error::{HeatmapError, Result};
