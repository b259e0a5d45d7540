//! Batch driver: load once, then pivot and render each dataset in turn.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::config::{AppConfig, OutputConfig};
use crate::error::{HeatmapError, Result};
use crate::loader::load_records;
use crate::pivot::{PivotGrid, dataset_ids};
use crate::record::MeasurementRecord;
use crate::render::Renderer;

/// One file written by a run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RenderedDataset {
    pub dataset_id: String,
    pub path: PathBuf,
    pub n_rows: usize,
    pub n_cols: usize,
}

/// Outputs in processing (ascending id) order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RunReport {
    pub outputs: Vec<RenderedDataset>,
}

/// `<prefix><id>.<ext>`, with path separators in the id replaced by `_`.
pub fn output_file_name(prefix: &str, dataset_id: &str, extension: &str) -> String {
    let safe: String = dataset_id
        .chars()
        .map(|c| if c == '/' || c == '\\' { '_' } else { c })
        .collect();
    if safe != dataset_id {
        warn!(dataset = dataset_id, file_id = %safe, "dataset id contains path separators");
    }
    format!("{prefix}{safe}.{extension}")
}

/// Full run: read `config.input`, render every dataset.
pub fn run<R: Renderer + ?Sized>(config: &AppConfig, renderer: &mut R) -> Result<RunReport> {
    let input = Path::new(&config.input.path);
    let records = load_records(input, config.input.delimiter_byte()?)?;
    info!(path = %input.display(), rows = records.len(), "loaded results");
    render_all(&records, &config.output, renderer)
}

/// Render every dataset in `records`, ascending by id. Stops at the first
/// error; files already written are left in place.
pub fn render_all<R: Renderer + ?Sized>(
    records: &[MeasurementRecord],
    output: &OutputConfig,
    renderer: &mut R,
) -> Result<RunReport> {
    let ids = dataset_ids(records);
    if ids.is_empty() {
        warn!("no records; nothing to render");
        return Ok(RunReport::default());
    }

    let out_dir = Path::new(&output.dir);
    fs::create_dir_all(out_dir).map_err(|e| HeatmapError::io(out_dir, e))?;

    let mut report = RunReport::default();
    for id in ids {
        let grid = PivotGrid::build(records, &id)?;
        debug!(
            dataset = %id,
            rows = grid.n_rows(),
            cols = grid.n_cols(),
            "pivoted"
        );

        let path = out_dir.join(output_file_name(
            &output.file_prefix,
            &id,
            renderer.extension(),
        ));
        renderer.render(&grid, &path)?;

        if output.summary_csv {
            let csv_path = out_dir.join(output_file_name(&output.file_prefix, &id, "csv"));
            fs::write(&csv_path, grid.to_csv()).map_err(|e| HeatmapError::io(&csv_path, e))?;
        }
        info!(dataset = %id, path = %path.display(), "wrote heatmap");

        report.outputs.push(RenderedDataset {
            dataset_id: id,
            path,
            n_rows: grid.n_rows(),
            n_cols: grid.n_cols(),
        });
    }
    Ok(report)
}
