//! Heatmap rendering with plotters.
//!
//! The same drawing routine targets every backend: PNG goes straight to a
//! `BitMapBackend`, SVG and PDF are drawn into an in-memory `SVGBackend`
//! and PDF is produced from that SVG with svg2pdf.

pub mod axis;
pub mod colormap;

use std::error::Error;
use std::fs;
use std::path::Path;

use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use serde::{Deserialize, Serialize};
use svg2pdf::usvg;
use svg2pdf::usvg::fontdb;
use tracing::debug;

use crate::config::PlotConfig;
use crate::error::{HeatmapError, Result};
use crate::pivot::PivotGrid;

use axis::CellAxis;
use colormap::luminance;

const COLORBAR_STEPS: usize = 64;

#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default, clap::ValueEnum,
)]
#[serde(rename_all = "kebab-case")]
pub enum OutputFormat {
    #[default]
    Pdf,
    Svg,
    Png,
}

impl OutputFormat {
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Pdf => "pdf",
            OutputFormat::Svg => "svg",
            OutputFormat::Png => "png",
        }
    }
}

/// Turns one dataset's grid into one file.
pub trait Renderer {
    /// File extension (without the dot) of what `render` writes.
    fn extension(&self) -> &str;

    fn render(&mut self, grid: &PivotGrid, out_path: &Path) -> Result<()>;
}

pub struct HeatmapRenderer {
    plot: PlotConfig,
    format: OutputFormat,
}

impl HeatmapRenderer {
    pub fn new(plot: PlotConfig, format: OutputFormat) -> Self {
        Self { plot, format }
    }

    /// Canvas size in pixels: figure inches times DPI.
    pub fn pixel_size(&self) -> (u32, u32) {
        let dpi = self.plot.dpi as f64;
        (
            (self.plot.width_in * dpi).round().max(1.0) as u32,
            (self.plot.height_in * dpi).round().max(1.0) as u32,
        )
    }

    /// Draw the heatmap into an SVG document.
    pub fn render_svg(&self, grid: &PivotGrid) -> std::result::Result<String, Box<dyn Error>> {
        let mut svg = String::new();
        {
            let root = SVGBackend::with_string(&mut svg, self.pixel_size()).into_drawing_area();
            draw_heatmap(&root, grid, &self.plot)?;
            root.present()?;
        }
        Ok(svg)
    }

    fn render_png(
        &self,
        grid: &PivotGrid,
        out_path: &Path,
    ) -> std::result::Result<(), Box<dyn Error>> {
        let root = BitMapBackend::new(out_path, self.pixel_size()).into_drawing_area();
        draw_heatmap(&root, grid, &self.plot)?;
        root.present()?;
        Ok(())
    }
}

impl Renderer for HeatmapRenderer {
    fn extension(&self) -> &str {
        self.format.extension()
    }

    fn render(&mut self, grid: &PivotGrid, out_path: &Path) -> Result<()> {
        let (w, h) = self.pixel_size();
        debug!(
            dataset = grid.dataset_id(),
            format = self.extension(),
            w,
            h,
            "rendering heatmap"
        );
        match self.format {
            OutputFormat::Png => self
                .render_png(grid, out_path)
                .map_err(|e| HeatmapError::render(out_path, e)),
            OutputFormat::Svg => {
                let svg = self
                    .render_svg(grid)
                    .map_err(|e| HeatmapError::render(out_path, e))?;
                fs::write(out_path, svg).map_err(|e| HeatmapError::io(out_path, e))
            }
            OutputFormat::Pdf => {
                let svg = self
                    .render_svg(grid)
                    .map_err(|e| HeatmapError::render(out_path, e))?;
                let pdf = svg_to_pdf(&svg, self.plot.dpi as f32)
                    .map_err(|e| HeatmapError::render(out_path, e))?;
                fs::write(out_path, pdf).map_err(|e| HeatmapError::io(out_path, e))
            }
        }
    }
}

// Tried in order when the generic `sans-serif` family does not resolve.
const SANS_SERIF_CANDIDATES: [&str; 6] = [
    "DejaVu Sans",
    "Liberation Sans",
    "Noto Sans",
    "Helvetica",
    "Arial",
    "FreeSans",
];

fn has_family(db: &fontdb::Database, family: fontdb::Family<'_>) -> bool {
    db.query(&fontdb::Query {
        families: &[family],
        ..fontdb::Query::default()
    })
    .is_some()
}

/// Point the generic `sans-serif` family at an installed face and return
/// its name. fontdb maps the generic to "Arial" by default, and text in a
/// family that does not resolve is dropped from the PDF without error.
pub fn resolve_sans_serif(db: &mut fontdb::Database) -> Option<String> {
    if has_family(db, fontdb::Family::SansSerif) {
        return Some(db.family_name(&fontdb::Family::SansSerif).to_string());
    }
    let name = SANS_SERIF_CANDIDATES
        .iter()
        .copied()
        .find(|name| has_family(db, fontdb::Family::Name(name)))
        .map(|name| name.to_string())
        .or_else(|| {
            db.faces()
                .find_map(|face| face.families.first().map(|(name, _)| name.clone()))
        })?;
    db.set_sans_serif_family(name.as_str());
    Some(name)
}

/// Convert an SVG document to a single-page PDF. `dpi` fixes the pixel to
/// point ratio, so the page keeps the configured figure size in inches.
/// Fails when no installed font can render the labels.
pub fn svg_to_pdf(svg: &str, dpi: f32) -> std::result::Result<Vec<u8>, String> {
    let mut options = usvg::Options::default();
    let db = options.fontdb_mut();
    db.load_system_fonts();
    let family = resolve_sans_serif(db).ok_or("no usable sans-serif font installed")?;
    debug!(family = %family, "pdf text font");

    let tree = usvg::Tree::from_str(svg, &options).map_err(|e| e.to_string())?;
    let mut page = svg2pdf::PageOptions::default();
    page.dpi = dpi;
    svg2pdf::to_pdf(&tree, svg2pdf::ConversionOptions::default(), page).map_err(|e| e.to_string())
}

fn color_position(v: f64, lo: f64, hi: f64) -> f64 {
    let span = hi - lo;
    if span <= f64::EPSILON * hi.abs().max(1.0) {
        0.5
    } else {
        (v - lo) / span
    }
}

/// Value span shown on the colour bar; a flat grid gets a small pad so the
/// axis is never empty.
fn colorbar_span(lo: f64, hi: f64) -> (f64, f64) {
    if hi - lo > f64::EPSILON * hi.abs().max(1.0) {
        (lo, hi)
    } else {
        let pad = (lo.abs() * 0.05).max(1e-6);
        (lo - pad, hi + pad)
    }
}

fn draw_heatmap<DB>(
    root: &DrawingArea<DB, Shift>,
    grid: &PivotGrid,
    plot: &PlotConfig,
) -> std::result::Result<(), Box<dyn Error>>
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    let scale = plot.dpi as f64 / 100.0;
    let px = |v: f64| (v * scale).round() as u32;
    let font = |v: f64| v * scale;

    root.fill(&WHITE)?;
    let (width, _) = root.dim_in_pixel();
    let bar_width = px(120.0).min(width / 3);
    let (main, bar) = root.split_horizontally((width - bar_width) as i32);

    let (lo, hi) = grid.value_range().unwrap_or((0.0, 1.0));
    let buffers = grid.buffer_sizes();
    let pcas = grid.pcas();

    let caption_px = px(28.0);
    let x_area = px(45.0);
    let margin = px(10.0);

    let mut chart = ChartBuilder::on(&main)
        .caption(
            format!("{} (dataset={})", plot.title, grid.dataset_id()),
            ("sans-serif", font(16.0)),
        )
        .margin(margin)
        .x_label_area_size(x_area)
        .y_label_area_size(px(60.0))
        .build_cartesian_2d(
            CellAxis::new(grid.n_cols(), false),
            CellAxis::new(grid.n_rows(), true),
        )?;

    let x_fmt = |v: &f64| CellAxis::label(*v, pcas);
    let y_fmt = |v: &f64| CellAxis::label(*v, buffers);
    chart
        .configure_mesh()
        .disable_mesh()
        .x_labels(grid.n_cols())
        .y_labels(grid.n_rows())
        .x_label_formatter(&x_fmt)
        .y_label_formatter(&y_fmt)
        .x_desc(plot.x_label.as_str())
        .y_desc(plot.y_label.as_str())
        .label_style(("sans-serif", font(12.0)))
        .axis_desc_style(("sans-serif", font(13.0)))
        .draw()?;

    for row in 0..grid.n_rows() {
        for col in 0..grid.n_cols() {
            let Some(value) = grid.get(row, col) else {
                continue;
            };
            let (x, y) = (col as f64, row as f64);
            let color = plot.colormap.color(color_position(value, lo, hi));
            chart.draw_series(std::iter::once(Rectangle::new(
                [(x, y), (x + 1.0, y + 1.0)],
                color.filled(),
            )))?;

            let text_color = if luminance(color) < 0.5 { WHITE } else { BLACK };
            let style = ("sans-serif", font(9.0))
                .into_font()
                .color(&text_color)
                .pos(Pos::new(HPos::Center, VPos::Center));
            chart.draw_series(std::iter::once(Text::new(
                format!("{value:.prec$}", prec = plot.annotation_decimals),
                (x + 0.5, y + 0.5),
                style,
            )))?;
        }
    }

    let (bar_lo, bar_hi) = colorbar_span(lo, hi);
    let mut bar_chart = ChartBuilder::on(&bar)
        .margin_top(caption_px + margin)
        .margin_bottom(x_area + margin)
        .margin_left(px(4.0))
        .margin_right(margin)
        .y_label_area_size(px(80.0))
        .build_cartesian_2d(0.0f64..1.0f64, bar_lo..bar_hi)?;

    bar_chart
        .configure_mesh()
        .disable_mesh()
        .disable_x_axis()
        .y_labels(6)
        .y_label_formatter(&|v| format!("{v:.3}"))
        .y_desc(plot.colorbar_label.as_str())
        .label_style(("sans-serif", font(10.0)))
        .axis_desc_style(("sans-serif", font(11.0)))
        .draw()?;

    let step = (bar_hi - bar_lo) / COLORBAR_STEPS as f64;
    bar_chart.draw_series((0..COLORBAR_STEPS).map(|i| {
        let v0 = bar_lo + step * i as f64;
        let t = color_position(v0 + 0.5 * step, lo, hi);
        Rectangle::new(
            [(0.0, v0), (1.0, v0 + step)],
            plot.colormap.color(t).filled(),
        )
    }))?;

    Ok(())
}
