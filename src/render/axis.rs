use std::fmt::Display;
use std::ops::Range;

use plotters::coord::ranged1d::{DefaultFormatting, KeyPointHint, Ranged};

/// Axis over `n` unit-wide cells with one key point at each cell centre.
///
/// Cell `i` spans `[i, i + 1)`. With `top_down` set, cell 0 is drawn at the
/// top of a vertical axis (image row order) instead of the bottom.
#[derive(Clone, Copy, Debug)]
pub struct CellAxis {
    n: usize,
    top_down: bool,
}

impl CellAxis {
    pub fn new(n: usize, top_down: bool) -> Self {
        Self { n: n.max(1), top_down }
    }

    /// Cell index under a centre position, if any.
    pub fn cell_at(pos: f64) -> Option<usize> {
        (pos.is_finite() && pos >= 0.0).then(|| pos.floor() as usize)
    }

    /// Tick label for the cell at `pos`, taken from `labels`.
    pub fn label<T: Display>(pos: f64, labels: &[T]) -> String {
        Self::cell_at(pos)
            .and_then(|i| labels.get(i))
            .map(|l| l.to_string())
            .unwrap_or_default()
    }
}

impl Ranged for CellAxis {
    type FormatOption = DefaultFormatting;
    type ValueType = f64;

    fn map(&self, value: &f64, limit: (i32, i32)) -> i32 {
        let mut frac = value / self.n as f64;
        if self.top_down {
            frac = 1.0 - frac;
        }
        limit.0 + ((limit.1 - limit.0) as f64 * frac).round() as i32
    }

    fn key_points<Hint: KeyPointHint>(&self, hint: Hint) -> Vec<f64> {
        if hint.max_num_points() == 0 {
            return Vec::new();
        }
        (0..self.n).map(|i| i as f64 + 0.5).collect()
    }

    fn range(&self) -> Range<f64> {
        0.0..self.n as f64
    }
}
