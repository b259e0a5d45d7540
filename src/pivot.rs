//! Mean-MSE pivot over `(buffer_size, pca)` for a single dataset.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt::Write as _;

use crate::error::{HeatmapError, Result};
use crate::record::MeasurementRecord;

/// Distinct dataset identifiers in ascending order.
pub fn dataset_ids(records: &[MeasurementRecord]) -> Vec<String> {
    let ids: BTreeSet<&str> = records.iter().map(|r| r.dataset_id.as_str()).collect();
    ids.into_iter().map(str::to_owned).collect()
}

#[derive(Clone, Copy, Debug, Default)]
struct Accum {
    sum: f64,
    count: usize,
}

/// Row-major grid of mean mse. Rows are buffer sizes, columns pca dims,
/// both ascending. Pairs never observed stay `None`.
#[derive(Clone, Debug, PartialEq)]
pub struct PivotGrid {
    dataset_id: String,
    buffer_sizes: Vec<u64>,
    pcas: Vec<u64>,
    means: Vec<Option<f64>>,
    counts: Vec<usize>,
}

impl PivotGrid {
    pub fn build(records: &[MeasurementRecord], dataset_id: &str) -> Result<Self> {
        let mut groups: BTreeMap<(u64, u64), Accum> = BTreeMap::new();
        for record in records.iter().filter(|r| r.dataset_id == dataset_id) {
            let acc = groups.entry(record.cell()).or_default();
            acc.sum += record.mse;
            acc.count += 1;
        }
        if groups.is_empty() {
            return Err(HeatmapError::EmptyGroup(dataset_id.to_owned()));
        }

        let buffer_sizes: Vec<u64> = groups
            .keys()
            .map(|&(b, _)| b)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        let pcas: Vec<u64> = groups
            .keys()
            .map(|&(_, k)| k)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        let n = buffer_sizes.len() * pcas.len();
        let mut means = vec![None; n];
        let mut counts = vec![0usize; n];
        for (row, b) in buffer_sizes.iter().enumerate() {
            for (col, k) in pcas.iter().enumerate() {
                if let Some(acc) = groups.get(&(*b, *k)) {
                    let idx = row * pcas.len() + col;
                    means[idx] = Some(acc.sum / acc.count as f64);
                    counts[idx] = acc.count;
                }
            }
        }

        Ok(Self {
            dataset_id: dataset_id.to_owned(),
            buffer_sizes,
            pcas,
            means,
            counts,
        })
    }

    pub fn dataset_id(&self) -> &str {
        &self.dataset_id
    }

    /// Row labels.
    pub fn buffer_sizes(&self) -> &[u64] {
        &self.buffer_sizes
    }

    /// Column labels.
    pub fn pcas(&self) -> &[u64] {
        &self.pcas
    }

    #[inline]
    pub fn n_rows(&self) -> usize {
        self.buffer_sizes.len()
    }

    #[inline]
    pub fn n_cols(&self) -> usize {
        self.pcas.len()
    }

    #[inline]
    fn index(&self, row: usize, col: usize) -> Option<usize> {
        (row < self.n_rows() && col < self.n_cols()).then(|| row * self.n_cols() + col)
    }

    /// Mean mse at `(row, col)`; `None` when the pair was never observed
    /// or the index is out of range.
    pub fn get(&self, row: usize, col: usize) -> Option<f64> {
        self.index(row, col).and_then(|i| self.means[i])
    }

    /// Number of records averaged into `(row, col)`.
    pub fn sample_count(&self, row: usize, col: usize) -> usize {
        self.index(row, col).map(|i| self.counts[i]).unwrap_or(0)
    }

    /// `(min, max)` over present cells.
    pub fn value_range(&self) -> Option<(f64, f64)> {
        self.means.iter().flatten().fold(None, |acc, &v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })
    }

    /// Grid as a CSV table: header `buffer_size,<pca...>`, one row per
    /// buffer size, absent cells empty.
    pub fn to_csv(&self) -> String {
        let mut out = String::from("buffer_size");
        for k in &self.pcas {
            let _ = write!(out, ",{k}");
        }
        out.push('\n');
        for (row, b) in self.buffer_sizes.iter().enumerate() {
            let _ = write!(out, "{b}");
            for col in 0..self.n_cols() {
                match self.get(row, col) {
                    Some(v) => {
                        let _ = write!(out, ",{v:.6}");
                    }
                    None => out.push(','),
                }
            }
            out.push('\n');
        }
        out
    }
}
