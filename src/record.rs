use serde::Deserialize;

/// Number of positional columns in a results row.
pub const FIELD_COUNT: usize = 5;

/// One evaluated episode from a parameter sweep.
///
/// Column order on disk: `dataset_id, simulation_id, buffer_size, pca, mse`.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct MeasurementRecord {
    pub dataset_id: String,
    pub simulation_id: String,
    pub buffer_size: u64,
    pub pca: u64,
    pub mse: f64,
}

impl MeasurementRecord {
    /// Grid key this record aggregates into.
    #[inline]
    pub fn cell(&self) -> (u64, u64) {
        (self.buffer_size, self.pca)
    }
}
