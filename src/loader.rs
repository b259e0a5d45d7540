//! Headerless results CSV → `MeasurementRecord`s.
//!
//! Fields are assigned by position. Any malformed row aborts the load with
//! the offending line number; there is no partial result.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use tracing::debug;

use crate::error::{HeatmapError, Result};
use crate::record::{FIELD_COUNT, MeasurementRecord};

/// Load every record from `path`, splitting fields on `delimiter`.
pub fn load_records(path: &Path, delimiter: u8) -> Result<Vec<MeasurementRecord>> {
    let file = File::open(path).map_err(|e| HeatmapError::io(path, e))?;
    let records = read_records(file, delimiter)?;
    debug!(path = %path.display(), rows = records.len(), "loaded results");
    Ok(records)
}

/// Parse records from any reader. Blank lines are skipped.
pub fn read_records<R: Read>(input: R, delimiter: u8) -> Result<Vec<MeasurementRecord>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .delimiter(delimiter)
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(input);

    let mut out = Vec::new();
    for result in reader.records() {
        let row = result.map_err(csv_error)?;
        // Whitespace-only line: one empty field after trimming.
        if row.len() == 1 && row[0].is_empty() {
            continue;
        }
        let line = row.position().map(|p| p.line()).unwrap_or(0);
        if row.len() != FIELD_COUNT {
            return Err(HeatmapError::Parse {
                line,
                message: format!("expected {FIELD_COUNT} fields, found {}", row.len()),
            });
        }
        let record: MeasurementRecord =
            row.deserialize(None).map_err(|e| HeatmapError::Parse {
                line,
                message: deserialize_message(&e),
            })?;
        if !record.mse.is_finite() || record.mse < 0.0 {
            return Err(HeatmapError::Parse {
                line,
                message: format!("mse must be finite and non-negative, got {}", record.mse),
            });
        }
        out.push(record);
    }
    Ok(out)
}

fn csv_error(err: csv::Error) -> HeatmapError {
    let line = err.position().map(|p| p.line()).unwrap_or(0);
    HeatmapError::Parse {
        line,
        message: err.to_string(),
    }
}

fn deserialize_message(err: &csv::Error) -> String {
    match err.kind() {
        csv::ErrorKind::Deserialize { err, .. } => match err.field() {
            Some(idx) => format!("field {} ({}): {}", idx + 1, field_name(idx), err.kind()),
            None => err.kind().to_string(),
        },
        _ => err.to_string(),
    }
}

fn field_name(idx: u64) -> &'static str {
    match idx {
        0 => "dataset_id",
        1 => "simulation_id",
        2 => "buffer_size",
        3 => "pca",
        4 => "mse",
        _ => "?",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> Result<Vec<MeasurementRecord>> {
        read_records(text.as_bytes(), b',')
    }

    #[test]
    fn reads_positional_fields() {
        let rows = parse("5_len,3,8,64,0.0523\n10_len,0,1,16,1.5\n").unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(
            rows[0],
            MeasurementRecord {
                dataset_id: "5_len".into(),
                simulation_id: "3".into(),
                buffer_size: 8,
                pca: 64,
                mse: 0.0523,
            }
        );
        assert_eq!(rows[1].cell(), (1, 16));
    }

    #[test]
    fn first_row_is_data_not_header() {
        let rows = parse("A,1,64,8,0.0523").unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].dataset_id, "A");
    }

    #[test]
    fn trims_whitespace_and_skips_blank_lines() {
        let rows = parse(" A , 1 , 2 , 4 , 0.5 \n\n   \nB,2,2,4,0.25\n").unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].dataset_id, "A");
        assert_eq!(rows[1].mse, 0.25);
    }

    #[test]
    fn short_row_reports_line() {
        let err = parse("A,1,2,4,0.5\nA,1,2,4\n").unwrap_err();
        match err {
            HeatmapError::Parse { line, message } => {
                assert_eq!(line, 2);
                assert!(message.contains("found 4"), "{message}");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn non_numeric_buffer_size_is_rejected() {
        let err = parse("A,1,big,4,0.5\n").unwrap_err();
        match err {
            HeatmapError::Parse { line, message } => {
                assert_eq!(line, 1);
                assert!(message.contains("buffer_size"), "{message}");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn negative_or_nan_mse_is_rejected() {
        assert!(matches!(
            parse("A,1,2,4,-0.1\n"),
            Err(HeatmapError::Parse { .. })
        ));
        assert!(matches!(
            parse("A,1,2,4,NaN\n"),
            Err(HeatmapError::Parse { .. })
        ));
    }

    #[test]
    fn all_empty_fields_are_not_a_blank_line() {
        let err = parse("A,1,2,4,0.5\n,,,,\n").unwrap_err();
        assert!(matches!(err, HeatmapError::Parse { line: 2, .. }), "{err}");
        assert!(matches!(
            parse(",,,,\n"),
            Err(HeatmapError::Parse { line: 1, .. })
        ));
    }

    #[test]
    fn honours_custom_delimiter() {
        let rows = read_records("A;1;2;4;0.5\n".as_bytes(), b';').unwrap();
        assert_eq!(rows[0].cell(), (2, 4));
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = load_records(Path::new("definitely/not/here.csv"), b',').unwrap_err();
        assert!(matches!(err, HeatmapError::Io { .. }));
    }
}
