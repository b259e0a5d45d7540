use std::path::PathBuf;

/// Everything that can abort a heatmap run.
#[derive(Debug, thiserror::Error)]
pub enum HeatmapError {
    #[error("failed to access {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("line {line}: {message}")]
    Parse { line: u64, message: String },

    #[error("dataset `{0}` has no records")]
    EmptyGroup(String),

    #[error("failed to render {}: {message}", path.display())]
    Render { path: PathBuf, message: String },

    #[error("config {}: {message}", path.display())]
    Config { path: PathBuf, message: String },
}

impl HeatmapError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub fn render(path: impl Into<PathBuf>, err: impl std::fmt::Display) -> Self {
        Self::Render {
            path: path.into(),
            message: err.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, HeatmapError>;
