// Error taxonomy for the dashboard library
// Only MissingInput is meant to be caught and shown to the user; everything
// else ends the current render pass.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DashboardError {
    /// Input CSV does not exist
    #[error("File CSV tidak ditemukan: {}", path.display())]
    MissingInput { path: PathBuf },

    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed CSV: {0}")]
    Csv(#[from] csv::Error),

    /// No row carries Ranking = 1
    #[error("ranking table has no region with rank 1")]
    MissingTopRegion,

    #[error("ranking table is empty")]
    EmptyRanking,

    #[error("export failed: {0}")]
    Export(String),
}

impl DashboardError {
    pub fn is_missing_input(&self) -> bool {
        matches!(self, DashboardError::MissingInput { .. })
    }
}

pub type Result<T> = std::result::Result<T, DashboardError>;
