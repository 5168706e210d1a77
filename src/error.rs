use thiserror::Error;

/// The primary error type for the drone_agl crate.
#[derive(Error, Debug)]
pub enum AglAnalyzerError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Metadata extraction failed: {0}")]
    Metadata(#[from] crate::features::error::MetadataError),

    #[error("Could not serialize records: {0}")]
    Json(#[from] serde_json::Error),
}
