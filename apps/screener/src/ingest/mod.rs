//! Input sources: the job-description CSV and the directory of CV files.

pub mod cv_files;
pub mod jobs_csv;

use std::path::PathBuf;

use thiserror::Error;

pub use cv_files::{extract_cv_text, list_cv_files};
pub use jobs_csv::read_job_descriptions;

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("Failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("{} must contain the column(s): {missing}", .path.display())]
    MissingColumns { path: PathBuf, missing: String },

    #[error("CV directory not found at {}", .0.display())]
    NotADirectory(PathBuf),

    #[error("Failed to extract text from {}: {message}", .path.display())]
    Pdf { path: PathBuf, message: String },

    #[error("Background extraction task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// Decodes file contents as UTF-8, falling back to ISO-8859-1 (every byte is a code point).
pub(crate) fn decode_text(bytes: Vec<u8>) -> String {
    match String::from_utf8(bytes) {
        Ok(text) => text
            .strip_prefix('\u{feff}')
            .map(String::from)
            .unwrap_or(text),
        Err(e) => e.into_bytes().into_iter().map(char::from).collect(),
    }
}
