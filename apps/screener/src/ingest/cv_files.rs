use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::ingest::{decode_text, IngestError};

const CV_EXTENSIONS: &[&str] = &["pdf", "txt"];

fn extension_of(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase)
}

/// PDF and plain-text files directly inside `dir`, sorted by file name.
pub fn list_cv_files(dir: &Path) -> Result<Vec<PathBuf>, IngestError> {
    if !dir.is_dir() {
        return Err(IngestError::NotADirectory(dir.to_path_buf()));
    }

    let entries = std::fs::read_dir(dir).map_err(|source| IngestError::Io {
        path: dir.to_path_buf(),
        source,
    })?;

    let mut files: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.is_file())
        .filter(|path| {
            extension_of(path).is_some_and(|ext| CV_EXTENSIONS.contains(&ext.as_str()))
        })
        .collect();
    files.sort();

    info!("Found {} CV files in {}", files.len(), dir.display());
    Ok(files)
}

/// Raw text of a CV. PDF parsing runs on the blocking pool.
pub async fn extract_cv_text(path: &Path) -> Result<String, IngestError> {
    let text = if extension_of(path).as_deref() == Some("pdf") {
        let owned = path.to_path_buf();
        tokio::task::spawn_blocking(move || pdf_extract::extract_text(&owned))
            .await?
            .map_err(|e| IngestError::Pdf {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?
    } else {
        let bytes = tokio::fs::read(path).await.map_err(|source| IngestError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        decode_text(bytes)
    };

    debug!("Extracted {} chars from {}", text.chars().count(), path.display());
    Ok(text)
}
