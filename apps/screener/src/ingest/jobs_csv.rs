use std::path::Path;

use serde::Deserialize;
use tracing::{info, warn};

use crate::ingest::{decode_text, IngestError};

const TITLE_COLUMN: &str = "Job Title";
const DESCRIPTION_COLUMN: &str = "Job Description";

/// One row of the job-description CSV.
#[derive(Debug, Clone, PartialEq)]
pub struct JobPosting {
    pub title: String,
    pub description: String,
}

#[derive(Debug, Deserialize)]
struct CsvRow {
    #[serde(rename = "Job Title")]
    title: Option<String>,
    #[serde(rename = "Job Description")]
    description: Option<String>,
}

/// Reads every posting from the CSV at `path`.
/// Rows without a description are returned with an empty one; callers skip them.
pub fn read_job_descriptions(path: &Path) -> Result<Vec<JobPosting>, IngestError> {
    let bytes = std::fs::read(path).map_err(|source| IngestError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let content = decode_text(bytes);

    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::Headers)
        .flexible(true)
        .from_reader(content.as_bytes());

    let headers = reader.headers()?.clone();
    let missing: Vec<&str> = [TITLE_COLUMN, DESCRIPTION_COLUMN]
        .into_iter()
        .filter(|column| !headers.iter().any(|h| h == *column))
        .collect();
    if !missing.is_empty() {
        return Err(IngestError::MissingColumns {
            path: path.to_path_buf(),
            missing: missing.join(", "),
        });
    }

    let mut postings = Vec::new();
    for (line, row) in reader.deserialize::<CsvRow>().enumerate() {
        let row = match row {
            Ok(row) => row,
            Err(e) => {
                warn!("Skipping CSV record {}: {e}", line + 1);
                continue;
            }
        };
        let title = row
            .title
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| "N/A".to_string());
        postings.push(JobPosting {
            title,
            description: row.description.unwrap_or_default(),
        });
    }

    info!("Read {} job descriptions from {}", postings.len(), path.display());
    Ok(postings)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_csv(contents: &[u8]) -> (tempfile::TempDir, std::path::PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("job_description.csv");
        std::fs::write(&path, contents).unwrap();
        (dir, path)
    }

    #[test]
    fn test_reads_quoted_multiline_descriptions() {
        let (_dir, path) = write_csv(
            b"Job Title,Job Description,Location\n\
              Data Engineer,\"Python, SQL\nAWS preferred\",Remote\n\
              ,Unnamed role,Paris\n",
        );
        let postings = read_job_descriptions(&path).unwrap();
        assert_eq!(
            postings,
            vec![
                JobPosting {
                    title: "Data Engineer".into(),
                    description: "Python, SQL\nAWS preferred".into(),
                },
                JobPosting {
                    title: "N/A".into(),
                    description: "Unnamed role".into(),
                },
            ]
        );
    }

    #[test]
    fn test_latin1_file_is_decoded() {
        let mut bytes = b"Job Title,Job Description\nChef,Caf".to_vec();
        bytes.extend([0xE9, b'\n']);
        let (_dir, path) = write_csv(&bytes);

        let postings = read_job_descriptions(&path).unwrap();
        assert_eq!(postings[0].description, "Café");
    }

    #[test]
    fn test_missing_column_is_reported() {
        let (_dir, path) = write_csv(b"Title,Description\nA,B\n");
        let err = read_job_descriptions(&path).unwrap_err();
        assert!(matches!(err, IngestError::MissingColumns { .. }));
        assert!(err.to_string().contains("Job Title, Job Description"));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = read_job_descriptions(Path::new("/no/such.csv")).unwrap_err();
        assert!(matches!(err, IngestError::Io { .. }));
    }
}
