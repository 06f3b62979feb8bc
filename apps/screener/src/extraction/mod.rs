// Extraction agents: JD summarizer and CV extractor.
// All LLM calls go through llm_client; cleaning is deterministic and total.

pub mod clean;
pub mod cv_extractor;
pub mod jd_summarizer;
pub mod prompts;

use thiserror::Error;

use crate::llm_client::LlmError;

pub use cv_extractor::{extract_cv_data, CandidateProfile};
pub use jd_summarizer::{summarize_job_description, JobSummary};

#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("text for record {id} is empty")]
    EmptyText { id: i64 },

    #[error("text for record {id} is too short ({chars} chars, need {min})")]
    TextTooShort { id: i64, chars: usize, min: usize },

    #[error("LLM extraction failed for record {id}: {source}")]
    Llm {
        id: i64,
        #[source]
        source: LlmError,
    },
}
