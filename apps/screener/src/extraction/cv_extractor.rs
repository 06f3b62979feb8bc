//! CV Extractor: turns raw CV text into a structured `CandidateProfile`.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::extraction::clean::{is_unspecified, optional_number, string_list, Case, Items};
use crate::extraction::prompts::{PromptSet, CV_EXTRACTION_SYSTEM};
use crate::extraction::ExtractionError;
use crate::llm_client::StructuredLlm;

/// CV text shorter than this is treated as a failed PDF extraction.
pub const MIN_CV_CHARS: usize = 50;

/// Default cap on CV text sent to the model (~4k tokens).
pub const DEFAULT_MAX_CV_CHARS: usize = 15_000;

/// Only the most recent titles are kept.
const MAX_RECENT_TITLES: usize = 2;

/// Structured professional information extracted from one CV.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CandidateProfile {
    pub name: Option<String>,
    pub skills: Vec<String>,
    pub soft_skills: Vec<String>,
    pub domain_expertise: Vec<String>,
    pub total_experience_years: Option<f64>,
    pub education: Vec<String>,
    pub certifications: Vec<String>,
    pub recent_job_titles: Vec<String>,
    pub industry_experience: Vec<String>,
}

impl CandidateProfile {
    /// Normalises a raw model reply. Never fails: unusable fields become empty.
    pub fn from_llm_value(value: &Value) -> Self {
        let mut recent_job_titles =
            string_list(value.get("recent_job_titles"), Items::Strings, Case::Keep);
        recent_job_titles.truncate(MAX_RECENT_TITLES);

        Self {
            name: extract_name(value),
            skills: string_list(value.get("skills"), Items::StringsAndNumbers, Case::Lower),
            soft_skills: string_list(value.get("soft_skills"), Items::Strings, Case::Lower),
            domain_expertise: string_list(
                value.get("domain_expertise"),
                Items::Strings,
                Case::Lower,
            ),
            total_experience_years: optional_number(value.get("total_experience_years")),
            education: string_list(value.get("education"), Items::Strings, Case::Keep),
            certifications: string_list(value.get("certifications"), Items::Strings, Case::Lower),
            recent_job_titles,
            industry_experience: string_list(
                value.get("industry_experience"),
                Items::Strings,
                Case::Lower,
            ),
        }
    }
}

fn extract_name(value: &Value) -> Option<String> {
    ["name", "candidate_name", "full_name"]
        .iter()
        .filter_map(|key| value.get(*key).and_then(Value::as_str))
        .map(str::trim)
        .find(|name| !is_unspecified(name))
        .map(String::from)
}

/// Cuts `text` to at most `max_chars` characters without splitting a code point.
fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => &text[..byte_idx],
        None => text,
    }
}

/// Extracts a candidate profile from CV text via the LLM.
pub async fn extract_cv_data(
    llm: &dyn StructuredLlm,
    prompts: &PromptSet,
    candidate_id: i64,
    cv_text: &str,
    max_chars: usize,
) -> Result<CandidateProfile, ExtractionError> {
    info!("Extracting CV data for candidate {candidate_id}");

    let char_count = cv_text.chars().count();
    if char_count < MIN_CV_CHARS {
        return Err(ExtractionError::TextTooShort {
            id: candidate_id,
            chars: char_count,
            min: MIN_CV_CHARS,
        });
    }

    let cv_text = if char_count > max_chars {
        warn!("CV text for candidate {candidate_id} truncated to {max_chars} chars");
        truncate_chars(cv_text, max_chars)
    } else {
        cv_text
    };

    let prompt = prompts.render_cv_extraction(cv_text);
    let raw = llm
        .complete_json(&prompt, CV_EXTRACTION_SYSTEM)
        .await
        .map_err(|source| ExtractionError::Llm {
            id: candidate_id,
            source,
        })?;

    let profile = CandidateProfile::from_llm_value(&raw);
    debug!("Cleaned profile for candidate {candidate_id}: {profile:?}");
    Ok(profile)
}
