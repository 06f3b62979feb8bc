//! JD Summarizer: turns a raw job description into a structured `JobSummary`.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info};

use crate::extraction::clean::{optional_text, string_list, Case, Items};
use crate::extraction::prompts::{PromptSet, JD_SUMMARY_SYSTEM};
use crate::extraction::ExtractionError;
use crate::llm_client::StructuredLlm;

/// Structured hiring requirements extracted from one job posting.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct JobSummary {
    pub required_skills: Vec<String>,
    pub preferred_skills: Vec<String>,
    pub domain_expertise: Vec<String>,
    pub soft_skills: Vec<String>,
    /// Lowercased; `None` when the posting does not state it.
    pub required_education: Option<String>,
    /// Kept as text ("3-5 years"); matching reads the first number.
    pub required_experience_years: Option<String>,
    pub essential_requirements: Vec<String>,
    pub key_responsibilities: Vec<String>,
}

impl JobSummary {
    /// Normalises a raw model reply. Never fails: unusable fields become empty.
    pub fn from_llm_value(value: &Value) -> Self {
        Self {
            required_skills: string_list(
                value.get("required_skills"),
                Items::StringsAndNumbers,
                Case::Lower,
            ),
            preferred_skills: string_list(
                value.get("preferred_skills"),
                Items::StringsAndNumbers,
                Case::Lower,
            ),
            domain_expertise: string_list(
                value.get("domain_expertise"),
                Items::Strings,
                Case::Lower,
            ),
            soft_skills: string_list(value.get("soft_skills"), Items::Strings, Case::Lower),
            required_education: optional_text(value.get("required_education"), Case::Lower),
            required_experience_years: optional_text(
                value.get("required_experience_years"),
                Case::Keep,
            ),
            essential_requirements: string_list(
                value.get("essential_requirements"),
                Items::Strings,
                Case::Lower,
            ),
            key_responsibilities: string_list(
                value.get("key_responsibilities"),
                Items::Strings,
                Case::Keep,
            ),
        }
    }

    /// True when the JD lists no skill category at all.
    pub fn has_no_skills(&self) -> bool {
        self.required_skills.is_empty()
            && self.preferred_skills.is_empty()
            && self.domain_expertise.is_empty()
            && self.soft_skills.is_empty()
    }
}

/// Summarizes a job description via the LLM and returns the cleaned summary.
pub async fn summarize_job_description(
    llm: &dyn StructuredLlm,
    prompts: &PromptSet,
    jd_id: i64,
    job_description_text: &str,
) -> Result<JobSummary, ExtractionError> {
    info!("Summarizing JD {jd_id}");

    if job_description_text.trim().is_empty() {
        return Err(ExtractionError::EmptyText { id: jd_id });
    }

    let prompt = prompts.render_jd_summary(job_description_text);
    let raw = llm
        .complete_json(&prompt, JD_SUMMARY_SYSTEM)
        .await
        .map_err(|source| ExtractionError::Llm { id: jd_id, source })?;

    let summary = JobSummary::from_llm_value(&raw);
    debug!("Cleaned summary for JD {jd_id}: {summary:?}");
    Ok(summary)
}
