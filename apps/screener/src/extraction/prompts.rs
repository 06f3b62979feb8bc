// Prompt constants for the extraction agents.
// The templates ship as text files under `prompts/` and are embedded as defaults;
// files in the configured prompts directory override them at runtime.

use std::path::Path;

use tracing::{info, warn};

/// Placeholder replaced with the raw job description text.
pub const JD_PLACEHOLDER: &str = "{job_description_text}";

/// Placeholder replaced with the raw CV text.
pub const CV_PLACEHOLDER: &str = "{cv_text}";

pub const JD_SUMMARY_FILE: &str = "jd_summary_prompt.txt";
pub const CV_EXTRACTION_FILE: &str = "cv_extraction_prompt.txt";

/// System prompt for JD summarization.
pub const JD_SUMMARY_SYSTEM: &str =
    "You are an AI assistant specialized in parsing job descriptions. \
    Respond ONLY with the required JSON object, containing extracted information \
    like skills, experience, education, and responsibilities. No explanations.";

/// System prompt for CV extraction.
pub const CV_EXTRACTION_SYSTEM: &str =
    "You are an AI assistant specialized in parsing CVs/resumes. \
    Respond ONLY with the required JSON object containing extracted professional \
    information like skills, experience, and education. No explanations.";

/// JD summary template. Replace `{job_description_text}` before sending.
pub const JD_SUMMARY_PROMPT_TEMPLATE: &str =
    include_str!("../../../../prompts/jd_summary_prompt.txt");

/// CV extraction template. Replace `{cv_text}` before sending.
pub const CV_EXTRACTION_PROMPT_TEMPLATE: &str =
    include_str!("../../../../prompts/cv_extraction_prompt.txt");

/// The templates in effect for a run.
#[derive(Debug, Clone, PartialEq)]
pub struct PromptSet {
    pub jd_summary: String,
    pub cv_extraction: String,
}

impl Default for PromptSet {
    fn default() -> Self {
        Self {
            jd_summary: JD_SUMMARY_PROMPT_TEMPLATE.to_string(),
            cv_extraction: CV_EXTRACTION_PROMPT_TEMPLATE.to_string(),
        }
    }
}

impl PromptSet {
    /// Loads templates from `dir`, falling back to the built-in ones per file.
    pub fn load(dir: &Path) -> Self {
        Self {
            jd_summary: load_template(dir, JD_SUMMARY_FILE, JD_PLACEHOLDER)
                .unwrap_or_else(|| JD_SUMMARY_PROMPT_TEMPLATE.to_string()),
            cv_extraction: load_template(dir, CV_EXTRACTION_FILE, CV_PLACEHOLDER)
                .unwrap_or_else(|| CV_EXTRACTION_PROMPT_TEMPLATE.to_string()),
        }
    }

    pub fn render_jd_summary(&self, job_description_text: &str) -> String {
        self.jd_summary.replace(JD_PLACEHOLDER, job_description_text)
    }

    pub fn render_cv_extraction(&self, cv_text: &str) -> String {
        self.cv_extraction.replace(CV_PLACEHOLDER, cv_text)
    }
}

fn load_template(dir: &Path, file_name: &str, placeholder: &str) -> Option<String> {
    let path = dir.join(file_name);
    if !path.is_file() {
        info!("{} not found, using built-in template", path.display());
        return None;
    }

    match std::fs::read_to_string(&path) {
        Ok(template) if template.contains(placeholder) => {
            info!("Loaded prompt template from {}", path.display());
            Some(template)
        }
        Ok(_) => {
            warn!(
                "{} does not contain {placeholder}, using built-in template",
                path.display()
            );
            None
        }
        Err(e) => {
            warn!("Failed to read {}: {e}, using built-in template", path.display());
            None
        }
    }
}
