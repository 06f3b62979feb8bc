use std::collections::BTreeSet;

use tracing::debug;

use crate::extraction::{CandidateProfile, JobSummary};

/// Fraction of the JD's essential requirements the candidate meets.
/// A requirement is met by a skill or certification, or by appearing in the education text.
pub fn essential_requirements_match(job: &JobSummary, candidate: &CandidateProfile) -> f64 {
    let required: BTreeSet<String> = job
        .essential_requirements
        .iter()
        .map(|r| r.to_lowercase())
        .collect();
    if required.is_empty() {
        return 1.0;
    }

    let qualifications: BTreeSet<&str> = candidate
        .skills
        .iter()
        .chain(&candidate.certifications)
        .map(String::as_str)
        .collect();
    let education_text = candidate
        .education
        .iter()
        .map(|e| e.to_lowercase())
        .collect::<Vec<_>>()
        .join(" ");

    let met = required
        .iter()
        .filter(|req| {
            let hit =
                qualifications.contains(req.as_str()) || education_text.contains(req.as_str());
            debug!("  Requirement '{req}' met: {hit}");
            hit
        })
        .count();

    met as f64 / required.len() as f64
}
