//! Matching: scores a candidate profile against a JD summary.
//!
//! Default: `RuleBasedScorer` (deterministic, no LLM call). The pipeline holds
//! an `Arc<dyn MatchScorer>` so another backend can be dropped in.

pub mod education;
pub mod experience;
pub mod requirements;
pub mod skills;

use anyhow::{bail, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::extraction::{CandidateProfile, JobSummary};

// ────────────────────────────────────────────────────────────────────────────
// Weights and output models
// ────────────────────────────────────────────────────────────────────────────

/// Component weights for the overall score. Missing keys take the defaults.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchWeights {
    pub skills: f64,
    pub experience: f64,
    pub education: f64,
    pub requirements: f64,
}

impl Default for MatchWeights {
    fn default() -> Self {
        Self {
            skills: 0.40,
            experience: 0.25,
            education: 0.25,
            requirements: 0.10,
        }
    }
}

impl MatchWeights {
    pub fn validate(&self) -> Result<()> {
        let all = [self.skills, self.experience, self.education, self.requirements];
        if all.iter().any(|w| !w.is_finite() || *w < 0.0) {
            bail!("weights must be non-negative numbers, got {self:?}");
        }
        if all.iter().sum::<f64>() <= 0.0 {
            bail!("at least one weight must be positive");
        }
        Ok(())
    }
}

/// Per-component scores stored alongside each match.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchDetails {
    pub skills_score: f64,
    pub experience_score: f64,
    pub education_score: f64,
    pub requirements_score: f64,
    pub weights_used: MatchWeights,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MatchOutcome {
    /// Overall score in [0, 1].
    pub score: f64,
    pub details: MatchDetails,
}

pub fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}

// ────────────────────────────────────────────────────────────────────────────
// Trait definition
// ────────────────────────────────────────────────────────────────────────────

#[async_trait]
pub trait MatchScorer: Send + Sync {
    async fn score(&self, job: &JobSummary, candidate: &CandidateProfile) -> MatchOutcome;
}

// ────────────────────────────────────────────────────────────────────────────
// RuleBasedScorer (default implementation)
// ────────────────────────────────────────────────────────────────────────────

/// Weighted sum of four deterministic components:
/// skills (with synonym expansion), experience years, degree level and
/// essential requirements.
pub struct RuleBasedScorer {
    weights: MatchWeights,
}

impl RuleBasedScorer {
    pub fn new(weights: MatchWeights) -> Self {
        Self { weights }
    }

    pub fn compute(&self, job: &JobSummary, candidate: &CandidateProfile) -> MatchOutcome {
        let skills_score = skills::skill_match(job, candidate);
        let experience_score = experience::experience_match(
            job.required_experience_years.as_deref(),
            candidate.total_experience_years,
        );
        let education_score =
            education::education_match(job.required_education.as_deref(), &candidate.education);
        let requirements_score = requirements::essential_requirements_match(job, candidate);

        let w = self.weights;
        let total = skills_score * w.skills
            + experience_score * w.experience
            + education_score * w.education
            + requirements_score * w.requirements;
        let score = total.clamp(0.0, 1.0);

        debug!(
            "Components: skills {skills_score:.3}, experience {experience_score:.3}, \
             education {education_score:.3}, requirements {requirements_score:.3} -> {score:.3}"
        );

        MatchOutcome {
            score,
            details: MatchDetails {
                skills_score: round3(skills_score),
                experience_score: round3(experience_score),
                education_score: round3(education_score),
                requirements_score: round3(requirements_score),
                weights_used: w,
            },
        }
    }
}

impl Default for RuleBasedScorer {
    fn default() -> Self {
        Self::new(MatchWeights::default())
    }
}

#[async_trait]
impl MatchScorer for RuleBasedScorer {
    async fn score(&self, job: &JobSummary, candidate: &CandidateProfile) -> MatchOutcome {
        self.compute(job, candidate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn data_engineer_jd() -> JobSummary {
        JobSummary {
            required_skills: strings(&["python", "sql"]),
            required_education: Some("bachelor's degree".into()),
            required_experience_years: Some("3+ years".into()),
            essential_requirements: strings(&["aws certified developer"]),
            ..Default::default()
        }
    }

    #[test]
    fn test_perfect_candidate_scores_one() {
        let candidate = CandidateProfile {
            skills: strings(&["python", "sql"]),
            education: strings(&["MSc Computer Science"]),
            total_experience_years: Some(6.0),
            certifications: strings(&["aws certified developer"]),
            ..Default::default()
        };
        let outcome = RuleBasedScorer::default().compute(&data_engineer_jd(), &candidate);
        assert!((outcome.score - 1.0).abs() < 1e-9);
        assert_eq!(outcome.details.weights_used, MatchWeights::default());
    }

    #[test]
    fn test_empty_candidate_scores_zero() {
        let outcome =
            RuleBasedScorer::default().compute(&data_engineer_jd(), &CandidateProfile::default());
        assert_eq!(outcome.score, 0.0);
    }

    #[test]
    fn test_components_are_weighted_and_rounded() {
        let candidate = CandidateProfile {
            skills: strings(&["python"]),
            education: strings(&["BSc"]),
            total_experience_years: Some(2.0),
            ..Default::default()
        };
        let outcome = RuleBasedScorer::default().compute(&data_engineer_jd(), &candidate);
        assert_eq!(outcome.details.skills_score, 0.5);
        assert_eq!(outcome.details.experience_score, 0.667);
        assert_eq!(outcome.details.education_score, 1.0);
        assert_eq!(outcome.details.requirements_score, 0.0);
        // .5*.4 + (2/3)*.25 + 1*.25 + 0*.1
        assert!((outcome.score - (0.2 + 2.0 / 12.0 + 0.25)).abs() < 1e-9);
    }

    #[test]
    fn test_score_is_clamped_with_oversized_weights() {
        let weights = MatchWeights {
            skills: 1.0,
            experience: 1.0,
            education: 1.0,
            requirements: 1.0,
        };
        let outcome = RuleBasedScorer::new(weights)
            .compute(&JobSummary::default(), &CandidateProfile::default());
        assert!(outcome.score <= 1.0);
    }

    #[test]
    fn test_weights_validation() {
        assert!(MatchWeights::default().validate().is_ok());
        let negative = MatchWeights {
            skills: -0.1,
            ..Default::default()
        };
        assert!(negative.validate().is_err());
        let zero = MatchWeights {
            skills: 0.0,
            experience: 0.0,
            education: 0.0,
            requirements: 0.0,
        };
        assert!(zero.validate().is_err());
    }

    #[tokio::test]
    async fn test_trait_object_delegates_to_compute() {
        let scorer: std::sync::Arc<dyn MatchScorer> =
            std::sync::Arc::new(RuleBasedScorer::default());
        let outcome = scorer
            .score(&JobSummary::default(), &CandidateProfile::default())
            .await;
        // skills .5, experience 0, education .5, requirements 1
        assert!((outcome.score - (0.2 + 0.125 + 0.1)).abs() < 1e-9);
    }
}
