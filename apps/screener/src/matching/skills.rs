//! Skill component: required, preferred, domain and soft skills with synonym expansion.

use std::collections::BTreeSet;

use tracing::debug;

use crate::extraction::{CandidateProfile, JobSummary};

/// Broad categories and the concrete skills that satisfy them.
const SKILL_SYNONYMS: &[(&str, &[&str])] = &[
    (
        "databases",
        &["sql", "mysql", "postgresql", "nosql", "database management", "database"],
    ),
    (
        "web development",
        &[
            "html", "css", "javascript", "react", "angular", "vue", "node.js", "django", "flask",
            "spring boot", "web dev", "frontend", "backend",
        ],
    ),
    (
        "cloud",
        &["aws", "azure", "gcp", "google cloud", "amazon web services", "cloud computing"],
    ),
    (
        "machine learning",
        &["ml", "deep learning", "tensorflow", "pytorch", "scikit-learn", "ai"],
    ),
    (
        "artificial intelligence",
        &["ai", "ml", "deep learning", "nlp", "computer vision"],
    ),
    (
        "cybersecurity",
        &[
            "security", "network security", "penetration testing", "pen testing",
            "risk assessment", "vulnerability assessment", "infosec",
        ],
    ),
    ("python", &["python3"]),
    ("java", &["java se", "java ee"]),
];

const REQUIRED_WEIGHT: f64 = 0.60;
const PREFERRED_WEIGHT: f64 = 0.10;
const DOMAIN_WEIGHT: f64 = 0.15;
const SOFT_WEIGHT: f64 = 0.15;

const NEUTRAL: f64 = 0.5;

/// Adds category members for every category in `skills`, and the category of
/// every member in `skills`.
pub fn expand_skills<'a, I>(skills: I) -> BTreeSet<String>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut expanded = BTreeSet::new();
    for skill in skills {
        expanded.insert(skill.to_string());
        for (category, members) in SKILL_SYNONYMS {
            if *category == skill {
                expanded.extend(members.iter().map(|m| m.to_string()));
            }
            if members.contains(&skill) {
                expanded.insert(category.to_string());
            }
        }
    }
    expanded
}

/// Fraction of `wanted` entries whose expansion hits `pool`.
fn expanded_fraction(wanted: &[String], pool: &BTreeSet<&str>) -> Option<f64> {
    let raw: BTreeSet<&str> = wanted.iter().map(String::as_str).collect();
    if raw.is_empty() {
        return None;
    }
    let hits = raw
        .iter()
        .filter(|skill| {
            expand_skills([**skill])
                .iter()
                .any(|candidate| pool.contains(candidate.as_str()))
        })
        .count();
    Some(hits as f64 / raw.len() as f64)
}

fn exact_fraction(wanted: &[String], pool: &BTreeSet<&str>) -> Option<f64> {
    let raw: BTreeSet<&str> = wanted.iter().map(String::as_str).collect();
    if raw.is_empty() {
        return None;
    }
    let hits = raw.iter().filter(|skill| pool.contains(*skill)).count();
    Some(hits as f64 / raw.len() as f64)
}

/// Weighted skill score in [0, 1], normalised over the categories the JD lists.
pub fn skill_match(job: &JobSummary, candidate: &CandidateProfile) -> f64 {
    let cv_domain: BTreeSet<&str> = candidate.domain_expertise.iter().map(String::as_str).collect();
    let cv_soft: BTreeSet<&str> = candidate.soft_skills.iter().map(String::as_str).collect();
    let cv_all: BTreeSet<&str> = candidate
        .skills
        .iter()
        .map(String::as_str)
        .chain(cv_domain.iter().copied())
        .chain(cv_soft.iter().copied())
        .collect();

    let components = [
        ("required", expanded_fraction(&job.required_skills, &cv_all), REQUIRED_WEIGHT),
        ("preferred", expanded_fraction(&job.preferred_skills, &cv_all), PREFERRED_WEIGHT),
        ("domain", expanded_fraction(&job.domain_expertise, &cv_domain), DOMAIN_WEIGHT),
        ("soft", exact_fraction(&job.soft_skills, &cv_soft), SOFT_WEIGHT),
    ];

    let mut weighted = 0.0;
    let mut total_weight = 0.0;
    for (label, score, weight) in components {
        match score {
            Some(score) => {
                debug!("  {label} skills match: {score:.3}");
                weighted += score * weight;
                total_weight += weight;
            }
            None => debug!("  {label} skills: none listed in JD"),
        }
    }

    if total_weight == 0.0 {
        return NEUTRAL;
    }
    weighted / total_weight
}
