//! Interview scheduler: drafts interview request emails for shortlisted candidates.

use serde::Serialize;
use sqlx::SqlitePool;
use thiserror::Error;
use tracing::{info, warn};

use crate::db::{candidates, jobs};
use crate::shortlist::ShortlistedCandidate;

const EMAIL_BODY_TEMPLATE: &str = "Dear {candidate_name},

Thank you for your interest in the {job_title} position at {company}.

Your qualifications and experience align well with what we are looking for, and we would like to invite you for an initial interview to discuss your background and the role further.

Please let us know your availability over the next few business days for a brief 30-minute call. We can be flexible with timing.

We look forward to hearing from you soon.

Best regards,

{hiring_team}
{company}
";

/// Sender details filled into every email.
#[derive(Debug, Clone, PartialEq)]
pub struct Branding {
    pub company_name: String,
    pub hiring_team: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InterviewEmail {
    pub candidate_id: i64,
    pub cv_filename: String,
    pub email_subject: String,
    pub email_body: String,
}

#[derive(Debug, Error)]
pub enum SchedulerError {
    #[error("Job description {0} not found")]
    JobNotFound(i64),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

pub fn render_email(
    candidate_name: &str,
    job_title: &str,
    branding: &Branding,
) -> (String, String) {
    let subject = format!(
        "Interview Request: {job_title} at {}",
        branding.company_name
    );
    let body = EMAIL_BODY_TEMPLATE
        .replace("{candidate_name}", candidate_name)
        .replace("{job_title}", job_title)
        .replace("{hiring_team}", &branding.hiring_team)
        .replace("{company}", &branding.company_name);
    (subject, body)
}

/// Drafts one email per shortlisted candidate. Candidates whose row is gone are skipped.
pub async fn generate_interview_requests(
    pool: &SqlitePool,
    jd_id: i64,
    shortlisted: &[ShortlistedCandidate],
    branding: &Branding,
) -> Result<Vec<InterviewEmail>, SchedulerError> {
    let job = jobs::get_job(pool, jd_id)
        .await?
        .ok_or(SchedulerError::JobNotFound(jd_id))?;

    let mut emails = Vec::with_capacity(shortlisted.len());
    for entry in shortlisted {
        let Some(candidate) = candidates::get_candidate(pool, entry.candidate_id).await? else {
            warn!(
                "Skipping email for candidate {}: row not found",
                entry.candidate_id
            );
            continue;
        };

        let (email_subject, email_body) =
            render_email(&candidate.display_name(), &job.title, branding);
        emails.push(InterviewEmail {
            candidate_id: candidate.candidate_id,
            cv_filename: candidate.cv_filename,
            email_subject,
            email_body,
        });
    }

    info!("Generated {} interview request(s) for JD {jd_id}", emails.len());
    Ok(emails)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_pool;
    use crate::extraction::CandidateProfile;

    fn branding() -> Branding {
        Branding {
            company_name: "Acme".into(),
            hiring_team: "Acme Talent Team".into(),
        }
    }

    fn entry(candidate_id: i64) -> ShortlistedCandidate {
        ShortlistedCandidate {
            candidate_id,
            cv_filename: None,
            match_score: 0.9,
        }
    }

    #[test]
    fn test_render_email_fills_every_placeholder() {
        let (subject, body) = render_email("Jane Doe", "Data Engineer", &branding());
        assert_eq!(subject, "Interview Request: Data Engineer at Acme");
        assert!(body.starts_with("Dear Jane Doe,"));
        assert!(body.contains("the Data Engineer position at Acme."));
        assert!(body.trim_end().ends_with("Acme Talent Team\nAcme"));
        assert!(!body.contains('{'));
    }

    #[tokio::test]
    async fn test_generate_uses_names_and_skips_missing_rows() {
        let pool = test_pool().await;
        let jd = jobs::upsert_job(&pool, "Data Engineer", "desc").await.unwrap();
        let jane = candidates::upsert_candidate(&pool, "jane.pdf", "cv").await.unwrap();
        let anon = candidates::upsert_candidate(&pool, "anon.pdf", "cv").await.unwrap();
        candidates::update_candidate_profile(
            &pool,
            jane,
            &CandidateProfile {
                name: Some("Jane Doe".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        let emails = generate_interview_requests(
            &pool,
            jd,
            &[entry(jane), entry(999), entry(anon)],
            &branding(),
        )
        .await
        .unwrap();

        assert_eq!(emails.len(), 2);
        assert_eq!(emails[0].cv_filename, "jane.pdf");
        assert!(emails[0].email_body.starts_with("Dear Jane Doe,"));
        assert!(emails[1].email_body.starts_with("Dear Candidate,"));
    }

    #[tokio::test]
    async fn test_orphaned_shortlist_entry_is_skipped() {
        use crate::db::matches;
        use crate::matching::{MatchDetails, MatchWeights};
        use crate::shortlist::{shortlist_candidates_for_jd, stored_shortlist};

        let pool = test_pool().await;
        let jd = jobs::upsert_job(&pool, "Data Engineer", "desc").await.unwrap();
        let kept = candidates::upsert_candidate(&pool, "kept.pdf", "cv").await.unwrap();
        let gone = candidates::upsert_candidate(&pool, "gone.pdf", "cv").await.unwrap();
        let details = MatchDetails {
            skills_score: 1.0,
            experience_score: 1.0,
            education_score: 1.0,
            requirements_score: 1.0,
            weights_used: MatchWeights::default(),
        };
        matches::upsert_match(&pool, jd, kept, 0.8, &details).await.unwrap();
        matches::upsert_match(&pool, jd, gone, 0.9, &details).await.unwrap();
        shortlist_candidates_for_jd(&pool, jd, 0.5).await.unwrap();

        // Candidate row removed outside the application.
        sqlx::query("PRAGMA foreign_keys = OFF").execute(&pool).await.unwrap();
        sqlx::query("DELETE FROM candidates WHERE candidate_id = ?")
            .bind(gone)
            .execute(&pool)
            .await
            .unwrap();

        let shortlist = stored_shortlist(&pool, jd).await.unwrap();
        assert_eq!(shortlist.len(), 2);
        assert_eq!(shortlist[0].candidate_id, gone);
        assert_eq!(shortlist[0].cv_filename, None);

        let emails = generate_interview_requests(&pool, jd, &shortlist, &branding())
            .await
            .unwrap();
        assert_eq!(emails.len(), 1);
        assert_eq!(emails[0].candidate_id, kept);
    }

    #[tokio::test]
    async fn test_unknown_job_is_an_error() {
        let pool = test_pool().await;
        let err = generate_interview_requests(&pool, 7, &[], &branding())
            .await
            .unwrap_err();
        assert!(matches!(err, SchedulerError::JobNotFound(7)));
    }
}
