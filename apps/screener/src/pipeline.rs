//! Pipeline: runs ingest, extraction, matching and shortlisting in order.
//!
//! Every stage works record by record: a failure is logged, counted, and the
//! run moves on to the next record.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use serde::Serialize;
use sqlx::SqlitePool;
use tracing::{error, info, warn};

use crate::config::Config;
use crate::db::{candidates, jobs, matches};
use crate::extraction::cv_extractor::MIN_CV_CHARS;
use crate::extraction::prompts::PromptSet;
use crate::extraction::{extract_cv_data, summarize_job_description, CandidateProfile};
use crate::ingest::{extract_cv_text, list_cv_files, read_job_descriptions};
use crate::llm_client::{LlmClient, StructuredLlm};
use crate::matching::{MatchScorer, RuleBasedScorer};
use crate::shortlist::shortlist_candidates_for_jd;

/// Counts for one ingest + extraction stage.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StageReport {
    /// Rows inserted or found in the database.
    pub ingested: usize,
    /// Records the LLM extracted successfully.
    pub processed: usize,
    /// Inputs rejected before reaching the database (blank or too short).
    pub skipped: usize,
    pub failed: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MatchingReport {
    pub jobs: usize,
    pub candidates: usize,
    pub pairs_scored: usize,
    pub failed: usize,
    pub shortlisted: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RunReport {
    pub job_descriptions: StageReport,
    pub cvs: StageReport,
    pub matching: MatchingReport,
    /// Stages that could not run at all, with the reason. Later stages still run.
    pub stage_errors: Vec<String>,
}

pub struct Pipeline {
    pool: SqlitePool,
    /// `None` for matching-only pipelines, which never call the model.
    llm: Option<Arc<dyn StructuredLlm>>,
    scorer: Arc<dyn MatchScorer>,
    prompts: PromptSet,
    config: Arc<Config>,
}

impl Pipeline {
    pub fn new(
        pool: SqlitePool,
        llm: Arc<dyn StructuredLlm>,
        scorer: Arc<dyn MatchScorer>,
        prompts: PromptSet,
        config: Arc<Config>,
    ) -> Self {
        Self {
            pool,
            llm: Some(llm),
            scorer,
            prompts,
            config,
        }
    }

    /// Pipeline for matching and shortlisting only. No LLM client is built,
    /// so no API key or prompt files are needed.
    pub fn for_matching(pool: SqlitePool, config: Arc<Config>) -> Self {
        let scorer = Arc::new(RuleBasedScorer::new(config.matching_weights));
        Self {
            pool,
            llm: None,
            scorer,
            prompts: PromptSet::default(),
            config,
        }
    }

    /// Production wiring: HTTP LLM client, rule-based scorer, prompts from disk.
    pub fn from_config(pool: SqlitePool, config: Arc<Config>) -> Result<Self> {
        let llm = LlmClient::new(config.llm_settings()).context("Failed to build LLM client")?;
        info!(
            "LLM client initialized ({} model {} at {})",
            llm.provider(),
            llm.model(),
            llm.endpoint()
        );
        let scorer = Arc::new(RuleBasedScorer::new(config.matching_weights));
        let prompts = PromptSet::load(&config.prompts_dir);
        Ok(Self::new(pool, Arc::new(llm), scorer, prompts, config))
    }

    fn llm(&self) -> Result<&dyn StructuredLlm> {
        self.llm
            .as_deref()
            .ok_or_else(|| anyhow!("This pipeline was built without an LLM client"))
    }

    async fn pause_between_calls(&self, call_index: usize) {
        if call_index > 0 && self.config.request_delay_ms > 0 {
            tokio::time::sleep(Duration::from_millis(self.config.request_delay_ms)).await;
        }
    }

    // ────────────────────────────────────────────────────────────────────────
    // Job descriptions
    // ────────────────────────────────────────────────────────────────────────

    pub async fn process_job_descriptions(&self, force: bool) -> Result<StageReport> {
        info!("--- Processing job descriptions ---");
        let llm = self.llm()?;
        let mut report = StageReport::default();

        let postings = read_job_descriptions(&self.config.jd_csv_path)
            .context("Failed to read job description CSV")?;

        for posting in &postings {
            if posting.description.trim().is_empty() {
                warn!("Skipping JD '{}': missing description", posting.title);
                report.skipped += 1;
                continue;
            }
            match jobs::upsert_job(&self.pool, &posting.title, &posting.description).await {
                Ok(_) => report.ingested += 1,
                Err(e) => {
                    error!("Failed to store JD '{}': {e}", posting.title);
                    report.failed += 1;
                }
            }
        }

        let pending = jobs::jobs_needing_summary(&self.pool, force).await?;
        info!("{} job description(s) to summarize", pending.len());

        for (index, job) in pending.iter().enumerate() {
            self.pause_between_calls(index).await;
            let text = job.original_description.as_deref().unwrap_or_default();
            let result = summarize_job_description(llm, &self.prompts, job.jd_id, text).await;
            let summary = match result {
                Ok(summary) => summary,
                Err(e) => {
                    error!("{e}");
                    report.failed += 1;
                    continue;
                }
            };
            if summary.has_no_skills() {
                warn!("JD {} summary lists no skills; skill matching will be neutral", job.jd_id);
            }
            match jobs::update_job_summary(&self.pool, job.jd_id, &summary).await {
                Ok(_) => report.processed += 1,
                Err(e) => {
                    error!("Failed to store summary for JD {}: {e}", job.jd_id);
                    report.failed += 1;
                }
            }
        }

        info!("Job descriptions: {report:?}");
        Ok(report)
    }

    // ────────────────────────────────────────────────────────────────────────
    // CVs
    // ────────────────────────────────────────────────────────────────────────

    pub async fn process_cvs(&self, force: bool) -> Result<StageReport> {
        info!("--- Processing candidate CVs ---");
        let llm = self.llm()?;
        let mut report = StageReport::default();

        let files = list_cv_files(&self.config.cv_directory).context("Failed to list CV files")?;

        for path in &files {
            let file_name = path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_default();

            let text = match extract_cv_text(path).await {
                Ok(text) => text,
                Err(e) => {
                    error!("{e}");
                    report.failed += 1;
                    continue;
                }
            };
            if text.trim().chars().count() < MIN_CV_CHARS {
                warn!("Skipping {file_name}: extracted text is empty or too short");
                report.skipped += 1;
                continue;
            }

            match candidates::upsert_candidate(&self.pool, &file_name, &text).await {
                Ok(_) => report.ingested += 1,
                Err(e) => {
                    error!("Failed to store candidate {file_name}: {e}");
                    report.failed += 1;
                }
            }
        }

        let pending = candidates::candidates_needing_extraction(&self.pool, force).await?;
        info!("{} CV(s) to extract", pending.len());

        for (index, candidate) in pending.iter().enumerate() {
            self.pause_between_calls(index).await;
            let text = candidate.cv_text.as_deref().unwrap_or_default();
            let profile = match extract_cv_data(
                llm,
                &self.prompts,
                candidate.candidate_id,
                text,
                self.config.max_cv_chars,
            )
            .await
            {
                Ok(profile) => profile,
                Err(e) => {
                    error!("{e}");
                    report.failed += 1;
                    continue;
                }
            };
            match candidates::update_candidate_profile(&self.pool, candidate.candidate_id, &profile)
                .await
            {
                Ok(_) => report.processed += 1,
                Err(e) => {
                    error!(
                        "Failed to store profile for candidate {}: {e}",
                        candidate.candidate_id
                    );
                    report.failed += 1;
                }
            }
        }

        info!("CVs: {report:?}");
        Ok(report)
    }

    // ────────────────────────────────────────────────────────────────────────
    // Matching and shortlisting
    // ────────────────────────────────────────────────────────────────────────

    pub async fn run_matching_and_shortlisting(&self) -> Result<MatchingReport> {
        info!("--- Matching and shortlisting ---");
        let mut report = MatchingReport::default();

        let job_rows = jobs::summarized_jobs(&self.pool).await?;
        let candidate_rows = candidates::extracted_candidates(&self.pool).await?;

        let mut profiles: Vec<(i64, CandidateProfile)> = Vec::with_capacity(candidate_rows.len());
        for row in &candidate_rows {
            match row.profile() {
                Ok(Some(profile)) => profiles.push((row.candidate_id, profile)),
                Ok(None) => {}
                Err(e) => {
                    error!("Unreadable profile for candidate {}: {e}", row.candidate_id);
                    report.failed += 1;
                }
            }
        }
        report.candidates = profiles.len();

        if job_rows.is_empty() || profiles.is_empty() {
            warn!("No summarized JDs or extracted candidates, nothing to match");
        }

        for job in &job_rows {
            let summary = match job.summary() {
                Ok(Some(summary)) => summary,
                Ok(None) => continue,
                Err(e) => {
                    error!("Unreadable summary for JD {}: {e}", job.jd_id);
                    report.failed += 1;
                    continue;
                }
            };
            report.jobs += 1;

            for (candidate_id, profile) in &profiles {
                let outcome = self.scorer.score(&summary, profile).await;
                match matches::upsert_match(
                    &self.pool,
                    job.jd_id,
                    *candidate_id,
                    outcome.score,
                    &outcome.details,
                )
                .await
                {
                    Ok(()) => report.pairs_scored += 1,
                    Err(e) => {
                        error!(
                            "Failed to store match JD {} / candidate {candidate_id}: {e}",
                            job.jd_id
                        );
                        report.failed += 1;
                    }
                }
            }

            let shortlist = shortlist_candidates_for_jd(
                &self.pool,
                job.jd_id,
                self.config.shortlisting_threshold,
            )
            .await?;
            report.shortlisted += shortlist.len();
        }

        info!("Matching: {report:?}");
        Ok(report)
    }

    /// Runs every stage. A stage that fails as a whole is logged and recorded
    /// in `stage_errors`, and the next stage still runs.
    pub async fn run(&self, force: bool) -> Result<RunReport> {
        let mut report = RunReport::default();

        match self.process_job_descriptions(force).await {
            Ok(stage) => report.job_descriptions = stage,
            Err(e) => {
                error!("Skipping JD processing: {e:#}");
                report.stage_errors.push(format!("job descriptions: {e:#}"));
            }
        }

        match self.process_cvs(force).await {
            Ok(stage) => report.cvs = stage,
            Err(e) => {
                error!("Skipping CV processing: {e:#}");
                report.stage_errors.push(format!("cvs: {e:#}"));
            }
        }

        match self.run_matching_and_shortlisting().await {
            Ok(stage) => report.matching = stage,
            Err(e) => {
                error!("Skipping matching: {e:#}");
                report.stage_errors.push(format!("matching: {e:#}"));
            }
        }

        Ok(report)
    }
}
