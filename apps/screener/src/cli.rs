use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use sqlx::SqlitePool;
use tracing::{info, warn};

use crate::config::Config;
use crate::db::jobs;
use crate::inspect::{inspect, missing_shortlisted_candidates};
use crate::pipeline::Pipeline;
use crate::scheduler::generate_interview_requests;
use crate::shortlist::{shortlist_candidates_for_jd, stored_shortlist};

#[derive(Debug, Parser)]
#[command(name = "screener", version)]
#[command(about = "Screen CVs against job descriptions with an LLM")]
pub struct Cli {
    /// Path to the YAML configuration file
    #[arg(long, short, global = true, default_value = "config.yaml", env = "SCREENER_CONFIG")]
    pub config: PathBuf,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Ingest and extract JDs and CVs, then match and shortlist
    Run {
        /// Re-extract records that already have data
        #[arg(long)]
        force: bool,
    },
    /// Read the JD CSV and summarize new job descriptions
    IngestJobs {
        #[arg(long)]
        force: bool,
    },
    /// Read the CV directory and extract new candidates
    IngestCvs {
        #[arg(long)]
        force: bool,
    },
    /// Score every JD against every candidate and shortlist
    Match,
    /// Re-apply the threshold to one JD and print its shortlist
    Shortlist {
        #[arg(long)]
        jd: i64,
    },
    /// Print interview request emails for one JD's shortlist
    Emails {
        #[arg(long)]
        jd: i64,
    },
    /// Print record counts and samples
    Inspect,
    /// List shortlisted candidate ids that have no candidate record
    CheckMissing,
    /// Serve the JSON API
    Serve {
        /// Overrides `port` from the config file
        #[arg(long)]
        port: Option<u16>,
    },
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

async fn ensure_job_exists(pool: &SqlitePool, jd_id: i64) -> Result<()> {
    if jobs::get_job(pool, jd_id).await?.is_none() {
        bail!("Job description {jd_id} not found");
    }
    Ok(())
}

/// Runs every command except `serve`, which the binary handles itself.
pub async fn execute(command: Command, pool: SqlitePool, config: Arc<Config>) -> Result<()> {
    match command {
        Command::Run { force } => {
            let report = Pipeline::from_config(pool, config)?.run(force).await?;
            print_json(&report)
        }
        Command::IngestJobs { force } => {
            let report = Pipeline::from_config(pool, config)?
                .process_job_descriptions(force)
                .await?;
            print_json(&report)
        }
        Command::IngestCvs { force } => {
            let report = Pipeline::from_config(pool, config)?.process_cvs(force).await?;
            print_json(&report)
        }
        Command::Match => {
            let report = Pipeline::for_matching(pool, config)
                .run_matching_and_shortlisting()
                .await?;
            print_json(&report)
        }
        Command::Shortlist { jd } => {
            ensure_job_exists(&pool, jd).await?;
            let shortlist =
                shortlist_candidates_for_jd(&pool, jd, config.shortlisting_threshold).await?;
            print_json(&shortlist)
        }
        Command::Emails { jd } => {
            let shortlist = stored_shortlist(&pool, jd).await?;
            if shortlist.is_empty() {
                warn!("No shortlisted candidates for JD {jd}");
            }
            let emails =
                generate_interview_requests(&pool, jd, &shortlist, &config.branding()).await?;
            print_json(&emails)
        }
        Command::Inspect => {
            let report = inspect(&pool, config.shortlisting_threshold).await?;
            print_json(&report)
        }
        Command::CheckMissing => {
            let missing = missing_shortlisted_candidates(&pool).await?;
            if missing.is_empty() {
                info!("All shortlisted candidate ids exist in the candidates table");
            } else {
                warn!("Shortlisted candidates without a record: {missing:?}");
            }
            print_json(&missing)
        }
        Command::Serve { .. } => bail!("serve is handled by the binary entry point"),
    }
}
