use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use serde::Deserialize;

use crate::llm_client::{LlmProvider, LlmSettings};
use crate::matching::MatchWeights;
use crate::scheduler::Branding;

/// Application configuration loaded from `config.yaml`.
/// `LLM_API_KEY` and `RUST_LOG` are read from the environment (or `.env`).
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub llm_provider: LlmProvider,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default)]
    pub api_base_url: Option<String>,
    #[serde(alias = "ollama_model")]
    pub model: String,

    pub database_path: PathBuf,
    pub shortlisting_threshold: f64,
    pub cv_directory: PathBuf,
    pub jd_csv_path: PathBuf,

    #[serde(default)]
    pub matching_weights: MatchWeights,
    #[serde(default = "default_prompts_dir")]
    pub prompts_dir: PathBuf,
    #[serde(default = "default_max_cv_chars")]
    pub max_cv_chars: usize,
    #[serde(default = "default_max_json_attempts")]
    pub max_json_attempts: u32,
    /// Pause between consecutive LLM calls during pipeline runs.
    #[serde(default = "default_request_delay_ms")]
    pub request_delay_ms: u64,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_company_name")]
    pub company_name: String,
    #[serde(default = "default_hiring_team")]
    pub hiring_team: String,

    #[serde(skip, default = "default_rust_log")]
    pub rust_log: String,
}

fn default_prompts_dir() -> PathBuf {
    PathBuf::from("prompts")
}

fn default_max_cv_chars() -> usize {
    crate::extraction::cv_extractor::DEFAULT_MAX_CV_CHARS
}

fn default_max_json_attempts() -> u32 {
    2
}

fn default_request_delay_ms() -> u64 {
    500
}

fn default_port() -> u16 {
    8080
}

fn default_company_name() -> String {
    "Our Company".to_string()
}

fn default_hiring_team() -> String {
    "Hiring Team".to_string()
}

fn default_rust_log() -> String {
    "info".to_string()
}

impl Config {
    /// Loads `path`, then applies environment overrides.
    pub fn load(path: &Path) -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file '{}'", path.display()))?;
        let mut config = Self::from_yaml_str(&raw)
            .with_context(|| format!("Invalid config file '{}'", path.display()))?;

        if let Ok(key) = std::env::var("LLM_API_KEY") {
            if !key.trim().is_empty() {
                config.api_key = Some(key);
            }
        }
        if let Ok(level) = std::env::var("RUST_LOG") {
            config.rust_log = level;
        }

        Ok(config)
    }

    pub fn from_yaml_str(raw: &str) -> Result<Self> {
        let config: Config = serde_yaml::from_str(raw).context("Malformed YAML configuration")?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.model.trim().is_empty() {
            bail!("'model' must not be empty");
        }
        if !(0.0..=1.0).contains(&self.shortlisting_threshold) {
            bail!(
                "'shortlisting_threshold' must be between 0 and 1, got {}",
                self.shortlisting_threshold
            );
        }
        if self.max_json_attempts == 0 {
            bail!("'max_json_attempts' must be at least 1");
        }
        if self.max_cv_chars < crate::extraction::cv_extractor::MIN_CV_CHARS {
            bail!("'max_cv_chars' is smaller than the minimum usable CV length");
        }
        self.matching_weights
            .validate()
            .context("Invalid 'matching_weights'")?;
        Ok(())
    }

    pub fn llm_settings(&self) -> LlmSettings {
        LlmSettings {
            provider: self.llm_provider,
            model: self.model.clone(),
            api_key: self.api_key.clone(),
            api_base_url: self.api_base_url.clone(),
            max_json_attempts: self.max_json_attempts,
        }
    }

    pub fn branding(&self) -> Branding {
        Branding {
            company_name: self.company_name.clone(),
            hiring_team: self.hiring_team.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"
ollama_model: "llama3"
database_path: "data/screening.db"
shortlisting_threshold: 0.7
cv_directory: "data/cvs"
jd_csv_path: "data/job_description.csv"
"#;

    #[test]
    fn test_minimal_config_gets_defaults() {
        let config = Config::from_yaml_str(MINIMAL).unwrap();
        assert_eq!(config.model, "llama3");
        assert_eq!(config.llm_provider, LlmProvider::Ollama);
        assert_eq!(config.api_key, None);
        assert_eq!(config.prompts_dir, PathBuf::from("prompts"));
        assert_eq!(config.max_cv_chars, 15_000);
        assert_eq!(config.max_json_attempts, 2);
        assert_eq!(config.port, 8080);
        assert_eq!(config.matching_weights, MatchWeights::default());
        assert_eq!(config.rust_log, "info");
    }

    #[test]
    fn test_cloud_provider_and_partial_weights() {
        let raw = format!(
            "{MINIMAL}llm_provider: openai\napi_base_url: http://localhost:8000/v1\n\
             matching_weights:\n  skills: 0.7\n  requirements: 0.0\n"
        );
        let config = Config::from_yaml_str(&raw).unwrap();
        assert_eq!(config.llm_provider, LlmProvider::OpenAi);
        assert_eq!(config.matching_weights.skills, 0.7);
        assert_eq!(config.matching_weights.experience, 0.25);
        assert_eq!(config.matching_weights.requirements, 0.0);

        let settings = config.llm_settings();
        assert_eq!(settings.endpoint(), "http://localhost:8000/v1/chat/completions");
    }

    #[test]
    fn test_missing_required_key_is_rejected() {
        let raw = MINIMAL.replace("cv_directory: \"data/cvs\"\n", "");
        let err = Config::from_yaml_str(&raw).unwrap_err();
        assert!(format!("{err:#}").contains("cv_directory"));
    }

    #[test]
    fn test_threshold_out_of_range_is_rejected() {
        let raw = MINIMAL.replace("0.7", "1.5");
        assert!(Config::from_yaml_str(&raw).is_err());
    }

    #[test]
    fn test_load_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, MINIMAL).unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.database_path, PathBuf::from("data/screening.db"));
    }

    #[test]
    fn test_load_missing_file_names_path() {
        let err = Config::load(Path::new("/no/such/config.yaml")).unwrap_err();
        assert!(err.to_string().contains("/no/such/config.yaml"));
    }
}
