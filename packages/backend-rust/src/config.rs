use std::path::PathBuf;

use lexis_algo::ElapsedPolicy;
use thiserror::Error;

const DEFAULT_PRACTICE_QUEUE_LIMIT: usize = 20;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {key}: {value}")]
    Invalid { key: &'static str, value: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoringConfig {
    pub elapsed_policy: ElapsedPolicy,
    pub practice_queue_limit: usize,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            elapsed_policy: ElapsedPolicy::ClampToZero,
            practice_queue_limit: DEFAULT_PRACTICE_QUEUE_LIMIT,
        }
    }
}

impl ScoringConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let elapsed_policy = match std::env::var("SCORING_ELAPSED_POLICY") {
            Ok(raw) => ElapsedPolicy::parse(&raw).ok_or(ConfigError::Invalid {
                key: "SCORING_ELAPSED_POLICY",
                value: raw,
            })?,
            Err(_) => ElapsedPolicy::default(),
        };

        let practice_queue_limit = std::env::var("PRACTICE_QUEUE_LIMIT")
            .ok()
            .and_then(|value| value.parse::<usize>().ok())
            .filter(|limit| *limit > 0)
            .unwrap_or(DEFAULT_PRACTICE_QUEUE_LIMIT);

        Ok(Self {
            elapsed_policy,
            practice_queue_limit,
        })
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub log_level: String,
    pub file_logs: bool,
    pub log_dir: PathBuf,
    pub scoring: ScoringConfig,
}

impl Config {
    /// Read the configuration from the environment, after loading a `.env`
    /// file if one is found. Variables already set in the process win.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let log_level = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());

        let file_logs = std::env::var("ENABLE_FILE_LOGS")
            .map(|v| v == "true" || v == "1")
            .unwrap_or(false);

        let log_dir = std::env::var("LOG_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("./logs"));

        Ok(Self {
            log_level,
            file_logs,
            log_dir,
            scoring: ScoringConfig::from_env()?,
        })
    }
}
