//! Configuration module for the DataRepo client.
//!
//! All configuration is loaded from environment variables with sensible defaults.

use std::env;
use std::path::PathBuf;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the DataRepo REST API, without a trailing slash
    pub api_url: String,
    /// Path of the file the session is persisted to across restarts
    pub session_path: PathBuf,
    /// Per-request timeout in seconds
    pub timeout_secs: u64,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let api_url = env::var("DATAREPO_API_URL")
            .unwrap_or_else(|_| "http://localhost:8000/api".to_string());
        let api_url = api_url.trim_end_matches('/').to_string();

        let session_path = env::var("DATAREPO_SESSION_PATH")
            .unwrap_or_else(|_| "./data/session.json".to_string())
            .into();

        let timeout_secs = env::var("DATAREPO_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".to_string())
            .parse()
            .expect("Invalid DATAREPO_TIMEOUT_SECS value");

        let log_level = env::var("DATAREPO_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        Self {
            api_url,
            session_path,
            timeout_secs,
            log_level,
        }
    }
}
