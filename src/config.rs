use std::env;
use std::path::PathBuf;
use anyhow::{Context, Result};

/// The client's configuration.
#[derive(Clone, Debug)]
pub struct Config {
    /// Base URL of the user-management API, without a trailing slash.
    pub api_base_url: String,
    /// Directory where session state is persisted between runs.
    pub storage_dir: PathBuf,
    /// Per-request timeout in seconds.
    pub request_timeout_secs: u64,
}

impl Config {
    /// Creates a new `Config` from environment variables.
    ///
    /// Reads a `.env` file first if one is present.
    ///
    /// # Returns
    ///
    /// A `Result` containing the `Config`.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let api_base_url = env::var("API_BASE_URL")
            .context("API_BASE_URL must be set (e.g. http://localhost:8081)")?
            .trim_end_matches('/')
            .to_string();

        Ok(Self {
            api_base_url,
            storage_dir: env::var("SESSION_STORAGE_DIR")
                .unwrap_or_else(|_| ".roster".to_string())
                .into(),
            request_timeout_secs: env::var("REQUEST_TIMEOUT_SECS")
                .unwrap_or_else(|_| "30".to_string())
                .parse()
                .context("Invalid REQUEST_TIMEOUT_SECS")?,
        })
    }
}
