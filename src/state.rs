use std::sync::Arc;
use std::time::Duration;

use crate::config::Config;
use crate::error::Result;
use crate::repositories::session::SessionStore;
use crate::repositories::store::FileStore;

/// The client's shared state.
#[derive(Clone)]
pub struct AppState {
    /// The HTTP client all requests go out through.
    pub http: reqwest::Client,
    /// The client's configuration.
    pub config: Config,
    /// The session store.
    pub store: SessionStore,
}

impl AppState {
    /// Creates a new `AppState` with a file-backed session store.
    ///
    /// # Arguments
    ///
    /// * `config` - The client's configuration.
    ///
    /// # Returns
    ///
    /// A `Result` containing the `AppState`.
    pub fn new(config: &Config) -> Result<Self> {
        let backend = FileStore::new(&config.storage_dir)?;
        let store = SessionStore::new(Arc::new(backend));
        tracing::info!(
            "✅ Session store initialized at {}",
            config.storage_dir.display()
        );

        Self::with_store(config, store)
    }

    /// Creates a new `AppState` over an already-built session store.
    ///
    /// Used by tests to inject an in-memory store.
    ///
    /// # Arguments
    ///
    /// * `config` - The client's configuration.
    /// * `store` - The session store to use.
    ///
    /// # Returns
    ///
    /// A `Result` containing the `AppState`.
    pub fn with_store(config: &Config, store: SessionStore) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;
        tracing::info!("✅ HTTP client initialized");

        Ok(AppState {
            http,
            config: config.clone(),
            store,
        })
    }

    /// Builds the absolute URL for an API path.
    pub(crate) fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.api_base_url, path)
    }
}
