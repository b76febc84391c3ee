use std::sync::Arc;
use tokio::sync::RwLock;

use crate::error::{AppError, Result};
use crate::models::user::User;
use crate::repositories::store::KeyValueStore;

/// Durable storage key for the authentication token.
const TOKEN_KEY: &str = "token";
/// Durable storage key for the cached logged-in user.
const USER_KEY: &str = "user";
/// Durable storage key for the cached user list.
const USERS_KEY: &str = "users";

/// Holds the current session: the authentication token plus cached user and
/// user-list snapshots, persisted through an injected [`KeyValueStore`].
///
/// If the token is absent the session is logged out, regardless of any cached
/// user data; the caches are a display convenience, never a trust source.
#[derive(Clone)]
pub struct SessionStore {
    backend: Arc<dyn KeyValueStore>,
    token: Arc<RwLock<Option<String>>>,
    logged_in_username: Arc<RwLock<Option<String>>>,
}

impl SessionStore {
    /// Creates a new `SessionStore` over the given storage backend.
    pub fn new(backend: Arc<dyn KeyValueStore>) -> Self {
        Self {
            backend,
            token: Arc::new(RwLock::new(None)),
            logged_in_username: Arc::new(RwLock::new(None)),
        }
    }

    /// Persists the token and keeps an in-memory copy. No validation is applied.
    pub async fn save_token(&self, token: &str) -> Result<()> {
        self.backend.set(TOKEN_KEY, token)?;
        *self.token.write().await = Some(token.to_string());
        Ok(())
    }

    /// Returns the in-memory token, if one has been saved or loaded.
    ///
    /// Does not itself read durable storage; call [`SessionStore::load_token`]
    /// first to refresh from disk.
    pub async fn token(&self) -> Option<String> {
        self.token.read().await.clone()
    }

    /// Refreshes the in-memory token from durable storage, if one is present.
    pub async fn load_token(&self) {
        if let Some(token) = self.backend.get(TOKEN_KEY) {
            *self.token.write().await = Some(token);
        }
    }

    /// Caches the logged-in user as an opaque JSON round-trip.
    pub async fn cache_user(&self, user: &User) -> Result<()> {
        let json = sonic_rs::to_string(user)
            .map_err(|e| AppError::Serialization(format!("User serialization failed: {}", e)))?;
        self.backend.set(USER_KEY, &json)
    }

    /// Returns the cached logged-in user, if any.
    pub async fn cached_user(&self) -> Option<User> {
        let json = self.backend.get(USER_KEY)?;
        match sonic_rs::from_str(&json) {
            Ok(user) => Some(user),
            Err(e) => {
                tracing::warn!("Discarding unreadable cached user: {}", e);
                None
            }
        }
    }

    /// Overwrites the cached user list wholesale. Last full fetch wins.
    pub async fn cache_user_list(&self, users: &[User]) -> Result<()> {
        let json = sonic_rs::to_string(users).map_err(|e| {
            AppError::Serialization(format!("User list serialization failed: {}", e))
        })?;
        self.backend.set(USERS_KEY, &json)
    }

    /// Returns the last cached user list, if any.
    pub async fn cached_user_list(&self) -> Option<Vec<User>> {
        let json = self.backend.get(USERS_KEY)?;
        match sonic_rs::from_str(&json) {
            Ok(users) => Some(users),
            Err(e) => {
                tracing::warn!("Discarding unreadable cached user list: {}", e);
                None
            }
        }
    }

    /// Remembers the subject of the current token as the logged-in identity.
    pub async fn remember_username(&self, username: &str) {
        *self.logged_in_username.write().await = Some(username.to_string());
    }

    /// Returns the identity remembered by the last successful login check.
    pub async fn logged_in_username(&self) -> Option<String> {
        self.logged_in_username.read().await.clone()
    }

    /// Removes token, cached user and cached user list from durable storage
    /// and resets the in-memory fields.
    pub async fn clear(&self) -> Result<()> {
        self.backend.remove(TOKEN_KEY)?;
        self.backend.remove(USER_KEY)?;
        self.backend.remove(USERS_KEY)?;
        *self.token.write().await = None;
        *self.logged_in_username.write().await = None;
        Ok(())
    }
}
