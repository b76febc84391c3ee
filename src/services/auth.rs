use chrono::Utc;

use crate::error::{AppError, Result};
use crate::models::user::{Credentials, RegisterRequest, User};
use crate::state::AppState;
use crate::token;
use crate::validation::auth::*;

/// The response header the backend carries the issued token in.
pub const JWT_TOKEN_HEADER: &str = "Jwt-Token";

/// Logs in against the backend and establishes a session.
///
/// On success the token from the `Jwt-Token` response header and the returned
/// user are persisted through the session store; callers never handle the raw
/// response.
///
/// # Arguments
///
/// * `state` - The client state.
/// * `credentials` - The username and password to authenticate with.
///
/// # Returns
///
/// A `Result` containing the authenticated `User`.
pub async fn login(state: &AppState, credentials: &Credentials) -> Result<User> {
    validate_username(&credentials.username)?;
    validate_password(&credentials.password)?;
    tracing::info!("🔐 Login attempt for: {}", credentials.username);

    let response = state
        .http
        .post(state.url("/user/login"))
        .json(credentials)
        .send()
        .await?;

    if !response.status().is_success() {
        return Err(AppError::from_response(response).await);
    }

    let token = response
        .headers()
        .get(JWT_TOKEN_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string)
        .ok_or_else(|| {
            AppError::Authentication("Login response is missing the Jwt-Token header".to_string())
        })?;

    let user: User = response.json().await?;

    state.store.save_token(&token).await?;
    state.store.cache_user(&user).await?;
    state.store.remember_username(&user.username).await;

    tracing::info!("✅ User logged in: {}", user.username);
    Ok(user)
}

/// Registers a new account.
///
/// The backend generates the initial password and emails it to the new user.
///
/// # Arguments
///
/// * `state` - The client state.
/// * `request` - The new user's details.
///
/// # Returns
///
/// A `Result` containing the created `User`.
pub async fn register(state: &AppState, request: &RegisterRequest) -> Result<User> {
    validate_username(&request.username)?;
    validate_email(&request.email)?;
    tracing::info!("📝 Register attempt for: {}", request.username);

    let response = state
        .http
        .post(state.url("/user/register"))
        .json(request)
        .send()
        .await?;

    if !response.status().is_success() {
        return Err(AppError::from_response(response).await);
    }

    let user: User = response.json().await?;
    tracing::info!("✅ User registered: {}", user.username);
    Ok(user)
}

/// Ends the session, removing all session state from durable storage.
///
/// # Arguments
///
/// * `state` - The client state.
///
/// # Returns
///
/// A `Result<()>`.
pub async fn log_out(state: &AppState) -> Result<()> {
    state.store.clear().await?;
    tracing::info!("👋 Session cleared");
    Ok(())
}

/// Decides whether the session is currently valid.
///
/// Forces a refresh of the token from durable storage, then decodes its
/// claims locally — without verifying the signature, which stays the
/// backend's job. A token with a subject and a future (or absent) expiry is
/// valid; anything else downgrades the session to logged out. Decode
/// failures are logged and never raised to the caller.
///
/// # Arguments
///
/// * `state` - The client state.
///
/// # Returns
///
/// `true` if a valid session is present.
pub async fn is_logged_in(state: &AppState) -> bool {
    state.store.load_token().await;

    let Some(token) = state.store.token().await else {
        clear_session(state).await;
        return false;
    };

    match token::decode_claims(&token) {
        Ok(claims) => {
            let subject = claims.sub.as_deref().filter(|sub| !sub.is_empty());
            if let Some(subject) = subject {
                if !claims.is_expired(Utc::now()) {
                    state.store.remember_username(subject).await;
                    tracing::debug!("✅ Session valid for: {}", subject);
                    return true;
                }
                tracing::debug!("Token expired for: {}", subject);
            } else {
                tracing::debug!("Token has no subject claim");
            }
        }
        Err(e) => {
            tracing::error!("❌ Token decode failed: {}", e);
        }
    }

    clear_session(state).await;
    false
}

/// Clears the session, logging rather than propagating storage failures.
async fn clear_session(state: &AppState) {
    if let Err(e) = log_out(state).await {
        tracing::warn!("❌ Failed to clear session: {}", e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::repositories::session::SessionStore;
    use crate::repositories::store::MemoryStore;
    use base64::{Engine as _, engine::general_purpose};
    use chrono::Duration;
    use std::sync::Arc;

    fn test_state() -> AppState {
        let config = Config {
            api_base_url: "http://127.0.0.1:1".to_string(),
            storage_dir: ".unused".into(),
            request_timeout_secs: 1,
        };
        let store = SessionStore::new(Arc::new(MemoryStore::new()));
        AppState::with_store(&config, store).unwrap()
    }

    fn make_token(payload: &str) -> String {
        let segment = |s: &str| general_purpose::URL_SAFE_NO_PAD.encode(s.as_bytes());
        format!("{}.{}.sig", segment(r#"{"alg":"HS512"}"#), segment(payload))
    }

    #[tokio::test]
    async fn no_token_means_logged_out() {
        let state = test_state();
        assert!(!is_logged_in(&state).await);
    }

    #[tokio::test]
    async fn valid_token_with_future_expiry_is_logged_in() {
        let state = test_state();
        let exp = (Utc::now() + Duration::hours(1)).timestamp();
        let token = make_token(&format!(r#"{{"sub":"jdoe","exp":{}}}"#, exp));
        state.store.save_token(&token).await.unwrap();

        assert!(is_logged_in(&state).await);
        assert_eq!(state.store.logged_in_username().await.as_deref(), Some("jdoe"));
    }

    #[tokio::test]
    async fn token_without_expiry_is_open_ended() {
        let state = test_state();
        state
            .store
            .save_token(&make_token(r#"{"sub":"jdoe"}"#))
            .await
            .unwrap();

        assert!(is_logged_in(&state).await);
    }

    #[tokio::test]
    async fn expired_token_logs_out_and_clears_storage() {
        let state = test_state();
        let exp = (Utc::now() - Duration::hours(1)).timestamp();
        let token = make_token(&format!(r#"{{"sub":"jdoe","exp":{}}}"#, exp));
        state.store.save_token(&token).await.unwrap();

        assert!(!is_logged_in(&state).await);
        assert_eq!(state.store.token().await, None);
    }

    #[tokio::test]
    async fn token_without_subject_logs_out() {
        let state = test_state();
        let exp = (Utc::now() + Duration::hours(1)).timestamp();
        let token = make_token(&format!(r#"{{"exp":{}}}"#, exp));
        state.store.save_token(&token).await.unwrap();

        assert!(!is_logged_in(&state).await);
        assert_eq!(state.store.token().await, None);
    }

    #[tokio::test]
    async fn malformed_token_is_caught_and_logs_out() {
        let state = test_state();
        state.store.save_token("definitely-not-a-token").await.unwrap();

        assert!(!is_logged_in(&state).await);
        assert_eq!(state.store.token().await, None);
    }
}
