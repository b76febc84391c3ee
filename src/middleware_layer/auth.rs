use http::header::AUTHORIZATION;
use reqwest::RequestBuilder;

use crate::error::Result;
use crate::state::AppState;

/// Attaches the stored bearer token to an outgoing request.
///
/// Pure with respect to its inputs: with a token the request gains exactly an
/// `Authorization: Bearer <token>` header; without one it passes through
/// unchanged. No retry, no response inspection.
///
/// # Arguments
///
/// * `request` - The request being prepared.
/// * `token` - The current token, if any.
///
/// # Returns
///
/// The request, authorized when a token is present.
pub fn authorize(request: RequestBuilder, token: Option<&str>) -> RequestBuilder {
    match token {
        Some(token) => request.header(AUTHORIZATION, format!("Bearer {}", token)),
        None => request,
    }
}

/// Sends a request through [`authorize`], refreshing the token from the
/// session store first. Every directory call goes through this choke point.
///
/// # Arguments
///
/// * `state` - The client state.
/// * `request` - The request being prepared.
///
/// # Returns
///
/// A `Result` containing the response.
pub async fn send_authorized(
    state: &AppState,
    request: RequestBuilder,
) -> Result<reqwest::Response> {
    state.store.load_token().await;
    let token = state.store.token().await;
    let response = authorize(request, token.as_deref()).send().await?;
    Ok(response)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn builder() -> RequestBuilder {
        reqwest::Client::new()
            .get("http://localhost/user/list")
            .header("Accept", "application/json")
    }

    #[test]
    fn without_token_request_is_unchanged() {
        let request = authorize(builder(), None).build().unwrap();
        assert!(request.headers().get(AUTHORIZATION).is_none());
        assert_eq!(request.headers().len(), 1);
        assert_eq!(request.url().as_str(), "http://localhost/user/list");
    }

    #[test]
    fn with_token_request_carries_bearer_header() {
        let request = authorize(builder(), Some("tok-123")).build().unwrap();
        assert_eq!(
            request.headers().get(AUTHORIZATION).unwrap(),
            "Bearer tok-123"
        );
        // Everything else is untouched.
        assert_eq!(request.headers().get("Accept").unwrap(), "application/json");
        assert_eq!(request.method(), reqwest::Method::GET);
        assert_eq!(request.url().as_str(), "http://localhost/user/list");
    }
}
