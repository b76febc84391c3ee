use base64::{Engine as _, engine::general_purpose};
use chrono::{DateTime, TimeZone, Utc};
use serde::Deserialize;

use crate::error::{AppError, Result};

/// Claims carried in the payload segment of a token.
///
/// Decoded locally without signature verification; the backend re-verifies the
/// signature on every authorized request, so the claims are advisory on this side.
#[derive(Debug, Clone, Deserialize)]
pub struct Claims {
    /// The subject identity the token was issued for.
    pub sub: Option<String>,
    /// Expiry as a Unix timestamp in seconds. Absent means open-ended validity.
    pub exp: Option<i64>,
    /// Issued-at as a Unix timestamp in seconds.
    pub iat: Option<i64>,
}

impl Claims {
    /// Returns whether the token has expired as of `now`.
    ///
    /// A missing `exp` claim is not itself a failure: the token is treated as
    /// open-ended. An `exp` outside the representable timestamp range counts
    /// as expired.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        match self.exp {
            Some(exp) => match Utc.timestamp_opt(exp, 0).single() {
                Some(expires_at) => now > expires_at,
                None => true,
            },
            None => false,
        }
    }
}

/// Decodes the claims from a token without verifying its signature.
///
/// # Arguments
///
/// * `token` - The raw token string.
///
/// # Returns
///
/// A `Result` containing the decoded `Claims`.
pub fn decode_claims(token: &str) -> Result<Claims> {
    let mut segments = token.split('.');
    let payload = match (segments.next(), segments.next(), segments.next()) {
        (Some(_header), Some(payload), Some(_signature)) => payload,
        _ => {
            return Err(AppError::Token(
                "Token must have three dot-separated segments".to_string(),
            ));
        }
    };
    if segments.next().is_some() {
        return Err(AppError::Token(
            "Token has more than three segments".to_string(),
        ));
    }

    let payload_bytes = general_purpose::URL_SAFE_NO_PAD
        .decode(payload)
        .map_err(|e| AppError::Token(format!("Payload is not valid base64url: {}", e)))?;

    sonic_rs::from_slice(&payload_bytes)
        .map_err(|e| AppError::Token(format!("Payload is not valid JSON: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn encode_token(payload: &str) -> String {
        let segment = |s: &str| general_purpose::URL_SAFE_NO_PAD.encode(s.as_bytes());
        format!("{}.{}.{}", segment(r#"{"alg":"HS512","typ":"JWT"}"#), segment(payload), "sig")
    }

    #[test]
    fn decodes_subject_and_expiry() {
        let token = encode_token(r#"{"sub":"jdoe","exp":4102444800,"iat":1600000000}"#);
        let claims = decode_claims(&token).unwrap();
        assert_eq!(claims.sub.as_deref(), Some("jdoe"));
        assert_eq!(claims.exp, Some(4102444800));
        assert_eq!(claims.iat, Some(1600000000));
    }

    #[test]
    fn past_expiry_is_expired() {
        let exp = (Utc::now() - Duration::hours(1)).timestamp();
        let claims = Claims { sub: Some("jdoe".into()), exp: Some(exp), iat: None };
        assert!(claims.is_expired(Utc::now()));
    }

    #[test]
    fn future_expiry_is_not_expired() {
        let exp = (Utc::now() + Duration::hours(1)).timestamp();
        let claims = Claims { sub: Some("jdoe".into()), exp: Some(exp), iat: None };
        assert!(!claims.is_expired(Utc::now()));
    }

    #[test]
    fn absent_expiry_is_open_ended() {
        let claims = Claims { sub: Some("jdoe".into()), exp: None, iat: None };
        assert!(!claims.is_expired(Utc::now()));
    }

    #[test]
    fn rejects_token_without_three_segments() {
        assert!(matches!(decode_claims("not-a-token"), Err(AppError::Token(_))));
        assert!(matches!(decode_claims("a.b"), Err(AppError::Token(_))));
        assert!(matches!(decode_claims("a.b.c.d"), Err(AppError::Token(_))));
    }

    #[test]
    fn rejects_garbage_payload() {
        let garbage = format!("{}.{}.{}", "aGVhZGVy", "!!!not-base64!!!", "sig");
        assert!(matches!(decode_claims(&garbage), Err(AppError::Token(_))));

        let not_json = encode_token("this is not json");
        assert!(matches!(decode_claims(&not_json), Err(AppError::Token(_))));
    }
}
