//! `AuthUser` extractor — pulls the bearer JWT from the Authorization
//! header, validates it, and injects the caller's identity.
//!
//! MatchHub does not mint tokens; it only validates tokens issued by the
//! surrounding platform, so the claims are reduced to subject + expiry.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use jsonwebtoken::{Algorithm, DecodingKey, Validation};
use serde::Deserialize;

use matchhub_core::config::auth::AuthConfig;
use matchhub_core::error::AppError;
use matchhub_core::types::id::UserId;

use crate::error::ApiError;
use crate::state::AppState;

/// Extracted authenticated user identity available in handlers.
#[derive(Debug, Clone, Copy)]
pub struct AuthUser(pub UserId);

#[derive(Debug, Deserialize)]
struct Claims {
    sub: String,
    #[allow(dead_code)]
    exp: u64,
}

/// Validate a bearer token and return the user it identifies.
pub fn decode_user(config: &AuthConfig, token: &str) -> Result<UserId, AppError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.leeway = config.leeway_seconds;

    let data = jsonwebtoken::decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.jwt_secret.as_bytes()),
        &validation,
    )
    .map_err(|e| AppError::authentication(format!("Invalid token: {e}")))?;

    data.claims
        .sub
        .parse()
        .map_err(|_| AppError::authentication("Token subject is not a user id"))
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| AppError::authentication("Missing Authorization header"))?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .ok_or_else(|| AppError::authentication("Invalid Authorization header format"))?;

        let user_id = decode_user(&state.config.auth, token)?;
        Ok(AuthUser(user_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{EncodingKey, Header, encode};

    fn config() -> AuthConfig {
        AuthConfig {
            jwt_secret: "test-secret".to_string(),
            leeway_seconds: 30,
        }
    }

    fn token_for(sub: &str, secret: &str) -> String {
        #[derive(serde::Serialize)]
        struct OutClaims<'a> {
            sub: &'a str,
            exp: u64,
        }
        encode(
            &Header::default(),
            &OutClaims {
                sub,
                exp: 4_000_000_000,
            },
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap()
    }

    #[test]
    fn test_valid_token_round_trips_user_id() {
        let user_id = UserId::new();
        let token = token_for(&user_id.to_string(), "test-secret");
        assert_eq!(decode_user(&config(), &token).unwrap(), user_id);
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let token = token_for(&UserId::new().to_string(), "other-secret");
        assert!(decode_user(&config(), &token).is_err());
    }

    #[test]
    fn test_non_uuid_subject_rejected() {
        let token = token_for("not-a-uuid", "test-secret");
        assert!(decode_user(&config(), &token).is_err());
    }
}
