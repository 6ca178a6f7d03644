use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use serde_json::json;
use sha2::{Digest, Sha256};

use crate::db::teachers as db_teachers;
use crate::models::AuthSession;
use crate::routes::AppState;

const ACCESS_TOKEN_MINUTES: i64 = 15;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenKind {
    Access,
    Refresh,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub sub: String, // teacher id
    pub exp: i64,
    pub iat: i64,
    pub kind: TokenKind,
    /// teacher's session epoch at issue time, see `ensure_current`
    pub epoch: i64,
    /// unique per token so two tokens issued in the same second never share a hash
    pub jti: String,
}

/// Extracts the signed-in teacher from a `Bearer` access token.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub teacher_id: String,
    pub expires_at: i64,
}

impl AuthUser {
    pub fn session(&self) -> AuthSession {
        AuthSession {
            teacher_id: self.teacher_id.clone(),
            expires_at: self.expires_at,
        }
    }
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AuthError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or(AuthError::MissingToken)?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .ok_or(AuthError::InvalidToken)?;

        let claims = verify_token(token, TokenKind::Access, &state.jwt_secret)?;

        let epoch = db_teachers::find_session_epoch(&state.pool, &claims.sub)
            .await
            .map_err(|e| {
                tracing::error!("Session lookup failed: {}", e);
                AuthError::Unavailable
            })?;
        ensure_current(&claims, epoch)?;

        Ok(AuthUser {
            teacher_id: claims.sub,
            expires_at: claims.exp,
        })
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum AuthError {
    MissingToken,
    InvalidToken,
    ExpiredToken,
    RevokedToken,
    Unavailable,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, code, message) = match self {
            AuthError::MissingToken => (
                StatusCode::UNAUTHORIZED,
                "missing_token",
                "Authorization token is required",
            ),
            AuthError::InvalidToken => (
                StatusCode::UNAUTHORIZED,
                "invalid_token",
                "Invalid authorization token",
            ),
            AuthError::ExpiredToken => (
                StatusCode::UNAUTHORIZED,
                "expired_token",
                "Authorization token has expired",
            ),
            AuthError::RevokedToken => (
                StatusCode::UNAUTHORIZED,
                "revoked_token",
                "Session has been signed out",
            ),
            AuthError::Unavailable => (
                StatusCode::SERVICE_UNAVAILABLE,
                "session_unavailable",
                "Session could not be checked",
            ),
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}

fn create_token(
    teacher_id: &str,
    epoch: i64,
    kind: TokenKind,
    lifetime: Duration,
    secret: &str,
) -> Result<String, jsonwebtoken::errors::Error> {
    let now = Utc::now();
    let claims = Claims {
        sub: teacher_id.to_string(),
        iat: now.timestamp(),
        exp: (now + lifetime).timestamp(),
        kind,
        epoch,
        jti: uuid::Uuid::now_v7().to_string(),
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
}

pub fn create_access_token(
    teacher_id: &str,
    epoch: i64,
    secret: &str,
) -> Result<String, jsonwebtoken::errors::Error> {
    create_token(
        teacher_id,
        epoch,
        TokenKind::Access,
        Duration::minutes(ACCESS_TOKEN_MINUTES),
        secret,
    )
}

/// Refresh tokens are only issued for remembered sessions.
pub fn create_refresh_token(
    teacher_id: &str,
    epoch: i64,
    remember_days: i64,
    secret: &str,
) -> Result<String, jsonwebtoken::errors::Error> {
    create_token(
        teacher_id,
        epoch,
        TokenKind::Refresh,
        Duration::days(remember_days),
        secret,
    )
}

pub fn verify_token(token: &str, kind: TokenKind, secret: &str) -> Result<Claims, AuthError> {
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|e| match e.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::ExpiredToken,
        _ => AuthError::InvalidToken,
    })?;

    // a refresh token must not open the API, and vice versa
    if token_data.claims.kind != kind {
        return Err(AuthError::InvalidToken);
    }

    Ok(token_data.claims)
}

/// Rejects tokens issued before the teacher's last logout, or for a deleted teacher.
///
/// `current_epoch` is the stored `teachers.session_epoch`.
pub fn ensure_current(claims: &Claims, current_epoch: Option<i64>) -> Result<(), AuthError> {
    match current_epoch {
        Some(epoch) if epoch == claims.epoch => Ok(()),
        Some(_) => Err(AuthError::RevokedToken),
        None => Err(AuthError::InvalidToken),
    }
}

pub fn hash_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    format!("{:x}", hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret";

    #[test]
    fn access_token_round_trips_into_a_session() {
        let token = create_access_token("teacher-1", 0, SECRET).unwrap();
        let claims = verify_token(&token, TokenKind::Access, SECRET).unwrap();
        assert_eq!(claims.sub, "teacher-1");

        let session = AuthUser {
            teacher_id: claims.sub,
            expires_at: claims.exp,
        }
        .session();
        assert!(session.is_active_at(Utc::now().timestamp()));
    }

    #[test]
    fn token_kinds_are_not_interchangeable() {
        let refresh = create_refresh_token("teacher-1", 0, 7, SECRET).unwrap();
        assert_eq!(
            verify_token(&refresh, TokenKind::Access, SECRET).unwrap_err(),
            AuthError::InvalidToken
        );
        assert!(verify_token(&refresh, TokenKind::Refresh, SECRET).is_ok());
    }

    #[test]
    fn wrong_secret_is_invalid() {
        let token = create_access_token("teacher-1", 0, SECRET).unwrap();
        assert_eq!(
            verify_token(&token, TokenKind::Access, "other").unwrap_err(),
            AuthError::InvalidToken
        );
    }

    #[test]
    fn tokens_issued_together_are_distinct() {
        let first = create_refresh_token("teacher-1", 0, 7, SECRET).unwrap();
        let second = create_refresh_token("teacher-1", 0, 7, SECRET).unwrap();
        assert_ne!(hash_token(&first), hash_token(&second));
    }

    #[test]
    fn logout_epoch_revokes_older_tokens() {
        let token = create_access_token("teacher-1", 2, SECRET).unwrap();
        let claims = verify_token(&token, TokenKind::Access, SECRET).unwrap();

        assert_eq!(ensure_current(&claims, Some(2)), Ok(()));
        assert_eq!(ensure_current(&claims, Some(3)), Err(AuthError::RevokedToken));
        assert_eq!(ensure_current(&claims, None), Err(AuthError::InvalidToken));
    }

    #[test]
    fn token_hash_is_stable_hex() {
        assert_eq!(hash_token("abc"), hash_token("abc"));
        assert_eq!(hash_token("abc").len(), 64);
    }
}
