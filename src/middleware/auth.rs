use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::{fmt, sync::Arc};
use thiserror::Error;
use tracing::debug;

use crate::error::ApiError;

/// Resolves the caller's [`Session`] and hands it to the wrapped handler as a
/// request extension. Any failure is a bare 401.
pub async fn auth_middleware(
    State(state): State<AuthState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let session = match &state.mode {
        AuthMode::Development(session) => session.clone(),
        AuthMode::Jwt { secret } => {
            let claims = bearer_token(&req)
                .ok_or(AuthMiddlewareError::MissingToken)
                .and_then(|token| validate_token(token, secret))
                .map_err(|err| {
                    debug!(uri = %req.uri(), reason = %err, "Rejected request credentials");
                    ApiError::Unauthorized
                })?;
            Session::from(claims)
        }
    };

    req.extensions_mut().insert(session);
    Ok(next.run(req).await)
}

fn bearer_token(req: &Request) -> Option<&str> {
    req.headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .filter(|token| !token.is_empty())
}

/// Identity every handler runs as.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Session {
    pub user_id: String,
    pub role: String,
}

impl From<Claims> for Session {
    fn from(claims: Claims) -> Self {
        Self {
            user_id: claims.user_id,
            role: claims.role,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Claims {
    pub user_id: String,
    pub role: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exp: Option<usize>,
}

#[derive(Clone)]
pub enum AuthMode {
    /// Fixed identity, no credentials checked. Only ever set from explicit config.
    Development(Session),
    Jwt { secret: Arc<str> },
}

impl fmt::Debug for AuthMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthMode::Development(session) => f.debug_tuple("Development").field(session).finish(),
            AuthMode::Jwt { .. } => f.debug_struct("Jwt").finish_non_exhaustive(),
        }
    }
}

#[derive(Clone, Debug)]
pub struct AuthState {
    pub mode: AuthMode,
}

pub fn generate_token(
    session: &Session,
    secret: &str,
    ttl: Option<Duration>,
) -> Result<String, AuthMiddlewareError> {
    let exp = match ttl {
        Some(ttl) => Some(
            Utc::now()
                .checked_add_signed(ttl)
                .ok_or(AuthMiddlewareError::GenerationFail)?
                .timestamp() as usize,
        ),
        None => None,
    };

    let claims = Claims {
        user_id: session.user_id.clone(),
        role: session.role.clone(),
        exp,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|_| AuthMiddlewareError::GenerationFail)
}

pub fn validate_token(token: &str, secret: &str) -> Result<Claims, AuthMiddlewareError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = true;
    // `exp` is checked when present but not demanded.
    validation.required_spec_claims.clear();

    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map(|data| data.claims)
    .map_err(|err| AuthMiddlewareError::InvalidToken(err.to_string()))
}

#[derive(Error, Debug)]
pub enum AuthMiddlewareError {
    #[error("Missing or malformed bearer token")]
    MissingToken,
    #[error("Invalid token: {0}")]
    InvalidToken(String),
    #[error("Failed to generate token")]
    GenerationFail,
}
