// src/utils/session.rs

use std::time::{SystemTime, UNIX_EPOCH};

use axum::{
    body::Body,
    extract::State,
    http::{HeaderMap, Request, header},
    middleware::Next,
    response::Response,
};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use crate::{config::Config, error::AppError};

/// Name of the cookie carrying the student's session token.
pub const SESSION_COOKIE: &str = "exam_session";

/// Claims of a student session.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct SessionClaims {
    /// Subject - the validated test code.
    pub sub: String,
    /// Expiration time as Unix timestamp.
    pub exp: usize,
}

impl SessionClaims {
    pub fn test_code(&self) -> &str {
        &self.sub
    }
}

/// Signs a session token for a validated test code.
pub fn sign_session(test_code: &str, secret: &str, ttl_seconds: u64) -> Result<String, AppError> {
    let expiration = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_err(|e| AppError::InternalServerError(e.to_string()))?
        .as_secs() as usize
        + ttl_seconds as usize;

    let claims = SessionClaims {
        sub: test_code.to_owned(),
        exp: expiration,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AppError::InternalServerError(e.to_string()))
}

/// Verifies and decodes a session token.
pub fn verify_session(token: &str, secret: &str) -> Result<SessionClaims, AppError> {
    let token_data = decode(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|_| AppError::Unauthorized("Session expired, enter the test code again".to_string()))?;

    Ok(token_data.claims)
}

/// `Set-Cookie` value storing `token` for `ttl_seconds`.
pub fn session_cookie(token: &str, ttl_seconds: u64) -> String {
    format!(
        "{}={}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
        SESSION_COOKIE, token, ttl_seconds
    )
}

/// Value of cookie `name` from the request's `Cookie` headers.
pub fn cookie_value<'h>(headers: &'h HeaderMap, name: &str) -> Option<&'h str> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value)
}

/// Axum Middleware: Student session.
///
/// Reads the `exam_session` cookie and injects `SessionClaims` into the request
/// extensions. Requests without a valid session get 401.
pub async fn session_middleware(
    State(config): State<Config>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let token = cookie_value(req.headers(), SESSION_COOKIE)
        .ok_or_else(|| AppError::Unauthorized("Enter a valid test code first".to_string()))?;

    let claims = verify_session(token, config.session_key()?)?;
    req.extensions_mut().insert(claims);
    Ok(next.run(req).await)
}
