// src/api/utils.rs

use actix_web::{HttpRequest, HttpMessage};
use actix_web::error::ErrorUnauthorized;
use actix_web::http::StatusCode;
use log::{debug, warn};

use crate::core::auth::AuthError;
use crate::core::keyring::KeyringError;
use crate::db::DbError;
use crate::generators::GeneratorError;
use crate::models::Identity;

/// Bearer token stored in request extensions by the token middleware.
#[derive(Debug, Clone)]
pub struct BearerToken(pub String);

/// Pulls the raw token out of an `Authorization: Bearer ...` header value.
pub fn parse_bearer(header_value: &str) -> Option<&str> {
    header_value
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

/// Extract the bearer token from an HTTP request
///
/// Prefers the token the middleware already validated, then falls back to the header.
pub fn extract_token(req: &HttpRequest) -> Result<String, actix_web::Error> {
    if let Some(BearerToken(token)) = req.extensions().get::<BearerToken>() {
        return Ok(token.clone());
    }

    debug!("Token not found in extensions, trying header extraction");

    let auth_header = req.headers().get("Authorization")
        .ok_or_else(|| {
            warn!("Missing authorization header");
            ErrorUnauthorized("Missing authorization header")
        })?;

    let header_str = auth_header.to_str()
        .map_err(|e| {
            warn!("Invalid authorization header: {}", e);
            ErrorUnauthorized("Invalid authorization header")
        })?;

    parse_bearer(header_str)
        .map(String::from)
        .ok_or_else(|| {
            warn!("Invalid authorization header format");
            ErrorUnauthorized("Invalid authorization header format")
        })
}

/// Identity placed in request extensions by the token middleware.
pub fn extract_identity(req: &HttpRequest) -> Result<Identity, actix_web::Error> {
    req.extensions().get::<Identity>().cloned().ok_or_else(|| {
        warn!("No identity in request extensions; route is not behind the token middleware");
        ErrorUnauthorized("Missing authorization")
    })
}

/// HTTP status for a service error.
pub fn error_status(error: &KeyringError) -> StatusCode {
    match error {
        KeyringError::Auth(auth) => match auth {
            AuthError::InvalidCredentials
            | AuthError::SessionExpired
            | AuthError::InvalidSession
            | AuthError::JwtError(_) => StatusCode::UNAUTHORIZED,
            AuthError::InvalidEmail(_) | AuthError::WeakPassword(_) => StatusCode::BAD_REQUEST,
            AuthError::EmailTaken(_) => StatusCode::CONFLICT,
            AuthError::DbError(DbError::NotFound) => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        },
        KeyringError::Db(DbError::NotFound) => StatusCode::NOT_FOUND,
        KeyringError::Db(DbError::EmailTaken(_)) => StatusCode::CONFLICT,
        KeyringError::Db(_) => StatusCode::INTERNAL_SERVER_ERROR,
        KeyringError::Generator(_) | KeyringError::EmptyPassword => StatusCode::BAD_REQUEST,
    }
}

pub fn generator_error_status(error: &GeneratorError) -> StatusCode {
    match error {
        GeneratorError::NoCharacterClassSelected | GeneratorError::LengthOutOfRange { .. } => StatusCode::BAD_REQUEST,
    }
}
