// src/api/handlers/auth.rs

use actix_web::{web, HttpRequest, HttpResponse, Responder};
use std::sync::Arc;
use crate::core::keyring::{Keyring, KeyringError};
use crate::api::types::{AuthRequest, TokenResponse, StatusResponse, SuccessResponse};
use crate::api::utils::{error_status, extract_token};
use crate::models::Session;
use log::{info, warn, error};

fn session_response(session: Session) -> HttpResponse {
    HttpResponse::Ok().json(TokenResponse {
        success: true,
        token: Some(session.token),
        email: Some(session.email),
        error: None,
    })
}

fn auth_failure(e: KeyringError) -> HttpResponse {
    let status = error_status(&e);
    if status.is_server_error() {
        error!("Authentication failed: {}", e);
    } else {
        warn!("Authentication rejected: {}", e);
    }
    HttpResponse::build(status).json(TokenResponse::failure(e.to_string()))
}

/// Create an account
///
/// Registers a new email/password account and returns a session token.
#[utoipa::path(
    post,
    path = "/auth/signup",
    tag = "Authentication",
    request_body = AuthRequest,
    responses(
        (status = 200, description = "Account created", body = TokenResponse),
        (status = 400, description = "Invalid email or password", body = TokenResponse),
        (status = 409, description = "Email already registered", body = TokenResponse),
        (status = 500, description = "Internal server error", body = TokenResponse)
    )
)]
pub async fn sign_up(
    keyring: web::Data<Arc<Keyring>>,
    req: web::Json<AuthRequest>,
) -> impl Responder {
    info!("Sign-up request for {}", req.email.trim());

    match keyring.sign_up(&req.email, &req.password).await {
        Ok(session) => session_response(session),
        Err(e) => auth_failure(e),
    }
}

/// Sign in
///
/// Returns a JWT token for subsequent authenticated requests.
#[utoipa::path(
    post,
    path = "/auth/signin",
    tag = "Authentication",
    request_body = AuthRequest,
    responses(
        (status = 200, description = "Signed in", body = TokenResponse),
        (status = 401, description = "Invalid credentials", body = TokenResponse),
        (status = 500, description = "Internal server error", body = TokenResponse)
    )
)]
pub async fn sign_in(
    keyring: web::Data<Arc<Keyring>>,
    req: web::Json<AuthRequest>,
) -> impl Responder {
    info!("Sign-in request for {}", req.email.trim());

    match keyring.sign_in(&req.email, &req.password).await {
        Ok(session) => session_response(session),
        Err(e) => auth_failure(e),
    }
}

/// Sign out
///
/// Ends the session behind the bearer token.
#[utoipa::path(
    post,
    path = "/auth/signout",
    tag = "Authentication",
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Signed out", body = SuccessResponse),
        (status = 401, description = "Unauthorized", body = SuccessResponse)
    )
)]
pub async fn sign_out(
    keyring: web::Data<Arc<Keyring>>,
    req: HttpRequest,
) -> impl Responder {
    let token = match extract_token(&req) {
        Ok(token) => token,
        Err(e) => {
            return HttpResponse::Unauthorized().json(SuccessResponse::failure(format!("Authentication error: {}", e)));
        }
    };

    match keyring.sign_out(&token) {
        Ok(()) => {
            info!("Session ended");
            HttpResponse::Ok().json(SuccessResponse::ok("Signed out"))
        }
        Err(e) => HttpResponse::build(error_status(&e)).json(SuccessResponse::failure(e.to_string())),
    }
}

/// Check if the current session is valid
#[utoipa::path(
    get,
    path = "/auth/status",
    tag = "Authentication",
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Authentication status", body = StatusResponse)
    )
)]
pub async fn check_status(
    keyring: web::Data<Arc<Keyring>>,
    req: HttpRequest,
) -> impl Responder {
    let authenticated = match extract_token(&req) {
        Ok(token) => match keyring.identify(&token) {
            Ok(_) => true,
            Err(e) => {
                info!("Invalid token in status check: {}", e);
                false
            }
        },
        Err(_) => false,
    };

    HttpResponse::Ok().json(StatusResponse {
        success: true,
        authenticated,
    })
}

/// Handle OPTIONS requests for the auth endpoints
pub async fn auth_options() -> impl Responder {
    HttpResponse::Ok()
        .append_header(("Access-Control-Allow-Origin", "*"))
        .append_header(("Access-Control-Allow-Methods", "GET, POST, OPTIONS"))
        .append_header(("Access-Control-Allow-Headers", "Content-Type, Authorization"))
        .finish()
}
