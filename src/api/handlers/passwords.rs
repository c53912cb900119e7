// src/api/handlers/passwords.rs
use actix_web::{web, HttpRequest, HttpResponse, Responder};
use std::sync::Arc;
use uuid::Uuid;
use crate::core::keyring::Keyring;
use crate::api::types::{
    PasswordListResponse, SavedPasswordEntry, SavePasswordRequest, SavedPasswordResponse,
    SuccessResponse, CountResponse,
};
use crate::api::utils::{error_status, extract_identity};
use log::{info, error, debug};

pub async fn passwords_options() -> impl Responder {
    HttpResponse::Ok()
        .append_header(("Access-Control-Allow-Origin", "*"))
        .append_header(("Access-Control-Allow-Methods", "GET, POST, DELETE, OPTIONS"))
        .append_header(("Access-Control-Allow-Headers", "Content-Type, Authorization"))
        .finish()
}

fn parse_id(raw: &str) -> Result<Uuid, String> {
    Uuid::parse_str(raw).map_err(|_| format!("Invalid password id: {}", raw))
}

/// List saved passwords
///
/// Returns the caller's saved passwords, newest first.
#[utoipa::path(
    get,
    path = "/passwords",
    tag = "Passwords",
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Saved passwords", body = PasswordListResponse),
        (status = 401, description = "Unauthorized"),
        (status = 500, description = "Internal server error", body = PasswordListResponse)
    )
)]
pub async fn list_passwords(
    keyring: web::Data<Arc<Keyring>>,
    req: HttpRequest,
) -> Result<HttpResponse, actix_web::Error> {
    debug!("list_passwords called");
    let identity = extract_identity(&req)?;

    Ok(match keyring.list_saved_for(&identity).await {
        Ok(records) => HttpResponse::Ok().json(PasswordListResponse {
            success: true,
            passwords: records.into_iter().map(SavedPasswordEntry::from).collect(),
            error: None,
        }),
        Err(e) => {
            error!("Failed to list saved passwords: {}", e);
            HttpResponse::build(error_status(&e)).json(PasswordListResponse {
                success: false,
                passwords: vec![],
                error: Some(e.to_string()),
            })
        }
    })
}

/// Save a password
///
/// Stores password text with an optional label under the caller's account.
#[utoipa::path(
    post,
    path = "/passwords",
    tag = "Passwords",
    security(
        ("bearer_auth" = [])
    ),
    request_body = SavePasswordRequest,
    responses(
        (status = 201, description = "Password saved", body = SavedPasswordResponse),
        (status = 400, description = "Empty password", body = SavedPasswordResponse),
        (status = 401, description = "Unauthorized"),
        (status = 500, description = "Internal server error", body = SavedPasswordResponse)
    )
)]
pub async fn save_password(
    keyring: web::Data<Arc<Keyring>>,
    req: HttpRequest,
    body: web::Json<SavePasswordRequest>,
) -> Result<HttpResponse, actix_web::Error> {
    let identity = extract_identity(&req)?;

    Ok(match keyring.save_password_for(&identity, &body.password, body.label.as_deref()).await {
        Ok(record) => {
            info!("Password {} saved", record.id);
            HttpResponse::Created().json(SavedPasswordResponse {
                success: true,
                entry: Some(record.into()),
                error: None,
            })
        }
        Err(e) => HttpResponse::build(error_status(&e)).json(SavedPasswordResponse {
            success: false,
            entry: None,
            error: Some(e.to_string()),
        }),
    })
}

/// Get a saved password
#[utoipa::path(
    get,
    path = "/passwords/{id}",
    tag = "Passwords",
    params(
        ("id" = String, Path, description = "Saved password ID")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Saved password", body = SavedPasswordResponse),
        (status = 400, description = "Malformed id", body = SavedPasswordResponse),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "No such password for this account", body = SavedPasswordResponse)
    )
)]
pub async fn get_password(
    keyring: web::Data<Arc<Keyring>>,
    req: HttpRequest,
    path: web::Path<String>,
) -> Result<HttpResponse, actix_web::Error> {
    let identity = extract_identity(&req)?;

    let id = match parse_id(&path) {
        Ok(id) => id,
        Err(msg) => {
            return Ok(HttpResponse::BadRequest().json(SavedPasswordResponse {
                success: false,
                entry: None,
                error: Some(msg),
            }));
        }
    };

    Ok(match keyring.get_saved_for(&identity, id).await {
        Ok(record) => HttpResponse::Ok().json(SavedPasswordResponse {
            success: true,
            entry: Some(record.into()),
            error: None,
        }),
        Err(e) => HttpResponse::build(error_status(&e)).json(SavedPasswordResponse {
            success: false,
            entry: None,
            error: Some(e.to_string()),
        }),
    })
}

/// Delete a saved password
///
/// Only the owning account can delete a record; anyone else gets 404.
#[utoipa::path(
    delete,
    path = "/passwords/{id}",
    tag = "Passwords",
    params(
        ("id" = String, Path, description = "Saved password ID")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Password deleted", body = SuccessResponse),
        (status = 400, description = "Malformed id", body = SuccessResponse),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "No such password for this account", body = SuccessResponse)
    )
)]
pub async fn delete_password(
    keyring: web::Data<Arc<Keyring>>,
    req: HttpRequest,
    path: web::Path<String>,
) -> Result<HttpResponse, actix_web::Error> {
    let identity = extract_identity(&req)?;

    let id = match parse_id(&path) {
        Ok(id) => id,
        Err(msg) => return Ok(HttpResponse::BadRequest().json(SuccessResponse::failure(msg))),
    };

    Ok(match keyring.delete_saved_for(&identity, id).await {
        Ok(()) => HttpResponse::Ok().json(SuccessResponse::ok("Password deleted")),
        Err(e) => HttpResponse::build(error_status(&e)).json(SuccessResponse::failure(e.to_string())),
    })
}

/// Count saved passwords
#[utoipa::path(
    get,
    path = "/passwords/count",
    tag = "Passwords",
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Number of saved passwords", body = CountResponse),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn count_passwords(
    keyring: web::Data<Arc<Keyring>>,
    req: HttpRequest,
) -> Result<HttpResponse, actix_web::Error> {
    let identity = extract_identity(&req)?;

    Ok(match keyring.count_saved_for(&identity).await {
        Ok(count) => HttpResponse::Ok().json(CountResponse {
            success: true,
            count,
            error: None,
        }),
        Err(e) => HttpResponse::build(error_status(&e)).json(CountResponse {
            success: false,
            count: 0,
            error: Some(e.to_string()),
        }),
    })
}
