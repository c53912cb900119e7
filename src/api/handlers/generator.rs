// src/api/handlers/generator.rs

use actix_web::{web, HttpResponse, Responder};
use std::sync::Arc;
use crate::core::keyring::Keyring;
use crate::generators::GeneratorError;
use crate::models::{MAX_PASSWORD_LENGTH, MIN_PASSWORD_LENGTH};
use crate::api::types::{PasswordGenerationRequest, PasswordGenerationResponse, StrengthResponse};
use crate::api::utils::generator_error_status;
use log::{debug, warn};

/// Generate a password
///
/// Generates a random password from the requested character classes. Unset
/// fields fall back to the configured defaults (all classes enabled).
#[utoipa::path(
    post,
    path = "/generator/password",
    tag = "Generator",
    request_body = PasswordGenerationRequest,
    responses(
        (status = 200, description = "Generated password", body = PasswordGenerationResponse),
        (status = 400, description = "Invalid length or no character class selected", body = PasswordGenerationResponse)
    )
)]
pub async fn generate_password(
    keyring: web::Data<Arc<Keyring>>,
    generation_req: web::Json<PasswordGenerationRequest>,
) -> impl Responder {
    let request = generation_req.resolve(keyring.default_request());
    debug!("Generating password: {:?}", request);

    match keyring.generate(&request) {
        Ok((password, strength)) => HttpResponse::Ok().json(PasswordGenerationResponse {
            success: true,
            password: Some(password.into_string()),
            strength: Some(strength),
            error: None,
        }),
        Err(e) => {
            warn!("Rejected generation request: {}", e);
            HttpResponse::build(generator_error_status(&e)).json(PasswordGenerationResponse {
                success: false,
                password: None,
                strength: None,
                error: Some(e.to_string()),
            })
        }
    }
}

/// Classify request strength
///
/// Scores the generation options themselves (length and enabled classes)
/// without generating anything.
#[utoipa::path(
    post,
    path = "/generator/strength",
    tag = "Generator",
    request_body = PasswordGenerationRequest,
    responses(
        (status = 200, description = "Strength of the requested options", body = StrengthResponse),
        (status = 400, description = "Length outside 8..=128", body = StrengthResponse)
    )
)]
pub async fn password_strength(
    keyring: web::Data<Arc<Keyring>>,
    generation_req: web::Json<PasswordGenerationRequest>,
) -> impl Responder {
    let request = generation_req.resolve(keyring.default_request());

    // A request with no classes is still scored; only the length is bounded here
    if !request.length_in_range() {
        let e = GeneratorError::LengthOutOfRange {
            length: request.length,
            min: MIN_PASSWORD_LENGTH,
            max: MAX_PASSWORD_LENGTH,
        };
        return HttpResponse::build(generator_error_status(&e)).json(StrengthResponse {
            success: false,
            strength: None,
            error: Some(e.to_string()),
        });
    }

    HttpResponse::Ok().json(StrengthResponse {
        success: true,
        strength: Some(keyring.strength(&request)),
        error: None,
    })
}
