// src/api/mod.rs
use actix_web::{web, App, HttpServer};
use actix_cors::Cors;
use std::sync::Arc;
use crate::core::keyring::Keyring;
use utoipa::{OpenApi, Modify};
use utoipa_swagger_ui::SwaggerUi;
use utoipa_redoc::{Redoc, Servable};

pub mod types;
pub mod routes;
pub mod handlers;
pub mod middleware;
pub mod utils;

#[derive(Default)]
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = &mut openapi.components {
            components.add_security_scheme(
                "bearer_auth",
                utoipa::openapi::security::SecurityScheme::Http(
                    utoipa::openapi::security::HttpBuilder::new()
                        .scheme(utoipa::openapi::security::HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        // Authentication endpoints
        crate::api::handlers::auth::sign_up,
        crate::api::handlers::auth::sign_in,
        crate::api::handlers::auth::sign_out,
        crate::api::handlers::auth::check_status,

        // Generator endpoints
        crate::api::handlers::generator::generate_password,
        crate::api::handlers::generator::password_strength,

        // Saved password endpoints
        crate::api::handlers::passwords::list_passwords,
        crate::api::handlers::passwords::save_password,
        crate::api::handlers::passwords::get_password,
        crate::api::handlers::passwords::delete_password,
        crate::api::handlers::passwords::count_passwords
    ),
    components(
        schemas(
            crate::api::types::AuthRequest,
            crate::api::types::TokenResponse,
            crate::api::types::StatusResponse,
            crate::api::types::SuccessResponse,

            crate::api::types::PasswordGenerationRequest,
            crate::api::types::PasswordGenerationResponse,
            crate::api::types::StrengthResponse,
            crate::models::StrengthReport,
            crate::models::StrengthTier,

            crate::api::types::SavePasswordRequest,
            crate::api::types::SavedPasswordEntry,
            crate::api::types::SavedPasswordResponse,
            crate::api::types::PasswordListResponse,
            crate::api::types::CountResponse
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Authentication", description = "Account sign-up, sign-in and sessions"),
        (name = "Generator", description = "Password generation and strength classification"),
        (name = "Passwords", description = "Per-account saved passwords")
    ),
    info(
        title = "Passgen API",
        version = "0.1.0",
        description = "Password generator with per-account saved passwords",
        license(name = "MIT")
    )
)]
pub struct ApiDoc;

pub async fn start_server(keyring: Arc<Keyring>, address: &str, port: u16) -> std::io::Result<()> {
    log::info!("Starting Passgen API server on {}:{}", address, port);

    let keyring_data = web::Data::new(keyring);

    HttpServer::new(move || {
        let cors = Cors::default()
            .allow_any_origin()
            .allowed_methods(vec!["GET", "POST", "DELETE"])
            .allowed_headers(vec![
                "Authorization",
                "Content-Type",
                "Accept",
                "X-Requested-With",
            ])
            .max_age(3600);

        App::new()
            .wrap(cors)
            .wrap(actix_web::middleware::Logger::default())
            .app_data(keyring_data.clone())
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}")
                    .url("/api-docs/openapi.json", ApiDoc::openapi())
            )
            .service(Redoc::with_url("/redoc", ApiDoc::openapi()))
            .configure(routes::configure_routes)
    })
    .bind((address, port))?
    .run()
    .await
}
