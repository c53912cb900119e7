// src/api/routes.rs
use actix_web::guard;
use super::handlers;
use actix_web::web;
use super::middleware::auth::TokenValidator;

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    // Authentication routes
    cfg.service(
        web::scope("/auth")
            .route("/signup", web::post().to(handlers::auth::sign_up))
            .route("/signin", web::post().to(handlers::auth::sign_in))
            .route("/signout", web::post().to(handlers::auth::sign_out))
            .route("/status", web::get().to(handlers::auth::check_status))
            // CORS preflight for every auth route
            .route("/{tail:.*}", web::route()
                .guard(guard::Options())
                .to(handlers::auth::auth_options))
    );

    // Password generator (public)
    cfg.service(
        web::scope("/generator")
            .route("/password", web::post().to(handlers::generator::generate_password))
            .route("/strength", web::post().to(handlers::generator::password_strength))
    );

    // Saved passwords (protected by token auth)
    cfg.service(
        web::scope("/passwords")
            .wrap(TokenValidator)
            .route("/count", web::get().to(handlers::passwords::count_passwords))
            .route("", web::get().to(handlers::passwords::list_passwords))
            .route("", web::post().to(handlers::passwords::save_password))
            .route("", web::route()
                .guard(guard::Options())
                .to(handlers::passwords::passwords_options))
            .route("/{id}", web::get().to(handlers::passwords::get_password))
            .route("/{id}", web::delete().to(handlers::passwords::delete_password))
            .route("/{id}", web::route()
                .guard(guard::Options())
                .to(handlers::passwords::passwords_options))
    );
}
