//! Unit tests for the HTTP API.
//!
//! Drives the actix routes in-process: public generator endpoints, account
//! endpoints, and the token-protected saved password endpoints.

use std::sync::Arc;
use std::time::Duration;

use actix_web::http::StatusCode;
use actix_web::{test, web, App};
use serde_json::{json, Value};
use tempfile::TempDir;

use rust_passgen::api::routes;
use rust_passgen::core::auth::AuthManager;
use rust_passgen::core::keyring::Keyring;
use rust_passgen::crypto::KdfParams;
use rust_passgen::db::Database;
use rust_passgen::generators::PasswordGenerator;

const PASSWORD: &str = "correct horse";

async fn setup() -> (Arc<Keyring>, TempDir) {
    let dir = TempDir::new().unwrap();
    let url = format!("sqlite:{}", dir.path().join("api_test.db").display());
    let db = Database::new(&url).await.unwrap();
    let kdf = KdfParams {
        memory_cost: 1024,
        time_cost: 1,
        parallelism: 1,
    };
    let auth = AuthManager::new(dir.path().join("sessions"), Duration::from_secs(3600), kdf).unwrap();
    (Arc::new(Keyring::new(Arc::new(db), auth, PasswordGenerator::new())), dir)
}

macro_rules! init_app {
    ($keyring:expr) => {
        test::init_service(
            App::new()
                .app_data(web::Data::new($keyring.clone()))
                .configure(routes::configure_routes),
        )
        .await
    };
}

/// Status of a request whether the handler answered or the middleware rejected it.
macro_rules! status_of {
    ($app:expr, $req:expr) => {
        match test::try_call_service(&$app, $req).await {
            Ok(resp) => resp.status(),
            Err(e) => e.as_response_error().status_code(),
        }
    };
}

fn bearer(token: &str) -> (&'static str, String) {
    ("Authorization", format!("Bearer {}", token))
}

// ─── Generator ───

#[actix_web::test]
async fn test_generate_with_defaults() {
    let (keyring, _dir) = setup().await;
    let app = init_app!(keyring);

    let req = test::TestRequest::post()
        .uri("/generator/password")
        .set_json(json!({}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["password"].as_str().unwrap().chars().count(), 16);
    assert_eq!(body["strength"]["score"], 7);
    assert_eq!(body["strength"]["tier"], "Very Strong");
}

#[actix_web::test]
async fn test_generate_uppercase_and_numbers() {
    let (keyring, _dir) = setup().await;
    let app = init_app!(keyring);

    let req = test::TestRequest::post()
        .uri("/generator/password")
        .set_json(json!({
            "length": 12,
            "include_lowercase": false,
            "include_symbols": false
        }))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    let password = body["password"].as_str().unwrap();
    assert_eq!(password.len(), 12);
    assert!(password.chars().all(|c| c.is_ascii_uppercase() || c.is_ascii_digit()));
    assert_eq!(body["strength"]["tier"], "Medium");
}

#[actix_web::test]
async fn test_generate_without_classes_is_bad_request() {
    let (keyring, _dir) = setup().await;
    let app = init_app!(keyring);

    let req = test::TestRequest::post()
        .uri("/generator/password")
        .set_json(json!({
            "include_uppercase": false,
            "include_lowercase": false,
            "include_numbers": false,
            "include_symbols": false
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["success"], false);
    assert!(body["password"].is_null());
    assert!(body["error"].is_string());
}

#[actix_web::test]
async fn test_generate_length_out_of_range_is_bad_request() {
    let (keyring, _dir) = setup().await;
    let app = init_app!(keyring);

    for length in [5, 129] {
        let req = test::TestRequest::post()
            .uri("/generator/password")
            .set_json(json!({ "length": length }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }
}

#[actix_web::test]
async fn test_strength_endpoint() {
    let (keyring, _dir) = setup().await;
    let app = init_app!(keyring);

    let req = test::TestRequest::post()
        .uri("/generator/strength")
        .set_json(json!({
            "length": 8,
            "include_uppercase": false,
            "include_numbers": false,
            "include_symbols": false
        }))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(body["success"], true);
    assert_eq!(body["strength"]["score"], 2);
    assert_eq!(body["strength"]["tier"], "Weak");
}

// ─── Accounts ───

#[actix_web::test]
async fn test_sign_up_and_sign_in() {
    let (keyring, _dir) = setup().await;
    let app = init_app!(keyring);

    let req = test::TestRequest::post()
        .uri("/auth/signup")
        .set_json(json!({ "email": "ada@example.com", "password": PASSWORD }))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["email"], "ada@example.com");
    assert!(body["token"].is_string());

    let req = test::TestRequest::post()
        .uri("/auth/signin")
        .set_json(json!({ "email": "ada@example.com", "password": PASSWORD }))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["success"], true);
    assert!(body["token"].is_string());
}

#[actix_web::test]
async fn test_account_errors_map_to_status_codes() {
    let (keyring, _dir) = setup().await;
    keyring.sign_up("ada@example.com", PASSWORD).await.unwrap();
    let app = init_app!(keyring);

    let req = test::TestRequest::post()
        .uri("/auth/signup")
        .set_json(json!({ "email": "ada@example.com", "password": PASSWORD }))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::CONFLICT);

    let req = test::TestRequest::post()
        .uri("/auth/signin")
        .set_json(json!({ "email": "ada@example.com", "password": "wrong password" }))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::UNAUTHORIZED);

    let req = test::TestRequest::post()
        .uri("/auth/signup")
        .set_json(json!({ "email": "no-at-sign", "password": PASSWORD }))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn test_status_reflects_token() {
    let (keyring, _dir) = setup().await;
    let session = keyring.sign_up("ada@example.com", PASSWORD).await.unwrap();
    let app = init_app!(keyring);

    let req = test::TestRequest::get()
        .uri("/auth/status")
        .insert_header(bearer(&session.token))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["authenticated"], true);

    let req = test::TestRequest::get().uri("/auth/status").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["authenticated"], false);
}

// ─── Saved passwords ───

#[actix_web::test]
async fn test_passwords_require_token() {
    let (keyring, _dir) = setup().await;
    let app = init_app!(keyring);

    let req = test::TestRequest::get().uri("/passwords").to_request();
    assert_eq!(status_of!(app, req), StatusCode::UNAUTHORIZED);

    let req = test::TestRequest::get()
        .uri("/passwords")
        .insert_header(bearer("garbage"))
        .to_request();
    assert_eq!(status_of!(app, req), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn test_save_list_get_delete() {
    let (keyring, _dir) = setup().await;
    let session = keyring.sign_up("ada@example.com", PASSWORD).await.unwrap();
    let app = init_app!(keyring);

    let req = test::TestRequest::post()
        .uri("/passwords")
        .insert_header(bearer(&session.token))
        .set_json(json!({ "password": "Xy7!Xy7!Xy7!", "label": "email" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body: Value = test::read_body_json(resp).await;
    let id = body["entry"]["id"].as_str().unwrap().to_string();
    assert_eq!(body["entry"]["label"], "email");

    let req = test::TestRequest::get()
        .uri("/passwords")
        .insert_header(bearer(&session.token))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    let passwords = body["passwords"].as_array().unwrap();
    assert_eq!(passwords.len(), 1);
    assert_eq!(passwords[0]["password"], "Xy7!Xy7!Xy7!");

    let req = test::TestRequest::get()
        .uri("/passwords/count")
        .insert_header(bearer(&session.token))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["count"], 1);

    let req = test::TestRequest::get()
        .uri(&format!("/passwords/{}", id))
        .insert_header(bearer(&session.token))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["entry"]["id"], id.as_str());

    let req = test::TestRequest::delete()
        .uri(&format!("/passwords/{}", id))
        .insert_header(bearer(&session.token))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

    let req = test::TestRequest::delete()
        .uri(&format!("/passwords/{}", id))
        .insert_header(bearer(&session.token))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn test_empty_password_and_malformed_id_are_bad_requests() {
    let (keyring, _dir) = setup().await;
    let session = keyring.sign_up("ada@example.com", PASSWORD).await.unwrap();
    let app = init_app!(keyring);

    let req = test::TestRequest::post()
        .uri("/passwords")
        .insert_header(bearer(&session.token))
        .set_json(json!({ "password": "" }))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);

    let req = test::TestRequest::delete()
        .uri("/passwords/not-a-uuid")
        .insert_header(bearer(&session.token))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn test_other_account_gets_not_found() {
    let (keyring, _dir) = setup().await;
    let alice = keyring.sign_up("alice@example.com", PASSWORD).await.unwrap();
    let bob = keyring.sign_up("bob@example.com", PASSWORD).await.unwrap();
    let record = keyring.save_password(&alice.token, "AliceOnly1!", None).await.unwrap();
    let app = init_app!(keyring);

    let req = test::TestRequest::delete()
        .uri(&format!("/passwords/{}", record.id))
        .insert_header(bearer(&bob.token))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);

    let req = test::TestRequest::get()
        .uri("/passwords")
        .insert_header(bearer(&bob.token))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert!(body["passwords"].as_array().unwrap().is_empty());

    assert_eq!(keyring.count_saved(&alice.token).await.unwrap(), 1);
}

#[actix_web::test]
async fn test_sign_out_revokes_token() {
    let (keyring, _dir) = setup().await;
    let session = keyring.sign_up("ada@example.com", PASSWORD).await.unwrap();
    let app = init_app!(keyring);

    let req = test::TestRequest::post()
        .uri("/auth/signout")
        .insert_header(bearer(&session.token))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

    let req = test::TestRequest::get()
        .uri("/passwords")
        .insert_header(bearer(&session.token))
        .to_request();
    assert_eq!(status_of!(app, req), StatusCode::UNAUTHORIZED);
}
