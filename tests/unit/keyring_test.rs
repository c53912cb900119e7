//! Unit tests for the keyring and the caller-owned client state.
//!
//! Tests accounts, sessions, saved passwords scoped to their owner, and the
//! state transitions the interactive menu drives.

use std::sync::Arc;
use std::time::Duration;

use tempfile::TempDir;

use rust_passgen::core::auth::{AuthError, AuthManager};
use rust_passgen::core::keyring::{Keyring, KeyringError};
use rust_passgen::core::state::{self, ClientState};
use rust_passgen::crypto::KdfParams;
use rust_passgen::db::{Database, DbError};
use rust_passgen::generators::{GeneratorError, PasswordGenerator};
use rust_passgen::models::{GenerationRequest, StrengthTier};

const PASSWORD: &str = "correct horse";

fn cheap_kdf() -> KdfParams {
    KdfParams {
        memory_cost: 1024,
        time_cost: 1,
        parallelism: 1,
    }
}

async fn setup() -> (Keyring, TempDir) {
    let dir = TempDir::new().unwrap();
    let url = format!("sqlite:{}", dir.path().join("keyring_test.db").display());
    let db = Database::new(&url).await.unwrap();
    let auth = AuthManager::new(dir.path().join("sessions"), Duration::from_secs(3600), cheap_kdf()).unwrap();
    (Keyring::new(Arc::new(db), auth, PasswordGenerator::new()), dir)
}

// ─── Generation ───

#[tokio::test]
async fn test_generate_returns_password_and_strength() {
    let (keyring, _dir) = setup().await;

    let (password, strength) = keyring.generate(&GenerationRequest::default()).unwrap();
    assert_eq!(password.len(), 16);
    assert_eq!(strength.tier, StrengthTier::VeryStrong);
}

#[tokio::test]
async fn test_generate_rejects_length_out_of_range() {
    let (keyring, _dir) = setup().await;

    let err = keyring.generate(&GenerationRequest::with_length(200)).unwrap_err();
    assert!(matches!(err, GeneratorError::LengthOutOfRange { length: 200, .. }));
}

// ─── Accounts and sessions ───

#[tokio::test]
async fn test_sign_up_then_identify() {
    let (keyring, _dir) = setup().await;

    let session = keyring.sign_up("ada@example.com", PASSWORD).await.unwrap();
    let identity = keyring.identify(&session.token).unwrap();
    assert_eq!(identity.user_id, session.user_id);
    assert_eq!(session.email, "ada@example.com");
}

#[tokio::test]
async fn test_email_is_normalized() {
    let (keyring, _dir) = setup().await;

    let created = keyring.sign_up("  Ada@Example.COM ", PASSWORD).await.unwrap();
    let signed_in = keyring.sign_in("ada@example.com", PASSWORD).await.unwrap();
    assert_eq!(created.user_id, signed_in.user_id);
}

#[tokio::test]
async fn test_duplicate_sign_up_is_rejected() {
    let (keyring, _dir) = setup().await;
    keyring.sign_up("ada@example.com", PASSWORD).await.unwrap();

    let err = keyring.sign_up("ada@example.com", "another one").await.unwrap_err();
    assert!(matches!(err, KeyringError::Auth(AuthError::EmailTaken(_))));
}

#[tokio::test]
async fn test_sign_up_validation() {
    let (keyring, _dir) = setup().await;

    let err = keyring.sign_up("not-an-email", PASSWORD).await.unwrap_err();
    assert!(matches!(err, KeyringError::Auth(AuthError::InvalidEmail(_))));

    let err = keyring.sign_up("ada@example.com", "short").await.unwrap_err();
    assert!(matches!(err, KeyringError::Auth(AuthError::WeakPassword(6))));
}

#[tokio::test]
async fn test_wrong_password_and_unknown_account_look_the_same() {
    let (keyring, _dir) = setup().await;
    keyring.sign_up("ada@example.com", PASSWORD).await.unwrap();

    let wrong = keyring.sign_in("ada@example.com", "incorrect").await.unwrap_err();
    let unknown = keyring.sign_in("nobody@example.com", PASSWORD).await.unwrap_err();

    assert!(matches!(wrong, KeyringError::Auth(AuthError::InvalidCredentials)));
    assert!(matches!(unknown, KeyringError::Auth(AuthError::InvalidCredentials)));
}

#[tokio::test]
async fn test_sign_out_invalidates_token() {
    let (keyring, _dir) = setup().await;
    let session = keyring.sign_up("ada@example.com", PASSWORD).await.unwrap();

    keyring.sign_out(&session.token).unwrap();

    let err = keyring.identify(&session.token).unwrap_err();
    assert!(matches!(err, KeyringError::Auth(AuthError::InvalidSession)));

    let err = keyring.list_saved(&session.token).await.unwrap_err();
    assert!(matches!(err, KeyringError::Auth(AuthError::InvalidSession)));
}

#[tokio::test]
async fn test_garbage_token_is_rejected() {
    let (keyring, _dir) = setup().await;
    let err = keyring.identify("not.a.jwt").unwrap_err();
    assert!(matches!(err, KeyringError::Auth(AuthError::JwtError(_))));
}

#[tokio::test]
async fn test_sessions_survive_a_new_auth_manager() {
    let dir = TempDir::new().unwrap();
    let url = format!("sqlite:{}", dir.path().join("restart.db").display());
    let db = Arc::new(Database::new(&url).await.unwrap());
    let sessions = dir.path().join("sessions");

    let first = Keyring::new(
        db.clone(),
        AuthManager::new(sessions.clone(), Duration::from_secs(3600), cheap_kdf()).unwrap(),
        PasswordGenerator::new(),
    );
    let session = first.sign_up("ada@example.com", PASSWORD).await.unwrap();

    // Same session directory, so the same signing secret
    let second = Keyring::new(
        db,
        AuthManager::new(sessions, Duration::from_secs(3600), cheap_kdf()).unwrap(),
        PasswordGenerator::new(),
    );
    assert_eq!(second.identify(&session.token).unwrap().user_id, session.user_id);
}

// ─── Saved passwords ───

#[tokio::test]
async fn test_save_list_delete() {
    let (keyring, _dir) = setup().await;
    let session = keyring.sign_up("ada@example.com", PASSWORD).await.unwrap();

    let record = keyring
        .save_password(&session.token, "Xy7!Xy7!Xy7!", Some("  email  "))
        .await
        .unwrap();
    assert_eq!(record.label.as_deref(), Some("email"));
    assert_eq!(record.owner_id, session.user_id);

    let list = keyring.list_saved(&session.token).await.unwrap();
    assert_eq!(list.len(), 1);
    assert_eq!(list[0].password_text, "Xy7!Xy7!Xy7!");
    assert_eq!(keyring.count_saved(&session.token).await.unwrap(), 1);

    let fetched = keyring.get_saved(&session.token, record.id).await.unwrap();
    assert_eq!(fetched, record);

    keyring.delete_saved(&session.token, record.id).await.unwrap();
    assert_eq!(keyring.count_saved(&session.token).await.unwrap(), 0);
}

#[tokio::test]
async fn test_blank_label_is_stored_as_none() {
    let (keyring, _dir) = setup().await;
    let session = keyring.sign_up("ada@example.com", PASSWORD).await.unwrap();

    let record = keyring.save_password(&session.token, "Xy7!Xy7!", Some("   ")).await.unwrap();
    assert_eq!(record.label, None);
}

#[tokio::test]
async fn test_empty_password_text_is_rejected() {
    let (keyring, _dir) = setup().await;
    let session = keyring.sign_up("ada@example.com", PASSWORD).await.unwrap();

    let err = keyring.save_password(&session.token, "", None).await.unwrap_err();
    assert!(matches!(err, KeyringError::EmptyPassword));
}

#[tokio::test]
async fn test_other_account_cannot_see_or_delete() {
    let (keyring, _dir) = setup().await;
    let alice = keyring.sign_up("alice@example.com", PASSWORD).await.unwrap();
    let bob = keyring.sign_up("bob@example.com", PASSWORD).await.unwrap();

    let record = keyring.save_password(&alice.token, "AliceOnly1!", None).await.unwrap();

    assert!(keyring.list_saved(&bob.token).await.unwrap().is_empty());

    let err = keyring.get_saved(&bob.token, record.id).await.unwrap_err();
    assert!(matches!(err, KeyringError::Db(DbError::NotFound)));

    let err = keyring.delete_saved(&bob.token, record.id).await.unwrap_err();
    assert!(matches!(err, KeyringError::Db(DbError::NotFound)));

    assert_eq!(keyring.count_saved(&alice.token).await.unwrap(), 1);
}

#[tokio::test]
async fn test_identity_scoped_methods_match_token_methods() {
    let (keyring, _dir) = setup().await;
    let alice = keyring.sign_up("alice@example.com", PASSWORD).await.unwrap();
    let bob = keyring.sign_up("bob@example.com", PASSWORD).await.unwrap();
    let alice_id = keyring.identify(&alice.token).unwrap();
    let bob_id = keyring.identify(&bob.token).unwrap();

    let record = keyring.save_password_for(&alice_id, "AliceOnly1!", Some(" vpn ")).await.unwrap();
    assert_eq!(record.label.as_deref(), Some("vpn"));
    assert_eq!(keyring.list_saved(&alice.token).await.unwrap(), vec![record.clone()]);
    assert_eq!(keyring.get_saved_for(&alice_id, record.id).await.unwrap(), record);
    assert_eq!(keyring.count_saved_for(&alice_id).await.unwrap(), 1);

    assert!(keyring.list_saved_for(&bob_id).await.unwrap().is_empty());
    let err = keyring.delete_saved_for(&bob_id, record.id).await.unwrap_err();
    assert!(matches!(err, KeyringError::Db(DbError::NotFound)));

    let err = keyring.save_password_for(&alice_id, "", None).await.unwrap_err();
    assert!(matches!(err, KeyringError::EmptyPassword));

    keyring.delete_saved_for(&alice_id, record.id).await.unwrap();
    assert_eq!(keyring.count_saved(&alice.token).await.unwrap(), 0);
}

// ─── Client state ───

#[tokio::test]
async fn test_client_state_generate_save_sign_out() {
    let (keyring, _dir) = setup().await;
    let client = ClientState::new(keyring.default_request());

    let client = state::generate(&client, &keyring).unwrap();
    let generated = client.current.clone().unwrap();

    let client = state::sign_up(&client, &keyring, "ada@example.com", PASSWORD).await.unwrap();
    assert!(client.is_signed_in());
    assert_eq!(client.current.as_ref(), Some(&generated));

    let client = state::save_current(&client, &keyring, Some("wifi")).await.unwrap();
    assert_eq!(client.saved.len(), 1);
    assert_eq!(client.saved[0].password_text, generated.password.as_str());
    assert_eq!(client.saved[0].label.as_deref(), Some("wifi"));

    let token = client.token().unwrap().to_string();
    let client = state::sign_out(&client, &keyring).unwrap();
    assert!(!client.is_signed_in());
    assert!(client.current.is_none());
    assert!(client.saved.is_empty());
    assert!(keyring.identify(&token).is_err());
}

#[tokio::test]
async fn test_client_state_sign_in_loads_saved_list() {
    let (keyring, _dir) = setup().await;
    let session = keyring.sign_up("ada@example.com", PASSWORD).await.unwrap();
    keyring.save_password(&session.token, "First1!first", None).await.unwrap();
    keyring.save_password(&session.token, "Second2@second", None).await.unwrap();

    let client = state::sign_in(&ClientState::default(), &keyring, "ada@example.com", PASSWORD)
        .await
        .unwrap();
    assert_eq!(client.saved.len(), 2);
    assert_eq!(client.saved[0].password_text, "Second2@second");

    let removed = client.saved[0].id;
    let client = state::delete_saved(&client, &keyring, removed).await.unwrap();
    assert_eq!(client.saved.len(), 1);
    assert!(client.saved.iter().all(|r| r.id != removed));

    let refreshed = state::refresh_saved(&client, &keyring).await.unwrap();
    assert_eq!(refreshed.saved, client.saved);
}

#[tokio::test]
async fn test_failed_generation_leaves_state_untouched() {
    let (keyring, _dir) = setup().await;
    let client = state::generate(&ClientState::default(), &keyring).unwrap();

    let no_classes = GenerationRequest {
        include_uppercase: false,
        include_lowercase: false,
        include_numbers: false,
        include_symbols: false,
        ..GenerationRequest::default()
    };
    let pending = state::set_request(&client, no_classes);

    let err = state::generate(&pending, &keyring).unwrap_err();
    assert_eq!(err, GeneratorError::NoCharacterClassSelected);
    assert_eq!(pending.current, client.current);
}

#[tokio::test]
async fn test_save_requires_session_and_password() {
    let (keyring, _dir) = setup().await;

    let signed_out = state::generate(&ClientState::default(), &keyring).unwrap();
    let err = state::save_current(&signed_out, &keyring, None).await.unwrap_err();
    assert!(matches!(err, KeyringError::Auth(AuthError::InvalidSession)));

    let signed_in = state::sign_up(&ClientState::default(), &keyring, "ada@example.com", PASSWORD)
        .await
        .unwrap();
    let err = state::save_current(&signed_in, &keyring, None).await.unwrap_err();
    assert!(matches!(err, KeyringError::EmptyPassword));
}

#[tokio::test]
async fn test_sign_out_after_session_vanished_still_clears_state() {
    let (keyring, _dir) = setup().await;
    let client = state::sign_up(&ClientState::default(), &keyring, "ada@example.com", PASSWORD)
        .await
        .unwrap();

    keyring.sign_out(client.token().unwrap()).unwrap();

    let client = state::sign_out(&client, &keyring).unwrap();
    assert!(!client.is_signed_in());
}
