// src/core/state.rs
//! Caller-owned client state.
//!
//! A surface (the interactive menu, a test, an embedding UI) keeps one
//! [`ClientState`] and threads it through these functions. Every function takes
//! the current state by reference and returns the next one, so a failed call
//! leaves the caller's state untouched.

use uuid::Uuid;

use crate::core::auth::AuthError;
use crate::core::keyring::{Keyring, KeyringError, Result};
use crate::generators::GeneratorError;
use crate::models::{GeneratedPassword, GenerationRequest, SavedPassword, Session, StrengthReport};

#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedOutput {
    pub password: GeneratedPassword,
    pub strength: StrengthReport,
}

#[derive(Debug, Clone, Default)]
pub struct ClientState {
    pub request: GenerationRequest,
    pub current: Option<GeneratedOutput>,
    pub session: Option<Session>,
    pub saved: Vec<SavedPassword>,
}

impl ClientState {
    pub fn new(request: GenerationRequest) -> Self {
        Self {
            request,
            ..Self::default()
        }
    }

    pub fn is_signed_in(&self) -> bool {
        self.session.is_some()
    }

    pub fn token(&self) -> Option<&str> {
        self.session.as_ref().map(|s| s.token.as_str())
    }

    /// Strength of the pending request, whether or not anything was generated yet.
    pub fn strength(&self, keyring: &Keyring) -> StrengthReport {
        keyring.strength(&self.request)
    }
}

pub fn set_request(state: &ClientState, request: GenerationRequest) -> ClientState {
    ClientState {
        request,
        ..state.clone()
    }
}

/// Replaces the current password with a fresh one for `state.request`.
pub fn generate(state: &ClientState, keyring: &Keyring) -> std::result::Result<ClientState, GeneratorError> {
    let (password, strength) = keyring.generate(&state.request)?;

    Ok(ClientState {
        current: Some(GeneratedOutput { password, strength }),
        ..state.clone()
    })
}

pub async fn sign_up(state: &ClientState, keyring: &Keyring, email: &str, password: &str) -> Result<ClientState> {
    let session = keyring.sign_up(email, password).await?;
    Ok(signed_in(state, session, Vec::new()))
}

pub async fn sign_in(state: &ClientState, keyring: &Keyring, email: &str, password: &str) -> Result<ClientState> {
    let session = keyring.sign_in(email, password).await?;
    let saved = keyring.list_saved(&session.token).await?;
    Ok(signed_in(state, session, saved))
}

fn signed_in(state: &ClientState, session: Session, saved: Vec<SavedPassword>) -> ClientState {
    ClientState {
        session: Some(session),
        saved,
        ..state.clone()
    }
}

/// Ends the session and drops the current password and the saved list.
///
/// A session that already expired or vanished server-side still signs out locally.
pub fn sign_out(state: &ClientState, keyring: &Keyring) -> Result<ClientState> {
    if let Some(token) = state.token() {
        match keyring.sign_out(token) {
            Ok(()) => {}
            Err(KeyringError::Auth(AuthError::SessionExpired | AuthError::InvalidSession)) => {
                log::debug!("Session already ended, clearing local state");
            }
            Err(e) => return Err(e),
        }
    }

    Ok(ClientState::new(state.request))
}

pub async fn refresh_saved(state: &ClientState, keyring: &Keyring) -> Result<ClientState> {
    let token = require_token(state)?;
    let saved = keyring.list_saved(token).await?;

    Ok(ClientState {
        saved,
        ..state.clone()
    })
}

/// Persists the current password under the signed-in account.
pub async fn save_current(state: &ClientState, keyring: &Keyring, label: Option<&str>) -> Result<ClientState> {
    let token = require_token(state)?;
    let current = state.current.as_ref().ok_or(KeyringError::EmptyPassword)?;

    let record = keyring.save_password(token, current.password.as_str(), label).await?;

    let mut saved = Vec::with_capacity(state.saved.len() + 1);
    saved.push(record);
    saved.extend(state.saved.iter().cloned());

    Ok(ClientState {
        saved,
        ..state.clone()
    })
}

pub async fn delete_saved(state: &ClientState, keyring: &Keyring, id: Uuid) -> Result<ClientState> {
    let token = require_token(state)?;
    keyring.delete_saved(token, id).await?;

    Ok(ClientState {
        saved: state.saved.iter().filter(|r| r.id != id).cloned().collect(),
        ..state.clone()
    })
}

fn require_token(state: &ClientState) -> Result<&str> {
    state.token().ok_or(KeyringError::Auth(AuthError::InvalidSession))
}
