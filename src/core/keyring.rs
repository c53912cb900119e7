// src/core/keyring.rs
use std::sync::Arc;
use thiserror::Error;
use uuid::Uuid;

use crate::core::auth::{AuthError, AuthManager};
use crate::core::config::Config;
use crate::db::{Database, DbError};
use crate::generators::{self, GeneratorError, PasswordGenerator};
use crate::models::{
    GeneratedPassword, GenerationRequest, Identity, SavedPassword, Session, StrengthReport,
};

#[derive(Debug, Error)]
pub enum KeyringError {
    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Db(#[from] DbError),

    #[error(transparent)]
    Generator(#[from] GeneratorError),

    #[error("Password text must not be empty")]
    EmptyPassword,
}

pub type Result<T> = std::result::Result<T, KeyringError>;

/// Everything a surface needs: generation, accounts and each account's saved passwords.
pub struct Keyring {
    db: Arc<Database>,
    pub auth_manager: AuthManager,
    generator: PasswordGenerator,
    default_length: usize,
}

impl Keyring {
    pub fn new(db: Arc<Database>, auth_manager: AuthManager, generator: PasswordGenerator) -> Self {
        Self {
            db,
            auth_manager,
            generator,
            default_length: GenerationRequest::default().length,
        }
    }

    pub fn from_config(db: Arc<Database>, config: &Config) -> std::result::Result<Self, AuthError> {
        let auth_manager = AuthManager::from_config(config)?;
        let generator = PasswordGenerator::with_shuffle_source(config.shuffle_source);

        Ok(Self {
            default_length: config.default_password_length,
            ..Self::new(db, auth_manager, generator)
        })
    }

    /// All classes on, configured default length.
    pub fn default_request(&self) -> GenerationRequest {
        GenerationRequest::with_length(self.default_length)
    }

    pub fn generate(&self, request: &GenerationRequest) -> std::result::Result<(GeneratedPassword, StrengthReport), GeneratorError> {
        generators::validate_request(request)?;
        let password = self.generator.generate_password(request)?;
        let strength = generators::classify_strength(request);
        log::debug!("Generated {}-character password ({})", password.len(), strength.tier);
        Ok((password, strength))
    }

    pub fn strength(&self, request: &GenerationRequest) -> StrengthReport {
        generators::classify_strength(request)
    }

    pub async fn sign_up(&self, email: &str, password: &str) -> Result<Session> {
        Ok(self.auth_manager.sign_up(&self.db, email, password).await?)
    }

    pub async fn sign_in(&self, email: &str, password: &str) -> Result<Session> {
        Ok(self.auth_manager.sign_in(&self.db, email, password).await?)
    }

    pub fn sign_out(&self, token: &str) -> Result<()> {
        Ok(self.auth_manager.sign_out(token)?)
    }

    pub fn identify(&self, token: &str) -> Result<Identity> {
        Ok(self.auth_manager.validate_token(token)?)
    }

    pub async fn save_password(&self, token: &str, password_text: &str, label: Option<&str>) -> Result<SavedPassword> {
        let identity = self.identify(token)?;
        self.save_password_for(&identity, password_text, label).await
    }

    pub async fn list_saved(&self, token: &str) -> Result<Vec<SavedPassword>> {
        let identity = self.identify(token)?;
        self.list_saved_for(&identity).await
    }

    pub async fn get_saved(&self, token: &str, id: Uuid) -> Result<SavedPassword> {
        let identity = self.identify(token)?;
        self.get_saved_for(&identity, id).await
    }

    pub async fn delete_saved(&self, token: &str, id: Uuid) -> Result<()> {
        let identity = self.identify(token)?;
        self.delete_saved_for(&identity, id).await
    }

    pub async fn count_saved(&self, token: &str) -> Result<usize> {
        let identity = self.identify(token)?;
        self.count_saved_for(&identity).await
    }

    // Identity-scoped variants for callers that already validated the token,
    // such as the API token middleware.

    pub async fn save_password_for(&self, identity: &Identity, password_text: &str, label: Option<&str>) -> Result<SavedPassword> {
        if password_text.is_empty() {
            return Err(KeyringError::EmptyPassword);
        }

        let label = label.map(str::trim).filter(|l| !l.is_empty());
        let record = self.db.add_saved_password(identity.user_id, password_text, label).await?;

        log::info!("Saved password {} for account {}", record.id, identity.user_id);
        Ok(record)
    }

    pub async fn list_saved_for(&self, identity: &Identity) -> Result<Vec<SavedPassword>> {
        Ok(self.db.list_saved_passwords(identity.user_id).await?)
    }

    pub async fn get_saved_for(&self, identity: &Identity, id: Uuid) -> Result<SavedPassword> {
        Ok(self.db.get_saved_password(identity.user_id, id).await?)
    }

    pub async fn delete_saved_for(&self, identity: &Identity, id: Uuid) -> Result<()> {
        self.db.delete_saved_password(identity.user_id, id).await?;
        log::info!("Deleted saved password {} for account {}", id, identity.user_id);
        Ok(())
    }

    pub async fn count_saved_for(&self, identity: &Identity) -> Result<usize> {
        Ok(self.db.count_saved_passwords(identity.user_id).await?)
    }
}
