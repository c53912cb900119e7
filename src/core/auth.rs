// src/core/auth.rs
use chrono::{Duration, Utc};
use jsonwebtoken::{encode, decode, Header, EncodingKey, DecodingKey, Validation, Algorithm};
use serde::{Serialize, Deserialize};
use uuid::Uuid;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use std::time::SystemTime;
use thiserror::Error;

use crate::core::config::Config;
use crate::crypto::{self, KdfParams};
use crate::db::{Database, DbError};
use crate::models::{Account, Identity, Session};

pub const MIN_ACCOUNT_PASSWORD_LENGTH: usize = 6;

// Define JWT claims
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    // Subject (account ID)
    pub sub: String,
    // Issued at
    pub iat: i64,
    // Expiration time
    pub exp: i64,
    // Session ID
    pub sid: String,
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Invalid email address: {0}")]
    InvalidEmail(String),

    #[error("Password must be at least {0} characters")]
    WeakPassword(usize),

    #[error("An account already exists for {0}")]
    EmailTaken(String),

    #[error("JWT error: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Session expired")]
    SessionExpired,

    #[error("Invalid session")]
    InvalidSession,

    #[error("Crypto error: {0}")]
    CryptoError(#[from] crate::crypto::CryptoError),

    #[error("Database error: {0}")]
    DbError(DbError),
}

impl From<DbError> for AuthError {
    fn from(e: DbError) -> Self {
        match e {
            DbError::EmailTaken(email) => AuthError::EmailTaken(email),
            other => AuthError::DbError(other),
        }
    }
}

pub type Result<T> = std::result::Result<T, AuthError>;

/// Trims and lowercases an email, rejecting anything without a local part and a domain.
pub fn normalize_email(email: &str) -> Result<String> {
    let email = email.trim().to_lowercase();

    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() && !domain.contains('@') => Ok(email),
        _ => Err(AuthError::InvalidEmail(email)),
    }
}

pub struct AuthManager {
    jwt_secret: String,
    session_dir: PathBuf,
    session_duration: Duration,
    kdf: KdfParams,
    // Hash verified against when the email is unknown
    dummy_hash: OnceLock<String>,
}

impl AuthManager {
    pub fn new(session_dir: PathBuf, session_duration: std::time::Duration, kdf: KdfParams) -> Result<Self> {
        // Create session directory if it doesn't exist
        if !session_dir.exists() {
            fs::create_dir_all(&session_dir)?;
        }

        let jwt_secret = Self::get_or_create_jwt_secret(&session_dir)?;

        let removed = Self::sweep_expired_sessions(&session_dir, session_duration)?;
        if removed > 0 {
            log::info!("Removed {} expired session file(s)", removed);
        }

        let session_duration = Duration::from_std(session_duration)
            .unwrap_or_else(|_| Duration::hours(1));

        Ok(Self {
            jwt_secret,
            session_dir,
            session_duration,
            kdf,
            dummy_hash: OnceLock::new(),
        })
    }

    /// Deletes session files written longer than `max_age` ago.
    ///
    /// A session file is written when its token is issued, so one older than
    /// the session duration belongs to a token that can no longer validate.
    fn sweep_expired_sessions(session_dir: &Path, max_age: std::time::Duration) -> Result<usize> {
        let now = SystemTime::now();
        let mut removed = 0;

        for entry in fs::read_dir(session_dir)? {
            let entry = entry?;

            // Session files are named by session id; skip jwt_secret and strangers
            let is_session = entry
                .file_name()
                .to_str()
                .map_or(false, |name| Uuid::parse_str(name).is_ok());
            if !is_session {
                continue;
            }

            let modified = match entry.metadata().and_then(|m| m.modified()) {
                Ok(modified) => modified,
                Err(e) => {
                    log::warn!("Cannot read age of session file {:?}: {}", entry.path(), e);
                    continue;
                }
            };

            if now.duration_since(modified).unwrap_or_default() > max_age {
                match fs::remove_file(entry.path()) {
                    Ok(()) => removed += 1,
                    Err(e) => log::warn!("Failed to remove expired session {:?}: {}", entry.path(), e),
                }
            }
        }

        Ok(removed)
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(config.session_directory(), config.session_duration, config.kdf_params())
    }

    // Get or create JWT secret
    fn get_or_create_jwt_secret(session_dir: &Path) -> Result<String> {
        let secret_file = session_dir.join("jwt_secret");

        if secret_file.exists() {
            let secret = fs::read_to_string(&secret_file)?;
            if !secret.trim().is_empty() {
                return Ok(secret.trim().to_string());
            }
            log::warn!("Empty JWT secret file, generating a new one");
        }

        let secret = crypto::generate_secret();
        fs::write(&secret_file, &secret)?;

        Ok(secret)
    }

    /// Creates an account and signs it in.
    pub async fn sign_up(&self, db: &Database, email: &str, password: &str) -> Result<Session> {
        let email = normalize_email(email)?;

        if password.chars().count() < MIN_ACCOUNT_PASSWORD_LENGTH {
            return Err(AuthError::WeakPassword(MIN_ACCOUNT_PASSWORD_LENGTH));
        }

        let password_hash = crypto::hash_password_blocking(password, self.kdf).await?;
        let account = db.create_account(&email, &password_hash).await?;

        log::info!("Created account {} ({})", account.id, account.email);
        self.issue_session(&account)
    }

    pub async fn sign_in(&self, db: &Database, email: &str, password: &str) -> Result<Session> {
        let email = normalize_email(email)?;

        let account = match db.get_account_by_email(&email).await? {
            Some(account) => account,
            None => {
                log::warn!("Sign-in attempt for unknown account {}", email);
                // Same Argon2 work as a registered account
                let dummy_hash = self.dummy_hash().await?;
                crypto::verify_password_blocking(password, &dummy_hash).await?;
                return Err(AuthError::InvalidCredentials);
            }
        };

        if !crypto::verify_password_blocking(password, &account.password_hash).await? {
            log::warn!("Invalid password for account {}", email);
            return Err(AuthError::InvalidCredentials);
        }

        log::info!("Account {} signed in", account.email);
        self.issue_session(&account)
    }

    async fn dummy_hash(&self) -> Result<String> {
        if let Some(hash) = self.dummy_hash.get() {
            return Ok(hash.clone());
        }

        let hash = crypto::hash_password_blocking(&Uuid::new_v4().to_string(), self.kdf).await?;
        Ok(self.dummy_hash.get_or_init(|| hash).clone())
    }

    fn issue_session(&self, account: &Account) -> Result<Session> {
        let session_id = Uuid::new_v4().to_string();
        let now = Utc::now();

        let claims = Claims {
            sub: account.id.to_string(),
            iat: now.timestamp(),
            exp: (now + self.session_duration).timestamp(),
            sid: session_id.clone(),
        };

        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.jwt_secret.as_bytes()),
        )?;

        // The session file ties the session id to its account
        fs::write(self.session_dir.join(&session_id), account.id.to_string())?;

        Ok(Session {
            token,
            user_id: account.id,
            email: account.email.clone(),
        })
    }

    // Validate JWT token and return the identity behind it
    pub fn validate_token(&self, token: &str) -> Result<Identity> {
        let mut validation = Validation::new(Algorithm::HS256);
        // Expiry is checked below, where the dead session file can be removed
        validation.validate_exp = false;

        let token_data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.jwt_secret.as_bytes()),
            &validation,
        )?;

        let claims = token_data.claims;

        let user_id = Uuid::parse_str(&claims.sub).map_err(|_| AuthError::InvalidSession)?;

        // Session ids are UUIDs; anything else must not reach the filesystem
        if Uuid::parse_str(&claims.sid).is_err() {
            return Err(AuthError::InvalidSession);
        }

        if claims.exp < Utc::now().timestamp() {
            self.clear_session(&claims.sid)?;
            log::debug!("Session {} expired and was removed", claims.sid);
            return Err(AuthError::SessionExpired);
        }

        let session_file = self.session_dir.join(&claims.sid);
        if !session_file.exists() {
            return Err(AuthError::InvalidSession);
        }

        let owner = fs::read_to_string(&session_file)?;
        if owner.trim() != claims.sub {
            return Err(AuthError::InvalidSession);
        }

        Ok(Identity {
            user_id,
            session_id: claims.sid,
        })
    }

    /// Ends the session behind `token`. The token stops validating immediately.
    pub fn sign_out(&self, token: &str) -> Result<()> {
        let identity = self.validate_token(token)?;
        self.clear_session(&identity.session_id)
    }

    // Clear session
    pub fn clear_session(&self, session_id: &str) -> Result<()> {
        let session_file = self.session_dir.join(session_id);
        if session_file.exists() {
            fs::remove_file(session_file)?;
        }
        Ok(())
    }
}
