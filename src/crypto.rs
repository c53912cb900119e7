// src/crypto.rs
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, SaltString},
    Argon2, PasswordHasher, PasswordVerifier,
};
use base64::Engine;
use rand::RngCore;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CryptoError {
    #[error("Argon2 error: {0}")]
    Argon2Error(String),

    #[error("Invalid data format: {0}")]
    InvalidFormat(String),
}

pub type Result<T> = std::result::Result<T, CryptoError>;

/// Argon2id cost parameters for account password hashes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KdfParams {
    pub memory_cost: u32,
    pub time_cost: u32,
    pub parallelism: u32,
}

impl Default for KdfParams {
    fn default() -> Self {
        Self {
            memory_cost: 65536, // 64 MB
            time_cost: 3,
            parallelism: 4,
        }
    }
}

impl KdfParams {
    fn argon2(&self) -> Result<Argon2<'static>> {
        let params = argon2::Params::new(self.memory_cost, self.time_cost, self.parallelism, None)
            .map_err(|e| CryptoError::Argon2Error(e.to_string()))?;

        Ok(Argon2::new(argon2::Algorithm::Argon2id, argon2::Version::V0x13, params))
    }
}

// Hash an account password into a PHC string
pub fn hash_password(password: &str, params: &KdfParams) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = params.argon2()?;

    let password_hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| CryptoError::Argon2Error(e.to_string()))?;

    Ok(password_hash.to_string())
}

// Verify an account password against a stored PHC string
pub fn verify_password(password: &str, stored_hash: &str) -> Result<bool> {
    let parsed_hash = PasswordHash::new(stored_hash)
        .map_err(|e| CryptoError::InvalidFormat(format!("Invalid hash format: {}", e)))?;

    // Cost parameters are read from the PHC string
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

/// [`hash_password`] on tokio's blocking pool, off the async workers.
pub async fn hash_password_blocking(password: &str, params: KdfParams) -> Result<String> {
    let password = password.to_owned();
    tokio::task::spawn_blocking(move || hash_password(&password, &params))
        .await
        .map_err(|e| CryptoError::Argon2Error(format!("Hashing task failed: {}", e)))?
}

/// [`verify_password`] on tokio's blocking pool.
pub async fn verify_password_blocking(password: &str, stored_hash: &str) -> Result<bool> {
    let password = password.to_owned();
    let stored_hash = stored_hash.to_owned();
    tokio::task::spawn_blocking(move || verify_password(&password, &stored_hash))
        .await
        .map_err(|e| CryptoError::Argon2Error(format!("Verification task failed: {}", e)))?
}

/// Random secret for signing session tokens, base64 encoded.
pub fn generate_secret() -> String {
    let mut secret = [0u8; 32];
    rand::rngs::OsRng.fill_bytes(&mut secret);
    base64::engine::general_purpose::STANDARD.encode(secret)
}
