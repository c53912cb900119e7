// src/api/types.rs
use chrono::{DateTime, Utc};
use serde::{Serialize, Deserialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::{GenerationRequest, SavedPassword, StrengthReport};

// Authentication requests and responses
#[derive(Serialize, Deserialize, ToSchema)]
pub struct AuthRequest {
    /// Account email address
    pub email: String,
    /// Account password
    pub password: String,
}

#[derive(Serialize, Deserialize, ToSchema)]
pub struct TokenResponse {
    /// Whether the operation was successful
    pub success: bool,
    /// JWT token for authenticated requests (only present on success)
    pub token: Option<String>,
    /// Normalized account email (only present on success)
    pub email: Option<String>,
    /// Error message (only present on failure)
    pub error: Option<String>,
}

impl TokenResponse {
    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            token: None,
            email: None,
            error: Some(error.into()),
        }
    }
}

#[derive(Serialize, Deserialize, ToSchema)]
pub struct StatusResponse {
    /// Whether the operation was successful
    pub success: bool,
    /// Whether the bearer token belongs to a live session
    pub authenticated: bool,
}

#[derive(Serialize, Deserialize, ToSchema)]
pub struct SuccessResponse {
    /// Whether the operation was successful
    pub success: bool,
    /// Success message (only present on success)
    pub message: Option<String>,
    /// Error message (only present on failure)
    pub error: Option<String>,
}

impl SuccessResponse {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
            error: None,
        }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            message: None,
            error: Some(error.into()),
        }
    }
}

// Generator types
#[derive(Debug, Default, Serialize, Deserialize, ToSchema)]
pub struct PasswordGenerationRequest {
    /// Password length, 8 to 128 (defaults to the configured length)
    pub length: Option<usize>,
    /// Include uppercase letters (default true)
    pub include_uppercase: Option<bool>,
    /// Include lowercase letters (default true)
    pub include_lowercase: Option<bool>,
    /// Include digits (default true)
    pub include_numbers: Option<bool>,
    /// Include symbols (default true)
    pub include_symbols: Option<bool>,
}

impl PasswordGenerationRequest {
    /// Fills unset fields from `defaults`.
    pub fn resolve(&self, defaults: GenerationRequest) -> GenerationRequest {
        GenerationRequest {
            length: self.length.unwrap_or(defaults.length),
            include_uppercase: self.include_uppercase.unwrap_or(defaults.include_uppercase),
            include_lowercase: self.include_lowercase.unwrap_or(defaults.include_lowercase),
            include_numbers: self.include_numbers.unwrap_or(defaults.include_numbers),
            include_symbols: self.include_symbols.unwrap_or(defaults.include_symbols),
        }
    }
}

#[derive(Serialize, Deserialize, ToSchema)]
pub struct PasswordGenerationResponse {
    /// Whether the operation was successful
    pub success: bool,
    /// Generated password (only present on success)
    pub password: Option<String>,
    /// Strength of the request that produced the password
    pub strength: Option<StrengthReport>,
    /// Error message (only present on failure)
    pub error: Option<String>,
}

#[derive(Serialize, Deserialize, ToSchema)]
pub struct StrengthResponse {
    /// Whether the operation was successful
    pub success: bool,
    /// Score and tier for the request
    pub strength: Option<StrengthReport>,
    /// Error message (only present on failure)
    pub error: Option<String>,
}

// Saved password types
#[derive(Serialize, Deserialize, ToSchema)]
pub struct SavePasswordRequest {
    /// Password text to store
    pub password: String,
    /// Optional label, e.g. the site it is for
    pub label: Option<String>,
}

#[derive(Serialize, Deserialize, ToSchema)]
pub struct SavedPasswordEntry {
    pub id: Uuid,
    pub password: String,
    pub label: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<SavedPassword> for SavedPasswordEntry {
    fn from(record: SavedPassword) -> Self {
        Self {
            id: record.id,
            password: record.password_text,
            label: record.label,
            created_at: record.created_at,
        }
    }
}

#[derive(Serialize, Deserialize, ToSchema)]
pub struct PasswordListResponse {
    /// Whether the operation was successful
    pub success: bool,
    /// Saved passwords, newest first
    pub passwords: Vec<SavedPasswordEntry>,
    /// Error message (only present on failure)
    pub error: Option<String>,
}

#[derive(Serialize, Deserialize, ToSchema)]
pub struct SavedPasswordResponse {
    /// Whether the operation was successful
    pub success: bool,
    /// The record (only present on success)
    pub entry: Option<SavedPasswordEntry>,
    /// Error message (only present on failure)
    pub error: Option<String>,
}

#[derive(Serialize, Deserialize, ToSchema)]
pub struct CountResponse {
    /// Whether the operation was successful
    pub success: bool,
    /// Number of saved passwords for the account
    pub count: usize,
    /// Error message (only present on failure)
    pub error: Option<String>,
}
