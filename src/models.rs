// src/models.rs
use uuid::Uuid;
use chrono::{DateTime, Utc};
use serde::{Serialize, Deserialize};
use utoipa::ToSchema;
use std::fmt;

pub const MIN_PASSWORD_LENGTH: usize = 8;
pub const MAX_PASSWORD_LENGTH: usize = 128;

// Password generation request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct GenerationRequest {
    pub length: usize,
    pub include_uppercase: bool,
    pub include_lowercase: bool,
    pub include_numbers: bool,
    pub include_symbols: bool,
}

impl Default for GenerationRequest {
    fn default() -> Self {
        Self {
            length: 16,
            include_uppercase: true,
            include_lowercase: true,
            include_numbers: true,
            include_symbols: true,
        }
    }
}

impl GenerationRequest {
    pub fn with_length(length: usize) -> Self {
        Self {
            length,
            ..Self::default()
        }
    }

    /// Number of character classes switched on.
    pub fn enabled_class_count(&self) -> usize {
        [
            self.include_uppercase,
            self.include_lowercase,
            self.include_numbers,
            self.include_symbols,
        ]
        .iter()
        .filter(|enabled| **enabled)
        .count()
    }

    pub fn has_any_class(&self) -> bool {
        self.enabled_class_count() > 0
    }

    pub fn length_in_range(&self) -> bool {
        (MIN_PASSWORD_LENGTH..=MAX_PASSWORD_LENGTH).contains(&self.length)
    }
}

/// A freshly generated password. Held by the caller until the next generation
/// or sign-out; never persisted on its own.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GeneratedPassword(String);

impl GeneratedPassword {
    pub(crate) fn new(text: String) -> Self {
        Self(text)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Length in characters.
    pub fn len(&self) -> usize {
        self.0.chars().count()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

// Keep generated text out of debug logs
impl fmt::Debug for GeneratedPassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "GeneratedPassword({} chars)", self.len())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ToSchema)]
pub enum StrengthTier {
    Weak,
    Medium,
    Strong,
    #[serde(rename = "Very Strong")]
    VeryStrong,
}

impl StrengthTier {
    pub fn from_score(score: u8) -> Self {
        match score {
            0..=2 => StrengthTier::Weak,
            3..=4 => StrengthTier::Medium,
            5..=6 => StrengthTier::Strong,
            _ => StrengthTier::VeryStrong,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            StrengthTier::Weak => "Weak",
            StrengthTier::Medium => "Medium",
            StrengthTier::Strong => "Strong",
            StrengthTier::VeryStrong => "Very Strong",
        }
    }
}

impl fmt::Display for StrengthTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct StrengthReport {
    /// Points out of 7
    pub score: u8,
    pub tier: StrengthTier,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct SavedPassword {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub password_text: String,
    pub label: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct Account {
    pub id: Uuid,
    pub email: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

/// Identity resolved from a valid session token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub user_id: Uuid,
    pub session_id: String,
}

/// Result of a successful sign-up or sign-in.
#[derive(Debug, Clone)]
pub struct Session {
    pub token: String,
    pub user_id: Uuid,
    pub email: String,
}
