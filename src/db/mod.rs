// src/db/mod.rs
use uuid::Uuid;
use crate::models::{Account, SavedPassword};
use thiserror::Error;

pub mod postgres;
pub mod sqlite;

#[derive(Debug, Error)]
pub enum DbError {
    #[error("Database error: {0}")]
    SqlxError(String),

    #[error("Record not found")]
    NotFound,

    #[error("An account already exists for {0}")]
    EmailTaken(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Initialization error: {0}")]
    InitError(String),
}

// Convert database-specific errors to our DbError
impl From<sqlx::Error> for DbError {
    fn from(error: sqlx::Error) -> Self {
        DbError::SqlxError(error.to_string())
    }
}

/// True when the error is a UNIQUE constraint violation.
pub(crate) fn is_unique_violation(error: &sqlx::Error) -> bool {
    match error {
        sqlx::Error::Database(db_err) => db_err.is_unique_violation(),
        _ => false,
    }
}

// Database backend trait - to be implemented by each database type.
// Saved-password operations always take the owner id; rows belonging to
// another owner are invisible to every query.
pub trait DatabaseBackend: Send + Sync {
    async fn init(&mut self, connection_string: &str) -> Result<(), DbError>;

    // Account operations
    async fn create_account(&self, email: &str, password_hash: &str) -> Result<Account, DbError>;

    async fn get_account_by_email(&self, email: &str) -> Result<Option<Account>, DbError>;

    async fn get_account_by_id(&self, id: Uuid) -> Result<Option<Account>, DbError>;

    // Saved password operations
    async fn add_saved_password(
        &self,
        owner_id: Uuid,
        password_text: &str,
        label: Option<&str>,
    ) -> Result<SavedPassword, DbError>;

    async fn list_saved_passwords(&self, owner_id: Uuid) -> Result<Vec<SavedPassword>, DbError>;

    async fn get_saved_password(&self, owner_id: Uuid, id: Uuid) -> Result<SavedPassword, DbError>;

    async fn delete_saved_password(&self, owner_id: Uuid, id: Uuid) -> Result<(), DbError>;

    async fn count_saved_passwords(&self, owner_id: Uuid) -> Result<usize, DbError>;
}

// Enum to hold specific backend implementations
#[derive(Debug, Clone)]
pub enum DatabaseType {
    Postgres(postgres::PostgresBackend),
    Sqlite(sqlite::SqliteBackend),
}

// The main database struct that uses the enum pattern instead of trait objects
#[derive(Debug, Clone)]
pub struct Database {
    pub backend: DatabaseType,
}

impl Database {
    // Create a new database connection, auto-detecting the backend from the URL
    pub async fn new(connection_string: &str) -> Result<Self, DbError> {
        if connection_string.starts_with("sqlite:") {
            let mut backend = sqlite::SqliteBackend::new();
            backend.init(connection_string).await?;
            Ok(Self {
                backend: DatabaseType::Sqlite(backend),
            })
        } else if connection_string.starts_with("postgres:") || connection_string.starts_with("postgresql:") {
            let mut backend = postgres::PostgresBackend::new();
            match backend.init(connection_string).await {
                Ok(_) => Ok(Self {
                    backend: DatabaseType::Postgres(backend),
                }),
                Err(e) => {
                    // If PostgreSQL fails, try SQLite as fallback
                    log::warn!("PostgreSQL connection failed: {}. Falling back to SQLite.", e);
                    let mut sqlite_backend = sqlite::SqliteBackend::new();
                    sqlite_backend.init(sqlite::FALLBACK_URL).await?;
                    Ok(Self {
                        backend: DatabaseType::Sqlite(sqlite_backend),
                    })
                }
            }
        } else {
            Err(DbError::ConfigError(format!(
                "Unsupported database URL scheme: {}",
                connection_string.split(':').next().unwrap_or_default()
            )))
        }
    }

    pub async fn create_account(&self, email: &str, password_hash: &str) -> Result<Account, DbError> {
        match &self.backend {
            DatabaseType::Postgres(backend) => backend.create_account(email, password_hash).await,
            DatabaseType::Sqlite(backend) => backend.create_account(email, password_hash).await,
        }
    }

    pub async fn get_account_by_email(&self, email: &str) -> Result<Option<Account>, DbError> {
        match &self.backend {
            DatabaseType::Postgres(backend) => backend.get_account_by_email(email).await,
            DatabaseType::Sqlite(backend) => backend.get_account_by_email(email).await,
        }
    }

    pub async fn get_account_by_id(&self, id: Uuid) -> Result<Option<Account>, DbError> {
        match &self.backend {
            DatabaseType::Postgres(backend) => backend.get_account_by_id(id).await,
            DatabaseType::Sqlite(backend) => backend.get_account_by_id(id).await,
        }
    }

    pub async fn add_saved_password(
        &self,
        owner_id: Uuid,
        password_text: &str,
        label: Option<&str>,
    ) -> Result<SavedPassword, DbError> {
        match &self.backend {
            DatabaseType::Postgres(backend) => backend.add_saved_password(owner_id, password_text, label).await,
            DatabaseType::Sqlite(backend) => backend.add_saved_password(owner_id, password_text, label).await,
        }
    }

    pub async fn list_saved_passwords(&self, owner_id: Uuid) -> Result<Vec<SavedPassword>, DbError> {
        match &self.backend {
            DatabaseType::Postgres(backend) => backend.list_saved_passwords(owner_id).await,
            DatabaseType::Sqlite(backend) => backend.list_saved_passwords(owner_id).await,
        }
    }

    pub async fn get_saved_password(&self, owner_id: Uuid, id: Uuid) -> Result<SavedPassword, DbError> {
        match &self.backend {
            DatabaseType::Postgres(backend) => backend.get_saved_password(owner_id, id).await,
            DatabaseType::Sqlite(backend) => backend.get_saved_password(owner_id, id).await,
        }
    }

    pub async fn delete_saved_password(&self, owner_id: Uuid, id: Uuid) -> Result<(), DbError> {
        match &self.backend {
            DatabaseType::Postgres(backend) => backend.delete_saved_password(owner_id, id).await,
            DatabaseType::Sqlite(backend) => backend.delete_saved_password(owner_id, id).await,
        }
    }

    pub async fn count_saved_passwords(&self, owner_id: Uuid) -> Result<usize, DbError> {
        match &self.backend {
            DatabaseType::Postgres(backend) => backend.count_saved_passwords(owner_id).await,
            DatabaseType::Sqlite(backend) => backend.count_saved_passwords(owner_id).await,
        }
    }

    pub fn get_backend_type(&self) -> &str {
        match &self.backend {
            DatabaseType::Sqlite(_) => "SQLite",
            DatabaseType::Postgres(_) => "PostgreSQL",
        }
    }
}

// Function to initialize the database
pub async fn init_db(db_url: &str) -> Result<Database, DbError> {
    Database::new(db_url).await
}
