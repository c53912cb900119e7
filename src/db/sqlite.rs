// src/db/sqlite.rs
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::Row;
use uuid::Uuid;
use std::path::Path;
use std::str::FromStr;
use chrono::{DateTime, SecondsFormat, SubsecRound, Utc};

use crate::models::{Account, SavedPassword};
use super::{is_unique_violation, DatabaseBackend, DbError};

pub const FALLBACK_URL: &str = "sqlite:passgen.db";

#[derive(Debug, Clone)]
pub struct SqliteBackend {
    pool: Option<SqlitePool>,
}

impl Default for SqliteBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl SqliteBackend {
    pub fn new() -> Self {
        Self { pool: None }
    }

    // Helper to get the pool or return an error
    fn get_pool(&self) -> Result<&SqlitePool, DbError> {
        self.pool.as_ref().ok_or(DbError::InitError("Database not initialized".into()))
    }
}

// Fixed-width timestamps so TEXT ordering matches time ordering
fn format_timestamp(time: DateTime<Utc>) -> String {
    time.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn parse_timestamp(value: &str) -> Result<DateTime<Utc>, DbError> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| DbError::SqlxError(format!("Invalid datetime: {}", e)))
}

fn parse_uuid(value: &str) -> Result<Uuid, DbError> {
    Uuid::parse_str(value).map_err(|e| DbError::SqlxError(format!("Invalid UUID: {}", e)))
}

fn account_from_row(row: &SqliteRow) -> Result<Account, DbError> {
    let id: String = row.try_get("id")?;
    let created_at: String = row.try_get("created_at")?;

    Ok(Account {
        id: parse_uuid(&id)?,
        email: row.try_get("email")?,
        password_hash: row.try_get("password_hash")?,
        created_at: parse_timestamp(&created_at)?,
    })
}

fn saved_password_from_row(row: &SqliteRow) -> Result<SavedPassword, DbError> {
    let id: String = row.try_get("id")?;
    let owner_id: String = row.try_get("owner_id")?;
    let created_at: String = row.try_get("created_at")?;

    Ok(SavedPassword {
        id: parse_uuid(&id)?,
        owner_id: parse_uuid(&owner_id)?,
        password_text: row.try_get("password_text")?,
        label: row.try_get("label")?,
        created_at: parse_timestamp(&created_at)?,
    })
}

impl DatabaseBackend for SqliteBackend {
    async fn init(&mut self, connection_string: &str) -> Result<(), DbError> {
        let db_path = connection_string
            .strip_prefix("sqlite:")
            .ok_or_else(|| DbError::ConfigError("Invalid SQLite connection string".into()))?;
        let in_memory = db_path.contains(":memory:");

        // Create the database directory if it doesn't exist
        if !in_memory {
            if let Some(parent) = Path::new(db_path.trim_start_matches("//")).parent() {
                if !parent.as_os_str().is_empty() && !parent.exists() {
                    std::fs::create_dir_all(parent).map_err(|e|
                        DbError::InitError(format!("Failed to create database directory: {}", e))
                    )?;
                }
            }
        }

        log::info!("Initializing SQLite database at: {}", db_path);

        let options = SqliteConnectOptions::from_str(connection_string)?
            .create_if_missing(true)
            .foreign_keys(true);

        // Every in-memory connection is its own database
        let mut pool_options = SqlitePoolOptions::new().max_connections(if in_memory { 1 } else { 5 });
        if in_memory {
            pool_options = pool_options.idle_timeout(None).max_lifetime(None);
        }
        let pool = pool_options
            .connect_with(options)
            .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS users (
                id TEXT PRIMARY KEY,
                email TEXT NOT NULL UNIQUE,
                password_hash TEXT NOT NULL,
                created_at TEXT NOT NULL
            );
            "#,
        )
        .execute(&pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS saved_passwords (
                id TEXT PRIMARY KEY,
                owner_id TEXT NOT NULL,
                password_text TEXT NOT NULL,
                label TEXT,
                created_at TEXT NOT NULL,
                FOREIGN KEY (owner_id) REFERENCES users(id) ON DELETE CASCADE
            );
            "#,
        )
        .execute(&pool)
        .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_saved_passwords_owner ON saved_passwords(owner_id);")
            .execute(&pool)
            .await?;

        self.pool = Some(pool);
        Ok(())
    }

    async fn create_account(&self, email: &str, password_hash: &str) -> Result<Account, DbError> {
        let pool = self.get_pool()?;

        let account = Account {
            id: Uuid::new_v4(),
            email: email.to_string(),
            password_hash: password_hash.to_string(),
            created_at: Utc::now().trunc_subsecs(6),
        };

        let result = sqlx::query(
            r#"
            INSERT INTO users (id, email, password_hash, created_at)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(account.id.to_string())
        .bind(&account.email)
        .bind(&account.password_hash)
        .bind(format_timestamp(account.created_at))
        .execute(pool)
        .await;

        match result {
            Ok(_) => Ok(account),
            Err(e) if is_unique_violation(&e) => Err(DbError::EmailTaken(email.to_string())),
            Err(e) => Err(e.into()),
        }
    }

    async fn get_account_by_email(&self, email: &str) -> Result<Option<Account>, DbError> {
        let pool = self.get_pool()?;

        let row = sqlx::query("SELECT id, email, password_hash, created_at FROM users WHERE email = ?")
            .bind(email)
            .fetch_optional(pool)
            .await?;

        row.as_ref().map(account_from_row).transpose()
    }

    async fn get_account_by_id(&self, id: Uuid) -> Result<Option<Account>, DbError> {
        let pool = self.get_pool()?;

        let row = sqlx::query("SELECT id, email, password_hash, created_at FROM users WHERE id = ?")
            .bind(id.to_string())
            .fetch_optional(pool)
            .await?;

        row.as_ref().map(account_from_row).transpose()
    }

    async fn add_saved_password(
        &self,
        owner_id: Uuid,
        password_text: &str,
        label: Option<&str>,
    ) -> Result<SavedPassword, DbError> {
        let pool = self.get_pool()?;

        let record = SavedPassword {
            id: Uuid::new_v4(),
            owner_id,
            password_text: password_text.to_string(),
            label: label.map(String::from),
            created_at: Utc::now().trunc_subsecs(6),
        };

        sqlx::query(
            r#"
            INSERT INTO saved_passwords (id, owner_id, password_text, label, created_at)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(record.id.to_string())
        .bind(owner_id.to_string())
        .bind(&record.password_text)
        .bind(record.label.as_deref())
        .bind(format_timestamp(record.created_at))
        .execute(pool)
        .await?;

        Ok(record)
    }

    async fn list_saved_passwords(&self, owner_id: Uuid) -> Result<Vec<SavedPassword>, DbError> {
        let pool = self.get_pool()?;

        let rows = sqlx::query(
            r#"
            SELECT id, owner_id, password_text, label, created_at
            FROM saved_passwords
            WHERE owner_id = ?
            ORDER BY created_at DESC, rowid DESC
            "#,
        )
        .bind(owner_id.to_string())
        .fetch_all(pool)
        .await?;

        rows.iter().map(saved_password_from_row).collect()
    }

    async fn get_saved_password(&self, owner_id: Uuid, id: Uuid) -> Result<SavedPassword, DbError> {
        let pool = self.get_pool()?;

        let row = sqlx::query(
            r#"
            SELECT id, owner_id, password_text, label, created_at
            FROM saved_passwords
            WHERE id = ? AND owner_id = ?
            "#,
        )
        .bind(id.to_string())
        .bind(owner_id.to_string())
        .fetch_optional(pool)
        .await?;

        match row {
            Some(row) => saved_password_from_row(&row),
            None => Err(DbError::NotFound),
        }
    }

    async fn delete_saved_password(&self, owner_id: Uuid, id: Uuid) -> Result<(), DbError> {
        let pool = self.get_pool()?;

        let result = sqlx::query("DELETE FROM saved_passwords WHERE id = ? AND owner_id = ?")
            .bind(id.to_string())
            .bind(owner_id.to_string())
            .execute(pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::NotFound);
        }

        Ok(())
    }

    async fn count_saved_passwords(&self, owner_id: Uuid) -> Result<usize, DbError> {
        let pool = self.get_pool()?;

        let count: i64 = sqlx::query("SELECT COUNT(*) AS count FROM saved_passwords WHERE owner_id = ?")
            .bind(owner_id.to_string())
            .fetch_one(pool)
            .await?
            .try_get("count")?;

        Ok(count as usize)
    }
}
