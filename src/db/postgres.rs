// src/db/postgres.rs
use sqlx::{postgres::PgPoolOptions, PgPool, Row, types::Uuid};
use sqlx::postgres::PgRow;
use chrono::{DateTime, Utc};

use crate::models::{Account, SavedPassword};
use super::{is_unique_violation, DatabaseBackend, DbError};

#[derive(Debug, Clone)]
pub struct PostgresBackend {
    pool: Option<PgPool>,
}

impl Default for PostgresBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl PostgresBackend {
    pub fn new() -> Self {
        Self {
            pool: None,
        }
    }

    // Helper to get the pool or return an error
    fn get_pool(&self) -> Result<&PgPool, DbError> {
        self.pool.as_ref().ok_or(DbError::InitError("Database not initialized".into()))
    }
}

fn account_from_row(row: &PgRow) -> Result<Account, DbError> {
    Ok(Account {
        id: row.try_get("id")?,
        email: row.try_get("email")?,
        password_hash: row.try_get("password_hash")?,
        created_at: row.try_get::<DateTime<Utc>, _>("created_at")?,
    })
}

fn saved_password_from_row(row: &PgRow) -> Result<SavedPassword, DbError> {
    Ok(SavedPassword {
        id: row.try_get("id")?,
        owner_id: row.try_get("owner_id")?,
        password_text: row.try_get("password_text")?,
        label: row.try_get("label")?,
        created_at: row.try_get::<DateTime<Utc>, _>("created_at")?,
    })
}

impl DatabaseBackend for PostgresBackend {
    async fn init(&mut self, connection_string: &str) -> Result<(), DbError> {
        log::info!("Initializing PostgreSQL database...");

        let pool = PgPoolOptions::new()
            .max_connections(5)
            .connect(connection_string)
            .await?;

        log::info!("Connected to PostgreSQL");

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS users (
                id UUID PRIMARY KEY,
                email TEXT NOT NULL UNIQUE,
                password_hash TEXT NOT NULL,
                created_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW()
            );
            "#,
        )
        .execute(&pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS saved_passwords (
                id UUID PRIMARY KEY,
                owner_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                password_text TEXT NOT NULL,
                label TEXT,
                created_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW()
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

        let result = sqlx::query(
            r#"
            INSERT INTO users (id, email, password_hash, created_at)
            VALUES ($1, $2, $3, $4)
            RETURNING id, email, password_hash, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(email)
        .bind(password_hash)
        .bind(Utc::now())
        .fetch_one(pool)
        .await;

        match result {
            Ok(row) => account_from_row(&row),
            Err(e) if is_unique_violation(&e) => Err(DbError::EmailTaken(email.to_string())),
            Err(e) => Err(e.into()),
        }
    }

    async fn get_account_by_email(&self, email: &str) -> Result<Option<Account>, DbError> {
        let pool = self.get_pool()?;

        let row = sqlx::query("SELECT id, email, password_hash, created_at FROM users WHERE email = $1")
            .bind(email)
            .fetch_optional(pool)
            .await?;

        row.as_ref().map(account_from_row).transpose()
    }

    async fn get_account_by_id(&self, id: Uuid) -> Result<Option<Account>, DbError> {
        let pool = self.get_pool()?;

        let row = sqlx::query("SELECT id, email, password_hash, created_at FROM users WHERE id = $1")
            .bind(id)
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

        let row = sqlx::query(
            r#"
            INSERT INTO saved_passwords (id, owner_id, password_text, label, created_at)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, owner_id, password_text, label, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(owner_id)
        .bind(password_text)
        .bind(label)
        .bind(Utc::now())
        .fetch_one(pool)
        .await?;

        saved_password_from_row(&row)
    }

    async fn list_saved_passwords(&self, owner_id: Uuid) -> Result<Vec<SavedPassword>, DbError> {
        let pool = self.get_pool()?;

        let rows = sqlx::query(
            r#"
            SELECT id, owner_id, password_text, label, created_at
            FROM saved_passwords
            WHERE owner_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(owner_id)
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
            WHERE id = $1 AND owner_id = $2
            "#,
        )
        .bind(id)
        .bind(owner_id)
        .fetch_optional(pool)
        .await?;

        match row {
            Some(row) => saved_password_from_row(&row),
            None => Err(DbError::NotFound),
        }
    }

    async fn delete_saved_password(&self, owner_id: Uuid, id: Uuid) -> Result<(), DbError> {
        let pool = self.get_pool()?;

        let result = sqlx::query("DELETE FROM saved_passwords WHERE id = $1 AND owner_id = $2")
            .bind(id)
            .bind(owner_id)
            .execute(pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::NotFound);
        }

        Ok(())
    }

    async fn count_saved_passwords(&self, owner_id: Uuid) -> Result<usize, DbError> {
        let pool = self.get_pool()?;

        let count: i64 = sqlx::query("SELECT COUNT(*) AS count FROM saved_passwords WHERE owner_id = $1")
            .bind(owner_id)
            .fetch_one(pool)
            .await?
            .try_get("count")?;

        Ok(count as usize)
    }
}
