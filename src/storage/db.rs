//! SQLite database layer (embedded, no external dependencies)

use anyhow::{Context, Result};
use serde::Serialize;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::sync::Arc;

/// A persisted user record. Serialized field order is the wire contract:
/// id, username, password, email. The password field holds the argon2 PHC
/// string, never the plaintext.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub password: String,
    pub email: Option<String>,
}

/// A persisted post record. `owner_user_id` points at a user id but is not
/// enforced as a foreign key; a dangling owner is legal.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Post {
    pub id: i64,
    pub content: String,
    pub color: String,
    #[serde(rename = "ownerUserId")]
    #[sqlx(rename = "user_id")]
    pub owner_user_id: i64,
}

pub struct Database {
    pool: Arc<SqlitePool>,
}

impl Database {
    pub async fn new(database_path: &str) -> Result<Self> {
        tracing::info!("Opening SQLite database at: {}", database_path);

        // Create parent directory if needed
        if let Some(parent) = std::path::Path::new(database_path).parent() {
            tokio::fs::create_dir_all(parent).await.with_context(|| {
                format!("Failed to create database directory: {}", parent.display())
            })?;
        }

        let options = SqliteConnectOptions::new()
            .filename(database_path)
            .create_if_missing(true)
            .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal)
            .synchronous(sqlx::sqlite::SqliteSynchronous::Normal);

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await
            .with_context(|| {
                format!("Failed to connect to SQLite database at: {}", database_path)
            })?;

        Self::run_migrations(&pool)
            .await
            .context("Failed to run database migrations")?;

        Ok(Self {
            pool: Arc::new(pool),
        })
    }

    async fn run_migrations(pool: &SqlitePool) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS users (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                username TEXT NOT NULL UNIQUE,
                password TEXT NOT NULL,
                email TEXT
            )
            "#,
        )
        .execute(pool)
        .await?;

        // No FOREIGN KEY on user_id: the reference is application-level only
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS posts (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                content TEXT NOT NULL,
                color TEXT NOT NULL,
                user_id INTEGER NOT NULL
            )
            "#,
        )
        .execute(pool)
        .await?;

        Ok(())
    }

    // User operations

    pub async fn create_user(
        &self,
        username: &str,
        password_hash: &str,
        email: Option<&str>,
    ) -> Result<i64> {
        let result = sqlx::query(
            r#"
            INSERT INTO users (username, password, email)
            VALUES (?1, ?2, ?3)
            "#,
        )
        .bind(username)
        .bind(password_hash)
        .bind(email)
        .execute(&*self.pool)
        .await?;

        Ok(result.last_insert_rowid())
    }

    pub async fn list_users(&self) -> Result<Vec<User>> {
        let rows: Vec<User> = sqlx::query_as(
            r#"
            SELECT id, username, password, email FROM users ORDER BY id
            "#,
        )
        .fetch_all(&*self.pool)
        .await?;

        Ok(rows)
    }

    pub async fn get_user_by_id(&self, id: i64) -> Result<Option<User>> {
        let row: Option<User> = sqlx::query_as(
            r#"
            SELECT id, username, password, email FROM users WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&*self.pool)
        .await?;

        Ok(row)
    }

    pub async fn get_user_by_username(&self, username: &str) -> Result<Option<User>> {
        let row: Option<User> = sqlx::query_as(
            r#"
            SELECT id, username, password, email FROM users WHERE username = ?1
            "#,
        )
        .bind(username)
        .fetch_optional(&*self.pool)
        .await?;

        Ok(row)
    }

    /// Fetch only the stored password hash, for credential verification.
    pub async fn get_password_hash(&self, username: &str) -> Result<Option<String>> {
        let row: Option<(String,)> = sqlx::query_as(
            r#"
            SELECT password FROM users WHERE username = ?1
            "#,
        )
        .bind(username)
        .fetch_optional(&*self.pool)
        .await?;

        Ok(row.map(|(hash,)| hash))
    }

    /// Resolve a username to its user id, if the user exists.
    pub async fn resolve_user_id(&self, username: &str) -> Result<Option<i64>> {
        let row: Option<(i64,)> = sqlx::query_as(
            r#"
            SELECT id FROM users WHERE username = ?1
            "#,
        )
        .bind(username)
        .fetch_optional(&*self.pool)
        .await?;

        Ok(row.map(|(id,)| id))
    }

    // Post operations

    pub async fn create_post(
        &self,
        content: &str,
        color: &str,
        owner_user_id: i64,
    ) -> Result<i64> {
        let result = sqlx::query(
            r#"
            INSERT INTO posts (content, color, user_id)
            VALUES (?1, ?2, ?3)
            "#,
        )
        .bind(content)
        .bind(color)
        .bind(owner_user_id)
        .execute(&*self.pool)
        .await?;

        Ok(result.last_insert_rowid())
    }

    pub async fn list_posts(&self) -> Result<Vec<Post>> {
        let rows: Vec<Post> = sqlx::query_as(
            r#"
            SELECT id, content, color, user_id FROM posts ORDER BY id
            "#,
        )
        .fetch_all(&*self.pool)
        .await?;

        Ok(rows)
    }

    pub async fn list_posts_by_owner(&self, owner_user_id: i64) -> Result<Vec<Post>> {
        let rows: Vec<Post> = sqlx::query_as(
            r#"
            SELECT id, content, color, user_id FROM posts
            WHERE user_id = ?1
            ORDER BY id
            "#,
        )
        .bind(owner_user_id)
        .fetch_all(&*self.pool)
        .await?;

        Ok(rows)
    }

    pub async fn get_post_by_id(&self, id: i64) -> Result<Option<Post>> {
        let row: Option<Post> = sqlx::query_as(
            r#"
            SELECT id, content, color, user_id FROM posts WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&*self.pool)
        .await?;

        Ok(row)
    }
}
