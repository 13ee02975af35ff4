//! SQLite database operations
//!
//! All database access goes through this module.
//! Schema constraints (unique indexes, foreign keys) are enforced here,
//! not by application-level locking.

use chrono::{DateTime, Utc};
use sqlx::{Pool, QueryBuilder, Sqlite, SqlitePool};
use std::path::Path;

use super::models::*;
use crate::error::AppError;
use crate::metrics::DB_QUERIES_TOTAL;

/// Database connection pool wrapper.
pub struct Database {
    pool: Pool<Sqlite>,
}

/// Map a write error to `Uniqueness` when a unique index rejected the row.
///
/// SQLite reports "UNIQUE constraint failed: accounts.username"; the column
/// name in the message decides which field is cited back to the caller.
fn map_unique_violation(error: sqlx::Error) -> AppError {
    if let sqlx::Error::Database(db_error) = &error {
        if db_error.is_unique_violation() {
            let message = db_error.message().to_string();
            let field = if message.contains("accounts.username") {
                "username"
            } else if message.contains("accounts.email") {
                "email"
            } else {
                "field"
            };
            return AppError::Uniqueness(field.to_string());
        }
    }
    AppError::Database(error)
}

impl Database {
    // =========================================================================
    // Connection
    // =========================================================================

    /// Connect to SQLite database
    ///
    /// Creates the database file if it doesn't exist.
    /// Runs pending migrations automatically.
    ///
    /// # Arguments
    /// * `path` - Path to SQLite database file
    ///
    /// # Errors
    /// Returns error if connection or migration fails
    pub async fn connect(path: &Path) -> Result<Self, AppError> {
        // Create parent directory if it doesn't exist
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| AppError::Database(sqlx::Error::Io(e)))?;
        }

        // Create connection string
        let connection_string = format!("sqlite:{}?mode=rwc", path.display());

        // Create connection pool
        let pool = SqlitePool::connect(&connection_string).await?;

        // Run migrations
        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .map_err(|e| {
                tracing::error!("Migration failed: {}", e);
                AppError::Internal(anyhow::anyhow!("Migration failed: {}", e))
            })?;

        tracing::info!("Database connected and migrated successfully");

        Ok(Self { pool })
    }

    // =========================================================================
    // Accounts
    // =========================================================================

    /// Get an account by ID
    pub async fn get_account(&self, id: &str) -> Result<Option<Account>, AppError> {
        let account = sqlx::query_as::<_, Account>("SELECT * FROM accounts WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(account)
    }

    /// Get an account by username
    pub async fn get_account_by_username(
        &self,
        username: &str,
    ) -> Result<Option<Account>, AppError> {
        let account = sqlx::query_as::<_, Account>("SELECT * FROM accounts WHERE username = ?")
            .bind(username)
            .fetch_optional(&self.pool)
            .await?;

        Ok(account)
    }

    /// Get an account by email
    pub async fn get_account_by_email(&self, email: &str) -> Result<Option<Account>, AppError> {
        let account = sqlx::query_as::<_, Account>("SELECT * FROM accounts WHERE email = ?")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;

        Ok(account)
    }

    /// Insert a new account
    ///
    /// The unique indexes on `username` and `email` resolve concurrent
    /// duplicate creates: the losing writer gets `Uniqueness`, never a
    /// silent overwrite.
    pub async fn insert_account(&self, account: &Account) -> Result<(), AppError> {
        DB_QUERIES_TOTAL
            .with_label_values(&["insert", "accounts"])
            .inc();

        sqlx::query(
            r#"
            INSERT INTO accounts (
                id, username, email, password_hash, profile_image_url,
                created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&account.id)
        .bind(&account.username)
        .bind(&account.email)
        .bind(&account.password_hash)
        .bind(&account.profile_image_url)
        .bind(account.created_at)
        .bind(account.updated_at)
        .execute(&self.pool)
        .await
        .map_err(map_unique_violation)?;

        Ok(())
    }

    /// Patch account fields by account ID.
    ///
    /// Fields set to `None` are left unchanged. `profile_image_url` uses
    /// `Some(None)` to clear the column. `password_hash` is only written when
    /// the caller re-hashed a new password; this method never touches it
    /// otherwise.
    ///
    /// # Returns
    /// `true` if updated, `false` if no matching account row exists.
    pub async fn patch_account(
        &self,
        account_id: &str,
        email: Option<&str>,
        profile_image_url: Option<Option<&str>>,
        password_hash: Option<&str>,
        updated_at: DateTime<Utc>,
    ) -> Result<bool, AppError> {
        if email.is_none() && profile_image_url.is_none() && password_hash.is_none() {
            // No-op patch: report whether the target exists.
            return Ok(self.get_account(account_id).await?.is_some());
        }

        DB_QUERIES_TOTAL
            .with_label_values(&["update", "accounts"])
            .inc();

        let mut builder = QueryBuilder::<Sqlite>::new("UPDATE accounts SET updated_at = ");
        builder.push_bind(updated_at);
        if let Some(email) = email {
            builder.push(", email = ");
            builder.push_bind(email);
        }
        if let Some(profile_image_url) = profile_image_url {
            builder.push(", profile_image_url = ");
            builder.push_bind(profile_image_url);
        }
        if let Some(password_hash) = password_hash {
            builder.push(", password_hash = ");
            builder.push_bind(password_hash);
        }
        builder.push(" WHERE id = ");
        builder.push_bind(account_id);

        let result = builder
            .build()
            .execute(&self.pool)
            .await
            .map_err(map_unique_violation)?;

        Ok(result.rows_affected() == 1)
    }

    /// Delete an account and everything it owns, in one transaction.
    ///
    /// Posts owned by the account are removed first; a failure there surfaces
    /// as `Cascade` and rolls the whole operation back, leaving the account
    /// and its posts in place. Friend edges fall away via `ON DELETE CASCADE`
    /// on the `friends` table.
    ///
    /// # Returns
    /// The number of posts removed by the cascade.
    ///
    /// # Errors
    /// `NotFound` if no account row matched, `Cascade` if dependent cleanup
    /// failed.
    pub async fn delete_account_cascade(&self, id: &str) -> Result<u64, AppError> {
        DB_QUERIES_TOTAL
            .with_label_values(&["delete", "accounts"])
            .inc();

        let mut tx = self.pool.begin().await?;

        let posts_deleted = sqlx::query("DELETE FROM posts WHERE created_by = ?")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                AppError::Cascade(format!("failed to delete posts owned by {}: {}", id, e))
            })?
            .rows_affected();

        let result = sqlx::query("DELETE FROM accounts WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        if result.rows_affected() == 0 {
            // Dropping the transaction rolls back the post deletion.
            return Err(AppError::NotFound);
        }

        tx.commit().await?;

        Ok(posts_deleted)
    }

    /// Count all accounts
    pub async fn count_accounts(&self) -> Result<i64, AppError> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM accounts")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    // =========================================================================
    // Friends
    // =========================================================================

    /// Insert a friend edge. Idempotent: re-adding an existing edge is a no-op.
    pub async fn insert_friend(&self, account_id: &str, friend_id: &str) -> Result<(), AppError> {
        DB_QUERIES_TOTAL
            .with_label_values(&["insert", "friends"])
            .inc();

        sqlx::query(
            r#"
            INSERT OR IGNORE INTO friends (account_id, friend_id, created_at)
            VALUES (?, ?, ?)
            "#,
        )
        .bind(account_id)
        .bind(friend_id)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Delete a friend edge
    ///
    /// # Returns
    /// `true` if an edge was removed
    pub async fn delete_friend(&self, account_id: &str, friend_id: &str) -> Result<bool, AppError> {
        DB_QUERIES_TOTAL
            .with_label_values(&["delete", "friends"])
            .inc();

        let result = sqlx::query("DELETE FROM friends WHERE account_id = ? AND friend_id = ?")
            .bind(account_id)
            .bind(friend_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() == 1)
    }

    /// Get the accounts an account has befriended, oldest edge first
    pub async fn get_friends(&self, account_id: &str) -> Result<Vec<Account>, AppError> {
        let friends = sqlx::query_as::<_, Account>(
            r#"
            SELECT a.* FROM accounts a
            JOIN friends f ON a.id = f.friend_id
            WHERE f.account_id = ?
            ORDER BY f.created_at, a.id
            "#,
        )
        .bind(account_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(friends)
    }

    // =========================================================================
    // Posts
    // =========================================================================

    /// Get post by ID
    pub async fn get_post(&self, id: &str) -> Result<Option<Post>, AppError> {
        let post = sqlx::query_as::<_, Post>("SELECT * FROM posts WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(post)
    }

    /// Insert a new post
    pub async fn insert_post(&self, post: &Post) -> Result<(), AppError> {
        DB_QUERIES_TOTAL
            .with_label_values(&["insert", "posts"])
            .inc();

        sqlx::query(
            r#"
            INSERT INTO posts (
                id, title, body, tags, repo_link, deployed_link,
                created_by, created_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&post.id)
        .bind(&post.title)
        .bind(&post.body)
        .bind(&post.tags)
        .bind(&post.repo_link)
        .bind(&post.deployed_link)
        .bind(&post.created_by)
        .bind(post.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Get posts owned by an account, newest first
    pub async fn get_posts_by_account(&self, account_id: &str) -> Result<Vec<Post>, AppError> {
        let posts = sqlx::query_as::<_, Post>(
            "SELECT * FROM posts WHERE created_by = ? ORDER BY created_at DESC, id DESC",
        )
        .bind(account_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(posts)
    }

    /// Delete a post by ID
    ///
    /// # Returns
    /// `true` if a post was removed
    pub async fn delete_post(&self, id: &str) -> Result<bool, AppError> {
        DB_QUERIES_TOTAL
            .with_label_values(&["delete", "posts"])
            .inc();

        let result = sqlx::query("DELETE FROM posts WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() == 1)
    }

    /// Bulk-delete all posts owned by an account
    ///
    /// # Returns
    /// The number of posts removed
    pub async fn delete_posts_by_owner(&self, account_id: &str) -> Result<u64, AppError> {
        DB_QUERIES_TOTAL
            .with_label_values(&["delete", "posts"])
            .inc();

        let result = sqlx::query("DELETE FROM posts WHERE created_by = ?")
            .bind(account_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }

    /// Count all posts
    pub async fn count_posts(&self) -> Result<i64, AppError> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM posts")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}
