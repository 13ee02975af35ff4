//! Post service
//!
//! Handles portfolio post operations: create, list, delete, and the
//! bulk delete-by-owner used by the account cascade.

use std::sync::Arc;

use chrono::Utc;

use crate::data::{Database, EntityId, Post};
use crate::error::AppError;

/// Tag limits from the submission form
const MAX_TAGS: usize = 10;
const MAX_TAG_LEN: usize = 20;

/// Maximum length for repo/deployed links
const MAX_LINK_LEN: usize = 100;

/// Fields required to create a post
#[derive(Debug, Clone)]
pub struct NewPost {
    pub title: String,
    pub body: String,
    pub tags: Vec<String>,
    pub repo_link: Option<String>,
    pub deployed_link: Option<String>,
    pub created_by: String,
}

fn validate_tags(tags: &[String]) -> Result<(), AppError> {
    if tags.len() > MAX_TAGS {
        return Err(AppError::Validation(format!(
            "at most {} tags are allowed",
            MAX_TAGS
        )));
    }
    for tag in tags {
        if tag.is_empty()
            || tag.chars().count() > MAX_TAG_LEN
            || tag.chars().any(char::is_whitespace)
        {
            return Err(AppError::Validation(format!(
                "tags must be 1-{} characters with no whitespace",
                MAX_TAG_LEN
            )));
        }
    }
    Ok(())
}

fn validate_link(name: &str, link: &str) -> Result<(), AppError> {
    if link.chars().count() > MAX_LINK_LEN {
        return Err(AppError::Validation(format!(
            "{} must be at most {} characters",
            name, MAX_LINK_LEN
        )));
    }
    Ok(())
}

/// Post service
pub struct PostService {
    db: Arc<Database>,
}

impl PostService {
    /// Create new post service
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    /// Get a post by ID
    pub async fn get(&self, id: &str) -> Result<Post, AppError> {
        self.db.get_post(id).await?.ok_or(AppError::NotFound)
    }

    /// Create a new post
    ///
    /// Title and body are required (trimmed), tags and links follow the
    /// form limits, and the owner must be an existing account.
    pub async fn create(&self, new_post: NewPost) -> Result<Post, AppError> {
        let title = new_post.title.trim();
        if title.is_empty() {
            return Err(AppError::Validation("title is required".to_string()));
        }

        let body = new_post.body.trim();
        if body.is_empty() {
            return Err(AppError::Validation("body is required".to_string()));
        }

        validate_tags(&new_post.tags)?;
        if let Some(link) = new_post.repo_link.as_deref() {
            validate_link("repo_link", link)?;
        }
        if let Some(link) = new_post.deployed_link.as_deref() {
            validate_link("deployed_link", link)?;
        }

        if self.db.get_account(&new_post.created_by).await?.is_none() {
            return Err(AppError::Validation(
                "created_by must reference an existing account".to_string(),
            ));
        }

        let tags = serde_json::to_string(&new_post.tags)
            .map_err(|e| AppError::Internal(anyhow::anyhow!("failed to encode tags: {}", e)))?;

        let post = Post {
            id: EntityId::new().0,
            title: title.to_string(),
            body: body.to_string(),
            tags,
            repo_link: new_post.repo_link,
            deployed_link: new_post.deployed_link,
            created_by: new_post.created_by,
            created_at: Utc::now(),
        };

        self.db.insert_post(&post).await?;

        tracing::info!(post_id = %post.id, created_by = %post.created_by, "Post created");

        Ok(post)
    }

    /// List posts owned by an account, newest first
    pub async fn posts_by_account(&self, account_id: &str) -> Result<Vec<Post>, AppError> {
        if self.db.get_account(account_id).await?.is_none() {
            return Err(AppError::NotFound);
        }
        self.db.get_posts_by_account(account_id).await
    }

    /// Delete a post by ID
    pub async fn delete(&self, id: &str) -> Result<(), AppError> {
        if !self.db.delete_post(id).await? {
            return Err(AppError::NotFound);
        }
        Ok(())
    }

    /// Bulk-delete all posts owned by an account
    ///
    /// Exposed for the account cascade; returns the number removed.
    pub async fn delete_by_owner(&self, account_id: &str) -> Result<u64, AppError> {
        self.db.delete_posts_by_owner(account_id).await
    }
}
