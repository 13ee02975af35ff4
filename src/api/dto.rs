//! API response DTOs
//!
//! Outward-facing representations. `password_hash` never appears here;
//! `created_at` is rendered through the display formatter.

use serde::{Deserialize, Serialize};

use crate::data::{Account, Post, format_created_at};

/// Account response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountResponse {
    pub id: String,
    pub username: String,
    pub email: String,
    pub profile_image_url: Option<String>,
    /// Display-formatted creation time, e.g. "Jan 1st, 1970 at 12:00 am"
    pub created_at: String,
}

impl From<&Account> for AccountResponse {
    fn from(account: &Account) -> Self {
        Self {
            id: account.id.clone(),
            username: account.username.clone(),
            email: account.email.clone(),
            profile_image_url: account.profile_image_url.clone(),
            created_at: format_created_at(account.created_at),
        }
    }
}

/// Post response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostResponse {
    pub id: String,
    pub title: String,
    pub body: String,
    pub tags: Vec<String>,
    pub repo_link: Option<String>,
    pub deployed_link: Option<String>,
    pub created_by: String,
    /// Display-formatted creation time
    pub created_at: String,
}

impl From<&Post> for PostResponse {
    fn from(post: &Post) -> Self {
        Self {
            id: post.id.clone(),
            title: post.title.clone(),
            body: post.body.clone(),
            tags: post.tag_list(),
            repo_link: post.repo_link.clone(),
            deployed_link: post.deployed_link.clone(),
            created_by: post.created_by.clone(),
            created_at: format_created_at(post.created_at),
        }
    }
}
