//! Data models
//!
//! Rust structs representing database entities.
//! All models use ULID for IDs and chrono for timestamps.

use chrono::{DateTime, Datelike, Timelike, Utc};
use serde::{Deserialize, Serialize};

// =============================================================================
// ID Types
// =============================================================================

/// Entity ID wrapper (ULID format, 26 characters)
///
/// Example: "01ARZ3NDEKTSV4RRFFQ69G5FAV"
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(pub String);

impl EntityId {
    /// Generate a new ULID
    pub fn new() -> Self {
        Self(ulid::Ulid::new().to_string())
    }

    /// Create from existing string
    pub fn from_string(s: String) -> Self {
        Self(s)
    }
}

impl Default for EntityId {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Account
// =============================================================================

/// A registered user account
///
/// `password_hash` holds the bcrypt digest, never plaintext. It stays
/// inside the data/service layers; API DTOs must not carry it.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Account {
    pub id: String,
    pub username: String,
    pub email: String,
    /// bcrypt digest of the password
    pub password_hash: String,
    /// Optional profile image URL, restricted to image file extensions
    pub profile_image_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// =============================================================================
// Post
// =============================================================================

/// A portfolio project entry owned by an account
///
/// Deleting the owning account deletes its posts (cascade).
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Post {
    pub id: String,
    pub title: String,
    pub body: String,
    /// JSON array of tag strings (max 10 tags, 1-20 chars, no whitespace)
    pub tags: String,
    /// Link to the source repository
    pub repo_link: Option<String>,
    /// Link to the deployed application
    pub deployed_link: Option<String>,
    /// Owning account ID
    pub created_by: String,
    pub created_at: DateTime<Utc>,
}

impl Post {
    /// Decode the stored tag list.
    ///
    /// The column always holds a JSON array written by the service layer;
    /// anything else decodes to an empty list.
    pub fn tag_list(&self) -> Vec<String> {
        serde_json::from_str(&self.tags).unwrap_or_default()
    }
}

// =============================================================================
// Display formatting
// =============================================================================

/// Format a timestamp for display: "Jan 1st, 1970 at 12:00 am"
///
/// Pure read-time projection, deterministic in UTC. This is the format
/// consumers render for `created_at` fields.
pub fn format_created_at(timestamp: DateTime<Utc>) -> String {
    const MONTHS: [&str; 12] = [
        "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
    ];

    let month = MONTHS[timestamp.month0() as usize];
    let day = timestamp.day();
    let suffix = day_suffix(day);
    let year = timestamp.year();

    let (is_pm, hour) = timestamp.hour12();
    let minute = timestamp.minute();
    let meridiem = if is_pm { "pm" } else { "am" };

    format!("{month} {day}{suffix}, {year} at {hour}:{minute:02} {meridiem}")
}

fn day_suffix(day: u32) -> &'static str {
    // 11th-13th break the last-digit rule
    if (11..=13).contains(&day) {
        return "th";
    }
    match day % 10 {
        1 => "st",
        2 => "nd",
        3 => "rd",
        _ => "th",
    }
}
