//! User entity.

use crate::{Email, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A registered reader.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// Unique identifier for the user.
    pub id: UserId,

    /// Unique username.
    pub username: String,

    /// User's email address.
    pub email: Email,

    /// Hashed password (never serialized).
    #[serde(skip_serializing, default)]
    pub password_hash: String,

    /// Display name.
    pub full_name: Option<String>,

    /// Short profile text.
    pub bio: Option<String>,

    /// Whether the account may be used.
    pub is_active: bool,

    /// Whether the user administers the catalog.
    pub is_admin: bool,

    /// Account creation timestamp.
    pub created_at: DateTime<Utc>,

    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Creates a new, active, non-admin user.
    #[must_use]
    pub fn new(
        username: String,
        email: Email,
        password_hash: String,
        full_name: Option<String>,
        bio: Option<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: UserId::new(),
            username,
            email,
            password_hash,
            full_name,
            bio,
            is_active: true,
            is_admin: false,
            created_at: now,
            updated_at: now,
        }
    }

    /// Returns the display name (full name or username).
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.full_name.as_deref().unwrap_or(&self.username)
    }

    /// Deactivates the account.
    pub fn deactivate(&mut self) {
        self.is_active = false;
        self.updated_at = Utc::now();
    }

    /// Reactivates the account.
    pub fn reactivate(&mut self) {
        self.is_active = true;
        self.updated_at = Utc::now();
    }

    /// Replaces the password hash.
    pub fn update_password(&mut self, password_hash: String) {
        self.password_hash = password_hash;
        self.updated_at = Utc::now();
    }
}
