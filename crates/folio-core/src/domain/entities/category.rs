//! Category entity.

use crate::CategoryId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A genre or subject books are filed under.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    /// Unique, 1-100 characters.
    pub name: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Category {
    /// Creates a new category.
    #[must_use]
    pub fn new(name: String, description: Option<String>) -> Self {
        let now = Utc::now();
        Self {
            id: CategoryId::new(),
            name,
            description,
            created_at: now,
            updated_at: now,
        }
    }

    /// Applies a partial update. `None` leaves a field unchanged.
    pub fn apply(&mut self, name: Option<String>, description: Option<String>) {
        if let Some(name) = name {
            self.name = name;
        }
        if description.is_some() {
            self.description = description;
        }
        self.updated_at = Utc::now();
    }
}
