//! User preference entity.

use crate::{CategoryId, PreferenceId, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Category id to weight.
pub type CategoryPreferences = BTreeMap<CategoryId, f64>;

/// Free-form reading preferences with a few well-known fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CustomPreferences {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub favorite_authors: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub avoided_authors: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub themes: Vec<String>,
    /// Unrecognized keys, kept as-is.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl CustomPreferences {
    /// Merges `other` into `self`. Non-empty known lists replace the current
    /// ones; extension keys are inserted or overwritten individually.
    pub fn merge(&mut self, other: Self) {
        if !other.favorite_authors.is_empty() {
            self.favorite_authors = other.favorite_authors;
        }
        if !other.avoided_authors.is_empty() {
            self.avoided_authors = other.avoided_authors;
        }
        if !other.themes.is_empty() {
            self.themes = other.themes;
        }
        self.extra.extend(other.extra);
    }
}

/// Reading preferences used to filter and rank recommendations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserPreference {
    pub id: PreferenceId,
    pub user_id: UserId,
    pub category_preferences: CategoryPreferences,
    pub preferred_language: Option<String>,
    pub min_page_count: Option<i32>,
    pub max_page_count: Option<i32>,
    pub min_publication_year: Option<i32>,
    pub max_publication_year: Option<i32>,
    pub min_rating: Option<f64>,
    pub custom_preferences: CustomPreferences,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl UserPreference {
    /// Creates an empty preference record for a user.
    #[must_use]
    pub fn empty(user_id: UserId) -> Self {
        let now = Utc::now();
        Self {
            id: PreferenceId::new(),
            user_id,
            category_preferences: CategoryPreferences::new(),
            preferred_language: None,
            min_page_count: None,
            max_page_count: None,
            min_publication_year: None,
            max_publication_year: None,
            min_rating: None,
            custom_preferences: CustomPreferences::default(),
            created_at: now,
            updated_at: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_custom_preferences_keep_unknown_keys() {
        let prefs: CustomPreferences = serde_json::from_value(json!({
            "favorite_authors": ["Ursula K. Le Guin"],
            "reading_speed": "fast"
        }))
        .unwrap();
        assert_eq!(prefs.favorite_authors, vec!["Ursula K. Le Guin"]);
        assert_eq!(prefs.extra["reading_speed"], "fast");

        let back = serde_json::to_value(&prefs).unwrap();
        assert_eq!(back["reading_speed"], "fast");
        assert!(back.get("themes").is_none());
    }

    #[test]
    fn test_merge_overwrites_extension_keys() {
        let mut current: CustomPreferences = serde_json::from_value(json!({
            "themes": ["space"],
            "format": "paper",
            "mood": "calm"
        }))
        .unwrap();
        let update: CustomPreferences = serde_json::from_value(json!({
            "format": "ebook"
        }))
        .unwrap();

        current.merge(update);

        assert_eq!(current.themes, vec!["space"]);
        assert_eq!(current.extra["format"], "ebook");
        assert_eq!(current.extra["mood"], "calm");
    }

    #[test]
    fn test_empty_preferences() {
        let user_id = UserId::new();
        let prefs = UserPreference::empty(user_id);
        assert_eq!(prefs.user_id, user_id);
        assert!(prefs.category_preferences.is_empty());
        assert_eq!(prefs.custom_preferences, CustomPreferences::default());
    }
}
