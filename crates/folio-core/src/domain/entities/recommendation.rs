//! Stored book recommendation entity.

use crate::{BookId, CategoryId, RecommendationId, RecommendationSource, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// How a recommendation was produced.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecommendationMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub similarity_score: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collaborative_score: Option<f64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub matching_categories: Vec<CategoryId>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A recommendation shown to a user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookRecommendation {
    pub id: RecommendationId,
    pub user_id: UserId,
    pub book_id: BookId,
    /// Confidence in `0.0..=1.0`.
    pub score: f64,
    pub reason: Option<String>,
    pub is_viewed: bool,
    pub is_dismissed: bool,
    pub source: RecommendationSource,
    pub metadata: RecommendationMetadata,
    pub viewed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl BookRecommendation {
    /// Metadata key holding user feedback.
    pub const FEEDBACK_KEY: &'static str = "feedback";

    /// Creates a new, unseen recommendation.
    #[must_use]
    pub fn new(
        user_id: UserId,
        book_id: BookId,
        score: f64,
        reason: Option<String>,
        source: RecommendationSource,
        metadata: RecommendationMetadata,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: RecommendationId::new(),
            user_id,
            book_id,
            score,
            reason,
            is_viewed: false,
            is_dismissed: false,
            source,
            metadata,
            viewed_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Marks the recommendation as seen. The first view time is kept.
    pub fn mark_viewed(&mut self) {
        let now = Utc::now();
        self.is_viewed = true;
        self.viewed_at.get_or_insert(now);
        self.updated_at = now;
    }

    /// Hides the recommendation from future listings.
    pub fn dismiss(&mut self) {
        self.is_dismissed = true;
        self.updated_at = Utc::now();
    }

    /// Stores user feedback in the metadata.
    pub fn record_feedback(&mut self, is_helpful: bool, feedback_text: Option<String>) {
        let now = Utc::now();
        self.metadata.extra.insert(
            Self::FEEDBACK_KEY.to_string(),
            serde_json::json!({
                "is_helpful": is_helpful,
                "feedback_text": feedback_text,
                "recorded_at": now,
            }),
        );
        self.updated_at = now;
    }
}
