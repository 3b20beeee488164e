//! User-book interaction entity.

use crate::{BookId, InteractionId, InteractionType, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Something a user did with a book: viewed, rated, reviewed, bookmarked...
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Interaction {
    pub id: InteractionId,
    pub user_id: UserId,
    pub book_id: BookId,
    pub interaction_type: InteractionType,
    /// 1-5 in half steps or finer, present for [`InteractionType::Rate`].
    pub rating: Option<f64>,
    /// Present for [`InteractionType::Review`].
    pub review_text: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Interaction {
    /// Creates a new interaction.
    #[must_use]
    pub fn new(
        user_id: UserId,
        book_id: BookId,
        interaction_type: InteractionType,
        rating: Option<f64>,
        review_text: Option<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: InteractionId::new(),
            user_id,
            book_id,
            interaction_type,
            rating,
            review_text,
            created_at: now,
            updated_at: now,
        }
    }

    /// Whether this interaction contributes to the book's rating summary.
    #[must_use]
    pub const fn is_rating(&self) -> bool {
        matches!(self.interaction_type, InteractionType::Rate)
    }

    /// Whether the given user owns this interaction.
    #[must_use]
    pub fn is_owned_by(&self, user_id: UserId) -> bool {
        self.user_id == user_id
    }
}
