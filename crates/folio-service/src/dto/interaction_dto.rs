//! Interaction DTOs.

use chrono::{DateTime, Utc};
use folio_core::{BookId, FolioError, FolioResult, Interaction, InteractionId, InteractionType, UserId};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Request to record an interaction of the calling user with a book.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateInteractionRequest {
    pub book_id: BookId,

    pub interaction_type: InteractionType,

    #[validate(range(min = 1.0, max = 5.0, message = "Rating must be between 1 and 5"))]
    pub rating: Option<f64>,

    #[validate(length(max = 5000))]
    pub review_text: Option<String>,
}

/// Request to change an interaction. Absent fields keep their value.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct UpdateInteractionRequest {
    pub interaction_type: Option<InteractionType>,

    #[validate(range(min = 1.0, max = 5.0, message = "Rating must be between 1 and 5"))]
    pub rating: Option<f64>,

    #[validate(length(max = 5000))]
    pub review_text: Option<String>,
}

/// Checks the per-kind requirements: ratings need a rating, reviews need text.
pub fn check_requirements(
    interaction_type: InteractionType,
    rating: Option<f64>,
    review_text: Option<&str>,
) -> FolioResult<()> {
    if interaction_type.requires_rating() && rating.is_none() {
        return Err(FolioError::validation("Rating is required for rate interactions"));
    }
    if interaction_type.requires_review_text() && review_text.map_or(true, |t| t.trim().is_empty()) {
        return Err(FolioError::validation("Review text is required for review interactions"));
    }
    Ok(())
}

/// Interaction response DTO.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InteractionResponse {
    pub id: InteractionId,
    pub user_id: UserId,
    pub book_id: BookId,
    pub interaction_type: InteractionType,
    pub rating: Option<f64>,
    pub review_text: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Interaction> for InteractionResponse {
    fn from(interaction: Interaction) -> Self {
        Self {
            id: interaction.id,
            user_id: interaction.user_id,
            book_id: interaction.book_id,
            interaction_type: interaction.interaction_type,
            rating: interaction.rating,
            review_text: interaction.review_text,
            created_at: interaction.created_at,
            updated_at: interaction.updated_at,
        }
    }
}
