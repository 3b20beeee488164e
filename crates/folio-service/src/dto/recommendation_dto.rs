//! Recommendation DTOs.

use chrono::{DateTime, Utc};
use folio_core::{
    BookId, BookRecommendation, CategoryId, RecommendationId, RecommendationMetadata,
    RecommendationSource, UserId,
};
use folio_repository::RecommendationFilter;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Request to store a recommendation produced elsewhere.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateRecommendationRequest {
    pub user_id: UserId,

    pub book_id: BookId,

    #[validate(range(min = 0.0, max = 1.0, message = "Score must be between 0 and 1"))]
    pub score: f64,

    #[validate(length(max = 1000))]
    pub reason: Option<String>,

    #[serde(default)]
    pub source: RecommendationSource,

    #[serde(default)]
    pub metadata: RecommendationMetadata,
}

fn default_count() -> u32 {
    5
}

/// Which of a user's stored recommendations to list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct RecommendationRequest {
    #[serde(default = "default_count")]
    #[validate(range(min = 1, max = 20, message = "Count must be between 1 and 20"))]
    pub count: u32,

    #[serde(default)]
    pub include_viewed: bool,

    #[serde(default)]
    pub include_dismissed: bool,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub category_filters: Vec<CategoryId>,

    #[validate(range(min = 0.0, max = 1.0))]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_score: Option<f64>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub source_filters: Vec<RecommendationSource>,
}

impl Default for RecommendationRequest {
    fn default() -> Self {
        Self {
            count: default_count(),
            include_viewed: false,
            include_dismissed: false,
            category_filters: Vec::new(),
            min_score: None,
            source_filters: Vec::new(),
        }
    }
}

impl From<&RecommendationRequest> for RecommendationFilter {
    fn from(request: &RecommendationRequest) -> Self {
        Self {
            limit: request.count,
            include_viewed: request.include_viewed,
            include_dismissed: request.include_dismissed,
            min_score: request.min_score,
            sources: request.source_filters.clone(),
            category_ids: request.category_filters.clone(),
        }
    }
}

/// Feedback on a recommendation.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RecommendationFeedbackRequest {
    pub is_helpful: bool,

    #[validate(length(max = 1000))]
    pub feedback_text: Option<String>,
}

/// Recommendation response DTO.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendationResponse {
    pub id: RecommendationId,
    pub user_id: UserId,
    pub book_id: BookId,
    pub score: f64,
    pub reason: Option<String>,
    pub is_viewed: bool,
    pub is_dismissed: bool,
    pub source: RecommendationSource,
    pub metadata: RecommendationMetadata,
    pub viewed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl From<BookRecommendation> for RecommendationResponse {
    fn from(recommendation: BookRecommendation) -> Self {
        Self {
            id: recommendation.id,
            user_id: recommendation.user_id,
            book_id: recommendation.book_id,
            score: recommendation.score,
            reason: recommendation.reason,
            is_viewed: recommendation.is_viewed,
            is_dismissed: recommendation.is_dismissed,
            source: recommendation.source,
            metadata: recommendation.metadata,
            viewed_at: recommendation.viewed_at,
            created_at: recommendation.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_defaults() {
        let request: RecommendationRequest = serde_json::from_str("{}").unwrap();
        assert_eq!(request, RecommendationRequest::default());
        assert_eq!(request.count, 5);
        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_request_count_bounds() {
        let request = RecommendationRequest {
            count: 21,
            ..Default::default()
        };
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_request_key_form_is_compact() {
        let json = serde_json::to_string(&RecommendationRequest::default()).unwrap();
        assert_eq!(json, r#"{"count":5,"include_viewed":false,"include_dismissed":false}"#);
    }

    #[test]
    fn test_filter_from_request() {
        let request = RecommendationRequest {
            count: 10,
            include_viewed: true,
            source_filters: vec![RecommendationSource::Rag],
            ..Default::default()
        };
        let filter = RecommendationFilter::from(&request);
        assert_eq!(filter.limit, 10);
        assert!(filter.include_viewed);
        assert_eq!(filter.sources, vec![RecommendationSource::Rag]);
    }

    #[test]
    fn test_score_range() {
        let request = CreateRecommendationRequest {
            user_id: UserId::new(),
            book_id: BookId::new(),
            score: 1.5,
            reason: None,
            source: RecommendationSource::default(),
            metadata: RecommendationMetadata::default(),
        };
        assert!(request.validate().is_err());
    }
}
