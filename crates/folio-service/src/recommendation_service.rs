//! Recommendation service trait definition.

use crate::dto::{
    CreateRecommendationRequest, RecommendationFeedbackRequest, RecommendationRequest,
    RecommendationResponse,
};
use async_trait::async_trait;
use folio_core::{FolioResult, Interface, RecommendationId, UserId};

/// Storage of recommendations produced elsewhere.
#[async_trait]
pub trait RecommendationService: Interface + Send + Sync {
    async fn get_recommendation(&self, id: RecommendationId) -> FolioResult<Option<RecommendationResponse>>;

    /// The user's recommendations, highest score first.
    async fn get_user_recommendations(
        &self,
        user_id: UserId,
        request: &RecommendationRequest,
    ) -> FolioResult<Vec<RecommendationResponse>>;

    async fn create_recommendation(
        &self,
        request: CreateRecommendationRequest,
    ) -> FolioResult<RecommendationResponse>;

    /// Marks a recommendation owned by `user_id` as seen.
    async fn mark_viewed(&self, id: RecommendationId, user_id: UserId) -> FolioResult<RecommendationResponse>;

    /// Hides a recommendation owned by `user_id`.
    async fn dismiss(&self, id: RecommendationId, user_id: UserId) -> FolioResult<RecommendationResponse>;

    /// Stores the owner's feedback on a recommendation.
    async fn record_feedback(
        &self,
        id: RecommendationId,
        user_id: UserId,
        request: RecommendationFeedbackRequest,
    ) -> FolioResult<RecommendationResponse>;
}
