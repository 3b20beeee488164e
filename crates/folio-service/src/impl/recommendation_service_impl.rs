//! Recommendation service implementation.
//!
//! Recommendations are produced by an external engine; this service stores
//! them and tracks what the reader did with each one. Per-recommendation
//! mutations invalidate the `get_recommendation` entry they affect; any
//! change also invalidates every cached listing of the owning user.

use crate::cache::{
    build_key, Call, CallArgs, CacheHandle, CacheSettings, Invalidate, InvalidationKeys,
    ReadThrough,
};
use crate::dto::{
    CreateRecommendationRequest, RecommendationFeedbackRequest, RecommendationRequest,
    RecommendationResponse,
};
use crate::recommendation_service::RecommendationService;
use async_trait::async_trait;
use folio_core::{
    BookRecommendation, FolioError, FolioResult, RecommendationId, UserId, ValidateExt,
};
use folio_repository::{BookRepository, RecommendationFilter, RecommendationRepository};
use shaku::Component;
use std::sync::Arc;
use tracing::{debug, info, warn};

const PREFIX: &str = "recommendation_service";

const RECOMMENDATION_TTL_SECS: u64 = 300;

/// Key of the cached `get_recommendation` read for the id in position 0.
fn recommendation_key(args: &CallArgs, _result: &serde_json::Value) -> InvalidationKeys {
    let id = args.get(0).unwrap_or_default();
    InvalidationKeys::from(build_key(PREFIX, &Call::new("get_recommendation").arg(id)))
}

/// `prefix:get_user_recommendations:{user_id}:{md5 of the request}`.
///
/// The user id stays readable so [`listings_pattern`] matches every listing
/// of that user, whatever the request size.
fn listing_key(prefix: &'static str, call: &Call) -> String {
    let args = call.args();
    format!(
        "{}:{}:{}:{:x}",
        prefix,
        call.operation(),
        args.get(0).unwrap_or_default(),
        md5::compute(args.get(1).unwrap_or_default().as_bytes())
    )
}

fn listings_pattern(user_id: UserId) -> String {
    format!("get_user_recommendations:{}:*", user_id)
}

/// Shaku component for [`RecommendationService`].
#[derive(Component)]
#[shaku(interface = RecommendationService)]
pub struct RecommendationServiceComponent {
    #[shaku(inject)]
    recommendation_repository: Arc<dyn RecommendationRepository>,
    #[shaku(inject)]
    book_repository: Arc<dyn BookRepository>,
    cache: CacheHandle,
    settings: CacheSettings,
}

impl RecommendationServiceComponent {
    pub fn new(
        recommendation_repository: Arc<dyn RecommendationRepository>,
        book_repository: Arc<dyn BookRepository>,
        cache: CacheHandle,
        settings: CacheSettings,
    ) -> Self {
        Self {
            recommendation_repository,
            book_repository,
            cache,
            settings,
        }
    }

    async fn find_owned(&self, id: RecommendationId, user_id: UserId) -> FolioResult<BookRecommendation> {
        let recommendation = self
            .recommendation_repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| FolioError::not_found("Recommendation", id))?;

        if recommendation.user_id != user_id {
            warn!(recommendation_id = %id, user_id = %user_id, "Recommendation owned by another user");
            return Err(FolioError::forbidden("Not authorized to modify this recommendation"));
        }
        Ok(recommendation)
    }

    /// Loads an owned recommendation, applies `change` and stores it.
    async fn change<F>(&self, id: RecommendationId, user_id: UserId, change: F) -> FolioResult<RecommendationResponse>
    where
        F: FnOnce(&mut BookRecommendation) + Send,
    {
        let mut recommendation = self.find_owned(id, user_id).await?;
        change(&mut recommendation);
        let updated = self.recommendation_repository.update(&recommendation).await?;
        Ok(RecommendationResponse::from(updated))
    }

    /// Runs `change` under `call`, then drops the single read and the
    /// owner's listings.
    async fn change_invalidating<F>(
        &self,
        call: Call,
        id: RecommendationId,
        user_id: UserId,
        change: F,
    ) -> FolioResult<RecommendationResponse>
    where
        F: FnOnce(&mut BookRecommendation) + Send,
    {
        let single = Invalidate::resolver(PREFIX, recommendation_key);
        Invalidate::pattern(PREFIX, listings_pattern(user_id))
            .with_scan_batch_size(self.settings.scan_batch_size)
            .run(&self.cache, call.clone(), || {
                single.run(&self.cache, call, || self.change(id, user_id, change))
            })
            .await
    }

    async fn insert_recommendation(
        &self,
        request: CreateRecommendationRequest,
    ) -> FolioResult<RecommendationResponse> {
        request.validate_request()?;

        if self.book_repository.find_by_id(request.book_id).await?.is_none() {
            return Err(FolioError::validation(format!("Book not found: {}", request.book_id)));
        }

        let recommendation = BookRecommendation::new(
            request.user_id,
            request.book_id,
            request.score,
            request.reason,
            request.source,
            request.metadata,
        );
        let saved = self.recommendation_repository.save(&recommendation).await?;

        info!(user_id = %saved.user_id, "Recommendation stored: {}", saved.id);
        Ok(RecommendationResponse::from(saved))
    }

    async fn load_for_user(
        &self,
        user_id: UserId,
        request: &RecommendationRequest,
    ) -> FolioResult<Vec<RecommendationResponse>> {
        request.validate_request()?;

        let filter = RecommendationFilter::from(request);
        let recommendations = self.recommendation_repository.find_for_user(user_id, &filter).await?;

        debug!(user_id = %user_id, count = recommendations.len(), "Loaded recommendations");
        Ok(recommendations.into_iter().map(RecommendationResponse::from).collect())
    }
}

#[async_trait]
impl RecommendationService for RecommendationServiceComponent {
    async fn get_recommendation(&self, id: RecommendationId) -> FolioResult<Option<RecommendationResponse>> {
        ReadThrough::new(PREFIX, RECOMMENDATION_TTL_SECS)
            .run(&self.cache, Call::new("get_recommendation").arg(id), || async move {
                self.recommendation_repository
                    .find_by_id(id)
                    .await
                    .map(|r| r.map(RecommendationResponse::from))
            })
            .await
    }

    async fn get_user_recommendations(
        &self,
        user_id: UserId,
        request: &RecommendationRequest,
    ) -> FolioResult<Vec<RecommendationResponse>> {
        let call = Call::new("get_user_recommendations").arg(user_id).json(request);
        ReadThrough::new(PREFIX, RECOMMENDATION_TTL_SECS)
            .with_key_builder(listing_key)
            .run(&self.cache, call, || self.load_for_user(user_id, request))
            .await
    }

    async fn create_recommendation(
        &self,
        request: CreateRecommendationRequest,
    ) -> FolioResult<RecommendationResponse> {
        let call = Call::new("create_recommendation").json(&request);
        Invalidate::pattern(PREFIX, listings_pattern(request.user_id))
            .with_scan_batch_size(self.settings.scan_batch_size)
            .run(&self.cache, call, || self.insert_recommendation(request))
            .await
    }

    async fn mark_viewed(&self, id: RecommendationId, user_id: UserId) -> FolioResult<RecommendationResponse> {
        let call = Call::new("mark_viewed").arg(id).arg(user_id);
        self.change_invalidating(call, id, user_id, BookRecommendation::mark_viewed)
            .await
    }

    async fn dismiss(&self, id: RecommendationId, user_id: UserId) -> FolioResult<RecommendationResponse> {
        let call = Call::new("dismiss").arg(id).arg(user_id);
        self.change_invalidating(call, id, user_id, BookRecommendation::dismiss)
            .await
    }

    async fn record_feedback(
        &self,
        id: RecommendationId,
        user_id: UserId,
        request: RecommendationFeedbackRequest,
    ) -> FolioResult<RecommendationResponse> {
        request.validate_request()?;

        let call = Call::new("record_feedback").arg(id).arg(user_id).json(&request);
        self.change_invalidating(call, id, user_id, move |r| {
            r.record_feedback(request.is_helpful, request.feedback_text);
        })
        .await
    }
}

impl std::fmt::Debug for RecommendationServiceComponent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecommendationServiceComponent").finish_non_exhaustive()
    }
}
