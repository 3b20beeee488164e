//! PostgreSQL recommendation repository implementation.

use crate::{
    traits::{RecommendationFilter, RecommendationRepository},
    DatabasePoolInterface,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use folio_core::{
    BookId, BookRecommendation, FolioError, FolioResult, RecommendationId, RecommendationMetadata,
    RecommendationSource, UserId,
};
use shaku::Component;
use sqlx::{types::Json, FromRow, Postgres, QueryBuilder};
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

/// PostgreSQL recommendation repository implementation.
#[derive(Component, Clone)]
#[shaku(interface = RecommendationRepository)]
pub struct PgRecommendationRepository {
    #[shaku(inject)]
    pool: Arc<dyn DatabasePoolInterface>,
}

impl PgRecommendationRepository {
    /// Creates a new PostgreSQL recommendation repository.
    #[must_use]
    pub fn new(pool: Arc<dyn DatabasePoolInterface>) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct RecommendationRow {
    id: RecommendationId,
    user_id: UserId,
    book_id: BookId,
    score: f64,
    reason: Option<String>,
    is_viewed: bool,
    is_dismissed: bool,
    source: String,
    metadata: Json<RecommendationMetadata>,
    viewed_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<RecommendationRow> for BookRecommendation {
    type Error = FolioError;

    fn try_from(row: RecommendationRow) -> Result<Self, Self::Error> {
        let source = row
            .source
            .parse::<RecommendationSource>()
            .map_err(|e| FolioError::Internal(format!("Invalid recommendation in database: {}", e)))?;

        Ok(Self {
            id: row.id,
            user_id: row.user_id,
            book_id: row.book_id,
            score: row.score,
            reason: row.reason,
            is_viewed: row.is_viewed,
            is_dismissed: row.is_dismissed,
            source,
            metadata: row.metadata.0,
            viewed_at: row.viewed_at,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

const RECOMMENDATION_COLUMNS: &str = "r.id, r.user_id, r.book_id, r.score, r.reason, r.is_viewed, \
     r.is_dismissed, r.source, r.metadata, r.viewed_at, r.created_at, r.updated_at";

#[async_trait]
impl RecommendationRepository for PgRecommendationRepository {
    async fn find_by_id(&self, id: RecommendationId) -> FolioResult<Option<BookRecommendation>> {
        debug!("Finding recommendation by id: {}", id);

        let row = sqlx::query_as::<_, RecommendationRow>(&format!(
            "SELECT {RECOMMENDATION_COLUMNS} FROM book_recommendations r WHERE r.id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool.inner())
        .await?;

        row.map(BookRecommendation::try_from).transpose()
    }

    async fn find_for_user(
        &self,
        user_id: UserId,
        filter: &RecommendationFilter,
    ) -> FolioResult<Vec<BookRecommendation>> {
        debug!("Finding recommendations of user {}: {:?}", user_id, filter);

        let mut qb = QueryBuilder::<Postgres>::new(format!(
            "SELECT {RECOMMENDATION_COLUMNS} FROM book_recommendations r WHERE r.user_id = "
        ));
        qb.push_bind(user_id);

        if !filter.include_viewed {
            qb.push(" AND NOT r.is_viewed");
        }
        if !filter.include_dismissed {
            qb.push(" AND NOT r.is_dismissed");
        }
        if let Some(min_score) = filter.min_score {
            qb.push(" AND r.score >= ").push_bind(min_score);
        }
        if !filter.sources.is_empty() {
            let sources: Vec<String> = filter.sources.iter().map(|s| s.as_str().to_string()).collect();
            qb.push(" AND r.source = ANY(").push_bind(sources).push(")");
        }
        if !filter.category_ids.is_empty() {
            let categories: Vec<Uuid> = filter.category_ids.iter().map(|id| id.into_inner()).collect();
            qb.push(
                " AND EXISTS (SELECT 1 FROM book_categories bc \
                 WHERE bc.book_id = r.book_id AND bc.category_id = ANY(",
            )
            .push_bind(categories)
            .push("))");
        }

        qb.push(" ORDER BY r.score DESC LIMIT ")
            .push_bind(i64::from(filter.limit));

        let rows = qb
            .build_query_as::<RecommendationRow>()
            .fetch_all(self.pool.inner())
            .await?;

        rows.into_iter().map(BookRecommendation::try_from).collect()
    }

    async fn save(&self, recommendation: &BookRecommendation) -> FolioResult<BookRecommendation> {
        debug!(
            "Saving recommendation of book {} for user {}",
            recommendation.book_id, recommendation.user_id
        );

        sqlx::query(
            r#"
            INSERT INTO book_recommendations (id, user_id, book_id, score, reason, is_viewed,
                                              is_dismissed, source, metadata, viewed_at,
                                              created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            "#,
        )
        .bind(recommendation.id)
        .bind(recommendation.user_id)
        .bind(recommendation.book_id)
        .bind(recommendation.score)
        .bind(&recommendation.reason)
        .bind(recommendation.is_viewed)
        .bind(recommendation.is_dismissed)
        .bind(recommendation.source.as_str())
        .bind(Json(&recommendation.metadata))
        .bind(recommendation.viewed_at)
        .bind(recommendation.created_at)
        .bind(recommendation.updated_at)
        .execute(self.pool.inner())
        .await?;

        Ok(recommendation.clone())
    }

    async fn update(&self, recommendation: &BookRecommendation) -> FolioResult<BookRecommendation> {
        debug!("Updating recommendation: {}", recommendation.id);

        sqlx::query(
            r#"
            UPDATE book_recommendations
            SET score = $2, reason = $3, is_viewed = $4, is_dismissed = $5, source = $6,
                metadata = $7, viewed_at = $8, updated_at = $9
            WHERE id = $1
            "#,
        )
        .bind(recommendation.id)
        .bind(recommendation.score)
        .bind(&recommendation.reason)
        .bind(recommendation.is_viewed)
        .bind(recommendation.is_dismissed)
        .bind(recommendation.source.as_str())
        .bind(Json(&recommendation.metadata))
        .bind(recommendation.viewed_at)
        .bind(recommendation.updated_at)
        .execute(self.pool.inner())
        .await?;

        Ok(recommendation.clone())
    }
}
