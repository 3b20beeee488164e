//! PostgreSQL user preference repository implementation.

use crate::{traits::PreferenceRepository, DatabasePoolInterface};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use folio_core::{
    CategoryPreferences, CustomPreferences, FolioResult, PreferenceId, UserId, UserPreference,
};
use shaku::Component;
use sqlx::{types::Json, FromRow};
use std::sync::Arc;
use tracing::debug;

/// PostgreSQL preference repository implementation.
#[derive(Component, Clone)]
#[shaku(interface = PreferenceRepository)]
pub struct PgPreferenceRepository {
    #[shaku(inject)]
    pool: Arc<dyn DatabasePoolInterface>,
}

impl PgPreferenceRepository {
    /// Creates a new PostgreSQL preference repository.
    #[must_use]
    pub fn new(pool: Arc<dyn DatabasePoolInterface>) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct PreferenceRow {
    id: PreferenceId,
    user_id: UserId,
    category_preferences: Json<CategoryPreferences>,
    preferred_language: Option<String>,
    min_page_count: Option<i32>,
    max_page_count: Option<i32>,
    min_publication_year: Option<i32>,
    max_publication_year: Option<i32>,
    min_rating: Option<f64>,
    custom_preferences: Json<CustomPreferences>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<PreferenceRow> for UserPreference {
    fn from(row: PreferenceRow) -> Self {
        Self {
            id: row.id,
            user_id: row.user_id,
            category_preferences: row.category_preferences.0,
            preferred_language: row.preferred_language,
            min_page_count: row.min_page_count,
            max_page_count: row.max_page_count,
            min_publication_year: row.min_publication_year,
            max_publication_year: row.max_publication_year,
            min_rating: row.min_rating,
            custom_preferences: row.custom_preferences.0,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[async_trait]
impl PreferenceRepository for PgPreferenceRepository {
    async fn find_by_user(&self, user_id: UserId) -> FolioResult<Option<UserPreference>> {
        debug!("Finding preferences of user: {}", user_id);

        let row = sqlx::query_as::<_, PreferenceRow>(
            r#"
            SELECT id, user_id, category_preferences, preferred_language, min_page_count,
                   max_page_count, min_publication_year, max_publication_year, min_rating,
                   custom_preferences, created_at, updated_at
            FROM user_preferences
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(self.pool.inner())
        .await?;

        Ok(row.map(UserPreference::from))
    }

    async fn save(&self, preference: &UserPreference) -> FolioResult<UserPreference> {
        debug!("Saving preferences of user: {}", preference.user_id);

        sqlx::query(
            r#"
            INSERT INTO user_preferences (id, user_id, category_preferences, preferred_language,
                                          min_page_count, max_page_count, min_publication_year,
                                          max_publication_year, min_rating, custom_preferences,
                                          created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            "#,
        )
        .bind(preference.id)
        .bind(preference.user_id)
        .bind(Json(&preference.category_preferences))
        .bind(&preference.preferred_language)
        .bind(preference.min_page_count)
        .bind(preference.max_page_count)
        .bind(preference.min_publication_year)
        .bind(preference.max_publication_year)
        .bind(preference.min_rating)
        .bind(Json(&preference.custom_preferences))
        .bind(preference.created_at)
        .bind(preference.updated_at)
        .execute(self.pool.inner())
        .await?;

        Ok(preference.clone())
    }

    async fn update(&self, preference: &UserPreference) -> FolioResult<UserPreference> {
        debug!("Updating preferences of user: {}", preference.user_id);

        sqlx::query(
            r#"
            UPDATE user_preferences
            SET category_preferences = $2, preferred_language = $3, min_page_count = $4,
                max_page_count = $5, min_publication_year = $6, max_publication_year = $7,
                min_rating = $8, custom_preferences = $9, updated_at = $10
            WHERE id = $1
            "#,
        )
        .bind(preference.id)
        .bind(Json(&preference.category_preferences))
        .bind(&preference.preferred_language)
        .bind(preference.min_page_count)
        .bind(preference.max_page_count)
        .bind(preference.min_publication_year)
        .bind(preference.max_publication_year)
        .bind(preference.min_rating)
        .bind(Json(&preference.custom_preferences))
        .bind(preference.updated_at)
        .execute(self.pool.inner())
        .await?;

        Ok(preference.clone())
    }
}
