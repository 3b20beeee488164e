//! PostgreSQL interaction repository implementation.

use crate::postgres::book_repository::{BookRow, BOOK_COLUMNS};
use crate::postgres::user_repository::{UserRow, USER_COLUMNS};
use crate::{traits::InteractionRepository, DatabasePoolInterface};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use folio_core::{
    Book, BookId, FolioError, FolioResult, Interaction, InteractionId, InteractionType, User,
    UserId,
};
use shaku::Component;
use sqlx::FromRow;
use std::sync::Arc;
use tracing::debug;

/// PostgreSQL interaction repository implementation.
#[derive(Component, Clone)]
#[shaku(interface = InteractionRepository)]
pub struct PgInteractionRepository {
    #[shaku(inject)]
    pool: Arc<dyn DatabasePoolInterface>,
}

impl PgInteractionRepository {
    /// Creates a new PostgreSQL interaction repository.
    #[must_use]
    pub fn new(pool: Arc<dyn DatabasePoolInterface>) -> Self {
        Self { pool }
    }

    async fn fetch(&self, sql: &str, id: uuid::Uuid, limit: u32) -> FolioResult<Vec<Interaction>> {
        let rows = sqlx::query_as::<_, InteractionRow>(sql)
            .bind(id)
            .bind(i64::from(limit))
            .fetch_all(self.pool.inner())
            .await?;

        rows.into_iter().map(Interaction::try_from).collect()
    }
}

#[derive(Debug, FromRow)]
struct InteractionRow {
    id: InteractionId,
    user_id: UserId,
    book_id: BookId,
    interaction_type: String,
    rating: Option<f64>,
    review_text: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<InteractionRow> for Interaction {
    type Error = FolioError;

    fn try_from(row: InteractionRow) -> Result<Self, Self::Error> {
        let interaction_type = row
            .interaction_type
            .parse::<InteractionType>()
            .map_err(|e| FolioError::Internal(format!("Invalid interaction in database: {}", e)))?;

        Ok(Self {
            id: row.id,
            user_id: row.user_id,
            book_id: row.book_id,
            interaction_type,
            rating: row.rating,
            review_text: row.review_text,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

const INTERACTION_COLUMNS: &str =
    "id, user_id, book_id, interaction_type, rating, review_text, created_at, updated_at";

#[async_trait]
impl InteractionRepository for PgInteractionRepository {
    async fn find_by_id(&self, id: InteractionId) -> FolioResult<Option<Interaction>> {
        debug!("Finding interaction by id: {}", id);

        let row = sqlx::query_as::<_, InteractionRow>(&format!(
            "SELECT {INTERACTION_COLUMNS} FROM user_interactions WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool.inner())
        .await?;

        row.map(Interaction::try_from).transpose()
    }

    async fn find_by_user(&self, user_id: UserId, limit: u32) -> FolioResult<Vec<Interaction>> {
        self.fetch(
            &format!(
                "SELECT {INTERACTION_COLUMNS} FROM user_interactions \
                 WHERE user_id = $1 ORDER BY created_at DESC LIMIT $2"
            ),
            user_id.into_inner(),
            limit,
        )
        .await
    }

    async fn find_by_book(&self, book_id: BookId, limit: u32) -> FolioResult<Vec<Interaction>> {
        self.fetch(
            &format!(
                "SELECT {INTERACTION_COLUMNS} FROM user_interactions \
                 WHERE book_id = $1 ORDER BY created_at DESC LIMIT $2"
            ),
            book_id.into_inner(),
            limit,
        )
        .await
    }

    async fn find_user_book(
        &self,
        user_id: UserId,
        book_id: BookId,
        interaction_type: Option<InteractionType>,
    ) -> FolioResult<Option<Interaction>> {
        let row = sqlx::query_as::<_, InteractionRow>(&format!(
            r#"
            SELECT {INTERACTION_COLUMNS} FROM user_interactions
            WHERE user_id = $1 AND book_id = $2
              AND ($3::text IS NULL OR interaction_type = $3)
            ORDER BY created_at DESC
            LIMIT 1
            "#
        ))
        .bind(user_id)
        .bind(book_id)
        .bind(interaction_type.map(|t| t.as_str()))
        .fetch_optional(self.pool.inner())
        .await?;

        row.map(Interaction::try_from).transpose()
    }

    async fn save(&self, interaction: &Interaction) -> FolioResult<Interaction> {
        debug!(
            "Saving {} interaction of user {} on book {}",
            interaction.interaction_type, interaction.user_id, interaction.book_id
        );

        sqlx::query(
            r#"
            INSERT INTO user_interactions (id, user_id, book_id, interaction_type, rating,
                                           review_text, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(interaction.id)
        .bind(interaction.user_id)
        .bind(interaction.book_id)
        .bind(interaction.interaction_type.as_str())
        .bind(interaction.rating)
        .bind(&interaction.review_text)
        .bind(interaction.created_at)
        .bind(interaction.updated_at)
        .execute(self.pool.inner())
        .await?;

        Ok(interaction.clone())
    }

    async fn update(&self, interaction: &Interaction) -> FolioResult<Interaction> {
        debug!("Updating interaction: {}", interaction.id);

        sqlx::query(
            r#"
            UPDATE user_interactions
            SET interaction_type = $2, rating = $3, review_text = $4, updated_at = $5
            WHERE id = $1
            "#,
        )
        .bind(interaction.id)
        .bind(interaction.interaction_type.as_str())
        .bind(interaction.rating)
        .bind(&interaction.review_text)
        .bind(interaction.updated_at)
        .execute(self.pool.inner())
        .await?;

        Ok(interaction.clone())
    }

    async fn delete(&self, id: InteractionId) -> FolioResult<bool> {
        debug!("Deleting interaction: {}", id);

        let result = sqlx::query("DELETE FROM user_interactions WHERE id = $1")
            .bind(id)
            .execute(self.pool.inner())
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn ratings_for_book(&self, book_id: BookId) -> FolioResult<Vec<f64>> {
        let ratings: Vec<f64> = sqlx::query_scalar(
            r#"
            SELECT rating FROM user_interactions
            WHERE book_id = $1 AND interaction_type = 'rate' AND rating IS NOT NULL
            "#,
        )
        .bind(book_id)
        .fetch_all(self.pool.inner())
        .await?;

        Ok(ratings)
    }

    async fn rated_books(&self, user_id: UserId) -> FolioResult<Vec<Book>> {
        let rows = sqlx::query_as::<_, BookRow>(&format!(
            r#"
            SELECT {BOOK_COLUMNS} FROM books b
            WHERE b.id IN (
                SELECT book_id FROM user_interactions
                WHERE user_id = $1 AND interaction_type = 'rate'
            )
            ORDER BY b.title
            "#
        ))
        .bind(user_id)
        .fetch_all(self.pool.inner())
        .await?;

        Ok(rows.into_iter().map(Book::from).collect())
    }

    async fn bookmarked_books(&self, user_id: UserId) -> FolioResult<Vec<Book>> {
        let rows = sqlx::query_as::<_, BookRow>(&format!(
            r#"
            SELECT {BOOK_COLUMNS} FROM books b
            WHERE b.id IN (
                SELECT book_id FROM user_interactions
                WHERE user_id = $1 AND interaction_type = 'bookmark'
            )
            ORDER BY b.title
            "#
        ))
        .bind(user_id)
        .fetch_all(self.pool.inner())
        .await?;

        Ok(rows.into_iter().map(Book::from).collect())
    }

    async fn users_who_rated(&self, book_id: BookId, min_rating: f64) -> FolioResult<Vec<User>> {
        let rows = sqlx::query_as::<_, UserRow>(&format!(
            r#"
            SELECT {USER_COLUMNS} FROM users u
            WHERE u.id IN (
                SELECT user_id FROM user_interactions
                WHERE book_id = $1 AND interaction_type = 'rate' AND rating >= $2
            )
            ORDER BY u.username
            "#
        ))
        .bind(book_id)
        .bind(min_rating)
        .fetch_all(self.pool.inner())
        .await?;

        Ok(rows.into_iter().map(User::from).collect())
    }
}
