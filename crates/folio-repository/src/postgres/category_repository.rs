//! PostgreSQL category repository implementation.

use crate::{traits::CategoryRepository, DatabasePoolInterface};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use folio_core::{Category, CategoryId, FolioResult};
use shaku::Component;
use sqlx::FromRow;
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

/// PostgreSQL category repository implementation.
#[derive(Component, Clone)]
#[shaku(interface = CategoryRepository)]
pub struct PgCategoryRepository {
    #[shaku(inject)]
    pool: Arc<dyn DatabasePoolInterface>,
}

impl PgCategoryRepository {
    /// Creates a new PostgreSQL category repository.
    #[must_use]
    pub fn new(pool: Arc<dyn DatabasePoolInterface>) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
pub(crate) struct CategoryRow {
    id: CategoryId,
    name: String,
    description: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<CategoryRow> for Category {
    fn from(row: CategoryRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            description: row.description,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, FromRow)]
struct PopularCategoryRow {
    #[sqlx(flatten)]
    category: CategoryRow,
    book_count: i64,
}

#[async_trait]
impl CategoryRepository for PgCategoryRepository {
    async fn find_by_id(&self, id: CategoryId) -> FolioResult<Option<Category>> {
        debug!("Finding category by id: {}", id);

        let row = sqlx::query_as::<_, CategoryRow>(
            "SELECT id, name, description, created_at, updated_at FROM categories WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(self.pool.inner())
        .await?;

        Ok(row.map(Category::from))
    }

    async fn find_by_name(&self, name: &str) -> FolioResult<Option<Category>> {
        debug!("Finding category by name: {}", name);

        let row = sqlx::query_as::<_, CategoryRow>(
            "SELECT id, name, description, created_at, updated_at FROM categories WHERE name = $1",
        )
        .bind(name)
        .fetch_optional(self.pool.inner())
        .await?;

        Ok(row.map(Category::from))
    }

    async fn find_all(&self, skip: u32, limit: u32) -> FolioResult<Vec<Category>> {
        let rows = sqlx::query_as::<_, CategoryRow>(
            r#"
            SELECT id, name, description, created_at, updated_at
            FROM categories
            ORDER BY name
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(i64::from(limit))
        .bind(i64::from(skip))
        .fetch_all(self.pool.inner())
        .await?;

        Ok(rows.into_iter().map(Category::from).collect())
    }

    async fn find_by_ids(&self, ids: &[CategoryId]) -> FolioResult<Vec<Category>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<Uuid> = ids.iter().map(|id| id.into_inner()).collect();
        let rows = sqlx::query_as::<_, CategoryRow>(
            r#"
            SELECT id, name, description, created_at, updated_at
            FROM categories
            WHERE id = ANY($1)
            ORDER BY name
            "#,
        )
        .bind(&ids)
        .fetch_all(self.pool.inner())
        .await?;

        Ok(rows.into_iter().map(Category::from).collect())
    }

    async fn save(&self, category: &Category) -> FolioResult<Category> {
        debug!("Saving category: {}", category.name);

        sqlx::query(
            r#"
            INSERT INTO categories (id, name, description, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(category.id)
        .bind(&category.name)
        .bind(&category.description)
        .bind(category.created_at)
        .bind(category.updated_at)
        .execute(self.pool.inner())
        .await?;

        Ok(category.clone())
    }

    async fn update(&self, category: &Category) -> FolioResult<Category> {
        debug!("Updating category: {}", category.id);

        sqlx::query("UPDATE categories SET name = $2, description = $3, updated_at = $4 WHERE id = $1")
            .bind(category.id)
            .bind(&category.name)
            .bind(&category.description)
            .bind(category.updated_at)
            .execute(self.pool.inner())
            .await?;

        Ok(category.clone())
    }

    async fn delete(&self, id: CategoryId) -> FolioResult<bool> {
        debug!("Deleting category: {}", id);

        let result = sqlx::query("DELETE FROM categories WHERE id = $1")
            .bind(id)
            .execute(self.pool.inner())
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn count_books(&self, id: CategoryId) -> FolioResult<u64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM book_categories WHERE category_id = $1")
            .bind(id)
            .fetch_one(self.pool.inner())
            .await?;

        Ok(u64::try_from(count).unwrap_or_default())
    }

    async fn find_popular(&self, limit: u32) -> FolioResult<Vec<(Category, u64)>> {
        let rows = sqlx::query_as::<_, PopularCategoryRow>(
            r#"
            SELECT c.id, c.name, c.description, c.created_at, c.updated_at,
                   COUNT(bc.book_id) AS book_count
            FROM categories c
            LEFT JOIN book_categories bc ON bc.category_id = c.id
            GROUP BY c.id
            ORDER BY book_count DESC, c.name
            LIMIT $1
            "#,
        )
        .bind(i64::from(limit))
        .fetch_all(self.pool.inner())
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| {
                (
                    Category::from(row.category),
                    u64::try_from(row.book_count).unwrap_or_default(),
                )
            })
            .collect())
    }
}
