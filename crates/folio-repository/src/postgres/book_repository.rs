//! PostgreSQL book repository implementation.

use crate::postgres::category_repository::CategoryRow;
use crate::{
    traits::{BookRepository, BookSearchCriteria},
    DatabasePoolInterface,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use folio_core::{Book, BookId, Category, CategoryId, FolioResult};
use shaku::Component;
use sqlx::{FromRow, Postgres, QueryBuilder};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

/// PostgreSQL book repository implementation.
#[derive(Component, Clone)]
#[shaku(interface = BookRepository)]
pub struct PgBookRepository {
    #[shaku(inject)]
    pool: Arc<dyn DatabasePoolInterface>,
}

impl PgBookRepository {
    /// Creates a new PostgreSQL book repository.
    #[must_use]
    pub fn new(pool: Arc<dyn DatabasePoolInterface>) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
pub(crate) struct BookRow {
    id: BookId,
    title: String,
    author: String,
    isbn: Option<String>,
    description: Option<String>,
    publication_year: Option<i32>,
    publisher: Option<String>,
    language: String,
    page_count: Option<i32>,
    average_rating: f64,
    ratings_count: i32,
    cover_image_url: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<BookRow> for Book {
    fn from(row: BookRow) -> Self {
        Self {
            id: row.id,
            title: row.title,
            author: row.author,
            isbn: row.isbn,
            description: row.description,
            publication_year: row.publication_year,
            publisher: row.publisher,
            language: row.language,
            page_count: row.page_count,
            average_rating: row.average_rating,
            ratings_count: row.ratings_count,
            cover_image_url: row.cover_image_url,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

pub(crate) const BOOK_COLUMNS: &str = "b.id, b.title, b.author, b.isbn, b.description, \
     b.publication_year, b.publisher, b.language, b.page_count, b.average_rating, \
     b.ratings_count, b.cover_image_url, b.created_at, b.updated_at";

#[derive(Debug, FromRow)]
struct BookCategoryRow {
    book_id: BookId,
    #[sqlx(flatten)]
    category: CategoryRow,
}

#[async_trait]
impl BookRepository for PgBookRepository {
    async fn find_by_id(&self, id: BookId) -> FolioResult<Option<Book>> {
        debug!("Finding book by id: {}", id);

        let row = sqlx::query_as::<_, BookRow>(&format!(
            "SELECT {BOOK_COLUMNS} FROM books b WHERE b.id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool.inner())
        .await?;

        Ok(row.map(Book::from))
    }

    async fn exists_by_isbn(&self, isbn: &str) -> FolioResult<bool> {
        let result: Option<i32> = sqlx::query_scalar("SELECT 1 FROM books WHERE isbn = $1 LIMIT 1")
            .bind(isbn)
            .fetch_optional(self.pool.inner())
            .await?;

        Ok(result.is_some())
    }

    async fn find_all(&self, skip: u32, limit: u32) -> FolioResult<Vec<Book>> {
        debug!("Finding books, skip: {}, limit: {}", skip, limit);

        let rows = sqlx::query_as::<_, BookRow>(&format!(
            "SELECT {BOOK_COLUMNS} FROM books b ORDER BY b.title LIMIT $1 OFFSET $2"
        ))
        .bind(i64::from(limit))
        .bind(i64::from(skip))
        .fetch_all(self.pool.inner())
        .await?;

        Ok(rows.into_iter().map(Book::from).collect())
    }

    async fn search(
        &self,
        criteria: &BookSearchCriteria,
        skip: u32,
        limit: u32,
    ) -> FolioResult<Vec<Book>> {
        debug!("Searching books: {:?}", criteria);

        let mut qb = QueryBuilder::<Postgres>::new(format!("SELECT {BOOK_COLUMNS} FROM books b"));

        if let Some(category_id) = criteria.category_id {
            qb.push(" JOIN book_categories bc ON bc.book_id = b.id AND bc.category_id = ")
                .push_bind(category_id);
        }

        qb.push(" WHERE TRUE");
        if let Some(title) = &criteria.title {
            qb.push(" AND b.title ILIKE ").push_bind(format!("%{}%", title));
        }
        if let Some(author) = &criteria.author {
            qb.push(" AND b.author ILIKE ").push_bind(format!("%{}%", author));
        }
        if let Some(language) = &criteria.language {
            qb.push(" AND b.language = ").push_bind(language.clone());
        }
        if let Some(year) = criteria.min_publication_year {
            qb.push(" AND b.publication_year >= ").push_bind(year);
        }
        if let Some(year) = criteria.max_publication_year {
            qb.push(" AND b.publication_year <= ").push_bind(year);
        }
        if let Some(pages) = criteria.min_page_count {
            qb.push(" AND b.page_count >= ").push_bind(pages);
        }
        if let Some(pages) = criteria.max_page_count {
            qb.push(" AND b.page_count <= ").push_bind(pages);
        }
        if let Some(rating) = criteria.min_rating {
            qb.push(" AND b.average_rating >= ").push_bind(rating);
        }

        qb.push(" ORDER BY b.title LIMIT ")
            .push_bind(i64::from(limit))
            .push(" OFFSET ")
            .push_bind(i64::from(skip));

        let rows = qb
            .build_query_as::<BookRow>()
            .fetch_all(self.pool.inner())
            .await?;

        Ok(rows.into_iter().map(Book::from).collect())
    }

    async fn find_popular(&self, limit: u32) -> FolioResult<Vec<Book>> {
        let rows = sqlx::query_as::<_, BookRow>(&format!(
            r#"
            SELECT {BOOK_COLUMNS} FROM books b
            WHERE b.ratings_count > 0
            ORDER BY b.average_rating DESC, b.ratings_count DESC
            LIMIT $1
            "#
        ))
        .bind(i64::from(limit))
        .fetch_all(self.pool.inner())
        .await?;

        Ok(rows.into_iter().map(Book::from).collect())
    }

    async fn find_by_category(&self, category_id: CategoryId, limit: u32) -> FolioResult<Vec<Book>> {
        let rows = sqlx::query_as::<_, BookRow>(&format!(
            r#"
            SELECT {BOOK_COLUMNS} FROM books b
            JOIN book_categories bc ON bc.book_id = b.id
            WHERE bc.category_id = $1
            ORDER BY b.title
            LIMIT $2
            "#
        ))
        .bind(category_id)
        .bind(i64::from(limit))
        .fetch_all(self.pool.inner())
        .await?;

        Ok(rows.into_iter().map(Book::from).collect())
    }

    async fn save(&self, book: &Book) -> FolioResult<Book> {
        debug!("Saving book: {}", book.title);

        sqlx::query(
            r#"
            INSERT INTO books (id, title, author, isbn, description, publication_year, publisher,
                               language, page_count, average_rating, ratings_count,
                               cover_image_url, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
            "#,
        )
        .bind(book.id)
        .bind(&book.title)
        .bind(&book.author)
        .bind(&book.isbn)
        .bind(&book.description)
        .bind(book.publication_year)
        .bind(&book.publisher)
        .bind(&book.language)
        .bind(book.page_count)
        .bind(book.average_rating)
        .bind(book.ratings_count)
        .bind(&book.cover_image_url)
        .bind(book.created_at)
        .bind(book.updated_at)
        .execute(self.pool.inner())
        .await?;

        Ok(book.clone())
    }

    async fn update(&self, book: &Book) -> FolioResult<Book> {
        debug!("Updating book: {}", book.id);

        sqlx::query(
            r#"
            UPDATE books
            SET title = $2, author = $3, isbn = $4, description = $5, publication_year = $6,
                publisher = $7, language = $8, page_count = $9, average_rating = $10,
                ratings_count = $11, cover_image_url = $12, updated_at = $13
            WHERE id = $1
            "#,
        )
        .bind(book.id)
        .bind(&book.title)
        .bind(&book.author)
        .bind(&book.isbn)
        .bind(&book.description)
        .bind(book.publication_year)
        .bind(&book.publisher)
        .bind(&book.language)
        .bind(book.page_count)
        .bind(book.average_rating)
        .bind(book.ratings_count)
        .bind(&book.cover_image_url)
        .bind(book.updated_at)
        .execute(self.pool.inner())
        .await?;

        Ok(book.clone())
    }

    async fn delete(&self, id: BookId) -> FolioResult<bool> {
        debug!("Deleting book: {}", id);

        let result = sqlx::query("DELETE FROM books WHERE id = $1")
            .bind(id)
            .execute(self.pool.inner())
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn set_categories(&self, book_id: BookId, category_ids: &[CategoryId]) -> FolioResult<()> {
        debug!("Linking book {} to {} categories", book_id, category_ids.len());

        let ids: Vec<Uuid> = category_ids.iter().map(|id| id.into_inner()).collect();
        let mut tx = self.pool.inner().begin().await?;

        sqlx::query("DELETE FROM book_categories WHERE book_id = $1")
            .bind(book_id)
            .execute(&mut *tx)
            .await?;

        sqlx::query(
            r#"
            INSERT INTO book_categories (book_id, category_id)
            SELECT $1, UNNEST($2::uuid[])
            ON CONFLICT DO NOTHING
            "#,
        )
        .bind(book_id)
        .bind(&ids)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(())
    }

    async fn categories_for_books(
        &self,
        book_ids: &[BookId],
    ) -> FolioResult<HashMap<BookId, Vec<Category>>> {
        if book_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let ids: Vec<Uuid> = book_ids.iter().map(|id| id.into_inner()).collect();
        let rows = sqlx::query_as::<_, BookCategoryRow>(
            r#"
            SELECT bc.book_id, c.id, c.name, c.description, c.created_at, c.updated_at
            FROM book_categories bc
            JOIN categories c ON c.id = bc.category_id
            WHERE bc.book_id = ANY($1)
            ORDER BY c.name
            "#,
        )
        .bind(&ids)
        .fetch_all(self.pool.inner())
        .await?;

        let mut categories: HashMap<BookId, Vec<Category>> = HashMap::new();
        for row in rows {
            categories
                .entry(row.book_id)
                .or_default()
                .push(Category::from(row.category));
        }
        Ok(categories)
    }
}
