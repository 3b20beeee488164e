//! Book service trait definition.

use crate::dto::{BookResponse, CreateBookRequest, UpdateBookRequest};
use async_trait::async_trait;
use folio_core::{BookId, CategoryId, FolioResult, Interface};
use folio_repository::BookSearchCriteria;

/// The book catalog.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BookService: Interface + Send + Sync {
    /// Lists books with their categories, ordered by title.
    async fn get_books_with_categories(&self, skip: u32, limit: u32) -> FolioResult<Vec<BookResponse>>;

    /// Gets a book with its categories.
    async fn get_book_with_categories(&self, id: BookId) -> FolioResult<Option<BookResponse>>;

    /// Searches the catalog, ordered by title.
    async fn search_books(
        &self,
        criteria: &BookSearchCriteria,
        skip: u32,
        limit: u32,
    ) -> FolioResult<Vec<BookResponse>>;

    /// Adds a book and links its categories.
    async fn create_book(&self, request: CreateBookRequest) -> FolioResult<BookResponse>;

    /// Updates a book, replacing its category links when given.
    async fn update_book(&self, id: BookId, request: UpdateBookRequest) -> FolioResult<BookResponse>;

    /// Removes a book.
    async fn delete_book(&self, id: BookId) -> FolioResult<()>;

    /// Highest-rated books that have at least one rating.
    async fn get_popular_books(&self, limit: u32) -> FolioResult<Vec<BookResponse>>;

    /// Books in a category, ordered by title.
    async fn get_books_by_category(&self, category_id: CategoryId, limit: u32) -> FolioResult<Vec<BookResponse>>;

    /// Recomputes a book's average rating and rating count from its rate
    /// interactions.
    async fn update_book_ratings(&self, book_id: BookId) -> FolioResult<BookResponse>;
}
