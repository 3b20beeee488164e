//! Book service implementation.

use crate::book_service::BookService;
use crate::cache::{Call, CacheHandle, CacheSettings, Invalidate, ReadThrough};
use crate::dto::{BookResponse, CreateBookRequest, UpdateBookRequest};
use folio_core::{Book, BookId, CategoryId, FolioError, FolioResult, ValidateExt};
use folio_repository::{BookRepository, BookSearchCriteria, CategoryRepository, InteractionRepository};
use async_trait::async_trait;
use shaku::Component;
use std::sync::Arc;
use tracing::{debug, info};

const PREFIX: &str = "book_service";

const CATALOG_TTL_SECS: u64 = 600;
const SEARCH_TTL_SECS: u64 = 300;
const POPULAR_TTL_SECS: u64 = 3600;

/// Shaku component for [`BookService`].
#[derive(Component)]
#[shaku(interface = BookService)]
pub struct BookServiceComponent {
    #[shaku(inject)]
    book_repository: Arc<dyn BookRepository>,
    #[shaku(inject)]
    category_repository: Arc<dyn CategoryRepository>,
    #[shaku(inject)]
    interaction_repository: Arc<dyn InteractionRepository>,
    cache: CacheHandle,
    settings: CacheSettings,
}

impl BookServiceComponent {
    /// Creates a book service outside the DI container.
    pub fn new(
        book_repository: Arc<dyn BookRepository>,
        category_repository: Arc<dyn CategoryRepository>,
        interaction_repository: Arc<dyn InteractionRepository>,
        cache: CacheHandle,
        settings: CacheSettings,
    ) -> Self {
        Self {
            book_repository,
            category_repository,
            interaction_repository,
            cache,
            settings,
        }
    }

    async fn find_book(&self, id: BookId) -> FolioResult<Book> {
        self.book_repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| FolioError::not_found("Book", id))
    }

    /// Attaches each book's categories in one repository round-trip.
    async fn with_categories(&self, books: Vec<Book>) -> FolioResult<Vec<BookResponse>> {
        let ids: Vec<BookId> = books.iter().map(|b| b.id).collect();
        let mut categories = self.book_repository.categories_for_books(&ids).await?;

        Ok(books
            .into_iter()
            .map(|book| {
                let linked = categories.remove(&book.id).unwrap_or_default();
                BookResponse::with_categories(book, linked)
            })
            .collect())
    }

    async fn load_book(&self, id: BookId) -> FolioResult<Option<BookResponse>> {
        match self.book_repository.find_by_id(id).await? {
            Some(book) => Ok(self.with_categories(vec![book]).await?.pop()),
            None => Ok(None),
        }
    }

    async fn load_books(&self, skip: u32, limit: u32) -> FolioResult<Vec<BookResponse>> {
        let books = self.book_repository.find_all(skip, limit).await?;
        self.with_categories(books).await
    }

    /// Fails unless every id names an existing category.
    async fn check_categories(&self, category_ids: &[CategoryId]) -> FolioResult<()> {
        if category_ids.is_empty() {
            return Ok(());
        }
        let found = self.category_repository.find_by_ids(category_ids).await?;
        if let Some(missing) = category_ids.iter().find(|id| !found.iter().any(|c| c.id == **id)) {
            return Err(FolioError::validation(format!("Category not found: {}", missing)));
        }
        Ok(())
    }

    async fn insert_book(&self, request: CreateBookRequest) -> FolioResult<BookResponse> {
        debug!("Creating book: {}", request.title);

        request.validate_request()?;

        if let Some(isbn) = &request.isbn {
            if self.book_repository.exists_by_isbn(isbn).await? {
                return Err(FolioError::Conflict(format!("ISBN '{}' already exists", isbn)));
            }
        }

        let (book, category_ids) = request.into_book();
        self.check_categories(&category_ids).await?;

        let saved = self.book_repository.save(&book).await?;
        self.book_repository.set_categories(saved.id, &category_ids).await?;

        info!("Book created: {}", saved.id);
        let categories = self.category_repository.find_by_ids(&category_ids).await?;
        Ok(BookResponse::with_categories(saved, categories))
    }

    async fn modify_book(&self, id: BookId, request: UpdateBookRequest) -> FolioResult<BookResponse> {
        debug!("Updating book: {}", id);

        request.validate_request()?;

        let mut book = self.find_book(id).await?;

        if let Some(isbn) = &request.isbn {
            if book.isbn.as_ref() != Some(isbn) && self.book_repository.exists_by_isbn(isbn).await? {
                return Err(FolioError::Conflict(format!("ISBN '{}' already exists", isbn)));
            }
        }

        if let Some(category_ids) = &request.category_ids {
            self.check_categories(category_ids).await?;
        }

        request.apply_to(&mut book);
        let updated = self.book_repository.update(&book).await?;

        if let Some(category_ids) = &request.category_ids {
            self.book_repository.set_categories(id, category_ids).await?;
        }

        info!("Book updated: {}", id);
        self.with_categories(vec![updated])
            .await?
            .pop()
            .ok_or_else(|| FolioError::not_found("Book", id))
    }

    async fn remove_book(&self, id: BookId) -> FolioResult<()> {
        if !self.book_repository.delete(id).await? {
            return Err(FolioError::not_found("Book", id));
        }
        info!("Book deleted: {}", id);
        Ok(())
    }

    async fn refresh_ratings(&self, book_id: BookId) -> FolioResult<BookResponse> {
        let mut book = self.find_book(book_id).await?;
        let ratings = self.interaction_repository.ratings_for_book(book_id).await?;

        book.apply_ratings(&ratings);
        let updated = self.book_repository.update(&book).await?;

        debug!(
            book_id = %book_id,
            average_rating = updated.average_rating,
            ratings_count = updated.ratings_count,
            "Book ratings refreshed"
        );
        Ok(BookResponse::from(updated))
    }
}

#[async_trait]
impl BookService for BookServiceComponent {
    async fn get_books_with_categories(&self, skip: u32, limit: u32) -> FolioResult<Vec<BookResponse>> {
        let call = Call::new("get_books_with_categories").arg(skip).arg(limit);
        ReadThrough::new(PREFIX, CATALOG_TTL_SECS)
            .run(&self.cache, call, || self.load_books(skip, limit))
            .await
    }

    async fn get_book_with_categories(&self, id: BookId) -> FolioResult<Option<BookResponse>> {
        ReadThrough::new(PREFIX, CATALOG_TTL_SECS)
            .run(&self.cache, Call::new("get_book_with_categories").arg(id), || self.load_book(id))
            .await
    }

    async fn search_books(
        &self,
        criteria: &BookSearchCriteria,
        skip: u32,
        limit: u32,
    ) -> FolioResult<Vec<BookResponse>> {
        let call = Call::new("search_books").json(criteria).arg(skip).arg(limit);
        ReadThrough::new(PREFIX, SEARCH_TTL_SECS)
            .run(&self.cache, call, || async move {
                let books = self.book_repository.search(criteria, skip, limit).await?;
                Ok::<_, FolioError>(books.into_iter().map(BookResponse::from).collect())
            })
            .await
    }

    async fn create_book(&self, request: CreateBookRequest) -> FolioResult<BookResponse> {
        let call = Call::new("create_book").json(&request);
        Invalidate::new(PREFIX)
            .run(&self.cache, call, || self.insert_book(request))
            .await
    }

    async fn update_book(&self, id: BookId, request: UpdateBookRequest) -> FolioResult<BookResponse> {
        let call = Call::new("update_book").arg(id).json(&request);
        Invalidate::new(PREFIX)
            .run(&self.cache, call, || self.modify_book(id, request))
            .await
    }

    async fn delete_book(&self, id: BookId) -> FolioResult<()> {
        Invalidate::new(PREFIX)
            .run(&self.cache, Call::new("delete_book").arg(id), || self.remove_book(id))
            .await
    }

    async fn get_popular_books(&self, limit: u32) -> FolioResult<Vec<BookResponse>> {
        ReadThrough::new(PREFIX, POPULAR_TTL_SECS)
            .run(&self.cache, Call::new("get_popular_books").arg(limit), || async move {
                let books = self.book_repository.find_popular(limit).await?;
                Ok::<_, FolioError>(books.into_iter().map(BookResponse::from).collect())
            })
            .await
    }

    async fn get_books_by_category(&self, category_id: CategoryId, limit: u32) -> FolioResult<Vec<BookResponse>> {
        let call = Call::new("get_books_by_category").arg(category_id).arg(limit);
        ReadThrough::new(PREFIX, POPULAR_TTL_SECS)
            .run(&self.cache, call, || async move {
                let books = self.book_repository.find_by_category(category_id, limit).await?;
                Ok::<_, FolioError>(books.into_iter().map(BookResponse::from).collect())
            })
            .await
    }

    async fn update_book_ratings(&self, book_id: BookId) -> FolioResult<BookResponse> {
        // Keys are `book_service:<operation>:...`, so `book_*` only matches
        // operations whose name starts with `book_`.
        Invalidate::pattern(PREFIX, "book_*")
            .with_scan_batch_size(self.settings.scan_batch_size)
            .run(&self.cache, Call::new("update_book_ratings").arg(book_id), || {
                self.refresh_ratings(book_id)
            })
            .await
    }
}

impl std::fmt::Debug for BookServiceComponent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BookServiceComponent").finish_non_exhaustive()
    }
}
