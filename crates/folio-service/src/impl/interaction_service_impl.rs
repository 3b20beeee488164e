//! Interaction service implementation.

use crate::book_service::BookService;
use crate::cache::{Call, CacheHandle, Invalidate, ReadThrough};
use crate::dto::{
    check_requirements, BookResponse, CreateInteractionRequest, InteractionResponse,
    UpdateInteractionRequest, UserResponse,
};
use crate::interaction_service::InteractionService;
use async_trait::async_trait;
use chrono::Utc;
use folio_core::{
    BookId, FolioError, FolioResult, Interaction, InteractionId, InteractionType, UserId,
    ValidateExt,
};
use folio_repository::{BookRepository, InteractionRepository};
use shaku::Component;
use std::sync::Arc;
use tracing::{debug, info, warn};

const PREFIX: &str = "interaction_service";

const INTERACTION_TTL_SECS: u64 = 300;
const SHELF_TTL_SECS: u64 = 3600;
const RATERS_TTL_SECS: u64 = 1800;

/// Shaku component for [`InteractionService`].
#[derive(Component)]
#[shaku(interface = InteractionService)]
pub struct InteractionServiceComponent {
    #[shaku(inject)]
    interaction_repository: Arc<dyn InteractionRepository>,
    #[shaku(inject)]
    book_repository: Arc<dyn BookRepository>,
    #[shaku(inject)]
    book_service: Arc<dyn BookService>,
    cache: CacheHandle,
}

impl InteractionServiceComponent {
    pub fn new(
        interaction_repository: Arc<dyn InteractionRepository>,
        book_repository: Arc<dyn BookRepository>,
        book_service: Arc<dyn BookService>,
        cache: CacheHandle,
    ) -> Self {
        Self {
            interaction_repository,
            book_repository,
            book_service,
            cache,
        }
    }

    async fn find_owned(&self, id: InteractionId, user_id: UserId) -> FolioResult<Interaction> {
        let interaction = self
            .interaction_repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| FolioError::not_found("Interaction", id))?;

        if !interaction.is_owned_by(user_id) {
            warn!(interaction_id = %id, user_id = %user_id, "Interaction owned by another user");
            return Err(FolioError::forbidden("Not authorized to modify this interaction"));
        }
        Ok(interaction)
    }

    async fn refresh_ratings(&self, book_id: BookId) -> FolioResult<()> {
        self.book_service.update_book_ratings(book_id).await?;
        Ok(())
    }

    async fn insert_interaction(
        &self,
        user_id: UserId,
        request: CreateInteractionRequest,
    ) -> FolioResult<InteractionResponse> {
        debug!(user_id = %user_id, book_id = %request.book_id, "Creating interaction");

        request.validate_request()?;
        check_requirements(request.interaction_type, request.rating, request.review_text.as_deref())?;

        if self.book_repository.find_by_id(request.book_id).await?.is_none() {
            return Err(FolioError::validation(format!("Book not found: {}", request.book_id)));
        }

        let interaction = Interaction::new(
            user_id,
            request.book_id,
            request.interaction_type,
            request.rating,
            request.review_text,
        );
        let saved = self.interaction_repository.save(&interaction).await?;

        if saved.is_rating() {
            self.refresh_ratings(saved.book_id).await?;
        }

        info!("Interaction created: {}", saved.id);
        Ok(InteractionResponse::from(saved))
    }

    async fn modify_interaction(
        &self,
        id: InteractionId,
        user_id: UserId,
        request: UpdateInteractionRequest,
    ) -> FolioResult<InteractionResponse> {
        request.validate_request()?;

        let mut interaction = self.find_owned(id, user_id).await?;
        let was_rating = interaction.is_rating();
        if let Some(interaction_type) = request.interaction_type {
            interaction.interaction_type = interaction_type;
        }
        if request.rating.is_some() {
            interaction.rating = request.rating;
        }
        if request.review_text.is_some() {
            interaction.review_text = request.review_text;
        }
        check_requirements(
            interaction.interaction_type,
            interaction.rating,
            interaction.review_text.as_deref(),
        )?;
        interaction.updated_at = Utc::now();

        let updated = self.interaction_repository.update(&interaction).await?;

        if was_rating || updated.is_rating() {
            self.refresh_ratings(updated.book_id).await?;
        }

        info!("Interaction updated: {}", id);
        Ok(InteractionResponse::from(updated))
    }

    async fn remove_interaction(&self, id: InteractionId, user_id: UserId) -> FolioResult<()> {
        let interaction = self.find_owned(id, user_id).await?;

        if !self.interaction_repository.delete(id).await? {
            return Err(FolioError::not_found("Interaction", id));
        }

        if interaction.is_rating() {
            self.refresh_ratings(interaction.book_id).await?;
        }

        info!("Interaction deleted: {}", id);
        Ok(())
    }
}

fn responses<T, U: From<T>>(items: Vec<T>) -> Vec<U> {
    items.into_iter().map(U::from).collect()
}

#[async_trait]
impl InteractionService for InteractionServiceComponent {
    async fn get_user_interactions(&self, user_id: UserId, limit: u32) -> FolioResult<Vec<InteractionResponse>> {
        let call = Call::new("get_user_interactions").arg(user_id).arg(limit);
        ReadThrough::new(PREFIX, INTERACTION_TTL_SECS)
            .run(&self.cache, call, || async move {
                self.interaction_repository.find_by_user(user_id, limit).await.map(responses)
            })
            .await
    }

    async fn get_book_interactions(&self, book_id: BookId, limit: u32) -> FolioResult<Vec<InteractionResponse>> {
        let call = Call::new("get_book_interactions").arg(book_id).arg(limit);
        ReadThrough::new(PREFIX, INTERACTION_TTL_SECS)
            .run(&self.cache, call, || async move {
                self.interaction_repository.find_by_book(book_id, limit).await.map(responses)
            })
            .await
    }

    async fn get_user_book_interaction(
        &self,
        user_id: UserId,
        book_id: BookId,
        interaction_type: Option<InteractionType>,
    ) -> FolioResult<Option<InteractionResponse>> {
        let call = Call::new("get_user_book_interaction")
            .arg(user_id)
            .arg(book_id)
            .opt(interaction_type);
        ReadThrough::new(PREFIX, INTERACTION_TTL_SECS)
            .run(&self.cache, call, || async move {
                self.interaction_repository
                    .find_user_book(user_id, book_id, interaction_type)
                    .await
                    .map(|interaction| interaction.map(InteractionResponse::from))
            })
            .await
    }

    async fn create_interaction(
        &self,
        user_id: UserId,
        request: CreateInteractionRequest,
    ) -> FolioResult<InteractionResponse> {
        let call = Call::new("create_interaction").arg(user_id).json(&request);
        Invalidate::new(PREFIX)
            .run(&self.cache, call, || self.insert_interaction(user_id, request))
            .await
    }

    async fn update_interaction(
        &self,
        id: InteractionId,
        user_id: UserId,
        request: UpdateInteractionRequest,
    ) -> FolioResult<InteractionResponse> {
        let call = Call::new("update_interaction").arg(id).arg(user_id).json(&request);
        Invalidate::new(PREFIX)
            .run(&self.cache, call, || self.modify_interaction(id, user_id, request))
            .await
    }

    async fn delete_interaction(&self, id: InteractionId, user_id: UserId) -> FolioResult<()> {
        let call = Call::new("delete_interaction").arg(id).arg(user_id);
        Invalidate::new(PREFIX)
            .run(&self.cache, call, || self.remove_interaction(id, user_id))
            .await
    }

    async fn get_user_rated_books(&self, user_id: UserId) -> FolioResult<Vec<BookResponse>> {
        ReadThrough::new(PREFIX, SHELF_TTL_SECS)
            .run(&self.cache, Call::new("get_user_rated_books").arg(user_id), || async move {
                self.interaction_repository.rated_books(user_id).await.map(responses)
            })
            .await
    }

    async fn get_user_bookmarked_books(&self, user_id: UserId) -> FolioResult<Vec<BookResponse>> {
        ReadThrough::new(PREFIX, SHELF_TTL_SECS)
            .run(&self.cache, Call::new("get_user_bookmarked_books").arg(user_id), || async move {
                self.interaction_repository.bookmarked_books(user_id).await.map(responses)
            })
            .await
    }

    async fn get_users_who_rated_book(&self, book_id: BookId, min_rating: f64) -> FolioResult<Vec<UserResponse>> {
        let call = Call::new("get_users_who_rated_book").arg(book_id).arg(min_rating);
        ReadThrough::new(PREFIX, RATERS_TTL_SECS)
            .run(&self.cache, call, || async move {
                self.interaction_repository
                    .users_who_rated(book_id, min_rating)
                    .await
                    .map(responses)
            })
            .await
    }
}

impl std::fmt::Debug for InteractionServiceComponent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InteractionServiceComponent").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::book_service::MockBookService;
    use crate::cache::InMemoryCacheBackend;
    use crate::r#impl::testing::{MockBookRepository, MockInteractionRepository};
    use folio_core::{Book, Email, User};
    use mockall::predicate::eq;
    use std::time::Duration;

    struct Fixture {
        interactions: Arc<MockInteractionRepository>,
        backend: Arc<InMemoryCacheBackend>,
        book: Book,
        service: InteractionServiceComponent,
    }

    fn fixture(book_service: MockBookService) -> Fixture {
        let book = Book::new("Piranesi".to_string(), "Susanna Clarke".to_string());
        fixture_for(book, book_service)
    }

    fn fixture_for(book: Book, book_service: MockBookService) -> Fixture {
        let interactions = Arc::new(MockInteractionRepository::default());
        let books = Arc::new(MockBookRepository::default());
        books.add(book.clone());
        interactions.books.lock().unwrap().insert(book.id, book.clone());

        let backend = Arc::new(InMemoryCacheBackend::new());
        let service = InteractionServiceComponent::new(
            interactions.clone(),
            books,
            Arc::new(book_service),
            CacheHandle::Connected(backend.clone()),
        );
        Fixture {
            interactions,
            backend,
            book,
            service,
        }
    }

    fn expect_rating_refresh(book_id: BookId, times: usize) -> MockBookService {
        let mut book_service = MockBookService::new();
        book_service
            .expect_update_book_ratings()
            .with(eq(book_id))
            .times(times)
            .returning(|id| {
                let mut book = Book::new("Piranesi".to_string(), "Susanna Clarke".to_string());
                book.id = id;
                Ok(BookResponse::from(book))
            });
        book_service
    }

    fn rate(book_id: BookId, rating: f64) -> CreateInteractionRequest {
        CreateInteractionRequest {
            book_id,
            interaction_type: InteractionType::Rate,
            rating: Some(rating),
            review_text: None,
        }
    }

    #[tokio::test]
    async fn test_rating_refreshes_book() {
        let interactions = Arc::new(MockInteractionRepository::default());
        let books = Arc::new(MockBookRepository::default());
        let book = Book::new("Piranesi".to_string(), "Susanna Clarke".to_string());
        books.add(book.clone());
        let service = InteractionServiceComponent::new(
            interactions.clone(),
            books,
            Arc::new(expect_rating_refresh(book.id, 1)),
            CacheHandle::Disabled,
        );

        let user_id = UserId::new();
        let created = service.create_interaction(user_id, rate(book.id, 4.5)).await.unwrap();

        assert_eq!(created.rating, Some(4.5));
        assert_eq!(interactions.interactions.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_non_rating_skips_refresh() {
        let f = fixture(MockBookService::new());
        let request = CreateInteractionRequest {
            book_id: f.book.id,
            interaction_type: InteractionType::Bookmark,
            rating: None,
            review_text: None,
        };

        let created = f.service.create_interaction(UserId::new(), request).await.unwrap();
        assert_eq!(created.interaction_type, InteractionType::Bookmark);
    }

    #[tokio::test]
    async fn test_rate_without_rating_rejected() {
        let f = fixture(MockBookService::new());
        let request = CreateInteractionRequest {
            rating: None,
            ..rate(f.book.id, 1.0)
        };

        let err = f.service.create_interaction(UserId::new(), request).await.unwrap_err();
        assert_eq!(err.error_code(), "VALIDATION_ERROR");
        assert!(f.interactions.interactions.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_unknown_book_rejected() {
        let f = fixture(MockBookService::new());
        let err = f
            .service
            .create_interaction(UserId::new(), rate(BookId::new(), 3.0))
            .await
            .unwrap_err();
        assert_eq!(err.error_code(), "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_update_requires_owner() {
        let f = fixture(MockBookService::new());
        let owner = UserId::new();
        let interaction = Interaction::new(owner, f.book.id, InteractionType::Review, None, Some("Fine".to_string()));
        f.interactions.add(interaction.clone());

        let request = UpdateInteractionRequest {
            review_text: Some("Mine now".to_string()),
            ..Default::default()
        };
        let err = f
            .service
            .update_interaction(interaction.id, UserId::new(), request)
            .await
            .unwrap_err();
        assert!(matches!(err, FolioError::Forbidden(_)));
    }

    #[tokio::test]
    async fn test_update_review_text() {
        let f = fixture(MockBookService::new());
        let owner = UserId::new();
        let interaction = Interaction::new(owner, f.book.id, InteractionType::Review, None, Some("Fine".to_string()));
        f.interactions.add(interaction.clone());

        let updated = f
            .service
            .update_interaction(
                interaction.id,
                owner,
                UpdateInteractionRequest {
                    review_text: Some("Wonderful".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.review_text.as_deref(), Some("Wonderful"));
    }

    #[tokio::test]
    async fn test_bookmark_turned_into_rating_refreshes_book() {
        let book = Book::new("Piranesi".to_string(), "Susanna Clarke".to_string());
        let f = fixture_for(book.clone(), expect_rating_refresh(book.id, 1));
        let owner = UserId::new();
        let interaction = Interaction::new(owner, f.book.id, InteractionType::Bookmark, None, None);
        f.interactions.add(interaction.clone());

        let updated = f
            .service
            .update_interaction(
                interaction.id,
                owner,
                UpdateInteractionRequest {
                    interaction_type: Some(InteractionType::Rate),
                    rating: Some(4.5),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.interaction_type, InteractionType::Rate);
        assert_eq!(updated.rating, Some(4.5));
        let stored = f.interactions.get(interaction.id).unwrap();
        assert_eq!(stored.interaction_type, InteractionType::Rate);
    }

    #[tokio::test]
    async fn test_rating_turned_into_bookmark_refreshes_book() {
        let book = Book::new("Piranesi".to_string(), "Susanna Clarke".to_string());
        let f = fixture_for(book.clone(), expect_rating_refresh(book.id, 1));
        let owner = UserId::new();
        let interaction = Interaction::new(owner, f.book.id, InteractionType::Rate, Some(2.0), None);
        f.interactions.add(interaction.clone());

        let updated = f
            .service
            .update_interaction(
                interaction.id,
                owner,
                UpdateInteractionRequest {
                    interaction_type: Some(InteractionType::Bookmark),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.interaction_type, InteractionType::Bookmark);
    }

    #[tokio::test]
    async fn test_kind_change_checks_requirements() {
        let f = fixture(MockBookService::new());
        let owner = UserId::new();
        let interaction = Interaction::new(owner, f.book.id, InteractionType::Bookmark, None, None);
        f.interactions.add(interaction.clone());

        let err = f
            .service
            .update_interaction(
                interaction.id,
                owner,
                UpdateInteractionRequest {
                    interaction_type: Some(InteractionType::Rate),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();

        assert_eq!(err.error_code(), "VALIDATION_ERROR");
        let stored = f.interactions.get(interaction.id).unwrap();
        assert_eq!(stored.interaction_type, InteractionType::Bookmark);
    }

    #[tokio::test]
    async fn test_delete_rating_refreshes_book() {
        let interactions = Arc::new(MockInteractionRepository::default());
        let books = Arc::new(MockBookRepository::default());
        let book = Book::new("Piranesi".to_string(), "Susanna Clarke".to_string());
        books.add(book.clone());
        let owner = UserId::new();
        let interaction = Interaction::new(owner, book.id, InteractionType::Rate, Some(5.0), None);
        interactions.add(interaction.clone());

        let service = InteractionServiceComponent::new(
            interactions.clone(),
            books,
            Arc::new(expect_rating_refresh(book.id, 1)),
            CacheHandle::Disabled,
        );

        service.delete_interaction(interaction.id, owner).await.unwrap();
        assert!(interactions.get(interaction.id).is_none());

        let err = service.delete_interaction(interaction.id, owner).await.unwrap_err();
        assert!(matches!(err, FolioError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_user_book_interaction_cache_key() {
        let f = fixture(MockBookService::new());
        let user_id = UserId::new();
        f.interactions.add(Interaction::new(user_id, f.book.id, InteractionType::Like, None, None));

        let found = f
            .service
            .get_user_book_interaction(user_id, f.book.id, Some(InteractionType::Like))
            .await
            .unwrap();
        assert!(found.is_some());

        let none_type = f
            .service
            .get_user_book_interaction(user_id, f.book.id, None)
            .await
            .unwrap();
        assert!(none_type.is_some());

        assert!(f
            .backend
            .contains(&format!("interaction_service:get_user_book_interaction:{}:{}:like", user_id, f.book.id)));
        assert!(f
            .backend
            .contains(&format!("interaction_service:get_user_book_interaction:{}:{}:None", user_id, f.book.id)));
    }

    #[tokio::test]
    async fn test_shelves_cached_for_an_hour() {
        let f = fixture(MockBookService::new());
        let user_id = UserId::new();
        f.interactions.add(Interaction::new(user_id, f.book.id, InteractionType::Bookmark, None, None));

        let shelf = f.service.get_user_bookmarked_books(user_id).await.unwrap();
        f.service.get_user_bookmarked_books(user_id).await.unwrap();

        assert_eq!(shelf.len(), 1);
        assert_eq!(f.interactions.calls.count("bookmarked_books"), 1);
        let key = format!("interaction_service:get_user_bookmarked_books:{}", user_id);
        assert!(f.backend.ttl(&key).is_some_and(|ttl| ttl > Duration::from_secs(1800)));
    }

    #[tokio::test]
    async fn test_users_who_rated_book() {
        let f = fixture(MockBookService::new());
        let fan = User::new("fan".to_string(), Email::new_unchecked("fan@example.com"), String::new(), None, None);
        let critic = User::new("critic".to_string(), Email::new_unchecked("critic@example.com"), String::new(), None, None);
        f.interactions.users.lock().unwrap().insert(fan.id, fan.clone());
        f.interactions.users.lock().unwrap().insert(critic.id, critic.clone());
        f.interactions.add(Interaction::new(fan.id, f.book.id, InteractionType::Rate, Some(5.0), None));
        f.interactions.add(Interaction::new(critic.id, f.book.id, InteractionType::Rate, Some(3.5), None));

        let raters = f.service.get_users_who_rated_book(f.book.id, 3.75).await.unwrap();
        assert_eq!(raters.len(), 1);
        assert_eq!(raters[0].username, "fan");
    }
}
