//! Interaction service trait definition.

use crate::dto::{
    BookResponse, CreateInteractionRequest, InteractionResponse, UpdateInteractionRequest,
    UserResponse,
};
use async_trait::async_trait;
use folio_core::{BookId, FolioResult, InteractionId, InteractionType, Interface, UserId};

/// Page size for interaction listings when the caller has no preference.
pub const DEFAULT_INTERACTION_LIMIT: u32 = 50;

/// Views, likes, ratings, reviews and bookmarks.
#[async_trait]
pub trait InteractionService: Interface + Send + Sync {
    /// A user's interactions, newest first.
    async fn get_user_interactions(&self, user_id: UserId, limit: u32) -> FolioResult<Vec<InteractionResponse>>;

    /// A book's interactions, newest first.
    async fn get_book_interactions(&self, book_id: BookId, limit: u32) -> FolioResult<Vec<InteractionResponse>>;

    /// The user's newest interaction with a book, optionally of one kind.
    async fn get_user_book_interaction(
        &self,
        user_id: UserId,
        book_id: BookId,
        interaction_type: Option<InteractionType>,
    ) -> FolioResult<Option<InteractionResponse>>;

    /// Records an interaction. Ratings refresh the book's rating summary.
    async fn create_interaction(
        &self,
        user_id: UserId,
        request: CreateInteractionRequest,
    ) -> FolioResult<InteractionResponse>;

    /// Changes an interaction owned by `user_id`.
    async fn update_interaction(
        &self,
        id: InteractionId,
        user_id: UserId,
        request: UpdateInteractionRequest,
    ) -> FolioResult<InteractionResponse>;

    /// Removes an interaction owned by `user_id`.
    async fn delete_interaction(&self, id: InteractionId, user_id: UserId) -> FolioResult<()>;

    async fn get_user_rated_books(&self, user_id: UserId) -> FolioResult<Vec<BookResponse>>;

    async fn get_user_bookmarked_books(&self, user_id: UserId) -> FolioResult<Vec<BookResponse>>;

    /// Users who rated the book at least `min_rating`.
    async fn get_users_who_rated_book(&self, book_id: BookId, min_rating: f64) -> FolioResult<Vec<UserResponse>>;
}
