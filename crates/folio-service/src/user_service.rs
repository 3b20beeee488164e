//! User service trait definition.

use crate::dto::{
    CreateUserRequest, UpdatePasswordRequest, UpdatePreferencesRequest, UpdateUserRequest,
    UserPreferenceResponse, UserResponse,
};
use async_trait::async_trait;
use folio_core::{FolioResult, Interface, Page, PageRequest, UserId};

/// User accounts and reading preferences.
#[async_trait]
pub trait UserService: Interface + Send + Sync {
    /// Gets a user by ID.
    async fn get_user(&self, id: UserId) -> FolioResult<Option<UserResponse>>;

    /// Lists users ordered by username.
    async fn list_users(&self, page: PageRequest) -> FolioResult<Page<UserResponse>>;

    /// Gets a user by username.
    async fn get_by_username(&self, username: &str) -> FolioResult<Option<UserResponse>>;

    /// Gets a user by email, ignoring case.
    async fn get_by_email(&self, email: &str) -> FolioResult<Option<UserResponse>>;

    /// Registers a user with empty preferences.
    async fn create_user(&self, request: CreateUserRequest) -> FolioResult<UserResponse>;

    /// Updates a user's profile.
    async fn update_user(&self, id: UserId, request: UpdateUserRequest) -> FolioResult<UserResponse>;

    /// Changes a user's password after verifying the current one.
    async fn update_password(&self, id: UserId, request: UpdatePasswordRequest) -> FolioResult<()>;

    async fn deactivate_user(&self, id: UserId) -> FolioResult<UserResponse>;

    async fn reactivate_user(&self, id: UserId) -> FolioResult<UserResponse>;

    /// Deletes a user.
    async fn delete_user(&self, id: UserId) -> FolioResult<()>;

    /// Gets a user's reading preferences.
    async fn get_user_preferences(&self, user_id: UserId) -> FolioResult<Option<UserPreferenceResponse>>;

    /// Updates a user's reading preferences, creating the record when missing.
    async fn update_user_preferences(
        &self,
        user_id: UserId,
        request: UpdatePreferencesRequest,
    ) -> FolioResult<UserPreferenceResponse>;
}
