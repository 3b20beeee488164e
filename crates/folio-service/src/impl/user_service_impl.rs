//! User service implementation.

use crate::cache::{Call, CacheHandle, CacheSettings, Invalidate, ReadThrough};
use crate::dto::{
    CreateUserRequest, UpdatePasswordRequest, UpdatePreferencesRequest, UpdateUserRequest,
    UserPreferenceResponse, UserResponse,
};
use crate::user_service::UserService;
use async_trait::async_trait;
use chrono::Utc;
use folio_core::{
    Email, FolioError, FolioResult, Page, PageRequest, User, UserId, UserPreference, ValidateExt,
};
use folio_repository::{PreferenceRepository, UserRepository};
use folio_security::PasswordHasherInterface;
use shaku::Component;
use std::sync::Arc;
use tracing::{debug, info};

const PREFIX: &str = "user_service";

/// TTL of user lookups by username or email.
const LOOKUP_TTL_SECS: u64 = 300;

/// TTL of preference reads.
const PREFERENCES_TTL_SECS: u64 = 600;

/// Shaku component for [`UserService`].
#[derive(Component)]
#[shaku(interface = UserService)]
pub struct UserServiceComponent {
    #[shaku(inject)]
    user_repository: Arc<dyn UserRepository>,
    #[shaku(inject)]
    preference_repository: Arc<dyn PreferenceRepository>,
    #[shaku(inject)]
    password_hasher: Arc<dyn PasswordHasherInterface>,
    cache: CacheHandle,
    settings: CacheSettings,
}

impl UserServiceComponent {
    /// Creates a user service outside the DI container.
    pub fn new(
        user_repository: Arc<dyn UserRepository>,
        preference_repository: Arc<dyn PreferenceRepository>,
        password_hasher: Arc<dyn PasswordHasherInterface>,
        cache: CacheHandle,
        settings: CacheSettings,
    ) -> Self {
        Self {
            user_repository,
            preference_repository,
            password_hasher,
            cache,
            settings,
        }
    }

    async fn find_user(&self, id: UserId) -> FolioResult<User> {
        self.user_repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| FolioError::not_found("User", id))
    }

    async fn insert_user(&self, request: CreateUserRequest) -> FolioResult<UserResponse> {
        debug!("Creating user: {}", request.username);

        request.validate_request()?;

        if self.user_repository.exists_by_username(&request.username).await? {
            return Err(FolioError::Conflict(format!(
                "Username '{}' already exists",
                request.username
            )));
        }

        if self.user_repository.exists_by_email(&request.email).await? {
            return Err(FolioError::Conflict(format!(
                "Email '{}' already exists",
                request.email
            )));
        }

        let email = Email::new(&request.email).map_err(|e| FolioError::Validation(e.to_string()))?;
        let password_hash = self.password_hasher.hash(&request.password)?;

        let user = User::new(request.username, email, password_hash, request.full_name, request.bio);
        let saved_user = self.user_repository.save(&user).await?;

        self.preference_repository
            .save(&UserPreference::empty(saved_user.id))
            .await?;

        info!("User created: {}", saved_user.id);
        Ok(UserResponse::from(saved_user))
    }

    async fn modify_user(&self, id: UserId, request: UpdateUserRequest) -> FolioResult<UserResponse> {
        debug!("Updating user: {}", id);

        request.validate_request()?;

        let mut user = self.find_user(id).await?;

        if let Some(username) = request.username {
            if username != user.username {
                if self.user_repository.exists_by_username(&username).await? {
                    return Err(FolioError::Conflict(format!(
                        "Username '{}' already exists",
                        username
                    )));
                }
                user.username = username;
            }
        }

        if let Some(email) = request.email {
            let email = Email::new(email).map_err(|e| FolioError::Validation(e.to_string()))?;
            if email != user.email {
                if self.user_repository.exists_by_email(email.as_str()).await? {
                    return Err(FolioError::Conflict(format!("Email '{}' already exists", email)));
                }
                user.email = email;
            }
        }

        if request.full_name.is_some() {
            user.full_name = request.full_name;
        }
        if request.bio.is_some() {
            user.bio = request.bio;
        }
        user.updated_at = Utc::now();

        let updated_user = self.user_repository.update(&user).await?;

        info!("User updated: {}", id);
        Ok(UserResponse::from(updated_user))
    }

    async fn set_active(&self, id: UserId, active: bool) -> FolioResult<UserResponse> {
        let mut user = self.find_user(id).await?;
        if active {
            user.reactivate();
        } else {
            user.deactivate();
        }

        let updated_user = self.user_repository.update(&user).await?;

        info!(user_id = %id, active, "User status changed");
        Ok(UserResponse::from(updated_user))
    }

    async fn store_preferences(
        &self,
        user_id: UserId,
        request: UpdatePreferencesRequest,
    ) -> FolioResult<UserPreferenceResponse> {
        debug!("Updating preferences for user: {}", user_id);

        request.validate_request()?;
        self.find_user(user_id).await?;

        let existing = self.preference_repository.find_by_user(user_id).await?;
        let is_new = existing.is_none();
        let mut preference = existing.unwrap_or_else(|| UserPreference::empty(user_id));

        apply_preferences(&mut preference, request)?;

        let stored = if is_new {
            self.preference_repository.save(&preference).await?
        } else {
            self.preference_repository.update(&preference).await?
        };

        Ok(UserPreferenceResponse::from(stored))
    }
}

fn apply_preferences(preference: &mut UserPreference, request: UpdatePreferencesRequest) -> FolioResult<()> {
    if let Some(weights) = request.category_preferences {
        preference.category_preferences = weights;
    }
    if request.preferred_language.is_some() {
        preference.preferred_language = request.preferred_language;
    }
    if request.min_page_count.is_some() {
        preference.min_page_count = request.min_page_count;
    }
    if request.max_page_count.is_some() {
        preference.max_page_count = request.max_page_count;
    }
    if request.min_publication_year.is_some() {
        preference.min_publication_year = request.min_publication_year;
    }
    if request.max_publication_year.is_some() {
        preference.max_publication_year = request.max_publication_year;
    }
    if request.min_rating.is_some() {
        preference.min_rating = request.min_rating;
    }
    if let Some(custom) = request.custom_preferences {
        preference.custom_preferences.merge(custom);
    }

    if let (Some(min), Some(max)) = (preference.min_page_count, preference.max_page_count) {
        if min > max {
            return Err(FolioError::validation("min_page_count must not exceed max_page_count"));
        }
    }
    if let (Some(min), Some(max)) = (preference.min_publication_year, preference.max_publication_year) {
        if min > max {
            return Err(FolioError::validation(
                "min_publication_year must not exceed max_publication_year",
            ));
        }
    }

    preference.updated_at = Utc::now();
    Ok(())
}

#[async_trait]
impl UserService for UserServiceComponent {
    async fn get_user(&self, id: UserId) -> FolioResult<Option<UserResponse>> {
        debug!("Getting user: {}", id);
        Ok(self.user_repository.find_by_id(id).await?.map(UserResponse::from))
    }

    async fn list_users(&self, page: PageRequest) -> FolioResult<Page<UserResponse>> {
        debug!("Listing users, page: {}, size: {}", page.page, page.size);

        ReadThrough::new(PREFIX, self.settings.default_ttl_secs)
            .run(&self.cache, Call::new("list_users").arg(page), || async move {
                self.user_repository.find_all(page).await.map(|users| users.map(UserResponse::from))
            })
            .await
    }

    async fn get_by_username(&self, username: &str) -> FolioResult<Option<UserResponse>> {
        ReadThrough::new(PREFIX, LOOKUP_TTL_SECS)
            .run(&self.cache, Call::new("get_by_username").arg(username), || async move {
                self.user_repository
                    .find_by_username(username)
                    .await
                    .map(|user| user.map(UserResponse::from))
            })
            .await
    }

    async fn get_by_email(&self, email: &str) -> FolioResult<Option<UserResponse>> {
        ReadThrough::new(PREFIX, LOOKUP_TTL_SECS)
            .run(&self.cache, Call::new("get_by_email").arg(email), || async move {
                self.user_repository
                    .find_by_email(email)
                    .await
                    .map(|user| user.map(UserResponse::from))
            })
            .await
    }

    async fn create_user(&self, request: CreateUserRequest) -> FolioResult<UserResponse> {
        let call = Call::new("create_user").json(&request);
        Invalidate::new(PREFIX)
            .run(&self.cache, call, || self.insert_user(request))
            .await
    }

    async fn update_user(&self, id: UserId, request: UpdateUserRequest) -> FolioResult<UserResponse> {
        let call = Call::new("update_user").arg(id).json(&request);
        Invalidate::new(PREFIX)
            .run(&self.cache, call, || self.modify_user(id, request))
            .await
    }

    async fn update_password(&self, id: UserId, request: UpdatePasswordRequest) -> FolioResult<()> {
        debug!("Changing password for user: {}", id);

        request.validate_request()?;

        if request.new_password != request.confirm_password {
            return Err(FolioError::validation("Passwords do not match"));
        }

        let mut user = self.find_user(id).await?;

        if !self.password_hasher.verify(&request.current_password, &user.password_hash)? {
            return Err(FolioError::InvalidCredentials);
        }

        let password_hash = self.password_hasher.hash(&request.new_password)?;
        user.update_password(password_hash);
        self.user_repository.update(&user).await?;

        info!("Password changed for user: {}", id);
        Ok(())
    }

    async fn deactivate_user(&self, id: UserId) -> FolioResult<UserResponse> {
        Invalidate::new(PREFIX)
            .run(&self.cache, Call::new("deactivate_user").arg(id), || self.set_active(id, false))
            .await
    }

    async fn reactivate_user(&self, id: UserId) -> FolioResult<UserResponse> {
        Invalidate::new(PREFIX)
            .run(&self.cache, Call::new("reactivate_user").arg(id), || self.set_active(id, true))
            .await
    }

    async fn delete_user(&self, id: UserId) -> FolioResult<()> {
        debug!("Deleting user: {}", id);

        if !self.user_repository.delete(id).await? {
            return Err(FolioError::not_found("User", id));
        }

        info!("User deleted: {}", id);
        Ok(())
    }

    async fn get_user_preferences(&self, user_id: UserId) -> FolioResult<Option<UserPreferenceResponse>> {
        ReadThrough::new(PREFIX, PREFERENCES_TTL_SECS)
            .run(&self.cache, Call::new("get_user_preferences").arg(user_id), || async move {
                self.preference_repository
                    .find_by_user(user_id)
                    .await
                    .map(|preference| preference.map(UserPreferenceResponse::from))
            })
            .await
    }

    async fn update_user_preferences(
        &self,
        user_id: UserId,
        request: UpdatePreferencesRequest,
    ) -> FolioResult<UserPreferenceResponse> {
        let call = Call::new("update_user_preferences").arg(user_id).json(&request);
        Invalidate::new(PREFIX)
            .run(&self.cache, call, || self.store_preferences(user_id, request))
            .await
    }
}

impl std::fmt::Debug for UserServiceComponent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UserServiceComponent")
            .field("cache", &self.cache)
            .finish_non_exhaustive()
    }
}
