//! User-related DTOs.

use chrono::{DateTime, Utc};
use folio_core::{CategoryPreferences, CustomPreferences, User, UserId, UserPreference};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Request to create a new user.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateUserRequest {
    #[validate(length(min = 3, max = 50, message = "Username must be 3-50 characters"))]
    pub username: String,

    #[validate(email(message = "Invalid email address"))]
    pub email: String,

    /// Never serialized, so it stays out of cache keys.
    #[serde(skip_serializing)]
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,

    #[validate(length(max = 100))]
    pub full_name: Option<String>,

    #[validate(length(max = 1000))]
    pub bio: Option<String>,
}

/// Request to update a user profile. `None` leaves a field unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct UpdateUserRequest {
    #[validate(length(min = 3, max = 50, message = "Username must be 3-50 characters"))]
    pub username: Option<String>,

    #[validate(email(message = "Invalid email address"))]
    pub email: Option<String>,

    #[validate(length(max = 100))]
    pub full_name: Option<String>,

    #[validate(length(max = 1000))]
    pub bio: Option<String>,
}

/// Request to change a password.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdatePasswordRequest {
    pub current_password: String,

    #[validate(length(min = 8, message = "New password must be at least 8 characters"))]
    pub new_password: String,

    pub confirm_password: String,
}

/// User response DTO.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserResponse {
    pub id: UserId,
    pub username: String,
    pub email: String,
    pub full_name: Option<String>,
    pub bio: Option<String>,
    pub is_active: bool,
    pub is_admin: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email.to_string(),
            full_name: user.full_name,
            bio: user.bio,
            is_active: user.is_active,
            is_admin: user.is_admin,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

/// Partial update of a user's reading preferences.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct UpdatePreferencesRequest {
    /// Replaces the category weights when present.
    pub category_preferences: Option<CategoryPreferences>,

    #[validate(custom(function = "folio_core::rules::valid_language"))]
    pub preferred_language: Option<String>,

    #[validate(range(min = 1))]
    pub min_page_count: Option<i32>,

    #[validate(range(min = 1))]
    pub max_page_count: Option<i32>,

    pub min_publication_year: Option<i32>,

    pub max_publication_year: Option<i32>,

    #[validate(range(min = 0.0, max = 5.0))]
    pub min_rating: Option<f64>,

    /// Merged into the stored custom preferences.
    pub custom_preferences: Option<CustomPreferences>,
}

/// User preference response DTO.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserPreferenceResponse {
    pub user_id: UserId,
    pub category_preferences: CategoryPreferences,
    pub preferred_language: Option<String>,
    pub min_page_count: Option<i32>,
    pub max_page_count: Option<i32>,
    pub min_publication_year: Option<i32>,
    pub max_publication_year: Option<i32>,
    pub min_rating: Option<f64>,
    pub custom_preferences: CustomPreferences,
    pub updated_at: DateTime<Utc>,
}

impl From<UserPreference> for UserPreferenceResponse {
    fn from(preference: UserPreference) -> Self {
        Self {
            user_id: preference.user_id,
            category_preferences: preference.category_preferences,
            preferred_language: preference.preferred_language,
            min_page_count: preference.min_page_count,
            max_page_count: preference.max_page_count,
            min_publication_year: preference.min_publication_year,
            max_publication_year: preference.max_publication_year,
            min_rating: preference.min_rating,
            custom_preferences: preference.custom_preferences,
            updated_at: preference.updated_at,
        }
    }
}
