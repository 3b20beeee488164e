//! Domain entities.

mod book;
mod category;
mod interaction;
mod preference;
mod recommendation;
mod user;

pub use book::Book;
pub use category::Category;
pub use interaction::Interaction;
pub use preference::{CategoryPreferences, CustomPreferences, UserPreference};
pub use recommendation::{BookRecommendation, RecommendationMetadata};
pub use user::User;
