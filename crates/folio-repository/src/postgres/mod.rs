//! SQLx implementations of the repository traits for PostgreSQL.

mod book_repository;
mod category_repository;
mod interaction_repository;
mod preference_repository;
mod recommendation_repository;
mod user_repository;

pub use book_repository::PgBookRepository;
pub use category_repository::PgCategoryRepository;
pub use interaction_repository::PgInteractionRepository;
pub use preference_repository::PgPreferenceRepository;
pub use recommendation_repository::PgRecommendationRepository;
pub use user_repository::PgUserRepository;
