//! Service implementations.
//!
//! Each service trait from the parent module has one shaku component here.
//! Components hold their repositories as injected interfaces plus the
//! [`CacheHandle`](crate::cache::CacheHandle) their reads and writes go
//! through.

pub mod book_service_impl;
pub mod category_service_impl;
pub mod interaction_service_impl;
pub mod recommendation_service_impl;
pub mod user_service_impl;

#[cfg(test)]
pub(crate) mod testing;

pub use book_service_impl::{BookServiceComponent, BookServiceComponentParameters};
pub use category_service_impl::{CategoryServiceComponent, CategoryServiceComponentParameters};
pub use interaction_service_impl::{InteractionServiceComponent, InteractionServiceComponentParameters};
pub use recommendation_service_impl::{RecommendationServiceComponent, RecommendationServiceComponentParameters};
pub use user_service_impl::{UserServiceComponent, UserServiceComponentParameters};
