//! Request and response types of the service layer.
//!
//! Responses are what the read-through cache stores, so each one round-trips
//! through JSON.

mod book_dto;
mod category_dto;
mod interaction_dto;
mod recommendation_dto;
mod user_dto;

pub use book_dto::*;
pub use category_dto::*;
pub use interaction_dto::*;
pub use recommendation_dto::*;
pub use user_dto::*;
