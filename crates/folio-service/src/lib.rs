//! # Folio Service
//!
//! Business services for the Folio backend and the read-through caching
//! layer they are built on. Every service trait has a shaku component in
//! [`r#impl`] that routes its reads through [`cache::ReadThrough`] and its
//! writes through [`cache::Invalidate`].

pub mod book_service;
pub mod cache;
pub mod category_service;
pub mod dto;
pub mod interaction_service;
pub mod r#impl;
pub mod recommendation_service;
pub mod user_service;

pub use book_service::*;
pub use cache::{CacheBackend, CacheError, CacheHandle, CacheSettings, InMemoryCacheBackend, RedisCacheBackend};
pub use category_service::*;
pub use dto::*;
pub use interaction_service::*;
pub use r#impl::*;
pub use recommendation_service::*;
pub use user_service::*;
