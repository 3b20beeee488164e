//! Value objects.

mod email;
mod interaction_type;
mod recommendation_source;

pub use email::{Email, EmailError};
pub use interaction_type::InteractionType;
pub use recommendation_source::RecommendationSource;

use thiserror::Error;

/// Error returned when parsing one of the closed vocabularies from text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown {kind}: {value}")]
pub struct UnknownVariant {
    /// The vocabulary being parsed.
    pub kind: &'static str,
    /// The rejected input.
    pub value: String,
}
