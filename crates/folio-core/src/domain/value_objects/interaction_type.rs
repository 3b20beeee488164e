//! Kinds of user-book interaction.

use super::UnknownVariant;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The kind of interaction a user had with a book.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InteractionType {
    /// The user opened the book's page.
    View,
    /// The user liked the book.
    Like,
    /// The user disliked the book.
    Dislike,
    /// The user saved the book for later.
    Bookmark,
    /// The user gave the book a 1-5 rating.
    Rate,
    /// The user wrote a review.
    Review,
    /// The user recommended the book to someone.
    Recommend,
}

impl InteractionType {
    /// Storage and wire representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::View => "view",
            Self::Like => "like",
            Self::Dislike => "dislike",
            Self::Bookmark => "bookmark",
            Self::Rate => "rate",
            Self::Review => "review",
            Self::Recommend => "recommend",
        }
    }

    /// Whether interactions of this kind must carry a rating.
    #[must_use]
    pub const fn requires_rating(&self) -> bool {
        matches!(self, Self::Rate)
    }

    /// Whether interactions of this kind must carry review text.
    #[must_use]
    pub const fn requires_review_text(&self) -> bool {
        matches!(self, Self::Review)
    }

    /// All interaction kinds.
    #[must_use]
    pub const fn all() -> [Self; 7] {
        [
            Self::View,
            Self::Like,
            Self::Dislike,
            Self::Bookmark,
            Self::Rate,
            Self::Review,
            Self::Recommend,
        ]
    }
}

impl fmt::Display for InteractionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InteractionType {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::all()
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| UnknownVariant {
                kind: "interaction type",
                value: s.to_string(),
            })
    }
}
