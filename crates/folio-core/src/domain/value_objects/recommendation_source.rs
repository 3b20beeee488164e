//! Where a stored recommendation came from.

use super::UnknownVariant;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Origin of a stored book recommendation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum RecommendationSource {
    Collaborative,
    ContentBased,
    Rag,
    Hybrid,
    Popular,
    Similar,
    #[default]
    Personalized,
}

impl RecommendationSource {
    /// Storage and wire representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Collaborative => "collaborative",
            Self::ContentBased => "content_based",
            Self::Rag => "rag",
            Self::Hybrid => "hybrid",
            Self::Popular => "popular",
            Self::Similar => "similar",
            Self::Personalized => "personalized",
        }
    }

    /// All sources.
    #[must_use]
    pub const fn all() -> [Self; 7] {
        [
            Self::Collaborative,
            Self::ContentBased,
            Self::Rag,
            Self::Hybrid,
            Self::Popular,
            Self::Similar,
            Self::Personalized,
        ]
    }
}

impl fmt::Display for RecommendationSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RecommendationSource {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::all()
            .into_iter()
            .find(|source| source.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| UnknownVariant {
                kind: "recommendation source",
                value: s.to_string(),
            })
    }
}
