//! Book entity.

use crate::BookId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A catalog entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Book {
    pub id: BookId,
    pub title: String,
    pub author: String,
    /// ISBN-10 or ISBN-13, unique when present.
    pub isbn: Option<String>,
    pub description: Option<String>,
    pub publication_year: Option<i32>,
    pub publisher: Option<String>,
    pub language: String,
    pub page_count: Option<i32>,
    /// Mean of all 1-5 ratings, 0 when unrated.
    pub average_rating: f64,
    pub ratings_count: i32,
    pub cover_image_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Book {
    /// Default language for new books.
    pub const DEFAULT_LANGUAGE: &'static str = "en";

    /// Creates an unrated book with only the required fields set.
    #[must_use]
    pub fn new(title: String, author: String) -> Self {
        let now = Utc::now();
        Self {
            id: BookId::new(),
            title,
            author,
            isbn: None,
            description: None,
            publication_year: None,
            publisher: None,
            language: Self::DEFAULT_LANGUAGE.to_string(),
            page_count: None,
            average_rating: 0.0,
            ratings_count: 0,
            cover_image_url: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Recomputes the rating summary from the given 1-5 ratings.
    pub fn apply_ratings(&mut self, ratings: &[f64]) {
        if ratings.is_empty() {
            self.average_rating = 0.0;
            self.ratings_count = 0;
        } else {
            let total: f64 = ratings.iter().sum();
            #[allow(clippy::cast_precision_loss)]
            let average = total / ratings.len() as f64;
            self.average_rating = average;
            self.ratings_count = i32::try_from(ratings.len()).unwrap_or(i32::MAX);
        }
        self.updated_at = Utc::now();
    }

    /// Whether anyone has rated this book.
    #[must_use]
    pub const fn is_rated(&self) -> bool {
        self.ratings_count > 0
    }
}
