//! Repository traits.
//!
//! Each trait is a shaku [`Interface`] so implementations can be wired by the
//! server's module and swapped for in-memory doubles in service tests.

use async_trait::async_trait;
use folio_core::{
    Book, BookId, BookRecommendation, Category, CategoryId, FolioResult, Interaction,
    InteractionId, InteractionType, Interface, Page, PageRequest, RecommendationId,
    RecommendationSource, User, UserId, UserPreference,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Catalog search filters. Every field is optional; set fields are ANDed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BookSearchCriteria {
    /// Case-insensitive substring of the title.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Case-insensitive substring of the author.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_id: Option<CategoryId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_publication_year: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_publication_year: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_page_count: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_page_count: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_rating: Option<f64>,
}

impl BookSearchCriteria {
    /// Whether a book satisfies every set filter other than the category.
    #[must_use]
    pub fn matches(&self, book: &Book) -> bool {
        fn contains(haystack: &str, needle: Option<&String>) -> bool {
            needle.map_or(true, |n| haystack.to_lowercase().contains(&n.to_lowercase()))
        }
        fn at_least<T: PartialOrd>(value: Option<T>, bound: Option<T>) -> bool {
            match (value, bound) {
                (_, None) => true,
                (Some(v), Some(b)) => v >= b,
                (None, Some(_)) => false,
            }
        }
        fn at_most<T: PartialOrd>(value: Option<T>, bound: Option<T>) -> bool {
            match (value, bound) {
                (_, None) => true,
                (Some(v), Some(b)) => v <= b,
                (None, Some(_)) => false,
            }
        }

        contains(&book.title, self.title.as_ref())
            && contains(&book.author, self.author.as_ref())
            && self.language.as_ref().map_or(true, |l| &book.language == l)
            && at_least(book.publication_year, self.min_publication_year)
            && at_most(book.publication_year, self.max_publication_year)
            && at_least(book.page_count, self.min_page_count)
            && at_most(book.page_count, self.max_page_count)
            && at_least(Some(book.average_rating), self.min_rating)
    }
}

/// Filters applied when listing a user's stored recommendations.
#[derive(Debug, Clone, PartialEq)]
pub struct RecommendationFilter {
    pub limit: u32,
    pub include_viewed: bool,
    pub include_dismissed: bool,
    pub min_score: Option<f64>,
    /// Empty means every source.
    pub sources: Vec<RecommendationSource>,
    /// Empty means every category; otherwise the book must be in at least one.
    pub category_ids: Vec<CategoryId>,
}

impl Default for RecommendationFilter {
    fn default() -> Self {
        Self {
            limit: 5,
            include_viewed: false,
            include_dismissed: false,
            min_score: None,
            sources: Vec::new(),
            category_ids: Vec::new(),
        }
    }
}

impl RecommendationFilter {
    /// Whether a recommendation passes every filter except the category one.
    #[must_use]
    pub fn matches(&self, recommendation: &BookRecommendation) -> bool {
        (self.include_viewed || !recommendation.is_viewed)
            && (self.include_dismissed || !recommendation.is_dismissed)
            && self.min_score.map_or(true, |min| recommendation.score >= min)
            && (self.sources.is_empty() || self.sources.contains(&recommendation.source))
    }
}

/// Repository for user accounts.
#[async_trait]
pub trait UserRepository: Interface + Send + Sync {
    async fn find_by_id(&self, id: UserId) -> FolioResult<Option<User>>;

    async fn find_by_username(&self, username: &str) -> FolioResult<Option<User>>;

    /// Case-insensitive.
    async fn find_by_email(&self, email: &str) -> FolioResult<Option<User>>;

    async fn exists_by_username(&self, username: &str) -> FolioResult<bool>;

    async fn exists_by_email(&self, email: &str) -> FolioResult<bool>;

    /// Users ordered by username.
    async fn find_all(&self, page: PageRequest) -> FolioResult<Page<User>>;

    async fn save(&self, user: &User) -> FolioResult<User>;

    async fn update(&self, user: &User) -> FolioResult<User>;

    /// Returns whether a row was removed.
    async fn delete(&self, id: UserId) -> FolioResult<bool>;
}

/// Repository for the book catalog and book/category links.
#[async_trait]
pub trait BookRepository: Interface + Send + Sync {
    async fn find_by_id(&self, id: BookId) -> FolioResult<Option<Book>>;

    async fn exists_by_isbn(&self, isbn: &str) -> FolioResult<bool>;

    /// Books ordered by title.
    async fn find_all(&self, skip: u32, limit: u32) -> FolioResult<Vec<Book>>;

    /// Books matching `criteria`, ordered by title.
    async fn search(
        &self,
        criteria: &BookSearchCriteria,
        skip: u32,
        limit: u32,
    ) -> FolioResult<Vec<Book>>;

    /// Rated books by average rating, then rating count, both descending.
    async fn find_popular(&self, limit: u32) -> FolioResult<Vec<Book>>;

    /// Books linked to a category, ordered by title.
    async fn find_by_category(&self, category_id: CategoryId, limit: u32) -> FolioResult<Vec<Book>>;

    async fn save(&self, book: &Book) -> FolioResult<Book>;

    async fn update(&self, book: &Book) -> FolioResult<Book>;

    async fn delete(&self, id: BookId) -> FolioResult<bool>;

    /// Replaces the category links of a book.
    async fn set_categories(&self, book_id: BookId, category_ids: &[CategoryId]) -> FolioResult<()>;

    /// Categories of each given book, ordered by name. Books without links
    /// are absent from the map.
    async fn categories_for_books(
        &self,
        book_ids: &[BookId],
    ) -> FolioResult<HashMap<BookId, Vec<Category>>>;
}

/// Repository for categories.
#[async_trait]
pub trait CategoryRepository: Interface + Send + Sync {
    async fn find_by_id(&self, id: CategoryId) -> FolioResult<Option<Category>>;

    async fn find_by_name(&self, name: &str) -> FolioResult<Option<Category>>;

    /// Categories ordered by name.
    async fn find_all(&self, skip: u32, limit: u32) -> FolioResult<Vec<Category>>;

    /// The subset of `ids` that exist.
    async fn find_by_ids(&self, ids: &[CategoryId]) -> FolioResult<Vec<Category>>;

    async fn save(&self, category: &Category) -> FolioResult<Category>;

    async fn update(&self, category: &Category) -> FolioResult<Category>;

    async fn delete(&self, id: CategoryId) -> FolioResult<bool>;

    /// Number of books linked to the category.
    async fn count_books(&self, id: CategoryId) -> FolioResult<u64>;

    /// Categories with their book counts, most books first.
    async fn find_popular(&self, limit: u32) -> FolioResult<Vec<(Category, u64)>>;
}

/// Repository for user-book interactions.
#[async_trait]
pub trait InteractionRepository: Interface + Send + Sync {
    async fn find_by_id(&self, id: InteractionId) -> FolioResult<Option<Interaction>>;

    /// Newest first.
    async fn find_by_user(&self, user_id: UserId, limit: u32) -> FolioResult<Vec<Interaction>>;

    /// Newest first.
    async fn find_by_book(&self, book_id: BookId, limit: u32) -> FolioResult<Vec<Interaction>>;

    /// The newest interaction of the user with the book, optionally of one kind.
    async fn find_user_book(
        &self,
        user_id: UserId,
        book_id: BookId,
        interaction_type: Option<InteractionType>,
    ) -> FolioResult<Option<Interaction>>;

    async fn save(&self, interaction: &Interaction) -> FolioResult<Interaction>;

    async fn update(&self, interaction: &Interaction) -> FolioResult<Interaction>;

    async fn delete(&self, id: InteractionId) -> FolioResult<bool>;

    /// Ratings of every `rate` interaction on the book.
    async fn ratings_for_book(&self, book_id: BookId) -> FolioResult<Vec<f64>>;

    /// Distinct books the user rated.
    async fn rated_books(&self, user_id: UserId) -> FolioResult<Vec<Book>>;

    /// Distinct books the user bookmarked.
    async fn bookmarked_books(&self, user_id: UserId) -> FolioResult<Vec<Book>>;

    /// Distinct users who rated the book at least `min_rating`.
    async fn users_who_rated(&self, book_id: BookId, min_rating: f64) -> FolioResult<Vec<User>>;
}

/// Repository for per-user preference records.
#[async_trait]
pub trait PreferenceRepository: Interface + Send + Sync {
    async fn find_by_user(&self, user_id: UserId) -> FolioResult<Option<UserPreference>>;

    async fn save(&self, preference: &UserPreference) -> FolioResult<UserPreference>;

    async fn update(&self, preference: &UserPreference) -> FolioResult<UserPreference>;
}

/// Repository for stored recommendations.
#[async_trait]
pub trait RecommendationRepository: Interface + Send + Sync {
    async fn find_by_id(&self, id: RecommendationId) -> FolioResult<Option<BookRecommendation>>;

    /// Highest score first.
    async fn find_for_user(
        &self,
        user_id: UserId,
        filter: &RecommendationFilter,
    ) -> FolioResult<Vec<BookRecommendation>>;

    async fn save(&self, recommendation: &BookRecommendation) -> FolioResult<BookRecommendation>;

    async fn update(&self, recommendation: &BookRecommendation) -> FolioResult<BookRecommendation>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_core::RecommendationMetadata;

    fn book(title: &str, year: Option<i32>, pages: Option<i32>) -> Book {
        let mut book = Book::new(title.to_string(), "Ursula K. Le Guin".to_string());
        book.publication_year = year;
        book.page_count = pages;
        book
    }

    #[test]
    fn test_empty_criteria_matches_everything() {
        assert!(BookSearchCriteria::default().matches(&book("Any", None, None)));
    }

    #[test]
    fn test_criteria_substring_is_case_insensitive() {
        let criteria = BookSearchCriteria {
            title: Some("EARTH".to_string()),
            author: Some("le guin".to_string()),
            ..Default::default()
        };
        assert!(criteria.matches(&book("A Wizard of Earthsea", None, None)));
        assert!(!criteria.matches(&book("The Dispossessed", None, None)));
    }

    #[test]
    fn test_criteria_ranges_exclude_unknown_values() {
        let criteria = BookSearchCriteria {
            min_publication_year: Some(1960),
            max_page_count: Some(300),
            ..Default::default()
        };
        assert!(criteria.matches(&book("Earthsea", Some(1968), Some(183))));
        assert!(!criteria.matches(&book("Earthsea", None, Some(183))));
        assert!(!criteria.matches(&book("Earthsea", Some(1968), Some(400))));
    }

    #[test]
    fn test_criteria_serializes_only_set_fields() {
        let criteria = BookSearchCriteria {
            language: Some("en".to_string()),
            ..Default::default()
        };
        assert_eq!(serde_json::to_string(&criteria).unwrap(), r#"{"language":"en"}"#);
    }

    #[test]
    fn test_recommendation_filter() {
        let mut recommendation = BookRecommendation::new(
            UserId::new(),
            BookId::new(),
            0.8,
            None,
            RecommendationSource::Popular,
            RecommendationMetadata::default(),
        );
        let filter = RecommendationFilter::default();
        assert!(filter.matches(&recommendation));

        recommendation.mark_viewed();
        assert!(!filter.matches(&recommendation));
        assert!(RecommendationFilter {
            include_viewed: true,
            ..Default::default()
        }
        .matches(&recommendation));

        let strict = RecommendationFilter {
            include_viewed: true,
            min_score: Some(0.9),
            ..Default::default()
        };
        assert!(!strict.matches(&recommendation));

        let by_source = RecommendationFilter {
            include_viewed: true,
            sources: vec![RecommendationSource::Rag],
            ..Default::default()
        };
        assert!(!by_source.matches(&recommendation));
    }
}
