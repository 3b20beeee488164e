//! Book and category DTOs.

use super::category_dto::CategoryResponse;
use chrono::{DateTime, Utc};
use folio_core::{Book, BookId, Category, CategoryId};
use serde::{Deserialize, Serialize};
use validator::Validate;

fn default_language() -> String {
    Book::DEFAULT_LANGUAGE.to_string()
}

/// Request to add a book to the catalog.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateBookRequest {
    #[validate(length(min = 1, max = 255), custom(function = "folio_core::rules::not_blank"))]
    pub title: String,

    #[validate(length(min = 1, max = 255), custom(function = "folio_core::rules::not_blank"))]
    pub author: String,

    #[validate(custom(function = "folio_core::rules::valid_isbn"))]
    pub isbn: Option<String>,

    pub description: Option<String>,

    #[validate(range(min = 1000, max = 2100))]
    pub publication_year: Option<i32>,

    #[validate(length(max = 255))]
    pub publisher: Option<String>,

    #[serde(default = "default_language")]
    #[validate(custom(function = "folio_core::rules::valid_language"))]
    pub language: String,

    #[validate(range(min = 1))]
    pub page_count: Option<i32>,

    #[validate(url(message = "Invalid cover image URL"))]
    pub cover_image_url: Option<String>,

    #[serde(default)]
    pub category_ids: Vec<CategoryId>,
}

impl CreateBookRequest {
    /// Builds the unrated book entity described by this request.
    #[must_use]
    pub fn into_book(self) -> (Book, Vec<CategoryId>) {
        let mut book = Book::new(self.title, self.author);
        book.isbn = self.isbn;
        book.description = self.description;
        book.publication_year = self.publication_year;
        book.publisher = self.publisher;
        book.language = self.language;
        book.page_count = self.page_count;
        book.cover_image_url = self.cover_image_url;
        (book, self.category_ids)
    }
}

/// Partial update of a book. `None` leaves a field unchanged; `category_ids`
/// replaces every link when present.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct UpdateBookRequest {
    #[validate(length(min = 1, max = 255))]
    pub title: Option<String>,

    #[validate(length(min = 1, max = 255))]
    pub author: Option<String>,

    #[validate(custom(function = "folio_core::rules::valid_isbn"))]
    pub isbn: Option<String>,

    pub description: Option<String>,

    #[validate(range(min = 1000, max = 2100))]
    pub publication_year: Option<i32>,

    #[validate(length(max = 255))]
    pub publisher: Option<String>,

    #[validate(custom(function = "folio_core::rules::valid_language"))]
    pub language: Option<String>,

    #[validate(range(min = 1))]
    pub page_count: Option<i32>,

    #[validate(url(message = "Invalid cover image URL"))]
    pub cover_image_url: Option<String>,

    pub category_ids: Option<Vec<CategoryId>>,
}

impl UpdateBookRequest {
    /// Applies the set fields to `book`.
    pub fn apply_to(&self, book: &mut Book) {
        if let Some(title) = &self.title {
            book.title.clone_from(title);
        }
        if let Some(author) = &self.author {
            book.author.clone_from(author);
        }
        if self.isbn.is_some() {
            book.isbn.clone_from(&self.isbn);
        }
        if self.description.is_some() {
            book.description.clone_from(&self.description);
        }
        if self.publication_year.is_some() {
            book.publication_year = self.publication_year;
        }
        if self.publisher.is_some() {
            book.publisher.clone_from(&self.publisher);
        }
        if let Some(language) = &self.language {
            book.language.clone_from(language);
        }
        if self.page_count.is_some() {
            book.page_count = self.page_count;
        }
        if self.cover_image_url.is_some() {
            book.cover_image_url.clone_from(&self.cover_image_url);
        }
        book.updated_at = Utc::now();
    }
}

/// Book response DTO.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookResponse {
    pub id: BookId,
    pub title: String,
    pub author: String,
    pub isbn: Option<String>,
    pub description: Option<String>,
    pub publication_year: Option<i32>,
    pub publisher: Option<String>,
    pub language: String,
    pub page_count: Option<i32>,
    pub average_rating: f64,
    pub ratings_count: i32,
    pub cover_image_url: Option<String>,
    /// Empty unless the operation loads category links.
    #[serde(default)]
    pub categories: Vec<CategoryResponse>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl BookResponse {
    /// Builds a response carrying the book's categories.
    #[must_use]
    pub fn with_categories(book: Book, categories: Vec<Category>) -> Self {
        let mut response = Self::from(book);
        response.categories = categories.into_iter().map(CategoryResponse::from).collect();
        response
    }
}

impl From<Book> for BookResponse {
    fn from(book: Book) -> Self {
        Self {
            id: book.id,
            title: book.title,
            author: book.author,
            isbn: book.isbn,
            description: book.description,
            publication_year: book.publication_year,
            publisher: book.publisher,
            language: book.language,
            page_count: book.page_count,
            average_rating: book.average_rating,
            ratings_count: book.ratings_count,
            cover_image_url: book.cover_image_url,
            categories: Vec::new(),
            created_at: book.created_at,
            updated_at: book.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_request() -> CreateBookRequest {
        serde_json::from_value(serde_json::json!({
            "title": "The Left Hand of Darkness",
            "author": "Ursula K. Le Guin",
            "isbn": "978-0-441-47812-5",
            "publication_year": 1969
        }))
        .unwrap()
    }

    #[test]
    fn test_create_request_defaults_language() {
        let request = create_request();
        assert_eq!(request.language, "en");
        assert!(request.category_ids.is_empty());
        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_create_request_rejects_bad_isbn_and_blank_title() {
        let request = CreateBookRequest {
            title: "   ".to_string(),
            isbn: Some("12-34".to_string()),
            ..create_request()
        };
        let errors = request.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("title"));
        assert!(errors.field_errors().contains_key("isbn"));
    }

    #[test]
    fn test_into_book_starts_unrated() {
        let (book, categories) = create_request().into_book();
        assert_eq!(book.ratings_count, 0);
        assert_eq!(book.publication_year, Some(1969));
        assert!(categories.is_empty());
    }

    #[test]
    fn test_update_applies_only_set_fields() {
        let (mut book, _) = create_request().into_book();
        let update = UpdateBookRequest {
            page_count: Some(304),
            ..Default::default()
        };
        update.apply_to(&mut book);

        assert_eq!(book.page_count, Some(304));
        assert_eq!(book.title, "The Left Hand of Darkness");
        assert_eq!(book.isbn.as_deref(), Some("978-0-441-47812-5"));
    }

    #[test]
    fn test_response_with_categories() {
        let (book, _) = create_request().into_book();
        let response = BookResponse::with_categories(
            book,
            vec![Category::new("Science Fiction".to_string(), None)],
        );
        assert_eq!(response.categories.len(), 1);
        assert_eq!(response.categories[0].name, "Science Fiction");
    }
}
