//! Category DTOs.

use chrono::{DateTime, Utc};
use folio_core::{Category, CategoryId};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Request to create a category.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateCategoryRequest {
    #[validate(
        length(min = 1, max = 100, message = "Name must be 1-100 characters"),
        custom(function = "folio_core::rules::not_blank")
    )]
    pub name: String,

    pub description: Option<String>,
}

/// Request to rename or redescribe a category.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct UpdateCategoryRequest {
    #[validate(length(min = 1, max = 100, message = "Name must be 1-100 characters"))]
    pub name: Option<String>,

    pub description: Option<String>,
}

/// Category response DTO.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryResponse {
    pub id: CategoryId,
    pub name: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Category> for CategoryResponse {
    fn from(category: Category) -> Self {
        Self {
            id: category.id,
            name: category.name,
            description: category.description,
            created_at: category.created_at,
            updated_at: category.updated_at,
        }
    }
}

/// A category with the number of books linked to it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryBookCount {
    #[serde(flatten)]
    pub category: CategoryResponse,
    pub book_count: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_request_validation() {
        let ok = CreateCategoryRequest {
            name: "Fantasy".to_string(),
            description: None,
        };
        assert!(ok.validate().is_ok());

        let blank = CreateCategoryRequest {
            name: "  ".to_string(),
            description: None,
        };
        assert!(blank.validate().is_err());
    }

    #[test]
    fn test_book_count_flattens_category() {
        let count = CategoryBookCount {
            category: CategoryResponse::from(Category::new("Poetry".to_string(), None)),
            book_count: 3,
        };
        let json = serde_json::to_value(&count).unwrap();
        assert_eq!(json["name"], "Poetry");
        assert_eq!(json["book_count"], 3);

        let back: CategoryBookCount = serde_json::from_value(json).unwrap();
        assert_eq!(back, count);
    }
}
