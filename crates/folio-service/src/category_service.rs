//! Category service trait definition.

use crate::dto::{CategoryBookCount, CategoryResponse, CreateCategoryRequest, UpdateCategoryRequest};
use async_trait::async_trait;
use folio_core::{CategoryId, FolioResult, Interface};

/// Book categories.
#[async_trait]
pub trait CategoryService: Interface + Send + Sync {
    async fn get_category(&self, id: CategoryId) -> FolioResult<Option<CategoryResponse>>;

    async fn get_by_name(&self, name: &str) -> FolioResult<Option<CategoryResponse>>;

    /// Categories ordered by name.
    async fn get_all_categories(&self, skip: u32, limit: u32) -> FolioResult<Vec<CategoryResponse>>;

    async fn create_category(&self, request: CreateCategoryRequest) -> FolioResult<CategoryResponse>;

    async fn update_category(
        &self,
        id: CategoryId,
        request: UpdateCategoryRequest,
    ) -> FolioResult<CategoryResponse>;

    /// Number of books linked to the category.
    async fn get_category_book_count(&self, id: CategoryId) -> FolioResult<u64>;

    /// Deletes the category unless books still reference it.
    async fn delete_category_if_unused(&self, id: CategoryId) -> FolioResult<()>;

    /// Categories with the most books first.
    async fn get_popular_categories(&self, limit: u32) -> FolioResult<Vec<CategoryBookCount>>;
}
