//! Category service implementation.

use crate::cache::{Call, CacheHandle, Invalidate, ReadThrough};
use crate::category_service::CategoryService;
use crate::dto::{CategoryBookCount, CategoryResponse, CreateCategoryRequest, UpdateCategoryRequest};
use async_trait::async_trait;
use folio_core::{Category, CategoryId, FolioError, FolioResult, ValidateExt};
use folio_repository::CategoryRepository;
use shaku::Component;
use std::sync::Arc;
use tracing::{debug, info};

const PREFIX: &str = "category_service";

const CATEGORY_TTL_SECS: u64 = 3600;

/// Shaku component for [`CategoryService`].
#[derive(Component)]
#[shaku(interface = CategoryService)]
pub struct CategoryServiceComponent {
    #[shaku(inject)]
    category_repository: Arc<dyn CategoryRepository>,
    cache: CacheHandle,
}

impl CategoryServiceComponent {
    pub fn new(category_repository: Arc<dyn CategoryRepository>, cache: CacheHandle) -> Self {
        Self {
            category_repository,
            cache,
        }
    }

    async fn find_category(&self, id: CategoryId) -> FolioResult<Category> {
        self.category_repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| FolioError::not_found("Category", id))
    }

    async fn ensure_name_free(&self, name: &str) -> FolioResult<()> {
        if self.category_repository.find_by_name(name).await?.is_some() {
            return Err(FolioError::Conflict(format!("Category '{}' already exists", name)));
        }
        Ok(())
    }

    async fn insert_category(&self, request: CreateCategoryRequest) -> FolioResult<CategoryResponse> {
        debug!("Creating category: {}", request.name);

        request.validate_request()?;
        self.ensure_name_free(&request.name).await?;

        let category = Category::new(request.name, request.description);
        let saved = self.category_repository.save(&category).await?;

        info!("Category created: {}", saved.id);
        Ok(CategoryResponse::from(saved))
    }

    async fn modify_category(&self, id: CategoryId, request: UpdateCategoryRequest) -> FolioResult<CategoryResponse> {
        request.validate_request()?;

        let mut category = self.find_category(id).await?;
        if let Some(name) = &request.name {
            if *name != category.name {
                self.ensure_name_free(name).await?;
            }
        }

        category.apply(request.name, request.description);
        let updated = self.category_repository.update(&category).await?;

        info!("Category updated: {}", id);
        Ok(CategoryResponse::from(updated))
    }

    async fn remove_if_unused(&self, id: CategoryId) -> FolioResult<()> {
        self.find_category(id).await?;

        let book_count = self.category_repository.count_books(id).await?;
        if book_count > 0 {
            return Err(FolioError::business_rule(format!(
                "Category {} is still used by {} books",
                id, book_count
            )));
        }

        self.category_repository.delete(id).await?;
        info!("Category deleted: {}", id);
        Ok(())
    }
}

#[async_trait]
impl CategoryService for CategoryServiceComponent {
    async fn get_category(&self, id: CategoryId) -> FolioResult<Option<CategoryResponse>> {
        Ok(self.category_repository.find_by_id(id).await?.map(CategoryResponse::from))
    }

    async fn get_by_name(&self, name: &str) -> FolioResult<Option<CategoryResponse>> {
        ReadThrough::new(PREFIX, CATEGORY_TTL_SECS)
            .run(&self.cache, Call::new("get_by_name").arg(name), || async move {
                self.category_repository
                    .find_by_name(name)
                    .await
                    .map(|category| category.map(CategoryResponse::from))
            })
            .await
    }

    async fn get_all_categories(&self, skip: u32, limit: u32) -> FolioResult<Vec<CategoryResponse>> {
        let call = Call::new("get_all_categories").arg(skip).arg(limit);
        ReadThrough::new(PREFIX, CATEGORY_TTL_SECS)
            .run(&self.cache, call, || async move {
                let categories = self.category_repository.find_all(skip, limit).await?;
                Ok::<_, FolioError>(categories.into_iter().map(CategoryResponse::from).collect())
            })
            .await
    }

    async fn create_category(&self, request: CreateCategoryRequest) -> FolioResult<CategoryResponse> {
        let call = Call::new("create_category").json(&request);
        Invalidate::new(PREFIX)
            .run(&self.cache, call, || self.insert_category(request))
            .await
    }

    async fn update_category(
        &self,
        id: CategoryId,
        request: UpdateCategoryRequest,
    ) -> FolioResult<CategoryResponse> {
        let call = Call::new("update_category").arg(id).json(&request);
        Invalidate::new(PREFIX)
            .run(&self.cache, call, || self.modify_category(id, request))
            .await
    }

    async fn get_category_book_count(&self, id: CategoryId) -> FolioResult<u64> {
        ReadThrough::new(PREFIX, CATEGORY_TTL_SECS)
            .run(&self.cache, Call::new("get_category_book_count").arg(id), || {
                self.category_repository.count_books(id)
            })
            .await
    }

    async fn delete_category_if_unused(&self, id: CategoryId) -> FolioResult<()> {
        Invalidate::new(PREFIX)
            .run(&self.cache, Call::new("delete_category_if_unused").arg(id), || {
                self.remove_if_unused(id)
            })
            .await
    }

    async fn get_popular_categories(&self, limit: u32) -> FolioResult<Vec<CategoryBookCount>> {
        ReadThrough::new(PREFIX, CATEGORY_TTL_SECS)
            .run(&self.cache, Call::new("get_popular_categories").arg(limit), || async move {
                let popular = self.category_repository.find_popular(limit).await?;
                Ok::<_, FolioError>(
                    popular
                        .into_iter()
                        .map(|(category, book_count)| CategoryBookCount {
                            category: CategoryResponse::from(category),
                            book_count,
                        })
                        .collect(),
                )
            })
            .await
    }
}

impl std::fmt::Debug for CategoryServiceComponent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CategoryServiceComponent").finish_non_exhaustive()
    }
}
