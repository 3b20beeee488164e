//! Dependency injection module using Shaku.
//!
//! `FolioModule` holds the whole stack in one process: the PostgreSQL pool,
//! the repositories on top of it, password hashing and the five business
//! services. The services share one [`CacheHandle`], passed in as a
//! component parameter.

use folio_repository::{
    DatabasePool, DatabasePoolInterface, DatabasePoolParameters, PgBookRepository,
    PgCategoryRepository, PgInteractionRepository, PgPreferenceRepository,
    PgRecommendationRepository, PgUserRepository,
};
use folio_security::{PasswordHasher, PasswordHasherParameters};
use folio_service::{
    BookService, BookServiceComponent, BookServiceComponentParameters, CacheHandle,
    CacheSettings, CategoryService, CategoryServiceComponent, CategoryServiceComponentParameters,
    InteractionService, InteractionServiceComponent, InteractionServiceComponentParameters,
    RecommendationService, RecommendationServiceComponent,
    RecommendationServiceComponentParameters, UserService, UserServiceComponent,
    UserServiceComponentParameters,
};
use shaku::{module, HasComponent};
use std::sync::Arc;

module! {
    pub FolioModule {
        components = [
            DatabasePool,
            PasswordHasher,
            PgUserRepository,
            PgPreferenceRepository,
            PgCategoryRepository,
            PgBookRepository,
            PgInteractionRepository,
            PgRecommendationRepository,
            UserServiceComponent,
            CategoryServiceComponent,
            BookServiceComponent,
            InteractionServiceComponent,
            RecommendationServiceComponent,
        ],
        providers = [],
    }
}

/// Collects the runtime values the module's components are built from.
pub struct FolioModuleBuilder {
    db_pool: Arc<DatabasePool>,
    password_hasher: PasswordHasher,
    cache: CacheHandle,
    settings: CacheSettings,
}

impl FolioModuleBuilder {
    /// Starts a builder around a connected pool. Caching is off until
    /// [`with_cache`](Self::with_cache) is called.
    #[must_use]
    pub fn new(db_pool: Arc<DatabasePool>) -> Self {
        Self {
            db_pool,
            password_hasher: PasswordHasher::default(),
            cache: CacheHandle::Disabled,
            settings: CacheSettings::default(),
        }
    }

    #[must_use]
    pub fn with_password_hash_cost(mut self, cost: u32) -> Self {
        self.password_hasher = PasswordHasher::with_cost(cost);
        self
    }

    #[must_use]
    pub fn with_cache(mut self, cache: CacheHandle, settings: CacheSettings) -> Self {
        self.cache = cache;
        self.settings = settings;
        self
    }

    /// Builds the module.
    #[must_use]
    pub fn build(self) -> Arc<FolioModule> {
        let module = FolioModule::builder()
            .with_component_parameters::<DatabasePool>(DatabasePoolParameters {
                pool: self.db_pool.inner().clone(),
            })
            .with_component_parameters::<PasswordHasher>(PasswordHasherParameters {
                argon2: self.password_hasher.argon2_arc(),
            })
            .with_component_parameters::<UserServiceComponent>(UserServiceComponentParameters {
                cache: self.cache.clone(),
                settings: self.settings,
            })
            .with_component_parameters::<CategoryServiceComponent>(
                CategoryServiceComponentParameters {
                    cache: self.cache.clone(),
                },
            )
            .with_component_parameters::<BookServiceComponent>(BookServiceComponentParameters {
                cache: self.cache.clone(),
                settings: self.settings,
            })
            .with_component_parameters::<InteractionServiceComponent>(
                InteractionServiceComponentParameters {
                    cache: self.cache.clone(),
                },
            )
            .with_component_parameters::<RecommendationServiceComponent>(
                RecommendationServiceComponentParameters {
                    cache: self.cache,
                    settings: self.settings,
                },
            )
            .build();

        Arc::new(module)
    }
}

/// Resolves the services from a module.
pub trait ServiceResolver {
    fn user_service(&self) -> Arc<dyn UserService>;
    fn category_service(&self) -> Arc<dyn CategoryService>;
    fn book_service(&self) -> Arc<dyn BookService>;
    fn interaction_service(&self) -> Arc<dyn InteractionService>;
    fn recommendation_service(&self) -> Arc<dyn RecommendationService>;
}

impl ServiceResolver for FolioModule {
    fn user_service(&self) -> Arc<dyn UserService> {
        self.resolve()
    }

    fn category_service(&self) -> Arc<dyn CategoryService> {
        self.resolve()
    }

    fn book_service(&self) -> Arc<dyn BookService> {
        self.resolve()
    }

    fn interaction_service(&self) -> Arc<dyn InteractionService> {
        self.resolve()
    }

    fn recommendation_service(&self) -> Arc<dyn RecommendationService> {
        self.resolve()
    }
}

/// Resolves the database pool from a module.
pub trait DatabaseResolver {
    fn database_pool(&self) -> Arc<dyn DatabasePoolInterface>;
}

impl DatabaseResolver for FolioModule {
    fn database_pool(&self) -> Arc<dyn DatabasePoolInterface> {
        self.resolve()
    }
}
