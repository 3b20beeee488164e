//! # Folio Server
//!
//! Main entry point: loads configuration, connects PostgreSQL and Redis,
//! wires the services and serves the operational endpoints.

use folio_config::{AppConfig, ConfigLoader};
use folio_core::{FolioError, FolioResult, HealthCheck};
use folio_repository::{create_pool, DatabaseHealthCheck, DatabasePoolInterface};
use folio_server::app::{create_router, AppState, CacheHealthCheck};
use folio_server::di::{DatabaseResolver, FolioModuleBuilder};
use folio_server::startup::{
    init_cache, init_logging, init_metrics, print_startup_info, shutdown_signal,
};
use folio_service::CacheSettings;
use std::sync::Arc;
use tracing::{error, info};

#[tokio::main]
async fn main() {
    let config = match load_config().await {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    init_logging(&config.observability);

    info!("Starting Folio Server...");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));
    info!("Environment: {}", config.app.environment);

    if let Err(e) = run(config).await {
        error!("Application error: {}", e);
        std::process::exit(1);
    }
}

async fn load_config() -> FolioResult<AppConfig> {
    let loader = ConfigLoader::from_default_location()?;
    Ok(loader.get().await)
}

async fn run(config: AppConfig) -> FolioResult<()> {
    let metrics = init_metrics(&config.observability)?;

    let db_pool = create_pool(&config.database).await?;
    if config.database.run_migrations {
        db_pool.run_migrations().await?;
    }

    let cache = init_cache(&config.redis);
    let module = FolioModuleBuilder::new(db_pool)
        .with_password_hash_cost(config.security.password_hash_cost)
        .with_cache(cache.clone(), CacheSettings::from(&config.redis))
        .build();

    let database = module.database_pool();
    let checks: Vec<Arc<dyn HealthCheck>> = vec![
        Arc::new(DatabaseHealthCheck::new(database.clone())),
        Arc::new(CacheHealthCheck::new(cache)),
    ];
    let router = create_router(
        AppState::new(checks, metrics.clone()),
        &config.observability.metrics_path,
    );

    let addr = config.server.addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| FolioError::Internal(format!("Failed to bind {}: {}", addr, e)))?;

    print_startup_info(
        &addr,
        metrics.as_ref().map(|_| config.observability.metrics_path.as_str()),
    );

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| FolioError::Internal(format!("Server error: {}", e)))?;

    database.close().await;
    info!("Server shutdown complete");
    Ok(())
}
