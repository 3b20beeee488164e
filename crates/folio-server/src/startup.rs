//! Server startup utilities.

use folio_config::{ObservabilityConfig, RedisConfig};
use folio_core::{FolioError, FolioResult};
use folio_service::{cache::metrics::register_metrics, CacheHandle, RedisCacheBackend};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const LATENCY_BUCKETS: &[f64] = &[0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0];

/// Installs the global tracing subscriber. `RUST_LOG` wins over the
/// configured level.
pub fn init_logging(config: &ObservabilityConfig) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!("{},folio=debug,tower_http=info", config.log_level))
    });

    let registry = tracing_subscriber::registry().with(filter);
    if config.json_logs() {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_target(true))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_target(true))
            .init();
    }
}

/// Installs the Prometheus recorder and describes the cache metrics.
pub fn init_metrics(config: &ObservabilityConfig) -> FolioResult<Option<PrometheusHandle>> {
    if !config.metrics_enabled {
        info!("Metrics disabled");
        return Ok(None);
    }

    let handle = PrometheusBuilder::new()
        .set_buckets(LATENCY_BUCKETS)
        .and_then(PrometheusBuilder::install_recorder)
        .map_err(|e| FolioError::Configuration(format!("Failed to install metrics recorder: {}", e)))?;
    register_metrics();

    info!("Prometheus metrics exposed at {}", config.metrics_path);
    Ok(Some(handle))
}

/// Builds the cache handle. A Redis pool that cannot be built leaves
/// caching off instead of failing startup.
pub fn init_cache(config: &RedisConfig) -> CacheHandle {
    if !config.enabled {
        info!("Redis cache disabled by configuration");
        return CacheHandle::Disabled;
    }

    match RedisCacheBackend::new(config) {
        Ok(backend) => CacheHandle::connected(backend),
        Err(e) => {
            warn!(error = %e, "Redis cache unavailable, continuing without cache");
            CacheHandle::Disabled
        }
    }
}

/// Prints server startup information.
pub fn print_startup_info(addr: &str, metrics_path: Option<&str>) {
    let separator = "=".repeat(60);
    info!("{}", separator);
    info!("Health:    http://{}/health", addr);
    info!("Ready:     http://{}/ready", addr);
    if let Some(path) = metrics_path {
        info!("Metrics:   http://{}{}", addr, path);
    }
    info!("{}", separator);
}

/// Resolves when the process receives Ctrl+C or SIGTERM.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            info!("Received Ctrl+C, initiating graceful shutdown...");
        }
        () = terminate => {
            info!("Received terminate signal, initiating graceful shutdown...");
        }
    }
}
