//! Configuration validation.
//!
//! Collects every problem in one pass so a misconfigured deployment fails
//! once with the full list.

use crate::AppConfig;
use std::fmt;
use url::Url;

/// Configuration validation error variants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigValidationError {
    /// Port number is invalid (must be 1-65535).
    InvalidPort { name: String, value: u16 },
    /// Pool size configuration is invalid (min must be <= max).
    InvalidPoolSize { min: u32, max: u32 },
    /// Pool size exceeds maximum allowed.
    PoolSizeTooLarge { value: u32, maximum: u32 },
    /// Value must be greater than zero.
    NonPositive { name: String },
    /// URL format is invalid.
    InvalidUrl { url_type: String, message: String },
    /// Password hash cost is invalid.
    InvalidHashCost { value: u32, minimum: u32, maximum: u32 },
    /// Log level is invalid.
    InvalidLogLevel { value: String },
    /// Log format is invalid.
    InvalidLogFormat { value: String },
}

impl fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidPort { name, value } => {
                write!(f, "Invalid port for {}: {} (must be 1-65535)", name, value)
            }
            Self::InvalidPoolSize { min, max } => write!(
                f,
                "Invalid pool size: min ({}) cannot be greater than max ({})",
                min, max
            ),
            Self::PoolSizeTooLarge { value, maximum } => {
                write!(f, "Pool size {} exceeds maximum allowed ({})", value, maximum)
            }
            Self::NonPositive { name } => write!(f, "'{}' must be greater than zero", name),
            Self::InvalidUrl { url_type, message } => {
                write!(f, "Invalid {} URL: {}", url_type, message)
            }
            Self::InvalidHashCost {
                value,
                minimum,
                maximum,
            } => write!(
                f,
                "Invalid password hash cost: {} (must be between {} and {})",
                value, minimum, maximum
            ),
            Self::InvalidLogLevel { value } => write!(
                f,
                "Invalid log level: '{}' (valid: trace, debug, info, warn, error)",
                value
            ),
            Self::InvalidLogFormat { value } => {
                write!(f, "Invalid log format: '{}' (valid: pretty, json)", value)
            }
        }
    }
}

impl std::error::Error for ConfigValidationError {}

/// Configuration validator.
pub struct ConfigValidator;

impl ConfigValidator {
    /// Maximum connection pool size.
    const MAX_POOL_SIZE: u32 = 1000;
    /// Minimum Argon2 hash cost.
    const MIN_HASH_COST: u32 = 4;
    /// Maximum Argon2 hash cost.
    const MAX_HASH_COST: u32 = 31;
    /// Valid log levels.
    const VALID_LOG_LEVELS: &'static [&'static str] = &["trace", "debug", "info", "warn", "error"];
    /// Valid log formats.
    const VALID_LOG_FORMATS: &'static [&'static str] = &["pretty", "json"];

    /// Validates the entire application configuration.
    ///
    /// Returns Ok(()) if valid, or Err with all validation errors found.
    pub fn validate(config: &AppConfig) -> Result<(), Vec<ConfigValidationError>> {
        let mut errors = Vec::new();

        Self::validate_server(&config.server, &mut errors);
        Self::validate_database(&config.database, &mut errors);
        Self::validate_redis(&config.redis, &mut errors);
        Self::validate_security(&config.security, &mut errors);
        Self::validate_observability(&config.observability, &mut errors);

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    fn validate_server(config: &crate::ServerConfig, errors: &mut Vec<ConfigValidationError>) {
        if config.port == 0 {
            errors.push(ConfigValidationError::InvalidPort {
                name: "server.port".to_string(),
                value: config.port,
            });
        }
        require_positive(config.request_timeout_secs, "server.request_timeout_secs", errors);
    }

    fn validate_database(config: &crate::DatabaseConfig, errors: &mut Vec<ConfigValidationError>) {
        match Url::parse(&config.url) {
            Ok(url) if matches!(url.scheme(), "postgres" | "postgresql") => {}
            Ok(url) => errors.push(ConfigValidationError::InvalidUrl {
                url_type: "database".to_string(),
                message: format!("unsupported scheme '{}', expected postgres://", url.scheme()),
            }),
            Err(e) => errors.push(ConfigValidationError::InvalidUrl {
                url_type: "database".to_string(),
                message: e.to_string(),
            }),
        }

        if config.min_connections > config.max_connections {
            errors.push(ConfigValidationError::InvalidPoolSize {
                min: config.min_connections,
                max: config.max_connections,
            });
        }
        if config.max_connections > Self::MAX_POOL_SIZE {
            errors.push(ConfigValidationError::PoolSizeTooLarge {
                value: config.max_connections,
                maximum: Self::MAX_POOL_SIZE,
            });
        }

        require_positive(config.connect_timeout_secs, "database.connect_timeout_secs", errors);
        require_positive(config.idle_timeout_secs, "database.idle_timeout_secs", errors);
    }

    fn validate_redis(config: &crate::RedisConfig, errors: &mut Vec<ConfigValidationError>) {
        if !config.enabled {
            return;
        }

        match Url::parse(&config.url) {
            Ok(url) if matches!(url.scheme(), "redis" | "rediss") => {}
            Ok(_) => errors.push(ConfigValidationError::InvalidUrl {
                url_type: "redis".to_string(),
                message: "URL must start with redis:// or rediss://".to_string(),
            }),
            Err(e) => errors.push(ConfigValidationError::InvalidUrl {
                url_type: "redis".to_string(),
                message: e.to_string(),
            }),
        }

        if config.pool_size > Self::MAX_POOL_SIZE {
            errors.push(ConfigValidationError::PoolSizeTooLarge {
                value: config.pool_size,
                maximum: Self::MAX_POOL_SIZE,
            });
        }
        require_positive(u64::from(config.pool_size), "redis.pool_size", errors);
        require_positive(config.operation_timeout_ms, "redis.operation_timeout_ms", errors);
        require_positive(u64::from(config.scan_batch_size), "redis.scan_batch_size", errors);
        require_positive(config.ttl.default_secs, "redis.ttl.default_secs", errors);
        require_positive(config.ttl.short_secs, "redis.ttl.short_secs", errors);
        require_positive(config.ttl.medium_secs, "redis.ttl.medium_secs", errors);
        require_positive(config.ttl.long_secs, "redis.ttl.long_secs", errors);
    }

    fn validate_security(config: &crate::SecurityConfig, errors: &mut Vec<ConfigValidationError>) {
        if !(Self::MIN_HASH_COST..=Self::MAX_HASH_COST).contains(&config.password_hash_cost) {
            errors.push(ConfigValidationError::InvalidHashCost {
                value: config.password_hash_cost,
                minimum: Self::MIN_HASH_COST,
                maximum: Self::MAX_HASH_COST,
            });
        }
    }

    fn validate_observability(
        config: &crate::ObservabilityConfig,
        errors: &mut Vec<ConfigValidationError>,
    ) {
        let level = config.log_level.to_lowercase();
        if !Self::VALID_LOG_LEVELS.contains(&level.as_str()) {
            errors.push(ConfigValidationError::InvalidLogLevel {
                value: config.log_level.clone(),
            });
        }

        let format = config.log_format.to_lowercase();
        if !Self::VALID_LOG_FORMATS.contains(&format.as_str()) {
            errors.push(ConfigValidationError::InvalidLogFormat {
                value: config.log_format.clone(),
            });
        }
    }
}

fn require_positive(value: u64, name: &str, errors: &mut Vec<ConfigValidationError>) {
    if value == 0 {
        errors.push(ConfigValidationError::NonPositive {
            name: name.to_string(),
        });
    }
}

/// Formats validation errors for display.
#[must_use]
pub fn format_validation_errors(errors: &[ConfigValidationError]) -> String {
    let mut output = String::from("Configuration validation failed:\n");
    for (i, error) in errors.iter().enumerate() {
        output.push_str(&format!("  {}. {}\n", i + 1, error));
    }
    output
}
