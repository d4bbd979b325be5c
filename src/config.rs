//! Application configuration loaded from environment variables.
//!
//! All settings have development defaults except `HMAC_SECRET`, which is
//! required and length-validated at startup: the machine-to-machine
//! endpoints are only as strong as that secret, so a missing or short one
//! is a fatal configuration error, not something to limp along without.
//!
//! Window strings (`SUBMIT_RATE_WINDOW="1 d"`) and the fallback mode are
//! parsed here, once; request-time code only sees structured values.

use std::env;
use std::time::Duration;

use crate::error::{AppError, AppResult};
use crate::ratelimit::{FallbackMode, RateLimitConfig, Window};

/// Minimum accepted HMAC secret length, in bytes.
pub const MIN_SECRET_LENGTH: usize = 32;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    // =========================================================================
    // Server
    // =========================================================================
    /// Server host address (default: "0.0.0.0")
    pub host: String,

    /// Server port (default: 3000)
    pub port: u16,

    /// Site name; used as the rate-limit key prefix base (default:
    /// "dobacklinks")
    pub site_name: String,

    // =========================================================================
    // Security
    // =========================================================================
    /// Shared secret for HMAC request authentication. Required, at least
    /// [`MIN_SECRET_LENGTH`] characters.
    pub hmac_secret: String,

    /// Replay window for signed requests (default: 300 s)
    pub hmac_max_age: Duration,

    // =========================================================================
    // Rate limiting
    // =========================================================================
    /// Redis connection URL. Unset disables the distributed backend and
    /// every check uses the fallback policy.
    pub redis_url: Option<String>,

    /// Behavior when Redis is unavailable (default: memory_fallback)
    pub fallback_mode: FallbackMode,

    /// Limit applied to public site submissions, keyed by client IP
    /// (default: 30 per "1 d")
    pub submit_limit: RateLimitConfig,

    /// Interval for the background sweep of expired fallback counters
    /// (default: 60 s)
    pub counter_sweep_interval: Duration,

    // =========================================================================
    // Enrichment
    // =========================================================================
    /// Maximum sites processed per enrichment run (default: 100)
    pub enrich_batch_limit: usize,

    // =========================================================================
    // HTTP
    // =========================================================================
    /// Maximum request body size in bytes (default: 2 MB)
    pub max_request_body_size: usize,

    /// Comma-separated list of allowed CORS origins; `*` allows any
    pub cors_allowed_origins: Vec<String>,

    // =========================================================================
    // Observability
    // =========================================================================
    /// Log level (e.g. "info", "debug")
    pub log_level: String,

    /// Port for the Prometheus metrics endpoint (default: 9090, 0 = disabled)
    pub metrics_port: u16,
}

impl Config {
    /// Load configuration from environment variables with sensible defaults.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` when a value fails to parse or fails
    /// validation (missing/short secret, zero limits, unknown window unit
    /// or fallback mode).
    pub fn from_env() -> AppResult<Self> {
        // Load an .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let site_name = env::var("SITE_NAME").unwrap_or_else(|_| "dobacklinks".to_string());

        let hmac_secret = env::var("HMAC_SECRET")
            .map_err(|_| AppError::Config("HMAC_SECRET must be set".to_string()))?;

        let submit_window: Window = env::var("SUBMIT_RATE_WINDOW")
            .unwrap_or_else(|_| "1 d".to_string())
            .parse()
            .map_err(|e| AppError::Config(format!("Invalid SUBMIT_RATE_WINDOW: {e}")))?;

        let fallback_mode: FallbackMode = env::var("RATE_LIMIT_FALLBACK")
            .unwrap_or_else(|_| "memory_fallback".to_string())
            .parse()
            .map_err(|e| AppError::Config(format!("Invalid RATE_LIMIT_FALLBACK: {e}")))?;

        let config = Self {
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: Self::parse_env("PORT", 3000)?,

            submit_limit: RateLimitConfig::new(
                format!("{}-submit", site_name.trim()),
                Self::parse_env("SUBMIT_RATE_LIMIT", 30)?,
                submit_window,
            ),
            site_name,

            hmac_secret,
            hmac_max_age: Duration::from_secs(Self::parse_env("HMAC_MAX_AGE_SECS", 300)?),

            redis_url: env::var("REDIS_URL").ok().filter(|u| !u.is_empty()),
            fallback_mode,
            counter_sweep_interval: Duration::from_secs(Self::parse_env(
                "COUNTER_SWEEP_INTERVAL_SECS",
                60,
            )?),

            enrich_batch_limit: Self::parse_env("ENRICH_BATCH_LIMIT", 100)?,

            max_request_body_size: Self::parse_env("MAX_REQUEST_BODY_SIZE", 2 * 1024 * 1024)?,
            cors_allowed_origins: Self::parse_cors_origins(),

            log_level: env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            metrics_port: Self::parse_env("METRICS_PORT", 9090)?,
        };

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration values for consistency and correctness.
    fn validate(&self) -> AppResult<()> {
        if self.hmac_secret.len() < MIN_SECRET_LENGTH {
            return Err(AppError::Config(format!(
                "HMAC_SECRET must be at least {MIN_SECRET_LENGTH} characters for security"
            )));
        }

        if self.submit_limit.max_requests == 0 {
            return Err(AppError::Config(
                "SUBMIT_RATE_LIMIT must be greater than 0".to_string(),
            ));
        }

        if self.enrich_batch_limit == 0 {
            return Err(AppError::Config(
                "ENRICH_BATCH_LIMIT must be greater than 0".to_string(),
            ));
        }

        if self.max_request_body_size == 0 {
            return Err(AppError::Config(
                "MAX_REQUEST_BODY_SIZE must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }

    /// Get the full server address for binding.
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Whether a distributed rate-limit backend is configured.
    pub fn redis_enabled(&self) -> bool {
        self.redis_url.is_some()
    }

    /// Check if Prometheus metrics export is enabled.
    pub fn metrics_enabled(&self) -> bool {
        self.metrics_port > 0
    }

    /// Get the metrics endpoint address, or `None` if disabled.
    pub fn metrics_addr(&self) -> Option<std::net::SocketAddr> {
        if self.metrics_enabled() {
            Some(std::net::SocketAddr::from((
                [0, 0, 0, 0],
                self.metrics_port,
            )))
        } else {
            None
        }
    }

    /// Parse an environment variable into the specified type with a default value.
    fn parse_env<T>(name: &str, default: T) -> AppResult<T>
    where
        T: std::str::FromStr,
        T::Err: std::fmt::Display,
    {
        match env::var(name) {
            Ok(val) => val
                .parse()
                .map_err(|e| AppError::Config(format!("Invalid {name}: {e}"))),
            Err(_) => Ok(default),
        }
    }

    /// Parse CORS allowed origins from environment variable.
    fn parse_cors_origins() -> Vec<String> {
        env::var("CORS_ALLOWED_ORIGINS")
            .unwrap_or_else(|_| "*".to_string())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect()
    }
}

/// Default configuration for testing and development.
///
/// Production deployments should use `Config::from_env()` instead; note
/// the placeholder secret.
impl Default for Config {
    fn default() -> Self {
        use crate::ratelimit::WindowUnit;

        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            site_name: "dobacklinks".to_string(),
            hmac_secret: "insecure-dev-secret-change-me-0123456789".to_string(),
            hmac_max_age: Duration::from_secs(300),
            redis_url: None,
            fallback_mode: FallbackMode::MemoryFallback,
            submit_limit: RateLimitConfig::new(
                "dobacklinks-submit",
                30,
                Window::new(1, WindowUnit::Days),
            ),
            counter_sweep_interval: Duration::from_secs(60),
            enrich_batch_limit: 100,
            max_request_body_size: 2 * 1024 * 1024,
            cors_allowed_origins: vec!["*".to_string()],
            log_level: "info".to_string(),
            metrics_port: 9090,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::ratelimit::WindowUnit;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.submit_limit.max_requests, 30);
        assert_eq!(config.submit_limit.window, Window::new(1, WindowUnit::Days));
        assert!(config.redis_url.is_none());
    }

    #[test]
    fn test_short_secret_fails_validation() {
        let config = Config {
            hmac_secret: "too-short".to_string(),
            ..Config::default()
        };

        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("HMAC_SECRET"));
    }

    #[test]
    fn test_zero_submit_limit_fails_validation() {
        let config = Config {
            submit_limit: RateLimitConfig::new("x", 0, Window::new(1, WindowUnit::Days)),
            ..Config::default()
        };

        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_enrich_batch_fails_validation() {
        let config = Config {
            enrich_batch_limit: 0,
            ..Config::default()
        };

        assert!(config.validate().is_err());
    }

    #[test]
    fn test_server_addr_format() {
        let config = Config {
            host: "localhost".to_string(),
            port: 8080,
            ..Config::default()
        };

        assert_eq!(config.server_addr(), "localhost:8080");
    }

    #[test]
    fn test_metrics_addr_disabled_when_port_zero() {
        let config = Config {
            metrics_port: 0,
            ..Config::default()
        };

        assert!(!config.metrics_enabled());
        assert!(config.metrics_addr().is_none());
    }
}
