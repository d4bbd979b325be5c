//! Rate limiter registry: distributed checks with graceful degradation.
//!
//! The registry is the single entry point collaborators use:
//!
//! ```rust,ignore
//! let allowed = registry
//!     .check(&client_ip, &config.submit_limit, config.fallback_mode)
//!     .await;
//! ```
//!
//! With Redis configured, checks go through a [`SlidingWindowLimiter`]
//! memoized per `(prefix, max_requests, window)` triple. Without Redis, or
//! when a Redis call fails at runtime, the [`FallbackMode`] decides what
//! happens. The default is [`FallbackMode::MemoryFallback`]: losing the
//! distributed store must not silently disable protection, which is what
//! `AllowAll` would do.
//!
//! The registry is an explicitly constructed object with no global state;
//! tests build a fresh one per case and servers own exactly one.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::{Arc, RwLock};

use redis::aio::ConnectionManager;
use tracing::warn;

use super::memory::MemoryCounters;
use super::redis::SlidingWindowLimiter;
use super::window::Window;
use crate::metrics;

/// Per-call-site rate limit configuration.
#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    /// Key namespace, e.g. `"dobacklinks-submit"`. Also the Redis key
    /// prefix, so two configs with the same prefix share counters.
    pub prefix: String,
    /// Maximum requests allowed per identifier within the window.
    pub max_requests: u32,
    /// The window itself, parsed at configuration time.
    pub window: Window,
}

impl RateLimitConfig {
    pub fn new(prefix: impl Into<String>, max_requests: u32, window: Window) -> Self {
        Self {
            prefix: prefix.into(),
            max_requests,
            window,
        }
    }

    /// Cache key for limiter memoization.
    fn cache_key(&self) -> String {
        format!("{}:{}:{}", self.prefix, self.max_requests, self.window)
    }
}

/// What to do when the distributed backend is unavailable.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FallbackMode {
    /// Allow every request. Insecure: only for opt-in, low-stakes
    /// endpoints.
    AllowAll,
    /// Deny every request. Most secure, may hurt availability.
    BlockAll,
    /// Enforce the limit with per-process in-memory counters.
    #[default]
    MemoryFallback,
}

impl FromStr for FallbackMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "allow_all" => Ok(FallbackMode::AllowAll),
            "block_all" => Ok(FallbackMode::BlockAll),
            "memory_fallback" => Ok(FallbackMode::MemoryFallback),
            other => Err(format!(
                "unknown fallback mode '{other}': use allow_all, block_all, or memory_fallback"
            )),
        }
    }
}

impl fmt::Display for FallbackMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            FallbackMode::AllowAll => "allow_all",
            FallbackMode::BlockAll => "block_all",
            FallbackMode::MemoryFallback => "memory_fallback",
        };
        f.write_str(s)
    }
}

/// Registry owning the limiter cache and the in-memory fallback counters.
pub struct RateLimiterRegistry {
    redis: Option<ConnectionManager>,
    /// Limiter instances memoized per config triple.
    limiters: RwLock<HashMap<String, Arc<SlidingWindowLimiter>>>,
    /// Fallback counters shared by every config using this registry.
    memory: MemoryCounters,
}

impl RateLimiterRegistry {
    /// Build a registry. Pass `None` to run without a distributed backend;
    /// every check then goes straight to the fallback policy.
    pub fn new(redis: Option<ConnectionManager>) -> Self {
        Self {
            redis,
            limiters: RwLock::new(HashMap::new()),
            memory: MemoryCounters::new(),
        }
    }

    /// Whether a distributed backend was configured.
    pub fn has_distributed_backend(&self) -> bool {
        self.redis.is_some()
    }

    /// The fallback counter store, exposed for the periodic sweep task.
    pub fn memory(&self) -> &MemoryCounters {
        &self.memory
    }

    /// Check whether `identifier` may perform another request under
    /// `config`.
    ///
    /// A runtime error from a live-but-failing backend is treated exactly
    /// like backend-unavailable: logged as a warning and routed into the
    /// fallback policy. Callers never see the difference.
    pub async fn check(
        &self,
        identifier: &str,
        config: &RateLimitConfig,
        fallback: FallbackMode,
    ) -> bool {
        if let Some(limiter) = self.limiter_for(config) {
            match limiter.limit(identifier).await {
                Ok(allowed) => {
                    metrics::record_rate_limit_check("redis", allowed);
                    return allowed;
                }
                Err(e) => {
                    warn!(
                        prefix = %config.prefix,
                        error = %e,
                        "Redis rate limit check failed - applying fallback policy"
                    );
                }
            }
        }

        let allowed = match fallback {
            FallbackMode::BlockAll => {
                warn!(prefix = %config.prefix, "Redis unavailable - blocking request");
                false
            }
            FallbackMode::MemoryFallback => {
                warn!(prefix = %config.prefix, "Redis unavailable - using in-memory fallback");
                let key = format!("{}:{}", config.prefix, identifier);
                self.memory
                    .check(&key, config.max_requests, config.window.duration())
            }
            FallbackMode::AllowAll => true,
        };

        metrics::record_rate_limit_check("fallback", allowed);
        allowed
    }

    /// Get or build the memoized limiter for a config triple.
    ///
    /// Returns `None` when no backend is configured.
    fn limiter_for(&self, config: &RateLimitConfig) -> Option<Arc<SlidingWindowLimiter>> {
        let conn = self.redis.as_ref()?;
        let key = config.cache_key();

        if let Some(limiter) = self.read_limiters().get(&key) {
            return Some(Arc::clone(limiter));
        }

        let mut limiters = self.write_limiters();
        let limiter = limiters.entry(key).or_insert_with(|| {
            Arc::new(SlidingWindowLimiter::new(
                conn.clone(),
                &config.prefix,
                config.max_requests,
                config.window,
            ))
        });
        Some(Arc::clone(limiter))
    }

    fn read_limiters(
        &self,
    ) -> std::sync::RwLockReadGuard<'_, HashMap<String, Arc<SlidingWindowLimiter>>> {
        match self.limiters.read() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn write_limiters(
        &self,
    ) -> std::sync::RwLockWriteGuard<'_, HashMap<String, Arc<SlidingWindowLimiter>>> {
        match self.limiters.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}
