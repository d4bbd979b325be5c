//! Redis-backed sliding-window limiter.
//!
//! Implements a sliding window log over a sorted set per
//! `prefix:identifier` key: members are timestamped request markers,
//! entries older than the window are trimmed on every check, and the
//! cardinality after insertion is the request count for the window. The
//! sorted set carries a TTL of one window so idle keys expire on their own.
//!
//! Counting through Redis is what makes the limit hold across server
//! instances; the in-memory fallback cannot provide that.

use std::time::Duration;

use chrono::Utc;
use redis::aio::{ConnectionManager, ConnectionManagerConfig};
use redis::{AsyncCommands, Client, RedisResult};
use tracing::debug;
use uuid::Uuid;

use super::window::Window;

/// How many times the connection manager retries a dropped connection
/// before a command fails.
const CONNECT_RETRIES: usize = 1;

/// Per-attempt connection timeout. Kept short so a dead Redis degrades the
/// request into the fallback path instead of stalling it.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(1);

/// Open a managed connection to Redis.
///
/// The returned manager multiplexes and auto-reconnects; clones are cheap
/// handles to the same connection.
///
/// # Errors
///
/// Returns the underlying Redis error if the URL is invalid or the initial
/// connection cannot be established.
pub async fn connect(redis_url: &str) -> RedisResult<ConnectionManager> {
    let config = ConnectionManagerConfig::new()
        .set_number_of_retries(CONNECT_RETRIES)
        .set_connection_timeout(CONNECT_TIMEOUT);

    let client = Client::open(redis_url)?;
    client.get_connection_manager_with_config(config).await
}

/// A sliding-window limiter bound to one `(prefix, max_requests, window)`
/// configuration.
#[derive(Clone)]
pub struct SlidingWindowLimiter {
    conn: ConnectionManager,
    prefix: String,
    max_requests: u32,
    window_ms: i64,
}

impl SlidingWindowLimiter {
    pub fn new(conn: ConnectionManager, prefix: &str, max_requests: u32, window: Window) -> Self {
        Self {
            conn,
            prefix: prefix.to_string(),
            max_requests,
            window_ms: window.as_millis(),
        }
    }

    /// Count one request for `identifier` and return whether it is allowed.
    ///
    /// # Errors
    ///
    /// Propagates Redis errors; the registry treats any error as
    /// backend-unavailable and applies the fallback policy.
    pub async fn limit(&self, identifier: &str) -> RedisResult<bool> {
        let key = format!("{}:{}", self.prefix, identifier);
        let now = Utc::now().timestamp_millis();
        let window_start = now - self.window_ms;
        // Unique member so concurrent requests in the same millisecond are
        // counted separately.
        let member = format!("{}-{}", now, Uuid::new_v4());

        let mut conn = self.conn.clone();
        let (count,): (i64,) = redis::pipe()
            .atomic()
            .zrembyscore(&key, 0, window_start)
            .ignore()
            .zadd(&key, member.as_str(), now)
            .ignore()
            .zcard(&key)
            .pexpire(&key, self.window_ms)
            .ignore()
            .query_async(&mut conn)
            .await?;

        if count > i64::from(self.max_requests) {
            // Denied requests do not consume window capacity: take the
            // optimistically-added marker back out.
            let _: i64 = conn.zrem(&key, member.as_str()).await?;

            debug!(
                key = %key,
                count,
                limit = self.max_requests,
                "sliding window over limit"
            );
            return Ok(false);
        }

        Ok(true)
    }
}
