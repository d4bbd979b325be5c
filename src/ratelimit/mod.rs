//! Rate limiting with a distributed backend and graceful degradation.
//!
//! # Architecture
//!
//! ```text
//! collaborator (handler)
//!        │  identifier + RateLimitConfig + FallbackMode
//!        ▼
//! ┌────────────────────┐   Redis up   ┌───────────────────────┐
//! │ RateLimiterRegistry│─────────────▶│ SlidingWindowLimiter  │
//! │  (memoized per     │              │ (sorted-set window)   │
//! │   config triple)   │◀─ error ──── └───────────────────────┘
//! └─────────┬──────────┘
//!           │ Redis down / erroring
//!           ▼
//!   FallbackMode: BlockAll | AllowAll | MemoryFallback
//!                                          │
//!                                          ▼
//!                                   MemoryCounters
//! ```
//!
//! The memory fallback is deliberately per-process: each instance enforces
//! its own budget when Redis is gone. That limitation is documented rather
//! than hidden, and the default policy stays `MemoryFallback` so an outage
//! degrades protection instead of removing it.

mod memory;
mod redis;
mod registry;
mod window;

pub use self::redis::{SlidingWindowLimiter, connect};
pub use memory::MemoryCounters;
pub use registry::{FallbackMode, RateLimitConfig, RateLimiterRegistry};
pub use window::{ParseWindowError, Window, WindowUnit};
