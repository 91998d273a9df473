//! Cache layer for incident snapshots
//!
//! The engine talks to a [`CacheBackend`] through a stack of
//! [`NamespacedCache`] decorators, so several logical caches can share one
//! physical backend without key collisions:
//!
//! ```text
//! IncidentCache ("incident:<id>", JSON, TTL)
//!        │
//!        ▼
//! NamespacedCache("incident")
//!        │
//!        ▼
//! NamespacedCache(<key_prefix>)   (optional, physical prefix)
//!        │
//!        ▼
//! MemoryCacheBackend | RedisCacheBackend
//! ```

mod backend;
mod factory;
mod incident;
mod memory;
mod namespace;
mod redis_backend;

pub use backend::{CacheBackend, CacheError, CacheResult};
pub use factory::create_cache_backend;
pub use incident::{IncidentCache, DEFAULT_TTL};
pub use memory::MemoryCacheBackend;
pub use namespace::NamespacedCache;
pub use redis_backend::RedisCacheBackend;
