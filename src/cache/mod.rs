//! In-memory caching built on Moka.
//!
//! Repositories mirror their collections in a [`TypedCache`]; the cache
//! is only written after a confirmed durable write, so a crash mid-write
//! never leaves it ahead of storage.

mod config;
mod typed;

pub use config::CacheConfig;
pub use typed::TypedCache;
