//! Repositories: durable persistence with write-through caching.
//!
//! Each repository owns one collection. Reads are served from the cache
//! when possible; writes hit the database first and only then update the
//! cache, so the cache can never run ahead of storage.

mod banned_term_repo;
mod group_config_repo;
mod warning_repo;

pub use banned_term_repo::BannedTermRepo;
pub use group_config_repo::GroupConfigRepo;
pub use warning_repo::WarningRepo;
