//! Admin permission checking with caching.

mod checker;

pub use checker::Permissions;
