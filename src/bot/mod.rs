//! Bot module - dispatcher wiring and runtime.

pub mod dispatcher;
mod runtime;

pub use dispatcher::build_dispatcher;
pub use runtime::run;
