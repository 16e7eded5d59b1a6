//! Shared runtime helpers: logging setup, startup directory checks and the
//! small response types every HTTP surface reuses.

pub mod types;
pub mod utils;
pub mod env;
