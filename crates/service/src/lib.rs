//! Service layer providing business operations on top of models.
//! - Separates business logic from data access.
//! - Reuses validation and entity definitions in `models` crate.
//! - Provides clear error types and documented interfaces.

pub mod errors;
pub mod auth;
pub mod runtime;
pub mod uploads;
pub mod collation;
pub mod projection;
pub mod city_service;
pub mod wash_service;
pub mod stories;
pub mod post_service;
pub mod user_service;
#[cfg(test)]
pub mod test_support;
