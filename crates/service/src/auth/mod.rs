//! Auth module: three-layer architecture (domain, repository, service).
//!
//! Phone + PIN registration and login, OTP issue/verify, and JWT access/refresh tokens.
//! `token` and `otp` hold the collaborators the service is assembled from.

pub mod domain;
pub mod errors;
pub mod repository;
pub mod service;
pub mod repo;
pub mod token;
pub mod otp;

pub use service::AuthService;
