use thiserror::Error;

/// Business errors for auth workflows
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("validation failed: {0}")]
    Validation(String),
    #[error("User already exists")]
    Conflict,
    #[error("User not found")]
    NotFound,
    #[error("Invalid credentials")]
    Unauthorized,
    #[error("Invalid OTP")]
    InvalidOtp,
    #[error("Invalid token")]
    InvalidToken,
    #[error("hashing error: {0}")]
    HashError(String),
    #[error("token error: {0}")]
    TokenError(String),
    #[error("sms delivery failed: {0}")]
    Delivery(String),
    #[error("repository error: {0}")]
    Repository(String),
}

impl AuthError {
    /// Stable numeric code for external mapping/logging
    pub fn code(&self) -> u16 {
        match self {
            AuthError::Validation(_) => 1001,
            AuthError::Conflict => 1002,
            AuthError::NotFound => 1003,
            AuthError::Unauthorized => 1004,
            AuthError::InvalidOtp => 1005,
            AuthError::InvalidToken => 1006,
            AuthError::HashError(_) => 1101,
            AuthError::TokenError(_) => 1102,
            AuthError::Delivery(_) => 1103,
            AuthError::Repository(_) => 1200,
        }
    }
}
