//! Request body validation. The first violation rejects the request with
//! `400` and `details: {field, code}`.

use axum::extract::{FromRequest, Request};
use axum::Json;
use serde::de::DeserializeOwned;

use crate::errors::JsonApiError;

/// Validation error codes for request failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    MissingField,
    InvalidLength,
    NotANumber,
    OutOfRange,
}

impl ErrorCode {
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorCode::MissingField => "missing_field",
            ErrorCode::InvalidLength => "invalid_length",
            ErrorCode::NotANumber => "not_a_number",
            ErrorCode::OutOfRange => "out_of_range",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Violation {
    pub field: &'static str,
    pub code: ErrorCode,
    pub message: String,
}

impl From<Violation> for JsonApiError {
    fn from(v: Violation) -> Self {
        JsonApiError::bad_request(v.message).with_details(v.field, v.code.as_str())
    }
}

pub trait Validate {
    fn validate(&self) -> Result<(), Violation>;
}

pub fn required(field: &'static str, value: &str) -> Result<(), Violation> {
    if value.trim().is_empty() {
        return Err(Violation { field, code: ErrorCode::MissingField, message: format!("{field} is required") });
    }
    Ok(())
}

pub fn pin(field: &'static str, value: &str) -> Result<(), Violation> {
    required(field, value)?;
    if value.chars().count() != service::auth::service::PIN_LENGTH {
        return Err(Violation {
            field,
            code: ErrorCode::InvalidLength,
            message: format!("{field} must be exactly {} characters", service::auth::service::PIN_LENGTH),
        });
    }
    Ok(())
}

pub fn phone(field: &'static str, value: &str) -> Result<(), Violation> {
    required(field, value)?;
    let max = service::auth::service::PHONE_MAX_LENGTH;
    if value.chars().count() > max {
        return Err(Violation { field, code: ErrorCode::InvalidLength, message: format!("{field} must be at most {max} characters") });
    }
    Ok(())
}

pub fn finite(field: &'static str, value: f64) -> Result<(), Violation> {
    if !value.is_finite() {
        return Err(Violation { field, code: ErrorCode::NotANumber, message: format!("{field} must be a number") });
    }
    Ok(())
}

pub fn non_negative(field: &'static str, value: f64) -> Result<(), Violation> {
    finite(field, value)?;
    if value < 0.0 {
        return Err(Violation { field, code: ErrorCode::OutOfRange, message: format!("{field} must not be negative") });
    }
    Ok(())
}

pub fn positive_int(field: &'static str, value: i32) -> Result<(), Violation> {
    if value <= 0 {
        return Err(Violation { field, code: ErrorCode::OutOfRange, message: format!("{field} must be positive") });
    }
    Ok(())
}

/// JSON body that is deserialized and then validated.
pub struct ValidatedJson<T>(pub T);

#[axum::async_trait]
impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = JsonApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await?;
        value.validate()?;
        Ok(Self(value))
    }
}
