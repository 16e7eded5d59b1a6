use std::sync::Arc;

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header, request::Parts, HeaderMap, Method},
    middleware::Next,
    response::Response,
    routing::post,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use sea_orm::DatabaseConnection;
use tracing::warn;
use uuid::Uuid;

use common::types::MessageResponse;
use service::auth::{
    domain::{AuthSession, LoginInput, RegisterInput},
    repository::AuthRepository,
    service::AuthService,
};

use crate::errors::JsonApiError;
use crate::validation::{phone, pin, required, Validate, ValidatedJson, Violation};

#[derive(Clone)]
pub struct ServerState {
    pub db: DatabaseConnection,
    pub auth: Arc<AuthService<dyn AuthRepository>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhoneRequest {
    #[serde(default)]
    pub phone_number: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    #[serde(default)]
    pub phone_number: String,
    #[serde(default)]
    pub pin: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    #[serde(default)]
    pub phone_number: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub pin: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyOtpRequest {
    #[serde(default)]
    pub phone_number: String,
    #[serde(default)]
    pub otp: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub pin: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResetPinRequest {
    #[serde(default)]
    pub phone_number: String,
    #[serde(default)]
    pub otp: String,
    #[serde(default)]
    pub new_pin: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshRequest {
    #[serde(default)]
    pub refresh_token: String,
}

impl Validate for PhoneRequest {
    fn validate(&self) -> Result<(), Violation> {
        phone("phoneNumber", &self.phone_number)
    }
}

impl Validate for LoginRequest {
    fn validate(&self) -> Result<(), Violation> {
        phone("phoneNumber", &self.phone_number)?;
        pin("pin", &self.pin)
    }
}

impl Validate for RegisterRequest {
    fn validate(&self) -> Result<(), Violation> {
        phone("phoneNumber", &self.phone_number)?;
        required("name", &self.name)?;
        pin("pin", &self.pin)
    }
}

impl Validate for VerifyOtpRequest {
    fn validate(&self) -> Result<(), Violation> {
        phone("phoneNumber", &self.phone_number)?;
        required("otp", &self.otp)?;
        required("name", &self.name)?;
        pin("pin", &self.pin)
    }
}

impl Validate for ResetPinRequest {
    fn validate(&self) -> Result<(), Violation> {
        phone("phoneNumber", &self.phone_number)?;
        required("otp", &self.otp)?;
        pin("newPin", &self.new_pin)
    }
}

impl Validate for RefreshRequest {
    fn validate(&self) -> Result<(), Violation> {
        // emptiness is reported by the service as a bad request
        Ok(())
    }
}

#[derive(Debug, Serialize)]
pub struct RegisterOutput {
    #[serde(flatten)]
    pub session: AuthSession,
    pub message: &'static str,
}

#[derive(Debug, Serialize)]
pub struct ExistsOutput {
    pub exists: bool,
}

pub fn router() -> Router<ServerState> {
    Router::new()
        .route("/send-otp", post(send_otp))
        .route("/send-registration-otp", post(send_registration_otp))
        .route("/verify-otp-and-set-new-password", post(verify_otp_and_set_new_password))
        .route("/login", post(login))
        .route("/register", post(register))
        .route("/verify-otp", post(verify_otp))
        .route("/check-user-exists", post(check_user_exists))
        .route("/access-token", post(access_token))
}

#[utoipa::path(post, path = "/api/auth/register", tag = "auth", request_body = crate::openapi::RegisterRequestDoc,
    responses((status = 200, body = crate::openapi::RegisterResponseDoc), (status = 400, body = crate::errors::ErrorBody)))]
pub async fn register(State(state): State<ServerState>, ValidatedJson(input): ValidatedJson<RegisterRequest>) -> Result<Json<RegisterOutput>, JsonApiError> {
    let session = state.auth
        .register(RegisterInput { phone_number: input.phone_number, name: input.name, pin: input.pin })
        .await?;
    Ok(Json(RegisterOutput { session, message: "Registration successful" }))
}

#[utoipa::path(post, path = "/api/auth/login", tag = "auth", request_body = crate::openapi::LoginRequestDoc,
    responses((status = 200, body = crate::openapi::SessionDoc), (status = 401, body = crate::errors::ErrorBody), (status = 404, body = crate::errors::ErrorBody)))]
pub async fn login(State(state): State<ServerState>, ValidatedJson(input): ValidatedJson<LoginRequest>) -> Result<Json<AuthSession>, JsonApiError> {
    let session = state.auth
        .login(LoginInput { phone_number: input.phone_number, pin: input.pin })
        .await?;
    Ok(Json(session))
}

#[utoipa::path(post, path = "/api/auth/send-otp", tag = "auth", request_body = crate::openapi::PhoneRequestDoc,
    responses((status = 200, body = crate::openapi::MessageDoc), (status = 404, body = crate::errors::ErrorBody), (status = 502, body = crate::errors::ErrorBody)))]
pub async fn send_otp(State(state): State<ServerState>, ValidatedJson(input): ValidatedJson<PhoneRequest>) -> Result<Json<MessageResponse>, JsonApiError> {
    state.auth.send_otp(&input.phone_number).await?;
    Ok(Json(MessageResponse::new("OTP sent successfully")))
}

#[utoipa::path(post, path = "/api/auth/send-registration-otp", tag = "auth", request_body = crate::openapi::PhoneRequestDoc,
    responses((status = 200, body = crate::openapi::MessageDoc), (status = 400, body = crate::errors::ErrorBody), (status = 502, body = crate::errors::ErrorBody)))]
pub async fn send_registration_otp(State(state): State<ServerState>, ValidatedJson(input): ValidatedJson<PhoneRequest>) -> Result<Json<MessageResponse>, JsonApiError> {
    state.auth.send_registration_otp(&input.phone_number).await?;
    Ok(Json(MessageResponse::new("OTP sent successfully")))
}

#[utoipa::path(post, path = "/api/auth/verify-otp-and-set-new-password", tag = "auth", request_body = crate::openapi::ResetPinRequestDoc,
    responses((status = 200, body = crate::openapi::MessageDoc), (status = 401, body = crate::errors::ErrorBody), (status = 404, body = crate::errors::ErrorBody)))]
pub async fn verify_otp_and_set_new_password(State(state): State<ServerState>, ValidatedJson(input): ValidatedJson<ResetPinRequest>) -> Result<Json<MessageResponse>, JsonApiError> {
    state.auth
        .verify_otp_and_set_new_pin(&input.phone_number, &input.otp, &input.new_pin)
        .await?;
    Ok(Json(MessageResponse::new("Password updated successfully")))
}

#[utoipa::path(post, path = "/api/auth/verify-otp", tag = "auth", request_body = crate::openapi::VerifyOtpRequestDoc,
    responses((status = 200, body = crate::openapi::RegisterResponseDoc), (status = 400, body = crate::errors::ErrorBody), (status = 401, body = crate::errors::ErrorBody)))]
pub async fn verify_otp(State(state): State<ServerState>, ValidatedJson(input): ValidatedJson<VerifyOtpRequest>) -> Result<Json<RegisterOutput>, JsonApiError> {
    let register = RegisterInput { phone_number: input.phone_number, name: input.name, pin: input.pin };
    let session = state.auth.verify_otp_and_register(register, &input.otp).await?;
    Ok(Json(RegisterOutput { session, message: "Registration successful" }))
}

#[utoipa::path(post, path = "/api/auth/check-user-exists", tag = "auth", request_body = crate::openapi::PhoneRequestDoc,
    responses((status = 200, body = crate::openapi::ExistsDoc)))]
pub async fn check_user_exists(State(state): State<ServerState>, ValidatedJson(input): ValidatedJson<PhoneRequest>) -> Result<Json<ExistsOutput>, JsonApiError> {
    let exists = state.auth.check_user_exists(&input.phone_number).await?;
    Ok(Json(ExistsOutput { exists }))
}

#[utoipa::path(post, path = "/api/auth/access-token", tag = "auth", request_body = crate::openapi::RefreshRequestDoc,
    responses((status = 200, body = crate::openapi::SessionDoc), (status = 400, body = crate::errors::ErrorBody), (status = 401, body = crate::errors::ErrorBody)))]
pub async fn access_token(State(state): State<ServerState>, ValidatedJson(input): ValidatedJson<RefreshRequest>) -> Result<Json<AuthSession>, JsonApiError> {
    let session = state.auth.refresh(&input.refresh_token).await?;
    Ok(Json(session))
}

/// Caller identity placed into request extensions by the bearer guard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CurrentUser {
    pub id: Uuid,
}

#[axum::async_trait]
impl<S: Send + Sync> FromRequestParts<S> for CurrentUser {
    type Rejection = JsonApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<CurrentUser>()
            .copied()
            .ok_or_else(|| JsonApiError::unauthorized("Unauthorized"))
    }
}

fn bearer_token(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let token = value.strip_prefix("Bearer ").or_else(|| value.strip_prefix("bearer "))?.trim();
    if token.is_empty() { None } else { Some(token.to_string()) }
}

/// Guard for protected routes: requires `Authorization: Bearer <access token>`.
/// Missing, malformed, expired and refresh tokens are all rejected with 401.
pub async fn require_bearer_token_state(
    State(state): State<ServerState>,
    mut req: Request,
    next: Next,
) -> Result<Response, JsonApiError> {
    // CORS preflight
    if req.method() == Method::OPTIONS {
        return Ok(next.run(req).await);
    }

    let Some(token) = bearer_token(req.headers()) else {
        warn!(path = %req.uri().path(), "missing bearer token");
        return Err(JsonApiError::unauthorized("Unauthorized"));
    };

    match state.auth.authenticate(&token) {
        Ok(claims) => {
            req.extensions_mut().insert(CurrentUser { id: claims.id });
            Ok(next.run(req).await)
        }
        Err(e) => {
            warn!(path = %req.uri().path(), err = %e, "token validation failed");
            Err(JsonApiError::unauthorized("Unauthorized"))
        }
    }
}
