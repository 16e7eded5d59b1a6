use axum::{extract::State, routing::{get, patch}, Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use service::projection::UserSelection;
use service::user_service::{self, FavoriteToggle};

use crate::errors::JsonApiError;
use crate::extract::{ApiPath, ApiQuery};
use crate::routes::auth::{CurrentUser, ServerState};

#[derive(Debug, Default, Deserialize)]
pub struct ProfileQuery {
    pub fields: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ToggleOutput {
    #[serde(flatten)]
    pub toggle: FavoriteToggle,
    pub message: &'static str,
}

pub fn router() -> Router<ServerState> {
    Router::new()
        .route("/profile", get(profile))
        .route("/profile/favorites/:post_id", patch(toggle_favorite))
}

#[utoipa::path(get, path = "/api/users/profile", tag = "users", security(("bearer" = [])),
    params(("fields" = Option<String>, Query, description = "Comma separated camelCase field names")),
    responses((status = 200, body = crate::openapi::ProfileDoc), (status = 400, body = crate::errors::ErrorBody), (status = 404, body = crate::errors::ErrorBody)))]
pub async fn profile(
    State(state): State<ServerState>,
    user: CurrentUser,
    ApiQuery(q): ApiQuery<ProfileQuery>,
) -> Result<Json<Map<String, Value>>, JsonApiError> {
    let selection = UserSelection::parse(q.fields.as_deref())?;
    Ok(Json(user_service::get_profile(&state.db, user.id, &selection).await?))
}

#[utoipa::path(patch, path = "/api/users/profile/favorites/{postId}", tag = "users", security(("bearer" = [])),
    params(("postId" = Uuid, Path,)),
    responses((status = 200, body = crate::openapi::FavoriteToggleDoc), (status = 404, body = crate::errors::ErrorBody)))]
pub async fn toggle_favorite(
    State(state): State<ServerState>,
    user: CurrentUser,
    ApiPath(post_id): ApiPath<Uuid>,
) -> Result<Json<ToggleOutput>, JsonApiError> {
    let toggle = user_service::toggle_favorite(&state.db, user.id, post_id).await?;
    Ok(Json(ToggleOutput { toggle, message: "Success" }))
}
