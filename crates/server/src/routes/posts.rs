use axum::{extract::State, routing::post, Json, Router};
use serde::Deserialize;
use uuid::Uuid;

use models::post::{self, NewPost};
use service::post_service;

use crate::errors::JsonApiError;
use crate::extract::ApiPath;
use crate::routes::auth::ServerState;
use crate::validation::{finite, required, Validate, ValidatedJson, Violation};

/// Body of `POST /api/posts/:washId`. Older clients send `shedule`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePostRequest {
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, alias = "shedule")]
    pub schedule: String,
    pub lat: f64,
    pub lon: f64,
    #[serde(rename = "box")]
    pub box_count: i32,
    pub distance: Option<i32>,
    pub pictures: Option<String>,
}

impl Validate for CreatePostRequest {
    fn validate(&self) -> Result<(), Violation> {
        required("address", &self.address)?;
        required("description", &self.description)?;
        required("schedule", &self.schedule)?;
        finite("lat", self.lat)?;
        finite("lon", self.lon)
    }
}

impl From<CreatePostRequest> for NewPost {
    fn from(r: CreatePostRequest) -> Self {
        NewPost {
            address: r.address,
            description: r.description,
            schedule: r.schedule,
            lat: r.lat,
            lon: r.lon,
            box_count: r.box_count,
            distance: r.distance,
            pictures: r.pictures,
        }
    }
}

pub fn router() -> Router<ServerState> {
    Router::new().route("/:id", post(create))
}

#[utoipa::path(post, path = "/api/posts/{washId}", tag = "posts", security(("bearer" = [])),
    params(("washId" = Uuid, Path,)),
    request_body = crate::openapi::CreatePostDoc,
    responses((status = 200, body = crate::openapi::PostDoc), (status = 404, body = crate::errors::ErrorBody)))]
pub async fn create(
    State(state): State<ServerState>,
    ApiPath(wash_id): ApiPath<Uuid>,
    ValidatedJson(input): ValidatedJson<CreatePostRequest>,
) -> Result<Json<post::Model>, JsonApiError> {
    Ok(Json(post_service::create_post(&state.db, wash_id, input.into()).await?))
}
