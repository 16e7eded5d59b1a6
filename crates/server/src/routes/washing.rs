use axum::{extract::State, routing::{get, post}, Json, Router};
use serde::Deserialize;
use uuid::Uuid;

use common::types::MessageResponse;
use models::{price, story, wash, wash_user};
use service::stories::{self, CreateStory, StoryGroup, WashStories};
use service::wash_service::{self, BalanceUpdate, CreatePrice, CreateWash, UpdateWash, WashDetails, WashForUser};

use crate::errors::JsonApiError;
use crate::extract::{ApiPath, ApiQuery};
use crate::routes::auth::ServerState;
use crate::validation::{finite, non_negative, positive_int, required, Validate, ValidatedJson, Violation};

impl Validate for CreateWash {
    fn validate(&self) -> Result<(), Violation> {
        required("name", &self.name)
    }
}

impl Validate for UpdateWash {
    fn validate(&self) -> Result<(), Violation> {
        if let Some(name) = &self.name { required("name", name)?; }
        for patch in self.posts.iter().flatten() {
            if let Some(address) = &patch.address { required("posts.address", address)?; }
        }
        Ok(())
    }
}

impl Validate for BalanceUpdate {
    fn validate(&self) -> Result<(), Violation> {
        finite("balance", self.balance)?;
        finite("bonus", self.bonus)
    }
}

impl Validate for CreatePrice {
    fn validate(&self) -> Result<(), Violation> {
        required("serviceName", &self.service_name)?;
        non_negative("price", self.price)
    }
}

impl Validate for CreateStory {
    fn validate(&self) -> Result<(), Violation> {
        required("mediaUrl", &self.media_url)?;
        positive_int("duration", self.duration)
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchQuery {
    pub search_term: Option<String>,
}

pub fn router() -> Router<ServerState> {
    Router::new()
        .route("/", get(list).post(create))
        .route("/stories/grouped", get(grouped_stories))
        .route("/city/:city_id/:user_id", get(by_city))
        .route("/balance/:user_id/:wash_id", get(get_balance).put(update_balance))
        .route("/prices/:id", post(add_price).get(list_prices))
        .route("/:id", get(get_one).put(update).delete(remove))
        .route("/:id/stories", post(create_story).get(list_stories))
        .route("/:id/stories-with-info", get(stories_with_info))
}

#[utoipa::path(get, path = "/api/washing", tag = "washing", security(("bearer" = [])),
    params(("searchTerm" = Option<String>, Query, description = "Case-insensitive substring of the wash name")),
    responses((status = 200, body = [crate::openapi::WashDetailsDoc])))]
pub async fn list(State(state): State<ServerState>, ApiQuery(q): ApiQuery<SearchQuery>) -> Result<Json<Vec<WashDetails>>, JsonApiError> {
    Ok(Json(wash_service::list_washes(&state.db, q.search_term.as_deref()).await?))
}

#[utoipa::path(post, path = "/api/washing", tag = "washing", security(("bearer" = [])),
    request_body = crate::openapi::CreateWashDoc,
    responses((status = 200, body = crate::openapi::WashDoc), (status = 404, body = crate::errors::ErrorBody)))]
pub async fn create(State(state): State<ServerState>, ValidatedJson(input): ValidatedJson<CreateWash>) -> Result<Json<wash::Model>, JsonApiError> {
    Ok(Json(wash_service::create_wash(&state.db, input).await?))
}

#[utoipa::path(get, path = "/api/washing/city/{cityId}/{userId}", tag = "washing", security(("bearer" = [])),
    params(("cityId" = Uuid, Path,), ("userId" = Uuid, Path,)),
    responses((status = 200, body = [crate::openapi::WashForUserDoc]), (status = 404, body = crate::errors::ErrorBody)))]
pub async fn by_city(State(state): State<ServerState>, ApiPath((city_id, user_id)): ApiPath<(Uuid, Uuid)>) -> Result<Json<Vec<WashForUser>>, JsonApiError> {
    Ok(Json(wash_service::washes_by_city(&state.db, city_id, user_id).await?))
}

#[utoipa::path(get, path = "/api/washing/{id}", tag = "washing", security(("bearer" = [])),
    params(("id" = Uuid, Path,)),
    responses((status = 200, body = crate::openapi::WashDetailsDoc), (status = 404, body = crate::errors::ErrorBody)))]
pub async fn get_one(State(state): State<ServerState>, ApiPath(id): ApiPath<Uuid>) -> Result<Json<WashDetails>, JsonApiError> {
    Ok(Json(wash_service::get_wash(&state.db, id).await?))
}

#[utoipa::path(put, path = "/api/washing/{id}", tag = "washing", security(("bearer" = [])),
    params(("id" = Uuid, Path,)),
    request_body = crate::openapi::UpdateWashDoc,
    responses((status = 200, body = crate::openapi::WashDetailsDoc), (status = 404, body = crate::errors::ErrorBody)))]
pub async fn update(
    State(state): State<ServerState>,
    ApiPath(id): ApiPath<Uuid>,
    ValidatedJson(patch): ValidatedJson<UpdateWash>,
) -> Result<Json<WashDetails>, JsonApiError> {
    Ok(Json(wash_service::update_wash(&state.db, id, patch).await?))
}

#[utoipa::path(delete, path = "/api/washing/{id}", tag = "washing", security(("bearer" = [])),
    params(("id" = Uuid, Path,)),
    responses((status = 200, body = crate::openapi::MessageDoc), (status = 404, body = crate::errors::ErrorBody)))]
pub async fn remove(State(state): State<ServerState>, ApiPath(id): ApiPath<Uuid>) -> Result<Json<MessageResponse>, JsonApiError> {
    wash_service::delete_wash(&state.db, id).await?;
    Ok(Json(MessageResponse::new(format!("Wash with id {id} has been deleted"))))
}

#[utoipa::path(get, path = "/api/washing/balance/{userId}/{washId}", tag = "washing", security(("bearer" = [])),
    params(("userId" = Uuid, Path,), ("washId" = Uuid, Path,)),
    responses((status = 200, body = crate::openapi::WashUserDoc), (status = 404, body = crate::errors::ErrorBody)))]
pub async fn get_balance(State(state): State<ServerState>, ApiPath((user_id, wash_id)): ApiPath<(Uuid, Uuid)>) -> Result<Json<wash_user::Model>, JsonApiError> {
    Ok(Json(wash_service::get_user_balance(&state.db, user_id, wash_id).await?))
}

#[utoipa::path(put, path = "/api/washing/balance/{userId}/{washId}", tag = "washing", security(("bearer" = [])),
    params(("userId" = Uuid, Path,), ("washId" = Uuid, Path,)),
    request_body = crate::openapi::BalanceUpdateDoc,
    responses((status = 200, body = crate::openapi::WashUserDoc), (status = 404, body = crate::errors::ErrorBody)))]
pub async fn update_balance(
    State(state): State<ServerState>,
    ApiPath((user_id, wash_id)): ApiPath<(Uuid, Uuid)>,
    ValidatedJson(input): ValidatedJson<BalanceUpdate>,
) -> Result<Json<wash_user::Model>, JsonApiError> {
    Ok(Json(wash_service::update_user_balance(&state.db, user_id, wash_id, input).await?))
}

#[utoipa::path(post, path = "/api/washing/prices/{washId}", tag = "washing", security(("bearer" = [])),
    params(("washId" = Uuid, Path,)),
    request_body = crate::openapi::CreatePriceDoc,
    responses((status = 200, body = crate::openapi::PriceDoc), (status = 404, body = crate::errors::ErrorBody)))]
pub async fn add_price(
    State(state): State<ServerState>,
    ApiPath(wash_id): ApiPath<Uuid>,
    ValidatedJson(input): ValidatedJson<CreatePrice>,
) -> Result<Json<price::Model>, JsonApiError> {
    Ok(Json(wash_service::add_price(&state.db, wash_id, input).await?))
}

#[utoipa::path(get, path = "/api/washing/prices/{washId}", tag = "washing", security(("bearer" = [])),
    params(("washId" = Uuid, Path,)),
    responses((status = 200, body = [crate::openapi::PriceDoc]), (status = 404, body = crate::errors::ErrorBody)))]
pub async fn list_prices(State(state): State<ServerState>, ApiPath(wash_id): ApiPath<Uuid>) -> Result<Json<Vec<price::Model>>, JsonApiError> {
    Ok(Json(wash_service::list_prices(&state.db, wash_id).await?))
}

#[utoipa::path(post, path = "/api/washing/{washId}/stories", tag = "stories", security(("bearer" = [])),
    params(("washId" = Uuid, Path,)),
    request_body = crate::openapi::CreateStoryDoc,
    responses((status = 200, body = crate::openapi::StoryDoc), (status = 404, body = crate::errors::ErrorBody)))]
pub async fn create_story(
    State(state): State<ServerState>,
    ApiPath(wash_id): ApiPath<Uuid>,
    ValidatedJson(input): ValidatedJson<CreateStory>,
) -> Result<Json<story::Model>, JsonApiError> {
    Ok(Json(stories::create_story(&state.db, wash_id, input).await?))
}

#[utoipa::path(get, path = "/api/washing/{washId}/stories", tag = "stories", security(("bearer" = [])),
    params(("washId" = Uuid, Path,)),
    responses((status = 200, body = [crate::openapi::StoryDoc])))]
pub async fn list_stories(State(state): State<ServerState>, ApiPath(wash_id): ApiPath<Uuid>) -> Result<Json<Vec<story::Model>>, JsonApiError> {
    Ok(Json(stories::stories_by_wash(&state.db, wash_id).await?))
}

#[utoipa::path(get, path = "/api/washing/{washId}/stories-with-info", tag = "stories", security(("bearer" = [])),
    params(("washId" = Uuid, Path,)),
    responses((status = 200, body = crate::openapi::WashStoriesDoc), (status = 404, body = crate::errors::ErrorBody)))]
pub async fn stories_with_info(State(state): State<ServerState>, ApiPath(wash_id): ApiPath<Uuid>) -> Result<Json<WashStories>, JsonApiError> {
    Ok(Json(stories::stories_with_wash_info(&state.db, wash_id).await?))
}

#[utoipa::path(get, path = "/api/washing/stories/grouped", tag = "stories", security(("bearer" = [])),
    responses((status = 200, body = [crate::openapi::StoryGroupDoc])))]
pub async fn grouped_stories(State(state): State<ServerState>) -> Result<Json<Vec<StoryGroup>>, JsonApiError> {
    Ok(Json(stories::grouped_stories(&state.db).await?))
}
