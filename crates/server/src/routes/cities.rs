use axum::{extract::State, routing::get, Json, Router};
use uuid::Uuid;

use common::types::MessageResponse;
use models::city;
use service::city_service::{self, CityWithWashes, CreateCity, UpdateCity};

use crate::errors::JsonApiError;
use crate::extract::ApiPath;
use crate::routes::auth::ServerState;
use crate::validation::{finite, required, Validate, ValidatedJson, Violation};

impl Validate for CreateCity {
    fn validate(&self) -> Result<(), Violation> {
        required("name", &self.name)?;
        if let Some(lat) = self.lat { finite("lat", lat)?; }
        if let Some(lon) = self.lon { finite("lon", lon)?; }
        Ok(())
    }
}

impl Validate for UpdateCity {
    fn validate(&self) -> Result<(), Violation> {
        if let Some(name) = &self.name { required("name", name)?; }
        if let Some(lat) = self.lat { finite("lat", lat)?; }
        if let Some(lon) = self.lon { finite("lon", lon)?; }
        Ok(())
    }
}

pub fn router() -> Router<ServerState> {
    Router::new()
        .route("/", get(list).post(create))
        .route("/:id", get(get_one).put(update).delete(remove))
}

#[utoipa::path(get, path = "/api/cities", tag = "cities", security(("bearer" = [])),
    responses((status = 200, body = [crate::openapi::CityDoc]), (status = 401, body = crate::errors::ErrorBody)))]
pub async fn list(State(state): State<ServerState>) -> Result<Json<Vec<city::Model>>, JsonApiError> {
    Ok(Json(city_service::list_cities(&state.db).await?))
}

#[utoipa::path(post, path = "/api/cities", tag = "cities", security(("bearer" = [])),
    request_body = crate::openapi::CreateCityDoc,
    responses((status = 200, body = crate::openapi::CityDoc), (status = 400, body = crate::errors::ErrorBody)))]
pub async fn create(State(state): State<ServerState>, ValidatedJson(input): ValidatedJson<CreateCity>) -> Result<Json<city::Model>, JsonApiError> {
    Ok(Json(city_service::create_city(&state.db, input).await?))
}

#[utoipa::path(get, path = "/api/cities/{id}", tag = "cities", security(("bearer" = [])),
    params(("id" = Uuid, Path, description = "City id")),
    responses((status = 200, body = crate::openapi::CityWithWashesDoc), (status = 404, body = crate::errors::ErrorBody)))]
pub async fn get_one(State(state): State<ServerState>, ApiPath(id): ApiPath<Uuid>) -> Result<Json<CityWithWashes>, JsonApiError> {
    Ok(Json(city_service::get_city(&state.db, id).await?))
}

#[utoipa::path(put, path = "/api/cities/{id}", tag = "cities", security(("bearer" = [])),
    params(("id" = Uuid, Path, description = "City id")),
    request_body = crate::openapi::UpdateCityDoc,
    responses((status = 200, body = crate::openapi::CityDoc), (status = 404, body = crate::errors::ErrorBody)))]
pub async fn update(
    State(state): State<ServerState>,
    ApiPath(id): ApiPath<Uuid>,
    ValidatedJson(patch): ValidatedJson<UpdateCity>,
) -> Result<Json<city::Model>, JsonApiError> {
    Ok(Json(city_service::update_city(&state.db, id, patch).await?))
}

#[utoipa::path(delete, path = "/api/cities/{id}", tag = "cities", security(("bearer" = [])),
    params(("id" = Uuid, Path, description = "City id")),
    responses((status = 200, body = crate::openapi::MessageDoc), (status = 404, body = crate::errors::ErrorBody)))]
pub async fn remove(State(state): State<ServerState>, ApiPath(id): ApiPath<Uuid>) -> Result<Json<MessageResponse>, JsonApiError> {
    city_service::delete_city(&state.db, id).await?;
    Ok(Json(MessageResponse::new(format!("City with id {id} has been deleted"))))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn city_payload_rules() {
        let ok = CreateCity { name: "Москва".into(), lat: Some(55.75), lon: None };
        assert!(ok.validate().is_ok());
        let blank = CreateCity { name: "  ".into(), lat: None, lon: None };
        assert_eq!(blank.validate().unwrap_err().field, "name");
        let patch = UpdateCity { name: None, lat: Some(f64::INFINITY), lon: None };
        assert_eq!(patch.validate().unwrap_err().field, "lat");
        assert!(UpdateCity::default().validate().is_ok());
    }
}
