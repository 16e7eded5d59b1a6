use uuid::Uuid;
use chrono::Utc;
use sea_orm::{DatabaseConnection, ActiveModelTrait, EntityTrait, ModelTrait, Set};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use models::{city, wash};
use crate::{collation, errors::ServiceError};

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCity {
    pub name: String,
    pub lat: Option<f64>,
    pub lon: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCity {
    pub name: Option<String>,
    pub lat: Option<f64>,
    pub lon: Option<f64>,
}

/// A city together with the washes located in it.
#[derive(Debug, Clone, Serialize)]
pub struct CityWithWashes {
    #[serde(flatten)]
    pub city: city::Model,
    pub washes: Vec<wash::Model>,
}

/// List all cities sorted by name in Russian collation order.
pub async fn list_cities(db: &DatabaseConnection) -> Result<Vec<city::Model>, ServiceError> {
    let mut cities = city::Entity::find().all(db).await.map_err(|e| ServiceError::Db(e.to_string()))?;
    collation::sort_by_name_ru(&mut cities, |c| c.name.as_str());
    Ok(cities)
}

pub async fn get_city(db: &DatabaseConnection, id: Uuid) -> Result<CityWithWashes, ServiceError> {
    let found = city::Entity::find_by_id(id)
        .one(db).await.map_err(|e| ServiceError::Db(e.to_string()))?
        .ok_or_else(|| ServiceError::not_found("City"))?;
    let washes = found.find_related(wash::Entity).all(db).await.map_err(|e| ServiceError::Db(e.to_string()))?;
    Ok(CityWithWashes { city: found, washes })
}

#[instrument(skip(db, input), fields(name = %input.name))]
pub async fn create_city(db: &DatabaseConnection, input: CreateCity) -> Result<city::Model, ServiceError> {
    let created = city::create(db, &input.name, input.lat, input.lon).await?;
    info!(city_id = %created.id, event = "city_created", "city created");
    Ok(created)
}

/// Apply the fields present in `patch`.
pub async fn update_city(db: &DatabaseConnection, id: Uuid, patch: UpdateCity) -> Result<city::Model, ServiceError> {
    let mut am: city::ActiveModel = city::Entity::find_by_id(id)
        .one(db).await.map_err(|e| ServiceError::Db(e.to_string()))?
        .ok_or_else(|| ServiceError::not_found("City"))?
        .into();
    if let Some(name) = patch.name {
        if name.trim().is_empty() {
            return Err(ServiceError::Validation("name must not be empty".into()));
        }
        am.name = Set(name);
    }
    if let Some(lat) = patch.lat {
        am.lat = Set(Some(lat));
    }
    if let Some(lon) = patch.lon {
        am.lon = Set(Some(lon));
    }
    am.updated_at = Set(Utc::now().into());
    let updated = am.update(db).await.map_err(|e| ServiceError::Db(e.to_string()))?;
    Ok(updated)
}

/// Delete a city. Its washes stay, detached from any city.
#[instrument(skip(db))]
pub async fn delete_city(db: &DatabaseConnection, id: Uuid) -> Result<(), ServiceError> {
    let res = city::Entity::delete_by_id(id).exec(db).await.map_err(|e| ServiceError::Db(e.to_string()))?;
    if res.rows_affected == 0 {
        return Err(ServiceError::not_found("City"));
    }
    info!(city_id = %id, event = "city_deleted", "city deleted");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::get_db;

    #[tokio::test]
    async fn city_crud_service() -> Result<(), anyhow::Error> {
        let Some(db) = get_db().await? else { return Ok(()) };

        let tag = Uuid::new_v4().simple().to_string();
        let a = create_city(&db, CreateCity { name: format!("Zeta {}", tag), lat: None, lon: None }).await?;
        let b = create_city(&db, CreateCity { name: format!("Аксай {}", tag), lat: Some(47.2), lon: Some(39.8) }).await?;

        let all = list_cities(&db).await?;
        let pos_a = all.iter().position(|c| c.id == a.id).unwrap();
        let pos_b = all.iter().position(|c| c.id == b.id).unwrap();
        assert!(pos_b < pos_a, "cyrillic name should sort first");

        wash::create(&db, "City wash", None, Some(b.id)).await?;
        let with_washes = get_city(&db, b.id).await?;
        assert_eq!(with_washes.washes.len(), 1);

        let updated = update_city(&db, a.id, UpdateCity { lat: Some(1.5), ..Default::default() }).await?;
        assert_eq!(updated.lat, Some(1.5));
        assert_eq!(updated.name, a.name);

        delete_city(&db, a.id).await?;
        assert!(matches!(delete_city(&db, a.id).await, Err(ServiceError::NotFound(_))));
        assert!(matches!(get_city(&db, a.id).await, Err(ServiceError::NotFound(_))));
        assert!(matches!(update_city(&db, a.id, UpdateCity::default()).await, Err(ServiceError::NotFound(_))));

        let detached = with_washes.washes[0].id;
        delete_city(&db, b.id).await?;
        wash::Entity::delete_by_id(detached).exec(&db).await?;
        Ok(())
    }
}
