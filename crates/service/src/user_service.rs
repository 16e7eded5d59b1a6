use uuid::Uuid;
use chrono::Utc;
use sea_orm::{
    sea_query::OnConflict, ColumnTrait, DatabaseConnection, EntityTrait, LoaderTrait, ModelTrait,
    QueryFilter, QueryOrder, Set,
};
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::{info, instrument};

use models::{post, user, user_favorite, wash};
use crate::{errors::ServiceError, projection::{ProfileField, UserSelection}};

#[derive(Debug, Clone, Serialize)]
pub struct WashRef {
    pub id: Uuid,
    pub name: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct FavoritePost {
    pub id: Uuid,
    pub address: String,
    pub description: String,
    pub wash: Option<WashRef>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FavoriteToggle {
    pub post_id: Uuid,
    pub is_favorite: bool,
}

async fn find_user(db: &DatabaseConnection, id: Uuid) -> Result<user::Model, ServiceError> {
    user::Entity::find_by_id(id)
        .one(db).await.map_err(|e| ServiceError::Db(e.to_string()))?
        .ok_or_else(|| ServiceError::not_found("User"))
}

/// Favorited posts of a user with a reference to their wash.
pub async fn list_favorites(db: &DatabaseConnection, u: &user::Model) -> Result<Vec<FavoritePost>, ServiceError> {
    let posts = u
        .find_related(post::Entity)
        .order_by_asc(post::Column::CreatedAt)
        .all(db).await.map_err(|e| ServiceError::Db(e.to_string()))?;
    let washes = posts.load_one(wash::Entity, db).await.map_err(|e| ServiceError::Db(e.to_string()))?;
    Ok(posts
        .into_iter()
        .zip(washes)
        .map(|(p, w)| FavoritePost {
            id: p.id,
            address: p.address,
            description: p.description,
            wash: w.map(|w| WashRef { id: w.id, name: w.name }),
        })
        .collect())
}

/// Profile of a user restricted to `selection`. Favorites are only loaded when selected.
#[instrument(skip(db, selection))]
pub async fn get_profile(db: &DatabaseConnection, user_id: Uuid, selection: &UserSelection) -> Result<Map<String, Value>, ServiceError> {
    let u = find_user(db, user_id).await?;
    let favorites = if selection.contains(ProfileField::Favorites) {
        Some(list_favorites(db, &u).await?)
    } else {
        None
    };
    let mut full = match serde_json::to_value(&u).map_err(|e| ServiceError::Db(e.to_string()))? {
        Value::Object(map) => map,
        _ => Map::new(),
    };
    if let Some(favorites) = favorites {
        full.insert("favorites".into(), serde_json::to_value(favorites).map_err(|e| ServiceError::Db(e.to_string()))?);
    }
    Ok(selection.project(full))
}

/// Flip the favorite state of a post for a user.
#[instrument(skip(db))]
pub async fn toggle_favorite(db: &DatabaseConnection, user_id: Uuid, post_id: Uuid) -> Result<FavoriteToggle, ServiceError> {
    find_user(db, user_id).await?;
    post::Entity::find_by_id(post_id)
        .one(db).await.map_err(|e| ServiceError::Db(e.to_string()))?
        .ok_or_else(|| ServiceError::not_found("Post"))?;

    let existing = user_favorite::Entity::find_by_id((user_id, post_id))
        .one(db).await.map_err(|e| ServiceError::Db(e.to_string()))?;
    let is_favorite = if existing.is_some() {
        user_favorite::Entity::delete_many()
            .filter(user_favorite::Column::UserId.eq(user_id))
            .filter(user_favorite::Column::PostId.eq(post_id))
            .exec(db).await.map_err(|e| ServiceError::Db(e.to_string()))?;
        false
    } else {
        let am = user_favorite::ActiveModel {
            user_id: Set(user_id),
            post_id: Set(post_id),
            created_at: Set(Utc::now().into()),
        };
        user_favorite::Entity::insert(am)
            .on_conflict(
                OnConflict::columns([user_favorite::Column::UserId, user_favorite::Column::PostId])
                    .do_nothing()
                    .to_owned(),
            )
            .exec_without_returning(db)
            .await
            .map_err(|e| ServiceError::Db(e.to_string()))?;
        true
    };
    info!(user_id = %user_id, post_id = %post_id, is_favorite, event = "favorite_toggled", "favorite toggled");
    Ok(FavoriteToggle { post_id, is_favorite })
}
