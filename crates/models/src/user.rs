use sea_orm::{entity::prelude::*, Set, ConnectionTrait};
use uuid::Uuid;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::errors;
use crate::{post, user_favorite, wash_user};

/// Application user. Identified by phone number; `pin` stores an argon2 hash and is never serialised.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "user")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub phone_number: String,
    #[sea_orm(column_type = "Text")]
    pub name: String,
    #[serde(skip_serializing, default)]
    pub pin: String,
    pub picture: String,
    #[sea_orm(column_type = "Double")]
    pub balance: f64,
    #[sea_orm(column_type = "Double")]
    pub cashback: f64,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation {
    Favorite,
    WashUser,
}

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::Favorite => Entity::has_many(user_favorite::Entity).into(),
            Relation::WashUser => Entity::has_many(wash_user::Entity).into(),
        }
    }
}

impl Related<user_favorite::Entity> for Entity {
    fn to() -> RelationDef { Relation::Favorite.def() }
}

impl Related<wash_user::Entity> for Entity {
    fn to() -> RelationDef { Relation::WashUser.def() }
}

impl Related<post::Entity> for Entity {
    fn to() -> RelationDef { user_favorite::Relation::Post.def() }
    fn via() -> Option<RelationDef> { Some(user_favorite::Relation::User.def().rev()) }
}

impl ActiveModelBehavior for ActiveModel {}

/// Input for [`create`]; `pin` must already be hashed.
#[derive(Clone, Debug)]
pub struct NewUser {
    pub phone_number: String,
    pub name: String,
    pub pin_hash: String,
    pub picture: String,
}

pub async fn create<C: ConnectionTrait>(db: &C, input: NewUser) -> Result<Model, errors::ModelError> {
    if input.phone_number.trim().is_empty() { return Err(errors::ModelError::Validation("phone number required".into())); }
    if input.name.trim().is_empty() { return Err(errors::ModelError::Validation("name required".into())); }
    let now = Utc::now().into();
    let am = ActiveModel {
        id: Set(Uuid::new_v4()),
        phone_number: Set(input.phone_number),
        name: Set(input.name),
        pin: Set(input.pin_hash),
        picture: Set(input.picture),
        balance: Set(0.0),
        cashback: Set(0.0),
        created_at: Set(now),
        updated_at: Set(now),
    };
    am.insert(db).await.map_err(|e| errors::ModelError::Db(e.to_string()))
}

pub async fn find_by_phone<C: ConnectionTrait>(db: &C, phone_number: &str) -> Result<Option<Model>, errors::ModelError> {
    Entity::find()
        .filter(Column::PhoneNumber.eq(phone_number))
        .one(db)
        .await
        .map_err(|e| errors::ModelError::Db(e.to_string()))
}

pub async fn set_pin<C: ConnectionTrait>(db: &C, id: Uuid, pin_hash: &str) -> Result<(), errors::ModelError> {
    let found = Entity::find_by_id(id)
        .one(db)
        .await
        .map_err(|e| errors::ModelError::Db(e.to_string()))?
        .ok_or_else(|| errors::ModelError::Validation("user not found".into()))?;
    let mut am: ActiveModel = found.into();
    am.pin = Set(pin_hash.to_string());
    am.updated_at = Set(Utc::now().into());
    am.update(db).await.map_err(|e| errors::ModelError::Db(e.to_string()))?;
    Ok(())
}

pub async fn set_picture<C: ConnectionTrait>(db: &C, id: Uuid, picture: &str) -> Result<(), errors::ModelError> {
    let found = Entity::find_by_id(id)
        .one(db)
        .await
        .map_err(|e| errors::ModelError::Db(e.to_string()))?
        .ok_or_else(|| errors::ModelError::Validation("user not found".into()))?;
    let mut am: ActiveModel = found.into();
    am.picture = Set(picture.to_string());
    am.updated_at = Set(Utc::now().into());
    am.update(db).await.map_err(|e| errors::ModelError::Db(e.to_string()))?;
    Ok(())
}
