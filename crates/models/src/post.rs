use sea_orm::{entity::prelude::*, Set, ConnectionTrait};
use uuid::Uuid;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::errors;
use crate::{user, user_favorite, wash};

/// A physical location (address + boxes) belonging to a wash.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "post")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(column_type = "Text")]
    pub address: String,
    #[sea_orm(column_type = "Text")]
    pub description: String,
    #[sea_orm(column_type = "Text")]
    pub schedule: String,
    #[sea_orm(column_type = "Double")]
    pub lat: f64,
    #[sea_orm(column_type = "Double")]
    pub lon: f64,
    #[sea_orm(column_name = "box")]
    #[serde(rename = "box")]
    pub box_count: i32,
    pub distance: Option<i32>,
    #[sea_orm(column_type = "Text", nullable)]
    pub pictures: Option<String>,
    pub wash_id: Uuid,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation {
    Wash,
    Favorite,
}

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::Wash => Entity::belongs_to(wash::Entity)
                .from(Column::WashId)
                .to(wash::Column::Id)
                .on_delete(ForeignKeyAction::Cascade)
                .into(),
            Relation::Favorite => Entity::has_many(user_favorite::Entity).into(),
        }
    }
}

impl Related<wash::Entity> for Entity {
    fn to() -> RelationDef { Relation::Wash.def() }
}

impl Related<user_favorite::Entity> for Entity {
    fn to() -> RelationDef { Relation::Favorite.def() }
}

impl Related<user::Entity> for Entity {
    fn to() -> RelationDef { user_favorite::Relation::User.def() }
    fn via() -> Option<RelationDef> { Some(user_favorite::Relation::Post.def().rev()) }
}

impl ActiveModelBehavior for ActiveModel {}

#[derive(Clone, Debug)]
pub struct NewPost {
    pub address: String,
    pub description: String,
    pub schedule: String,
    pub lat: f64,
    pub lon: f64,
    pub box_count: i32,
    pub distance: Option<i32>,
    pub pictures: Option<String>,
}

pub async fn create<C: ConnectionTrait>(db: &C, wash_id: Uuid, input: NewPost) -> Result<Model, errors::ModelError> {
    if input.address.trim().is_empty() { return Err(errors::ModelError::Validation("address required".into())); }
    let now = Utc::now().into();
    let am = ActiveModel {
        id: Set(Uuid::new_v4()),
        address: Set(input.address),
        description: Set(input.description),
        schedule: Set(input.schedule),
        lat: Set(input.lat),
        lon: Set(input.lon),
        box_count: Set(input.box_count),
        distance: Set(input.distance),
        pictures: Set(input.pictures),
        wash_id: Set(wash_id),
        created_at: Set(now),
        updated_at: Set(now),
    };
    am.insert(db).await.map_err(|e| errors::ModelError::Db(e.to_string()))
}
