use sea_orm::{entity::prelude::*, Set, ConnectionTrait};
use uuid::Uuid;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::errors;
use crate::wash;

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    #[sea_orm(string_value = "image")]
    Image,
    #[sea_orm(string_value = "video")]
    Video,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "story")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(column_type = "Text")]
    pub media_url: String,
    pub media_type: MediaType,
    pub duration: i32,
    pub wash_id: Uuid,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation {
    Wash,
}

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::Wash => Entity::belongs_to(wash::Entity)
                .from(Column::WashId)
                .to(wash::Column::Id)
                .on_delete(ForeignKeyAction::Cascade)
                .into(),
        }
    }
}

impl Related<wash::Entity> for Entity {
    fn to() -> RelationDef { Relation::Wash.def() }
}

impl ActiveModelBehavior for ActiveModel {}

pub async fn create<C: ConnectionTrait>(db: &C, wash_id: Uuid, media_url: &str, media_type: MediaType, duration: i32) -> Result<Model, errors::ModelError> {
    if media_url.trim().is_empty() { return Err(errors::ModelError::Validation("media url required".into())); }
    if duration <= 0 { return Err(errors::ModelError::Validation("duration must be positive".into())); }
    let am = ActiveModel {
        id: Set(Uuid::new_v4()),
        media_url: Set(media_url.to_string()),
        media_type: Set(media_type),
        duration: Set(duration),
        wash_id: Set(wash_id),
        created_at: Set(Utc::now().into()),
    };
    am.insert(db).await.map_err(|e| errors::ModelError::Db(e.to_string()))
}
