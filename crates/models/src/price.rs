use sea_orm::{entity::prelude::*, Set, ConnectionTrait};
use uuid::Uuid;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::errors;
use crate::wash;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "price")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(column_type = "Text")]
    pub service_name: String,
    #[sea_orm(column_type = "Double")]
    pub price: f64,
    pub wash_id: Uuid,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
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

pub async fn create<C: ConnectionTrait>(db: &C, wash_id: Uuid, service_name: &str, price: f64) -> Result<Model, errors::ModelError> {
    if service_name.trim().is_empty() { return Err(errors::ModelError::Validation("service name required".into())); }
    if !price.is_finite() || price < 0.0 { return Err(errors::ModelError::Validation("price must be a non-negative number".into())); }
    let now = Utc::now().into();
    let am = ActiveModel {
        id: Set(Uuid::new_v4()),
        service_name: Set(service_name.to_string()),
        price: Set(price),
        wash_id: Set(wash_id),
        created_at: Set(now),
        updated_at: Set(now),
    };
    am.insert(db).await.map_err(|e| errors::ModelError::Db(e.to_string()))
}
