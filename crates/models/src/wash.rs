use sea_orm::{entity::prelude::*, Set, ConnectionTrait};
use uuid::Uuid;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::errors;
use crate::{city, post, price, story, wash_user};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "wash")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(column_type = "Text")]
    pub name: String,
    pub picture: Option<String>,
    pub city_id: Option<Uuid>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation {
    City,
    Post,
    Price,
    Story,
    WashUser,
}

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::City => Entity::belongs_to(city::Entity)
                .from(Column::CityId)
                .to(city::Column::Id)
                .on_delete(ForeignKeyAction::SetNull)
                .into(),
            Relation::Post => Entity::has_many(post::Entity).into(),
            Relation::Price => Entity::has_many(price::Entity).into(),
            Relation::Story => Entity::has_many(story::Entity).into(),
            Relation::WashUser => Entity::has_many(wash_user::Entity).into(),
        }
    }
}

impl Related<city::Entity> for Entity {
    fn to() -> RelationDef { Relation::City.def() }
}

impl Related<post::Entity> for Entity {
    fn to() -> RelationDef { Relation::Post.def() }
}

impl Related<price::Entity> for Entity {
    fn to() -> RelationDef { Relation::Price.def() }
}

impl Related<story::Entity> for Entity {
    fn to() -> RelationDef { Relation::Story.def() }
}

impl Related<wash_user::Entity> for Entity {
    fn to() -> RelationDef { Relation::WashUser.def() }
}

impl ActiveModelBehavior for ActiveModel {}

pub async fn create<C: ConnectionTrait>(db: &C, name: &str, picture: Option<String>, city_id: Option<Uuid>) -> Result<Model, errors::ModelError> {
    if name.trim().is_empty() { return Err(errors::ModelError::Validation("name required".into())); }
    let now = Utc::now().into();
    let am = ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set(name.to_string()),
        picture: Set(picture),
        city_id: Set(city_id),
        created_at: Set(now),
        updated_at: Set(now),
    };
    am.insert(db).await.map_err(|e| errors::ModelError::Db(e.to_string()))
}
