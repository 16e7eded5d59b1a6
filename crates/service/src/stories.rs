//! Promotional stories and the carousel projection shown by clients.
//!
//! Item and group ids in the projection are positional (1-based); database ids are not exposed.

use uuid::Uuid;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, LoaderTrait, QueryFilter, QueryOrder};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use models::story::{self, MediaType};
use models::wash;
use crate::{errors::ServiceError, wash_service::ensure_wash};

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateStory {
    pub media_url: String,
    pub media_type: MediaType,
    pub duration: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoryItem {
    pub id: usize,
    pub index: usize,
    pub media_url: String,
    pub media_type: MediaType,
    pub duration: i32,
    pub is_seen: bool,
    pub is_read_more: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WashStories {
    pub wash_id: Uuid,
    pub name: String,
    pub picture: Option<String>,
    pub stories: Vec<StoryItem>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoryGroup {
    pub id: usize,
    pub wash_id: Uuid,
    pub name: String,
    pub picture: Option<String>,
    pub is_seen: bool,
    pub stories: Vec<StoryItem>,
}

/// Number stories in the given order.
pub fn to_items(stories: &[story::Model]) -> Vec<StoryItem> {
    stories
        .iter()
        .enumerate()
        .map(|(index, s)| StoryItem {
            id: index + 1,
            index,
            media_url: s.media_url.clone(),
            media_type: s.media_type,
            duration: s.duration,
            is_seen: false,
            is_read_more: false,
        })
        .collect()
}

/// Build carousel groups, skipping washes without stories. Stories are sorted by creation time.
pub fn group_by_wash(washes: Vec<(wash::Model, Vec<story::Model>)>) -> Vec<StoryGroup> {
    washes
        .into_iter()
        .filter(|(_, stories)| !stories.is_empty())
        .enumerate()
        .map(|(i, (w, mut stories))| {
            stories.sort_by_key(|s| s.created_at);
            StoryGroup {
                id: i + 1,
                wash_id: w.id,
                name: w.name,
                picture: w.picture,
                is_seen: false,
                stories: to_items(&stories),
            }
        })
        .collect()
}

#[instrument(skip(db, input))]
pub async fn create_story(db: &DatabaseConnection, wash_id: Uuid, input: CreateStory) -> Result<story::Model, ServiceError> {
    ensure_wash(db, wash_id).await?;
    let created = story::create(db, wash_id, &input.media_url, input.media_type, input.duration).await?;
    info!(wash_id = %wash_id, story_id = %created.id, event = "story_created", "story created");
    Ok(created)
}

/// Raw story rows of a wash, oldest first.
pub async fn stories_by_wash(db: &DatabaseConnection, wash_id: Uuid) -> Result<Vec<story::Model>, ServiceError> {
    let stories = story::Entity::find()
        .filter(story::Column::WashId.eq(wash_id))
        .order_by_asc(story::Column::CreatedAt)
        .all(db).await.map_err(|e| ServiceError::Db(e.to_string()))?;
    Ok(stories)
}

pub async fn stories_with_wash_info(db: &DatabaseConnection, wash_id: Uuid) -> Result<WashStories, ServiceError> {
    let w = ensure_wash(db, wash_id).await?;
    let stories = stories_by_wash(db, wash_id).await?;
    Ok(WashStories { wash_id: w.id, name: w.name, picture: w.picture, stories: to_items(&stories) })
}

/// Every wash that has stories, in wash creation order.
pub async fn grouped_stories(db: &DatabaseConnection) -> Result<Vec<StoryGroup>, ServiceError> {
    let washes = wash::Entity::find()
        .order_by_asc(wash::Column::CreatedAt)
        .all(db).await.map_err(|e| ServiceError::Db(e.to_string()))?;
    let stories = washes.load_many(story::Entity, db).await.map_err(|e| ServiceError::Db(e.to_string()))?;
    Ok(group_by_wash(washes.into_iter().zip(stories).collect()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    fn wash_named(name: &str) -> wash::Model {
        let now = Utc::now().fixed_offset();
        wash::Model { id: Uuid::new_v4(), name: name.into(), picture: Some(format!("/uploads/{}.png", name)), city_id: None, created_at: now, updated_at: now }
    }

    fn story_at(wash_id: Uuid, url: &str, offset_secs: i64) -> story::Model {
        story::Model {
            id: Uuid::new_v4(),
            media_url: url.into(),
            media_type: MediaType::Image,
            duration: 5,
            wash_id,
            created_at: (Utc::now() + Duration::seconds(offset_secs)).fixed_offset(),
        }
    }

    #[test]
    fn items_are_numbered_from_one_and_indexed_from_zero() {
        let w = wash_named("a");
        let items = to_items(&[story_at(w.id, "/1.jpg", 0), story_at(w.id, "/2.jpg", 1)]);
        assert_eq!(items.iter().map(|i| (i.id, i.index)).collect::<Vec<_>>(), vec![(1, 0), (2, 1)]);
        assert!(items.iter().all(|i| !i.is_seen && !i.is_read_more));

        let json = serde_json::to_value(&items[0]).unwrap();
        assert_eq!(json["mediaUrl"], "/1.jpg");
        assert_eq!(json["mediaType"], "image");
        assert_eq!(json["isReadMore"], false);
    }

    #[test]
    fn groups_skip_empty_washes_and_sort_stories() {
        let a = wash_named("a");
        let b = wash_named("b");
        let c = wash_named("c");
        let a_stories = vec![story_at(a.id, "/late.jpg", 10), story_at(a.id, "/early.jpg", 0)];
        let c_stories = vec![story_at(c.id, "/c.mp4", 0)];

        let groups = group_by_wash(vec![(a.clone(), a_stories), (b, vec![]), (c.clone(), c_stories)]);
        assert_eq!(groups.len(), 2);
        assert_eq!((groups[0].id, groups[0].wash_id), (1, a.id));
        assert_eq!((groups[1].id, groups[1].wash_id), (2, c.id));
        assert_eq!(groups[0].stories[0].media_url, "/early.jpg");
        assert_eq!(groups[0].stories[1].id, 2);
        assert!(!groups[0].is_seen);
    }

    #[tokio::test]
    async fn story_for_unknown_wash_is_not_found() -> Result<(), anyhow::Error> {
        use sea_orm::PaginatorTrait;
        let Some(db) = crate::test_support::get_db().await? else { return Ok(()) };

        let ghost = Uuid::new_v4();
        let input = CreateStory { media_url: "/uploads/s.jpg".into(), media_type: MediaType::Image, duration: 5 };
        assert!(matches!(create_story(&db, ghost, input).await, Err(ServiceError::NotFound(_))));
        let stored = story::Entity::find().filter(story::Column::WashId.eq(ghost)).count(&db).await?;
        assert_eq!(stored, 0);
        Ok(())
    }
}
