use uuid::Uuid;
use sea_orm::DatabaseConnection;
use tracing::{info, instrument};

use models::post;
use crate::{errors::ServiceError, wash_service::ensure_wash};

/// Create a post under an existing wash.
#[instrument(skip(db, input), fields(address = %input.address))]
pub async fn create_post(db: &DatabaseConnection, wash_id: Uuid, input: post::NewPost) -> Result<post::Model, ServiceError> {
    ensure_wash(db, wash_id).await?;
    let created = post::create(db, wash_id, input).await?;
    info!(wash_id = %wash_id, post_id = %created.id, event = "post_created", "post created");
    Ok(created)
}
