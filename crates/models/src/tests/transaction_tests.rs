use super::setup_test_db;
use crate::{city, wash};
use sea_orm::{EntityTrait, TransactionTrait};
use anyhow::Result;
use uuid::Uuid;

/// Test basic transaction commit
#[tokio::test]
async fn test_transaction_commit() -> Result<()> {
    let Some(db) = setup_test_db().await? else { return Ok(()) };

    let txn = db.begin().await?;
    let created = city::create(&txn, &format!("commit_{}", Uuid::new_v4()), None, None).await?;
    txn.commit().await?;

    let found = city::Entity::find_by_id(created.id).one(&db).await?;
    assert!(found.is_some());

    city::Entity::delete_by_id(created.id).exec(&db).await?;
    Ok(())
}

/// Test transaction rollback
#[tokio::test]
async fn test_transaction_rollback() -> Result<()> {
    let Some(db) = setup_test_db().await? else { return Ok(()) };

    let txn = db.begin().await?;
    let created = city::create(&txn, &format!("rollback_{}", Uuid::new_v4()), None, None).await?;
    txn.rollback().await?;

    let found = city::Entity::find_by_id(created.id).one(&db).await?;
    assert!(found.is_none());
    Ok(())
}

/// Deleting a city detaches washes instead of deleting them
#[tokio::test]
async fn test_city_delete_sets_null() -> Result<()> {
    let Some(db) = setup_test_db().await? else { return Ok(()) };

    let c = city::create(&db, &format!("detach_{}", Uuid::new_v4()), None, None).await?;
    let w = wash::create(&db, "Detached", None, Some(c.id)).await?;
    city::Entity::delete_by_id(c.id).exec(&db).await?;

    let reloaded = wash::Entity::find_by_id(w.id).one(&db).await?.expect("wash survives");
    assert_eq!(reloaded.city_id, None);

    wash::Entity::delete_by_id(w.id).exec(&db).await?;
    Ok(())
}
