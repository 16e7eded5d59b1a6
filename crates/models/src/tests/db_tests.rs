use crate::db::{connect_with_config, ping};
use super::setup_test_db;
use sea_orm::{DatabaseBackend, Statement, ConnectionTrait};
use std::time::{Duration, Instant};
use anyhow::Result;

/// Test basic database connection
#[tokio::test]
async fn test_basic_connection() -> Result<()> {
    let start = Instant::now();
    let Some(db) = setup_test_db().await? else { return Ok(()) };
    let connection_time = start.elapsed();

    let stmt = Statement::from_string(DatabaseBackend::Postgres, "SELECT 1 as test".to_string());
    let row = db.query_one(stmt).await?.expect("one row");
    let test_value: i32 = row.try_get("", "test")?;
    assert_eq!(test_value, 1);

    assert!(connection_time < Duration::from_secs(30),
           "Connection took too long: {:?}", connection_time);
    Ok(())
}

/// Test connection with pool settings from the config section
#[tokio::test]
async fn test_custom_config_connection() -> Result<()> {
    if setup_test_db().await?.is_none() {
        return Ok(());
    }

    let mut config = configs::DatabaseConfig::default();
    config.url = crate::db::DATABASE_URL.clone();
    config.max_connections = 5;
    config.min_connections = 1;
    config.connect_timeout_secs = 10;

    let db = connect_with_config(&config).await?;
    ping(&db).await?;
    Ok(())
}

/// Every entity table exists after migrations
#[tokio::test]
async fn test_schema_tables_present() -> Result<()> {
    let Some(db) = setup_test_db().await? else { return Ok(()) };

    for table in ["user", "city", "wash", "post", "price", "story", "wash_user", "user_favorite"] {
        let stmt = Statement::from_string(
            DatabaseBackend::Postgres,
            format!("SELECT to_regclass('public.\"{}\"') IS NOT NULL AS present", table),
        );
        let row = db.query_one(stmt).await?.expect("one row");
        let present: bool = row.try_get("", "present")?;
        assert!(present, "table {} missing", table);
    }
    Ok(())
}
