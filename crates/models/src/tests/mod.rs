/// Database connection and configuration tests
pub mod db_tests;


/// Transaction handling and cascade tests
pub mod transaction_tests;

use sea_orm::DatabaseConnection;
use migration::MigratorTrait;

/// Connect and migrate, or `None` when no database is configured for this run.
pub(crate) async fn setup_test_db() -> anyhow::Result<Option<DatabaseConnection>> {
    if std::env::var("SKIP_DB_TESTS").is_ok() || std::env::var("DATABASE_URL").is_err() {
        println!("Skipping database tests (DATABASE_URL unset or SKIP_DB_TESTS set)");
        return Ok(None);
    }
    let db = crate::db::connect().await?;
    migration::Migrator::up(&db, None).await?;
    Ok(Some(db))
}
