//! Migrator registering entity-specific migrations in dependency order.
//! Indexes are applied last.
pub use sea_orm_migration::prelude::*;

mod m20240101_000001_create_user;
mod m20240101_000002_create_city;
mod m20240101_000003_create_wash;
mod m20240101_000004_create_post;
mod m20240101_000005_create_price;
mod m20240101_000006_create_story;
mod m20240101_000007_create_wash_user;
mod m20240101_000008_create_user_favorite;
mod m20240101_000009_add_indexes;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240101_000001_create_user::Migration),
            Box::new(m20240101_000002_create_city::Migration),
            Box::new(m20240101_000003_create_wash::Migration),
            Box::new(m20240101_000004_create_post::Migration),
            Box::new(m20240101_000005_create_price::Migration),
            Box::new(m20240101_000006_create_story::Migration),
            Box::new(m20240101_000007_create_wash_user::Migration),
            Box::new(m20240101_000008_create_user_favorite::Migration),
            // Indexes should always be applied last
            Box::new(m20240101_000009_add_indexes::Migration),
        ]
    }
}
