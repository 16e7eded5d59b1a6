//! Create `city` table.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(City::Table)
                    .if_not_exists()
                    .col(uuid(City::Id).primary_key())
                    .col(text(City::Name).not_null())
                    .col(double_null(City::Lat))
                    .col(double_null(City::Lon))
                    .col(timestamp_with_time_zone(City::CreatedAt).not_null())
                    .col(timestamp_with_time_zone(City::UpdatedAt).not_null())
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(City::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum City { Table, Id, Name, Lat, Lon, CreatedAt, UpdatedAt }
