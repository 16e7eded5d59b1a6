//! Create `wash` table with optional FK to `city`.
//!
//! Deleting a city detaches its washes instead of removing them.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Wash::Table)
                    .if_not_exists()
                    .col(uuid(Wash::Id).primary_key())
                    .col(text(Wash::Name).not_null())
                    .col(text_null(Wash::Picture))
                    .col(uuid_null(Wash::CityId))
                    .col(timestamp_with_time_zone(Wash::CreatedAt).not_null())
                    .col(timestamp_with_time_zone(Wash::UpdatedAt).not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_wash_city")
                            .from(Wash::Table, Wash::CityId)
                            .to(City::Table, City::Id)
                            .on_delete(ForeignKeyAction::SetNull)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Wash::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Wash { Table, Id, Name, Picture, CityId, CreatedAt, UpdatedAt }

#[derive(DeriveIden)]
enum City { Table, Id }
