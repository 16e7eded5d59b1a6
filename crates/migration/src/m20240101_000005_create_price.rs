//! Create `price` table: price-list entries of a wash.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Price::Table)
                    .if_not_exists()
                    .col(uuid(Price::Id).primary_key())
                    .col(text(Price::ServiceName).not_null())
                    .col(double(Price::Price).not_null())
                    .col(uuid(Price::WashId).not_null())
                    .col(timestamp_with_time_zone(Price::CreatedAt).not_null())
                    .col(timestamp_with_time_zone(Price::UpdatedAt).not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_price_wash")
                            .from(Price::Table, Price::WashId)
                            .to(Wash::Table, Wash::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Price::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Price { Table, Id, ServiceName, Price, WashId, CreatedAt, UpdatedAt }

#[derive(DeriveIden)]
enum Wash { Table, Id }
