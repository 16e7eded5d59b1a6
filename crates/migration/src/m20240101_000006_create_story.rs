//! Create `story` table: promotional media shown in the story carousel.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Story::Table)
                    .if_not_exists()
                    .col(uuid(Story::Id).primary_key())
                    .col(text(Story::MediaUrl).not_null())
                    .col(text(Story::MediaType).not_null())
                    .col(integer(Story::Duration).not_null())
                    .col(uuid(Story::WashId).not_null())
                    .col(timestamp_with_time_zone(Story::CreatedAt).not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_story_wash")
                            .from(Story::Table, Story::WashId)
                            .to(Wash::Table, Wash::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Story::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Story { Table, Id, MediaUrl, MediaType, Duration, WashId, CreatedAt }

#[derive(DeriveIden)]
enum Wash { Table, Id }
