//! Create `post` table: addresses/boxes of a wash.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Post::Table)
                    .if_not_exists()
                    .col(uuid(Post::Id).primary_key())
                    .col(text(Post::Address).not_null())
                    .col(text(Post::Description).not_null())
                    .col(text(Post::Schedule).not_null())
                    .col(double(Post::Lat).not_null())
                    .col(double(Post::Lon).not_null())
                    .col(integer(Post::Box).not_null())
                    .col(integer_null(Post::Distance))
                    .col(text_null(Post::Pictures))
                    .col(uuid(Post::WashId).not_null())
                    .col(timestamp_with_time_zone(Post::CreatedAt).not_null())
                    .col(timestamp_with_time_zone(Post::UpdatedAt).not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_post_wash")
                            .from(Post::Table, Post::WashId)
                            .to(Wash::Table, Wash::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Post::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Post { Table, Id, Address, Description, Schedule, Lat, Lon, Box, Distance, Pictures, WashId, CreatedAt, UpdatedAt }

#[derive(DeriveIden)]
enum Wash { Table, Id }
