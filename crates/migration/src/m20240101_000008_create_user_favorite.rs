//! Create `user_favorite` join table (user <-> post).
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(UserFavorite::Table)
                    .if_not_exists()
                    .col(uuid(UserFavorite::UserId).not_null())
                    .col(uuid(UserFavorite::PostId).not_null())
                    .col(timestamp_with_time_zone(UserFavorite::CreatedAt).not_null())
                    .primary_key(
                        Index::create()
                            .name("pk_user_favorite")
                            .col(UserFavorite::UserId)
                            .col(UserFavorite::PostId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_user_favorite_user")
                            .from(UserFavorite::Table, UserFavorite::UserId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_user_favorite_post")
                            .from(UserFavorite::Table, UserFavorite::PostId)
                            .to(Post::Table, Post::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(UserFavorite::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum UserFavorite { Table, UserId, PostId, CreatedAt }

#[derive(DeriveIden)]
enum User { Table, Id }

#[derive(DeriveIden)]
enum Post { Table, Id }
