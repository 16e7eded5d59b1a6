use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Wash: city-scoped listing
        manager
            .create_index(
                Index::create()
                    .name("idx_wash_city")
                    .table(Wash::Table)
                    .col(Wash::CityId)
                    .to_owned(),
            )
            .await?;

        // Children of wash: FK lookups
        manager
            .create_index(
                Index::create()
                    .name("idx_post_wash")
                    .table(Post::Table)
                    .col(Post::WashId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_price_wash")
                    .table(Price::Table)
                    .col(Price::WashId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_story_wash")
                    .table(Story::Table)
                    .col(Story::WashId)
                    .to_owned(),
            )
            .await?;

        // Favorites: reverse lookup by post
        manager
            .create_index(
                Index::create()
                    .name("idx_user_favorite_post")
                    .table(UserFavorite::Table)
                    .col(UserFavorite::PostId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(Index::drop().name("idx_user_favorite_post").table(UserFavorite::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_story_wash").table(Story::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_price_wash").table(Price::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_post_wash").table(Post::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_wash_city").table(Wash::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Wash { Table, CityId }

#[derive(DeriveIden)]
enum Post { Table, WashId }

#[derive(DeriveIden)]
enum Price { Table, WashId }

#[derive(DeriveIden)]
enum Story { Table, WashId }

#[derive(DeriveIden)]
enum UserFavorite { Table, PostId }
