//! Create `wash_user` table: per-user balance/bonus ledger scoped to one wash.
//!
//! The composite primary key is the conflict target of the balance upsert.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(WashUser::Table)
                    .if_not_exists()
                    .col(uuid(WashUser::UserId).not_null())
                    .col(uuid(WashUser::WashId).not_null())
                    .col(double(WashUser::Balance).not_null().default(0.0))
                    .col(double(WashUser::Bonus).not_null().default(0.0))
                    .col(timestamp_with_time_zone(WashUser::UpdatedAt).not_null())
                    .primary_key(
                        Index::create()
                            .name("pk_wash_user")
                            .col(WashUser::UserId)
                            .col(WashUser::WashId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_wash_user_user")
                            .from(WashUser::Table, WashUser::UserId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_wash_user_wash")
                            .from(WashUser::Table, WashUser::WashId)
                            .to(Wash::Table, Wash::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(WashUser::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum WashUser { Table, UserId, WashId, Balance, Bonus, UpdatedAt }

#[derive(DeriveIden)]
enum User { Table, Id }

#[derive(DeriveIden)]
enum Wash { Table, Id }
