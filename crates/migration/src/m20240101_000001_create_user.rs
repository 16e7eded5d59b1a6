//! Create `user` table.
//!
//! Phone number is the login identity and is unique; `pin` holds an argon2 PHC string.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(User::Table)
                    .if_not_exists()
                    .col(uuid(User::Id).primary_key())
                    .col(string_len(User::PhoneNumber, 32).unique_key().not_null())
                    .col(text(User::Name).not_null())
                    .col(string_len(User::Pin, 255).not_null())
                    .col(text(User::Picture).not_null())
                    .col(double(User::Balance).not_null().default(0.0))
                    .col(double(User::Cashback).not_null().default(0.0))
                    .col(timestamp_with_time_zone(User::CreatedAt).not_null())
                    .col(timestamp_with_time_zone(User::UpdatedAt).not_null())
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(User::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum User { Table, Id, PhoneNumber, Name, Pin, Picture, Balance, Cashback, CreatedAt, UpdatedAt }
