//! Migration: Create the follow-edge table.

use sea_orm_migration::prelude::*;

use super::guarded_check_constraint;
use super::m20240101_000001_create_users_table::Users;
use crate::config::{SELF_FOLLOW_CONSTRAINT, UNIQUE_RELATIONSHIP_INDEX};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Relationships::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Relationships::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Relationships::FollowerId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Relationships::FollowingId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Relationships::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_relationships_follower")
                            .from(Relationships::Table, Relationships::FollowerId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_relationships_following")
                            .from(Relationships::Table, Relationships::FollowingId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // One edge per ordered pair; also serves "who does X follow" lookups
        manager
            .create_index(
                Index::create()
                    .name(UNIQUE_RELATIONSHIP_INDEX)
                    .table(Relationships::Table)
                    .col(Relationships::FollowerId)
                    .col(Relationships::FollowingId)
                    .unique()
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_relationships_following")
                    .table(Relationships::Table)
                    .col(Relationships::FollowingId)
                    .col(Relationships::Id)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .get_connection()
            .execute_unprepared(&guarded_check_constraint(
                "relationships",
                SELF_FOLLOW_CONSTRAINT,
                "follower_id <> following_id",
            ))
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(
                Table::drop()
                    .table(Relationships::Table)
                    .if_exists()
                    .to_owned(),
            )
            .await
    }
}

#[derive(DeriveIden)]
enum Relationships {
    Table,
    Id,
    FollowerId,
    FollowingId,
    CreatedAt,
}
