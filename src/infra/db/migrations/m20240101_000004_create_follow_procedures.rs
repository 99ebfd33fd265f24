//! Migration: Server-side follow/unfollow procedures.
//!
//! Each procedure mutates the edge and both denormalized counters as one
//! statement from the client's point of view. Missing rows raise
//! `no_data_found` (SQLSTATE P0002); a counter dropping below zero trips the
//! `users_*_count_non_negative` checks.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

pub(crate) const CREATE_FOLLOW: &str = r#"
CREATE OR REPLACE FUNCTION follow(p_follower_id BIGINT, p_following_id BIGINT)
RETURNS VOID
LANGUAGE plpgsql
AS $$
BEGIN
    IF NOT EXISTS (SELECT 1 FROM users WHERE id = p_follower_id AND NOT is_deleted)
       OR NOT EXISTS (SELECT 1 FROM users WHERE id = p_following_id AND NOT is_deleted) THEN
        RAISE EXCEPTION 'user % or % not found', p_follower_id, p_following_id
            USING ERRCODE = 'no_data_found';
    END IF;

    INSERT INTO relationships (follower_id, following_id)
    VALUES (p_follower_id, p_following_id);

    UPDATE users SET following_count = following_count + 1 WHERE id = p_follower_id;
    UPDATE users SET follower_count = follower_count + 1 WHERE id = p_following_id;
END;
$$;
"#;

pub(crate) const CREATE_UNFOLLOW: &str = r#"
CREATE OR REPLACE FUNCTION unfollow(p_follower_id BIGINT, p_following_id BIGINT)
RETURNS VOID
LANGUAGE plpgsql
AS $$
BEGIN
    DELETE FROM relationships
    WHERE follower_id = p_follower_id AND following_id = p_following_id;

    IF NOT FOUND THEN
        RAISE EXCEPTION 'relationship % -> % not found', p_follower_id, p_following_id
            USING ERRCODE = 'no_data_found';
    END IF;

    UPDATE users SET following_count = following_count - 1 WHERE id = p_follower_id;
    UPDATE users SET follower_count = follower_count - 1 WHERE id = p_following_id;
END;
$$;
"#;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(CREATE_FOLLOW).await?;
        db.execute_unprepared(CREATE_UNFOLLOW).await?;
        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared("DROP FUNCTION IF EXISTS unfollow(BIGINT, BIGINT);")
            .await?;
        db.execute_unprepared("DROP FUNCTION IF EXISTS follow(BIGINT, BIGINT);")
            .await?;
        Ok(())
    }
}
