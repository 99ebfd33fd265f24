//! Social graph repository: follow edges and the counters they drive.
//!
//! Edge mutations go through the `follow` / `unfollow` server-side functions
//! so the edge and both counters change together. A duplicate edge surfaces
//! as `Conflict`, a missing user or edge as `NotFound`, and a lost race under
//! SERIALIZABLE as `Retryable`.

use async_trait::async_trait;
use sea_orm::{
    ColumnTrait, ConnectionTrait, EntityTrait, JoinType, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, RelationTrait, Statement, Value,
};

use super::entities::relationship::{self, Entity as RelationshipEntity};
use super::entities::user::{self, Entity as UserEntity};
use crate::domain::{Edge, UserId, UserProfile};
use crate::errors::AppResult;
use crate::infra::unit_of_work::Persistence;
use crate::types::Page;

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

const FOLLOW_SQL: &str = "SELECT follow($1, $2)";
const UNFOLLOW_SQL: &str = "SELECT unfollow($1, $2)";

#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait SocialGraphRepository: Send + Sync {
    /// Add the edge `follower -> following` and bump both counters.
    async fn follow(&self, follower: UserId, following: UserId) -> AppResult<()>;

    /// Remove the edge and decrement both counters.
    async fn unfollow(&self, follower: UserId, following: UserId) -> AppResult<()>;

    /// Active users following `id`, in the order they followed.
    async fn get_followers(&self, id: UserId, page: Page) -> AppResult<Vec<UserProfile>>;

    /// Active users `id` follows, in the order they were followed.
    async fn get_following(&self, id: UserId, page: Page) -> AppResult<Vec<UserProfile>>;

    async fn is_following(&self, follower: UserId, following: UserId) -> AppResult<bool>;
}

/// PostgreSQL-backed implementation of [`SocialGraphRepository`].
#[derive(Clone)]
pub struct GraphStore {
    persistence: Persistence,
}

impl GraphStore {
    pub fn new(persistence: Persistence) -> Self {
        Self { persistence }
    }

    async fn call_procedure(&self, sql: &'static str, edge: Edge) -> AppResult<()> {
        self.persistence
            .write(move |txn| {
                Box::pin(async move {
                    let values: [Value; 2] =
                        [edge.follower_id.get().into(), edge.following_id.get().into()];
                    txn.execute(Statement::from_sql_and_values(
                        txn.get_database_backend(),
                        sql,
                        values,
                    ))
                    .await?;
                    Ok(())
                })
            })
            .await
    }

    /// Users on the other end of edges matching `side = id`, joined back to
    /// `users` through `relation` and ordered by edge id.
    async fn list_side(
        &self,
        relation: relationship::Relation,
        side: relationship::Column,
        id: UserId,
        page: Page,
    ) -> AppResult<Vec<UserProfile>> {
        page.validate()?;

        self.persistence
            .read(move |txn| {
                Box::pin(async move {
                    let models = UserEntity::find()
                        .join(JoinType::InnerJoin, relation.def().rev())
                        .filter(side.eq(id.get()))
                        .filter(user::Column::IsDeleted.eq(false))
                        .order_by_asc(relationship::Column::Id)
                        .limit(page.limit)
                        .offset(page.offset)
                        .all(txn)
                        .await?;

                    models.into_iter().map(UserProfile::try_from).collect()
                })
            })
            .await
    }
}

#[async_trait]
impl SocialGraphRepository for GraphStore {
    #[tracing::instrument(skip(self), name = "db.graph.follow")]
    async fn follow(&self, follower: UserId, following: UserId) -> AppResult<()> {
        let edge = Edge::new(follower, following)?;
        self.call_procedure(FOLLOW_SQL, edge).await?;
        tracing::debug!(%edge, "Followed");
        Ok(())
    }

    #[tracing::instrument(skip(self), name = "db.graph.unfollow")]
    async fn unfollow(&self, follower: UserId, following: UserId) -> AppResult<()> {
        // A self edge can never exist, so the procedure reports NotFound for it
        let edge = Edge {
            follower_id: follower,
            following_id: following,
        };
        self.call_procedure(UNFOLLOW_SQL, edge).await?;
        tracing::debug!(%edge, "Unfollowed");
        Ok(())
    }

    #[tracing::instrument(skip(self), name = "db.graph.followers")]
    async fn get_followers(&self, id: UserId, page: Page) -> AppResult<Vec<UserProfile>> {
        // followers sit on the follower_id side of edges pointing at `id`
        self.list_side(
            relationship::Relation::Follower,
            relationship::Column::FollowingId,
            id,
            page,
        )
        .await
    }

    #[tracing::instrument(skip(self), name = "db.graph.following")]
    async fn get_following(&self, id: UserId, page: Page) -> AppResult<Vec<UserProfile>> {
        self.list_side(
            relationship::Relation::Following,
            relationship::Column::FollowerId,
            id,
            page,
        )
        .await
    }

    #[tracing::instrument(skip(self), name = "db.graph.is_following")]
    async fn is_following(&self, follower: UserId, following: UserId) -> AppResult<bool> {
        self.persistence
            .read(move |txn| {
                Box::pin(async move {
                    let edges = RelationshipEntity::find()
                        .filter(relationship::Column::FollowerId.eq(follower.get()))
                        .filter(relationship::Column::FollowingId.eq(following.get()))
                        .count(txn)
                        .await?;
                    Ok(edges > 0)
                })
            })
            .await
    }
}
