//! User repository: account rows, soft/hard deletion and listings.

use async_trait::async_trait;
use sea_orm::{
    sea_query::{Expr, OnConflict, Query},
    ActiveModelTrait, ColumnTrait, DatabaseTransaction, EntityTrait, NotSet, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Select, Set,
};
use validator::Validate;

use super::entities::relationship::{self, Entity as RelationshipEntity};
use super::entities::user::{self, ActiveModel, Entity as UserEntity};
use super::entities::user_info::{self, Entity as UserInfoEntity};
use crate::domain::{
    BioChange, EmailChange, NameChange, NewUser, UserId, UserInfo, UserProfile, UserRole,
};
use crate::errors::{AppError, AppResult, OptionExt};
use crate::infra::unit_of_work::Persistence;
use crate::types::Page;

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// User repository trait for dependency injection.
///
/// Every method is one unit of work. Soft-deleted rows stay addressable by
/// id (`get_user`, `get_password`) but are left out of the active listings.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert an unverified user with zero counters and return its id.
    async fn create_user(&self, user: NewUser) -> AppResult<UserId>;

    /// Whether any row (deleted or not) uses this email.
    async fn check_user_exists(&self, email: &str) -> AppResult<bool>;

    async fn get_user(&self, id: UserId) -> AppResult<UserProfile>;

    /// Stored password hash.
    async fn get_password(&self, id: UserId) -> AppResult<String>;

    /// Mark the email verified. Calling it again is a no-op success.
    async fn verify_user_email(&self, id: UserId) -> AppResult<()>;

    /// Overwrite the stored hash.
    async fn update_password(&self, id: UserId, password: String) -> AppResult<()>;

    /// Change the address; the new one starts out unverified.
    async fn update_email(&self, id: UserId, change: EmailChange) -> AppResult<()>;

    async fn update_name(&self, id: UserId, change: NameChange) -> AppResult<()>;

    async fn update_bio(&self, id: UserId, change: BioChange) -> AppResult<()>;

    /// Soft delete (sets `is_deleted` and `deleted_at`).
    async fn delete(&self, id: UserId) -> AppResult<()>;

    /// Permanently remove the user, its edges and its `user_info` row.
    async fn delete_force(&self, id: UserId) -> AppResult<()>;

    /// Active verified users, oldest first.
    async fn get_verified_users(&self, page: Page) -> AppResult<Vec<UserProfile>>;

    /// Soft-deleted users, earliest deletion first.
    async fn get_deleted_users(&self, page: Page) -> AppResult<Vec<UserProfile>>;

    /// Active users, oldest first, optionally restricted to one role.
    async fn get_all_users(&self, page: Page, role: Option<UserRole>)
        -> AppResult<Vec<UserProfile>>;

    /// Extended profile; empty if the user never set one.
    async fn get_user_info(&self, id: UserId) -> AppResult<UserInfo>;

    async fn upsert_user_info(&self, id: UserId, info: UserInfo) -> AppResult<()>;
}

/// PostgreSQL-backed implementation of [`UserRepository`].
#[derive(Clone)]
pub struct UserStore {
    persistence: Persistence,
}

impl UserStore {
    /// Create new repository instance
    pub fn new(persistence: Persistence) -> Self {
        Self { persistence }
    }
}

/// Run a single-row `UPDATE users ... WHERE id = $id`; no match is `NotFound`.
async fn update_user_columns(
    txn: &DatabaseTransaction,
    id: UserId,
    columns: Vec<(user::Column, sea_orm::sea_query::SimpleExpr)>,
) -> AppResult<()> {
    let mut update = UserEntity::update_many()
        .col_expr(user::Column::UpdatedAt, Expr::value(chrono::Utc::now()));
    for (column, value) in columns {
        update = update.col_expr(column, value);
    }

    let result = update
        .filter(user::Column::Id.eq(id.get()))
        .exec(txn)
        .await?;

    if result.rows_affected == 0 {
        return Err(AppError::NotFound);
    }
    Ok(())
}

async fn fetch_page(
    txn: &DatabaseTransaction,
    select: Select<UserEntity>,
    page: Page,
) -> AppResult<Vec<UserProfile>> {
    let models = select
        .limit(page.limit)
        .offset(page.offset)
        .all(txn)
        .await?;

    models.into_iter().map(UserProfile::try_from).collect()
}

#[async_trait]
impl UserRepository for UserStore {
    #[tracing::instrument(skip_all, name = "db.users.create")]
    async fn create_user(&self, user: NewUser) -> AppResult<UserId> {
        user.validate()?;

        self.persistence
            .write(move |txn| {
                Box::pin(async move {
                    let now = chrono::Utc::now();
                    let active_model = ActiveModel {
                        id: NotSet,
                        name: Set(user.name),
                        email: Set(user.email),
                        email_verified: Set(false),
                        password: Set(user.password),
                        role: Set(user.role.into()),
                        bio: Set(None),
                        follower_count: Set(0),
                        following_count: Set(0),
                        created_at: Set(now),
                        updated_at: Set(now),
                        is_deleted: Set(false),
                        deleted_at: Set(None),
                    };

                    let model = active_model.insert(txn).await?;
                    tracing::debug!(user_id = model.id, "User created");
                    Ok(UserId(model.id))
                })
            })
            .await
    }

    #[tracing::instrument(skip_all, name = "db.users.check_exists")]
    async fn check_user_exists(&self, email: &str) -> AppResult<bool> {
        let email = email.to_owned();

        self.persistence
            .read(move |txn| {
                Box::pin(async move {
                    let matches = UserEntity::find()
                        .filter(user::Column::Email.eq(email))
                        .count(txn)
                        .await?;
                    Ok(matches > 0)
                })
            })
            .await
    }

    #[tracing::instrument(skip(self), name = "db.users.get")]
    async fn get_user(&self, id: UserId) -> AppResult<UserProfile> {
        self.persistence
            .read(move |txn| {
                Box::pin(async move {
                    let model = UserEntity::find_by_id(id.get())
                        .one(txn)
                        .await?
                        .ok_or_not_found()?;
                    UserProfile::try_from(model)
                })
            })
            .await
    }

    #[tracing::instrument(skip(self), name = "db.users.get_password")]
    async fn get_password(&self, id: UserId) -> AppResult<String> {
        self.persistence
            .read(move |txn| {
                Box::pin(async move {
                    let model = UserEntity::find_by_id(id.get())
                        .one(txn)
                        .await?
                        .ok_or_not_found()?;
                    Ok(model.password)
                })
            })
            .await
    }

    #[tracing::instrument(skip(self), name = "db.users.verify_email")]
    async fn verify_user_email(&self, id: UserId) -> AppResult<()> {
        self.persistence
            .write(move |txn| {
                Box::pin(async move {
                    update_user_columns(
                        txn,
                        id,
                        vec![(user::Column::EmailVerified, Expr::value(true))],
                    )
                    .await
                })
            })
            .await
    }

    #[tracing::instrument(skip(self, password), name = "db.users.update_password")]
    async fn update_password(&self, id: UserId, password: String) -> AppResult<()> {
        if password.is_empty() {
            return Err(AppError::invalid_argument("Password hash is required"));
        }

        self.persistence
            .write(move |txn| {
                Box::pin(async move {
                    update_user_columns(
                        txn,
                        id,
                        vec![(user::Column::Password, Expr::value(password))],
                    )
                    .await
                })
            })
            .await
    }

    #[tracing::instrument(skip(self, change), name = "db.users.update_email")]
    async fn update_email(&self, id: UserId, change: EmailChange) -> AppResult<()> {
        change.validate()?;

        self.persistence
            .write(move |txn| {
                Box::pin(async move {
                    update_user_columns(
                        txn,
                        id,
                        vec![
                            (user::Column::Email, Expr::value(change.email)),
                            (user::Column::EmailVerified, Expr::value(false)),
                        ],
                    )
                    .await
                })
            })
            .await
    }

    #[tracing::instrument(skip(self, change), name = "db.users.update_name")]
    async fn update_name(&self, id: UserId, change: NameChange) -> AppResult<()> {
        change.validate()?;

        self.persistence
            .write(move |txn| {
                Box::pin(async move {
                    update_user_columns(txn, id, vec![(user::Column::Name, Expr::value(change.name))])
                        .await
                })
            })
            .await
    }

    #[tracing::instrument(skip(self, change), name = "db.users.update_bio")]
    async fn update_bio(&self, id: UserId, change: BioChange) -> AppResult<()> {
        change.validate()?;

        self.persistence
            .write(move |txn| {
                Box::pin(async move {
                    update_user_columns(txn, id, vec![(user::Column::Bio, Expr::value(change.bio))])
                        .await
                })
            })
            .await
    }

    #[tracing::instrument(skip(self), name = "db.users.delete")]
    async fn delete(&self, id: UserId) -> AppResult<()> {
        self.persistence
            .write(move |txn| {
                Box::pin(async move {
                    let now = chrono::Utc::now();
                    let result = UserEntity::update_many()
                        .col_expr(user::Column::IsDeleted, Expr::value(true))
                        .col_expr(user::Column::DeletedAt, Expr::value(now))
                        .col_expr(user::Column::UpdatedAt, Expr::value(now))
                        .filter(user::Column::Id.eq(id.get()))
                        .filter(user::Column::IsDeleted.eq(false))
                        .exec(txn)
                        .await?;

                    // Missing and already-deleted rows look the same from here
                    if result.rows_affected == 0 {
                        return Err(AppError::NotFound);
                    }
                    Ok(())
                })
            })
            .await
    }

    #[tracing::instrument(skip(self), name = "db.users.delete_force")]
    async fn delete_force(&self, id: UserId) -> AppResult<()> {
        self.persistence
            .write(move |txn| {
                Box::pin(async move {
                    // The cascade removes edges without touching the counters
                    // on the other side, so settle those first.
                    UserEntity::update_many()
                        .col_expr(
                            user::Column::FollowerCount,
                            Expr::col(user::Column::FollowerCount).sub(1),
                        )
                        .filter(
                            user::Column::Id.in_subquery(
                                Query::select()
                                    .column(relationship::Column::FollowingId)
                                    .from(RelationshipEntity)
                                    .and_where(relationship::Column::FollowerId.eq(id.get()))
                                    .to_owned(),
                            ),
                        )
                        .exec(txn)
                        .await?;

                    UserEntity::update_many()
                        .col_expr(
                            user::Column::FollowingCount,
                            Expr::col(user::Column::FollowingCount).sub(1),
                        )
                        .filter(
                            user::Column::Id.in_subquery(
                                Query::select()
                                    .column(relationship::Column::FollowerId)
                                    .from(RelationshipEntity)
                                    .and_where(relationship::Column::FollowingId.eq(id.get()))
                                    .to_owned(),
                            ),
                        )
                        .exec(txn)
                        .await?;

                    let result = UserEntity::delete_by_id(id.get()).exec(txn).await?;
                    if result.rows_affected == 0 {
                        return Err(AppError::NotFound);
                    }

                    tracing::info!(user_id = %id, "User permanently deleted");
                    Ok(())
                })
            })
            .await
    }

    #[tracing::instrument(skip(self), name = "db.users.list_verified")]
    async fn get_verified_users(&self, page: Page) -> AppResult<Vec<UserProfile>> {
        page.validate()?;

        self.persistence
            .read(move |txn| {
                Box::pin(async move {
                    let select = UserEntity::find()
                        .filter(user::Column::EmailVerified.eq(true))
                        .filter(user::Column::IsDeleted.eq(false))
                        .order_by_asc(user::Column::CreatedAt)
                        .order_by_asc(user::Column::Id);
                    fetch_page(txn, select, page).await
                })
            })
            .await
    }

    #[tracing::instrument(skip(self), name = "db.users.list_deleted")]
    async fn get_deleted_users(&self, page: Page) -> AppResult<Vec<UserProfile>> {
        page.validate()?;

        self.persistence
            .read(move |txn| {
                Box::pin(async move {
                    let select = UserEntity::find()
                        .filter(user::Column::IsDeleted.eq(true))
                        .order_by_asc(user::Column::DeletedAt)
                        .order_by_asc(user::Column::Id);
                    fetch_page(txn, select, page).await
                })
            })
            .await
    }

    #[tracing::instrument(skip(self), name = "db.users.list_all")]
    async fn get_all_users(
        &self,
        page: Page,
        role: Option<UserRole>,
    ) -> AppResult<Vec<UserProfile>> {
        page.validate()?;

        self.persistence
            .read(move |txn| {
                Box::pin(async move {
                    let mut select = UserEntity::find().filter(user::Column::IsDeleted.eq(false));
                    if let Some(role) = role {
                        select = select.filter(user::Column::Role.eq(role.as_str()));
                    }
                    let select = select
                        .order_by_asc(user::Column::CreatedAt)
                        .order_by_asc(user::Column::Id);
                    fetch_page(txn, select, page).await
                })
            })
            .await
    }

    #[tracing::instrument(skip(self), name = "db.users.get_info")]
    async fn get_user_info(&self, id: UserId) -> AppResult<UserInfo> {
        self.persistence
            .read(move |txn| {
                Box::pin(async move {
                    if let Some(info) = UserInfoEntity::find_by_id(id.get()).one(txn).await? {
                        return Ok(UserInfo::from(info));
                    }

                    UserEntity::find_by_id(id.get())
                        .one(txn)
                        .await?
                        .ok_or_not_found()?;
                    Ok(UserInfo::default())
                })
            })
            .await
    }

    #[tracing::instrument(skip(self, info), name = "db.users.upsert_info")]
    async fn upsert_user_info(&self, id: UserId, info: UserInfo) -> AppResult<()> {
        info.validate()?;

        self.persistence
            .write(move |txn| {
                Box::pin(async move {
                    let row = user_info::ActiveModel {
                        user_id: Set(id.get()),
                        location: Set(info.location),
                        website: Set(info.website),
                        updated_at: Set(chrono::Utc::now()),
                    };

                    // An unknown user trips the foreign key, which maps to NotFound
                    UserInfoEntity::insert(row)
                        .on_conflict(
                            OnConflict::column(user_info::Column::UserId)
                                .update_columns([
                                    user_info::Column::Location,
                                    user_info::Column::Website,
                                    user_info::Column::UpdatedAt,
                                ])
                                .to_owned(),
                        )
                        .exec_without_returning(txn)
                        .await?;
                    Ok(())
                })
            })
            .await
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;
    use std::sync::Arc;

    use chrono::{TimeZone, Utc};
    use sea_orm::{
        DatabaseBackend, DatabaseConnection, MockDatabase, MockExecResult, Transaction, Value,
    };

    use super::*;
    use crate::errors::ErrorKind;

    fn user_model(id: i64) -> user::Model {
        let created = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        user::Model {
            id,
            name: format!("user{}", id),
            email: format!("user{}@example.com", id),
            email_verified: false,
            password: "$argon2id$stored".to_string(),
            role: "user".to_string(),
            bio: None,
            follower_count: 0,
            following_count: 0,
            created_at: created,
            updated_at: created,
            is_deleted: false,
            deleted_at: None,
        }
    }

    fn exec(rows_affected: u64) -> MockExecResult {
        MockExecResult {
            last_insert_id: 0,
            rows_affected,
        }
    }

    fn count_row(n: i64) -> BTreeMap<&'static str, Value> {
        BTreeMap::from([("num_items", Value::BigInt(Some(n)))])
    }

    fn store(db: DatabaseConnection) -> UserStore {
        shared_store(&Arc::new(db))
    }

    fn shared_store(db: &Arc<DatabaseConnection>) -> UserStore {
        UserStore::new(Persistence::new(Arc::clone(db)))
    }

    /// Drop the store so the connection can be taken back for inspection.
    fn transaction_log(repo: UserStore, db: Arc<DatabaseConnection>) -> Vec<Transaction> {
        drop(repo);
        Arc::try_unwrap(db)
            .ok()
            .expect("store still holds the connection")
            .into_transaction_log()
    }

    #[tokio::test]
    async fn create_user_returns_the_assigned_id() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[user_model(11)]])
            .into_connection();
        let repo = store(db);

        let id = repo
            .create_user(NewUser::new("Ann", "ann@example.com", "hash"))
            .await
            .unwrap();
        assert_eq!(id, UserId(11));
    }

    #[tokio::test]
    async fn create_user_rejects_invalid_input_before_touching_the_database() {
        let db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());
        let repo = shared_store(&db);

        let err = repo
            .create_user(NewUser::new("Ann", "not-an-email", "hash"))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
        assert!(transaction_log(repo, db).is_empty());
    }

    #[tokio::test]
    async fn check_user_exists_is_true_when_a_row_matches() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[count_row(1)]])
            .append_query_results([[count_row(0)]])
            .into_connection();
        let repo = store(db);

        assert!(repo.check_user_exists("ann@example.com").await.unwrap());
        assert!(!repo.check_user_exists("bob@example.com").await.unwrap());
    }

    #[tokio::test]
    async fn get_user_maps_missing_rows_to_not_found() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<user::Model>::new()])
            .into_connection();
        let repo = store(db);

        let err = repo.get_user(UserId(404)).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn soft_deleted_users_stay_addressable() {
        let mut deleted = user_model(3);
        deleted.is_deleted = true;
        deleted.deleted_at = Some(Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap());

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[deleted.clone()]])
            .append_query_results([[deleted]])
            .into_connection();
        let repo = store(db);

        let profile = repo.get_user(UserId(3)).await.unwrap();
        assert!(profile.is_deleted());
        assert_eq!(repo.get_password(UserId(3)).await.unwrap(), "$argon2id$stored");
    }

    #[tokio::test]
    async fn corrupt_role_column_is_internal() {
        let mut corrupt = user_model(6);
        corrupt.role = "moderator".to_string();

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[corrupt]])
            .into_connection();
        let repo = store(db);

        let err = repo.get_user(UserId(6)).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Internal);
    }

    #[tokio::test]
    async fn verify_user_email_is_idempotent() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results([exec(1), exec(1)])
            .into_connection();
        let repo = store(db);

        repo.verify_user_email(UserId(1)).await.unwrap();
        repo.verify_user_email(UserId(1)).await.unwrap();
    }

    #[tokio::test]
    async fn updates_on_unknown_users_are_not_found() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results([exec(0), exec(0)])
            .into_connection();
        let repo = store(db);

        let err = repo.verify_user_email(UserId(9)).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
        let err = repo
            .update_password(UserId(9), "new-hash".into())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn update_password_requires_a_hash() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
        let repo = store(db);

        let err = repo
            .update_password(UserId(1), String::new())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    }

    #[tokio::test]
    async fn update_email_validates_the_address() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results([exec(1)])
            .into_connection();
        let repo = store(db);

        let err = repo
            .update_email(UserId(1), EmailChange { email: "nope".into() })
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);

        repo.update_email(
            UserId(1),
            EmailChange {
                email: "new@example.com".into(),
            },
        )
        .await
        .unwrap();
    }

    #[tokio::test]
    async fn delete_twice_is_not_found_the_second_time() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results([exec(1), exec(0)])
            .into_connection();
        let repo = store(db);

        repo.delete(UserId(5)).await.unwrap();
        let err = repo.delete(UserId(5)).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn delete_force_settles_counters_before_removing_the_row() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results([exec(2), exec(1), exec(1)])
            .into_connection();
        let db = Arc::new(db);
        let repo = shared_store(&db);

        repo.delete_force(UserId(5)).await.unwrap();

        let log = format!("{:?}", transaction_log(repo, db));
        assert!(log.contains("follower_count"));
        assert!(log.contains("following_count"));
        assert!(log.contains("DELETE FROM"));
    }

    #[tokio::test]
    async fn delete_force_on_a_missing_user_is_not_found() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results([exec(0), exec(0), exec(0)])
            .into_connection();
        let repo = store(db);

        let err = repo.delete_force(UserId(77)).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn listings_reject_bad_bounds() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
        let repo = store(db);

        let err = repo.get_verified_users(Page::new(0, 0)).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
        let err = repo
            .get_all_users(Page::new(1_000, 0), None)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    }

    #[tokio::test]
    async fn empty_listing_is_not_an_error() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<user::Model>::new()])
            .into_connection();
        let repo = store(db);

        let users = repo.get_deleted_users(Page::new(10, 5)).await.unwrap();
        assert!(users.is_empty());
    }

    #[tokio::test]
    async fn get_all_users_filters_by_role() {
        let mut admin = user_model(2);
        admin.role = "admin".to_string();

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[admin]])
            .into_connection();
        let db = Arc::new(db);
        let repo = shared_store(&db);

        let users = repo
            .get_all_users(Page::new(2, 0), Some(UserRole::Admin))
            .await
            .unwrap();
        assert_eq!(users.len(), 1);
        assert_eq!(users[0].role, UserRole::Admin);

        let log = format!("{:?}", transaction_log(repo, db));
        assert!(log.contains("role"));
        assert!(log.contains("ORDER BY"));
    }

    #[tokio::test]
    async fn user_info_defaults_when_never_set() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<user_info::Model>::new()])
            .append_query_results([[user_model(4)]])
            .into_connection();
        let repo = store(db);

        assert_eq!(repo.get_user_info(UserId(4)).await.unwrap(), UserInfo::default());
    }

    #[tokio::test]
    async fn user_info_for_unknown_user_is_not_found() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<user_info::Model>::new()])
            .append_query_results([Vec::<user::Model>::new()])
            .into_connection();
        let repo = store(db);

        let err = repo.get_user_info(UserId(4)).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn upsert_user_info_writes_one_statement() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results([exec(1)])
            .into_connection();
        let db = Arc::new(db);
        let repo = shared_store(&db);

        repo.upsert_user_info(
            UserId(4),
            UserInfo {
                location: Some("Lisbon".into()),
                website: None,
            },
        )
        .await
        .unwrap();

        let log = format!("{:?}", transaction_log(repo, db));
        assert!(log.contains("ON CONFLICT"));
        assert!(log.contains("DO UPDATE"));
    }
}
