//! Unit of Work: one transaction per repository call.
//!
//! Every repository method hands its statements to [`Persistence::write`] or
//! [`Persistence::read`]. The closure receives the open transaction; when it
//! returns `Ok` the transaction is committed, otherwise it is rolled back.
//! A panic or a dropped (cancelled / timed-out) future drops the
//! `DatabaseTransaction`, which queues a rollback on the pooled connection, so
//! no exit path leaves a transaction open.

use std::sync::Arc;
use std::time::Duration;

use futures::future::BoxFuture;
use sea_orm::{
    AccessMode, DatabaseConnection, DatabaseTransaction, IsolationLevel, TransactionTrait,
};

use crate::errors::{AppError, AppResult};

/// Future returned by a unit-of-work closure, borrowing the transaction.
pub type TxFuture<'a, T> = BoxFuture<'a, AppResult<T>>;

/// Isolation profile of a unit of work. Both run at SERIALIZABLE.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TxProfile {
    ReadWrite,
    ReadOnly,
}

impl TxProfile {
    fn access_mode(self) -> AccessMode {
        match self {
            TxProfile::ReadWrite => AccessMode::ReadWrite,
            TxProfile::ReadOnly => AccessMode::ReadOnly,
        }
    }
}

/// Transaction runner shared by the repositories.
#[derive(Clone)]
pub struct Persistence {
    db: Arc<DatabaseConnection>,
    timeout: Option<Duration>,
}

impl Persistence {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db, timeout: None }
    }

    /// Abandon (and roll back) any unit of work running longer than `timeout`.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Run `f` in a SERIALIZABLE, READ WRITE transaction.
    pub async fn write<F, T>(&self, f: F) -> AppResult<T>
    where
        F: for<'a> FnOnce(&'a DatabaseTransaction) -> TxFuture<'a, T> + Send,
        T: Send,
    {
        self.execute(TxProfile::ReadWrite, f).await
    }

    /// Run `f` in a SERIALIZABLE, READ ONLY transaction.
    pub async fn read<F, T>(&self, f: F) -> AppResult<T>
    where
        F: for<'a> FnOnce(&'a DatabaseTransaction) -> TxFuture<'a, T> + Send,
        T: Send,
    {
        self.execute(TxProfile::ReadOnly, f).await
    }

    async fn execute<F, T>(&self, profile: TxProfile, f: F) -> AppResult<T>
    where
        F: for<'a> FnOnce(&'a DatabaseTransaction) -> TxFuture<'a, T> + Send,
        T: Send,
    {
        let work = self.execute_transaction(profile, f);

        match self.timeout {
            Some(limit) => tokio::time::timeout(limit, work).await.map_err(|_| {
                tracing::warn!(?profile, ?limit, "Unit of work timed out, rolled back");
                AppError::Retryable(format!("transaction exceeded {:?}", limit))
            })?,
            None => work.await,
        }
    }

    async fn execute_transaction<F, T>(&self, profile: TxProfile, f: F) -> AppResult<T>
    where
        F: for<'a> FnOnce(&'a DatabaseTransaction) -> TxFuture<'a, T> + Send,
        T: Send,
    {
        let txn = self
            .db
            .begin_with_config(
                Some(IsolationLevel::Serializable),
                Some(profile.access_mode()),
            )
            .await
            .map_err(AppError::from)?;

        let outcome = f(&txn).await;

        match outcome {
            // Serialization failures frequently surface at COMMIT
            Ok(result) => {
                txn.commit().await.map_err(AppError::from)?;
                Ok(result)
            }
            Err(e) => {
                if let Err(rollback_err) = txn.rollback().await {
                    tracing::error!("Transaction rollback failed: {}", rollback_err);
                }
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};

    use super::*;
    use crate::errors::ErrorKind;

    fn mock_persistence() -> Persistence {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 1,
            }])
            .into_connection();
        Persistence::new(Arc::new(db))
    }

    #[tokio::test]
    async fn commits_the_closure_result() {
        let persistence = mock_persistence();
        let value = persistence
            .write(|_txn| Box::pin(async move { Ok(41 + 1) }))
            .await
            .unwrap();
        assert_eq!(value, 42);
    }

    #[tokio::test]
    async fn closure_errors_are_returned_unchanged() {
        let persistence = mock_persistence();
        let err = persistence
            .read(|_txn| Box::pin(async move { Err::<(), _>(AppError::NotFound) }))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn slow_units_of_work_become_retryable() {
        let persistence = mock_persistence().with_timeout(Some(Duration::from_millis(10)));
        let err = persistence
            .write(|_txn| {
                Box::pin(async move {
                    tokio::time::sleep(Duration::from_secs(5)).await;
                    Ok(())
                })
            })
            .await
            .unwrap_err();
        assert!(err.is_retryable());
    }

    #[test]
    fn profiles_map_to_access_modes() {
        assert!(matches!(
            TxProfile::ReadOnly.access_mode(),
            AccessMode::ReadOnly
        ));
        assert!(matches!(
            TxProfile::ReadWrite.access_mode(),
            AccessMode::ReadWrite
        ));
    }
}
