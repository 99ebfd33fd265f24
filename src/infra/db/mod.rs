//! Database connection and initialization.

use std::sync::Arc;

use sea_orm::{
    ConnectOptions, ConnectionTrait, Database as SeaDatabase, DatabaseConnection, DbErr, Statement,
};
use sea_orm_migration::MigratorTrait;

use crate::config::Config;

pub mod migrations;

pub use migrations::Migrator;

/// Target of a `VACUUM` run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VacuumTarget {
    Database,
    Users,
}

impl VacuumTarget {
    fn statement(self) -> &'static str {
        match self {
            VacuumTarget::Database => "VACUUM",
            VacuumTarget::Users => "VACUUM users",
        }
    }
}

/// Database wrapper for connection management
#[derive(Clone)]
pub struct Database {
    connection: Arc<DatabaseConnection>,
}

impl Database {
    /// Open the connection pool and make sure the server answers.
    ///
    /// The schema is not touched; call [`Database::migrate`] once at startup.
    pub async fn connect(config: &Config) -> Result<Self, DbErr> {
        let mut options = ConnectOptions::new(config.database_url.clone());
        options
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .connect_timeout(config.connect_timeout)
            .acquire_timeout(config.acquire_timeout)
            .sqlx_logging(config.sql_logging);

        tracing::info!("Connecting to database");
        let connection = SeaDatabase::connect(options).await?;

        let db = Self {
            connection: Arc::new(connection),
        };
        db.ping().await?;
        tracing::info!("Database connected");

        Ok(db)
    }

    /// Wrap an existing connection (pooled or mock).
    pub fn from_connection(connection: DatabaseConnection) -> Self {
        Self {
            connection: Arc::new(connection),
        }
    }

    /// Get a reference to the database connection.
    pub fn connection(&self) -> &DatabaseConnection {
        &self.connection
    }

    /// Shared handle to the pool, for the repositories.
    pub fn get_connection(&self) -> Arc<DatabaseConnection> {
        Arc::clone(&self.connection)
    }

    /// Apply the schema contract. Idempotent; DDL errors propagate.
    pub async fn migrate(&self) -> Result<(), DbErr> {
        Migrator::up(self.connection(), None).await?;
        tracing::info!("Schema up to date");
        Ok(())
    }

    /// Rollback the last migration.
    pub async fn rollback_migration(&self) -> Result<(), DbErr> {
        Migrator::down(self.connection(), Some(1)).await
    }

    /// Get migration status (list all migrations with applied status).
    pub async fn migration_status(&self) -> Result<Vec<(String, bool)>, DbErr> {
        use sea_orm::{EntityTrait, QueryOrder};
        use sea_orm_migration::seaql_migrations;

        // Get applied migrations from database
        let applied: std::collections::HashSet<String> = seaql_migrations::Entity::find()
            .order_by_asc(seaql_migrations::Column::Version)
            .all(self.connection())
            .await?
            .into_iter()
            .map(|m| m.version)
            .collect();

        // Map all defined migrations with their applied status
        let migrations: Vec<(String, bool)> = Migrator::migrations()
            .iter()
            .map(|m| {
                let name = m.name().to_string();
                let is_applied = applied.contains(&name);
                (name, is_applied)
            })
            .collect();

        Ok(migrations)
    }

    /// Drop everything and re-apply the schema.
    pub async fn fresh_migrations(&self) -> Result<(), DbErr> {
        Migrator::fresh(self.connection()).await
    }

    /// Check database connectivity by executing a simple query.
    pub async fn ping(&self) -> Result<(), DbErr> {
        self.connection
            .execute(Statement::from_string(
                self.connection.get_database_backend(),
                "SELECT 1".to_string(),
            ))
            .await?;
        Ok(())
    }

    /// Reclaim dead tuples. Runs on a pooled connection outside any
    /// transaction, since Postgres refuses `VACUUM` inside one.
    pub async fn vacuum(&self, target: VacuumTarget) -> Result<(), DbErr> {
        tracing::info!(?target, "Vacuuming");
        let result = self
            .connection
            .execute_unprepared(target.statement())
            .await?;
        tracing::info!(rows_affected = result.rows_affected(), "Vacuum finished");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};

    use super::*;

    #[test]
    fn vacuum_statements() {
        assert_eq!(VacuumTarget::Database.statement(), "VACUUM");
        assert_eq!(VacuumTarget::Users.statement(), "VACUUM users");
    }

    #[tokio::test]
    async fn ping_runs_a_trivial_query() {
        let conn = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 1,
            }])
            .into_connection();
        let db = Database::from_connection(conn);
        assert!(db.ping().await.is_ok());
    }

    #[tokio::test]
    async fn vacuum_propagates_failures() {
        let conn = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_errors([DbErr::Custom("permission denied".into())])
            .into_connection();
        let db = Database::from_connection(conn);
        assert!(db.vacuum(VacuumTarget::Users).await.is_err());
    }
}
