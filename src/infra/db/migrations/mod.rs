//! Database migrations.
//!
//! Each migration is a separate module following SeaORM conventions.
//! Migration names follow the pattern: m{YYYYMMDD}_{NNNNNN}_{description}
//!
//! Tables and indexes are created with `IF NOT EXISTS`, named constraints are
//! added behind a `pg_constraint` lookup and procedures use `CREATE OR REPLACE`,
//! so re-applying the schema over an existing database is harmless.

use sea_orm_migration::prelude::*;

mod m20240101_000001_create_users_table;
mod m20240101_000002_create_relationships_table;
mod m20240101_000003_create_user_info_table;
mod m20240101_000004_create_follow_procedures;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240101_000001_create_users_table::Migration),
            Box::new(m20240101_000002_create_relationships_table::Migration),
            Box::new(m20240101_000003_create_user_info_table::Migration),
            Box::new(m20240101_000004_create_follow_procedures::Migration),
        ]
    }
}

/// `ALTER TABLE .. ADD CONSTRAINT .. CHECK` that is a no-op when the constraint exists.
pub(crate) fn guarded_check_constraint(table: &str, name: &str, predicate: &str) -> String {
    format!(
        r#"DO $$
BEGIN
    IF NOT EXISTS (SELECT 1 FROM pg_constraint WHERE conname = '{name}') THEN
        ALTER TABLE {table} ADD CONSTRAINT {name} CHECK ({predicate});
    END IF;
END
$$;"#
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn migrations_are_ordered() {
        let names: Vec<String> = Migrator::migrations()
            .iter()
            .map(|m| m.name().to_string())
            .collect();
        let mut sorted = names.clone();
        sorted.sort();
        assert_eq!(names, sorted);
        assert_eq!(names.len(), 4);
    }

    #[test]
    fn check_constraint_is_guarded() {
        let sql = guarded_check_constraint("users", "users_x_check", "x >= 0");
        assert!(sql.contains("IF NOT EXISTS (SELECT 1 FROM pg_constraint WHERE conname = 'users_x_check')"));
        assert!(sql.contains("ALTER TABLE users ADD CONSTRAINT users_x_check CHECK (x >= 0);"));
    }
}
