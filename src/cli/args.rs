//! CLI argument definitions.
//!
//! Uses clap derive macros for type-safe argument parsing.

use clap::{Parser, Subcommand, ValueEnum};

use crate::infra::VacuumTarget;

/// Social graph store - schema management and maintenance
#[derive(Parser, Debug)]
#[command(name = "social-graph")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Database connection string (overrides DATABASE_URL)
    #[arg(long, global = true)]
    pub database_url: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run database migrations
    Migrate(MigrateArgs),

    /// Verify connectivity and report schema status
    Check,

    /// Database maintenance
    Maintain(MaintainArgs),
}

/// Arguments for the migrate command
#[derive(Parser, Debug)]
pub struct MigrateArgs {
    #[command(subcommand)]
    pub action: MigrateAction,
}

/// Migration actions
#[derive(Subcommand, Debug)]
pub enum MigrateAction {
    /// Run pending migrations
    Up,
    /// Rollback last migration
    Down,
    /// Show migration status
    Status,
    /// Reset and re-run all migrations
    Fresh,
}

/// Arguments for the maintain command
#[derive(Parser, Debug)]
pub struct MaintainArgs {
    #[command(subcommand)]
    pub action: MaintainAction,
}

#[derive(Subcommand, Debug)]
pub enum MaintainAction {
    /// Reclaim storage held by dead rows
    Vacuum {
        /// Limit the run to one table
        #[arg(long, value_enum)]
        table: Option<VacuumTable>,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum VacuumTable {
    Users,
}

impl From<Option<VacuumTable>> for VacuumTarget {
    fn from(table: Option<VacuumTable>) -> Self {
        match table {
            Some(VacuumTable::Users) => VacuumTarget::Users,
            None => VacuumTarget::Database,
        }
    }
}
