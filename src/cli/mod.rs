//! CLI module - Command-line interface for the application.
//!
//! Provides commands for:
//! - `migrate` - Schema contract management
//! - `check` - Connectivity and schema status
//! - `maintain` - Database maintenance

pub mod args;

pub use args::{Cli, Commands};
