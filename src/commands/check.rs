//! Check command - connectivity and schema status.

use super::migrate::print_status;
use crate::config::Config;
use crate::errors::{AppError, AppResult};
use crate::infra::Database;

/// Execute the check command
pub async fn execute(config: Config) -> AppResult<()> {
    tracing::debug!(?config, "Checking database");

    // connect() already pings
    let db = Database::connect(&config)
        .await
        .map_err(|e| AppError::internal(format!("Database connection failed: {}", e)))?;

    let status = db
        .migration_status()
        .await
        .map_err(|e| AppError::internal(e.to_string()))?;
    print_status(&status);

    let pending = status.iter().filter(|(_, applied)| !applied).count();
    if pending > 0 {
        tracing::warn!(pending, "Schema is behind; run `migrate up`");
    } else {
        tracing::info!("Database reachable and schema up to date");
    }

    Ok(())
}
