//! Maintain command - database housekeeping.

use crate::cli::args::{MaintainAction, MaintainArgs};
use crate::config::Config;
use crate::errors::{AppError, AppResult};
use crate::infra::{Database, VacuumTarget};

/// Execute the maintain command
pub async fn execute(args: MaintainArgs, config: Config) -> AppResult<()> {
    let db = Database::connect(&config)
        .await
        .map_err(|e| AppError::internal(format!("Database connection failed: {}", e)))?;

    match args.action {
        MaintainAction::Vacuum { table } => {
            db.vacuum(VacuumTarget::from(table))
                .await
                .map_err(|e| AppError::internal(format!("Vacuum failed: {}", e)))?;
        }
    }

    Ok(())
}
