//! Limit/offset bounds shared by every listing.

use serde::Deserialize;

use crate::config::{DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};
use crate::errors::{AppError, AppResult};

/// Listing window: at most `limit` rows after skipping `offset` matches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct Page {
    #[serde(default = "default_limit")]
    pub limit: u64,
    #[serde(default)]
    pub offset: u64,
}

fn default_limit() -> u64 {
    DEFAULT_PAGE_SIZE
}

impl Page {
    pub fn new(limit: u64, offset: u64) -> Self {
        Self { limit, offset }
    }

    /// Reject bounds the database would choke on or that are plainly wrong.
    pub fn validate(&self) -> AppResult<()> {
        if self.limit == 0 || self.limit > MAX_PAGE_SIZE {
            return Err(AppError::invalid_argument(format!(
                "limit must be between 1 and {}, got {}",
                MAX_PAGE_SIZE, self.limit
            )));
        }
        // Postgres OFFSET is a signed bigint
        if self.offset > i64::MAX as u64 {
            return Err(AppError::invalid_argument(format!(
                "offset {} is out of range",
                self.offset
            )));
        }
        Ok(())
    }
}

impl Default for Page {
    fn default() -> Self {
        Self {
            limit: DEFAULT_PAGE_SIZE,
            offset: 0,
        }
    }
}
