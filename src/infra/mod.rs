//! Infrastructure layer - PostgreSQL integration
//!
//! - Connection pool, schema contract and maintenance (`db`)
//! - Serializable unit of work (`unit_of_work`)
//! - User and social graph repositories (`repositories`)

pub mod db;
pub mod models;
pub mod repositories;
pub mod unit_of_work;

pub use db::{Database, Migrator, VacuumTarget};
pub use models::Models;
pub use repositories::{GraphStore, SocialGraphRepository, UserRepository, UserStore};
pub use unit_of_work::{Persistence, TxProfile};

#[cfg(any(test, feature = "test-utils"))]
pub use repositories::{MockSocialGraphRepository, MockUserRepository};
