//! Social Graph - transactional user and follow-graph store on PostgreSQL
//!
//! Every repository call is one SERIALIZABLE unit of work. Follower and
//! following counters on `users` are kept equal to the edges in
//! `relationships` by server-side `follow` / `unfollow` functions.
//!
//! # Architecture Layers
//!
//! - **cli**: Command-line interface
//! - **commands**: CLI command implementations
//! - **config**: Application configuration and constants
//! - **domain**: Core entities (users, edges)
//! - **infra**: Database, schema contract, unit of work, repositories
//! - **retry**: Caller-side backoff for retryable outcomes
//! - **types**: Shared types (pagination)
//! - **errors**: Centralized error handling
//!
//! # CLI Usage
//!
//! ```bash
//! # Apply the schema contract
//! cargo run -- migrate up
//!
//! # Verify connectivity
//! cargo run -- check
//!
//! # Vacuum the users table
//! cargo run -- maintain vacuum --table users
//! ```

pub mod cli;
pub mod commands;
pub mod config;
pub mod domain;
pub mod errors;
pub mod infra;
pub mod retry;
pub mod types;

// Re-export commonly used types at crate root
pub use config::Config;
pub use domain::{Edge, NewUser, UserId, UserInfo, UserProfile, UserRole};
pub use errors::{AppError, AppResult, ErrorKind};
pub use infra::{Database, Models, SocialGraphRepository, UserRepository};
pub use types::Page;
