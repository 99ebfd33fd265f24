//! Repository layer - Data access abstraction
//!
//! Each repository method runs as exactly one unit of work (see
//! [`crate::infra::unit_of_work`]).

pub(crate) mod entities;
mod graph_repository;
mod user_repository;

pub use graph_repository::{GraphStore, SocialGraphRepository};
pub use user_repository::{UserRepository, UserStore};

// Export mocks for tests (both unit and downstream)
#[cfg(any(test, feature = "test-utils"))]
pub use graph_repository::MockSocialGraphRepository;
#[cfg(any(test, feature = "test-utils"))]
pub use user_repository::MockUserRepository;
