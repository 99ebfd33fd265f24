//! Repository container handed to callers.
//!
//! The backing stores are type parameters, fixed when the container is
//! built. Production code uses the PostgreSQL stores; tests swap in mocks.

use std::sync::Arc;

use super::db::Database;
use super::repositories::{GraphStore, SocialGraphRepository, UserRepository, UserStore};
use super::unit_of_work::Persistence;
use crate::config::Config;

/// Both repositories, sharing one connection pool.
pub struct Models<U = UserStore, G = GraphStore> {
    users: Arc<U>,
    graph: Arc<G>,
}

impl<U, G> Clone for Models<U, G> {
    fn clone(&self) -> Self {
        Self {
            users: Arc::clone(&self.users),
            graph: Arc::clone(&self.graph),
        }
    }
}

impl<U, G> Models<U, G>
where
    U: UserRepository,
    G: SocialGraphRepository,
{
    pub fn new(users: U, graph: G) -> Self {
        Self {
            users: Arc::new(users),
            graph: Arc::new(graph),
        }
    }

    pub fn users(&self) -> &U {
        &self.users
    }

    pub fn graph(&self) -> &G {
        &self.graph
    }
}

impl Models {
    /// PostgreSQL-backed repositories over an open pool.
    pub fn from_database(db: &Database, config: &Config) -> Self {
        let persistence =
            Persistence::new(db.get_connection()).with_timeout(config.transaction_timeout);

        Self::new(
            UserStore::new(persistence.clone()),
            GraphStore::new(persistence),
        )
    }
}
