//! Follow edge between two users.

use serde::{Deserialize, Serialize};

use super::UserId;
use crate::errors::{AppError, AppResult};

/// Directed `follower -> following` edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Edge {
    pub follower_id: UserId,
    pub following_id: UserId,
}

impl Edge {
    /// Build an edge, rejecting self-follows.
    pub fn new(follower_id: UserId, following_id: UserId) -> AppResult<Self> {
        if follower_id == following_id {
            return Err(AppError::invalid_argument(format!(
                "user {} cannot follow themselves",
                follower_id
            )));
        }

        Ok(Self {
            follower_id,
            following_id,
        })
    }
}

impl std::fmt::Display for Edge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} -> {}", self.follower_id, self.following_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ErrorKind;

    #[test]
    fn self_follow_is_rejected() {
        let err = Edge::new(UserId(4), UserId(4)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    }

    #[test]
    fn distinct_users_form_an_edge() {
        let edge = Edge::new(UserId(1), UserId(2)).unwrap();
        assert_eq!(edge.follower_id, UserId(1));
        assert_eq!(edge.following_id, UserId(2));
        assert_eq!(edge.to_string(), "1 -> 2");
    }
}
