//! Domain layer - Core business entities and logic
//!
//! Plain data types shared by the repositories and their callers. Nothing in
//! here touches the database.

pub mod relationship;
pub mod user;

pub use relationship::Edge;
pub use user::{
    BioChange, EmailChange, NameChange, NewUser, UserId, UserInfo, UserProfile, UserRole,
};
