//! User domain entity and related types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::config::{ROLE_ADMIN, ROLE_USER};
use crate::errors::AppError;

/// Database-assigned user identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub i64);

impl UserId {
    pub fn get(self) -> i64 {
        self.0
    }
}

impl From<i64> for UserId {
    fn from(id: i64) -> Self {
        UserId(id)
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// User roles enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    User,
    Admin,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Admin => ROLE_ADMIN,
            UserRole::User => ROLE_USER,
        }
    }
}

/// Parse a stored role. Anything else in the column means the row is corrupt.
impl TryFrom<&str> for UserRole {
    type Error = AppError;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        match s {
            ROLE_ADMIN => Ok(UserRole::Admin),
            ROLE_USER => Ok(UserRole::User),
            other => Err(AppError::internal(format!("unknown stored role '{}'", other))),
        }
    }
}

impl From<UserRole> for String {
    fn from(role: UserRole) -> Self {
        role.as_str().to_string()
    }
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Data required to register a user.
///
/// `password` is the already-hashed credential; hashing happens upstream.
#[derive(Clone, Deserialize, Validate)]
pub struct NewUser {
    #[validate(length(min = 1, max = 50, message = "Name must be 1-50 characters"))]
    pub name: String,
    #[validate(
        email(message = "Invalid email format"),
        length(max = 254, message = "Email is too long")
    )]
    pub email: String,
    #[validate(length(min = 1, message = "Password hash is required"))]
    pub password: String,
    pub role: UserRole,
}

impl NewUser {
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            password: password.into(),
            role: UserRole::User,
        }
    }

    pub fn with_role(mut self, role: UserRole) -> Self {
        self.role = role;
        self
    }
}

// Don't expose the stored hash in debug output
impl std::fmt::Debug for NewUser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NewUser")
            .field("name", &self.name)
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .field("role", &self.role)
            .finish()
    }
}

/// Public view of a user row (never carries the password hash).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserProfile {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub email_verified: bool,
    pub bio: Option<String>,
    pub role: UserRole,
    pub follower_count: i64,
    pub following_count: i64,
    pub created_at: DateTime<Utc>,
    /// Soft delete timestamp (None = active, Some = deleted)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<DateTime<Utc>>,
}

impl UserProfile {
    /// Check if user is soft deleted
    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }
}

/// Replacement address for an existing account.
#[derive(Debug, Clone, Validate)]
pub struct EmailChange {
    #[validate(
        email(message = "Invalid email format"),
        length(max = 254, message = "Email is too long")
    )]
    pub email: String,
}

#[derive(Debug, Clone, Validate)]
pub struct NameChange {
    #[validate(length(min = 1, max = 50, message = "Name must be 1-50 characters"))]
    pub name: String,
}

/// `None` clears the bio.
#[derive(Debug, Clone, Validate)]
pub struct BioChange {
    #[validate(length(max = 160, message = "Bio must be at most 160 characters"))]
    pub bio: Option<String>,
}

/// Extended profile data kept in `user_info`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct UserInfo {
    #[validate(length(max = 100, message = "Location is too long"))]
    pub location: Option<String>,
    #[validate(
        url(message = "Website must be a valid URL"),
        length(max = 200, message = "Website is too long")
    )]
    pub website: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_round_trips_through_strings() {
        assert_eq!(UserRole::try_from("admin").unwrap(), UserRole::Admin);
        assert_eq!(UserRole::try_from("user").unwrap(), UserRole::User);
        assert_eq!(String::from(UserRole::Admin), "admin");
    }

    #[test]
    fn unknown_stored_role_is_an_internal_error() {
        let err = UserRole::try_from("moderator").unwrap_err();
        assert_eq!(err.kind(), crate::errors::ErrorKind::Internal);
    }

    #[test]
    fn new_user_validation() {
        assert!(NewUser::new("Ann", "ann@example.com", "$argon2id$hash")
            .validate()
            .is_ok());
        assert!(NewUser::new("", "ann@example.com", "hash").validate().is_err());
        assert!(NewUser::new("Ann", "not-an-email", "hash").validate().is_err());
        assert!(NewUser::new("Ann", "ann@example.com", "").validate().is_err());
        assert!(NewUser::new("a".repeat(51), "ann@example.com", "hash")
            .validate()
            .is_err());
    }

    #[test]
    fn new_user_debug_hides_password() {
        let user = NewUser::new("Ann", "ann@example.com", "super-secret-hash");
        assert!(!format!("{:?}", user).contains("super-secret-hash"));
    }

    #[test]
    fn user_info_validation() {
        let info = UserInfo {
            location: Some("Lisbon".into()),
            website: Some("https://example.com".into()),
        };
        assert!(info.validate().is_ok());

        let info = UserInfo {
            location: None,
            website: Some("not a url".into()),
        };
        assert!(info.validate().is_err());
    }

    #[test]
    fn single_field_edits_are_validated() {
        assert!(EmailChange { email: "new@example.com".into() }.validate().is_ok());
        assert!(EmailChange { email: "nope".into() }.validate().is_err());
        assert!(NameChange { name: String::new() }.validate().is_err());
        assert!(BioChange { bio: None }.validate().is_ok());
        assert!(BioChange { bio: Some("x".repeat(161)) }.validate().is_err());
    }

    #[test]
    fn profile_serializes_role_lowercase() {
        let profile = UserProfile {
            id: UserId(7),
            name: "Ann".into(),
            email: "ann@example.com".into(),
            email_verified: true,
            bio: None,
            role: UserRole::Admin,
            follower_count: 0,
            following_count: 0,
            created_at: Utc::now(),
            deleted_at: None,
        };
        let json = serde_json::to_value(&profile).unwrap();
        assert_eq!(json["role"], "admin");
        assert_eq!(json["id"], 7);
        assert!(json.get("deleted_at").is_none());
    }
}
