//! User database entity for SeaORM.

use sea_orm::entity::prelude::*;

use crate::domain::{UserId, UserProfile, UserRole};
use crate::errors::AppError;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub name: String,
    #[sea_orm(unique)]
    pub email: String,
    pub email_verified: bool,
    pub password: String,
    pub role: String,
    pub bio: Option<String>,
    pub follower_count: i64,
    pub following_count: i64,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
    pub is_deleted: bool,
    /// Soft delete timestamp (NULL = active, set = deleted)
    pub deleted_at: Option<DateTimeUtc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_one = "super::user_info::Entity")]
    UserInfo,
}

impl Related<super::user_info::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::UserInfo.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Convert database model to the public profile
impl TryFrom<Model> for UserProfile {
    type Error = AppError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(UserProfile {
            id: UserId(model.id),
            name: model.name,
            email: model.email,
            email_verified: model.email_verified,
            bio: model.bio,
            role: UserRole::try_from(model.role.as_str())?,
            follower_count: model.follower_count,
            following_count: model.following_count,
            created_at: model.created_at,
            deleted_at: model.deleted_at,
        })
    }
}
