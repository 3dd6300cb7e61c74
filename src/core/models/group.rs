use super::user::User;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "UPPERCASE")] // Ensures JSON uses "OWNER" / "ADMIN" / "MEMBER"
pub enum Role {
    Owner,
    Admin,
    Member,
}

impl Role {
    /// Position in the member < admin < owner lattice.
    fn rank(self) -> u8 {
        match self {
            Role::Member => 0,
            Role::Admin => 1,
            Role::Owner => 2,
        }
    }

    pub fn at_least(self, other: Role) -> bool {
        self.rank() >= other.rank()
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Role::Owner => "OWNER",
            Role::Admin => "ADMIN",
            Role::Member => "MEMBER",
        };
        write!(f, "{}", s)
    }
}

/// Capabilities of a caller within a group, derived purely from their role.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, ToSchema)]
pub struct GroupPermissions {
    pub can_edit: bool,
    pub can_delete: bool,
    pub can_invite: bool,
    pub can_remove_members: bool,
    pub can_transfer_ownership: bool,
}

impl GroupPermissions {
    pub fn for_role(role: Role) -> Self {
        match role {
            Role::Owner => GroupPermissions {
                can_edit: true,
                can_delete: true,
                can_invite: true,
                can_remove_members: true,
                can_transfer_ownership: true,
            },
            Role::Admin => GroupPermissions {
                can_edit: true,
                can_delete: false,
                can_invite: true,
                can_remove_members: true,
                can_transfer_ownership: false,
            },
            Role::Member => GroupPermissions {
                can_edit: false,
                can_delete: false,
                can_invite: false,
                can_remove_members: false,
                can_transfer_ownership: false,
            },
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct GroupMember {
    pub user: User,
    pub role: Role,
    #[serde(with = "chrono::serde::ts_seconds")]
    #[schema(value_type = String, example = "2024-06-01T12:34:56Z")]
    pub joined_at: chrono::DateTime<chrono::Utc>,
}

impl GroupMember {
    pub fn is_owner(&self) -> bool {
        self.role == Role::Owner
    }
}

/// A trust circle controlling resource visibility. Exactly one member holds
/// the Owner role at any time.
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct Group {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub avatar_url: Option<String>,
    pub created_by_id: String,
    pub members: Vec<GroupMember>,
    #[serde(with = "chrono::serde::ts_seconds")]
    #[schema(value_type = String, example = "2024-06-01T12:34:56Z")]
    pub created_at: chrono::DateTime<chrono::Utc>,
    #[serde(with = "chrono::serde::ts_seconds")]
    #[schema(value_type = String, example = "2024-06-01T12:34:56Z")]
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl Group {
    pub fn role_of(&self, user_id: &str) -> Option<Role> {
        self.members.iter().find(|m| m.user.id == user_id).map(|m| m.role)
    }
}
