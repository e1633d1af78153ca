//! Space data structures

use super::types::SpaceId;
use crate::types::{Timestamp, UserId};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A Space is a tenant: a workspace addressed by its unique slug
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Space {
    /// Unique identifier
    pub id: SpaceId,

    /// Human-readable name
    pub name: String,

    /// Globally unique, URL-safe identifier
    pub slug: String,

    /// When the Space was created
    pub created_at: Timestamp,

    /// Last time Space metadata was updated
    pub updated_at: Timestamp,

    /// Memberships, in join order
    #[serde(default)]
    pub members: Vec<SpaceMember>,
}

impl Space {
    /// Get a member's role
    pub fn role_of(&self, user_id: &UserId) -> Option<SpaceRole> {
        self.members
            .iter()
            .find(|m| &m.user_id == user_id)
            .map(|m| m.role)
    }

    /// Check if a user is a member
    pub fn is_member(&self, user_id: &UserId) -> bool {
        self.role_of(user_id).is_some()
    }

    /// Check if a user has admin privileges
    pub fn is_admin(&self, user_id: &UserId) -> bool {
        self.role_of(user_id) == Some(SpaceRole::Admin)
    }

    /// Path of the Space detail view
    pub fn path(&self) -> String {
        format!("/space/{}", self.slug)
    }
}

/// Membership of a user in a Space
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpaceMember {
    pub space_id: SpaceId,
    pub user_id: UserId,
    pub role: SpaceRole,
    pub joined_at: Timestamp,
}

/// Space-level roles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SpaceRole {
    /// Can manage the Space and its members
    Admin,
    /// Default role
    User,
}

impl SpaceRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            SpaceRole::Admin => "ADMIN",
            SpaceRole::User => "USER",
        }
    }
}

impl fmt::Display for SpaceRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SpaceRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ADMIN" => Ok(SpaceRole::Admin),
            "USER" => Ok(SpaceRole::User),
            other => Err(format!("unknown space role '{}'", other)),
        }
    }
}

/// Input for creating a Space together with its initial memberships
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewSpace {
    pub name: String,
    pub slug: String,
    pub members: Vec<NewMember>,
}

/// Membership to create alongside a new Space
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewMember {
    pub user_id: UserId,
    pub role: SpaceRole,
}

impl NewSpace {
    /// A Space whose only member is its creator, as `ADMIN`
    pub fn with_creator(name: impl Into<String>, slug: impl Into<String>, creator: UserId) -> Self {
        Self {
            name: name.into(),
            slug: slug.into(),
            members: vec![NewMember {
                user_id: creator,
                role: SpaceRole::Admin,
            }],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_space(owner: &UserId) -> Space {
        let id = SpaceId::generate();
        let now = Timestamp::now();
        Space {
            id,
            name: "Acme Corp".to_string(),
            slug: "acme1".to_string(),
            created_at: now,
            updated_at: now,
            members: vec![SpaceMember {
                space_id: id,
                user_id: owner.clone(),
                role: SpaceRole::Admin,
                joined_at: now,
            }],
        }
    }

    #[test]
    fn test_member_queries() {
        let alice = UserId::new("alice");
        let bob = UserId::new("bob");
        let space = sample_space(&alice);

        assert!(space.is_member(&alice));
        assert!(space.is_admin(&alice));
        assert!(!space.is_member(&bob));
        assert_eq!(space.role_of(&bob), None);
        assert_eq!(space.path(), "/space/acme1");
    }

    #[test]
    fn test_role_wire_format() {
        assert_eq!(serde_json::to_string(&SpaceRole::Admin).unwrap(), "\"ADMIN\"");
        assert_eq!("USER".parse::<SpaceRole>().unwrap(), SpaceRole::User);
        assert!("admin".parse::<SpaceRole>().is_err());
    }

    #[test]
    fn test_space_json_uses_camel_case() {
        let space = sample_space(&UserId::new("alice"));
        let json = serde_json::to_value(&space).unwrap();
        assert_eq!(json["slug"], "acme1");
        assert!(json.get("createdAt").is_some());
        assert_eq!(json["members"][0]["userId"], "alice");
        assert_eq!(json["members"][0]["role"], "ADMIN");
    }

    #[test]
    fn test_new_space_with_creator() {
        let creator = UserId::new("alice");
        let new = NewSpace::with_creator("Acme Corp", "acme1", creator.clone());
        assert_eq!(new.members.len(), 1);
        assert_eq!(new.members[0].user_id, creator);
        assert_eq!(new.members[0].role, SpaceRole::Admin);
    }
}
