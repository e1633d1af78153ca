//! Typed operation arguments
//!
//! Payloads mirror the familiar `{ where, data, take, skip }` query shape.
//! Unknown fields are rejected so a typo never silently widens a query.

use super::error::GatewayError;
use crate::core_space::{
    MemberFilter, NewMember, NewSpace, Page, SpaceFilter, SpaceId, SpaceKey, SpaceRole,
};
use crate::types::UserId;
use serde::{Deserialize, Serialize};

/// A single value or a list of them
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany<T> {
    One(T),
    Many(Vec<T>),
}

impl<T> OneOrMany<T> {
    pub fn into_vec(self) -> Vec<T> {
        match self {
            OneOrMany::One(item) => vec![item],
            OneOrMany::Many(items) => items,
        }
    }
}

/// `space.create` arguments
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SpaceCreateArgs {
    pub data: SpaceCreateData,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SpaceCreateData {
    pub name: String,
    pub slug: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub members: Option<NestedMemberCreate>,
}

/// `members: { create: ... }`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NestedMemberCreate {
    pub create: OneOrMany<MemberCreateData>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub struct MemberCreateData {
    pub user_id: UserId,
    #[serde(default = "default_role")]
    pub role: SpaceRole,
}

fn default_role() -> SpaceRole {
    SpaceRole::User
}

impl SpaceCreateArgs {
    /// Arguments creating a Space whose only member is `creator`, as `ADMIN`
    pub fn for_creator(name: impl Into<String>, slug: impl Into<String>, creator: UserId) -> Self {
        Self {
            data: SpaceCreateData {
                name: name.into(),
                slug: slug.into(),
                members: Some(NestedMemberCreate {
                    create: OneOrMany::Many(vec![MemberCreateData {
                        user_id: creator,
                        role: SpaceRole::Admin,
                    }]),
                }),
            },
        }
    }

    /// Flatten into the storage input
    pub fn into_new_space(self) -> NewSpace {
        let members = self
            .data
            .members
            .map(|nested| nested.create.into_vec())
            .unwrap_or_default()
            .into_iter()
            .map(|m| NewMember {
                user_id: m.user_id,
                role: m.role,
            })
            .collect();

        NewSpace {
            name: self.data.name,
            slug: self.data.slug,
            members,
        }
    }
}

/// `where` for `space.findUnique`: exactly one of `id` or `slug`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SpaceWhereUnique {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<SpaceId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
}

impl SpaceWhereUnique {
    pub fn slug(slug: impl Into<String>) -> Self {
        Self {
            id: None,
            slug: Some(slug.into()),
        }
    }

    pub fn key(&self) -> Result<SpaceKey, GatewayError> {
        match (&self.id, &self.slug) {
            (Some(id), None) => Ok(SpaceKey::Id(*id)),
            (None, Some(slug)) => Ok(SpaceKey::Slug(slug.clone())),
            _ => Err(GatewayError::InvalidPayload(
                "findUnique requires exactly one of `id` or `slug`".to_string(),
            )),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SpaceFindUniqueArgs {
    #[serde(rename = "where")]
    pub filter: SpaceWhereUnique,
}

/// `where` for `space.findFirst`, `findMany` and `count`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SpaceWhere {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<SpaceId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl SpaceWhere {
    /// Storage filter restricted to Spaces `member` belongs to
    pub fn scoped_to(&self, member: &UserId) -> SpaceFilter {
        SpaceFilter {
            member: Some(member.clone()),
            id: self.id,
            slug: self.slug.clone(),
            name: self.name.clone(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SpaceFindManyArgs {
    #[serde(rename = "where", default)]
    pub filter: SpaceWhere,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub take: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skip: Option<u32>,
}

impl SpaceFindManyArgs {
    pub fn page(&self) -> Page {
        Page {
            take: self.take,
            skip: self.skip.unwrap_or(0),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SpaceCountArgs {
    #[serde(rename = "where", default)]
    pub filter: SpaceWhere,
}

/// `where` for `spaceUser.findMany` and `count`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub struct SpaceUserWhere {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub space_id: Option<SpaceId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<UserId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<SpaceRole>,
}

impl SpaceUserWhere {
    /// Storage filter restricted to Spaces `viewer` belongs to
    pub fn scoped_to(&self, viewer: &UserId) -> MemberFilter {
        MemberFilter {
            visible_to: Some(viewer.clone()),
            space_id: self.space_id,
            user_id: self.user_id.clone(),
            role: self.role,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SpaceUserFindManyArgs {
    #[serde(rename = "where", default)]
    pub filter: SpaceUserWhere,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub take: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skip: Option<u32>,
}

impl SpaceUserFindManyArgs {
    pub fn page(&self) -> Page {
        Page {
            take: self.take,
            skip: self.skip.unwrap_or(0),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SpaceUserCountArgs {
    #[serde(rename = "where", default)]
    pub filter: SpaceUserWhere,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_create_payload_shape() {
        let args = SpaceCreateArgs::for_creator("Acme Corp", "acme1", UserId::new("u1"));
        assert_eq!(
            serde_json::to_value(&args).unwrap(),
            json!({
                "data": {
                    "name": "Acme Corp",
                    "slug": "acme1",
                    "members": { "create": [{ "userId": "u1", "role": "ADMIN" }] }
                }
            })
        );
    }

    #[test]
    fn test_nested_create_accepts_single_object() {
        let args: SpaceCreateArgs = serde_json::from_value(json!({
            "data": {
                "name": "Acme Corp",
                "slug": "acme1",
                "members": { "create": { "userId": "u1", "role": "ADMIN" } }
            }
        }))
        .unwrap();

        let new = args.into_new_space();
        assert_eq!(new.members.len(), 1);
        assert_eq!(new.members[0].role, SpaceRole::Admin);
    }

    #[test]
    fn test_member_role_defaults_to_user() {
        let member: MemberCreateData = serde_json::from_value(json!({ "userId": "u1" })).unwrap();
        assert_eq!(member.role, SpaceRole::User);
    }

    #[test]
    fn test_unknown_fields_rejected() {
        let result: Result<SpaceCreateArgs, _> = serde_json::from_value(json!({
            "data": { "name": "Acme Corp", "slug": "acme1", "owner": "u1" }
        }));
        assert!(result.is_err());

        let result: Result<SpaceFindManyArgs, _> =
            serde_json::from_value(json!({ "where": { "slugg": "acme1" } }));
        assert!(result.is_err());
    }

    #[test]
    fn test_where_unique_requires_one_key() {
        assert!(SpaceWhereUnique::default().key().is_err());
        assert_eq!(
            SpaceWhereUnique::slug("acme1").key().unwrap(),
            SpaceKey::Slug("acme1".to_string())
        );

        let both = SpaceWhereUnique {
            id: Some(SpaceId::from_bytes([7; 32])),
            slug: Some("acme1".to_string()),
        };
        assert!(both.key().is_err());
    }

    #[test]
    fn test_empty_read_payloads() {
        let args: SpaceFindManyArgs = serde_json::from_value(json!({})).unwrap();
        assert_eq!(args.page(), Page::default());

        let args: SpaceUserCountArgs = serde_json::from_value(json!({})).unwrap();
        assert_eq!(args.filter, SpaceUserWhere::default());
    }

    #[test]
    fn test_scoped_filters_bind_caller() {
        let caller = UserId::new("u1");
        let filter = SpaceWhere {
            slug: Some("acme1".to_string()),
            ..Default::default()
        }
        .scoped_to(&caller);
        assert_eq!(filter.member, Some(caller.clone()));
        assert_eq!(filter.slug.as_deref(), Some("acme1"));

        let filter = SpaceUserWhere::default().scoped_to(&caller);
        assert_eq!(filter.visible_to, Some(caller));
    }
}
