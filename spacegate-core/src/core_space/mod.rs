//! Space management
//!
//! This module provides the data structures, field rules and persistence for
//! Spaces: tenant workspaces addressed by a globally unique slug.
//!
//! ## Key Invariants
//!
//! 1. A slug identifies at most one Space
//! 2. A Space is created together with its memberships, atomically
//! 3. Two roles: `ADMIN` and `USER`

pub mod error;
pub mod space;
pub mod storage;
pub mod types;
pub mod validation;

pub use error::{DataError, DataErrorKind};
pub use space::{NewMember, NewSpace, Space, SpaceMember, SpaceRole};
pub use storage::{MemberFilter, Page, SpaceFilter, SpaceKey, SpaceSqlStore};
pub use types::{ParseSpaceIdError, SpaceId};
pub use validation::{validate_name, validate_slug, validate_space_fields, ValidationError};
