//! Storage layer for Spaces
//!
//! Provides SQL-based persistence for Spaces and their memberships.

pub mod migrations;
pub mod sql_store;

pub use migrations::{migrate, CURRENT_SPACE_SCHEMA_VERSION};
pub use sql_store::{open_pool, MemberFilter, Page, SpaceFilter, SpaceKey, SpaceSqlStore};
