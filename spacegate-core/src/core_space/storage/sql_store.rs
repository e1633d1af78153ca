//! SQL-based storage implementation for Spaces
//!
//! The store knows nothing about callers: visibility is expressed through
//! filters (`SpaceFilter::member`, `MemberFilter::visible_to`) that the
//! scoped gateway client fills in.

use super::super::error::{DataError, DataErrorKind};
use super::super::space::{NewSpace, Space, SpaceMember, SpaceRole};
use super::super::types::SpaceId;
use super::super::validation::validate_space_fields;
use crate::config::StoreConfig;
use crate::types::{Timestamp, UserId};
use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Row};
use tracing::debug;

/// How to address a single Space
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpaceKey {
    Id(SpaceId),
    Slug(String),
}

/// Filter for Space queries; `None` fields match everything
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SpaceFilter {
    /// Only Spaces this user is a member of
    pub member: Option<UserId>,
    pub id: Option<SpaceId>,
    pub slug: Option<String>,
    pub name: Option<String>,
}

/// Filter for membership queries; `None` fields match everything
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemberFilter {
    /// Only memberships of Spaces this user belongs to
    pub visible_to: Option<UserId>,
    pub space_id: Option<SpaceId>,
    pub user_id: Option<UserId>,
    pub role: Option<SpaceRole>,
}

/// Pagination window
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Page {
    pub take: Option<u32>,
    pub skip: u32,
}

impl Page {
    pub fn first() -> Self {
        Page {
            take: Some(1),
            skip: 0,
        }
    }

    fn limit(&self) -> i64 {
        // SQLite treats a negative LIMIT as "no limit"
        self.take.map(i64::from).unwrap_or(-1)
    }
}

/// Build a connection pool from configuration
pub fn open_pool(config: &StoreConfig) -> Result<Pool<SqliteConnectionManager>, DataError> {
    let busy_timeout = config.busy_timeout;
    let init = move |conn: &mut Connection| {
        conn.busy_timeout(busy_timeout)?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")
    };

    // Every in-memory connection is its own database, so the pool holds one.
    let pool = if config.is_in_memory() {
        Pool::builder()
            .max_size(1)
            .build(SqliteConnectionManager::memory().with_init(init))?
    } else {
        if let Some(parent) = config.database_path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                DataError::new(
                    DataErrorKind::Connection,
                    format!("Failed to create {}: {}", parent.display(), e),
                )
            })?;
        }
        Pool::builder()
            .max_size(config.pool_size)
            .build(SqliteConnectionManager::file(&config.database_path).with_init(init))?
    };

    Ok(pool)
}

fn space_id_column(row: &Row<'_>, idx: usize) -> rusqlite::Result<SpaceId> {
    let bytes: Vec<u8> = row.get(idx)?;
    SpaceId::from_slice(&bytes).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            idx,
            Type::Blob,
            format!("space id must be 32 bytes, got {}", bytes.len()).into(),
        )
    })
}

fn role_column(row: &Row<'_>, idx: usize) -> rusqlite::Result<SpaceRole> {
    let raw: String = row.get(idx)?;
    raw.parse()
        .map_err(|e: String| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, e.into()))
}

fn timestamp_column(row: &Row<'_>, idx: usize) -> rusqlite::Result<Timestamp> {
    Ok(Timestamp::from_millis(row.get::<_, i64>(idx)?.max(0) as u64))
}

fn space_row(row: &Row<'_>) -> rusqlite::Result<Space> {
    Ok(Space {
        id: space_id_column(row, 0)?,
        name: row.get(1)?,
        slug: row.get(2)?,
        created_at: timestamp_column(row, 3)?,
        updated_at: timestamp_column(row, 4)?,
        members: Vec::new(),
    })
}

fn member_row(row: &Row<'_>) -> rusqlite::Result<SpaceMember> {
    Ok(SpaceMember {
        space_id: space_id_column(row, 0)?,
        user_id: UserId::new(row.get::<_, String>(1)?),
        role: role_column(row, 2)?,
        joined_at: timestamp_column(row, 3)?,
    })
}

fn load_members(conn: &Connection, space_id: &SpaceId) -> Result<Vec<SpaceMember>, DataError> {
    let mut stmt = conn.prepare_cached(
        "SELECT space_id, user_id, role, joined_at
         FROM space_members WHERE space_id = ?
         ORDER BY joined_at, rowid",
    )?;

    let members = stmt
        .query_map(params![space_id.as_bytes()], member_row)?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(members)
}

/// SQL-based storage for Spaces and memberships
#[derive(Clone)]
pub struct SpaceSqlStore {
    pool: Pool<SqliteConnectionManager>,
}

impl SpaceSqlStore {
    /// Create a new SQL store with the given connection pool
    pub fn new(pool: Pool<SqliteConnectionManager>) -> Result<Self, DataError> {
        super::migrations::migrate(&pool)?;
        Ok(Self { pool })
    }

    /// Open the store described by `config`
    pub fn open(config: &StoreConfig) -> Result<Self, DataError> {
        Self::new(open_pool(config)?)
    }

    /// Create a new in-memory store
    pub fn in_memory() -> Result<Self, DataError> {
        Self::open(&StoreConfig::in_memory())
    }

    /// The underlying pool, shared with other stores on the same database
    pub fn pool(&self) -> &Pool<SqliteConnectionManager> {
        &self.pool
    }

    /// Liveness check against the pool
    pub fn ping(&self) -> Result<(), DataError> {
        let conn = self.pool.get()?;
        conn.query_row("SELECT 1", [], |row| row.get::<_, i64>(0))?;
        Ok(())
    }

    // ===== Space Operations =====

    /// Insert a Space and its memberships in one transaction
    pub fn create_space(&self, new: &NewSpace) -> Result<Space, DataError> {
        validate_space_fields(&new.name, &new.slug)?;
        if new.members.is_empty() {
            return Err(DataError::new(
                DataErrorKind::Validation,
                "A space needs at least one member",
            )
            .with_target("members"));
        }

        let mut conn = self.pool.get()?;
        let tx = conn.transaction()?;

        let id = SpaceId::generate();
        let now = Timestamp::now();

        tx.execute(
            "INSERT INTO spaces (id, name, slug, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?)",
            params![
                id.as_bytes(),
                &new.name,
                &new.slug,
                now.as_millis() as i64,
                now.as_millis() as i64,
            ],
        )?;

        let mut members = Vec::with_capacity(new.members.len());
        for member in &new.members {
            tx.execute(
                "INSERT INTO space_members (space_id, user_id, role, joined_at)
                 VALUES (?, ?, ?, ?)",
                params![
                    id.as_bytes(),
                    member.user_id.as_str(),
                    member.role.as_str(),
                    now.as_millis() as i64,
                ],
            )?;
            members.push(SpaceMember {
                space_id: id,
                user_id: member.user_id.clone(),
                role: member.role,
                joined_at: now,
            });
        }

        tx.commit()?;
        debug!(space_id = %id, slug = %new.slug, "space created");

        Ok(Space {
            id,
            name: new.name.clone(),
            slug: new.slug.clone(),
            created_at: now,
            updated_at: now,
            members,
        })
    }

    /// Get a single Space with its members
    pub fn find_space(&self, key: &SpaceKey) -> Result<Option<Space>, DataError> {
        let filter = match key {
            SpaceKey::Id(id) => SpaceFilter {
                id: Some(*id),
                ..Default::default()
            },
            SpaceKey::Slug(slug) => SpaceFilter {
                slug: Some(slug.clone()),
                ..Default::default()
            },
        };
        Ok(self.find_spaces(&filter, Page::first())?.into_iter().next())
    }

    /// List Spaces matching `filter`, newest first
    pub fn find_spaces(&self, filter: &SpaceFilter, page: Page) -> Result<Vec<Space>, DataError> {
        let conn = self.pool.get()?;

        let mut stmt = conn.prepare_cached(
            "SELECT s.id, s.name, s.slug, s.created_at, s.updated_at
             FROM spaces s
             WHERE (?1 IS NULL OR EXISTS (
                        SELECT 1 FROM space_members m
                        WHERE m.space_id = s.id AND m.user_id = ?1))
               AND (?2 IS NULL OR s.id = ?2)
               AND (?3 IS NULL OR s.slug = ?3)
               AND (?4 IS NULL OR s.name = ?4)
             ORDER BY s.created_at DESC, s.rowid DESC
             LIMIT ?5 OFFSET ?6",
        )?;

        let mut spaces = stmt
            .query_map(
                params![
                    filter.member.as_ref().map(UserId::as_str),
                    filter.id.as_ref().map(|id| id.as_bytes().to_vec()),
                    filter.slug.as_deref(),
                    filter.name.as_deref(),
                    page.limit(),
                    i64::from(page.skip),
                ],
                space_row,
            )?
            .collect::<Result<Vec<_>, _>>()?;

        for space in &mut spaces {
            space.members = load_members(&conn, &space.id)?;
        }

        Ok(spaces)
    }

    /// Count Spaces matching `filter`
    pub fn count_spaces(&self, filter: &SpaceFilter) -> Result<u64, DataError> {
        let conn = self.pool.get()?;

        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM spaces s
             WHERE (?1 IS NULL OR EXISTS (
                        SELECT 1 FROM space_members m
                        WHERE m.space_id = s.id AND m.user_id = ?1))
               AND (?2 IS NULL OR s.id = ?2)
               AND (?3 IS NULL OR s.slug = ?3)
               AND (?4 IS NULL OR s.name = ?4)",
            params![
                filter.member.as_ref().map(UserId::as_str),
                filter.id.as_ref().map(|id| id.as_bytes().to_vec()),
                filter.slug.as_deref(),
                filter.name.as_deref(),
            ],
            |row| row.get(0),
        )?;

        Ok(count.max(0) as u64)
    }

    /// Check whether `slug` is already taken
    pub fn slug_exists(&self, slug: &str) -> Result<bool, DataError> {
        let conn = self.pool.get()?;
        let found = conn
            .query_row("SELECT 1 FROM spaces WHERE slug = ?", params![slug], |row| {
                row.get::<_, i64>(0)
            })
            .optional()?;
        Ok(found.is_some())
    }

    // ===== Membership Operations =====

    /// List memberships matching `filter`, in join order
    pub fn find_members(
        &self,
        filter: &MemberFilter,
        page: Page,
    ) -> Result<Vec<SpaceMember>, DataError> {
        let conn = self.pool.get()?;

        let mut stmt = conn.prepare_cached(
            "SELECT m.space_id, m.user_id, m.role, m.joined_at
             FROM space_members m
             WHERE (?1 IS NULL OR m.space_id IN (
                        SELECT v.space_id FROM space_members v WHERE v.user_id = ?1))
               AND (?2 IS NULL OR m.space_id = ?2)
               AND (?3 IS NULL OR m.user_id = ?3)
               AND (?4 IS NULL OR m.role = ?4)
             ORDER BY m.joined_at, m.rowid
             LIMIT ?5 OFFSET ?6",
        )?;

        let members = stmt
            .query_map(
                params![
                    filter.visible_to.as_ref().map(UserId::as_str),
                    filter.space_id.as_ref().map(|id| id.as_bytes().to_vec()),
                    filter.user_id.as_ref().map(UserId::as_str),
                    filter.role.map(|r| r.as_str()),
                    page.limit(),
                    i64::from(page.skip),
                ],
                member_row,
            )?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(members)
    }

    /// Count memberships matching `filter`
    pub fn count_members(&self, filter: &MemberFilter) -> Result<u64, DataError> {
        let conn = self.pool.get()?;

        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM space_members m
             WHERE (?1 IS NULL OR m.space_id IN (
                        SELECT v.space_id FROM space_members v WHERE v.user_id = ?1))
               AND (?2 IS NULL OR m.space_id = ?2)
               AND (?3 IS NULL OR m.user_id = ?3)
               AND (?4 IS NULL OR m.role = ?4)",
            params![
                filter.visible_to.as_ref().map(UserId::as_str),
                filter.space_id.as_ref().map(|id| id.as_bytes().to_vec()),
                filter.user_id.as_ref().map(UserId::as_str),
                filter.role.map(|r| r.as_str()),
            ],
            |row| row.get(0),
        )?;

        Ok(count.max(0) as u64)
    }
}
