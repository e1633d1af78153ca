//! Field rules for Space name and slug
//!
//! The same rules gate the client-side submit button and the server-side
//! create path; only the server-side check is authoritative.

use thiserror::Error;

pub const NAME_MIN_LEN: usize = 4;
pub const NAME_MAX_LEN: usize = 20;
pub const SLUG_MIN_LEN: usize = 4;
pub const SLUG_MAX_LEN: usize = 16;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Space name must be 4-20 characters (got {0})")]
    NameLength(usize),

    #[error("Space slug must be 4-16 characters (got {0})")]
    SlugLength(usize),

    #[error("Space slug may only contain ASCII letters and digits (found {0:?})")]
    SlugCharacter(char),
}

impl ValidationError {
    /// Name of the offending field
    pub fn field(&self) -> &'static str {
        match self {
            ValidationError::NameLength(_) => "name",
            ValidationError::SlugLength(_) | ValidationError::SlugCharacter(_) => "slug",
        }
    }
}

/// Check a Space name: 4 to 20 characters
pub fn validate_name(name: &str) -> Result<(), ValidationError> {
    let len = name.chars().count();
    if (NAME_MIN_LEN..=NAME_MAX_LEN).contains(&len) {
        Ok(())
    } else {
        Err(ValidationError::NameLength(len))
    }
}

/// Check a Space slug: `^[0-9a-zA-Z]{4,16}$`
pub fn validate_slug(slug: &str) -> Result<(), ValidationError> {
    if let Some(bad) = slug.chars().find(|c| !c.is_ascii_alphanumeric()) {
        return Err(ValidationError::SlugCharacter(bad));
    }

    // All characters are ASCII at this point, so byte length is char length.
    let len = slug.len();
    if (SLUG_MIN_LEN..=SLUG_MAX_LEN).contains(&len) {
        Ok(())
    } else {
        Err(ValidationError::SlugLength(len))
    }
}

/// Check both fields, reporting the name first
pub fn validate_space_fields(name: &str, slug: &str) -> Result<(), ValidationError> {
    validate_name(name)?;
    validate_slug(slug)
}
