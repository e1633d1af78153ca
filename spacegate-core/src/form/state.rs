//! Form state machine
//!
//! ```text
//! Editing --submit--> Submitting --ok--> Succeeded
//!    ^                    |
//!    +----- Failed <--err-+
//! ```

use super::error::{CreateSpaceError, FormError};
use super::ui::Route;
use crate::core_space::{validate_space_fields, Space, ValidationError};
use crate::gateway::SpaceCreateArgs;
use crate::types::UserId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormState {
    Editing,
    Submitting,
    Succeeded,
    Failed,
}

/// The "create a Space" form
#[derive(Debug, Clone)]
pub struct CreateSpaceForm {
    name: String,
    slug: String,
    state: FormState,
    last_error: Option<CreateSpaceError>,
}

impl Default for CreateSpaceForm {
    fn default() -> Self {
        Self::new()
    }
}

impl CreateSpaceForm {
    pub fn new() -> Self {
        Self {
            name: String::new(),
            slug: String::new(),
            state: FormState::Editing,
            last_error: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn slug(&self) -> &str {
        &self.slug
    }

    pub fn state(&self) -> FormState {
        self.state
    }

    pub fn last_error(&self) -> Option<&CreateSpaceError> {
        self.last_error.as_ref()
    }

    fn editable(&self) -> bool {
        matches!(self.state, FormState::Editing | FormState::Failed)
    }

    fn require_editable(&self, action: &'static str) -> Result<(), FormError> {
        if self.editable() {
            Ok(())
        } else {
            Err(FormError::InvalidState {
                action,
                state: self.state,
            })
        }
    }

    pub fn set_name(&mut self, name: impl Into<String>) -> Result<(), FormError> {
        self.require_editable("edit")?;
        self.name = name.into();
        self.state = FormState::Editing;
        Ok(())
    }

    pub fn set_slug(&mut self, slug: impl Into<String>) -> Result<(), FormError> {
        self.require_editable("edit")?;
        self.slug = slug.into();
        self.state = FormState::Editing;
        Ok(())
    }

    /// Field check without touching state
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_space_fields(&self.name, &self.slug)
    }

    /// Whether the submit control is enabled
    pub fn can_submit(&self) -> bool {
        self.editable() && self.validate().is_ok()
    }

    /// Editing -> Submitting; yields the request to send
    pub fn begin_submit(&mut self, creator: &UserId) -> Result<SpaceCreateArgs, FormError> {
        self.require_editable("submit")?;
        self.validate()?;

        self.state = FormState::Submitting;
        self.last_error = None;
        Ok(SpaceCreateArgs::for_creator(
            self.name.clone(),
            self.slug.clone(),
            creator.clone(),
        ))
    }

    /// Submitting -> Succeeded; yields where to go next
    pub fn succeed(&mut self, space: &Space) -> Result<Route, FormError> {
        self.require_submitting("complete")?;
        self.state = FormState::Succeeded;
        Ok(Route::Space(space.slug.clone()))
    }

    /// Submitting -> Failed
    pub fn fail(&mut self, error: CreateSpaceError) -> Result<(), FormError> {
        self.require_submitting("fail")?;
        self.state = FormState::Failed;
        self.last_error = Some(error);
        Ok(())
    }

    /// Failed -> Editing, keeping the entered values
    pub fn resume_editing(&mut self) {
        if self.state == FormState::Failed {
            self.state = FormState::Editing;
        }
    }

    /// Leave the form without creating anything
    pub fn cancel(&mut self) -> Result<Route, FormError> {
        self.require_editable("cancel")?;
        Ok(Route::Home)
    }

    fn require_submitting(&self, action: &'static str) -> Result<(), FormError> {
        if self.state == FormState::Submitting {
            Ok(())
        } else {
            Err(FormError::InvalidState {
                action,
                state: self.state,
            })
        }
    }
}
