//! Test utilities and helpers for SpaceGate
//!
//! Fixtures for stores and Spaces, plus recording doubles for the form's
//! notifier, navigator and creator.

pub mod doubles;
pub mod fixtures;

pub use doubles::*;
pub use fixtures::*;
