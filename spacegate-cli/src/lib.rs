//! SpaceGate command-line client
//!
//! Talks to a running `spacegate-api` over HTTP and drives the Space
//! creation form from the terminal.

pub mod client;
pub mod terminal;

pub use client::{ClientError, GatewayClient, SessionInfo};
pub use terminal::{TerminalNavigator, TerminalNotifier};
