//! Integration test utilities for the promotion core
//!
//! This crate wires the promotion service, notification bus and dialog
//! behavior together over the in-memory store and recording collaborators.

pub mod fixtures;
pub mod helpers;

pub use fixtures::*;
pub use helpers::*;
