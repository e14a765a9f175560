//! Integration tests for klinescope-app.
//!
//! These tests verify the interaction between components:
//! - Stream subscription lifecycle (close-before-reopen)
//! - Frame flow through parser and series store
//! - Persistence roundtrips

pub mod common;
