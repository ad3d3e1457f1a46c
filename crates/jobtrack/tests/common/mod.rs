//! Shared test utilities for jobtrack integration tests.
//!
//! This module provides:
//! - `TestHarness` for isolated pipeline runs over temp directories
//! - Fake collaborators (token provider, mail source, classifier, report sink)
//! - Builders for records and inbox messages

pub mod builders;
pub mod harness;

pub use builders::*;
pub use harness::*;
