//! Common test utilities for lexflow
//!
//! - In-memory SQLite database support
//! - Seed fixtures and scratch git repositories

pub mod database;
pub mod fixtures;

pub use database::TestDatabase;
pub use fixtures::{GitScratch, local_pipeline};

/// Assert that a result is Ok and return the value
#[macro_export]
macro_rules! assert_ok {
    ($expr:expr) => {
        match $expr {
            Ok(v) => v,
            Err(e) => panic!("Expected Ok, got Err: {:?}", e),
        }
    };
}
