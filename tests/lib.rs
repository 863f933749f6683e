//! Test suite for lexflow
//!
//! ## Test Categories
//!
//! ### 1. Common Utilities (`common/`)
//! - In-memory SQLite database helper
//! - Seed fixtures and scratch git repositories
//!
//! ### 2. Integration Tests (`integration/`)
//! - Database operations against SQLite
//! - Pipeline runs end to end over the database and local backends
//! - Patch application against a real git working tree
//! - Configuration loading
//!
//! ## Running Tests
//!
//! ```bash
//! # Run all tests
//! cargo test
//!
//! # Run only integration tests
//! cargo test --test lib
//! ```

pub mod common;
pub mod integration;
