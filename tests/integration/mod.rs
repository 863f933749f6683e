//! Integration tests for lexflow
//!
//! These exercise several components together against real SQLite, real
//! files and, when installed, a real git binary.

pub mod config_tests;
pub mod database_tests;
pub mod patch_tests;
pub mod pipeline_tests;
