//! Database storage implementation using SeaORM
//!
//! Holds lexemes, runs, results and the review side (repositories, files,
//! occurrences, reviews). SQLite and PostgreSQL are both supported.

/// Database entities module
pub mod entities;
/// Database migration module
pub mod migration;
/// SeaORM database implementation module
pub mod seaorm_db;

pub use seaorm_db::SeaOrmDatabase as Database;
pub use seaorm_db::{DatabaseBackendType, SeaOrmDatabase};
