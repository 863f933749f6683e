// Module declarations
mod connection;
mod lexeme_ops;
mod repository_impl;
mod review_ops;
mod run_ops;
mod types;

// Re-export public types
pub use types::{DatabaseBackendType, SeaOrmDatabase};
