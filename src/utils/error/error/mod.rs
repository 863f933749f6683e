//! Error handling for the pipeline
//!
//! This module defines all error types used throughout the crate.

#![allow(missing_docs)]

mod helpers;
#[cfg(test)]
mod tests;
mod types;

pub use types::{PipelineError, Result};
