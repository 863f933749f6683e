//! Configuration validation
//!
//! - `trait_def`: Core Validate trait definition
//! - `storage_validators`: Database and Redis validators
//! - `pipeline_validators`: Pipeline, queue, processor and VCS validators

mod pipeline_validators;
mod storage_validators;
mod tests;
mod trait_def;

pub use trait_def::Validate;
