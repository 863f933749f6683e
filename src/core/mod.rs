//! Core functionality
//!
//! Domain models, the batching engine, processors, the run pipeline and the
//! patch application engine.

pub mod batch;
pub mod models;
pub mod patch;
pub mod pipeline;
pub mod processor;
