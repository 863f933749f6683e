//! # lexflow
//!
//! Batch transformation of deduplicated source lexemes, and conflict-aware
//! application of reviewed replacements back into source repositories.
//!
//! ## Pipeline
//!
//! A run claims every pending lexeme, splits the claimed set into
//! token-bounded batches and hands each batch to a worker task. Workers run a
//! processor over their batch and record per-item results; the last batch to
//! report triggers a lock-guarded finalize that closes the run. Progress is
//! kept in atomic counters and broadcast at a throttled rate.
//!
//! ```rust,no_run
//! use lexflow::{Config, Runtime};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::from_file("config/lexflow.yaml").await?;
//!     let runtime = Runtime::new(config).await?;
//!     runtime.storage.migrate().await?;
//!
//!     let run = runtime.pipeline.submit("dry-run").await?;
//!     runtime.drain().await?;
//!     println!("{:?}", runtime.pipeline.snapshot(run.id).await?);
//!     Ok(())
//! }
//! ```
//!
//! ## Patches
//!
//! [`core::patch::PatchEngine`] writes an approved review's replacement into
//! its file only if the scanned text is still there, then stages the file and
//! commits it once every review in that file is approved.

#![allow(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_inception)]

pub mod config;
pub mod core;
pub mod runtime;
pub mod storage;
pub mod utils;
pub mod vcs;

pub use config::Config;
pub use runtime::Runtime;
pub use utils::error::{PipelineError, Result};

pub use core::models::{
    ApplyStatus, Lexeme, LexemeStatus, ProcessRun, ProgressPayload, ReviewStatus, RunStatus,
};
pub use core::patch::{ApplyReport, PatchEngine};
pub use core::pipeline::Pipeline;

/// Current version of the crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
/// Name of the crate
pub const NAME: &str = env!("CARGO_PKG_NAME");
