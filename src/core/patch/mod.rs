//! Patch Application Engine
//!
//! Writes an approved review's replacement into its file, guarded by a
//! compare-and-swap on the text recorded at scan time, then stages the file
//! and commits it once every review in the file is approved.

mod engine;
mod splice;


pub use engine::{ApplyReport, PatchEngine};
pub use splice::{Span, SpliceOutcome, splice};
