//! Run pipeline: dispatch, batch workers, finalize, progress broadcast
//!
//! All coordination between stages goes through the counter store and the
//! repository's conditional updates. Every stage is safe to re-run:
//!
//! - dispatch only starts a `pending` run and initializes counters write-once
//! - workers only touch lexemes they still hold in `processing` and mark each
//!   batch done once
//! - finalize closes a run under a per-run lock, after re-checking that every
//!   batch reported

mod core;
mod dispatch;
mod finalize;
mod keys;
mod progress;
mod worker;


pub use self::core::Pipeline;
pub use dispatch::DispatchOutcome;
pub use finalize::FinalizeOutcome;
pub use keys::{Counter, RunKeys};
pub use worker::BatchOutcome;
