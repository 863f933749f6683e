//! Batching engine
//!
//! Splits a work-item set into groups bounded by an estimated token budget.

mod planner;
mod tokens;


pub use planner::{Batch, plan_batches};
pub use tokens::{TokenCost, estimate_tokens};
