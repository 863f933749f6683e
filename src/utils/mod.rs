//! Utility modules
//!
//! - **error**: Error type and result alias
//! - **logging**: Tracing subscriber setup

pub mod error;
pub mod logging;
