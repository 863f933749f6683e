//! Redis connectivity
//!
//! - `pool` - Client and shared multiplexed connection
//! - `tests` - Module tests
//!
//! Counter, broadcast and queue backends build on the pool.

mod pool;

pub use pool::RedisPool;
