//! Runtime Module - background execution
//!
//! - `pool`: fixed-size worker pool shared by every algorithm of a framework
//! - `future`: awaitable result of one asynchronous execution
//!
//! The synchronous engine lives in `executor`; this module only moves it
//! onto worker threads.

mod future;
mod pool;

pub use future::ExecutionFuture;
pub use pool::WorkerPool;
