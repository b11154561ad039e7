//! Fixed-size worker pool

use std::fmt;
use std::sync::Arc;

use futures::channel::oneshot;
use rayon::{ThreadPool, ThreadPoolBuilder};
use tracing::error;

use crate::error::AlgoError;

/// Worker threads that run asynchronous executions
///
/// Cloning shares the same threads.
#[derive(Clone)]
pub struct WorkerPool {
    pool: Arc<ThreadPool>,
    size: usize,
}

impl WorkerPool {
    pub fn new(threads: usize) -> Result<Self, AlgoError> {
        let size = threads.max(1);
        let pool = ThreadPoolBuilder::new()
            .num_threads(size)
            .thread_name(|i| format!("algorun-worker-{i}"))
            // A panicking job drops its sender; the waiter sees WorkerLost
            .panic_handler(|_| error!("worker job panicked"))
            .build()
            .map_err(|e| AlgoError::Pool(e.to_string()))?;
        Ok(Self {
            pool: Arc::new(pool),
            size,
        })
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// Run `job` on a worker, returning a receiver for its result
    pub fn submit<T, F>(&self, job: F) -> oneshot::Receiver<T>
    where
        T: Send + 'static,
        F: FnOnce() -> T + Send + 'static,
    {
        let (tx, rx) = oneshot::channel();
        self.pool.spawn(move || {
            // Receiver may have been dropped; nothing to report then
            let _ = tx.send(job());
        });
        rx
    }
}

impl fmt::Debug for WorkerPool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WorkerPool").field("size", &self.size).finish()
    }
}
