//! Awaitable result of an asynchronous execution

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use futures::channel::oneshot;

use crate::algorithm::ExecutionOutcome;
use crate::error::AlgoError;

/// Resolves once the worker has finished the run
///
/// Usable from async code via `.await` or from plain threads via
/// [`ExecutionFuture::wait`].
#[derive(Debug)]
pub struct ExecutionFuture {
    name: String,
    rx: oneshot::Receiver<ExecutionOutcome>,
}

impl ExecutionFuture {
    pub(crate) fn new(name: impl Into<String>, rx: oneshot::Receiver<ExecutionOutcome>) -> Self {
        Self {
            name: name.into(),
            rx,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Block the calling thread until the run ends
    pub fn wait(self) -> Result<ExecutionOutcome, AlgoError> {
        futures::executor::block_on(self)
    }

    /// Non-blocking check; yields the result at most once
    pub fn try_result(&mut self) -> Option<Result<ExecutionOutcome, AlgoError>> {
        match self.rx.try_recv() {
            Ok(Some(outcome)) => Some(Ok(outcome)),
            Ok(None) => None,
            Err(_) => Some(Err(self.lost())),
        }
    }

    fn lost(&self) -> AlgoError {
        AlgoError::WorkerLost {
            name: self.name.clone(),
        }
    }
}

impl Future for ExecutionFuture {
    type Output = Result<ExecutionOutcome, AlgoError>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.get_mut();
        match Pin::new(&mut this.rx).poll(cx) {
            Poll::Ready(Ok(outcome)) => Poll::Ready(Ok(outcome)),
            Poll::Ready(Err(_)) => Poll::Ready(Err(this.lost())),
            Poll::Pending => Poll::Pending,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wait_returns_sent_outcome() {
        let (tx, rx) = oneshot::channel();
        let fut = ExecutionFuture::new("Scale", rx);
        tx.send(ExecutionOutcome::Success).unwrap();
        assert_eq!(fut.wait().unwrap(), ExecutionOutcome::Success);
    }

    #[test]
    fn dropped_sender_is_worker_lost() {
        let (tx, rx) = oneshot::channel::<ExecutionOutcome>();
        let fut = ExecutionFuture::new("Scale", rx);
        drop(tx);
        assert!(matches!(
            fut.wait().unwrap_err(),
            AlgoError::WorkerLost { name } if name == "Scale"
        ));
    }

    #[test]
    fn try_result_pending_then_ready() {
        let (tx, rx) = oneshot::channel();
        let mut fut = ExecutionFuture::new("Pause", rx);
        assert!(fut.try_result().is_none());
        tx.send(ExecutionOutcome::Cancelled).unwrap();
        assert_eq!(
            fut.try_result().unwrap().unwrap(),
            ExecutionOutcome::Cancelled
        );
    }
}
