use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use anyhow::anyhow;
use tokio::sync::oneshot::{self, error::TryRecvError};

use crate::{Error, Result};

/// Creates the two ends of one dispatched operation.
pub fn channel<T>() -> (Completion<T>, Pending<T>) {
    let (tx, rx) = oneshot::channel();
    (Completion { tx }, Pending { rx: Some(rx) })
}

fn abandoned() -> Error {
    anyhow!("Adapter dropped the operation without reporting a result")
}

/// Adapter side of an operation. Consumed by the single terminal report.
///
/// Dropping it without calling [`complete`](Self::complete) resolves the
/// matching [`Pending`] to an error.
#[derive(Debug)]
pub struct Completion<T> {
    tx: oneshot::Sender<Result<T>>,
}

impl<T> Completion<T> {
    pub fn complete(self, result: Result<T>) {
        // the caller may have dropped its `Pending`; nothing to report then
        let _ = self.tx.send(result);
    }

    pub fn succeed(self, value: T) {
        self.complete(Ok(value))
    }

    pub fn fail(self, err: impl Into<Error>) {
        self.complete(Err(err.into()))
    }

    /// True once the caller has dropped its `Pending`.
    pub fn is_abandoned(&self) -> bool {
        self.tx.is_closed()
    }
}

/// Caller side of an operation accepted by the bound adapter.
///
/// Yields exactly one result. It stays valid after the session switches to
/// another account; results from the superseded adapter still arrive here.
#[derive(Debug)]
pub struct Pending<T> {
    rx: Option<oneshot::Receiver<Result<T>>>,
}

impl<T> Pending<T> {
    /// Takes the result if the adapter has already reported one.
    ///
    /// Returns `None` while the operation is still running, and once the
    /// result has been taken.
    pub fn try_take(&mut self) -> Option<Result<T>> {
        let result = match self.rx.as_mut()?.try_recv() {
            Ok(result) => result,
            Err(TryRecvError::Empty) => return None,
            Err(TryRecvError::Closed) => Err(abandoned()),
        };
        self.rx = None;
        Some(result)
    }

    pub fn is_taken(&self) -> bool {
        self.rx.is_none()
    }
}

impl<T> Future for Pending<T> {
    type Output = Result<T>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.get_mut();
        let rx = this
            .rx
            .as_mut()
            .expect("Pending polled after its result was taken");
        let received = match Pin::new(rx).poll(cx) {
            Poll::Ready(received) => received,
            Poll::Pending => return Poll::Pending,
        };
        this.rx = None;
        Poll::Ready(received.unwrap_or_else(|_| Err(abandoned())))
    }
}
