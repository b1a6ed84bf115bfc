//! Cancellation context threaded through introspection.
//!
//! A [`Context`] is cheap to clone. It is cancelled when any of its cancel
//! handles fires or when its deadline passes. Drivers and the metadata reader
//! race their work against [`Context::cancelled`].

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use tokio::sync::watch;
use tokio::time::Instant;

/// Ambient cancellation state for one import run.
#[derive(Debug, Clone, Default)]
pub struct Context {
    signals: Vec<watch::Receiver<bool>>,
    deadline: Option<Instant>,
}

/// Handle that cancels the context it was created with.
#[derive(Debug)]
pub struct CancelHandle {
    tx: watch::Sender<bool>,
}

impl CancelHandle {
    /// Cancel the associated context and every context derived from it.
    pub fn cancel(&self) {
        self.tx.send_replace(true);
    }
}

impl Context {
    /// A context that is never cancelled.
    pub fn background() -> Self {
        Self::default()
    }

    /// Derive a context that can additionally be cancelled through the returned handle.
    pub fn with_cancel(&self) -> (Self, CancelHandle) {
        let (tx, rx) = watch::channel(false);
        let mut cx = self.clone();
        cx.signals.push(rx);
        (cx, CancelHandle { tx })
    }

    /// Derive a context whose deadline is at most `timeout` from now.
    pub fn with_timeout(&self, timeout: Duration) -> Self {
        let deadline = Instant::now() + timeout;
        let mut cx = self.clone();
        cx.deadline = Some(match self.deadline {
            Some(existing) if existing < deadline => existing,
            _ => deadline,
        });
        cx
    }

    /// The deadline, if any.
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Whether the context has been cancelled or its deadline has passed.
    pub fn is_cancelled(&self) -> bool {
        if self.signals.iter().any(|rx| *rx.borrow()) {
            return true;
        }
        self.deadline.is_some_and(|d| Instant::now() >= d)
    }

    /// Completes once the context is cancelled. Never completes for a background context.
    pub async fn cancelled(&self) {
        let deadline = self.deadline;
        let expired = async move {
            match deadline {
                Some(d) => tokio::time::sleep_until(d).await,
                None => std::future::pending::<()>().await,
            }
        };

        if self.signals.is_empty() {
            return expired.await;
        }

        let signals: Vec<Pin<Box<dyn Future<Output = ()> + Send>>> = self
            .signals
            .iter()
            .cloned()
            .map(|mut rx| {
                Box::pin(async move {
                    loop {
                        if *rx.borrow_and_update() {
                            return;
                        }
                        // Sender dropped without cancelling: this signal can no longer fire.
                        if rx.changed().await.is_err() {
                            std::future::pending::<()>().await;
                        }
                    }
                }) as Pin<Box<dyn Future<Output = ()> + Send>>
            })
            .collect();

        tokio::select! {
            _ = futures::future::select_all(signals) => {}
            _ = expired => {}
        }
    }
}
