use crate::error::ReleaseError;
use std::sync::{Mutex, PoisonError};
use tokio::sync::oneshot;
use tracing::{debug, warn};
use uuid::Uuid;

/// Handle to an active change-watch.
///
/// The watch itself runs elsewhere (usually a connection task) and stops when the paired
/// receiver fires or is dropped. Releasing is idempotent; dropping the handle releases it.
#[derive(Debug)]
pub struct Subscription {
    id: Uuid,
    table: String,
    stop: Mutex<Option<oneshot::Sender<()>>>,
}

impl Subscription {
    /// Creates a handle plus the receiver the watching side listens on for release.
    pub fn new(table: impl Into<String>) -> (Self, oneshot::Receiver<()>) {
        let (tx, rx) = oneshot::channel();
        let sub = Self {
            id: Uuid::new_v4(),
            table: table.into(),
            stop: Mutex::new(Some(tx)),
        };
        (sub, rx)
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    /// False once released, or once the watching side has gone away.
    pub fn is_active(&self) -> bool {
        self.stop
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .is_some_and(|tx| !tx.is_closed())
    }

    /// Stops the watch.
    ///
    /// Only the first call does anything. It fails with [`ReleaseError::ConnectionClosed`]
    /// when the watching side had already stopped; every later call returns `Ok`.
    pub fn unsubscribe(&self) -> Result<(), ReleaseError> {
        let sender = self
            .stop
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();

        match sender {
            None => Ok(()),
            Some(tx) => tx.send(()).map_err(|()| ReleaseError::ConnectionClosed),
        }
    }

    /// [`unsubscribe`](Self::unsubscribe), logging instead of returning a failure.
    pub fn release(&self) {
        match self.unsubscribe() {
            Ok(()) => debug!(subscription = %self.id, table = %self.table, "Subscription released"),
            Err(e) => warn!(
                subscription = %self.id,
                table = %self.table,
                error = %e,
                "Subscription release failed"
            ),
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        let pending = self
            .stop
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some();
        if pending {
            self.release();
        }
    }
}
