// ── Single-value reactive slot ──

use std::sync::Arc;

use tokio::sync::watch;

/// Holds the latest value of a series that is always replaced wholesale.
/// `None` until the first successful load.
pub(crate) struct Slot<T: Send + Sync + 'static> {
    tx: watch::Sender<Option<Arc<T>>>,
}

impl<T: Send + Sync + 'static> Slot<T> {
    pub(crate) fn new() -> Self {
        let (tx, _) = watch::channel(None);
        Self { tx }
    }

    pub(crate) fn set(&self, value: T) {
        self.tx.send_modify(|slot| *slot = Some(Arc::new(value)));
    }

    pub(crate) fn get(&self) -> Option<Arc<T>> {
        self.tx.borrow().clone()
    }

    pub(crate) fn subscribe(&self) -> watch::Receiver<Option<Arc<T>>> {
        self.tx.subscribe()
    }
}
