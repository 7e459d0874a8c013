//! Generic config store with change notification.
//!
//! `ConfigStore<T>` holds an immutable snapshot behind `Arc<T>` in a
//! `tokio::sync::watch` channel. Updates swap the whole snapshot, so a reader
//! never observes a half-applied change.

use std::sync::Arc;
use tokio::sync::watch;

/// A shared configuration snapshot with change notification.
pub struct ConfigStore<T> {
    tx: Arc<watch::Sender<Arc<T>>>,
}

/// Receives notifications when a [`ConfigStore`] is updated.
pub struct ConfigWatcher<T> {
    rx: watch::Receiver<Arc<T>>,
}

impl<T> ConfigStore<T> {
    pub fn new(initial: T) -> Self {
        let (tx, _) = watch::channel(Arc::new(initial));
        Self { tx: Arc::new(tx) }
    }

    /// Replace the stored value and notify all watchers.
    pub fn update(&self, value: T) {
        self.tx.send_replace(Arc::new(value));
    }

    /// The current snapshot.
    pub fn read(&self) -> Arc<T> {
        Arc::clone(&self.tx.borrow())
    }

    pub fn subscribe(&self) -> ConfigWatcher<T> {
        ConfigWatcher {
            rx: self.tx.subscribe(),
        }
    }
}

impl<T> Clone for ConfigStore<T> {
    fn clone(&self) -> Self {
        Self {
            tx: Arc::clone(&self.tx),
        }
    }
}

impl<T> ConfigWatcher<T> {
    /// Wait until the config store is updated.
    ///
    /// Returns `Err` once the [`ConfigStore`] and all its clones are dropped.
    pub async fn changed(&mut self) -> Result<(), watch::error::RecvError> {
        self.rx.changed().await
    }

    /// The latest snapshot, marking it as seen.
    pub fn latest(&mut self) -> Arc<T> {
        Arc::clone(&self.rx.borrow_and_update())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_update_wakes_watcher() {
        let store = ConfigStore::new(vec![1u32]);
        let mut watcher = store.subscribe();
        let before = store.read();

        store.update(vec![1, 2]);
        watcher.changed().await.unwrap();
        assert_eq!(*watcher.latest(), vec![1, 2]);
        assert_eq!(*before, vec![1]);
        assert_eq!(*store.clone().read(), vec![1, 2]);
    }
}
