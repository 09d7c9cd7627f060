//! Host abstraction for the session: persisted items, the clock, and page visibility.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use tokio::sync::mpsc;

use assess_core::Clock;
use storage::{KeyValueStore, StorageError};

/// Everything the session needs from its host environment.
#[async_trait]
pub trait Platform: Send + Sync {
    /// # Errors
    ///
    /// Returns `StorageError` if the backing store cannot be read.
    async fn get_item(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError` if the backing store cannot be written.
    async fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError` if the backing store cannot be written.
    async fn remove_item(&self, key: &str) -> Result<(), StorageError>;

    fn now(&self) -> DateTime<Utc>;

    /// Subscribe to "page hidden" reports (`true` = hidden), delivered in order.
    ///
    /// Dropping the receiver detaches the observer.
    fn on_visibility_change(&self) -> mpsc::UnboundedReceiver<bool>;
}

/// `Platform` over a `KeyValueStore`, with visibility reported by the host window.
pub struct StoragePlatform {
    store: Arc<dyn KeyValueStore>,
    clock: Mutex<Clock>,
    visibility: Mutex<Vec<mpsc::UnboundedSender<bool>>>,
}

impl StoragePlatform {
    #[must_use]
    pub fn new(store: Arc<dyn KeyValueStore>, clock: Clock) -> Self {
        Self {
            store,
            clock: Mutex::new(clock),
            visibility: Mutex::new(Vec::new()),
        }
    }

    /// Forward a visibility change from the window to every subscribed session.
    pub fn report_visibility(&self, hidden: bool) {
        self.with_observers(|observers| observers.retain(|tx| tx.send(hidden).is_ok()));
    }

    /// Number of live visibility observers.
    #[must_use]
    pub fn visibility_observers(&self) -> usize {
        self.with_observers(|observers| {
            observers.retain(|tx| !tx.is_closed());
            observers.len()
        })
    }

    fn with_observers<R>(&self, f: impl FnOnce(&mut Vec<mpsc::UnboundedSender<bool>>) -> R) -> R {
        match self.visibility.lock() {
            Ok(mut observers) => f(&mut observers),
            Err(poisoned) => f(&mut poisoned.into_inner()),
        }
    }

    /// Advance a fixed clock. Has no effect on the system clock.
    pub fn advance(&self, delta: Duration) {
        match self.clock.lock() {
            Ok(mut clock) => clock.advance(delta),
            Err(poisoned) => poisoned.into_inner().advance(delta),
        }
    }
}

#[async_trait]
impl Platform for StoragePlatform {
    async fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.store.get_item(key).await
    }

    async fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.store.set_item(key, value).await
    }

    async fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        self.store.remove_item(key).await
    }

    fn now(&self) -> DateTime<Utc> {
        match self.clock.lock() {
            Ok(clock) => clock.now(),
            Err(poisoned) => poisoned.into_inner().now(),
        }
    }

    fn on_visibility_change(&self) -> mpsc::UnboundedReceiver<bool> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.with_observers(|observers| observers.push(tx));
        rx
    }
}
