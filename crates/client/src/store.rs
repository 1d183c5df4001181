//! Process-wide observable values.
//!
//! A [`Store`] owns a single value and publishes every replacement to all
//! subscribers. One instance per value exists per process, constructed by
//! [`crate::Storefront`] and handed by reference to every consumer - there
//! is no ambient global lookup. Subscribers get a read-only view; mutation
//! goes through the component that owns the store.

use std::sync::Arc;

use tokio::sync::watch;

/// A read-only subscription to a [`Store`].
///
/// `borrow()` reads the latest published value without blocking;
/// `changed().await` suspends until the next publish.
pub type Subscription<T> = watch::Receiver<T>;

/// An observable, process-wide value.
///
/// Cloning the store clones a handle to the same underlying value; the
/// handles publish and observe the same state.
#[derive(Debug)]
pub struct Store<T> {
    tx: Arc<watch::Sender<T>>,
}

impl<T> Clone for Store<T> {
    fn clone(&self) -> Self {
        Self {
            tx: Arc::clone(&self.tx),
        }
    }
}

impl<T: Clone + Send + Sync + 'static> Store<T> {
    /// Create a store holding `initial`.
    #[must_use]
    pub fn new(initial: T) -> Self {
        let (tx, _rx) = watch::channel(initial);
        Self { tx: Arc::new(tx) }
    }

    /// Replace the held value and notify all subscribers.
    ///
    /// Publishing succeeds even when nobody is subscribed.
    pub fn publish(&self, value: T) {
        self.tx.send_replace(value);
    }

    /// Clone of the latest published value.
    #[must_use]
    pub fn get(&self) -> T {
        self.tx.borrow().clone()
    }

    /// Read the latest published value through a closure, without cloning.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.tx.borrow())
    }

    /// A new read-only subscription positioned at the current value.
    #[must_use]
    pub fn subscribe(&self) -> Subscription<T> {
        self.tx.subscribe()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_get_returns_latest_value() {
        let store = Store::new(1_u32);
        assert_eq!(store.get(), 1);

        store.publish(2);
        assert_eq!(store.get(), 2);
    }

    #[tokio::test]
    async fn test_clones_share_state() {
        let store = Store::new(String::from("a"));
        let other = store.clone();

        other.publish(String::from("b"));
        assert_eq!(store.get(), "b");
    }

    #[tokio::test]
    async fn test_subscription_sees_publish() {
        let store = Store::new(0_u32);
        let mut sub = store.subscribe();

        store.publish(7);
        sub.changed().await.unwrap();
        assert_eq!(*sub.borrow(), 7);
    }

    #[tokio::test]
    async fn test_publish_without_subscribers_is_fine() {
        let store = Store::new(0_u32);
        store.publish(1);
        store.publish(2);
        assert_eq!(store.get(), 2);
    }

    #[tokio::test]
    async fn test_with_avoids_clone() {
        let store = Store::new(vec![1_u32, 2, 3]);
        let sum: u32 = store.with(|v| v.iter().sum());
        assert_eq!(sum, 6);
    }
}
