//! Current-value observables.

use std::sync::Arc;
use tokio::sync::watch;

/// A published value plus change notification.
///
/// Readers either poll [`Observable::get`] or hold a receiver from
/// [`Observable::subscribe`] and await `changed()`. Clones share the same
/// underlying value.
#[derive(Debug)]
pub struct Observable<T> {
    sender: Arc<watch::Sender<T>>,
}

impl<T> Observable<T> {
    /// Create an observable holding `initial`.
    pub fn new(initial: T) -> Self {
        let (sender, _) = watch::channel(initial);
        Self {
            sender: Arc::new(sender),
        }
    }

    /// Subscribe to changes; the receiver starts at the current value.
    pub fn subscribe(&self) -> watch::Receiver<T> {
        self.sender.subscribe()
    }

    /// Publish a new value, notifying every subscriber.
    pub fn set(&self, value: T) {
        self.sender.send_replace(value);
    }

    /// Borrow the current value.
    pub fn borrow(&self) -> watch::Ref<'_, T> {
        self.sender.borrow()
    }
}

impl<T: Clone> Observable<T> {
    /// Clone out the current value.
    pub fn get(&self) -> T {
        self.sender.borrow().clone()
    }
}

impl<T: PartialEq> Observable<T> {
    /// Publish only when the value differs from the current one.
    pub fn set_if_changed(&self, value: T) -> bool {
        self.sender.send_if_modified(|current| {
            if *current == value {
                false
            } else {
                *current = value;
                true
            }
        })
    }
}

impl<T> Clone for Observable<T> {
    fn clone(&self) -> Self {
        Self {
            sender: Arc::clone(&self.sender),
        }
    }
}

impl<T: Default> Default for Observable<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}
