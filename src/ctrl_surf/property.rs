use crossbeam_channel as channel;
use parking_lot::Mutex;
use std::{
    fmt,
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    },
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ObserverId(u64);

enum Observer<T> {
    Callback(Arc<dyn Fn(&T) + Send + Sync>),
    Channel(channel::Sender<T>),
}

impl<T> Clone for Observer<T> {
    fn clone(&self) -> Self {
        match self {
            Observer::Callback(cb) => Observer::Callback(cb.clone()),
            Observer::Channel(tx) => Observer::Channel(tx.clone()),
        }
    }
}

/// A value with change notifications.
///
/// Observers are notified on every update, even if the value didn't change.
/// Notifications are delivered synchronously on the thread which updated
/// the value, after the value is stored, and without holding any lock:
/// observers can read or subscribe to any `Observable`.
pub struct Observable<T> {
    value: Mutex<T>,
    observers: Mutex<Vec<(ObserverId, Observer<T>)>>,
    next_id: AtomicU64,
}

impl<T: Clone + Send + 'static> Observable<T> {
    pub fn new(value: T) -> Self {
        Self {
            value: Mutex::new(value),
            observers: Mutex::new(Vec::new()),
            next_id: AtomicU64::new(0),
        }
    }

    pub fn get(&self) -> T {
        self.value.lock().clone()
    }

    /// Calls `f` with each new value.
    pub fn subscribe(&self, f: impl Fn(&T) + Send + Sync + 'static) -> ObserverId {
        self.add(Observer::Callback(Arc::new(f)))
    }

    /// Returns a channel receiving each new value.
    ///
    /// The channel is dropped from the observers once the receiver is dropped.
    pub fn watch(&self) -> channel::Receiver<T> {
        let (tx, rx) = channel::unbounded();
        self.add(Observer::Channel(tx));

        rx
    }

    pub fn unsubscribe(&self, id: ObserverId) -> bool {
        let mut observers = self.observers.lock();
        let len = observers.len();
        observers.retain(|(cur, _)| *cur != id);

        observers.len() != len
    }

    pub fn observer_count(&self) -> usize {
        self.observers.lock().len()
    }

    /// Stores `value` and notifies the observers.
    pub(crate) fn publish(&self, value: T) {
        *self.value.lock() = value.clone();

        let observers = self.observers.lock().clone();
        let mut disconnected = Vec::new();
        for (id, observer) in observers {
            match observer {
                Observer::Callback(cb) => cb(&value),
                Observer::Channel(tx) => {
                    if tx.send(value.clone()).is_err() {
                        disconnected.push(id);
                    }
                }
            }
        }

        if !disconnected.is_empty() {
            self.observers
                .lock()
                .retain(|(id, _)| !disconnected.contains(id));
        }
    }

    fn add(&self, observer: Observer<T>) -> ObserverId {
        let id = ObserverId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.observers.lock().push((id, observer));

        id
    }
}

impl<T: Clone + Send + Default + 'static> Default for Observable<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T: fmt::Debug> fmt::Debug for Observable<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Observable")
            .field("value", &*self.value.lock())
            .field("observers", &self.observers.lock().len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    #[test]
    fn notifies_every_update() {
        let prop = Observable::new(0u8);
        let count = Arc::new(AtomicUsize::new(0));

        let count_cl = count.clone();
        prop.subscribe(move |_| {
            count_cl.fetch_add(1, Ordering::SeqCst);
        });

        prop.publish(1);
        prop.publish(1);
        assert_eq!(prop.get(), 1);
        assert_eq!(count.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn unsubscribe() {
        let prop = Observable::new(false);
        let count = Arc::new(AtomicUsize::new(0));

        let count_cl = count.clone();
        let id = prop.subscribe(move |_| {
            count_cl.fetch_add(1, Ordering::SeqCst);
        });

        prop.publish(true);
        assert!(prop.unsubscribe(id));
        assert!(!prop.unsubscribe(id));
        prop.publish(false);

        assert_eq!(count.load(Ordering::SeqCst), 1);
        assert_eq!(prop.observer_count(), 0);
    }

    #[test]
    fn watch_and_prune() {
        let prop = Observable::new(0.0f64);

        let rx = prop.watch();
        prop.publish(0.5);
        prop.publish(0.5);
        assert_eq!(rx.try_iter().collect::<Vec<_>>(), vec![0.5, 0.5]);

        drop(rx);
        assert_eq!(prop.observer_count(), 1);
        prop.publish(1.0);
        assert_eq!(prop.observer_count(), 0);
    }

    #[test]
    fn observer_can_read_and_subscribe() {
        let prop = Arc::new(Observable::new(0u32));
        let seen = Arc::new(AtomicUsize::new(0));

        let prop_cl = prop.clone();
        let seen_cl = seen.clone();
        prop.subscribe(move |value| {
            assert_eq!(prop_cl.get(), *value);
            seen_cl.store(*value as usize, Ordering::SeqCst);
            prop_cl.subscribe(|_| ());
        });

        prop.publish(42);
        assert_eq!(seen.load(Ordering::SeqCst), 42);
        assert_eq!(prop.observer_count(), 2);
    }
}
