use std::fmt::Debug;

use futures::stream::Stream;
use tokio::sync::watch;
use tokio_stream::wrappers::WatchStream;

/// A value that can be watched for changes.
///
/// Each watcher gets the current value immediately when subscribing, then
/// every subsequent distinct value.
#[derive(Clone)]
pub struct Property<T: Clone + Send + Sync + 'static> {
    tx: watch::Sender<T>,
}

impl<T: Clone + Send + Sync + 'static> Property<T> {
    /// Create a new property with an initial value.
    pub fn new(initial: T) -> Self {
        let (tx, _) = watch::channel(initial);
        Self { tx }
    }

    /// Set a new value and notify watchers if it differs from the current one.
    pub(crate) fn set(&self, new_value: T)
    where
        T: PartialEq,
    {
        self.replace(new_value);
    }

    /// Set a new value, returning the previous one if it changed.
    pub(crate) fn replace(&self, new_value: T) -> Option<T>
    where
        T: PartialEq,
    {
        let mut previous = None;
        self.tx.send_if_modified(|current| {
            if *current == new_value {
                return false;
            }
            previous = Some(std::mem::replace(current, new_value));
            true
        });
        previous
    }

    /// Get a clone of the current value.
    pub fn get(&self) -> T {
        self.tx.borrow().clone()
    }

    /// Stream of values, starting with the current one.
    pub fn watch(&self) -> impl Stream<Item = T> + Send + use<T> {
        WatchStream::new(self.tx.subscribe())
    }
}

impl<T: Clone + Send + Sync + Debug + 'static> Debug for Property<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Property")
            .field("value", &self.get())
            .finish()
    }
}
