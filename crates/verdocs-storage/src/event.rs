//! Source change events.
//!
//! Provides types for subscribing to source tree changes through the
//! [`Storage::watch`](crate::Storage::watch) method. Events are delivered one
//! by one, in arrival order, without debouncing.

use std::path::PathBuf;
use std::sync::mpsc;

/// Kind of source event.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SourceEventKind {
    /// File was created.
    Created,
    /// File was modified.
    Modified,
    /// Events were lost; the watcher's view of the tree is no longer reliable.
    Overflow,
}

/// A source change event.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SourceEvent {
    /// Absolute path of the changed file (the watched root for overflow).
    pub path: PathBuf,
    /// Kind of change.
    pub kind: SourceEventKind,
}

/// Receiver for source events.
///
/// Wraps a [`std::sync::mpsc::Receiver`] for synchronous event delivery.
/// Polled with [`recv()`](Self::recv) until the sender side closes.
pub struct SourceEventReceiver {
    rx: mpsc::Receiver<SourceEvent>,
}

impl SourceEventReceiver {
    /// Create a new receiver from a channel receiver.
    #[must_use]
    pub fn new(rx: mpsc::Receiver<SourceEvent>) -> Self {
        Self { rx }
    }

    /// Create a connected sender/receiver pair.
    #[must_use]
    pub fn channel() -> (mpsc::Sender<SourceEvent>, Self) {
        let (tx, rx) = mpsc::channel();
        (tx, Self::new(rx))
    }

    /// Wait for the next event (blocking).
    ///
    /// Returns `None` when the sender is dropped.
    #[must_use]
    pub fn recv(&self) -> Option<SourceEvent> {
        self.rx.recv().ok()
    }

    /// Create a no-op receiver that never yields events.
    pub(crate) fn no_op() -> Self {
        let (_tx, rx) = mpsc::channel();
        Self { rx }
    }
}

/// Handle to stop watching for changes.
///
/// Uses RAII pattern - dropping the handle drops the underlying watcher, which
/// closes the event channel.
pub struct WatchHandle {
    _watcher: Option<notify::RecommendedWatcher>,
}

impl WatchHandle {
    /// Create a handle that keeps `watcher` alive.
    pub(crate) fn new(watcher: notify::RecommendedWatcher) -> Self {
        Self {
            _watcher: Some(watcher),
        }
    }

    /// Stop watching immediately (consumes the handle).
    pub fn stop(mut self) {
        self._watcher.take();
    }

    /// Create a no-op handle that does nothing on drop.
    pub(crate) fn no_op() -> Self {
        Self { _watcher: None }
    }
}
