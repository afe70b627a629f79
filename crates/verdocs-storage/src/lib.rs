//! Filesystem access and change notification for verdocs.
//!
//! This crate provides a [`Storage`] trait covering every filesystem
//! interaction the preprocessor performs, so the version resolution logic in
//! `verdocs-site` never touches `std::fs` directly.
//!
//! # Architecture
//!
//! The crate provides:
//! - [`Storage`] trait with `walk()`, `read()`, `write()`, `copy()` and `watch()`
//! - [`FsStorage`] implementation for the local filesystem
//! - [`SourceEvent`]s delivered through a [`SourceEventReceiver`] while a
//!   [`WatchHandle`] is alive

mod event;
mod fs;
mod storage;

pub use event::{SourceEvent, SourceEventKind, SourceEventReceiver, WatchHandle};
pub use fs::FsStorage;
pub use storage::{Storage, StorageError, StorageErrorKind};
