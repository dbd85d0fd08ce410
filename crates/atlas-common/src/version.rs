//! Version stamps used as memoization keys.
//!
//! Inputs are compared by identity, not by value: every new snapshot of a
//! feature collection or setting gets a fresh stamp, and caches keyed by the
//! stamp are invalidated when it changes.

use std::ops::Deref;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

static NEXT_VERSION: AtomicU64 = AtomicU64::new(1);

/// Allocate a process-wide unique, monotonically increasing stamp.
pub fn next_version() -> u64 {
    NEXT_VERSION.fetch_add(1, Ordering::Relaxed)
}

/// An immutable snapshot tagged with its version stamp.
#[derive(Debug)]
pub struct Versioned<T> {
    value: Arc<T>,
    version: u64,
}

impl<T> Versioned<T> {
    pub fn new(value: T) -> Self {
        Self::from_arc(Arc::new(value))
    }

    pub fn from_arc(value: Arc<T>) -> Self {
        Self {
            value,
            version: next_version(),
        }
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn arc(&self) -> &Arc<T> {
        &self.value
    }
}

// Clones share the snapshot and therefore its stamp.
impl<T> Clone for Versioned<T> {
    fn clone(&self) -> Self {
        Self {
            value: Arc::clone(&self.value),
            version: self.version,
        }
    }
}

impl<T> Deref for Versioned<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.value
    }
}
