//! Thread-safety abstractions for the registry's mutable state.
//!
//! - `SyncRwLock<T>`: A read-write lock wrapper with closure-based access.
//!   Useful for data that is read frequently but written rarely.
//!   Poisoning is ignored: the guarded values are replaced wholesale,
//!   so a panic while holding the lock can't leave them half-updated.
use std::sync::{PoisonError, RwLock};

pub(crate) struct SyncRwLock<T>(RwLock<T>);

impl<T> std::fmt::Debug for SyncRwLock<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyncRwLock").finish_non_exhaustive()
    }
}

impl<T> SyncRwLock<T> {
    pub(crate) fn new(value: T) -> Self {
        Self(RwLock::new(value))
    }

    /// Access the inner value immutably under a read lock.
    #[inline]
    pub(crate) fn with_read<R, F: FnOnce(&T) -> R>(&self, f: F) -> R {
        let guard = self.0.read().unwrap_or_else(PoisonError::into_inner);
        f(&guard)
    }

    /// Access the inner value mutably under a write lock.
    #[inline]
    pub(crate) fn with_write<R, F: FnOnce(&mut T) -> R>(&self, f: F) -> R {
        let mut guard = self.0.write().unwrap_or_else(PoisonError::into_inner);
        f(&mut guard)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn read_and_write() {
        let lock = SyncRwLock::new(Some(1));
        assert_eq!(lock.with_read(|v| *v), Some(1));
        let old = lock.with_write(|v| v.replace(2));
        assert_eq!(old, Some(1));
        assert_eq!(lock.with_read(|v| *v), Some(2));
    }

    #[test]
    fn survives_poisoning() {
        let lock = SyncRwLock::new(0);
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            lock.with_write(|v| {
                *v = 5;
                panic!("boom");
            })
        }));
        assert!(result.is_err());
        assert_eq!(lock.with_read(|v| *v), 5);
    }
}
