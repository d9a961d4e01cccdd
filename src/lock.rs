//! The exclusive lock shared by every scratch structure in the crate.
//!
//! [`HybridLock`] owns the value it protects. Every access goes through a
//! guard, so the lock is released on every exit path including early
//! returns and `?` propagation. The lock is not reentrant: a thread that
//! already holds the guard must not call back into a method that locks again.

use parking_lot::{Mutex, MutexGuard};

/// Exclusive, non-reentrant lock around an owned value.
///
/// Readers and writers share the same lock; there is no reader/writer split.
///
/// # Example
///
/// ```
/// use melsec_mc::HybridLock;
///
/// let lock = HybridLock::new(vec![0u8; 4]);
/// lock.with(|bytes| bytes[0] = 0x12);
/// assert_eq!(lock.with(|bytes| bytes[0]), 0x12);
/// ```
#[derive(Debug, Default)]
pub struct HybridLock<T> {
    inner: Mutex<T>,
}

impl<T> HybridLock<T> {
    /// Creates a new lock protecting `value`.
    pub fn new(value: T) -> Self {
        Self {
            inner: Mutex::new(value),
        }
    }

    /// Blocks until the lock is acquired and returns the guard.
    pub(crate) fn enter(&self) -> MutexGuard<'_, T> {
        self.inner.lock()
    }

    /// Runs `f` with exclusive access to the protected value.
    pub fn with<R>(&self, f: impl FnOnce(&mut T) -> R) -> R {
        let mut guard = self.inner.lock();
        f(&mut guard)
    }

    /// Consumes the lock and returns the protected value.
    pub fn into_inner(self) -> T {
        self.inner.into_inner()
    }

    /// Mutable access without locking; the borrow checker already proves exclusivity.
    pub fn get_mut(&mut self) -> &mut T {
        self.inner.get_mut()
    }
}
