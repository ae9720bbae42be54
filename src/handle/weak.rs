//! The non-owning observer handle.

use core::fmt;

use crate::cell::{ValueCell, ValueGuard};
use crate::sync::Arc;

/// A weak handle: observes a value without keeping it alive.
///
/// Derived from a [`Strong`](crate::Strong) handle and safe to query
/// forever afterwards — the handle keeps the shared cell (but not the
/// value) alive. Once the originating strong handle is dropped, `get`
/// returns `None`, and keeps returning `None`; absence is terminal.
///
/// `get` is racy against teardown by design: unless the caller's own logic
/// keeps the strong handle reachable for the duration of the call, `None`
/// can come back at any time.
pub struct Weak<T> {
    cell: Arc<ValueCell<T>>,
}

unsafe impl<T: Send + Sync> Send for Weak<T> {}
unsafe impl<T: Send + Sync> Sync for Weak<T> {}

impl<T> Weak<T> {
    pub(crate) fn from_cell(cell: Arc<ValueCell<T>>) -> Self {
        Self { cell }
    }

    /// Returns the current value, or `None` once the owning strong handle
    /// has been torn down.
    ///
    /// Never blocks, never allocates, never fails — `None` is a normal
    /// outcome. The returned guard pins the value for the duration of the
    /// borrow, even if teardown runs while it is held.
    #[inline]
    pub fn get(&self) -> Option<ValueGuard<'_, T>> {
        self.cell.load()
    }

    /// Clones the current value out of the cell, if present.
    #[inline]
    pub fn get_cloned(&self) -> Option<T>
    where
        T: Clone,
    {
        self.get().map(|guard| T::clone(&guard))
    }

    /// Whether the owning strong handle still holds the value present.
    ///
    /// A snapshot: can be stale by the time the caller acts on it.
    pub fn is_present(&self) -> bool {
        self.cell.is_present()
    }
}

/// Fan-out: any number of weak handles may observe one cell.
impl<T> Clone for Weak<T> {
    fn clone(&self) -> Self {
        Self {
            cell: Arc::clone(&self.cell),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Weak<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.get() {
            Some(guard) => f.debug_tuple("Weak").field(&*guard).finish(),
            None => f.write_str("Weak(<absent>)"),
        }
    }
}
