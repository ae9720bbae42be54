//! The owning handle.

use core::fmt;
use core::ops::Deref;

use crate::cell::ValueCell;
use crate::handle::Weak;
use crate::sync::Arc;

/// An owning handle: while it is alive, the value is guaranteed present.
///
/// Dropping the handle is the teardown event. It clears the shared cell,
/// after which every [`Weak`] derived from this handle observes absence.
/// The handle is deliberately not `Clone` — it is the single owner of the
/// present → absent transition, which is what lets the cell get by with a
/// plain atomic store instead of a reference count on the value itself.
/// Callers that want shared ownership can wrap the handle in an
/// `Arc<Strong<T>>` themselves.
pub struct Strong<T> {
    cell: Arc<ValueCell<T>>,
}

unsafe impl<T: Send + Sync> Send for Strong<T> {}
unsafe impl<T: Send + Sync> Sync for Strong<T> {}

impl<T> Strong<T> {
    /// Creates a new owning handle holding `value`.
    ///
    /// The shared cell is allocated and populated here, before any weak
    /// handle can exist, so observers never see an uninitialized slot.
    pub fn new(value: T) -> Self {
        Self {
            cell: Arc::new(ValueCell::new(value)),
        }
    }

    /// Returns the value.
    ///
    /// Infallible: teardown only runs from this handle's drop, which
    /// cannot overlap a live borrow of `self`.
    #[inline(always)]
    pub fn get(&self) -> &T {
        // Safety: this handle is the sole clearing writer and clears only
        // on drop; the slot stays populated for the borrow's lifetime.
        unsafe { self.cell.get_unchecked() }
    }

    /// Derives a non-owning observer of the same cell.
    ///
    /// Has no effect on the cell's contents. Any number of weak handles
    /// may be derived; they all observe the same slot.
    pub fn downgrade(&self) -> Weak<T> {
        Weak::from_cell(Arc::clone(&self.cell))
    }
}

impl<T> Drop for Strong<T> {
    /// Teardown: the single writer of the clearing transition.
    fn drop(&mut self) {
        #[cfg(feature = "tracing")]
        tracing::trace!(target: "tether", "strong handle dropped; clearing shared cell");
        self.cell.clear();
    }
}

impl<T> Deref for Strong<T> {
    type Target = T;

    #[inline(always)]
    fn deref(&self) -> &T {
        self.get()
    }
}

impl<T: fmt::Debug> fmt::Debug for Strong<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Strong").field(self.get()).finish()
    }
}

#[cfg(all(test, not(loom)))]
mod tests {
    use super::*;

    #[test]
    fn get_returns_the_stored_value() {
        let strong = Strong::new(vec![1, 2, 3]);
        assert_eq!(strong.get(), &[1, 2, 3]);
        assert_eq!(*strong, [1, 2, 3]);
    }

    #[test]
    fn downgrade_does_not_disturb_the_cell() {
        let strong = Strong::new(5_u8);
        let _w1 = strong.downgrade();
        let _w2 = strong.downgrade();
        assert_eq!(*strong.get(), 5);
    }

    #[test]
    fn drop_clears_the_shared_cell() {
        let strong = Strong::new("v");
        let weak = strong.downgrade();
        drop(strong);
        assert!(weak.get().is_none());
    }
}
