//! A single-slot atomic value cell with guard-pinned reads.

use core::fmt;
use core::ops::Deref;
use core::ptr::{self, NonNull};

use crossbeam_utils::CachePadded;

use crate::sync::{AtomicPtr, AtomicUsize, Ordering};

/// Terminal-state bit: set once by teardown, never cleared.
const CLEARED: usize = 1;
/// One active reader. The count occupies the bits above `CLEARED`.
const READER: usize = 2;

/// A single-slot holder for "the current value, or nothing", safe to read
/// from any number of threads without locks.
///
/// Presence is written by exactly two parties, in order: the constructor
/// stores the value once, before the cell is shared with any observer, and
/// the owning handle's teardown marks the empty state once (idempotently).
/// Every other participant is a reader.
///
/// A cell goes present → absent at most once, monotonically; there is no
/// path back to present for a given cell instance.
///
/// Readers and teardown coordinate through one packed state word holding
/// the active-reader count alongside the cleared bit, advanced only by
/// read-modify-write operations, so every transition observes a single
/// total order on that word. The value's drop goes to whichever side
/// drains the count: teardown when no reader is active, otherwise the last
/// reader to leave. Ownership of the drop itself is claimed by swapping
/// the value pointer to null, so it can never be taken twice.
pub struct ValueCell<T> {
    /// The stored value. Written once at construction, nulled once by the
    /// reclaiming swap; a non-null pointer stays valid while the state
    /// word counts at least one reader or the cleared bit is unset.
    value: AtomicPtr<T>,
    /// Reader count (bits above the lowest) plus the cleared bit.
    /// Write-hot from every observer, so it lives on its own cache line
    /// away from the read-mostly value pointer.
    state: CachePadded<AtomicUsize>,
}

// Raw pointers suppress the auto traits. Guards hand out `&T` on other
// threads and reclamation may drop `T` on whichever thread leaves last.
unsafe impl<T: Send + Sync> Send for ValueCell<T> {}
unsafe impl<T: Send + Sync> Sync for ValueCell<T> {}

impl<T> ValueCell<T> {
    /// Creates a cell already holding `value`.
    ///
    /// The initializing store happens here, before the cell can be shared,
    /// so no observer ever sees an uninitialized slot.
    pub(crate) fn new(value: T) -> Self {
        Self {
            value: AtomicPtr::new(Box::into_raw(Box::new(value))),
            state: CachePadded::new(AtomicUsize::new(0)),
        }
    }

    /// Loads the current value, returning a guard that pins it for the
    /// duration of the borrow, or `None` if the cell has been cleared.
    ///
    /// Never blocks and never allocates. Racing against teardown is
    /// expected: `None` is a normal outcome, not a failure. A guard
    /// obtained here stays valid even if teardown runs while it is held.
    pub fn load(&self) -> Option<ValueGuard<'_, T>> {
        let prev = self.state.fetch_add(READER, Ordering::AcqRel);
        if prev & CLEARED != 0 {
            // Too late; back out of the count we joined.
            self.leave();
            return None;
        }
        // We are counted and the cleared bit was unset, so teardown cannot
        // reclaim until we leave.
        match NonNull::new(self.value.load(Ordering::Acquire)) {
            Some(value) => Some(ValueGuard { cell: self, value }),
            None => {
                // Unreachable: the pointer is nulled only after the
                // cleared bit is set and the counted readers drain.
                self.leave();
                None
            }
        }
    }

    /// Whether the cell currently holds a value.
    ///
    /// A snapshot: the answer can be stale by the time the caller acts on
    /// it unless the caller also keeps the owning strong handle reachable.
    pub fn is_present(&self) -> bool {
        self.state.load(Ordering::Acquire) & CLEARED == 0
    }

    /// Marks the cell absent, transitioning it to its terminal state.
    ///
    /// Idempotent: clearing an already-cleared cell is a no-op. The stored
    /// value is dropped inline when no reader is active; otherwise the
    /// last counted reader to leave drops it.
    pub(crate) fn clear(&self) {
        let prev = self.state.fetch_or(CLEARED, Ordering::AcqRel);
        if prev & CLEARED != 0 {
            return;
        }
        // `prev` carries the reader count that raced us in. Readers that
        // arrive after this point see the cleared bit and back out without
        // touching the value.
        if prev == 0 {
            self.reclaim();
        }
    }

    /// Reads the value pointer without taking a guard.
    ///
    /// # Safety
    ///
    /// The caller must guarantee the cell cannot be cleared for the
    /// lifetime of the returned borrow. The strong handle satisfies this:
    /// it is the only party that clears, and only from its own drop.
    pub(crate) unsafe fn get_unchecked(&self) -> &T {
        let p = self.value.load(Ordering::Acquire);
        debug_assert!(!p.is_null(), "cell cleared while owner still live");
        unsafe { &*p }
    }

    /// Reader exit: decrement the count and, as the last one out of a
    /// cleared cell, drop the value teardown left behind.
    fn leave(&self) {
        let prev = self.state.fetch_sub(READER, Ordering::AcqRel);
        if prev & CLEARED != 0 && prev >> 1 == 1 {
            self.reclaim();
        }
    }

    fn reclaim(&self) {
        let value = self.value.swap(ptr::null_mut(), Ordering::AcqRel);
        if let Some(value) = NonNull::new(value) {
            // Safety: the swap makes this call the unique owner, and no
            // reader is counted once reclamation is reached.
            unsafe { drop(Box::from_raw(value.as_ptr())) };
        }
    }
}

impl<T> Drop for ValueCell<T> {
    fn drop(&mut self) {
        // Exclusive access: every handle and guard referencing this cell
        // is gone, so the swap inside cannot race anything.
        self.reclaim();
    }
}

impl<T: fmt::Debug> fmt::Debug for ValueCell<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.load() {
            Some(guard) => f.debug_tuple("ValueCell").field(&*guard).finish(),
            None => f.write_str("ValueCell(<absent>)"),
        }
    }
}

/// A pinned view of a cell's value.
///
/// While the guard is alive the value cannot be reclaimed, even if the
/// owning strong handle is torn down concurrently; dropping the last guard
/// after teardown releases the value. Guards are cheap (one atomic
/// increment to take, one decrement to drop) and should not be held across
/// long-running work.
pub struct ValueGuard<'a, T> {
    cell: &'a ValueCell<T>,
    value: NonNull<T>,
}

// Dropping a guard elsewhere may run the deferred reclaim (`T: Send`);
// dereferencing shares `&T` (`T: Sync`).
unsafe impl<T: Send + Sync> Send for ValueGuard<'_, T> {}
unsafe impl<T: Sync> Sync for ValueGuard<'_, T> {}

impl<T> Deref for ValueGuard<'_, T> {
    type Target = T;

    #[inline(always)]
    fn deref(&self) -> &T {
        // Safety: the reader count pins the allocation until this guard
        // drops; teardown defers the value's drop while we are counted.
        unsafe { self.value.as_ref() }
    }
}

impl<T> Drop for ValueGuard<'_, T> {
    fn drop(&mut self) {
        self.cell.leave();
    }
}

impl<T: fmt::Debug> fmt::Debug for ValueGuard<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ValueGuard").field(&**self).finish()
    }
}

impl<T: fmt::Display> fmt::Display for ValueGuard<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        (**self).fmt(f)
    }
}

#[cfg(all(test, not(loom)))]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize as StdAtomicUsize, Ordering as StdOrdering};

    /// Payload that counts its drops into a shared counter.
    struct DropTally<'a>(&'a StdAtomicUsize);

    impl Drop for DropTally<'_> {
        fn drop(&mut self) {
            self.0.fetch_add(1, StdOrdering::SeqCst);
        }
    }

    #[test]
    fn load_returns_stored_value() {
        let cell = ValueCell::new(7_u32);
        assert!(cell.is_present());
        assert_eq!(*cell.load().unwrap(), 7);
    }

    #[test]
    fn clear_is_terminal_and_monotonic() {
        let cell = ValueCell::new(String::from("gone"));
        cell.clear();
        assert!(!cell.is_present());
        assert!(cell.load().is_none());
        // Still absent on repeated queries.
        assert!(cell.load().is_none());
    }

    #[test]
    fn clear_twice_is_a_noop() {
        let drops = StdAtomicUsize::new(0);
        let cell = ValueCell::new(DropTally(&drops));
        cell.clear();
        cell.clear();
        assert_eq!(drops.load(StdOrdering::SeqCst), 1);
        drop(cell);
        assert_eq!(drops.load(StdOrdering::SeqCst), 1);
    }

    #[test]
    fn backed_out_reader_cannot_double_drop() {
        let drops = StdAtomicUsize::new(0);
        let cell = ValueCell::new(DropTally(&drops));
        cell.clear();
        assert_eq!(drops.load(StdOrdering::SeqCst), 1);

        // These readers arrive after the value was already reclaimed; each
        // backs out as the sole counted reader of a cleared cell.
        assert!(cell.load().is_none());
        assert!(cell.load().is_none());
        assert_eq!(drops.load(StdOrdering::SeqCst), 1);
    }

    #[test]
    fn guard_pins_value_across_clear() {
        let drops = StdAtomicUsize::new(0);
        let cell = ValueCell::new(DropTally(&drops));

        let guard = cell.load().unwrap();
        cell.clear();

        // Cleared for new readers, still readable through the old guard.
        assert!(cell.load().is_none());
        assert_eq!(drops.load(StdOrdering::SeqCst), 0);
        let _: &DropTally<'_> = &guard;

        // Last reader out runs the deferred drop.
        drop(guard);
        assert_eq!(drops.load(StdOrdering::SeqCst), 1);
    }

    #[test]
    fn overlapping_guards_release_in_any_order() {
        let drops = StdAtomicUsize::new(0);
        let cell = ValueCell::new(DropTally(&drops));

        let g1 = cell.load().unwrap();
        let g2 = cell.load().unwrap();
        cell.clear();

        drop(g1);
        assert_eq!(drops.load(StdOrdering::SeqCst), 0);
        drop(g2);
        assert_eq!(drops.load(StdOrdering::SeqCst), 1);
    }

    #[test]
    fn dropping_a_live_cell_drops_the_value_once() {
        let drops = StdAtomicUsize::new(0);
        let cell = ValueCell::new(DropTally(&drops));
        drop(cell);
        assert_eq!(drops.load(StdOrdering::SeqCst), 1);
    }

    #[test]
    fn zero_sized_values_round_trip() {
        let cell = ValueCell::new(());
        assert!(cell.load().is_some());
        cell.clear();
        assert!(cell.load().is_none());
    }

    #[test]
    fn debug_formats_both_states() {
        let cell = ValueCell::new(3_i32);
        assert_eq!(format!("{cell:?}"), "ValueCell(3)");
        cell.clear();
        assert_eq!(format!("{cell:?}"), "ValueCell(<absent>)");
    }
}
