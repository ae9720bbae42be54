//! Synchronization primitives, switchable to `loom` models.
//!
//! Normal builds use the `core`/`std` types directly; building with
//! `RUSTFLAGS="--cfg loom"` swaps in the `loom` models so the cell's
//! reader/teardown handshake can be exhaustively checked.

#[cfg(loom)]
pub(crate) use loom::sync::{
    atomic::{AtomicPtr, AtomicUsize, Ordering},
    Arc,
};

#[cfg(not(loom))]
pub(crate) use core::sync::atomic::{AtomicPtr, AtomicUsize, Ordering};
#[cfg(not(loom))]
pub(crate) use std::sync::Arc;
