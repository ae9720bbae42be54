//! # `tether` - Lock-Free Weak-Reference Primitive
//!
//! A weak-reference primitive for observing a value without extending its
//! lifetime: an owning strong handle, any number of non-owning weak handles,
//! and a shared atomic cell decoupling the two.
//!
//! ## Safety Guarantees
//!
//! ### Memory Safety
//! - **No torn or freed reads**: a weak handle's `get` never hands back a
//!   value whose owning strong handle has already begun teardown; racing
//!   readers that are mid-access pin the value until they leave.
//! - **Single drop**: the stored value is dropped exactly once, either
//!   inline at teardown or by the last racing reader to release its guard.
//!
//! ### Concurrency Safety
//! - **Lock-free**: `get`, `downgrade`, and teardown are all non-blocking,
//!   bounded-time operations; no operation ever suspends.
//! - **Two-writer discipline**: exactly two writers ever touch the shared
//!   slot — construction (once, before sharing) and teardown (once,
//!   idempotent). Every other participant is a reader.
//! - **Monotonic absence**: a cell transitions present → absent at most
//!   once and never back; weak handles never observe flapping.
//!
//! ## Architecture
//!
//! Control flow: client code creates a [`Strong`] handle, derives zero or
//! more [`Weak`] handles from it, and eventually drops the strong handle.
//! Dropping is the teardown event: it clears the shared [`ValueCell`], and
//! every subsequent weak `get` returns `None`. Data flows entirely through
//! the cell; the handles never communicate directly.
//!
//! Absence is a normal outcome, not an error — this crate has no `Result`
//! surface at all.
//!
//! ## Example
//!
//! ```rust
//! use tether::Strong;
//!
//! let strong = Strong::new("hello".to_string());
//! let weak = strong.downgrade();
//!
//! // While the strong handle lives, the value is guaranteed present.
//! assert_eq!(weak.get().as_deref().map(String::as_str), Some("hello"));
//!
//! // Dropping the strong handle is the teardown event.
//! drop(strong);
//! assert!(weak.get().is_none());
//! ```

#![warn(missing_docs, clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

pub mod cell;
pub mod handle;

pub(crate) mod sync;

pub use cell::{ValueCell, ValueGuard};
pub use handle::{Strong, Weak};

// Compile-time assertions for memory layout.
#[cfg(not(loom))]
const _: () = {
    use core::mem;

    // Handles are a single `Arc` and must stay pointer-sized, including
    // through the `Option` niche.
    assert!(mem::size_of::<Strong<u64>>() == mem::size_of::<usize>());
    assert!(mem::size_of::<Weak<u64>>() == mem::size_of::<usize>());
    assert!(mem::size_of::<Option<Strong<u64>>>() == mem::size_of::<usize>());
    assert!(mem::size_of::<Option<Weak<u64>>>() == mem::size_of::<usize>());

    // A guard is a cell reference plus the pinned value pointer.
    assert!(mem::size_of::<ValueGuard<'static, u64>>() == mem::size_of::<usize>() * 2);
    assert!(mem::size_of::<Option<ValueGuard<'static, u64>>>() == mem::size_of::<usize>() * 2);
};
