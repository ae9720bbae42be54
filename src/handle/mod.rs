//! Strong and weak handles over a shared [`ValueCell`](crate::cell::ValueCell).
//!
//! [`Strong`] asserts ownership of the value's presence; [`Weak`] observes
//! it without extending its lifetime. The two never communicate directly —
//! everything goes through the cell they share.

pub mod strong;
pub mod weak;

pub use strong::Strong;
pub use weak::Weak;
