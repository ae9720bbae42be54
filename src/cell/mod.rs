//! The intermediate cell shared by strong and weak handles.
//!
//! The cell is the only shared mutable state in the crate: a single-slot
//! atomic holder for "the current value, or nothing". Handles never talk to
//! each other; everything flows through here.

pub mod value_cell;

pub use value_cell::{ValueCell, ValueGuard};
