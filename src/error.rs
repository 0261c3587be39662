//! Error types for the ordered tree.
//!
//! Lookups and removals of absent keys are not errors; they return `None`.
//! Errors only arise when configuring a tree or when
//! [`check_invariants`](crate::OrderedTree::check_invariants) finds a
//! structural problem.

use alloc::string::String;

use thiserror::Error;

/// Errors reported by the ordered tree.
#[derive(Error, Clone, Debug, Eq, PartialEq)]
pub enum Error {
    /// The requested fanout factor is too small to build a B-tree.
    #[error("fanout {fanout} is below the minimum of {min}")]
    InvalidFanout {
        /// The rejected value.
        fanout: usize,
        /// The smallest accepted value.
        min: usize,
    },

    /// A structural invariant does not hold.
    #[error("tree invariant violated: {0}")]
    InvariantViolation(String),
}

/// A Result type alias using the crate's [`Error`].
pub type Result<T> = core::result::Result<T, Error>;
