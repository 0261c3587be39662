//! An in-memory ordered map built on a classic B-tree.
//!
//! [`OrderedTree`] stores key-value pairs sorted by key and supports point
//! lookup, insertion, deletion and lazy in-order range iteration, all in
//! O(log n). Unlike a B+tree, keys and values live in internal nodes as well as
//! leaves, and the node size is set per tree through its [`Fanout`].
//!
//! # Example
//!
//! ```
//! use ordtree::OrderedTree;
//!
//! let mut index = OrderedTree::with_fanout(3)?;
//! index.set(20, "twenty").set(10, "ten").set(30, "thirty").set(40, "forty");
//!
//! assert_eq!(index.get(&30), Some(&"thirty"));
//! assert_eq!(index.remove(&10), Some("ten"));
//!
//! // Half-open range: 20 <= key < 40
//! let between: Vec<_> = index.values_between(Some(&20), Some(&40)).collect();
//! assert_eq!(between, [&"twenty", &"thirty"]);
//!
//! index.check_invariants()?;
//! # Ok::<(), ordtree::Error>(())
//! ```
//!
//! # Features
//!
//! - **`no_std` compatible** - Only requires `alloc`, no standard library dependency
//! - **Configurable fanout** - Every non-root node holds between `t` and `2t` entries
//! - **Single-pass mutations** - Inserts split and removals rebalance on the way down
//! - **Self-checking** - [`OrderedTree::check_invariants`] validates the whole structure
//!
//! # Implementation
//!
//! Nodes live in an arena and refer to their children by handle. Each node keeps
//! its keys, values and child handles in parallel inline vectors, so a tree
//! with the default fanout does not allocate per node beyond its arena slot.

#![no_std]
// These forbid rules and lint groups are meant to be very restrictive.
#![forbid(unsafe_code)]
#![forbid(keyword_idents)]
#![forbid(non_ascii_idents)]
#![forbid(unreachable_pub)]
#![warn(clippy::all)]
#![warn(clippy::cargo)]
#![warn(clippy::pedantic)]
#![warn(missing_docs)]
// Enable coverage attributes for nightly builds.
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

extern crate alloc;

mod error;
mod fanout;
mod raw;

pub mod ordered_tree;

pub use error::{Error, Result};
pub use fanout::Fanout;
pub use ordered_tree::OrderedTree;
