use alloc::format;
use alloc::string::String;

use super::handle::Handle;
use super::raw_ordered_tree::RawOrderedTree;
use crate::error::{Error, Result};

/// Totals gathered while walking the tree.
#[derive(Default)]
struct Walk {
    leaf_depth: Option<usize>,
    nodes: usize,
    keys: usize,
}

impl<K: Ord, V> RawOrderedTree<K, V> {
    /// Walks every node and reports the first broken invariant.
    pub(crate) fn check_invariants(&self) -> Result<()> {
        let mut walk = Walk::default();
        self.check_node(self.root(), 0, None, None, &mut walk)?;

        if walk.keys != self.len() {
            return Err(violation(format!("len is {} but {} keys are reachable", self.len(), walk.keys)));
        }
        if walk.nodes != self.node_count() {
            return Err(violation(format!(
                "arena holds {} nodes but {} are reachable",
                self.node_count(),
                walk.nodes
            )));
        }
        Ok(())
    }

    fn check_node<'a>(
        &'a self,
        handle: Handle,
        depth: usize,
        lower: Option<&'a K>,
        upper: Option<&'a K>,
        walk: &mut Walk,
    ) -> Result<()> {
        if depth > self.node_count() {
            return Err(violation(format!("node {handle:?} is reachable through a cycle")));
        }

        let node = self.node(handle);
        let fanout = self.fanout();
        walk.nodes += 1;
        walk.keys += node.key_count();

        let entries = node.entry_count();
        let min = if handle == self.root() { 1 } else { fanout.min_entries() };
        let max = fanout.max_entries();
        if entries < min || entries > max {
            return Err(violation(format!(
                "node {handle:?} at depth {depth} has {entries} entries, expected {min}..={max}"
            )));
        }

        let keys = node.keys();
        if let Some(i) = keys.windows(2).position(|pair| pair[0] >= pair[1]) {
            return Err(violation(format!("keys {i} and {} of node {handle:?} are out of order", i + 1)));
        }
        if let (Some(lower), Some(first)) = (lower, keys.first())
            && first <= lower
        {
            return Err(violation(format!("node {handle:?} holds a key at or below its left separator")));
        }
        if let (Some(upper), Some(last)) = (upper, keys.last())
            && last >= upper
        {
            return Err(violation(format!("node {handle:?} holds a key at or above its right separator")));
        }

        if node.is_leaf() {
            match walk.leaf_depth {
                None => walk.leaf_depth = Some(depth),
                Some(expected) if expected != depth => {
                    return Err(violation(format!(
                        "leaf {handle:?} is at depth {depth}, other leaves are at depth {expected}"
                    )));
                }
                Some(_) => {}
            }
            return Ok(());
        }

        let children = node.children();
        if children.len() != node.key_count() + 1 {
            return Err(violation(format!(
                "node {handle:?} has {} keys but {} children",
                node.key_count(),
                children.len()
            )));
        }
        for (i, &child) in children.iter().enumerate() {
            let lower = if i == 0 { lower } else { Some(node.key(i - 1)) };
            let upper = if i == node.key_count() { upper } else { Some(node.key(i)) };
            self.check_node(child, depth + 1, lower, upper, walk)?;
        }
        Ok(())
    }
}

fn violation(detail: String) -> Error {
    Error::InvariantViolation(detail)
}
