// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Ordered sibling lists.

use smallvec::SmallVec;

use crate::tree::node::NodeId;

/// The ordered children of one node.
///
/// The collection only holds handles; the owning tree frees the nodes when
/// the collection is discarded, except for category nodes being dissolved,
/// whose children are handed back to the parent instead.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct NodeCollection {
    ids: SmallVec<[NodeId; 8]>,
}

impl NodeCollection {
    /// Creates an empty collection.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of children.
    #[must_use]
    #[inline]
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Returns `true` if there are no children.
    #[must_use]
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Returns the child at `index`.
    #[must_use]
    #[inline]
    pub fn get(&self, index: usize) -> Option<NodeId> {
        self.ids.get(index).copied()
    }

    /// Returns the position of `id` among the children.
    #[must_use]
    pub fn position(&self, id: NodeId) -> Option<usize> {
        self.ids.iter().position(|&child| child == id)
    }

    /// Returns `true` if `id` is one of the children.
    #[must_use]
    pub fn contains(&self, id: NodeId) -> bool {
        self.ids.contains(&id)
    }

    /// Returns the children as a slice.
    #[must_use]
    #[inline]
    pub fn as_slice(&self) -> &[NodeId] {
        &self.ids
    }

    /// Iterates over the children in order.
    pub fn iter(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.ids.iter().copied()
    }

    pub(crate) fn push(&mut self, id: NodeId) {
        self.ids.push(id);
    }
}

impl FromIterator<NodeId> for NodeCollection {
    fn from_iter<I: IntoIterator<Item = NodeId>>(iter: I) -> Self {
        Self {
            ids: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a NodeCollection {
    type Item = NodeId;
    type IntoIter = std::iter::Copied<std::slice::Iter<'a, NodeId>>;

    fn into_iter(self) -> Self::IntoIter {
        self.ids.iter().copied()
    }
}
