// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Node handles, per-node state, and cached derived data.

use std::cell::RefCell;

use crate::converter::ConverterRef;
use crate::tree::collection::NodeCollection;
use crate::tree::entry::Entry;
use crate::value::PropertyValue;

/// Identifier for a node in a [`PropertyTree`](crate::PropertyTree).
///
/// A small, copyable handle made of a slot index and a generation counter.
/// Removing a node frees its slot; when the slot is reused its generation is
/// incremented, so a stale `NodeId` never aliases a different live node.
/// Use [`PropertyTree::is_alive`](crate::PropertyTree::is_alive) to check a
/// handle.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct NodeId(pub(crate) u32, pub(crate) u32);

impl NodeId {
    pub(crate) const fn new(idx: u32, generation: u32) -> Self {
        Self(idx, generation)
    }

    pub(crate) const fn idx(self) -> usize {
        self.0 as usize
    }
}

/// The variant of a tree node.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EntryKind {
    /// The root of a single-object selection.
    SingleRoot,
    /// The root of a multi-object selection.
    MultiRoot,
    /// A property of one object, written in place.
    Property,
    /// A property of an immutable value, written by rebuilding the value.
    ImmutableProperty,
    /// A property common to several objects.
    Merged,
    /// One element of an array-typed property.
    ArrayElement,
    /// A named group of sibling properties.
    Category,
}

impl EntryKind {
    /// Returns `true` for the two root kinds.
    #[must_use]
    pub fn is_root(self) -> bool {
        matches!(self, Self::SingleRoot | Self::MultiRoot)
    }

    /// Returns `true` for kinds backed by a property descriptor.
    #[must_use]
    pub fn is_property(self) -> bool {
        matches!(self, Self::Property | Self::ImmutableProperty | Self::Merged)
    }
}

/// Behavioural state of one node.
///
/// `expanded` is only ever `true` while the node is expandable, and
/// `expand_failed` sticks until the node is rebuilt or
/// [`set_expandable`](crate::PropertyTree::set_expandable) is called.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct NodeState {
    /// The node's children are shown.
    pub expanded: bool,
    /// Building children produced none; expansion is blocked.
    pub expand_failed: bool,
    /// The node and its descendants are read-only regardless of descriptors.
    pub force_read_only: bool,
    /// Overrides the derived expandability.
    pub expandable: Option<bool>,
}

/// Editing capabilities derived from a node's converter, descriptor and
/// read-only state.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct EntryCapabilities {
    /// The converter offers standard values.
    pub enumerable: bool,
    /// The value can be typed as text.
    pub text_editable: bool,
    /// The value is rebuilt wholesale when a sub-property changes.
    pub immutable: bool,
    /// The value has sub-properties.
    pub expandable: bool,
    /// The node is read-only but its modal editor may still be opened.
    pub read_only_editable: bool,
    /// The value is rendered masked.
    pub render_password: bool,
    /// The property has a modal editor.
    pub custom_editable: bool,
    /// The property has a drop-down editor or standard values.
    pub drop_down_editable: bool,
}

#[derive(Clone, Debug)]
pub(crate) struct CachedValue {
    pub(crate) value: PropertyValue,
    pub(crate) all_equal: bool,
}

#[derive(Debug, Default)]
pub(crate) struct NodeCache {
    pub(crate) value: Option<CachedValue>,
    pub(crate) value_text: Option<String>,
    pub(crate) converter: Option<ConverterRef>,
    pub(crate) capabilities: Option<EntryCapabilities>,
    pub(crate) label_bold: Option<bool>,
}

impl NodeCache {
    /// Drops everything derived from the current value.
    pub(crate) fn clear_value(&mut self) {
        self.value = None;
        self.value_text = None;
        self.label_bold = None;
    }

    pub(crate) fn clear(&mut self) {
        *self = Self::default();
    }
}

#[derive(Debug)]
pub(crate) struct Node {
    pub(crate) entry: Entry,
    pub(crate) parent: Option<NodeId>,
    /// `None` until children are first built.
    pub(crate) children: Option<NodeCollection>,
    pub(crate) state: NodeState,
    pub(crate) cache: RefCell<NodeCache>,
}

impl Node {
    pub(crate) fn new(entry: Entry, parent: Option<NodeId>) -> Self {
        Self {
            entry,
            parent,
            children: None,
            state: NodeState::default(),
            cache: RefCell::new(NodeCache::default()),
        }
    }
}
