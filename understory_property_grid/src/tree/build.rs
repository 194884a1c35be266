// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Child construction, diffing, categorization and node disposal.

use hashbrown::HashMap;

use crate::converter::ConverterRef;
use crate::merge::PropertyMerger;
use crate::tree::PropertyTree;
use crate::tree::collection::NodeCollection;
use crate::tree::entry::{CategoryEntry, Entry, MergedEntry, PropertyEntry, WriteMode};
use crate::tree::node::{EntryKind, Node, NodeId};
use crate::types::PropertyAttributes;
use crate::value::Value;

impl PropertyTree {
    pub(super) fn alloc(&mut self, entry: Entry, parent: Option<NodeId>) -> NodeId {
        let node = Node::new(entry, parent);
        if let Some(idx) = self.free.pop() {
            let slot = &mut self.slots[idx as usize];
            slot.generation = slot.generation.wrapping_add(1);
            slot.node = Some(node);
            NodeId::new(idx, slot.generation)
        } else {
            #[expect(
                clippy::cast_possible_truncation,
                reason = "trees never approach u32::MAX nodes"
            )]
            let idx = self.slots.len() as u32;
            self.slots.push(super::Slot {
                generation: 1,
                node: Some(node),
            });
            NodeId::new(idx, 1)
        }
    }

    /// Frees the slot of `id` without touching its children.
    fn release(&mut self, id: NodeId) -> Option<Node> {
        let slot = self.slots.get_mut(id.idx())?;
        if slot.generation != id.1 {
            return None;
        }
        let node = slot.node.take()?;
        self.free.push(id.0);
        Some(node)
    }

    /// Frees `id` and every node below it.
    pub(super) fn dispose(&mut self, id: NodeId) {
        if let Some(node) = self.release(id) {
            if let Some(children) = node.children {
                for child in &children {
                    self.dispose(child);
                }
            }
        }
    }

    /// Disposes the children of `id` and marks them as not yet built.
    pub(super) fn drop_children(&mut self, id: NodeId) {
        let children = self.node_mut(id).and_then(|node| node.children.take());
        if let Some(children) = children {
            for child in &children {
                self.dispose(child);
            }
        }
    }

    /// (Re)builds the children of `id`.
    ///
    /// With `diff`, existing children standing for the same property are kept
    /// (with their subtrees and expand state) and refreshed; everything else
    /// is disposed. Multi-object roots always rebuild from scratch. Root
    /// children are categorized afterwards when the sort mode asks for it.
    ///
    /// Returns `true` if any children resulted.
    pub(super) fn create_children(&mut self, id: NodeId, diff: bool) -> bool {
        let Some(node) = self.node(id) else {
            return false;
        };
        let kind = node.entry.as_grid_entry().kind();
        let entries = node.entry.as_grid_entry().build_children(self, id);
        let entries = entries.unwrap_or_else(|| {
            tracing::warn!(?kind, "children could not be determined");
            Vec::new()
        });

        if kind.is_root() {
            self.flatten(id);
        }
        let old = self.children(id).to_vec();
        let diff = diff && kind != EntryKind::MultiRoot;

        let mut reusable: Vec<Option<NodeId>> = old.into_iter().map(Some).collect();
        let mut children = NodeCollection::new();
        let mut reused = Vec::new();
        for entry in entries {
            let existing = if diff {
                reusable.iter_mut().find_map(|slot| {
                    let candidate = (*slot)?;
                    let same = self
                        .node(candidate)
                        .is_some_and(|node| node.entry.same_slot(&entry));
                    if same { slot.take() } else { None }
                })
            } else {
                None
            };
            match existing {
                Some(child) => {
                    if let Some(node) = self.node_mut(child) {
                        node.entry = entry;
                    }
                    reused.push(child);
                    children.push(child);
                }
                None => {
                    let child = self.alloc(entry, Some(id));
                    children.push(child);
                }
            }
        }
        for stale in reusable.into_iter().flatten() {
            self.dispose(stale);
        }

        let any = !children.is_empty();
        tracing::trace!(?kind, count = children.len(), reused = reused.len(), "children built");
        if let Some(node) = self.node_mut(id) {
            node.children = Some(children);
        }
        for child in reused {
            self.refresh_node(child);
        }
        if kind.is_root() {
            if self.options.sort().is_categorized() {
                self.categorize(id);
            }
            self.update_default_child();
        }
        any
    }

    /// Property entries for the value of a single-object node.
    pub(crate) fn property_entries(
        &self,
        value: &Value,
        converter: &ConverterRef,
        mode: WriteMode,
    ) -> Option<Vec<Entry>> {
        let source = self.options.source();
        let mut properties = match source.properties(value, Some(converter.as_ref()), self.options.filter()) {
            Ok(properties) => properties,
            Err(error) => {
                tracing::warn!(%error, "property enumeration failed");
                return None;
            }
        };
        if self.options.sort().is_alphabetical() {
            properties.sort_by(|a, b| {
                a.name()
                    .cmp(b.name())
                    .then_with(|| a.property_type().cmp(b.property_type()))
            });
        }
        let (mut entries, rest): (Vec<_>, Vec<_>) = properties
            .into_iter()
            .map(|descriptor| PropertyEntry { descriptor, mode })
            .partition(|entry| {
                entry
                    .descriptor
                    .attributes()
                    .contains(PropertyAttributes::PARENTHESIZE)
                    || entry.descriptor.display_name().starts_with('(')
            });
        entries.extend(rest);
        Some(entries.into_iter().map(Entry::Property).collect())
    }

    /// Merged entries for the properties common to `owners`.
    pub(crate) fn merged_entries(&self, owners: &[Value], mode: WriteMode) -> Option<Vec<Entry>> {
        let merged = PropertyMerger::merge(
            owners,
            self.options.sort(),
            self.options.source().as_ref(),
            self.options.filter(),
        )?;
        Some(
            merged
                .into_iter()
                .map(|descriptor| Entry::Merged(MergedEntry { descriptor, mode }))
                .collect(),
        )
    }

    /// Groups the children of `root` under one category node per category
    /// name, sorted case-insensitively.
    pub(super) fn categorize(&mut self, root: NodeId) {
        let leaves = self.children(root).to_vec();
        let mut buckets: HashMap<String, Vec<NodeId>> = HashMap::new();
        for leaf in leaves {
            let name = self
                .category(leaf)
                .unwrap_or(crate::descriptor::DEFAULT_CATEGORY)
                .to_owned();
            buckets.entry(name).or_default().push(leaf);
        }
        let mut buckets: Vec<_> = buckets.into_iter().collect();
        buckets.sort_by(|(a, _), (b, _)| {
            a.to_lowercase()
                .cmp(&b.to_lowercase())
                .then_with(|| a.cmp(b))
        });

        let store = self.options.categories().clone();
        let mut categories = NodeCollection::new();
        for (name, members) in buckets {
            let expanded = store.is_expanded(&name);
            let category = self.alloc(Entry::Category(CategoryEntry { name }), Some(root));
            for &member in &members {
                if let Some(node) = self.node_mut(member) {
                    node.parent = Some(category);
                }
            }
            if let Some(node) = self.node_mut(category) {
                node.children = Some(members.into_iter().collect());
                node.state.expanded = expanded;
            }
            categories.push(category);
        }
        tracing::debug!(categories = categories.len(), "categorized");
        if let Some(node) = self.node_mut(root) {
            node.children = Some(categories);
        }
    }

    /// Dissolves the category nodes under `root`, handing their children
    /// back to `root` in order. The children themselves are kept.
    pub(super) fn flatten(&mut self, root: NodeId) {
        let children = self.children(root).to_vec();
        if !children
            .iter()
            .any(|&child| self.kind(child) == Some(EntryKind::Category))
        {
            return;
        }
        let mut flat = NodeCollection::new();
        for child in children {
            if self.kind(child) != Some(EntryKind::Category) {
                flat.push(child);
                continue;
            }
            let members = self
                .release(child)
                .and_then(|node| node.children)
                .unwrap_or_default();
            for member in &members {
                if let Some(node) = self.node_mut(member) {
                    node.parent = Some(root);
                }
                flat.push(member);
            }
        }
        if let Some(node) = self.node_mut(root) {
            node.children = Some(flat);
        }
    }

    /// Clears the cached value of `id` and brings its children up to date.
    ///
    /// A collapsed node drops its children. An expanded node whose value
    /// changed, or whose type is an array, re-diffs its children; otherwise
    /// its children are refreshed in turn.
    pub(super) fn refresh_node(&mut self, id: NodeId) {
        let Some(node) = self.node(id) else {
            return;
        };
        let old = {
            let mut cache = node.cache.borrow_mut();
            let old = cache.value.take();
            cache.clear_value();
            cache.converter = None;
            old
        };
        let kind = node.entry.as_grid_entry().kind();
        let expanded = node.state.expanded;
        let Some(children) = node.children.as_ref().map(|c| c.as_slice().to_vec()) else {
            return;
        };

        if kind.is_root() || kind == EntryKind::Category {
            for child in children {
                self.refresh_node(child);
            }
            return;
        }
        if !expanded {
            self.drop_children(id);
            return;
        }
        let new = self.cached_value(id);
        let changed = old.is_none_or(|old| old.value != new.value || old.all_equal != new.all_equal);
        let is_array = self.property_type(id).is_some_and(|ty| ty.is_array());
        if changed || is_array {
            if !self.create_children(id, true) {
                if let Some(node) = self.node_mut(id) {
                    node.state.expanded = false;
                }
            }
        } else {
            for child in children {
                self.refresh_node(child);
            }
        }
    }

    pub(super) fn update_default_child(&mut self) {
        let root = self.root;
        let name = self.node(root).and_then(|node| match &node.entry {
            Entry::SingleRoot(entry) => entry.object.as_object().and_then(|o| o.default_property()),
            Entry::MultiRoot(entry) => entry
                .objects
                .first()
                .and_then(Value::as_object)
                .and_then(|o| o.default_property()),
            _ => None,
        });
        let found = name.and_then(|name| self.find_child(root, &name));
        self.default_child = found.or_else(|| {
            let first = self.children(root).first().copied()?;
            if self.kind(first) == Some(EntryKind::Category) {
                self.children(first).first().copied()
            } else {
                Some(first)
            }
        });
    }
}
