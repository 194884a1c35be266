// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The property tree.
//!
//! A [`PropertyTree`] is built from a selection of one or more values. It
//! owns its nodes in an arena addressed by generational [`NodeId`]s and
//! builds children lazily on first expansion.
//!
//! ## Node kinds
//!
//! - A single-object root lists the value's properties.
//! - A multi-object root lists the properties common to every selected
//!   object, merged by [`PropertyMerger`](crate::PropertyMerger).
//! - Property nodes expand into the sub-properties of their value; array
//!   values expand into one node per element.
//! - Category nodes group the root's properties when the sort mode is
//!   categorized.
//!
//! ## Values
//!
//! Reads are cached per node and fail soft: a getter error becomes a
//! [`ReadFault`](crate::ReadFault) rendered as its message. Writes propagate
//! errors, consult the attached [`TreeHost`] before and after the change,
//! and bring the node's subtree up to date.

mod build;
mod collection;
mod entry;
mod node;

pub use collection::NodeCollection;
pub use node::{EntryCapabilities, EntryKind, NodeId, NodeState};

use std::rc::{Rc, Weak};

use smallvec::SmallVec;

use crate::converter::ConverterRef;
use crate::descriptor::{DescriptorRef, EditStyle};
use crate::error::PropertyError;
use crate::host::{ChangeVeto, SetOutcome, TreeHost};
use crate::options::GridOptions;
use crate::types::{PropertyAttributes, PropertySort, TypeKey};
use crate::value::{PropertyValue, Value};

use entry::{Entry, MultiRootEntry, SingleRootEntry};
use node::{CachedValue, Node};

/// The values a node's properties are read from.
pub(crate) type Owners = SmallVec<[Value; 4]>;

#[derive(Debug)]
struct Slot {
    generation: u32,
    node: Option<Node>,
}

/// A tree of property nodes over a selection of values.
///
/// # Example
///
/// ```rust
/// use understory_property_grid::{
///     DynamicObject, FieldDescriptor, GridOptions, ObjectType, PropertySort, PropertyTree,
///     TypeKey, Value,
/// };
///
/// let button = ObjectType::builder(TypeKey::new("Button"))
///     .field(FieldDescriptor::builder("Text", TypeKey::TEXT).category("Appearance"))
///     .field(FieldDescriptor::builder("Enabled", TypeKey::BOOL).category("Behavior"))
///     .build();
/// let ok = DynamicObject::new(&button).with("Text", "OK".into()).with("Enabled", true.into());
///
/// let options = GridOptions::builder().sort(PropertySort::ALPHABETICAL).build();
/// let mut tree = PropertyTree::new(vec![ok.into_value()], options).unwrap();
/// let root = tree.root();
///
/// let labels: Vec<_> = tree.children(root).iter().map(|&id| tree.label(id)).collect();
/// assert_eq!(labels, ["Enabled", "Text"]);
///
/// let text = tree.find_child(root, "Text").unwrap();
/// tree.set_value_text(text, "Cancel").unwrap();
/// assert_eq!(tree.value_text(text), "Cancel");
/// ```
#[derive(Debug)]
pub struct PropertyTree {
    slots: Vec<Slot>,
    free: Vec<u32>,
    root: NodeId,
    options: GridOptions,
    host: Option<Weak<dyn TreeHost>>,
    default_child: Option<NodeId>,
}

impl PropertyTree {
    /// Builds a tree over `objects`.
    ///
    /// One object gets a single-object root; several get a multi-object root
    /// whose children are the merged common properties. The root is built
    /// and expanded immediately. Returns `None` for an empty selection.
    #[must_use]
    pub fn new(objects: Vec<Value>, options: GridOptions) -> Option<Self> {
        let (entry, force_read_only) = match objects.len() {
            0 => return None,
            1 => {
                let object = objects.into_iter().next()?;
                let read_only = object.as_object().is_some_and(|o| o.is_read_only());
                (Entry::SingleRoot(SingleRootEntry { object }), read_only)
            }
            _ => {
                let root = MultiRootEntry::new(objects);
                let read_only = root.force_read_only();
                (Entry::MultiRoot(root), read_only)
            }
        };
        let mut tree = Self {
            slots: Vec::new(),
            free: Vec::new(),
            root: NodeId::new(0, 0),
            options,
            host: None,
            default_child: None,
        };
        let root = tree.alloc(entry, None);
        tree.root = root;
        if let Some(node) = tree.node_mut(root) {
            node.state.force_read_only = force_read_only;
        }
        let built = tree.create_children(root, false);
        if let Some(node) = tree.node_mut(root) {
            node.state.expanded = built;
            node.state.expand_failed = !built;
        }
        tracing::debug!(
            kind = ?tree.kind(root),
            children = tree.children(root).len(),
            "property tree built"
        );
        Some(tree)
    }

    fn node(&self, id: NodeId) -> Option<&Node> {
        let slot = self.slots.get(id.idx())?;
        if slot.generation != id.1 {
            return None;
        }
        slot.node.as_ref()
    }

    fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        let slot = self.slots.get_mut(id.idx())?;
        if slot.generation != id.1 {
            return None;
        }
        slot.node.as_mut()
    }

    fn entry(&self, id: NodeId) -> Option<&Entry> {
        self.node(id).map(|node| &node.entry)
    }

    /// Returns the root node.
    #[must_use]
    #[inline]
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Returns the options the tree was built with.
    #[must_use]
    pub fn options(&self) -> &GridOptions {
        &self.options
    }

    /// Returns `true` if `id` refers to a live node.
    #[must_use]
    pub fn is_alive(&self, id: NodeId) -> bool {
        self.node(id).is_some()
    }

    /// Returns the kind of `id`.
    #[must_use]
    pub fn kind(&self, id: NodeId) -> Option<EntryKind> {
        self.entry(id).map(|entry| entry.as_grid_entry().kind())
    }

    /// Returns the parent of `id`. Properties of a categorized root report
    /// their category as parent.
    #[must_use]
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id)?.parent
    }

    /// Returns the built children of `id`; empty if none were built.
    #[must_use]
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.child_collection(id).map_or(&[], NodeCollection::as_slice)
    }

    /// Returns the children collection of `id`, or `None` if it was never
    /// built or has been dropped.
    #[must_use]
    pub fn child_collection(&self, id: NodeId) -> Option<&NodeCollection> {
        self.node(id)?.children.as_ref()
    }

    /// Returns the state of `id`.
    #[must_use]
    pub fn state(&self, id: NodeId) -> Option<NodeState> {
        self.node(id).map(|node| node.state)
    }

    /// Returns the label of `id`: a property's display name (parenthesized
    /// when requested), `[i]` for array elements, a category's name, or the
    /// root object's name.
    #[must_use]
    pub fn label(&self, id: NodeId) -> String {
        self.entry(id)
            .map(|entry| entry.as_grid_entry().label(self, id))
            .unwrap_or_default()
    }

    /// Returns the property name of a property node.
    #[must_use]
    pub fn property_name(&self, id: NodeId) -> Option<&str> {
        self.entry(id)?.as_grid_entry().property_name()
    }

    /// Returns the declared type of the node's value.
    #[must_use]
    pub fn property_type(&self, id: NodeId) -> Option<TypeKey> {
        self.entry(id)?.as_grid_entry().property_type(self, id)
    }

    /// Returns the category of a property node.
    #[must_use]
    pub fn category(&self, id: NodeId) -> Option<&str> {
        self.entry(id)?.as_grid_entry().category()
    }

    /// Returns the attributes of the node's descriptor.
    #[must_use]
    pub fn attributes(&self, id: NodeId) -> PropertyAttributes {
        self.entry(id)
            .map(|entry| entry.as_grid_entry().attributes())
            .unwrap_or_default()
    }

    /// Returns the editor style of the node's descriptor.
    #[must_use]
    pub fn edit_style(&self, id: NodeId) -> EditStyle {
        self.entry(id)
            .map(|entry| entry.as_grid_entry().edit_style())
            .unwrap_or_default()
    }

    pub(crate) fn cached_value(&self, id: NodeId) -> CachedValue {
        let Some(node) = self.node(id) else {
            return CachedValue {
                value: PropertyValue::Value(Value::Null),
                all_equal: true,
            };
        };
        let cached = node.cache.borrow().value.clone();
        if let Some(cached) = cached {
            return cached;
        }
        let fresh = node.entry.as_grid_entry().read(self, id);
        node.cache.borrow_mut().value = Some(fresh.clone());
        fresh
    }

    /// Returns the node's value.
    ///
    /// A getter failure is returned as a fault rather than an error. A
    /// multi-object property whose values differ reads as [`Value::Null`];
    /// see [`all_values_equal`](Self::all_values_equal).
    #[must_use]
    pub fn value(&self, id: NodeId) -> PropertyValue {
        self.cached_value(id).value
    }

    /// Returns `false` if the node merges several values that differ.
    #[must_use]
    pub fn all_values_equal(&self, id: NodeId) -> bool {
        self.cached_value(id).all_equal
    }

    /// Writes `value` through the node.
    ///
    /// Returns [`SetOutcome::Vetoed`] if the host refused the change. Setter
    /// failures propagate unchanged.
    pub fn set_value(&mut self, id: NodeId, value: Value) -> Result<SetOutcome, PropertyError> {
        let entry = self.entry(id).cloned().ok_or(PropertyError::StaleNode(id))?;
        entry.as_grid_entry().write(self, id, value)
    }

    pub(crate) fn node_converter(&self, id: NodeId) -> Option<ConverterRef> {
        let node = self.node(id)?;
        let cached = node.cache.borrow().converter.clone();
        if cached.is_some() {
            return cached;
        }
        let fresh = node.entry.as_grid_entry().converter(self, id)?;
        node.cache.borrow_mut().converter = Some(fresh.clone());
        Some(fresh)
    }

    /// Returns the converter used to render and parse the node's value.
    #[must_use]
    pub fn converter(&self, id: NodeId) -> Option<ConverterRef> {
        self.node_converter(id)
    }

    /// Returns the node's value rendered as text.
    ///
    /// A read fault renders as its message; differing multi-object values
    /// render blank.
    #[must_use]
    pub fn value_text(&self, id: NodeId) -> String {
        let Some(node) = self.node(id) else {
            return String::new();
        };
        let cached = node.cache.borrow().value_text.clone();
        if let Some(text) = cached {
            return text;
        }
        let value = self.cached_value(id);
        let text = match &value.value {
            PropertyValue::Fault(fault) => fault.message().to_owned(),
            PropertyValue::Value(_) if !value.all_equal => String::new(),
            PropertyValue::Value(value) => match self.node_converter(id) {
                Some(converter) => converter
                    .convert_to_string(value)
                    .unwrap_or_else(|_| value.to_string()),
                None => value.to_string(),
            },
        };
        node.cache.borrow_mut().value_text = Some(text.clone());
        text
    }

    /// Parses `text` with the node's converter and writes the result.
    pub fn set_value_text(&mut self, id: NodeId, text: &str) -> Result<SetOutcome, PropertyError> {
        if !self.is_alive(id) {
            return Err(PropertyError::StaleNode(id));
        }
        let converter = self
            .node_converter(id)
            .ok_or_else(|| PropertyError::ReadOnly(self.label(id)))?;
        let target = self.property_type(id).unwrap_or(TypeKey::TEXT);
        let value = converter.convert_from_string(&target, text)?;
        self.set_value(id, value)
    }

    /// Returns the converter's standard values for the node, if it offers any.
    #[must_use]
    pub fn standard_values(&self, id: NodeId) -> Vec<Value> {
        match self.node_converter(id) {
            Some(converter) if converter.standard_values_supported() => converter.standard_values(),
            _ => Vec::new(),
        }
    }

    /// Returns `true` if the node cannot be written.
    ///
    /// A property is read-only when its descriptor says so or has no setter,
    /// when an ancestor forces read-only, or when an object it is read from
    /// is read-only. Array elements follow their array; categories and roots
    /// are always read-only as values.
    #[must_use]
    pub fn is_read_only(&self, id: NodeId) -> bool {
        self.entry(id)
            .is_none_or(|entry| entry.as_grid_entry().is_read_only(self, id))
    }

    pub(crate) fn inherits_read_only(&self, id: NodeId) -> bool {
        let mut current = Some(id);
        while let Some(node_id) = current {
            let Some(node) = self.node(node_id) else {
                break;
            };
            if node.state.force_read_only {
                return true;
            }
            current = node.parent;
        }
        self.owners(id).is_ok_and(|owners| {
            owners
                .iter()
                .any(|owner| owner.as_object().is_some_and(|object| object.is_read_only()))
        })
    }

    /// Nearest ancestor that is not a category.
    pub(crate) fn owner_node(&self, id: NodeId) -> Option<NodeId> {
        let mut current = self.parent(id)?;
        while self.kind(current) == Some(EntryKind::Category) {
            current = self.parent(current)?;
        }
        Some(current)
    }

    /// The values the properties of `id` are read from.
    pub(crate) fn owners(&self, id: NodeId) -> Result<Owners, PropertyError> {
        let owner = self
            .owner_node(id)
            .ok_or_else(|| PropertyError::NoOwner(self.label(id)))?;
        self.child_owners(owner)
    }

    /// The values the children of `id` read their properties from.
    pub(crate) fn child_owners(&self, id: NodeId) -> Result<Owners, PropertyError> {
        let entry = self.entry(id).ok_or(PropertyError::StaleNode(id))?;
        match entry {
            Entry::SingleRoot(root) => Ok(SmallVec::from_elem(root.object.clone(), 1)),
            Entry::MultiRoot(root) => Ok(root.objects.iter().cloned().collect()),
            Entry::Property(_) | Entry::ArrayElement(_) => {
                Ok(SmallVec::from_elem(self.cached_value(id).value.into_value(), 1))
            }
            Entry::Merged(merged) => {
                let owners = self.owners(id)?;
                merged
                    .descriptor
                    .descriptors()
                    .iter()
                    .zip(&owners)
                    .map(|(descriptor, owner)| descriptor.get_value(owner))
                    .collect()
            }
            Entry::Category(_) => {
                let owner = self.owner_node(id).ok_or(PropertyError::StaleNode(id))?;
                self.child_owners(owner)
            }
        }
    }

    fn host(&self) -> Option<Rc<dyn TreeHost>> {
        self.host.as_ref()?.upgrade()
    }

    /// Attaches the host that receives change notifications.
    ///
    /// The tree keeps only a weak handle; once the host is dropped,
    /// notifications are skipped.
    pub fn attach_host<H: TreeHost + 'static>(&mut self, host: &Rc<H>) {
        let host: Weak<H> = Rc::downgrade(host);
        self.host = Some(host);
    }

    /// Detaches the host.
    pub fn detach_host(&mut self) {
        self.host = None;
    }

    pub(crate) fn notify_changing(&self, owner: &Value, descriptor: &DescriptorRef) -> Result<(), ChangeVeto> {
        match self.host() {
            Some(host) => host.component_changing(owner, descriptor),
            None => Ok(()),
        }
    }

    pub(crate) fn notify_changed(&self, owner: &Value, descriptor: &DescriptorRef, old: &Value, new: &Value) {
        if let Some(host) = self.host() {
            host.component_changed(owner, descriptor, old, new);
        }
    }

    fn invalidate(&self, id: NodeId) {
        if let Some(host) = self.host() {
            host.value_invalidated(id);
        }
    }

    /// Brings the tree up to date after a successful write through `id`.
    pub(crate) fn finish_write(&mut self, id: NodeId) {
        self.notify_parent_chain(id);
        self.refresh_node(id);
        self.invalidate(id);
    }

    /// Walks up from `id` while nodes carry
    /// [`NOTIFY_PARENT`](PropertyAttributes::NOTIFY_PARENT), reporting each
    /// owning property as changed and clearing its cached value.
    fn notify_parent_chain(&self, id: NodeId) {
        let mut current = id;
        while self
            .attributes(current)
            .contains(PropertyAttributes::NOTIFY_PARENT)
        {
            let Some(parent) = self.owner_node(current) else {
                break;
            };
            let members: Vec<DescriptorRef> = match self.entry(parent) {
                Some(Entry::Property(entry)) => vec![entry.descriptor.clone()],
                Some(Entry::Merged(entry)) => entry.descriptor.descriptors().to_vec(),
                _ => break,
            };
            let owners = self.owners(parent).unwrap_or_default();
            for (descriptor, owner) in members.iter().zip(&owners) {
                if let Err(veto) = self.notify_changing(owner, descriptor) {
                    tracing::debug!(property = descriptor.name(), %veto, "parent notification vetoed");
                    continue;
                }
                let value = descriptor.get_value(owner).unwrap_or_default();
                self.notify_changed(owner, descriptor, &value, &value);
            }
            if let Some(node) = self.node(parent) {
                node.cache.borrow_mut().clear_value();
            }
            self.invalidate(parent);
            current = parent;
        }
    }

    /// Expands `id`, building its children on first use.
    ///
    /// Does nothing unless the node is expandable. If building yields no
    /// children the node is marked as failed and stays collapsed until it is
    /// rebuilt. Returns whether the node is expanded afterwards.
    pub fn expand(&mut self, id: NodeId) -> bool {
        if !self.is_expandable(id) {
            return false;
        }
        if let Some(Entry::Category(category)) = self.entry(id) {
            let name = category.name.clone();
            self.options.categories().set_expanded(&name, true);
        } else if self.child_collection(id).is_none() && !self.create_children(id, false) {
            if let Some(node) = self.node_mut(id) {
                node.state.expand_failed = true;
                node.state.expanded = false;
            }
            return false;
        }
        if let Some(node) = self.node_mut(id) {
            node.state.expanded = true;
        }
        true
    }

    /// Collapses `id`. Category state is remembered by name.
    pub fn collapse(&mut self, id: NodeId) {
        if let Some(Entry::Category(category)) = self.entry(id) {
            let name = category.name.clone();
            self.options.categories().set_expanded(&name, false);
        }
        if let Some(node) = self.node_mut(id) {
            node.state.expanded = false;
        }
    }

    /// Returns `true` if the node's children are shown.
    #[must_use]
    pub fn is_expanded(&self, id: NodeId) -> bool {
        self.node(id).is_some_and(|node| node.state.expanded)
    }

    /// Returns `true` if the node can be expanded.
    #[must_use]
    pub fn is_expandable(&self, id: NodeId) -> bool {
        let Some(node) = self.node(id) else {
            return false;
        };
        if node.state.expand_failed {
            return false;
        }
        if let Some(expandable) = node.state.expandable {
            return expandable;
        }
        if node.children.as_ref().is_some_and(|children| !children.is_empty()) {
            return true;
        }
        match &node.entry {
            Entry::SingleRoot(_) | Entry::MultiRoot(_) | Entry::Category(_) => false,
            Entry::Property(_) | Entry::ArrayElement(_) => {
                let value = self.cached_value(id);
                self.capabilities(id).expandable
                    && value.value.value().is_some_and(|value| !value.is_null())
            }
            Entry::Merged(merged) => {
                if !self.capabilities(id).expandable {
                    return false;
                }
                if merged.descriptor.property_type().is_array() {
                    let value = self.cached_value(id);
                    value.all_equal && value.value.value().is_some_and(|value| !value.is_null())
                } else {
                    self.child_owners(id)
                        .is_ok_and(|owners| owners.iter().all(|owner| !owner.is_null()))
                }
            }
        }
    }

    /// Overrides the node's derived expandability and clears a failed
    /// expansion.
    pub fn set_expandable(&mut self, id: NodeId, expandable: bool) {
        if let Some(node) = self.node_mut(id) {
            node.state.expandable = Some(expandable);
            node.state.expand_failed = false;
            if !expandable {
                node.state.expanded = false;
            }
        }
    }

    /// Returns the node's editing capabilities, derived once and cached.
    #[must_use]
    pub fn capabilities(&self, id: NodeId) -> EntryCapabilities {
        let Some(node) = self.node(id) else {
            return EntryCapabilities::default();
        };
        if let Some(capabilities) = node.cache.borrow().capabilities {
            return capabilities;
        }
        let capabilities = self.derive_capabilities(id);
        node.cache.borrow_mut().capabilities = Some(capabilities);
        capabilities
    }

    fn derive_capabilities(&self, id: NodeId) -> EntryCapabilities {
        let Some(converter) = self.node_converter(id) else {
            return EntryCapabilities::default();
        };
        let kind = self.kind(id);
        if kind.is_some_and(EntryKind::is_root) {
            return EntryCapabilities {
                expandable: converter.properties_supported(),
                ..EntryCapabilities::default()
            };
        }
        let attributes = self.attributes(id);
        let edit_style = self.edit_style(id);
        let read_only = self.is_read_only(id);
        let is_array = self.property_type(id).is_some_and(|ty| ty.is_array());
        let enumerable = converter.standard_values_supported();
        EntryCapabilities {
            enumerable,
            text_editable: converter.can_convert_from_string()
                && !(enumerable && converter.standard_values_exclusive())
                && !read_only
                && !attributes.contains(PropertyAttributes::IMMUTABLE),
            immutable: converter.create_instance_supported()
                || attributes.contains(PropertyAttributes::IMMUTABLE),
            expandable: converter.properties_supported()
                || attributes.contains(PropertyAttributes::SERIALIZE_CONTENT)
                || is_array,
            read_only_editable: read_only && edit_style == EditStyle::Modal,
            render_password: attributes.contains(PropertyAttributes::PASSWORD),
            custom_editable: edit_style == EditStyle::Modal,
            drop_down_editable: edit_style == EditStyle::DropDown || enumerable,
        }
    }

    /// Returns `true` if the value can be changed by any editor.
    #[must_use]
    pub fn is_value_editable(&self, id: NodeId) -> bool {
        let capabilities = self.capabilities(id);
        !self.is_read_only(id)
            && !self.value(id).is_fault()
            && (capabilities.text_editable
                || capabilities.drop_down_editable
                || capabilities.custom_editable)
    }

    /// Returns `true` if the value can be typed as text.
    #[must_use]
    pub fn is_text_editable(&self, id: NodeId) -> bool {
        self.is_value_editable(id) && self.capabilities(id).text_editable
    }

    /// Returns `true` if the value should be drawn as read-only.
    #[must_use]
    pub fn should_render_read_only(&self, id: NodeId) -> bool {
        self.capabilities(id).read_only_editable || (self.is_read_only(id) && !self.is_text_editable(id))
    }

    /// Returns `true` if the value should be masked.
    #[must_use]
    pub fn should_render_password(&self, id: NodeId) -> bool {
        self.capabilities(id).render_password
    }

    /// Returns `true` if a drop-down button should be shown.
    #[must_use]
    pub fn needs_drop_down_button(&self, id: NodeId) -> bool {
        self.capabilities(id).drop_down_editable && !self.is_read_only(id)
    }

    /// Returns `true` if a button for the modal editor should be shown.
    #[must_use]
    pub fn needs_custom_editor_button(&self, id: NodeId) -> bool {
        let capabilities = self.capabilities(id);
        capabilities.custom_editable && (!self.is_read_only(id) || capabilities.read_only_editable)
    }

    /// Returns `true` if the value differs from its default and the label
    /// should be drawn bold.
    #[must_use]
    pub fn is_label_bold(&self, id: NodeId) -> bool {
        let Some(node) = self.node(id) else {
            return false;
        };
        if let Some(bold) = node.cache.borrow().label_bold {
            return bold;
        }
        let bold = node.entry.as_grid_entry().should_serialize_value(self, id);
        node.cache.borrow_mut().label_bold = Some(bold);
        bold
    }

    /// Returns `true` if the node's value can be reset to its default.
    #[must_use]
    pub fn can_reset_value(&self, id: NodeId) -> bool {
        !self.is_read_only(id)
            && self
                .entry(id)
                .is_some_and(|entry| entry.as_grid_entry().can_reset_value(self, id))
    }

    /// Resets the node's value to its default.
    pub fn reset_value(&mut self, id: NodeId) -> Result<SetOutcome, PropertyError> {
        let entry = self.entry(id).cloned().ok_or(PropertyError::StaleNode(id))?;
        if self.is_read_only(id) {
            return Err(PropertyError::ReadOnly(self.label(id)));
        }
        entry.as_grid_entry().reset_value(self, id)
    }

    /// Re-reads the node's value and brings its subtree up to date.
    ///
    /// Expanded nodes whose value changed rebuild their children, keeping
    /// the nodes of properties that still exist; collapsed nodes drop their
    /// children.
    pub fn refresh(&mut self, id: NodeId) {
        self.refresh_node(id);
        self.invalidate(id);
    }

    /// Discards everything derived for `id` and rebuilds its children,
    /// re-expanding it if it was expanded.
    ///
    /// A category owns no children of its own: its properties are kept and
    /// refreshed in place. The host is told how many rows were visible below
    /// the node before and after.
    pub fn recreate_children(&mut self, id: NodeId) {
        let Some(node) = self.node_mut(id) else {
            return;
        };
        let was_expanded = node.state.expanded;
        node.state.expand_failed = false;
        node.cache.borrow_mut().clear();
        let kind = node.entry.as_grid_entry().kind();
        let old_count = self.visible_child_count(id);

        if kind.is_root() {
            self.flatten(id);
            self.drop_children(id);
            let built = self.create_children(id, false);
            if let Some(node) = self.node_mut(id) {
                node.state.expanded = built;
                node.state.expand_failed = !built;
            }
        } else if kind == EntryKind::Category {
            self.refresh_node(id);
        } else {
            self.drop_children(id);
            if was_expanded {
                if let Some(node) = self.node_mut(id) {
                    node.state.expanded = false;
                }
                self.expand(id);
            }
        }
        let new_count = self.visible_child_count(id);
        tracing::debug!(old_count, new_count, "children recreated");
        if let Some(host) = self.host() {
            host.children_recreated(id, old_count, new_count);
        }
    }

    /// Returns the current sort mode.
    #[must_use]
    pub fn property_sort(&self) -> PropertySort {
        self.options.sort()
    }

    /// Changes the sort mode.
    ///
    /// Category nodes are dissolved without disposing the properties under
    /// them; the root's children are then rebuilt in the new order, keeping
    /// the nodes, subtrees and expand state of properties that survive, and
    /// regrouped when the new mode is categorized.
    pub fn set_property_sort(&mut self, sort: PropertySort) {
        if self.options.sort() == sort {
            return;
        }
        self.options.set_sort(sort);
        let root = self.root;
        self.flatten(root);
        self.create_children(root, true);
    }

    /// Finds the child of `id` (looking through categories) for the property
    /// named `name`.
    #[must_use]
    pub fn find_child(&self, id: NodeId, name: &str) -> Option<NodeId> {
        for &child in self.children(id) {
            if self.kind(child) == Some(EntryKind::Category) {
                if let Some(found) = self.find_child(child, name) {
                    return Some(found);
                }
            } else if self.property_name(child) == Some(name) {
                return Some(child);
            }
        }
        None
    }

    /// Returns the node of the root object's default property, or of the
    /// first property when none is declared.
    #[must_use]
    pub fn default_child(&self) -> Option<NodeId> {
        self.default_child.filter(|&id| self.is_alive(id))
    }

    /// Returns the dotted path of labels from the root's first level down to
    /// `id`, skipping categories.
    #[must_use]
    pub fn full_label(&self, id: NodeId) -> String {
        let mut labels = Vec::new();
        let mut current = Some(id);
        while let Some(node_id) = current {
            match self.kind(node_id) {
                None => break,
                Some(kind) if kind.is_root() => break,
                Some(EntryKind::Category) => {}
                Some(_) => labels.push(self.label(node_id)),
            }
            current = self.parent(node_id);
        }
        labels.reverse();
        labels.join(".")
    }

    /// Returns the indentation depth of `id`.
    ///
    /// The root is at `-1` so its properties are at `0`. A category shares
    /// its parent's depth, one less than its children.
    #[must_use]
    pub fn depth(&self, id: NodeId) -> i32 {
        match (self.kind(id), self.parent(id)) {
            (Some(EntryKind::Category), Some(parent)) => self.depth(parent),
            (Some(_), Some(parent)) => self.depth(parent) + 1,
            _ => -1,
        }
    }

    /// Returns the number of rows shown below `id`: its children if it is
    /// expanded, and theirs recursively.
    #[must_use]
    pub fn visible_child_count(&self, id: NodeId) -> usize {
        if !self.is_expanded(id) {
            return 0;
        }
        self.children(id)
            .iter()
            .map(|&child| 1 + self.visible_child_count(child))
            .sum()
    }

    /// Returns a one-line description of the node for diagnostics.
    #[must_use]
    pub fn testing_info(&self, id: NodeId) -> String {
        let ty = self
            .property_type(id)
            .map_or_else(String::new, |ty| ty.to_string());
        format!(
            "{} ({}: {}) = [{}], expandable = {}, read_only = {}",
            self.full_label(id),
            self.label(id),
            ty,
            self.value_text(id),
            self.is_expandable(id),
            self.should_render_read_only(id),
        )
    }
}
