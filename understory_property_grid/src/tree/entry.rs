// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Node variants and their per-variant behaviour.
//!
//! Every node holds one [`Entry`]. The tree dispatches value access,
//! editability, labels and child construction through [`GridEntry`], which
//! each variant implements; shared logic (caching, expansion, notification)
//! lives on the tree.

use std::cell::OnceCell;
use std::rc::Rc;

use crate::converter::{ConverterRef, ExpandableConverter, converter_for};
use crate::descriptor::{DescriptorRef, EditStyle, PropertyBag};
use crate::error::PropertyError;
use crate::host::SetOutcome;
use crate::merge::MergedPropertyDescriptor;
use crate::tree::PropertyTree;
use crate::tree::node::{CachedValue, EntryKind, NodeId};
use crate::types::{PropertyAttributes, TypeKey};
use crate::value::{ListRef, PropertyValue, Value};

/// How a property node writes its value.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum WriteMode {
    /// Write through the descriptor on the owner.
    InPlace,
    /// Rebuild the owning immutable value and write that to the parent.
    Reconstruct,
}

/// The capability interface every node variant implements.
pub(crate) trait GridEntry {
    fn kind(&self) -> EntryKind;

    fn label(&self, tree: &PropertyTree, id: NodeId) -> String;

    fn property_name(&self) -> Option<&str> {
        None
    }

    fn property_type(&self, tree: &PropertyTree, id: NodeId) -> Option<TypeKey>;

    fn category(&self) -> Option<&str> {
        None
    }

    fn attributes(&self) -> PropertyAttributes {
        PropertyAttributes::empty()
    }

    fn edit_style(&self) -> EditStyle {
        EditStyle::None
    }

    fn converter(&self, tree: &PropertyTree, id: NodeId) -> Option<ConverterRef>;

    /// Reads the value, bypassing the node cache.
    fn read(&self, tree: &PropertyTree, id: NodeId) -> CachedValue;

    fn write(&self, tree: &mut PropertyTree, id: NodeId, value: Value) -> Result<SetOutcome, PropertyError>;

    fn is_read_only(&self, tree: &PropertyTree, id: NodeId) -> bool;

    /// Returns the entries for the node's children, or `None` if they could
    /// not be determined.
    fn build_children(&self, tree: &PropertyTree, id: NodeId) -> Option<Vec<Entry>>;

    fn can_reset_value(&self, _tree: &PropertyTree, _id: NodeId) -> bool {
        false
    }

    fn reset_value(&self, _tree: &mut PropertyTree, _id: NodeId) -> Result<SetOutcome, PropertyError> {
        Ok(SetOutcome::Applied)
    }

    fn should_serialize_value(&self, _tree: &PropertyTree, _id: NodeId) -> bool {
        false
    }
}

#[derive(Clone, Debug)]
pub(crate) enum Entry {
    SingleRoot(SingleRootEntry),
    MultiRoot(MultiRootEntry),
    Property(PropertyEntry),
    Merged(MergedEntry),
    ArrayElement(ArrayElementEntry),
    Category(CategoryEntry),
}

impl Entry {
    pub(crate) fn as_grid_entry(&self) -> &dyn GridEntry {
        match self {
            Self::SingleRoot(entry) => entry,
            Self::MultiRoot(entry) => entry,
            Self::Property(entry) => entry,
            Self::Merged(entry) => entry,
            Self::ArrayElement(entry) => entry,
            Self::Category(entry) => entry,
        }
    }

    /// Returns `true` if `other` stands for the same slot, so an existing
    /// node for `self` can be kept when children are rebuilt.
    pub(crate) fn same_slot(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Property(a), Self::Property(b)) => {
                a.mode == b.mode
                    && a.descriptor.name() == b.descriptor.name()
                    && a.descriptor.property_type() == b.descriptor.property_type()
            }
            (Self::Merged(a), Self::Merged(b)) => {
                a.mode == b.mode
                    && a.descriptor.name() == b.descriptor.name()
                    && a.descriptor.property_type() == b.descriptor.property_type()
            }
            (Self::ArrayElement(a), Self::ArrayElement(b)) => {
                a.index == b.index && a.element_type == b.element_type
            }
            (Self::Category(a), Self::Category(b)) => a.name == b.name,
            _ => false,
        }
    }
}

fn parenthesized(display_name: &str, attributes: PropertyAttributes) -> String {
    if attributes.contains(PropertyAttributes::PARENTHESIZE) && !display_name.starts_with('(') {
        format!("({display_name})")
    } else {
        display_name.to_owned()
    }
}

/// Prefers the converter of an object value over the descriptor's.
fn value_converter(tree: &PropertyTree, id: NodeId, fallback: impl FnOnce() -> ConverterRef) -> ConverterRef {
    tree.cached_value(id)
        .value
        .value()
        .and_then(Value::as_object)
        .and_then(|object| object.converter())
        .unwrap_or_else(fallback)
}

fn write_mode_for(converter: &ConverterRef, attributes: PropertyAttributes) -> WriteMode {
    if converter.create_instance_supported() || attributes.contains(PropertyAttributes::IMMUTABLE) {
        WriteMode::Reconstruct
    } else {
        WriteMode::InPlace
    }
}

/// Child entries for a property-like node whose value is `value`.
fn value_children(
    tree: &PropertyTree,
    id: NodeId,
    value: &PropertyValue,
    property_type: Option<TypeKey>,
    attributes: PropertyAttributes,
) -> Option<Vec<Entry>> {
    let Some(value) = value.value() else {
        return Some(Vec::new());
    };
    if value.is_null() {
        return Some(Vec::new());
    }
    if let (Some(TypeKey::Array(element_type)), Value::List(list)) = (&property_type, value) {
        return Some(
            (0..list.len())
                .map(|index| {
                    Entry::ArrayElement(ArrayElementEntry {
                        index,
                        element_type: (**element_type).clone(),
                    })
                })
                .collect(),
        );
    }
    let converter = tree.node_converter(id)?;
    let mode = write_mode_for(&converter, attributes);
    tree.property_entries(value, &converter, mode)
}

/// Reconstructs the immutable parent of `id` with `name` replaced and writes it.
fn write_reconstructed(
    tree: &mut PropertyTree,
    id: NodeId,
    name: &str,
    value: Value,
) -> Result<SetOutcome, PropertyError> {
    let parent = tree
        .owner_node(id)
        .ok_or_else(|| PropertyError::NoOwner(name.to_owned()))?;
    let cached = tree.cached_value(parent);
    let parent_value = match cached.value {
        PropertyValue::Value(value) if cached.all_equal && !value.is_null() => value,
        _ => return Err(PropertyError::NoOwner(name.to_owned())),
    };
    let converter = tree
        .node_converter(parent)
        .ok_or_else(|| PropertyError::NoOwner(name.to_owned()))?;
    let target = tree
        .property_type(parent)
        .or_else(|| parent_value.type_key())
        .unwrap_or(TypeKey::OBJECT);

    let mut bag = PropertyBag::new();
    for property in converter.properties(&parent_value)? {
        let current = if property.name() == name {
            value.clone()
        } else {
            property.get_value(&parent_value)?
        };
        bag.insert(property.name(), current);
    }
    let created = converter
        .create_instance(&target, &bag)
        .map_err(|error| PropertyError::construction(&target, error))?;
    if created.is_null() {
        return Err(PropertyError::CreateInstance { type_name: target });
    }
    tree.set_value(parent, created)
}

#[derive(Clone, Debug)]
pub(crate) struct SingleRootEntry {
    pub(crate) object: Value,
}

impl GridEntry for SingleRootEntry {
    fn kind(&self) -> EntryKind {
        EntryKind::SingleRoot
    }

    fn label(&self, _tree: &PropertyTree, _id: NodeId) -> String {
        match &self.object {
            Value::Object(object) => object.name().unwrap_or_else(|| object.type_key().to_string()),
            other => other.to_string(),
        }
    }

    fn property_type(&self, _tree: &PropertyTree, _id: NodeId) -> Option<TypeKey> {
        self.object.type_key()
    }

    fn converter(&self, _tree: &PropertyTree, _id: NodeId) -> Option<ConverterRef> {
        Some(
            self.object
                .as_object()
                .and_then(|object| object.converter())
                .unwrap_or_else(|| Rc::new(ExpandableConverter)),
        )
    }

    fn read(&self, _tree: &PropertyTree, _id: NodeId) -> CachedValue {
        CachedValue {
            value: PropertyValue::Value(self.object.clone()),
            all_equal: true,
        }
    }

    fn write(&self, _tree: &mut PropertyTree, _id: NodeId, _value: Value) -> Result<SetOutcome, PropertyError> {
        Err(PropertyError::ReadOnly(self.label_for_errors()))
    }

    fn is_read_only(&self, tree: &PropertyTree, id: NodeId) -> bool {
        tree.inherits_read_only(id)
    }

    fn build_children(&self, tree: &PropertyTree, id: NodeId) -> Option<Vec<Entry>> {
        let converter = tree.node_converter(id)?;
        let mode = write_mode_for(&converter, PropertyAttributes::empty());
        tree.property_entries(&self.object, &converter, mode)
    }
}

impl SingleRootEntry {
    fn label_for_errors(&self) -> String {
        self.object
            .type_key()
            .map_or_else(String::new, |ty| ty.to_string())
    }
}

#[derive(Clone, Debug)]
pub(crate) struct MultiRootEntry {
    pub(crate) objects: Rc<[Value]>,
    force_read_only: Rc<OnceCell<bool>>,
}

impl MultiRootEntry {
    pub(crate) fn new(objects: Vec<Value>) -> Self {
        Self {
            objects: objects.into(),
            force_read_only: Rc::new(OnceCell::new()),
        }
    }

    /// `true` if any selected object is read-only. Computed once per root.
    pub(crate) fn force_read_only(&self) -> bool {
        *self.force_read_only.get_or_init(|| {
            self.objects
                .iter()
                .any(|value| value.as_object().is_some_and(|object| object.is_read_only()))
        })
    }
}

impl GridEntry for MultiRootEntry {
    fn kind(&self) -> EntryKind {
        EntryKind::MultiRoot
    }

    fn label(&self, _tree: &PropertyTree, _id: NodeId) -> String {
        let first = self.objects.first().and_then(Value::type_key);
        let shared = first.as_ref().filter(|ty| {
            self.objects
                .iter()
                .all(|object| object.type_key().as_ref() == Some(*ty))
        });
        match shared {
            Some(ty) => ty.to_string(),
            None => String::new(),
        }
    }

    fn property_type(&self, _tree: &PropertyTree, _id: NodeId) -> Option<TypeKey> {
        None
    }

    fn converter(&self, _tree: &PropertyTree, _id: NodeId) -> Option<ConverterRef> {
        Some(Rc::new(ExpandableConverter))
    }

    fn read(&self, _tree: &PropertyTree, _id: NodeId) -> CachedValue {
        CachedValue {
            value: PropertyValue::Value(Value::Null),
            all_equal: self.objects.len() <= 1,
        }
    }

    fn write(&self, _tree: &mut PropertyTree, _id: NodeId, _value: Value) -> Result<SetOutcome, PropertyError> {
        Err(PropertyError::ReadOnly(String::new()))
    }

    fn is_read_only(&self, _tree: &PropertyTree, _id: NodeId) -> bool {
        self.force_read_only()
    }

    fn build_children(&self, tree: &PropertyTree, _id: NodeId) -> Option<Vec<Entry>> {
        tree.merged_entries(&self.objects, WriteMode::InPlace)
    }
}

#[derive(Clone, Debug)]
pub(crate) struct PropertyEntry {
    pub(crate) descriptor: DescriptorRef,
    pub(crate) mode: WriteMode,
}

impl GridEntry for PropertyEntry {
    fn kind(&self) -> EntryKind {
        match self.mode {
            WriteMode::InPlace => EntryKind::Property,
            WriteMode::Reconstruct => EntryKind::ImmutableProperty,
        }
    }

    fn label(&self, _tree: &PropertyTree, _id: NodeId) -> String {
        parenthesized(self.descriptor.display_name(), self.descriptor.attributes())
    }

    fn property_name(&self) -> Option<&str> {
        Some(self.descriptor.name())
    }

    fn property_type(&self, _tree: &PropertyTree, _id: NodeId) -> Option<TypeKey> {
        Some(self.descriptor.property_type().clone())
    }

    fn category(&self) -> Option<&str> {
        Some(self.descriptor.category())
    }

    fn attributes(&self) -> PropertyAttributes {
        self.descriptor.attributes()
    }

    fn edit_style(&self) -> EditStyle {
        self.descriptor.edit_style()
    }

    fn converter(&self, tree: &PropertyTree, id: NodeId) -> Option<ConverterRef> {
        Some(value_converter(tree, id, || self.descriptor.converter()))
    }

    fn read(&self, tree: &PropertyTree, id: NodeId) -> CachedValue {
        let value = match tree.owners(id) {
            Ok(owners) => match owners.first() {
                Some(owner) => self.descriptor.get_value(owner).into(),
                None => PropertyValue::Value(Value::Null),
            },
            Err(_) => PropertyValue::Value(Value::Null),
        };
        CachedValue {
            value,
            all_equal: true,
        }
    }

    fn write(&self, tree: &mut PropertyTree, id: NodeId, value: Value) -> Result<SetOutcome, PropertyError> {
        if tree.is_read_only(id) {
            return Err(PropertyError::ReadOnly(self.descriptor.name().to_owned()));
        }
        if self.mode == WriteMode::Reconstruct {
            return write_reconstructed(tree, id, self.descriptor.name(), value);
        }
        let owners = tree.owners(id)?;
        let owner = owners
            .first()
            .ok_or_else(|| PropertyError::NoOwner(self.descriptor.name().to_owned()))?;
        if let Err(veto) = tree.notify_changing(owner, &self.descriptor) {
            tracing::debug!(property = self.descriptor.name(), %veto, "write vetoed");
            return Ok(SetOutcome::Vetoed);
        }
        let old = tree.cached_value(id).value.into_value();
        self.descriptor.set_value(owner, value.clone())?;
        tree.notify_changed(owner, &self.descriptor, &old, &value);
        tree.finish_write(id);
        Ok(SetOutcome::Applied)
    }

    fn is_read_only(&self, tree: &PropertyTree, id: NodeId) -> bool {
        self.descriptor.is_read_only()
            || !self.descriptor.has_setter()
            || tree.inherits_read_only(id)
            || (self.mode == WriteMode::Reconstruct
                && tree.owner_node(id).is_some_and(|parent| tree.is_read_only(parent)))
    }

    fn build_children(&self, tree: &PropertyTree, id: NodeId) -> Option<Vec<Entry>> {
        let cached = tree.cached_value(id);
        value_children(
            tree,
            id,
            &cached.value,
            Some(self.descriptor.property_type().clone()),
            self.descriptor.attributes(),
        )
    }

    fn can_reset_value(&self, tree: &PropertyTree, id: NodeId) -> bool {
        tree.owners(id)
            .ok()
            .and_then(|owners| owners.first().map(|owner| self.descriptor.can_reset_value(owner)))
            .unwrap_or(false)
    }

    fn reset_value(&self, tree: &mut PropertyTree, id: NodeId) -> Result<SetOutcome, PropertyError> {
        let owners = tree.owners(id)?;
        let owner = owners
            .first()
            .ok_or_else(|| PropertyError::NoOwner(self.descriptor.name().to_owned()))?;
        if let Err(veto) = tree.notify_changing(owner, &self.descriptor) {
            tracing::debug!(property = self.descriptor.name(), %veto, "reset vetoed");
            return Ok(SetOutcome::Vetoed);
        }
        let old = tree.cached_value(id).value.into_value();
        self.descriptor.reset_value(owner)?;
        let new = self.descriptor.get_value(owner).unwrap_or_default();
        tree.notify_changed(owner, &self.descriptor, &old, &new);
        tree.finish_write(id);
        Ok(SetOutcome::Applied)
    }

    fn should_serialize_value(&self, tree: &PropertyTree, id: NodeId) -> bool {
        tree.owners(id)
            .ok()
            .and_then(|owners| {
                owners
                    .first()
                    .map(|owner| self.descriptor.should_serialize_value(owner))
            })
            .unwrap_or(false)
    }
}

#[derive(Clone, Debug)]
pub(crate) struct MergedEntry {
    pub(crate) descriptor: Rc<MergedPropertyDescriptor>,
    pub(crate) mode: WriteMode,
}

impl GridEntry for MergedEntry {
    fn kind(&self) -> EntryKind {
        EntryKind::Merged
    }

    fn label(&self, _tree: &PropertyTree, _id: NodeId) -> String {
        parenthesized(self.descriptor.display_name(), self.descriptor.attributes())
    }

    fn property_name(&self) -> Option<&str> {
        Some(self.descriptor.name())
    }

    fn property_type(&self, _tree: &PropertyTree, _id: NodeId) -> Option<TypeKey> {
        Some(self.descriptor.property_type().clone())
    }

    fn category(&self) -> Option<&str> {
        Some(self.descriptor.category())
    }

    fn attributes(&self) -> PropertyAttributes {
        self.descriptor.attributes()
    }

    fn edit_style(&self) -> EditStyle {
        self.descriptor.edit_style()
    }

    fn converter(&self, tree: &PropertyTree, id: NodeId) -> Option<ConverterRef> {
        Some(value_converter(tree, id, || self.descriptor.converter()))
    }

    fn read(&self, tree: &PropertyTree, id: NodeId) -> CachedValue {
        let result = tree
            .owners(id)
            .and_then(|owners| self.descriptor.get_value(&owners));
        match result {
            Ok(merged) => CachedValue {
                value: PropertyValue::Value(merged.value),
                all_equal: merged.all_equal,
            },
            Err(error) => CachedValue {
                value: PropertyValue::from(Err::<Value, _>(error)),
                all_equal: true,
            },
        }
    }

    fn write(&self, tree: &mut PropertyTree, id: NodeId, value: Value) -> Result<SetOutcome, PropertyError> {
        if tree.is_read_only(id) {
            return Err(PropertyError::ReadOnly(self.descriptor.name().to_owned()));
        }
        if self.mode == WriteMode::Reconstruct {
            return write_reconstructed(tree, id, self.descriptor.name(), value);
        }
        let owners = tree.owners(id)?;
        let members = self.descriptor.descriptors();
        for (descriptor, owner) in members.iter().zip(&owners) {
            if let Err(veto) = tree.notify_changing(owner, descriptor) {
                tracing::debug!(property = self.descriptor.name(), %veto, "merged write vetoed");
                return Ok(SetOutcome::Vetoed);
            }
        }
        let old: Vec<Value> = members
            .iter()
            .zip(&owners)
            .map(|(descriptor, owner)| descriptor.get_value(owner).unwrap_or_default())
            .collect();
        self.descriptor.set_value(&owners, &value)?;
        for ((descriptor, owner), old) in members.iter().zip(&owners).zip(&old) {
            let new = descriptor.get_value(owner).unwrap_or_default();
            tree.notify_changed(owner, descriptor, old, &new);
        }
        tree.finish_write(id);
        Ok(SetOutcome::Applied)
    }

    fn is_read_only(&self, tree: &PropertyTree, id: NodeId) -> bool {
        self.descriptor.is_read_only()
            || !self.descriptor.has_setter()
            || tree.inherits_read_only(id)
            || (self.mode == WriteMode::Reconstruct
                && tree.owner_node(id).is_some_and(|parent| tree.is_read_only(parent)))
    }

    fn build_children(&self, tree: &PropertyTree, id: NodeId) -> Option<Vec<Entry>> {
        let cached = tree.cached_value(id);
        let property_type = self.descriptor.property_type();
        if property_type.is_array() {
            if !cached.all_equal {
                return Some(Vec::new());
            }
            return value_children(
                tree,
                id,
                &cached.value,
                Some(property_type.clone()),
                self.descriptor.attributes(),
            );
        }
        let owners = tree.child_owners(id).ok()?;
        if owners.iter().any(Value::is_null) {
            return Some(Vec::new());
        }
        let converter = tree.node_converter(id)?;
        if !converter.properties_supported()
            && !self
                .descriptor
                .attributes()
                .contains(PropertyAttributes::SERIALIZE_CONTENT)
        {
            return Some(Vec::new());
        }
        let mode = write_mode_for(&converter, self.descriptor.attributes());
        tree.merged_entries(&owners, mode)
    }

    fn can_reset_value(&self, tree: &PropertyTree, id: NodeId) -> bool {
        tree.owners(id)
            .is_ok_and(|owners| self.descriptor.can_reset_value(&owners))
    }

    fn reset_value(&self, tree: &mut PropertyTree, id: NodeId) -> Result<SetOutcome, PropertyError> {
        let owners = tree.owners(id)?;
        let members = self.descriptor.descriptors();
        for (descriptor, owner) in members.iter().zip(&owners) {
            if let Err(veto) = tree.notify_changing(owner, descriptor) {
                tracing::debug!(property = self.descriptor.name(), %veto, "merged reset vetoed");
                return Ok(SetOutcome::Vetoed);
            }
        }
        let old: Vec<Value> = members
            .iter()
            .zip(&owners)
            .map(|(descriptor, owner)| descriptor.get_value(owner).unwrap_or_default())
            .collect();
        self.descriptor.reset_value(&owners)?;
        for ((descriptor, owner), old) in members.iter().zip(&owners).zip(&old) {
            let new = descriptor.get_value(owner).unwrap_or_default();
            tree.notify_changed(owner, descriptor, old, &new);
        }
        tree.finish_write(id);
        Ok(SetOutcome::Applied)
    }

    fn should_serialize_value(&self, tree: &PropertyTree, id: NodeId) -> bool {
        tree.owners(id)
            .is_ok_and(|owners| self.descriptor.should_serialize_value(&owners))
    }
}

#[derive(Clone, Debug)]
pub(crate) struct ArrayElementEntry {
    pub(crate) index: usize,
    pub(crate) element_type: TypeKey,
}

impl ArrayElementEntry {
    fn array(&self, tree: &PropertyTree, id: NodeId) -> Option<(NodeId, ListRef)> {
        let parent = tree.parent(id)?;
        let cached = tree.cached_value(parent);
        match cached.value.value() {
            Some(Value::List(list)) => Some((parent, list.clone())),
            _ => None,
        }
    }
}

impl GridEntry for ArrayElementEntry {
    fn kind(&self) -> EntryKind {
        EntryKind::ArrayElement
    }

    fn label(&self, _tree: &PropertyTree, _id: NodeId) -> String {
        format!("[{}]", self.index)
    }

    fn property_type(&self, _tree: &PropertyTree, _id: NodeId) -> Option<TypeKey> {
        Some(self.element_type.clone())
    }

    fn converter(&self, tree: &PropertyTree, id: NodeId) -> Option<ConverterRef> {
        Some(value_converter(tree, id, || converter_for(&self.element_type)))
    }

    fn read(&self, tree: &PropertyTree, id: NodeId) -> CachedValue {
        let value = self
            .array(tree, id)
            .and_then(|(_, list)| list.get(self.index))
            .unwrap_or_default();
        CachedValue {
            value: PropertyValue::Value(value),
            all_equal: true,
        }
    }

    fn write(&self, tree: &mut PropertyTree, id: NodeId, value: Value) -> Result<SetOutcome, PropertyError> {
        let label = format!("[{}]", self.index);
        if tree.is_read_only(id) {
            return Err(PropertyError::ReadOnly(label));
        }
        let (parent, list) = self
            .array(tree, id)
            .ok_or_else(|| PropertyError::NoOwner(label.clone()))?;
        let mut items = list.snapshot();
        let slot = items
            .get_mut(self.index)
            .ok_or_else(|| PropertyError::NoOwner(label))?;
        *slot = value;
        let replaced = ListRef::new(list.element_type().clone(), items);
        tree.set_value(parent, Value::List(replaced))
    }

    fn is_read_only(&self, tree: &PropertyTree, id: NodeId) -> bool {
        tree.parent(id).is_none_or(|parent| tree.is_read_only(parent))
    }

    fn build_children(&self, tree: &PropertyTree, id: NodeId) -> Option<Vec<Entry>> {
        let cached = tree.cached_value(id);
        value_children(
            tree,
            id,
            &cached.value,
            Some(self.element_type.clone()),
            PropertyAttributes::empty(),
        )
    }
}

#[derive(Clone, Debug)]
pub(crate) struct CategoryEntry {
    pub(crate) name: String,
}

impl GridEntry for CategoryEntry {
    fn kind(&self) -> EntryKind {
        EntryKind::Category
    }

    fn label(&self, _tree: &PropertyTree, _id: NodeId) -> String {
        self.name.clone()
    }

    fn property_type(&self, _tree: &PropertyTree, _id: NodeId) -> Option<TypeKey> {
        None
    }

    fn converter(&self, _tree: &PropertyTree, _id: NodeId) -> Option<ConverterRef> {
        None
    }

    fn read(&self, _tree: &PropertyTree, _id: NodeId) -> CachedValue {
        CachedValue {
            value: PropertyValue::Value(Value::Null),
            all_equal: true,
        }
    }

    fn write(&self, _tree: &mut PropertyTree, _id: NodeId, _value: Value) -> Result<SetOutcome, PropertyError> {
        Err(PropertyError::ReadOnly(self.name.clone()))
    }

    fn is_read_only(&self, _tree: &PropertyTree, _id: NodeId) -> bool {
        true
    }

    /// Category children are assigned by categorization, never built.
    fn build_children(&self, _tree: &PropertyTree, _id: NodeId) -> Option<Vec<Entry>> {
        None
    }
}
