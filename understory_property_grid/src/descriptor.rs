// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The property descriptor contract.
//!
//! A [`PropertyDescriptor`] describes one reflected property of a value
//! owner and reads or writes it given that owner. Owners are plain
//! [`Value`]s: an [`Value::Object`] for host objects, a [`Value::Record`] for
//! the fields of an immutable value type.

use std::fmt;
use std::rc::Rc;

use crate::converter::{ConverterRef, converter_for};
use crate::error::PropertyError;
use crate::types::{PropertyAttributes, TypeKey};
use crate::value::{Record, Value};

/// A shared property descriptor.
pub type DescriptorRef = Rc<dyn PropertyDescriptor>;

/// The category reported by descriptors that do not declare one.
pub const DEFAULT_CATEGORY: &str = "Misc";

/// How a property's editor is presented.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum EditStyle {
    /// No custom editor; the value is edited as text, if at all.
    #[default]
    None,
    /// The editor opens a modal dialog.
    Modal,
    /// The editor drops down below the value cell.
    DropDown,
}

/// Metadata and accessors for one reflected property.
///
/// Only [`name`](Self::name), [`property_type`](Self::property_type),
/// [`component_type`](Self::component_type) and the two accessors are
/// required; everything else has a conservative default.
pub trait PropertyDescriptor: fmt::Debug {
    /// Returns the property name, unique within its owner type.
    fn name(&self) -> &str;

    /// Returns the name shown in the grid.
    fn display_name(&self) -> &str {
        self.name()
    }

    /// Returns the category the property is grouped under.
    fn category(&self) -> &str {
        DEFAULT_CATEGORY
    }

    /// Returns the description shown for the property.
    fn description(&self) -> &str {
        ""
    }

    /// Returns the declared value type.
    fn property_type(&self) -> &TypeKey;

    /// Returns the type that declares the property.
    fn component_type(&self) -> &TypeKey;

    /// Returns the property's declarative attributes.
    fn attributes(&self) -> PropertyAttributes {
        PropertyAttributes::empty()
    }

    /// Returns `true` if the property is declared read-only.
    fn is_read_only(&self) -> bool {
        false
    }

    /// Returns `true` if the property can be written at all.
    fn has_setter(&self) -> bool {
        true
    }

    /// Returns `true` if the property's value is localizable.
    fn is_localizable(&self) -> bool {
        self.attributes().contains(PropertyAttributes::LOCALIZABLE)
    }

    /// Returns the converter for the property's values.
    fn converter(&self) -> ConverterRef {
        converter_for(self.property_type())
    }

    /// Returns the editor presentation for the property.
    fn edit_style(&self) -> EditStyle {
        EditStyle::None
    }

    /// Returns `false` if the property opts out of multi-object merging.
    fn is_mergeable(&self) -> bool {
        !self.attributes().contains(PropertyAttributes::NOT_MERGEABLE)
    }

    /// Reads the property from `owner`.
    fn get_value(&self, owner: &Value) -> Result<Value, PropertyError>;

    /// Writes the property on `owner`.
    fn set_value(&self, owner: &Value, value: Value) -> Result<(), PropertyError>;

    /// Returns `true` if resetting would change the value on `owner`.
    fn can_reset_value(&self, _owner: &Value) -> bool {
        false
    }

    /// Restores the property's default value on `owner`.
    fn reset_value(&self, _owner: &Value) -> Result<(), PropertyError> {
        Ok(())
    }

    /// Returns `true` if the value on `owner` differs from its default.
    fn should_serialize_value(&self, _owner: &Value) -> bool {
        false
    }
}

/// An ordered set of named values used to construct immutable instances.
///
/// # Example
///
/// ```rust
/// use understory_property_grid::{PropertyBag, Value};
///
/// let mut bag = PropertyBag::new();
/// bag.insert("Width", Value::Int(4));
/// bag.insert("Height", Value::Int(3));
/// bag.insert("Width", Value::Int(5));
///
/// assert_eq!(bag.len(), 2);
/// assert_eq!(bag.get("Width"), Some(&Value::Int(5)));
/// ```
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PropertyBag {
    entries: Vec<(String, Value)>,
}

impl PropertyBag {
    /// Creates an empty bag.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces a named value, keeping first-insertion order.
    pub fn insert(&mut self, name: impl Into<String>, value: Value) {
        let name = name.into();
        match self.entries.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = value,
            None => self.entries.push((name, value)),
        }
    }

    /// Returns the named value.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, value)| value)
    }

    /// Returns the number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the bag holds no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates over `(name, value)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v))
    }
}

impl From<&Record> for PropertyBag {
    fn from(record: &Record) -> Self {
        let mut bag = Self::new();
        for (name, value) in record.fields() {
            bag.insert(name, value.clone());
        }
        bag
    }
}

/// Describes one field of a [`Record`] type.
///
/// Records are immutable, so [`set_value`](PropertyDescriptor::set_value)
/// always fails; nodes for record fields edit by reconstructing the parent.
#[derive(Debug)]
pub struct RecordFieldDescriptor {
    name: String,
    field_type: TypeKey,
    record_type: TypeKey,
}

impl RecordFieldDescriptor {
    /// Creates a descriptor for field `name` of `record_type`.
    #[must_use]
    pub fn new(name: impl Into<String>, field_type: TypeKey, record_type: TypeKey) -> Self {
        Self {
            name: name.into(),
            field_type,
            record_type,
        }
    }
}

impl PropertyDescriptor for RecordFieldDescriptor {
    fn name(&self) -> &str {
        &self.name
    }

    fn property_type(&self) -> &TypeKey {
        &self.field_type
    }

    fn component_type(&self) -> &TypeKey {
        &self.record_type
    }

    fn get_value(&self, owner: &Value) -> Result<Value, PropertyError> {
        owner
            .as_record()
            .and_then(|record| record.field(&self.name))
            .cloned()
            .ok_or_else(|| PropertyError::NoOwner(self.name.clone()))
    }

    fn set_value(&self, _owner: &Value, _value: Value) -> Result<(), PropertyError> {
        Err(PropertyError::failed(format!(
            "{} is immutable; field `{}` cannot be written in place",
            self.record_type, self.name
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point() -> Value {
        Record::new(TypeKey::named("Point"))
            .with("X", Value::Int(3))
            .with("Y", Value::Int(4))
            .into()
    }

    #[test]
    fn record_field_reads_from_record_owner() {
        let field = RecordFieldDescriptor::new("Y", TypeKey::INT, TypeKey::named("Point"));
        assert_eq!(field.get_value(&point()).ok(), Some(Value::Int(4)));
        assert_eq!(field.category(), DEFAULT_CATEGORY);
        assert!(field.is_mergeable());
        assert!(matches!(
            field.get_value(&Value::Int(1)),
            Err(PropertyError::NoOwner(_))
        ));
    }

    #[test]
    fn record_field_rejects_in_place_writes() {
        let field = RecordFieldDescriptor::new("X", TypeKey::INT, TypeKey::named("Point"));
        let err = field.set_value(&point(), Value::Int(9));
        assert!(err.is_err());
    }

    #[test]
    fn bag_from_record_keeps_field_order() {
        let Value::Record(record) = point() else {
            unreachable!()
        };
        let bag = PropertyBag::from(&record);
        let names: Vec<_> = bag.iter().map(|(n, _)| n).collect();
        assert_eq!(names, ["X", "Y"]);
    }
}
