// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Dynamically typed property values.
//!
//! This module provides [`Value`], the currency every descriptor, converter,
//! and tree node trades in, together with the shared handles it wraps:
//! [`ListRef`] for mutable sequences and [`ObjectRef`] for host objects.

use std::any::Any;
use std::borrow::Cow;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use crate::converter::ConverterRef;
use crate::descriptor::DescriptorRef;
use crate::error::{PropertyError, fault_message};
use crate::types::TypeKey;

/// A shared reference to an inspectable host object.
pub type ObjectRef = Rc<dyn Inspect>;

/// A host object whose properties can be browsed.
///
/// Objects are reference types: two [`Value::Object`]s are equal only when
/// they point at the same instance. Implementations mutate their state
/// through interior mutability when a descriptor writes to them.
pub trait Inspect: fmt::Debug {
    /// Returns the object's type.
    fn type_key(&self) -> TypeKey;

    /// Returns the object's display name, if it has one.
    fn name(&self) -> Option<String> {
        None
    }

    /// Returns the object's properties in declaration order.
    fn properties(&self) -> Vec<DescriptorRef>;

    /// Returns the name of the property selected by default.
    fn default_property(&self) -> Option<String> {
        None
    }

    /// Returns `true` if the object's type is marked read-only.
    fn is_read_only(&self) -> bool {
        false
    }

    /// Returns the converter used for values of this object's type.
    fn converter(&self) -> Option<ConverterRef> {
        None
    }

    /// Returns an independent copy of this object, if the type supports it.
    fn try_clone(&self) -> Option<ObjectRef> {
        None
    }

    /// Returns a fresh, default-initialized instance of the same type.
    fn instantiate(&self) -> Option<ObjectRef> {
        None
    }

    /// Upcasts to [`Any`] so descriptors can reach the concrete type.
    fn as_any(&self) -> &dyn Any;
}

/// An immutable value-type instance: a type plus ordered named fields.
///
/// Records are replaced wholesale when edited, never mutated in place.
///
/// # Example
///
/// ```rust
/// use understory_property_grid::{Record, TypeKey, Value};
///
/// let point = Record::new(TypeKey::named("Point"))
///     .with("X", Value::Int(1))
///     .with("Y", Value::Int(2));
/// assert_eq!(point.field("Y"), Some(&Value::Int(2)));
///
/// let moved = point.replace("X", Value::Int(5));
/// assert_eq!(moved.field("X"), Some(&Value::Int(5)));
/// assert_eq!(point.field("X"), Some(&Value::Int(1)));
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct Record {
    type_key: TypeKey,
    fields: Vec<(Cow<'static, str>, Value)>,
}

impl Record {
    /// Creates a record with no fields.
    #[must_use]
    pub fn new(type_key: TypeKey) -> Self {
        Self {
            type_key,
            fields: Vec::new(),
        }
    }

    /// Appends a field, returning the extended record.
    #[must_use]
    pub fn with(mut self, name: impl Into<Cow<'static, str>>, value: Value) -> Self {
        self.fields.push((name.into(), value));
        self
    }

    /// Returns the record's type.
    #[must_use]
    pub fn type_key(&self) -> &TypeKey {
        &self.type_key
    }

    /// Returns the value of the named field.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.fields
            .iter()
            .find(|(field, _)| field == name)
            .map(|(_, value)| value)
    }

    /// Iterates over `(name, value)` pairs in declaration order.
    pub fn fields(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(name, value)| (name.as_ref(), value))
    }

    /// Returns a copy of this record with one field replaced.
    ///
    /// Unknown field names leave the copy unchanged.
    #[must_use]
    pub fn replace(&self, name: &str, value: Value) -> Self {
        let mut copy = self.clone();
        if let Some(slot) = copy.fields.iter_mut().find(|(field, _)| field == name) {
            slot.1 = value;
        }
        copy
    }
}

/// A shared, mutable sequence of values with a declared element type.
///
/// Cloning a `ListRef` clones the handle, not the items; use
/// [`ListRef::deep_copy`] for an independent list.
#[derive(Clone)]
pub struct ListRef {
    element_type: TypeKey,
    items: Rc<RefCell<Vec<Value>>>,
}

impl ListRef {
    /// Creates a list holding `items`.
    #[must_use]
    pub fn new(element_type: TypeKey, items: Vec<Value>) -> Self {
        Self {
            element_type,
            items: Rc::new(RefCell::new(items)),
        }
    }

    /// Returns the declared element type.
    #[must_use]
    pub fn element_type(&self) -> &TypeKey {
        &self.element_type
    }

    /// Returns the number of items.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.borrow().len()
    }

    /// Returns `true` if the list holds no items.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.borrow().is_empty()
    }

    /// Returns a clone of the item at `index`.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<Value> {
        self.items.borrow().get(index).cloned()
    }

    /// Replaces the item at `index`, returning `false` if out of bounds.
    pub fn set(&self, index: usize, value: Value) -> bool {
        match self.items.borrow_mut().get_mut(index) {
            Some(slot) => {
                *slot = value;
                true
            }
            None => false,
        }
    }

    /// Appends an item.
    pub fn push(&self, value: Value) {
        self.items.borrow_mut().push(value);
    }

    /// Removes every item.
    pub fn clear(&self) {
        self.items.borrow_mut().clear();
    }

    /// Replaces the contents with `items`.
    pub fn replace_all(&self, items: Vec<Value>) {
        *self.items.borrow_mut() = items;
    }

    /// Returns a copy of the current items.
    #[must_use]
    pub fn snapshot(&self) -> Vec<Value> {
        self.items.borrow().clone()
    }

    /// Returns a new list with a copy of the items.
    #[must_use]
    pub fn deep_copy(&self) -> Self {
        Self::new(self.element_type.clone(), self.snapshot())
    }

    /// Returns `true` if both handles share the same storage.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.items, &other.items)
    }

    /// Returns `true` if the items equal `other` element-wise.
    #[must_use]
    pub fn items_eq(&self, other: &[Value]) -> bool {
        *self.items.borrow() == other
    }
}

impl PartialEq for ListRef {
    fn eq(&self, other: &Self) -> bool {
        if self.ptr_eq(other) {
            return true;
        }
        let theirs = other.snapshot();
        self.items_eq(&theirs)
    }
}

impl fmt::Debug for ListRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListRef")
            .field("element_type", &self.element_type)
            .field("items", &self.items.borrow())
            .finish()
    }
}

/// A dynamically typed property value.
#[derive(Clone, Debug, Default)]
pub enum Value {
    /// No value.
    #[default]
    Null,
    /// A boolean.
    Bool(bool),
    /// A signed integer.
    Int(i64),
    /// A floating point number.
    Float(f64),
    /// A string.
    Text(String),
    /// An immutable value-type instance.
    Record(Record),
    /// A shared mutable sequence.
    List(ListRef),
    /// A shared host object.
    Object(ObjectRef),
}

impl Value {
    /// Wraps a host object.
    #[must_use]
    pub fn object<T: Inspect + 'static>(object: T) -> Self {
        Self::Object(Rc::new(object))
    }

    /// Creates a list value.
    #[must_use]
    pub fn list(element_type: TypeKey, items: Vec<Self>) -> Self {
        Self::List(ListRef::new(element_type, items))
    }

    /// Returns `true` for [`Value::Null`].
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Returns the boolean payload.
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Returns the integer payload.
    #[must_use]
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Returns the float payload.
    #[must_use]
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Self::Float(x) => Some(*x),
            _ => None,
        }
    }

    /// Returns the string payload.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the record payload.
    #[must_use]
    pub fn as_record(&self) -> Option<&Record> {
        match self {
            Self::Record(r) => Some(r),
            _ => None,
        }
    }

    /// Returns the list handle.
    #[must_use]
    pub fn as_list(&self) -> Option<&ListRef> {
        match self {
            Self::List(l) => Some(l),
            _ => None,
        }
    }

    /// Returns the object handle.
    #[must_use]
    pub fn as_object(&self) -> Option<&ObjectRef> {
        match self {
            Self::Object(o) => Some(o),
            _ => None,
        }
    }

    /// Returns the runtime type of the value, or `None` for [`Value::Null`].
    #[must_use]
    pub fn type_key(&self) -> Option<TypeKey> {
        match self {
            Self::Null => None,
            Self::Bool(_) => Some(TypeKey::BOOL),
            Self::Int(_) => Some(TypeKey::INT),
            Self::Float(_) => Some(TypeKey::FLOAT),
            Self::Text(_) => Some(TypeKey::TEXT),
            Self::Record(r) => Some(r.type_key().clone()),
            Self::List(l) => Some(TypeKey::array_of(l.element_type().clone())),
            Self::Object(o) => Some(o.type_key()),
        }
    }

    /// Returns `true` if both values are the same object instance or list storage.
    ///
    /// Scalars and records never alias.
    #[must_use]
    pub fn aliases(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Object(a), Self::Object(b)) => Rc::ptr_eq(a, b),
            (Self::List(a), Self::List(b)) => a.ptr_eq(b),
            _ => false,
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Null, Self::Null) => true,
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::Int(a), Self::Int(b)) => a == b,
            (Self::Float(a), Self::Float(b)) => a == b,
            (Self::Text(a), Self::Text(b)) => a == b,
            (Self::Record(a), Self::Record(b)) => a == b,
            (Self::List(a), Self::List(b)) => a == b,
            (Self::Object(a), Self::Object(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => Ok(()),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Int(i) => write!(f, "{i}"),
            Self::Float(x) => write!(f, "{x}"),
            Self::Text(s) => f.write_str(s),
            Self::Record(r) => {
                for (i, (_, value)) in r.fields().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{value}")?;
                }
                Ok(())
            }
            Self::List(l) => write!(f, "{}[] Array", l.element_type()),
            Self::Object(o) => match o.name() {
                Some(name) => f.write_str(&name),
                None => write!(f, "{}", o.type_key()),
            },
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Self::Int(value.into())
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::Text(value.into())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<Record> for Value {
    fn from(value: Record) -> Self {
        Self::Record(value)
    }
}

impl From<ListRef> for Value {
    fn from(value: ListRef) -> Self {
        Self::List(value)
    }
}

/// A property getter's failure, carried as a value.
///
/// The message is the inner cause's message when the error had one.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReadFault {
    message: String,
}

impl ReadFault {
    /// Creates a fault with an explicit message.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// Creates a fault describing `error`.
    #[must_use]
    pub fn from_error(error: &PropertyError) -> Self {
        Self::new(fault_message(error))
    }

    /// Returns the message rendered in place of the value.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for ReadFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// The result of reading a node's value: either a value or a read fault.
///
/// Both arms flow through the same rendering path; a fault renders as its
/// message and makes the node non-editable.
#[derive(Clone, Debug, PartialEq)]
pub enum PropertyValue {
    /// The value was read successfully.
    Value(Value),
    /// The getter failed.
    Fault(ReadFault),
}

impl PropertyValue {
    /// Returns the value, or `None` for a fault.
    #[must_use]
    pub fn value(&self) -> Option<&Value> {
        match self {
            Self::Value(value) => Some(value),
            Self::Fault(_) => None,
        }
    }

    /// Returns the fault, or `None` for a value.
    #[must_use]
    pub fn fault(&self) -> Option<&ReadFault> {
        match self {
            Self::Value(_) => None,
            Self::Fault(fault) => Some(fault),
        }
    }

    /// Returns `true` for a fault.
    #[must_use]
    pub fn is_fault(&self) -> bool {
        matches!(self, Self::Fault(_))
    }

    /// Converts into the value, substituting [`Value::Null`] for a fault.
    #[must_use]
    pub fn into_value(self) -> Value {
        match self {
            Self::Value(value) => value,
            Self::Fault(_) => Value::Null,
        }
    }
}

impl From<Value> for PropertyValue {
    fn from(value: Value) -> Self {
        Self::Value(value)
    }
}

impl From<Result<Value, PropertyError>> for PropertyValue {
    fn from(result: Result<Value, PropertyError>) -> Self {
        match result {
            Ok(value) => Self::Value(value),
            Err(error) => Self::Fault(ReadFault::from_error(&error)),
        }
    }
}
