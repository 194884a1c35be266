// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Runtime-defined object types.
//!
//! Hosts without a reflection system of their own describe their types with
//! an [`ObjectType`] built from [`FieldDescriptor`]s, then create
//! [`DynamicObject`] instances of it. A dynamic object stores its field values
//! by name; fields may instead supply custom getter and setter closures.
//!
//! # Example
//!
//! ```rust
//! use understory_property_grid::{
//!     DynamicObject, FieldDescriptor, Inspect, ObjectType, PropertyAttributes, TypeKey, Value,
//! };
//!
//! let button = ObjectType::builder(TypeKey::named("Button"))
//!     .field(FieldDescriptor::builder("Text", TypeKey::TEXT).category("Appearance"))
//!     .field(
//!         FieldDescriptor::builder("Enabled", TypeKey::BOOL)
//!             .category("Behavior")
//!             .default_value(Value::Bool(true)),
//!     )
//!     .field(FieldDescriptor::builder("Tag", TypeKey::TEXT).attributes(PropertyAttributes::HIDDEN))
//!     .default_property("Text")
//!     .build();
//!
//! let ok = DynamicObject::new(&button).with("Text", "OK".into());
//! assert_eq!(ok.get("Text"), Value::from("OK"));
//! assert_eq!(ok.get("Enabled"), Value::Bool(true));
//! assert_eq!(ok.properties().len(), 3);
//! ```

use std::any::Any;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use hashbrown::HashMap;

use crate::converter::ConverterRef;
use crate::descriptor::{DEFAULT_CATEGORY, DescriptorRef, EditStyle, PropertyDescriptor};
use crate::error::PropertyError;
use crate::types::{PropertyAttributes, TypeKey};
use crate::value::{Inspect, ObjectRef, Value};

/// Custom read accessor for a dynamic field.
pub type FieldGetter = Rc<dyn Fn(&DynamicObject) -> Result<Value, PropertyError>>;

/// Custom write accessor for a dynamic field.
pub type FieldSetter = Rc<dyn Fn(&DynamicObject, Value) -> Result<(), PropertyError>>;

/// A property of an [`ObjectType`].
pub struct FieldDescriptor {
    name: String,
    display_name: Option<String>,
    category: Option<String>,
    description: String,
    property_type: TypeKey,
    component_type: TypeKey,
    attributes: PropertyAttributes,
    read_only: bool,
    has_setter: bool,
    default_value: Option<Value>,
    converter: Option<ConverterRef>,
    edit_style: EditStyle,
    getter: Option<FieldGetter>,
    setter: Option<FieldSetter>,
}

impl FieldDescriptor {
    /// Starts building a field named `name` holding values of `property_type`.
    #[must_use]
    pub fn builder(name: impl Into<String>, property_type: TypeKey) -> FieldDescriptorBuilder {
        FieldDescriptorBuilder::new(name, property_type)
    }

    /// Returns the declared default value, if any.
    #[must_use]
    #[inline]
    pub fn default_value(&self) -> Option<&Value> {
        self.default_value.as_ref()
    }

    fn resolve<'a>(&self, owner: &'a Value) -> Result<&'a DynamicObject, PropertyError> {
        owner
            .as_object()
            .and_then(|object| object.as_any().downcast_ref::<DynamicObject>())
            .ok_or_else(|| PropertyError::NoOwner(self.name.clone()))
    }

    fn current(&self, owner: &Value) -> Option<Value> {
        self.get_value(owner).ok()
    }
}

impl fmt::Debug for FieldDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldDescriptor")
            .field("name", &self.name)
            .field("display_name", &self.display_name)
            .field("category", &self.category)
            .field("description", &self.description)
            .field("property_type", &self.property_type)
            .field("component_type", &self.component_type)
            .field("attributes", &self.attributes)
            .field("read_only", &self.read_only)
            .field("has_setter", &self.has_setter)
            .field("default_value", &self.default_value)
            .field("converter", &self.converter)
            .field("edit_style", &self.edit_style)
            .field("has_getter", &self.getter.is_some())
            .field("has_custom_setter", &self.setter.is_some())
            .finish()
    }
}

impl PropertyDescriptor for FieldDescriptor {
    fn name(&self) -> &str {
        &self.name
    }

    fn display_name(&self) -> &str {
        self.display_name.as_deref().unwrap_or(&self.name)
    }

    fn category(&self) -> &str {
        self.category.as_deref().unwrap_or(DEFAULT_CATEGORY)
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn property_type(&self) -> &TypeKey {
        &self.property_type
    }

    fn component_type(&self) -> &TypeKey {
        &self.component_type
    }

    fn attributes(&self) -> PropertyAttributes {
        self.attributes
    }

    fn is_read_only(&self) -> bool {
        self.read_only
    }

    fn has_setter(&self) -> bool {
        self.has_setter
    }

    fn converter(&self) -> ConverterRef {
        match &self.converter {
            Some(converter) => converter.clone(),
            None => crate::converter::converter_for(&self.property_type),
        }
    }

    fn edit_style(&self) -> EditStyle {
        self.edit_style
    }

    fn get_value(&self, owner: &Value) -> Result<Value, PropertyError> {
        let object = self.resolve(owner)?;
        match &self.getter {
            Some(getter) => getter(object),
            None => Ok(object.get(&self.name)),
        }
    }

    fn set_value(&self, owner: &Value, value: Value) -> Result<(), PropertyError> {
        if !self.has_setter {
            return Err(PropertyError::ReadOnly(self.name.clone()));
        }
        let object = self.resolve(owner)?;
        match &self.setter {
            Some(setter) => setter(object, value),
            None => {
                object.set(&self.name, value);
                Ok(())
            }
        }
    }

    fn can_reset_value(&self, owner: &Value) -> bool {
        match &self.default_value {
            Some(default) => self.has_setter && self.current(owner).as_ref() != Some(default),
            None => false,
        }
    }

    fn reset_value(&self, owner: &Value) -> Result<(), PropertyError> {
        match &self.default_value {
            Some(default) => self.set_value(owner, default.clone()),
            None => Ok(()),
        }
    }

    fn should_serialize_value(&self, owner: &Value) -> bool {
        match &self.default_value {
            Some(default) => self.current(owner).as_ref() != Some(default),
            None => false,
        }
    }
}

/// Builder for [`FieldDescriptor`].
pub struct FieldDescriptorBuilder {
    field: FieldDescriptor,
}

impl fmt::Debug for FieldDescriptorBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldDescriptorBuilder")
            .field("field", &self.field)
            .finish()
    }
}

impl FieldDescriptorBuilder {
    /// Creates a builder for a writable, uncategorized field.
    #[must_use]
    pub fn new(name: impl Into<String>, property_type: TypeKey) -> Self {
        Self {
            field: FieldDescriptor {
                name: name.into(),
                display_name: None,
                category: None,
                description: String::new(),
                property_type,
                component_type: TypeKey::OBJECT,
                attributes: PropertyAttributes::empty(),
                read_only: false,
                has_setter: true,
                default_value: None,
                converter: None,
                edit_style: EditStyle::None,
                getter: None,
                setter: None,
            },
        }
    }

    /// Sets the name shown in the grid.
    #[must_use]
    pub fn display_name(mut self, display_name: impl Into<String>) -> Self {
        self.field.display_name = Some(display_name.into());
        self
    }

    /// Sets the category.
    #[must_use]
    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.field.category = Some(category.into());
        self
    }

    /// Sets the description.
    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.field.description = description.into();
        self
    }

    /// Adds declarative attributes.
    #[must_use]
    pub fn attributes(mut self, attributes: PropertyAttributes) -> Self {
        self.field.attributes |= attributes;
        self
    }

    /// Declares the field read-only.
    #[must_use]
    pub fn read_only(mut self, read_only: bool) -> Self {
        self.field.read_only = read_only;
        self
    }

    /// Removes the field's setter entirely.
    #[must_use]
    pub fn without_setter(mut self) -> Self {
        self.field.has_setter = false;
        self
    }

    /// Declares the default value used by reset and serialization checks.
    ///
    /// Objects that never stored the field read back this value.
    #[must_use]
    pub fn default_value(mut self, value: Value) -> Self {
        self.field.default_value = Some(value);
        self
    }

    /// Overrides the converter.
    #[must_use]
    pub fn converter(mut self, converter: ConverterRef) -> Self {
        self.field.converter = Some(converter);
        self
    }

    /// Sets the editor presentation.
    #[must_use]
    pub fn edit_style(mut self, edit_style: EditStyle) -> Self {
        self.field.edit_style = edit_style;
        self
    }

    /// Replaces the stored-value read with a custom getter.
    #[must_use]
    pub fn getter(
        mut self,
        getter: impl Fn(&DynamicObject) -> Result<Value, PropertyError> + 'static,
    ) -> Self {
        self.field.getter = Some(Rc::new(getter));
        self
    }

    /// Replaces the stored-value write with a custom setter.
    #[must_use]
    pub fn setter(
        mut self,
        setter: impl Fn(&DynamicObject, Value) -> Result<(), PropertyError> + 'static,
    ) -> Self {
        self.field.setter = Some(Rc::new(setter));
        self
    }

    fn build(mut self, component_type: TypeKey) -> FieldDescriptor {
        self.field.component_type = component_type;
        self.field
    }
}

/// A runtime-defined type: its key, its fields and its type-level traits.
pub struct ObjectType {
    type_key: TypeKey,
    fields: Vec<Rc<FieldDescriptor>>,
    read_only: bool,
    default_property: Option<String>,
    converter: Option<ConverterRef>,
    cloneable: bool,
    creatable: bool,
}

impl ObjectType {
    /// Starts building a type.
    #[must_use]
    pub fn builder(type_key: TypeKey) -> ObjectTypeBuilder {
        ObjectTypeBuilder::new(type_key)
    }

    /// Returns the type key.
    #[must_use]
    #[inline]
    pub fn type_key(&self) -> &TypeKey {
        &self.type_key
    }

    /// Returns the named field.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&Rc<FieldDescriptor>> {
        self.fields.iter().find(|field| field.name == name)
    }

    /// Returns the fields in declaration order, inherited fields first.
    #[must_use]
    #[inline]
    pub fn fields(&self) -> &[Rc<FieldDescriptor>] {
        &self.fields
    }
}

impl fmt::Debug for ObjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObjectType")
            .field("type_key", &self.type_key)
            .field("fields", &self.fields.len())
            .field("read_only", &self.read_only)
            .field("default_property", &self.default_property)
            .field("converter", &self.converter)
            .field("cloneable", &self.cloneable)
            .field("creatable", &self.creatable)
            .finish()
    }
}

/// Builder for [`ObjectType`].
#[derive(Debug)]
pub struct ObjectTypeBuilder {
    type_key: TypeKey,
    inherited: Vec<Rc<FieldDescriptor>>,
    fields: Vec<FieldDescriptorBuilder>,
    read_only: bool,
    default_property: Option<String>,
    converter: Option<ConverterRef>,
    cloneable: bool,
    creatable: bool,
}

impl ObjectTypeBuilder {
    /// Creates a builder for a writable, non-cloneable, creatable type.
    #[must_use]
    pub fn new(type_key: TypeKey) -> Self {
        Self {
            type_key,
            inherited: Vec::new(),
            fields: Vec::new(),
            read_only: false,
            default_property: None,
            converter: None,
            cloneable: false,
            creatable: true,
        }
    }

    /// Inherits every field of `base`.
    ///
    /// Inherited fields keep `base` as their component type, so instances of
    /// sibling types that share a base merge on those fields.
    #[must_use]
    pub fn inherit(mut self, base: &ObjectType) -> Self {
        self.inherited.extend(base.fields.iter().cloned());
        if self.default_property.is_none() {
            self.default_property.clone_from(&base.default_property);
        }
        self
    }

    /// Appends a field.
    #[must_use]
    pub fn field(mut self, field: FieldDescriptorBuilder) -> Self {
        self.fields.push(field);
        self
    }

    /// Marks the whole type read-only.
    #[must_use]
    pub fn read_only(mut self, read_only: bool) -> Self {
        self.read_only = read_only;
        self
    }

    /// Names the property selected by default.
    #[must_use]
    pub fn default_property(mut self, name: impl Into<String>) -> Self {
        self.default_property = Some(name.into());
        self
    }

    /// Sets the converter used for values of this type.
    #[must_use]
    pub fn converter(mut self, converter: ConverterRef) -> Self {
        self.converter = Some(converter);
        self
    }

    /// Sets whether instances support [`Inspect::try_clone`].
    #[must_use]
    pub fn cloneable(mut self, cloneable: bool) -> Self {
        self.cloneable = cloneable;
        self
    }

    /// Sets whether blank instances can be created with [`Inspect::instantiate`].
    #[must_use]
    pub fn creatable(mut self, creatable: bool) -> Self {
        self.creatable = creatable;
        self
    }

    /// Builds the shared type.
    #[must_use]
    pub fn build(self) -> Rc<ObjectType> {
        let type_key = self.type_key;
        let mut fields = self.inherited;
        fields.extend(
            self.fields
                .into_iter()
                .map(|field| Rc::new(field.build(type_key.clone()))),
        );
        Rc::new(ObjectType {
            type_key,
            fields,
            read_only: self.read_only,
            default_property: self.default_property,
            converter: self.converter,
            cloneable: self.cloneable,
            creatable: self.creatable,
        })
    }
}

/// An instance of an [`ObjectType`] storing its field values by name.
pub struct DynamicObject {
    object_type: Rc<ObjectType>,
    name: Option<String>,
    values: RefCell<HashMap<String, Value>>,
}

impl DynamicObject {
    /// Creates an instance with every field at its default.
    #[must_use]
    pub fn new(object_type: &Rc<ObjectType>) -> Self {
        Self {
            object_type: object_type.clone(),
            name: None,
            values: RefCell::new(HashMap::new()),
        }
    }

    /// Sets the instance's display name.
    #[must_use]
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Stores an initial field value.
    #[must_use]
    pub fn with(self, field: impl Into<String>, value: Value) -> Self {
        self.values.borrow_mut().insert(field.into(), value);
        self
    }

    /// Wraps the instance as an object value.
    #[must_use]
    pub fn into_value(self) -> Value {
        Value::object(self)
    }

    /// Returns the instance's type.
    #[must_use]
    #[inline]
    pub fn object_type(&self) -> &Rc<ObjectType> {
        &self.object_type
    }

    /// Returns the stored value of `field`, falling back to its default, then to null.
    ///
    /// Custom getters are bypassed.
    #[must_use]
    pub fn get(&self, field: &str) -> Value {
        if let Some(value) = self.values.borrow().get(field) {
            return value.clone();
        }
        self.object_type
            .field(field)
            .and_then(|f| f.default_value.clone())
            .unwrap_or_default()
    }

    /// Stores `value` for `field`, bypassing custom setters.
    pub fn set(&self, field: &str, value: Value) {
        self.values.borrow_mut().insert(field.to_owned(), value);
    }
}

impl fmt::Debug for DynamicObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DynamicObject")
            .field("object_type", &self.object_type.type_key)
            .field("name", &self.name)
            .field("values", &self.values.borrow())
            .finish()
    }
}

impl Inspect for DynamicObject {
    fn type_key(&self) -> TypeKey {
        self.object_type.type_key.clone()
    }

    fn name(&self) -> Option<String> {
        self.name.clone()
    }

    fn properties(&self) -> Vec<DescriptorRef> {
        self.object_type
            .fields
            .iter()
            .map(|field| field.clone() as DescriptorRef)
            .collect()
    }

    fn default_property(&self) -> Option<String> {
        self.object_type.default_property.clone()
    }

    fn is_read_only(&self) -> bool {
        self.object_type.read_only
    }

    fn converter(&self) -> Option<ConverterRef> {
        self.object_type.converter.clone()
    }

    fn try_clone(&self) -> Option<ObjectRef> {
        if !self.object_type.cloneable {
            return None;
        }
        Some(Rc::new(Self {
            object_type: self.object_type.clone(),
            name: self.name.clone(),
            values: RefCell::new(self.values.borrow().clone()),
        }))
    }

    fn instantiate(&self) -> Option<ObjectRef> {
        self.object_type
            .creatable
            .then(|| Rc::new(Self::new(&self.object_type)) as ObjectRef)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
