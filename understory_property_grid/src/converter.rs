// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Type converters and the built-in converter set.
//!
//! A [`TypeConverter`] turns values into display text and back, and declares
//! what a value of its type can do in the grid: expand into sub-properties,
//! offer a list of standard values, or be constructed wholesale from a bag of
//! named values (immutable value semantics).
//!
//! [`converter_for`] picks a built-in converter from a [`TypeKey`]:
//!
//! | Type | Converter |
//! |---|---|
//! | scalar (`Boolean`, `Int64`, `Double`, `String`) | [`DefaultConverter`] |
//! | `T[]` | [`ArrayConverter`] |
//! | `Collection<T>` | [`CollectionConverter`] |
//! | any other named type | [`ExpandableConverter`] |

use std::fmt;
use std::rc::Rc;

use crate::descriptor::{DescriptorRef, PropertyBag, RecordFieldDescriptor};
use crate::error::PropertyError;
use crate::types::TypeKey;
use crate::value::{Record, Value};

/// A shared type converter.
pub type ConverterRef = Rc<dyn TypeConverter>;

/// Converts values of one type to and from text, and describes their shape.
pub trait TypeConverter: fmt::Debug {
    /// Renders `value` as display text.
    fn convert_to_string(&self, value: &Value) -> Result<String, PropertyError> {
        Ok(value.to_string())
    }

    /// Returns `true` if [`convert_from_string`](Self::convert_from_string) is supported.
    fn can_convert_from_string(&self) -> bool {
        false
    }

    /// Parses `text` as a value of `target`.
    fn convert_from_string(&self, target: &TypeKey, text: &str) -> Result<Value, PropertyError> {
        Err(PropertyError::Conversion {
            text: text.into(),
            target: target.clone(),
        })
    }

    /// Returns `true` if the type offers a list of standard values.
    fn standard_values_supported(&self) -> bool {
        false
    }

    /// Returns the standard values, in display order.
    fn standard_values(&self) -> Vec<Value> {
        Vec::new()
    }

    /// Returns `true` if only the standard values are valid.
    fn standard_values_exclusive(&self) -> bool {
        false
    }

    /// Returns `true` if values of the type expand into sub-properties.
    fn properties_supported(&self) -> bool {
        false
    }

    /// Returns the sub-properties of `value`.
    fn properties(&self, _value: &Value) -> Result<Vec<DescriptorRef>, PropertyError> {
        Ok(Vec::new())
    }

    /// Returns `true` if values are rebuilt through [`create_instance`](Self::create_instance)
    /// rather than mutated in place.
    fn create_instance_supported(&self) -> bool {
        false
    }

    /// Builds a new value of `target` from named property values.
    ///
    /// Returning `Ok(Value::Null)` means the converter declined.
    fn create_instance(&self, _target: &TypeKey, _bag: &PropertyBag) -> Result<Value, PropertyError> {
        Ok(Value::Null)
    }

    /// Returns the arguments that would reconstruct `value`, if known.
    fn instance_descriptor(&self, _value: &Value) -> Option<PropertyBag> {
        None
    }
}

/// Returns the built-in converter for values of `ty`.
#[must_use]
pub fn converter_for(ty: &TypeKey) -> ConverterRef {
    match ty {
        TypeKey::Array(_) => Rc::new(ArrayConverter),
        TypeKey::Collection(_) => Rc::new(CollectionConverter),
        _ if is_scalar(ty) => Rc::new(DefaultConverter),
        TypeKey::Named(_) => Rc::new(ExpandableConverter),
    }
}

fn is_scalar(ty: &TypeKey) -> bool {
    *ty == TypeKey::BOOL || *ty == TypeKey::INT || *ty == TypeKey::FLOAT || *ty == TypeKey::TEXT
}

/// Parses a scalar value of `target`.
pub(crate) fn parse_scalar(target: &TypeKey, text: &str) -> Result<Value, PropertyError> {
    let fail = || PropertyError::Conversion {
        text: text.into(),
        target: target.clone(),
    };
    let trimmed = text.trim();
    if *target == TypeKey::TEXT {
        Ok(Value::Text(text.into()))
    } else if *target == TypeKey::BOOL {
        if trimmed.eq_ignore_ascii_case("true") {
            Ok(Value::Bool(true))
        } else if trimmed.eq_ignore_ascii_case("false") {
            Ok(Value::Bool(false))
        } else {
            Err(fail())
        }
    } else if *target == TypeKey::INT {
        trimmed.parse().map(Value::Int).map_err(|_| fail())
    } else if *target == TypeKey::FLOAT {
        trimmed.parse().map(Value::Float).map_err(|_| fail())
    } else {
        Err(fail())
    }
}

/// Formats and parses scalars.
#[derive(Clone, Copy, Debug, Default)]
pub struct DefaultConverter;

impl TypeConverter for DefaultConverter {
    fn can_convert_from_string(&self) -> bool {
        true
    }

    fn convert_from_string(&self, target: &TypeKey, text: &str) -> Result<Value, PropertyError> {
        parse_scalar(target, text)
    }
}

/// Exposes the properties of objects and the fields of records.
#[derive(Clone, Copy, Debug, Default)]
pub struct ExpandableConverter;

impl TypeConverter for ExpandableConverter {
    fn properties_supported(&self) -> bool {
        true
    }

    fn properties(&self, value: &Value) -> Result<Vec<DescriptorRef>, PropertyError> {
        Ok(match value {
            Value::Object(object) => object.properties(),
            Value::Record(record) => record_fields(record),
            _ => Vec::new(),
        })
    }
}

fn record_fields(record: &Record) -> Vec<DescriptorRef> {
    record
        .fields()
        .map(|(name, value)| {
            let ty = value.type_key().unwrap_or(TypeKey::OBJECT);
            Rc::new(RecordFieldDescriptor::new(name, ty, record.type_key().clone())) as DescriptorRef
        })
        .collect()
}

/// Renders arrays as `T[] Array`; array nodes expand into their elements.
#[derive(Clone, Copy, Debug, Default)]
pub struct ArrayConverter;

impl TypeConverter for ArrayConverter {
    fn properties_supported(&self) -> bool {
        true
    }
}

/// Renders collections as `(Collection)`; collections are edited as a whole.
#[derive(Clone, Copy, Debug, Default)]
pub struct CollectionConverter;

impl TypeConverter for CollectionConverter {
    fn convert_to_string(&self, value: &Value) -> Result<String, PropertyError> {
        Ok(if value.is_null() {
            String::new()
        } else {
            "(Collection)".into()
        })
    }
}

/// Converter for immutable record types.
///
/// Records render as their comma-separated field values, parse from the same
/// form, expand into their fields, and are rebuilt from a [`PropertyBag`]
/// whenever one field changes.
///
/// # Example
///
/// ```rust
/// use understory_property_grid::{RecordConverter, TypeConverter, TypeKey, Value};
///
/// let point = TypeKey::named("Point");
/// let converter = RecordConverter::new(point.clone())
///     .field("X", TypeKey::INT)
///     .field("Y", TypeKey::INT);
///
/// let value = converter.convert_from_string(&point, "3, 4").unwrap();
/// assert_eq!(converter.convert_to_string(&value).unwrap(), "3, 4");
/// assert!(converter.create_instance_supported());
/// ```
#[derive(Clone, Debug)]
pub struct RecordConverter {
    record_type: TypeKey,
    fields: Vec<(String, TypeKey)>,
}

impl RecordConverter {
    /// Creates a converter for `record_type` with no fields.
    #[must_use]
    pub fn new(record_type: TypeKey) -> Self {
        Self {
            record_type,
            fields: Vec::new(),
        }
    }

    /// Declares the next field.
    #[must_use]
    pub fn field(mut self, name: impl Into<String>, ty: TypeKey) -> Self {
        self.fields.push((name.into(), ty));
        self
    }

    /// Returns the record type this converter builds.
    #[must_use]
    pub fn record_type(&self) -> &TypeKey {
        &self.record_type
    }
}

impl TypeConverter for RecordConverter {
    fn can_convert_from_string(&self) -> bool {
        true
    }

    fn convert_from_string(&self, target: &TypeKey, text: &str) -> Result<Value, PropertyError> {
        let parts: Vec<&str> = text.split(',').collect();
        if parts.len() != self.fields.len() {
            return Err(PropertyError::Conversion {
                text: text.into(),
                target: target.clone(),
            });
        }
        let mut record = Record::new(self.record_type.clone());
        for ((name, ty), part) in self.fields.iter().zip(parts) {
            record = record.with(name.clone(), parse_scalar(ty, part.trim())?);
        }
        Ok(record.into())
    }

    fn properties_supported(&self) -> bool {
        true
    }

    fn properties(&self, value: &Value) -> Result<Vec<DescriptorRef>, PropertyError> {
        if value.as_record().is_none() {
            return Ok(Vec::new());
        }
        Ok(self
            .fields
            .iter()
            .map(|(name, ty)| {
                Rc::new(RecordFieldDescriptor::new(
                    name.clone(),
                    ty.clone(),
                    self.record_type.clone(),
                )) as DescriptorRef
            })
            .collect())
    }

    fn create_instance_supported(&self) -> bool {
        true
    }

    fn create_instance(&self, target: &TypeKey, bag: &PropertyBag) -> Result<Value, PropertyError> {
        let mut record = Record::new(target.clone());
        for (name, _) in &self.fields {
            let value = bag.get(name).cloned().ok_or_else(|| {
                PropertyError::failed(format!("missing value for `{name}` of {target}"))
            })?;
            record = record.with(name.clone(), value);
        }
        Ok(record.into())
    }

    fn instance_descriptor(&self, value: &Value) -> Option<PropertyBag> {
        value.as_record().map(PropertyBag::from)
    }
}

/// Offers a fixed list of standard values in a drop-down.
///
/// # Example
///
/// ```rust
/// use understory_property_grid::{StandardValuesConverter, TypeConverter, TypeKey, Value};
///
/// let converter = StandardValuesConverter::new(vec!["Left".into(), "Right".into()])
///     .exclusive(true);
/// assert!(converter.standard_values_supported());
/// assert!(converter.convert_from_string(&TypeKey::TEXT, "Left").is_ok());
/// assert!(converter.convert_from_string(&TypeKey::TEXT, "Up").is_err());
/// ```
#[derive(Clone, Debug)]
pub struct StandardValuesConverter {
    values: Vec<Value>,
    exclusive: bool,
}

impl StandardValuesConverter {
    /// Creates a converter offering `values`.
    #[must_use]
    pub fn new(values: Vec<Value>) -> Self {
        Self {
            values,
            exclusive: false,
        }
    }

    /// Sets whether values outside the list are rejected.
    #[must_use]
    pub fn exclusive(mut self, exclusive: bool) -> Self {
        self.exclusive = exclusive;
        self
    }
}

impl TypeConverter for StandardValuesConverter {
    fn can_convert_from_string(&self) -> bool {
        true
    }

    fn convert_from_string(&self, target: &TypeKey, text: &str) -> Result<Value, PropertyError> {
        if let Some(value) = self.values.iter().find(|v| v.to_string() == text) {
            return Ok(value.clone());
        }
        if self.exclusive {
            return Err(PropertyError::Conversion {
                text: text.into(),
                target: target.clone(),
            });
        }
        parse_scalar(target, text)
    }

    fn standard_values_supported(&self) -> bool {
        true
    }

    fn standard_values(&self) -> Vec<Value> {
        self.values.clone()
    }

    fn standard_values_exclusive(&self) -> bool {
        self.exclusive
    }
}
