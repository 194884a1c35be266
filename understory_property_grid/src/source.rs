// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Property sources ("property tabs").

use std::fmt;
use std::rc::Rc;

use crate::converter::TypeConverter;
use crate::descriptor::DescriptorRef;
use crate::error::PropertyError;
use crate::types::AttributeFilter;
use crate::value::Value;

/// A shared property source.
pub type PropertySourceRef = Rc<dyn PropertySource>;

/// Supplies the descriptors shown for a value.
///
/// Implementations return properties in declaration order, already filtered;
/// the tree applies sorting and categorization itself.
pub trait PropertySource: fmt::Debug {
    /// Returns the properties of `value` passing `filter`.
    ///
    /// `converter` is the converter of the node being expanded, when it has one.
    fn properties(
        &self,
        value: &Value,
        converter: Option<&dyn TypeConverter>,
        filter: &AttributeFilter,
    ) -> Result<Vec<DescriptorRef>, PropertyError>;
}

/// The default source: the converter's sub-properties when it exposes them,
/// otherwise the object's own reflected properties.
#[derive(Clone, Copy, Debug, Default)]
pub struct ReflectedProperties;

impl PropertySource for ReflectedProperties {
    fn properties(
        &self,
        value: &Value,
        converter: Option<&dyn TypeConverter>,
        filter: &AttributeFilter,
    ) -> Result<Vec<DescriptorRef>, PropertyError> {
        let all = match converter {
            Some(converter) if converter.properties_supported() => converter.properties(value)?,
            _ => match value {
                Value::Object(object) => object.properties(),
                _ => Vec::new(),
            },
        };
        Ok(all
            .into_iter()
            .filter(|descriptor| filter.matches(descriptor.attributes()))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::converter::{DefaultConverter, ExpandableConverter};
    use crate::dynamic::{DynamicObject, FieldDescriptor, ObjectType};
    use crate::types::{PropertyAttributes, TypeKey};

    fn names(props: &[DescriptorRef]) -> Vec<&str> {
        props.iter().map(|p| p.name()).collect()
    }

    #[test]
    fn hidden_properties_are_filtered() {
        let ty = ObjectType::builder(TypeKey::named("Panel"))
            .field(FieldDescriptor::builder("Visible", TypeKey::BOOL))
            .field(FieldDescriptor::builder("Handle", TypeKey::INT).attributes(PropertyAttributes::HIDDEN))
            .field(FieldDescriptor::builder("Dock", TypeKey::TEXT))
            .build();
        let panel = DynamicObject::new(&ty).into_value();

        let props = ReflectedProperties
            .properties(&panel, None, &AttributeFilter::default())
            .unwrap();
        assert_eq!(names(&props), ["Visible", "Dock"]);

        let props = ReflectedProperties
            .properties(&panel, Some(&ExpandableConverter), &AttributeFilter::all())
            .unwrap();
        assert_eq!(names(&props), ["Visible", "Handle", "Dock"]);
    }

    #[test]
    fn scalars_have_no_properties() {
        let props = ReflectedProperties
            .properties(&Value::Int(3), Some(&DefaultConverter), &AttributeFilter::default())
            .unwrap();
        assert!(props.is_empty());
    }
}
