// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Independent copies of values for multi-object writes.
//!
//! Scalars and records copy by value and lists copy element-wise. Objects try,
//! in order: the object's own clone, reconstruction from the converter's
//! instance descriptor, a string round-trip through the converter, and a
//! blank instance with every writable property copied. When all of these
//! fail the reference is shared.

use std::rc::Rc;

use hashbrown::HashMap;

use crate::value::{ListRef, ObjectRef, Value};

/// Returns a copy of `value` that shares no mutable state with it, where possible.
#[must_use]
pub fn copy_value(value: &Value) -> Value {
    Copier::default().copy(value)
}

#[derive(Default)]
struct Copier {
    // Original object address to its copy, so shared and cyclic graphs keep their shape.
    copies: HashMap<*const (), Value>,
}

impl Copier {
    fn copy(&mut self, value: &Value) -> Value {
        match value {
            Value::List(list) => Value::List(ListRef::new(
                list.element_type().clone(),
                list.snapshot().iter().map(|item| self.copy(item)).collect(),
            )),
            Value::Object(object) => self.copy_object(object),
            _ => value.clone(),
        }
    }

    fn copy_object(&mut self, object: &ObjectRef) -> Value {
        let key = Rc::as_ptr(object).cast::<()>();
        if let Some(copy) = self.copies.get(&key) {
            return copy.clone();
        }
        let copy = self.fresh_copy(object);
        self.copies.insert(key, copy.clone());
        copy
    }

    fn fresh_copy(&mut self, object: &ObjectRef) -> Value {
        let type_key = object.type_key();
        let original = Value::Object(object.clone());

        if let Some(copy) = object.try_clone() {
            tracing::trace!(type_key = %type_key, strategy = "clone", "copied value");
            return Value::Object(copy);
        }

        if let Some(converter) = object.converter() {
            if let Some(arguments) = converter.instance_descriptor(&original) {
                match converter.create_instance(&type_key, &arguments) {
                    Ok(copy) if is_fresh(&copy, object) => {
                        tracing::trace!(type_key = %type_key, strategy = "instance descriptor", "copied value");
                        return copy;
                    }
                    _ => {}
                }
            }
            if converter.can_convert_from_string() {
                let round_trip = converter
                    .convert_to_string(&original)
                    .and_then(|text| converter.convert_from_string(&type_key, &text));
                if let Ok(copy) = round_trip {
                    if is_fresh(&copy, object) {
                        tracing::trace!(type_key = %type_key, strategy = "string", "copied value");
                        return copy;
                    }
                }
            }
        }

        if let Some(blank) = object.instantiate() {
            let copy = Value::Object(blank);
            // Register before recursing so cycles resolve to the new instance.
            self.copies
                .insert(Rc::as_ptr(object).cast::<()>(), copy.clone());
            if self.copy_properties(&original, &copy) {
                tracing::trace!(type_key = %type_key, strategy = "introspection", "copied value");
                return copy;
            }
        }

        tracing::trace!(type_key = %type_key, strategy = "shared", "value could not be copied");
        original
    }

    fn copy_properties(&mut self, from: &Value, to: &Value) -> bool {
        let Some(object) = from.as_object() else {
            return false;
        };
        for property in object.properties() {
            if !property.has_setter() || property.is_read_only() {
                continue;
            }
            let Ok(value) = property.get_value(from) else {
                return false;
            };
            let value = self.copy(&value);
            if property.set_value(to, value).is_err() {
                return false;
            }
        }
        true
    }
}

fn is_fresh(copy: &Value, original: &ObjectRef) -> bool {
    match copy {
        Value::Null => false,
        Value::Object(object) => !Rc::ptr_eq(object, original),
        _ => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dynamic::{DynamicObject, FieldDescriptor, ObjectType};
    use crate::types::TypeKey;

    fn font_type(cloneable: bool, creatable: bool) -> Rc<ObjectType> {
        ObjectType::builder(TypeKey::named("Font"))
            .field(FieldDescriptor::builder("Family", TypeKey::TEXT))
            .field(FieldDescriptor::builder("Size", TypeKey::FLOAT))
            .field(FieldDescriptor::builder("Id", TypeKey::INT).without_setter())
            .cloneable(cloneable)
            .creatable(creatable)
            .build()
    }

    fn field(value: &Value, name: &str) -> Value {
        let object = value.as_object().unwrap();
        let property = object
            .properties()
            .into_iter()
            .find(|p| p.name() == name)
            .unwrap();
        property.get_value(value).unwrap()
    }

    #[test]
    fn scalars_and_lists_copy_by_value() {
        assert_eq!(copy_value(&Value::Int(3)), Value::Int(3));
        let list = Value::list(TypeKey::INT, vec![Value::Int(1)]);
        let copy = copy_value(&list);
        assert_eq!(copy, list);
        assert!(!copy.aliases(&list));
    }

    #[test]
    fn clone_capability_is_preferred() {
        let ty = font_type(true, false);
        let font = DynamicObject::new(&ty)
            .with("Family", "Serif".into())
            .into_value();
        let copy = copy_value(&font);
        assert!(!copy.aliases(&font));
        assert_eq!(field(&copy, "Family"), Value::from("Serif"));
    }

    #[test]
    fn introspection_copies_writable_properties() {
        let ty = font_type(false, true);
        let font = DynamicObject::new(&ty)
            .with("Family", "Mono".into())
            .with("Size", Value::Float(9.5))
            .with("Id", Value::Int(77))
            .into_value();
        let copy = copy_value(&font);
        assert!(!copy.aliases(&font));
        assert_eq!(field(&copy, "Family"), Value::from("Mono"));
        assert_eq!(field(&copy, "Size"), Value::Float(9.5));
        // Read-only state is not carried over.
        assert_eq!(field(&copy, "Id"), Value::Null);
    }

    #[test]
    fn uncopyable_objects_are_shared() {
        let ty = font_type(false, false);
        let font = DynamicObject::new(&ty).into_value();
        assert!(copy_value(&font).aliases(&font));
    }

    #[test]
    fn nested_objects_are_copied_once() {
        let ty = font_type(false, true);
        let holder = ObjectType::builder(TypeKey::named("Holder"))
            .field(FieldDescriptor::builder("A", TypeKey::named("Font")))
            .field(FieldDescriptor::builder("B", TypeKey::named("Font")))
            .build();
        let shared = DynamicObject::new(&ty).into_value();
        let outer = DynamicObject::new(&holder)
            .with("A", shared.clone())
            .with("B", shared.clone())
            .into_value();

        let copy = copy_value(&outer);
        let a = field(&copy, "A");
        let b = field(&copy, "B");
        assert!(!a.aliases(&shared));
        assert!(a.aliases(&b));
    }
}
