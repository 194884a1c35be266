// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A property shared by several selected objects.

use std::cell::{OnceCell, RefCell};
use std::fmt;
use std::rc::Rc;

use smallvec::SmallVec;

use crate::converter::ConverterRef;
use crate::copy::copy_value;
use crate::descriptor::{DescriptorRef, EditStyle};
use crate::error::PropertyError;
use crate::merge::collection::MultiMergeCollection;
use crate::types::{PropertyAttributes, TypeKey};
use crate::value::{ListRef, Value};

/// The result of reading a merged property.
#[derive(Clone, Debug, PartialEq)]
pub struct MergedValue {
    /// The common value, or [`Value::Null`] when the objects disagree.
    pub value: Value,
    /// `true` when every object reported the same value.
    pub all_equal: bool,
}

/// The per-object descriptors of one property common to every selected object.
///
/// Member `i` belongs to owner `i`; every accessor takes the owners in
/// selection order. The members agree on name, property type and component
/// type.
pub struct MergedPropertyDescriptor {
    descriptors: SmallVec<[DescriptorRef; 4]>,
    read_only: OnceCell<bool>,
    localizable: OnceCell<bool>,
    collection: RefCell<Option<Rc<MultiMergeCollection>>>,
}

impl MergedPropertyDescriptor {
    pub(crate) fn new(descriptors: SmallVec<[DescriptorRef; 4]>) -> Self {
        debug_assert!(!descriptors.is_empty(), "a merged property needs members");
        Self {
            descriptors,
            read_only: OnceCell::new(),
            localizable: OnceCell::new(),
            collection: RefCell::new(None),
        }
    }

    fn first(&self) -> &DescriptorRef {
        &self.descriptors[0]
    }

    /// Returns the member descriptors in selection order.
    #[must_use]
    #[inline]
    pub fn descriptors(&self) -> &[DescriptorRef] {
        &self.descriptors
    }

    /// Returns the shared property name.
    #[must_use]
    pub fn name(&self) -> &str {
        self.first().name()
    }

    /// Returns the first member's display name.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.first().display_name()
    }

    /// Returns the first member's category.
    #[must_use]
    pub fn category(&self) -> &str {
        self.first().category()
    }

    /// Returns the first member's description.
    #[must_use]
    pub fn description(&self) -> &str {
        self.first().description()
    }

    /// Returns the shared property type.
    #[must_use]
    pub fn property_type(&self) -> &TypeKey {
        self.first().property_type()
    }

    /// Returns the shared component type.
    #[must_use]
    pub fn component_type(&self) -> &TypeKey {
        self.first().component_type()
    }

    /// Returns the attributes carried by every member.
    #[must_use]
    pub fn attributes(&self) -> PropertyAttributes {
        self.descriptors
            .iter()
            .fold(PropertyAttributes::all(), |acc, d| acc & d.attributes())
    }

    /// Returns the first member's converter.
    #[must_use]
    pub fn converter(&self) -> ConverterRef {
        self.first().converter()
    }

    /// Returns the first member's editor presentation.
    #[must_use]
    pub fn edit_style(&self) -> EditStyle {
        self.first().edit_style()
    }

    /// Returns `true` if any member is read-only. Computed once.
    #[must_use]
    pub fn is_read_only(&self) -> bool {
        *self
            .read_only
            .get_or_init(|| self.descriptors.iter().any(|d| d.is_read_only()))
    }

    /// Returns `true` if every member has a setter.
    #[must_use]
    pub fn has_setter(&self) -> bool {
        self.descriptors.iter().all(|d| d.has_setter())
    }

    /// Returns `true` if every member is localizable. Computed once.
    #[must_use]
    pub fn is_localizable(&self) -> bool {
        *self
            .localizable
            .get_or_init(|| self.descriptors.iter().all(|d| d.is_localizable()))
    }

    /// Returns the collection proxy, if the property has been read as a collection.
    #[must_use]
    pub fn collection(&self) -> Option<ListRef> {
        self.collection
            .borrow()
            .as_ref()
            .map(|proxy| proxy.items().clone())
    }

    /// Returns the collection proxy, creating it on first use.
    ///
    /// The proxy is cloned out so no borrow of the slot is held while owners
    /// are read or written.
    fn proxy(&self) -> Rc<MultiMergeCollection> {
        self.collection
            .borrow_mut()
            .get_or_insert_with(|| Rc::new(MultiMergeCollection::new(self.element_type(), Vec::new())))
            .clone()
    }

    fn check_owners(&self, owners: &[Value]) -> Result<(), PropertyError> {
        if owners.len() == self.descriptors.len() {
            Ok(())
        } else {
            Err(PropertyError::OwnerMismatch {
                expected: self.descriptors.len(),
                found: owners.len(),
            })
        }
    }

    fn members<'a>(&'a self, owners: &'a [Value]) -> impl Iterator<Item = (&'a DescriptorRef, &'a Value)> {
        self.descriptors.iter().zip(owners)
    }

    /// Reads the property from every owner.
    ///
    /// Divergent values read as [`Value::Null`] with `all_equal` cleared.
    /// Collection properties compare element-wise and read as the shared
    /// [`MultiMergeCollection`] proxy.
    pub fn get_value(&self, owners: &[Value]) -> Result<MergedValue, PropertyError> {
        self.check_owners(owners)?;
        if self.property_type().is_collection() {
            return self.get_collection_value(owners);
        }
        let mut members = self.members(owners);
        let Some((descriptor, owner)) = members.next() else {
            return Ok(MergedValue {
                value: Value::Null,
                all_equal: true,
            });
        };
        let first = descriptor.get_value(owner)?;
        for (descriptor, owner) in members {
            if descriptor.get_value(owner)? != first {
                return Ok(MergedValue {
                    value: Value::Null,
                    all_equal: false,
                });
            }
        }
        Ok(MergedValue {
            value: first,
            all_equal: true,
        })
    }

    fn get_collection_value(&self, owners: &[Value]) -> Result<MergedValue, PropertyError> {
        let existing = self.collection.borrow().clone();
        if let Some(proxy) = existing {
            if proxy.is_locked() {
                return Ok(MergedValue {
                    value: Value::List(proxy.items().clone()),
                    all_equal: true,
                });
            }
        }

        let mut snapshots = Vec::with_capacity(owners.len());
        for (descriptor, owner) in self.members(owners) {
            snapshots.push(match descriptor.get_value(owner)? {
                Value::List(list) => Some(list.snapshot()),
                _ => None,
            });
        }
        let first = snapshots.first().cloned().flatten();
        if snapshots.iter().skip(1).any(|snapshot| *snapshot != first) {
            return Ok(MergedValue {
                value: Value::Null,
                all_equal: false,
            });
        }
        let Some(items) = first else {
            return Ok(MergedValue {
                value: Value::Null,
                all_equal: true,
            });
        };

        let proxy = self.proxy();
        proxy.refresh(items);
        Ok(MergedValue {
            value: Value::List(proxy.items().clone()),
            all_equal: true,
        })
    }

    fn element_type(&self) -> TypeKey {
        self.property_type()
            .element_type()
            .cloned()
            .unwrap_or(TypeKey::OBJECT)
    }

    /// Writes `value` to every owner.
    ///
    /// Each owner receives its own copy. A list written to a collection
    /// property is instead copied item by item into each owner's existing
    /// collection.
    pub fn set_value(&self, owners: &[Value], value: &Value) -> Result<(), PropertyError> {
        self.check_owners(owners)?;
        if let (true, Value::List(list)) = (self.property_type().is_collection(), value) {
            return self.set_collection_values(owners, list);
        }
        for (descriptor, owner) in self.members(owners) {
            descriptor.set_value(owner, copy_value(value))?;
        }
        Ok(())
    }

    fn set_collection_values(&self, owners: &[Value], list: &ListRef) -> Result<(), PropertyError> {
        let items = list.snapshot();
        let proxy = self.proxy();
        let _guard = proxy.lock();
        for (descriptor, owner) in self.members(owners) {
            match descriptor.get_value(owner)? {
                Value::List(target) if !target.ptr_eq(proxy.items()) => {
                    target.clear();
                    for item in &items {
                        target.push(item.clone());
                    }
                }
                _ => {
                    let fresh = ListRef::new(self.element_type(), items.clone());
                    descriptor.set_value(owner, Value::List(fresh))?;
                }
            }
        }
        if !list.ptr_eq(proxy.items()) {
            proxy.items().replace_all(items);
        }
        Ok(())
    }

    /// Returns `true` if every member can be reset on its owner.
    pub fn can_reset_value(&self, owners: &[Value]) -> bool {
        self.check_owners(owners).is_ok()
            && self
                .members(owners)
                .all(|(descriptor, owner)| descriptor.can_reset_value(owner))
    }

    /// Resets every member on its owner.
    pub fn reset_value(&self, owners: &[Value]) -> Result<(), PropertyError> {
        self.check_owners(owners)?;
        for (descriptor, owner) in self.members(owners) {
            descriptor.reset_value(owner)?;
        }
        Ok(())
    }

    /// Returns `true` if any member differs from its default.
    pub fn should_serialize_value(&self, owners: &[Value]) -> bool {
        self.check_owners(owners).is_ok()
            && self
                .members(owners)
                .any(|(descriptor, owner)| descriptor.should_serialize_value(owner))
    }
}

impl fmt::Debug for MergedPropertyDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MergedPropertyDescriptor")
            .field("name", &self.name())
            .field("property_type", self.property_type())
            .field("members", &self.descriptors.len())
            .field("read_only", &self.read_only.get())
            .field("localizable", &self.localizable.get())
            .field("collection", &self.collection.borrow())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;
    use crate::dynamic::{DynamicObject, FieldDescriptor, ObjectType};

    fn shape() -> Rc<ObjectType> {
        ObjectType::builder(TypeKey::named("Shape"))
            .field(FieldDescriptor::builder("Fill", TypeKey::TEXT).default_value("white".into()))
            .field(
                FieldDescriptor::builder("Tags", TypeKey::collection_of(TypeKey::TEXT))
                    .without_setter(),
            )
            .field(FieldDescriptor::builder("Locked", TypeKey::BOOL).read_only(true))
            .build()
    }

    fn merged(ty: &Rc<ObjectType>, name: &str, count: usize) -> MergedPropertyDescriptor {
        let field = ty.field(name).cloned().unwrap();
        MergedPropertyDescriptor::new((0..count).map(|_| field.clone() as DescriptorRef).collect())
    }

    fn tags(items: &[&str]) -> Value {
        Value::list(TypeKey::TEXT, items.iter().map(|s| Value::from(*s)).collect())
    }

    #[test]
    fn equal_values_merge() {
        let ty = shape();
        let owners = [
            DynamicObject::new(&ty).with("Fill", "red".into()).into_value(),
            DynamicObject::new(&ty).with("Fill", "red".into()).into_value(),
        ];
        let fill = merged(&ty, "Fill", 2);
        let read = fill.get_value(&owners).unwrap();
        assert!(read.all_equal);
        assert_eq!(read.value, Value::from("red"));
        assert!(fill.should_serialize_value(&owners));
        assert!(fill.can_reset_value(&owners));
    }

    #[test]
    fn divergent_values_read_as_null() {
        let ty = shape();
        let owners = [
            DynamicObject::new(&ty).with("Fill", "red".into()).into_value(),
            DynamicObject::new(&ty).into_value(),
        ];
        let fill = merged(&ty, "Fill", 2);
        let read = fill.get_value(&owners).unwrap();
        assert!(!read.all_equal);
        assert_eq!(read.value, Value::Null);
        assert!(fill.should_serialize_value(&owners));
        assert!(!fill.can_reset_value(&owners));
    }

    #[test]
    fn owner_count_must_match() {
        let ty = shape();
        let fill = merged(&ty, "Fill", 2);
        let owners = [DynamicObject::new(&ty).into_value()];
        assert!(matches!(
            fill.get_value(&owners),
            Err(PropertyError::OwnerMismatch { expected: 2, found: 1 })
        ));
    }

    #[test]
    fn read_only_is_any_member() {
        let ty = shape();
        assert!(merged(&ty, "Locked", 3).is_read_only());
        assert!(!merged(&ty, "Fill", 3).is_read_only());
        assert!(!merged(&ty, "Tags", 2).has_setter());
    }

    #[test]
    fn collections_compare_element_wise_and_share_a_proxy() {
        let ty = shape();
        let owners = [
            DynamicObject::new(&ty).with("Tags", tags(&["a", "b"])).into_value(),
            DynamicObject::new(&ty).with("Tags", tags(&["a", "b"])).into_value(),
        ];
        let property = merged(&ty, "Tags", 2);
        let first = property.get_value(&owners).unwrap();
        assert!(first.all_equal);
        let second = property.get_value(&owners).unwrap();
        assert!(first.value.aliases(&second.value));
        assert_eq!(property.collection().map(|l| l.len()), Some(2));

        owners[1]
            .as_object()
            .and_then(|o| o.as_any().downcast_ref::<DynamicObject>())
            .unwrap()
            .get("Tags")
            .as_list()
            .unwrap()
            .push("c".into());
        let diverged = property.get_value(&owners).unwrap();
        assert!(!diverged.all_equal);
        assert_eq!(diverged.value, Value::Null);
    }

    #[test]
    fn collection_writes_fan_out_to_each_owner() {
        let ty = shape();
        let own_a = tags(&["x"]);
        let own_b = tags(&[]);
        let owners = [
            DynamicObject::new(&ty).with("Tags", own_a.clone()).into_value(),
            DynamicObject::new(&ty).with("Tags", own_b.clone()).into_value(),
        ];
        let property = merged(&ty, "Tags", 2);
        let proxy = property.get_value(&owners).unwrap();
        assert!(!proxy.all_equal);

        property.set_value(&owners, &tags(&["p", "q"])).unwrap();
        assert_eq!(own_a, tags(&["p", "q"]));
        assert_eq!(own_b, tags(&["p", "q"]));
        assert!(!own_a.aliases(&own_b));

        let read = property.get_value(&owners).unwrap();
        assert!(read.all_equal);
        let Value::List(shared) = read.value else {
            panic!("expected the collection proxy");
        };
        shared.push("r".into());
        property.set_value(&owners, &Value::List(shared)).unwrap();
        assert_eq!(own_b, tags(&["p", "q", "r"]));
    }

    #[test]
    fn reads_during_a_collection_write_see_the_locked_proxy() {
        type Reentry = RefCell<Option<(Rc<MergedPropertyDescriptor>, Vec<Value>)>>;
        let reentry: Rc<Reentry> = Rc::default();
        let armed = Rc::new(Cell::new(false));
        let seen: Rc<RefCell<Vec<MergedValue>>> = Rc::default();
        let tagged = |items: Value| {
            let (reentry, armed, seen) = (reentry.clone(), armed.clone(), seen.clone());
            ObjectType::builder(TypeKey::named("Shape"))
                .field(
                    FieldDescriptor::builder("Tags", TypeKey::collection_of(TypeKey::TEXT))
                        .without_setter()
                        .getter(move |_| {
                            if armed.replace(false) {
                                if let Some((property, owners)) = reentry.borrow().as_ref() {
                                    seen.borrow_mut().push(property.get_value(owners)?);
                                }
                            }
                            Ok(items.clone())
                        }),
                )
                .build()
        };
        let own_a = tags(&["a"]);
        let own_b = tags(&["b"]);
        let a = tagged(own_a.clone());
        let b = tagged(own_b.clone());
        let owners = vec![DynamicObject::new(&a).into_value(), DynamicObject::new(&b).into_value()];
        let members: SmallVec<[DescriptorRef; 4]> = [&a, &b]
            .into_iter()
            .map(|ty| ty.field("Tags").cloned().unwrap() as DescriptorRef)
            .collect();
        let property = Rc::new(MergedPropertyDescriptor::new(members));
        assert!(!property.get_value(&owners).unwrap().all_equal);

        *reentry.borrow_mut() = Some((property.clone(), owners.clone()));
        armed.set(true);
        property.set_value(&owners, &tags(&["p", "q"])).unwrap();

        let seen = seen.borrow();
        assert_eq!(seen.len(), 1, "the getter re-entered once");
        assert!(seen[0].all_equal, "a locked proxy is not checked for divergence");
        let proxy = property.collection().unwrap();
        assert!(seen[0].value.aliases(&Value::List(proxy)));
        assert_eq!(own_a, tags(&["p", "q"]));
        assert_eq!(own_b, tags(&["p", "q"]));
        reentry.borrow_mut().take();
    }

    #[test]
    fn scalar_writes_reach_every_owner() {
        let ty = shape();
        let owners = [
            DynamicObject::new(&ty).into_value(),
            DynamicObject::new(&ty).into_value(),
        ];
        let fill = merged(&ty, "Fill", 2);
        fill.set_value(&owners, &"blue".into()).unwrap();
        let read = fill.get_value(&owners).unwrap();
        assert_eq!(read.value, Value::from("blue"));
        fill.reset_value(&owners).unwrap();
        assert_eq!(fill.get_value(&owners).unwrap().value, Value::from("white"));
    }
}
