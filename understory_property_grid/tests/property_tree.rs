// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tests for the `understory_property_grid` crate.
//!
//! These build property trees over `DynamicObject`s and check ordering,
//! merging, categorization, fail-soft reads, write propagation and the
//! derived node queries.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use understory_property_grid::{
    ChangeVeto, DescriptorRef, DynamicObject, EditStyle, EntryKind, FieldDescriptor, GridOptions,
    ListRef, NodeId, ObjectType, PropertyAttributes, PropertyBag, PropertyError, PropertySort,
    PropertyTree, Record, RecordConverter, SetOutcome, StandardValuesConverter, TreeHost,
    TypeConverter, TypeKey, Value,
};

fn flat() -> GridOptions {
    GridOptions::builder().sort(PropertySort::ALPHABETICAL).build()
}

fn unsorted() -> GridOptions {
    GridOptions::builder().sort(PropertySort::empty()).build()
}

fn labels(tree: &PropertyTree, id: NodeId) -> Vec<String> {
    tree.children(id).iter().map(|&child| tree.label(child)).collect()
}

fn field(object: &Value, name: &str) -> Value {
    object
        .as_object()
        .and_then(|object| object.as_any().downcast_ref::<DynamicObject>())
        .map(|object| object.get(name))
        .expect("value should be a DynamicObject")
}

fn store(object: &Value, name: &str, value: Value) {
    object
        .as_object()
        .and_then(|object| object.as_any().downcast_ref::<DynamicObject>())
        .expect("value should be a DynamicObject")
        .set(name, value);
}

fn button() -> Rc<ObjectType> {
    ObjectType::builder(TypeKey::new("Button"))
        .field(FieldDescriptor::builder("Zeta", TypeKey::INT).category("Layout"))
        .field(FieldDescriptor::builder("Alpha", TypeKey::TEXT).category("Appearance"))
        .field(FieldDescriptor::builder("Secret", TypeKey::TEXT).attributes(PropertyAttributes::HIDDEN))
        .field(FieldDescriptor::builder("Mid", TypeKey::BOOL).category("Behavior"))
        .build()
}

#[test]
fn single_object_lists_browsable_properties_in_requested_order() {
    let object = DynamicObject::new(&button()).into_value();

    let tree = PropertyTree::new(vec![object.clone()], unsorted()).unwrap();
    assert_eq!(tree.kind(tree.root()), Some(EntryKind::SingleRoot));
    assert_eq!(labels(&tree, tree.root()), ["Zeta", "Alpha", "Mid"]);

    let tree = PropertyTree::new(vec![object], flat()).unwrap();
    assert_eq!(labels(&tree, tree.root()), ["Alpha", "Mid", "Zeta"]);
    assert!(tree.find_child(tree.root(), "Secret").is_none(), "hidden properties are filtered");
}

#[test]
fn disjoint_selection_has_no_children_and_is_not_expandable() {
    let left = ObjectType::builder(TypeKey::new("Shape"))
        .field(FieldDescriptor::builder("Radius", TypeKey::FLOAT))
        .build();
    let right = ObjectType::builder(TypeKey::new("Shape"))
        .field(FieldDescriptor::builder("Side", TypeKey::FLOAT))
        .build();
    let mut tree = PropertyTree::new(
        vec![DynamicObject::new(&left).into_value(), DynamicObject::new(&right).into_value()],
        GridOptions::default(),
    )
    .unwrap();

    let root = tree.root();
    assert_eq!(tree.kind(root), Some(EntryKind::MultiRoot));
    assert!(tree.children(root).is_empty());
    assert!(!tree.is_expandable(root));
    assert!(!tree.is_expanded(root), "a root without children is not expanded");
    assert_eq!(tree.visible_child_count(root), 0);
    assert!(!tree.expand(root));

    tree.recreate_children(root);
    assert!(!tree.is_expanded(root));
    assert!(!tree.is_expandable(root));
}

fn labelled() -> Rc<ObjectType> {
    ObjectType::builder(TypeKey::new("Label"))
        .field(FieldDescriptor::builder("Text", TypeKey::TEXT))
        .field(FieldDescriptor::builder("Width", TypeKey::INT))
        .field(FieldDescriptor::builder("Tag", TypeKey::TEXT).attributes(PropertyAttributes::NOT_MERGEABLE))
        .default_property("Text")
        .build()
}

#[test]
fn merged_values_report_agreement() {
    let ty = labelled();
    let a = DynamicObject::new(&ty).with("Text", "same".into()).with("Width", 1.into());
    let b = DynamicObject::new(&ty).with("Text", "same".into()).with("Width", 2.into());
    let tree = PropertyTree::new(vec![a.into_value(), b.into_value()], flat()).unwrap();
    let root = tree.root();

    let text = tree.find_child(root, "Text").unwrap();
    assert_eq!(tree.kind(text), Some(EntryKind::Merged));
    assert!(tree.all_values_equal(text));
    assert_eq!(tree.value(text).into_value(), Value::from("same"));

    let width = tree.find_child(root, "Width").unwrap();
    assert!(!tree.all_values_equal(width));
    assert_eq!(tree.value(width).into_value(), Value::Null);
    assert_eq!(tree.value_text(width), "");
}

#[test]
fn non_mergeable_properties_only_show_for_single_objects() {
    let ty = labelled();
    let single = PropertyTree::new(vec![DynamicObject::new(&ty).into_value()], flat()).unwrap();
    assert!(single.find_child(single.root(), "Tag").is_some());

    let multi = PropertyTree::new(
        vec![DynamicObject::new(&ty).into_value(), DynamicObject::new(&ty).into_value()],
        flat(),
    )
    .unwrap();
    assert!(multi.find_child(multi.root(), "Tag").is_none());
    assert_eq!(labels(&multi, multi.root()), ["Text", "Width"]);
}

#[test]
fn default_child_follows_the_declared_default_property() {
    let ty = labelled();
    let tree = PropertyTree::new(vec![DynamicObject::new(&ty).into_value()], flat()).unwrap();
    assert_eq!(tree.default_child(), tree.find_child(tree.root(), "Text"));
}

#[test]
fn parenthesized_properties_lead_merged_results() {
    let ty = ObjectType::builder(TypeKey::new("Form"))
        .field(FieldDescriptor::builder("Zed", TypeKey::INT))
        .field(FieldDescriptor::builder("Name", TypeKey::TEXT).attributes(PropertyAttributes::PARENTHESIZE))
        .field(FieldDescriptor::builder("About", TypeKey::TEXT).display_name("(About)"))
        .field(FieldDescriptor::builder("Alpha", TypeKey::INT))
        .build();
    let tree = PropertyTree::new(
        vec![DynamicObject::new(&ty).into_value(), DynamicObject::new(&ty).into_value()],
        flat(),
    )
    .unwrap();
    assert_eq!(labels(&tree, tree.root()), ["(About)", "(Name)", "Alpha", "Zed"]);
}

#[test]
fn merged_writes_give_each_object_its_own_instance() {
    let font = ObjectType::builder(TypeKey::new("Font"))
        .field(FieldDescriptor::builder("Family", TypeKey::TEXT))
        .field(FieldDescriptor::builder("Size", TypeKey::FLOAT))
        .build();
    let styled = ObjectType::builder(TypeKey::new("Styled"))
        .field(FieldDescriptor::builder("Font", TypeKey::new("Font")))
        .build();
    let a = DynamicObject::new(&styled).into_value();
    let b = DynamicObject::new(&styled).into_value();
    let mut tree = PropertyTree::new(vec![a.clone(), b.clone()], flat()).unwrap();

    let replacement = DynamicObject::new(&font)
        .with("Family", "Serif".into())
        .with("Size", 12.5.into())
        .into_value();
    let node = tree.find_child(tree.root(), "Font").unwrap();
    assert!(tree.set_value(node, replacement.clone()).unwrap().is_applied());

    let (font_a, font_b) = (field(&a, "Font"), field(&b, "Font"));
    assert!(font_a.as_object().is_some() && font_b.as_object().is_some());
    assert!(!font_a.aliases(&font_b), "objects must not share one instance");
    assert!(!font_a.aliases(&replacement));
    assert_eq!(field(&font_a, "Family"), Value::from("Serif"));
    assert_eq!(field(&font_b, "Size"), Value::Float(12.5));
}

fn control() -> Rc<ObjectType> {
    ObjectType::builder(TypeKey::new("Control"))
        .field(FieldDescriptor::builder("Enabled", TypeKey::BOOL).category("Behavior"))
        .field(FieldDescriptor::builder("TabStop", TypeKey::BOOL).category("Behavior"))
        .field(FieldDescriptor::builder("Color", TypeKey::TEXT).category("Appearance"))
        .build()
}

#[test]
fn categories_group_and_dissolve_with_the_sort_mode() {
    let object = DynamicObject::new(&control()).into_value();
    let mut tree = PropertyTree::new(vec![object], GridOptions::default()).unwrap();
    let root = tree.root();

    assert_eq!(labels(&tree, root), ["Appearance", "Behavior"]);
    let behavior = tree.children(root)[1];
    assert_eq!(tree.kind(behavior), Some(EntryKind::Category));
    assert_eq!(labels(&tree, behavior), ["Enabled", "TabStop"]);

    let enabled = tree.find_child(root, "Enabled").unwrap();
    assert_eq!(tree.parent(enabled), Some(behavior));
    assert_eq!(tree.depth(enabled), 0);
    assert_eq!(tree.full_label(enabled), "Enabled");

    tree.set_property_sort(PropertySort::ALPHABETICAL);
    assert_eq!(labels(&tree, root), ["Color", "Enabled", "TabStop"]);
    assert!(!tree.is_alive(behavior), "category nodes are dissolved");
    assert_eq!(tree.find_child(root, "Enabled"), Some(enabled), "leaves survive a sort change");
    assert_eq!(tree.parent(enabled), Some(root));

    tree.set_property_sort(PropertySort::default());
    assert_eq!(labels(&tree, root), ["Appearance", "Behavior"]);
    assert_eq!(tree.find_child(root, "Enabled"), Some(enabled));
}

#[test]
fn recreating_a_category_keeps_and_refreshes_its_properties() {
    let object = DynamicObject::new(&control()).with("Enabled", true.into()).into_value();
    let mut tree = PropertyTree::new(vec![object.clone()], GridOptions::default()).unwrap();
    let root = tree.root();
    let behavior = tree.children(root)[1];
    let enabled = tree.find_child(root, "Enabled").unwrap();
    assert_eq!(tree.value(enabled).into_value(), Value::Bool(true));

    store(&object, "Enabled", Value::Bool(false));
    tree.recreate_children(behavior);

    assert!(tree.is_alive(behavior));
    assert!(tree.is_expanded(behavior));
    assert_eq!(labels(&tree, behavior), ["Enabled", "TabStop"]);
    assert_eq!(tree.find_child(root, "Enabled"), Some(enabled));
    assert_eq!(tree.value(enabled).into_value(), Value::Bool(false));
    assert_eq!(tree.visible_child_count(root), 5);
}

#[test]
fn collapsed_categories_stay_collapsed_across_rebuilds() {
    let options = GridOptions::default();
    let mut first = PropertyTree::new(vec![DynamicObject::new(&control()).into_value()], options.clone())
        .unwrap();
    let behavior = first.children(first.root())[1];
    assert!(first.is_expanded(behavior));
    first.collapse(behavior);
    assert_eq!(first.visible_child_count(first.root()), 3);

    let second = PropertyTree::new(vec![DynamicObject::new(&control()).into_value()], options).unwrap();
    let root = second.root();
    let appearance = second.children(root)[0];
    let behavior = second.children(root)[1];
    assert!(second.is_expanded(appearance));
    assert!(!second.is_expanded(behavior));
    assert_eq!(second.visible_child_count(root), 3);
}

#[test]
fn throwing_getters_render_their_message() {
    let ty = ObjectType::builder(TypeKey::new("Sensor"))
        .field(FieldDescriptor::builder("Reading", TypeKey::FLOAT).getter(|_| {
            Err(PropertyError::wrapping(
                "getter failed",
                PropertyError::failed("sensor offline"),
            ))
        }))
        .field(FieldDescriptor::builder("Label", TypeKey::TEXT))
        .build();
    let object = DynamicObject::new(&ty).with("Label", "sensor".into()).into_value();
    let tree = PropertyTree::new(vec![object], flat()).unwrap();
    let root = tree.root();

    let reading = tree.find_child(root, "Reading").unwrap();
    assert!(tree.value(reading).is_fault());
    assert_eq!(tree.value_text(reading), "sensor offline");
    assert!(!tree.is_value_editable(reading));

    let label = tree.find_child(root, "Label").unwrap();
    assert_eq!(tree.value_text(label), "sensor");
}

#[test]
fn one_read_only_object_makes_the_selection_read_only() {
    let plain = ObjectType::builder(TypeKey::new("Item"))
        .field(FieldDescriptor::builder("Width", TypeKey::INT))
        .build();
    let locked = ObjectType::builder(TypeKey::new("Item"))
        .inherit(&plain)
        .read_only(true)
        .build();
    let objects = vec![
        DynamicObject::new(&plain).into_value(),
        DynamicObject::new(&locked).into_value(),
        DynamicObject::new(&plain).into_value(),
    ];
    let mut tree = PropertyTree::new(objects, flat()).unwrap();
    let root = tree.root();
    assert!(tree.state(root).unwrap().force_read_only);

    let width = tree.find_child(root, "Width").unwrap();
    assert!(tree.is_read_only(width));
    assert!(matches!(
        tree.set_value(width, Value::Int(3)),
        Err(PropertyError::ReadOnly(_))
    ));

    let single = PropertyTree::new(vec![DynamicObject::new(&plain).into_value()], flat()).unwrap();
    let width = single.find_child(single.root(), "Width").unwrap();
    assert!(!single.is_read_only(width));
}

fn point_converter() -> RecordConverter {
    RecordConverter::new(TypeKey::new("Point"))
        .field("X", TypeKey::INT)
        .field("Y", TypeKey::INT)
}

fn point(x: i64, y: i64) -> Value {
    Record::new(TypeKey::new("Point"))
        .with("X", Value::Int(x))
        .with("Y", Value::Int(y))
        .into()
}

#[test]
fn immutable_values_are_rebuilt_by_their_converter() {
    let shape = ObjectType::builder(TypeKey::new("Shape"))
        .field(FieldDescriptor::builder("Location", TypeKey::new("Point")).converter(Rc::new(point_converter())))
        .build();
    let object = DynamicObject::new(&shape).with("Location", point(1, 2)).into_value();
    let mut tree = PropertyTree::new(vec![object.clone()], flat()).unwrap();

    let location = tree.find_child(tree.root(), "Location").unwrap();
    assert_eq!(tree.value_text(location), "1, 2");
    assert!(tree.capabilities(location).immutable);
    assert!(tree.expand(location));
    assert_eq!(labels(&tree, location), ["X", "Y"]);

    let x = tree.find_child(location, "X").unwrap();
    assert_eq!(tree.kind(x), Some(EntryKind::ImmutableProperty));
    assert_eq!(tree.full_label(x), "Location.X");
    assert!(tree.set_value(x, Value::Int(5)).unwrap().is_applied());

    assert_eq!(field(&object, "Location"), point(5, 2));
    assert_eq!(tree.value_text(location), "5, 2");
    assert!(tree.is_alive(x), "sub-property nodes survive the rebuild");
    assert_eq!(tree.value(x).into_value(), Value::Int(5));

    tree.set_value_text(location, "7, 8").unwrap();
    assert_eq!(field(&object, "Location"), point(7, 8));
    assert!(tree.set_value_text(location, "7").is_err());
}

#[derive(Clone, Copy, Debug)]
enum Construct {
    Explained,
    Silent,
    Nothing,
}

/// A point converter whose construction always fails.
#[derive(Debug)]
struct BrokenPoint {
    inner: RecordConverter,
    outcome: Construct,
}

impl TypeConverter for BrokenPoint {
    fn convert_to_string(&self, value: &Value) -> Result<String, PropertyError> {
        self.inner.convert_to_string(value)
    }

    fn properties_supported(&self) -> bool {
        true
    }

    fn properties(&self, value: &Value) -> Result<Vec<DescriptorRef>, PropertyError> {
        self.inner.properties(value)
    }

    fn create_instance_supported(&self) -> bool {
        true
    }

    fn create_instance(&self, _target: &TypeKey, _bag: &PropertyBag) -> Result<Value, PropertyError> {
        match self.outcome {
            Construct::Explained => Err(PropertyError::failed("X must be even")),
            Construct::Silent => Err(PropertyError::failed("")),
            Construct::Nothing => Ok(Value::Null),
        }
    }
}

fn rebuild_x(outcome: Construct) -> (PropertyError, Value) {
    let converter = BrokenPoint {
        inner: point_converter(),
        outcome,
    };
    let shape = ObjectType::builder(TypeKey::new("Shape"))
        .field(FieldDescriptor::builder("Location", TypeKey::new("Point")).converter(Rc::new(converter)))
        .build();
    let object = DynamicObject::new(&shape).with("Location", point(1, 2)).into_value();
    let mut tree = PropertyTree::new(vec![object.clone()], flat()).unwrap();
    let location = tree.find_child(tree.root(), "Location").unwrap();
    assert!(tree.expand(location));
    let x = tree.find_child(location, "X").unwrap();
    assert_eq!(tree.kind(x), Some(EntryKind::ImmutableProperty));
    let error = tree.set_value(x, Value::Int(3)).unwrap_err();
    (error, field(&object, "Location"))
}

#[test]
fn construction_errors_with_a_message_pass_through() {
    let (error, location) = rebuild_x(Construct::Explained);
    assert!(matches!(error, PropertyError::Failed { .. }));
    assert_eq!(error.to_string(), "X must be even");
    assert_eq!(location, point(1, 2));
}

#[test]
fn silent_construction_errors_name_the_type() {
    let (error, location) = rebuild_x(Construct::Silent);
    let PropertyError::Construction { type_name, .. } = &error else {
        panic!("expected a construction error, got {error:?}");
    };
    assert_eq!(*type_name, TypeKey::new("Point"));
    assert_eq!(error.to_string(), "creating an instance of Point failed");
    assert_eq!(location, point(1, 2));
}

#[test]
fn converters_producing_nothing_report_the_type() {
    let (error, location) = rebuild_x(Construct::Nothing);
    assert!(matches!(
        &error,
        PropertyError::CreateInstance { type_name } if *type_name == TypeKey::new("Point")
    ));
    assert_eq!(error.to_string(), "could not create an instance of Point");
    assert_eq!(location, point(1, 2));
}

#[test]
fn array_elements_are_labelled_by_index_and_write_through_the_array() {
    let chart = ObjectType::builder(TypeKey::new("Chart"))
        .field(FieldDescriptor::builder("Series", TypeKey::array_of(TypeKey::INT)))
        .build();
    let series = Value::list(TypeKey::INT, vec![Value::Int(1), Value::Int(2), Value::Int(3)]);
    let object = DynamicObject::new(&chart).with("Series", series).into_value();
    let mut tree = PropertyTree::new(vec![object.clone()], flat()).unwrap();

    let node = tree.find_child(tree.root(), "Series").unwrap();
    assert!(tree.is_expandable(node));
    assert!(tree.expand(node));
    assert_eq!(labels(&tree, node), ["[0]", "[1]", "[2]"]);

    let second = tree.children(node)[1];
    assert_eq!(tree.kind(second), Some(EntryKind::ArrayElement));
    assert_eq!(tree.property_type(second), Some(TypeKey::INT));
    assert_eq!(tree.depth(second), 1);

    tree.set_value_text(second, "20").unwrap();
    let stored = field(&object, "Series");
    assert!(stored.as_list().unwrap().items_eq(&[Value::Int(1), Value::Int(20), Value::Int(3)]));
    assert_eq!(tree.value(second).into_value(), Value::Int(20));
}

#[test]
fn merged_collections_are_copied_into_each_owner() {
    let ty = ObjectType::builder(TypeKey::new("Menu"))
        .field(FieldDescriptor::builder("Items", TypeKey::collection_of(TypeKey::TEXT)))
        .build();
    let items_a = ListRef::new(TypeKey::TEXT, vec!["a".into()]);
    let items_b = ListRef::new(TypeKey::TEXT, vec!["b".into()]);
    let a = DynamicObject::new(&ty).with("Items", items_a.clone().into()).into_value();
    let b = DynamicObject::new(&ty).with("Items", items_b.clone().into()).into_value();
    let mut tree = PropertyTree::new(vec![a, b], flat()).unwrap();

    let items = tree.find_child(tree.root(), "Items").unwrap();
    assert!(!tree.all_values_equal(items));

    let replacement = Value::list(TypeKey::TEXT, vec!["x".into(), "y".into()]);
    tree.set_value(items, replacement).unwrap();
    let expected = [Value::from("x"), Value::from("y")];
    assert!(items_a.items_eq(&expected));
    assert!(items_b.items_eq(&expected));
    assert!(!items_a.ptr_eq(&items_b));

    assert!(tree.all_values_equal(items));
    assert_eq!(tree.value_text(items), "(Collection)");
}

fn bordered() -> (Rc<ObjectType>, Rc<ObjectType>) {
    let border = ObjectType::builder(TypeKey::new("Border"))
        .field(
            FieldDescriptor::builder("Thickness", TypeKey::INT)
                .attributes(PropertyAttributes::NOTIFY_PARENT),
        )
        .build();
    let panel = ObjectType::builder(TypeKey::new("Panel"))
        .field(FieldDescriptor::builder("Border", TypeKey::new("Border")))
        .build();
    (border, panel)
}

#[test]
fn merged_children_merge_per_object_values() {
    let (border, panel) = bordered();
    let a = DynamicObject::new(&panel)
        .with("Border", DynamicObject::new(&border).with("Thickness", 1.into()).into_value())
        .into_value();
    let b = DynamicObject::new(&panel)
        .with("Border", DynamicObject::new(&border).with("Thickness", 1.into()).into_value())
        .into_value();
    let mut tree = PropertyTree::new(vec![a.clone(), b.clone()], flat()).unwrap();

    let node = tree.find_child(tree.root(), "Border").unwrap();
    assert!(tree.expand(node));
    let thickness = tree.find_child(node, "Thickness").unwrap();
    assert_eq!(tree.kind(thickness), Some(EntryKind::Merged));
    assert_eq!(tree.value_text(thickness), "1");

    tree.set_value(thickness, Value::Int(4)).unwrap();
    assert_eq!(field(&field(&a, "Border"), "Thickness"), Value::Int(4));
    assert_eq!(field(&field(&b, "Border"), "Thickness"), Value::Int(4));
}

#[derive(Default)]
struct Recorder {
    veto: Cell<bool>,
    changed: RefCell<Vec<String>>,
    invalidated: Cell<usize>,
}

impl TreeHost for Recorder {
    fn component_changing(&self, _owner: &Value, descriptor: &DescriptorRef) -> Result<(), ChangeVeto> {
        if self.veto.get() {
            Err(ChangeVeto::because(format!("{} is locked", descriptor.name())))
        } else {
            Ok(())
        }
    }

    fn component_changed(&self, _owner: &Value, descriptor: &DescriptorRef, _old: &Value, _new: &Value) {
        self.changed.borrow_mut().push(descriptor.name().to_owned());
    }

    fn value_invalidated(&self, _node: NodeId) {
        self.invalidated.set(self.invalidated.get() + 1);
    }
}

#[test]
fn notify_parent_reports_the_owning_property() {
    let (border, panel) = bordered();
    let object = DynamicObject::new(&panel)
        .with("Border", DynamicObject::new(&border).into_value())
        .into_value();
    let mut tree = PropertyTree::new(vec![object], flat()).unwrap();
    let host = Rc::new(Recorder::default());
    tree.attach_host(&host);

    let node = tree.find_child(tree.root(), "Border").unwrap();
    tree.expand(node);
    let thickness = tree.find_child(node, "Thickness").unwrap();
    tree.set_value(thickness, Value::Int(2)).unwrap();

    assert_eq!(host.changed.borrow().as_slice(), ["Thickness", "Border"]);
    assert_eq!(host.invalidated.get(), 2);
}

#[test]
fn vetoed_writes_change_nothing() {
    let ty = labelled();
    let a = DynamicObject::new(&ty).with("Width", 1.into()).into_value();
    let b = DynamicObject::new(&ty).with("Width", 1.into()).into_value();
    let mut tree = PropertyTree::new(vec![a.clone(), b.clone()], flat()).unwrap();
    let host = Rc::new(Recorder::default());
    host.veto.set(true);
    tree.attach_host(&host);

    let width = tree.find_child(tree.root(), "Width").unwrap();
    assert_eq!(tree.set_value(width, Value::Int(9)).unwrap(), SetOutcome::Vetoed);
    assert_eq!(field(&a, "Width"), Value::Int(1));
    assert_eq!(field(&b, "Width"), Value::Int(1));
    assert!(host.changed.borrow().is_empty());

    tree.detach_host();
    assert_eq!(tree.set_value(width, Value::Int(9)).unwrap(), SetOutcome::Applied);
    assert_eq!(field(&b, "Width"), Value::Int(9));
}

/// Vetoes the second change it is asked about.
#[derive(Default)]
struct VetoSecond {
    asked: Cell<usize>,
    changed: Cell<usize>,
}

impl TreeHost for VetoSecond {
    fn component_changing(&self, _owner: &Value, _descriptor: &DescriptorRef) -> Result<(), ChangeVeto> {
        self.asked.set(self.asked.get() + 1);
        if self.asked.get() == 2 {
            Err(ChangeVeto::new())
        } else {
            Ok(())
        }
    }

    fn component_changed(&self, _owner: &Value, _descriptor: &DescriptorRef, _old: &Value, _new: &Value) {
        self.changed.set(self.changed.get() + 1);
    }
}

#[test]
fn a_veto_from_any_object_stops_a_merged_write() {
    let ty = labelled();
    let objects: Vec<Value> = (0..3)
        .map(|_| DynamicObject::new(&ty).with("Width", 1.into()).into_value())
        .collect();
    let mut tree = PropertyTree::new(objects.clone(), flat()).unwrap();
    let host = Rc::new(VetoSecond::default());
    tree.attach_host(&host);

    let width = tree.find_child(tree.root(), "Width").unwrap();
    assert_eq!(tree.set_value(width, Value::Int(9)).unwrap(), SetOutcome::Vetoed);
    assert_eq!(host.asked.get(), 2, "objects after the vetoing one are not asked");
    assert_eq!(host.changed.get(), 0);
    assert!(objects.iter().all(|object| field(object, "Width") == Value::Int(1)));
}

#[test]
fn setter_failures_propagate() {
    let ty = ObjectType::builder(TypeKey::new("Disk"))
        .field(
            FieldDescriptor::builder("Label", TypeKey::TEXT)
                .setter(|_, _| Err(PropertyError::failed("disk full"))),
        )
        .field(FieldDescriptor::builder("Serial", TypeKey::TEXT).without_setter())
        .build();
    let mut tree = PropertyTree::new(vec![DynamicObject::new(&ty).into_value()], flat()).unwrap();
    let root = tree.root();

    let label = tree.find_child(root, "Label").unwrap();
    let error = tree.set_value(label, Value::from("backup")).unwrap_err();
    assert_eq!(error.to_string(), "disk full");

    let serial = tree.find_child(root, "Serial").unwrap();
    assert!(tree.is_read_only(serial));
    assert!(tree.should_render_read_only(serial));
}

#[test]
fn refresh_picks_up_external_changes_and_keeps_expanded_nodes() {
    let (border, panel) = bordered();
    let object = DynamicObject::new(&panel)
        .with("Border", DynamicObject::new(&border).with("Thickness", 1.into()).into_value())
        .into_value();
    let mut tree = PropertyTree::new(vec![object.clone()], flat()).unwrap();
    let root = tree.root();
    let node = tree.find_child(root, "Border").unwrap();
    tree.expand(node);
    let thickness = tree.find_child(node, "Thickness").unwrap();
    assert_eq!(tree.value_text(thickness), "1");

    store(&field(&object, "Border"), "Thickness", Value::Int(2));
    assert_eq!(tree.value_text(thickness), "1", "values are cached until refreshed");
    tree.refresh(root);
    assert_eq!(tree.value_text(thickness), "2");

    let replacement = DynamicObject::new(&border).with("Thickness", 3.into()).into_value();
    store(&object, "Border", replacement);
    tree.refresh(root);
    assert!(tree.is_expanded(node));
    assert_eq!(tree.find_child(node, "Thickness"), Some(thickness));
    assert_eq!(tree.value_text(thickness), "3");

    tree.collapse(node);
    tree.refresh(root);
    assert!(tree.child_collection(node).is_none(), "collapsed nodes drop their children");
    assert!(!tree.is_alive(thickness));
}

#[test]
fn empty_expansions_fail_until_overridden() {
    let empty = ObjectType::builder(TypeKey::new("Empty")).build();
    let holder = ObjectType::builder(TypeKey::new("Holder"))
        .field(FieldDescriptor::builder("Inner", TypeKey::new("Empty")))
        .build();
    let object = DynamicObject::new(&holder)
        .with("Inner", DynamicObject::new(&empty).into_value())
        .into_value();
    let mut tree = PropertyTree::new(vec![object], flat()).unwrap();

    let inner = tree.find_child(tree.root(), "Inner").unwrap();
    assert!(tree.is_expandable(inner));
    assert!(!tree.expand(inner));
    assert!(tree.state(inner).unwrap().expand_failed);
    assert!(!tree.is_expandable(inner));

    tree.set_expandable(inner, false);
    assert!(!tree.state(inner).unwrap().expand_failed);
    assert!(!tree.is_expandable(inner));
}

#[test]
fn reset_restores_defaults_and_clears_bold() {
    let ty = ObjectType::builder(TypeKey::new("Window"))
        .field(FieldDescriptor::builder("Width", TypeKey::INT).default_value(Value::Int(10)))
        .build();
    let object = DynamicObject::new(&ty).with("Width", 20.into()).into_value();
    let mut tree = PropertyTree::new(vec![object.clone()], flat()).unwrap();

    let width = tree.find_child(tree.root(), "Width").unwrap();
    assert!(tree.is_label_bold(width));
    assert!(tree.can_reset_value(width));

    tree.reset_value(width).unwrap();
    assert_eq!(field(&object, "Width"), Value::Int(10));
    assert!(!tree.is_label_bold(width));
    assert!(!tree.can_reset_value(width));
}

#[test]
fn capabilities_follow_converters_and_attributes() {
    let ty = ObjectType::builder(TypeKey::new("Settings"))
        .field(FieldDescriptor::builder("Align", TypeKey::TEXT).converter(Rc::new(
            StandardValuesConverter::new(vec!["Left".into(), "Right".into()]).exclusive(true),
        )))
        .field(FieldDescriptor::builder("Password", TypeKey::TEXT).attributes(PropertyAttributes::PASSWORD))
        .field(
            FieldDescriptor::builder("Notes", TypeKey::TEXT)
                .edit_style(EditStyle::Modal)
                .read_only(true),
        )
        .build();
    let mut tree = PropertyTree::new(vec![DynamicObject::new(&ty).into_value()], flat()).unwrap();
    let root = tree.root();

    let align = tree.find_child(root, "Align").unwrap();
    let capabilities = tree.capabilities(align);
    assert!(capabilities.enumerable && capabilities.drop_down_editable);
    assert!(!capabilities.text_editable);
    assert!(tree.needs_drop_down_button(align));
    assert_eq!(tree.standard_values(align).len(), 2);
    assert!(tree.set_value_text(align, "Up").is_err());
    tree.set_value_text(align, "Right").unwrap();
    assert_eq!(tree.value_text(align), "Right");

    let password = tree.find_child(root, "Password").unwrap();
    assert!(tree.should_render_password(password));
    assert!(tree.is_text_editable(password));

    let notes = tree.find_child(root, "Notes").unwrap();
    assert!(tree.capabilities(notes).read_only_editable);
    assert!(tree.needs_custom_editor_button(notes));
    assert!(tree.should_render_read_only(notes));
    assert!(!tree.is_value_editable(notes));
}

#[test]
fn recreate_children_reexpands_and_reports_counts() {
    let (border, panel) = bordered();
    let object = DynamicObject::new(&panel)
        .with("Border", DynamicObject::new(&border).into_value())
        .into_value();
    let mut tree = PropertyTree::new(vec![object], flat()).unwrap();
    let node = tree.find_child(tree.root(), "Border").unwrap();
    tree.expand(node);
    let before = tree.find_child(node, "Thickness").unwrap();

    tree.recreate_children(node);
    assert!(tree.is_expanded(node));
    let after = tree.find_child(node, "Thickness").unwrap();
    assert!(!tree.is_alive(before));
    assert_ne!(before, after);
    assert_eq!(tree.visible_child_count(node), 1);
    assert!(tree.testing_info(after).contains("Thickness"));
}
