// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Understory Property Grid: the data model behind a property inspector.
//!
//! This crate turns one or more reflectable values into a tree of property
//! nodes that a grid view can paint and edit. Painting, input handling and
//! editor widgets are left to the view; this crate decides what the rows
//! are, what they show, and what happens when they are edited.
//!
//! ## Core Concepts
//!
//! ### Reflection
//!
//! Values are [`Value`]s. Host objects implement [`Inspect`] and expose
//! their properties as [`PropertyDescriptor`]s; a [`TypeConverter`] renders
//! and parses values, lists drop-down values, exposes sub-properties and
//! rebuilds immutable values. [`DynamicObject`] is a ready-made
//! implementation for hosts without a reflection system of their own.
//!
//! ### The tree
//!
//! [`PropertyTree`] owns the nodes, addressed by generational [`NodeId`]s:
//!
//! - a single-object root lists one value's properties,
//! - a multi-object root lists the properties all selected objects share,
//! - property nodes expand into sub-properties or array elements,
//! - category nodes group root properties by category name.
//!
//! ### Merging
//!
//! [`PropertyMerger`] intersects the property lists of several objects into
//! [`MergedPropertyDescriptor`]s. A merged read reports whether all objects
//! agree; a merged write gives every object its own copy of the value.
//!
//! ### Failure handling
//!
//! - A getter failure becomes a [`ReadFault`] shown in place of the value.
//! - A setter failure is returned to the caller as a [`PropertyError`].
//! - A failure while merging or enumerating properties is logged and the
//!   node simply has no children.
//! - A [`TreeHost`] may veto a change, which is reported as
//!   [`SetOutcome::Vetoed`].
//!
//! ## Quick Start
//!
//! ```rust
//! use understory_property_grid::{
//!     DynamicObject, EntryKind, FieldDescriptor, GridOptions, ObjectType, PropertyTree,
//!     TypeKey, Value,
//! };
//!
//! let label = ObjectType::builder(TypeKey::new("Label"))
//!     .field(FieldDescriptor::builder("Text", TypeKey::TEXT).category("Appearance"))
//!     .field(FieldDescriptor::builder("Width", TypeKey::INT).category("Layout"))
//!     .field(FieldDescriptor::builder("Height", TypeKey::INT).category("Layout"))
//!     .build();
//!
//! let a = DynamicObject::new(&label).with("Width", 10.into()).with("Height", 4.into());
//! let b = DynamicObject::new(&label).with("Width", 10.into()).with("Height", 8.into());
//!
//! let mut tree = PropertyTree::new(vec![a.into_value(), b.into_value()], GridOptions::default())
//!     .unwrap();
//! let root = tree.root();
//! assert_eq!(tree.kind(root), Some(EntryKind::MultiRoot));
//!
//! // Categorized by default: "Appearance" then "Layout".
//! let categories: Vec<_> = tree.children(root).iter().map(|&id| tree.label(id)).collect();
//! assert_eq!(categories, ["Appearance", "Layout"]);
//!
//! // Both labels agree on the width but not on the height.
//! let width = tree.find_child(root, "Width").unwrap();
//! let height = tree.find_child(root, "Height").unwrap();
//! assert_eq!(tree.value_text(width), "10");
//! assert!(!tree.all_values_equal(height));
//! assert_eq!(tree.value_text(height), "");
//!
//! // Writing through the merged node updates every object.
//! tree.set_value(height, Value::Int(6)).unwrap();
//! assert!(tree.all_values_equal(height));
//! assert_eq!(tree.value_text(height), "6");
//! ```
//!
//! ## Diagnostics
//!
//! The crate logs through [`tracing`]: merge and enumeration failures at
//! `warn`, vetoed writes and tree construction at `debug`, and child
//! rebuilds and value-copy decisions at `trace`.
//!
//! ## `std` requirement
//!
//! Unlike most Understory crates this one is not `no_std`. Remembered
//! category expansion is shared between trees behind a `std::sync::Mutex`.

mod category;
mod converter;
mod copy;
mod descriptor;
mod dynamic;
mod error;
mod host;
mod merge;
mod options;
mod source;
mod tree;
mod types;
mod value;

pub use category::CategoryStateStore;
pub use converter::{
    ArrayConverter, CollectionConverter, ConverterRef, DefaultConverter, ExpandableConverter,
    RecordConverter, StandardValuesConverter, TypeConverter, converter_for,
};
pub use copy::copy_value;
pub use descriptor::{
    DEFAULT_CATEGORY, DescriptorRef, EditStyle, PropertyBag, PropertyDescriptor,
    RecordFieldDescriptor,
};
pub use dynamic::{
    DynamicObject, FieldDescriptor, FieldDescriptorBuilder, FieldGetter, FieldSetter, ObjectType,
    ObjectTypeBuilder,
};
pub use error::PropertyError;
pub use host::{ChangeVeto, SetOutcome, TreeHost};
pub use merge::{MergedPropertyDescriptor, MergedValue, MultiMergeCollection, PropertyMerger};
pub use options::{GridOptions, GridOptionsBuilder};
pub use source::{PropertySource, PropertySourceRef, ReflectedProperties};
pub use tree::{EntryCapabilities, EntryKind, NodeCollection, NodeId, NodeState, PropertyTree};
pub use types::{AttributeFilter, PropertyAttributes, PropertySort, TypeKey};
pub use value::{Inspect, ListRef, ObjectRef, PropertyValue, ReadFault, Record, Value};
