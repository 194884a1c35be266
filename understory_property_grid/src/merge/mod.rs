// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Multi-object property merging.
//!
//! [`PropertyMerger`] finds the properties every selected object has in
//! common and pairs their descriptors into [`MergedPropertyDescriptor`]s.
//!
//! Two descriptors match when they have the same name, property type and
//! component type and both are mergeable. In alphabetical mode every list is
//! sorted by `(name, property type)` and walked with one cursor per object,
//! the first object's list acting as the pivot. In declaration order the
//! common set of the remaining objects is computed the same way, then the
//! first object's properties are looked up in it one by one, so the result
//! follows the first object's declaration order.
//!
//! Either way, parenthesized properties are moved to the front.

mod collection;
mod descriptor;

pub use collection::MultiMergeCollection;
pub use descriptor::{MergedPropertyDescriptor, MergedValue};

use std::cmp::Ordering;
use std::rc::Rc;

use smallvec::SmallVec;

use crate::descriptor::DescriptorRef;
use crate::error::PropertyError;
use crate::source::PropertySource;
use crate::types::{AttributeFilter, PropertyAttributes, PropertySort};
use crate::value::Value;

type Group = SmallVec<[DescriptorRef; 4]>;

/// Computes the properties common to several objects.
#[derive(Clone, Copy, Debug, Default)]
pub struct PropertyMerger;

impl PropertyMerger {
    /// Merges the properties of `objects` as reported by `source`.
    ///
    /// Returns `None` if any object's properties could not be enumerated; the
    /// failure is logged and callers treat the selection as not expandable.
    #[must_use]
    pub fn merge(
        objects: &[Value],
        sort: PropertySort,
        source: &dyn PropertySource,
        filter: &AttributeFilter,
    ) -> Option<Vec<Rc<MergedPropertyDescriptor>>> {
        match Self::collect(objects, source, filter) {
            Ok(lists) => {
                let merged = Self::merge_descriptors(lists, sort.is_alphabetical());
                tracing::debug!(
                    objects = objects.len(),
                    common = merged.len(),
                    "merged properties"
                );
                Some(merged)
            }
            Err(error) => {
                tracing::warn!(objects = objects.len(), %error, "merging properties failed");
                None
            }
        }
    }

    fn collect(
        objects: &[Value],
        source: &dyn PropertySource,
        filter: &AttributeFilter,
    ) -> Result<Vec<Vec<DescriptorRef>>, PropertyError> {
        objects
            .iter()
            .map(|object| {
                let converter = object.as_object().and_then(|o| o.converter());
                source.properties(object, converter.as_deref(), filter)
            })
            .collect()
    }

    /// Merges per-object descriptor lists, given in selection order.
    ///
    /// With `alphabetical` the result is sorted by name; otherwise it follows
    /// the first list's order.
    #[must_use]
    pub fn merge_descriptors(
        lists: Vec<Vec<DescriptorRef>>,
        alphabetical: bool,
    ) -> Vec<Rc<MergedPropertyDescriptor>> {
        let groups = if alphabetical {
            let sorted: Vec<_> = lists.into_iter().map(sorted).collect();
            intersect(&sorted)
        } else {
            intersect_in_declaration_order(lists)
        };
        let (mut merged, rest): (Vec<_>, Vec<_>) = groups
            .into_iter()
            .map(|group| Rc::new(MergedPropertyDescriptor::new(group)))
            .partition(|merged| is_parenthesized(merged));
        merged.extend(rest);
        merged
    }
}

fn compare(a: &DescriptorRef, b: &DescriptorRef) -> Ordering {
    a.name()
        .cmp(b.name())
        .then_with(|| a.property_type().cmp(b.property_type()))
}

fn sorted(mut list: Vec<DescriptorRef>) -> Vec<DescriptorRef> {
    list.sort_by(compare);
    list
}

fn is_parenthesized(merged: &MergedPropertyDescriptor) -> bool {
    merged.attributes().contains(PropertyAttributes::PARENTHESIZE)
        || merged.display_name().starts_with('(')
}

/// N-way intersection of sorted lists, pivoting on the first.
fn intersect(lists: &[Vec<DescriptorRef>]) -> Vec<Group> {
    let Some((pivot, others)) = lists.split_first() else {
        return Vec::new();
    };
    let mut cursors = vec![0_usize; others.len()];
    let mut groups = Vec::new();

    'pivot: for candidate in pivot {
        if !candidate.is_mergeable() {
            continue;
        }
        let mut group = Group::new();
        group.push(candidate.clone());
        for (list, cursor) in others.iter().zip(cursors.iter_mut()) {
            let mut matched = None;
            while let Some(other) = list.get(*cursor) {
                match compare(candidate, other) {
                    Ordering::Greater => *cursor += 1,
                    Ordering::Less => break,
                    Ordering::Equal => {
                        *cursor += 1;
                        if other.is_mergeable() && other.component_type() == candidate.component_type() {
                            matched = Some(other.clone());
                        }
                        break;
                    }
                }
            }
            match matched {
                Some(other) => group.push(other),
                None => continue 'pivot,
            }
        }
        groups.push(group);
    }
    groups
}

fn intersect_in_declaration_order(mut lists: Vec<Vec<DescriptorRef>>) -> Vec<Group> {
    if lists.is_empty() {
        return Vec::new();
    }
    let first = lists.remove(0);
    if lists.is_empty() {
        return first
            .into_iter()
            .filter(|d| d.is_mergeable())
            .map(|d| {
                let mut group = Group::new();
                group.push(d);
                group
            })
            .collect();
    }

    let rest: Vec<_> = lists.into_iter().map(sorted).collect();
    let common = intersect(&rest);
    first
        .into_iter()
        .filter(|d| d.is_mergeable())
        .filter_map(|d| {
            let index = common.binary_search_by(|g| compare(&g[0], &d)).ok()?;
            let others = &common[index];
            if others[0].component_type() != d.component_type() {
                return None;
            }
            let mut group = Group::with_capacity(others.len() + 1);
            group.push(d);
            group.extend(others.iter().cloned());
            Some(group)
        })
        .collect()
}
