// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The shared proxy for merged collection properties.

use std::cell::Cell;

use crate::types::TypeKey;
use crate::value::{ListRef, Value};

/// One editable list standing in for the same collection property on every
/// selected object.
///
/// Edits made to [`items`](Self::items) are fanned out to each object's own
/// collection when the merged property is written back. While a write-back is
/// in progress the proxy is locked, and reads return it unchanged instead of
/// re-checking the objects for divergence.
#[derive(Debug)]
pub struct MultiMergeCollection {
    items: ListRef,
    locked: Cell<bool>,
}

impl MultiMergeCollection {
    pub(crate) fn new(element_type: TypeKey, items: Vec<Value>) -> Self {
        Self {
            items: ListRef::new(element_type, items),
            locked: Cell::new(false),
        }
    }

    /// Returns the shared list handle.
    #[must_use]
    #[inline]
    pub fn items(&self) -> &ListRef {
        &self.items
    }

    /// Returns `true` while a write-back is in progress.
    #[must_use]
    #[inline]
    pub fn is_locked(&self) -> bool {
        self.locked.get()
    }

    /// Replaces the proxy contents unless locked.
    pub(crate) fn refresh(&self, items: Vec<Value>) {
        if !self.is_locked() {
            self.items.replace_all(items);
        }
    }

    /// Locks the proxy until the returned guard drops.
    pub(crate) fn lock(&self) -> LockGuard<'_> {
        self.locked.set(true);
        LockGuard { collection: self }
    }
}

pub(crate) struct LockGuard<'a> {
    collection: &'a MultiMergeCollection,
}

impl Drop for LockGuard<'_> {
    fn drop(&mut self) {
        self.collection.locked.set(false);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lock_suppresses_refresh() {
        let proxy = MultiMergeCollection::new(TypeKey::INT, vec![Value::Int(1)]);
        {
            let _guard = proxy.lock();
            assert!(proxy.is_locked());
            proxy.refresh(vec![]);
            assert_eq!(proxy.items().len(), 1);
        }
        assert!(!proxy.is_locked());
        proxy.refresh(vec![Value::Int(4), Value::Int(5)]);
        assert_eq!(proxy.items().snapshot(), [Value::Int(4), Value::Int(5)]);
    }
}
