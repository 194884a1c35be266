// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Expand/collapse state for category nodes, keyed by category name.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use hashbrown::HashMap;

/// Shared expand state for categories.
///
/// Clones share the same table, so every tree built from the same
/// [`GridOptions`](crate::GridOptions) sees the same state and a collapsed
/// category stays collapsed across rebuilds. Categories that were never
/// toggled are expanded.
///
/// # Example
///
/// ```rust
/// use understory_property_grid::CategoryStateStore;
///
/// let store = CategoryStateStore::new();
/// let shared = store.clone();
/// assert!(store.is_expanded("Layout"));
///
/// shared.set_expanded("Layout", false);
/// assert!(!store.is_expanded("Layout"));
///
/// store.reset("Layout");
/// assert!(shared.is_expanded("Layout"));
/// ```
#[derive(Clone, Debug, Default)]
pub struct CategoryStateStore {
    states: Arc<Mutex<HashMap<String, bool>>>,
}

impl CategoryStateStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, bool>> {
        self.states.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Returns whether the category is expanded.
    #[must_use]
    pub fn is_expanded(&self, category: &str) -> bool {
        self.lock().get(category).copied().unwrap_or(true)
    }

    /// Records the category's expand state.
    pub fn set_expanded(&self, category: &str, expanded: bool) {
        self.lock().insert(category.to_owned(), expanded);
    }

    /// Forgets the category's state, making it expanded again.
    pub fn reset(&self, category: &str) {
        self.lock().remove(category);
    }

    /// Forgets every category's state.
    pub fn clear(&self) {
        self.lock().clear();
    }

    /// Returns `true` if both handles share one table.
    #[must_use]
    pub fn same_store(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.states, &other.states)
    }
}
