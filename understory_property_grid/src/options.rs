// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tree construction options.
//!
//! [`GridOptions`] carries everything a [`PropertyTree`](crate::PropertyTree)
//! needs besides the selection, and [`GridOptionsBuilder`] builds it.

use std::rc::Rc;

use crate::category::CategoryStateStore;
use crate::source::{PropertySourceRef, ReflectedProperties};
use crate::types::{AttributeFilter, PropertySort};

/// Options shared by the trees a grid builds.
///
/// Cloning is cheap; clones share the property source and the category store.
#[derive(Clone, Debug)]
pub struct GridOptions {
    sort: PropertySort,
    filter: AttributeFilter,
    source: PropertySourceRef,
    categories: CategoryStateStore,
}

impl GridOptions {
    /// Returns a builder with default settings.
    #[must_use]
    pub fn builder() -> GridOptionsBuilder {
        GridOptionsBuilder::new()
    }

    /// Returns the sort mode for new trees.
    #[must_use]
    #[inline]
    pub fn sort(&self) -> PropertySort {
        self.sort
    }

    /// Returns the browsable-attribute filter.
    #[must_use]
    #[inline]
    pub fn filter(&self) -> &AttributeFilter {
        &self.filter
    }

    /// Returns the property source.
    #[must_use]
    #[inline]
    pub fn source(&self) -> &PropertySourceRef {
        &self.source
    }

    /// Returns the category expand-state store.
    #[must_use]
    #[inline]
    pub fn categories(&self) -> &CategoryStateStore {
        &self.categories
    }

    pub(crate) fn set_sort(&mut self, sort: PropertySort) {
        self.sort = sort;
    }
}

impl Default for GridOptions {
    fn default() -> Self {
        GridOptionsBuilder::new().build()
    }
}

/// Builder for [`GridOptions`].
///
/// # Example
///
/// ```rust
/// use understory_property_grid::{
///     AttributeFilter, CategoryStateStore, GridOptions, PropertyAttributes, PropertySort,
/// };
///
/// let store = CategoryStateStore::new();
/// let options = GridOptions::builder()
///     .sort(PropertySort::ALPHABETICAL)
///     .filter(AttributeFilter::new(
///         PropertyAttributes::empty(),
///         PropertyAttributes::HIDDEN | PropertyAttributes::DESIGN_ONLY,
///     ))
///     .categories(store.clone())
///     .build();
///
/// assert!(!options.sort().is_categorized());
/// assert!(options.categories().same_store(&store));
/// ```
#[derive(Debug)]
pub struct GridOptionsBuilder {
    sort: PropertySort,
    filter: AttributeFilter,
    source: Option<PropertySourceRef>,
    categories: Option<CategoryStateStore>,
}

impl GridOptionsBuilder {
    /// Creates a builder with default settings.
    ///
    /// - `sort`: categorized and alphabetical
    /// - `filter`: hides [`HIDDEN`](crate::PropertyAttributes::HIDDEN) properties
    /// - `source`: [`ReflectedProperties`]
    /// - `categories`: a fresh store
    #[must_use]
    pub fn new() -> Self {
        Self {
            sort: PropertySort::default(),
            filter: AttributeFilter::default(),
            source: None,
            categories: None,
        }
    }

    /// Sets the sort mode.
    #[must_use]
    pub fn sort(mut self, sort: PropertySort) -> Self {
        self.sort = sort;
        self
    }

    /// Sets the browsable-attribute filter.
    #[must_use]
    pub fn filter(mut self, filter: AttributeFilter) -> Self {
        self.filter = filter;
        self
    }

    /// Sets the property source.
    #[must_use]
    pub fn source(mut self, source: PropertySourceRef) -> Self {
        self.source = Some(source);
        self
    }

    /// Shares an existing category store.
    #[must_use]
    pub fn categories(mut self, categories: CategoryStateStore) -> Self {
        self.categories = Some(categories);
        self
    }

    /// Builds the options.
    #[must_use]
    pub fn build(self) -> GridOptions {
        GridOptions {
            sort: self.sort,
            filter: self.filter,
            source: self.source.unwrap_or_else(|| Rc::new(ReflectedProperties)),
            categories: self.categories.unwrap_or_default(),
        }
    }
}

impl Default for GridOptionsBuilder {
    fn default() -> Self {
        Self::new()
    }
}
