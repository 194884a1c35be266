// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Type keys, sort modes, and property attribute flags.

use std::borrow::Cow;
use std::fmt;

/// A runtime type identifier for property values.
///
/// Type keys are compared structurally and are totally ordered, which is what
/// the merge comparator relies on when two properties share a name.
///
/// # Example
///
/// ```rust
/// use understory_property_grid::TypeKey;
///
/// let points = TypeKey::array_of(TypeKey::named("Point"));
/// assert!(points.is_array());
/// assert_eq!(points.element_type(), Some(&TypeKey::named("Point")));
/// assert_eq!(points.to_string(), "Point[]");
/// ```
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TypeKey {
    /// A plain named type.
    Named(Cow<'static, str>),
    /// A fixed-size array whose elements are browsed individually.
    Array(Box<TypeKey>),
    /// A growable collection that is edited as a whole.
    Collection(Box<TypeKey>),
}

impl TypeKey {
    /// Boolean values.
    pub const BOOL: Self = Self::named("Boolean");
    /// Integer values.
    pub const INT: Self = Self::named("Int64");
    /// Floating point values.
    pub const FLOAT: Self = Self::named("Double");
    /// Text values.
    pub const TEXT: Self = Self::named("String");
    /// Untyped object references.
    pub const OBJECT: Self = Self::named("Object");

    /// Creates a named type key from a static string.
    #[must_use]
    pub const fn named(name: &'static str) -> Self {
        Self::Named(Cow::Borrowed(name))
    }

    /// Creates a named type key from an owned or borrowed string.
    #[must_use]
    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self::Named(name.into())
    }

    /// Creates an array type key with the given element type.
    #[must_use]
    pub fn array_of(element: Self) -> Self {
        Self::Array(Box::new(element))
    }

    /// Creates a collection type key with the given element type.
    #[must_use]
    pub fn collection_of(element: Self) -> Self {
        Self::Collection(Box::new(element))
    }

    /// Returns the element type of array and collection keys.
    #[must_use]
    pub fn element_type(&self) -> Option<&Self> {
        match self {
            Self::Named(_) => None,
            Self::Array(element) | Self::Collection(element) => Some(element),
        }
    }

    /// Returns `true` for array keys.
    #[must_use]
    pub fn is_array(&self) -> bool {
        matches!(self, Self::Array(_))
    }

    /// Returns `true` for collection keys.
    #[must_use]
    pub fn is_collection(&self) -> bool {
        matches!(self, Self::Collection(_))
    }
}

impl fmt::Debug for TypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TypeKey({self})")
    }
}

impl fmt::Display for TypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Named(name) => f.write_str(name),
            Self::Array(element) => write!(f, "{element}[]"),
            Self::Collection(element) => write!(f, "Collection<{element}>"),
        }
    }
}

bitflags::bitflags! {
    /// How the children of a tree node are ordered and grouped.
    ///
    /// The empty set keeps declaration order without categories.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct PropertySort: u8 {
        /// Order properties by name.
        const ALPHABETICAL = 0b0000_0001;
        /// Group top-level properties under category nodes.
        const CATEGORIZED  = 0b0000_0010;
    }
}

impl PropertySort {
    /// Returns `true` when properties are ordered by name.
    #[must_use]
    #[inline]
    pub fn is_alphabetical(self) -> bool {
        self.contains(Self::ALPHABETICAL)
    }

    /// Returns `true` when top-level properties are grouped by category.
    #[must_use]
    #[inline]
    pub fn is_categorized(self) -> bool {
        self.contains(Self::CATEGORIZED)
    }
}

impl Default for PropertySort {
    fn default() -> Self {
        Self::CATEGORIZED | Self::ALPHABETICAL
    }
}

bitflags::bitflags! {
    /// Declarative attributes attached to a property descriptor.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct PropertyAttributes: u16 {
        /// Not browsable; filtered out by the default [`AttributeFilter`].
        const HIDDEN            = 1 << 0;
        /// The label is shown as `(Name)` and sorts before other properties.
        const PARENTHESIZE      = 1 << 1;
        /// The value is rendered masked.
        const PASSWORD          = 1 << 2;
        /// Opts out of multi-object merging.
        const NOT_MERGEABLE     = 1 << 3;
        /// A change must be reported against the owning parent property too.
        const NOTIFY_PARENT     = 1 << 4;
        /// The value is localizable.
        const LOCALIZABLE       = 1 << 5;
        /// Only meaningful at design time.
        const DESIGN_ONLY       = 1 << 6;
        /// Changing the value requires sibling properties to be re-read.
        const REFRESH           = 1 << 7;
        /// The value's contents are serialized; the node expands even when
        /// the converter does not advertise sub-properties.
        const SERIALIZE_CONTENT = 1 << 8;
        /// The value type is an immutable object; its text is never editable.
        const IMMUTABLE         = 1 << 9;
    }
}

/// Browsable-attribute filter applied when a node enumerates properties.
///
/// A descriptor passes when it carries every `required` attribute and none
/// of the `excluded` ones.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct AttributeFilter {
    required: PropertyAttributes,
    excluded: PropertyAttributes,
}

impl AttributeFilter {
    /// A filter that passes every descriptor.
    #[must_use]
    pub const fn all() -> Self {
        Self {
            required: PropertyAttributes::empty(),
            excluded: PropertyAttributes::empty(),
        }
    }

    /// Creates a filter from required and excluded attribute sets.
    #[must_use]
    pub const fn new(required: PropertyAttributes, excluded: PropertyAttributes) -> Self {
        Self { required, excluded }
    }

    /// Returns the attributes a descriptor must carry.
    #[must_use]
    pub const fn required(&self) -> PropertyAttributes {
        self.required
    }

    /// Returns the attributes a descriptor must not carry.
    #[must_use]
    pub const fn excluded(&self) -> PropertyAttributes {
        self.excluded
    }

    /// Returns `true` if a descriptor with `attributes` passes the filter.
    #[must_use]
    pub fn matches(&self, attributes: PropertyAttributes) -> bool {
        attributes.contains(self.required) && !attributes.intersects(self.excluded)
    }
}

impl Default for AttributeFilter {
    fn default() -> Self {
        Self::new(PropertyAttributes::empty(), PropertyAttributes::HIDDEN)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn type_key_display() {
        assert_eq!(TypeKey::INT.to_string(), "Int64");
        assert_eq!(TypeKey::array_of(TypeKey::TEXT).to_string(), "String[]");
        assert_eq!(
            TypeKey::collection_of(TypeKey::named("Item")).to_string(),
            "Collection<Item>"
        );
        assert_eq!(format!("{:?}", TypeKey::BOOL), "TypeKey(Boolean)");
    }

    #[test]
    fn type_key_element_type() {
        assert_eq!(TypeKey::INT.element_type(), None);
        let list = TypeKey::collection_of(TypeKey::INT);
        assert_eq!(list.element_type(), Some(&TypeKey::INT));
        assert!(list.is_collection());
        assert!(!list.is_array());
    }

    #[test]
    fn type_key_owned_and_static_names_are_equal() {
        assert_eq!(TypeKey::new(String::from("Point")), TypeKey::named("Point"));
    }

    #[test]
    fn property_sort_default_is_categorized_alphabetical() {
        let sort = PropertySort::default();
        assert!(sort.is_alphabetical());
        assert!(sort.is_categorized());
        assert!(!PropertySort::empty().is_alphabetical());
    }

    #[test]
    fn default_filter_hides_hidden_properties() {
        let filter = AttributeFilter::default();
        assert!(filter.matches(PropertyAttributes::empty()));
        assert!(filter.matches(PropertyAttributes::PASSWORD));
        assert!(!filter.matches(PropertyAttributes::HIDDEN | PropertyAttributes::PASSWORD));
        assert!(AttributeFilter::all().matches(PropertyAttributes::HIDDEN));
    }

    #[test]
    fn filter_required_attributes() {
        let filter = AttributeFilter::new(PropertyAttributes::DESIGN_ONLY, PropertyAttributes::empty());
        assert!(!filter.matches(PropertyAttributes::empty()));
        assert!(filter.matches(PropertyAttributes::DESIGN_ONLY | PropertyAttributes::LOCALIZABLE));
    }
}
