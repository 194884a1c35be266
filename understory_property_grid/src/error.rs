// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Error types for property access and tree operations.

use thiserror::Error;

use crate::tree::NodeId;
use crate::types::TypeKey;

/// Errors raised by property accessors, converters, and tree operations.
///
/// Read faults never escape a node: the tree turns them into a
/// [`ReadFault`](crate::ReadFault) value. Write faults are returned to the
/// caller unchanged.
#[derive(Debug, Error)]
pub enum PropertyError {
    /// An accessor or converter failed, optionally because of an inner error.
    #[error("{message}")]
    Failed {
        /// Description of the failure. May be empty.
        message: String,
        /// The underlying cause, if any.
        #[source]
        source: Option<Box<PropertyError>>,
    },
    /// The property has no setter or is declared read-only.
    #[error("property `{0}` is read-only")]
    ReadOnly(String),
    /// Text could not be converted to the target type.
    #[error("cannot convert \"{text}\" to {target}")]
    Conversion {
        /// The rejected text.
        text: String,
        /// The requested value type.
        target: TypeKey,
    },
    /// A converter produced no instance for an immutable value type.
    #[error("could not create an instance of {type_name}")]
    CreateInstance {
        /// The type that could not be constructed.
        type_name: TypeKey,
    },
    /// A converter failed without a message while constructing a value.
    #[error("creating an instance of {type_name} failed")]
    Construction {
        /// The type being constructed.
        type_name: TypeKey,
        /// The converter's error.
        #[source]
        source: Box<PropertyError>,
    },
    /// A merged descriptor was given the wrong number of value owners.
    #[error("expected {expected} value owners, found {found}")]
    OwnerMismatch {
        /// Number of member descriptors.
        expected: usize,
        /// Number of owners supplied.
        found: usize,
    },
    /// The node's value owner is gone or has the wrong shape.
    #[error("no value owner is available for `{0}`")]
    NoOwner(String),
    /// The node handle does not refer to a live node.
    #[error("{0:?} is not a live node")]
    StaleNode(NodeId),
}

impl PropertyError {
    /// Creates a [`PropertyError::Failed`] with the given message.
    #[must_use]
    pub fn failed(message: impl Into<String>) -> Self {
        Self::Failed {
            message: message.into(),
            source: None,
        }
    }

    /// Creates a [`PropertyError::Failed`] wrapping an inner error.
    #[must_use]
    pub fn wrapping(message: impl Into<String>, inner: Self) -> Self {
        Self::Failed {
            message: message.into(),
            source: Some(Box::new(inner)),
        }
    }

    /// Returns `true` if the error renders a non-empty message.
    #[must_use]
    pub fn has_message(&self) -> bool {
        !self.to_string().is_empty()
    }

    /// Wraps a construction failure for `type_name`.
    ///
    /// Errors that already carry a message are returned unchanged; silent ones
    /// are qualified with the type being constructed.
    #[must_use]
    pub fn construction(type_name: &TypeKey, error: Self) -> Self {
        if error.has_message() {
            error
        } else {
            Self::Construction {
                type_name: type_name.clone(),
                source: Box::new(error),
            }
        }
    }
}

/// Renders the message shown for a read fault: the inner cause's message when
/// there is one, otherwise the error's own message.
pub(crate) fn fault_message(error: &PropertyError) -> String {
    match std::error::Error::source(error) {
        Some(inner) => inner.to_string(),
        None => error.to_string(),
    }
}
