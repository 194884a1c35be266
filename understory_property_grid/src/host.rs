// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The contract between a property tree and the view hosting it.

use std::fmt;

use crate::descriptor::DescriptorRef;
use crate::tree::NodeId;
use crate::value::Value;

/// A host's refusal of a pending change.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ChangeVeto {
    reason: Option<String>,
}

impl ChangeVeto {
    /// Creates a veto without a reason.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a veto with a reason for diagnostics.
    #[must_use]
    pub fn because(reason: impl Into<String>) -> Self {
        Self {
            reason: Some(reason.into()),
        }
    }

    /// Returns the reason, if one was given.
    #[must_use]
    pub fn reason(&self) -> Option<&str> {
        self.reason.as_deref()
    }
}

impl fmt::Display for ChangeVeto {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.reason {
            Some(reason) => write!(f, "change vetoed: {reason}"),
            None => f.write_str("change vetoed"),
        }
    }
}

/// How a write through the tree ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SetOutcome {
    /// The value was written.
    Applied,
    /// The host vetoed the change; nothing was written.
    Vetoed,
}

impl SetOutcome {
    /// Returns `true` if the value was written.
    #[must_use]
    pub fn is_applied(self) -> bool {
        self == Self::Applied
    }
}

/// Callbacks from a [`PropertyTree`](crate::PropertyTree) to its host.
///
/// The tree holds its host weakly; once the host is dropped the callbacks are
/// skipped. Multi-object edits report each underlying object separately.
/// Every method has an empty default.
pub trait TreeHost {
    /// Called before `descriptor` is written on `owner`. Returning a veto
    /// aborts the write before anything changes.
    ///
    /// A multi-object write or reset asks each object in selection order and
    /// stops at the first veto. Objects asked before it have already seen
    /// this call but receive no [`component_changed`](Self::component_changed),
    /// so a host must not treat this call as a promise that a change follows.
    fn component_changing(&self, _owner: &Value, _descriptor: &DescriptorRef) -> Result<(), ChangeVeto> {
        Ok(())
    }

    /// Called after `descriptor` was written on `owner`.
    fn component_changed(
        &self,
        _owner: &Value,
        _descriptor: &DescriptorRef,
        _old_value: &Value,
        _new_value: &Value,
    ) {
    }

    /// Called when a node's displayed value is stale and should be repainted.
    fn value_invalidated(&self, _node: NodeId) {}

    /// Called after a node's children were rebuilt, with the visible row
    /// counts below it before and after.
    fn children_recreated(&self, _node: NodeId, _old_count: usize, _new_count: usize) {}
}
