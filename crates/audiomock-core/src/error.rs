//! Error types for graph, scheduling, and context operations.
//!
//! Every variant carries the failing operation as `Type#method` so messages
//! read like `GainNode#connect: output index 2 exceeds number of outputs (1)`.
//! [`GraphError::kind()`] collapses the variants onto a small taxonomy that
//! callers can match on without caring about the exact failure.

use thiserror::Error;

use crate::graph::{NodeId, ParamId};

/// Coarse classification of a [`GraphError`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// A slot or channel index beyond the declared count.
    OutOfRange,
    /// The operation is not valid in the current state of its target.
    InvalidState,
    /// An argument had an unusable value (negative time, bad timecode, ...).
    InvalidArgument,
    /// The operation is switched off in the feature registry or undefined for
    /// the target node type.
    NotSupported,
    /// An identifier does not belong to this context.
    NotFound,
}

/// Errors raised by audiomock operations.
///
/// None of these are transient: each one signals a precondition violation in
/// the caller's graph-construction or scheduling logic.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GraphError {
    /// Output slot index beyond the node's output count.
    #[error("{method}: output index {index} exceeds number of outputs ({count})")]
    OutputOutOfRange {
        /// Failing operation.
        method: String,
        /// Requested output slot.
        index: usize,
        /// Number of output slots on the node.
        count: usize,
    },

    /// Input slot index beyond the destination's input count.
    #[error("{method}: input index {index} exceeds number of inputs ({count})")]
    InputOutOfRange {
        /// Failing operation.
        method: String,
        /// Requested input slot.
        index: usize,
        /// Number of input slots on the destination.
        count: usize,
    },

    /// Generic index check (channels, buffer offsets, disconnect slots).
    #[error("{method}: the {what} ({index}) is outside the range [0, {len})")]
    IndexOutOfRange {
        /// Failing operation.
        method: String,
        /// Human name of the index argument.
        what: &'static str,
        /// Requested index.
        index: usize,
        /// Exclusive upper bound.
        len: usize,
    },

    /// A destination-qualified disconnect named a node the source does not feed.
    #[error("{method}: the given destination is not connected")]
    NotConnected {
        /// Failing operation.
        method: String,
    },

    /// The target's state does not allow the operation.
    #[error("{method}: {reason}")]
    InvalidState {
        /// Failing operation.
        method: String,
        /// What was wrong.
        reason: String,
    },

    /// An argument value was rejected.
    #[error("{method}: {reason}")]
    InvalidArgument {
        /// Failing operation.
        method: String,
        /// What was wrong.
        reason: String,
    },

    /// The operation is switched off in the feature registry.
    #[error("{method}: not enabled")]
    NotEnabled {
        /// Failing operation.
        method: String,
    },

    /// The node type does not define this operation.
    #[error("{method}: not supported by {node}")]
    NotSupported {
        /// Failing operation.
        method: String,
        /// Type tag of the node.
        node: &'static str,
    },

    /// The upstream chain is deeper than a snapshot will nest.
    #[error("{method}: upstream chain deeper than {limit} nodes")]
    SnapshotTooDeep {
        /// Failing operation.
        method: String,
        /// Deepest chain a snapshot renders.
        limit: usize,
    },

    /// The node id was minted by a different context.
    #[error("node {0} not found")]
    NodeNotFound(NodeId),

    /// The param id was minted by a different context.
    #[error("param {0} not found")]
    ParamNotFound(ParamId),

    /// The node has no parameter with this name.
    #[error("{node} has no parameter named '{name}'")]
    UnknownParam {
        /// Type tag of the node.
        node: &'static str,
        /// Requested parameter name.
        name: String,
    },

    /// Registry lookup for a key that is not registered.
    #[error("unknown feature key '{0}'")]
    UnknownFeature(String),

    /// Registry value outside the key's allowed set.
    #[error("invalid value '{value}' for feature '{key}' (expected one of: {allowed})")]
    InvalidFeatureValue {
        /// Registry key.
        key: String,
        /// Rejected value.
        value: String,
        /// Comma-separated list of accepted values.
        allowed: String,
    },
}

impl GraphError {
    /// Returns the taxonomy bucket of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::OutputOutOfRange { .. }
            | Self::InputOutOfRange { .. }
            | Self::IndexOutOfRange { .. } => ErrorKind::OutOfRange,
            Self::NotConnected { .. } | Self::InvalidState { .. } => ErrorKind::InvalidState,
            Self::InvalidArgument { .. }
            | Self::UnknownParam { .. }
            | Self::UnknownFeature(_)
            | Self::InvalidFeatureValue { .. } => ErrorKind::InvalidArgument,
            Self::NotEnabled { .. }
            | Self::NotSupported { .. }
            | Self::SnapshotTooDeep { .. } => ErrorKind::NotSupported,
            Self::NodeNotFound(_) | Self::ParamNotFound(_) => ErrorKind::NotFound,
        }
    }

    pub(crate) fn invalid_state(method: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidState {
            method: method.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn invalid_argument(method: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidArgument {
            method: method.into(),
            reason: reason.into(),
        }
    }
}
