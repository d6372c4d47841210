//! Errors raised while building or running a grammar
//!
//! Match-time *failure* is not an error: it is the `false` half of a match
//! result. These types cover construction misuse and the recursion guard.

use crate::node::NodeId;
use thiserror::Error;

/// Precondition violations detected while a grammar is being built
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GrammarError {
    /// `sequence` or `alternation` called with no children
    #[error("{kind} needs at least one child")]
    EmptyChildren { kind: &'static str },

    /// `repeat` with `min` greater than `max`
    #[error("repeat bounds are inverted: min {min} > max {max}")]
    InvalidBounds { min: usize, max: usize },

    /// A handle that was not issued by this builder
    #[error("node {0} does not belong to this grammar")]
    UnknownNode(NodeId),

    /// Attempt to tag or name one of the shared constant nodes
    #[error("node {0} is a shared constant and cannot be tagged or named")]
    SharedNode(NodeId),

    /// `define` on a handle that did not come from `declare`
    #[error("node {0} was not created with declare()")]
    NotDeclared(NodeId),

    /// `define` called twice for the same declaration
    #[error("node {0} is already defined")]
    AlreadyDefined(NodeId),

    /// A declaration was used before (or without) being defined
    #[error("declared node {0} was never defined")]
    Undefined(NodeId),
}

/// Conditions that abort a run
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MatchError {
    #[error("recursion depth limit of {limit} exceeded at offset {position}")]
    DepthLimitExceeded { limit: usize, position: usize },

    #[error("root node {0} does not belong to this grammar")]
    UnknownRoot(NodeId),
}
