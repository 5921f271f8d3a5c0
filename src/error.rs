//! Error types for tree mutation and rule application

use crate::tree::NodeId;
use thiserror::Error;

/// Structural invariant violations raised by tree operations
///
/// These are programming errors in the caller or a rule: the tree is left
/// untouched by the operation that reports them.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TreeError {
    #[error("node {0} does not exist")]
    UnknownNode(NodeId),

    #[error("node {node} names {head} as its head but is not among its children")]
    HeadMismatch { node: NodeId, head: NodeId },

    #[error("moving node {node} under {parent} would create a cycle")]
    Cycle { node: NodeId, parent: NodeId },

    #[error("node {0} is the root and cannot be detached")]
    DetachRoot(NodeId),

    #[error("node {0} has no head")]
    NoHead(NodeId),

    #[error("node {0} is already attached")]
    AlreadyAttached(NodeId),

    #[error("cannot merge an empty group of nodes")]
    EmptyMerge,

    #[error("node {0} is reachable more than once from the root")]
    MultipleParents(NodeId),

    #[error("tree has no root")]
    NoRoot,
}

/// Errors raised while running rule sets over a tree
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RewriteError {
    #[error(transparent)]
    Tree(#[from] TreeError),

    #[error("focus node {0} is not part of the tree")]
    UnknownFocus(NodeId),

    #[error("rule `{rule}` did not converge within {limit} iterations")]
    IterationLimit { rule: &'static str, limit: usize },
}
