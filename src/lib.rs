//! Treerewrite: heuristic rewriting of dependency trees
//!
//! Given a parsed sentence and a focus predicate, a fixed sequence of Growth
//! rules moves the predicate's real subject and object under it, then
//! Reduction rules normalize the relation labels and merge redundant
//! siblings. Core implementation in Rust with optional Python bindings.

pub mod config; // Rewriter settings
pub mod conllu; // CoNLL-U file parsing
pub mod error;
pub mod labels; // Relation label set threaded through the rules
pub mod pipeline; // End-to-end rewriting (growth + reduction)
pub mod rules; // Rule framework and the two rule sets
pub mod tags; // Label families and canonical buckets
pub mod tree; // Arena tree with atomic reparenting

// Python bindings
#[cfg(feature = "python")]
pub mod python;

#[cfg(test)]
mod testing;

// Re-exports for convenience
pub use config::Config;
pub use conllu::{CoNLLUReader, ParseError};
pub use error::{RewriteError, TreeError};
pub use labels::LabelSet;
pub use pipeline::{Outcome, Rewrite, Rewriter, rewrite};
pub use rules::{FiringLog, Rule, RuleSet, RuleState};
pub use tree::{Node, NodeId, Tree};
