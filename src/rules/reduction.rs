//! Reduction rules
//!
//! Normalization applied after Growth: the label set is deduplicated,
//! stripped of uninformative labels and collapsed onto canonical buckets, and
//! sibling arguments of the same family are merged under one node.

use super::{Rule, RuleSet, RuleState};
use crate::error::RewriteError;
use crate::tags::{self, Family};
use crate::tree::NodeId;

/// The Reduction rule set, in precedence order
pub fn reduction() -> RuleSet {
    RuleSet::new(
        "reduction",
        vec![
            Box::new(DedupLabels),
            Box::new(SuppressUninformative),
            Box::new(CanonicalizeLabels),
            Box::new(MergeSiblingArguments),
        ],
    )
}

pub struct DedupLabels;

impl Rule for DedupLabels {
    fn name(&self) -> &'static str {
        "dedup_labels"
    }

    fn apply(&self, state: &mut RuleState<'_>) -> Result<bool, RewriteError> {
        state.labels.dedup();
        Ok(false)
    }
}

/// Drop punctuation, markers and blank labels
///
/// Matching children of the focus are only flagged as suppressed; the tree
/// keeps its shape.
pub struct SuppressUninformative;

impl Rule for SuppressUninformative {
    fn name(&self) -> &'static str {
        "suppress_uninformative"
    }

    fn apply(&self, state: &mut RuleState<'_>) -> Result<bool, RewriteError> {
        state.labels.remove_where(tags::is_uninformative);

        let targets: Vec<NodeId> = state
            .focus_children()
            .into_iter()
            .filter(|&c| tags::is_uninformative(&state.tree[c].deprel))
            .collect();
        for &target in &targets {
            state.tree[target].suppressed = true;
        }

        Ok(!targets.is_empty())
    }
}

pub struct CanonicalizeLabels;

impl Rule for CanonicalizeLabels {
    fn name(&self) -> &'static str {
        "canonicalize_labels"
    }

    fn apply(&self, state: &mut RuleState<'_>) -> Result<bool, RewriteError> {
        state.labels.canonicalize();
        Ok(false)
    }
}

/// Merge several subjects (or objects) of the focus into one
///
/// "Another partitional method ORCLUS [2] improves PROCLUS" has two `nsubj`
/// children; they end up under a single synthetic subject. Afterwards the
/// focus has at most one subject and one object child.
pub struct MergeSiblingArguments;

impl Rule for MergeSiblingArguments {
    fn name(&self) -> &'static str {
        "merge_sibling_arguments"
    }

    fn apply(&self, state: &mut RuleState<'_>) -> Result<bool, RewriteError> {
        let mut applied = false;

        for family in Family::ALL {
            let members: Vec<NodeId> = state
                .focus_children()
                .into_iter()
                .filter(|&c| family.matches(&state.tree[c].deprel))
                .collect();
            if members.len() < 2 {
                continue;
            }

            let merged = state.tree.merge_nodes(&members, None)?;
            state.tree.attach(merged, state.focus)?;
            applied = true;
        }

        Ok(applied)
    }
}
