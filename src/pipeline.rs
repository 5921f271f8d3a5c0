//! End-to-end rewriting of a tree around a focus predicate
//!
//! The Rewriter runs the whole pipeline:
//! 1. Check the tree's head/children links and that the focus hangs off the root
//! 2. Seed the label set from the focus's children
//! 3. Apply the Growth rules once
//! 4. Apply the Reduction rules once
//! 5. Check the links again and report what fired

use crate::config::Config;
use crate::error::{RewriteError, TreeError};
use crate::labels::LabelSet;
use crate::rules::growth::growth;
use crate::rules::reduction::reduction;
use crate::rules::{FiringLog, RuleSet, RuleState};
use crate::tree::{NodeId, Tree};
use tracing::debug_span;

/// Result of rewriting one tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    /// Root of the tree after rewriting (Growth may move it)
    pub root: NodeId,
    pub labels: LabelSet,
    /// Growth firings followed by Reduction firings
    pub firings: FiringLog,
}

/// One occurrence of a word, rewritten on its own copy of the tree
#[derive(Debug, Clone)]
pub struct Rewrite {
    pub focus: NodeId,
    pub tree: Tree,
    pub outcome: Outcome,
}

/// Growth and Reduction rule sets with their settings
#[derive(Debug)]
pub struct Rewriter {
    config: Config,
    growth: RuleSet,
    reduction: RuleSet,
}

impl Rewriter {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            growth: growth(),
            reduction: reduction(),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Rewrite `tree` in place around `focus`
    pub fn rewrite(&self, tree: &mut Tree, focus: NodeId) -> Result<Outcome, RewriteError> {
        let _span = debug_span!("rewrite", focus).entered();

        if self.config.validate {
            tree.validate()?;
            if !tree.is_reachable(focus) {
                return Err(RewriteError::UnknownFocus(focus));
            }
        }

        let mut state = RuleState::new(tree, focus, self.config)?;
        let mut firings = self.growth.apply(&mut state)?;
        firings.extend(self.reduction.apply(&mut state)?);
        let labels = state.labels;

        if self.config.validate {
            tree.validate()?;
        }
        let root = tree.root().ok_or(TreeError::NoRoot)?;

        Ok(Outcome {
            root,
            labels,
            firings,
        })
    }

    /// Rewrite a fresh copy of `tree` for every node whose text is `word`
    ///
    /// Occurrences are taken in arena order, which is sentence order for
    /// trees read from CoNLL-U. The input tree is left untouched.
    pub fn rewrite_occurrences(&self, tree: &Tree, word: &str) -> Result<Vec<Rewrite>, RewriteError> {
        let foci: Vec<NodeId> = tree
            .nodes()
            .filter(|node| node.form == word)
            .map(|node| node.id())
            .collect();

        foci.into_iter()
            .map(|focus| {
                let mut copy = tree.clone();
                let outcome = self.rewrite(&mut copy, focus)?;
                Ok(Rewrite {
                    focus,
                    tree: copy,
                    outcome,
                })
            })
            .collect()
    }
}

impl Default for Rewriter {
    fn default() -> Self {
        Self::new(Config::default())
    }
}

/// Rewrite `tree` around `focus` with the default settings
pub fn rewrite(tree: &mut Tree, focus: NodeId) -> Result<Outcome, RewriteError> {
    Rewriter::default().rewrite(tree, focus)
}
