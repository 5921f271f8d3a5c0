//! Rule application framework
//!
//! A rule looks at the focus node and its surroundings and rewrites the tree
//! in place. Rules are grouped into ordered `RuleSet`s: list order is the
//! precedence order, and each rule runs exactly once per application of its
//! set. Any convergence loop belongs to the rule itself and is bounded by
//! `Config::max_iterations`.

pub mod growth;
pub mod reduction;

use crate::config::Config;
use crate::error::RewriteError;
use crate::labels::LabelSet;
use crate::tree::{NodeId, Tree};
use std::fmt::Debug;
use tracing::{debug, warn};

/// State threaded through every rule of a pipeline run
pub struct RuleState<'t> {
    pub tree: &'t mut Tree,
    pub focus: NodeId,
    pub labels: LabelSet,
    pub config: Config,
}

impl<'t> RuleState<'t> {
    /// Seed the label set from the focus's direct children
    pub fn new(tree: &'t mut Tree, focus: NodeId, config: Config) -> Result<Self, RewriteError> {
        if tree.get_node(focus).is_none() {
            return Err(RewriteError::UnknownFocus(focus));
        }
        let labels = LabelSet::from_children(tree, focus);
        Ok(Self {
            tree,
            focus,
            labels,
            config,
        })
    }

    pub fn root(&self) -> Option<NodeId> {
        self.tree.root()
    }

    /// Snapshot of the focus's children, safe to hold across mutations
    pub fn focus_children(&self) -> Vec<NodeId> {
        self.tree.children(self.focus).to_vec()
    }

    /// True if some direct child of the focus has a label satisfying `pred`
    pub fn focus_has(&self, pred: impl Fn(&str) -> bool) -> bool {
        self.tree
            .children(self.focus)
            .iter()
            .any(|&child| pred(self.tree[child].deprel.as_str()))
    }

    /// Fail once a convergence loop of `rule` reaches the configured bound
    pub(crate) fn check_iterations(
        &self,
        rule: &'static str,
        iterations: usize,
    ) -> Result<(), RewriteError> {
        let limit = self.config.max_iterations;
        if iterations < limit {
            return Ok(());
        }
        warn!(rule, limit, focus = self.focus, "rule did not converge");
        Err(RewriteError::IterationLimit { rule, limit })
    }
}

/// A single rewriting heuristic
pub trait Rule {
    /// Name recorded in the firing log
    fn name(&self) -> &'static str;

    /// Rewrite the state in place; `Ok(true)` if anything changed
    fn apply(&self, state: &mut RuleState<'_>) -> Result<bool, RewriteError>;
}

/// Ordered names of the rules that changed something
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct FiringLog {
    fired: Vec<&'static str>,
}

impl FiringLog {
    pub fn record(&mut self, rule: &'static str) {
        self.fired.push(rule);
    }

    /// Append another log after this one
    pub fn extend(&mut self, other: FiringLog) {
        self.fired.extend(other.fired);
    }

    pub fn contains(&self, rule: &str) -> bool {
        self.fired.iter().any(|&fired| fired == rule)
    }

    pub fn len(&self) -> usize {
        self.fired.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fired.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.fired.iter().copied()
    }

    pub fn as_slice(&self) -> &[&'static str] {
        &self.fired
    }
}

/// An ordered list of rules applied as a unit
pub struct RuleSet {
    name: &'static str,
    rules: Vec<Box<dyn Rule>>,
}

impl RuleSet {
    pub fn new(name: &'static str, rules: Vec<Box<dyn Rule>>) -> Self {
        Self { name, rules }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn rule_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.rules.iter().map(|rule| rule.name())
    }

    /// Run every rule once, in order
    pub fn apply(&self, state: &mut RuleState<'_>) -> Result<FiringLog, RewriteError> {
        let mut log = FiringLog::default();
        for rule in &self.rules {
            if rule.apply(state)? {
                debug!(set = self.name, rule = rule.name(), focus = state.focus, "rule fired");
                log.record(rule.name());
            }
        }
        Ok(log)
    }
}

// Manual Debug implementation (rules are trait objects)
impl Debug for RuleSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RuleSet")
            .field("name", &self.name)
            .field("rules", &self.rule_names().collect::<Vec<_>>())
            .finish()
    }
}
