//! Relation labels observed on the focus node
//!
//! Growth rules push labels as they promote descendants to direct children
//! of the focus; Reduction dedups, filters and canonicalizes them. The final
//! contents are what a consumer reads to classify the focus's arguments.

use crate::tags;
use crate::tree::{NodeId, Tree};
use rustc_hash::FxHashSet;

/// Ordered collection of relation labels with set-like reductions
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LabelSet {
    labels: Vec<String>,
}

impl LabelSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Labels of the direct children of `focus`, in child order
    pub fn from_children(tree: &Tree, focus: NodeId) -> Self {
        tree.children(focus)
            .iter()
            .map(|&child| tree[child].deprel.as_str())
            .collect()
    }

    pub fn push(&mut self, label: &str) {
        self.labels.push(label.to_string());
    }

    pub fn contains(&self, label: &str) -> bool {
        self.labels.iter().any(|l| l == label)
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.labels.iter().map(String::as_str)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.labels
    }

    /// Replace every occurrence of `from` with `to`
    pub fn replace_all(&mut self, from: &str, to: &str) {
        for label in self.labels.iter_mut().filter(|l| l.as_str() == from) {
            *label = to.to_string();
        }
    }

    /// Drop every label for which `drop` returns true
    pub fn remove_where(&mut self, mut drop: impl FnMut(&str) -> bool) {
        self.labels.retain(|l| !drop(l.as_str()));
    }

    /// Keep the first occurrence of each label
    pub fn dedup(&mut self) {
        let mut seen = FxHashSet::default();
        self.labels.retain(|l| seen.insert(l.clone()));
    }

    /// Map every label through the tag table, then dedup
    pub fn canonicalize(&mut self) {
        self.labels = self
            .labels
            .iter()
            .map(|l| tags::canonical(l).to_string())
            .collect();
        self.dedup();
    }

    /// Labels in sorted order, for order-insensitive comparison
    pub fn sorted(&self) -> Vec<&str> {
        let mut labels: Vec<&str> = self.iter().collect();
        labels.sort_unstable();
        labels
    }
}

impl<'a> FromIterator<&'a str> for LabelSet {
    fn from_iter<I: IntoIterator<Item = &'a str>>(iter: I) -> Self {
        Self {
            labels: iter.into_iter().map(str::to_string).collect(),
        }
    }
}
