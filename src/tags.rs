//! Relation label vocabulary
//!
//! The closed label families the rules reason about, and the many-to-one
//! table that collapses raw parser labels into canonical buckets.

use rustc_hash::FxHashMap;
use std::sync::LazyLock;

/// Raw labels of subject-like dependents (ClearNLP and UD v2 spellings)
pub const SUBJECT_LABELS: &[&str] = &[
    "nsubj",
    "csubj",
    "nsubjpass",
    "csubjpass",
    "nsubj:pass",
    "csubj:pass",
];

/// Raw labels of object-like dependents
pub const OBJECT_LABELS: &[&str] = &["dobj", "iobj", "pobj", "obj"];

/// Tags of words that can stand as a real subject
pub const OPEN_CLASS_POS: &[&str] = &["NOUN", "PROPN", "VERB", "NUM", "PRON", "X"];

/// Labels that carry no information about the relation
pub const UNINFORMATIVE_LABELS: &[&str] = &["punct", "mark", " ", "", "meta"];

/// Label given to a node pulled down to act as the focus's subject
pub const DOWNWARD_SUBJECT: &str = "nsubj";

pub const SUBJ: &str = "subj";
pub const OBJ: &str = "obj";
pub const PREP: &str = "prep";
pub const MOD: &str = "mod";

static CANONICAL: LazyLock<FxHashMap<&'static str, &'static str>> = LazyLock::new(|| {
    let mut table = FxHashMap::default();
    for &label in SUBJECT_LABELS {
        table.insert(label, SUBJ);
    }
    for &label in OBJECT_LABELS {
        table.insert(label, OBJ);
    }
    table
});

/// Map a raw label to its canonical bucket; unmapped labels map to themselves
pub fn canonical(label: &str) -> &str {
    CANONICAL.get(label).copied().unwrap_or(label)
}

/// Argument families of the focus predicate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Family {
    Subject,
    Object,
}

impl Family {
    pub const ALL: [Family; 2] = [Family::Subject, Family::Object];

    /// Canonical bucket name
    pub fn bucket(self) -> &'static str {
        match self {
            Family::Subject => SUBJ,
            Family::Object => OBJ,
        }
    }

    pub fn raw_labels(self) -> &'static [&'static str] {
        match self {
            Family::Subject => SUBJECT_LABELS,
            Family::Object => OBJECT_LABELS,
        }
    }

    /// Exact membership in the raw label family
    pub fn includes(self, label: &str) -> bool {
        self.raw_labels().contains(&label)
    }

    /// Loose membership: the label mentions the bucket name
    ///
    /// Covers canonical labels already rewritten by a rule (`subj`, `obj`)
    /// as well as every raw variant.
    pub fn matches(self, label: &str) -> bool {
        label.contains(self.bucket())
    }
}

pub fn is_open_class(pos: &str) -> bool {
    OPEN_CLASS_POS.contains(&pos)
}

pub fn is_uninformative(label: &str) -> bool {
    UNINFORMATIVE_LABELS.contains(&label)
}
