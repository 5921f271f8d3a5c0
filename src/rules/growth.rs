//! Growth rules
//!
//! Structural heuristics that bring the focus predicate's real subject and
//! object under it as direct children, undoing attachments the parser made
//! elsewhere in the tree. They run in the order listed by [`growth`].

use super::{Rule, RuleSet, RuleState};
use crate::error::RewriteError;
use crate::tags::{self, DOWNWARD_SUBJECT, Family, MOD, OBJ, PREP};
use crate::tree::{NodeId, Tree};

/// Labels of clauses whose head is really the focus's subject
const CLAUSE_LABELS: &[&str] = &["relcl", "ccomp"];

const CONJ: &str = "conj";
const CC: &str = "cc";

/// Complement label relabeled to an argument family when that family is missing
const COMPLEMENT_MOVES: [(&str, Family); 4] = [
    ("xcomp", Family::Object),
    ("ccomp", Family::Object),
    ("xcomp", Family::Subject),
    ("ccomp", Family::Subject),
];

/// (label filter, text filter, new label) of descendants hoisted onto the focus
const HOIST_PATTERNS: [(&str, Option<&str>, &str); 8] = [
    (PREP, Some("by"), PREP),
    (PREP, Some("to"), PREP),
    (PREP, Some("for"), PREP),
    (PREP, Some("with"), PREP),
    (PREP, Some("whereby"), PREP),
    ("relcl", None, MOD),
    ("acl", None, MOD),
    ("advcl", None, MOD),
];

/// The Growth rule set, in precedence order
pub fn growth() -> RuleSet {
    RuleSet::new(
        "growth",
        vec![
            Box::new(PromoteClauseHead),
            Box::new(BorrowConjunctSubject),
            Box::new(ComplementAsArgument),
            Box::new(PrepInAsObject),
            Box::new(HoistGrandchildren),
        ],
    )
}

/// Invert a relative or complement clause onto its head
///
/// In "a research area which continuously improves web search relevance"
/// the parser hangs "improves" under "area" as `relcl`, with "which" as its
/// subject. Subjects of the focus that are not open-class words are dropped;
/// if none is left, the head is pulled under the focus as its subject. Proper
/// nouns count as open-class, so "GeckoFTL" in "shortcomings that GeckoFTL
/// improves upon" stays.
pub struct PromoteClauseHead;

impl Rule for PromoteClauseHead {
    fn name(&self) -> &'static str {
        "promote_clause_head"
    }

    fn apply(&self, state: &mut RuleState<'_>) -> Result<bool, RewriteError> {
        let focus = state.focus;
        if !CLAUSE_LABELS.contains(&state.tree[focus].deprel.as_str()) {
            return Ok(false);
        }
        let Some(head) = state.tree.head(focus) else {
            return Ok(false);
        };

        let subjects: Vec<NodeId> = state
            .focus_children()
            .into_iter()
            .filter(|&child| Family::Subject.includes(&state.tree[child].deprel))
            .collect();

        let mut remaining = subjects.len();
        for &subject in &subjects {
            if !tags::is_open_class(&state.tree[subject].pos) {
                state.tree.detach(subject)?;
                remaining -= 1;
            }
        }
        // A surviving open-class subject keeps the clause as parsed
        if remaining > 0 {
            return Ok(remaining < subjects.len());
        }

        state.tree.invert(focus)?;
        state.tree[head].deprel = DOWNWARD_SUBJECT.to_string();
        state.labels.push(DOWNWARD_SUBJECT);
        Ok(true)
    }
}

/// Borrow a subject for a coordinated verb from up its `conj` chain
///
/// "Using many ASR hypotheses helps recover the errors and improves NER
/// accuracy": "improves" is a `conj` of "helps" and has no subject of its
/// own, so the subject of "helps" is pulled down. With a "but" between the
/// conjuncts, another conjunct is preferred as the subject, falling back to
/// the head's subject when there is none. A head with no subject lends its
/// object instead.
pub struct BorrowConjunctSubject;

impl Rule for BorrowConjunctSubject {
    fn name(&self) -> &'static str {
        "borrow_conjunct_subject"
    }

    fn apply(&self, state: &mut RuleState<'_>) -> Result<bool, RewriteError> {
        let focus = state.focus;
        let mut cursor = focus;
        let mut applied = false;
        let mut iterations = 0;

        loop {
            let Some(head) = state.tree.head(cursor) else {
                break;
            };
            if state.tree[cursor].deprel != CONJ || state.focus_has(|l| Family::Subject.includes(l)) {
                break;
            }
            state.check_iterations(self.name(), iterations)?;
            iterations += 1;

            cursor = head;
            if let Some((candidate, relabel)) = conjunct_candidate(state.tree, cursor, focus) {
                state.tree.reparent(candidate, focus, relabel)?;
                let label = state.tree[candidate].deprel.clone();
                state.labels.push(&label);
                applied = true;
            }
        }

        Ok(applied)
    }
}

/// First child of `head` that can serve as the subject of `focus`, with its new label
fn conjunct_candidate(
    tree: &Tree,
    head: NodeId,
    focus: NodeId,
) -> Option<(NodeId, Option<&'static str>)> {
    let children = tree.children(head);
    let is_but = children
        .iter()
        .any(|&c| tree[c].deprel == CC && tree[c].form == "but");
    let other_conj_exists = children
        .iter()
        .any(|&c| c != focus && tree[c].deprel == CONJ);
    let head_has_subject = children
        .iter()
        .any(|&c| Family::Subject.matches(&tree[c].deprel));

    children.iter().copied().find_map(|c| {
        let label = tree[c].deprel.as_str();
        let is_subject = Family::Subject.includes(label);
        let is_object = Family::Object.includes(label);
        let is_other_conj = label == CONJ && c != focus;

        if !is_but && is_subject {
            Some((c, None))
        } else if !is_but && !head_has_subject && is_object {
            Some((c, Some(DOWNWARD_SUBJECT)))
        } else if is_but
            && other_conj_exists
            && is_other_conj
            && !is_subject
            && !tree.is_ancestor(c, focus)
        {
            Some((c, Some(DOWNWARD_SUBJECT)))
        } else if is_but && !other_conj_exists && is_subject {
            Some((c, None))
        } else {
            None
        }
    })
}

/// Read a clausal complement as the missing object or subject
///
/// In "structured retrieval improves answer ranking" the parser labels
/// "ranking" `xcomp`; it plays the object role for extraction. Objects are
/// filled first, then subjects.
pub struct ComplementAsArgument;

impl Rule for ComplementAsArgument {
    fn name(&self) -> &'static str {
        "complement_as_argument"
    }

    fn apply(&self, state: &mut RuleState<'_>) -> Result<bool, RewriteError> {
        let mut applied = false;

        for (source, family) in COMPLEMENT_MOVES {
            if state.focus_has(|l| family.matches(l)) {
                continue;
            }
            let complement = state
                .tree
                .children(state.focus)
                .iter()
                .copied()
                .find(|&c| state.tree[c].deprel.contains(source));

            if let Some(child) = complement {
                let target = family.bucket();
                state.tree[child].deprel = target.to_string();
                state.labels.replace_all(source, target);
                applied = true;
            }
        }

        state.labels.canonicalize();
        Ok(applied)
    }
}

/// Read a direct "in" preposition as the object when there is none
///
/// "matrix co-factorization ... improves in predicting individual decisions"
pub struct PrepInAsObject;

impl Rule for PrepInAsObject {
    fn name(&self) -> &'static str {
        "prep_in_as_object"
    }

    fn apply(&self, state: &mut RuleState<'_>) -> Result<bool, RewriteError> {
        let mut targets = Vec::new();
        if !state.focus_has(|l| Family::Object.matches(l)) {
            targets = state
                .focus_children()
                .into_iter()
                .filter(|&c| state.tree[c].deprel.contains(PREP) && state.tree[c].form == "in")
                .collect();
        }

        for &target in &targets {
            state.tree[target].deprel = OBJ.to_string();
        }
        if !targets.is_empty() {
            state.labels.replace_all(PREP, OBJ);
        }

        state.labels.canonicalize();
        Ok(!targets.is_empty())
    }
}

/// Lift prepositions and modifier clauses buried in an argument onto the focus
///
/// "the proposed method improves the performance by 2.9": the parser hangs
/// "by" under "performance", which makes the object too large. Matching
/// descendants of every subject or object child become siblings of it.
pub struct HoistGrandchildren;

impl Rule for HoistGrandchildren {
    fn name(&self) -> &'static str {
        "hoist_grandchildren"
    }

    fn apply(&self, state: &mut RuleState<'_>) -> Result<bool, RewriteError> {
        let focus = state.focus;
        let arguments: Vec<NodeId> = state
            .focus_children()
            .into_iter()
            .filter(|&c| {
                let label = &state.tree[c].deprel;
                Family::Object.matches(label) || Family::Subject.matches(label)
            })
            .collect();

        let mut applied = false;
        for argument in arguments {
            for (deprel, form, target) in HOIST_PATTERNS {
                let mut iterations = 0;
                while let Some(found) = find_below(state.tree, argument, deprel, form) {
                    state.check_iterations(self.name(), iterations)?;
                    iterations += 1;

                    state.tree.reparent(found, focus, Some(target))?;
                    state.labels.push(target);
                    applied = true;
                }
            }
        }

        Ok(applied)
    }
}

/// First pre-order match strictly below `node`
fn find_below(tree: &Tree, node: NodeId, deprel: &str, form: Option<&str>) -> Option<NodeId> {
    tree.children(node)
        .iter()
        .find_map(|&child| tree.find_first(child, Some(deprel), form))
}
