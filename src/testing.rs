//! Tree builders shared by unit tests

use crate::tree::{Node, NodeId, Tree};

/// Build a tree from `(form, pos, deprel, head)` rows
///
/// `head` indexes into `rows`; `None` marks the root. Row `i` gets word
/// index `i + 1` and node id `i`, children are attached in row order and the
/// left/right counts are derived from the heads.
pub(crate) fn tree_from_rows(rows: &[(&str, &str, &str, Option<usize>)]) -> Tree {
    let mut tree = Tree::new();
    for (i, &(form, pos, deprel, _)) in rows.iter().enumerate() {
        let n_lefts = rows.iter().take(i).filter(|r| r.3 == Some(i)).count();
        let n_rights = rows.iter().skip(i + 1).filter(|r| r.3 == Some(i)).count();
        tree.add_node(Node::new(i + 1, form, pos, deprel).with_counts(n_lefts, n_rights));
    }
    for (i, &(_, _, _, head)) in rows.iter().enumerate() {
        match head {
            Some(head) => tree.attach(i, head).unwrap(),
            None => tree.set_root(i).unwrap(),
        }
    }
    tree
}

/// Id of the first node (in pre-order from the root) with the given form
pub(crate) fn id_of(tree: &Tree, form: &str) -> NodeId {
    tree.find_first(tree.root().unwrap(), None, Some(form))
        .unwrap_or_else(|| panic!("no node with form {form:?}"))
}

/// Forms of the children of `id`, in order
pub(crate) fn child_forms(tree: &Tree, id: NodeId) -> Vec<&str> {
    tree.children(id)
        .iter()
        .map(|&child| tree[child].form.as_str())
        .collect()
}
