//! Arena-backed dependency tree
//!
//! Nodes live in a flat vector and refer to each other by `NodeId`. Head and
//! children links are private to this module: every mutation goes through a
//! `Tree` method that updates both sides of the link in one step, so a node
//! is always listed by exactly the parent it names as its head.

use crate::error::TreeError;
use rustc_hash::FxHashMap;
use std::fmt::Write as _;
use std::ops::{Index, IndexMut};
use tracing::trace;

/// Unique identifier for a node
pub type NodeId = usize;

/// A token (or synthetic constituent) in a dependency tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    id: NodeId,
    pub form: String,
    pub pos: String,
    pub deprel: String,
    /// Position of the token in the original sentence
    pub index: usize,
    pub n_lefts: usize,
    pub n_rights: usize,
    /// Hidden from presentation; no rule reads it
    pub suppressed: bool,
    head: Option<NodeId>,
    children: Vec<NodeId>,
}

impl Node {
    /// Create a new unattached node with the given attributes
    pub fn new(index: usize, form: &str, pos: &str, deprel: &str) -> Self {
        Self {
            id: 0,
            form: form.to_string(),
            pos: pos.to_string(),
            deprel: deprel.to_string(),
            index,
            n_lefts: 0,
            n_rights: 0,
            suppressed: false,
            head: None,
            children: Vec::new(),
        }
    }

    /// Set the left/right child counts reported by the parser
    pub fn with_counts(mut self, n_lefts: usize, n_rights: usize) -> Self {
        self.n_lefts = n_lefts;
        self.n_rights = n_rights;
        self
    }

    /// Slot of this node in its tree, fixed by `Tree::add_node`
    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn head(&self) -> Option<NodeId> {
        self.head
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    /// A node is a leaf iff the parser saw no dependents on either side
    pub fn is_leaf(&self) -> bool {
        self.n_lefts + self.n_rights == 0
    }
}

/// A dependency tree (sentence)
#[derive(Debug, Clone, Default)]
pub struct Tree {
    nodes: Vec<Node>,
    root_id: Option<NodeId>,
    pub sentence_text: Option<String>,
    pub metadata: FxHashMap<String, String>,
}

impl Tree {
    /// Create a new empty tree
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty tree carrying sentence-level metadata
    pub fn with_metadata(
        sentence_text: Option<String>,
        metadata: FxHashMap<String, String>,
    ) -> Self {
        Self {
            nodes: Vec::new(),
            root_id: None,
            sentence_text,
            metadata,
        }
    }

    /// Add an unattached node to the arena and return its id
    pub fn add_node(&mut self, mut node: Node) -> NodeId {
        let id = self.nodes.len();
        node.id = id;
        node.head = None;
        node.children.clear();
        self.nodes.push(node);
        id
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn root(&self) -> Option<NodeId> {
        self.root_id
    }

    /// Mark an unattached node as the root of the tree
    pub fn set_root(&mut self, id: NodeId) -> Result<(), TreeError> {
        self.check(id)?;
        if self.nodes[id].head.is_some() {
            return Err(TreeError::AlreadyAttached(id));
        }
        self.root_id = Some(id);
        Ok(())
    }

    /// Get a node by ID
    pub fn get_node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id)
    }

    /// All nodes in arena order, attached or not
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.iter()
    }

    pub fn head(&self, id: NodeId) -> Option<NodeId> {
        self.nodes.get(id).and_then(|node| node.head)
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.nodes
            .get(id)
            .map(|node| node.children.as_slice())
            .unwrap_or(&[])
    }

    /// Attach an unattached node as the last child of `parent`
    ///
    /// Used while building a tree from parser output.
    pub fn attach(&mut self, child: NodeId, parent: NodeId) -> Result<(), TreeError> {
        self.check(child)?;
        self.check(parent)?;
        if self.nodes[child].head.is_some() || self.root_id == Some(child) {
            return Err(TreeError::AlreadyAttached(child));
        }
        if child == parent || self.is_ancestor(child, parent) {
            return Err(TreeError::Cycle {
                node: child,
                parent,
            });
        }
        self.link(child, parent);
        Ok(())
    }

    /// Move `node` (with its subtree) under `new_parent`, optionally relabeling it
    ///
    /// The node is removed from its old parent's children, appended to the new
    /// parent's children and its head updated, as a single operation: either
    /// all of it happens or, on error, none of it.
    pub fn reparent(
        &mut self,
        node: NodeId,
        new_parent: NodeId,
        new_label: Option<&str>,
    ) -> Result<(), TreeError> {
        self.check(node)?;
        self.check(new_parent)?;
        if self.root_id == Some(node) {
            return Err(TreeError::DetachRoot(node));
        }
        if node == new_parent || self.is_ancestor(node, new_parent) {
            return Err(TreeError::Cycle {
                node,
                parent: new_parent,
            });
        }

        let old_parent = self.unlink(node)?;
        self.link(node, new_parent);
        if let Some(label) = new_label {
            self.nodes[node].deprel = label.to_string();
        }

        trace!(node, ?old_parent, new_parent, deprel = %self.nodes[node].deprel, "reparent");
        Ok(())
    }

    /// Remove `node` and its subtree from the tree
    pub fn detach(&mut self, node: NodeId) -> Result<(), TreeError> {
        self.check(node)?;
        if self.root_id == Some(node) {
            return Err(TreeError::DetachRoot(node));
        }
        match self.unlink(node)? {
            Some(old_parent) => {
                trace!(node, old_parent, "detach");
                Ok(())
            }
            None => Err(TreeError::NoHead(node)),
        }
    }

    /// Reverse the edge between `child` and its head
    ///
    /// `child` takes its head's place among the grandparent's children (or
    /// becomes the root), and the former head becomes `child`'s last child.
    /// Returns the former head.
    pub fn invert(&mut self, child: NodeId) -> Result<NodeId, TreeError> {
        self.check(child)?;
        let head = self.nodes[child].head.ok_or(TreeError::NoHead(child))?;
        let slot = self.position_in(head, child)?;
        let grandparent = self.nodes[head].head;
        let grand_slot = match grandparent {
            Some(grand) => Some((grand, self.position_in(grand, head)?)),
            None => None,
        };

        self.nodes[head].children.remove(slot);
        match grand_slot {
            Some((grand, pos)) => {
                self.nodes[grand].children[pos] = child;
                self.nodes[child].head = Some(grand);
            }
            None => {
                self.nodes[child].head = None;
                if self.root_id == Some(head) {
                    self.root_id = Some(child);
                }
            }
        }
        self.link(head, child);

        trace!(child, head, ?grandparent, "invert");
        Ok(head)
    }

    /// True if `id` is the root or hangs below it
    pub fn is_reachable(&self, id: NodeId) -> bool {
        self.root_id
            .is_some_and(|root| root == id || self.is_ancestor(root, id))
    }

    /// True if `ancestor` lies strictly above `node` on its head chain
    pub fn is_ancestor(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut current = self.head(node);
        // Head chains are acyclic; the bound only guards against misuse
        for _ in 0..self.nodes.len() {
            match current {
                Some(id) if id == ancestor => return true,
                Some(id) => current = self.head(id),
                None => return false,
            }
        }
        false
    }

    /// First node in pre-order under (and including) `start` matching the filters
    ///
    /// With both filters, `deprel` must be a substring of the node's label and
    /// `form` must equal its text. A single filter applies alone: substring
    /// for labels, so `"subj"` finds every subject variant, exact equality for
    /// text. Empty filters count as absent; with no filter nothing matches.
    pub fn find_first(
        &self,
        start: NodeId,
        deprel: Option<&str>,
        form: Option<&str>,
    ) -> Option<NodeId> {
        let deprel = deprel.filter(|d| !d.is_empty());
        let form = form.filter(|f| !f.is_empty());
        if deprel.is_none() && form.is_none() {
            return None;
        }

        let mut stack = vec![start];
        while let Some(id) = stack.pop() {
            let node = self.nodes.get(id)?;
            let hit = match (deprel, form) {
                (Some(d), Some(f)) => node.deprel.contains(d) && node.form == f,
                (Some(d), None) => node.deprel.contains(d),
                (None, Some(f)) => node.form == f,
                (None, None) => false,
            };
            if hit {
                return Some(id);
            }
            stack.extend(node.children.iter().rev().copied());
        }
        None
    }

    /// Gather `members` under one parent, synthesizing it unless `under` is given
    ///
    /// A synthesized parent takes the first member's label, the floor of the
    /// members' mean index and the sums of their child counts. Members become
    /// its children in input order. Returns the parent.
    pub fn merge_nodes(
        &mut self,
        members: &[NodeId],
        under: Option<NodeId>,
    ) -> Result<NodeId, TreeError> {
        let Some(&first) = members.first() else {
            return Err(TreeError::EmptyMerge);
        };
        for &member in members {
            self.check(member)?;
            if self.root_id == Some(member) {
                return Err(TreeError::DetachRoot(member));
            }
        }
        if let Some(parent) = under {
            self.check(parent)?;
            for &member in members {
                if member == parent || self.is_ancestor(member, parent) {
                    return Err(TreeError::Cycle {
                        node: member,
                        parent,
                    });
                }
            }
        }

        let parent = match under {
            Some(parent) => parent,
            None => {
                let index_sum: usize = members.iter().map(|&m| self.nodes[m].index).sum();
                let n_lefts = members.iter().map(|&m| self.nodes[m].n_lefts).sum();
                let n_rights = members.iter().map(|&m| self.nodes[m].n_rights).sum();
                let deprel = self.nodes[first].deprel.clone();
                let node = Node::new(index_sum / members.len(), "", "", &deprel)
                    .with_counts(n_lefts, n_rights);
                self.add_node(node)
            }
        };

        for &member in members {
            self.reparent(member, parent, None)?;
        }

        trace!(parent, ?members, "merge");
        Ok(parent)
    }

    /// Check the head/children links of everything reachable from the root
    pub fn validate(&self) -> Result<(), TreeError> {
        let root = self.root_id.ok_or(TreeError::NoRoot)?;
        self.check(root)?;
        if let Some(head) = self.nodes[root].head {
            return Err(TreeError::HeadMismatch { node: root, head });
        }

        let mut seen = vec![false; self.nodes.len()];
        seen[root] = true;
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            for &child in &self.nodes[id].children {
                self.check(child)?;
                if self.nodes[child].head != Some(id) {
                    return Err(TreeError::HeadMismatch {
                        node: child,
                        head: id,
                    });
                }
                if std::mem::replace(&mut seen[child], true) {
                    return Err(TreeError::MultipleParents(child));
                }
                stack.push(child);
            }
        }
        Ok(())
    }

    /// Render the subtree at `id` as `(deprel/form/pos child ...)`
    pub fn to_bracketed(&self, id: NodeId) -> String {
        let mut out = String::new();
        self.write_bracketed(id, &mut out);
        out
    }

    fn write_bracketed(&self, id: NodeId, out: &mut String) {
        let Some(node) = self.nodes.get(id) else {
            return;
        };
        if node.children.is_empty() {
            let _ = write!(out, "{}/{}/{}", node.deprel, node.form, node.pos);
            return;
        }
        let _ = write!(out, "({}/{}/{}", node.deprel, node.form, node.pos);
        for &child in &node.children {
            out.push(' ');
            self.write_bracketed(child, out);
        }
        out.push(')');
    }

    fn check(&self, id: NodeId) -> Result<(), TreeError> {
        if id < self.nodes.len() {
            Ok(())
        } else {
            Err(TreeError::UnknownNode(id))
        }
    }

    fn position_in(&self, parent: NodeId, child: NodeId) -> Result<usize, TreeError> {
        self.nodes[parent]
            .children
            .iter()
            .position(|&c| c == child)
            .ok_or(TreeError::HeadMismatch {
                node: child,
                head: parent,
            })
    }

    /// Remove `node` from its head's children, returning the old head
    fn unlink(&mut self, node: NodeId) -> Result<Option<NodeId>, TreeError> {
        let Some(head) = self.nodes[node].head else {
            return Ok(None);
        };
        let pos = self.position_in(head, node)?;
        self.nodes[head].children.remove(pos);
        self.nodes[node].head = None;
        Ok(Some(head))
    }

    fn link(&mut self, node: NodeId, parent: NodeId) {
        self.nodes[node].head = Some(parent);
        self.nodes[parent].children.push(node);
    }
}

impl Index<NodeId> for Tree {
    type Output = Node;

    fn index(&self, id: NodeId) -> &Node {
        &self.nodes[id]
    }
}

impl IndexMut<NodeId> for Tree {
    fn index_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// 0: improves (VERB, root)
    ///   ├─ 1: method (NOUN, nsubj)
    ///   │    └─ 3: by (ADP, prep)
    ///   │         └─ 4: way (NOUN, pobj)
    ///   └─ 2: accuracy (NOUN, dobj)
    ///        └─ 5: by (ADP, prep)
    fn create_test_tree() -> Tree {
        let mut tree = Tree::new();
        tree.add_node(Node::new(2, "improves", "VERB", "ROOT"));
        tree.add_node(Node::new(1, "method", "NOUN", "nsubj"));
        tree.add_node(Node::new(3, "accuracy", "NOUN", "dobj"));
        tree.add_node(Node::new(4, "by", "ADP", "prep"));
        tree.add_node(Node::new(5, "way", "NOUN", "pobj"));
        tree.add_node(Node::new(6, "by", "ADP", "prep"));

        tree.set_root(0).unwrap();
        tree.attach(1, 0).unwrap();
        tree.attach(2, 0).unwrap();
        tree.attach(3, 1).unwrap();
        tree.attach(4, 3).unwrap();
        tree.attach(5, 2).unwrap();
        tree
    }

    fn listing_parents(tree: &Tree, node: NodeId) -> Vec<NodeId> {
        tree.nodes()
            .filter(|n| n.children().contains(&node))
            .map(|n| n.id())
            .collect()
    }

    #[test]
    fn test_tree_creation() {
        let tree = create_test_tree();

        assert_eq!(tree.len(), 6);
        assert_eq!(tree.root(), Some(0));
        assert_eq!(tree.head(3), Some(1));
        assert_eq!(tree.children(0), &[1, 2]);
        assert!(tree.validate().is_ok());
    }

    #[test]
    fn test_attach_twice_is_rejected() {
        let mut tree = create_test_tree();
        assert_eq!(tree.attach(3, 0), Err(TreeError::AlreadyAttached(3)));
    }

    #[test]
    fn test_reparent_updates_both_sides() {
        let mut tree = create_test_tree();
        tree.reparent(3, 0, Some("prep")).unwrap();

        assert_eq!(tree.head(3), Some(0));
        assert_eq!(listing_parents(&tree, 3), vec![0]);
        assert_eq!(tree.children(0), &[1, 2, 3]);
        assert!(tree.children(1).is_empty());
        // subtree moves along
        assert_eq!(tree.head(4), Some(3));
        assert!(tree.validate().is_ok());
    }

    #[test]
    fn test_reparent_relabels() {
        let mut tree = create_test_tree();
        tree.reparent(4, 0, Some("obj")).unwrap();
        assert_eq!(tree[4].deprel, "obj");
    }

    #[test]
    fn test_reparent_rejects_cycle() {
        let mut tree = create_test_tree();
        let before = tree.to_bracketed(0);

        assert_eq!(
            tree.reparent(1, 4, None),
            Err(TreeError::Cycle { node: 1, parent: 4 })
        );
        assert_eq!(
            tree.reparent(1, 1, None),
            Err(TreeError::Cycle { node: 1, parent: 1 })
        );
        assert_eq!(tree.to_bracketed(0), before);
    }

    #[test]
    fn test_reparent_root_is_rejected() {
        let mut tree = create_test_tree();
        let extra = tree.add_node(Node::new(9, "x", "X", "dep"));
        assert_eq!(tree.reparent(0, extra, None), Err(TreeError::DetachRoot(0)));
    }

    #[test]
    fn test_detach() {
        let mut tree = create_test_tree();
        tree.detach(3).unwrap();

        assert_eq!(tree.head(3), None);
        assert!(listing_parents(&tree, 3).is_empty());
        assert_eq!(tree.find_first(0, None, Some("way")), None);
        assert_eq!(tree.detach(3), Err(TreeError::NoHead(3)));
        assert_eq!(tree.detach(0), Err(TreeError::DetachRoot(0)));
        assert!(tree.validate().is_ok());
    }

    #[test]
    fn test_invert_inside_tree() {
        let mut tree = create_test_tree();
        // by(3) takes method(1)'s slot under improves(0)
        let old_head = tree.invert(3).unwrap();

        assert_eq!(old_head, 1);
        assert_eq!(tree.children(0), &[3, 2]);
        assert_eq!(tree.head(3), Some(0));
        assert_eq!(tree.children(3), &[4, 1]);
        assert_eq!(tree.head(1), Some(3));
        assert!(tree.validate().is_ok());
    }

    #[test]
    fn test_invert_at_root() {
        let mut tree = create_test_tree();
        tree.invert(2).unwrap();

        assert_eq!(tree.root(), Some(2));
        assert_eq!(tree.head(2), None);
        assert_eq!(tree.head(0), Some(2));
        assert_eq!(tree.children(2), &[5, 0]);
        assert!(tree.validate().is_ok());
    }

    #[test]
    fn test_invert_without_head() {
        let mut tree = create_test_tree();
        assert_eq!(tree.invert(0), Err(TreeError::NoHead(0)));
    }

    #[test]
    fn test_is_ancestor() {
        let tree = create_test_tree();
        assert!(tree.is_ancestor(0, 4));
        assert!(tree.is_ancestor(1, 4));
        assert!(!tree.is_ancestor(2, 4));
        assert!(!tree.is_ancestor(4, 4));
    }

    #[test]
    fn test_is_reachable() {
        let mut tree = create_test_tree();
        assert!(tree.is_reachable(0));
        assert!(tree.is_reachable(4));
        assert!(!tree.is_reachable(6));

        tree.detach(3).unwrap();
        assert!(!tree.is_reachable(3));
        assert!(!tree.is_reachable(4));
        assert!(tree.is_reachable(5));
    }

    #[test]
    fn test_node_id_matches_slot() {
        let tree = create_test_tree();
        for (slot, node) in tree.nodes().enumerate() {
            assert_eq!(node.id(), slot);
            assert_eq!(tree[slot].id(), slot);
        }
    }

    #[test]
    fn test_find_first_is_leftmost_preorder() {
        let tree = create_test_tree();
        // "by" under method (depth 2) comes before "by" under accuracy (depth 2, later sibling)
        assert_eq!(tree.find_first(0, Some("prep"), Some("by")), Some(3));
        assert_eq!(tree.find_first(2, Some("prep"), Some("by")), Some(5));
    }

    #[test]
    fn test_find_first_prefers_earlier_subtree_over_shallower_match() {
        let mut tree = create_test_tree();
        // a shallower "pobj" in a later subtree must not win over a deep one earlier
        let shallow = tree.add_node(Node::new(7, "them", "PRON", "pobj"));
        tree.attach(shallow, 2).unwrap();
        assert_eq!(tree.find_first(0, Some("pobj"), None), Some(4));
    }

    #[test]
    fn test_find_first_filters() {
        let tree = create_test_tree();

        // label filter is a substring match
        assert_eq!(tree.find_first(0, Some("subj"), None), Some(1));
        assert_eq!(tree.find_first(0, Some("obj"), None), Some(4));
        // text filter is exact
        assert_eq!(tree.find_first(0, None, Some("accuracy")), Some(2));
        assert_eq!(tree.find_first(0, None, Some("accur")), None);
        // the start node itself is tested first
        assert_eq!(tree.find_first(1, Some("subj"), None), Some(1));
        // both filters must hold
        assert_eq!(tree.find_first(0, Some("dobj"), Some("by")), None);
        // no filter, no match
        assert_eq!(tree.find_first(0, None, None), None);
        assert_eq!(tree.find_first(0, Some(""), Some("")), None);
    }

    #[test]
    fn test_merge_nodes_synthesizes_parent() {
        let mut tree = Tree::new();
        let a = tree.add_node(Node::new(2, "method", "NOUN", "nsubj").with_counts(1, 0));
        let b = tree.add_node(Node::new(6, "ORCLUS", "PROPN", "nsubj").with_counts(0, 1));

        let parent = tree.merge_nodes(&[a, b], None).unwrap();

        assert_eq!(tree[parent].index, 4);
        assert_eq!(tree[parent].n_lefts, 1);
        assert_eq!(tree[parent].n_rights, 1);
        assert_eq!(tree[parent].deprel, "nsubj");
        assert_eq!(tree.children(parent), &[a, b]);
        assert_eq!(tree.head(a), Some(parent));
        assert_eq!(tree.head(b), Some(parent));
    }

    #[test]
    fn test_merge_nodes_floor_of_mean() {
        let mut tree = Tree::new();
        let a = tree.add_node(Node::new(1, "a", "NOUN", "dobj"));
        let b = tree.add_node(Node::new(2, "b", "NOUN", "pobj"));
        let parent = tree.merge_nodes(&[a, b], None).unwrap();
        assert_eq!(tree[parent].index, 1);
        assert_eq!(tree[parent].deprel, "dobj");
    }

    #[test]
    fn test_merge_nodes_under_existing_parent() {
        let mut tree = create_test_tree();
        let parent = tree.merge_nodes(&[5, 4], Some(1)).unwrap();

        assert_eq!(parent, 1);
        assert_eq!(tree.children(1), &[3, 5, 4]);
        assert_eq!(tree.len(), 6);
        assert!(tree.validate().is_ok());
    }

    #[test]
    fn test_merge_nodes_empty() {
        let mut tree = create_test_tree();
        assert_eq!(tree.merge_nodes(&[], None), Err(TreeError::EmptyMerge));
    }

    #[test]
    fn test_validate_detects_head_mismatch() {
        let mut tree = create_test_tree();
        tree.nodes[4].head = Some(0);
        assert_eq!(
            tree.validate(),
            Err(TreeError::HeadMismatch { node: 4, head: 3 })
        );
    }

    #[test]
    fn test_validate_detects_shared_child() {
        let mut tree = create_test_tree();
        tree.nodes[2].children.push(4);
        tree.nodes[4].head = Some(2);
        // 4 is now listed by both 3 and 2; one of them disagrees with its head
        assert!(tree.validate().is_err());
    }

    #[test]
    fn test_to_bracketed() {
        let tree = create_test_tree();
        assert_eq!(
            tree.to_bracketed(0),
            "(ROOT/improves/VERB (nsubj/method/NOUN (prep/by/ADP pobj/way/NOUN)) \
             (dobj/accuracy/NOUN prep/by/ADP))"
        );
    }
}
