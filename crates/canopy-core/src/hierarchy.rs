#![forbid(unsafe_code)]

//! The arena-backed hierarchy model.
//!
//! A [`Hierarchy`] is built once from a declarative [`NodeSpec`] tree and
//! then only ever changes visibility state. Nodes live in a flat arena and
//! are addressed by [`NodeId`] (the arena index, assigned at build and
//! stable for the node's lifetime — the scene graph relies on this to track
//! elements across frames). Each node keeps a single `children` list plus an
//! `expanded` flag; "visible children" is a view over that pair, so children
//! can never be half-visible or stored twice.
//!
//! # Example
//!
//! ```
//! use canopy_core::hierarchy::{Hierarchy, NodeSpec};
//!
//! let spec = NodeSpec::new("root")
//!     .child(NodeSpec::new("a").child(NodeSpec::new("a1")))
//!     .child(NodeSpec::new("b"));
//! let mut tree = Hierarchy::build(&spec).unwrap();
//!
//! // Depth >= 1 starts collapsed: only root and its children are visible.
//! assert_eq!(tree.visible_count(), 3);
//!
//! let a = tree.visible_children(Hierarchy::ROOT).next().unwrap();
//! tree.toggle(a);
//! assert_eq!(tree.visible_count(), 4);
//! ```

use std::collections::HashSet;
use std::fmt;
use std::rc::Rc;

// ---------------------------------------------------------------------------
// Input spec
// ---------------------------------------------------------------------------

/// Declarative input for a hierarchy: a name plus nested children.
///
/// Children are reference-counted so malformed inputs (a subtree attached in
/// two places) are representable and can be rejected by [`Hierarchy::build`]
/// instead of silently duplicating nodes.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NodeSpec {
    /// Display name.
    pub name: String,
    /// Child specs, in display order.
    #[cfg_attr(feature = "serde", serde(default))]
    pub children: Vec<Rc<NodeSpec>>,
}

impl NodeSpec {
    /// Create a leaf spec with the given name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            children: Vec::new(),
        }
    }

    /// Add a child spec (builder).
    #[must_use]
    pub fn child(mut self, node: NodeSpec) -> Self {
        self.children.push(Rc::new(node));
        self
    }

    /// Set children from a vec (builder).
    #[must_use]
    pub fn with_children(mut self, nodes: Vec<NodeSpec>) -> Self {
        self.children = nodes.into_iter().map(Rc::new).collect();
        self
    }
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Rejected input to [`Hierarchy::build`].
///
/// Construction validates that the spec is a proper single-rooted tree and
/// never yields a partially built hierarchy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MalformedInput {
    /// A node was found on its own ancestor path.
    Cycle {
        /// Name of the offending node.
        name: String,
    },
    /// A node is reachable by more than one path (shared subtree).
    SharedSubtree {
        /// Name of the offending node.
        name: String,
    },
}

impl fmt::Display for MalformedInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Cycle { name } => {
                write!(f, "node {name:?} is its own ancestor")
            }
            Self::SharedSubtree { name } => {
                write!(f, "node {name:?} is attached in more than one place")
            }
        }
    }
}

impl std::error::Error for MalformedInput {}

// ---------------------------------------------------------------------------
// Arena
// ---------------------------------------------------------------------------

/// Stable identity of a node: its arena index.
///
/// Assigned once at build time, never reused. Ids survive any sequence of
/// toggle or resize operations, which is what lets the scene reconciler
/// match elements across frames without misattribution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u32);

impl NodeId {
    /// Arena index of this id.
    #[inline]
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// One arena slot.
#[derive(Debug, Clone)]
pub struct Node {
    name: String,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    depth: u32,
    expanded: bool,
}

impl Node {
    /// Display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Parent id, `None` for the root.
    #[must_use]
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// All children, regardless of visibility.
    #[must_use]
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    /// Distance from the root (root is 0).
    #[must_use]
    pub fn depth(&self) -> u32 {
        self.depth
    }

    /// Whether this node's children are currently visible.
    #[must_use]
    pub fn is_expanded(&self) -> bool {
        self.expanded
    }

    /// Whether this node has no children at all.
    #[must_use]
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Hierarchy
// ---------------------------------------------------------------------------

/// A single-rooted tree with per-node expand/collapse state.
#[derive(Debug, Clone)]
pub struct Hierarchy {
    nodes: Vec<Node>,
}

impl Hierarchy {
    /// Id of the root node. Always present and never collapsed away.
    pub const ROOT: NodeId = NodeId(0);

    /// Build a hierarchy from a spec, then collapse everything below the
    /// root's direct children (the initial-state policy: depth >= 1 starts
    /// collapsed, the root stays expanded).
    ///
    /// # Errors
    ///
    /// Returns [`MalformedInput`] if the spec is not a proper tree: a node
    /// appearing on its own ancestor path ([`MalformedInput::Cycle`]) or
    /// reachable by two distinct paths ([`MalformedInput::SharedSubtree`]).
    pub fn build(spec: &NodeSpec) -> Result<Self, MalformedInput> {
        let mut nodes = vec![Node {
            name: spec.name.clone(),
            parent: None,
            children: Vec::new(),
            depth: 0,
            expanded: true,
        }];

        let root_ptr: *const NodeSpec = spec;
        let mut seen: HashSet<*const NodeSpec> = HashSet::new();
        seen.insert(root_ptr);
        let mut path = vec![root_ptr];

        Self::adopt_children(Self::ROOT, spec, &mut nodes, &mut seen, &mut path)?;

        let mut hierarchy = Self { nodes };
        hierarchy.collapse_below_root();
        Ok(hierarchy)
    }

    fn adopt_children(
        parent: NodeId,
        spec: &NodeSpec,
        nodes: &mut Vec<Node>,
        seen: &mut HashSet<*const NodeSpec>,
        path: &mut Vec<*const NodeSpec>,
    ) -> Result<(), MalformedInput> {
        for child in &spec.children {
            let ptr = Rc::as_ptr(child);
            if path.contains(&ptr) {
                return Err(MalformedInput::Cycle {
                    name: child.name.clone(),
                });
            }
            if !seen.insert(ptr) {
                return Err(MalformedInput::SharedSubtree {
                    name: child.name.clone(),
                });
            }

            let id = NodeId(nodes.len() as u32);
            let depth = nodes[parent.index()].depth + 1;
            nodes.push(Node {
                name: child.name.clone(),
                parent: Some(parent),
                children: Vec::new(),
                depth,
                expanded: true,
            });
            nodes[parent.index()].children.push(id);

            path.push(ptr);
            Self::adopt_children(id, child, nodes, seen, path)?;
            path.pop();
        }
        Ok(())
    }

    /// Collapse every non-root node that has children. The root keeps its
    /// children visible.
    pub fn collapse_below_root(&mut self) {
        for node in &mut self.nodes[1..] {
            if !node.children.is_empty() {
                node.expanded = false;
            }
        }
    }

    /// Expand every node.
    pub fn expand_all(&mut self) {
        for node in &mut self.nodes {
            node.expanded = true;
        }
    }

    /// First node with the given name, in arena (build) order.
    #[must_use]
    pub fn find(&self, name: &str) -> Option<NodeId> {
        self.nodes
            .iter()
            .position(|n| n.name == name)
            .map(|index| NodeId(index as u32))
    }

    /// Total number of nodes, visible or not.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// A hierarchy always has at least its root.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Look up a node.
    #[must_use]
    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.index())
    }

    /// Whether `id` names a node in this hierarchy.
    #[must_use]
    pub fn contains(&self, id: NodeId) -> bool {
        id.index() < self.nodes.len()
    }

    /// Whether the node has children that are currently suppressed.
    #[must_use]
    pub fn has_hidden_children(&self, id: NodeId) -> bool {
        self.get(id)
            .is_some_and(|n| !n.children.is_empty() && !n.expanded)
    }

    /// Flip the node's expanded state.
    ///
    /// Toggling a true leaf is a no-op and returns `false`. This mutates
    /// visibility only; re-layout and reconciliation are the caller's job.
    pub fn toggle(&mut self, id: NodeId) -> bool {
        match self.nodes.get_mut(id.index()) {
            Some(node) if !node.children.is_empty() => {
                node.expanded = !node.expanded;
                true
            }
            _ => false,
        }
    }

    /// The node's children if it is expanded, otherwise nothing.
    pub fn visible_children(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.get(id)
            .filter(|n| n.expanded)
            .map(|n| n.children.as_slice())
            .unwrap_or_default()
            .iter()
            .copied()
    }

    /// Pre-order traversal of the visible set, root first.
    #[must_use]
    pub fn visible_nodes(&self) -> VisibleNodes<'_> {
        VisibleNodes {
            hierarchy: self,
            stack: vec![Self::ROOT],
        }
    }

    /// Number of currently visible nodes.
    #[must_use]
    pub fn visible_count(&self) -> usize {
        self.visible_nodes().count()
    }
}

/// Iterator over the visible set in pre-order. See
/// [`Hierarchy::visible_nodes`].
#[derive(Debug)]
pub struct VisibleNodes<'a> {
    hierarchy: &'a Hierarchy,
    stack: Vec<NodeId>,
}

impl Iterator for VisibleNodes<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let id = self.stack.pop()?;
        let node = &self.hierarchy.nodes[id.index()];
        if node.expanded {
            // Reversed so the first child is popped first.
            self.stack.extend(node.children.iter().rev().copied());
        }
        Some(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn sample_spec() -> NodeSpec {
        NodeSpec::new("root")
            .child(
                NodeSpec::new("a")
                    .child(NodeSpec::new("a1"))
                    .child(NodeSpec::new("a2")),
            )
            .child(NodeSpec::new("b"))
    }

    fn child_of(tree: &Hierarchy, parent: NodeId, index: usize) -> NodeId {
        tree.get(parent).unwrap().children()[index]
    }

    #[test]
    fn build_assigns_root_first() {
        let tree = Hierarchy::build(&sample_spec()).unwrap();
        assert_eq!(tree.get(Hierarchy::ROOT).unwrap().name(), "root");
        assert_eq!(tree.get(Hierarchy::ROOT).unwrap().depth(), 0);
        assert!(tree.get(Hierarchy::ROOT).unwrap().parent().is_none());
        assert_eq!(tree.len(), 5);
    }

    #[test]
    fn build_collapses_below_root() {
        let tree = Hierarchy::build(&sample_spec()).unwrap();
        // root, a, b visible; a1/a2 hidden behind collapsed "a".
        assert_eq!(tree.visible_count(), 3);
        let a = child_of(&tree, Hierarchy::ROOT, 0);
        assert!(!tree.get(a).unwrap().is_expanded());
        assert!(tree.has_hidden_children(a));
    }

    #[test]
    fn build_sets_depth_and_parent_links() {
        let tree = Hierarchy::build(&sample_spec()).unwrap();
        let a = child_of(&tree, Hierarchy::ROOT, 0);
        let a1 = child_of(&tree, a, 0);
        assert_eq!(tree.get(a).unwrap().depth(), 1);
        assert_eq!(tree.get(a1).unwrap().depth(), 2);
        assert_eq!(tree.get(a1).unwrap().parent(), Some(a));
    }

    #[test]
    fn build_rejects_shared_subtree() {
        let shared = Rc::new(NodeSpec::new("dup"));
        let mut spec = NodeSpec::new("root");
        spec.children.push(shared.clone());
        spec.children.push(shared);

        let err = Hierarchy::build(&spec).unwrap_err();
        assert_eq!(
            err,
            MalformedInput::SharedSubtree {
                name: "dup".into()
            }
        );
    }

    #[test]
    fn build_rejects_subtree_shared_across_levels() {
        let shared = Rc::new(NodeSpec::new("dup"));
        let mut mid = NodeSpec::new("mid");
        mid.children.push(shared.clone());
        let mut spec = NodeSpec::new("root");
        spec.children.push(Rc::new(mid));
        spec.children.push(shared);

        assert!(Hierarchy::build(&spec).is_err());
    }

    #[test]
    fn malformed_input_display() {
        let err = MalformedInput::Cycle { name: "x".into() };
        assert!(err.to_string().contains("ancestor"));
        let err = MalformedInput::SharedSubtree { name: "x".into() };
        assert!(err.to_string().contains("more than one place"));
    }

    #[test]
    fn toggle_is_involution() {
        let mut tree = Hierarchy::build(&sample_spec()).unwrap();
        let a = child_of(&tree, Hierarchy::ROOT, 0);

        let before = tree.visible_nodes().collect::<Vec<_>>();
        assert!(tree.toggle(a));
        assert_eq!(tree.visible_count(), 5);
        assert!(tree.toggle(a));
        assert_eq!(tree.visible_nodes().collect::<Vec<_>>(), before);
    }

    #[test]
    fn toggle_leaf_is_noop() {
        let mut tree = Hierarchy::build(&sample_spec()).unwrap();
        let b = child_of(&tree, Hierarchy::ROOT, 1);
        assert!(tree.get(b).unwrap().is_leaf());

        let before = tree.visible_count();
        assert!(!tree.toggle(b));
        assert_eq!(tree.visible_count(), before);
        assert!(!tree.get(b).unwrap().is_expanded() || tree.get(b).unwrap().is_leaf());
    }

    #[test]
    fn toggle_unknown_id_is_noop() {
        let mut tree = Hierarchy::build(&sample_spec()).unwrap();
        assert!(!tree.toggle(NodeId(99)));
    }

    #[test]
    fn toggle_root_collapses_to_single_node() {
        let mut tree = Hierarchy::build(&sample_spec()).unwrap();
        assert!(tree.toggle(Hierarchy::ROOT));
        assert_eq!(tree.visible_count(), 1);
    }

    #[test]
    fn visible_nodes_preorder() {
        let mut tree = Hierarchy::build(&sample_spec()).unwrap();
        let a = child_of(&tree, Hierarchy::ROOT, 0);
        tree.toggle(a);

        let names: Vec<&str> = tree
            .visible_nodes()
            .map(|id| tree.get(id).unwrap().name())
            .collect();
        assert_eq!(names, ["root", "a", "a1", "a2", "b"]);
    }

    #[test]
    fn visible_children_of_collapsed_is_empty() {
        let tree = Hierarchy::build(&sample_spec()).unwrap();
        let a = child_of(&tree, Hierarchy::ROOT, 0);
        assert_eq!(tree.visible_children(a).count(), 0);
    }

    #[test]
    fn ids_stable_across_toggles() {
        let mut tree = Hierarchy::build(&sample_spec()).unwrap();
        let a = child_of(&tree, Hierarchy::ROOT, 0);
        let name_before = tree.get(a).unwrap().name().to_string();

        for _ in 0..7 {
            tree.toggle(a);
        }
        assert_eq!(tree.get(a).unwrap().name(), name_before);
        assert_eq!(tree.len(), 5);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn spec_deserializes_from_json() {
        let json = r#"{"name":"root","children":[{"name":"leaf"}]}"#;
        let spec: NodeSpec = serde_json::from_str(json).unwrap();
        assert_eq!(spec.name, "root");
        assert_eq!(spec.children.len(), 1);
        assert!(Hierarchy::build(&spec).is_ok());
    }

    // ---- Property tests ----

    fn arb_spec() -> impl Strategy<Value = NodeSpec> {
        let leaf = "[a-z]{1,6}".prop_map(NodeSpec::new);
        leaf.prop_recursive(4, 24, 4, |inner| {
            ("[a-z]{1,6}", prop::collection::vec(inner, 0..4))
                .prop_map(|(name, children)| NodeSpec::new(name).with_children(children))
        })
    }

    proptest! {
        #[test]
        fn prop_double_toggle_restores_visible_set(spec in arb_spec()) {
            let mut tree = Hierarchy::build(&spec).unwrap();
            let ids: Vec<NodeId> = (0..tree.len() as u32).map(NodeId).collect();
            let before: Vec<NodeId> = tree.visible_nodes().collect();

            for id in ids {
                tree.toggle(id);
                tree.toggle(id);
            }
            prop_assert_eq!(tree.visible_nodes().collect::<Vec<_>>(), before);
        }

        #[test]
        fn prop_visible_set_contains_root(spec in arb_spec()) {
            let tree = Hierarchy::build(&spec).unwrap();
            let visible: Vec<NodeId> = tree.visible_nodes().collect();
            prop_assert_eq!(visible[0], Hierarchy::ROOT);
            prop_assert!(visible.len() <= tree.len());
        }
    }
}
