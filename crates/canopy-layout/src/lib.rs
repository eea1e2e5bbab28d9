#![forbid(unsafe_code)]

//! Tidy-tree layout for the visible subset of a hierarchy.
//!
//! [`layout`] is a pure function from hierarchy + viewport + config to
//! per-node world coordinates. It never mutates visibility state and the
//! same input always produces identical output, so callers are free to rerun
//! it on every click or resize.
//!
//! # Algorithm
//!
//! 1. Walk the visible tree post-order. Each visible leaf takes the next
//!    integer slot (siblings pack top-to-bottom in child order); each
//!    internal node sits at the mean of its children's slots.
//! 2. Scale slots into the usable height
//!    (`viewport.height - vertical_margin`, floored at zero) and add the
//!    uniform `vertical_offset` so the drawing clears the viewport edge.
//! 3. `x = depth * level_spacing`. Horizontal spacing is a fixed per-depth
//!    constant, not a fraction of the viewport width: wide trees crowd badly
//!    when columns shrink to fit, so the drawing is allowed to overflow
//!    horizontally instead.
//!
//! A root with zero visible children yields one node and no edges; layout
//! cannot fail for a well-formed hierarchy.

use canopy_core::geometry::{Point, Viewport};
use canopy_core::hierarchy::{Hierarchy, NodeId};

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Configuration knobs for the layout engine.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutConfig {
    /// Horizontal distance between adjacent depths, in world units.
    pub level_spacing: f64,
    /// Uniform vertical offset added to every node.
    pub vertical_offset: f64,
    /// Height reserved out of the viewport when scaling ranks.
    pub vertical_margin: f64,
    /// Margin substituted by the controller after the first viewport
    /// resize. The original behavior reserved a different margin once
    /// resized; whether that was intended is unknown, so it is kept.
    pub resized_vertical_margin: f64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            level_spacing: 190.0,
            vertical_offset: 25.0,
            vertical_margin: 300.0,
            resized_vertical_margin: 500.0,
        }
    }
}

// ---------------------------------------------------------------------------
// Output types
// ---------------------------------------------------------------------------

/// A positioned visible node.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedNode {
    /// Stable node identity.
    pub id: NodeId,
    /// Distance from the root.
    pub depth: u32,
    /// Display name.
    pub label: String,
    /// Whether the node has no children at all.
    pub leaf: bool,
    /// Whether the node has children that are currently suppressed.
    pub collapsed: bool,
    /// Horizontal position.
    pub x: f64,
    /// Vertical position.
    pub y: f64,
}

impl PlacedNode {
    /// Position as a point.
    #[inline]
    #[must_use]
    pub fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }
}

/// A visible parent-child pair. Identified by its target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayoutEdge {
    /// Parent node.
    pub source: NodeId,
    /// Child node; doubles as the edge's identity.
    pub target: NodeId,
}

/// Positions for every visible node plus the visible parent-child edges.
///
/// Node order is pre-order (root first); edges follow the same order, one
/// per non-root visible node.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LayoutResult {
    nodes: Vec<PlacedNode>,
    edges: Vec<LayoutEdge>,
}

impl LayoutResult {
    /// Placed nodes in pre-order.
    #[must_use]
    pub fn nodes(&self) -> &[PlacedNode] {
        &self.nodes
    }

    /// Visible edges, one per non-root visible node.
    #[must_use]
    pub fn edges(&self) -> &[LayoutEdge] {
        &self.edges
    }

    /// Whether `id` is in the visible set.
    #[must_use]
    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.iter().any(|n| n.id == id)
    }

    /// Position of a visible node, if present.
    #[must_use]
    pub fn position_of(&self, id: NodeId) -> Option<Point> {
        self.nodes
            .iter()
            .find(|n| n.id == id)
            .map(PlacedNode::position)
    }

    /// Ids of the visible set, in node order.
    pub fn ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes.iter().map(|n| n.id)
    }
}

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

/// Compute positions for the visible subset of `hierarchy`.
///
/// Deterministic and side-effect free; safe to call repeatedly with
/// different viewports without touching visibility state.
#[must_use]
pub fn layout(hierarchy: &Hierarchy, viewport: Viewport, config: &LayoutConfig) -> LayoutResult {
    #[cfg(feature = "tracing")]
    let _span = tracing::debug_span!("layout", height = viewport.height).entered();

    // Rank assignment: slot per arena index, NAN where not visible.
    let mut ranks = vec![f64::NAN; hierarchy.len()];
    let mut next_slot = 0usize;
    assign_ranks(hierarchy, Hierarchy::ROOT, &mut ranks, &mut next_slot);

    let usable = (viewport.height - config.vertical_margin).max(0.0);
    let max_slot = next_slot.saturating_sub(1);

    let mut nodes = Vec::new();
    let mut edges = Vec::new();
    for id in hierarchy.visible_nodes() {
        let node = hierarchy.get(id).expect("visible node exists");
        let rank = ranks[id.index()];
        let y = if max_slot == 0 {
            // A single visible leaf has no range to span; center it.
            usable / 2.0
        } else {
            rank / max_slot as f64 * usable
        };
        nodes.push(PlacedNode {
            id,
            depth: node.depth(),
            label: node.name().to_string(),
            leaf: node.is_leaf(),
            collapsed: hierarchy.has_hidden_children(id),
            x: f64::from(node.depth()) * config.level_spacing,
            y: y + config.vertical_offset,
        });
        if let Some(parent) = node.parent() {
            edges.push(LayoutEdge {
                source: parent,
                target: id,
            });
        }
    }

    #[cfg(feature = "tracing")]
    tracing::trace!(nodes = nodes.len(), edges = edges.len(), "layout computed");

    LayoutResult { nodes, edges }
}

/// Post-order rank assignment: leaves take consecutive slots, parents sit at
/// the mean of their children. Returns the node's rank.
fn assign_ranks(
    hierarchy: &Hierarchy,
    id: NodeId,
    ranks: &mut [f64],
    next_slot: &mut usize,
) -> f64 {
    let children: Vec<NodeId> = hierarchy.visible_children(id).collect();
    let rank = if children.is_empty() {
        let rank = *next_slot as f64;
        *next_slot += 1;
        rank
    } else {
        let sum: f64 = children
            .iter()
            .map(|&child| assign_ranks(hierarchy, child, ranks, next_slot))
            .sum();
        sum / children.len() as f64
    };
    ranks[id.index()] = rank;
    rank
}

#[cfg(test)]
mod tests {
    use super::*;
    use canopy_core::hierarchy::NodeSpec;
    use proptest::prelude::*;

    const VIEW: Viewport = Viewport {
        width: 1600.0,
        height: 900.0,
    };

    fn sample_spec() -> NodeSpec {
        NodeSpec::new("root")
            .child(
                NodeSpec::new("a")
                    .child(NodeSpec::new("a1"))
                    .child(NodeSpec::new("a2"))
                    .child(NodeSpec::new("a3")),
            )
            .child(NodeSpec::new("b"))
            .child(NodeSpec::new("c"))
    }

    fn child_of(tree: &Hierarchy, parent: NodeId, index: usize) -> NodeId {
        tree.get(parent).unwrap().children()[index]
    }

    #[test]
    fn initial_layout_is_root_plus_direct_children() {
        let tree = Hierarchy::build(&sample_spec()).unwrap();
        let result = layout(&tree, VIEW, &LayoutConfig::default());
        assert_eq!(result.nodes().len(), 4);
        assert_eq!(result.edges().len(), 3);
        assert_eq!(result.nodes()[0].id, Hierarchy::ROOT);
    }

    #[test]
    fn x_is_fixed_per_depth() {
        let mut tree = Hierarchy::build(&sample_spec()).unwrap();
        let a = child_of(&tree, Hierarchy::ROOT, 0);
        tree.toggle(a);

        let config = LayoutConfig::default();
        let result = layout(&tree, VIEW, &config);
        for node in result.nodes() {
            assert_eq!(node.x, f64::from(node.depth) * config.level_spacing);
        }
    }

    #[test]
    fn vertical_offset_applies_uniformly() {
        let tree = Hierarchy::build(&sample_spec()).unwrap();
        let config = LayoutConfig::default();
        let result = layout(&tree, VIEW, &config);
        for node in result.nodes() {
            assert!(node.y >= config.vertical_offset);
        }
    }

    #[test]
    fn siblings_pack_top_to_bottom_in_child_order() {
        let tree = Hierarchy::build(&sample_spec()).unwrap();
        let result = layout(&tree, VIEW, &LayoutConfig::default());
        let children: Vec<&PlacedNode> =
            result.nodes().iter().filter(|n| n.depth == 1).collect();
        assert_eq!(children.len(), 3);
        assert!(children[0].y < children[1].y);
        assert!(children[1].y < children[2].y);
    }

    #[test]
    fn parent_sits_at_mean_of_children() {
        let tree = Hierarchy::build(&sample_spec()).unwrap();
        let result = layout(&tree, VIEW, &LayoutConfig::default());
        let root = &result.nodes()[0];
        let mean: f64 = result
            .nodes()
            .iter()
            .filter(|n| n.depth == 1)
            .map(|n| n.y)
            .sum::<f64>()
            / 3.0;
        assert!((root.y - mean).abs() < 1e-9);
    }

    #[test]
    fn layout_is_deterministic() {
        let tree = Hierarchy::build(&sample_spec()).unwrap();
        let config = LayoutConfig::default();
        let first = layout(&tree, VIEW, &config);
        let second = layout(&tree, VIEW, &config);
        assert_eq!(first, second);
    }

    #[test]
    fn layout_does_not_mutate_visibility() {
        let tree = Hierarchy::build(&sample_spec()).unwrap();
        let before = tree.visible_nodes().collect::<Vec<_>>();
        let _ = layout(&tree, VIEW, &LayoutConfig::default());
        assert_eq!(tree.visible_nodes().collect::<Vec<_>>(), before);
    }

    #[test]
    fn resize_changes_coordinates_not_visible_set() {
        let tree = Hierarchy::build(&sample_spec()).unwrap();
        let config = LayoutConfig::default();
        let small = layout(&tree, Viewport::new(800.0, 600.0), &config);
        let large = layout(&tree, Viewport::new(2000.0, 1400.0), &config);
        assert_eq!(
            small.ids().collect::<Vec<_>>(),
            large.ids().collect::<Vec<_>>()
        );
        assert_ne!(small, large);
    }

    #[test]
    fn lone_root_centers_in_usable_height() {
        let mut tree = Hierarchy::build(&sample_spec()).unwrap();
        tree.toggle(Hierarchy::ROOT);

        let config = LayoutConfig::default();
        let result = layout(&tree, VIEW, &config);
        assert_eq!(result.nodes().len(), 1);
        assert!(result.edges().is_empty());
        let usable = VIEW.height - config.vertical_margin;
        assert_eq!(result.nodes()[0].y, usable / 2.0 + config.vertical_offset);
    }

    #[test]
    fn tiny_viewport_clamps_usable_height() {
        let tree = Hierarchy::build(&sample_spec()).unwrap();
        let config = LayoutConfig::default();
        let result = layout(&tree, Viewport::new(100.0, 50.0), &config);
        // Usable height floors at zero: everything lands on the offset line.
        for node in result.nodes() {
            assert_eq!(node.y, config.vertical_offset);
        }
    }

    #[test]
    fn collapsed_flag_tracks_hidden_children() {
        let tree = Hierarchy::build(&sample_spec()).unwrap();
        let result = layout(&tree, VIEW, &LayoutConfig::default());
        let a = result.nodes().iter().find(|n| n.label == "a").unwrap();
        let b = result.nodes().iter().find(|n| n.label == "b").unwrap();
        assert!(a.collapsed);
        assert!(!a.leaf);
        assert!(b.leaf);
        assert!(!b.collapsed);
    }

    #[test]
    fn edges_are_identified_by_target() {
        let tree = Hierarchy::build(&sample_spec()).unwrap();
        let result = layout(&tree, VIEW, &LayoutConfig::default());
        let mut targets: Vec<NodeId> = result.edges().iter().map(|e| e.target).collect();
        targets.dedup();
        assert_eq!(targets.len(), result.edges().len());
        for edge in result.edges() {
            assert_eq!(edge.source, Hierarchy::ROOT);
        }
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
        fn prop_layout_covers_exactly_the_visible_set(spec in arb_spec()) {
            let tree = Hierarchy::build(&spec).unwrap();
            let result = layout(&tree, VIEW, &LayoutConfig::default());
            prop_assert_eq!(
                result.ids().collect::<Vec<_>>(),
                tree.visible_nodes().collect::<Vec<_>>()
            );
            prop_assert_eq!(result.edges().len(), result.nodes().len() - 1);
        }

        #[test]
        fn prop_layout_deterministic(spec in arb_spec(), w in 100.0..4000.0f64, h in 100.0..4000.0f64) {
            let tree = Hierarchy::build(&spec).unwrap();
            let config = LayoutConfig::default();
            let view = Viewport::new(w, h);
            prop_assert_eq!(layout(&tree, view, &config), layout(&tree, view, &config));
        }
    }
}
