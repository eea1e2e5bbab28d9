#![forbid(unsafe_code)]

//! The retained scene and its reconciler.
//!
//! Element identity is the node's stable id; an edge is identified by its
//! target (every visible non-root node has exactly one incoming edge).
//! Reconciliation is a three-way diff against the previous retained state:
//! enter at the origin hint, update from the current interpolated position,
//! exit back to the origin hint. [`Scene::advance`] ticks transitions and
//! drops exited elements whose transitions finished.

use std::collections::{HashMap, HashSet};
use std::time::Duration;

use canopy_core::animation::{EasingFn, ease_in_out};
use canopy_core::geometry::Point;
use canopy_core::hierarchy::NodeId;
use canopy_layout::LayoutResult;

use crate::curve::{CubicBezier, elbow};
use crate::motion::Motion;

// ---------------------------------------------------------------------------
// Element state
// ---------------------------------------------------------------------------

/// Lifecycle phase of a scene element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Created by the latest reconcile; still gliding in from the origin.
    Entering,
    /// A live member of the layout.
    Settled,
    /// No longer in the layout; gliding out toward the origin, removed once
    /// the transition completes.
    Exiting,
}

/// Which marker a node renders with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeMarker {
    /// The node has hidden children (click to expand).
    Collapsed,
    /// Expanded branch or plain leaf.
    Open,
}

/// Which side a node's label sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabelAnchor {
    /// Label starts just right of the marker (leaves).
    Start,
    /// Label ends just left of the marker (branch nodes).
    End,
}

impl LabelAnchor {
    /// Horizontal label offset from the node center, in world units.
    #[must_use]
    pub const fn offset(self) -> f64 {
        match self {
            Self::Start => 12.0,
            Self::End => -12.0,
        }
    }
}

/// A node's visual element.
#[derive(Debug, Clone)]
pub struct SceneNode {
    /// Stable identity.
    pub id: NodeId,
    /// Display name.
    pub label: String,
    /// Distance from the root.
    pub depth: u32,
    /// Whether the node has no children at all.
    pub leaf: bool,
    /// Whether the node has hidden children.
    pub collapsed: bool,
    motion: Motion,
    phase: Phase,
}

impl SceneNode {
    /// Current interpolated position.
    #[must_use]
    pub fn position(&self) -> Point {
        self.motion.current()
    }

    /// Lifecycle phase.
    #[must_use]
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Marker to render for this node.
    #[must_use]
    pub fn marker(&self) -> NodeMarker {
        if self.collapsed {
            NodeMarker::Collapsed
        } else {
            NodeMarker::Open
        }
    }

    /// Branch labels anchor at their end (left of the marker) so they do not
    /// overlap the subtree; leaf labels anchor at their start.
    #[must_use]
    pub fn label_anchor(&self) -> LabelAnchor {
        if self.leaf {
            LabelAnchor::Start
        } else {
            LabelAnchor::End
        }
    }
}

/// An edge's visual element, identified by its target.
#[derive(Debug, Clone)]
pub struct SceneEdge {
    /// Parent node.
    pub source: NodeId,
    /// Child node; the edge's identity.
    pub target: NodeId,
    source_motion: Motion,
    target_motion: Motion,
    phase: Phase,
}

impl SceneEdge {
    /// Lifecycle phase.
    #[must_use]
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// The connector at the current endpoint positions.
    #[must_use]
    pub fn path(&self) -> CubicBezier {
        elbow(self.source_motion.current(), self.target_motion.current())
    }
}

// ---------------------------------------------------------------------------
// Scene
// ---------------------------------------------------------------------------

/// The retained set of node and edge elements.
#[derive(Debug, Clone)]
pub struct Scene {
    nodes: Vec<SceneNode>,
    edges: Vec<SceneEdge>,
    duration: Duration,
    easing: EasingFn,
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

impl Scene {
    /// Default transition duration.
    pub const DEFAULT_TRANSITION: Duration = Duration::from_millis(300);

    /// Create an empty scene with the default eased 300 ms transition.
    #[must_use]
    pub fn new() -> Self {
        Self {
            nodes: Vec::new(),
            edges: Vec::new(),
            duration: Self::DEFAULT_TRANSITION,
            easing: ease_in_out,
        }
    }

    /// Set the transition duration for subsequently created transitions
    /// (builder).
    #[must_use]
    pub fn with_transition(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }

    /// Set the easing function for subsequently created transitions
    /// (builder).
    #[must_use]
    pub fn with_easing(mut self, easing: EasingFn) -> Self {
        self.easing = easing;
        self
    }

    /// Change the duration used for subsequently created transitions.
    /// Transitions already in flight keep theirs.
    pub fn set_transition(&mut self, duration: Duration) {
        self.duration = duration;
    }

    /// Node elements, in insertion order (layout pre-order for elements that
    /// entered together; entering elements append).
    #[must_use]
    pub fn nodes(&self) -> &[SceneNode] {
        &self.nodes
    }

    /// Edge elements.
    #[must_use]
    pub fn edges(&self) -> &[SceneEdge] {
        &self.edges
    }

    /// Look up a node element by id.
    #[must_use]
    pub fn node(&self, id: NodeId) -> Option<&SceneNode> {
        self.nodes.iter().find(|n| n.id == id)
    }

    /// Current interpolated position of a node element.
    #[must_use]
    pub fn position_of(&self, id: NodeId) -> Option<Point> {
        self.node(id).map(SceneNode::position)
    }

    /// Whether every transition has finished and nothing is exiting.
    #[must_use]
    pub fn is_settled(&self) -> bool {
        self.nodes
            .iter()
            .all(|n| n.motion.is_complete() && n.phase != Phase::Exiting)
            && self.edges.iter().all(|e| {
                e.source_motion.is_complete()
                    && e.target_motion.is_complete()
                    && e.phase != Phase::Exiting
            })
    }

    /// Diff the retained state against `next` and restart transitions.
    ///
    /// `origin` is the animation anchor for boundary elements: entering
    /// elements snap there before gliding to their placed positions, and
    /// exiting elements glide back to it before removal. For a toggle this
    /// is the clicked node's pre-toggle position; for a resize, the root's.
    pub fn reconcile(&mut self, next: &LayoutResult, origin: Point) {
        #[cfg(feature = "tracing")]
        let _span = tracing::debug_span!(
            "reconcile",
            prev_nodes = self.nodes.len(),
            next_nodes = next.nodes().len()
        )
        .entered();

        let placed_by_id: HashMap<NodeId, usize> = next
            .nodes()
            .iter()
            .enumerate()
            .map(|(i, n)| (n.id, i))
            .collect();

        // Update / exit pass over retained nodes.
        for node in &mut self.nodes {
            match placed_by_id.get(&node.id) {
                Some(&i) => {
                    let placed = &next.nodes()[i];
                    node.label.clone_from(&placed.label);
                    node.depth = placed.depth;
                    node.leaf = placed.leaf;
                    node.collapsed = placed.collapsed;
                    node.motion.retarget(placed.position());
                    if node.phase == Phase::Exiting {
                        // Revived mid-exit: glides back in from where it is.
                        node.phase = Phase::Entering;
                    }
                }
                None => {
                    node.phase = Phase::Exiting;
                    node.motion.retarget(origin);
                }
            }
        }

        // Enter pass: nodes in `next` with no retained element.
        let retained: HashSet<NodeId> = self.nodes.iter().map(|n| n.id).collect();
        for placed in next.nodes() {
            if !retained.contains(&placed.id) {
                self.nodes.push(SceneNode {
                    id: placed.id,
                    label: placed.label.clone(),
                    depth: placed.depth,
                    leaf: placed.leaf,
                    collapsed: placed.collapsed,
                    motion: Motion::glide(origin, placed.position(), self.duration, self.easing),
                    phase: Phase::Entering,
                });
            }
        }

        // Edges mirror the node diff, keyed by target.
        let next_edges: HashMap<NodeId, NodeId> = next
            .edges()
            .iter()
            .map(|e| (e.target, e.source))
            .collect();

        for edge in &mut self.edges {
            match next_edges.get(&edge.target) {
                Some(&source) => {
                    edge.source = source;
                    let src = next.position_of(source).unwrap_or(origin);
                    let tgt = next.position_of(edge.target).unwrap_or(origin);
                    edge.source_motion.retarget(src);
                    edge.target_motion.retarget(tgt);
                    if edge.phase == Phase::Exiting {
                        edge.phase = Phase::Entering;
                    }
                }
                None => {
                    edge.phase = Phase::Exiting;
                    edge.source_motion.retarget(origin);
                    edge.target_motion.retarget(origin);
                }
            }
        }

        let retained_edges: HashSet<NodeId> = self.edges.iter().map(|e| e.target).collect();
        for layout_edge in next.edges() {
            if !retained_edges.contains(&layout_edge.target) {
                let src = next.position_of(layout_edge.source).unwrap_or(origin);
                let tgt = next.position_of(layout_edge.target).unwrap_or(origin);
                self.edges.push(SceneEdge {
                    source: layout_edge.source,
                    target: layout_edge.target,
                    // Entering edges start fully collapsed at the origin.
                    source_motion: Motion::glide(origin, src, self.duration, self.easing),
                    target_motion: Motion::glide(origin, tgt, self.duration, self.easing),
                    phase: Phase::Entering,
                });
            }
        }

        #[cfg(feature = "tracing")]
        tracing::trace!(
            nodes = self.nodes.len(),
            edges = self.edges.len(),
            "scene reconciled"
        );
    }

    /// Advance all transitions by `dt`, settle finished entries, and drop
    /// exited elements whose transitions completed.
    pub fn advance(&mut self, dt: Duration) {
        for node in &mut self.nodes {
            node.motion.tick(dt);
            if node.phase == Phase::Entering && node.motion.is_complete() {
                node.phase = Phase::Settled;
            }
        }
        self.nodes
            .retain(|n| !(n.phase == Phase::Exiting && n.motion.is_complete()));

        for edge in &mut self.edges {
            edge.source_motion.tick(dt);
            edge.target_motion.tick(dt);
            if edge.phase == Phase::Entering
                && edge.source_motion.is_complete()
                && edge.target_motion.is_complete()
            {
                edge.phase = Phase::Settled;
            }
        }
        self.edges.retain(|e| {
            !(e.phase == Phase::Exiting
                && e.source_motion.is_complete()
                && e.target_motion.is_complete())
        });
    }
}
