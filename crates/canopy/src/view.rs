#![forbid(unsafe_code)]

//! The interaction controller.
//!
//! [`TreeView`] is the whole widget state in one owned value: hierarchy,
//! layout configuration, current viewport, the retained scene, and the last
//! computed layout. It is driven by exactly two state-changing triggers —
//! a node click and a viewport resize — plus the frame tick that advances
//! transitions. Both triggers run the same cascade: mutate or reread state,
//! re-run layout, reconcile the scene against it with an origin hint.
//!
//! For a click the origin hint is the clicked node's pre-toggle position, so
//! appearing descendants grow out of their parent and disappearing ones
//! collapse back into it. For a resize it is the root's current position;
//! the visible set cannot change, so reconciliation only redirects glides.

use std::cmp::Ordering;
use std::time::Duration;

use canopy_core::geometry::{Point, Viewport};
use canopy_core::hierarchy::{Hierarchy, MalformedInput, NodeId, NodeSpec};
use canopy_layout::{LayoutConfig, LayoutResult, layout};
use canopy_scene::{Phase, Scene};

use crate::event::ViewEvent;

/// Default pick radius around a node center, in world units.
///
/// The clickable target is the marker plus its label, not just the 5-unit
/// marker dot, so the radius is generous.
pub const DEFAULT_HIT_RADIUS: f64 = 12.0;

/// An interactive collapsible tree view.
#[derive(Debug, Clone)]
pub struct TreeView {
    hierarchy: Hierarchy,
    config: LayoutConfig,
    viewport: Viewport,
    scene: Scene,
    last_layout: LayoutResult,
    hit_radius: f64,
}

impl TreeView {
    /// Build a view over `spec` with the default layout configuration.
    ///
    /// Applies the initial-state policy (everything below the root's direct
    /// children collapsed), computes the first layout, and seeds the scene:
    /// initial elements grow in from the left edge at a quarter of the
    /// viewport height.
    ///
    /// # Errors
    ///
    /// Returns [`MalformedInput`] if `spec` is not a proper tree.
    pub fn build(spec: &NodeSpec, viewport: Viewport) -> Result<Self, MalformedInput> {
        Self::build_with_config(spec, viewport, LayoutConfig::default())
    }

    /// Build a view with an explicit layout configuration.
    ///
    /// # Errors
    ///
    /// Returns [`MalformedInput`] if `spec` is not a proper tree.
    pub fn build_with_config(
        spec: &NodeSpec,
        viewport: Viewport,
        config: LayoutConfig,
    ) -> Result<Self, MalformedInput> {
        let hierarchy = Hierarchy::build(spec)?;
        let last_layout = layout(&hierarchy, viewport, &config);
        let mut scene = Scene::new();
        scene.reconcile(&last_layout, Point::new(0.0, viewport.height / 4.0));
        Ok(Self {
            hierarchy,
            config,
            viewport,
            scene,
            last_layout,
            hit_radius: DEFAULT_HIT_RADIUS,
        })
    }

    /// Set the pick radius for [`hit_test`](Self::hit_test) (builder).
    #[must_use]
    pub fn with_hit_radius(mut self, radius: f64) -> Self {
        self.hit_radius = radius.max(0.0);
        self
    }

    /// Set the transition duration for subsequent toggles and resizes
    /// (builder). The initial entry animation keeps the default.
    #[must_use]
    pub fn with_transition(mut self, duration: Duration) -> Self {
        self.scene.set_transition(duration);
        self
    }

    /// Toggle the clicked node and animate the resulting layout change.
    ///
    /// Returns `false` without touching any state when `id` is unknown or
    /// names a true leaf. The clicked node's pre-toggle position anchors the
    /// enter/exit animations of its descendants.
    pub fn on_node_clicked(&mut self, id: NodeId) -> bool {
        let origin = self
            .scene
            .position_of(id)
            .or_else(|| self.last_layout.position_of(id))
            .unwrap_or_else(|| self.root_origin());
        if !self.hierarchy.toggle(id) {
            return false;
        }
        #[cfg(feature = "tracing")]
        tracing::debug!(node = %id, "toggled");
        self.relayout(origin);
        true
    }

    /// Adopt a new viewport size and animate every element to its new
    /// position. The visible set never changes here, only coordinates.
    ///
    /// After the first resize the layout reserves the post-resize vertical
    /// margin (see [`LayoutConfig::resized_vertical_margin`]).
    pub fn on_viewport_resized(&mut self, width: f64, height: f64) {
        self.viewport = Viewport::new(width, height);
        self.config.vertical_margin = self.config.resized_vertical_margin;
        #[cfg(feature = "tracing")]
        tracing::debug!(width, height, "viewport resized");
        let origin = self
            .scene
            .position_of(Hierarchy::ROOT)
            .unwrap_or_else(|| self.root_origin());
        self.relayout(origin);
    }

    /// Advance in-flight transitions by `dt`.
    pub fn advance(&mut self, dt: Duration) {
        self.scene.advance(dt);
    }

    /// Dispatch an event. Returns whether any state changed.
    pub fn handle(&mut self, event: ViewEvent) -> bool {
        match event {
            ViewEvent::NodeClicked(id) => self.on_node_clicked(id),
            ViewEvent::Resized { width, height } => {
                self.on_viewport_resized(width, height);
                true
            }
            ViewEvent::Tick(dt) => {
                self.advance(dt);
                true
            }
        }
    }

    /// The nearest non-exiting node within the pick radius of `(x, y)`,
    /// measured against current interpolated positions.
    #[must_use]
    pub fn hit_test(&self, x: f64, y: f64) -> Option<NodeId> {
        let point = Point::new(x, y);
        self.scene
            .nodes()
            .iter()
            .filter(|n| n.phase() != Phase::Exiting)
            .map(|n| (n.id, n.position().distance(point)))
            .filter(|&(_, d)| d <= self.hit_radius)
            .min_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(Ordering::Equal))
            .map(|(id, _)| id)
    }

    /// The retained scene, ready to draw.
    #[must_use]
    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    /// The last computed layout (transition targets).
    #[must_use]
    pub fn layout(&self) -> &LayoutResult {
        &self.last_layout
    }

    /// The hierarchy model.
    #[must_use]
    pub fn hierarchy(&self) -> &Hierarchy {
        &self.hierarchy
    }

    /// The current viewport.
    #[must_use]
    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// The current layout configuration.
    #[must_use]
    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    fn root_origin(&self) -> Point {
        Point::new(0.0, self.viewport.height / 4.0)
    }

    fn relayout(&mut self, origin: Point) {
        let next = layout(&self.hierarchy, self.viewport, &self.config);
        self.scene.reconcile(&next, origin);
        self.last_layout = next;
    }
}
