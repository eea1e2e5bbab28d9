#![forbid(unsafe_code)]

//! Canopy: an interactive, collapsible tree view kernel.
//!
//! Canopy renders nothing itself. It owns the expand/collapse state of a
//! single-rooted tree, computes deterministic tidy-tree geometry for the
//! visible subset, and maintains a retained scene graph whose elements glide
//! between layouts with eased transitions. A host embeds it by forwarding
//! clicks and resizes and reading the scene back out every frame:
//!
//! ```
//! use std::time::Duration;
//! use canopy::{NodeSpec, TreeView, Viewport};
//!
//! let spec = NodeSpec::new("profile")
//!     .child(NodeSpec::new("skills").child(NodeSpec::new("rust")))
//!     .child(NodeSpec::new("projects"));
//! let mut view = TreeView::build(&spec, Viewport::new(1280.0, 720.0)).unwrap();
//!
//! // Depth >= 1 starts collapsed: profile, skills, projects visible.
//! assert_eq!(view.scene().nodes().len(), 3);
//!
//! let skills = view.hierarchy().find("skills").unwrap();
//! view.on_node_clicked(skills);
//! view.advance(Duration::from_millis(300));
//! assert_eq!(view.scene().nodes().len(), 4);
//! ```
//!
//! The crates underneath are usable on their own: `canopy-core` (hierarchy
//! model, geometry, easing), `canopy-layout` (pure layout engine), and
//! `canopy-scene` (reconciler and connector curves).

pub mod event;
pub mod view;

pub use canopy_core::animation::{EasingFn, Tween, ease_in, ease_in_out, ease_out, linear};
pub use canopy_core::geometry::{Point, Viewport};
pub use canopy_core::hierarchy::{Hierarchy, MalformedInput, Node, NodeId, NodeSpec};
pub use canopy_layout::{LayoutConfig, LayoutEdge, LayoutResult, PlacedNode, layout};
pub use canopy_scene::{
    CubicBezier, LabelAnchor, Motion, NodeMarker, Phase, Scene, SceneEdge, SceneNode, elbow,
};
pub use event::ViewEvent;
pub use view::TreeView;
