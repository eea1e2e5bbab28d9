#![forbid(unsafe_code)]

//! Retained scene graph for the Canopy tree view.
//!
//! The [`Scene`] holds one visual element per visible node and edge and is
//! reconciled against each new [`LayoutResult`] by stable id: elements
//! present only in the new layout enter at the origin hint, elements present
//! in both glide to their new positions, and elements that disappeared exit
//! back to the origin hint and are dropped once their transition ends.
//!
//! Positions are always interpolated, never snapped (entering and exiting
//! elements snap only to the origin hint at their boundary). A reconcile
//! that lands mid-animation restarts every affected transition from the
//! element's current interpolated position, so interrupting a transition is
//! idempotent.
//!
//! [`LayoutResult`]: canopy_layout::LayoutResult

pub mod curve;
pub mod motion;
pub mod scene;

pub use curve::{CubicBezier, elbow};
pub use motion::Motion;
pub use scene::{LabelAnchor, NodeMarker, Phase, Scene, SceneEdge, SceneNode};
