#![forbid(unsafe_code)]

//! Core primitives for the Canopy tree view.
//!
//! This crate provides the pieces the layout engine and scene graph build on:
//!
//! - [`geometry`] - world-unit points and viewport bounds
//! - [`animation`] - easing functions and the one-shot [`Tween`] timer
//! - [`hierarchy`] - the arena-backed tree model with per-node
//!   expand/collapse state and malformed-input validation
//!
//! Nothing here renders or lays anything out; higher crates consume these
//! types and stay pure over them.

pub mod animation;
pub mod geometry;
pub mod hierarchy;

pub use animation::{EasingFn, Tween, ease_in, ease_in_out, ease_out, linear};
pub use geometry::{Point, Viewport};
pub use hierarchy::{Hierarchy, MalformedInput, Node, NodeId, NodeSpec};
