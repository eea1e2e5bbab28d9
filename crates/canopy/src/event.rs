#![forbid(unsafe_code)]

//! The view's input events.
//!
//! These three events are the only entry points that mutate a
//! [`TreeView`](crate::view::TreeView); everything else about the widget is
//! read-only. Hosts translate their own pointer/resize/frame callbacks into
//! this enum and forward it to [`TreeView::handle`](crate::view::TreeView::handle).

use std::time::Duration;

use canopy_core::hierarchy::NodeId;

/// An input event for the tree view.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ViewEvent {
    /// A node's visual representation was clicked.
    NodeClicked(NodeId),
    /// The host viewport changed size.
    Resized {
        /// New width in world units.
        width: f64,
        /// New height in world units.
        height: f64,
    },
    /// A frame tick; advances in-flight transitions.
    Tick(Duration),
}
