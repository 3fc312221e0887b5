//! # Slint Node Channels
//!
//! Connection engine for node editors built with Slint where wires are
//! *channels*: hubs joining any number of same-typed pins, with at least one
//! output and one input among them.
//!
//! ## Features
//!
//! - **Indexed Registry** - Pins and channels live in one [`ChannelGraph`], addressed by id
//! - **Validated Connections** - [`ConnectionRules`] refuse type, direction and owner conflicts
//! - **Drag-to-Connect** - [`DragController`] snaps a dragged pin to the nearest pin or hub, or a dragged channel onto free pins
//! - **Membership Events** - Joins, leaves, creations and dissolutions are reported as [`ChannelEvent`]s
//! - **Opaque Pin IDs** - The library never prescribes pin encoding; applications choose
//!
//! ## Quick Start
//!
//! ```ignore
//! use slint_node_channels::{ChannelEditorController, Connectable, Direction, NodeId, Pin, PinId};
//!
//! let ctrl = ChannelEditorController::new();
//! ctrl.add_pin(PinId(1), Pin::new(NodeId(1), "out", "int", Direction::Output));
//! ctrl.add_pin(PinId(2), Pin::new(NodeId(2), "in", "int", Direction::Input));
//!
//! let channel = ctrl.connect(PinId(1), Connectable::Pin(PinId(2)))?;
//! ```
//!
//! ## Rust Helpers
//!
//! - [`generate_bezier_path`] - SVG path for a single wire segment
//! - [`generate_channel_path`] - SVG path for a channel hub and its spokes
//! - [`nearest_connectable`] - Nearest snap target to a point
//! - [`GeometryCache`] - Node and pin geometry, implementing [`SnapIndex`]
//! - [`ChannelManager`] - Channel registry with Slint model sync
//! - [`FeedbackState`] - Ready-made [`ConnectionView`] and [`ErrorSink`]

pub mod channels;
pub mod config;
pub mod controller;
pub mod drag;
pub mod graph;
pub mod path;
pub mod rules;
pub mod state;
pub mod view;

pub use channels::ChannelManager;
pub use config::EditorConfig;
pub use controller::ChannelEditorController;
pub use drag::{DragController, DragState};
pub use graph::{
    Channel, ChannelEvent, ChannelGraph, ChannelId, Connectable, Direction, InvariantViolation,
    NodeId, Pin, PinId,
};
pub use hit_test::{nearest_connectable, SnapCandidate, SnapHit, SnapIndex};
pub use path::{generate_bezier_path, generate_channel_path, generate_drag_path};
pub use rules::{ConnectionError, ConnectionRules};
pub use state::{GeometryCache, NodeRect, StoredPin};
pub use view::{ConnectionView, ErrorSink, FeedbackState};
