//! High-level controller for channel-based node editors.
//!
//! The [`ChannelEditorController`] reduces boilerplate by bundling the pin
//! registry, geometry tracking, the drag state machine and channel path
//! rendering behind one cloneable handle.
//!
//! # Example
//!
//! ```ignore
//! use slint_node_channels::{ChannelEditorController, Direction, NodeId, Pin, PinId};
//!
//! slint::include_modules!();
//!
//! fn main() {
//!     let window = MainWindow::new().unwrap();
//!     let ctrl = ChannelEditorController::new();
//!
//!     ctrl.add_pin(PinId(3), Pin::new(NodeId(1), "value", "int", Direction::Output));
//!     ctrl.add_pin(PinId(4), Pin::new(NodeId(2), "value", "int", Direction::Input));
//!
//!     // Geometry tracking
//!     window.on_node_rect_changed(ctrl.node_rect_callback());
//!     window.on_pin_position_changed(ctrl.pin_position_callback());
//!
//!     // Drag-to-connect
//!     window.on_pin_drag_started(ctrl.pin_drag_started_callback());
//!     window.on_pin_dragged({
//!         let ctrl = ctrl.clone();
//!         let w = window.as_weak();
//!         move |x, y| {
//!             ctrl.handle_pin_dragged(x, y);
//!             if let Some(w) = w.upgrade() {
//!                 w.set_drag_path(ctrl.drag_path());
//!                 w.set_error_text(ctrl.error_text());
//!             }
//!         }
//!     });
//!     window.on_pin_dropped(ctrl.pin_dropped_callback());
//!
//!     // Channel rendering
//!     let paths = Rc::new(VecModel::<ChannelPath>::default());
//!     ctrl.bind_channel_model(paths.clone(), |id, path_commands, color, line_width| {
//!         ChannelPath { id, path_commands, color, line_width }
//!     });
//!     window.set_channel_paths(ModelRc::from(paths));
//!
//!     window.run().unwrap();
//! }
//! ```

use crate::channels::ChannelManager;
use crate::config::EditorConfig;
use crate::drag::{DragController, DragState};
use crate::graph::{ChannelEvent, ChannelGraph, ChannelId, Connectable, NodeId, Pin, PinId};
use crate::path::{generate_bezier_path, generate_drag_path};
use crate::rules::ConnectionError;
use crate::state::GeometryCache;
use crate::view::FeedbackState;
use slint::{Color, SharedString, VecModel};
use std::cell::RefCell;
use std::collections::BTreeSet;
use std::rc::Rc;

/// Controller that owns editor state and provides callback implementations.
///
/// This provides a high-level API that handles:
/// - Pin registration and channel membership
/// - Geometry caching (node rects, pin offsets)
/// - The drag/snap interaction and its visual feedback
/// - Channel path computation and model sync
///
/// Every graph mutation made through the controller is followed by a
/// channel sync, so bound models never lag behind membership.
///
/// Clone this controller to share it across callbacks.
#[derive(Clone)]
pub struct ChannelEditorController {
    graph: Rc<RefCell<ChannelGraph>>,
    cache: Rc<RefCell<GeometryCache>>,
    drag: Rc<RefCell<DragController>>,
    feedback: Rc<RefCell<FeedbackState>>,
    channels: Rc<RefCell<ChannelManager>>,
}

impl Default for ChannelEditorController {
    fn default() -> Self {
        Self::new()
    }
}

impl ChannelEditorController {
    /// Create a new controller with default settings.
    pub fn new() -> Self {
        Self::with_config(EditorConfig::default())
    }

    pub fn with_config(config: EditorConfig) -> Self {
        let cache = Rc::new(RefCell::new(GeometryCache::new()));
        Self {
            graph: Rc::new(RefCell::new(ChannelGraph::new())),
            channels: Rc::new(RefCell::new(ChannelManager::with_config(
                cache.clone(),
                config.clone(),
            ))),
            cache,
            drag: Rc::new(RefCell::new(DragController::new(config))),
            feedback: Rc::new(RefCell::new(FeedbackState::new())),
        }
    }

    /// Set the snap radius (default: 20.0).
    pub fn set_snap_threshold(&self, threshold: f32) {
        self.drag.borrow_mut().config_mut().snap_threshold = threshold;
    }

    /// Set the bezier curve offset for channel paths (default: 50.0).
    pub fn set_bezier_offset(&self, offset: f32) {
        self.drag.borrow_mut().config_mut().bezier_offset = offset;
        self.channels.borrow_mut().set_bezier_offset(offset);
        self.refresh_paths();
    }

    pub fn set_zoom(&self, zoom: f32) {
        self.channels.borrow_mut().set_zoom(zoom);
        self.refresh_paths();
    }

    pub fn graph(&self) -> Rc<RefCell<ChannelGraph>> {
        self.graph.clone()
    }

    pub fn cache(&self) -> Rc<RefCell<GeometryCache>> {
        self.cache.clone()
    }

    pub fn feedback(&self) -> Rc<RefCell<FeedbackState>> {
        self.feedback.clone()
    }

    pub fn channels(&self) -> Rc<RefCell<ChannelManager>> {
        self.channels.clone()
    }

    /// Bind the channel paths to a Slint model.
    ///
    /// `constructor` builds a row from (channel id, path commands, color,
    /// line width).
    pub fn bind_channel_model<P, F>(&self, model: Rc<VecModel<P>>, constructor: F)
    where
        P: Clone + 'static,
        F: Fn(i32, SharedString, Color, f32) -> P + 'static,
    {
        self.channels.borrow_mut().bind_model(model, constructor);
        self.refresh_paths();
    }

    // === Graph operations ===

    /// Register a pin. See [`ChannelGraph::add_pin`].
    pub fn add_pin(&self, id: PinId, pin: Pin) -> Option<Pin> {
        let previous = self.graph.borrow_mut().add_pin(id, pin);
        self.sync_channels();
        previous
    }

    /// Connect `pin` to a pin or channel outside of any drag.
    pub fn connect(&self, pin: PinId, target: Connectable) -> Result<ChannelId, ConnectionError> {
        let result = self.graph.borrow_mut().connect_to(pin, target);
        self.sync_channels();
        result
    }

    pub fn disconnect(&self, pin: PinId) -> Option<ChannelId> {
        let left = self.graph.borrow_mut().disconnect(pin);
        self.sync_channels();
        left
    }

    /// Remove a node: its pins are disconnected and unregistered and its
    /// geometry is forgotten. A drag running from one of them, or from a
    /// channel one of them belongs to, is cancelled.
    pub fn remove_node(&self, node: NodeId) -> Vec<PinId> {
        let origin = self.drag.borrow().origin();
        let touched = {
            let graph = self.graph.borrow();
            let on_node = |pin: PinId| graph.pin(pin).is_some_and(|p| p.node() == node);
            match origin {
                Some(Connectable::Pin(pin)) => on_node(pin),
                Some(Connectable::Channel(channel)) => graph
                    .channel(channel)
                    .is_some_and(|c| c.pins().any(on_node)),
                None => false,
            }
        };
        if touched {
            self.cancel_drag();
        }

        let removed = self.graph.borrow_mut().remove_node(node);
        self.cache.borrow_mut().remove_node(node);
        self.sync_channels();
        removed
    }

    /// Absolute position of a pin from the last geometry reports.
    pub fn current_position(&self, pin: PinId) -> Option<(f32, f32)> {
        self.cache.borrow().pin_position(pin)
    }

    // === Geometry handlers ===

    /// Handle node-rect-changed: update cache and redraw channels.
    pub fn handle_node_rect(&self, id: i32, x: f32, y: f32, w: f32, h: f32) {
        self.cache.borrow_mut().update_node_rect(NodeId(id), x, y, w, h);
        self.refresh_paths();
    }

    /// Handle pin-position-changed: update cache and redraw channels.
    pub fn handle_pin_position(&self, pin_id: i32, node_id: i32, rel_x: f32, rel_y: f32) {
        if self.graph.borrow().pin(PinId(pin_id)).is_none() {
            log::warn!("position reported for unregistered pin {}", pin_id);
        }
        self.cache
            .borrow_mut()
            .handle_pin_report(PinId(pin_id), NodeId(node_id), rel_x, rel_y);
        self.refresh_paths();
    }

    // === Drag handlers ===

    /// Handle pin-drag-started. Returns what is actually being dragged: the
    /// pin, the other end of its wire, or the channel it left.
    pub fn handle_pin_drag_started(&self, pin: i32) -> Result<Connectable, ConnectionError> {
        let result = self.drag.borrow_mut().drag_start(
            &mut self.graph.borrow_mut(),
            &mut *self.feedback.borrow_mut(),
            PinId(pin),
        );
        if let Err(err) = &result {
            log::warn!("cannot drag pin {}: {}", pin, err);
        }
        self.sync_channels();
        result
    }

    /// Handle pin-dragged with the cursor position.
    pub fn handle_pin_dragged(&self, x: f32, y: f32) -> DragState {
        let state = self.drag.borrow_mut().drag(
            &mut self.graph.borrow_mut(),
            &*self.cache.borrow(),
            &mut *self.feedback.borrow_mut(),
            x,
            y,
        );
        self.sync_channels();
        state
    }

    /// Handle pin-dropped. Returns the channel the loose end ended in.
    pub fn handle_pin_dropped(&self) -> Option<ChannelId> {
        let channel = self
            .drag
            .borrow_mut()
            .drag_end(&self.graph.borrow(), &mut *self.feedback.borrow_mut());
        self.sync_channels();
        channel
    }

    /// Abort the running drag, leaving its loose end unattached.
    pub fn cancel_drag(&self) {
        self.drag
            .borrow_mut()
            .cancel(&mut self.graph.borrow_mut(), &mut *self.feedback.borrow_mut());
        self.sync_channels();
    }

    // === Callback factories ===

    /// Returns a callback for `node-rect-changed`: `(id, x, y, width, height)`.
    pub fn node_rect_callback(&self) -> impl Fn(i32, f32, f32, f32, f32) + Clone {
        let ctrl = self.clone();
        move |id, x, y, w, h| ctrl.handle_node_rect(id, x, y, w, h)
    }

    /// Returns a callback for `pin-position-changed`: `(pin_id, node_id, rel_x, rel_y)`.
    pub fn pin_position_callback(&self) -> impl Fn(i32, i32, f32, f32) + Clone {
        let ctrl = self.clone();
        move |pin_id, node_id, rel_x, rel_y| ctrl.handle_pin_position(pin_id, node_id, rel_x, rel_y)
    }

    /// Returns a callback for `pin-drag-started`: `(pin_id)`.
    pub fn pin_drag_started_callback(&self) -> impl Fn(i32) + Clone {
        let ctrl = self.clone();
        move |pin| {
            // Refusals are logged by the handler; the UI has nothing to undo
            let _ = ctrl.handle_pin_drag_started(pin);
        }
    }

    /// Returns a callback for `pin-dragged`: `(x, y)`.
    pub fn pin_dragged_callback(&self) -> impl Fn(f32, f32) + Clone {
        let ctrl = self.clone();
        move |x, y| {
            ctrl.handle_pin_dragged(x, y);
        }
    }

    /// Returns a callback for `pin-dropped`.
    pub fn pin_dropped_callback(&self) -> impl Fn() + Clone {
        let ctrl = self.clone();
        move || {
            ctrl.handle_pin_dropped();
        }
    }

    // === Feedback read-back ===

    pub fn drag_state(&self) -> DragState {
        self.drag.borrow().state()
    }

    /// Current error notice, empty when there is none.
    pub fn error_text(&self) -> SharedString {
        self.feedback
            .borrow()
            .error()
            .map(|(message, _, _)| SharedString::from(message))
            .unwrap_or_default()
    }

    pub fn error_position(&self) -> Option<(f32, f32)> {
        self.feedback.borrow().error().map(|(_, x, y)| (x, y))
    }

    /// Display color of a pin; pins never touched by a drag use the idle color.
    pub fn pin_color(&self, pin: i32) -> Color {
        self.feedback
            .borrow()
            .pin_color(PinId(pin))
            .unwrap_or(self.drag.borrow().config().idle_color)
    }

    /// Position of the visible drag handle.
    pub fn handle_position(&self) -> Option<(f32, f32)> {
        self.feedback.borrow().handle_position()
    }

    /// SVG path of the wire from the drag origin (a pin or a channel hub)
    /// to its handle, empty when no drag is running.
    pub fn drag_path(&self) -> SharedString {
        let Some(origin) = self.drag.borrow().origin() else {
            return SharedString::default();
        };
        let Some(handle) = self.handle_position() else {
            return SharedString::default();
        };
        let offset = self.drag.borrow().config().bezier_offset;
        let zoom = self.channels.borrow().zoom();
        let graph = self.graph.borrow();

        let path = match origin {
            Connectable::Pin(pin) => {
                let direction = graph.pin(pin).map(|p| p.direction());
                direction.zip(self.current_position(pin)).map(|(direction, from)| {
                    generate_drag_path(from, direction, handle, zoom, offset)
                })
            }
            Connectable::Channel(channel) => self
                .cache
                .borrow()
                .channel_hub(&graph, channel)
                .map(|hub| generate_bezier_path(hub, handle, zoom, offset)),
        };
        path.map(SharedString::from).unwrap_or_default()
    }

    // === Sync ===

    /// Feed pending membership events to the channel registry and redraw
    /// the channels they or the drag touched.
    pub fn sync_channels(&self) {
        let events = self.graph.borrow_mut().drain_events();
        let mut dirty: BTreeSet<ChannelId> = self
            .feedback
            .borrow_mut()
            .take_dirty_channels()
            .into_iter()
            .collect();
        dirty.extend(events.iter().map(ChannelEvent::channel));
        if dirty.is_empty() {
            return;
        }
        log::trace!("redrawing channels {:?}", dirty);

        let mut channels = self.channels.borrow_mut();
        channels.apply_events(events);
        channels.update_channel_paths(&self.graph.borrow(), dirty);
    }

    /// Redraw every channel after geometry or zoom changed.
    fn refresh_paths(&self) {
        self.feedback.borrow_mut().take_dirty_channels();
        self.channels.borrow_mut().update_paths(&self.graph.borrow());
    }
}
