//! Test harnesses for the four-node scenario.
//!
//! Nodes N1..N4 sit on a 2x2 grid. Each carries one scenario pin, and N1
//! also has an input so same-node connections can be attempted:
//!
//! | pin | node | type   | direction | position   |
//! |-----|------|--------|-----------|------------|
//! | A 1 | N1   | int    | output    | (100, 50)  |
//! | B 2 | N2   | int    | input     | (300, 50)  |
//! | D 3 | N3   | int    | output    | (100, 250) |
//! | E 4 | N4   | string | input     | (300, 250) |
//! | A2 5| N1   | int    | input     | (0, 50)    |

#![allow(dead_code)]

use super::FeedbackTracker;
use slint::{Color, SharedString, VecModel};
use slint_node_channels::{
    ChannelEditorController, ChannelGraph, ChannelId, Connectable, Direction, DragController,
    DragState, EditorConfig, GeometryCache, NodeId, Pin, PinId,
};
use std::rc::Rc;

pub const A: PinId = PinId(1);
pub const B: PinId = PinId(2);
pub const D: PinId = PinId(3);
pub const E: PinId = PinId(4);
pub const A2: PinId = PinId(5);

pub const N1: NodeId = NodeId(1);
pub const N2: NodeId = NodeId(2);
pub const N3: NodeId = NodeId(3);
pub const N4: NodeId = NodeId(4);

/// (pin, node, name, type, direction)
const PINS: [(PinId, NodeId, &str, &str, Direction); 5] = [
    (A, N1, "a", "int", Direction::Output),
    (B, N2, "b", "int", Direction::Input),
    (D, N3, "d", "int", Direction::Output),
    (E, N4, "e", "string", Direction::Input),
    (A2, N1, "a2", "int", Direction::Input),
];

/// (node, x, y, width, height)
const NODES: [(NodeId, f32, f32, f32, f32); 4] = [
    (N1, 0.0, 0.0, 100.0, 100.0),
    (N2, 300.0, 0.0, 100.0, 100.0),
    (N3, 0.0, 200.0, 100.0, 100.0),
    (N4, 300.0, 200.0, 100.0, 100.0),
];

/// (pin, node, rel_x, rel_y)
const PIN_OFFSETS: [(PinId, NodeId, f32, f32); 5] = [
    (A, N1, 100.0, 50.0),
    (B, N2, 0.0, 50.0),
    (D, N3, 100.0, 50.0),
    (E, N4, 0.0, 50.0),
    (A2, N1, 0.0, 50.0),
];

pub fn scenario_graph() -> ChannelGraph {
    let mut graph = ChannelGraph::new();
    for (id, node, name, data_type, direction) in PINS {
        graph.add_pin(id, Pin::new(node, name, data_type, direction));
    }
    graph
}

pub fn scenario_geometry() -> GeometryCache {
    let mut cache = GeometryCache::new();
    for (node, x, y, w, h) in NODES {
        cache.update_node_rect(node, x, y, w, h);
    }
    for (pin, node, rel_x, rel_y) in PIN_OFFSETS {
        cache.handle_pin_report(pin, node, rel_x, rel_y);
    }
    cache
}

/// Drag-level harness: the pieces wired by hand, with a recording view.
pub struct DragHarness {
    pub graph: ChannelGraph,
    pub cache: GeometryCache,
    pub drag: DragController,
    pub view: FeedbackTracker,
}

impl DragHarness {
    pub fn new() -> Self {
        Self::with_config(EditorConfig::default())
    }

    pub fn with_config(config: EditorConfig) -> Self {
        Self {
            graph: scenario_graph(),
            cache: scenario_geometry(),
            drag: DragController::new(config),
            view: FeedbackTracker::new(),
        }
    }

    pub fn position(&self, pin: PinId) -> (f32, f32) {
        self.cache.pin_position(pin).unwrap()
    }

    /// Grab `pin`; returns what the drag continues from.
    pub fn start(&mut self, pin: PinId) -> Connectable {
        self.drag
            .drag_start(&mut self.graph, &mut self.view, pin)
            .unwrap()
    }

    pub fn move_to(&mut self, x: f32, y: f32) -> DragState {
        self.drag
            .drag(&mut self.graph, &self.cache, &mut self.view, x, y)
    }

    /// Move onto another pin's exact position.
    pub fn move_onto(&mut self, pin: PinId) -> DragState {
        let (x, y) = self.position(pin);
        self.move_to(x, y)
    }

    /// Register a free pin on its own node, placed at `(x, y)`.
    pub fn add_free_pin(&mut self, id: PinId, pin: Pin, x: f32, y: f32) {
        let node = pin.node();
        self.graph.add_pin(id, pin);
        self.cache.update_node_rect(node, x, y - 50.0, 100.0, 100.0);
        self.cache.handle_pin_report(id, node, 0.0, 50.0);
    }

    pub fn release(&mut self) -> Option<ChannelId> {
        self.drag.drag_end(&self.graph, &mut self.view)
    }
}

/// One row of the bound channel model.
#[derive(Clone, Debug, PartialEq)]
pub struct ChannelRow {
    pub id: i32,
    pub path_commands: SharedString,
    pub color: Color,
    pub line_width: f32,
}

/// Controller-level harness with a bound channel model.
pub struct ControllerHarness {
    pub ctrl: ChannelEditorController,
    pub rows: Rc<VecModel<ChannelRow>>,
}

impl ControllerHarness {
    pub fn new() -> Self {
        Self::with_config(EditorConfig::default())
    }

    pub fn with_config(config: EditorConfig) -> Self {
        let ctrl = ChannelEditorController::with_config(config);
        for (id, node, name, data_type, direction) in PINS {
            ctrl.add_pin(id, Pin::new(node, name, data_type, direction));
        }

        let node_rect = ctrl.node_rect_callback();
        for (node, x, y, w, h) in NODES {
            node_rect(node.0, x, y, w, h);
        }
        let pin_position = ctrl.pin_position_callback();
        for (pin, node, rel_x, rel_y) in PIN_OFFSETS {
            pin_position(pin.0, node.0, rel_x, rel_y);
        }

        let rows = Rc::new(VecModel::<ChannelRow>::default());
        ctrl.bind_channel_model(rows.clone(), |id, path_commands, color, line_width| {
            ChannelRow {
                id,
                path_commands,
                color,
                line_width,
            }
        });

        Self { ctrl, rows }
    }

    pub fn position(&self, pin: PinId) -> (f32, f32) {
        self.ctrl.current_position(pin).unwrap()
    }

    /// Drag `pin` onto `target` and drop it there.
    pub fn drag_onto(&self, pin: PinId, target: PinId) -> Option<ChannelId> {
        let (x, y) = self.position(target);
        self.ctrl.pin_drag_started_callback()(pin.0);
        self.ctrl.pin_dragged_callback()(x, y);
        self.ctrl.handle_pin_dropped()
    }
}
