//! Common test utilities for integration tests.

#![allow(dead_code)]

pub mod harness;

use slint::Color;
use slint_node_channels::{ChannelId, Connectable, ConnectionView, ErrorSink, PinId};
use std::cell::RefCell;
use std::rc::Rc;

/// Tracks view and error-sink invocations for testing.
///
/// Each field records calls to the corresponding method with their
/// arguments. Clones share the same records.
#[derive(Default, Clone)]
pub struct FeedbackTracker {
    /// (origin,)
    pub shown: Rc<RefCell<Vec<Connectable>>>,
    /// (origin,)
    pub hidden: Rc<RefCell<Vec<Connectable>>>,
    /// (origin, x, y)
    pub handle_moves: Rc<RefCell<Vec<(Connectable, f32, f32)>>>,
    /// (pin, color)
    pub pin_colors: Rc<RefCell<Vec<(PinId, Color)>>>,
    /// (channel,)
    pub repositioned: Rc<RefCell<Vec<ChannelId>>>,
    /// (pin, channel)
    pub commits: Rc<RefCell<Vec<(PinId, Option<ChannelId>)>>>,
    /// (message, x, y)
    pub errors: Rc<RefCell<Vec<(String, f32, f32)>>>,
    /// Count of clear_error calls
    pub cleared: Rc<RefCell<usize>>,
}

impl FeedbackTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clear all recorded calls.
    pub fn clear(&self) {
        self.shown.borrow_mut().clear();
        self.hidden.borrow_mut().clear();
        self.handle_moves.borrow_mut().clear();
        self.pin_colors.borrow_mut().clear();
        self.repositioned.borrow_mut().clear();
        self.commits.borrow_mut().clear();
        self.errors.borrow_mut().clear();
        *self.cleared.borrow_mut() = 0;
    }

    pub fn last_handle_position(&self) -> Option<(f32, f32)> {
        self.handle_moves.borrow().last().map(|&(_, x, y)| (x, y))
    }

    pub fn last_color(&self, pin: PinId) -> Option<Color> {
        self.pin_colors
            .borrow()
            .iter()
            .rev()
            .find(|(p, _)| *p == pin)
            .map(|&(_, c)| c)
    }

    pub fn last_error(&self) -> Option<String> {
        self.errors.borrow().last().map(|(m, _, _)| m.clone())
    }
}

impl ConnectionView for FeedbackTracker {
    fn show_handle(&mut self, origin: Connectable) {
        self.shown.borrow_mut().push(origin);
    }

    fn hide_handle(&mut self, origin: Connectable) {
        self.hidden.borrow_mut().push(origin);
    }

    fn set_handle_position(&mut self, origin: Connectable, x: f32, y: f32) {
        self.handle_moves.borrow_mut().push((origin, x, y));
    }

    fn set_pin_color(&mut self, pin: PinId, color: Color) {
        self.pin_colors.borrow_mut().push((pin, color));
    }

    fn reposition_channel(&mut self, channel: ChannelId) {
        self.repositioned.borrow_mut().push(channel);
    }

    fn commit(&mut self, pin: PinId, channel: Option<ChannelId>) {
        self.commits.borrow_mut().push((pin, channel));
    }
}

impl ErrorSink for FeedbackTracker {
    fn set_error(&mut self, message: &str, x: f32, y: f32) {
        self.errors.borrow_mut().push((message.to_string(), x, y));
    }

    fn clear_error(&mut self) {
        *self.cleared.borrow_mut() += 1;
    }
}
