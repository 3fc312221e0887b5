//! Seams towards the rendering layer.
//!
//! The drag controller drives visuals only through these traits. Every
//! call is fire-and-forget; nothing returned by the view feeds back into
//! connection logic.

use crate::graph::{ChannelId, Connectable, PinId};
use slint::Color;
use std::collections::{BTreeSet, HashMap};

/// Visual feedback for pins, the drag handle and channels.
pub trait ConnectionView {
    /// Show the drag handle of `origin`, a pin or a channel hub.
    fn show_handle(&mut self, origin: Connectable);
    /// Hide the drag handle of `origin`.
    fn hide_handle(&mut self, origin: Connectable);
    /// Move the drag handle of `origin` to an absolute position.
    fn set_handle_position(&mut self, origin: Connectable, x: f32, y: f32);
    fn set_pin_color(&mut self, pin: PinId, color: Color);
    /// Membership of `channel` changed; redraw it. Channels that no longer
    /// exist should be dropped by the view.
    fn reposition_channel(&mut self, channel: ChannelId);
    /// A drag ended with `pin` as its loose end, attached to `channel` or
    /// to nothing.
    fn commit(&mut self, pin: PinId, channel: Option<ChannelId>);
}

/// Sink for transient, user-facing error notices.
pub trait ErrorSink {
    fn set_error(&mut self, message: &str, x: f32, y: f32);
    fn clear_error(&mut self);
}

/// Ready-made view that keeps the latest feedback as plain state, for
/// applications that bind it to UI properties instead of pushing updates.
#[derive(Clone, Debug, Default)]
pub struct FeedbackState {
    handle: Option<(Connectable, f32, f32)>,
    handle_visible: bool,
    pin_colors: HashMap<PinId, Color>,
    error: Option<(String, f32, f32)>,
    dirty_channels: BTreeSet<ChannelId>,
    last_commit: Option<(PinId, Option<ChannelId>)>,
}

impl FeedbackState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Position of the visible drag handle.
    pub fn handle_position(&self) -> Option<(f32, f32)> {
        match self.handle {
            Some((_, x, y)) if self.handle_visible => Some((x, y)),
            _ => None,
        }
    }

    /// The pin or channel whose handle is shown.
    pub fn handle_origin(&self) -> Option<Connectable> {
        self.handle
            .filter(|_| self.handle_visible)
            .map(|(origin, _, _)| origin)
    }

    pub fn pin_color(&self, pin: PinId) -> Option<Color> {
        self.pin_colors.get(&pin).copied()
    }

    /// Current error notice and where to show it.
    pub fn error(&self) -> Option<(&str, f32, f32)> {
        self.error
            .as_ref()
            .map(|(message, x, y)| (message.as_str(), *x, *y))
    }

    pub fn last_commit(&self) -> Option<(PinId, Option<ChannelId>)> {
        self.last_commit
    }

    /// Channels flagged for redraw since the last call.
    pub fn take_dirty_channels(&mut self) -> Vec<ChannelId> {
        std::mem::take(&mut self.dirty_channels).into_iter().collect()
    }
}

impl ConnectionView for FeedbackState {
    fn show_handle(&mut self, origin: Connectable) {
        self.handle_visible = true;
        if self.handle.map(|(o, _, _)| o) != Some(origin) {
            self.handle = Some((origin, 0.0, 0.0));
        }
    }

    fn hide_handle(&mut self, origin: Connectable) {
        if self.handle.map(|(o, _, _)| o) == Some(origin) {
            self.handle_visible = false;
        }
    }

    fn set_handle_position(&mut self, origin: Connectable, x: f32, y: f32) {
        self.handle = Some((origin, x, y));
    }

    fn set_pin_color(&mut self, pin: PinId, color: Color) {
        self.pin_colors.insert(pin, color);
    }

    fn reposition_channel(&mut self, channel: ChannelId) {
        self.dirty_channels.insert(channel);
    }

    fn commit(&mut self, pin: PinId, channel: Option<ChannelId>) {
        self.last_commit = Some((pin, channel));
    }
}

impl ErrorSink for FeedbackState {
    fn set_error(&mut self, message: &str, x: f32, y: f32) {
        self.error = Some((message.to_string(), x, y));
    }

    fn clear_error(&mut self) {
        self.error = None;
    }
}
