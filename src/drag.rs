//! Drag-to-connect interaction.
//!
//! [`DragController`] runs the `Idle → Dragging → {Snapped, Unsnapped} →
//! Idle` loop. It owns no graph or geometry: every step borrows the
//! [`ChannelGraph`] to mutate, a [`SnapIndex`] to search, and a view that
//! receives the visual feedback.
//!
//! A drag has an origin. Usually that is a pin, whose loose end snaps onto
//! pins and channel hubs. Pulling a pin out of a channel that stands without
//! it hands the drag to the channel: its loose end snaps onto free pins,
//! which join the channel.

use crate::config::EditorConfig;
use crate::graph::{ChannelGraph, ChannelId, Connectable, PinId};
use crate::hit_test::SnapIndex;
use crate::rules::ConnectionError;
use crate::view::{ConnectionView, ErrorSink};

/// Phase of the current drag.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DragState {
    #[default]
    Idle,
    /// Drag started, cursor not moved yet
    Dragging { origin: Connectable },
    /// The loose end is attached to `channel` and the handle sits on its
    /// snap point
    Snapped {
        origin: Connectable,
        channel: ChannelId,
    },
    /// Nothing attached; the handle follows the cursor
    Unsnapped { origin: Connectable },
}

impl DragState {
    /// What is being dragged, if anything.
    pub fn origin(&self) -> Option<Connectable> {
        match *self {
            DragState::Idle => None,
            DragState::Dragging { origin }
            | DragState::Snapped { origin, .. }
            | DragState::Unsnapped { origin } => Some(origin),
        }
    }

    /// The pin being dragged, if the drag runs from a pin.
    pub fn pin(&self) -> Option<PinId> {
        match self.origin() {
            Some(Connectable::Pin(pin)) => Some(pin),
            _ => None,
        }
    }

    pub fn is_idle(&self) -> bool {
        matches!(self, DragState::Idle)
    }
}

/// State machine for dragging a pin or channel onto a snap target.
#[derive(Clone, Debug, Default)]
pub struct DragController {
    state: DragState,
    /// Free pin the dragged channel picked up at the current snap
    joined: Option<PinId>,
    showing_error: bool,
    config: EditorConfig,
}

impl DragController {
    pub fn new(config: EditorConfig) -> Self {
        Self {
            state: DragState::Idle,
            joined: None,
            showing_error: false,
            config,
        }
    }

    pub fn state(&self) -> DragState {
        self.state
    }

    pub fn origin(&self) -> Option<Connectable> {
        self.state.origin()
    }

    pub fn dragged_pin(&self) -> Option<PinId> {
        self.state.pin()
    }

    /// Pin a dragged channel is currently snapped to.
    pub fn joined_pin(&self) -> Option<PinId> {
        self.joined
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut EditorConfig {
        &mut self.config
    }

    /// Start dragging `pin`.
    ///
    /// An attached pin is detached first and the drag continues from what
    /// it left behind: the channel itself when it still stands, or the
    /// other end of the wire when a two-pin channel dissolved. Returns the
    /// origin actually being dragged.
    pub fn drag_start<V>(
        &mut self,
        graph: &mut ChannelGraph,
        view: &mut V,
        pin: PinId,
    ) -> Result<Connectable, ConnectionError>
    where
        V: ConnectionView + ErrorSink + ?Sized,
    {
        if !self.state.is_idle() {
            self.drag_end(graph, view);
        }
        graph.pin_checked(pin)?;

        let mut origin = Connectable::Pin(pin);
        if let Some(channel) = graph.channel_of(pin) {
            let others: Vec<PinId> = graph
                .channel(channel)
                .map(|c| c.pins().filter(|&p| p != pin).collect())
                .unwrap_or_default();

            graph.disconnect(pin);
            view.set_pin_color(pin, self.config.idle_color);
            view.reposition_channel(channel);

            if graph.channel(channel).is_some() {
                origin = Connectable::Channel(channel);
            } else {
                for &other in &others {
                    view.set_pin_color(other, self.config.idle_color);
                }
                // Several survivors have no single other end to pick up
                if let &[survivor] = others.as_slice() {
                    origin = Connectable::Pin(survivor);
                }
            }
            log::debug!("drag on pin {} pulled it out of channel {}", pin, channel);
        }

        self.clear_error(view);
        self.joined = None;
        self.state = DragState::Dragging { origin };
        view.show_handle(origin);
        Ok(origin)
    }

    /// Move the drag to `(x, y)` and snap to the nearest valid target.
    ///
    /// Does nothing while idle.
    pub fn drag<S, V>(
        &mut self,
        graph: &mut ChannelGraph,
        snap: &S,
        view: &mut V,
        x: f32,
        y: f32,
    ) -> DragState
    where
        S: SnapIndex + ?Sized,
        V: ConnectionView + ErrorSink + ?Sized,
    {
        self.state = match self.state.origin() {
            None => return self.state,
            Some(Connectable::Pin(pin)) => self.drag_pin(graph, snap, view, pin, x, y),
            Some(Connectable::Channel(channel)) => {
                self.drag_channel(graph, snap, view, channel, x, y)
            }
        };
        self.state
    }

    fn drag_pin<S, V>(
        &mut self,
        graph: &mut ChannelGraph,
        snap: &S,
        view: &mut V,
        pin: PinId,
        x: f32,
        y: f32,
    ) -> DragState
    where
        S: SnapIndex + ?Sized,
        V: ConnectionView + ErrorSink + ?Sized,
    {
        let origin = Connectable::Pin(pin);
        let previous = graph.channel_of(pin);
        let previous_members: Vec<PinId> = previous
            .and_then(|c| graph.channel(c))
            .map(|c| c.pins().filter(|&p| p != pin).collect())
            .unwrap_or_default();

        let hit = snap
            .nearest(graph, x, y)
            .filter(|hit| hit.target != origin)
            .filter(|hit| hit.within(self.config.snap_threshold));

        let state = match hit {
            None => {
                self.clear_error(view);
                if previous.is_some() {
                    graph.disconnect(pin);
                }
                view.set_pin_color(pin, self.config.idle_color);
                view.set_handle_position(origin, x, y);
                DragState::Unsnapped { origin }
            }
            Some(hit) => match graph.connect_to(pin, hit.target) {
                Ok(channel) => {
                    self.clear_error(view);
                    if previous != Some(channel) {
                        view.reposition_channel(channel);
                    }
                    let (hub_x, hub_y) = snap
                        .position_of(graph, Connectable::Channel(channel))
                        .unwrap_or((x, y));
                    view.set_handle_position(origin, hub_x, hub_y);
                    view.set_pin_color(pin, self.config.active_color);
                    DragState::Snapped { origin, channel }
                }
                Err(err) => {
                    log::debug!("pin {} refused {:?}: {}", pin, hit.target, err);
                    view.set_error(&err.to_string(), x, y);
                    self.showing_error = true;
                    view.set_pin_color(pin, self.config.error_color);
                    view.set_handle_position(origin, x, y);
                    DragState::Unsnapped { origin }
                }
            },
        };

        if let Some(previous) = previous {
            if graph.channel_of(pin) != Some(previous) {
                view.reposition_channel(previous);
                if graph.channel(previous).is_none() {
                    for &member in &previous_members {
                        view.set_pin_color(member, self.config.idle_color);
                    }
                }
            }
        }
        state
    }

    fn drag_channel<S, V>(
        &mut self,
        graph: &mut ChannelGraph,
        snap: &S,
        view: &mut V,
        channel: ChannelId,
        x: f32,
        y: f32,
    ) -> DragState
    where
        S: SnapIndex + ?Sized,
        V: ConnectionView + ErrorSink + ?Sized,
    {
        let origin = Connectable::Channel(channel);
        let joined = self.joined;
        // Only free pins can be picked up; other channels stay intact
        let free_pin = snap
            .nearest(graph, x, y)
            .filter(|hit| hit.within(self.config.snap_threshold))
            .and_then(|hit| match hit.target {
                Connectable::Pin(p) if Some(p) == joined || graph.channel_of(p).is_none() => {
                    Some(p)
                }
                _ => None,
            });

        if let Some(pin) = joined {
            if free_pin == Some(pin) {
                return DragState::Snapped { origin, channel };
            }
            graph.disconnect(pin);
            self.joined = None;
            view.set_pin_color(pin, self.config.idle_color);
            view.reposition_channel(channel);
        }

        let Some(pin) = free_pin else {
            self.clear_error(view);
            view.set_handle_position(origin, x, y);
            return DragState::Unsnapped { origin };
        };

        match graph.connect_to(pin, origin) {
            Ok(_) => {
                self.clear_error(view);
                self.joined = Some(pin);
                view.reposition_channel(channel);
                let (pin_x, pin_y) = snap
                    .position_of(graph, Connectable::Pin(pin))
                    .unwrap_or((x, y));
                view.set_handle_position(origin, pin_x, pin_y);
                view.set_pin_color(pin, self.config.active_color);
                DragState::Snapped { origin, channel }
            }
            Err(err) => {
                log::debug!("channel {} refused pin {}: {}", channel, pin, err);
                view.set_error(&err.to_string(), x, y);
                self.showing_error = true;
                view.set_handle_position(origin, x, y);
                DragState::Unsnapped { origin }
            }
        }
    }

    /// Finish the drag where it is. Returns the channel the loose end
    /// ended in; a dragged channel that picked up no pin returns `None`.
    pub fn drag_end<V>(&mut self, graph: &ChannelGraph, view: &mut V) -> Option<ChannelId>
    where
        V: ConnectionView + ErrorSink + ?Sized,
    {
        let state = std::mem::take(&mut self.state);
        let joined = self.joined.take();
        self.clear_error(view);
        let origin = state.origin()?;
        view.hide_handle(origin);

        let pin = match origin {
            Connectable::Pin(pin) => Some(pin),
            Connectable::Channel(channel) => {
                view.reposition_channel(channel);
                joined
            }
        };
        let channel = pin.and_then(|pin| graph.channel_of(pin));
        if let Some(pin) = pin {
            view.set_pin_color(pin, self.config.idle_color);
            view.commit(pin, channel);
        }
        log::debug!("drag from {:?} ended in {:?}", origin, channel);
        channel
    }

    /// Abort the drag, leaving the loose end unattached.
    pub fn cancel<V>(&mut self, graph: &mut ChannelGraph, view: &mut V)
    where
        V: ConnectionView + ErrorSink + ?Sized,
    {
        let loose = match self.state.origin() {
            Some(Connectable::Pin(pin)) => Some(pin),
            Some(Connectable::Channel(_)) => self.joined,
            None => None,
        };
        if let Some(channel) = loose.and_then(|pin| graph.disconnect(pin)) {
            view.reposition_channel(channel);
        }
        self.drag_end(graph, view);
    }

    fn clear_error<V>(&mut self, view: &mut V)
    where
        V: ErrorSink + ?Sized,
    {
        if self.showing_error {
            view.clear_error();
            self.showing_error = false;
        }
    }
}
