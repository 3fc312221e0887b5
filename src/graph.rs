use crate::rules::{ConnectionError, ConnectionRules};
use std::collections::{BTreeSet, HashMap};
use std::fmt;

/// Opaque pin identifier chosen by the application.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PinId(pub i32);

/// Opaque node identifier chosen by the application.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub i32);

/// Channel identifier allocated by [`ChannelGraph`]. Never reused.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChannelId(pub i32);

impl fmt::Display for PinId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for ChannelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Data flow direction of a pin.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    Input,
    Output,
}

impl Direction {
    /// Map the integer pin type reported by the UI (`1` = input, `2` = output).
    pub fn from_pin_type(pin_type: i32) -> Option<Self> {
        match pin_type {
            1 => Some(Direction::Input),
            2 => Some(Direction::Output),
            _ => None,
        }
    }

    pub fn opposite(self) -> Self {
        match self {
            Direction::Input => Direction::Output,
            Direction::Output => Direction::Input,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Input => write!(f, "input"),
            Direction::Output => write!(f, "output"),
        }
    }
}

/// A named, typed connection point owned by a node.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Pin {
    name: String,
    data_type: String,
    direction: Direction,
    node: NodeId,
    channel: Option<ChannelId>,
}

impl Pin {
    /// Create an unattached pin.
    pub fn new(
        node: NodeId,
        name: impl Into<String>,
        data_type: impl Into<String>,
        direction: Direction,
    ) -> Self {
        Self {
            name: name.into(),
            data_type: data_type.into(),
            direction,
            node,
            channel: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn data_type(&self) -> &str {
        &self.data_type
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn node(&self) -> NodeId {
        self.node
    }

    /// The channel this pin currently belongs to.
    pub fn channel(&self) -> Option<ChannelId> {
        self.channel
    }

    pub fn is_attached(&self) -> bool {
        self.channel.is_some()
    }
}

/// A shared connection joining two or more pins of one type.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Channel {
    data_type: String,
    pins: BTreeSet<PinId>,
}

impl Channel {
    pub fn data_type(&self) -> &str {
        &self.data_type
    }

    /// Member pins in ascending id order.
    pub fn pins(&self) -> impl Iterator<Item = PinId> + '_ {
        self.pins.iter().copied()
    }

    pub fn contains(&self, pin: PinId) -> bool {
        self.pins.contains(&pin)
    }

    pub fn len(&self) -> usize {
        self.pins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pins.is_empty()
    }
}

/// Anything a drag can target.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Connectable {
    Pin(PinId),
    Channel(ChannelId),
}

/// Channel membership notifications, queued by [`ChannelGraph`] and drained
/// by the container with [`ChannelGraph::drain_events`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ChannelEvent {
    Created { channel: ChannelId, pins: Vec<PinId> },
    Joined { channel: ChannelId, pin: PinId },
    Left { channel: ChannelId, pin: PinId },
    /// The channel could no longer stand on its own: fewer than two pins, or
    /// no input or no output left. `survivors` were detached with it.
    Dissolved {
        channel: ChannelId,
        survivors: Vec<PinId>,
    },
}

impl ChannelEvent {
    pub fn channel(&self) -> ChannelId {
        match self {
            ChannelEvent::Created { channel, .. }
            | ChannelEvent::Joined { channel, .. }
            | ChannelEvent::Left { channel, .. }
            | ChannelEvent::Dissolved { channel, .. } => *channel,
        }
    }
}

/// A violated structural invariant, reported by [`ChannelGraph::verify_invariants`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvariantViolation {
    #[error("Channel {channel} has {count} pins")]
    TooFewPins { channel: ChannelId, count: usize },
    #[error("Channel {channel} carries {expected} but pin {pin} is {found}")]
    MixedTypes {
        channel: ChannelId,
        pin: PinId,
        expected: String,
        found: String,
    },
    #[error("Channel {channel} has no {missing} pin")]
    SingleDirection { channel: ChannelId, missing: Direction },
    #[error("Pin {pin} and channel {channel} disagree on membership")]
    Membership { pin: PinId, channel: ChannelId },
    #[error("Channel {channel} joins pins {first} and {second} of node {node}")]
    SharedOwner {
        channel: ChannelId,
        node: NodeId,
        first: PinId,
        second: PinId,
    },
}

/// Central registry of pins and channels.
///
/// Pins and channels refer to each other by id only: each pin records the
/// channel it is attached to and each channel records its member set, and
/// every mutation keeps both sides in step.
#[derive(Clone, Debug, Default)]
pub struct ChannelGraph {
    pins: HashMap<PinId, Pin>,
    channels: HashMap<ChannelId, Channel>,
    next_channel_id: i32,
    events: Vec<ChannelEvent>,
}

impl ChannelGraph {
    pub fn new() -> Self {
        Self::default()
    }

    // === Pins ===

    /// Register a pin under an application-chosen id.
    ///
    /// A pin previously registered under the same id is disconnected and
    /// replaced; it is returned.
    pub fn add_pin(&mut self, id: PinId, mut pin: Pin) -> Option<Pin> {
        pin.channel = None;
        let previous = self.remove_pin(id);
        if previous.is_some() {
            log::warn!("pin {} registered twice, replacing", id);
        }
        self.pins.insert(id, pin);
        previous
    }

    /// Disconnect and unregister a pin.
    pub fn remove_pin(&mut self, id: PinId) -> Option<Pin> {
        self.disconnect(id);
        self.pins.remove(&id)
    }

    /// Disconnect and unregister every pin owned by `node`.
    ///
    /// Returns the removed pin ids in ascending order.
    pub fn remove_node(&mut self, node: NodeId) -> Vec<PinId> {
        let owned = self.pins_of_node(node);
        for &pin in &owned {
            self.remove_pin(pin);
        }
        owned
    }

    pub fn pin(&self, id: PinId) -> Option<&Pin> {
        self.pins.get(&id)
    }

    pub(crate) fn pin_checked(&self, id: PinId) -> Result<&Pin, ConnectionError> {
        self.pins.get(&id).ok_or(ConnectionError::UnknownPin(id))
    }

    /// Pins owned by `node`, in ascending id order.
    pub fn pins_of_node(&self, node: NodeId) -> Vec<PinId> {
        let mut owned: Vec<PinId> = self
            .pins
            .iter()
            .filter(|(_, pin)| pin.node == node)
            .map(|(&id, _)| id)
            .collect();
        owned.sort_unstable();
        owned
    }

    pub fn pin_ids(&self) -> impl Iterator<Item = PinId> + '_ {
        self.pins.keys().copied()
    }

    pub fn pin_count(&self) -> usize {
        self.pins.len()
    }

    // === Channels ===

    pub fn channel(&self, id: ChannelId) -> Option<&Channel> {
        self.channels.get(&id)
    }

    pub(crate) fn channel_checked(&self, id: ChannelId) -> Result<&Channel, ConnectionError> {
        self.channels.get(&id).ok_or(ConnectionError::UnknownChannel(id))
    }

    pub fn channel_of(&self, pin: PinId) -> Option<ChannelId> {
        self.pins.get(&pin).and_then(|p| p.channel)
    }

    pub fn channels(&self) -> impl Iterator<Item = (ChannelId, &Channel)> + '_ {
        self.channels.iter().map(|(&id, channel)| (id, channel))
    }

    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    /// Take the queued membership notifications.
    pub fn drain_events(&mut self) -> Vec<ChannelEvent> {
        std::mem::take(&mut self.events)
    }

    // === Connection ===

    /// Check whether `source` may connect to `target` without changing anything.
    pub fn can_connect(&self, source: PinId, target: Connectable) -> Result<(), ConnectionError> {
        ConnectionRules::can_connect(self, source, target)
    }

    /// Connect `source` to a pin or channel and return the resulting channel.
    ///
    /// A pin attached elsewhere is disconnected before validation, so a
    /// rejected connection leaves `source` unattached. Connecting to the
    /// channel `source` already belongs to is a no-op.
    pub fn connect_to(
        &mut self,
        source: PinId,
        target: Connectable,
    ) -> Result<ChannelId, ConnectionError> {
        let current = self.pin_checked(source)?.channel;
        let implied = match target {
            Connectable::Pin(pin) => self.pin_checked(pin)?.channel,
            Connectable::Channel(channel) => {
                self.channel_checked(channel)?;
                Some(channel)
            }
        };

        if let Some(current) = current {
            if implied == Some(current) {
                return Ok(current);
            }
            self.disconnect(source);
        }

        ConnectionRules::can_connect(self, source, target)?;

        match target {
            Connectable::Pin(other) => match self.channel_of(other) {
                // Joining a connected pin means joining its channel; the
                // channel checks run once more on the way in.
                Some(channel) => self.connect_to(source, Connectable::Channel(channel)),
                None => Ok(self.create_channel(source, other)),
            },
            Connectable::Channel(channel) => {
                self.join_channel(source, channel);
                Ok(channel)
            }
        }
    }

    /// Detach `pin` from its channel. Returns the channel the pin left.
    ///
    /// The channel dissolves when fewer than two pins remain or when the
    /// remaining pins all share one direction.
    pub fn disconnect(&mut self, pin: PinId) -> Option<ChannelId> {
        let channel_id = self.pins.get_mut(&pin)?.channel.take()?;
        let remaining: Vec<PinId> = match self.channels.get_mut(&channel_id) {
            Some(channel) => {
                channel.pins.remove(&pin);
                channel.pins.iter().copied().collect()
            }
            None => {
                log::warn!("pin {} pointed at missing channel {}", pin, channel_id);
                return None;
            }
        };
        log::debug!("pin {} left channel {}", pin, channel_id);
        self.events.push(ChannelEvent::Left {
            channel: channel_id,
            pin,
        });

        if !self.can_stand(&remaining) {
            self.dissolve(channel_id);
        }
        Some(channel_id)
    }

    /// Whether `pins` can form a channel: two or more, both directions present.
    fn can_stand(&self, pins: &[PinId]) -> bool {
        let directions: Vec<Direction> = pins
            .iter()
            .filter_map(|id| self.pins.get(id))
            .map(|p| p.direction)
            .collect();
        pins.len() >= 2
            && directions.contains(&Direction::Input)
            && directions.contains(&Direction::Output)
    }

    fn create_channel(&mut self, first: PinId, second: PinId) -> ChannelId {
        self.next_channel_id += 1;
        let id = ChannelId(self.next_channel_id);
        let data_type = self
            .pins
            .get(&first)
            .map(|p| p.data_type.clone())
            .unwrap_or_default();

        for pin in [first, second] {
            if let Some(p) = self.pins.get_mut(&pin) {
                p.channel = Some(id);
            }
        }
        self.channels.insert(
            id,
            Channel {
                data_type,
                pins: BTreeSet::from([first, second]),
            },
        );

        log::debug!("channel {} created for pins {} and {}", id, first, second);
        self.events.push(ChannelEvent::Created {
            channel: id,
            pins: vec![first.min(second), first.max(second)],
        });
        id
    }

    fn join_channel(&mut self, pin: PinId, channel_id: ChannelId) {
        let Some(channel) = self.channels.get_mut(&channel_id) else {
            return;
        };
        if !channel.pins.insert(pin) {
            return;
        }
        if let Some(p) = self.pins.get_mut(&pin) {
            p.channel = Some(channel_id);
        }
        log::debug!("pin {} joined channel {}", pin, channel_id);
        self.events.push(ChannelEvent::Joined {
            channel: channel_id,
            pin,
        });
    }

    fn dissolve(&mut self, channel_id: ChannelId) {
        let Some(channel) = self.channels.remove(&channel_id) else {
            return;
        };
        let survivors: Vec<PinId> = channel.pins.into_iter().collect();
        for pin in &survivors {
            if let Some(p) = self.pins.get_mut(pin) {
                p.channel = None;
            }
        }
        log::debug!("channel {} dissolved, detaching {:?}", channel_id, survivors);
        self.events.push(ChannelEvent::Dissolved {
            channel: channel_id,
            survivors,
        });
    }

    // === Invariants ===

    /// Check every channel and pin against the structural invariants.
    pub fn verify_invariants(&self) -> Result<(), InvariantViolation> {
        let mut channel_ids: Vec<ChannelId> = self.channels.keys().copied().collect();
        channel_ids.sort_unstable();

        for id in channel_ids {
            let channel = &self.channels[&id];
            if channel.pins.len() < 2 {
                return Err(InvariantViolation::TooFewPins {
                    channel: id,
                    count: channel.pins.len(),
                });
            }

            let mut has_input = false;
            let mut has_output = false;
            let mut owners: HashMap<NodeId, PinId> = HashMap::new();

            for &pin_id in &channel.pins {
                let pin = match self.pins.get(&pin_id) {
                    Some(pin) if pin.channel == Some(id) => pin,
                    _ => {
                        return Err(InvariantViolation::Membership {
                            pin: pin_id,
                            channel: id,
                        })
                    }
                };
                if pin.data_type != channel.data_type {
                    return Err(InvariantViolation::MixedTypes {
                        channel: id,
                        pin: pin_id,
                        expected: channel.data_type.clone(),
                        found: pin.data_type.clone(),
                    });
                }
                match pin.direction {
                    Direction::Input => has_input = true,
                    Direction::Output => has_output = true,
                }
                if let Some(&first) = owners.get(&pin.node) {
                    return Err(InvariantViolation::SharedOwner {
                        channel: id,
                        node: pin.node,
                        first,
                        second: pin_id,
                    });
                }
                owners.insert(pin.node, pin_id);
            }

            if !has_input || !has_output {
                let missing = if has_input {
                    Direction::Output
                } else {
                    Direction::Input
                };
                return Err(InvariantViolation::SingleDirection {
                    channel: id,
                    missing,
                });
            }
        }

        for (&pin_id, pin) in &self.pins {
            if let Some(channel) = pin.channel {
                let listed = self
                    .channels
                    .get(&channel)
                    .is_some_and(|c| c.pins.contains(&pin_id));
                if !listed {
                    return Err(InvariantViolation::Membership {
                        pin: pin_id,
                        channel,
                    });
                }
            }
        }

        Ok(())
    }

    #[cfg(test)]
    pub(crate) fn insert_raw_channel(&mut self, data_type: &str, pins: &[PinId]) -> ChannelId {
        self.next_channel_id += 1;
        let id = ChannelId(self.next_channel_id);
        for pin in pins {
            if let Some(p) = self.pins.get_mut(pin) {
                p.channel = Some(id);
            }
        }
        self.channels.insert(
            id,
            Channel {
                data_type: data_type.to_string(),
                pins: pins.iter().copied().collect(),
            },
        );
        id
    }
}
