//! Connection compatibility rules.
//!
//! [`ConnectionRules::can_connect`] is a pure predicate over a
//! [`ChannelGraph`]: it never mutates, and the caller decides what to do
//! with the verdict.

use crate::graph::{Channel, ChannelGraph, ChannelId, Connectable, Direction, Pin, PinId};

/// Reasons why a connection was refused.
///
/// The `Display` text is shown to the user as-is next to the cursor.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConnectionError {
    /// Pin and target carry different data types
    #[error("Type mismatch: expected {expected}, found {found}")]
    TypeMismatch { expected: String, found: String },
    /// Both pins are inputs or both are outputs
    #[error("Cannot connect two {0} pins")]
    SameDirection(Direction),
    /// Both pins belong to the same node
    #[error("Cannot connect pins on same node")]
    SameOwner,
    /// Joining would leave the channel without one of the two directions
    #[error("Channel needs an {missing} pin")]
    DirectionCollision { missing: Direction },
    #[error("Pin {0} not found")]
    UnknownPin(PinId),
    #[error("Channel {0} not found")]
    UnknownChannel(ChannelId),
}

/// Rule set deciding whether a pin may connect to a pin or a channel.
pub struct ConnectionRules;

impl ConnectionRules {
    /// Check whether `source` may connect to `target`.
    ///
    /// Pin targets that already belong to a channel are checked as that
    /// channel, since connecting to them means joining it.
    pub fn can_connect(
        graph: &ChannelGraph,
        source: PinId,
        target: Connectable,
    ) -> Result<(), ConnectionError> {
        let pin = graph.pin_checked(source)?;
        match target {
            Connectable::Pin(other_id) => {
                let other = graph.pin_checked(other_id)?;
                Self::check_types(pin, other.data_type())?;
                if let Some(channel) = other.channel() {
                    return Self::can_connect(graph, source, Connectable::Channel(channel));
                }
                Self::check_pin(pin, other)
            }
            Connectable::Channel(channel_id) => {
                let channel = graph.channel_checked(channel_id)?;
                Self::check_channel(graph, source, pin, channel)
            }
        }
    }

    fn check_types(pin: &Pin, target_type: &str) -> Result<(), ConnectionError> {
        if pin.data_type() != target_type {
            return Err(ConnectionError::TypeMismatch {
                expected: target_type.to_string(),
                found: pin.data_type().to_string(),
            });
        }
        Ok(())
    }

    fn check_pin(pin: &Pin, other: &Pin) -> Result<(), ConnectionError> {
        if pin.direction() == other.direction() {
            return Err(ConnectionError::SameDirection(pin.direction()));
        }
        if pin.node() == other.node() {
            return Err(ConnectionError::SameOwner);
        }
        Ok(())
    }

    fn check_channel(
        graph: &ChannelGraph,
        source: PinId,
        pin: &Pin,
        channel: &Channel,
    ) -> Result<(), ConnectionError> {
        Self::check_types(pin, channel.data_type())?;

        let mut has_input = pin.direction() == Direction::Input;
        let mut has_output = pin.direction() == Direction::Output;
        for member in channel.pins().filter_map(|id| graph.pin(id)) {
            match member.direction() {
                Direction::Input => has_input = true,
                Direction::Output => has_output = true,
            }
        }
        if !has_input || !has_output {
            let missing = if has_input {
                Direction::Output
            } else {
                Direction::Input
            };
            return Err(ConnectionError::DirectionCollision { missing });
        }

        let shares_owner = channel
            .pins()
            .filter(|&id| id != source)
            .filter_map(|id| graph.pin(id))
            .any(|member| member.node() == pin.node());
        if shares_owner {
            return Err(ConnectionError::SameOwner);
        }

        Ok(())
    }
}
