use crate::graph::{ChannelGraph, ChannelId, Connectable, Direction, NodeId, PinId};
use crate::hit_test::{nearest_connectable, SnapCandidate, SnapHit, SnapIndex};
use crate::path::generate_channel_path;
use std::collections::HashMap;

/// Node rectangle in world coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NodeRect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

/// Pin offset relative to its node's top-left corner.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StoredPin {
    pub node_id: NodeId,
    pub rel_x: f32,
    pub rel_y: f32,
}

/// Spatial state of the editor: node rects and pin offsets.
///
/// Also serves as the default brute-force [`SnapIndex`].
#[derive(Clone, Debug, Default)]
pub struct GeometryCache {
    pub node_rects: HashMap<NodeId, NodeRect>,
    pub pin_positions: HashMap<PinId, StoredPin>,
}

impl GeometryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Update a node's rectangle.
    pub fn update_node_rect(&mut self, id: NodeId, x: f32, y: f32, width: f32, height: f32) {
        self.node_rects.insert(
            id,
            NodeRect {
                x,
                y,
                width,
                height,
            },
        );
    }

    /// Standard handler for pin position reports from the UI.
    pub fn handle_pin_report(&mut self, pin_id: PinId, node_id: NodeId, rel_x: f32, rel_y: f32) {
        self.pin_positions.insert(
            pin_id,
            StoredPin {
                node_id,
                rel_x,
                rel_y,
            },
        );
    }

    /// Forget a node's rect and every pin offset reported for it.
    pub fn remove_node(&mut self, id: NodeId) {
        self.node_rects.remove(&id);
        self.pin_positions.retain(|_, pin| pin.node_id != id);
    }

    /// Absolute position of a pin: node origin plus offset.
    pub fn pin_position(&self, pin: PinId) -> Option<(f32, f32)> {
        let stored = self.pin_positions.get(&pin)?;
        let rect = self.node_rects.get(&stored.node_id)?;
        Some((rect.x + stored.rel_x, rect.y + stored.rel_y))
    }

    /// Hub position of a channel: the centroid of its placed member pins.
    pub fn channel_hub(&self, graph: &ChannelGraph, channel: ChannelId) -> Option<(f32, f32)> {
        let channel = graph.channel(channel)?;
        let (mut sum_x, mut sum_y, mut count) = (0.0, 0.0, 0usize);
        for (x, y) in channel.pins().filter_map(|pin| self.pin_position(pin)) {
            sum_x += x;
            sum_y += y;
            count += 1;
        }
        if count == 0 {
            return None;
        }
        Some((sum_x / count as f32, sum_y / count as f32))
    }

    /// Every placed pin followed by every placed channel hub, both in
    /// ascending id order.
    pub fn snap_candidates(&self, graph: &ChannelGraph) -> Vec<SnapCandidate> {
        let mut pins: Vec<PinId> = graph.pin_ids().collect();
        pins.sort_unstable();
        let mut channels: Vec<ChannelId> = graph.channels().map(|(id, _)| id).collect();
        channels.sort_unstable();

        let pin_points = pins.into_iter().filter_map(|pin| {
            let (x, y) = self.pin_position(pin)?;
            Some(SnapCandidate {
                target: Connectable::Pin(pin),
                x,
                y,
            })
        });
        let hub_points = channels.into_iter().filter_map(|channel| {
            let (x, y) = self.channel_hub(graph, channel)?;
            Some(SnapCandidate {
                target: Connectable::Channel(channel),
                x,
                y,
            })
        });

        pin_points.chain(hub_points).collect()
    }

    /// SVG path commands for a channel: one spoke per placed member pin.
    pub fn compute_channel_path(
        &self,
        graph: &ChannelGraph,
        channel: ChannelId,
        zoom: f32,
        bezier_min_offset: f32,
    ) -> Option<String> {
        let hub = self.channel_hub(graph, channel)?;
        let spokes: Vec<(Direction, (f32, f32))> = graph
            .channel(channel)?
            .pins()
            .filter_map(|pin| {
                let direction = graph.pin(pin)?.direction();
                Some((direction, self.pin_position(pin)?))
            })
            .collect();

        Some(generate_channel_path(hub, &spokes, zoom, bezier_min_offset))
    }
}

impl SnapIndex for GeometryCache {
    fn nearest(&self, graph: &ChannelGraph, x: f32, y: f32) -> Option<SnapHit> {
        let hit = nearest_connectable(x, y, self.snap_candidates(graph));
        log::trace!("snap query at ({}, {}) -> {:?}", x, y, hit);
        hit
    }

    fn position_of(&self, graph: &ChannelGraph, target: Connectable) -> Option<(f32, f32)> {
        match target {
            Connectable::Pin(pin) => self.pin_position(pin),
            Connectable::Channel(channel) => self.channel_hub(graph, channel),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::Pin;
    use approx::assert_relative_eq;

    /// Node 1 at (0, 0) with output 1001 at its right edge,
    /// node 2 at (200, 0) with input 2001 at its left edge,
    /// node 3 at (200, 100) with input 3001 at its left edge.
    fn setup() -> (GeometryCache, ChannelGraph) {
        let mut cache = GeometryCache::new();
        cache.update_node_rect(NodeId(1), 0.0, 0.0, 100.0, 50.0);
        cache.update_node_rect(NodeId(2), 200.0, 0.0, 100.0, 50.0);
        cache.update_node_rect(NodeId(3), 200.0, 100.0, 100.0, 50.0);
        cache.handle_pin_report(PinId(1001), NodeId(1), 100.0, 25.0);
        cache.handle_pin_report(PinId(2001), NodeId(2), 0.0, 25.0);
        cache.handle_pin_report(PinId(3001), NodeId(3), 0.0, 25.0);

        let mut graph = ChannelGraph::new();
        graph.add_pin(PinId(1001), Pin::new(NodeId(1), "out", "int", Direction::Output));
        graph.add_pin(PinId(2001), Pin::new(NodeId(2), "in", "int", Direction::Input));
        graph.add_pin(PinId(3001), Pin::new(NodeId(3), "in", "int", Direction::Input));

        (cache, graph)
    }

    #[test]
    fn test_pin_position_is_absolute() {
        let (cache, _) = setup();
        assert_eq!(cache.pin_position(PinId(1001)), Some((100.0, 25.0)));
        assert_eq!(cache.pin_position(PinId(2001)), Some((200.0, 25.0)));
        assert_eq!(cache.pin_position(PinId(9999)), None);
    }

    #[test]
    fn test_pin_position_follows_node_move() {
        let (mut cache, _) = setup();
        cache.update_node_rect(NodeId(1), 50.0, 60.0, 100.0, 50.0);
        assert_eq!(cache.pin_position(PinId(1001)), Some((150.0, 85.0)));
    }

    #[test]
    fn test_pin_without_node_rect_has_no_position() {
        let (mut cache, _) = setup();
        cache.handle_pin_report(PinId(4001), NodeId(4), 0.0, 0.0);
        assert_eq!(cache.pin_position(PinId(4001)), None);
    }

    #[test]
    fn test_channel_hub_is_centroid() {
        let (cache, mut graph) = setup();
        let channel = graph
            .connect_to(PinId(1001), Connectable::Pin(PinId(2001)))
            .unwrap();
        let (x, y) = cache.channel_hub(&graph, channel).unwrap();
        assert_relative_eq!(x, 150.0);
        assert_relative_eq!(y, 25.0);

        graph
            .connect_to(PinId(3001), Connectable::Channel(channel))
            .unwrap();
        let (x, y) = cache.channel_hub(&graph, channel).unwrap();
        assert_relative_eq!(x, 500.0 / 3.0);
        assert_relative_eq!(y, 175.0 / 3.0);
    }

    #[test]
    fn test_snap_candidates_list_pins_then_hubs() {
        let (cache, mut graph) = setup();
        let channel = graph
            .connect_to(PinId(1001), Connectable::Pin(PinId(2001)))
            .unwrap();

        let targets: Vec<Connectable> = cache
            .snap_candidates(&graph)
            .into_iter()
            .map(|c| c.target)
            .collect();
        assert_eq!(
            targets,
            vec![
                Connectable::Pin(PinId(1001)),
                Connectable::Pin(PinId(2001)),
                Connectable::Pin(PinId(3001)),
                Connectable::Channel(channel),
            ]
        );
    }

    #[test]
    fn test_snap_index_finds_hub() {
        let (cache, mut graph) = setup();
        let channel = graph
            .connect_to(PinId(1001), Connectable::Pin(PinId(2001)))
            .unwrap();

        let hit = cache.nearest(&graph, 152.0, 25.0).unwrap();
        assert_eq!(hit.target, Connectable::Channel(channel));
        assert_relative_eq!(hit.distance_sq, 4.0);
        assert_eq!(
            cache.position_of(&graph, Connectable::Channel(channel)),
            Some((150.0, 25.0))
        );
    }

    #[test]
    fn test_remove_node_drops_pins() {
        let (mut cache, _) = setup();
        cache.remove_node(NodeId(2));
        assert!(!cache.node_rects.contains_key(&NodeId(2)));
        assert!(!cache.pin_positions.contains_key(&PinId(2001)));
        assert!(cache.pin_positions.contains_key(&PinId(1001)));
    }

    #[test]
    fn test_compute_channel_path() {
        let (cache, mut graph) = setup();
        let channel = graph
            .connect_to(PinId(1001), Connectable::Pin(PinId(2001)))
            .unwrap();

        let path = cache.compute_channel_path(&graph, channel, 1.0, 50.0).unwrap();
        assert!(path.starts_with("M 100 25"), "output spoke starts at the pin: {path}");
        assert_eq!(path.matches('M').count(), 2);
        assert!(cache
            .compute_channel_path(&graph, ChannelId(99), 1.0, 50.0)
            .is_none());
    }
}
