//! Channel rendering registry for the node editor.
//!
//! This module provides [`ChannelManager`], which tracks the live channels
//! of a [`ChannelGraph`] from its membership events and keeps their visual
//! paths in sync for rendering.
//!
//! # Example
//!
//! ```ignore
//! use slint_node_channels::{ChannelGraph, ChannelManager, GeometryCache};
//!
//! let cache = Rc::new(RefCell::new(GeometryCache::new()));
//! let mut channels = ChannelManager::new(cache.clone());
//!
//! // Bind once - auto-syncs on every update_paths call
//! let model = Rc::new(VecModel::<ChannelPath>::default());
//! channels.bind_model(model.clone(), |id, path, color, width| ChannelPath {
//!     id,
//!     path_commands: path,
//!     color,
//!     line_width: width,
//! });
//! window.set_channel_paths(ModelRc::from(model));
//!
//! // After every graph mutation
//! let events = graph.drain_events();
//! let touched: Vec<_> = events.iter().map(|e| e.channel()).collect();
//! channels.apply_events(events);
//! channels.update_channel_paths(&graph, touched);
//!
//! // After nodes moved
//! channels.update_paths(&graph);
//! ```

use crate::config::EditorConfig;
use crate::graph::{ChannelEvent, ChannelGraph, ChannelId};
use crate::state::GeometryCache;
use slint::{Color, Model, ModelRc, SharedString, VecModel};
use std::cell::RefCell;
use std::collections::BTreeSet;
use std::rc::Rc;

/// Internal trait for auto-syncing to Slint models.
trait ModelSyncer {
    fn sync(&self, paths: &[ChannelPathData]);
}

struct ConcreteModelSyncer<P, F> {
    model: Rc<VecModel<P>>,
    constructor: F,
}

impl<P, F> ModelSyncer for ConcreteModelSyncer<P, F>
where
    P: Clone + 'static,
    F: Fn(i32, SharedString, Color, f32) -> P,
{
    fn sync(&self, paths: &[ChannelPathData]) {
        sync_rows(&self.model, paths, &self.constructor);
    }
}

fn sync_rows<P, F>(model: &VecModel<P>, paths: &[ChannelPathData], constructor: &F)
where
    P: Clone + 'static,
    F: Fn(i32, SharedString, Color, f32) -> P,
{
    for (i, path) in paths.iter().enumerate() {
        let item = constructor(
            path.id.0,
            SharedString::from(path.path_commands.as_str()),
            path.color,
            path.line_width,
        );
        if i < model.row_count() {
            model.set_row_data(i, item);
        } else {
            model.push(item);
        }
    }
    while model.row_count() > paths.len() {
        model.remove(model.row_count() - 1);
    }
}

#[derive(Clone, Debug, PartialEq)]
struct ChannelPathData {
    id: ChannelId,
    path_commands: String,
    color: Color,
    line_width: f32,
}

/// Registry of live channels and their rendered paths.
///
/// Entries are added and removed from [`ChannelEvent`]s only, so the
/// manager mirrors whatever the graph reported. Paths are computed from the
/// shared [`GeometryCache`]; channels whose pins have no reported position
/// yet are skipped until they do.
pub struct ChannelManager {
    cache: Rc<RefCell<GeometryCache>>,
    channels: BTreeSet<ChannelId>,
    paths: Vec<ChannelPathData>,
    config: EditorConfig,
    zoom: f32,
    syncer: Option<Box<dyn ModelSyncer>>,
}

impl ChannelManager {
    /// Create a manager reading positions from `cache`.
    pub fn new(cache: Rc<RefCell<GeometryCache>>) -> Self {
        Self::with_config(cache, EditorConfig::default())
    }

    pub fn with_config(cache: Rc<RefCell<GeometryCache>>, config: EditorConfig) -> Self {
        Self {
            cache,
            channels: BTreeSet::new(),
            paths: Vec::new(),
            config,
            zoom: 1.0,
            syncer: None,
        }
    }

    /// Bind to a Slint model for automatic synchronization.
    ///
    /// `constructor` builds a row from (channel id, path commands, color,
    /// line width).
    pub fn bind_model<P, F>(&mut self, model: Rc<VecModel<P>>, constructor: F)
    where
        P: Clone + 'static,
        F: Fn(i32, SharedString, Color, f32) -> P + 'static,
    {
        self.syncer = Some(Box::new(ConcreteModelSyncer { model, constructor }));
    }

    /// Add and remove registry entries from membership notifications.
    ///
    /// Returns `true` if any channel was added or removed.
    pub fn apply_events<I>(&mut self, events: I) -> bool
    where
        I: IntoIterator<Item = ChannelEvent>,
    {
        let mut changed = false;
        for event in events {
            match event {
                ChannelEvent::Created { channel, .. } => {
                    changed |= self.channels.insert(channel);
                }
                ChannelEvent::Dissolved { channel, .. } => {
                    changed |= self.channels.remove(&channel);
                }
                ChannelEvent::Joined { .. } | ChannelEvent::Left { .. } => {}
            }
        }
        changed
    }

    /// Recompute every path from current membership and positions.
    ///
    /// Call this whenever:
    /// - Pin positions change (node moved)
    /// - Zoom level or bezier offset changes
    pub fn update_paths(&mut self, graph: &ChannelGraph) {
        let cache = self.cache.borrow();
        self.paths = self
            .channels
            .iter()
            .filter_map(|&id| self.compute_path(&cache, graph, id))
            .collect();
        drop(cache);
        self.sync();
    }

    /// Recompute the paths of `ids` only, after their membership changed.
    ///
    /// Ids no longer registered lose their path; the others keep ascending
    /// id order in the bound model.
    pub fn update_channel_paths<I>(&mut self, graph: &ChannelGraph, ids: I)
    where
        I: IntoIterator<Item = ChannelId>,
    {
        let cache = self.cache.borrow();
        for id in ids {
            self.paths.retain(|p| p.id != id);
            if !self.channels.contains(&id) {
                continue;
            }
            if let Some(path) = self.compute_path(&cache, graph, id) {
                let at = self.paths.partition_point(|p| p.id < id);
                self.paths.insert(at, path);
            }
        }
        drop(cache);
        self.sync();
    }

    fn compute_path(
        &self,
        cache: &GeometryCache,
        graph: &ChannelGraph,
        id: ChannelId,
    ) -> Option<ChannelPathData> {
        let Some(channel) = graph.channel(id) else {
            log::warn!("channel {} is registered but missing from the graph", id);
            return None;
        };
        let path = cache.compute_channel_path(graph, id, self.zoom, self.config.bezier_offset)?;
        Some(ChannelPathData {
            id,
            path_commands: path,
            color: self.config.type_color(channel.data_type()),
            line_width: self.config.line_width,
        })
    }

    fn sync(&self) {
        if let Some(syncer) = &self.syncer {
            syncer.sync(&self.paths);
        }
    }

    pub fn set_zoom(&mut self, zoom: f32) {
        self.zoom = zoom;
    }

    pub fn zoom(&self) -> f32 {
        self.zoom
    }

    /// Set the bezier curve offset (default: 50.0).
    pub fn set_bezier_offset(&mut self, offset: f32) {
        self.config.bezier_offset = offset;
    }

    pub fn config_mut(&mut self) -> &mut EditorConfig {
        &mut self.config
    }

    pub fn contains(&self, id: ChannelId) -> bool {
        self.channels.contains(&id)
    }

    /// Registered channel ids in ascending order.
    pub fn ids(&self) -> impl Iterator<Item = ChannelId> + '_ {
        self.channels.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.channels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }

    /// Last path commands computed for `id`.
    pub fn path(&self, id: ChannelId) -> Option<&str> {
        self.paths
            .iter()
            .find(|p| p.id == id)
            .map(|p| p.path_commands.as_str())
    }

    /// Create a fresh Slint model of the current paths.
    pub fn create_paths_model<P, F>(&self, constructor: F) -> ModelRc<P>
    where
        P: Clone + 'static,
        F: Fn(i32, SharedString, Color, f32) -> P,
    {
        let model: Rc<VecModel<P>> = Rc::new(VecModel::default());
        sync_rows(&model, &self.paths, &constructor);
        ModelRc::from(model)
    }
}
