//! Zoom-dependent merging of meta-cluster members into render clusters.
//!
//! Two neighbours in a run merge only when the screen-space gap between them
//! is below the stick distance and neither is individually visible. The
//! number of clusters per level is therefore bounded by screen width, not by
//! node count.

use std::sync::Arc;

use rayon::prelude::*;

use crate::flat_tree::{FlatNode, FlatNodeId, FlatTree};
use crate::meta::MetaCluster;

/// Below this many meta-clusters the pass stays on the calling thread.
const PARALLEL_THRESHOLD: usize = 64;

/// Screen-space thresholds used while clustering, in pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClusterSettings {
    /// Gap below which two sub-pixel neighbours stick together.
    pub stick_distance: f64,

    /// Width below which a node is too small to distinguish on its own.
    pub min_block_size: f64,

    /// Rendered width below which a cluster is never re-split.
    pub min_cluster_size: f64,
}

impl ClusterSettings {
    /// Builds settings with `min_cluster_size = 2 * min_block_size + stick_distance`.
    pub fn new(stick_distance: f64, min_block_size: f64) -> Self {
        Self {
            stick_distance,
            min_block_size,
            min_cluster_size: 2.0f64.mul_add(min_block_size, stick_distance),
        }
    }

    /// Same settings with an infinite block size: every neighbour that passes
    /// the gap test merges. Used for the full-range pass and overviews.
    #[must_use]
    pub const fn coarse(self) -> Self {
        Self {
            min_block_size: f64::INFINITY,
            ..self
        }
    }
}

impl Default for ClusterSettings {
    fn default() -> Self {
        Self::new(0.25, 1.0)
    }
}

/// Inclusive time range currently on screen.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Window {
    pub start: f64,
    pub end: f64,
}

impl Window {
    pub const fn new(start: f64, end: f64) -> Self {
        Self { start, end }
    }

    /// A window covering every finite time.
    pub const fn unbounded() -> Self {
        Self {
            start: f64::NEG_INFINITY,
            end: f64::INFINITY,
        }
    }

    /// Whether an interval is at least partially visible.
    ///
    /// Overlapping intervals are visible, as are intervals covering the whole
    /// window (which matters for zero-width windows).
    pub fn intersects(&self, start: f64, end: f64) -> bool {
        (start < self.end && end > self.start) || (start <= self.start && end >= self.end)
    }
}

/// A render and hit-test unit made of one or more same-level nodes.
#[derive(Debug, Clone, PartialEq)]
pub struct Cluster {
    /// Start of the first member.
    pub start: f64,

    /// End of the last member.
    pub end: f64,

    /// `end - start`; not the sum of member durations.
    pub duration: f64,

    pub level: usize,

    /// Visual identity of the first member.
    pub color: Option<String>,
    pub pattern: Option<String>,
    pub kind: Option<String>,

    /// Badge of the first member declaring one.
    pub badge: Option<String>,

    nodes: Arc<[FlatNodeId]>,
}

impl Cluster {
    /// Member ids in flat-tree order. Never empty.
    pub fn nodes(&self) -> &[FlatNodeId] {
        &self.nodes
    }

    /// The member that provides this cluster's name and colors.
    pub fn head(&self) -> FlatNodeId {
        self.nodes[0]
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Always `false`: clusters are only built from at least one node.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

/// Whether `next` may join the cluster whose last member is `last`.
fn sticks(last: &FlatNode, next: &FlatNode, zoom: f64, settings: &ClusterSettings) -> bool {
    (next.start - last.end) * zoom < settings.stick_distance
        && next.duration() * zoom < settings.min_block_size
        && last.duration() * zoom < settings.min_block_size
}

/// Accumulates members of the cluster being built. Opened with its first
/// member, so a finished cluster cannot be empty.
struct OpenCluster {
    members: Vec<FlatNodeId>,
    last: FlatNodeId,
}

impl OpenCluster {
    fn open(id: FlatNodeId) -> Self {
        Self {
            members: vec![id],
            last: id,
        }
    }

    fn push(&mut self, id: FlatNodeId) {
        self.members.push(id);
        self.last = id;
    }

    fn finish(self, tree: &FlatTree) -> Cluster {
        let first = &tree[self.members[0]];
        let last = &tree[self.last];
        let badge = self
            .members
            .iter()
            .find_map(|&id| tree[id].source.badge.clone());
        Cluster {
            start: first.start,
            end: last.end,
            duration: last.end - first.start,
            level: first.level,
            color: first.source.color.clone(),
            pattern: first.source.pattern.clone(),
            kind: first.source.kind.clone(),
            badge,
            nodes: self.members.into(),
        }
    }
}

/// Clusters one run of same-level nodes, appending to `out`.
pub(crate) fn clusterize_run<I>(
    tree: &FlatTree,
    ids: I,
    zoom: f64,
    window: Window,
    settings: &ClusterSettings,
    out: &mut Vec<Cluster>,
) where
    I: IntoIterator<Item = FlatNodeId>,
{
    let mut open: Option<OpenCluster> = None;

    for id in ids {
        let node = &tree[id];
        if !window.intersects(node.start, node.end) {
            continue;
        }
        match open.as_mut() {
            Some(current) if sticks(&tree[current.last], node, zoom, settings) => {
                current.push(id);
            }
            _ => {
                if let Some(done) = open.replace(OpenCluster::open(id)) {
                    out.push(done.finish(tree));
                }
            }
        }
    }

    if let Some(done) = open {
        out.push(done.finish(tree));
    }
}

/// Clusters every meta-cluster for the given zoom (pixels per time unit) and
/// window. Output keeps meta-cluster order.
pub fn clusterize(
    tree: &FlatTree,
    metas: &[MetaCluster],
    zoom: f64,
    window: Window,
    settings: &ClusterSettings,
) -> Vec<Cluster> {
    if metas.len() < PARALLEL_THRESHOLD {
        let mut out = Vec::new();
        for meta in metas {
            clusterize_run(tree, meta.ids(), zoom, window, settings, &mut out);
        }
        return out;
    }

    metas
        .par_iter()
        .flat_map_iter(|meta| {
            let mut out = Vec::new();
            clusterize_run(tree, meta.ids(), zoom, window, settings, &mut out);
            out
        })
        .collect()
}
