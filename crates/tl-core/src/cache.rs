//! Per-data-set clustering state.

use std::sync::Arc;

use serde::Serialize;

use crate::cluster::{Cluster, ClusterSettings, Window, clusterize};
use crate::flat_tree::{Bounds, FlatNode, FlatTree};
use crate::meta::{MetaCluster, meta_clusterize, same_visual_identity};
use crate::node::Node;
use crate::recluster::reclusterize;

/// Everything derived from one data set that does not depend on the
/// viewport: the flat tree, its meta-clusters and the full-range coarse
/// clusters. Rebuilt when the data changes, read on every frame.
#[derive(Debug, Clone, Default)]
pub struct ClusterCache {
    tree: FlatTree,
    metas: Vec<MetaCluster>,
    coarse: Vec<Cluster>,
    settings: ClusterSettings,
}

/// Summary numbers for a data set.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TraceStats {
    pub nodes: usize,
    pub levels: usize,
    pub min: f64,
    pub max: f64,
    pub meta_clusters: usize,
    pub coarse_clusters: usize,
    pub sanitized: usize,
}

impl ClusterCache {
    /// Builds the cache with the default color/pattern/type grouping.
    ///
    /// `width` is the surface width in pixels the data initially spans; it
    /// fixes the zoom of the coarse pass.
    pub fn build(roots: &[Arc<Node>], settings: ClusterSettings, width: f64) -> Self {
        Self::build_with(roots, settings, width, same_visual_identity)
    }

    /// Builds the cache with a custom grouping predicate.
    pub fn build_with<F>(
        roots: &[Arc<Node>],
        settings: ClusterSettings,
        width: f64,
        same_group: F,
    ) -> Self
    where
        F: Fn(&FlatNode, &FlatNode) -> bool,
    {
        let tree = FlatTree::build(roots);
        let metas = meta_clusterize(&tree, same_group);
        let zoom = tree.bounds().map_or(0.0, |b| full_view_zoom(b, width));
        let coarse = clusterize(&tree, &metas, zoom, Window::unbounded(), &settings.coarse());

        tracing::debug!(
            nodes = tree.len(),
            meta_clusters = metas.len(),
            coarse_clusters = coarse.len(),
            zoom,
            "built cluster cache"
        );

        Self {
            tree,
            metas,
            coarse,
            settings,
        }
    }

    pub const fn tree(&self) -> &FlatTree {
        &self.tree
    }

    pub fn metas(&self) -> &[MetaCluster] {
        &self.metas
    }

    /// Full-range clusters computed at build time.
    pub fn coarse(&self) -> &[Cluster] {
        &self.coarse
    }

    pub const fn settings(&self) -> &ClusterSettings {
        &self.settings
    }

    pub const fn bounds(&self) -> Option<Bounds> {
        self.tree.bounds()
    }

    /// Clusters sized for the given zoom and window.
    pub fn visible(&self, zoom: f64, window: Window) -> Vec<Cluster> {
        reclusterize(&self.tree, &self.coarse, zoom, window, &self.settings)
    }

    /// Whole-range clusters at the zoom that fits the data into `width`
    /// pixels, merging regardless of block size. For overview strips.
    pub fn overview(&self, width: f64) -> Vec<Cluster> {
        let Some(bounds) = self.tree.bounds() else {
            return Vec::new();
        };
        clusterize(
            &self.tree,
            &self.metas,
            full_view_zoom(bounds, width),
            Window::new(bounds.min, bounds.max),
            &self.settings.coarse(),
        )
    }

    pub fn stats(&self) -> TraceStats {
        let bounds = self.tree.bounds();
        TraceStats {
            nodes: self.tree.len(),
            levels: if self.tree.is_empty() {
                0
            } else {
                self.tree.max_level() + 1
            },
            min: bounds.map_or(0.0, |b| b.min),
            max: bounds.map_or(0.0, |b| b.max),
            meta_clusters: self.metas.len(),
            coarse_clusters: self.coarse.len(),
            sanitized: self.tree.sanitized(),
        }
    }
}

/// Pixels per time unit that fit `bounds` into `width`.
pub fn full_view_zoom(bounds: Bounds, width: f64) -> f64 {
    let extent = bounds.extent();
    if extent > 0.0 && width > 0.0 {
        width / extent
    } else {
        0.0
    }
}
