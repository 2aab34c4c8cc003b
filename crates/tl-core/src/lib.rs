//! Adaptive-resolution clustering for large interval trees.
//!
//! This crate turns a trace forest into a render-ready partition that
//! depends on the viewport:
//! - Flat tree: depth-first flattening sorted by level and start
//! - Meta-clusters: zoom-independent runs of visually identical neighbours
//! - Clusters: zoom-dependent merging of sub-pixel neighbours
//! - Reclustering: cheap per-frame refinement of coarse clusters

mod cache;
mod cluster;
mod flat_tree;
mod meta;
pub mod node;
mod recluster;
pub mod trace;

pub use cache::{ClusterCache, TraceStats, full_view_zoom};
pub use cluster::{Cluster, ClusterSettings, Window, clusterize};
pub use flat_tree::{Bounds, FlatNode, FlatNodeId, FlatTree};
pub use meta::{MetaCluster, meta_clusterize, same_visual_identity};
pub use node::Node;
pub use recluster::reclusterize;
pub use trace::{TraceError, load_trace, read_trace};
