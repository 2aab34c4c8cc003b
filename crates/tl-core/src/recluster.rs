//! Incremental refinement of coarse clusters for the current viewport.
//!
//! Runs on every pan and zoom frame. Work is proportional to the number of
//! coarse clusters on screen; only clusters that have grown wide enough to
//! show detail are re-split, and only from their own members.

use crate::cluster::{Cluster, ClusterSettings, Window, clusterize_run};
use crate::flat_tree::FlatTree;

/// Re-splits `clusters` for `zoom` and `window`.
///
/// Invisible clusters are dropped. Clusters narrower than
/// `settings.min_cluster_size` pixels are kept as they are. Wider ones are
/// clustered again from their members with `settings`, and the finer result
/// takes their place.
pub fn reclusterize(
    tree: &FlatTree,
    clusters: &[Cluster],
    zoom: f64,
    window: Window,
    settings: &ClusterSettings,
) -> Vec<Cluster> {
    let mut out = Vec::with_capacity(clusters.len());
    let mut split = 0usize;

    for cluster in clusters {
        if !window.intersects(cluster.start, cluster.end) {
            continue;
        }
        if cluster.duration * zoom < settings.min_cluster_size {
            out.push(cluster.clone());
        } else {
            split += 1;
            clusterize_run(
                tree,
                cluster.nodes().iter().copied(),
                zoom,
                window,
                settings,
                &mut out,
            );
        }
    }

    tracing::trace!(
        coarse = clusters.len(),
        split,
        clusters = out.len(),
        "reclusterized"
    );
    out
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::cluster::clusterize;
    use crate::meta::{meta_clusterize, same_visual_identity};
    use crate::node::Node;

    fn coarse_of(nodes: Vec<Node>) -> (FlatTree, Vec<Cluster>) {
        let roots: Vec<Arc<Node>> = nodes.into_iter().map(Arc::new).collect();
        let tree = FlatTree::build(&roots);
        let metas = meta_clusterize(&tree, same_visual_identity);
        let coarse = clusterize(
            &tree,
            &metas,
            1.0,
            Window::unbounded(),
            &ClusterSettings::default().coarse(),
        );
        (tree, coarse)
    }

    fn row(count: u32) -> Vec<Node> {
        (0..count)
            .map(|i| Node::new(format!("n{i}"), f64::from(i), 1.0))
            .collect()
    }

    #[test]
    fn narrow_cluster_is_kept_whole() {
        let (tree, coarse) = coarse_of(row(10));
        assert_eq!(coarse.len(), 1);

        let clusters = reclusterize(
            &tree,
            &coarse,
            0.1,
            Window::new(0.0, 10.0),
            &ClusterSettings::default(),
        );

        assert_eq!(clusters, coarse);
    }

    #[test]
    fn wide_cluster_is_split_into_visible_nodes() {
        let (tree, coarse) = coarse_of(row(10));

        let clusters = reclusterize(
            &tree,
            &coarse,
            50.0,
            Window::new(0.0, 10.0),
            &ClusterSettings::default(),
        );

        assert_eq!(clusters.len(), 10);
        assert!(clusters.iter().all(|c| c.len() == 1));
    }

    #[test]
    fn split_only_keeps_members_in_window() {
        let (tree, coarse) = coarse_of(row(10));

        let clusters = reclusterize(
            &tree,
            &coarse,
            50.0,
            Window::new(2.5, 4.5),
            &ClusterSettings::default(),
        );

        let names: Vec<&str> = clusters
            .iter()
            .map(|c| tree[c.head()].source.name.as_str())
            .collect();
        assert_eq!(names, vec!["n2", "n3", "n4"]);
    }

    #[test]
    fn invisible_clusters_are_dropped() {
        let (tree, coarse) = coarse_of(vec![
            Node::new("a", 0.0, 1.0).with_color("red"),
            Node::new("b", 100.0, 1.0).with_color("blue"),
        ]);

        let clusters = reclusterize(
            &tree,
            &coarse,
            1.0,
            Window::new(90.0, 110.0),
            &ClusterSettings::default(),
        );

        assert_eq!(clusters.len(), 1);
        assert_eq!(clusters[0].color.as_deref(), Some("blue"));
    }

    #[test]
    fn repeated_calls_are_identical() {
        let (tree, coarse) = coarse_of(row(50));
        let window = Window::new(3.0, 30.0);
        let settings = ClusterSettings::default();

        let first = reclusterize(&tree, &coarse, 0.7, window, &settings);
        let second = reclusterize(&tree, &coarse, 0.7, window, &settings);

        assert_eq!(first, second);
    }
}
