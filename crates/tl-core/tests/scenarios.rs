//! End-to-end clustering scenarios through the public API.

use std::sync::Arc;

use tl_core::{
    ClusterCache, ClusterSettings, FlatTree, Node, Window, clusterize, meta_clusterize,
    read_trace, same_visual_identity,
};

fn three_siblings() -> Vec<Arc<Node>> {
    vec![
        Arc::new(Node::new("a", 0.0, 1.0).with_color("red")),
        Arc::new(Node::new("b", 1.0, 1.0).with_color("red")),
        Arc::new(Node::new("c", 2.0, 1.0).with_color("red")),
    ]
}

#[test]
fn zoomed_out_siblings_collapse_to_one_cluster() {
    let tree = FlatTree::build(&three_siblings());
    let metas = meta_clusterize(&tree, same_visual_identity);

    let clusters = clusterize(
        &tree,
        &metas,
        0.1,
        Window::new(0.0, 3.0),
        &ClusterSettings::new(2.0, 5.0),
    );

    assert_eq!(clusters.len(), 1);
    assert!((clusters[0].start - 0.0).abs() < f64::EPSILON);
    assert!((clusters[0].end - 3.0).abs() < f64::EPSILON);
}

#[test]
fn zoomed_in_siblings_render_individually() {
    let tree = FlatTree::build(&three_siblings());
    let metas = meta_clusterize(&tree, same_visual_identity);

    let clusters = clusterize(
        &tree,
        &metas,
        100.0,
        Window::new(0.0, 3.0),
        &ClusterSettings::new(2.0, 5.0),
    );

    assert_eq!(clusters.len(), 3);
    for cluster in &clusters {
        assert_eq!(cluster.len(), 1);
    }
}

#[test]
fn color_change_starts_a_new_meta_cluster() {
    let roots = vec![
        Arc::new(Node::new("a", 0.0, 1.0).with_color("red")),
        Arc::new(Node::new("b", 1.0, 1.0).with_color("blue")),
    ];
    let tree = FlatTree::build(&roots);

    let metas = meta_clusterize(&tree, same_visual_identity);

    assert_eq!(metas.len(), 2);
}

#[test]
fn node_spanning_the_window_is_kept() {
    let tree = FlatTree::build(&[Arc::new(Node::new("long", 0.0, 20.0))]);
    let metas = meta_clusterize(&tree, same_visual_identity);

    let clusters = clusterize(
        &tree,
        &metas,
        1.0,
        Window::new(5.0, 10.0),
        &ClusterSettings::default(),
    );

    assert_eq!(clusters.len(), 1);
    assert!((clusters[0].duration - 20.0).abs() < f64::EPSILON);
}

#[test]
fn loaded_trace_flows_through_the_cache() {
    let json = r#"{
        "name": "frame",
        "start": 0,
        "duration": 16,
        "type": "frame",
        "children": [
            {"name": "layout", "start": 0, "duration": 4, "type": "layout"},
            {"name": "paint", "start": 4, "duration": 0.001, "type": "paint"},
            {"name": "paint", "start": 4.001, "duration": 0.001, "type": "paint"},
            {"name": "composite", "start": 10, "duration": 6, "type": "composite", "badge": "red"}
        ]
    }"#;
    let roots = read_trace(json.as_bytes()).unwrap();

    let cache = ClusterCache::build(&roots, ClusterSettings::default(), 160.0);
    let full = cache.visible(10.0, Window::new(0.0, 16.0));
    let names: Vec<&str> = full
        .iter()
        .map(|c| cache.tree()[c.head()].source.name.as_str())
        .collect();

    // At 10px per unit the two paint slices (0.01px each) are still one block.
    assert_eq!(names, vec!["frame", "layout", "paint", "composite"]);
    assert_eq!(full[2].len(), 2);
    assert_eq!(full[3].badge.as_deref(), Some("red"));
}
