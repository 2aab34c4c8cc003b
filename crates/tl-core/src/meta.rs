//! Zoom-independent grouping of visually identical neighbours.

use std::ops::Range;

use crate::flat_tree::{FlatNode, FlatNodeId, FlatTree};

/// A contiguous run of same-level nodes in a [`FlatTree`] that share visual
/// identity. Never empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetaCluster {
    level: usize,
    range: Range<usize>,
}

impl MetaCluster {
    pub const fn level(&self) -> usize {
        self.level
    }

    pub fn len(&self) -> usize {
        self.range.len()
    }

    /// Always `false`; present for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.range.is_empty()
    }

    /// Member ids in flat-tree order.
    pub fn ids(&self) -> impl Iterator<Item = FlatNodeId> + '_ {
        self.range.clone().map(FlatNodeId::new)
    }

    /// Member nodes in flat-tree order.
    pub fn nodes<'a>(&self, tree: &'a FlatTree) -> &'a [FlatNode] {
        &tree.nodes()[self.range.clone()]
    }
}

/// Default grouping predicate: same color, pattern and type.
pub fn same_visual_identity(prev: &FlatNode, curr: &FlatNode) -> bool {
    prev.source.color == curr.source.color
        && prev.source.pattern == curr.source.pattern
        && prev.source.kind == curr.source.kind
}

/// Splits the flat sequence into meta-clusters.
///
/// A node extends the current run when it sits on the run's level and
/// `same_group(last, node)` holds for the run's last node. Single pass, no
/// sorting: the flat tree is already ordered by level.
pub fn meta_clusterize<F>(tree: &FlatTree, same_group: F) -> Vec<MetaCluster>
where
    F: Fn(&FlatNode, &FlatNode) -> bool,
{
    let nodes = tree.nodes();
    let mut metas = Vec::new();
    let mut run_start = 0;

    for pos in 1..=nodes.len() {
        let breaks = nodes.get(pos).is_none_or(|node| {
            let last = &nodes[pos - 1];
            node.level != last.level || !same_group(last, node)
        });
        if breaks {
            metas.push(MetaCluster {
                level: nodes[run_start].level,
                range: run_start..pos,
            });
            run_start = pos;
        }
    }

    tracing::debug!(
        nodes = nodes.len(),
        meta_clusters = metas.len(),
        "meta-clusterized flat tree"
    );
    metas
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::node::Node;

    fn tree_of(nodes: Vec<Node>) -> FlatTree {
        let roots: Vec<Arc<Node>> = nodes.into_iter().map(Arc::new).collect();
        FlatTree::build(&roots)
    }

    #[test]
    fn different_colors_split_runs() {
        let tree = tree_of(vec![
            Node::new("a", 0.0, 1.0).with_color("red"),
            Node::new("b", 1.0, 1.0).with_color("blue"),
        ]);

        let metas = meta_clusterize(&tree, same_visual_identity);

        assert_eq!(metas.len(), 2);
        assert_eq!(metas[0].nodes(&tree)[0].source.name, "a");
        assert_eq!(metas[1].nodes(&tree)[0].source.name, "b");
    }

    #[test]
    fn identical_siblings_form_one_run() {
        let tree = tree_of(vec![
            Node::new("a", 0.0, 1.0).with_kind("task"),
            Node::new("b", 1.0, 1.0).with_kind("task"),
            Node::new("c", 2.0, 1.0).with_kind("task"),
        ]);

        let metas = meta_clusterize(&tree, same_visual_identity);

        assert_eq!(metas.len(), 1);
        assert_eq!(metas[0].len(), 3);
        assert_eq!(metas[0].level(), 0);
    }

    #[test]
    fn level_change_always_splits() {
        let tree = tree_of(vec![
            Node::new("root", 0.0, 10.0).with_children([Node::new("child", 0.0, 1.0)]),
        ]);

        let metas = meta_clusterize(&tree, |_, _| true);

        assert_eq!(metas.len(), 2);
        assert_eq!(metas[0].level(), 0);
        assert_eq!(metas[1].level(), 1);
    }

    #[test]
    fn predicate_sees_run_predecessor() {
        let tree = tree_of(vec![
            Node::new("x", 0.0, 1.0),
            Node::new("x", 1.0, 1.0),
            Node::new("y", 2.0, 1.0),
            Node::new("y", 3.0, 1.0),
        ]);

        let metas = meta_clusterize(&tree, |prev, curr| prev.source.name == curr.source.name);

        let lens: Vec<usize> = metas.iter().map(MetaCluster::len).collect();
        assert_eq!(lens, vec![2, 2]);
    }

    #[test]
    fn empty_tree_has_no_runs() {
        let tree = FlatTree::build(&[]);
        assert!(meta_clusterize(&tree, same_visual_identity).is_empty());
    }
}
