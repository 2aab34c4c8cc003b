//! Depth-first flattening of a node forest.
//!
//! The flat tree is the single ordered sequence every later stage works on:
//! sorted by level, then start time, then creation order. Parents are
//! referenced by position in that sequence, never by ownership.

use std::ops::Index;
use std::sync::Arc;

use crate::node::Node;

/// Position of a [`FlatNode`] inside its [`FlatTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FlatNodeId(usize);

impl FlatNodeId {
    pub(crate) const fn new(position: usize) -> Self {
        Self(position)
    }

    /// Position in the sorted flat sequence.
    pub const fn index(self) -> usize {
        self.0
    }
}

/// A source node annotated with its place in the hierarchy.
#[derive(Debug, Clone)]
pub struct FlatNode {
    /// The node this entry was built from.
    pub source: Arc<Node>,

    /// Sanitized start time.
    pub start: f64,

    /// `start + duration`, precomputed.
    pub end: f64,

    /// Structural parent, `None` for roots.
    pub parent: Option<FlatNodeId>,

    /// Depth from a root (roots are level 0).
    pub level: usize,

    /// Depth-first creation order. Only used to break sort ties.
    pub index: usize,
}

impl FlatNode {
    pub fn duration(&self) -> f64 {
        self.end - self.start
    }
}

/// Time extent covered by a data set.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min: f64,
    pub max: f64,
}

impl Bounds {
    pub fn extent(&self) -> f64 {
        self.max - self.min
    }
}

/// Sorted, flattened view of a forest.
#[derive(Debug, Clone, Default)]
pub struct FlatTree {
    nodes: Vec<FlatNode>,
    bounds: Option<Bounds>,
    max_level: usize,
    sanitized: usize,
}

impl FlatTree {
    /// Flattens `roots` depth-first and sorts the result by
    /// `(level, start, creation order)`.
    ///
    /// Non-finite starts are treated as `0`; negative or non-finite durations
    /// are treated as `0`. The number of adjusted nodes is available through
    /// [`FlatTree::sanitized`].
    pub fn build(roots: &[Arc<Node>]) -> Self {
        let mut nodes: Vec<FlatNode> = Vec::new();
        let mut sanitized = 0;

        // Explicit stack: traces can be deeper than the call stack allows.
        let mut stack: Vec<(Arc<Node>, Option<usize>, usize)> = roots
            .iter()
            .rev()
            .map(|root| (Arc::clone(root), None, 0))
            .collect();

        while let Some((source, parent, level)) = stack.pop() {
            let index = nodes.len();
            let (start, duration) = sanitize(source.start, source.duration);
            if start.to_bits() != source.start.to_bits()
                || duration.to_bits() != source.duration.to_bits()
            {
                sanitized += 1;
            }

            for child in source.children.iter().rev() {
                stack.push((Arc::clone(child), Some(index), level + 1));
            }

            nodes.push(FlatNode {
                source,
                start,
                end: start + duration,
                parent: parent.map(FlatNodeId),
                level,
                index,
            });
        }

        nodes.sort_unstable_by(|a, b| {
            a.level
                .cmp(&b.level)
                .then(a.start.total_cmp(&b.start))
                .then(a.index.cmp(&b.index))
        });

        // Parents were recorded by creation index; translate to sorted positions.
        let mut position = vec![0; nodes.len()];
        for (pos, node) in nodes.iter().enumerate() {
            position[node.index] = pos;
        }
        for node in &mut nodes {
            node.parent = node.parent.map(|p| FlatNodeId(position[p.0]));
        }

        let bounds = nodes.iter().fold(None, |acc: Option<Bounds>, node| {
            Some(acc.map_or(
                Bounds {
                    min: node.start,
                    max: node.end,
                },
                |b| Bounds {
                    min: b.min.min(node.start),
                    max: b.max.max(node.end),
                },
            ))
        });
        let max_level = nodes.last().map_or(0, |node| node.level);

        if sanitized > 0 {
            tracing::warn!(
                sanitized,
                "clamped nodes with negative or non-finite timing to zero"
            );
        }
        tracing::debug!(nodes = nodes.len(), max_level, "built flat tree");

        Self {
            nodes,
            bounds,
            max_level,
            sanitized,
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// All nodes in sorted order.
    pub fn nodes(&self) -> &[FlatNode] {
        &self.nodes
    }

    pub fn get(&self, id: FlatNodeId) -> Option<&FlatNode> {
        self.nodes.get(id.0)
    }

    /// Structural parent of `id`, if any.
    pub fn parent(&self, id: FlatNodeId) -> Option<&FlatNode> {
        self.get(id)?.parent.and_then(|p| self.get(p))
    }

    /// Iterates `(id, node)` pairs in sorted order.
    pub fn iter(&self) -> impl Iterator<Item = (FlatNodeId, &FlatNode)> {
        self.nodes
            .iter()
            .enumerate()
            .map(|(pos, node)| (FlatNodeId(pos), node))
    }

    /// Earliest start and latest end over all nodes; `None` when empty.
    pub const fn bounds(&self) -> Option<Bounds> {
        self.bounds
    }

    /// Deepest level present (0 when empty).
    pub const fn max_level(&self) -> usize {
        self.max_level
    }

    /// Number of nodes whose timing was clamped during the build.
    pub const fn sanitized(&self) -> usize {
        self.sanitized
    }
}

impl Index<FlatNodeId> for FlatTree {
    type Output = FlatNode;

    fn index(&self, id: FlatNodeId) -> &Self::Output {
        &self.nodes[id.0]
    }
}

fn sanitize(start: f64, duration: f64) -> (f64, f64) {
    let start = if start.is_finite() { start } else { 0.0 };
    let duration = if duration.is_finite() && duration > 0.0 {
        duration
    } else {
        0.0
    };
    (start, duration)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn forest(nodes: Vec<Node>) -> Vec<Arc<Node>> {
        nodes.into_iter().map(Arc::new).collect()
    }

    fn names(tree: &FlatTree) -> Vec<&str> {
        tree.nodes().iter().map(|n| n.source.name.as_str()).collect()
    }

    #[test]
    fn sorts_by_level_then_start() {
        let roots = forest(vec![
            Node::new("b", 10.0, 5.0).with_children([Node::new("b1", 11.0, 1.0)]),
            Node::new("a", 0.0, 5.0).with_children([
                Node::new("a2", 3.0, 1.0),
                Node::new("a1", 1.0, 1.0),
            ]),
        ]);

        let tree = FlatTree::build(&roots);

        assert_eq!(names(&tree), vec!["a", "b", "a1", "a2", "b1"]);
        let levels: Vec<usize> = tree.nodes().iter().map(|n| n.level).collect();
        assert_eq!(levels, vec![0, 0, 1, 1, 1]);
        assert_eq!(tree.max_level(), 1);
    }

    #[test]
    fn equal_starts_keep_creation_order() {
        let roots = forest(vec![
            Node::new("first", 0.0, 1.0),
            Node::new("second", 0.0, 1.0),
            Node::new("third", 0.0, 1.0),
        ]);

        let tree = FlatTree::build(&roots);

        assert_eq!(names(&tree), vec!["first", "second", "third"]);
        let indices: Vec<usize> = tree.nodes().iter().map(|n| n.index).collect();
        assert_eq!(indices, vec![0, 1, 2]);
    }

    #[test]
    fn parents_point_at_sorted_positions() {
        let roots = forest(vec![
            Node::new("late", 50.0, 10.0).with_children([Node::new("late-child", 51.0, 1.0)]),
            Node::new("early", 0.0, 10.0).with_children([Node::new("early-child", 1.0, 1.0)]),
        ]);

        let tree = FlatTree::build(&roots);

        for (id, node) in tree.iter() {
            match node.source.name.as_str() {
                "late-child" => assert_eq!(tree.parent(id).unwrap().source.name, "late"),
                "early-child" => assert_eq!(tree.parent(id).unwrap().source.name, "early"),
                _ => assert!(node.parent.is_none()),
            }
        }
    }

    #[test]
    fn precomputes_end_and_bounds() {
        let roots = forest(vec![
            Node::new("a", 2.0, 3.0),
            Node::new("b", 1.0, 1.0).with_children([Node::new("c", 1.5, 9.0)]),
        ]);

        let tree = FlatTree::build(&roots);

        let a = tree.nodes().iter().find(|n| n.source.name == "a").unwrap();
        assert!((a.end - 5.0).abs() < f64::EPSILON);
        let bounds = tree.bounds().unwrap();
        assert!((bounds.min - 1.0).abs() < f64::EPSILON);
        assert!((bounds.max - 10.5).abs() < f64::EPSILON);
    }

    #[test]
    fn clamps_malformed_timing() {
        let roots = forest(vec![
            Node::new("negative", 5.0, -3.0),
            Node::new("nan-start", f64::NAN, 2.0),
            Node::new("inf-duration", 1.0, f64::INFINITY),
            Node::new("ok", 1.0, 1.0),
        ]);

        let tree = FlatTree::build(&roots);

        assert_eq!(tree.sanitized(), 3);
        for node in tree.nodes() {
            assert!(node.start.is_finite());
            assert!(node.duration() >= 0.0);
        }
        let negative = tree
            .nodes()
            .iter()
            .find(|n| n.source.name == "negative")
            .unwrap();
        assert!(negative.duration().abs() < f64::EPSILON);
    }

    #[test]
    fn empty_forest_has_no_bounds() {
        let tree = FlatTree::build(&[]);
        assert!(tree.is_empty());
        assert!(tree.bounds().is_none());
    }

    #[test]
    fn deep_chains_flatten_one_level_per_depth() {
        let mut node = Node::new("leaf", 0.0, 1.0);
        for depth in 0..1_000 {
            node = Node::new(format!("n{depth}"), 0.0, 1.0).with_children([node]);
        }

        let tree = FlatTree::build(&[Arc::new(node)]);

        assert_eq!(tree.len(), 1_001);
        assert_eq!(tree.max_level(), 1_000);
        assert_eq!(tree.nodes().last().unwrap().source.name, "leaf");
    }
}
