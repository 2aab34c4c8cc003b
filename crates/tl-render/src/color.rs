//! Stable generated colors for node types.

use std::collections::HashMap;

use tl_core::Cluster;

/// A small, deterministic hash for turning a type name into a hue.
#[derive(Clone, Copy, Debug)]
struct Fnv1a64(u64);

impl Fnv1a64 {
    const OFFSET_BASIS: u64 = 0xcbf2_9ce4_8422_2325;
    const PRIME: u64 = 0x0100_0000_01b3;

    const fn new() -> Self {
        Self(Self::OFFSET_BASIS)
    }

    fn update(&mut self, bytes: &[u8]) {
        for b in bytes {
            self.0 ^= u64::from(*b);
            self.0 = self.0.wrapping_mul(Self::PRIME);
        }
    }
}

fn hash64(bytes: &[u8]) -> u64 {
    let mut h = Fnv1a64::new();
    h.update(bytes);
    h.0
}

/// Type → color lookup. Explicit node colors always win; types without one
/// get a generated `hsl(...)` string that stays the same for the lifetime of
/// the cache.
#[derive(Debug, Clone, Default)]
pub struct ColorCache {
    by_kind: HashMap<String, String>,
}

impl ColorCache {
    pub const FALLBACK: &'static str = "hsl(210, 12%, 70%)";

    pub fn new() -> Self {
        Self::default()
    }

    /// Forgets every generated color. Called when the data changes.
    pub fn reset(&mut self) {
        self.by_kind.clear();
    }

    pub fn len(&self) -> usize {
        self.by_kind.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_kind.is_empty()
    }

    /// Generated color for a type name.
    pub fn for_kind(&mut self, kind: &str) -> &str {
        self.by_kind
            .entry(kind.to_string())
            .or_insert_with(|| generate(kind))
    }

    /// Fill color for a cluster: its explicit color, else its type's color,
    /// else the fallback.
    pub fn resolve(&mut self, cluster: &Cluster) -> String {
        match (&cluster.color, &cluster.kind) {
            (Some(color), _) => color.clone(),
            (None, Some(kind)) => self.for_kind(kind).to_string(),
            (None, None) => Self::FALLBACK.to_string(),
        }
    }
}

fn generate(kind: &str) -> String {
    let hash = hash64(kind.as_bytes());
    let hue = hash % 360;
    let saturation = 45 + (hash >> 16) % 25;
    let lightness = 55 + (hash >> 32) % 15;
    format!("hsl({hue}, {saturation}%, {lightness}%)")
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use tl_core::{ClusterCache, ClusterSettings, Node, Window};

    use super::*;

    fn single(node: Node) -> Cluster {
        let cache = ClusterCache::build(&[Arc::new(node)], ClusterSettings::default(), 100.0);
        cache.visible(100.0, Window::unbounded()).remove(0)
    }

    #[test]
    fn same_kind_gets_same_color() {
        let mut colors = ColorCache::new();

        let first = colors.for_kind("layout").to_string();
        let second = colors.for_kind("layout").to_string();

        assert_eq!(first, second);
        assert!(first.starts_with("hsl("));
        assert_eq!(colors.len(), 1);
    }

    #[test]
    fn generation_is_deterministic_across_caches() {
        let mut a = ColorCache::new();
        let mut b = ColorCache::new();

        assert_eq!(a.for_kind("paint"), b.for_kind("paint"));
    }

    #[test]
    fn explicit_color_wins() {
        let mut colors = ColorCache::new();

        let cluster = single(Node::new("a", 0.0, 1.0).with_color("red").with_kind("paint"));
        assert_eq!(colors.resolve(&cluster), "red");
        assert!(colors.is_empty());

        let cluster = single(Node::new("b", 0.0, 1.0));
        assert_eq!(colors.resolve(&cluster), ColorCache::FALLBACK);
    }

    #[test]
    fn reset_forgets_generated_colors() {
        let mut colors = ColorCache::new();
        colors.for_kind("gc");

        colors.reset();

        assert!(colors.is_empty());
    }
}
