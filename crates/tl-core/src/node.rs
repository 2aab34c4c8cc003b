//! Source tree nodes.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// One interval in a caller-supplied trace tree.
///
/// Nodes are read-only to the engine. Children are reference counted so the
/// flattened view can point back at its source without copying it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    /// Display name.
    pub name: String,

    /// Start time, in trace time units.
    pub start: f64,

    /// Duration, in trace time units. Expected to be non-negative.
    pub duration: f64,

    /// Explicit fill color. Falls back to a color derived from `kind`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,

    /// Fill pattern name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,

    /// Category of the interval (e.g. "task", "gc").
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,

    /// Badge color drawn in the corner of the block.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub badge: Option<String>,

    /// Nested intervals.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Arc<Self>>,
}

impl Node {
    /// Creates a leaf node with no visual attributes.
    pub fn new(name: impl Into<String>, start: f64, duration: f64) -> Self {
        Self {
            name: name.into(),
            start,
            duration,
            color: None,
            pattern: None,
            kind: None,
            badge: None,
            children: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }

    #[must_use]
    pub fn with_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.pattern = Some(pattern.into());
        self
    }

    #[must_use]
    pub fn with_kind(mut self, kind: impl Into<String>) -> Self {
        self.kind = Some(kind.into());
        self
    }

    #[must_use]
    pub fn with_badge(mut self, badge: impl Into<String>) -> Self {
        self.badge = Some(badge.into());
        self
    }

    /// Replaces the children of this node.
    #[must_use]
    pub fn with_children(mut self, children: impl IntoIterator<Item = Self>) -> Self {
        self.children = children.into_iter().map(Arc::new).collect();
        self
    }

    /// End time, `start + duration`.
    pub fn end(&self) -> f64 {
        self.start + self.duration
    }
}
