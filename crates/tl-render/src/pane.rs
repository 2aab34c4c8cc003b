//! Vertically stacked, independently scrolling panes.

use serde::Serialize;
use tl_core::{Cluster, ClusterCache};

use crate::draw::DrawBatch;
use crate::hit::HitRegions;
use crate::plugin::Plugin;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct PaneId(usize);

impl PaneId {
    pub const fn new(index: usize) -> Self {
        Self(index)
    }

    pub const fn index(self) -> usize {
        self.0
    }
}

/// Height of the grab band at the bottom edge of each pane.
pub const RESIZE_HANDLE: f64 = 4.0;

/// Panes never shrink below this height.
pub const MIN_PANE_HEIGHT: f64 = 20.0;

pub(crate) struct Pane {
    pub(crate) id: PaneId,
    pub(crate) plugin: Box<dyn Plugin>,
    /// Surface y of the pane's top edge.
    pub(crate) top: f64,
    pub(crate) height: f64,
    pub(crate) scroll_y: f64,
    pub(crate) content_height: f64,
    pub(crate) batch: DrawBatch,
    pub(crate) regions: HitRegions,
    pub(crate) data: Option<ClusterCache>,
    pub(crate) clusters: Vec<Cluster>,
}

impl Pane {
    pub(crate) fn new(id: PaneId, plugin: Box<dyn Plugin>, height: f64) -> Self {
        Self {
            id,
            plugin,
            top: 0.0,
            height: clamp_height(height),
            scroll_y: 0.0,
            content_height: 0.0,
            batch: DrawBatch::new(),
            regions: HitRegions::default(),
            data: None,
            clusters: Vec::new(),
        }
    }

    pub(crate) fn max_scroll(&self) -> f64 {
        (self.content_height - self.height).max(0.0)
    }

    /// Scrolls by `dy` pixels within the content. Returns whether the offset
    /// changed.
    pub(crate) fn scroll_by(&mut self, dy: f64) -> bool {
        let next = (self.scroll_y + dy).clamp(0.0, self.max_scroll());
        let changed = next.to_bits() != self.scroll_y.to_bits();
        self.scroll_y = next;
        changed
    }

    pub(crate) fn set_height(&mut self, height: f64) -> bool {
        let height = clamp_height(height);
        let changed = height.to_bits() != self.height.to_bits();
        self.height = height;
        self.scroll_y = self.scroll_y.min(self.max_scroll());
        changed
    }

    /// Re-clamps the scroll offset after the content height changed.
    pub(crate) fn set_content_height(&mut self, content_height: f64) {
        self.content_height = content_height.max(0.0);
        self.scroll_y = self.scroll_y.min(self.max_scroll());
    }

    pub(crate) fn contains_y(&self, y: f64) -> bool {
        y >= self.top && y < self.top + self.height
    }

    pub(crate) fn on_resize_handle(&self, y: f64) -> bool {
        let bottom = self.top + self.height;
        y >= bottom - RESIZE_HANDLE && y < bottom
    }
}

fn clamp_height(height: f64) -> f64 {
    if height.is_finite() {
        height.max(MIN_PANE_HEIGHT)
    } else {
        MIN_PANE_HEIGHT
    }
}
