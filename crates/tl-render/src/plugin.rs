//! Pane plugin contract.

use tl_core::{Cluster, ClusterCache};

use crate::color::ColorCache;
use crate::draw::{DrawBatch, TextMeasure};
use crate::hit::{HitRegion, HitRegions};
use crate::pane::PaneId;
use crate::time_grid::TimeGrid;
use crate::viewport::Viewport;

/// Optional hooks a plugin implements. The scheduler only dispatches hooks
/// that are declared here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Capabilities {
    pub init: bool,
    pub tooltip: bool,
    pub post_render: bool,
}

impl Capabilities {
    pub const NONE: Self = Self {
        init: false,
        tooltip: false,
        post_render: false,
    };

    #[must_use]
    pub const fn with_init(mut self) -> Self {
        self.init = true;
        self
    }

    #[must_use]
    pub const fn with_tooltip(mut self) -> Self {
        self.tooltip = true;
        self
    }

    #[must_use]
    pub const fn with_post_render(mut self) -> Self {
        self.post_render = true;
        self
    }
}

/// Everything a plugin sees while drawing its pane. Coordinates are
/// pane-local: `y = 0` is the top of the pane before scrolling.
pub struct RenderContext<'a> {
    pub pane: PaneId,
    pub viewport: &'a Viewport,
    pub grid: &'a TimeGrid,
    pub data: Option<&'a ClusterCache>,
    /// Clusters for the current zoom and window, already reclustered.
    pub clusters: &'a [Cluster],
    pub width: f64,
    pub height: f64,
    pub scroll_y: f64,
    pub batch: &'a mut DrawBatch,
    pub regions: &'a mut HitRegions,
    pub colors: &'a mut ColorCache,
    pub text: &'a dyn TextMeasure,
    /// Total height of the pane's content; the scheduler clamps scrolling
    /// to it. Plugins set this during `render`.
    pub content_height: f64,
}

/// Input to the tooltip pass. Coordinates are surface coordinates.
pub struct TooltipContext<'a> {
    pub pane: PaneId,
    pub viewport: &'a Viewport,
    pub data: Option<&'a ClusterCache>,
    pub clusters: &'a [Cluster],
    pub pointer: (f64, f64),
    pub surface_width: f64,
    pub surface_height: f64,
    /// Decimal places for time values.
    pub accuracy: usize,
    pub batch: &'a mut DrawBatch,
    pub text: &'a dyn TextMeasure,
}

/// A resolved hit: the region under the pointer and, for cluster regions,
/// the cluster it refers to.
#[derive(Debug, Clone, Copy)]
pub struct Hit<'a> {
    pub region: &'a HitRegion,
    pub cluster: Option<&'a Cluster>,
}

pub trait Plugin {
    fn name(&self) -> &str;

    fn capabilities(&self) -> Capabilities {
        Capabilities::NONE
    }

    /// Called once when the pane is added.
    fn init(&mut self, _viewport: &Viewport) {}

    fn render(&mut self, ctx: &mut RenderContext<'_>);

    /// Draws a tooltip into the overlay batch. Returns whether one was drawn;
    /// the pass stops at the first pane that draws.
    fn render_tooltip(&mut self, _ctx: &mut TooltipContext<'_>) -> bool {
        false
    }

    /// Called after every committed frame.
    fn post_render(&mut self, _viewport: &Viewport) {}

    /// Hover moved onto `hit` (or off the pane). Returns whether the pane
    /// needs a redraw.
    fn on_hover(&mut self, _hit: Option<Hit<'_>>) -> bool {
        false
    }

    /// Click selected `hit` (or cleared the selection). Returns whether the
    /// pane needs a redraw.
    fn on_select(&mut self, _hit: Option<Hit<'_>>) -> bool {
        false
    }
}
