//! Viewport, frame scheduling and pane rendering for treeline charts.
//!
//! The [`Scheduler`] owns the [`Viewport`] and a stack of panes. Input and
//! API calls mutate state synchronously and request frames from a
//! [`FrameClock`]; each frame reclusters the affected panes, lets their
//! [`Plugin`] draw into a [`DrawBatch`], and composites every batch onto the
//! [`Surface`].

mod color;
mod draw;
mod flame;
mod hit;
mod pane;
mod plugin;
mod scheduler;
mod time_grid;
mod viewport;

pub use color::ColorCache;
pub use draw::{DrawBatch, DrawCommand, RecordingSurface, Surface, TextMeasure, ellipsize};
pub use flame::{FlameChartPane, FlameStyle};
pub use hit::{Cursor, HitRegion, HitRegions, RegionKind};
pub use pane::{MIN_PANE_HEIGHT, PaneId, RESIZE_HANDLE};
pub use plugin::{Capabilities, Hit, Plugin, RenderContext, TooltipContext};
pub use scheduler::{
    ChartEvent, ClusterSummary, FrameClock, FrameHandle, FrameKind, FrameReport, FrameState,
    InputEvent, ManualClock, Scheduler, SchedulerOptions,
};
pub use time_grid::{GridStyle, TimeGrid};
pub use viewport::Viewport;
