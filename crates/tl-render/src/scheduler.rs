//! Frame scheduling, input dispatch and compositing.
//!
//! State changes never draw directly. They request either a partial frame
//! (named panes) or a full frame (every pane plus the time axis) from the
//! [`FrameClock`]. Requests before the next callback coalesce; a full request
//! replaces a pending partial one.

use std::collections::BTreeSet;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tl_core::{Bounds, Cluster, ClusterCache, ClusterSettings, FlatNodeId, Node};

use crate::color::ColorCache;
use crate::draw::{DrawBatch, Surface};
use crate::hit::{Cursor, HitRegion, HitRegions, RegionKind};
use crate::pane::{Pane, PaneId};
use crate::plugin::{Hit, Plugin, RenderContext, TooltipContext};
use crate::time_grid::{GridStyle, TimeGrid};
use crate::viewport::Viewport;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct FrameHandle(u64);

impl FrameHandle {
    pub const fn new(id: u64) -> Self {
        Self(id)
    }
}

/// Source of animation-frame callbacks. The host calls
/// [`Scheduler::on_frame`] with the handle once the frame is due.
pub trait FrameClock {
    fn request_frame(&mut self) -> FrameHandle;
    fn cancel_frame(&mut self, handle: FrameHandle);
}

/// Clock driven by hand: handles queue up until the host takes them.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    next: u64,
    pending: Vec<FrameHandle>,
    cancelled: usize,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pending(&self) -> &[FrameHandle] {
        &self.pending
    }

    pub fn take_pending(&mut self) -> Vec<FrameHandle> {
        std::mem::take(&mut self.pending)
    }

    /// Number of handles cancelled so far.
    pub const fn cancelled(&self) -> usize {
        self.cancelled
    }
}

impl FrameClock for ManualClock {
    fn request_frame(&mut self) -> FrameHandle {
        self.next += 1;
        let handle = FrameHandle(self.next);
        self.pending.push(handle);
        handle
    }

    fn cancel_frame(&mut self, handle: FrameHandle) {
        let before = self.pending.len();
        self.pending.retain(|h| *h != handle);
        self.cancelled += before - self.pending.len();
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FrameState {
    Idle,
    Partial {
        handle: FrameHandle,
        panes: BTreeSet<PaneId>,
    },
    Full {
        handle: FrameHandle,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FrameKind {
    Partial,
    Full,
}

impl FrameKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Partial => "partial",
            Self::Full => "full",
        }
    }
}

/// What one committed frame did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FrameReport {
    pub frame: u64,
    pub kind: FrameKind,
    /// Panes re-rendered; the rest were composited from their last batch.
    pub panes: usize,
    pub commands: usize,
    pub regions: usize,
}

/// Pointer and surface input in surface coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum InputEvent {
    PointerDown { x: f64, y: f64 },
    PointerUp { x: f64, y: f64 },
    PointerMove { x: f64, y: f64 },
    PointerLeave,
    Wheel {
        x: f64,
        y: f64,
        #[serde(default)]
        delta_x: f64,
        #[serde(default)]
        delta_y: f64,
    },
    Resize { width: f64, height: f64 },
}

/// Host-facing description of a cluster.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClusterSummary {
    pub name: String,
    pub start: f64,
    pub end: f64,
    pub level: usize,
    pub members: usize,
}

impl ClusterSummary {
    fn new(cluster: &Cluster, data: Option<&ClusterCache>) -> Self {
        let name = data
            .and_then(|d| d.tree().get(cluster.head()))
            .map(|n| n.source.name.clone())
            .unwrap_or_default();
        Self {
            name,
            start: cluster.start,
            end: cluster.end,
            level: cluster.level,
            members: cluster.len(),
        }
    }
}

/// Notifications for the host, drained with [`Scheduler::drain_events`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ChartEvent {
    Hover {
        pane: PaneId,
        cluster: Option<ClusterSummary>,
    },
    Select {
        pane: PaneId,
        cluster: Option<ClusterSummary>,
    },
    CursorChanged {
        cursor: Cursor,
    },
    ViewportChanged {
        zoom: f64,
        position_x: f64,
        real_view: f64,
    },
}

/// Tunables that are not clustering thresholds.
#[derive(Debug, Clone, PartialEq)]
pub struct SchedulerOptions {
    pub settings: ClusterSettings,
    /// Height of the time axis band above the first pane.
    pub axis_height: f64,
    pub grid_spacing: f64,
    pub grid_style: GridStyle,
}

impl Default for SchedulerOptions {
    fn default() -> Self {
        Self {
            settings: ClusterSettings::default(),
            axis_height: 20.0,
            grid_spacing: TimeGrid::DEFAULT_SPACING,
            grid_style: GridStyle::default(),
        }
    }
}

/// Pointer travel in pixels below which a press/release counts as a click.
const CLICK_SLOP: f64 = 3.0;

/// Zoom factor per wheel pixel.
const WHEEL_ZOOM_RATE: f64 = 0.002;

#[derive(Debug, Clone, Copy, PartialEq)]
enum Drag {
    None,
    Panning {
        pane: Option<PaneId>,
        origin: (f64, f64),
        last: (f64, f64),
        moved: bool,
    },
    Resizing {
        pane: PaneId,
        last_y: f64,
    },
}

/// A hit resolved against the region table of the latest pass. `region`
/// indexes that pass only; `head` names the cluster across passes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct HoverKey {
    pane: PaneId,
    region: usize,
    head: Option<FlatNodeId>,
}

impl HoverKey {
    /// Whether two hits name the same thing. Cluster regions compare by head
    /// node; other regions only match within one pass.
    fn same_target(a: Option<Self>, b: Option<Self>) -> bool {
        match (a, b) {
            (None, None) => true,
            (Some(a), Some(b)) => {
                a.pane == b.pane
                    && match (a.head, b.head) {
                        (Some(x), Some(y)) => x == y,
                        (None, None) => a.region == b.region,
                        _ => false,
                    }
            }
            _ => false,
        }
    }
}

pub struct Scheduler<S: Surface, C: FrameClock> {
    surface: S,
    clock: C,
    options: SchedulerOptions,
    viewport: Viewport,
    panes: Vec<Pane>,
    colors: ColorCache,
    state: FrameState,
    axis: DrawBatch,
    overlay: DrawBatch,
    drag: Drag,
    pointer: Option<(f64, f64)>,
    hover: Option<HoverKey>,
    selection: Option<PaneId>,
    cursor: Cursor,
    events: Vec<ChartEvent>,
    frames: u64,
}

impl<S: Surface, C: FrameClock> Scheduler<S, C> {
    pub fn new(surface: S, clock: C, options: SchedulerOptions) -> Self {
        let viewport = Viewport::new(surface.width());
        Self {
            surface,
            clock,
            options,
            viewport,
            panes: Vec::new(),
            colors: ColorCache::new(),
            state: FrameState::Idle,
            axis: DrawBatch::new(),
            overlay: DrawBatch::new(),
            drag: Drag::None,
            pointer: None,
            hover: None,
            selection: None,
            cursor: Cursor::Default,
            events: Vec::new(),
            frames: 0,
        }
    }

    // ── Accessors ───────────────────────────────────────────────────────

    pub const fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub const fn surface(&self) -> &S {
        &self.surface
    }

    pub const fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    pub const fn clock(&self) -> &C {
        &self.clock
    }

    pub const fn clock_mut(&mut self) -> &mut C {
        &mut self.clock
    }

    pub const fn state(&self) -> &FrameState {
        &self.state
    }

    pub const fn is_idle(&self) -> bool {
        matches!(self.state, FrameState::Idle)
    }

    pub const fn cursor(&self) -> Cursor {
        self.cursor
    }

    /// Frames committed so far.
    pub const fn frames(&self) -> u64 {
        self.frames
    }

    pub fn pane_ids(&self) -> impl Iterator<Item = PaneId> + '_ {
        self.panes.iter().map(|p| p.id)
    }

    /// Clusters the pane drew in its last render.
    pub fn pane_clusters(&self, id: PaneId) -> &[Cluster] {
        self.pane(id)
            .map(|p| p.clusters.as_slice())
            .unwrap_or_default()
    }

    pub fn pane_regions(&self, id: PaneId) -> Option<&HitRegions> {
        self.pane(id).map(|p| &p.regions)
    }

    pub fn pane_data(&self, id: PaneId) -> Option<&ClusterCache> {
        self.pane(id).and_then(|p| p.data.as_ref())
    }

    /// `(top, height, scroll_y)` of a pane.
    pub fn pane_geometry(&self, id: PaneId) -> Option<(f64, f64, f64)> {
        self.pane(id).map(|p| (p.top, p.height, p.scroll_y))
    }

    pub fn drain_events(&mut self) -> Vec<ChartEvent> {
        std::mem::take(&mut self.events)
    }

    // ── Panes and data ──────────────────────────────────────────────────

    /// Appends a pane below the existing ones.
    pub fn add_pane(&mut self, mut plugin: Box<dyn Plugin>, height: f64) -> PaneId {
        let id = PaneId::new(self.panes.len());
        if plugin.capabilities().init {
            plugin.init(&self.viewport);
        }
        tracing::debug!(pane = id.index(), plugin = plugin.name(), height, "added pane");
        self.panes.push(Pane::new(id, plugin, height));
        self.layout();
        self.request_full();
        id
    }

    /// Replaces a pane's data. The viewport bounds become the union of every
    /// pane's data and the view is reset to the full range.
    pub fn set_data(&mut self, id: PaneId, roots: &[Arc<Node>]) {
        let width = self.viewport.width();
        let settings = self.options.settings;
        let Some(pane) = self.pane_mut(id) else {
            tracing::warn!(pane = id.index(), "set_data on unknown pane");
            return;
        };
        pane.data = Some(ClusterCache::build(roots, settings, width));
        pane.clusters.clear();
        pane.regions.clear();
        pane.scroll_y = 0.0;

        self.colors.reset();
        if self.hover.is_some_and(|h| h.pane == id) {
            self.hover = None;
        }
        if self.selection == Some(id) {
            self.selection = None;
        }
        self.dispatch(id, None, |p, hit| p.on_hover(hit));
        self.dispatch(id, None, |p, hit| p.on_select(hit));
        let bounds = self
            .panes
            .iter()
            .filter_map(|p| p.data.as_ref().and_then(ClusterCache::bounds))
            .reduce(|a, b| Bounds {
                min: a.min.min(b.min),
                max: a.max.max(b.max),
            });
        match bounds {
            Some(b) => self.viewport.set_min_max(b.min, b.max),
            None => self.viewport.set_min_max(0.0, 0.0),
        }
        self.viewport_changed();
    }

    // ── Viewport API ────────────────────────────────────────────────────

    pub fn set_zoom(&mut self, zoom: f64) {
        if self.viewport.set_zoom(zoom) {
            self.viewport_changed();
        }
    }

    pub fn zoom_at(&mut self, pixel_x: f64, factor: f64) {
        if self.viewport.zoom_at(pixel_x, factor) {
            self.viewport_changed();
        }
    }

    pub fn set_position_x(&mut self, time: f64) {
        if self.viewport.set_position_x(time) {
            self.viewport_changed();
        }
    }

    pub fn fit(&mut self) {
        self.viewport.fit();
        self.viewport_changed();
    }

    /// Scrolls one pane vertically by `dy` pixels.
    pub fn scroll_pane(&mut self, id: PaneId, dy: f64) {
        if self.pane_mut(id).is_some_and(|p| p.scroll_by(dy)) {
            self.request_pane(id);
        }
    }

    pub fn set_pane_height(&mut self, id: PaneId, height: f64) {
        if self.pane_mut(id).is_some_and(|p| p.set_height(height)) {
            self.layout();
            self.request_full();
        }
    }

    // ── Frame requests ──────────────────────────────────────────────────

    /// Requests a full frame.
    pub fn render(&mut self) {
        self.request_full();
    }

    pub fn request_pane(&mut self, id: PaneId) {
        self.request_panes([id]);
    }

    fn request_full(&mut self) {
        match &self.state {
            FrameState::Full { .. } => {}
            FrameState::Partial { handle, .. } => {
                self.clock.cancel_frame(*handle);
                self.state = FrameState::Full {
                    handle: self.clock.request_frame(),
                };
            }
            FrameState::Idle => {
                self.state = FrameState::Full {
                    handle: self.clock.request_frame(),
                };
            }
        }
    }

    /// Requests a partial frame for `ids`. An empty set still recomposites
    /// and reruns the tooltip pass.
    fn request_panes(&mut self, ids: impl IntoIterator<Item = PaneId>) {
        match &mut self.state {
            FrameState::Full { .. } => {}
            FrameState::Partial { panes, .. } => panes.extend(ids),
            FrameState::Idle => {
                self.state = FrameState::Partial {
                    handle: self.clock.request_frame(),
                    panes: ids.into_iter().collect(),
                };
            }
        }
    }

    // ── Frame callback ──────────────────────────────────────────────────

    /// Runs the frame for `handle`. Stale or cancelled handles are ignored.
    pub fn on_frame(&mut self, handle: FrameHandle) -> Option<FrameReport> {
        let due = match &self.state {
            FrameState::Partial { handle: h, .. } | FrameState::Full { handle: h } => *h == handle,
            FrameState::Idle => false,
        };
        if !due {
            tracing::trace!(?handle, "ignoring stale frame");
            return None;
        }
        let (kind, targets) = match std::mem::replace(&mut self.state, FrameState::Idle) {
            FrameState::Full { .. } => (FrameKind::Full, self.pane_ids().collect()),
            FrameState::Partial { panes, .. } => (FrameKind::Partial, panes),
            FrameState::Idle => return None,
        };

        let grid = TimeGrid::new(&self.viewport, self.options.grid_spacing);
        if kind == FrameKind::Full {
            self.axis.clear();
            grid.render(
                &mut self.axis,
                self.surface.height(),
                self.options.axis_height,
                &self.options.grid_style,
            );
        }

        let mut rendered = 0;
        for pane in self.panes.iter_mut().filter(|p| targets.contains(&p.id)) {
            pane.clusters = pane.data.as_ref().map_or_else(Vec::new, |d| {
                d.visible(self.viewport.zoom(), self.viewport.window())
            });
            pane.batch.clear();
            pane.regions.clear();

            let mut ctx = RenderContext {
                pane: pane.id,
                viewport: &self.viewport,
                grid: &grid,
                data: pane.data.as_ref(),
                clusters: &pane.clusters,
                width: self.viewport.width(),
                height: pane.height,
                scroll_y: pane.scroll_y,
                batch: &mut pane.batch,
                regions: &mut pane.regions,
                colors: &mut self.colors,
                text: &self.surface,
                content_height: pane.content_height,
            };
            pane.plugin.render(&mut ctx);
            let content_height = ctx.content_height;
            pane.set_content_height(content_height);
            rendered += 1;
        }

        // Regions were rebuilt; resolve the still pointer against them before
        // the tooltip pass reads the hover state.
        let resting = self.pointer.filter(|_| self.drag == Drag::None);
        if let Some((x, y)) = resting {
            let hit = self.hit_at(x, y);
            self.update_hover(hit);
            let cursor = self.idle_cursor(x, y);
            self.set_cursor(cursor);
        }

        let (width, height) = (self.surface.width(), self.surface.height());
        self.surface.clear_rect(0.0, 0.0, width, height);
        let mut commands = self.surface.commit(&self.axis, 0.0, height);
        for pane in &self.panes {
            commands += self.surface.commit(&pane.batch, pane.top, pane.height);
        }

        self.overlay.clear();
        if let Some(pointer) = self.pointer {
            let accuracy = grid.accuracy();
            for pane in self.panes.iter_mut().filter(|p| p.plugin.capabilities().tooltip) {
                let mut ctx = TooltipContext {
                    pane: pane.id,
                    viewport: &self.viewport,
                    data: pane.data.as_ref(),
                    clusters: &pane.clusters,
                    pointer,
                    surface_width: width,
                    surface_height: height,
                    accuracy,
                    batch: &mut self.overlay,
                    text: &self.surface,
                };
                if pane.plugin.render_tooltip(&mut ctx) {
                    break;
                }
            }
        }
        commands += self.surface.commit(&self.overlay, 0.0, height);

        for pane in self.panes.iter_mut().filter(|p| p.plugin.capabilities().post_render) {
            pane.plugin.post_render(&self.viewport);
        }

        self.frames += 1;
        let report = FrameReport {
            frame: self.frames,
            kind,
            panes: rendered,
            commands,
            regions: self.panes.iter().map(|p| p.regions.len()).sum(),
        };
        tracing::debug!(
            frame = report.frame,
            kind = kind.as_str(),
            panes = report.panes,
            commands = report.commands,
            "committed frame"
        );
        Some(report)
    }

    // ── Input ───────────────────────────────────────────────────────────

    pub fn handle_input(&mut self, event: InputEvent) {
        tracing::trace!(?event, "input");
        match event {
            InputEvent::PointerDown { x, y } => self.pointer_down(x, y),
            InputEvent::PointerMove { x, y } => self.pointer_move(x, y),
            InputEvent::PointerUp { x, y } => self.pointer_up(x, y),
            InputEvent::PointerLeave => {
                self.pointer = None;
                self.drag = Drag::None;
                self.update_hover(None);
                self.set_cursor(Cursor::Default);
                self.request_panes([]);
            }
            InputEvent::Wheel {
                x,
                delta_x,
                delta_y,
                ..
            } => {
                let mut changed = false;
                if delta_y != 0.0 {
                    changed |= self.viewport.zoom_at(x, (-delta_y * WHEEL_ZOOM_RATE).exp());
                }
                if delta_x != 0.0 {
                    changed |= self.viewport.try_to_change_position(delta_x);
                }
                if changed {
                    self.viewport_changed();
                }
            }
            InputEvent::Resize { width, height } => {
                self.surface.resize(width, height);
                self.viewport.set_width(width);
                self.viewport_changed();
            }
        }
    }

    fn pointer_down(&mut self, x: f64, y: f64) {
        self.pointer = Some((x, y));
        let pane = self.pane_index_at(y).map(|i| &self.panes[i]);
        if let Some(pane) = pane.filter(|p| p.on_resize_handle(y)) {
            self.drag = Drag::Resizing {
                pane: pane.id,
                last_y: y,
            };
            self.set_cursor(Cursor::RowResize);
        } else {
            self.drag = Drag::Panning {
                pane: pane.map(|p| p.id),
                origin: (x, y),
                last: (x, y),
                moved: false,
            };
            self.set_cursor(Cursor::Grabbing);
        }
    }

    fn pointer_move(&mut self, x: f64, y: f64) {
        self.pointer = Some((x, y));
        match self.drag {
            Drag::Panning {
                pane,
                origin,
                last,
                moved,
            } => {
                let moved = moved || (x - origin.0).abs() + (y - origin.1).abs() > CLICK_SLOP;
                if !moved {
                    return;
                }
                if self.viewport.try_to_change_position(last.0 - x) {
                    self.viewport_changed();
                }
                if let Some(id) = pane {
                    self.scroll_pane(id, last.1 - y);
                }
                self.drag = Drag::Panning {
                    pane,
                    origin,
                    last: (x, y),
                    moved,
                };
            }
            Drag::Resizing { pane, last_y } => {
                let height = self.pane(pane).map_or(0.0, |p| p.height);
                self.set_pane_height(pane, height + y - last_y);
                self.drag = Drag::Resizing { pane, last_y: y };
            }
            Drag::None => {
                let hit = self.hit_at(x, y);
                let changed = !HoverKey::same_target(hit, self.hover);
                self.update_hover(hit);
                let cursor = self.idle_cursor(x, y);
                self.set_cursor(cursor);
                // The tooltip follows the pointer while hovering.
                if changed || hit.is_some() {
                    self.request_panes([]);
                }
            }
        }
    }

    fn pointer_up(&mut self, x: f64, y: f64) {
        let drag = std::mem::replace(&mut self.drag, Drag::None);
        if let Drag::Panning { moved: false, .. } = drag {
            let hit = self.hit_at(x, y);
            let pane_at = self.pane_index_at(y).map(|i| self.panes[i].id);
            self.select(hit, pane_at);
        }
        let cursor = self.idle_cursor(x, y);
        self.set_cursor(cursor);
    }

    // ── Internals ───────────────────────────────────────────────────────

    fn pane(&self, id: PaneId) -> Option<&Pane> {
        self.panes.get(id.index())
    }

    fn pane_mut(&mut self, id: PaneId) -> Option<&mut Pane> {
        self.panes.get_mut(id.index())
    }

    fn layout(&mut self) {
        let mut top = self.options.axis_height;
        for pane in &mut self.panes {
            pane.top = top;
            top += pane.height;
        }
    }

    fn viewport_changed(&mut self) {
        self.events.push(ChartEvent::ViewportChanged {
            zoom: self.viewport.zoom(),
            position_x: self.viewport.position_x(),
            real_view: self.viewport.real_view(),
        });
        self.request_full();
    }

    fn set_cursor(&mut self, cursor: Cursor) {
        if cursor != self.cursor {
            self.cursor = cursor;
            self.events.push(ChartEvent::CursorChanged { cursor });
        }
    }

    fn pane_index_at(&self, y: f64) -> Option<usize> {
        self.panes.iter().position(|p| p.contains_y(y))
    }

    /// Pane, region index and cluster under a surface point.
    fn hit_at(&self, x: f64, y: f64) -> Option<HoverKey> {
        let pane = &self.panes[self.pane_index_at(y)?];
        let local_y = y - pane.top;
        let (region, hit) = pane
            .regions
            .iter()
            .enumerate()
            .find(|(_, r)| r.contains(x, local_y))?;
        Some(HoverKey {
            pane: pane.id,
            region,
            head: cluster_for(hit, &pane.clusters).map(Cluster::head),
        })
    }

    fn region(&self, key: HoverKey) -> Option<(&Pane, &HitRegion)> {
        let pane = self.pane(key.pane)?;
        let region = pane.regions.get(key.region)?;
        Some((pane, region))
    }

    fn idle_cursor(&self, x: f64, y: f64) -> Cursor {
        let Some(pane) = self.pane_index_at(y).map(|i| &self.panes[i]) else {
            return Cursor::Default;
        };
        if pane.on_resize_handle(y) {
            return Cursor::RowResize;
        }
        self.hit_at(x, y)
            .and_then(|key| self.region(key))
            .and_then(|(_, r)| r.cursor)
            .unwrap_or(Cursor::Grab)
    }

    fn update_hover(&mut self, next: Option<HoverKey>) {
        if HoverKey::same_target(next, self.hover) {
            self.hover = next;
            return;
        }
        let left = self
            .hover
            .take()
            .filter(|prev| next.is_none_or(|n| n.pane != prev.pane));
        if let Some(prev) = left {
            if self.dispatch(prev.pane, None, |p, hit| p.on_hover(hit)) {
                self.request_pane(prev.pane);
            }
            self.events.push(ChartEvent::Hover {
                pane: prev.pane,
                cluster: None,
            });
        }
        self.hover = next;
        let Some(key) = next else { return };
        if self.dispatch(key.pane, Some(key), |p, hit| p.on_hover(hit)) {
            self.request_pane(key.pane);
        }
        self.events.push(ChartEvent::Hover {
            pane: key.pane,
            cluster: self.summary(key),
        });
    }

    fn select(&mut self, hit: Option<HoverKey>, pane_at: Option<PaneId>) {
        let target = hit.map(|k| k.pane).or(pane_at);
        if let Some(prev) = self.selection.filter(|p| Some(*p) != target) {
            if self.dispatch(prev, None, |p, hit| p.on_select(hit)) {
                self.request_pane(prev);
            }
            self.events.push(ChartEvent::Select {
                pane: prev,
                cluster: None,
            });
        }
        let Some(id) = target else {
            self.selection = None;
            return;
        };
        if self.dispatch(id, hit, |p, hit| p.on_select(hit)) {
            self.request_pane(id);
        }
        let summary = hit.and_then(|key| self.summary(key));
        self.selection = summary.is_some().then_some(id);
        self.events.push(ChartEvent::Select {
            pane: id,
            cluster: summary,
        });
    }

    fn summary(&self, key: HoverKey) -> Option<ClusterSummary> {
        let (pane, region) = self.region(key)?;
        cluster_for(region, &pane.clusters).map(|c| ClusterSummary::new(c, pane.data.as_ref()))
    }

    /// Runs a plugin hook with the hit for `key` resolved against the pane.
    fn dispatch<F>(&mut self, id: PaneId, key: Option<HoverKey>, hook: F) -> bool
    where
        F: FnOnce(&mut dyn Plugin, Option<Hit<'_>>) -> bool,
    {
        let Some(pane) = self.panes.get_mut(id.index()) else {
            return false;
        };
        let hit = key
            .and_then(|k| pane.regions.get(k.region))
            .map(|region| Hit {
                region,
                cluster: cluster_for(region, &pane.clusters),
            });
        hook(pane.plugin.as_mut(), hit)
    }
}

fn cluster_for<'a>(region: &HitRegion, clusters: &'a [Cluster]) -> Option<&'a Cluster> {
    if region.kind == RegionKind::Cluster {
        clusters.get(region.data)
    } else {
        None
    }
}
