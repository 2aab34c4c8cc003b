//! Default pane: one bar per cluster, stacked by level.

use tl_core::{Cluster, FlatNodeId};

use crate::draw::ellipsize;
use crate::hit::{Cursor, HitRegion, RegionKind};
use crate::plugin::{Capabilities, Hit, Plugin, RenderContext, TooltipContext};

#[derive(Debug, Clone, PartialEq)]
pub struct FlameStyle {
    pub node_height: f64,
    pub label_padding: f64,
    /// Bars narrower than this get no label.
    pub min_label_width: f64,
    pub badge_size: f64,
    pub text_color: String,
    pub hover_color: String,
    pub select_color: String,
    pub tooltip_background: String,
    pub tooltip_line_height: f64,
}

impl Default for FlameStyle {
    fn default() -> Self {
        Self {
            node_height: 20.0,
            label_padding: 4.0,
            min_label_width: 20.0,
            badge_size: 6.0,
            text_color: "#222222".to_string(),
            hover_color: "#555555".to_string(),
            select_color: "#1a73e8".to_string(),
            tooltip_background: "rgba(255, 255, 255, 0.95)".to_string(),
            tooltip_line_height: 16.0,
        }
    }
}

/// Renders reclustered clusters as a flame chart. Hover and selection are
/// tracked by the head node of the cluster, so they survive reclustering:
/// whichever cluster currently contains that node is highlighted.
#[derive(Debug, Clone, Default)]
pub struct FlameChartPane {
    style: FlameStyle,
    hovered: Option<FlatNodeId>,
    selected: Option<FlatNodeId>,
}

impl FlameChartPane {
    pub fn new(style: FlameStyle) -> Self {
        Self {
            style,
            hovered: None,
            selected: None,
        }
    }

    pub const fn hovered(&self) -> Option<FlatNodeId> {
        self.hovered
    }

    pub const fn selected(&self) -> Option<FlatNodeId> {
        self.selected
    }
}

fn holds(cluster: &Cluster, id: Option<FlatNodeId>) -> bool {
    id.is_some_and(|id| cluster.nodes().binary_search(&id).is_ok())
}

impl Plugin for FlameChartPane {
    fn name(&self) -> &str {
        "flame-chart"
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities::NONE.with_tooltip()
    }

    fn render(&mut self, ctx: &mut RenderContext<'_>) {
        let style = &self.style;
        let zoom = ctx.viewport.zoom();
        #[allow(clippy::cast_precision_loss)]
        let level_height = |level: usize| level as f64 * style.node_height;

        ctx.content_height = ctx
            .data
            .filter(|d| !d.tree().is_empty())
            .map_or(0.0, |d| level_height(d.tree().max_level() + 1));

        for (index, cluster) in ctx.clusters.iter().enumerate() {
            let y = level_height(cluster.level) - ctx.scroll_y;
            if y + style.node_height < 0.0 || y > ctx.height {
                continue;
            }
            let x = ctx.viewport.time_to_position(cluster.start);
            let w = (cluster.duration * zoom).max(1.0);
            let h = style.node_height - 1.0;

            let color = ctx.colors.resolve(cluster);
            ctx.batch
                .fill_rect(x, y, w, h, &color, cluster.pattern.as_deref());

            let label_x = x.max(0.0) + style.label_padding;
            let label_room = (x + w).min(ctx.width) - label_x - style.label_padding;
            if label_room >= style.min_label_width {
                let name = ctx
                    .data
                    .and_then(|d| d.tree().get(cluster.head()))
                    .map(|n| n.source.name.as_str())
                    .unwrap_or_default();
                if let Some(label) = ellipsize(ctx.text, name, label_room) {
                    ctx.batch
                        .text(label_x, y + h - style.label_padding, label, &style.text_color);
                }
            }

            if let Some(badge) = &cluster.badge {
                let b = style.badge_size.min(w);
                ctx.batch
                    .triangle([(x, y), (x + b, y), (x, y + b)], badge);
            }
            if holds(cluster, self.selected) {
                ctx.batch
                    .stroke_rect(x, y, w, h, &style.select_color, 2.0);
            } else if holds(cluster, self.hovered) {
                ctx.batch
                    .stroke_rect(x, y, w, h, &style.hover_color, 1.0);
            }

            ctx.regions.add(HitRegion {
                kind: RegionKind::Cluster,
                data: index,
                x,
                y,
                w,
                h: style.node_height,
                cursor: Some(Cursor::Pointer),
                pane: ctx.pane,
            });
        }
    }

    fn render_tooltip(&mut self, ctx: &mut TooltipContext<'_>) -> bool {
        let Some(cluster) = ctx.clusters.iter().find(|c| holds(c, self.hovered)) else {
            return false;
        };
        let name = ctx
            .data
            .and_then(|d| d.tree().get(cluster.head()))
            .map(|n| n.source.name.clone())
            .unwrap_or_default();
        let lines = [
            name,
            format!("{:.*}", ctx.accuracy, cluster.duration),
            if cluster.len() == 1 {
                "1 node".to_string()
            } else {
                format!("{} nodes", cluster.len())
            },
        ];

        let style = &self.style;
        let text_width = lines
            .iter()
            .map(|l| ctx.text.measure_text(l))
            .fold(0.0, f64::max);
        let w = 2.0f64.mul_add(style.label_padding, text_width);
        #[allow(clippy::cast_precision_loss)]
        let h = (lines.len() as f64).mul_add(style.tooltip_line_height, style.label_padding);
        let (px, py) = ctx.pointer;
        let x = (px + 12.0).min(ctx.surface_width - w).max(0.0);
        let y = (py + 12.0).min(ctx.surface_height - h).max(0.0);

        ctx.batch
            .fill_rect(x, y, w, h, &style.tooltip_background, None);
        ctx.batch
            .stroke_rect(x, y, w, h, &style.hover_color, 1.0);
        let mut baseline = y;
        for line in lines {
            baseline += style.tooltip_line_height;
            ctx.batch
                .text(x + style.label_padding, baseline, line, &style.text_color);
        }
        true
    }

    fn on_hover(&mut self, hit: Option<Hit<'_>>) -> bool {
        let next = hit.and_then(|h| h.cluster).map(Cluster::head);
        let changed = next != self.hovered;
        self.hovered = next;
        changed
    }

    fn on_select(&mut self, hit: Option<Hit<'_>>) -> bool {
        let next = hit.and_then(|h| h.cluster).map(Cluster::head);
        let changed = next != self.selected;
        self.selected = next;
        changed
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use tl_core::{ClusterCache, ClusterSettings, Node};

    use super::*;
    use crate::color::ColorCache;
    use crate::draw::{DrawBatch, DrawCommand, RecordingSurface};
    use crate::hit::HitRegions;
    use crate::pane::PaneId;
    use crate::time_grid::TimeGrid;
    use crate::viewport::Viewport;

    struct Fixture {
        cache: ClusterCache,
        viewport: Viewport,
        clusters: Vec<Cluster>,
        surface: RecordingSurface,
    }

    fn fixture() -> Fixture {
        let root = Node::new("frame", 0.0, 100.0)
            .with_kind("frame")
            .with_children([
                Node::new("layout", 0.0, 40.0).with_color("green"),
                Node::new("paint", 50.0, 50.0)
                    .with_color("orange")
                    .with_badge("red"),
            ]);
        let cache = ClusterCache::build(&[Arc::new(root)], ClusterSettings::default(), 1000.0);
        let mut viewport = Viewport::new(1000.0);
        viewport.set_min_max(0.0, 100.0);
        let clusters = cache.visible(viewport.zoom(), viewport.window());
        Fixture {
            cache,
            viewport,
            clusters,
            surface: RecordingSurface::new(1000.0, 200.0),
        }
    }

    fn render(pane: &mut FlameChartPane, f: &Fixture) -> (DrawBatch, HitRegions, f64) {
        let grid = TimeGrid::new(&f.viewport, TimeGrid::DEFAULT_SPACING);
        let mut batch = DrawBatch::new();
        let mut regions = HitRegions::default();
        let mut colors = ColorCache::new();
        let mut ctx = RenderContext {
            pane: PaneId::new(0),
            viewport: &f.viewport,
            grid: &grid,
            data: Some(&f.cache),
            clusters: &f.clusters,
            width: 1000.0,
            height: 200.0,
            scroll_y: 0.0,
            batch: &mut batch,
            regions: &mut regions,
            colors: &mut colors,
            text: &f.surface,
            content_height: 0.0,
        };
        pane.render(&mut ctx);
        let content_height = ctx.content_height;
        (batch, regions, content_height)
    }

    #[test]
    fn one_bar_and_region_per_cluster() {
        let f = fixture();
        let mut pane = FlameChartPane::default();

        let (batch, regions, content_height) = render(&mut pane, &f);

        assert_eq!(f.clusters.len(), 3);
        assert_eq!(regions.len(), 3);
        assert!((content_height - 40.0).abs() < f64::EPSILON);
        let bars: Vec<(f64, f64, f64)> = batch
            .commands()
            .iter()
            .filter_map(|c| match c {
                DrawCommand::FillRect { x, y, w, .. } => Some((*x, *y, *w)),
                _ => None,
            })
            .collect();
        assert_eq!(bars, vec![(0.0, 0.0, 1000.0), (0.0, 20.0, 400.0), (500.0, 20.0, 500.0)]);
    }

    #[test]
    fn labels_and_badges_are_drawn() {
        let f = fixture();
        let mut pane = FlameChartPane::default();

        let (batch, _, _) = render(&mut pane, &f);

        let labels: Vec<&str> = batch
            .commands()
            .iter()
            .filter_map(|c| match c {
                DrawCommand::Text { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(labels, vec!["frame", "layout", "paint"]);
        assert!(batch.commands().iter().any(
            |c| matches!(c, DrawCommand::Triangle { color, .. } if color == "red")
        ));
    }

    #[test]
    fn selection_is_stroked_and_tracked_by_head() {
        let f = fixture();
        let mut pane = FlameChartPane::default();
        let (_, regions, _) = render(&mut pane, &f);
        let region = regions.find(600.0, 25.0).unwrap();
        let hit = Hit {
            region,
            cluster: f.clusters.get(region.data),
        };

        assert!(pane.on_select(Some(hit)));
        assert!(!pane.on_select(Some(hit)));
        assert_eq!(pane.selected(), Some(f.clusters[2].head()));

        let (batch, _, _) = render(&mut pane, &f);
        assert!(batch.commands().iter().any(
            |c| matches!(c, DrawCommand::StrokeRect { x, line_width, .. } if (*x - 500.0).abs() < 1e-9 && (*line_width - 2.0).abs() < 1e-9)
        ));
    }

    #[test]
    fn tooltip_describes_hovered_cluster() {
        let f = fixture();
        let mut pane = FlameChartPane::default();
        let (_, regions, _) = render(&mut pane, &f);
        let region = regions.find(100.0, 25.0).unwrap();
        pane.on_hover(Some(Hit {
            region,
            cluster: f.clusters.get(region.data),
        }));
        let mut overlay = DrawBatch::new();

        let drawn = pane.render_tooltip(&mut TooltipContext {
            pane: PaneId::new(0),
            viewport: &f.viewport,
            data: Some(&f.cache),
            clusters: &f.clusters,
            pointer: (100.0, 45.0),
            surface_width: 1000.0,
            surface_height: 200.0,
            accuracy: 1,
            batch: &mut overlay,
            text: &f.surface,
        });

        assert!(drawn);
        let lines: Vec<&str> = overlay
            .commands()
            .iter()
            .filter_map(|c| match c {
                DrawCommand::Text { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(lines, vec!["layout", "40.0", "1 node"]);
    }

    #[test]
    fn no_tooltip_without_hover() {
        let f = fixture();
        let mut pane = FlameChartPane::default();
        let mut overlay = DrawBatch::new();

        let drawn = pane.render_tooltip(&mut TooltipContext {
            pane: PaneId::new(0),
            viewport: &f.viewport,
            data: Some(&f.cache),
            clusters: &f.clusters,
            pointer: (0.0, 0.0),
            surface_width: 1000.0,
            surface_height: 200.0,
            accuracy: 0,
            batch: &mut overlay,
            text: &f.surface,
        });

        assert!(!drawn);
        assert!(overlay.is_empty());
    }
}
