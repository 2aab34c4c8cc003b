//! Time axis tick computation.

use crate::draw::DrawBatch;
use crate::viewport::Viewport;

/// Tick layout for the current viewport.
///
/// The tick spacing starts at roughly one line per `spacing` pixels for the
/// full view and halves each time the visible span halves, so ticks stay put
/// while zooming instead of sliding continuously.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeGrid {
    delta: f64,
    start: i64,
    end: i64,
    accuracy: usize,
    origin: f64,
    position_x: f64,
    zoom: f64,
}

impl TimeGrid {
    /// Minimum pixel distance between ticks at full view.
    pub const DEFAULT_SPACING: f64 = 120.0;

    pub fn new(viewport: &Viewport, spacing: f64) -> Self {
        let time_width = viewport.max() - viewport.min();
        let initial_lines = viewport.width() / spacing;
        let initial_delta = time_width / initial_lines;
        let real_view = viewport.real_view();
        let proportion = real_view / if time_width > 0.0 { time_width } else { 1.0 };
        let delta = initial_delta / 2f64.powf((1.0 / proportion).log2().floor());

        let mut grid = Self {
            delta: 0.0,
            start: 0,
            end: -1,
            accuracy: 0,
            origin: viewport.min(),
            position_x: viewport.position_x(),
            zoom: viewport.zoom(),
        };
        if !(delta.is_finite() && delta > 0.0) {
            return grid;
        }

        #[allow(clippy::cast_possible_truncation)]
        {
            grid.start = ((viewport.position_x() - viewport.min()) / delta).floor() as i64;
            grid.end = (real_view / delta).ceil() as i64 + grid.start;
        }
        grid.delta = delta;
        grid.accuracy = accuracy_for(delta);
        grid
    }

    /// Time between neighbouring ticks; `0` when there is nothing to show.
    pub const fn delta(&self) -> f64 {
        self.delta
    }

    /// Decimal places needed to tell neighbouring labels apart.
    pub const fn accuracy(&self) -> usize {
        self.accuracy
    }

    /// `(time, x)` for every tick covering the visible span.
    pub fn ticks(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        (self.start..=self.end).map(move |i| {
            #[allow(clippy::cast_precision_loss)]
            let time = (i as f64).mul_add(self.delta, self.origin);
            (time, (time - self.position_x) * self.zoom)
        })
    }

    /// Formats a tick label with the grid's accuracy.
    pub fn label(&self, time: f64) -> String {
        format!("{:.*}", self.accuracy, time - self.origin)
    }

    /// Draws tick lines over `height` pixels and labels inside the top
    /// `axis_height` band.
    pub fn render(&self, batch: &mut DrawBatch, height: f64, axis_height: f64, style: &GridStyle) {
        for (time, x) in self.ticks() {
            batch.fill_rect(x, 0.0, 1.0, height, &style.line_color, None);
            batch.text(
                x + style.label_padding,
                axis_height - style.label_padding,
                self.label(time),
                &style.label_color,
            );
        }
    }
}

/// Colors and spacing for the time axis.
#[derive(Debug, Clone, PartialEq)]
pub struct GridStyle {
    pub line_color: String,
    pub label_color: String,
    pub label_padding: f64,
}

impl Default for GridStyle {
    fn default() -> Self {
        Self {
            line_color: "rgba(90, 90, 90, 0.2)".to_string(),
            label_color: "#444444".to_string(),
            label_padding: 4.0,
        }
    }
}

/// Decimal places such that half a tick step still shows a non-zero digit.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn accuracy_for(delta: f64) -> usize {
    let half = delta / 2.0;
    if half >= 1.0 {
        return 0;
    }
    (-half.log10().floor()) as usize
}
