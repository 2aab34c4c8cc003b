//! Draw commands, batches and the surface they are committed to.

use serde::Serialize;

/// One drawing primitive in pane-local coordinates.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum DrawCommand {
    ClearRect {
        x: f64,
        y: f64,
        w: f64,
        h: f64,
    },
    FillRect {
        x: f64,
        y: f64,
        w: f64,
        h: f64,
        color: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        pattern: Option<String>,
    },
    StrokeRect {
        x: f64,
        y: f64,
        w: f64,
        h: f64,
        color: String,
        line_width: f64,
    },
    Text {
        x: f64,
        y: f64,
        text: String,
        color: String,
    },
    Triangle {
        points: [(f64, f64); 3],
        color: String,
    },
}

impl DrawCommand {
    /// Vertical extent `(top, bottom)` used for band clipping.
    fn vertical_span(&self) -> (f64, f64) {
        match self {
            Self::ClearRect { y, h, .. }
            | Self::FillRect { y, h, .. }
            | Self::StrokeRect { y, h, .. } => (*y, y + h),
            Self::Text { y, .. } => (*y, *y),
            Self::Triangle { points, .. } => points
                .iter()
                .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &(_, y)| {
                    (lo.min(y), hi.max(y))
                }),
        }
    }

    fn translated(&self, dy: f64) -> Self {
        let mut moved = self.clone();
        match &mut moved {
            Self::ClearRect { y, .. }
            | Self::FillRect { y, .. }
            | Self::StrokeRect { y, .. }
            | Self::Text { y, .. } => *y += dy,
            Self::Triangle { points, .. } => {
                for point in points.iter_mut() {
                    point.1 += dy;
                }
            }
        }
        moved
    }
}

/// Ordered list of commands a pane produced during one render.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DrawBatch {
    commands: Vec<DrawCommand>,
}

impl DrawBatch {
    pub const fn new() -> Self {
        Self {
            commands: Vec::new(),
        }
    }

    pub fn clear(&mut self) {
        self.commands.clear();
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    pub fn push(&mut self, command: DrawCommand) {
        self.commands.push(command);
    }

    pub fn fill_rect(&mut self, x: f64, y: f64, w: f64, h: f64, color: &str, pattern: Option<&str>) {
        self.push(DrawCommand::FillRect {
            x,
            y,
            w,
            h,
            color: color.to_string(),
            pattern: pattern.map(str::to_string),
        });
    }

    pub fn stroke_rect(&mut self, x: f64, y: f64, w: f64, h: f64, color: &str, line_width: f64) {
        self.push(DrawCommand::StrokeRect {
            x,
            y,
            w,
            h,
            color: color.to_string(),
            line_width,
        });
    }

    pub fn text(&mut self, x: f64, y: f64, text: impl Into<String>, color: &str) {
        self.push(DrawCommand::Text {
            x,
            y,
            text: text.into(),
            color: color.to_string(),
        });
    }

    pub fn triangle(&mut self, points: [(f64, f64); 3], color: &str) {
        self.push(DrawCommand::Triangle {
            points,
            color: color.to_string(),
        });
    }
}

/// Text width in pixels as the surface would lay it out.
pub trait TextMeasure {
    fn measure_text(&self, text: &str) -> f64;
}

/// A 2D target the scheduler composites pane batches into.
pub trait Surface: TextMeasure {
    fn width(&self) -> f64;
    fn height(&self) -> f64;
    fn pixel_ratio(&self) -> f64;
    fn resize(&mut self, width: f64, height: f64);

    fn clear_rect(&mut self, x: f64, y: f64, w: f64, h: f64);
    fn fill_rect(&mut self, x: f64, y: f64, w: f64, h: f64, color: &str, pattern: Option<&str>);
    fn stroke_rect(&mut self, x: f64, y: f64, w: f64, h: f64, color: &str, line_width: f64);
    fn fill_text(&mut self, text: &str, x: f64, y: f64, color: &str);
    fn fill_triangle(&mut self, points: [(f64, f64); 3], color: &str);

    /// Composites `batch` shifted down by `offset_y`, skipping commands that
    /// fall entirely outside `[0, clip_height]` in pane coordinates. Returns
    /// the number of commands drawn.
    fn commit(&mut self, batch: &DrawBatch, offset_y: f64, clip_height: f64) -> usize {
        let mut drawn = 0;
        for command in batch.commands() {
            let (top, bottom) = command.vertical_span();
            if bottom < 0.0 || top > clip_height {
                continue;
            }
            match command.translated(offset_y) {
                DrawCommand::ClearRect { x, y, w, h } => self.clear_rect(x, y, w, h),
                DrawCommand::FillRect {
                    x,
                    y,
                    w,
                    h,
                    color,
                    pattern,
                } => self.fill_rect(x, y, w, h, &color, pattern.as_deref()),
                DrawCommand::StrokeRect {
                    x,
                    y,
                    w,
                    h,
                    color,
                    line_width,
                } => self.stroke_rect(x, y, w, h, &color, line_width),
                DrawCommand::Text { x, y, text, color } => self.fill_text(&text, x, y, &color),
                DrawCommand::Triangle { points, color } => self.fill_triangle(points, &color),
            }
            drawn += 1;
        }
        drawn
    }
}

/// Shortens `text` with a trailing ellipsis until it fits `max_width`.
/// Returns `None` when not even the first character fits.
pub fn ellipsize(measure: &dyn TextMeasure, text: &str, max_width: f64) -> Option<String> {
    if measure.measure_text(text) <= max_width {
        return Some(text.to_string());
    }
    let chars: Vec<char> = text.chars().collect();
    (1..chars.len()).rev().find_map(|keep| {
        let candidate: String = chars[..keep].iter().chain(std::iter::once(&'…')).collect();
        (measure.measure_text(&candidate) <= max_width).then_some(candidate)
    })
}

/// Headless surface that records every committed command. Text is measured
/// at a fixed advance per character.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordingSurface {
    width: f64,
    height: f64,
    pixel_ratio: f64,
    char_width: f64,
    commands: Vec<DrawCommand>,
}

impl RecordingSurface {
    pub const DEFAULT_CHAR_WIDTH: f64 = 7.0;

    pub const fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            pixel_ratio: 1.0,
            char_width: Self::DEFAULT_CHAR_WIDTH,
            commands: Vec::new(),
        }
    }

    #[must_use]
    pub const fn with_pixel_ratio(mut self, pixel_ratio: f64) -> Self {
        self.pixel_ratio = pixel_ratio;
        self
    }

    /// Commands drawn since the last `take`.
    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    pub fn take(&mut self) -> Vec<DrawCommand> {
        std::mem::take(&mut self.commands)
    }
}

impl TextMeasure for RecordingSurface {
    fn measure_text(&self, text: &str) -> f64 {
        #[allow(clippy::cast_precision_loss)]
        let chars = text.chars().count() as f64;
        chars * self.char_width
    }
}

impl Surface for RecordingSurface {
    fn width(&self) -> f64 {
        self.width
    }

    fn height(&self) -> f64 {
        self.height
    }

    fn pixel_ratio(&self) -> f64 {
        self.pixel_ratio
    }

    fn resize(&mut self, width: f64, height: f64) {
        self.width = width;
        self.height = height;
    }

    fn clear_rect(&mut self, x: f64, y: f64, w: f64, h: f64) {
        self.commands.push(DrawCommand::ClearRect { x, y, w, h });
    }

    fn fill_rect(&mut self, x: f64, y: f64, w: f64, h: f64, color: &str, pattern: Option<&str>) {
        self.commands.push(DrawCommand::FillRect {
            x,
            y,
            w,
            h,
            color: color.to_string(),
            pattern: pattern.map(str::to_string),
        });
    }

    fn stroke_rect(&mut self, x: f64, y: f64, w: f64, h: f64, color: &str, line_width: f64) {
        self.commands.push(DrawCommand::StrokeRect {
            x,
            y,
            w,
            h,
            color: color.to_string(),
            line_width,
        });
    }

    fn fill_text(&mut self, text: &str, x: f64, y: f64, color: &str) {
        self.commands.push(DrawCommand::Text {
            x,
            y,
            text: text.to_string(),
            color: color.to_string(),
        });
    }

    fn fill_triangle(&mut self, points: [(f64, f64); 3], color: &str) {
        self.commands.push(DrawCommand::Triangle {
            points,
            color: color.to_string(),
        });
    }
}
