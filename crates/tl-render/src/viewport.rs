//! Horizontal viewport state: zoom, offset and data bounds.

use tl_core::Window;

use crate::time_grid::TimeGrid;

/// Maps trace time onto surface pixels.
///
/// `zoom` is pixels per time unit and never drops below the zoom that fits
/// the whole data range into the surface width. `position_x` is the time at
/// the left edge and stays within the data bounds.
#[derive(Debug, Clone, PartialEq)]
pub struct Viewport {
    zoom: f64,
    position_x: f64,
    min: f64,
    max: f64,
    width: f64,
}

impl Viewport {
    pub fn new(width: f64) -> Self {
        Self {
            zoom: 1.0,
            position_x: 0.0,
            min: 0.0,
            max: 0.0,
            width: width.max(0.0),
        }
    }

    pub const fn zoom(&self) -> f64 {
        self.zoom
    }

    pub const fn position_x(&self) -> f64 {
        self.position_x
    }

    pub const fn min(&self) -> f64 {
        self.min
    }

    pub const fn max(&self) -> f64 {
        self.max
    }

    pub const fn width(&self) -> f64 {
        self.width
    }

    /// Zoom that fits `[min, max]` into the surface width.
    pub fn initial_zoom(&self) -> f64 {
        let extent = self.max - self.min;
        if extent > 0.0 && self.width > 0.0 {
            self.width / extent
        } else {
            1.0
        }
    }

    /// Replaces the data bounds and resets to the full view.
    pub fn set_min_max(&mut self, min: f64, max: f64) {
        if min.is_finite() && max.is_finite() && min <= max {
            self.min = min;
            self.max = max;
        } else {
            self.min = 0.0;
            self.max = 0.0;
        }
        self.fit();
    }

    /// Shows the whole data range.
    pub fn fit(&mut self) {
        self.zoom = self.initial_zoom();
        self.position_x = self.min;
    }

    /// Updates the surface width, re-clamping zoom and position.
    pub fn set_width(&mut self, width: f64) -> bool {
        let width = if width.is_finite() { width.max(0.0) } else { 0.0 };
        let before = (self.zoom, self.position_x, self.width);
        self.width = width;
        self.zoom = self.zoom.max(self.initial_zoom());
        self.position_x = self.clamp_position(self.position_x);
        before != (self.zoom, self.position_x, self.width)
    }

    /// Sets the zoom, clamped to the full-view zoom. Returns whether anything
    /// changed.
    pub fn set_zoom(&mut self, zoom: f64) -> bool {
        if !zoom.is_finite() || zoom <= 0.0 {
            return false;
        }
        let before = (self.zoom, self.position_x);
        self.zoom = zoom.max(self.initial_zoom());
        self.position_x = self.clamp_position(self.position_x);
        before != (self.zoom, self.position_x)
    }

    /// Moves the left edge to `time`, clamped to the data bounds.
    pub fn set_position_x(&mut self, time: f64) -> bool {
        if !time.is_finite() {
            return false;
        }
        let clamped = self.clamp_position(time);
        let changed = clamped.to_bits() != self.position_x.to_bits();
        self.position_x = clamped;
        changed
    }

    /// Pans by `delta` pixels.
    pub fn try_to_change_position(&mut self, delta: f64) -> bool {
        self.set_position_x(self.position_x + delta / self.zoom)
    }

    /// Multiplies the zoom by `factor`, keeping the time under `pixel_x`
    /// in place.
    pub fn zoom_at(&mut self, pixel_x: f64, factor: f64) -> bool {
        if !factor.is_finite() || factor <= 0.0 {
            return false;
        }
        let anchor = self.pixel_to_time(pixel_x);
        let zoomed = self.set_zoom(self.zoom * factor);
        let moved = self.set_position_x(anchor - pixel_x / self.zoom);
        zoomed || moved
    }

    /// Surface x of `time`.
    pub fn time_to_position(&self, time: f64) -> f64 {
        (time - self.position_x) * self.zoom
    }

    /// Time at surface x `pixel`.
    pub fn pixel_to_time(&self, pixel: f64) -> f64 {
        pixel / self.zoom + self.position_x
    }

    /// Time span covered by `pixels`.
    pub fn pixels_to_duration(&self, pixels: f64) -> f64 {
        pixels / self.zoom
    }

    /// Visible time span.
    pub fn real_view(&self) -> f64 {
        self.width / self.zoom
    }

    /// Visible time window.
    pub fn window(&self) -> Window {
        Window::new(self.position_x, self.position_x + self.real_view())
    }

    /// Decimal places that distinguish neighbouring time-grid labels.
    pub fn accuracy(&self) -> usize {
        TimeGrid::new(self, TimeGrid::DEFAULT_SPACING).accuracy()
    }

    fn clamp_position(&self, time: f64) -> f64 {
        let last = self.max - self.real_view();
        if last <= self.min {
            self.min
        } else {
            time.clamp(self.min, last)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn viewport() -> Viewport {
        let mut viewport = Viewport::new(1000.0);
        viewport.set_min_max(0.0, 100.0);
        viewport
    }

    #[test]
    fn starts_at_full_view() {
        let viewport = viewport();

        assert!((viewport.zoom() - 10.0).abs() < f64::EPSILON);
        assert!(viewport.position_x().abs() < f64::EPSILON);
        assert!((viewport.real_view() - 100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn zoom_is_clamped_to_full_view() {
        let mut viewport = viewport();

        assert!(!viewport.set_zoom(1.0));
        assert!((viewport.zoom() - 10.0).abs() < f64::EPSILON);
        assert!(!viewport.set_zoom(f64::NAN));
        assert!(!viewport.set_zoom(-5.0));
    }

    #[test]
    fn position_stays_within_bounds() {
        let mut viewport = viewport();
        viewport.set_zoom(20.0);

        viewport.set_position_x(500.0);
        assert!((viewport.position_x() - 50.0).abs() < f64::EPSILON);

        viewport.set_position_x(-10.0);
        assert!(viewport.position_x().abs() < f64::EPSILON);
    }

    #[test]
    fn zoom_at_keeps_anchor_time_fixed() {
        let mut viewport = viewport();
        let anchor = viewport.pixel_to_time(250.0);

        assert!(viewport.zoom_at(250.0, 4.0));

        assert!((viewport.zoom() - 40.0).abs() < f64::EPSILON);
        assert!((viewport.pixel_to_time(250.0) - anchor).abs() < 1e-9);
    }

    #[test]
    fn pixel_and_time_conversions_invert() {
        let mut viewport = viewport();
        viewport.set_zoom(25.0);
        viewport.set_position_x(12.0);

        let x = viewport.time_to_position(30.0);
        assert!((x - 450.0).abs() < 1e-9);
        assert!((viewport.pixel_to_time(x) - 30.0).abs() < 1e-9);
        assert!((viewport.pixels_to_duration(50.0) - 2.0).abs() < 1e-9);
    }

    #[test]
    fn pan_moves_by_pixels() {
        let mut viewport = viewport();
        viewport.set_zoom(20.0);

        assert!(viewport.try_to_change_position(200.0));

        assert!((viewport.position_x() - 10.0).abs() < f64::EPSILON);
        let window = viewport.window();
        assert!((window.end - 60.0).abs() < f64::EPSILON);
    }

    #[test]
    fn wider_surface_raises_zoom_floor() {
        let mut viewport = viewport();

        viewport.set_width(2000.0);

        assert!((viewport.zoom() - 20.0).abs() < f64::EPSILON);
    }

    #[test]
    fn degenerate_bounds_fall_back_to_unit_zoom() {
        let mut viewport = Viewport::new(0.0);
        viewport.set_min_max(5.0, 5.0);

        assert!((viewport.zoom() - 1.0).abs() < f64::EPSILON);
        assert!((viewport.position_x() - 5.0).abs() < f64::EPSILON);

        viewport.set_min_max(f64::NAN, 3.0);
        assert!(viewport.min().abs() < f64::EPSILON);
    }
}
