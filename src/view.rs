// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! View transform between photo-pixel space and screen space.
//!
//! The mapping is `screen = photo * scale + pan` with a uniform positive
//! scale. [`Viewport`] owns the transform together with the canvas and photo
//! sizes and keeps it consistent across fit, pan, zoom, and resize.

use crate::config::ViewConfig;
use crate::util::geometry::{self, Affine, Point, Size, Vec2};

/// Smallest determinant considered invertible.
const MIN_INVERTIBLE_DETERMINANT: f64 = 1e-24;

/// Tolerance used when deciding whether the view sits at its fitted scale.
const FIT_SCALE_TOLERANCE: f64 = 1e-3;

/// Inclusive range the view scale is clamped to.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScaleLimits {
    pub min: f64,
    pub max: f64,
}

impl ScaleLimits {
    pub fn new(min: f64, max: f64) -> Self {
        if min <= max {
            Self { min, max }
        } else {
            Self { min: max, max: min }
        }
    }

    pub fn clamp(&self, scale: f64) -> f64 {
        scale.clamp(self.min, self.max)
    }
}

/// Uniform scale followed by a translation in screen units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewTransform {
    pub scale: f64,
    pub pan: Vec2,
}

impl Default for ViewTransform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl ViewTransform {
    pub const IDENTITY: ViewTransform = ViewTransform {
        scale: 1.0,
        pan: Vec2::ZERO,
    };

    pub fn new(scale: f64, pan: Vec2) -> Self {
        Self { scale, pan }
    }

    /// The photo-to-screen map as an affine matrix.
    pub fn affine(&self) -> Affine {
        Affine::scale(self.scale).then_translate(self.pan)
    }

    /// Map a point through this transform.
    pub fn apply(&self, point: Point) -> Point {
        self.affine() * point
    }

    /// The inverse transform, or `None` for a degenerate scale.
    pub fn inverse(&self) -> Option<ViewTransform> {
        let affine = self.affine();
        let det = affine.determinant();
        if !det.is_finite() || det.abs() < MIN_INVERTIBLE_DETERMINANT {
            return None;
        }
        let [a, _, _, _, e, f] = affine.inverse().as_coeffs();
        Some(ViewTransform::new(a, Vec2::new(e, f)))
    }

    /// Forward map from photo-pixel space to screen space.
    pub fn to_screen_space(&self, photo: Point) -> Point {
        self.apply(photo)
    }

    /// Inverse map from screen space to photo-pixel space.
    ///
    /// Returns the input unchanged if the transform cannot be inverted.
    pub fn to_photo_space(&self, screen: Point) -> Point {
        match self.inverse() {
            Some(inverse) => inverse.apply(screen),
            None => {
                log::warn!("View transform is not invertible (scale {})", self.scale);
                screen
            }
        }
    }
}

/// Scale and centre `photo` inside `canvas`, leaving `margin` of the canvas
/// unused, with the scale clamped to `limits`.
pub fn fit_to_view(canvas: Size, photo: Size, margin: f64, limits: ScaleLimits) -> ViewTransform {
    let raw = raw_fit_scale(canvas, photo, margin);
    let scale = limits.clamp(raw);
    let pan = Vec2::new(
        (canvas.width - photo.width * scale) / 2.0,
        (canvas.height - photo.height * scale) / 2.0,
    );
    ViewTransform::new(scale, pan)
}

fn raw_fit_scale(canvas: Size, photo: Size, margin: f64) -> f64 {
    if geometry::is_degenerate(photo) || geometry::is_degenerate(canvas) {
        return 1.0;
    }
    (canvas.width * margin / photo.width).min(canvas.height * margin / photo.height)
}

/// Pinch gesture bookkeeping, recorded when the gesture starts.
#[derive(Debug, Clone, Copy, PartialEq)]
struct PinchState {
    start_scale: f64,
    last_focal: Point,
}

/// The view transform plus everything needed to keep it valid.
#[derive(Debug, Clone)]
pub struct Viewport {
    transform: ViewTransform,
    canvas: Size,
    photo: Option<Size>,
    /// Limits from configuration.
    configured: ScaleLimits,
    /// Limits in effect; the lower bound drops to the fit scale for large photos.
    limits: ScaleLimits,
    fit: ViewTransform,
    fit_margin: f64,
    min_visible_fraction: f64,
    double_tap_scale: f64,
    pinch: Option<PinchState>,
}

impl Viewport {
    pub fn new(config: &ViewConfig) -> Self {
        let limits = ScaleLimits::new(config.min_scale, config.max_scale);
        Self {
            transform: ViewTransform::IDENTITY,
            canvas: Size::ZERO,
            photo: None,
            configured: limits,
            limits,
            fit: ViewTransform::IDENTITY,
            fit_margin: config.fit_margin,
            min_visible_fraction: config.min_visible_fraction,
            double_tap_scale: config.double_tap_scale,
            pinch: None,
        }
    }

    pub fn transform(&self) -> ViewTransform {
        self.transform
    }

    pub fn scale(&self) -> f64 {
        self.transform.scale
    }

    pub fn pan(&self) -> Vec2 {
        self.transform.pan
    }

    pub fn canvas_size(&self) -> Size {
        self.canvas
    }

    pub fn photo_size(&self) -> Option<Size> {
        self.photo
    }

    pub fn limits(&self) -> ScaleLimits {
        self.limits
    }

    /// The transform the last fit produced.
    pub fn fitted(&self) -> ViewTransform {
        self.fit
    }

    pub fn to_photo_space(&self, screen: Point) -> Point {
        self.transform.to_photo_space(screen)
    }

    pub fn to_screen_space(&self, photo: Point) -> Point {
        self.transform.to_screen_space(photo)
    }

    /// Replace the photo dimensions and refit.
    pub fn set_photo(&mut self, photo: Option<Size>) {
        self.photo = photo;
        self.pinch = None;
        self.fit_to_view();
    }

    /// React to a canvas resize by refitting the photo.
    pub fn resize(&mut self, canvas: Size) {
        if self.canvas == canvas {
            return;
        }
        self.canvas = canvas;
        self.fit_to_view();
    }

    /// Reset the transform so the whole photo is centred in the canvas.
    pub fn fit_to_view(&mut self) {
        let Some(photo) = self.photo else {
            self.limits = self.configured;
            self.transform = ViewTransform::IDENTITY;
            self.fit = self.transform;
            return;
        };
        let raw = raw_fit_scale(self.canvas, photo, self.fit_margin);
        self.limits = ScaleLimits::new(self.configured.min.min(raw), self.configured.max);
        self.fit = fit_to_view(self.canvas, photo, self.fit_margin, self.limits);
        self.transform = self.fit;
        log::debug!(
            "Fit {}x{} photo into {}x{} canvas at scale {:.4}",
            photo.width,
            photo.height,
            self.canvas.width,
            self.canvas.height,
            self.transform.scale
        );
    }

    /// Add a screen-space delta to the pan. Returns whether the pan changed.
    pub fn pan_by(&mut self, delta: Vec2) -> bool {
        if self.photo.is_none() || delta == Vec2::ZERO {
            return false;
        }
        let before = self.transform.pan;
        self.transform.pan = before + delta;
        self.clamp_pan();
        self.transform.pan != before
    }

    /// Set the scale, keeping the photo point under `anchor` fixed on screen.
    pub fn zoom_to(&mut self, new_scale: f64, anchor: Point) -> bool {
        if self.photo.is_none() || !new_scale.is_finite() {
            return false;
        }
        let scale = self.limits.clamp(new_scale);
        if (scale - self.transform.scale).abs() < f64::EPSILON {
            return false;
        }
        let anchored = self.transform.to_photo_space(anchor);
        self.transform.scale = scale;
        self.transform.pan = anchor.to_vec2() - anchored.to_vec2() * scale;
        self.clamp_pan();
        true
    }

    /// Multiply the scale by `factor` around `anchor`.
    pub fn zoom_by(&mut self, factor: f64, anchor: Point) -> bool {
        if factor <= 0.0 {
            return false;
        }
        self.zoom_to(self.transform.scale * factor, anchor)
    }

    /// Slider-style zoom anchored at the canvas centre.
    pub fn set_zoom(&mut self, scale: f64) -> bool {
        self.zoom_to(scale, geometry::center(self.canvas))
    }

    pub fn is_at_fit_scale(&self) -> bool {
        (self.transform.scale - self.fit.scale).abs() < FIT_SCALE_TOLERANCE
    }

    /// Toggle between the fitted view and a closer zoom level.
    ///
    /// From the fit the view zooms to `double_tap_scale`, or to that multiple
    /// of the fit scale when the photo already fits above it, so the first
    /// tap always magnifies (within the scale limits).
    pub fn toggle_double_tap_zoom(&mut self, anchor: Point) -> bool {
        if self.photo.is_none() {
            return false;
        }
        if self.is_at_fit_scale() {
            let target = self.double_tap_scale.max(self.fit.scale * self.double_tap_scale);
            self.zoom_to(target, anchor)
        } else {
            self.transform = self.fit;
            true
        }
    }

    pub fn begin_pinch(&mut self, focal: Point) {
        self.pinch = Some(PinchState {
            start_scale: self.transform.scale,
            last_focal: focal,
        });
    }

    /// Apply a pinch update; `scale_delta` is relative to the scale when the
    /// pinch started. Focal point motion pans the view.
    pub fn update_pinch(&mut self, scale_delta: f64, focal: Point) -> bool {
        let Some(mut pinch) = self.pinch else {
            return false;
        };
        let panned = self.pan_by(focal - pinch.last_focal);
        let zoomed = scale_delta > 0.0 && self.zoom_to(pinch.start_scale * scale_delta, focal);
        pinch.last_focal = focal;
        self.pinch = Some(pinch);
        panned || zoomed
    }

    pub fn end_pinch(&mut self) {
        self.pinch = None;
    }

    pub fn is_pinching(&self) -> bool {
        self.pinch.is_some()
    }

    /// Keep at least `min_visible_fraction` of the photo reachable on each axis.
    fn clamp_pan(&mut self) {
        let Some(photo) = self.photo else {
            return;
        };
        if geometry::is_degenerate(self.canvas) {
            return;
        }
        let scale = self.transform.scale;
        let fraction = self.min_visible_fraction;
        let clamp_axis = |pan: f64, extent: f64, canvas: f64| {
            let keep = fraction * extent.min(canvas);
            let (lo, hi) = (keep - extent, canvas - keep);
            if lo <= hi {
                pan.clamp(lo, hi)
            } else {
                pan
            }
        };
        self.transform.pan = Vec2::new(
            clamp_axis(self.transform.pan.x, photo.width * scale, self.canvas.width),
            clamp_axis(self.transform.pan.y, photo.height * scale, self.canvas.height),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::util::geometry::ApproxEq;

    const EPS: f64 = 1e-9;

    fn viewport(canvas: Size, photo: Size) -> Viewport {
        let mut vp = Viewport::new(&ViewConfig::default());
        vp.resize(canvas);
        vp.set_photo(Some(photo));
        vp
    }

    #[test]
    fn test_round_trip_over_scale_range() {
        let points = [
            Point::new(0.0, 0.0),
            Point::new(500.0, 400.0),
            Point::new(999.5, 12.25),
        ];
        let pans = [Vec2::ZERO, Vec2::new(-340.5, 72.0), Vec2::new(1e4, -1e4)];

        for step in 0..=18 {
            let scale = 0.5 + 0.25 * f64::from(step);
            for pan in pans {
                let t = ViewTransform::new(scale, pan);
                assert!(t.inverse().is_some());
                for p in points {
                    let back = t.to_photo_space(t.to_screen_space(p));
                    assert!(back.approx_eq(p, 1e-6), "scale {scale} pan {pan:?} point {p:?}");
                }
            }
        }
    }

    #[test]
    fn test_degenerate_transform_returns_input() {
        let t = ViewTransform::new(0.0, Vec2::new(10.0, 10.0));
        let p = Point::new(42.0, 7.0);

        assert!(t.inverse().is_none());
        assert_eq!(t.to_photo_space(p), p);
    }

    #[test]
    fn test_fit_to_view_stays_in_limits_and_centres() {
        let limits = ScaleLimits::new(0.5, 5.0);
        let cases = [
            (Size::new(500.0, 400.0), Size::new(100.0, 50.0)),
            (Size::new(500.0, 400.0), Size::new(4000.0, 3000.0)),
            (Size::new(1920.0, 1080.0), Size::new(1080.0, 1920.0)),
        ];

        for (canvas, photo) in cases {
            let t = fit_to_view(canvas, photo, 0.9, limits);
            assert!(t.scale >= limits.min && t.scale <= limits.max);
            assert!((t.pan.x - (canvas.width - photo.width * t.scale) / 2.0).abs() < EPS);
            assert!((t.pan.y - (canvas.height - photo.height * t.scale) / 2.0).abs() < EPS);
        }
    }

    #[test]
    fn test_fit_scenario_large_photo() {
        let canvas = Size::new(500.0, 400.0);
        let photo = Size::new(1000.0, 800.0);

        let vp = viewport(canvas, photo);
        assert!((vp.scale() - 0.475).abs() < EPS);
        assert!((vp.pan().x - 12.5).abs() < EPS);
        assert!((vp.pan().y - 10.0).abs() < EPS);

        let wide = fit_to_view(canvas, photo, 0.9, ScaleLimits::new(0.1, 5.0));
        assert!((wide.scale - 0.45).abs() < EPS);
        assert!((wide.pan.x - 25.0).abs() < EPS);
        assert!((wide.pan.y - 20.0).abs() < EPS);
    }

    #[test]
    fn test_zoom_keeps_anchor_fixed() {
        let mut vp = viewport(Size::new(500.0, 400.0), Size::new(1000.0, 800.0));
        vp.transform = ViewTransform::IDENTITY;
        let anchor = Point::new(50.0, 50.0);
        assert!(vp.to_photo_space(anchor).approx_eq(Point::new(50.0, 50.0), EPS));

        assert!(vp.zoom_to(2.0, anchor));

        assert!((vp.scale() - 2.0).abs() < EPS);
        assert!(vp.to_photo_space(anchor).approx_eq(Point::new(50.0, 50.0), 1e-6));
    }

    #[test]
    fn test_zoom_is_clamped() {
        let mut vp = viewport(Size::new(500.0, 400.0), Size::new(100.0, 80.0));

        vp.zoom_to(50.0, Point::new(250.0, 200.0));
        assert!((vp.scale() - 5.0).abs() < EPS);

        vp.zoom_to(0.01, Point::new(250.0, 200.0));
        assert!((vp.scale() - 0.5).abs() < EPS);
    }

    #[test]
    fn test_pan_keeps_photo_reachable() {
        let mut vp = viewport(Size::new(500.0, 400.0), Size::new(1000.0, 800.0));

        vp.pan_by(Vec2::new(1e6, 1e6));
        let extent = 1000.0 * vp.scale();
        let keep = 0.25 * extent.min(500.0);
        assert!((vp.pan().x - (500.0 - keep)).abs() < EPS);

        vp.pan_by(Vec2::new(-1e6, -1e6));
        assert!((vp.pan().x - (keep - extent)).abs() < EPS);
        let right_edge = vp.to_screen_space(Point::new(1000.0, 0.0)).x;
        assert!(right_edge >= keep - EPS);
    }

    #[test]
    fn test_anchored_zoom_keeps_photo_reachable() {
        let mut vp = viewport(Size::new(500.0, 400.0), Size::new(1000.0, 800.0));

        // Unclamped, zooming about a far-away anchor leaves the photo thousands of pixels off-screen.
        assert!(vp.zoom_to(2.0, Point::new(2000.0, 2000.0)));

        let keep = 0.25 * 500.0;
        assert!((vp.pan().x - (keep - 2000.0)).abs() < EPS);
        assert!((vp.pan().y - (0.25 * 400.0 - 1600.0)).abs() < EPS);
        assert!(vp.to_screen_space(Point::new(1000.0, 800.0)).x >= keep - EPS);

        assert!(vp.zoom_by(0.5, Point::new(-3000.0, -3000.0)));
        let extent = 1000.0 * vp.scale();
        let keep = 0.25 * extent.min(500.0);
        assert!(vp.pan().x <= 500.0 - keep + EPS);
        assert!(vp.to_screen_space(Point::ZERO).x <= 500.0 - keep + EPS);
    }

    #[test]
    fn test_pan_moves_marks_with_photo() {
        let mut vp = viewport(Size::new(500.0, 400.0), Size::new(1000.0, 800.0));
        let mark = Point::new(300.0, 200.0);
        let before = vp.to_screen_space(mark);

        vp.pan_by(Vec2::new(20.0, -15.0));

        let after = vp.to_screen_space(mark);
        assert!(after.approx_eq(before + Vec2::new(20.0, -15.0), EPS));
        assert!(vp.to_photo_space(after).approx_eq(mark, 1e-6));
    }

    #[test]
    fn test_double_tap_toggles() {
        let mut vp = viewport(Size::new(500.0, 400.0), Size::new(1000.0, 800.0));
        let fitted = vp.fitted();
        let tap = Point::new(200.0, 150.0);
        let under_tap = vp.to_photo_space(tap);

        assert!(vp.toggle_double_tap_zoom(tap));
        assert!((vp.scale() - 2.5).abs() < EPS);
        assert!(vp.to_photo_space(tap).approx_eq(under_tap, 1e-6));

        assert!(vp.toggle_double_tap_zoom(tap));
        assert_eq!(vp.transform(), fitted);
    }

    #[test]
    fn test_double_tap_magnifies_small_photo() {
        let mut vp = viewport(Size::new(500.0, 400.0), Size::new(100.0, 80.0));
        assert!((vp.scale() - 4.75).abs() < EPS);

        assert!(vp.toggle_double_tap_zoom(Point::new(250.0, 200.0)));
        assert!((vp.scale() - 5.0).abs() < EPS);

        assert!(vp.toggle_double_tap_zoom(Point::new(250.0, 200.0)));
        assert!((vp.scale() - 4.75).abs() < EPS);
    }

    #[test]
    fn test_affine_matches_scale_and_pan() {
        let t = ViewTransform::new(0.475, Vec2::new(12.5, 10.0));

        assert_eq!(t.affine().as_coeffs(), [0.475, 0.0, 0.0, 0.475, 12.5, 10.0]);
        assert!(t.apply(Point::new(1000.0, 800.0)).approx_eq(Point::new(487.5, 390.0), EPS));
        let inverse = t.inverse().unwrap();
        assert!((inverse.scale - 1.0 / 0.475).abs() < EPS);
    }

    #[test]
    fn test_pinch_scales_from_start() {
        let mut vp = viewport(Size::new(500.0, 400.0), Size::new(1000.0, 800.0));
        let focal = Point::new(250.0, 200.0);
        let start = vp.scale();

        vp.begin_pinch(focal);
        vp.update_pinch(1.5, focal);
        vp.update_pinch(2.0, focal);
        assert!((vp.scale() - start * 2.0).abs() < EPS);
        vp.end_pinch();

        assert!(!vp.update_pinch(3.0, focal));
    }

    #[test]
    fn test_resize_refits() {
        let mut vp = viewport(Size::new(500.0, 400.0), Size::new(1000.0, 800.0));
        vp.zoom_to(3.0, Point::new(10.0, 10.0));

        vp.resize(Size::new(1000.0, 800.0));

        assert!((vp.scale() - 0.95).abs() < EPS);
        assert!((vp.pan().x - 25.0).abs() < EPS);
    }

    #[test]
    fn test_no_photo_ignores_gestures() {
        let mut vp = Viewport::new(&ViewConfig::default());
        vp.resize(Size::new(500.0, 400.0));

        assert!(!vp.pan_by(Vec2::new(5.0, 5.0)));
        assert!(!vp.zoom_to(2.0, Point::ZERO));
        assert_eq!(vp.transform(), ViewTransform::IDENTITY);
    }
}
