// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Mark layout and rendering.
//!
//! Marks are first laid out into [`MarkShape`]s in a target space (screen
//! pixels for the live view, photo pixels for export). Shapes can then be
//! painted onto an RGBA buffer here or handed to a UI painter.
//!
//! Mark sizes are ratios of the photo width, so marks keep their size
//! relative to the image content. On screen they are scaled with the view;
//! exports apply an absolute floor so marks stay legible on small photos.

pub mod raster;

use crate::config::StyleConfig;
use crate::models::mark::{Corner, Mark};
use crate::models::photo::Photo;
use crate::util::geometry::{self, Point, Rect, Size};
use crate::view::ViewTransform;
use image::{Rgba, RgbaImage};

/// Label box padding around the text, as a fraction of the text size.
const LABEL_PADDING: f64 = 0.5;
/// Corner rounding of label boxes, as a fraction of the text size.
const LABEL_ROUNDING: f64 = 0.3;

/// Sizes used to draw marks, in the target space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MarkMetrics {
    pub radius: f64,
    pub text_size: f64,
    pub stroke_width: f64,
}

impl MarkMetrics {
    /// Metrics in photo pixels for a photo of the given width.
    pub fn for_photo(photo_width: f64, style: &StyleConfig) -> Self {
        Self {
            radius: photo_width * style.radius_ratio,
            text_size: photo_width * style.text_ratio,
            stroke_width: photo_width * style.stroke_ratio,
        }
    }

    /// Photo-relative metrics scaled into screen pixels.
    pub fn for_screen(photo_width: f64, scale: f64, style: &StyleConfig) -> Self {
        let photo = Self::for_photo(photo_width, style);
        Self {
            radius: photo.radius * scale,
            text_size: photo.text_size * scale,
            stroke_width: photo.stroke_width * scale,
        }
    }

    /// Photo-relative metrics with the export minimums applied.
    pub fn for_export(photo_width: f64, style: &StyleConfig) -> Self {
        let photo = Self::for_photo(photo_width, style);
        Self {
            radius: photo.radius.max(style.min_export_radius),
            text_size: photo.text_size.max(style.min_export_text),
            stroke_width: photo.stroke_width.max(style.min_export_stroke),
        }
    }
}

/// Label box of a two-anchor mark.
#[derive(Debug, Clone, PartialEq)]
pub struct LabelShape {
    pub rect: Rect,
    pub corner_radius: f64,
    pub corner: Corner,
    /// Line from the circle centre to the facing box corner.
    pub connector: (Point, Point),
}

/// A mark laid out in a target space.
#[derive(Debug, Clone, PartialEq)]
pub struct MarkShape {
    pub center: Point,
    pub text: String,
    pub metrics: MarkMetrics,
    pub label: Option<LabelShape>,
}

impl LabelShape {
    /// Box of padded `text` size centred on `box_center`, connected to the
    /// circle at `circle`.
    pub fn around_text(circle: Point, box_center: Point, text: Size, metrics: MarkMetrics) -> Self {
        let pad = metrics.text_size * LABEL_PADDING;
        let size = Size::new(text.width + 2.0 * pad, text.height + 2.0 * pad);
        let rect = Rect::from_center_size(box_center, size);
        let corner = Corner::facing(circle, &rect);
        Self {
            rect,
            corner_radius: metrics.text_size * LABEL_ROUNDING,
            corner,
            connector: (circle, corner.point(&rect)),
        }
    }
}

impl MarkShape {
    /// Refit the label box to text measured by a different font.
    pub fn fit_label_to(&mut self, text: Size) {
        if let Some(label) = &mut self.label {
            *label = LabelShape::around_text(self.center, label.rect.center(), text, self.metrics);
        }
    }
}

/// Lay out one mark, mapping its photo-space anchors through `transform`.
pub fn layout_mark(mark: &Mark, metrics: MarkMetrics, transform: &ViewTransform) -> MarkShape {
    let center = transform.to_screen_space(mark.position);
    let text = mark.label_text();
    let label = mark.box_position.map(|box_position| {
        let (text_width, text_height) = raster::text_extent(&text, metrics.text_size);
        LabelShape::around_text(
            center,
            transform.to_screen_space(box_position),
            Size::new(text_width, text_height),
            metrics,
        )
    });
    MarkShape {
        center,
        text,
        metrics,
        label,
    }
}

pub fn layout_marks(marks: &[Mark], metrics: MarkMetrics, transform: &ViewTransform) -> Vec<MarkShape> {
    marks
        .iter()
        .map(|mark| layout_mark(mark, metrics, transform))
        .collect()
}

/// Shapes for the live view of a photo of `photo_size`.
pub fn screen_shapes(
    marks: &[Mark],
    photo_size: Size,
    transform: &ViewTransform,
    style: &StyleConfig,
) -> Vec<MarkShape> {
    let metrics = MarkMetrics::for_screen(photo_size.width, transform.scale, style);
    layout_marks(marks, metrics, transform)
}

/// Shapes in photo pixels for a flattened export.
pub fn export_shapes(marks: &[Mark], photo_size: Size, style: &StyleConfig) -> Vec<MarkShape> {
    let metrics = MarkMetrics::for_export(photo_size.width, style);
    layout_marks(marks, metrics, &ViewTransform::IDENTITY)
}

/// Paint shapes in order: connector, circle, then label box.
pub fn paint_marks(img: &mut RgbaImage, shapes: &[MarkShape], style: &StyleConfig) {
    let fill = Rgba(style.fill);
    let outline = Rgba(style.outline);
    let text = Rgba(style.text);

    for shape in shapes {
        let m = shape.metrics;
        if let Some(label) = &shape.label {
            let (from, to) = label.connector;
            raster::draw_line(img, from, to, m.stroke_width, Rgba(style.connector));
        }

        raster::fill_circle(img, shape.center, m.radius, fill);
        raster::stroke_circle(img, shape.center, m.radius, m.stroke_width, outline);

        match &shape.label {
            Some(label) => {
                raster::fill_rounded_rect(img, &label.rect, label.corner_radius, Rgba(style.label_fill));
                raster::stroke_rounded_rect(img, &label.rect, label.corner_radius, m.stroke_width, outline);
                raster::draw_text_centered(img, label.rect.center(), &shape.text, m.text_size, text);
            }
            None => raster::draw_text_centered(img, shape.center, &shape.text, m.text_size, text),
        }
    }
}

/// Burn marks into a copy of the photo at its original resolution.
pub fn flatten(photo: &Photo, marks: &[Mark], style: &StyleConfig) -> RgbaImage {
    let mut out = photo.pixels().clone();
    let shapes = export_shapes(marks, photo.size(), style);
    paint_marks(&mut out, &shapes, style);
    out
}

/// Render the visible canvas: the photo sampled through `transform`, marks
/// on top, background everywhere else.
pub fn render_view(
    photo: Option<&Photo>,
    marks: &[Mark],
    transform: &ViewTransform,
    canvas_width: u32,
    canvas_height: u32,
    style: &StyleConfig,
) -> RgbaImage {
    let background = Rgba(style.background);
    let mut out = RgbaImage::from_pixel(canvas_width, canvas_height, background);
    let Some(photo) = photo else {
        return out;
    };
    let Some(inverse) = transform.inverse() else {
        log::warn!("Skipping render of degenerate view transform");
        return out;
    };

    let bounds = photo.size();
    let pixels = photo.pixels();
    for (x, y, px) in out.enumerate_pixels_mut() {
        let sample = inverse.apply(Point::new(f64::from(x) + 0.5, f64::from(y) + 0.5));
        if geometry::contains(bounds, sample) {
            *px = *pixels.get_pixel(sample.x as u32, sample.y as u32);
        }
    }

    let shapes = screen_shapes(marks, bounds, transform, style);
    paint_marks(&mut out, &shapes, style);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::mark::NumberSource;
    use crate::util::geometry::{ApproxEq, Vec2};

    const EPS: f64 = 1e-9;

    fn photo(width: u32, height: u32) -> Photo {
        Photo::new(RgbaImage::from_pixel(width, height, Rgba([0, 0, 255, 255])))
    }

    #[test]
    fn test_metrics_are_photo_relative() {
        let style = StyleConfig::default();

        let m = MarkMetrics::for_photo(2000.0, &style);
        assert!((m.radius - 40.0).abs() < EPS);
        assert!((m.text_size - 40.0).abs() < EPS);
        assert!((m.stroke_width - 4.0).abs() < EPS);

        let screen = MarkMetrics::for_screen(2000.0, 0.5, &style);
        assert!((screen.radius - 20.0).abs() < EPS);
    }

    #[test]
    fn test_export_metrics_have_floor() {
        let style = StyleConfig::default();

        let m = MarkMetrics::for_export(300.0, &style);

        assert!((m.radius - 20.0).abs() < EPS);
        assert!((m.text_size - 20.0).abs() < EPS);
        assert!((m.stroke_width - 2.0).abs() < EPS);
    }

    #[test]
    fn test_screen_layout_tracks_transform() {
        let style = StyleConfig::default();
        let marks = vec![Mark::new(Point::new(300.0, 200.0), 1)];
        let size = Size::new(1000.0, 800.0);

        let a = ViewTransform::new(0.5, Vec2::new(10.0, 20.0));
        let b = ViewTransform::new(2.0, Vec2::new(-100.0, 40.0));

        for t in [a, b] {
            let shapes = screen_shapes(&marks, size, &t, &style);
            assert!(shapes[0].center.approx_eq(t.to_screen_space(marks[0].position), EPS));
            assert!(t.to_photo_space(shapes[0].center).approx_eq(marks[0].position, 1e-6));
        }
    }

    #[test]
    fn test_label_connector_hits_left_corner() {
        let mark = Mark::with_label(
            Point::new(100.0, 100.0),
            Point::new(200.0, 100.0),
            42,
            NumberSource::User,
        );
        let metrics = MarkMetrics {
            radius: 10.0,
            text_size: 16.0,
            stroke_width: 2.0,
        };

        let shape = layout_mark(&mark, metrics, &ViewTransform::IDENTITY);

        let label = shape.label.unwrap();
        assert!(label.corner.is_left());
        assert_eq!(label.connector.0, Point::new(100.0, 100.0));
        assert!((label.connector.1.x - label.rect.x0).abs() < EPS);
        assert!(label.rect.center().approx_eq(Point::new(200.0, 100.0), EPS));
        assert_eq!(shape.text, "42");
    }

    #[test]
    fn test_fit_label_to_measured_text() {
        let mark = Mark::with_label(
            Point::new(100.0, 100.0),
            Point::new(200.0, 100.0),
            7,
            NumberSource::User,
        );
        let metrics = MarkMetrics {
            radius: 10.0,
            text_size: 16.0,
            stroke_width: 2.0,
        };
        let mut shape = layout_mark(&mark, metrics, &ViewTransform::IDENTITY);

        shape.fit_label_to(Size::new(9.0, 19.0));

        let label = shape.label.unwrap();
        assert!((label.rect.width() - (9.0 + 16.0)).abs() < EPS);
        assert!((label.rect.height() - (19.0 + 16.0)).abs() < EPS);
        assert!(label.rect.center().approx_eq(Point::new(200.0, 100.0), EPS));
        assert_eq!(label.connector.1, Point::new(label.rect.x0, label.rect.y0));
    }

    #[test]
    fn test_flatten_keeps_size_and_burns_marks() {
        let style = StyleConfig::default();
        let photo = photo(200, 100);
        let marks = vec![Mark::new(Point::new(50.0, 50.0), 1)];

        let out = flatten(&photo, &marks, &style);

        assert_eq!(out.dimensions(), (200, 100));
        assert_ne!(*out.get_pixel(50, 35), Rgba([0, 0, 255, 255]));
        assert_eq!(*out.get_pixel(190, 90), Rgba([0, 0, 255, 255]));
        assert_eq!(*photo.pixels().get_pixel(50, 35), Rgba([0, 0, 255, 255]));
    }

    #[test]
    fn test_render_view_samples_photo_through_transform() {
        let style = StyleConfig::default();
        let photo = photo(100, 80);
        let transform = ViewTransform::new(2.0, Vec2::new(50.0, 40.0));

        let out = render_view(Some(&photo), &[], &transform, 300, 200, &style);

        assert_eq!(*out.get_pixel(10, 10), Rgba(style.background));
        assert_eq!(*out.get_pixel(60, 50), Rgba([0, 0, 255, 255]));
        assert_eq!(*out.get_pixel(249, 199), Rgba([0, 0, 255, 255]));
        assert_eq!(*out.get_pixel(251, 100), Rgba(style.background));
    }

    #[test]
    fn test_render_view_without_photo_is_background() {
        let style = StyleConfig::default();

        let out = render_view(None, &[], &ViewTransform::IDENTITY, 8, 8, &style);

        assert!(out.pixels().all(|p| *p == Rgba(style.background)));
    }
}
