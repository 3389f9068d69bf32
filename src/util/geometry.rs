// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Geometric value types.
//!
//! The 2D primitives come from `kurbo` and are shared by the view transform,
//! the mark model, and the renderer. Which space a value lives in (photo
//! pixels or screen pixels) is decided by the code holding it.

pub use kurbo::{Affine, Point, Rect, Size, Vec2};

/// Size of a raster with integer dimensions.
pub fn pixel_size(width: u32, height: u32) -> Size {
    Size::new(f64::from(width), f64::from(height))
}

/// True unless both dimensions are finite and positive.
pub fn is_degenerate(size: Size) -> bool {
    !(size.width > 0.0 && size.height > 0.0 && size.width.is_finite() && size.height.is_finite())
}

/// Half-open containment test: `0 <= x < width`, `0 <= y < height`.
pub fn contains(size: Size, point: Point) -> bool {
    size.to_rect().contains(point)
}

pub fn center(size: Size) -> Point {
    size.to_rect().center()
}

/// Corner with the largest coordinates.
pub fn max_corner(rect: &Rect) -> Point {
    Point::new(rect.x1, rect.y1)
}

/// Approximate equality within `eps` on both axes.
pub trait ApproxEq {
    fn approx_eq(self, other: Self, eps: f64) -> bool;
}

impl ApproxEq for Point {
    fn approx_eq(self, other: Point, eps: f64) -> bool {
        (self.x - other.x).abs() <= eps && (self.y - other.y).abs() <= eps
    }
}

impl ApproxEq for Vec2 {
    fn approx_eq(self, other: Vec2, eps: f64) -> bool {
        self.to_point().approx_eq(other.to_point(), eps)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contains_is_half_open() {
        let size = Size::new(1000.0, 800.0);

        assert!(contains(size, Point::new(0.0, 0.0)));
        assert!(contains(size, Point::new(999.9, 799.9)));
        assert!(!contains(size, Point::new(1000.0, 10.0)));
        assert!(!contains(size, Point::new(10.0, 800.0)));
        assert!(!contains(size, Point::new(-0.1, 10.0)));
    }

    #[test]
    fn test_rect_from_center() {
        let rect = Rect::from_center_size(Point::new(200.0, 100.0), Size::new(40.0, 20.0));

        assert_eq!(rect.origin(), Point::new(180.0, 90.0));
        assert_eq!(max_corner(&rect), Point::new(220.0, 110.0));
        assert_eq!(rect.center(), Point::new(200.0, 100.0));
        assert!((rect.width() - 40.0).abs() < 0.0001);
    }

    #[test]
    fn test_degenerate_sizes() {
        assert!(is_degenerate(Size::new(0.0, 10.0)));
        assert!(is_degenerate(Size::new(10.0, -1.0)));
        assert!(is_degenerate(Size::new(f64::NAN, 10.0)));
        assert!(!is_degenerate(pixel_size(4, 3)));
        assert_eq!(center(Size::new(500.0, 400.0)), Point::new(250.0, 200.0));
    }

    #[test]
    fn test_approx_eq() {
        let a = Point::new(3.0, 4.0);

        assert!(a.approx_eq(Point::new(3.0 + 1e-10, 4.0), 1e-9));
        assert!(!a.approx_eq(Point::new(3.1, 4.0), 1e-9));
        assert!((a - Point::ZERO).approx_eq(Vec2::new(3.0, 4.0), 1e-9));
        assert!(((a - Point::ZERO).length() - 5.0).abs() < 0.0001);
    }
}
