// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Mark data structures.
//!
//! A mark is a numbered circle anchored in photo-pixel space, optionally
//! linked to a label box. Positions are never stored in screen space.

use crate::util::geometry::{Point, Rect};
use serde::{Deserialize, Serialize};

/// Largest number a user may type for a labelled mark.
pub const MAX_MARK_NUMBER: u32 = 999;

/// How a mark got its number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NumberSource {
    /// Taken from the store's running counter.
    Auto,
    /// Typed in by the user.
    User,
}

/// One user annotation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mark {
    /// Circle centre in photo pixels.
    pub position: Point,
    pub number: u32,
    /// Label box centre in photo pixels, for two-anchor marks.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub box_position: Option<Point>,
    pub source: NumberSource,
}

impl Mark {
    /// A plain numbered circle.
    pub fn new(position: Point, number: u32) -> Self {
        Self {
            position,
            number,
            box_position: None,
            source: NumberSource::Auto,
        }
    }

    /// A circle linked to a label box.
    pub fn with_label(position: Point, box_position: Point, number: u32, source: NumberSource) -> Self {
        Self {
            position,
            number,
            box_position: Some(box_position),
            source,
        }
    }

    pub fn has_label(&self) -> bool {
        self.box_position.is_some()
    }

    pub fn label_text(&self) -> String {
        self.number.to_string()
    }
}

/// A corner of a label box.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Corner {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

impl Corner {
    /// The corner of `rect` facing `from`, picked per axis independently.
    pub fn facing(from: Point, rect: &Rect) -> Corner {
        let center = rect.center();
        let left = from.x <= center.x;
        let top = from.y <= center.y;
        match (left, top) {
            (true, true) => Corner::TopLeft,
            (false, true) => Corner::TopRight,
            (true, false) => Corner::BottomLeft,
            (false, false) => Corner::BottomRight,
        }
    }

    pub fn point(self, rect: &Rect) -> Point {
        match self {
            Corner::TopLeft => Point::new(rect.x0, rect.y0),
            Corner::TopRight => Point::new(rect.x1, rect.y0),
            Corner::BottomLeft => Point::new(rect.x0, rect.y1),
            Corner::BottomRight => Point::new(rect.x1, rect.y1),
        }
    }

    pub fn is_left(self) -> bool {
        matches!(self, Corner::TopLeft | Corner::BottomLeft)
    }
}

/// Parse user input for a labelled mark number.
///
/// Accepts an integer in `0..=MAX_MARK_NUMBER`, surrounding whitespace
/// allowed. Anything else is rejected so the caller can ask again.
pub fn parse_mark_number(input: &str) -> Option<u32> {
    let number: u32 = input.trim().parse().ok()?;
    (number <= MAX_MARK_NUMBER).then_some(number)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::util::geometry::Size;

    #[test]
    fn test_parse_mark_number() {
        assert_eq!(parse_mark_number("42"), Some(42));
        assert_eq!(parse_mark_number(" 0 "), Some(0));
        assert_eq!(parse_mark_number("999"), Some(999));
        assert_eq!(parse_mark_number("1000"), None);
        assert_eq!(parse_mark_number("-1"), None);
        assert_eq!(parse_mark_number("4x"), None);
        assert_eq!(parse_mark_number(""), None);
    }

    #[test]
    fn test_corner_facing_left_of_box() {
        let rect = Rect::from_center_size(Point::new(200.0, 100.0), Size::new(40.0, 24.0));

        let corner = Corner::facing(Point::new(100.0, 100.0), &rect);

        assert!(corner.is_left());
        assert_eq!(corner, Corner::TopLeft);
        assert_eq!(corner.point(&rect), Point::new(180.0, 88.0));
    }

    #[test]
    fn test_corner_axes_are_independent() {
        let rect = Rect::from_center_size(Point::new(0.0, 0.0), Size::new(10.0, 10.0));

        assert_eq!(Corner::facing(Point::new(9.0, -9.0), &rect), Corner::TopRight);
        assert_eq!(Corner::facing(Point::new(-9.0, 9.0), &rect), Corner::BottomLeft);
        assert_eq!(Corner::facing(Point::new(9.0, 9.0), &rect), Corner::BottomRight);
        assert_eq!(Corner::BottomRight.point(&rect), Point::new(5.0, 5.0));
    }

    #[test]
    fn test_mark_constructors() {
        let plain = Mark::new(Point::new(500.0, 400.0), 1);
        assert!(!plain.has_label());
        assert_eq!(plain.source, NumberSource::Auto);

        let labelled = Mark::with_label(
            Point::new(100.0, 100.0),
            Point::new(200.0, 100.0),
            42,
            NumberSource::User,
        );
        assert!(labelled.has_label());
        assert_eq!(labelled.label_text(), "42");
    }
}
