// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Pixel-level drawing on RGBA buffers.
//!
//! Everything here alpha-blends source colours over the existing pixels and
//! silently clips to the image bounds.

use crate::util::geometry::{Point, Rect, Vec2};
use font8x8::{UnicodeFonts, BASIC_FONTS};
use image::{Rgba, RgbaImage};

/// Glyph cell size of the bitmap font, in font pixels.
pub const GLYPH_CELL: u32 = 8;

fn blend_pixel(dst: Rgba<u8>, src: Rgba<u8>) -> Rgba<u8> {
    let a = f64::from(src[3]) / 255.0;
    if a <= 0.0 {
        return dst;
    }
    let inv = 1.0 - a;
    let mix = |d: u8, s: u8| (f64::from(d) * inv + f64::from(s) * a).round().clamp(0.0, 255.0) as u8;
    let out_a = (f64::from(dst[3]) * inv + f64::from(src[3]))
        .round()
        .clamp(0.0, 255.0) as u8;
    Rgba([mix(dst[0], src[0]), mix(dst[1], src[1]), mix(dst[2], src[2]), out_a])
}

fn blend_at(img: &mut RgbaImage, x: i64, y: i64, color: Rgba<u8>) {
    if x < 0 || y < 0 || x >= i64::from(img.width()) || y >= i64::from(img.height()) {
        return;
    }
    let (x, y) = (x as u32, y as u32);
    let dst = *img.get_pixel(x, y);
    img.put_pixel(x, y, blend_pixel(dst, color));
}

/// Pixel index range covering `[lo, hi]`, clipped to `0..len`.
fn span(lo: f64, hi: f64, len: u32) -> std::ops::Range<i64> {
    let start = lo.floor().max(0.0) as i64;
    let end = (hi.ceil() as i64 + 1).min(i64::from(len));
    start..end.max(start)
}

/// Visit every pixel whose centre lies inside `bounds`, blending `color`
/// where `inside` holds.
fn fill_where(img: &mut RgbaImage, bounds: Rect, color: Rgba<u8>, inside: impl Fn(Point) -> bool) {
    for y in span(bounds.y0, bounds.y1, img.height()) {
        for x in span(bounds.x0, bounds.x1, img.width()) {
            let center = Point::new(x as f64 + 0.5, y as f64 + 0.5);
            if inside(center) {
                blend_at(img, x, y, color);
            }
        }
    }
}

pub fn fill_circle(img: &mut RgbaImage, center: Point, radius: f64, color: Rgba<u8>) {
    if radius <= 0.0 {
        return;
    }
    let bounds = Rect::from_center_size(center, (2.0 * radius, 2.0 * radius));
    let r2 = radius * radius;
    fill_where(img, bounds, color, |p| (p - center).hypot2() <= r2);
}

/// Stroke a circle outline of `width`, centred on `radius`.
pub fn stroke_circle(img: &mut RgbaImage, center: Point, radius: f64, width: f64, color: Rgba<u8>) {
    let half = (width / 2.0).max(0.5);
    let outer = radius + half;
    let inner = (radius - half).max(0.0);
    let bounds = Rect::from_center_size(center, (2.0 * outer, 2.0 * outer));
    fill_where(img, bounds, color, |p| {
        let d = (p - center).length();
        d >= inner && d <= outer
    });
}

/// Draw a line segment of the given width with round caps.
pub fn draw_line(img: &mut RgbaImage, from: Point, to: Point, width: f64, color: Rgba<u8>) {
    let half = (width / 2.0).max(0.5);
    let bounds = Rect::from_points(from, to).inflate(half, half);
    let seg: Vec2 = to - from;
    let len2 = seg.hypot2();
    fill_where(img, bounds, color, |p| {
        let t = if len2 > 0.0 {
            ((p - from).dot(seg) / len2).clamp(0.0, 1.0)
        } else {
            0.0
        };
        let closest = from + seg * t;
        p.distance(closest) <= half
    });
}

fn in_rounded_rect(p: Point, rect: &Rect, radius: f64) -> bool {
    if p.x < rect.x0 || p.x > rect.x1 || p.y < rect.y0 || p.y > rect.y1 {
        return false;
    }
    let r = radius.min(rect.width() / 2.0).min(rect.height() / 2.0).max(0.0);
    let cx = p.x.clamp(rect.x0 + r, rect.x1 - r);
    let cy = p.y.clamp(rect.y0 + r, rect.y1 - r);
    p.distance(Point::new(cx, cy)) <= r
}

pub fn fill_rounded_rect(img: &mut RgbaImage, rect: &Rect, radius: f64, color: Rgba<u8>) {
    fill_where(img, *rect, color, |p| in_rounded_rect(p, rect, radius));
}

/// Stroke the outline of a rounded rectangle, inset by `width`.
pub fn stroke_rounded_rect(img: &mut RgbaImage, rect: &Rect, radius: f64, width: f64, color: Rgba<u8>) {
    let width = width.max(1.0);
    let inner = rect.inflate(-width, -width);
    let inner_radius = (radius - width).max(0.0);
    let hollow = inner.width() > 0.0 && inner.height() > 0.0;
    fill_where(img, *rect, color, |p| {
        in_rounded_rect(p, rect, radius) && !(hollow && in_rounded_rect(p, &inner, inner_radius))
    });
}

/// Integer glyph scale for a requested text height.
pub fn glyph_scale(text_size: f64) -> u32 {
    ((text_size / f64::from(GLYPH_CELL)).round() as u32).max(1)
}

/// Width and height in pixels of `text` rendered at `text_size`.
pub fn text_extent(text: &str, text_size: f64) -> (f64, f64) {
    let cell = f64::from(GLYPH_CELL * glyph_scale(text_size));
    (text.chars().count() as f64 * cell, cell)
}

/// Draw single-line text centred on `center` using the 8x8 bitmap font.
pub fn draw_text_centered(img: &mut RgbaImage, center: Point, text: &str, text_size: f64, color: Rgba<u8>) {
    let scale = i64::from(glyph_scale(text_size));
    let (width, height) = text_extent(text, text_size);
    let origin_x = (center.x - width / 2.0).round() as i64;
    let origin_y = (center.y - height / 2.0).round() as i64;
    let cell = i64::from(GLYPH_CELL) * scale;

    for (index, ch) in text.chars().enumerate() {
        let Some(glyph) = BASIC_FONTS.get(ch).or_else(|| BASIC_FONTS.get('?')) else {
            continue;
        };
        let cursor_x = origin_x + index as i64 * cell;
        for (row_idx, row) in glyph.iter().enumerate() {
            for col_idx in 0..i64::from(GLYPH_CELL) {
                if (*row >> col_idx) & 1 == 0 {
                    continue;
                }
                let px = cursor_x + col_idx * scale;
                let py = origin_y + row_idx as i64 * scale;
                for sy in 0..scale {
                    for sx in 0..scale {
                        blend_at(img, px + sx, py + sy, color);
                    }
                }
            }
        }
    }
}
