// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! The loaded photo.
//!
//! A decoded RGBA raster that is never mutated once loaded. The pixel buffer
//! is shared, so cloning a `Photo` for an export snapshot is cheap.

use crate::util::geometry::{self, Size};
use image::{DynamicImage, RgbaImage};
use std::sync::Arc;

#[derive(Debug, Clone)]
pub struct Photo {
    pixels: Arc<RgbaImage>,
}

impl Photo {
    pub fn new(pixels: RgbaImage) -> Self {
        Self {
            pixels: Arc::new(pixels),
        }
    }

    pub fn from_dynamic(image: DynamicImage) -> Self {
        Self::new(image.to_rgba8())
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    pub fn size(&self) -> Size {
        geometry::pixel_size(self.width(), self.height())
    }

    pub fn pixels(&self) -> &RgbaImage {
        &self.pixels
    }
}
