// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Photo loading.
//!
//! This module decodes image files into [`Photo`]s and defines the
//! collaborator interface hosts implement to let the user pick one.

use crate::models::photo::Photo;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// Supplies photos chosen by the user.
pub trait PhotoSource {
    /// Ask for a photo. `Ok(None)` means the user cancelled.
    fn pick_photo(&mut self) -> Result<Option<Photo>>;
}

/// Image file extensions offered by file pickers.
pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "bmp", "tiff", "tif", "webp"];

/// Decode an image file from disk.
pub fn load_photo(path: &Path) -> Result<Photo> {
    let image = image::open(path).with_context(|| format!("Failed to decode {}", path.display()))?;
    let photo = Photo::from_dynamic(image);
    log::info!("Loaded photo {} ({}x{})", path.display(), photo.width(), photo.height());
    Ok(photo)
}

/// Decode an in-memory encoded image.
pub fn decode_photo(bytes: &[u8]) -> Result<Photo> {
    let image = image::load_from_memory(bytes).context("Failed to decode image data")?;
    Ok(Photo::from_dynamic(image))
}

/// A source that always yields the file at a fixed path.
#[derive(Debug, Clone)]
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl PhotoSource for FileSource {
    fn pick_photo(&mut self) -> Result<Option<Photo>> {
        load_photo(&self.path).map(Some)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};

    #[test]
    fn test_load_photo_round_trips_png() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("photo.png");
        RgbaImage::from_pixel(12, 7, Rgba([1, 2, 3, 255])).save(&path).unwrap();

        let photo = FileSource::new(&path).pick_photo().unwrap().unwrap();

        assert_eq!((photo.width(), photo.height()), (12, 7));
        assert_eq!(*photo.pixels().get_pixel(0, 0), Rgba([1, 2, 3, 255]));
    }

    #[test]
    fn test_load_missing_file_is_error() {
        let dir = tempfile::tempdir().unwrap();

        let err = load_photo(&dir.path().join("missing.png")).unwrap_err();

        assert!(err.to_string().contains("missing.png"));
    }

    #[test]
    fn test_decode_garbage_is_error() {
        assert!(decode_photo(b"not an image").is_err());
    }
}
