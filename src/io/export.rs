// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Flattened raster export.
//!
//! An export takes an immutable snapshot of the photo and its marks, burns
//! the marks in at full resolution, encodes the result, writes it to the
//! cache directory, and optionally hands it to a gallery sink.

use crate::config::{ExportConfig, ExportFormat, StyleConfig};
use crate::models::mark::Mark;
use crate::models::photo::Photo;
use crate::render;
use anyhow::{bail, Context, Result};
use chrono::{DateTime, Local};
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::{DynamicImage, RgbaImage};
use std::path::{Path, PathBuf};

/// Photo and marks captured at the moment an export was requested.
#[derive(Debug, Clone)]
pub struct ExportSnapshot {
    pub photo: Photo,
    pub marks: Vec<Mark>,
}

/// Where an export ended up.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportOutcome {
    pub file_name: String,
    pub file_path: PathBuf,
    pub gallery_path: Option<PathBuf>,
}

/// Platform storage for finished exports.
pub trait ExportSink {
    /// Store encoded image bytes in the user's photo gallery.
    fn save_to_gallery(&self, bytes: &[u8], file_name: &str) -> Result<PathBuf>;

    /// Offer an exported file to other applications.
    fn share(&self, path: &Path) -> Result<()> {
        bail!("Sharing {} is not supported here", path.display())
    }
}

/// A gallery that is just a directory on disk.
#[derive(Debug, Clone)]
pub struct DirectorySink {
    dir: PathBuf,
}

impl DirectorySink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl ExportSink for DirectorySink {
    fn save_to_gallery(&self, bytes: &[u8], file_name: &str) -> Result<PathBuf> {
        let path = self.dir.join(file_name);
        write_file(&path, bytes)?;
        Ok(path)
    }
}

/// Encode an RGBA image. JPEG drops the alpha channel.
pub fn encode(image: &RgbaImage, format: ExportFormat, quality: u8) -> Result<Vec<u8>> {
    let mut bytes = Vec::new();
    match format {
        ExportFormat::Jpeg => {
            let rgb = DynamicImage::ImageRgba8(image.clone()).to_rgb8();
            rgb.write_with_encoder(JpegEncoder::new_with_quality(&mut bytes, quality.clamp(1, 100)))
                .context("Failed to encode JPEG")?;
        }
        ExportFormat::Png => {
            image
                .write_with_encoder(PngEncoder::new(&mut bytes))
                .context("Failed to encode PNG")?;
        }
    }
    Ok(bytes)
}

/// Write bytes to a file, creating parent directories as needed.
pub fn write_file(path: &Path, bytes: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    std::fs::write(path, bytes).with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}

/// `<prefix>_<YYYYMMDD_HHMMSS>.<ext>`
pub fn export_file_name(prefix: &str, format: ExportFormat, at: DateTime<Local>) -> String {
    format!("{}_{}.{}", prefix, at.format("%Y%m%d_%H%M%S"), format.extension())
}

/// Flatten, encode, and write a snapshot, then pass it to `sink` if given.
pub fn export_snapshot(
    snapshot: &ExportSnapshot,
    style: &StyleConfig,
    config: &ExportConfig,
    sink: Option<&dyn ExportSink>,
) -> Result<ExportOutcome> {
    let flattened = render::flatten(&snapshot.photo, &snapshot.marks, style);
    let bytes = encode(&flattened, config.format, config.quality)?;

    let file_name = export_file_name(&config.file_prefix, config.format, Local::now());
    let file_path = config.cache_dir.join(&file_name);
    write_file(&file_path, &bytes)?;
    log::info!(
        "Exported {} marks to {} ({} bytes)",
        snapshot.marks.len(),
        file_path.display(),
        bytes.len()
    );

    let gallery_path = match sink {
        Some(sink) => {
            let path = sink
                .save_to_gallery(&bytes, &file_name)
                .context("Failed to save to gallery")?;
            log::info!("Saved to gallery at {}", path.display());
            Some(path)
        }
        None => None,
    };

    Ok(ExportOutcome {
        file_name,
        file_path,
        gallery_path,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::util::geometry::Point;
    use chrono::TimeZone;
    use image::Rgba;

    fn snapshot() -> ExportSnapshot {
        ExportSnapshot {
            photo: Photo::new(RgbaImage::from_pixel(64, 48, Rgba([0, 128, 0, 255]))),
            marks: vec![Mark::new(Point::new(20.0, 20.0), 1)],
        }
    }

    #[test]
    fn test_file_name_format() {
        let at = Local.with_ymd_and_hms(2025, 3, 7, 9, 5, 1).unwrap();

        assert_eq!(
            export_file_name("marked_photo", ExportFormat::Jpeg, at),
            "marked_photo_20250307_090501.jpg"
        );
        assert_eq!(
            export_file_name("shot", ExportFormat::Png, at),
            "shot_20250307_090501.png"
        );
    }

    #[test]
    fn test_encode_decodes_back() {
        let img = RgbaImage::from_pixel(10, 6, Rgba([10, 20, 30, 255]));

        for format in [ExportFormat::Jpeg, ExportFormat::Png] {
            let bytes = encode(&img, format, 90).unwrap();
            let decoded = image::load_from_memory(&bytes).unwrap();
            assert_eq!((decoded.width(), decoded.height()), (10, 6));
        }
    }

    #[test]
    fn test_export_writes_cache_and_gallery() {
        let dir = tempfile::tempdir().unwrap();
        let config = ExportConfig {
            format: ExportFormat::Png,
            cache_dir: dir.path().join("cache"),
            ..ExportConfig::default()
        };
        let sink = DirectorySink::new(dir.path().join("gallery"));

        let outcome = export_snapshot(&snapshot(), &StyleConfig::default(), &config, Some(&sink)).unwrap();

        assert!(outcome.file_name.starts_with("marked_photo_"));
        assert!(outcome.file_path.exists());
        let gallery = outcome.gallery_path.unwrap();
        assert_eq!(std::fs::read(&gallery).unwrap(), std::fs::read(&outcome.file_path).unwrap());

        let exported = image::open(&outcome.file_path).unwrap().to_rgba8();
        assert_eq!(exported.dimensions(), (64, 48));
        assert_ne!(*exported.get_pixel(20, 20), Rgba([0, 128, 0, 255]));
    }

    #[test]
    fn test_directory_sink_cannot_share() {
        let sink = DirectorySink::new("unused");

        assert!(sink.share(Path::new("x.jpg")).is_err());
    }
}
