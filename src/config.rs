// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Application configuration.
//!
//! Every section and field falls back to a default, so a config file only
//! needs to name the values it overrides.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Complete configuration for the canvas, renderer and export pipeline.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub view: ViewConfig,
    #[serde(default)]
    pub marks: MarkConfig,
    #[serde(default)]
    pub style: StyleConfig,
    #[serde(default)]
    pub export: ExportConfig,
}

/// Pan/zoom behaviour.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewConfig {
    #[serde(default = "default_min_scale")]
    pub min_scale: f64,
    #[serde(default = "default_max_scale")]
    pub max_scale: f64,
    /// Fraction of the canvas the fitted photo may occupy.
    #[serde(default = "default_fit_margin")]
    pub fit_margin: f64,
    #[serde(default = "default_double_tap_scale")]
    pub double_tap_scale: f64,
    #[serde(default = "default_double_tap_window_ms")]
    pub double_tap_window_ms: u64,
    /// Screen distance a press may travel and still count as a tap.
    #[serde(default = "default_tap_slop")]
    pub tap_slop: f64,
    #[serde(default = "default_min_visible_fraction")]
    pub min_visible_fraction: f64,
    /// Wheel zoom factor is `2^(-delta / wheel_step)`.
    #[serde(default = "default_wheel_step")]
    pub wheel_step: f64,
}

/// How taps turn into marks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Placement {
    /// One tap places a numbered circle.
    #[default]
    SingleTap,
    /// First tap places the circle, second tap places its label box.
    TwoTap,
}

/// Where two-tap marks get their number from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LabelNumbering {
    Auto,
    #[default]
    Prompt,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarkConfig {
    #[serde(default)]
    pub placement: Placement,
    #[serde(default)]
    pub label_numbering: LabelNumbering,
    #[serde(default = "default_first_number")]
    pub first_number: u32,
}

/// Mark sizing ratios (relative to photo width) and colours.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StyleConfig {
    #[serde(default = "default_radius_ratio")]
    pub radius_ratio: f64,
    #[serde(default = "default_text_ratio")]
    pub text_ratio: f64,
    #[serde(default = "default_stroke_ratio")]
    pub stroke_ratio: f64,
    #[serde(default = "default_min_export_radius")]
    pub min_export_radius: f64,
    #[serde(default = "default_min_export_text")]
    pub min_export_text: f64,
    #[serde(default = "default_min_export_stroke")]
    pub min_export_stroke: f64,
    #[serde(default = "default_fill")]
    pub fill: [u8; 4],
    #[serde(default = "default_white")]
    pub outline: [u8; 4],
    #[serde(default = "default_white")]
    pub text: [u8; 4],
    #[serde(default = "default_label_fill")]
    pub label_fill: [u8; 4],
    #[serde(default = "default_connector")]
    pub connector: [u8; 4],
    #[serde(default = "default_background")]
    pub background: [u8; 4],
}

/// Raster encodings the export pipeline can produce.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    #[default]
    Jpeg,
    Png,
}

impl ExportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Jpeg => "jpg",
            ExportFormat::Png => "png",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportConfig {
    #[serde(default = "default_file_prefix")]
    pub file_prefix: String,
    #[serde(default)]
    pub format: ExportFormat,
    #[serde(default = "default_quality")]
    pub quality: u8,
    #[serde(default = "default_cache_dir")]
    pub cache_dir: PathBuf,
    #[serde(default = "default_gallery_dir")]
    pub gallery_dir: PathBuf,
}

impl AppConfig {
    /// Normalize values that would break the canvas invariants.
    pub fn validate(mut self) -> Self {
        let view = &mut self.view;
        if !is_positive(view.min_scale) {
            log::warn!("min_scale {} is not positive, using default", view.min_scale);
            view.min_scale = default_min_scale();
        }
        if !is_positive(view.max_scale) {
            log::warn!("max_scale {} is not positive, using default", view.max_scale);
            view.max_scale = default_max_scale();
        }
        if view.min_scale > view.max_scale {
            std::mem::swap(&mut view.min_scale, &mut view.max_scale);
        }
        if !(view.fit_margin > 0.0 && view.fit_margin <= 1.0) {
            log::warn!("fit_margin {} outside (0, 1], using default", view.fit_margin);
            view.fit_margin = default_fit_margin();
        }
        if !is_positive(view.wheel_step) {
            view.wheel_step = default_wheel_step();
        }
        if !is_positive(view.double_tap_scale) {
            log::warn!("double_tap_scale {} is not positive, using default", view.double_tap_scale);
            view.double_tap_scale = default_double_tap_scale();
        }
        if !view.min_visible_fraction.is_finite() {
            log::warn!("min_visible_fraction {} is not finite, using default", view.min_visible_fraction);
            view.min_visible_fraction = default_min_visible_fraction();
        }
        view.min_visible_fraction = view.min_visible_fraction.clamp(0.0, 1.0);
        if !view.tap_slop.is_finite() {
            view.tap_slop = default_tap_slop();
        }
        view.tap_slop = view.tap_slop.max(0.0);

        let style = &mut self.style;
        for (value, default) in [
            (&mut style.radius_ratio, default_radius_ratio()),
            (&mut style.text_ratio, default_text_ratio()),
            (&mut style.stroke_ratio, default_stroke_ratio()),
            (&mut style.min_export_radius, default_min_export_radius()),
            (&mut style.min_export_text, default_min_export_text()),
            (&mut style.min_export_stroke, default_min_export_stroke()),
        ] {
            if !(value.is_finite() && *value >= 0.0) {
                *value = default;
            }
        }

        self.export.quality = self.export.quality.clamp(1, 100);
        self
    }
}

fn is_positive(value: f64) -> bool {
    value.is_finite() && value > 0.0
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            min_scale: default_min_scale(),
            max_scale: default_max_scale(),
            fit_margin: default_fit_margin(),
            double_tap_scale: default_double_tap_scale(),
            double_tap_window_ms: default_double_tap_window_ms(),
            tap_slop: default_tap_slop(),
            min_visible_fraction: default_min_visible_fraction(),
            wheel_step: default_wheel_step(),
        }
    }
}

impl Default for MarkConfig {
    fn default() -> Self {
        Self {
            placement: Placement::default(),
            label_numbering: LabelNumbering::default(),
            first_number: default_first_number(),
        }
    }
}

impl Default for StyleConfig {
    fn default() -> Self {
        Self {
            radius_ratio: default_radius_ratio(),
            text_ratio: default_text_ratio(),
            stroke_ratio: default_stroke_ratio(),
            min_export_radius: default_min_export_radius(),
            min_export_text: default_min_export_text(),
            min_export_stroke: default_min_export_stroke(),
            fill: default_fill(),
            outline: default_white(),
            text: default_white(),
            label_fill: default_label_fill(),
            connector: default_connector(),
            background: default_background(),
        }
    }
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            file_prefix: default_file_prefix(),
            format: ExportFormat::default(),
            quality: default_quality(),
            cache_dir: default_cache_dir(),
            gallery_dir: default_gallery_dir(),
        }
    }
}

// Default value functions
fn default_min_scale() -> f64 {
    0.5
}

fn default_max_scale() -> f64 {
    5.0
}

fn default_fit_margin() -> f64 {
    0.95
}

fn default_double_tap_scale() -> f64 {
    2.5
}

fn default_double_tap_window_ms() -> u64 {
    300
}

fn default_tap_slop() -> f64 {
    10.0
}

fn default_min_visible_fraction() -> f64 {
    0.25
}

fn default_wheel_step() -> f64 {
    10.0
}

fn default_first_number() -> u32 {
    1
}

fn default_radius_ratio() -> f64 {
    0.02
}

fn default_text_ratio() -> f64 {
    0.02
}

fn default_stroke_ratio() -> f64 {
    0.002
}

fn default_min_export_radius() -> f64 {
    20.0
}

fn default_min_export_text() -> f64 {
    20.0
}

fn default_min_export_stroke() -> f64 {
    2.0
}

fn default_fill() -> [u8; 4] {
    [255, 0, 0, 180]
}

fn default_white() -> [u8; 4] {
    [255, 255, 255, 255]
}

fn default_label_fill() -> [u8; 4] {
    [200, 0, 0, 220]
}

fn default_connector() -> [u8; 4] {
    [255, 0, 0, 255]
}

fn default_background() -> [u8; 4] {
    [211, 211, 211, 255]
}

fn default_file_prefix() -> String {
    "marked_photo".to_string()
}

fn default_quality() -> u8 {
    95
}

fn default_cache_dir() -> PathBuf {
    std::env::temp_dir().join("photomark")
}

fn default_gallery_dir() -> PathBuf {
    PathBuf::from("photomark_gallery")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_yaml_uses_defaults() {
        let config: AppConfig = serde_yaml::from_str("{}").unwrap();

        assert_eq!(config, AppConfig::default());
        assert_eq!(config.view.min_scale, 0.5);
        assert_eq!(config.view.max_scale, 5.0);
        assert_eq!(config.marks.first_number, 1);
        assert_eq!(config.export.quality, 95);
    }

    #[test]
    fn test_partial_override() {
        let yaml = "marks:\n  placement: two_tap\n  label_numbering: auto\nexport:\n  format: png\n";
        let config: AppConfig = serde_yaml::from_str(yaml).unwrap();

        assert_eq!(config.marks.placement, Placement::TwoTap);
        assert_eq!(config.marks.label_numbering, LabelNumbering::Auto);
        assert_eq!(config.export.format, ExportFormat::Png);
        assert_eq!(config.view.fit_margin, 0.95);
    }

    #[test]
    fn test_validate_repairs_bad_values() {
        let mut config = AppConfig::default();
        config.view.min_scale = 4.0;
        config.view.max_scale = 2.0;
        config.view.fit_margin = 1.5;
        config.export.quality = 0;

        let config = config.validate();

        assert_eq!(config.view.min_scale, 2.0);
        assert_eq!(config.view.max_scale, 4.0);
        assert_eq!(config.view.fit_margin, 0.95);
        assert_eq!(config.export.quality, 1);
    }

    #[test]
    fn test_validate_replaces_non_finite_values() {
        let yaml = "view:\n  min_visible_fraction: .nan\n  tap_slop: .nan\n  double_tap_scale: .inf\n  max_scale: .inf\nstyle:\n  radius_ratio: .nan\n";
        let config: AppConfig = serde_yaml::from_str(yaml).unwrap();
        assert!(config.view.min_visible_fraction.is_nan());

        let config = config.validate();

        assert_eq!(config.view.min_visible_fraction, 0.25);
        assert_eq!(config.view.tap_slop, 10.0);
        assert_eq!(config.view.double_tap_scale, 2.5);
        assert_eq!(config.view.max_scale, 5.0);
        assert_eq!(config.style.radius_ratio, 0.02);
    }
}
