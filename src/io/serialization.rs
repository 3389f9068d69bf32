// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Configuration serialization and deserialization.
//!
//! This module reads and writes [`AppConfig`] in YAML or JSON, chosen by the
//! file extension.

use crate::config::AppConfig;
use anyhow::{bail, Context, Result};
use std::path::Path;

enum Format {
    Yaml,
    Json,
}

fn format_for(path: &Path) -> Result<Format> {
    let extension = path.extension().and_then(|s| s.to_str());
    match extension {
        Some("yaml") | Some("yml") => Ok(Format::Yaml),
        Some("json") => Ok(Format::Json),
        _ => bail!("Unsupported config file extension: {:?}", extension),
    }
}

/// Write a config as YAML or JSON.
pub fn save_config(config: &AppConfig, path: &Path) -> Result<()> {
    let text = match format_for(path)? {
        Format::Yaml => serde_yaml::to_string(config)?,
        Format::Json => serde_json::to_string_pretty(config)?,
    };
    std::fs::write(path, text).with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}

/// Read a config from YAML or JSON and normalize it.
pub fn load_config(path: &Path) -> Result<AppConfig> {
    let format = format_for(path)?;
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let config: AppConfig = match format {
        Format::Yaml => serde_yaml::from_str(&text)
            .with_context(|| format!("Invalid YAML in {}", path.display()))?,
        Format::Json => serde_json::from_str(&text)
            .with_context(|| format!("Invalid JSON in {}", path.display()))?,
    };
    Ok(config.validate())
}
