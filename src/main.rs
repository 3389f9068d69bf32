// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Photomark desktop application.
//!
//! Open a photo, place numbered marks on it, pan and zoom, undo, and save
//! the marked photo.

mod app;
mod ui;

use anyhow::Result;
use app::MarkApp;
use photomark::config::AppConfig;
use photomark::io::serialization;
use std::path::PathBuf;

/// Environment variable naming a YAML or JSON config file.
const CONFIG_ENV: &str = "PHOTOMARK_CONFIG";

fn load_config() -> AppConfig {
    let Some(path) = std::env::var_os(CONFIG_ENV).map(PathBuf::from) else {
        return AppConfig::default();
    };
    match serialization::load_config(&path) {
        Ok(config) => {
            log::info!("Loaded config from {}", path.display());
            config
        }
        Err(e) => {
            log::warn!("Using default config: {:#}", e);
            AppConfig::default()
        }
    }
}

fn main() -> Result<()> {
    // Initialize logging
    env_logger::init();

    let config = load_config();

    // Configure egui options
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1024.0, 768.0])
            .with_min_inner_size([480.0, 360.0])
            .with_title("Photomark"),
        ..Default::default()
    };

    // Run the application
    eframe::run_native(
        "Photomark",
        options,
        Box::new(|_cc| Ok(Box::new(MarkApp::new(config)))),
    )
    .map_err(|e| anyhow::anyhow!("Application error: {}", e))?;

    Ok(())
}
