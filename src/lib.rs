// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Photomark - numbered marks on photos.
//!
//! The library holds the toolkit-independent core: the view transform
//! between photo and screen space, the mark store, gesture routing,
//! rendering, and raster export. The desktop binary is a thin egui shell
//! around [`canvas::CanvasState`].

pub mod canvas;
pub mod config;
pub mod io;
pub mod models;
pub mod render;
pub mod util;
pub mod view;
