// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! I/O boundaries: photo loading, config files, and raster export.

pub mod export;
pub mod media;
pub mod serialization;
