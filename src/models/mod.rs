// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Data model: marks, the mark store, and the loaded photo.

pub mod mark;
pub mod mark_store;
pub mod photo;
