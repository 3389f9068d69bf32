// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! The annotated-photo canvas.
//!
//! [`CanvasState`] owns the photo, the view transform, the mark store, and
//! the gesture state machine. It has no dependency on any UI toolkit: hosts
//! feed it [`GestureEvent`]s and draw what [`CanvasState::screen_shapes`]
//! returns.

pub mod gesture;

pub use gesture::{GestureEvent, GestureRouter, Mode, Transition};

use crate::config::{AppConfig, Placement};
use crate::io::export::ExportSnapshot;
use crate::io::media::PhotoSource;
use crate::models::mark::{Mark, MAX_MARK_NUMBER};
use crate::models::mark_store::{MarkStore, Pending, Undone};
use crate::models::photo::Photo;
use crate::render::{self, MarkShape};
use crate::view::Viewport;
use anyhow::Result;
use image::RgbaImage;

/// Synchronous number entry for labelled marks.
pub trait NumberPrompt {
    /// Ask for an integer in `min..=max`. `None` means the user cancelled.
    fn prompt_for_integer(&mut self, title: &str, message: &str, min: u32, max: u32) -> Option<String>;
}

pub struct CanvasState {
    config: AppConfig,
    photo: Option<Photo>,
    viewport: Viewport,
    store: MarkStore,
    router: GestureRouter,
}

impl CanvasState {
    pub fn new(config: AppConfig) -> Self {
        let config = config.validate();
        Self {
            viewport: Viewport::new(&config.view),
            store: MarkStore::new(config.marks.first_number),
            router: GestureRouter::new(&config),
            photo: None,
            config,
        }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn photo(&self) -> Option<&Photo> {
        self.photo.as_ref()
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn marks(&self) -> &[Mark] {
        self.store.marks()
    }

    pub fn next_number(&self) -> u32 {
        self.store.next_number()
    }

    pub fn pending(&self) -> Option<Pending> {
        self.store.pending()
    }

    pub fn mode(&self) -> Mode {
        self.router.mode()
    }

    pub fn placement(&self) -> Placement {
        self.router.placement()
    }

    /// Switch between single-tap and two-tap placement, dropping staged taps.
    pub fn set_placement(&mut self, placement: Placement) {
        self.router.set_placement(placement, &mut self.store);
    }

    /// Return to the fitted view.
    pub fn reset_view(&mut self) {
        self.viewport.fit_to_view();
    }

    /// Swap in a new photo, clearing marks and refitting the view in one step.
    pub fn load_photo(&mut self, photo: Photo) {
        log::info!("Showing {}x{} photo", photo.width(), photo.height());
        self.store.reset();
        self.router.reset();
        self.viewport.set_photo(Some(photo.size()));
        self.photo = Some(photo);
    }

    /// Ask `source` for a photo. Cancelling or failing leaves the canvas as it was.
    pub fn pick_photo(&mut self, source: &mut dyn PhotoSource) -> Result<bool> {
        match source.pick_photo()? {
            Some(photo) => {
                self.load_photo(photo);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    pub fn handle_gesture_event(&mut self, event: GestureEvent) -> Transition {
        self.router.handle(event, &mut self.viewport, &mut self.store)
    }

    /// Cancel staged input if any, else remove the newest mark.
    pub fn undo_last(&mut self) -> Option<Undone> {
        self.store.undo_last()
    }

    /// Answer an outstanding number request.
    pub fn submit_number(&mut self, input: &str) -> Transition {
        let Some(Pending::AwaitingNumber { circle, label }) = self.store.pending() else {
            return Transition::Ignored;
        };
        match self.store.add_mark_with_label(circle, label, input) {
            Some(mark) => Transition::MarkAdded(mark),
            None => Transition::NumberRejected,
        }
    }

    pub fn cancel_pending(&mut self) -> Transition {
        match self.store.cancel_pending() {
            Some(_) => Transition::PendingCancelled,
            None => Transition::Ignored,
        }
    }

    /// Drive `prompt` until it yields a valid number or is cancelled.
    pub fn resolve_number(&mut self, prompt: &mut dyn NumberPrompt) -> Transition {
        let mut message = "Enter the number for this mark";
        loop {
            if !matches!(self.store.pending(), Some(Pending::AwaitingNumber { .. })) {
                return Transition::Ignored;
            }
            let Some(input) = prompt.prompt_for_integer("Mark number", message, 0, MAX_MARK_NUMBER)
            else {
                return self.cancel_pending();
            };
            match self.submit_number(&input) {
                Transition::NumberRejected => {
                    message = "Please enter a whole number from 0 to 999";
                }
                other => return other,
            }
        }
    }

    /// Mark shapes in screen space for the current view.
    pub fn screen_shapes(&self) -> Vec<MarkShape> {
        let Some(photo) = &self.photo else {
            return Vec::new();
        };
        render::screen_shapes(
            self.store.marks(),
            photo.size(),
            &self.viewport.transform(),
            &self.config.style,
        )
    }

    /// Rasterize the visible canvas.
    pub fn render_view(&self) -> RgbaImage {
        let canvas = self.viewport.canvas_size();
        render::render_view(
            self.photo.as_ref(),
            self.store.marks(),
            &self.viewport.transform(),
            canvas.width.max(0.0).round() as u32,
            canvas.height.max(0.0).round() as u32,
            &self.config.style,
        )
    }

    /// Photo and marks as they are now, for export on another thread.
    pub fn snapshot(&self) -> Option<ExportSnapshot> {
        let photo = self.photo.clone()?;
        Some(ExportSnapshot {
            photo,
            marks: self.store.marks().to_vec(),
        })
    }
}
