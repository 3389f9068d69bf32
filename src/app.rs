// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Main application state and egui App implementation.
//!
//! This module hosts a [`CanvasState`] inside an egui window: it wires the
//! menus, toolbar, and canvas widget to canvas operations, and runs photo
//! decoding and export on background threads.

use crate::ui::{canvas::CanvasView, toolbar};
use photomark::canvas::{CanvasState, GestureEvent, Transition};
use photomark::config::AppConfig;
use photomark::io::export::{self, DirectorySink, ExportOutcome, ExportSink};
use photomark::io::media::{self, IMAGE_EXTENSIONS};
use photomark::models::mark_store::{Pending, Undone};
use photomark::models::photo::Photo;
use photomark::util::geometry;
use std::path::PathBuf;
use std::sync::mpsc::{channel, Receiver};

/// Main application state.
pub struct MarkApp {
    /// Photo, view, marks, and gesture state
    canvas: CanvasState,

    /// Canvas widget input state
    canvas_view: CanvasView,

    /// Texture of the current photo, rebuilt after each load
    texture: Option<egui::TextureHandle>,

    /// Receiver for background photo decoding
    photo_loader: Option<Receiver<Result<Photo, String>>>,

    /// Receiver for background export
    exporter: Option<Receiver<Result<ExportOutcome, String>>>,

    /// Loading state message
    loading_message: Option<String>,

    /// Last message shown in the status bar
    status: Option<String>,

    /// Text typed into the mark number prompt
    number_input: String,

    /// Most recent export, offered for sharing
    last_export: Option<PathBuf>,

    /// Gallery the exports are copied into
    gallery: DirectorySink,
}

impl MarkApp {
    /// Create a new application instance.
    pub fn new(config: AppConfig) -> Self {
        let gallery = DirectorySink::new(config.export.gallery_dir.clone());
        Self {
            canvas: CanvasState::new(config),
            canvas_view: CanvasView::default(),
            texture: None,
            photo_loader: None,
            exporter: None,
            loading_message: None,
            status: None,
            number_input: String::new(),
            last_export: None,
            gallery,
        }
    }

    /// Load a photo file on a background thread.
    fn load_photo_file(&mut self, path: PathBuf) {
        let (sender, receiver) = channel();
        self.photo_loader = Some(receiver);
        self.loading_message = Some("Loading photo...".to_string());

        std::thread::spawn(move || {
            let result = media::load_photo(&path).map_err(|e| format!("{:#}", e));
            let _ = sender.send(result);
        });
    }

    /// Export the current photo and marks on a background thread.
    fn start_export(&mut self) {
        let Some(snapshot) = self.canvas.snapshot() else {
            self.status = Some("Open a photo before saving".to_string());
            return;
        };
        let (sender, receiver) = channel();
        self.exporter = Some(receiver);
        self.loading_message = Some("Saving photo...".to_string());

        let style = self.canvas.config().style.clone();
        let config = self.canvas.config().export.clone();
        let gallery = self.gallery.clone();
        std::thread::spawn(move || {
            let result = export::export_snapshot(&snapshot, &style, &config, Some(&gallery))
                .map_err(|e| format!("{:#}", e));
            let _ = sender.send(result);
        });
    }

    fn share_last_export(&mut self) {
        let Some(path) = self.last_export.clone() else {
            return;
        };
        self.status = Some(match self.gallery.share(&path) {
            Ok(()) => format!("Shared {}", path.display()),
            Err(e) => {
                log::error!("Share failed: {:#}", e);
                format!("Could not share: {:#}", e)
            }
        });
    }

    fn undo(&mut self) {
        match self.canvas.undo_last() {
            Some(Undone::Mark(mark)) => self.status = Some(format!("Removed mark {}", mark.number)),
            Some(Undone::Pending(_)) => self.status = Some("Cancelled mark in progress".to_string()),
            None => {}
        }
    }

    /// Pick up results from the background workers.
    fn poll_workers(&mut self) {
        if let Some(ref receiver) = self.photo_loader {
            if let Ok(result) = receiver.try_recv() {
                self.photo_loader = None;
                self.loading_message = None;

                match result {
                    Ok(photo) => {
                        self.canvas.load_photo(photo);
                        self.texture = None;
                        self.number_input.clear();
                        self.status = Some("Photo loaded".to_string());
                    }
                    Err(e) => {
                        log::error!("Failed to load photo: {}", e);
                        self.status = Some(format!("Could not load photo: {}", e));
                    }
                }
            }
        }

        if let Some(ref receiver) = self.exporter {
            if let Ok(result) = receiver.try_recv() {
                self.exporter = None;
                self.loading_message = None;

                match result {
                    Ok(outcome) => {
                        self.status = Some(format!("Saved {}", outcome.file_path.display()));
                        self.last_export = Some(outcome.file_path);
                    }
                    Err(e) => {
                        log::error!("Failed to save photo: {}", e);
                        self.status = Some(format!("Could not save photo: {}", e));
                    }
                }
            }
        }
    }

    fn ensure_texture(&mut self, ctx: &egui::Context) {
        if self.texture.is_some() {
            return;
        }
        if let Some(photo) = self.canvas.photo() {
            let size = [photo.width() as usize, photo.height() as usize];
            let image = egui::ColorImage::from_rgba_unmultiplied(size, photo.pixels().as_raw());
            self.texture = Some(ctx.load_texture("photo", image, egui::TextureOptions::LINEAR));
        }
    }

    /// Modal entry for the number of a labelled mark.
    fn show_number_prompt(&mut self, ctx: &egui::Context) {
        if !matches!(self.canvas.pending(), Some(Pending::AwaitingNumber { .. })) {
            return;
        }
        let mut submit = false;
        let mut cancel = false;

        egui::Window::new("Mark number")
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
            .show(ctx, |ui| {
                ui.label("Enter a number from 0 to 999");
                let response = ui.text_edit_singleline(&mut self.number_input);
                response.request_focus();
                if response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter)) {
                    submit = true;
                }
                ui.horizontal(|ui| {
                    if ui.button("OK").clicked() {
                        submit = true;
                    }
                    if ui.button("Cancel").clicked() {
                        cancel = true;
                    }
                });
            });

        if cancel {
            self.canvas.cancel_pending();
            self.number_input.clear();
        } else if submit {
            match self.canvas.submit_number(&self.number_input) {
                Transition::NumberRejected => {
                    self.status = Some(format!("\"{}\" is not a number from 0 to 999", self.number_input));
                    self.number_input.clear();
                }
                transition => self.report(transition),
            }
        }
    }

    fn report(&mut self, transition: Transition) {
        match transition {
            Transition::MarkAdded(mark) => {
                self.number_input.clear();
                self.status = Some(format!("Added mark {}", mark.number));
            }
            Transition::ModeChanged(mode) => self.status = Some(format!("{:?} mode", mode)),
            Transition::FirstPointStaged(_) => {
                self.status = Some("Now click where the label goes".to_string());
            }
            _ => {}
        }
    }
}

impl eframe::App for MarkApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.poll_workers();
        self.ensure_texture(ctx);

        // Request repaint while a worker is running (to update spinner)
        if self.loading_message.is_some() {
            ctx.request_repaint();
        }

        // Top menu bar
        egui::TopBottomPanel::top("menu_bar").show(ctx, |ui| {
            egui::menu::bar(ui, |ui| {
                ui.menu_button("File", |ui| {
                    if ui.button("Open Photo...").clicked() {
                        // Open native file picker
                        if let Some(path) = rfd::FileDialog::new()
                            .add_filter("Images", IMAGE_EXTENSIONS)
                            .pick_file()
                        {
                            self.load_photo_file(path);
                        }
                        ui.close_menu();
                    }
                    let has_photo = self.canvas.photo().is_some();
                    if ui.add_enabled(has_photo, egui::Button::new("Save Marked Photo")).clicked() {
                        self.start_export();
                        ui.close_menu();
                    }
                    if ui
                        .add_enabled(self.last_export.is_some(), egui::Button::new("Share Last Save"))
                        .clicked()
                    {
                        self.share_last_export();
                        ui.close_menu();
                    }
                    ui.separator();
                    if ui.button("Quit").clicked() {
                        ctx.send_viewport_cmd(egui::ViewportCommand::Close);
                    }
                });

                ui.menu_button("Edit", |ui| {
                    if ui.button("Undo (Ctrl+Z)").clicked() {
                        self.undo();
                        ui.close_menu();
                    }
                });

                ui.menu_button("View", |ui| {
                    let center = geometry::center(self.canvas.viewport().canvas_size());
                    if ui.button("Zoom In").clicked() {
                        self.canvas.handle_gesture_event(GestureEvent::Wheel { position: center, delta: -5.0 });
                        ui.close_menu();
                    }
                    if ui.button("Zoom Out").clicked() {
                        self.canvas.handle_gesture_event(GestureEvent::Wheel { position: center, delta: 5.0 });
                        ui.close_menu();
                    }
                    if ui.button("Fit to Window").clicked() {
                        self.canvas.reset_view();
                        ui.close_menu();
                    }
                });
            });
        });

        // Toolbar
        let toolbar_action = egui::TopBottomPanel::top("toolbar")
            .show(ctx, |ui| toolbar::show(ui, &self.canvas))
            .inner;

        match toolbar_action {
            toolbar::ToolbarAction::ToggleMode => {
                let transition = self.canvas.handle_gesture_event(GestureEvent::ToggleMode);
                self.report(transition);
            }
            toolbar::ToolbarAction::SetPlacement(placement) => self.canvas.set_placement(placement),
            toolbar::ToolbarAction::Undo => self.undo(),
            toolbar::ToolbarAction::Zoom(scale) => {
                self.canvas.handle_gesture_event(GestureEvent::ZoomTo { scale });
            }
            toolbar::ToolbarAction::FitView => self.canvas.reset_view(),
            toolbar::ToolbarAction::None => {}
        }

        // Status bar
        egui::TopBottomPanel::bottom("status").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.label(format!("Marks: {}", self.canvas.marks().len()));
                ui.separator();
                ui.label(format!("Zoom: {:.0}%", self.canvas.viewport().scale() * 100.0));
                if let Some(ref status) = self.status {
                    ui.separator();
                    ui.label(status);
                }
            });
        });

        // Handle keyboard shortcuts
        if !ctx.wants_keyboard_input() {
            if ctx.input(|i| i.modifiers.command && i.key_pressed(egui::Key::Z)) {
                self.undo();
            }
            if ctx.input(|i| i.key_pressed(egui::Key::Escape)) {
                self.canvas.cancel_pending();
            }
        }

        self.show_number_prompt(ctx);

        // Main canvas (center)
        let transitions = egui::CentralPanel::default()
            .show(ctx, |ui| {
                if let Some(ref message) = self.loading_message {
                    ui.centered_and_justified(|ui| {
                        ui.vertical_centered(|ui| {
                            ui.add_space(20.0);
                            ui.spinner();
                            ui.add_space(10.0);
                            ui.label(egui::RichText::new(message).size(16.0));
                        });
                    });
                    Vec::new()
                } else {
                    self.canvas_view.show(ui, &mut self.canvas, self.texture.as_ref())
                }
            })
            .inner;

        for transition in transitions {
            self.report(transition);
        }
    }
}
