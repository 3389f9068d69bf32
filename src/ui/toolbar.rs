// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Toolbar with mode, placement, undo, and zoom controls.

use photomark::canvas::{CanvasState, Mode};
use photomark::config::Placement;

/// Result of toolbar interaction.
pub enum ToolbarAction {
    None,
    ToggleMode,
    SetPlacement(Placement),
    Undo,
    Zoom(f64),
    FitView,
}

/// Display the toolbar.
pub fn show(ui: &mut egui::Ui, canvas: &CanvasState) -> ToolbarAction {
    let mut action = ToolbarAction::None;
    let has_photo = canvas.photo().is_some();

    ui.horizontal(|ui| {
        ui.spacing_mut().item_spacing.x = 8.0;

        let marking = canvas.mode() == Mode::Marking;
        let label = if marking { "✋ Stop marking" } else { "✏ Mark" };
        if ui.add_enabled(has_photo, egui::SelectableLabel::new(marking, label)).clicked() {
            action = ToolbarAction::ToggleMode;
        }

        ui.separator();

        let placement = canvas.placement();
        if ui.selectable_label(placement == Placement::SingleTap, "● Single tap").clicked() {
            action = ToolbarAction::SetPlacement(Placement::SingleTap);
        }
        if ui.selectable_label(placement == Placement::TwoTap, "●─▭ Circle + label").clicked() {
            action = ToolbarAction::SetPlacement(Placement::TwoTap);
        }

        ui.separator();

        if ui.add_enabled(has_photo, egui::Button::new("↶ Undo")).clicked() {
            action = ToolbarAction::Undo;
        }

        ui.separator();

        let limits = canvas.viewport().limits();
        let mut zoom = canvas.viewport().scale();
        let slider = egui::Slider::new(&mut zoom, limits.min..=limits.max)
            .logarithmic(true)
            .text("Zoom");
        if ui.add_enabled(has_photo, slider).changed() {
            action = ToolbarAction::Zoom(zoom);
        }
        if ui.add_enabled(has_photo, egui::Button::new("Fit")).clicked() {
            action = ToolbarAction::FitView;
        }

        ui.separator();

        let hint = match (canvas.mode(), placement) {
            (Mode::Viewing, _) => "Drag to pan, scroll or pinch to zoom, double-click to zoom in",
            (Mode::Marking, Placement::SingleTap) => "Click the photo to place the next mark",
            (Mode::Marking, Placement::TwoTap) => "Click the spot, then click where its label goes",
        };
        ui.label(egui::RichText::new(hint).italics().weak());
    });

    action
}
