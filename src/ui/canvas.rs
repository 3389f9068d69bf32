// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Drawing canvas for the photo and its marks.
//!
//! This module turns egui pointer input into gesture events for the
//! [`CanvasState`] and paints the photo and mark shapes it lays out.

use photomark::canvas::{CanvasState, GestureEvent, Transition};
use photomark::models::mark_store::Pending;
use photomark::util::geometry::{self, Point, Size};

/// Per-widget input bookkeeping that egui does not keep for us.
#[derive(Default)]
pub struct CanvasView {
    /// Accumulated zoom and focal point of an active multi-touch pinch.
    pinch: Option<(f64, egui::Pos2)>,
}

fn color(rgba: [u8; 4]) -> egui::Color32 {
    egui::Color32::from_rgba_unmultiplied(rgba[0], rgba[1], rgba[2], rgba[3])
}

impl CanvasView {
    /// Display the canvas and feed it this frame's input.
    pub fn show(
        &mut self,
        ui: &mut egui::Ui,
        canvas: &mut CanvasState,
        texture: Option<&egui::TextureHandle>,
    ) -> Vec<Transition> {
        let (response, painter) = ui.allocate_painter(ui.available_size(), egui::Sense::click_and_drag());
        let rect = response.rect;
        let origin = rect.min;
        let to_local = |p: egui::Pos2| Point::new(f64::from(p.x - origin.x), f64::from(p.y - origin.y));
        let to_screen = |p: Point| egui::pos2(origin.x + p.x as f32, origin.y + p.y as f32);

        let mut transitions = Vec::new();
        let mut send = |canvas: &mut CanvasState, event: GestureEvent| {
            let transition = canvas.handle_gesture_event(event);
            if transition != Transition::Ignored {
                transitions.push(transition);
            }
        };

        let size = Size::new(f64::from(rect.width()), f64::from(rect.height()));
        if canvas.viewport().canvas_size() != size {
            send(canvas, GestureEvent::Resize { size });
        }

        let time_ms = ui.input(|i| (i.time * 1000.0) as u64);
        let (pressed, released, down, pointer, scroll, multi_touch) = ui.input(|i| {
            (
                i.pointer.primary_pressed(),
                i.pointer.primary_released(),
                i.pointer.primary_down(),
                i.pointer.interact_pos(),
                i.raw_scroll_delta.y,
                i.multi_touch(),
            )
        });

        match (multi_touch, self.pinch) {
            (Some(touch), pinch) => {
                let (zoom, focal) = match pinch {
                    Some(state) => state,
                    None => {
                        send(canvas, GestureEvent::PinchStart { focal: to_local(touch.start_pos) });
                        (1.0, touch.start_pos)
                    }
                };
                let zoom = zoom * f64::from(touch.zoom_delta);
                let focal = focal + touch.translation_delta;
                self.pinch = Some((zoom, focal));
                send(canvas, GestureEvent::PinchUpdate { focal: to_local(focal), scale_delta: zoom });
            }
            (None, Some(_)) => {
                self.pinch = None;
                send(canvas, GestureEvent::PinchEnd);
            }
            (None, None) => {
                if let Some(pos) = pointer {
                    let position = to_local(pos);
                    if pressed && response.hovered() {
                        send(canvas, GestureEvent::Press { position, time_ms });
                    } else if down {
                        send(canvas, GestureEvent::Move { position });
                    }
                    if released {
                        send(canvas, GestureEvent::Release { position, time_ms });
                    }
                    if scroll != 0.0 && response.hovered() {
                        send(canvas, GestureEvent::Wheel { position, delta: -f64::from(scroll) / 10.0 });
                    }
                }
            }
        }

        let style = canvas.config().style.clone();
        painter.rect_filled(rect, 0.0, color(style.background));

        if let (Some(texture), Some(photo)) = (texture, canvas.viewport().photo_size()) {
            let view = canvas.viewport();
            let photo_rect = egui::Rect::from_min_max(
                to_screen(view.to_screen_space(Point::ZERO)),
                to_screen(view.to_screen_space(Point::new(photo.width, photo.height))),
            );
            painter.image(
                texture.id(),
                photo_rect,
                egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0)),
                egui::Color32::WHITE,
            );
        } else {
            painter.text(
                rect.center(),
                egui::Align2::CENTER_CENTER,
                "Open a photo to begin marking",
                egui::FontId::proportional(18.0),
                egui::Color32::from_gray(90),
            );
        }

        let outline = color(style.outline);
        for mut shape in canvas.screen_shapes() {
            let m = shape.metrics;
            let center = to_screen(shape.center);
            let stroke = egui::Stroke::new(m.stroke_width as f32, outline);
            let galley = painter.layout_no_wrap(
                shape.text.clone(),
                egui::FontId::proportional((m.text_size as f32).max(1.0)),
                color(style.text),
            );
            let text_size = galley.size();
            shape.fit_label_to(Size::new(f64::from(text_size.x), f64::from(text_size.y)));

            if let Some(label) = &shape.label {
                let (from, to) = label.connector;
                painter.line_segment(
                    [to_screen(from), to_screen(to)],
                    egui::Stroke::new(m.stroke_width as f32, color(style.connector)),
                );
            }
            painter.circle_filled(center, m.radius as f32, color(style.fill));
            painter.circle_stroke(center, m.radius as f32, stroke);

            let text_center = match &shape.label {
                Some(label) => {
                    let box_rect = egui::Rect::from_min_max(
                        to_screen(label.rect.origin()),
                        to_screen(geometry::max_corner(&label.rect)),
                    );
                    painter.rect(box_rect, label.corner_radius as f32, color(style.label_fill), stroke);
                    box_rect.center()
                }
                None => center,
            };
            painter.galley(text_center - text_size / 2.0, galley, color(style.text));
        }

        // Staged first tap of a two-tap mark
        if let Some(Pending::FirstPoint(point) | Pending::AwaitingNumber { circle: point, .. }) = canvas.pending() {
            let center = to_screen(canvas.viewport().to_screen_space(point));
            painter.circle_stroke(center, 6.0, egui::Stroke::new(2.0, egui::Color32::LIGHT_BLUE));
        }

        transitions
    }
}
