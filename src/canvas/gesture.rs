// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Gesture routing.
//!
//! Host UI events are translated into [`GestureEvent`]s and fed through a
//! small state machine. In `Viewing` mode presses pan and double taps zoom;
//! in `Marking` mode taps place marks, either in one tap or in two.

use crate::config::{AppConfig, LabelNumbering, Placement};
use crate::models::mark::Mark;
use crate::models::mark_store::{MarkStore, Pending};
use crate::util::geometry::{self, Point, Size};
use crate::view::Viewport;

/// Input events in screen coordinates, independent of any UI toolkit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GestureEvent {
    Press { position: Point, time_ms: u64 },
    Move { position: Point },
    Release { position: Point, time_ms: u64 },
    /// Scroll wheel; positive deltas zoom out.
    Wheel { position: Point, delta: f64 },
    PinchStart { focal: Point },
    /// `scale_delta` is relative to the scale when the pinch started.
    PinchUpdate { focal: Point, scale_delta: f64 },
    PinchEnd,
    /// Zoom slider, anchored at the canvas centre.
    ZoomTo { scale: f64 },
    Resize { size: Size },
    ToggleMode,
}

/// Top-level interaction mode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Mode {
    #[default]
    Viewing,
    Marking,
}

/// The observable outcome of handling one event.
#[derive(Debug, Clone, PartialEq)]
pub enum Transition {
    Ignored,
    ModeChanged(Mode),
    ViewChanged,
    DoubleTapZoom,
    MarkAdded(Mark),
    /// First tap of a two-tap mark, in photo space.
    FirstPointStaged(Point),
    /// Both anchors placed; the host must ask the user for a number.
    NumberRequested { circle: Point, label: Point },
    /// The supplied number was invalid; the request stays open.
    NumberRejected,
    PendingCancelled,
}

/// An in-progress press.
#[derive(Debug, Clone, Copy)]
struct PressState {
    origin: Point,
    last: Point,
    dragged: bool,
}

#[derive(Debug, Clone)]
pub struct GestureRouter {
    mode: Mode,
    placement: Placement,
    label_numbering: LabelNumbering,
    double_tap_window_ms: u64,
    tap_slop: f64,
    wheel_step: f64,
    press: Option<PressState>,
    last_tap_ms: Option<u64>,
}

impl GestureRouter {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            mode: Mode::Viewing,
            placement: config.marks.placement,
            label_numbering: config.marks.label_numbering,
            double_tap_window_ms: config.view.double_tap_window_ms,
            tap_slop: config.view.tap_slop,
            wheel_step: config.view.wheel_step,
            press: None,
            last_tap_ms: None,
        }
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn placement(&self) -> Placement {
        self.placement
    }

    pub fn set_placement(&mut self, placement: Placement, store: &mut MarkStore) {
        if self.placement != placement {
            store.cancel_pending();
            self.placement = placement;
        }
    }

    /// Forget any half-finished gesture, e.g. after a photo swap.
    pub fn reset(&mut self) {
        self.mode = Mode::Viewing;
        self.press = None;
        self.last_tap_ms = None;
    }

    /// Route one event, mutating the viewport and store as needed.
    pub fn handle(
        &mut self,
        event: GestureEvent,
        viewport: &mut Viewport,
        store: &mut MarkStore,
    ) -> Transition {
        match event {
            GestureEvent::ToggleMode => self.toggle_mode(viewport, store),
            GestureEvent::Resize { size } => {
                viewport.resize(size);
                Transition::ViewChanged
            }
            GestureEvent::Wheel { position, delta } => {
                let factor = 2f64.powf(-delta / self.wheel_step);
                changed(viewport.zoom_by(factor, position))
            }
            GestureEvent::ZoomTo { scale } => changed(viewport.set_zoom(scale)),
            GestureEvent::PinchStart { focal } => {
                if viewport.photo_size().is_none() {
                    return Transition::Ignored;
                }
                // A pinch is never a tap.
                self.press = None;
                self.last_tap_ms = None;
                viewport.begin_pinch(focal);
                Transition::Ignored
            }
            GestureEvent::PinchUpdate { focal, scale_delta } => {
                changed(viewport.update_pinch(scale_delta, focal))
            }
            GestureEvent::PinchEnd => {
                viewport.end_pinch();
                Transition::Ignored
            }
            GestureEvent::Press { position, .. } => {
                if viewport.photo_size().is_none() || viewport.is_pinching() {
                    return Transition::Ignored;
                }
                self.press = Some(PressState {
                    origin: position,
                    last: position,
                    dragged: false,
                });
                Transition::Ignored
            }
            GestureEvent::Move { position } => self.on_move(position, viewport),
            GestureEvent::Release { position, time_ms } => {
                self.on_release(position, time_ms, viewport, store)
            }
        }
    }

    fn toggle_mode(&mut self, viewport: &Viewport, store: &mut MarkStore) -> Transition {
        if viewport.photo_size().is_none() {
            log::debug!("Ignoring mode toggle without a photo");
            return Transition::Ignored;
        }
        self.mode = match self.mode {
            Mode::Viewing => Mode::Marking,
            Mode::Marking => {
                store.cancel_pending();
                Mode::Viewing
            }
        };
        self.press = None;
        self.last_tap_ms = None;
        log::info!("Switched to {:?} mode", self.mode);
        Transition::ModeChanged(self.mode)
    }

    fn on_move(&mut self, position: Point, viewport: &mut Viewport) -> Transition {
        let Some(mut press) = self.press else {
            return Transition::Ignored;
        };
        if position.distance(press.origin) > self.tap_slop {
            press.dragged = true;
        }
        let delta = position - press.last;
        press.last = position;
        self.press = Some(press);

        match self.mode {
            Mode::Viewing => changed(viewport.pan_by(delta)),
            Mode::Marking => Transition::Ignored,
        }
    }

    fn on_release(
        &mut self,
        position: Point,
        time_ms: u64,
        viewport: &mut Viewport,
        store: &mut MarkStore,
    ) -> Transition {
        let Some(press) = self.press.take() else {
            return Transition::Ignored;
        };
        if press.dragged || position.distance(press.origin) > self.tap_slop {
            self.last_tap_ms = None;
            return Transition::Ignored;
        }

        match self.mode {
            Mode::Viewing => {
                let is_double = self
                    .last_tap_ms
                    .is_some_and(|last| time_ms.saturating_sub(last) <= self.double_tap_window_ms);
                if is_double {
                    self.last_tap_ms = None;
                    changed_to(viewport.toggle_double_tap_zoom(position), Transition::DoubleTapZoom)
                } else {
                    self.last_tap_ms = Some(time_ms);
                    Transition::Ignored
                }
            }
            Mode::Marking => self.place(position, viewport, store),
        }
    }

    fn place(&mut self, screen: Point, viewport: &Viewport, store: &mut MarkStore) -> Transition {
        let Some(photo_size) = viewport.photo_size() else {
            return Transition::Ignored;
        };
        let point = viewport.to_photo_space(screen);
        if !geometry::contains(photo_size, point) {
            log::debug!("Tap at ({:.1}, {:.1}) is outside the photo", point.x, point.y);
            return Transition::Ignored;
        }

        match self.placement {
            Placement::SingleTap => Transition::MarkAdded(store.add_mark(point)),
            Placement::TwoTap => match store.pending() {
                None => {
                    store.stage(Pending::FirstPoint(point));
                    Transition::FirstPointStaged(point)
                }
                Some(Pending::FirstPoint(circle)) => match self.label_numbering {
                    LabelNumbering::Auto => {
                        Transition::MarkAdded(store.add_auto_labelled_mark(circle, point))
                    }
                    LabelNumbering::Prompt => {
                        store.stage(Pending::AwaitingNumber { circle, label: point });
                        Transition::NumberRequested { circle, label: point }
                    }
                },
                Some(Pending::AwaitingNumber { .. }) => Transition::Ignored,
            },
        }
    }
}

fn changed(did_change: bool) -> Transition {
    changed_to(did_change, Transition::ViewChanged)
}

fn changed_to(did_change: bool, transition: Transition) -> Transition {
    if did_change {
        transition
    } else {
        Transition::Ignored
    }
}
