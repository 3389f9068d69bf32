// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Ordered mark sequence with its numbering counter and staged taps.

use super::mark::{parse_mark_number, Mark, NumberSource};
use crate::util::geometry::Point;

/// Input held between the taps of a two-tap mark.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Pending {
    /// The circle has been placed, waiting for the label box tap.
    FirstPoint(Point),
    /// Both anchors are placed, waiting for the user to supply a number.
    AwaitingNumber { circle: Point, label: Point },
}

/// What `undo_last` removed.
#[derive(Debug, Clone, PartialEq)]
pub enum Undone {
    Pending(Pending),
    Mark(Mark),
}

/// Owns the mark sequence and its mutation protocol.
#[derive(Debug, Clone)]
pub struct MarkStore {
    marks: Vec<Mark>,
    first_number: u32,
    next_number: u32,
    pending: Option<Pending>,
}

impl MarkStore {
    /// Create an empty store whose counter starts at `first_number`.
    pub fn new(first_number: u32) -> Self {
        Self {
            marks: Vec::new(),
            first_number,
            next_number: first_number,
            pending: None,
        }
    }

    pub fn marks(&self) -> &[Mark] {
        &self.marks
    }

    pub fn len(&self) -> usize {
        self.marks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.marks.is_empty()
    }

    /// The number the next auto-numbered mark will receive.
    pub fn next_number(&self) -> u32 {
        self.next_number
    }

    pub fn pending(&self) -> Option<Pending> {
        self.pending
    }

    /// Append an auto-numbered circle at a photo-space point.
    ///
    /// The caller is responsible for rejecting points outside the photo.
    pub fn add_mark(&mut self, position: Point) -> Mark {
        let mark = Mark::new(position, self.take_number());
        self.marks.push(mark.clone());
        log::info!(
            "Added mark {} at ({:.1}, {:.1}), total: {}",
            mark.number,
            position.x,
            position.y,
            self.marks.len()
        );
        mark
    }

    /// Append a labelled mark with a user-supplied number.
    ///
    /// Returns `None` without touching the store if `input` is not an integer
    /// in `0..=999`.
    pub fn add_mark_with_label(&mut self, circle: Point, label: Point, input: &str) -> Option<Mark> {
        let Some(number) = parse_mark_number(input) else {
            log::debug!("Rejected mark number {:?}", input);
            return None;
        };
        let mark = Mark::with_label(circle, label, number, NumberSource::User);
        self.pending = None;
        self.marks.push(mark.clone());
        log::info!("Added labelled mark {}, total: {}", number, self.marks.len());
        Some(mark)
    }

    /// Append a labelled mark numbered from the running counter.
    pub fn add_auto_labelled_mark(&mut self, circle: Point, label: Point) -> Mark {
        let mark = Mark::with_label(circle, label, self.take_number(), NumberSource::Auto);
        self.pending = None;
        self.marks.push(mark.clone());
        log::info!("Added labelled mark {}, total: {}", mark.number, self.marks.len());
        mark
    }

    pub fn stage(&mut self, pending: Pending) {
        self.pending = Some(pending);
    }

    /// Drop staged input, returning it if there was any.
    pub fn cancel_pending(&mut self) -> Option<Pending> {
        self.pending.take()
    }

    /// Cancel staged input if present, otherwise remove the newest mark.
    ///
    /// The counter is decremented only when the removed mark was numbered
    /// from it.
    pub fn undo_last(&mut self) -> Option<Undone> {
        if let Some(pending) = self.pending.take() {
            log::info!("Cancelled staged mark input");
            return Some(Undone::Pending(pending));
        }
        let mark = self.marks.pop()?;
        if mark.source == NumberSource::Auto && self.next_number > self.first_number {
            self.next_number -= 1;
        }
        log::info!("Undid mark {}, total: {}", mark.number, self.marks.len());
        Some(Undone::Mark(mark))
    }

    /// Clear marks, staged input, and the counter.
    pub fn reset(&mut self) {
        self.marks.clear();
        self.pending = None;
        self.next_number = self.first_number;
    }

    fn take_number(&mut self) -> u32 {
        let number = self.next_number;
        self.next_number = self.next_number.saturating_add(1);
        number
    }
}
