use std::time::{Duration, Instant};

use crate::geometry::{PresentationQuadrilateral, Rect};

/// Shape drawn by the overlay.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OverlayShape {
    Quadrilateral(PresentationQuadrilateral),
    Rect(Rect),
}

/// Whether a detection is currently on screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverlayPhase {
    Idle,
    Showing,
}

/// Everything the presentation thread knows about the overlay.
///
/// The hide timer is a single deadline: arming it again overwrites the
/// previous one, so there is never more than one pending hide.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OverlayState {
    shape: Option<OverlayShape>,
    visible: bool,
    hide_deadline: Option<Instant>,
    flash_deadline: Option<Instant>,
}

impl OverlayState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Last shape shown. Kept after hiding, like a faded-out layer.
    pub fn shape(&self) -> Option<&OverlayShape> {
        self.shape.as_ref()
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn hide_deadline(&self) -> Option<Instant> {
        self.hide_deadline
    }

    pub fn flash_deadline(&self) -> Option<Instant> {
        self.flash_deadline
    }

    pub fn is_flashing(&self) -> bool {
        self.flash_deadline.is_some()
    }

    pub fn phase(&self) -> OverlayPhase {
        if self.visible {
            OverlayPhase::Showing
        } else {
            OverlayPhase::Idle
        }
    }

    /// Show `shape` and (re-)arm the hide deadline at `now + hide_delay`.
    pub fn show(&mut self, shape: OverlayShape, now: Instant, hide_delay: Duration) {
        self.shape = Some(shape);
        self.visible = true;
        self.hide_deadline = Some(now + hide_delay);
    }

    /// Hide the overlay if its deadline has passed. Returns true if it was hidden.
    pub fn expire_hide(&mut self, now: Instant) -> bool {
        match self.hide_deadline {
            Some(deadline) if now >= deadline => {
                self.visible = false;
                self.hide_deadline = None;
                true
            }
            _ => false,
        }
    }

    /// Hide right away and disarm the deadline. Returns true if it was visible.
    pub fn hide(&mut self) -> bool {
        let was_visible = self.visible;
        self.visible = false;
        self.hide_deadline = None;
        was_visible
    }

    /// Start the capture flash, ending at `now + duration`.
    pub fn begin_flash(&mut self, now: Instant, duration: Duration) {
        self.flash_deadline = Some(now + duration);
    }

    /// End the flash if its time is up. Returns true if it ended.
    pub fn expire_flash(&mut self, now: Instant) -> bool {
        match self.flash_deadline {
            Some(deadline) if now >= deadline => {
                self.flash_deadline = None;
                true
            }
            _ => false,
        }
    }

    /// Earliest pending deadline of any kind.
    pub fn next_deadline(&self) -> Option<Instant> {
        match (self.hide_deadline, self.flash_deadline) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }
}
