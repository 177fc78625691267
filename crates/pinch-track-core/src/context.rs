//! Per-session tracking state owned by the running detector.
//!
//! The detector writes this once per frame; consumers read it between frames
//! through [`crate::GestureSource::context`].

use serde::Serialize;

use crate::spatial::{Point3D, ScreenPoint, Vector3D};
use crate::Hand;

/// Derived cursor pose. All fields are `None` while nothing is tracked.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct CursorState {
    pub position: Option<Point3D>,
    pub forward: Option<Vector3D>,
    pub up: Option<Vector3D>,
    pub thumb_position: Option<Point3D>,
    pub index_position: Option<Point3D>,
}

impl CursorState {
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

/// Accepted per-hand presence plus the hysteresis counters behind it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TrackingFlags {
    pub left_tracking: bool,
    pub right_tracking: bool,
    /// Frames left before a pending left-hand loss is accepted
    pub stability_delay_track_left: u32,
    /// Frames left before a pending right-hand loss is accepted
    pub stability_delay_track_right: u32,
    /// Frames left before a pending pinch release is accepted
    pub stability_delay_pinch: u32,
}

impl TrackingFlags {
    pub fn tracking(&self, hand: Hand) -> bool {
        match hand {
            Hand::Left => self.left_tracking,
            Hand::Right => self.right_tracking,
        }
    }

    pub fn set_tracking(&mut self, hand: Hand, tracking: bool) {
        match hand {
            Hand::Left => self.left_tracking = tracking,
            Hand::Right => self.right_tracking = tracking,
        }
    }

    pub fn loss_delay(&self, hand: Hand) -> u32 {
        match hand {
            Hand::Left => self.stability_delay_track_left,
            Hand::Right => self.stability_delay_track_right,
        }
    }

    pub fn set_loss_delay(&mut self, hand: Hand, frames: u32) {
        match hand {
            Hand::Left => self.stability_delay_track_left = frames,
            Hand::Right => self.stability_delay_track_right = frames,
        }
    }

    pub fn both_tracking(&self) -> bool {
        self.left_tracking && self.right_tracking
    }
}

/// Everything a consumer may poll about the current session.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrackingContext {
    pub active_hand: Option<Hand>,
    pub dominant_hand: Hand,
    pub is_pinching: bool,
    pub cursor: CursorState,
    pub flags: TrackingFlags,
    pub hover_screen_position: Option<ScreenPoint>,
    pub hover_world_position: Option<Point3D>,
}

impl TrackingContext {
    pub fn new(dominant_hand: Hand) -> Self {
        Self {
            active_hand: None,
            dominant_hand,
            is_pinching: false,
            cursor: CursorState::default(),
            flags: TrackingFlags::default(),
            hover_screen_position: None,
            hover_world_position: None,
        }
    }

    /// Drop all session state, keeping only the dominant hand preference.
    pub fn reset(&mut self) {
        *self = Self::new(self.dominant_hand);
    }

    pub fn active_hand(&self) -> Option<Hand> {
        self.active_hand
    }

    pub fn dominant_hand(&self) -> Hand {
        self.dominant_hand
    }

    pub fn is_pinching(&self) -> bool {
        self.is_pinching
    }

    pub fn cursor_position(&self) -> Option<Point3D> {
        self.cursor.position
    }

    pub fn cursor_forward(&self) -> Option<Vector3D> {
        self.cursor.forward
    }

    pub fn cursor_up(&self) -> Option<Vector3D> {
        self.cursor.up
    }

    pub fn hover_screen_position(&self) -> Option<ScreenPoint> {
        self.hover_screen_position
    }

    pub fn hover_world_position(&self) -> Option<Point3D> {
        self.hover_world_position
    }
}
