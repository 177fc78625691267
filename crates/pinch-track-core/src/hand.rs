//! Hand capability interface and per-hand storage.

use std::cell::RefCell;
use std::ops::{Index, IndexMut};
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::error::{Result, TrackingError};
use crate::spatial::{Point3D, Pose, ScreenPoint};
use crate::Hand;

/// Thumb and index tip poses of one hand.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Fingertips {
    pub thumb: Pose,
    pub index: Pose,
}

impl Fingertips {
    pub fn new(thumb: Pose, index: Pose) -> Self {
        Self { thumb, index }
    }

    /// Fingertips at the given positions with identity orientation
    pub fn at(thumb: Point3D, index: Point3D) -> Self {
        Self::new(Pose::from_position(thumb), Pose::from_position(index))
    }

    /// Thumb to index tip distance
    pub fn gap(&self) -> f32 {
        self.thumb.position.distance(&self.index.position)
    }

    pub fn midpoint(&self) -> Point3D {
        self.thumb.position.midpoint(&self.index.position)
    }
}

/// What a detector needs to know about one hand.
///
/// Device tracking polls `is_tracking` and computes pinch from `fingertips`;
/// an interaction kit additionally reports its own pinch state and a
/// screen-space thumb position.
pub trait TrackedHand {
    /// Whether the source sees the hand this frame
    fn is_tracking(&self) -> bool;

    /// Current thumb and index tips. A read failure is transient and means
    /// "no sample this frame".
    fn fingertips(&self) -> Result<Fingertips>;

    /// Pinch state as judged by the source, when it reports one
    fn is_pinching(&self) -> Option<bool> {
        None
    }

    /// Thumb tip in normalized screen coordinates
    fn thumb_screen_position(&self) -> Option<ScreenPoint> {
        None
    }
}

/// One frame's worth of hand data pushed by a host.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct HandSample {
    pub tracking: bool,
    pub fingertips: Option<Fingertips>,
    pub pinching: Option<bool>,
    pub thumb_screen: Option<ScreenPoint>,
}

impl HandSample {
    /// A tracked hand with tips at `thumb` and `index`
    pub fn tracked(thumb: Point3D, index: Point3D) -> Self {
        Self {
            tracking: true,
            fingertips: Some(Fingertips::at(thumb, index)),
            pinching: None,
            thumb_screen: None,
        }
    }

    pub fn untracked() -> Self {
        Self::default()
    }

    pub fn with_pinching(mut self, pinching: bool) -> Self {
        self.pinching = Some(pinching);
        self
    }

    pub fn with_thumb_screen(mut self, screen: ScreenPoint) -> Self {
        self.thumb_screen = Some(screen);
        self
    }
}

/// A [`TrackedHand`] fed by the host: clones share one sample slot, so the
/// host keeps a handle and updates it before each frame while the detector
/// owns another.
#[derive(Debug, Clone)]
pub struct SampledHand {
    hand: Hand,
    sample: Rc<RefCell<HandSample>>,
}

impl SampledHand {
    pub fn new(hand: Hand) -> Self {
        Self {
            hand,
            sample: Rc::new(RefCell::new(HandSample::default())),
        }
    }

    pub fn hand(&self) -> Hand {
        self.hand
    }

    pub fn set(&self, sample: HandSample) {
        *self.sample.borrow_mut() = sample;
    }
}

impl TrackedHand for SampledHand {
    fn is_tracking(&self) -> bool {
        self.sample.borrow().tracking
    }

    fn fingertips(&self) -> Result<Fingertips> {
        self.sample
            .borrow()
            .fingertips
            .ok_or_else(|| TrackingError::transient(format!("{} hand", self.hand), "no fingertip sample"))
    }

    fn is_pinching(&self) -> Option<bool> {
        self.sample.borrow().pinching
    }

    fn thumb_screen_position(&self) -> Option<ScreenPoint> {
        self.sample.borrow().thumb_screen
    }
}

/// A value per hand, indexable by [`Hand`].
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct HandPair<T> {
    pub left: T,
    pub right: T,
}

impl<T> HandPair<T> {
    pub fn new(left: T, right: T) -> Self {
        Self { left, right }
    }
}

impl<T> Index<Hand> for HandPair<T> {
    type Output = T;

    fn index(&self, hand: Hand) -> &T {
        match hand {
            Hand::Left => &self.left,
            Hand::Right => &self.right,
        }
    }
}

impl<T> IndexMut<Hand> for HandPair<T> {
    fn index_mut(&mut self, hand: Hand) -> &mut T {
        match hand {
            Hand::Left => &mut self.left,
            Hand::Right => &mut self.right,
        }
    }
}
