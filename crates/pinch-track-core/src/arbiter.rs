//! Active-hand arbitration and pinch hysteresis shared by the two-hand
//! detectors.
//!
//! [`DualHandCore`] owns the session [`TrackingContext`] and publishes through
//! [`GestureEvents`]. Detectors feed it per frame, in this order:
//! 1. presence ([`DualHandCore::apply_presence`] / [`DualHandCore::set_tracking`],
//!    then [`DualHandCore::arbitrate`])
//! 2. pinch ([`DualHandCore::update_pinch`])
//! 3. cursor pose ([`DualHandCore::update_cursor`])

use pinch_track_config::ReleaseGrace;

use crate::context::{TrackingContext, TrackingFlags};
use crate::events::GestureEvents;
use crate::hand::{Fingertips, HandPair};
use crate::spatial::Point3D;
use crate::Hand;

/// Which single hand drives the cursor given accepted presence.
///
/// Both tracked: the dominant hand. One tracked: that hand. None: `None`.
pub fn resolve_active_hand(flags: &TrackingFlags, dominant: Hand) -> Option<Hand> {
    match (flags.left_tracking, flags.right_tracking) {
        (true, true) => Some(dominant),
        (true, false) => Some(Hand::Left),
        (false, true) => Some(Hand::Right),
        (false, false) => None,
    }
}

/// Outcome of one pinch evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PinchStep {
    Start,
    Hold,
    End,
    Idle,
}

/// Pinch state machine with an optional release window.
///
/// While pinching, the release counter is re-armed to `stability_frames`
/// every frame; once the reading goes open, the pinch is held for that many
/// frames before `End` is reported.
#[derive(Debug, Clone)]
pub struct PinchTracker {
    was_pinching: bool,
    stability_frames: u32,
    grace: ReleaseGrace,
}

impl PinchTracker {
    pub fn new(stability_frames: u32, grace: ReleaseGrace) -> Self {
        Self {
            was_pinching: false,
            stability_frames,
            grace,
        }
    }

    /// A tracker that releases as soon as the reading opens
    pub fn immediate() -> Self {
        Self::new(0, ReleaseGrace::Hold)
    }

    pub fn is_pinching(&self) -> bool {
        self.was_pinching
    }

    /// Advance one frame. `release_delay` is the shared pinch counter.
    pub fn step(&mut self, pinching_now: bool, release_delay: &mut u32) -> PinchStep {
        if pinching_now {
            *release_delay = self.stability_frames;
            if self.was_pinching {
                return PinchStep::Hold;
            }
            self.was_pinching = true;
            return PinchStep::Start;
        }

        if !self.was_pinching {
            return PinchStep::Idle;
        }

        if *release_delay > 0 {
            *release_delay -= 1;
            return match self.grace {
                ReleaseGrace::Hold => PinchStep::Hold,
                ReleaseGrace::Silent => PinchStep::Idle,
            };
        }

        self.was_pinching = false;
        PinchStep::End
    }

    /// Drop the pinch without hysteresis. Returns whether one was in progress.
    pub fn force_release(&mut self, release_delay: &mut u32) -> bool {
        *release_delay = 0;
        std::mem::replace(&mut self.was_pinching, false)
    }
}

/// Arbitration, pinch and cursor logic common to device and kit tracking.
pub struct DualHandCore {
    events: GestureEvents,
    context: TrackingContext,
    samples: HandPair<Option<Fingertips>>,
    pinch: PinchTracker,
    last_position: Point3D,
}

impl DualHandCore {
    pub fn new(events: GestureEvents, dominant_hand: Hand, pinch: PinchTracker) -> Self {
        Self {
            events,
            context: TrackingContext::new(dominant_hand),
            samples: HandPair::default(),
            pinch,
            last_position: Point3D::ORIGIN,
        }
    }

    pub fn context(&self) -> &TrackingContext {
        &self.context
    }

    pub fn events(&self) -> &GestureEvents {
        &self.events
    }

    pub fn sample(&self, hand: Hand) -> Option<Fingertips> {
        self.samples[hand]
    }

    /// Record fresh fingertips for `hand`.
    pub fn store_sample(&mut self, hand: Hand, tips: Fingertips) {
        self.samples[hand] = Some(tips);
    }

    /// Feed one polled presence reading through the loss hysteresis.
    ///
    /// Acquisition is accepted at once. Loss is accepted on the
    /// `stability_frames`-th consecutive untracked reading; any tracked
    /// reading in between resets the countdown. Returns true when the
    /// accepted state changed.
    pub fn apply_presence(&mut self, hand: Hand, tracked: bool, stability_frames: u32) -> bool {
        let flags = &mut self.context.flags;

        if tracked {
            flags.set_loss_delay(hand, 0);
            if flags.tracking(hand) {
                return false;
            }
            flags.set_tracking(hand, true);
            tracing::debug!("{} hand acquired", hand);
            return true;
        }

        if !flags.tracking(hand) {
            return false;
        }

        let remaining = match flags.loss_delay(hand) {
            0 => stability_frames,
            pending => pending,
        }
        .saturating_sub(1);

        if remaining > 0 {
            flags.set_loss_delay(hand, remaining);
            tracing::trace!("{} hand missing, {} frame(s) until loss", hand, remaining);
            return false;
        }

        flags.set_loss_delay(hand, 0);
        flags.set_tracking(hand, false);
        self.samples[hand] = None;
        tracing::debug!("{} hand lost", hand);
        true
    }

    /// Set accepted presence directly (sources that debounce on their own).
    pub fn set_tracking(&mut self, hand: Hand, tracking: bool) -> bool {
        if self.context.flags.tracking(hand) == tracking {
            return false;
        }
        self.context.flags.set_tracking(hand, tracking);
        if !tracking {
            self.samples[hand] = None;
        }
        tracing::debug!("{} hand {}", hand, if tracking { "found" } else { "lost" });
        true
    }

    /// Change the tie-break hand. Returns true if it differs from before.
    pub fn set_dominant_hand(&mut self, hand: Hand) -> bool {
        if self.context.dominant_hand == hand {
            return false;
        }
        tracing::debug!("Dominant hand {} -> {}", self.context.dominant_hand, hand);
        self.context.dominant_hand = hand;
        true
    }

    /// Re-resolve the active hand and publish the consequences.
    ///
    /// Publishes `ActiveHandChanged` only when the resolution differs. When
    /// the previous hand stops being active mid-pinch, the pinch is ended
    /// right away. Gaining a first hand publishes `TrackStart`, losing the
    /// last one publishes `TrackEnd` and clears the cursor.
    pub fn arbitrate(&mut self) -> bool {
        let previous = self.context.active_hand;
        let resolved = resolve_active_hand(&self.context.flags, self.context.dominant_hand);
        if resolved == previous {
            return false;
        }

        let position = self.pinch_position();
        tracing::debug!("Active hand {:?} -> {:?}", previous, resolved);
        self.events.active_hand_changed(previous, resolved);
        self.context.active_hand = resolved;

        if previous.is_some() {
            self.force_pinch_end(position);
        }

        match (previous, resolved) {
            (None, Some(_)) => self.events.track_start(false),
            (Some(_), None) => {
                self.context.cursor.clear();
                self.events.track_end(false);
            }
            _ => {}
        }
        true
    }

    fn force_pinch_end(&mut self, position: Point3D) {
        if self.pinch.force_release(&mut self.context.flags.stability_delay_pinch) {
            tracing::debug!("Pinch force-ended");
            self.context.is_pinching = false;
            self.last_position = position;
            self.events.pinch_end(position, false);
        }
    }

    /// Evaluate this frame's pinch reading for the active hand. `None` means
    /// no usable reading and leaves the pinch state untouched.
    pub fn update_pinch(&mut self, reading: Option<bool>) {
        let Some(hand) = self.context.active_hand else {
            return;
        };
        let Some(pinching) = reading else {
            tracing::trace!("No pinch reading for {} hand", hand);
            return;
        };

        let position = self.pinch_position();
        match self.pinch.step(pinching, &mut self.context.flags.stability_delay_pinch) {
            PinchStep::Start => {
                tracing::debug!("Pinch started on {} hand", hand);
                self.events.pinch_start(position, false);
            }
            PinchStep::Hold => self.events.pinch_hold(position, false),
            PinchStep::End => {
                tracing::debug!("Pinch ended on {} hand", hand);
                self.events.pinch_end(position, false);
            }
            PinchStep::Idle => {}
        }
        self.context.is_pinching = self.pinch.is_pinching();
        self.last_position = position;
    }

    /// Write the cursor pose from the active hand's fingertips.
    pub fn update_cursor(&mut self) {
        let Some(hand) = self.context.active_hand else {
            self.context.cursor.clear();
            return;
        };
        let Some(tips) = self.samples[hand] else {
            return;
        };

        let cursor = &mut self.context.cursor;
        cursor.thumb_position = Some(tips.thumb.position);
        cursor.index_position = Some(tips.index.position);
        cursor.position = Some(tips.midpoint());
        cursor.forward = Some(tips.index.forward());
        cursor.up = Some(tips.index.up());
    }

    /// End the session: release everything and publish the matching end
    /// events, then clear all state.
    pub fn shutdown(&mut self) {
        self.context.flags.left_tracking = false;
        self.context.flags.right_tracking = false;
        self.arbitrate();

        let position = self.pinch_position();
        self.force_pinch_end(position);

        self.context.reset();
        self.samples = HandPair::default();
    }

    fn pinch_position(&self) -> Point3D {
        self.context
            .active_hand
            .and_then(|hand| self.samples[hand])
            .map(|tips| tips.midpoint())
            .or(self.context.cursor.position)
            .unwrap_or(self.last_position)
    }
}
