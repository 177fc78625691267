//! Hands reported by an interaction kit
//!
//! The kit debounces presence itself and raises found/lost notifications, so
//! there is no loss hysteresis here. Pinch comes from the kit unless manual
//! detection is configured.

use std::collections::VecDeque;

use pinch_track_config::{SourceMode, TrackingConfig};

use super::{GestureSource, SourceInput};
use crate::arbiter::{DualHandCore, PinchTracker};
use crate::context::TrackingContext;
use crate::error::{Result, TrackingError};
use crate::events::GestureEvents;
use crate::hand::{HandPair, TrackedHand};
use crate::spatial::ScreenPoint;
use crate::Hand;

pub struct KitDetector {
    core: DualHandCore,
    hands: HandPair<Option<Box<dyn TrackedHand>>>,
    configured_dominant: Hand,
    sync_combined: bool,
    detect_pinch_manually: bool,
    pinch_threshold: f32,
    /// Found/lost notifications waiting for the next frame
    pending: VecDeque<(Hand, bool)>,
    running: bool,
}

impl KitDetector {
    pub fn new(config: &TrackingConfig, events: GestureEvents) -> Self {
        let kit = &config.kit;
        Self {
            core: DualHandCore::new(events, config.dominant_hand, PinchTracker::immediate()),
            hands: HandPair::default(),
            configured_dominant: config.dominant_hand,
            sync_combined: kit.sync_combined,
            detect_pinch_manually: kit.detect_pinch_manually,
            pinch_threshold: kit.pinch_threshold,
            pending: VecDeque::new(),
            running: false,
        }
    }

    pub fn with_hand(mut self, hand: Hand, source: Box<dyn TrackedHand>) -> Self {
        self.hands[hand] = Some(source);
        self
    }

    pub fn with_hands(self, left: Box<dyn TrackedHand>, right: Box<dyn TrackedHand>) -> Self {
        self.with_hand(Hand::Left, left).with_hand(Hand::Right, right)
    }

    /// The dominant hand for this frame: while both hands are tracked, the
    /// one whose thumb is nearer the screen center, right on a tie.
    fn dominant_for_frame(&self) -> Hand {
        if !self.core.context().flags.both_tracking() {
            return self.configured_dominant;
        }

        let thumb = |hand: Hand| {
            self.hands[hand]
                .as_ref()
                .and_then(|source| source.thumb_screen_position())
        };
        match (thumb(Hand::Left), thumb(Hand::Right)) {
            (Some(left), Some(right)) => {
                let center = ScreenPoint::NORMALIZED_CENTER;
                if left.distance(&center) < right.distance(&center) {
                    Hand::Left
                } else {
                    Hand::Right
                }
            }
            _ => self.configured_dominant,
        }
    }

    fn apply_presence(&mut self, hand: Hand, tracking: bool) -> bool {
        let mut changed = self.core.set_tracking(hand, tracking);
        changed |= self.core.set_dominant_hand(self.dominant_for_frame());
        changed
    }

    /// Pull fresh fingertips for the active hand. A failed read keeps the
    /// previous sample.
    fn refresh_active_sample(&mut self) -> Option<Hand> {
        let hand = self.core.context().active_hand?;
        let source = self.hands[hand].as_ref()?;
        match source.fingertips() {
            Ok(tips) => self.core.store_sample(hand, tips),
            Err(err) => tracing::trace!("{}", err),
        }
        Some(hand)
    }
}

impl GestureSource for KitDetector {
    fn mode(&self) -> SourceMode {
        SourceMode::Kit
    }

    fn start(&mut self) -> Result<()> {
        if let Some(hand) = Hand::BOTH.into_iter().find(|&h| self.hands[h].is_none()) {
            let err = TrackingError::misconfigured(
                SourceMode::Kit,
                format!("no {} hand source assigned", hand),
            );
            tracing::error!("Kit source not started: {}", err);
            return Err(err);
        }
        if self.running {
            return Ok(());
        }

        self.running = true;
        tracing::info!(
            "Kit source started (sync combined {}, manual pinch {})",
            self.sync_combined,
            self.detect_pinch_manually
        );
        Ok(())
    }

    fn stop(&mut self) {
        if !self.running {
            return;
        }
        self.pending.clear();
        self.core.shutdown();
        self.core.set_dominant_hand(self.configured_dominant);
        self.running = false;
        tracing::info!("Kit source stopped");
    }

    fn is_running(&self) -> bool {
        self.running
    }

    fn handle_input(&mut self, input: SourceInput) {
        if !self.running {
            return;
        }

        let (hand, tracking) = match input {
            SourceInput::HandFound(hand) => (hand, true),
            SourceInput::HandLost(hand) => (hand, false),
            other => {
                tracing::trace!("Kit source ignores {:?}", other);
                return;
            }
        };

        if self.sync_combined {
            if self.apply_presence(hand, tracking) {
                self.core.arbitrate();
            }
        } else {
            self.pending.push_back((hand, tracking));
        }
    }

    fn update(&mut self) {
        if !self.running {
            return;
        }

        let mut changed = false;
        while let Some((hand, tracking)) = self.pending.pop_front() {
            changed |= self.core.set_tracking(hand, tracking);
        }
        changed |= self.core.set_dominant_hand(self.dominant_for_frame());
        if changed {
            self.core.arbitrate();
        }

        let reading = self.refresh_active_sample().and_then(|hand| {
            if self.detect_pinch_manually {
                self.core
                    .sample(hand)
                    .map(|tips| tips.gap() < self.pinch_threshold)
            } else {
                self.hands[hand].as_ref().and_then(|source| source.is_pinching())
            }
        });
        self.core.update_pinch(reading);

        self.core.update_cursor();
    }

    fn context(&self) -> &TrackingContext {
        self.core.context()
    }

    fn events(&self) -> &GestureEvents {
        self.core.events()
    }
}
