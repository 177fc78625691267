//! Device hand tracking: two polled hands, pinch from fingertip distance

use pinch_track_config::{SourceMode, TrackingConfig};

use super::{GestureSource, SourceInput};
use crate::arbiter::{DualHandCore, PinchTracker};
use crate::context::TrackingContext;
use crate::error::{Result, TrackingError};
use crate::events::GestureEvents;
use crate::hand::{HandPair, TrackedHand};
use crate::Hand;

pub struct DeviceDetector {
    core: DualHandCore,
    hands: HandPair<Option<Box<dyn TrackedHand>>>,
    stability_frames: u32,
    pinch_threshold: f32,
    running: bool,
}

impl DeviceDetector {
    pub fn new(config: &TrackingConfig, events: GestureEvents) -> Self {
        let device = &config.device;
        Self {
            core: DualHandCore::new(
                events,
                config.dominant_hand,
                PinchTracker::new(device.stability_frames, device.release_grace),
            ),
            hands: HandPair::default(),
            stability_frames: device.stability_frames,
            pinch_threshold: device.pinch_threshold,
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

    /// Poll both hands and feed the readings through the loss hysteresis.
    /// A hand inside its loss window keeps its last stored sample.
    fn poll_presence(&mut self) {
        let mut changed = false;

        for hand in Hand::BOTH {
            let Some(source) = self.hands[hand].as_ref() else {
                continue;
            };

            let tips = if source.is_tracking() {
                match source.fingertips() {
                    Ok(tips) => Some(tips),
                    Err(err) => {
                        tracing::trace!("{}", err);
                        None
                    }
                }
            } else {
                None
            };

            if let Some(tips) = tips {
                tracing::trace!("{} hand gap {:.2}", hand, tips.gap());
                self.core.store_sample(hand, tips);
            }
            changed |= self
                .core
                .apply_presence(hand, tips.is_some(), self.stability_frames);
        }

        if changed {
            self.core.arbitrate();
        }
    }
}

impl GestureSource for DeviceDetector {
    fn mode(&self) -> SourceMode {
        SourceMode::Device
    }

    fn start(&mut self) -> Result<()> {
        if let Some(hand) = Hand::BOTH.into_iter().find(|&h| self.hands[h].is_none()) {
            let err = TrackingError::misconfigured(
                SourceMode::Device,
                format!("no {} hand source assigned", hand),
            );
            tracing::error!("Device source not started: {}", err);
            return Err(err);
        }
        if self.running {
            return Ok(());
        }

        self.running = true;
        tracing::info!(
            "Device source started (stability {} frames, pinch below {})",
            self.stability_frames,
            self.pinch_threshold
        );
        Ok(())
    }

    fn stop(&mut self) {
        if !self.running {
            return;
        }
        self.core.shutdown();
        self.running = false;
        tracing::info!("Device source stopped");
    }

    fn is_running(&self) -> bool {
        self.running
    }

    fn handle_input(&mut self, input: SourceInput) {
        tracing::trace!("Device source ignores {:?}", input);
    }

    fn update(&mut self) {
        if !self.running {
            return;
        }

        self.poll_presence();

        let reading = self
            .core
            .context()
            .active_hand
            .and_then(|hand| self.core.sample(hand))
            .map(|tips| tips.gap() < self.pinch_threshold);
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
