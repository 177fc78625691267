//! Mode-switching front door over the three gesture sources

use pinch_track_config::{SourceMode, TrackingConfig};

use crate::context::TrackingContext;
use crate::detector::{DeviceDetector, GestureSource, KitDetector, SourceInput, TouchDetector};
use crate::error::Result;
use crate::events::GestureEvents;
use crate::hand::TrackedHand;
use crate::spatial::ScreenProjector;

/// Owns one detector per [`SourceMode`] and drives the selected one.
///
/// All detectors publish on the same [`GestureEvents`], so subscribers keep
/// working across mode switches.
pub struct HandTracking {
    mode: SourceMode,
    enabled: bool,
    events: GestureEvents,
    touch: TouchDetector,
    device: DeviceDetector,
    kit: KitDetector,
}

impl HandTracking {
    pub fn new(config: &TrackingConfig) -> Self {
        let events = GestureEvents::new();
        Self {
            mode: config.mode,
            enabled: false,
            touch: TouchDetector::new(config, events.clone()),
            device: DeviceDetector::new(config, events.clone()),
            kit: KitDetector::new(config, events.clone()),
            events,
        }
    }

    pub fn with_camera(mut self, camera: Box<dyn ScreenProjector>) -> Self {
        self.touch = self.touch.with_camera(camera);
        self
    }

    pub fn with_device_hands(
        mut self,
        left: Box<dyn TrackedHand>,
        right: Box<dyn TrackedHand>,
    ) -> Self {
        self.device = self.device.with_hands(left, right);
        self
    }

    pub fn with_kit_hands(mut self, left: Box<dyn TrackedHand>, right: Box<dyn TrackedHand>) -> Self {
        self.kit = self.kit.with_hands(left, right);
        self
    }

    pub fn mode(&self) -> SourceMode {
        self.mode
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn source(&self) -> &dyn GestureSource {
        match self.mode {
            SourceMode::Touch => &self.touch,
            SourceMode::Device => &self.device,
            SourceMode::Kit => &self.kit,
        }
    }

    fn source_mut(&mut self) -> &mut dyn GestureSource {
        match self.mode {
            SourceMode::Touch => &mut self.touch,
            SourceMode::Device => &mut self.device,
            SourceMode::Kit => &mut self.kit,
        }
    }

    /// Start or stop the selected source. Disabling publishes the closing
    /// events before returning. A misconfigured source leaves tracking
    /// disabled and reports why.
    pub fn set_enabled(&mut self, enabled: bool) -> Result<()> {
        if enabled == self.enabled {
            return Ok(());
        }

        if enabled {
            self.source_mut().start()?;
        } else {
            self.source_mut().stop();
        }
        self.enabled = enabled;
        Ok(())
    }

    /// Select another source, carrying the enabled state over.
    pub fn switch_mode(&mut self, mode: SourceMode) -> Result<()> {
        if mode == self.mode {
            return Ok(());
        }
        tracing::info!("Switching source {} -> {}", self.mode, mode);

        let was_enabled = self.enabled;
        self.set_enabled(false)?;
        self.mode = mode;
        if was_enabled {
            self.set_enabled(true)?;
        }
        Ok(())
    }

    pub fn handle_input(&mut self, input: SourceInput) {
        if self.enabled {
            self.source_mut().handle_input(input);
        }
    }

    pub fn update(&mut self) {
        if self.enabled {
            self.source_mut().update();
        }
    }

    pub fn context(&self) -> &TrackingContext {
        self.source().context()
    }

    pub fn events(&self) -> &GestureEvents {
        &self.events
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TrackingError;
    use crate::events::record;
    use crate::hand::{HandSample, SampledHand};
    use crate::spatial::{Point3D, ScreenPoint};
    use crate::Hand;
    use pinch_track_config::CameraConfig;

    fn tracking(mode: SourceMode) -> (HandTracking, SampledHand) {
        let config = TrackingConfig::new().with_mode(mode).with_camera(CameraConfig {
            fov_degrees: 90.0,
            ..CameraConfig::new(200, 200)
        });
        let right = SampledHand::new(Hand::Right);
        let tracking = HandTracking::new(&config).with_device_hands(
            Box::new(SampledHand::new(Hand::Left)),
            Box::new(right.clone()),
        );
        (tracking, right)
    }

    #[test]
    fn test_misconfigured_source_stays_disabled() {
        let mut tracking = HandTracking::new(&TrackingConfig::new().with_mode(SourceMode::Kit));
        let err = tracking.set_enabled(true).unwrap_err();
        assert!(matches!(err, TrackingError::Misconfiguration { .. }));
        assert!(!tracking.is_enabled());

        // Frames are still safe to drive
        tracking.update();
        assert_eq!(tracking.context().active_hand(), None);
    }

    #[test]
    fn test_disable_mid_pinch_round_trip() {
        let (mut tracking, right) = tracking(SourceMode::Device);
        let log = record(tracking.events());
        tracking.set_enabled(true).unwrap();

        right.set(HandSample::tracked(Point3D::ORIGIN, Point3D::new(1.0, 0.0, 0.0)));
        tracking.update();
        assert!(tracking.context().is_pinching());

        tracking.set_enabled(false).unwrap();
        assert!(log.borrow().iter().any(|e| e.kind() == "pinch_end"));
        assert!(!tracking.context().is_pinching());
        assert_eq!(tracking.context().active_hand(), None);

        tracking.set_enabled(true).unwrap();
        assert!(!tracking.context().is_pinching());
        assert!(tracking.context().cursor_position().is_none());
    }

    #[test]
    fn test_switch_mode_keeps_subscribers() {
        let (mut tracking, right) = tracking(SourceMode::Device);
        let log = record(tracking.events());
        tracking.set_enabled(true).unwrap();
        right.set(HandSample::tracked(Point3D::ORIGIN, Point3D::new(1.0, 0.0, 0.0)));
        tracking.update();

        tracking.switch_mode(SourceMode::Touch).unwrap();
        assert_eq!(tracking.mode(), SourceMode::Touch);
        assert!(tracking.is_enabled());

        tracking.handle_input(SourceInput::PointerDown(ScreenPoint::new(100.0, 100.0)));
        tracking.update();

        let log = log.borrow();
        let simulated: Vec<_> = log.iter().filter_map(|e| e.is_simulated()).collect();
        assert!(simulated.contains(&false));
        assert!(simulated.contains(&true));
        assert_eq!(log.last().map(|e| e.kind()), Some("pinch_start"));
        assert_eq!(tracking.context().cursor_position(), Some(Point3D::new(0.0, 0.0, 50.0)));
    }
}
