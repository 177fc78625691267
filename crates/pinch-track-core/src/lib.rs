//! Unified hand and touch gesture tracking
//!
//! Three interchangeable sources produce the same gesture contract:
//! - touchscreen taps simulated as pinches ([`TouchDetector`])
//! - device hand tracking polled every frame ([`DeviceDetector`])
//! - hands reported by an interaction kit ([`KitDetector`])
//!
//! Exactly one source runs at a time. It owns the [`TrackingContext`]
//! (active hand, pinch state, cursor pose) and publishes [`GestureEvent`]s on
//! [`GestureEvents`]. Hosts call `update()` once per frame; within a frame
//! presence is resolved first, then pinch, then the cursor pose.
//!
//! ```no_run
//! use pinch_track_core::{HandTracking, SampledHand, TrackingConfig, Hand};
//!
//! let left = SampledHand::new(Hand::Left);
//! let right = SampledHand::new(Hand::Right);
//! let mut tracking = HandTracking::new(&TrackingConfig::default())
//!     .with_device_hands(Box::new(left.clone()), Box::new(right.clone()));
//!
//! tracking.events().pinch_start.observe(|sample| {
//!     println!("pinch at {:?}", sample.position);
//! });
//! tracking.set_enabled(true).ok();
//! tracking.update();
//! ```

pub mod arbiter;
pub mod bus;
pub mod context;
pub mod detector;
pub mod error;
pub mod events;
pub mod hand;
pub mod spatial;
pub mod tracking;

pub use pinch_track_config::{Hand, ReleaseGrace, SourceMode, TrackingConfig};

pub use arbiter::{resolve_active_hand, DualHandCore, PinchStep, PinchTracker};
pub use bus::{EventBus, SubscriptionId};
pub use context::{CursorState, TrackingContext, TrackingFlags};
pub use detector::{DeviceDetector, GestureSource, KitDetector, SourceInput, TouchDetector, TouchPhase};
pub use error::{Result, TrackingError};
pub use events::{GestureEvent, GestureEvents, HandChange, PinchSample, TrackSample};
pub use hand::{Fingertips, HandPair, HandSample, SampledHand, TrackedHand};
pub use spatial::{
    PerspectiveCamera, Point3D, Pose, Quaternion, ScreenPoint, ScreenProjector, Vector3D,
};
pub use tracking::HandTracking;
