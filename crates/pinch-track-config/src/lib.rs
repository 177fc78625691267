//! Configuration for pinch-track gesture sources.
//!
//! A [`TrackingConfig`] selects exactly one source mode (touch, device or kit)
//! and carries the settings each detector reads at start-up.

pub mod config;
pub mod error;
pub mod types;

pub use config::{
    CameraConfig, DeviceConfig, KitConfig, TouchConfig, TrackingConfig, DEFAULT_STABILITY_FRAMES,
    DEFAULT_TOUCH_DISTANCE, DEVICE_PINCH_THRESHOLD, KIT_PINCH_THRESHOLD,
};
pub use error::ConfigError;
pub use types::{Hand, ReleaseGrace, SourceMode};
