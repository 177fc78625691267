//! Gesture sources
//!
//! Each source turns one kind of raw input into the shared [`GestureEvents`]
//! contract:
//! - [`TouchDetector`]: touchscreen taps simulate pinches
//! - [`DeviceDetector`]: polled device hand tracking
//! - [`KitDetector`]: hands reported by an interaction kit

pub mod device;
pub mod kit;
pub mod touch;

pub use device::DeviceDetector;
pub use kit::KitDetector;
pub use touch::{TouchDetector, TouchPhase};

use pinch_track_config::SourceMode;

use crate::context::TrackingContext;
use crate::error::Result;
use crate::events::GestureEvents;
use crate::spatial::ScreenPoint;
use crate::Hand;

/// Discrete input delivered between frames.
///
/// Sources ignore inputs that do not apply to them.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SourceInput {
    PointerDown(ScreenPoint),
    PointerMove(ScreenPoint),
    PointerUp(ScreenPoint),
    /// A hover-capable pointer is over the screen this frame
    Hover(ScreenPoint),
    /// The interaction kit started tracking a hand
    HandFound(Hand),
    /// The interaction kit stopped tracking a hand
    HandLost(Hand),
}

/// A detector driven by the host's frame loop.
pub trait GestureSource {
    fn mode(&self) -> SourceMode;

    /// Validate collaborators and begin a session. On error the source stays
    /// idle and `update` does nothing.
    fn start(&mut self) -> Result<()>;

    /// End the session: finish any pinch, publish the closing events and
    /// clear all state before returning.
    fn stop(&mut self);

    fn is_running(&self) -> bool;

    /// Queue or apply an input received since the last frame.
    fn handle_input(&mut self, input: SourceInput);

    /// Advance one frame.
    fn update(&mut self);

    /// State readable by consumers between frames.
    fn context(&self) -> &TrackingContext;

    fn events(&self) -> &GestureEvents;
}
