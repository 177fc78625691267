pub use pinch_track_config::{config, error as config_error, types};
pub use pinch_track_core::{arbiter, bus, context, detector, error, events, hand, spatial, tracking};

pub use pinch_track_config::{Hand, ReleaseGrace, SourceMode, TrackingConfig};
pub use pinch_track_core::{GestureEvent, GestureEvents, HandTracking, TrackingContext};
