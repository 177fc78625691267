//! Common types shared by the configuration and the detectors.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Which hand a sample, event or preference refers to.
///
/// "No hand" is expressed as `Option<Hand>::None` rather than a third variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Hand {
    Left,
    Right,
}

impl Hand {
    /// Both hands, left first.
    pub const BOTH: [Hand; 2] = [Hand::Left, Hand::Right];

    /// Stable lowercase name used in logs and scripts.
    pub fn as_str(self) -> &'static str {
        match self {
            Hand::Left => "left",
            Hand::Right => "right",
        }
    }
}

impl fmt::Display for Hand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The single input source that drives gesture events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceMode {
    /// Touchscreen taps simulate pinches (editor / phone testing)
    Touch,
    /// Device hand tracking with polled fingertip transforms
    #[default]
    Device,
    /// Hands reported by an external interaction kit
    Kit,
}

impl fmt::Display for SourceMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SourceMode::Touch => "touch",
            SourceMode::Device => "device",
            SourceMode::Kit => "kit",
        };
        f.write_str(name)
    }
}

/// What the device detector reports while a released pinch is still inside
/// its stability window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReleaseGrace {
    /// Keep publishing `PinchHold` every frame until the release is accepted
    #[default]
    Hold,
    /// Publish nothing until the release is accepted or the pinch resumes
    Silent,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_names() {
        assert_eq!(Hand::Left.to_string(), "left");
        assert_eq!(SourceMode::Kit.to_string(), "kit");
    }
}
