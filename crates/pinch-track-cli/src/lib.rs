//! Scripted replay of gesture input through the tracking stack.
//!
//! A replay script is a JSON list of frames. Each frame carries the discrete
//! inputs received since the previous frame and, optionally, fresh samples
//! for either hand:
//!
//! ```json
//! { "frames": [
//!     { "inputs": [ { "pointer_down": [100, 100] } ] },
//!     { "inputs": [ { "hand_found": "right" } ],
//!       "right": { "thumb": [0, 0, 10], "index": [1, 0, 10], "pinching": true } }
//! ] }
//! ```
//!
//! A hand missing from a frame keeps its previous sample.

use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use std::rc::Rc;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use pinch_track_config::{Hand, TrackingConfig};
use pinch_track_core::{
    Fingertips, GestureEvent, HandSample, HandTracking, Point3D, Pose, Quaternion, SampledHand,
    ScreenPoint, SourceInput, Vector3D,
};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReplayScript {
    #[serde(default)]
    pub frames: Vec<ScriptFrame>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScriptFrame {
    pub inputs: Vec<ScriptInput>,
    pub left: Option<ScriptHand>,
    pub right: Option<ScriptHand>,
}

impl ScriptFrame {
    fn hand(&self, hand: Hand) -> Option<&ScriptHand> {
        match hand {
            Hand::Left => self.left.as_ref(),
            Hand::Right => self.right.as_ref(),
        }
    }
}

/// Discrete input as written in a script. Pointer positions are pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScriptInput {
    PointerDown([f32; 2]),
    PointerMove([f32; 2]),
    PointerUp([f32; 2]),
    Hover([f32; 2]),
    HandFound(Hand),
    HandLost(Hand),
}

impl From<ScriptInput> for SourceInput {
    fn from(input: ScriptInput) -> Self {
        match input {
            ScriptInput::PointerDown(p) => SourceInput::PointerDown(p.into()),
            ScriptInput::PointerMove(p) => SourceInput::PointerMove(p.into()),
            ScriptInput::PointerUp(p) => SourceInput::PointerUp(p.into()),
            ScriptInput::Hover(p) => SourceInput::Hover(p.into()),
            ScriptInput::HandFound(hand) => SourceInput::HandFound(hand),
            ScriptInput::HandLost(hand) => SourceInput::HandLost(hand),
        }
    }
}

/// One hand's sample as written in a script.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScriptHand {
    #[serde(default = "default_tracking")]
    pub tracking: bool,
    pub thumb: [f32; 3],
    pub index: [f32; 3],
    /// Fingertip forward direction, +Z when absent
    #[serde(default)]
    pub forward: Option<[f32; 3]>,
    #[serde(default)]
    pub up: Option<[f32; 3]>,
    /// Pinch state reported by an interaction kit
    #[serde(default)]
    pub pinching: Option<bool>,
    /// Thumb tip in normalized screen coordinates
    #[serde(default)]
    pub thumb_screen: Option<[f32; 2]>,
}

fn default_tracking() -> bool {
    true
}

impl From<&ScriptHand> for HandSample {
    fn from(hand: &ScriptHand) -> Self {
        let rotation = match hand.forward {
            Some(forward) => Quaternion::look_rotation(
                Vector3D::from(forward),
                hand.up.map(Vector3D::from).unwrap_or(Vector3D::UP),
            ),
            None => Quaternion::IDENTITY,
        };
        let pose = |position: [f32; 3]| Pose::new(Point3D::from(position), rotation);

        HandSample {
            tracking: hand.tracking,
            fingertips: Some(Fingertips::new(pose(hand.thumb), pose(hand.index))),
            pinching: hand.pinching,
            thumb_screen: hand.thumb_screen.map(ScreenPoint::from),
        }
    }
}

impl ReplayScript {
    pub fn from_json(contents: &str) -> Result<Self> {
        serde_json::from_str(contents).context("Invalid replay script")
    }

    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read replay script {}", path.display()))?;
        Self::from_json(&contents).with_context(|| format!("Failed to parse {}", path.display()))
    }
}

/// An event together with the frame it was published in. Events published
/// while stopping after the last frame carry `frame == frames.len()`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RecordedEvent {
    pub frame: usize,
    #[serde(flatten)]
    pub event: GestureEvent,
}

impl fmt::Display for RecordedEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{:>4}] {}", self.frame, self.event.kind())?;
        match self.event {
            GestureEvent::ActiveHandChanged(change) => {
                let name = |hand: Option<Hand>| hand.map(Hand::as_str).unwrap_or("none");
                write!(f, " {} -> {}", name(change.previous), name(change.current))?;
            }
            event => {
                if let Some(p) = event.position() {
                    write!(f, " ({:.2}, {:.2}, {:.2})", p.x, p.y, p.z)?;
                }
                if event.is_simulated() == Some(true) {
                    write!(f, " simulated")?;
                }
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ReplaySummary {
    pub frames: usize,
    pub events: BTreeMap<&'static str, usize>,
    pub subscriber_faults: u64,
}

impl fmt::Display for ReplaySummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Frames replayed: {}", self.frames)?;
        for (kind, count) in &self.events {
            writeln!(f, "  {:<20} {}", kind, count)?;
        }
        write!(f, "Subscriber faults: {}", self.subscriber_faults)
    }
}

#[derive(Debug, Clone, Default)]
pub struct ReplayReport {
    pub events: Vec<RecordedEvent>,
    pub summary: ReplaySummary,
}

/// Run `script` through the source selected by `config.mode`, then disable
/// it so closing events are part of the report.
pub fn replay(config: &TrackingConfig, script: &ReplayScript) -> Result<ReplayReport> {
    let hands = [SampledHand::new(Hand::Left), SampledHand::new(Hand::Right)];
    let boxed = |hand: &SampledHand| Box::new(hand.clone());

    let mut tracking = HandTracking::new(config)
        .with_device_hands(boxed(&hands[0]), boxed(&hands[1]))
        .with_kit_hands(boxed(&hands[0]), boxed(&hands[1]));

    let frame = Rc::new(Cell::new(0usize));
    let recorded = Rc::new(RefCell::new(Vec::new()));
    {
        let frame = Rc::clone(&frame);
        let recorded = Rc::clone(&recorded);
        tracking.events().any.observe(move |event| {
            recorded.borrow_mut().push(RecordedEvent {
                frame: frame.get(),
                event: *event,
            });
        });
    }

    tracking
        .set_enabled(true)
        .with_context(|| format!("Failed to start {} source", config.mode))?;
    tracing::info!("Replaying {} frame(s) in {} mode", script.frames.len(), config.mode);

    for (index, step) in script.frames.iter().enumerate() {
        frame.set(index);
        for source in &hands {
            if let Some(sample) = step.hand(source.hand()) {
                source.set(HandSample::from(sample));
            }
        }
        for input in &step.inputs {
            tracking.handle_input((*input).into());
        }
        tracking.update();
    }

    frame.set(script.frames.len());
    tracking.set_enabled(false)?;

    let events = recorded.borrow().clone();
    let mut summary = ReplaySummary {
        frames: script.frames.len(),
        subscriber_faults: tracking.events().fault_count(),
        ..ReplaySummary::default()
    };
    for recorded in &events {
        *summary.events.entry(recorded.event.kind()).or_default() += 1;
    }

    Ok(ReplayReport { events, summary })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pinch_track_config::{CameraConfig, SourceMode};

    #[test]
    fn test_script_json_shapes() {
        let script = ReplayScript::from_json(
            r#"{ "frames": [
                { "inputs": [ { "pointer_down": [1, 2] }, { "hand_lost": "left" } ] },
                { "right": { "thumb": [0, 0, 1], "index": [1, 0, 1], "thumb_screen": [0.5, 0.5] } }
            ] }"#,
        )
        .unwrap();

        assert_eq!(
            script.frames[0].inputs,
            vec![ScriptInput::PointerDown([1.0, 2.0]), ScriptInput::HandLost(Hand::Left)]
        );
        let right = script.frames[1].right.unwrap();
        assert!(right.tracking);
        assert_eq!(right.thumb_screen, Some([0.5, 0.5]));
        assert!(script.frames[1].left.is_none());
    }

    #[test]
    fn test_script_hand_orientation() {
        let hand = ScriptHand {
            tracking: true,
            thumb: [0.0, 0.0, 0.0],
            index: [2.0, 0.0, 0.0],
            forward: Some([1.0, 0.0, 0.0]),
            up: None,
            pinching: None,
            thumb_screen: None,
        };
        let sample = HandSample::from(&hand);
        let tips = sample.fingertips.unwrap();
        assert_eq!(tips.gap(), 2.0);
        assert!((tips.index.forward().x - 1.0).abs() < 0.0001);
    }

    #[test]
    fn test_replay_touch_tap() {
        let config = TrackingConfig::new()
            .with_mode(SourceMode::Touch)
            .with_camera(CameraConfig::new(200, 200));
        let script = ReplayScript::from_json(
            r#"{ "frames": [
                { "inputs": [ { "pointer_down": [100, 100] } ] },
                {},
                { "inputs": [ { "pointer_up": [100, 100] } ] }
            ] }"#,
        )
        .unwrap();

        let report = replay(&config, &script).unwrap();
        let kinds: Vec<_> = report.events.iter().map(|e| e.event.kind()).collect();
        assert_eq!(
            kinds,
            vec!["track_start", "pinch_start", "pinch_hold", "pinch_end", "track_end"]
        );
        assert_eq!(report.events[0].frame, 0);
        assert_eq!(report.events[3].frame, 2);
        assert_eq!(report.summary.events["pinch_hold"], 1);
        assert_eq!(report.summary.subscriber_faults, 0);
    }

    #[test]
    fn test_replay_touch_without_camera_fails() {
        let config = TrackingConfig::new().with_mode(SourceMode::Touch);
        let err = replay(&config, &ReplayScript::default()).unwrap_err();
        assert!(format!("{:#}", err).contains("misconfigured"));
    }

    #[test]
    fn test_recorded_event_display() {
        let line = RecordedEvent {
            frame: 3,
            event: GestureEvent::ActiveHandChanged(pinch_track_core::HandChange {
                previous: None,
                current: Some(Hand::Right),
            }),
        };
        assert_eq!(line.to_string(), "[   3] active_hand_changed none -> right");
    }
}
