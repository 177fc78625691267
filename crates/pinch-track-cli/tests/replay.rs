use std::fs;

use pinch_track_cli::{replay, ReplayScript};
use pinch_track_config::{Hand, TrackingConfig};
use pinch_track_core::GestureEvent;
use tempfile::TempDir;

fn kinds(events: &[pinch_track_cli::RecordedEvent]) -> Vec<&'static str> {
    events.iter().map(|e| e.event.kind()).collect()
}

#[test]
fn device_script_from_files() {
    let dir = TempDir::new().unwrap();
    let config_path = dir.path().join("tracking.toml");
    let script_path = dir.path().join("device.json");

    fs::write(
        &config_path,
        r#"
mode = "device"

[device]
stability_frames = 2
"#,
    )
    .unwrap();
    fs::write(
        &script_path,
        r#"{ "frames": [
            { "right": { "thumb": [0, 0, 10], "index": [3, 0, 10] } },
            { "right": { "thumb": [0, 0, 10], "index": [1, 0, 10] } },
            { "right": { "tracking": false, "thumb": [0, 0, 10], "index": [1, 0, 10] } },
            { "right": { "thumb": [0, 0, 10], "index": [1, 0, 10] } },
            { "right": { "thumb": [0, 0, 10], "index": [3, 0, 10] } },
            {},
            {}
        ] }"#,
    )
    .unwrap();

    let config = TrackingConfig::load(&config_path).unwrap();
    let script = ReplayScript::load(&script_path).unwrap();
    let report = replay(&config, &script).unwrap();

    assert_eq!(
        kinds(&report.events),
        vec![
            "active_hand_changed",
            "track_start",
            "pinch_start",
            // frames 2 to 5: the untracked frame holds on the last sample,
            // then the open hand drains the release window
            "pinch_hold",
            "pinch_hold",
            "pinch_hold",
            "pinch_hold",
            "pinch_end",
            "active_hand_changed",
            "track_end",
        ]
    );
    assert_eq!(report.summary.frames, 7);
    assert_eq!(report.summary.events["pinch_start"], 1);
    assert_eq!(report.summary.events["pinch_end"], 1);
    assert_eq!(report.summary.events["pinch_hold"], 4);

    let first = &report.events[0];
    assert_eq!(first.frame, 0);
    assert!(matches!(
        first.event,
        GestureEvent::ActiveHandChanged(change) if change.current == Some(Hand::Right)
    ));
}

#[test]
fn kit_script_picks_hand_nearest_center() {
    let config = TrackingConfig::from_toml_str(
        r#"
mode = "kit"
dominant_hand = "left"
"#,
    )
    .unwrap();
    let script = ReplayScript::from_json(
        r#"{ "frames": [
            {
                "inputs": [ { "hand_found": "left" }, { "hand_found": "right" } ],
                "left": { "thumb": [-5, 0, 10], "index": [-4, 0, 10], "thumb_screen": [0.1, 0.5], "pinching": false },
                "right": { "thumb": [5, 0, 10], "index": [6, 0, 10], "thumb_screen": [0.6, 0.5], "pinching": true }
            },
            { "inputs": [ { "hand_lost": "right" } ] }
        ] }"#,
    )
    .unwrap();

    let report = replay(&config, &script).unwrap();

    let active: Vec<_> = report
        .events
        .iter()
        .filter_map(|e| match e.event {
            GestureEvent::ActiveHandChanged(change) => Some(change.current),
            _ => None,
        })
        .collect();
    assert_eq!(active, vec![Some(Hand::Right), Some(Hand::Left), None]);

    let ends: Vec<_> = report
        .events
        .iter()
        .filter(|e| e.event.kind() == "pinch_end")
        .map(|e| e.frame)
        .collect();
    assert_eq!(ends, vec![1]);
}

#[test]
fn json_lines_carry_frame_and_event() {
    let config = TrackingConfig::from_toml_str(
        r#"
mode = "touch"

[touch]
hover = true

[touch.camera]
width = 640
height = 480
"#,
    )
    .unwrap();
    let script = ReplayScript::from_json(
        r#"{ "frames": [ { "inputs": [ { "hover": [320, 240] } ] }, {} ] }"#,
    )
    .unwrap();

    let report = replay(&config, &script).unwrap();
    assert_eq!(kinds(&report.events), vec!["hover_start", "hover_end"]);

    let line = serde_json::to_value(report.events[0]).unwrap();
    assert_eq!(line["frame"], 0);
    assert_eq!(line["event"], "hover_start");
    assert_eq!(line["position"]["z"], 50.0);
}
