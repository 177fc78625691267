//! Lifecycle properties of the device and kit sources under random input.

use std::cell::RefCell;
use std::rc::Rc;

use pinch_track_core::{
    resolve_active_hand, DeviceDetector, GestureEvent, GestureEvents, GestureSource, Hand,
    HandPair, HandSample, KitDetector, Point3D, SampledHand, ScreenPoint, SourceInput,
    TrackingConfig, TrackingFlags,
};
use proptest::prelude::*;
use proptest::test_runner::TestCaseError;

type Log = Rc<RefCell<Vec<GestureEvent>>>;

fn recorder(events: &GestureEvents) -> Log {
    let log = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&log);
    events.any.observe(move |event| sink.borrow_mut().push(*event));
    log
}

fn hand_from(left: bool) -> Hand {
    if left {
        Hand::Left
    } else {
        Hand::Right
    }
}

fn apart(gap: f32) -> HandSample {
    HandSample::tracked(Point3D::new(0.0, 0.0, 10.0), Point3D::new(gap, 0.0, 10.0))
}

/// Pinches alternate start/end, only happen inside a track, and a track
/// never ends with a pinch still open. With `closed`, everything must be
/// balanced by the end of the log.
fn check_lifecycle(log: &[GestureEvent], closed: bool) -> Result<(), TestCaseError> {
    let mut tracking = false;
    let mut pinching = false;
    let mut active: Option<Hand> = None;

    for (index, event) in log.iter().enumerate() {
        match event {
            GestureEvent::ActiveHandChanged(change) => {
                prop_assert_eq!(change.previous, active, "stale previous hand at {}", index);
                prop_assert_ne!(change.previous, change.current);
                active = change.current;
            }
            GestureEvent::TrackStart(_) => {
                prop_assert!(!tracking, "track_start while tracking at {}", index);
                prop_assert!(active.is_some());
                tracking = true;
            }
            GestureEvent::TrackEnd(_) => {
                prop_assert!(tracking, "track_end without track at {}", index);
                prop_assert!(!pinching, "track_end with open pinch at {}", index);
                prop_assert!(active.is_none());
                tracking = false;
            }
            GestureEvent::PinchStart(_) => {
                prop_assert!(tracking, "pinch_start outside a track at {}", index);
                prop_assert!(!pinching, "pinch_start twice at {}", index);
                pinching = true;
            }
            GestureEvent::PinchHold(_) => {
                prop_assert!(pinching, "pinch_hold without pinch at {}", index);
            }
            GestureEvent::PinchEnd(_) => {
                prop_assert!(pinching, "pinch_end without pinch at {}", index);
                pinching = false;
            }
            other => prop_assert!(false, "unexpected {} from hand source", other.kind()),
        }
    }

    if closed {
        prop_assert!(!tracking && !pinching, "source stopped with open track or pinch");
        prop_assert!(active.is_none());
    }
    Ok(())
}

/// One device frame: presence and fingertip gap for each hand.
fn device_frame() -> impl Strategy<Value = (bool, f32, bool, f32)> {
    (any::<bool>(), 0.0f32..4.0, any::<bool>(), 0.0f32..4.0)
}

/// One kit frame: found/lost notifications, then per-hand pinch and
/// normalized thumb x.
fn kit_frame() -> impl Strategy<Value = (Vec<(bool, bool)>, bool, f32, bool, f32)> {
    (
        prop::collection::vec((any::<bool>(), any::<bool>()), 0..3),
        any::<bool>(),
        0.0f32..1.0,
        any::<bool>(),
        0.0f32..1.0,
    )
}

proptest! {
    #[test]
    fn prop_device_loss_after_exactly_stability_frames(
        stability in 0u32..5,
        left_dominant in any::<bool>(),
        frames in prop::collection::vec(device_frame(), 0..40)
    ) {
        let dominant = hand_from(left_dominant);
        let config = TrackingConfig::new()
            .with_stability_frames(stability)
            .with_dominant_hand(dominant);
        let left = SampledHand::new(Hand::Left);
        let right = SampledHand::new(Hand::Right);
        let mut detector = DeviceDetector::new(&config, GestureEvents::new())
            .with_hands(Box::new(left.clone()), Box::new(right.clone()));
        let log = recorder(detector.events());
        detector.start().unwrap();

        // Accepted presence and consecutive misses per hand
        let mut flags = TrackingFlags::default();
        let mut misses = HandPair::new(0u32, 0u32);
        let window = stability.max(1);

        for (left_seen, left_gap, right_seen, right_gap) in frames {
            for (hand, source, seen, gap) in [
                (Hand::Left, &left, left_seen, left_gap),
                (Hand::Right, &right, right_seen, right_gap),
            ] {
                source.set(if seen { apart(gap) } else { HandSample::untracked() });

                if seen {
                    flags.set_tracking(hand, true);
                    misses[hand] = 0;
                } else if flags.tracking(hand) {
                    misses[hand] += 1;
                    if misses[hand] >= window {
                        flags.set_tracking(hand, false);
                        misses[hand] = 0;
                    }
                }
            }

            detector.update();
            prop_assert_eq!(
                detector.context().active_hand(),
                resolve_active_hand(&flags, dominant)
            );
        }

        check_lifecycle(&log.borrow(), false)?;
        detector.stop();
        check_lifecycle(&log.borrow(), true)?;
    }

    #[test]
    fn prop_kit_pinch_and_track_alternate(
        sync_combined in any::<bool>(),
        manual in any::<bool>(),
        frames in prop::collection::vec(kit_frame(), 0..40)
    ) {
        let mut config = TrackingConfig::new();
        config.kit.sync_combined = sync_combined;
        config.kit.detect_pinch_manually = manual;
        let left = SampledHand::new(Hand::Left);
        let right = SampledHand::new(Hand::Right);
        let mut detector = KitDetector::new(&config, GestureEvents::new())
            .with_hands(Box::new(left.clone()), Box::new(right.clone()));
        let log = recorder(detector.events());
        detector.start().unwrap();

        let mut present = HandPair::new(false, false);
        for (notifications, left_pinch, left_x, right_pinch, right_x) in frames {
            for (source, pinch, x) in [(&left, left_pinch, left_x), (&right, right_pinch, right_x)] {
                let gap = if pinch { 1.0 } else { 3.0 };
                source.set(
                    apart(gap)
                        .with_pinching(pinch)
                        .with_thumb_screen(ScreenPoint::new(x, 0.5)),
                );
            }
            for (is_left, found) in notifications {
                let hand = hand_from(is_left);
                present[hand] = found;
                detector.handle_input(if found {
                    SourceInput::HandFound(hand)
                } else {
                    SourceInput::HandLost(hand)
                });
            }

            detector.update();
            let expected = present[Hand::Left] || present[Hand::Right];
            prop_assert_eq!(detector.context().active_hand().is_some(), expected);
            if !expected {
                prop_assert!(!detector.context().is_pinching());
            }
        }

        check_lifecycle(&log.borrow(), false)?;
        detector.stop();
        check_lifecycle(&log.borrow(), true)?;
    }
}
