//! Gesture events and the typed buses they are published on.

use serde::{Deserialize, Serialize};

use crate::bus::EventBus;
use crate::spatial::Point3D;
use crate::Hand;

/// Payload of pinch start, hold and end.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PinchSample {
    /// Cursor position in world space
    pub position: Point3D,
    /// True when produced by touch simulation
    pub is_simulated: bool,
}

/// Payload of track start and end.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackSample {
    pub is_simulated: bool,
}

/// Payload of an active hand change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HandChange {
    pub previous: Option<Hand>,
    pub current: Option<Hand>,
}

/// Every notification a gesture source can raise.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum GestureEvent {
    PinchStart(PinchSample),
    PinchHold(PinchSample),
    PinchEnd(PinchSample),
    HoverStart { position: Point3D },
    Hovering { position: Point3D },
    HoverEnd { position: Point3D },
    TrackStart(TrackSample),
    TrackEnd(TrackSample),
    ActiveHandChanged(HandChange),
}

impl GestureEvent {
    /// Short snake_case name of the event kind
    pub fn kind(&self) -> &'static str {
        match self {
            GestureEvent::PinchStart(_) => "pinch_start",
            GestureEvent::PinchHold(_) => "pinch_hold",
            GestureEvent::PinchEnd(_) => "pinch_end",
            GestureEvent::HoverStart { .. } => "hover_start",
            GestureEvent::Hovering { .. } => "hovering",
            GestureEvent::HoverEnd { .. } => "hover_end",
            GestureEvent::TrackStart(_) => "track_start",
            GestureEvent::TrackEnd(_) => "track_end",
            GestureEvent::ActiveHandChanged(_) => "active_hand_changed",
        }
    }

    /// World position carried by pinch and hover events
    pub fn position(&self) -> Option<Point3D> {
        match self {
            GestureEvent::PinchStart(s) | GestureEvent::PinchHold(s) | GestureEvent::PinchEnd(s) => {
                Some(s.position)
            }
            GestureEvent::HoverStart { position }
            | GestureEvent::Hovering { position }
            | GestureEvent::HoverEnd { position } => Some(*position),
            _ => None,
        }
    }

    pub fn is_simulated(&self) -> Option<bool> {
        match self {
            GestureEvent::PinchStart(s) | GestureEvent::PinchHold(s) | GestureEvent::PinchEnd(s) => {
                Some(s.is_simulated)
            }
            GestureEvent::TrackStart(s) | GestureEvent::TrackEnd(s) => Some(s.is_simulated),
            _ => None,
        }
    }

}

/// One bus per event kind, plus `any` which sees every event after its typed
/// bus has been served.
///
/// Cloning yields another handle onto the same subscriber lists.
#[derive(Debug, Clone)]
pub struct GestureEvents {
    pub pinch_start: EventBus<PinchSample>,
    pub pinch_hold: EventBus<PinchSample>,
    pub pinch_end: EventBus<PinchSample>,
    pub track_start: EventBus<TrackSample>,
    pub track_end: EventBus<TrackSample>,
    pub active_hand_changed: EventBus<HandChange>,
    pub hover_start: EventBus<Point3D>,
    pub hovering: EventBus<Point3D>,
    pub hover_end: EventBus<Point3D>,
    pub any: EventBus<GestureEvent>,
}

impl Default for GestureEvents {
    fn default() -> Self {
        Self {
            pinch_start: EventBus::new("pinch_start"),
            pinch_hold: EventBus::new("pinch_hold"),
            pinch_end: EventBus::new("pinch_end"),
            track_start: EventBus::new("track_start"),
            track_end: EventBus::new("track_end"),
            active_hand_changed: EventBus::new("active_hand_changed"),
            hover_start: EventBus::new("hover_start"),
            hovering: EventBus::new("hovering"),
            hover_end: EventBus::new("hover_end"),
            any: EventBus::new("any"),
        }
    }
}

impl GestureEvents {
    pub fn new() -> Self {
        Self::default()
    }

    /// Route an event to its typed bus, then to `any`.
    pub fn emit(&self, event: GestureEvent) {
        tracing::trace!("emit {}", event.kind());
        match &event {
            GestureEvent::PinchStart(s) => self.pinch_start.publish(s),
            GestureEvent::PinchHold(s) => self.pinch_hold.publish(s),
            GestureEvent::PinchEnd(s) => self.pinch_end.publish(s),
            GestureEvent::HoverStart { position } => self.hover_start.publish(position),
            GestureEvent::Hovering { position } => self.hovering.publish(position),
            GestureEvent::HoverEnd { position } => self.hover_end.publish(position),
            GestureEvent::TrackStart(s) => self.track_start.publish(s),
            GestureEvent::TrackEnd(s) => self.track_end.publish(s),
            GestureEvent::ActiveHandChanged(c) => self.active_hand_changed.publish(c),
        };
        self.any.publish(&event);
    }

    pub fn pinch_start(&self, position: Point3D, is_simulated: bool) {
        self.emit(GestureEvent::PinchStart(PinchSample { position, is_simulated }));
    }

    pub fn pinch_hold(&self, position: Point3D, is_simulated: bool) {
        self.emit(GestureEvent::PinchHold(PinchSample { position, is_simulated }));
    }

    pub fn pinch_end(&self, position: Point3D, is_simulated: bool) {
        self.emit(GestureEvent::PinchEnd(PinchSample { position, is_simulated }));
    }

    pub fn track_start(&self, is_simulated: bool) {
        self.emit(GestureEvent::TrackStart(TrackSample { is_simulated }));
    }

    pub fn track_end(&self, is_simulated: bool) {
        self.emit(GestureEvent::TrackEnd(TrackSample { is_simulated }));
    }

    pub fn active_hand_changed(&self, previous: Option<Hand>, current: Option<Hand>) {
        self.emit(GestureEvent::ActiveHandChanged(HandChange { previous, current }));
    }

    pub fn hover_start(&self, position: Point3D) {
        self.emit(GestureEvent::HoverStart { position });
    }

    pub fn hovering(&self, position: Point3D) {
        self.emit(GestureEvent::Hovering { position });
    }

    pub fn hover_end(&self, position: Point3D) {
        self.emit(GestureEvent::HoverEnd { position });
    }

    /// Total subscriber faults across all buses
    pub fn fault_count(&self) -> u64 {
        self.pinch_start.fault_count()
            + self.pinch_hold.fault_count()
            + self.pinch_end.fault_count()
            + self.track_start.fault_count()
            + self.track_end.fault_count()
            + self.active_hand_changed.fault_count()
            + self.hover_start.fault_count()
            + self.hovering.fault_count()
            + self.hover_end.fault_count()
            + self.any.fault_count()
    }
}

/// Test helper: records everything published on `any`.
#[cfg(test)]
pub(crate) fn record(events: &GestureEvents) -> std::rc::Rc<std::cell::RefCell<Vec<GestureEvent>>> {
    let log = std::rc::Rc::new(std::cell::RefCell::new(Vec::new()));
    let sink = std::rc::Rc::clone(&log);
    events.any.observe(move |event| sink.borrow_mut().push(*event));
    log
}
