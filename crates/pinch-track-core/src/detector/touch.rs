//! Touch pointer simulated as a pinching hand
//!
//! Pointer down/up become pinch start/end one frame later, projected into
//! the world at a fixed distance in front of the camera. Hover-capable
//! pointers additionally drive hover events.

use pinch_track_config::{SourceMode, TrackingConfig};

use super::{GestureSource, SourceInput};
use crate::context::TrackingContext;
use crate::error::{Result, TrackingError};
use crate::events::GestureEvents;
use crate::spatial::{PerspectiveCamera, Point3D, ScreenPoint, ScreenProjector};

/// Pinch phase of the single simulated pointer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TouchPhase {
    Idle,
    /// Pointer went down, start not yet published
    Started,
    Holding,
    /// Pointer went up, end not yet published
    Ended,
}

#[derive(Debug, Default)]
struct HoverState {
    active: bool,
    started_frame: u64,
    last_seen_frame: Option<u64>,
}

pub struct TouchDetector {
    events: GestureEvents,
    context: TrackingContext,
    camera: Option<Box<dyn ScreenProjector>>,
    distance: f32,
    hover_enabled: bool,
    running: bool,
    phase: TouchPhase,
    pointer: Option<ScreenPoint>,
    /// Pointer released before the start was published
    release_pending: bool,
    /// Pointer pressed again before the end was published
    press_pending: bool,
    last_position: Point3D,
    frame: u64,
    hover: HoverState,
}

impl TouchDetector {
    /// Build from config. A `[touch.camera]` section provides the projector;
    /// without one, [`TouchDetector::with_camera`] must be used.
    pub fn new(config: &TrackingConfig, events: GestureEvents) -> Self {
        let camera = config
            .touch
            .camera
            .as_ref()
            .map(|c| Box::new(PerspectiveCamera::from(c)) as Box<dyn ScreenProjector>);

        Self {
            events,
            context: TrackingContext::new(config.dominant_hand),
            camera,
            distance: config.touch.distance_from_camera,
            hover_enabled: config.touch.hover,
            running: false,
            phase: TouchPhase::Idle,
            pointer: None,
            release_pending: false,
            press_pending: false,
            last_position: Point3D::ORIGIN,
            frame: 0,
            hover: HoverState::default(),
        }
    }

    pub fn with_camera(mut self, camera: Box<dyn ScreenProjector>) -> Self {
        self.camera = Some(camera);
        self
    }

    pub fn phase(&self) -> TouchPhase {
        self.phase
    }

    fn project(&self, screen: ScreenPoint) -> Option<Point3D> {
        self.camera
            .as_ref()
            .map(|camera| camera.screen_to_world(screen, self.distance))
    }

    /// Re-project the pointer into the cursor pose.
    fn refresh_cursor(&mut self) {
        let (Some(camera), Some(pointer)) = (self.camera.as_ref(), self.pointer) else {
            return;
        };
        let position = camera.screen_to_world(pointer, self.distance);
        let pose = camera.pose();

        let cursor = &mut self.context.cursor;
        cursor.position = Some(position);
        cursor.forward = Some(pose.forward());
        cursor.up = Some(pose.up());
        cursor.thumb_position = Some(position);
        cursor.index_position = Some(position);
        self.last_position = position;
    }

    fn cursor_position(&self) -> Point3D {
        self.context.cursor.position.unwrap_or(self.last_position)
    }

    fn begin_pinch(&mut self) {
        self.refresh_cursor();
        self.context.active_hand = Some(self.context.dominant_hand);
        self.events.track_start(true);
        self.context.is_pinching = true;
        self.events.pinch_start(self.cursor_position(), true);
        tracing::debug!("Touch pinch started");

        self.phase = if std::mem::take(&mut self.release_pending) {
            TouchPhase::Ended
        } else {
            TouchPhase::Holding
        };
    }

    fn finish_pinch(&mut self) {
        let position = self.cursor_position();
        self.context.is_pinching = false;
        self.events.pinch_end(position, true);
        self.context.cursor.clear();
        self.context.active_hand = None;
        self.events.track_end(true);
        self.phase = TouchPhase::Idle;
        tracing::debug!("Touch pinch ended");
    }

    fn handle_hover(&mut self, screen: ScreenPoint) {
        if !self.hover_enabled {
            tracing::trace!("Hover input ignored, hover disabled");
            return;
        }
        let Some(world) = self.project(screen) else {
            return;
        };
        self.context.hover_screen_position = Some(screen);
        self.context.hover_world_position = Some(world);

        if !self.hover.active {
            self.hover.active = true;
            self.hover.started_frame = self.frame;
            self.events.hover_start(world);
        }
        self.hover.last_seen_frame = Some(self.frame);
    }

    fn update_hover(&mut self) {
        if !self.hover.active {
            return;
        }
        let Some(world) = self.context.hover_world_position else {
            return;
        };

        match self.hover.last_seen_frame {
            Some(seen) if seen < self.frame => self.end_hover(),
            _ if self.frame > self.hover.started_frame => {
                self.events.hovering(world);
            }
            _ => {}
        }
    }

    fn end_hover(&mut self) {
        if !self.hover.active {
            return;
        }
        let position = self.context.hover_world_position.unwrap_or(self.last_position);
        self.events.hover_end(position);
        self.context.hover_screen_position = None;
        self.context.hover_world_position = None;
        self.hover = HoverState::default();
    }
}

impl GestureSource for TouchDetector {
    fn mode(&self) -> SourceMode {
        SourceMode::Touch
    }

    fn start(&mut self) -> Result<()> {
        if self.camera.is_none() {
            let err = TrackingError::misconfigured(SourceMode::Touch, "no camera assigned");
            tracing::error!("Touch source not started: {}", err);
            return Err(err);
        }
        if self.running {
            return Ok(());
        }

        self.context.reset();
        self.phase = TouchPhase::Idle;
        self.pointer = None;
        self.release_pending = false;
        self.press_pending = false;
        self.frame = 0;
        self.hover = HoverState::default();
        self.running = true;
        tracing::info!(
            "Touch source started (distance {}, hover {})",
            self.distance,
            self.hover_enabled
        );
        Ok(())
    }

    fn stop(&mut self) {
        if !self.running {
            return;
        }
        if matches!(self.phase, TouchPhase::Holding | TouchPhase::Ended) {
            self.finish_pinch();
        }
        self.end_hover();

        self.context.reset();
        self.phase = TouchPhase::Idle;
        self.pointer = None;
        self.release_pending = false;
        self.press_pending = false;
        self.running = false;
        tracing::info!("Touch source stopped");
    }

    fn is_running(&self) -> bool {
        self.running
    }

    fn handle_input(&mut self, input: SourceInput) {
        if !self.running {
            return;
        }

        match input {
            SourceInput::PointerDown(screen) => match self.phase {
                TouchPhase::Idle => {
                    self.pointer = Some(screen);
                    self.phase = TouchPhase::Started;
                }
                TouchPhase::Ended => {
                    self.pointer = Some(screen);
                    self.press_pending = true;
                }
                TouchPhase::Started => self.pointer = Some(screen),
                TouchPhase::Holding => {
                    self.pointer = Some(screen);
                    self.refresh_cursor();
                }
            },
            SourceInput::PointerMove(screen) => match self.phase {
                TouchPhase::Started => self.pointer = Some(screen),
                TouchPhase::Holding => {
                    self.pointer = Some(screen);
                    self.refresh_cursor();
                }
                TouchPhase::Idle | TouchPhase::Ended => {}
            },
            SourceInput::PointerUp(screen) => match self.phase {
                TouchPhase::Started => {
                    self.pointer = Some(screen);
                    self.release_pending = true;
                }
                TouchPhase::Holding => {
                    self.pointer = Some(screen);
                    self.refresh_cursor();
                    self.phase = TouchPhase::Ended;
                }
                TouchPhase::Ended => self.press_pending = false,
                TouchPhase::Idle => {}
            },
            SourceInput::Hover(screen) => self.handle_hover(screen),
            SourceInput::HandFound(_) | SourceInput::HandLost(_) => {
                tracing::trace!("Touch source ignores {:?}", input);
            }
        }
    }

    fn update(&mut self) {
        if !self.running {
            return;
        }

        if self.hover_enabled {
            self.update_hover();
        }

        match self.phase {
            TouchPhase::Started => self.begin_pinch(),
            TouchPhase::Holding => {
                self.refresh_cursor();
                self.events.pinch_hold(self.cursor_position(), true);
            }
            TouchPhase::Ended => {
                self.finish_pinch();
                if std::mem::take(&mut self.press_pending) {
                    self.phase = TouchPhase::Started;
                } else {
                    self.pointer = None;
                }
            }
            TouchPhase::Idle => {}
        }

        self.frame += 1;
    }

    fn context(&self) -> &TrackingContext {
        &self.context
    }

    fn events(&self) -> &GestureEvents {
        &self.events
    }
}
