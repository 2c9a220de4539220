//! Routes pointer, touch and wheel input into orbit and pinch state.
//!
//! None of these methods touch the camera pose. They only change yaw, pitch, spin velocity, drag
//! and pinch state, which the frame driver reads on the next [`StorefrontCam::advance`].

use std::time::Duration;

use bevy_math::prelude::*;

use super::{component::ScenePhase, zoom::finger_spread, StorefrontCam};

/// The kind of device behind a pointer event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PointerKind {
    /// A mouse. Only the primary button starts a drag.
    Mouse,
    /// A finger on a touch screen.
    Touch,
    /// A stylus.
    Pen,
}

/// The button that went down.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PointerButton {
    /// Left mouse button, or the contact of a touch or pen.
    Primary,
    /// Right mouse button.
    Secondary,
    /// Middle mouse button.
    Middle,
    /// Any other button.
    Other(u16),
}

/// A pointer was pressed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerDown {
    /// Screen position in logical pixels.
    pub position: Vec2,
    /// Device kind.
    pub kind: PointerKind,
    /// Pressed button.
    pub button: PointerButton,
    /// Host clock value of the event.
    pub timestamp: Duration,
}

/// A pointer moved.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerMove {
    /// Screen position in logical pixels.
    pub position: Vec2,
    /// Host clock value of the event.
    pub timestamp: Duration,
}

/// A single device event, for hosts that queue input instead of calling the `on_*` methods.
#[derive(Debug, Clone, PartialEq)]
pub enum CamInput {
    /// See [`StorefrontCam::on_pointer_down`].
    PointerDown(PointerDown),
    /// See [`StorefrontCam::on_pointer_move`].
    PointerMove(PointerMove),
    /// See [`StorefrontCam::on_pointer_up`].
    PointerUp,
    /// See [`StorefrontCam::on_pointer_cancel`].
    PointerCancel,
    /// See [`StorefrontCam::on_pointer_leave`].
    PointerLeave,
    /// Positions of all touches after one started. See [`StorefrontCam::on_touch_start`].
    TouchStart(Vec<Vec2>),
    /// Positions of all touches after one moved. See [`StorefrontCam::on_touch_move`].
    TouchMove(Vec<Vec2>),
    /// See [`StorefrontCam::on_wheel`].
    Wheel,
}

/// Tells the host what to do with the platform's default handling of an event.
#[must_use]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputResponse {
    /// The controller did not use the event.
    Ignored,
    /// The controller used or suppressed the event. Prevent the platform default (page scroll,
    /// browser pinch zoom, wheel zoom).
    Consumed,
}

impl InputResponse {
    /// Should the host prevent the default platform behavior?
    pub fn prevent_default(self) -> bool {
        self == InputResponse::Consumed
    }
}

/// An active drag, tracking the previous sample to compute incremental deltas.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragSession {
    /// Position of the previous pointer sample.
    pub last_position: Vec2,
    /// Timestamp of the previous pointer sample.
    pub last_time: Duration,
}

impl StorefrontCam {
    /// Route one queued event.
    pub fn handle_input(&mut self, input: &CamInput) -> InputResponse {
        match input {
            CamInput::PointerDown(down) => self.on_pointer_down(*down),
            CamInput::PointerMove(moved) => self.on_pointer_move(*moved),
            CamInput::PointerUp => self.on_pointer_up(),
            CamInput::PointerCancel => self.on_pointer_cancel(),
            CamInput::PointerLeave => self.on_pointer_leave(),
            CamInput::TouchStart(touches) => self.on_touch_start(touches),
            CamInput::TouchMove(touches) => self.on_touch_move(touches),
            CamInput::Wheel => self.on_wheel(),
        }
    }

    /// Orbit input is only accepted in the default frame, after arrival, outside transitions.
    fn accepts_orbit_input(&self) -> bool {
        self.is_spin_enabled() && !self.is_transitioning()
    }

    /// Pinch input is accepted in any frame, after arrival, outside transitions.
    fn accepts_touch_input(&self) -> bool {
        self.phase() == ScenePhase::Arrived && !self.is_transitioning()
    }

    /// Start a drag. Every new grab kills any remaining spin.
    pub fn on_pointer_down(&mut self, down: PointerDown) -> InputResponse {
        if !self.accepts_orbit_input() {
            return InputResponse::Ignored;
        }
        if down.kind == PointerKind::Mouse && down.button != PointerButton::Primary {
            return InputResponse::Ignored;
        }
        if self.pinch.is_pinching() || !down.position.is_finite() {
            return InputResponse::Ignored;
        }
        self.drag = Some(DragSession {
            last_position: down.position,
            last_time: down.timestamp,
        });
        self.orbit.yaw_velocity = 0.0;
        InputResponse::Consumed
    }

    /// Continue a drag.
    ///
    /// The dominant axis wins: mostly-horizontal motion spins the camera and sets the spin
    /// velocity, mostly-vertical motion only tilts it.
    pub fn on_pointer_move(&mut self, moved: PointerMove) -> InputResponse {
        if !self.accepts_orbit_input() || !moved.position.is_finite() {
            return InputResponse::Ignored;
        }
        let Some(drag) = self.drag.as_mut() else {
            return InputResponse::Ignored;
        };

        let delta = moved.position - drag.last_position;
        let dt = moved.timestamp.saturating_sub(drag.last_time).as_secs_f32();
        drag.last_position = moved.position;
        drag.last_time = moved.timestamp;

        let tuning = &self.tuning;
        let jitter = tuning.jitter_threshold;
        if delta.x.abs() < jitter && delta.y.abs() < jitter {
            return InputResponse::Ignored;
        }

        if delta.x.abs() > delta.y.abs() {
            let step = -delta.x * tuning.drag_yaw_sensitivity;
            let velocity = step / dt.max(tuning.min_drag_dt);
            self.orbit.yaw += step;
            self.orbit.yaw_velocity = velocity;
        } else if delta.y.abs() > delta.x.abs() {
            let pitch = self.orbit.pitch + delta.y * tuning.drag_pitch_sensitivity;
            self.orbit.pitch = tuning.clamp_pitch(pitch);
        }
        InputResponse::Consumed
    }

    /// End a drag. The spin velocity is kept so the camera coasts to a stop.
    pub fn on_pointer_up(&mut self) -> InputResponse {
        match self.drag.take() {
            Some(_) => InputResponse::Consumed,
            None => InputResponse::Ignored,
        }
    }

    /// The platform cancelled the pointer. Ends the drag and forgets any pinch baseline.
    pub fn on_pointer_cancel(&mut self) -> InputResponse {
        self.pinch.reset_baseline();
        self.on_pointer_up()
    }

    /// The pointer left the view. Same as releasing it.
    pub fn on_pointer_leave(&mut self) -> InputResponse {
        self.on_pointer_up()
    }

    /// A finger touched down. `touches` holds every active touch.
    ///
    /// Two fingers start a pinch and end any drag. Any other count forgets the pinch baseline.
    pub fn on_touch_start(&mut self, touches: &[Vec2]) -> InputResponse {
        if !self.accepts_touch_input() {
            return InputResponse::Ignored;
        }
        if touches.len() != 2 {
            self.pinch.reset_baseline();
            return InputResponse::Ignored;
        }
        let Some(spread) = finger_spread(touches) else {
            return InputResponse::Ignored;
        };
        self.pinch.begin(spread);
        self.drag = None;
        InputResponse::Consumed
    }

    /// A finger moved. `touches` holds every active touch.
    pub fn on_touch_move(&mut self, touches: &[Vec2]) -> InputResponse {
        if !self.accepts_touch_input() {
            return InputResponse::Ignored;
        }
        match touches.len() {
            1 => {
                self.pinch.reset_baseline();
                InputResponse::Ignored
            }
            2 => {
                let Some(spread) = finger_spread(touches) else {
                    return InputResponse::Ignored;
                };
                self.pinch.update(spread, &self.tuning);
                InputResponse::Consumed
            }
            _ => InputResponse::Ignored,
        }
    }

    /// Wheel and trackpad scrolling never zoom or dolly. After arrival they are swallowed.
    pub fn on_wheel(&mut self) -> InputResponse {
        if self.phase() == ScenePhase::Arrived {
            InputResponse::Consumed
        } else {
            InputResponse::Ignored
        }
    }
}
