//! Translates bevy's mouse, cursor and touch events into [`CamInput`]s and routes them into every
//! [`StorefrontCam`].
//!
//! Hosts that deliver input some other way can skip [`DefaultInputPlugin`] and call the `on_*`
//! methods on [`StorefrontCam`] directly.

use std::time::Duration;

use bevy_app::prelude::*;
use bevy_ecs::prelude::*;
use bevy_input::{
    mouse::{MouseButton, MouseButtonInput, MouseWheel},
    touch::{TouchInput, TouchPhase},
    ButtonState, InputSystem,
};
use bevy_log::prelude::*;
use bevy_math::prelude::*;
use bevy_time::{Real, Time};
use bevy_window::{CursorLeft, CursorMoved};

use crate::controller::{
    inputs::{CamInput, PointerButton, PointerDown, PointerKind, PointerMove},
    StorefrontCam, StorefrontCamSystems,
};

/// Routes bevy's window input events into every [`StorefrontCam`].
pub struct DefaultInputPlugin;

impl Plugin for DefaultInputPlugin {
    fn build(&self, app: &mut App) {
        app.add_event::<MouseButtonInput>()
            .add_event::<CursorMoved>()
            .add_event::<CursorLeft>()
            .add_event::<TouchInput>()
            .add_event::<MouseWheel>()
            .add_systems(
                PreUpdate,
                route_input
                    .after(InputSystem)
                    .after(StorefrontCamSystems::SyncPhase),
            );
    }
}

/// Window input state that outlives a single frame: the cursor position and the active touches.
#[derive(Debug, Default, Clone)]
pub struct EventTranslator {
    cursor: Option<Vec2>,
    touches: Vec<(u64, Vec2)>,
}

impl EventTranslator {
    /// Positions of all active touches, in the order they started.
    pub fn touch_positions(&self) -> Vec<Vec2> {
        self.touches.iter().map(|(_, position)| *position).collect()
    }

    /// A mouse button changed state.
    pub fn mouse_button(&self, event: &MouseButtonInput, timestamp: Duration) -> Option<CamInput> {
        match event.state {
            ButtonState::Pressed => Some(CamInput::PointerDown(PointerDown {
                position: self.cursor?,
                kind: PointerKind::Mouse,
                button: pointer_button(event.button),
                timestamp,
            })),
            ButtonState::Released => Some(CamInput::PointerUp),
        }
    }

    /// The mouse cursor moved.
    pub fn cursor_moved(&mut self, position: Vec2, timestamp: Duration) -> CamInput {
        self.cursor = Some(position);
        CamInput::PointerMove(PointerMove {
            position,
            timestamp,
        })
    }

    /// The mouse cursor left the window.
    pub fn cursor_left(&mut self) -> CamInput {
        self.cursor = None;
        CamInput::PointerLeave
    }

    /// A touch changed. A single touch doubles as a pointer so it can drag.
    pub fn touch(&mut self, event: &TouchInput, timestamp: Duration, out: &mut Vec<CamInput>) {
        match event.phase {
            TouchPhase::Started => {
                self.touches.retain(|(id, _)| *id != event.id);
                self.touches.push((event.id, event.position));
                out.push(CamInput::TouchStart(self.touch_positions()));
                if self.touches.len() == 1 {
                    out.push(CamInput::PointerDown(PointerDown {
                        position: event.position,
                        kind: PointerKind::Touch,
                        button: PointerButton::Primary,
                        timestamp,
                    }));
                }
            }
            TouchPhase::Moved => {
                let Some(touch) = self.touches.iter_mut().find(|(id, _)| *id == event.id) else {
                    return;
                };
                touch.1 = event.position;
                out.push(CamInput::TouchMove(self.touch_positions()));
                if self.touches.len() == 1 {
                    out.push(CamInput::PointerMove(PointerMove {
                        position: event.position,
                        timestamp,
                    }));
                }
            }
            TouchPhase::Ended => {
                self.touches.retain(|(id, _)| *id != event.id);
                out.push(CamInput::PointerUp);
                out.push(CamInput::TouchMove(self.touch_positions()));
            }
            TouchPhase::Canceled => {
                self.touches.retain(|(id, _)| *id != event.id);
                out.push(CamInput::PointerCancel);
            }
        }
    }
}

fn pointer_button(button: MouseButton) -> PointerButton {
    match button {
        MouseButton::Left => PointerButton::Primary,
        MouseButton::Right => PointerButton::Secondary,
        MouseButton::Middle => PointerButton::Middle,
        MouseButton::Back => PointerButton::Other(3),
        MouseButton::Forward => PointerButton::Other(4),
        MouseButton::Other(n) => PointerButton::Other(n),
    }
}

/// Timestamps for `count` events that arrived during the frame ending at `now`, spaced evenly so
/// the last one lands on `now`.
pub fn spread_over_frame(
    now: Duration,
    delta: Duration,
    count: u32,
) -> impl Iterator<Item = Duration> {
    (0..count).map(move |i| now.saturating_sub(delta * (count - 1 - i) / count))
}

/// Collects this frame's window input and applies it to every camera.
///
/// Bevy delivers each event type on its own queue, so the relative order across types is lost.
/// Presses are applied first, at the cursor position from the previous event and stamped at the
/// start of the frame. Cursor moves follow, their timestamps spread evenly across the frame so
/// drag velocity does not depend on how many moves one frame batched. Releases come last.
///
/// Touch events carry no timing of their own and are all stamped with the frame time, so a
/// single-finger fling measures its velocity from the frame spacing instead.
#[allow(clippy::too_many_arguments)]
pub fn route_input(
    mut translator: Local<EventTranslator>,
    mut buttons: EventReader<MouseButtonInput>,
    mut moves: EventReader<CursorMoved>,
    mut leaves: EventReader<CursorLeft>,
    mut touches: EventReader<TouchInput>,
    mut wheel: EventReader<MouseWheel>,
    time: Res<Time<Real>>,
    mut cameras: Query<&mut StorefrontCam>,
) {
    let now = time.elapsed();
    let frame_start = now.saturating_sub(time.delta());
    let mut inputs = Vec::new();

    let (presses, releases): (Vec<_>, Vec<_>) = buttons
        .read()
        .partition(|event| event.state == ButtonState::Pressed);
    inputs.extend(
        presses
            .into_iter()
            .filter_map(|event| translator.mouse_button(event, frame_start)),
    );
    let moves: Vec<_> = moves.read().collect();
    let stamps = spread_over_frame(now, time.delta(), moves.len() as u32);
    for (event, timestamp) in moves.into_iter().zip(stamps) {
        inputs.push(translator.cursor_moved(event.position, timestamp));
    }
    inputs.extend(
        releases
            .into_iter()
            .filter_map(|event| translator.mouse_button(event, now)),
    );
    for _ in leaves.read() {
        inputs.push(translator.cursor_left());
    }
    for event in touches.read() {
        translator.touch(event, now, &mut inputs);
    }
    inputs.extend(wheel.read().map(|_| CamInput::Wheel));

    if inputs.is_empty() {
        return;
    }
    for mut controller in &mut cameras {
        for input in &inputs {
            let response = controller.handle_input(input);
            trace!("{input:?} -> {response:?}");
        }
    }
}
