use winit::event::{ElementState, MouseButton, MouseScrollDelta, WindowEvent};
use winit::keyboard::{KeyCode, PhysicalKey};

use crate::app::command::Command;

/// Pixels of trackpad scroll that count as one wheel step.
const PIXELS_PER_STEP: f32 = 50.0;

/// What a window event asks the viewer to do.
#[derive(Debug, Clone, PartialEq)]
pub enum InputAction {
    Orbit { dx: f32, dy: f32 },
    Zoom(f32),
    Command(Command),
}

/// Tracks the pointer between events so drags turn into orbit deltas.
#[derive(Debug, Clone, Default)]
pub struct PointerInput {
    dragging: bool,
    cursor: Option<(f32, f32)>,
}

impl PointerInput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn process_event(&mut self, event: &WindowEvent) -> Option<InputAction> {
        match event {
            WindowEvent::MouseInput {
                state,
                button: MouseButton::Left,
                ..
            } => {
                self.dragging = *state == ElementState::Pressed;
                None
            }
            WindowEvent::CursorMoved { position, .. } => {
                let current = (position.x as f32, position.y as f32);
                let previous = self.cursor.replace(current);
                match previous {
                    Some((x, y)) if self.dragging => Some(InputAction::Orbit {
                        dx: current.0 - x,
                        dy: current.1 - y,
                    }),
                    _ => None,
                }
            }
            WindowEvent::CursorLeft { .. } => {
                self.cursor = None;
                self.dragging = false;
                None
            }
            WindowEvent::MouseWheel { delta, .. } => {
                let steps = match delta {
                    MouseScrollDelta::LineDelta(_, y) => *y,
                    MouseScrollDelta::PixelDelta(pos) => pos.y as f32 / PIXELS_PER_STEP,
                };
                (steps != 0.0).then_some(InputAction::Zoom(steps))
            }
            WindowEvent::KeyboardInput { event, .. } if event.state == ElementState::Pressed && !event.repeat => {
                match event.physical_key {
                    PhysicalKey::Code(code) => key_command(code).map(InputAction::Command),
                    _ => None,
                }
            }
            _ => None,
        }
    }
}

/// Viewer shortcuts: W/G/R toggle, C resets the camera, digits pick the
/// rotation speed (0 is 10), Escape quits.
pub fn key_command(code: KeyCode) -> Option<Command> {
    let command = match code {
        KeyCode::KeyW => Command::ToggleWireframe,
        KeyCode::KeyG => Command::ToggleGrid,
        KeyCode::KeyR => Command::ToggleAutoRotate,
        KeyCode::KeyC => Command::ResetCamera,
        KeyCode::Escape => Command::Quit,
        KeyCode::Digit1 => Command::RotateSpeed(1),
        KeyCode::Digit2 => Command::RotateSpeed(2),
        KeyCode::Digit3 => Command::RotateSpeed(3),
        KeyCode::Digit4 => Command::RotateSpeed(4),
        KeyCode::Digit5 => Command::RotateSpeed(5),
        KeyCode::Digit6 => Command::RotateSpeed(6),
        KeyCode::Digit7 => Command::RotateSpeed(7),
        KeyCode::Digit8 => Command::RotateSpeed(8),
        KeyCode::Digit9 => Command::RotateSpeed(9),
        KeyCode::Digit0 => Command::RotateSpeed(10),
        _ => return None,
    };
    Some(command)
}
