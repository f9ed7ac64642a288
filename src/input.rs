// Keyboard interaction state machine
//
// Key presses map to actions; actions are independent transitions over an
// explicit state struct plus the scene's group transforms. No transition can
// fail: a violated guard is a no-op.

use glam::{Mat4, Vec3};
use winit::keyboard::KeyCode;

use crate::math::deg_to_rad;
use crate::scene::Scene;

const SHRINK_FACTOR: f32 = 0.95;
const MOVE_STEP: f32 = 0.1;
const MAX_BALL_SPEED: u32 = 45;

/// Everything a key press can do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    ToggleOrbit,
    ToggleWireframe,
    ToggleSpinX,
    ToggleSpinY,
    ShrinkGoal,
    SpeedUp,
    SpeedDown,
    MoveLeft,
    MoveRight,
}

/// Key bindings. Unlisted keys do nothing.
pub fn action_for_key(key: KeyCode) -> Option<Action> {
    match key {
        KeyCode::KeyO => Some(Action::ToggleOrbit),
        KeyCode::KeyW => Some(Action::ToggleWireframe),
        KeyCode::Digit1 => Some(Action::ToggleSpinX),
        KeyCode::Digit2 => Some(Action::ToggleSpinY),
        KeyCode::Digit3 => Some(Action::ShrinkGoal),
        KeyCode::ArrowUp => Some(Action::SpeedUp),
        KeyCode::ArrowDown => Some(Action::SpeedDown),
        KeyCode::KeyA => Some(Action::MoveLeft),
        KeyCode::KeyD => Some(Action::MoveRight),
        _ => None,
    }
}

/// Session-lifetime interaction flags.
///
/// `move_edge` only ever shrinks; the goalkeeper guard reads it at press
/// time, so a position left outside a freshly shrunk range is never pulled
/// back in.
#[derive(Debug, Clone, Copy)]
pub struct InteractionState {
    pub orbit_enabled: bool,
    pub wireframe_enabled: bool,
    pub spin_x: bool,
    pub spin_y: bool,
    pub ball_speed: u32,
    pub move_edge: f32,
}

impl Default for InteractionState {
    fn default() -> Self {
        Self {
            orbit_enabled: true,
            wireframe_enabled: false,
            spin_x: false,
            spin_y: false,
            ball_speed: 1,
            move_edge: 1.0,
        }
    }
}

impl InteractionState {
    fn spinning(&self) -> bool {
        self.spin_x || self.spin_y
    }

    /// Apply one key-press transition to the state and the scene.
    pub fn apply_action(&mut self, action: Action, scene: &mut Scene) {
        match action {
            Action::ToggleOrbit => self.orbit_enabled = !self.orbit_enabled,
            Action::ToggleWireframe => self.wireframe_enabled = !self.wireframe_enabled,
            Action::ToggleSpinX => self.spin_x = !self.spin_x,
            Action::ToggleSpinY => self.spin_y = !self.spin_y,
            Action::ShrinkGoal => {
                let shrink = Mat4::from_scale(Vec3::splat(SHRINK_FACTOR));
                scene.goal.transform.apply(shrink);
                scene.goalkeeper.transform.apply(shrink);
                self.move_edge *= SHRINK_FACTOR;
            }
            Action::SpeedUp => {
                if self.spinning() && self.ball_speed < MAX_BALL_SPEED {
                    self.ball_speed += 1;
                }
            }
            Action::SpeedDown => {
                if self.spinning() && self.ball_speed > 0 {
                    self.ball_speed -= 1;
                }
            }
            Action::MoveRight => {
                if scene.goalkeeper.transform.position_x() < self.move_edge {
                    scene
                        .goalkeeper
                        .transform
                        .apply(Mat4::from_translation(Vec3::new(MOVE_STEP, 0.0, 0.0)));
                }
            }
            Action::MoveLeft => {
                if scene.goalkeeper.transform.position_x() > -self.move_edge {
                    scene
                        .goalkeeper
                        .transform
                        .apply(Mat4::from_translation(Vec3::new(-MOVE_STEP, 0.0, 0.0)));
                }
            }
        }
    }

    /// The per-frame step, minus rendering: propagate the wireframe flag to
    /// every tracked material, then apply this frame's spin increments to
    /// the ball. Both spins may fire in the same frame.
    pub fn advance_frame(&self, scene: &mut Scene) {
        for material in scene.tracked_materials_mut() {
            material.wireframe = self.wireframe_enabled;
        }

        let angle = deg_to_rad(self.ball_speed as f32);
        if self.spin_x {
            scene.ball.transform.apply(Mat4::from_rotation_x(angle));
        }
        if self.spin_y {
            scene.ball.transform.apply(Mat4::from_rotation_y(angle));
        }
    }
}
