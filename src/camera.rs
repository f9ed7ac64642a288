// Orbit camera: rotate / pan / zoom around a target point

use glam::{Mat4, Vec3};
use winit::dpi::PhysicalPosition;
use winit::event::{ElementState, MouseButton, MouseScrollDelta};

const ROTATE_SPEED: f32 = 0.005;
const PAN_SPEED: f32 = 0.002;
const ZOOM_STEP: f32 = 0.25;
const MIN_DISTANCE: f32 = 0.5;
const MAX_DISTANCE: f32 = 50.0;
// Keep pitch just inside the poles so the up vector stays valid.
const PITCH_LIMIT: f32 = std::f32::consts::FRAC_PI_2 - 0.01;

/// Camera orbiting a target point, driven by pointer input.
///
/// All input is ignored while `enabled` is false; the renderer syncs
/// `enabled` from the interaction state every frame before dispatching.
pub struct OrbitCamera {
    pub target: Vec3,
    pub distance: f32,
    pub yaw: f32,
    pub pitch: f32,
    pub enabled: bool,
    rotating: bool,
    panning: bool,
    last_cursor: Option<(f64, f64)>,
}

impl OrbitCamera {
    /// Starts at (0, 0, 5) looking at the origin.
    pub fn new() -> Self {
        Self {
            target: Vec3::ZERO,
            distance: 5.0,
            yaw: 0.0,
            pitch: 0.0,
            enabled: true,
            rotating: false,
            panning: false,
            last_cursor: None,
        }
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
        if !enabled {
            self.rotating = false;
            self.panning = false;
            self.last_cursor = None;
        }
    }

    /// World-space camera position on the orbit sphere.
    pub fn position(&self) -> Vec3 {
        let offset = Vec3::new(
            self.distance * self.pitch.cos() * self.yaw.sin(),
            self.distance * self.pitch.sin(),
            self.distance * self.pitch.cos() * self.yaw.cos(),
        );
        self.target + offset
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position(), self.target, Vec3::Y)
    }

    pub fn handle_mouse_button(&mut self, button: MouseButton, state: ElementState) {
        if !self.enabled {
            return;
        }
        let pressed = state == ElementState::Pressed;
        match button {
            MouseButton::Left => self.rotating = pressed,
            MouseButton::Right => self.panning = pressed,
            _ => {}
        }
        if !pressed {
            self.last_cursor = None;
        }
    }

    pub fn handle_cursor_moved(&mut self, position: PhysicalPosition<f64>) {
        if !self.enabled {
            return;
        }
        let (x, y) = (position.x, position.y);
        if let Some((last_x, last_y)) = self.last_cursor {
            let dx = (x - last_x) as f32;
            let dy = (y - last_y) as f32;
            if self.rotating {
                self.yaw -= dx * ROTATE_SPEED;
                self.pitch = (self.pitch + dy * ROTATE_SPEED).clamp(-PITCH_LIMIT, PITCH_LIMIT);
            } else if self.panning {
                // Shift the target in the view plane.
                let view = self.view_matrix();
                let right = Vec3::new(view.x_axis.x, view.y_axis.x, view.z_axis.x);
                let up = Vec3::new(view.x_axis.y, view.y_axis.y, view.z_axis.y);
                let scale = PAN_SPEED * self.distance;
                self.target += right * (-dx * scale) + up * (dy * scale);
            }
        }
        if self.rotating || self.panning {
            self.last_cursor = Some((x, y));
        }
    }

    pub fn handle_scroll(&mut self, delta: MouseScrollDelta) {
        if !self.enabled {
            return;
        }
        let steps = match delta {
            MouseScrollDelta::LineDelta(_, y) => y,
            MouseScrollDelta::PixelDelta(pos) => pos.y as f32 / 40.0,
        };
        self.distance = (self.distance - steps * ZOOM_STEP).clamp(MIN_DISTANCE, MAX_DISTANCE);
    }
}

impl Default for OrbitCamera {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn drag(camera: &mut OrbitCamera, from: (f64, f64), to: (f64, f64)) {
        camera.handle_mouse_button(MouseButton::Left, ElementState::Pressed);
        camera.handle_cursor_moved(PhysicalPosition::new(from.0, from.1));
        camera.handle_cursor_moved(PhysicalPosition::new(to.0, to.1));
        camera.handle_mouse_button(MouseButton::Left, ElementState::Released);
    }

    #[test]
    fn starts_five_units_in_front_of_origin() {
        let camera = OrbitCamera::new();
        let p = camera.position();
        assert_relative_eq!(p.x, 0.0);
        assert_relative_eq!(p.y, 0.0);
        assert_relative_eq!(p.z, 5.0);
    }

    #[test]
    fn view_matrix_is_finite() {
        let camera = OrbitCamera::new();
        assert!(camera.view_matrix().to_cols_array().iter().all(|f| f.is_finite()));
    }

    #[test]
    fn dragging_changes_yaw() {
        let mut camera = OrbitCamera::new();
        drag(&mut camera, (100.0, 100.0), (140.0, 100.0));
        assert!(camera.yaw != 0.0);
        assert_relative_eq!(camera.pitch, 0.0);
    }

    #[test]
    fn pitch_is_clamped_short_of_the_poles() {
        let mut camera = OrbitCamera::new();
        drag(&mut camera, (0.0, 0.0), (0.0, 1e6));
        assert!(camera.pitch < std::f32::consts::FRAC_PI_2);
        drag(&mut camera, (0.0, 1e6), (0.0, -2e6));
        assert!(camera.pitch > -std::f32::consts::FRAC_PI_2);
        assert!(camera.view_matrix().to_cols_array().iter().all(|f| f.is_finite()));
    }

    #[test]
    fn zoom_is_clamped() {
        let mut camera = OrbitCamera::new();
        camera.handle_scroll(MouseScrollDelta::LineDelta(0.0, 1e6));
        assert_relative_eq!(camera.distance, MIN_DISTANCE);
        camera.handle_scroll(MouseScrollDelta::LineDelta(0.0, -1e9));
        assert_relative_eq!(camera.distance, MAX_DISTANCE);
    }

    #[test]
    fn disabled_camera_ignores_all_input() {
        let mut camera = OrbitCamera::new();
        camera.set_enabled(false);
        drag(&mut camera, (0.0, 0.0), (500.0, 500.0));
        camera.handle_scroll(MouseScrollDelta::LineDelta(0.0, 3.0));
        assert_relative_eq!(camera.yaw, 0.0);
        assert_relative_eq!(camera.pitch, 0.0);
        assert_relative_eq!(camera.distance, 5.0);
    }

    #[test]
    fn enabled_tracks_the_interaction_flag() {
        let mut camera = OrbitCamera::new();
        let mut state = crate::input::InteractionState::default();
        for _ in 0..3 {
            state.orbit_enabled = !state.orbit_enabled;
            // The renderer performs exactly this sync at the top of every frame.
            camera.set_enabled(state.orbit_enabled);
            assert_eq!(camera.enabled, state.orbit_enabled);
        }
    }

    #[test]
    fn disabling_mid_drag_drops_the_drag() {
        let mut camera = OrbitCamera::new();
        camera.handle_mouse_button(MouseButton::Left, ElementState::Pressed);
        camera.handle_cursor_moved(PhysicalPosition::new(10.0, 10.0));
        camera.set_enabled(false);
        camera.set_enabled(true);
        // Re-enabling must not replay the stale cursor delta.
        camera.handle_cursor_moved(PhysicalPosition::new(500.0, 500.0));
        assert_relative_eq!(camera.yaw, 0.0);
    }
}
