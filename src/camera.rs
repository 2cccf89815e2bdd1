//! A first-person freelook camera.
//!
//! [`Camera`] holds position, yaw/pitch orientation, and zoom (field of
//! view), all in degrees. Once per frame it consumes the [`Input`] snapshot:
//! WASD translates along the view axes scaled by elapsed time, mouse motion
//! turns yaw/pitch with the pitch clamped short of the poles, and the scroll
//! wheel adjusts zoom within a fixed range.
//!
//! The view matrix is derived from position and orientation on every call;
//! nothing is cached.

use glam::{Mat3, Mat4, Vec3};
use winit::keyboard::KeyCode;

use crate::input::Input;

/// Pitch is clamped to ±this many degrees to avoid gimbal flip at the poles.
pub const PITCH_LIMIT: f32 = 89.0;
/// Zoom (vertical field of view) range in degrees.
pub const ZOOM_MIN: f32 = 1.0;
pub const ZOOM_MAX: f32 = 45.0;

/// A freelook camera with yaw/pitch orientation and adjustable zoom.
///
/// Angles and field of view are in degrees. Yaw −90° looks toward −Z.
#[derive(Clone, Copy, Debug)]
pub struct Camera {
    /// World-space position.
    pub position: Vec3,
    /// Horizontal angle in degrees. −90 = looking toward −Z.
    pub yaw: f32,
    /// Vertical angle in degrees. 0 = horizontal, positive = up.
    pub pitch: f32,
    /// Vertical field of view in degrees.
    pub zoom: f32,
    /// Movement speed in world units per second.
    pub speed: f32,
    /// Mouse sensitivity in degrees per pixel of cursor motion.
    pub sensitivity: f32,
    /// Invert vertical mouse look.
    pub invert_y: bool,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            position: Vec3::new(0.0, 0.0, 3.0),
            yaw: -90.0,
            pitch: 0.0,
            zoom: 45.0,
            speed: 2.5,
            sensitivity: 0.1,
            invert_y: false,
        }
    }
}

impl Camera {
    /// Create a camera with the default pose: at (0, 0, 3) looking toward −Z.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the camera position.
    pub fn position(mut self, position: impl Into<Vec3>) -> Self {
        self.position = position.into();
        self
    }

    /// Set yaw and pitch in degrees. Pitch is clamped to ±[`PITCH_LIMIT`].
    pub fn orientation(mut self, yaw: f32, pitch: f32) -> Self {
        self.yaw = yaw;
        self.pitch = pitch.clamp(-PITCH_LIMIT, PITCH_LIMIT);
        self
    }

    /// Set mouse sensitivity in degrees per pixel.
    pub fn sensitivity(mut self, sensitivity: f32) -> Self {
        self.sensitivity = sensitivity;
        self
    }

    /// Set movement speed in world units per second.
    pub fn speed(mut self, speed: f32) -> Self {
        self.speed = speed;
        self
    }

    /// The forward direction derived from yaw and pitch.
    pub fn front(&self) -> Vec3 {
        let (yaw, pitch) = (self.yaw.to_radians(), self.pitch.to_radians());
        Vec3::new(
            yaw.cos() * pitch.cos(),
            pitch.sin(),
            yaw.sin() * pitch.cos(),
        )
        .normalize_or_zero()
    }

    /// The right direction (for strafing), horizontal regardless of pitch.
    pub fn right(&self) -> Vec3 {
        self.front().cross(Vec3::Y).normalize_or_zero()
    }

    /// Consume the frame's input snapshot: mouse look, scroll zoom, WASD
    /// movement scaled by `dt` seconds.
    pub fn update(&mut self, input: &Input, dt: f32) {
        let delta = input.mouse_delta();
        self.yaw += delta.x * self.sensitivity;
        let pitch_delta = delta.y * self.sensitivity;
        if self.invert_y {
            self.pitch += pitch_delta;
        } else {
            self.pitch -= pitch_delta;
        }
        self.pitch = self.pitch.clamp(-PITCH_LIMIT, PITCH_LIMIT);

        self.zoom = (self.zoom - input.scroll_delta().y).clamp(ZOOM_MIN, ZOOM_MAX);

        let front = self.front();
        let right = self.right();
        let velocity = self.speed * dt;

        if input.key_down(KeyCode::KeyW) {
            self.position += front * velocity;
        }
        if input.key_down(KeyCode::KeyS) {
            self.position -= front * velocity;
        }
        if input.key_down(KeyCode::KeyA) {
            self.position -= right * velocity;
        }
        if input.key_down(KeyCode::KeyD) {
            self.position += right * velocity;
        }
    }

    /// The view matrix, computed fresh from position and orientation.
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.position + self.front(), Vec3::Y)
    }

    /// The view matrix with translation stripped, for skybox rendering:
    /// the skybox must follow the camera's rotation but never its position.
    pub fn sky_view_matrix(&self) -> Mat4 {
        Mat4::from_mat3(Mat3::from_mat4(self.view_matrix()))
    }

    /// The perspective projection for the current zoom, with wgpu's 0..1
    /// depth range.
    pub fn projection_matrix(&self, aspect: f32) -> Mat4 {
        Mat4::perspective_rh(self.zoom.to_radians(), aspect, 0.1, 100.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::{Vec2, Vec4};

    #[test]
    fn yaw_tracks_mouse_delta_position_unchanged() {
        let mut cam = Camera::new();
        let start_pos = cam.position;
        let start_yaw = cam.yaw;

        let mut input = Input::new();
        input.push_mouse_delta(Vec2::new(50.0, 0.0));
        cam.update(&input, 0.016);

        assert_eq!(cam.yaw, start_yaw + 50.0 * cam.sensitivity);
        assert_eq!(cam.position, start_pos);
        assert_eq!(cam.pitch, 0.0);
    }

    #[test]
    fn pitch_stays_clamped_for_arbitrarily_large_input() {
        let mut cam = Camera::new();
        for _ in 0..100 {
            let mut input = Input::new();
            input.push_mouse_delta(Vec2::new(0.0, -10_000.0));
            cam.update(&input, 0.016);
            assert!(cam.pitch <= PITCH_LIMIT);
        }
        for _ in 0..100 {
            let mut input = Input::new();
            input.push_mouse_delta(Vec2::new(0.0, 10_000.0));
            cam.update(&input, 0.016);
            assert!(cam.pitch >= -PITCH_LIMIT);
        }
    }

    #[test]
    fn zoom_clamps_to_range() {
        let mut cam = Camera::new();
        let mut input = Input::new();
        input.push_scroll_delta(Vec2::new(0.0, 1000.0));
        cam.update(&input, 0.016);
        assert_eq!(cam.zoom, ZOOM_MIN);

        let mut input = Input::new();
        input.push_scroll_delta(Vec2::new(0.0, -1000.0));
        cam.update(&input, 0.016);
        assert_eq!(cam.zoom, ZOOM_MAX);
    }

    #[test]
    fn wasd_moves_along_view_axes() {
        let mut cam = Camera::new();
        let mut input = Input::new();
        input.press_key(KeyCode::KeyW);
        cam.update(&input, 2.0);

        // Default pose looks toward -Z, so W moves -Z by speed * dt.
        let expected = Vec3::new(0.0, 0.0, 3.0 - cam.speed * 2.0);
        assert!((cam.position - expected).length() < 1e-4);

        let mut cam = Camera::new();
        let mut input = Input::new();
        input.press_key(KeyCode::KeyD);
        cam.update(&input, 1.0);
        assert!((cam.position.x - cam.speed).abs() < 1e-4);
        assert!((cam.position.z - 3.0).abs() < 1e-4);
    }

    #[test]
    fn default_front_is_negative_z() {
        let cam = Camera::new();
        assert!((cam.front() - Vec3::NEG_Z).length() < 1e-6);
    }

    #[test]
    fn view_matrix_is_recomputed_not_cached() {
        let mut cam = Camera::new();
        let before = cam.view_matrix();
        cam.position += Vec3::X;
        let after = cam.view_matrix();
        assert_ne!(before, after);
    }

    #[test]
    fn sky_view_has_no_translation() {
        let cam = Camera::new().position([5.0, -2.0, 10.0]);
        let sky = cam.sky_view_matrix();
        assert_eq!(sky.w_axis, Vec4::new(0.0, 0.0, 0.0, 1.0));
    }
}
