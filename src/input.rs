//! Per-frame input snapshot.
//!
//! Window events are folded into an [`Input`] snapshot as they arrive; the
//! frame loop reads the snapshot once per frame and calls
//! [`Input::begin_frame`] afterwards to reset the per-frame deltas. Camera
//! movement and display-mode selection consume this snapshot rather than
//! mutating state from inside event callbacks.

use std::collections::HashSet;

use glam::Vec2;
use winit::event::{ElementState, WindowEvent};
use winit::keyboard::{KeyCode, PhysicalKey};

/// Tracks keyboard and mouse state for the current frame.
pub struct Input {
    keys_down: HashSet<KeyCode>,
    keys_pressed: HashSet<KeyCode>,
    mouse_position: Vec2,
    mouse_delta: Vec2,
    scroll_delta: Vec2,
    first_mouse: bool,
}

impl Default for Input {
    fn default() -> Self {
        Self {
            keys_down: HashSet::new(),
            keys_pressed: HashSet::new(),
            mouse_position: Vec2::ZERO,
            mouse_delta: Vec2::ZERO,
            scroll_delta: Vec2::ZERO,
            first_mouse: true,
        }
    }
}

impl Input {
    pub fn new() -> Self {
        Self::default()
    }

    /// Call at the end of each frame to reset per-frame state.
    pub fn begin_frame(&mut self) {
        self.keys_pressed.clear();
        self.mouse_delta = Vec2::ZERO;
        self.scroll_delta = Vec2::ZERO;
    }

    /// Process a window event and update input state.
    pub fn handle_event(&mut self, event: &WindowEvent) {
        match event {
            WindowEvent::KeyboardInput { event, .. } => {
                if let PhysicalKey::Code(key) = event.physical_key {
                    match event.state {
                        ElementState::Pressed => {
                            if !self.keys_down.contains(&key) {
                                self.keys_pressed.insert(key);
                            }
                            self.keys_down.insert(key);
                        }
                        ElementState::Released => {
                            self.keys_down.remove(&key);
                        }
                    }
                }
            }
            WindowEvent::CursorMoved { position, .. } => {
                let new_pos = Vec2::new(position.x as f32, position.y as f32);
                // The first cursor event carries an arbitrary absolute
                // position; treating it as a delta would snap the camera.
                if self.first_mouse {
                    self.first_mouse = false;
                } else {
                    self.mouse_delta += new_pos - self.mouse_position;
                }
                self.mouse_position = new_pos;
            }
            WindowEvent::MouseWheel { delta, .. } => {
                let d = match delta {
                    winit::event::MouseScrollDelta::LineDelta(x, y) => Vec2::new(*x, *y),
                    winit::event::MouseScrollDelta::PixelDelta(pos) => {
                        Vec2::new(pos.x as f32, pos.y as f32) / 120.0
                    }
                };
                self.scroll_delta += d;
            }
            _ => {}
        }
    }

    /// Returns true if the key is currently held down.
    pub fn key_down(&self, key: KeyCode) -> bool {
        self.keys_down.contains(&key)
    }

    /// Returns true if the key was pressed this frame.
    pub fn key_pressed(&self, key: KeyCode) -> bool {
        self.keys_pressed.contains(&key)
    }

    /// Current mouse position in window coordinates.
    pub fn mouse_position(&self) -> Vec2 {
        self.mouse_position
    }

    /// Mouse movement delta this frame.
    pub fn mouse_delta(&self) -> Vec2 {
        self.mouse_delta
    }

    /// Scroll wheel delta this frame (in "lines").
    pub fn scroll_delta(&self) -> Vec2 {
        self.scroll_delta
    }

    /// Mark a key as held down without a window event. winit's `KeyEvent`
    /// cannot be constructed outside the library, so tests inject key state
    /// directly.
    #[cfg(test)]
    pub(crate) fn press_key(&mut self, key: KeyCode) {
        if !self.keys_down.contains(&key) {
            self.keys_pressed.insert(key);
        }
        self.keys_down.insert(key);
    }

    /// Inject a mouse delta directly, for tests.
    #[cfg(test)]
    pub(crate) fn push_mouse_delta(&mut self, delta: Vec2) {
        self.mouse_delta += delta;
    }

    /// Inject a scroll delta directly, for tests.
    #[cfg(test)]
    pub(crate) fn push_scroll_delta(&mut self, delta: Vec2) {
        self.scroll_delta += delta;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use winit::dpi::PhysicalPosition;
    use winit::event::MouseScrollDelta;

    fn cursor_moved(x: f64, y: f64) -> WindowEvent {
        WindowEvent::CursorMoved {
            device_id: winit::event::DeviceId::dummy(),
            position: PhysicalPosition::new(x, y),
        }
    }

    #[test]
    fn first_cursor_event_produces_no_delta() {
        let mut input = Input::new();
        input.handle_event(&cursor_moved(400.0, 300.0));
        assert_eq!(input.mouse_delta(), Vec2::ZERO);

        input.handle_event(&cursor_moved(450.0, 300.0));
        assert_eq!(input.mouse_delta(), Vec2::new(50.0, 0.0));
    }

    #[test]
    fn mouse_deltas_accumulate_within_a_frame_and_reset_after() {
        let mut input = Input::new();
        input.handle_event(&cursor_moved(0.0, 0.0));
        input.handle_event(&cursor_moved(10.0, 5.0));
        input.handle_event(&cursor_moved(30.0, 5.0));
        assert_eq!(input.mouse_delta(), Vec2::new(30.0, 5.0));

        input.begin_frame();
        assert_eq!(input.mouse_delta(), Vec2::ZERO);
        assert_eq!(input.mouse_position(), Vec2::new(30.0, 5.0));
    }

    #[test]
    fn scroll_accumulates_and_resets() {
        let mut input = Input::new();
        input.handle_event(&WindowEvent::MouseWheel {
            device_id: winit::event::DeviceId::dummy(),
            delta: MouseScrollDelta::LineDelta(0.0, 1.0),
            phase: winit::event::TouchPhase::Moved,
        });
        input.handle_event(&WindowEvent::MouseWheel {
            device_id: winit::event::DeviceId::dummy(),
            delta: MouseScrollDelta::LineDelta(0.0, 2.0),
            phase: winit::event::TouchPhase::Moved,
        });
        assert_eq!(input.scroll_delta(), Vec2::new(0.0, 3.0));

        input.begin_frame();
        assert_eq!(input.scroll_delta(), Vec2::ZERO);
    }
}
