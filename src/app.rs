//! Window, event loop, and per-frame wiring.
//!
//! [`App`] owns all mutable session state (camera, display mode, input,
//! scene) and threads it by reference into the renderer each frame. Events
//! are folded into the [`Input`] snapshot and consumed once per redraw.

use std::sync::Arc;
use std::time::Instant;
use winit::application::ApplicationHandler;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::KeyCode;
use winit::window::{CursorGrabMode, Window, WindowAttributes, WindowId};

use crate::camera::Camera;
use crate::composite::DisplayMode;
use crate::gpu::GpuContext;
use crate::input::Input;
use crate::renderer::Renderer;
use crate::scene::Scene;

/// Window configuration. All of it is compiled-in; there is no runtime
/// configuration surface.
pub struct AppConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            title: "Peephole".to_string(),
            width: 800,
            height: 800,
        }
    }
}

/// Run the demo until the window closes or Escape is pressed.
pub fn run(config: AppConfig) {
    let event_loop = EventLoop::new().expect("Failed to create event loop");
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = App::Pending { config };
    event_loop.run_app(&mut app).expect("Event loop failed");
}

enum App {
    Pending {
        config: AppConfig,
    },
    Running {
        window: Arc<Window>,
        gpu: GpuContext,
        scene: Scene,
        renderer: Renderer,
        camera: Camera,
        input: Input,
        mode: DisplayMode,
        last_frame: Instant,
    },
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if let App::Pending { config } = self {
            let window_attrs = WindowAttributes::default()
                .with_title(&config.title)
                .with_inner_size(winit::dpi::LogicalSize::new(config.width, config.height));

            let window = Arc::new(
                event_loop
                    .create_window(window_attrs)
                    .expect("Failed to create window"),
            );

            // Mouselook wants a captured, hidden cursor; fall back to
            // confining it where locking is unsupported.
            window.set_cursor_visible(false);
            if let Err(e) = window
                .set_cursor_grab(CursorGrabMode::Locked)
                .or_else(|_| window.set_cursor_grab(CursorGrabMode::Confined))
            {
                log::warn!("cursor grab unavailable: {e}");
            }

            let gpu = GpuContext::new(window.clone());

            let scene = match Scene::load(&gpu) {
                Ok(scene) => scene,
                Err(e) => {
                    log::error!("failed to load scene assets: {e}");
                    std::process::exit(1);
                }
            };

            // The frozen startup viewpoint: captured once for the static
            // pre-pass, never updated afterwards.
            let default_camera = Camera::new();

            let renderer = Renderer::new(&gpu, &default_camera);
            renderer.render_capture(&gpu, &scene, &default_camera);

            window.request_redraw();

            *self = App::Running {
                window,
                gpu,
                scene,
                renderer,
                camera: Camera::new(),
                input: Input::new(),
                mode: DisplayMode::default(),
                last_frame: Instant::now(),
            };
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        let App::Running {
            window,
            gpu,
            scene,
            renderer,
            camera,
            input,
            mode,
            last_frame,
        } = self
        else {
            return;
        };

        input.handle_event(&event);

        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }
            WindowEvent::Resized(size) => {
                // Only the surface follows the window; the off-screen
                // framebuffers keep their startup size, so the composited
                // image stretches. Known limitation.
                gpu.resize(size.width, size.height);
            }
            WindowEvent::RedrawRequested => {
                let now = Instant::now();
                let dt = now.duration_since(*last_frame).as_secs_f32();
                *last_frame = now;

                if input.key_down(KeyCode::Escape) {
                    event_loop.exit();
                    return;
                }

                for key in [
                    KeyCode::Digit1,
                    KeyCode::Digit2,
                    KeyCode::Digit3,
                    KeyCode::Digit4,
                    KeyCode::Digit5,
                ] {
                    if input.key_pressed(key) {
                        if let Some(selected) = DisplayMode::from_key(key) {
                            *mode = selected;
                        }
                    }
                }

                camera.update(input, dt);

                match renderer.render_frame(gpu, scene, camera, *mode) {
                    Ok(()) => {}
                    Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                        // Reconfiguring at the current size recreates the
                        // swapchain.
                        gpu.resize(gpu.width(), gpu.height());
                    }
                    Err(wgpu::SurfaceError::OutOfMemory) => {
                        log::error!("out of GPU memory, exiting");
                        event_loop.exit();
                    }
                    Err(e) => {
                        log::warn!("frame skipped: {e}");
                    }
                }

                input.begin_frame();
                window.request_redraw();
            }
            _ => {}
        }
    }
}
