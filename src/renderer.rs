//! The render orchestrator: the fixed per-frame pass sequence.
//!
//! [`Renderer`] owns the two off-screen framebuffers and every pass, and
//! runs the demo's hand-scripted compositing sequence:
//!
//! 1. **Capture** (once, before the loop): the still life plus the primary
//!    skybox rendered into the mini framebuffer with the frozen startup
//!    camera. Its color texture becomes the "picture within the scene".
//! 2. **Main scene pass**: into the main framebuffer. The two portal
//!    planes stamp stencil reference 0, then the picture quad, the Beans
//!    and the primary skybox stamp reference 1 everywhere else they land.
//! 3. **Portal overlay pass**: same framebuffer, depth cleared, color and
//!    stencil kept; masked pipelines draw the alternate scene and the space
//!    skybox only where the stencil differs from 1, i.e. inside the portal
//!    plane shapes.
//! 4. **Composite pass**: the window surface, cleared to white, receives
//!    one full-screen draw sampling the main framebuffer with the current
//!    display mode. The frame always ends on the surface: no off-screen
//!    target is ever left pending across the present.
//!
//! There is no error recovery inside the sequence; a lost surface bubbles
//! up as [`wgpu::SurfaceError`] and anything worse is a GPU fault.

use crate::camera::Camera;
use crate::composite::{CompositePass, DisplayMode};
use crate::framebuffer::FrameBuffer;
use crate::gpu::GpuContext;
use crate::mesh::Transform;
use crate::scene::{self, Scene, SceneObject};
use crate::scene_pass::{FlatPass, LightUniforms, PassVariant, ScenePass};
use crate::skybox::{Skybox, SkyboxPass};
use glam::Vec3;

/// Clear color for the off-screen scene (dark gray).
pub const SCENE_CLEAR: wgpu::Color = wgpu::Color {
    r: 0.05,
    g: 0.05,
    b: 0.05,
    a: 1.0,
};

/// Clear color for the window surface (white).
pub const SURFACE_CLEAR: wgpu::Color = wgpu::Color {
    r: 1.0,
    g: 1.0,
    b: 1.0,
    a: 1.0,
};

/// Owns the framebuffers and passes; executes the frame sequence.
pub struct Renderer {
    main_fb: FrameBuffer,
    mini_fb: FrameBuffer,
    scene_pass: ScenePass,
    flat_pass: FlatPass,
    skybox_pass: SkyboxPass,
    composite_pass: CompositePass,
}

impl Renderer {
    /// Create the renderer. Both framebuffers are sized to the window's
    /// startup dimensions and stay that size for the process lifetime.
    pub fn new(gpu: &GpuContext, default_camera: &Camera) -> Self {
        let lights = LightUniforms::rig(
            default_camera.position.to_array(),
            default_camera.front().to_array(),
        );

        Self {
            main_fb: FrameBuffer::new(gpu, gpu.width(), gpu.height(), "Main Framebuffer"),
            mini_fb: FrameBuffer::new(gpu, gpu.width(), gpu.height(), "Mini Framebuffer"),
            scene_pass: ScenePass::new(gpu, &lights),
            flat_pass: FlatPass::new(gpu),
            skybox_pass: SkyboxPass::new(gpu),
            composite_pass: CompositePass::new(gpu),
        }
    }

    /// Render the one-time static capture into the mini framebuffer using
    /// the frozen default camera. Run once before the frame loop; the
    /// result is treated as immutable scene data afterwards.
    pub fn render_capture(&self, gpu: &GpuContext, scene: &Scene, default_camera: &Camera) {
        let aspect = self.mini_fb.width as f32 / self.mini_fb.height as f32;
        self.scene_pass.write_camera(
            gpu,
            default_camera.view_matrix(),
            default_camera.projection_matrix(aspect),
            default_camera.position.to_array(),
        );
        self.skybox_pass.write_uniforms(
            gpu,
            default_camera.projection_matrix(aspect),
            default_camera.sky_view_matrix(),
        );

        let mut encoder = gpu
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Capture Encoder"),
            });

        {
            let mut rpass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Capture Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &self.mini_fb.color_view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(SCENE_CLEAR),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.mini_fb.depth_stencil_view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(0),
                        store: wgpu::StoreOp::Store,
                    }),
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            // Masked pipelines over a zeroed stencil pass everywhere with
            // reference 1 and cannot write; the capture needs no stencil
            // effect of its own.
            rpass.set_stencil_reference(1);
            self.draw_sub_scene(
                gpu,
                &mut rpass,
                PassVariant::Masked,
                scene,
                &scene.skybox,
                &scene::CAPTURE_OBJECTS,
                0,
            );
        }

        gpu.queue.submit(std::iter::once(encoder.finish()));
        log::info!("static capture rendered");
    }

    /// Execute one frame: main scene, portal overlay, composite, present.
    pub fn render_frame(
        &self,
        gpu: &GpuContext,
        scene: &Scene,
        camera: &Camera,
        mode: DisplayMode,
    ) -> Result<(), wgpu::SurfaceError> {
        let output = gpu.surface.get_current_texture()?;
        let surface_view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        // Per-frame uniforms, shared by both off-screen passes.
        let view = camera.view_matrix();
        let proj = camera.projection_matrix(gpu.aspect());
        let camera_pos = camera.position.to_array();
        self.scene_pass.write_camera(gpu, view, proj, camera_pos);
        self.flat_pass.write_camera(gpu, view, proj, camera_pos);
        self.skybox_pass
            .write_uniforms(gpu, proj, camera.sky_view_matrix());

        let mut encoder = gpu
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Frame Encoder"),
            });

        // Main scene: clear everything, stamp the stencil.
        {
            let mut rpass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Main Scene Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &self.main_fb.color_view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(SCENE_CLEAR),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.main_fb.depth_stencil_view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(0),
                        store: wgpu::StoreOp::Store,
                    }),
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            // The portal planes stamp reference 0. Their depth writes
            // shield these pixels from the reference-1 stamps below, which
            // is what carves the portal shapes out of the mask.
            rpass.set_stencil_reference(0);
            for (i, plane) in scene::PORTAL_PLANES.iter().enumerate() {
                self.flat_pass.draw_plain(
                    gpu,
                    &mut rpass,
                    i as u32,
                    &scene.quad,
                    Transform {
                        position: Vec3::from_array(*plane),
                        ..Default::default()
                    },
                );
            }

            // Everything else stamps reference 1.
            rpass.set_stencil_reference(1);
            self.flat_pass.draw(
                gpu,
                &mut rpass,
                2,
                &scene.quad,
                Transform {
                    position: Vec3::from_array(scene::PICTURE_QUAD),
                    ..Default::default()
                },
                &self.mini_fb.color_view,
                &self.mini_fb.sampler,
            );

            self.draw_sub_scene(
                gpu,
                &mut rpass,
                PassVariant::Stamp,
                scene,
                &scene.skybox,
                &scene::MAIN_OBJECTS,
                0,
            );
        }

        // Portal overlay: keep color and stencil, restart depth, draw the
        // alternate scene only where the stencil differs from 1.
        {
            let mut rpass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Portal Overlay Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &self.main_fb.color_view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Load,
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.main_fb.depth_stencil_view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Load,
                        store: wgpu::StoreOp::Store,
                    }),
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            rpass.set_stencil_reference(1);
            self.draw_sub_scene(
                gpu,
                &mut rpass,
                PassVariant::Masked,
                scene,
                &scene.spacebox,
                &scene::PORTAL_OBJECTS,
                scene::MAIN_OBJECTS.len() as u32,
            );
        }

        // Composite to the surface. Depth testing is off (no attachment);
        // this pass leaves the default target as the bound one, so the
        // frame ends presentable.
        {
            let mut rpass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Composite Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &surface_view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(SURFACE_CLEAR),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            self.composite_pass
                .render(gpu, &mut rpass, mode, &self.main_fb);
        }

        gpu.queue.submit(std::iter::once(encoder.finish()));
        output.present();

        Ok(())
    }

    /// Draw one sub-scene: a set of model placements against a skybox.
    /// Used for the capture, the main scene and the portal overlay; the
    /// three differ only in object set, skybox, and pipeline variant.
    #[allow(clippy::too_many_arguments)]
    fn draw_sub_scene(
        &self,
        gpu: &GpuContext,
        rpass: &mut wgpu::RenderPass,
        variant: PassVariant,
        scene: &Scene,
        skybox: &Skybox,
        objects: &[SceneObject],
        slot_base: u32,
    ) {
        for (i, object) in objects.iter().enumerate() {
            self.scene_pass.draw_model(
                gpu,
                rpass,
                variant,
                slot_base + i as u32,
                scene.model(object.kind),
                object.transform,
                object.shading,
                &skybox.cubemap,
            );
        }
        self.skybox_pass.draw(gpu, rpass, variant, skybox);
    }
}
