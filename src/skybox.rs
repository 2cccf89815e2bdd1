//! Cubemap skybox rendering.
//!
//! A [`Skybox`] is just a cubemap; [`SkyboxPass`] owns the 36-vertex cube
//! and the pipelines that draw it. The vertex shader pins the cube to the
//! far plane (`clip.xyww`), and the pipelines compare depth with LessEqual
//! so those max-depth fragments still pass. That relaxed compare exists
//! only in the skybox pipelines; the scene pipelines keep comparing Less.
//!
//! The skybox view matrix must have its translation stripped (see
//! [`Camera::sky_view_matrix`](crate::Camera::sky_view_matrix)) so the sky
//! rotates with the camera but never moves.

use glam::Mat4;

use crate::framebuffer::{COLOR_FORMAT, DEPTH_STENCIL_FORMAT};
use crate::gpu::GpuContext;
use crate::scene_pass::{PassVariant, masked_stencil, stamp_stencil};
use crate::texture::Cubemap;

/// A skybox: a cubemap sampled along view directions.
pub struct Skybox {
    pub cubemap: Cubemap,
}

impl Skybox {
    /// Load a skybox's six faces from a directory (see
    /// [`Cubemap::from_dir`]).
    pub fn from_dir(gpu: &GpuContext, dir: &str) -> Self {
        Self {
            cubemap: Cubemap::from_dir(gpu, dir),
        }
    }
}

/// Skybox uniforms: projection plus the translation-stripped view.
#[repr(C)]
#[derive(Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub struct SkyUniforms {
    pub proj: [[f32; 4]; 4],
    pub view: [[f32; 4]; 4],
}

/// Position-only vertex for the skybox cube.
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
struct SkyVertex {
    position: [f32; 3],
}

impl SkyVertex {
    const LAYOUT: wgpu::VertexBufferLayout<'static> = wgpu::VertexBufferLayout {
        array_stride: std::mem::size_of::<SkyVertex>() as u64,
        step_mode: wgpu::VertexStepMode::Vertex,
        attributes: &[wgpu::VertexAttribute {
            offset: 0,
            shader_location: 0,
            format: wgpu::VertexFormat::Float32x3,
        }],
    };
}

/// The depth compare used by skybox pipelines.
pub const SKYBOX_DEPTH_COMPARE: wgpu::CompareFunction = wgpu::CompareFunction::LessEqual;

/// Depth/stencil state for a skybox pipeline variant.
pub fn sky_depth_stencil_state(variant: PassVariant) -> wgpu::DepthStencilState {
    wgpu::DepthStencilState {
        format: DEPTH_STENCIL_FORMAT,
        // The sky sits at max depth behind everything; it never needs to
        // write depth.
        depth_write_enabled: false,
        depth_compare: SKYBOX_DEPTH_COMPARE,
        stencil: match variant {
            PassVariant::Stamp => stamp_stencil(),
            PassVariant::Masked => masked_stencil(),
        },
        bias: wgpu::DepthBiasState::default(),
    }
}

/// Draws a cubemap skybox as the scene background.
pub struct SkyboxPass {
    pipeline_stamp: wgpu::RenderPipeline,
    pipeline_masked: wgpu::RenderPipeline,
    vertex_buffer: wgpu::Buffer,
    uniform_buffer: wgpu::Buffer,
    bind_group_layout: wgpu::BindGroupLayout,
}

impl SkyboxPass {
    pub fn new(gpu: &GpuContext) -> Self {
        use wgpu::util::DeviceExt;

        let device = &gpu.device;

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Skybox Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/skybox.wgsl").into()),
        });

        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Skybox Cube"),
            contents: bytemuck::cast_slice(&cube_vertices()),
            usage: wgpu::BufferUsages::VERTEX,
        });

        let uniform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Skybox Uniforms"),
            size: std::mem::size_of::<SkyUniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Skybox Bind Group Layout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::Cube,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 2,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Skybox Pipeline Layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let pipeline = |variant: PassVariant, label: &str| {
            device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some(label),
                layout: Some(&pipeline_layout),
                vertex: wgpu::VertexState {
                    module: &shader,
                    entry_point: Some("vs"),
                    buffers: &[SkyVertex::LAYOUT],
                    compilation_options: Default::default(),
                },
                fragment: Some(wgpu::FragmentState {
                    module: &shader,
                    entry_point: Some("fs"),
                    targets: &[Some(wgpu::ColorTargetState {
                        format: COLOR_FORMAT,
                        blend: Some(wgpu::BlendState::REPLACE),
                        write_mask: wgpu::ColorWrites::ALL,
                    })],
                    compilation_options: Default::default(),
                }),
                primitive: wgpu::PrimitiveState {
                    topology: wgpu::PrimitiveTopology::TriangleList,
                    // Viewed from inside the cube.
                    cull_mode: None,
                    ..Default::default()
                },
                depth_stencil: Some(sky_depth_stencil_state(variant)),
                multisample: wgpu::MultisampleState::default(),
                multiview: None,
                cache: None,
            })
        };

        let pipeline_stamp = pipeline(PassVariant::Stamp, "Skybox Pipeline (stamp)");
        let pipeline_masked = pipeline(PassVariant::Masked, "Skybox Pipeline (masked)");

        Self {
            pipeline_stamp,
            pipeline_masked,
            vertex_buffer,
            uniform_buffer,
            bind_group_layout,
        }
    }

    /// Upload projection and the translation-stripped view. Call once per
    /// submitted frame; both skybox draws of a frame share these uniforms.
    pub fn write_uniforms(&self, gpu: &GpuContext, proj: Mat4, sky_view: Mat4) {
        let uniforms = SkyUniforms {
            proj: proj.to_cols_array_2d(),
            view: sky_view.to_cols_array_2d(),
        };
        gpu.queue
            .write_buffer(&self.uniform_buffer, 0, bytemuck::cast_slice(&[uniforms]));
    }

    /// Draw the skybox cube.
    pub fn draw(
        &self,
        gpu: &GpuContext,
        rpass: &mut wgpu::RenderPass,
        variant: PassVariant,
        skybox: &Skybox,
    ) {
        let bind_group = gpu.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Skybox Bind Group"),
            layout: &self.bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: self.uniform_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(&skybox.cubemap.view),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::Sampler(&skybox.cubemap.sampler),
                },
            ],
        });

        rpass.set_pipeline(match variant {
            PassVariant::Stamp => &self.pipeline_stamp,
            PassVariant::Masked => &self.pipeline_masked,
        });
        rpass.set_bind_group(0, &bind_group, &[]);
        rpass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
        rpass.draw(0..36, 0..1);
    }
}

/// The 36 vertices of a unit skybox cube, viewed from inside.
fn cube_vertices() -> [SkyVertex; 36] {
    #[rustfmt::skip]
    const POSITIONS: [[f32; 3]; 36] = [
        // -Z
        [-1.0,  1.0, -1.0], [-1.0, -1.0, -1.0], [ 1.0, -1.0, -1.0],
        [ 1.0, -1.0, -1.0], [ 1.0,  1.0, -1.0], [-1.0,  1.0, -1.0],
        // -X
        [-1.0, -1.0,  1.0], [-1.0, -1.0, -1.0], [-1.0,  1.0, -1.0],
        [-1.0,  1.0, -1.0], [-1.0,  1.0,  1.0], [-1.0, -1.0,  1.0],
        // +X
        [ 1.0, -1.0, -1.0], [ 1.0, -1.0,  1.0], [ 1.0,  1.0,  1.0],
        [ 1.0,  1.0,  1.0], [ 1.0,  1.0, -1.0], [ 1.0, -1.0, -1.0],
        // +Z
        [-1.0, -1.0,  1.0], [-1.0,  1.0,  1.0], [ 1.0,  1.0,  1.0],
        [ 1.0,  1.0,  1.0], [ 1.0, -1.0,  1.0], [-1.0, -1.0,  1.0],
        // +Y
        [-1.0,  1.0, -1.0], [ 1.0,  1.0, -1.0], [ 1.0,  1.0,  1.0],
        [ 1.0,  1.0,  1.0], [-1.0,  1.0,  1.0], [-1.0,  1.0, -1.0],
        // -Y
        [-1.0, -1.0, -1.0], [-1.0, -1.0,  1.0], [ 1.0, -1.0, -1.0],
        [ 1.0, -1.0, -1.0], [-1.0, -1.0,  1.0], [ 1.0, -1.0,  1.0],
    ];

    POSITIONS.map(|position| SkyVertex { position })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn skybox_depth_compare_is_less_equal() {
        // The cube renders at max depth; Less would reject every fragment
        // against a cleared depth buffer's 1.0.
        assert_eq!(SKYBOX_DEPTH_COMPARE, wgpu::CompareFunction::LessEqual);
        for variant in [PassVariant::Stamp, PassVariant::Masked] {
            let ds = sky_depth_stencil_state(variant);
            assert_eq!(ds.depth_compare, wgpu::CompareFunction::LessEqual);
            assert!(!ds.depth_write_enabled);
        }
    }

    #[test]
    fn masked_skybox_cannot_touch_the_stencil() {
        assert_eq!(sky_depth_stencil_state(PassVariant::Masked).stencil.write_mask, 0x00);
        assert_eq!(sky_depth_stencil_state(PassVariant::Stamp).stencil.write_mask, 0xFF);
    }

    #[test]
    fn cube_has_twelve_triangles() {
        let verts = cube_vertices();
        assert_eq!(verts.len(), 36);
        // Every vertex sits on the unit cube surface.
        for v in &verts {
            assert!(v.position.iter().any(|c| c.abs() == 1.0));
        }
    }
}
