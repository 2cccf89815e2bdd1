//! Model rendering passes for the off-screen scene.
//!
//! Two passes live here:
//!
//! - [`ScenePass`] draws the OBJ models with the full light rig and an
//!   environment cubemap, with a per-object [`Shading`] selector (lit,
//!   refract, reflect).
//! - [`FlatPass`] draws unlit textured quads: the two portal stamp planes
//!   and the picture-in-scene quad.
//!
//! Stencil settings are baked into pipeline variants rather than toggled
//! between sub-passes. *Stamp* pipelines write the stencil buffer (compare
//! Always, op Replace, write mask `0xFF`) and are used while building the
//! main scene; *masked* pipelines test it without writing (compare
//! NotEqual, write mask `0x00`) and are used for the portal overlay. The
//! stencil reference value is the one piece of stencil state that stays
//! dynamic, set per draw group on the render pass.
//!
//! Per-draw model uniforms go into one buffer with 256-byte slots addressed
//! by dynamic offsets. All slots for a frame are written before the encoder
//! is submitted (queue writes land ahead of the submitted passes, so
//! rewriting a single slot between draws would not work).

use std::num::NonZeroU64;

use glam::Mat4;

use crate::framebuffer::{COLOR_FORMAT, DEPTH_STENCIL_FORMAT};
use crate::gpu::GpuContext;
use crate::mesh::{Mesh, Transform, Vertex3d};
use crate::model::ObjModel;
use crate::texture::{Cubemap, Texture};

/// Per-object shading selector, matching the scene shader's branch.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Shading {
    /// Textured Blinn-Phong lighting.
    Lit,
    /// Refract the view direction through the surface into the environment
    /// cubemap (glass-like).
    Refract,
    /// Mirror the view direction off the surface into the environment
    /// cubemap (chrome-like).
    Reflect,
}

impl Shading {
    /// The value the shader switches on.
    pub fn as_u32(self) -> u32 {
        match self {
            Shading::Lit => 0,
            Shading::Refract => 1,
            Shading::Reflect => 2,
        }
    }
}

/// Which stencil variant of a pipeline a draw uses.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PassVariant {
    /// Stencil compare Always, op Replace, write mask `0xFF`: the draw
    /// stamps the current stencil reference wherever it passes the depth
    /// test.
    Stamp,
    /// Stencil compare NotEqual, ops Keep, write mask `0x00`: the draw is
    /// confined to pixels whose stencil value differs from the reference
    /// and cannot modify the stencil buffer.
    Masked,
}

/// Stencil state for stamp pipelines.
pub fn stamp_stencil() -> wgpu::StencilState {
    let face = wgpu::StencilFaceState {
        compare: wgpu::CompareFunction::Always,
        fail_op: wgpu::StencilOperation::Keep,
        depth_fail_op: wgpu::StencilOperation::Keep,
        pass_op: wgpu::StencilOperation::Replace,
    };
    wgpu::StencilState {
        front: face,
        back: face,
        read_mask: 0xFF,
        write_mask: 0xFF,
    }
}

/// Stencil state for masked pipelines.
pub fn masked_stencil() -> wgpu::StencilState {
    let face = wgpu::StencilFaceState {
        compare: wgpu::CompareFunction::NotEqual,
        fail_op: wgpu::StencilOperation::Keep,
        depth_fail_op: wgpu::StencilOperation::Keep,
        pass_op: wgpu::StencilOperation::Keep,
    };
    wgpu::StencilState {
        front: face,
        back: face,
        read_mask: 0xFF,
        write_mask: 0x00,
    }
}

/// Depth/stencil state for a scene pipeline variant.
pub fn depth_stencil_state(
    depth_compare: wgpu::CompareFunction,
    variant: PassVariant,
) -> wgpu::DepthStencilState {
    wgpu::DepthStencilState {
        format: DEPTH_STENCIL_FORMAT,
        depth_write_enabled: true,
        depth_compare,
        stencil: match variant {
            PassVariant::Stamp => stamp_stencil(),
            PassVariant::Masked => masked_stencil(),
        },
        bias: wgpu::DepthBiasState::default(),
    }
}

/// Camera uniforms shared by the scene and flat shaders.
#[repr(C)]
#[derive(Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub struct CameraUniforms {
    /// View matrix (world to camera space).
    pub view: [[f32; 4]; 4],
    /// Projection matrix (camera to clip space).
    pub proj: [[f32; 4]; 4],
    /// Camera position in world space, for specular and reflection math.
    pub camera_pos: [f32; 3],
    pub _pad: f32,
}

/// Per-draw model uniforms. One 256-byte slot per draw.
#[repr(C)]
#[derive(Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ModelUniforms {
    /// Model matrix (object to world space).
    pub model: [[f32; 4]; 4],
    /// Inverse transpose of the model matrix, for normals.
    pub normal_matrix: [[f32; 4]; 4],
    /// [`Shading`] selector.
    pub shading: u32,
    pub _pad: [u32; 3],
}

/// Directional light, vec4-packed for WGSL uniform layout.
#[repr(C)]
#[derive(Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub struct DirLight {
    pub direction: [f32; 4],
    pub ambient: [f32; 4],
    pub diffuse: [f32; 4],
    pub specular: [f32; 4],
}

/// Point light; attenuation terms ride in the w components
/// (position.w = constant, ambient.w = linear, diffuse.w = quadratic).
#[repr(C)]
#[derive(Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub struct PointLight {
    pub position: [f32; 4],
    pub ambient: [f32; 4],
    pub diffuse: [f32; 4],
    pub specular: [f32; 4],
}

/// Spotlight; position.w = cos(cutoff), direction.w = cos(outer cutoff),
/// attenuation packed as in [`PointLight`].
#[repr(C)]
#[derive(Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub struct SpotLight {
    pub position: [f32; 4],
    pub direction: [f32; 4],
    pub ambient: [f32; 4],
    pub diffuse: [f32; 4],
    pub specular: [f32; 4],
}

/// The whole light rig: one directional light, four point lights, one
/// spotlight. Written once at startup; the rig is compiled-in scene data.
#[repr(C)]
#[derive(Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub struct LightUniforms {
    pub dir: DirLight,
    pub points: [PointLight; 4],
    pub spot: SpotLight,
}

impl LightUniforms {
    /// The demo's light rig. The spotlight sits at the camera's startup
    /// pose and stays there.
    pub fn rig(camera_pos: [f32; 3], camera_front: [f32; 3]) -> Self {
        const POINT_POSITIONS: [[f32; 3]; 4] = [
            [0.7, 0.2, 2.0],
            [2.3, -3.3, -4.0],
            [-4.0, 2.0, -12.0],
            [0.0, 0.0, -3.0],
        ];
        // Attenuation for a ~50 unit radius.
        const ATTENUATION: [f32; 3] = [1.0, 0.09, 0.032];

        let points = POINT_POSITIONS.map(|p| PointLight {
            position: [p[0], p[1], p[2], ATTENUATION[0]],
            ambient: [0.05, 0.05, 0.05, ATTENUATION[1]],
            diffuse: [0.8, 0.8, 0.8, ATTENUATION[2]],
            specular: [1.0, 1.0, 1.0, 0.0],
        });

        Self {
            dir: DirLight {
                direction: [-0.2, -1.0, -0.3, 0.0],
                ambient: [0.05, 0.05, 0.05, 0.0],
                diffuse: [0.4, 0.4, 0.4, 0.0],
                specular: [0.5, 0.5, 0.5, 0.0],
            },
            points,
            spot: SpotLight {
                position: [
                    camera_pos[0],
                    camera_pos[1],
                    camera_pos[2],
                    12.5f32.to_radians().cos(),
                ],
                direction: [
                    camera_front[0],
                    camera_front[1],
                    camera_front[2],
                    15.0f32.to_radians().cos(),
                ],
                ambient: [0.0, 0.0, 0.0, ATTENUATION[1]],
                diffuse: [1.0, 1.0, 1.0, ATTENUATION[2]],
                specular: [1.0, 1.0, 1.0, ATTENUATION[0]],
            },
        }
    }
}

/// Dynamic-offset slot stride for model uniform buffers.
pub const MODEL_SLOT_STRIDE: u64 = 256;
/// Model uniform slots available per pass per frame.
pub const MAX_MODEL_DRAWS: u64 = 16;

fn model_uniform_buffer(gpu: &GpuContext, label: &str) -> wgpu::Buffer {
    gpu.device.create_buffer(&wgpu::BufferDescriptor {
        label: Some(label),
        size: MODEL_SLOT_STRIDE * MAX_MODEL_DRAWS,
        usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    })
}

fn uniform_layout_entry(binding: u32, dynamic: bool) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
        ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Uniform,
            has_dynamic_offset: dynamic,
            min_binding_size: None,
        },
        count: None,
    }
}

fn texture_layout(
    gpu: &GpuContext,
    dimension: wgpu::TextureViewDimension,
    label: &str,
) -> wgpu::BindGroupLayout {
    gpu.device
        .create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some(label),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: dimension,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        })
}

fn sampled_bind_group(
    gpu: &GpuContext,
    layout: &wgpu::BindGroupLayout,
    view: &wgpu::TextureView,
    sampler: &wgpu::Sampler,
    label: &str,
) -> wgpu::BindGroup {
    gpu.device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some(label),
        layout,
        entries: &[
            wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::TextureView(view),
            },
            wgpu::BindGroupEntry {
                binding: 1,
                resource: wgpu::BindingResource::Sampler(sampler),
            },
        ],
    })
}

/// Renders OBJ models with lighting and environment mapping.
pub struct ScenePass {
    pipeline_stamp: wgpu::RenderPipeline,
    pipeline_masked: wgpu::RenderPipeline,
    camera_buffer: wgpu::Buffer,
    #[allow(dead_code)]
    lights_buffer: wgpu::Buffer,
    frame_bind_group: wgpu::BindGroup,
    model_buffer: wgpu::Buffer,
    model_bind_group: wgpu::BindGroup,
    texture_layout: wgpu::BindGroupLayout,
    env_layout: wgpu::BindGroupLayout,
    white: Texture,
}

impl ScenePass {
    pub fn new(gpu: &GpuContext, lights: &LightUniforms) -> Self {
        let device = &gpu.device;

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Scene Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/scene.wgsl").into()),
        });

        let camera_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Scene Camera Uniforms"),
            size: std::mem::size_of::<CameraUniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let lights_buffer = {
            use wgpu::util::DeviceExt;
            device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Light Rig"),
                contents: bytemuck::cast_slice(&[*lights]),
                usage: wgpu::BufferUsages::UNIFORM,
            })
        };

        let frame_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Scene Frame Layout"),
            entries: &[uniform_layout_entry(0, false), uniform_layout_entry(1, false)],
        });

        let frame_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Scene Frame Bind Group"),
            layout: &frame_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: camera_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: lights_buffer.as_entire_binding(),
                },
            ],
        });

        let model_buffer = model_uniform_buffer(gpu, "Scene Model Uniforms");

        let model_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Scene Model Layout"),
            entries: &[uniform_layout_entry(0, true)],
        });

        let model_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Scene Model Bind Group"),
            layout: &model_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                    buffer: &model_buffer,
                    offset: 0,
                    size: NonZeroU64::new(std::mem::size_of::<ModelUniforms>() as u64),
                }),
            }],
        });

        let texture_layout = texture_layout(gpu, wgpu::TextureViewDimension::D2, "Diffuse Layout");
        let env_layout = texture_layout_cube(gpu);

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Scene Pipeline Layout"),
            bind_group_layouts: &[&frame_layout, &model_layout, &texture_layout, &env_layout],
            push_constant_ranges: &[],
        });

        let pipeline = |variant: PassVariant, label: &str| {
            device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some(label),
                layout: Some(&pipeline_layout),
                vertex: wgpu::VertexState {
                    module: &shader,
                    entry_point: Some("vs"),
                    buffers: &[Vertex3d::LAYOUT],
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
                    // The OBJ assets are not consistently wound.
                    cull_mode: None,
                    ..Default::default()
                },
                depth_stencil: Some(depth_stencil_state(wgpu::CompareFunction::Less, variant)),
                multisample: wgpu::MultisampleState::default(),
                multiview: None,
                cache: None,
            })
        };

        let pipeline_stamp = pipeline(PassVariant::Stamp, "Scene Pipeline (stamp)");
        let pipeline_masked = pipeline(PassVariant::Masked, "Scene Pipeline (masked)");

        let white = Texture::white(gpu);

        Self {
            pipeline_stamp,
            pipeline_masked,
            camera_buffer,
            lights_buffer,
            frame_bind_group,
            model_buffer,
            model_bind_group,
            texture_layout,
            env_layout,
            white,
        }
    }

    /// Upload the frame's camera matrices. Call once per submitted frame.
    pub fn write_camera(&self, gpu: &GpuContext, view: Mat4, proj: Mat4, camera_pos: [f32; 3]) {
        let uniforms = CameraUniforms {
            view: view.to_cols_array_2d(),
            proj: proj.to_cols_array_2d(),
            camera_pos,
            _pad: 0.0,
        };
        gpu.queue
            .write_buffer(&self.camera_buffer, 0, bytemuck::cast_slice(&[uniforms]));
    }

    /// Draw a model. `slot` must be unique among all `ScenePass` draws in
    /// the same submission; the slot's uniforms are written here, before
    /// the encoder is submitted.
    #[allow(clippy::too_many_arguments)]
    pub fn draw_model(
        &self,
        gpu: &GpuContext,
        rpass: &mut wgpu::RenderPass,
        variant: PassVariant,
        slot: u32,
        model: &ObjModel,
        transform: Transform,
        shading: Shading,
        env: &Cubemap,
    ) {
        let model_matrix = transform.matrix();
        let uniforms = ModelUniforms {
            model: model_matrix.to_cols_array_2d(),
            normal_matrix: model_matrix.inverse().transpose().to_cols_array_2d(),
            shading: shading.as_u32(),
            _pad: [0; 3],
        };
        let offset = slot as u64 * MODEL_SLOT_STRIDE;
        gpu.queue
            .write_buffer(&self.model_buffer, offset, bytemuck::cast_slice(&[uniforms]));

        let env_bind_group =
            sampled_bind_group(gpu, &self.env_layout, &env.view, &env.sampler, "Env Bind Group");

        rpass.set_pipeline(match variant {
            PassVariant::Stamp => &self.pipeline_stamp,
            PassVariant::Masked => &self.pipeline_masked,
        });
        rpass.set_bind_group(0, &self.frame_bind_group, &[]);
        rpass.set_bind_group(1, &self.model_bind_group, &[offset as u32]);
        rpass.set_bind_group(3, &env_bind_group, &[]);

        for (mesh, texture) in model.parts() {
            let texture = texture.unwrap_or(&self.white);
            let texture_bind_group = sampled_bind_group(
                gpu,
                &self.texture_layout,
                &texture.view,
                &texture.sampler,
                "Diffuse Bind Group",
            );
            rpass.set_bind_group(2, &texture_bind_group, &[]);
            rpass.set_vertex_buffer(0, mesh.vertex_buffer.slice(..));
            rpass.set_index_buffer(mesh.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
            rpass.draw_indexed(0..mesh.index_count, 0, 0..1);
        }
    }
}

fn texture_layout_cube(gpu: &GpuContext) -> wgpu::BindGroupLayout {
    texture_layout(gpu, wgpu::TextureViewDimension::Cube, "Environment Layout")
}

/// Flat model uniforms: just the model matrix.
#[repr(C)]
#[derive(Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub struct FlatModelUniforms {
    pub model: [[f32; 4]; 4],
}

/// Renders unlit textured quads (the portal stamps and the picture quad).
/// Always a stamp pipeline: these draws exist to write the stencil buffer.
pub struct FlatPass {
    pipeline: wgpu::RenderPipeline,
    camera_buffer: wgpu::Buffer,
    camera_bind_group: wgpu::BindGroup,
    model_buffer: wgpu::Buffer,
    model_bind_group: wgpu::BindGroup,
    texture_layout: wgpu::BindGroupLayout,
    white: Texture,
}

impl FlatPass {
    pub fn new(gpu: &GpuContext) -> Self {
        let device = &gpu.device;

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Flat Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/flat.wgsl").into()),
        });

        let camera_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Flat Camera Uniforms"),
            size: std::mem::size_of::<CameraUniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let camera_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Flat Camera Layout"),
            entries: &[uniform_layout_entry(0, false)],
        });

        let camera_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Flat Camera Bind Group"),
            layout: &camera_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: camera_buffer.as_entire_binding(),
            }],
        });

        let model_buffer = model_uniform_buffer(gpu, "Flat Model Uniforms");

        let model_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Flat Model Layout"),
            entries: &[uniform_layout_entry(0, true)],
        });

        let model_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Flat Model Bind Group"),
            layout: &model_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                    buffer: &model_buffer,
                    offset: 0,
                    size: NonZeroU64::new(std::mem::size_of::<FlatModelUniforms>() as u64),
                }),
            }],
        });

        let texture_layout = texture_layout(gpu, wgpu::TextureViewDimension::D2, "Flat Texture Layout");

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Flat Pipeline Layout"),
            bind_group_layouts: &[&camera_layout, &model_layout, &texture_layout],
            push_constant_ranges: &[],
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Flat Pipeline (stamp)"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs"),
                buffers: &[Vertex3d::LAYOUT],
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
                cull_mode: None,
                ..Default::default()
            },
            depth_stencil: Some(depth_stencil_state(
                wgpu::CompareFunction::Less,
                PassVariant::Stamp,
            )),
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        });

        let white = Texture::white(gpu);

        Self {
            pipeline,
            camera_buffer,
            camera_bind_group,
            model_buffer,
            model_bind_group,
            texture_layout,
            white,
        }
    }

    /// Upload the frame's camera matrices. Call once per submitted frame.
    pub fn write_camera(&self, gpu: &GpuContext, view: Mat4, proj: Mat4, camera_pos: [f32; 3]) {
        let uniforms = CameraUniforms {
            view: view.to_cols_array_2d(),
            proj: proj.to_cols_array_2d(),
            camera_pos,
            _pad: 0.0,
        };
        gpu.queue
            .write_buffer(&self.camera_buffer, 0, bytemuck::cast_slice(&[uniforms]));
    }

    /// Draw an untextured (white) quad. `slot` uniqueness as in
    /// [`ScenePass::draw_model`].
    pub fn draw_plain(
        &self,
        gpu: &GpuContext,
        rpass: &mut wgpu::RenderPass,
        slot: u32,
        mesh: &Mesh,
        transform: Transform,
    ) {
        self.draw(
            gpu,
            rpass,
            slot,
            mesh,
            transform,
            &self.white.view,
            &self.white.sampler,
        );
    }

    /// Draw a quad sampling an arbitrary texture view (the picture quad
    /// samples the capture framebuffer's color attachment).
    #[allow(clippy::too_many_arguments)]
    pub fn draw(
        &self,
        gpu: &GpuContext,
        rpass: &mut wgpu::RenderPass,
        slot: u32,
        mesh: &Mesh,
        transform: Transform,
        view: &wgpu::TextureView,
        sampler: &wgpu::Sampler,
    ) {
        let uniforms = FlatModelUniforms {
            model: transform.matrix().to_cols_array_2d(),
        };
        let offset = slot as u64 * MODEL_SLOT_STRIDE;
        gpu.queue
            .write_buffer(&self.model_buffer, offset, bytemuck::cast_slice(&[uniforms]));

        let texture_bind_group =
            sampled_bind_group(gpu, &self.texture_layout, view, sampler, "Flat Texture");

        rpass.set_pipeline(&self.pipeline);
        rpass.set_bind_group(0, &self.camera_bind_group, &[]);
        rpass.set_bind_group(1, &self.model_bind_group, &[offset as u32]);
        rpass.set_bind_group(2, &texture_bind_group, &[]);
        rpass.set_vertex_buffer(0, mesh.vertex_buffer.slice(..));
        rpass.set_index_buffer(mesh.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
        rpass.draw_indexed(0..mesh.index_count, 0, 0..1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stamp_pipelines_write_the_full_stencil_mask() {
        let s = stamp_stencil();
        assert_eq!(s.write_mask, 0xFF);
        assert_eq!(s.front.compare, wgpu::CompareFunction::Always);
        assert_eq!(s.front.pass_op, wgpu::StencilOperation::Replace);
        // Depth-fail must keep: occluded fragments may not stamp.
        assert_eq!(s.front.depth_fail_op, wgpu::StencilOperation::Keep);
    }

    #[test]
    fn masked_pipelines_are_stencil_read_only() {
        let s = masked_stencil();
        assert_eq!(s.write_mask, 0x00);
        assert_eq!(s.read_mask, 0xFF);
        assert_eq!(s.front.compare, wgpu::CompareFunction::NotEqual);
        assert_eq!(s.front.pass_op, wgpu::StencilOperation::Keep);
    }

    #[test]
    fn scene_depth_compare_is_less() {
        for variant in [PassVariant::Stamp, PassVariant::Masked] {
            let ds = depth_stencil_state(wgpu::CompareFunction::Less, variant);
            assert_eq!(ds.depth_compare, wgpu::CompareFunction::Less);
            assert!(ds.depth_write_enabled);
        }
    }

    #[test]
    fn shading_selector_values_match_the_shader_switch() {
        assert_eq!(Shading::Lit.as_u32(), 0);
        assert_eq!(Shading::Refract.as_u32(), 1);
        assert_eq!(Shading::Reflect.as_u32(), 2);
    }

    #[test]
    fn model_uniforms_fit_one_dynamic_slot() {
        assert!(std::mem::size_of::<ModelUniforms>() as u64 <= MODEL_SLOT_STRIDE);
        assert_eq!(std::mem::size_of::<ModelUniforms>() % 16, 0);
        assert_eq!(std::mem::size_of::<LightUniforms>() % 16, 0);
    }
}
