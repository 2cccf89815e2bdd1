//! Final full-screen composite.
//!
//! The whole composed scene lives in the main framebuffer's color texture;
//! [`CompositePass`] draws one full-screen triangle sampling it onto the
//! window surface, applying the selected [`DisplayMode`].

use winit::keyboard::KeyCode;

use crate::framebuffer::FrameBuffer;
use crate::gpu::GpuContext;

/// How the composite shader presents the scene texture.
///
/// Selected with the number keys; the discriminants are the values the
/// shader switches on.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DisplayMode {
    /// Pass the scene through unchanged.
    #[default]
    Normal = 1,
    /// Invert colors.
    Inverted = 2,
    /// Luminance-weighted grayscale.
    Grayscale = 3,
    /// 3x3 sharpen kernel.
    Sharpen = 4,
    /// 3x3 blur kernel.
    Blur = 5,
}

impl DisplayMode {
    /// Map a digit key to a mode; any other key is `None`, leaving the
    /// current mode untouched.
    pub fn from_key(key: KeyCode) -> Option<Self> {
        match key {
            KeyCode::Digit1 => Some(DisplayMode::Normal),
            KeyCode::Digit2 => Some(DisplayMode::Inverted),
            KeyCode::Digit3 => Some(DisplayMode::Grayscale),
            KeyCode::Digit4 => Some(DisplayMode::Sharpen),
            KeyCode::Digit5 => Some(DisplayMode::Blur),
            _ => None,
        }
    }

    /// The value uploaded to the composite shader.
    pub fn as_uniform(self) -> u32 {
        self as u32
    }
}

#[repr(C)]
#[derive(Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
struct CompositeUniforms {
    mode: u32,
    _pad: [u32; 3],
}

/// Full-screen pass presenting the composed scene with a display mode.
pub struct CompositePass {
    pipeline: wgpu::RenderPipeline,
    uniform_buffer: wgpu::Buffer,
    bind_group_layout: wgpu::BindGroupLayout,
}

impl CompositePass {
    pub fn new(gpu: &GpuContext) -> Self {
        let device = &gpu.device;

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Composite Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/composite.wgsl").into()),
        });

        let uniform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Composite Uniforms"),
            size: std::mem::size_of::<CompositeUniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Composite Bind Group Layout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
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
                        view_dimension: wgpu::TextureViewDimension::D2,
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
            label: Some("Composite Pipeline Layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Composite Pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs"),
                buffers: &[],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: gpu.config.format,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                ..Default::default()
            },
            // The composite runs with depth testing off: no depth/stencil
            // attachment at all.
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        });

        Self {
            pipeline,
            uniform_buffer,
            bind_group_layout,
        }
    }

    /// Draw the full-screen composite sampling `source`'s color attachment.
    pub fn render(
        &self,
        gpu: &GpuContext,
        rpass: &mut wgpu::RenderPass,
        mode: DisplayMode,
        source: &FrameBuffer,
    ) {
        let uniforms = CompositeUniforms {
            mode: mode.as_uniform(),
            _pad: [0; 3],
        };
        gpu.queue
            .write_buffer(&self.uniform_buffer, 0, bytemuck::cast_slice(&[uniforms]));

        let bind_group = gpu.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Composite Bind Group"),
            layout: &self.bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: self.uniform_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(&source.color_view),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::Sampler(&source.sampler),
                },
            ],
        });

        rpass.set_pipeline(&self.pipeline);
        rpass.set_bind_group(0, &bind_group, &[]);
        rpass.draw(0..3, 0..1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn digit_keys_map_to_modes() {
        assert_eq!(DisplayMode::from_key(KeyCode::Digit1), Some(DisplayMode::Normal));
        assert_eq!(DisplayMode::from_key(KeyCode::Digit2), Some(DisplayMode::Inverted));
        assert_eq!(DisplayMode::from_key(KeyCode::Digit3), Some(DisplayMode::Grayscale));
        assert_eq!(DisplayMode::from_key(KeyCode::Digit4), Some(DisplayMode::Sharpen));
        assert_eq!(DisplayMode::from_key(KeyCode::Digit5), Some(DisplayMode::Blur));
    }

    #[test]
    fn non_digit_keys_leave_the_mode_alone() {
        for key in [KeyCode::KeyW, KeyCode::Digit6, KeyCode::Escape, KeyCode::Space] {
            assert_eq!(DisplayMode::from_key(key), None);
        }
    }

    #[test]
    fn uniform_values_are_one_based() {
        assert_eq!(DisplayMode::Normal.as_uniform(), 1);
        assert_eq!(DisplayMode::Blur.as_uniform(), 5);
        assert_eq!(DisplayMode::default(), DisplayMode::Normal);
    }
}
