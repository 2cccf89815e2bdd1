//! Off-screen render targets.
//!
//! A [`FrameBuffer`] owns a sampleable color attachment plus a combined
//! depth/stencil attachment. Both are sized once at construction from the
//! initial window dimensions and are never resized: resizing the window
//! stretches the composited image rather than re-allocating the targets.
//! Known limitation.

use crate::gpu::GpuContext;

/// Color format for off-screen targets. Fixed rather than borrowed from the
/// surface so the scene pipelines are independent of the swapchain format.
pub const COLOR_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8UnormSrgb;

/// Combined depth + stencil format; the stencil aspect carries the portal
/// mask.
pub const DEPTH_STENCIL_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth24PlusStencil8;

/// An off-screen render target with color and depth/stencil attachments.
pub struct FrameBuffer {
    #[allow(dead_code)]
    color: wgpu::Texture,
    /// Color attachment view, also bound as a sampled texture later.
    pub color_view: wgpu::TextureView,
    /// Sampler for reading the color attachment.
    pub sampler: wgpu::Sampler,
    #[allow(dead_code)]
    depth_stencil: wgpu::Texture,
    /// Depth/stencil attachment view.
    pub depth_stencil_view: wgpu::TextureView,
    pub width: u32,
    pub height: u32,
}

impl FrameBuffer {
    /// Create a framebuffer of the given fixed size.
    pub fn new(gpu: &GpuContext, width: u32, height: u32, label: &str) -> Self {
        let color = gpu.device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: COLOR_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
            view_formats: &[],
        });
        let color_view = color.create_view(&wgpu::TextureViewDescriptor::default());

        let depth_stencil = gpu.device.create_texture(&wgpu::TextureDescriptor {
            label: Some(&format!("{} Depth/Stencil", label)),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: DEPTH_STENCIL_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        let depth_stencil_view = depth_stencil.create_view(&wgpu::TextureViewDescriptor::default());

        let sampler = gpu.device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some(&format!("{} Sampler", label)),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });

        Self {
            color,
            color_view,
            sampler,
            depth_stencil,
            depth_stencil_view,
            width,
            height,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn depth_stencil_format_carries_a_stencil_aspect() {
        assert!(DEPTH_STENCIL_FORMAT.has_stencil_aspect());
        assert!(DEPTH_STENCIL_FORMAT.has_depth_aspect());
    }

    #[test]
    fn color_format_is_srgb() {
        assert!(COLOR_FORMAT.is_srgb());
    }
}
