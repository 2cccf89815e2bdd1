//! GPU textures: 2D images and cubemaps.
//!
//! Cubemaps are assembled from six face images in a directory. A missing or
//! undecodable face is logged and left zeroed rather than aborting the load;
//! the rest of the cubemap still works.

use std::path::{Path, PathBuf};

use crate::gpu::GpuContext;

/// A 2D GPU texture that can be bound to shaders.
#[derive(Debug)]
pub struct Texture {
    #[allow(dead_code)]
    pub(crate) texture: wgpu::Texture,
    pub(crate) view: wgpu::TextureView,
    pub(crate) sampler: wgpu::Sampler,
    pub width: u32,
    pub height: u32,
}

impl Texture {
    /// Create a texture from raw RGBA data.
    pub fn from_rgba(gpu: &GpuContext, data: &[u8], width: u32, height: u32, label: &str) -> Self {
        use wgpu::util::DeviceExt;

        let texture = gpu.device.create_texture_with_data(
            &gpu.queue,
            &wgpu::TextureDescriptor {
                label: Some(label),
                size: wgpu::Extent3d {
                    width,
                    height,
                    depth_or_array_layers: 1,
                },
                mip_level_count: 1,
                sample_count: 1,
                dimension: wgpu::TextureDimension::D2,
                format: wgpu::TextureFormat::Rgba8UnormSrgb,
                usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
                view_formats: &[],
            },
            wgpu::util::TextureDataOrder::LayerMajor,
            data,
        );

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

        let sampler = gpu.device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some(&format!("{} Sampler", label)),
            address_mode_u: wgpu::AddressMode::Repeat,
            address_mode_v: wgpu::AddressMode::Repeat,
            address_mode_w: wgpu::AddressMode::Repeat,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });

        Self {
            texture,
            view,
            sampler,
            width,
            height,
        }
    }

    /// Load a texture from an image file.
    pub fn from_file(gpu: &GpuContext, path: impl AsRef<Path>) -> Result<Self, image::ImageError> {
        let path = path.as_ref();
        log::debug!("loading texture {}", path.display());
        let img = image::open(path)?.to_rgba8();
        let (width, height) = img.dimensions();
        Ok(Self::from_rgba(
            gpu,
            &img,
            width,
            height,
            &path.display().to_string(),
        ))
    }

    /// A 1x1 white texture, for untextured draws.
    pub fn white(gpu: &GpuContext) -> Self {
        Self::from_rgba(gpu, &[255, 255, 255, 255], 1, 1, "White Texture")
    }
}

/// Cube face file stems in wgpu layer order: +X, −X, +Y, −Y, +Z, −Z.
pub const FACE_FILES: [&str; 6] = ["right", "left", "top", "bottom", "front", "back"];

/// File extensions tried for each cubemap face, in order.
const FACE_EXTENSIONS: [&str; 2] = ["jpg", "png"];

/// A cubemap texture assembled from six face images.
#[derive(Debug)]
pub struct Cubemap {
    #[allow(dead_code)]
    pub(crate) texture: wgpu::Texture,
    pub(crate) view: wgpu::TextureView,
    pub(crate) sampler: wgpu::Sampler,
}

impl Cubemap {
    /// Load the six faces `right/left/top/bottom/front/back` from a
    /// directory. A face that is missing or fails to decode is reported via
    /// `log::warn!` and left zeroed; loading continues with the remaining
    /// faces. The face size is taken from the first face that loads
    /// (falling back to 1x1 if none do).
    pub fn from_dir(gpu: &GpuContext, dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();

        let mut faces: [Option<image::RgbaImage>; 6] = Default::default();
        for (i, stem) in FACE_FILES.iter().enumerate() {
            match Self::load_face(dir, stem) {
                Some(img) => faces[i] = Some(img),
                None => {
                    log::warn!("cubemap face failed to load: {}/{}", dir.display(), stem);
                }
            }
        }

        let (width, height) = faces
            .iter()
            .flatten()
            .next()
            .map(|img| img.dimensions())
            .unwrap_or((1, 1));

        let face_bytes = (width * height * 4) as usize;
        let mut data = vec![0u8; face_bytes * 6];
        for (i, face) in faces.iter().enumerate() {
            if let Some(img) = face {
                if img.dimensions() == (width, height) {
                    data[i * face_bytes..(i + 1) * face_bytes].copy_from_slice(img);
                } else {
                    log::warn!(
                        "cubemap face {}/{} is {}x{}, expected {}x{}; leaving it unset",
                        dir.display(),
                        FACE_FILES[i],
                        img.width(),
                        img.height(),
                        width,
                        height
                    );
                }
            }
        }

        Self::from_rgba_faces(gpu, &data, width, height, &dir.display().to_string())
    }

    /// Build a cubemap from raw RGBA data holding six layers in +X, −X,
    /// +Y, −Y, +Z, −Z order.
    pub fn from_rgba_faces(
        gpu: &GpuContext,
        data: &[u8],
        width: u32,
        height: u32,
        label: &str,
    ) -> Self {
        use wgpu::util::DeviceExt;

        let texture = gpu.device.create_texture_with_data(
            &gpu.queue,
            &wgpu::TextureDescriptor {
                label: Some(label),
                size: wgpu::Extent3d {
                    width,
                    height,
                    depth_or_array_layers: 6,
                },
                mip_level_count: 1,
                sample_count: 1,
                dimension: wgpu::TextureDimension::D2,
                format: wgpu::TextureFormat::Rgba8UnormSrgb,
                usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
                view_formats: &[],
            },
            wgpu::util::TextureDataOrder::LayerMajor,
            data,
        );

        let view = texture.create_view(&wgpu::TextureViewDescriptor {
            dimension: Some(wgpu::TextureViewDimension::Cube),
            ..Default::default()
        });

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
            texture,
            view,
            sampler,
        }
    }

    fn load_face(dir: &Path, stem: &str) -> Option<image::RgbaImage> {
        for path in Self::face_candidates(dir, stem) {
            if path.exists() {
                match image::open(&path) {
                    Ok(img) => return Some(img.to_rgba8()),
                    Err(e) => {
                        log::warn!("failed to decode {}: {}", path.display(), e);
                        return None;
                    }
                }
            }
        }
        None
    }

    fn face_candidates(dir: &Path, stem: &str) -> Vec<PathBuf> {
        FACE_EXTENSIONS
            .iter()
            .map(|ext| dir.join(format!("{stem}.{ext}")))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn face_order_matches_cube_layer_order() {
        // wgpu cube layers are +X, -X, +Y, -Y, +Z, -Z.
        assert_eq!(
            FACE_FILES,
            ["right", "left", "top", "bottom", "front", "back"]
        );
    }

    #[test]
    fn face_candidates_try_jpg_then_png() {
        let candidates = Cubemap::face_candidates(Path::new("assets/textures/skybox"), "right");
        assert_eq!(
            candidates,
            vec![
                PathBuf::from("assets/textures/skybox/right.jpg"),
                PathBuf::from("assets/textures/skybox/right.png"),
            ]
        );
    }
}
