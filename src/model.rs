//! Wavefront OBJ model loading.
//!
//! An [`ObjModel`] is a set of GPU meshes (one per OBJ shape) plus the
//! diffuse textures its MTL materials reference. Models are loaded once at
//! startup; a model that fails to load is a fatal initialization error,
//! while a missing diffuse map only degrades that mesh to untextured.
//!
//! The demo's four models are addressed through the [`ModelKind`] enum
//! rather than name-keyed maps, so lookups in the per-frame path are plain
//! array indexing.

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::gpu::GpuContext;
use crate::mesh::{Mesh, Vertex3d};
use crate::texture::Texture;

/// Errors raised while loading scene assets.
#[derive(Debug, Error)]
pub enum AssetError {
    /// The OBJ file could not be read or parsed.
    #[error("failed to load model {}: {source}", path.display())]
    Model {
        path: PathBuf,
        #[source]
        source: tobj::LoadError,
    },
}

/// The fixed set of models this demo loads, used as typed handles.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ModelKind {
    Banana,
    Apple,
    Pumpkin,
    Bean,
}

impl ModelKind {
    /// Every model, in load order.
    pub const ALL: [ModelKind; 4] = [
        ModelKind::Banana,
        ModelKind::Apple,
        ModelKind::Pumpkin,
        ModelKind::Bean,
    ];

    /// The OBJ file for this model.
    pub fn path(self) -> &'static str {
        match self {
            ModelKind::Banana => "assets/models/banana/banana.obj",
            ModelKind::Apple => "assets/models/apple/apple.obj",
            ModelKind::Pumpkin => "assets/models/pumpkin/pumpkin.obj",
            ModelKind::Bean => "assets/models/bean/bean.obj",
        }
    }

    /// Index into model storage; stable with [`ModelKind::ALL`].
    pub fn index(self) -> usize {
        self as usize
    }
}

/// One OBJ shape: its GPU mesh and the material it references.
struct ModelMesh {
    mesh: Mesh,
    material: Option<usize>,
}

/// A loaded OBJ model: meshes plus per-material diffuse textures.
pub struct ObjModel {
    meshes: Vec<ModelMesh>,
    textures: Vec<Option<Texture>>,
}

impl ObjModel {
    /// Load an OBJ file and the diffuse textures its materials reference.
    ///
    /// Texture paths in the MTL are resolved relative to the OBJ's
    /// directory. A diffuse map that fails to load is logged and skipped;
    /// the affected meshes render untextured.
    pub fn load(gpu: &GpuContext, path: impl AsRef<Path>) -> Result<Self, AssetError> {
        let path = path.as_ref();
        log::debug!("loading model {}", path.display());

        let (models, materials) =
            tobj::load_obj(path, &tobj::GPU_LOAD_OPTIONS).map_err(|source| AssetError::Model {
                path: path.to_path_buf(),
                source,
            })?;

        let materials = materials.unwrap_or_else(|e| {
            log::warn!("no materials for {}: {}", path.display(), e);
            Vec::new()
        });

        let base_dir = path.parent().unwrap_or_else(|| Path::new("."));
        let textures = materials
            .iter()
            .map(|mat| {
                let diffuse = mat.diffuse_texture.as_ref()?;
                let tex_path = base_dir.join(diffuse);
                match Texture::from_file(gpu, &tex_path) {
                    Ok(tex) => Some(tex),
                    Err(e) => {
                        log::warn!("failed to load diffuse map {}: {}", tex_path.display(), e);
                        None
                    }
                }
            })
            .collect();

        let meshes = models
            .iter()
            .map(|model| {
                let (vertices, indices) = vertices_from_mesh(&model.mesh);
                ModelMesh {
                    mesh: Mesh::new(gpu, &vertices, &indices),
                    material: model.mesh.material_id,
                }
            })
            .collect();

        log::info!("loaded model {}", path.display());

        Ok(Self { meshes, textures })
    }

    /// The model's meshes with their diffuse textures, for drawing.
    pub fn parts(&self) -> impl Iterator<Item = (&Mesh, Option<&Texture>)> {
        self.meshes.iter().map(|m| {
            let texture = m
                .material
                .and_then(|id| self.textures.get(id))
                .and_then(|t| t.as_ref());
            (&m.mesh, texture)
        })
    }
}

/// Interleave tobj's flat position/normal/texcoord arrays into [`Vertex3d`]s.
///
/// tobj is invoked with `GPU_LOAD_OPTIONS` (single index, triangulated), so
/// positions/normals/texcoords are parallel arrays. Missing normals or UVs
/// are zero-filled.
fn vertices_from_mesh(mesh: &tobj::Mesh) -> (Vec<Vertex3d>, Vec<u32>) {
    let count = mesh.positions.len() / 3;
    let mut vertices = Vec::with_capacity(count);

    for i in 0..count {
        let position = [
            mesh.positions[i * 3],
            mesh.positions[i * 3 + 1],
            mesh.positions[i * 3 + 2],
        ];
        let normal = if mesh.normals.len() >= (i + 1) * 3 {
            [
                mesh.normals[i * 3],
                mesh.normals[i * 3 + 1],
                mesh.normals[i * 3 + 2],
            ]
        } else {
            [0.0; 3]
        };
        let uv = if mesh.texcoords.len() >= (i + 1) * 2 {
            // OBJ UVs are bottom-left origin; flip V for top-left sampling.
            [mesh.texcoords[i * 2], 1.0 - mesh.texcoords[i * 2 + 1]]
        } else {
            [0.0; 2]
        };
        vertices.push(Vertex3d::new(position, normal, uv));
    }

    (vertices, mesh.indices.clone())
}

#[cfg(test)]
mod tests {
    use super::*;

    const TRIANGLE_OBJ: &str = "\
v 0.0 0.0 0.0
v 1.0 0.0 0.0
v 0.0 1.0 0.0
vn 0.0 0.0 1.0
vt 0.0 0.0
vt 1.0 0.0
vt 0.0 1.0
f 1/1/1 2/2/1 3/3/1
";

    fn load_triangle() -> tobj::Mesh {
        let mut reader = std::io::Cursor::new(TRIANGLE_OBJ.as_bytes());
        let (models, _) = tobj::load_obj_buf(&mut reader, &tobj::GPU_LOAD_OPTIONS, |_| {
            Err(tobj::LoadError::OpenFileFailed)
        })
        .expect("triangle OBJ parses");
        models.into_iter().next().expect("one shape").mesh
    }

    #[test]
    fn interleaves_positions_normals_uvs() {
        let mesh = load_triangle();
        let (vertices, indices) = vertices_from_mesh(&mesh);

        assert_eq!(vertices.len(), 3);
        assert_eq!(indices.len(), 3);
        assert_eq!(vertices[1].position, [1.0, 0.0, 0.0]);
        assert_eq!(vertices[0].normal, [0.0, 0.0, 1.0]);
        // V is flipped for top-left-origin sampling.
        assert_eq!(vertices[2].uv, [0.0, 0.0]);
    }

    #[test]
    fn zero_fills_missing_attributes() {
        let obj = "v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\n";
        let mut reader = std::io::Cursor::new(obj.as_bytes());
        let (models, _) = tobj::load_obj_buf(&mut reader, &tobj::GPU_LOAD_OPTIONS, |_| {
            Err(tobj::LoadError::OpenFileFailed)
        })
        .expect("bare OBJ parses");
        let (vertices, _) = vertices_from_mesh(&models[0].mesh);

        assert_eq!(vertices[0].normal, [0.0; 3]);
        assert_eq!(vertices[0].uv, [0.0; 2]);
    }

    #[test]
    fn model_kind_indices_match_all_order() {
        for (i, kind) in ModelKind::ALL.iter().enumerate() {
            assert_eq!(kind.index(), i);
        }
    }
}
