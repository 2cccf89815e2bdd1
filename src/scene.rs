//! Scene assets and the fixed object arrangements.
//!
//! Everything here is loaded once at startup and read-only afterwards. The
//! three object sets (capture, main, portal) are literal constants: per
//! draw, the model matrix is rebuilt from these translation/scale literals
//! rather than stored as mutable state.

use crate::gpu::GpuContext;
use crate::mesh::{Mesh, Transform};
use crate::model::{AssetError, ModelKind, ObjModel};
use crate::scene_pass::Shading;
use crate::skybox::Skybox;

/// Cubemap face directories for the two skyboxes.
pub const SKYBOX_DIR: &str = "assets/textures/skybox";
pub const SPACEBOX_DIR: &str = "assets/textures/spacebox";

/// World positions of the two portal stamp planes.
pub const PORTAL_PLANES: [[f32; 3]; 2] = [[1.5, 0.0, 1.0], [-1.5, 0.0, 1.0]];
/// World position of the picture-in-scene quad.
pub const PICTURE_QUAD: [f32; 3] = [0.0, 0.0, 1.0];
/// Side length of the portal/picture quads.
pub const QUAD_SIZE: f32 = 1.0;

/// One model placement: which model, where, and how it is shaded.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SceneObject {
    pub kind: ModelKind,
    pub transform: Transform,
    pub shading: Shading,
}

impl SceneObject {
    const fn new(kind: ModelKind, position: [f32; 3], scale: f32, shading: Shading) -> Self {
        Self {
            kind,
            transform: Transform {
                position: glam::Vec3::new(position[0], position[1], position[2]),
                rotation: glam::Quat::IDENTITY,
                scale: glam::Vec3::splat(scale),
            },
            shading,
        }
    }
}

/// The static still life captured once into the mini framebuffer.
pub const CAPTURE_OBJECTS: [SceneObject; 3] = [
    SceneObject::new(ModelKind::Banana, [1.0, 0.0, -2.0], 0.4, Shading::Lit),
    SceneObject::new(ModelKind::Apple, [1.0, 0.0, -3.0], 0.012, Shading::Lit),
    SceneObject::new(ModelKind::Pumpkin, [-1.0, 0.4, -4.0], 0.01, Shading::Lit),
];

/// The main scene's decorative objects: one mirror Bean, one glass Bean.
pub const MAIN_OBJECTS: [SceneObject; 2] = [
    SceneObject::new(ModelKind::Bean, [-5.0, 0.0, -10.0], 1.0, Shading::Reflect),
    SceneObject::new(ModelKind::Bean, [5.0, 0.0, -10.0], 1.0, Shading::Refract),
];

/// The alternate scene visible through the portals: a pushed-back copy of
/// the still life plus both Beans, mirrored this time.
pub const PORTAL_OBJECTS: [SceneObject; 5] = [
    SceneObject::new(ModelKind::Banana, [1.0, 0.0, -7.0], 0.4, Shading::Lit),
    SceneObject::new(ModelKind::Apple, [1.0, 0.0, -8.0], 0.012, Shading::Lit),
    SceneObject::new(ModelKind::Pumpkin, [0.0, 0.4, -9.0], 0.01, Shading::Lit),
    SceneObject::new(ModelKind::Bean, [-5.0, 0.0, -10.0], 1.0, Shading::Reflect),
    SceneObject::new(ModelKind::Bean, [5.0, 0.0, -10.0], 1.0, Shading::Reflect),
];

/// All loaded scene assets.
pub struct Scene {
    models: [ObjModel; 4],
    /// The primary sky.
    pub skybox: Skybox,
    /// The sky of the scene behind the portals.
    pub spacebox: Skybox,
    /// Shared quad geometry for the portal stamps and the picture.
    pub quad: Mesh,
}

impl Scene {
    /// Load every asset. Model failures abort the load; degraded cubemap
    /// faces only warn (see [`Cubemap::from_dir`](crate::Cubemap::from_dir)).
    pub fn load(gpu: &GpuContext) -> Result<Self, AssetError> {
        let models = ModelKind::ALL.map(|kind| ObjModel::load(gpu, kind.path()));
        // Arrays of Results don't collect; unpack by hand.
        let [banana, apple, pumpkin, bean] = models;
        let models = [banana?, apple?, pumpkin?, bean?];

        let skybox = Skybox::from_dir(gpu, SKYBOX_DIR);
        let spacebox = Skybox::from_dir(gpu, SPACEBOX_DIR);

        let quad = Mesh::vertical_quad(gpu, QUAD_SIZE);

        log::info!("scene assets loaded");

        Ok(Self {
            models,
            skybox,
            spacebox,
            quad,
        })
    }

    /// Look up a model by its typed handle.
    pub fn model(&self, kind: ModelKind) -> &ObjModel {
        &self.models[kind.index()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capture_set_is_fully_lit() {
        assert!(CAPTURE_OBJECTS.iter().all(|o| o.shading == Shading::Lit));
    }

    #[test]
    fn main_scene_has_one_mirror_and_one_glass_bean() {
        assert_eq!(MAIN_OBJECTS[0].shading, Shading::Reflect);
        assert_eq!(MAIN_OBJECTS[1].shading, Shading::Refract);
        assert!(MAIN_OBJECTS.iter().all(|o| o.kind == ModelKind::Bean));
    }

    #[test]
    fn portal_still_life_sits_behind_the_capture_set() {
        // The portal copy of each still-life object is pushed further down
        // -Z than its capture counterpart.
        for (portal, capture) in PORTAL_OBJECTS.iter().zip(CAPTURE_OBJECTS.iter()) {
            assert_eq!(portal.kind, capture.kind);
            assert!(portal.transform.position.z < capture.transform.position.z);
            assert_eq!(portal.transform.scale, capture.transform.scale);
        }
        // Both portal Beans are mirrors.
        assert!(
            PORTAL_OBJECTS[3..]
                .iter()
                .all(|o| o.shading == Shading::Reflect)
        );
    }

    #[test]
    fn portal_planes_flank_the_picture_quad() {
        assert_eq!(PORTAL_PLANES[0][0], -PORTAL_PLANES[1][0]);
        assert_eq!(PICTURE_QUAD[0], 0.0);
        // All three quads share the same depth.
        assert!(PORTAL_PLANES.iter().all(|p| p[2] == PICTURE_QUAD[2]));
    }
}
