//! # Peephole
//!
//! **A stencil-portal rendering demo.**
//!
//! A handful of textured OBJ models and two cubemap skyboxes, composited
//! through a multi-pass pipeline: the scene is rendered into an off-screen
//! framebuffer, two quads stamp a stencil mask, an alternate "space" scene
//! is drawn only through that mask, and the result is presented via a
//! full-screen pass with selectable display modes.
//!
//! ## Pipeline at a glance
//!
//! ```text
//! startup:  capture pass ──► mini framebuffer   (static "picture" texture)
//!
//! per frame:
//!   main scene pass    ──► main framebuffer     (stamps stencil)
//!   portal overlay     ──► main framebuffer     (masked by stencil)
//!   composite pass     ──► window surface       (display-mode shader)
//! ```
//!
//! The library surface exists mostly for the test suite and for poking at
//! individual pieces; [`app::run`] is the whole show.

pub mod app;
pub mod camera;
pub mod composite;
pub mod framebuffer;
pub mod gpu;
pub mod input;
pub mod mesh;
pub mod model;
pub mod renderer;
pub mod scene;
pub mod scene_pass;
pub mod skybox;
pub mod texture;

pub use app::{AppConfig, run};
pub use camera::Camera;
pub use composite::{CompositePass, DisplayMode};
pub use framebuffer::FrameBuffer;
pub use gpu::GpuContext;
pub use input::Input;
pub use mesh::{Mesh, Transform, Vertex3d};
pub use model::{AssetError, ModelKind, ObjModel};
pub use renderer::Renderer;
pub use scene::{Scene, SceneObject};
pub use scene_pass::{FlatPass, PassVariant, ScenePass, Shading};
pub use skybox::{Skybox, SkyboxPass};
pub use texture::{Cubemap, Texture};

// Re-export glam math types for convenience
pub use glam::{Mat4, Vec3};
