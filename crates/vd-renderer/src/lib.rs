//! Voodoo Renderer
//!
//! Rendering collaborator for the voodoo core. It keeps a scene graph of
//! primitive shapes, owns the camera, answers pointer ray queries and draws
//! the scene with wgpu into any color target the viewer hands it.
//!
//! # Module Structure
//!
//! ```text
//! vd-renderer/
//! ├── camera.rs      # Orbit camera, projection, pointer rays, GPU uniform
//! ├── collision.rs   # Ray tests against boxes, spheres, cylinders, cones
//! ├── config.rs      # Serializable renderer settings
//! ├── grid.rs        # Floor slab and grid line geometry
//! ├── light.rs       # Light and fog uniform
//! ├── primitive.rs   # Unit meshes and per-kind instance batches
//! ├── renderer.rs    # wgpu pipelines, depth buffer, draw submission
//! ├── scene.rs       # Scene graph implementing SceneBackend
//! ├── shaders/       # WGSL for primitives and lines
//! └── vertex.rs      # Vertex and instance layouts
//! ```

pub mod camera;
pub mod collision;
pub mod config;
pub mod grid;
pub mod light;
pub mod primitive;
pub mod renderer;
pub mod scene;
pub mod vertex;

pub use camera::{Camera, CameraUniform};
pub use config::{CameraConfig, FloorConfig, FogConfig, LightingConfig, RendererConfig};
pub use light::LightUniform;
pub use primitive::{InstanceBatches, PrimitiveKind};
pub use renderer::{DEPTH_FORMAT, SceneRenderer};
pub use scene::Scene;
pub use vertex::{LineVertex, MeshVertex, PrimitiveInstance};
