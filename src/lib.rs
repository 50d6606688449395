//! illumination
//!
//! An interactive viewer for Phong-lit meshes. A mesh is read from a plain `v`/`f` text
//! file (or generated from a primitive), wrapped in an object with a material and two
//! override textures, and drawn as triangles, points or tessellated patches. The camera
//! flies with the keyboard and mouse; the object spins around its origin.
//!
//! High-level modules
//! - `camera`: fly camera, projection and the camera uniform
//! - `config`: TOML and command-line settings
//! - `context`: window, device, queue, surface and the shader program
//! - `controls`: keyboard and mouse state, applied once per frame
//! - `data_structures`: vertices, primitives, transforms, meshes, objects, materials, textures
//! - `flow`: the winit event loop
//! - `pipelines`: render pipelines and per-frame uniforms
//! - `render`: primitive modes, patch layout and frame encoding
//! - `resources`: geometry file parsing and texture loading
//!

pub mod camera;
pub mod config;
pub mod context;
pub mod controls;
pub mod data_structures;
pub mod flow;
pub mod pipelines;
pub mod render;
pub mod resources;

pub use config::{Args, Config};
pub use data_structures::{
    material::Material,
    mesh::{Mesh, MeshError},
    object::{Object, ObjectError},
    primitive::Primitive,
    texture::Texture,
    transform::Transform,
    vertex::MeshVertex,
};
pub use flow::run;
pub use pipelines::Shader;
pub use render::PrimitiveMode;
