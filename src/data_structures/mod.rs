//! Render-object data structures.
//!
//! - `vertex` is the GPU vertex layout
//! - `primitive` generates vertex and index arrays for simple shapes
//! - `transform` holds the five-field local transform and its model matrix
//! - `mesh` owns GPU buffers for one piece of geometry
//! - `object` groups meshes under one material and two override textures
//! - `material` and `texture` are the shared resources objects point at

pub mod material;
pub mod mesh;
pub mod object;
pub mod primitive;
pub mod texture;
pub mod transform;
pub mod vertex;
