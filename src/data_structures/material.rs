//! Phong material parameters.

use cgmath::Vector3;

/// Ambient, diffuse and specular reflectivity of a surface.
///
/// Materials are owned by the scene and shared between objects through `Arc`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Material {
    pub ambient: Vector3<f32>,
    pub diffuse: Vector3<f32>,
    pub specular: Vector3<f32>,
    pub shininess: f32,
}

impl Material {
    pub fn new(ambient: Vector3<f32>, diffuse: Vector3<f32>, specular: Vector3<f32>) -> Self {
        Self {
            ambient,
            diffuse,
            specular,
            shininess: 35.0,
        }
    }

    pub fn to_uniform(&self) -> MaterialUniform {
        MaterialUniform {
            ambient: self.ambient.into(),
            _padding: 0,
            diffuse: self.diffuse.into(),
            _padding2: 0,
            specular: self.specular.into(),
            shininess: self.shininess,
        }
    }
}

impl Default for Material {
    fn default() -> Self {
        Self::new([0.1; 3].into(), [0.7; 3].into(), [0.5; 3].into())
    }
}

#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub struct MaterialUniform {
    ambient: [f32; 3],
    // Due to uniforms requiring 16 byte (4 float) spacing, we need to use a padding field here
    _padding: u32,
    diffuse: [f32; 3],
    _padding2: u32,
    specular: [f32; 3],
    shininess: f32,
}
