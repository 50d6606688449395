use cgmath::Vector3;

/// A single white point light, `lightPos0` in the shader.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct LightUniform {
    position: [f32; 3],
    // Due to uniforms requiring 16 byte (4 float) spacing, we need to use a padding field here
    _padding: u32,
    color: [f32; 3],
    _padding2: u32,
}

impl LightUniform {
    pub fn new(position: Vector3<f32>, color: Vector3<f32>) -> Self {
        Self {
            position: position.into(),
            _padding: 0,
            color: color.into(),
            _padding2: 0,
        }
    }

    pub fn white(position: Vector3<f32>) -> Self {
        Self::new(position, Vector3::new(1.0, 1.0, 1.0))
    }

    pub fn set_position(&mut self, position: Vector3<f32>) {
        self.position = position.into();
    }
}
