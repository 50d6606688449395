//! Vertex data as it is laid out in GPU memory.

/// Describes how a vertex type is read by the input assembler.
pub trait Vertex {
    fn desc() -> wgpu::VertexBufferLayout<'static>;
}

/// A single mesh vertex: position, RGBA colour, texture coordinate and normal.
///
/// The layout is tightly packed (48 bytes, 12 floats) so the same buffer can be read
/// as `array<f32>` from a storage binding when patches are evaluated in the shader.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct MeshVertex {
    pub position: [f32; 3],
    pub color: [f32; 4],
    pub tex_coords: [f32; 2],
    pub normal: [f32; 3],
}

impl MeshVertex {
    /// Number of `f32` values per vertex.
    pub const FLOATS: usize = 12;

    pub const ATTRIBUTES: [wgpu::VertexAttribute; 4] = wgpu::vertex_attr_array![
        0 => Float32x3,
        1 => Float32x4,
        2 => Float32x2,
        3 => Float32x3
    ];

    pub fn new(position: [f32; 3], color: [f32; 4], tex_coords: [f32; 2], normal: [f32; 3]) -> Self {
        Self {
            position,
            color,
            tex_coords,
            normal,
        }
    }

    /// Same attributes, but advanced once per instance. Point sprites read each mesh
    /// vertex as one instance and expand it into a quad.
    pub fn instance_desc() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<MeshVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &Self::ATTRIBUTES,
        }
    }
}

/**
 * offset: zero as the full struct is used.
 * stride: length of a vertex
 *
 * position (3) + color (4) + tex_coords (2) + normal (3)
 */
impl Vertex for MeshVertex {
    fn desc() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<MeshVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBUTES,
        }
    }
}
