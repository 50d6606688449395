//! GPU meshes.
//!
//! A [`Mesh`] owns its vertex data, one vertex buffer, an optional index buffer and a
//! model uniform. The model matrix follows the mesh's [`Transform`] lazily: it is
//! computed at construction and again every time the mesh is rendered.

use std::path::Path;

use cgmath::{Matrix, Matrix4, SquareMatrix, Vector3};
use wgpu::util::DeviceExt;

use crate::{
    data_structures::{primitive::Primitive, transform::Transform, vertex::MeshVertex},
    pipelines::shader::{self, MODEL_GROUP, Shader},
    render::{PatchLayout, PrimitiveMode},
    resources::mesh::{GeometryError, LineIssue, load_geometry},
};

#[derive(Debug, thiserror::Error)]
pub enum MeshError {
    #[error("a mesh needs at least one vertex")]
    NoVertices,

    #[error("index {index} points past the {vertices} vertices of the mesh")]
    IndexOutOfRange { index: u32, vertices: usize },

    #[error(transparent)]
    Geometry(#[from] GeometryError),
}

/// `model` as the shader sees it, plus what the patch pipeline needs to pull control
/// points out of the vertex and index buffers.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ModelUniform {
    model: [[f32; 4]; 4],
    normal: [[f32; 4]; 4],
    patch_size: u32,
    patch_side: u32,
    indexed: u32,
    point_size: f32,
}

impl ModelUniform {
    pub fn new(model: Matrix4<f32>, patch: Option<PatchLayout>, indexed: bool) -> Self {
        // a singular model matrix (zero scale) has no inverse-transpose
        let normal = model.invert().map(|m| m.transpose()).unwrap_or(model);
        Self {
            model: model.into(),
            normal: normal.into(),
            patch_size: patch.map_or(0, |p| p.control_points),
            patch_side: patch.map_or(0, |p| p.side),
            indexed: indexed as u32,
            point_size: 1.0,
        }
    }

    /// Side of the square each vertex becomes in the point pipeline, in pixels.
    pub fn with_point_size(mut self, point_size: f32) -> Self {
        self.point_size = point_size;
        self
    }
}

#[derive(Debug)]
pub struct Mesh {
    vertices: Vec<MeshVertex>,
    indices: Vec<u32>,
    transform: Transform,
    model_matrix: Matrix4<f32>,
    vertex_buffer: wgpu::Buffer,
    index_buffer: Option<wgpu::Buffer>,
    model_buffer: wgpu::Buffer,
    model_bind_group: wgpu::BindGroup,
    patch_bind_group: wgpu::BindGroup,
    rejected_patch_size: Option<u32>,
}

impl Mesh {
    /// Upload `vertices` (and `indices`, when not empty) into new GPU buffers.
    pub fn new(
        device: &wgpu::Device,
        vertices: Vec<MeshVertex>,
        indices: Vec<u32>,
        transform: Transform,
    ) -> Result<Self, MeshError> {
        if vertices.is_empty() {
            return Err(MeshError::NoVertices);
        }
        if let Some(&index) = indices.iter().find(|&&i| i as usize >= vertices.len()) {
            return Err(MeshError::IndexOutOfRange {
                index,
                vertices: vertices.len(),
            });
        }
        Ok(Self::upload(device, vertices, indices, transform))
    }

    pub fn from_primitive(
        device: &wgpu::Device,
        primitive: Primitive,
        transform: Transform,
    ) -> Result<Self, MeshError> {
        Self::new(device, primitive.vertices, primitive.indices, transform)
    }

    /// Build a mesh from a `v`/`f` geometry file.
    ///
    /// Malformed lines are logged and skipped; the mesh is built from what parsed and
    /// the skipped lines are handed back. A file with no usable face is an error.
    pub fn from_file(
        device: &wgpu::Device,
        path: impl AsRef<Path>,
        transform: Transform,
    ) -> Result<(Self, Vec<LineIssue>), MeshError> {
        let path = path.as_ref();
        let parsed = load_geometry(path)?;
        if parsed.vertices.is_empty() {
            return Err(GeometryError::Empty(path.to_path_buf()).into());
        }
        let mesh = Self::new(device, parsed.vertices, Vec::new(), transform)?;
        Ok((mesh, parsed.issues))
    }

    /// Like [`Mesh::from_file`], but any malformed line rejects the whole file.
    pub fn from_file_strict(
        device: &wgpu::Device,
        path: impl AsRef<Path>,
        transform: Transform,
    ) -> Result<Self, MeshError> {
        let path = path.as_ref();
        let parsed = load_geometry(path)?;
        if !parsed.is_clean() {
            return Err(GeometryError::Rejected {
                path: path.to_path_buf(),
                issues: parsed.issues,
            }
            .into());
        }
        if parsed.vertices.is_empty() {
            return Err(GeometryError::Empty(path.to_path_buf()).into());
        }
        Self::new(device, parsed.vertices, Vec::new(), transform)
    }

    fn upload(
        device: &wgpu::Device,
        vertices: Vec<MeshVertex>,
        indices: Vec<u32>,
        transform: Transform,
    ) -> Self {
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Mesh Vertex Buffer"),
            contents: bytemuck::cast_slice(&vertices),
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::STORAGE,
        });
        let index_buffer = (!indices.is_empty()).then(|| {
            device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Mesh Index Buffer"),
                contents: bytemuck::cast_slice(&indices),
                usage: wgpu::BufferUsages::INDEX | wgpu::BufferUsages::STORAGE,
            })
        });

        let model_matrix = transform.to_matrix();
        let model_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Model Buffer"),
            contents: bytemuck::cast_slice(&[ModelUniform::new(
                model_matrix,
                None,
                index_buffer.is_some(),
            )]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let model_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout: &shader::model_layout(device),
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: model_buffer.as_entire_binding(),
            }],
            label: Some("model_bind_group"),
        });
        // without indices the vertex buffer fills the index slot; the shader never reads it
        let patch_indices = index_buffer.as_ref().unwrap_or(&vertex_buffer);
        let patch_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout: &shader::patch_layout(device),
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: model_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: vertex_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: patch_indices.as_entire_binding(),
                },
            ],
            label: Some("patch_bind_group"),
        });

        Self {
            vertices,
            indices,
            transform,
            model_matrix,
            vertex_buffer,
            index_buffer,
            model_buffer,
            model_bind_group,
            patch_bind_group,
            rejected_patch_size: None,
        }
    }

    /// A copy with its own GPU buffers and the same vertex data and transform.
    pub fn deep_copy(&self, device: &wgpu::Device) -> Self {
        let mut copy = Self::upload(device, self.vertices.clone(), self.indices.clone(), self.transform);
        copy.model_matrix = self.model_matrix;
        copy
    }

    pub fn move_by(&mut self, delta: Vector3<f32>) {
        self.transform.move_by(delta);
    }

    pub fn rotate(&mut self, delta: Vector3<f32>) {
        self.transform.rotate(delta);
    }

    pub fn rotate_around_origin(&mut self, delta: Vector3<f32>) {
        self.transform.rotate_around_origin(delta);
    }

    pub fn scale_up(&mut self, delta: Vector3<f32>) {
        self.transform.scale_up(delta);
    }

    pub fn set_position(&mut self, position: Vector3<f32>) {
        self.transform.position = position;
    }

    pub fn set_origin(&mut self, origin: Vector3<f32>) {
        self.transform.origin = origin;
    }

    pub fn set_rotation(&mut self, rotation: Vector3<f32>) {
        self.transform.rotation = rotation;
    }

    pub fn set_rotation_around_origin(&mut self, rotation: Vector3<f32>) {
        self.transform.rotation_around_origin = rotation;
    }

    pub fn set_scale(&mut self, scale: Vector3<f32>) {
        self.transform.scale = scale;
    }

    pub fn position(&self) -> Vector3<f32> {
        self.transform.position
    }

    pub fn origin(&self) -> Vector3<f32> {
        self.transform.origin
    }

    pub fn rotation(&self) -> Vector3<f32> {
        self.transform.rotation
    }

    pub fn rotation_around_origin(&self) -> Vector3<f32> {
        self.transform.rotation_around_origin
    }

    pub fn scale(&self) -> Vector3<f32> {
        self.transform.scale
    }

    pub fn transform(&self) -> &Transform {
        &self.transform
    }

    /// The model matrix as of construction or the last render. Transform changes made
    /// since then are not reflected.
    pub fn model_matrix(&self) -> Matrix4<f32> {
        self.model_matrix
    }

    pub fn vertices(&self) -> &[MeshVertex] {
        &self.vertices
    }

    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    pub fn vertex_buffer(&self) -> &wgpu::Buffer {
        &self.vertex_buffer
    }

    pub fn index_buffer(&self) -> Option<&wgpu::Buffer> {
        self.index_buffer.as_ref()
    }

    /// Elements a draw walks through: indices when there are any, vertices otherwise.
    fn element_count(&self) -> u32 {
        if self.index_buffer.is_some() {
            self.indices.len() as u32
        } else {
            self.vertices.len() as u32
        }
    }

    /// Recompute the model matrix, upload it together with the shader's current point
    /// size and draw with `mode`.
    ///
    /// Expects the frame and material bind groups to be bound on `pass` already. The
    /// uniform is written through the queue, so a mesh drawn more than once before the
    /// next submit uses the values of its last call for every draw.
    pub fn render(
        &mut self,
        queue: &wgpu::Queue,
        pass: &mut wgpu::RenderPass<'_>,
        shader: &Shader,
        mode: PrimitiveMode,
    ) {
        self.model_matrix = self.transform.to_matrix();

        match mode {
            PrimitiveMode::Triangles => {
                self.write_model(queue, None, shader.point_size());
                pass.set_pipeline(shader.pipeline(mode));
                pass.set_bind_group(MODEL_GROUP, &self.model_bind_group, &[]);
                pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
                match &self.index_buffer {
                    Some(index_buffer) => {
                        pass.set_index_buffer(index_buffer.slice(..), wgpu::IndexFormat::Uint32);
                        pass.draw_indexed(0..self.indices.len() as u32, 0, 0..1);
                    }
                    None => pass.draw(0..self.vertices.len() as u32, 0..1),
                }
            }
            PrimitiveMode::Points => {
                self.write_model(queue, None, shader.point_size());
                pass.set_pipeline(shader.pipeline(mode));
                pass.set_bind_group(MODEL_GROUP, &self.model_bind_group, &[]);
                pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
                pass.draw(0..6, 0..self.vertices.len() as u32);
            }
            PrimitiveMode::Patches(size) => {
                let Some(layout) = PatchLayout::new(size) else {
                    if self.rejected_patch_size != Some(size) {
                        log::warn!(
                            "cannot draw patches of {} control points, expected a square grid between 4 and 64",
                            size
                        );
                        self.rejected_patch_size = Some(size);
                    }
                    return;
                };
                let patches = layout.patch_count(self.element_count());
                if patches == 0 {
                    log::debug!(
                        "mesh has {} elements, fewer than one patch of {}",
                        self.element_count(),
                        size
                    );
                    return;
                }
                self.write_model(queue, Some(layout), shader.point_size());
                pass.set_pipeline(shader.pipeline(mode));
                pass.set_bind_group(MODEL_GROUP, &self.patch_bind_group, &[]);
                let vertices = PatchLayout::vertices_per_patch(shader.tessellation_factor());
                pass.draw(0..vertices, 0..patches);
            }
        }
    }

    fn write_model(&self, queue: &wgpu::Queue, patch: Option<PatchLayout>, point_size: f32) {
        let uniform = ModelUniform::new(self.model_matrix, patch, self.index_buffer.is_some())
            .with_point_size(point_size);
        queue.write_buffer(&self.model_buffer, 0, bytemuck::cast_slice(&[uniform]));
    }
}
