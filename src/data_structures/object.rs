//! Renderable objects: a group of meshes sharing one material and two override textures.

use std::sync::Arc;

use cgmath::{Matrix4, Vector3};
use wgpu::util::DeviceExt;

use crate::{
    data_structures::{material::Material, mesh::Mesh, texture::Texture},
    pipelines::shader::{MATERIAL_GROUP, Shader},
    render::PrimitiveMode,
    resources::texture::material_layout,
};

#[derive(Debug, thiserror::Error)]
pub enum ObjectError {
    #[error("an object needs at least one mesh")]
    NoMeshes,
}

/// Owns deep copies of its meshes. Every transform operation is broadcast unchanged to
/// each of them, so an object has no transform of its own beyond its origin.
#[derive(Debug)]
pub struct Object {
    origin: Vector3<f32>,
    material: Arc<Material>,
    diffuse: Arc<Texture>,
    specular: Arc<Texture>,
    meshes: Vec<Mesh>,
    material_bind_group: wgpu::BindGroup,
}

impl Object {
    /// Copy `meshes` onto the GPU again, move each copy by `origin` and pivot it there.
    /// The input meshes are left untouched.
    pub fn new(
        device: &wgpu::Device,
        origin: Vector3<f32>,
        material: Arc<Material>,
        diffuse: Arc<Texture>,
        specular: Arc<Texture>,
        meshes: &[Mesh],
    ) -> Result<Self, ObjectError> {
        if meshes.is_empty() {
            return Err(ObjectError::NoMeshes);
        }
        let meshes = meshes
            .iter()
            .map(|mesh| {
                let mut copy = mesh.deep_copy(device);
                copy.move_by(origin);
                copy.set_origin(origin);
                copy
            })
            .collect();

        let material_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Material Buffer"),
            contents: bytemuck::cast_slice(&[material.to_uniform()]),
            usage: wgpu::BufferUsages::UNIFORM,
        });
        let material_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout: &material_layout(device),
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: material_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(&diffuse.view),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::Sampler(&diffuse.sampler),
                },
                wgpu::BindGroupEntry {
                    binding: 3,
                    resource: wgpu::BindingResource::TextureView(&specular.view),
                },
                wgpu::BindGroupEntry {
                    binding: 4,
                    resource: wgpu::BindingResource::Sampler(&specular.sampler),
                },
            ],
            label: Some("material_bind_group"),
        });

        Ok(Self {
            origin,
            material,
            diffuse,
            specular,
            meshes,
            material_bind_group,
        })
    }

    pub fn move_by(&mut self, delta: Vector3<f32>) {
        self.meshes.iter_mut().for_each(|mesh| mesh.move_by(delta));
    }

    pub fn rotate(&mut self, delta: Vector3<f32>) {
        self.meshes.iter_mut().for_each(|mesh| mesh.rotate(delta));
    }

    pub fn rotate_around_origin(&mut self, delta: Vector3<f32>) {
        self.meshes
            .iter_mut()
            .for_each(|mesh| mesh.rotate_around_origin(delta));
    }

    pub fn scale_up(&mut self, delta: Vector3<f32>) {
        self.meshes.iter_mut().for_each(|mesh| mesh.scale_up(delta));
    }

    /// Position of the first mesh.
    pub fn position(&self) -> Vector3<f32> {
        self.meshes[0].position()
    }

    /// Model matrix of the first mesh, as of its last render.
    pub fn model_matrix(&self) -> Matrix4<f32> {
        self.meshes[0].model_matrix()
    }

    pub fn origin(&self) -> Vector3<f32> {
        self.origin
    }

    pub fn meshes(&self) -> &[Mesh] {
        &self.meshes
    }

    pub fn material(&self) -> &Arc<Material> {
        &self.material
    }

    pub fn textures(&self) -> (&Arc<Texture>, &Arc<Texture>) {
        (&self.diffuse, &self.specular)
    }

    /// Draw every mesh as triangles.
    pub fn render(&mut self, queue: &wgpu::Queue, pass: &mut wgpu::RenderPass<'_>, shader: &Shader) {
        self.render_as(queue, pass, shader, PrimitiveMode::Triangles);
    }

    /// Draw every vertex as a square of `point_size` pixels.
    pub fn render_points(
        &mut self,
        queue: &wgpu::Queue,
        pass: &mut wgpu::RenderPass<'_>,
        shader: &mut Shader,
        point_size: f32,
    ) {
        shader.set_point_size(point_size);
        self.render_as(queue, pass, shader, PrimitiveMode::Points);
    }

    /// Draw every mesh as patches of the default size, tessellated at the shader's
    /// current level.
    pub fn render_patches(&mut self, queue: &wgpu::Queue, pass: &mut wgpu::RenderPass<'_>, shader: &Shader) {
        self.render_as(queue, pass, shader, PrimitiveMode::patches());
    }

    /// Draw every mesh with `mode`. For points the shader's current point size is used.
    pub fn render_as(
        &mut self,
        queue: &wgpu::Queue,
        pass: &mut wgpu::RenderPass<'_>,
        shader: &Shader,
        mode: PrimitiveMode,
    ) {
        pass.set_bind_group(MATERIAL_GROUP, &self.material_bind_group, &[]);
        for mesh in &mut self.meshes {
            mesh.render(queue, pass, shader, mode);
        }
    }
}
