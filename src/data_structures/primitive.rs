//! Generators for simple geometric primitives.
//!
//! A [`Primitive`] is plain CPU data (vertices plus a triangle-list index array) that
//! a [`Mesh`](crate::data_structures::mesh::Mesh) can be built from. All faces are
//! wound counter-clockwise when seen from outside.

use std::f32::consts::PI;

use crate::data_structures::vertex::MeshVertex;

#[derive(Clone, Debug, Default)]
pub struct Primitive {
    pub vertices: Vec<MeshVertex>,
    pub indices: Vec<u32>,
}

impl Primitive {
    pub fn new(vertices: Vec<MeshVertex>, indices: Vec<u32>) -> Self {
        Self { vertices, indices }
    }

    pub fn triangle() -> Self {
        let normal = [0.0, 0.0, 1.0];
        Self::new(
            vec![
                MeshVertex::new([-0.5, -0.5, 0.0], [1.0, 0.0, 0.0, 1.0], [0.0, 0.0], normal),
                MeshVertex::new([0.5, -0.5, 0.0], [0.0, 1.0, 0.0, 1.0], [1.0, 0.0], normal),
                MeshVertex::new([0.0, 0.5, 0.0], [0.0, 0.0, 1.0, 1.0], [0.5, 1.0], normal),
            ],
            vec![0, 1, 2],
        )
    }

    pub fn quad() -> Self {
        let normal = [0.0, 0.0, 1.0];
        Self::new(
            vec![
                MeshVertex::new([-0.5, 0.5, 0.0], [1.0, 0.0, 0.0, 1.0], [0.0, 1.0], normal),
                MeshVertex::new([-0.5, -0.5, 0.0], [0.0, 1.0, 0.0, 1.0], [0.0, 0.0], normal),
                MeshVertex::new([0.5, -0.5, 0.0], [0.0, 0.0, 1.0, 1.0], [1.0, 0.0], normal),
                MeshVertex::new([0.5, 0.5, 0.0], [1.0, 1.0, 0.0, 1.0], [1.0, 1.0], normal),
            ],
            vec![0, 1, 2, 0, 2, 3],
        )
    }

    /// Square-based pyramid with its apex on +y. Every face has its own vertices so the
    /// normals stay flat.
    pub fn pyramid() -> Self {
        let apex = [0.0, 0.5, 0.0];
        let base = [
            [-0.5, -0.5, 0.5],
            [0.5, -0.5, 0.5],
            [0.5, -0.5, -0.5],
            [-0.5, -0.5, -0.5],
        ];
        let mut primitive = Self::default();
        for i in 0..4 {
            let a = base[i];
            let b = base[(i + 1) % 4];
            primitive.push_triangle([a, b, apex], [[0.0, 0.0], [1.0, 0.0], [0.5, 1.0]]);
        }
        primitive.push_triangle(
            [base[0], base[3], base[2]],
            [[0.0, 1.0], [0.0, 0.0], [1.0, 0.0]],
        );
        primitive.push_triangle(
            [base[0], base[2], base[1]],
            [[0.0, 1.0], [1.0, 0.0], [1.0, 1.0]],
        );
        primitive
    }

    /// Unit cube centred on the origin, four vertices per face.
    pub fn cube() -> Self {
        // (normal, right, up) for each face; corners are normal/2 +- right/2 +- up/2
        let faces: [([f32; 3], [f32; 3], [f32; 3]); 6] = [
            ([0.0, 0.0, 1.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]),
            ([0.0, 0.0, -1.0], [-1.0, 0.0, 0.0], [0.0, 1.0, 0.0]),
            ([1.0, 0.0, 0.0], [0.0, 0.0, -1.0], [0.0, 1.0, 0.0]),
            ([-1.0, 0.0, 0.0], [0.0, 0.0, 1.0], [0.0, 1.0, 0.0]),
            ([0.0, 1.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, -1.0]),
            ([0.0, -1.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, 1.0]),
        ];
        let mut primitive = Self::default();
        for (normal, right, up) in faces {
            let first = primitive.vertices.len() as u32;
            for (u, v) in [(0.0, 1.0), (0.0, 0.0), (1.0, 0.0), (1.0, 1.0)] {
                let position = [0, 1, 2].map(|k| {
                    0.5 * normal[k] + (u - 0.5) * right[k] + (v - 0.5) * up[k]
                });
                primitive.vertices.push(MeshVertex::new(
                    position,
                    [1.0, 1.0, 1.0, 1.0],
                    [u, v],
                    normal,
                ));
            }
            primitive
                .indices
                .extend_from_slice(&[first, first + 1, first + 2, first, first + 2, first + 3]);
        }
        primitive
    }

    /// UV sphere of radius 0.5. `stacks` run pole to pole, `slices` around the y axis.
    pub fn sphere(stacks: u32, slices: u32) -> Self {
        let stacks = stacks.max(2);
        let slices = slices.max(3);
        let mut primitive = Self::default();
        for stack in 0..=stacks {
            let v = stack as f32 / stacks as f32;
            let theta = v * PI;
            for slice in 0..=slices {
                let u = slice as f32 / slices as f32;
                let phi = u * 2.0 * PI;
                let normal = [theta.sin() * phi.cos(), theta.cos(), -theta.sin() * phi.sin()];
                primitive.vertices.push(MeshVertex::new(
                    normal.map(|n| 0.5 * n),
                    [1.0, 1.0, 1.0, 1.0],
                    [u, 1.0 - v],
                    normal,
                ));
            }
        }
        let ring = slices + 1;
        for stack in 0..stacks {
            for slice in 0..slices {
                let top = stack * ring + slice;
                let bottom = top + ring;
                primitive
                    .indices
                    .extend_from_slice(&[top, bottom, bottom + 1, top, bottom + 1, top + 1]);
            }
        }
        primitive
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn index_count(&self) -> usize {
        self.indices.len()
    }

    fn push_triangle(&mut self, corners: [[f32; 3]; 3], tex_coords: [[f32; 2]; 3]) {
        let normal = face_normal(corners[0], corners[1], corners[2]);
        let first = self.vertices.len() as u32;
        for (position, tex) in corners.into_iter().zip(tex_coords) {
            self.vertices
                .push(MeshVertex::new(position, [1.0, 1.0, 1.0, 1.0], tex, normal));
        }
        self.indices.extend_from_slice(&[first, first + 1, first + 2]);
    }
}

fn face_normal(a: [f32; 3], b: [f32; 3], c: [f32; 3]) -> [f32; 3] {
    use cgmath::InnerSpace;
    let a = cgmath::Vector3::from(a);
    let e1 = cgmath::Vector3::from(b) - a;
    let e2 = cgmath::Vector3::from(c) - a;
    e1.cross(e2).normalize().into()
}
