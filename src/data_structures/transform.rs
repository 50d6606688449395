//! Local transform of a mesh.
//!
//! A transform carries five independent fields. The model matrix is always composed in
//! the same order:
//!
//! `T(origin) * R(rotation_around_origin) * T(position - origin) * R(rotation) * S(scale)`
//!
//! where each `R` applies X, then Y, then Z. Angles are in degrees.

use cgmath::{Deg, Matrix4, Vector3};

/// Position, pivot, both rotations and scale of a mesh.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transform {
    pub position: Vector3<f32>,
    pub origin: Vector3<f32>,
    pub rotation: Vector3<f32>,
    pub rotation_around_origin: Vector3<f32>,
    pub scale: Vector3<f32>,
}

impl Transform {
    /// Identity transform: everything at zero, unit scale.
    pub fn new() -> Self {
        Self {
            position: Vector3::new(0.0, 0.0, 0.0),
            origin: Vector3::new(0.0, 0.0, 0.0),
            rotation: Vector3::new(0.0, 0.0, 0.0),
            rotation_around_origin: Vector3::new(0.0, 0.0, 0.0),
            scale: Vector3::new(1.0, 1.0, 1.0),
        }
    }

    pub fn with_origin(mut self, origin: Vector3<f32>) -> Self {
        self.origin = origin;
        self
    }

    pub fn with_rotation(mut self, rotation: Vector3<f32>) -> Self {
        self.rotation = rotation;
        self
    }

    pub fn with_rotation_around_origin(mut self, rotation: Vector3<f32>) -> Self {
        self.rotation_around_origin = rotation;
        self
    }

    pub fn with_scale(mut self, scale: Vector3<f32>) -> Self {
        self.scale = scale;
        self
    }

    pub fn to_matrix(&self) -> Matrix4<f32> {
        Matrix4::from_translation(self.origin)
            * euler_xyz(self.rotation_around_origin)
            * Matrix4::from_translation(self.position - self.origin)
            * euler_xyz(self.rotation)
            * Matrix4::from_nonuniform_scale(self.scale.x, self.scale.y, self.scale.z)
    }

    pub fn move_by(&mut self, delta: Vector3<f32>) {
        self.position += delta;
    }

    pub fn rotate(&mut self, delta: Vector3<f32>) {
        self.rotation += delta;
    }

    pub fn rotate_around_origin(&mut self, delta: Vector3<f32>) {
        self.rotation_around_origin += delta;
    }

    pub fn scale_up(&mut self, delta: Vector3<f32>) {
        self.scale += delta;
    }
}

fn euler_xyz(angles: Vector3<f32>) -> Matrix4<f32> {
    Matrix4::from_angle_x(Deg(angles.x))
        * Matrix4::from_angle_y(Deg(angles.y))
        * Matrix4::from_angle_z(Deg(angles.z))
}

impl From<Vector3<f32>> for Transform {
    fn from(position: Vector3<f32>) -> Self {
        Transform {
            position,
            ..Default::default()
        }
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::new()
    }
}
