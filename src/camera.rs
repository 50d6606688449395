//! Fly camera, projection and the camera uniform.
//!
//! The camera is described by a position, yaw, pitch and a zoom (vertical field of
//! view). Yaw is measured from +x towards +z, so a yaw of -90° looks down -z.

use cgmath::{Deg, InnerSpace, Matrix4, Point3, Rad, Vector3, perspective};

/// cgmath produces OpenGL clip space (z in -1..1); wgpu expects z in 0..1.
#[rustfmt::skip]
pub const OPENGL_TO_WGPU_MATRIX: Matrix4<f32> = Matrix4::new(
    1.0, 0.0, 0.0, 0.0,
    0.0, 1.0, 0.0, 0.0,
    0.0, 0.0, 0.5, 0.0,
    0.0, 0.0, 0.5, 1.0,
);

const SAFE_FRAC_PI_2: f32 = std::f32::consts::FRAC_PI_2 - 0.0001;

pub const MIN_ZOOM: f32 = 1.0;
pub const MAX_ZOOM: f32 = 45.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    Forward,
    Backward,
    Left,
    Right,
    Up,
    Down,
}

#[derive(Clone, Copy, Debug)]
struct Pose {
    position: Point3<f32>,
    yaw: Rad<f32>,
    pitch: Rad<f32>,
    zoom: Deg<f32>,
}

#[derive(Clone, Debug)]
pub struct Camera {
    pub position: Point3<f32>,
    pub yaw: Rad<f32>,
    pub pitch: Rad<f32>,
    /// Vertical field of view.
    pub zoom: Deg<f32>,
    /// Degrees of rotation per unit of mouse movement.
    pub sensitivity: f32,
    initial: Pose,
}

impl Camera {
    pub fn new<V: Into<Point3<f32>>, Y: Into<Rad<f32>>, P: Into<Rad<f32>>>(
        position: V,
        yaw: Y,
        pitch: P,
    ) -> Self {
        let initial = Pose {
            position: position.into(),
            yaw: yaw.into(),
            pitch: pitch.into(),
            zoom: Deg(MAX_ZOOM),
        };
        Self {
            position: initial.position,
            yaw: initial.yaw,
            pitch: initial.pitch,
            zoom: initial.zoom,
            sensitivity: 0.1,
            initial,
        }
    }

    /// Camera at `position` looking down -z.
    pub fn looking_forward<V: Into<Point3<f32>>>(position: V) -> Self {
        Self::new(position, Deg(-90.0), Deg(0.0))
    }

    pub fn front(&self) -> Vector3<f32> {
        let (sin_pitch, cos_pitch) = self.pitch.0.sin_cos();
        let (sin_yaw, cos_yaw) = self.yaw.0.sin_cos();
        Vector3::new(cos_yaw * cos_pitch, sin_pitch, sin_yaw * cos_pitch).normalize()
    }

    pub fn right(&self) -> Vector3<f32> {
        self.front().cross(Vector3::unit_y()).normalize()
    }

    pub fn up(&self) -> Vector3<f32> {
        self.right().cross(self.front()).normalize()
    }

    pub fn view_matrix(&self) -> Matrix4<f32> {
        Matrix4::look_to_rh(self.position, self.front(), self.up())
    }

    pub fn move_in(&mut self, direction: Direction, amount: f32) {
        let offset = match direction {
            Direction::Forward => self.front(),
            Direction::Backward => -self.front(),
            Direction::Right => self.right(),
            Direction::Left => -self.right(),
            Direction::Up => self.up(),
            Direction::Down => -self.up(),
        };
        self.position += offset * amount;
    }

    /// Turn by a mouse delta in pixels. Positive `dy` looks up. Pitch stays short of
    /// straight up/down.
    pub fn process_mouse_movement(&mut self, dx: f32, dy: f32) {
        self.yaw += Rad::from(Deg(dx * self.sensitivity));
        self.pitch += Rad::from(Deg(dy * self.sensitivity));
        self.pitch.0 = self.pitch.0.clamp(-SAFE_FRAC_PI_2, SAFE_FRAC_PI_2);
    }

    /// Scrolling up zooms in (narrows the field of view).
    pub fn process_mouse_scroll(&mut self, dy: f32) {
        self.zoom = Deg((self.zoom.0 - dy).clamp(MIN_ZOOM, MAX_ZOOM));
    }

    /// Back to the pose the camera was created with.
    pub fn reset(&mut self) {
        self.position = self.initial.position;
        self.yaw = self.initial.yaw;
        self.pitch = self.initial.pitch;
        self.zoom = self.initial.zoom;
    }
}

#[derive(Clone, Debug)]
pub struct Projection {
    aspect: f32,
    znear: f32,
    zfar: f32,
}

impl Projection {
    pub fn new(width: u32, height: u32, znear: f32, zfar: f32) -> Self {
        Self {
            aspect: width as f32 / height.max(1) as f32,
            znear,
            zfar,
        }
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.aspect = width as f32 / height.max(1) as f32;
    }

    pub fn calc_matrix(&self, fovy: Deg<f32>) -> Matrix4<f32> {
        OPENGL_TO_WGPU_MATRIX * perspective(fovy, self.aspect, self.znear, self.zfar)
    }
}

/// `view`, `projection` and `cameraPos` as the shader sees them.
#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub struct CameraUniform {
    view: [[f32; 4]; 4],
    projection: [[f32; 4]; 4],
    position: [f32; 4],
}

impl CameraUniform {
    pub fn new() -> Self {
        use cgmath::SquareMatrix;
        Self {
            view: Matrix4::identity().into(),
            projection: Matrix4::identity().into(),
            position: [0.0; 4],
        }
    }

    pub fn update_view_proj(&mut self, camera: &Camera, projection: &Projection) {
        self.position = camera.position.to_homogeneous().into();
        self.view = camera.view_matrix().into();
        self.projection = projection.calc_matrix(camera.zoom).into();
    }
}

impl Default for CameraUniform {
    fn default() -> Self {
        Self::new()
    }
}
