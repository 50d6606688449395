//! Keyboard and mouse state for the viewer.
//!
//! Input events only record what happened; [`Controls::update`] turns the recorded state
//! into camera movement, a rotation for the displayed object and render settings once per
//! frame.

use std::{collections::HashSet, time::Duration};

use cgmath::{Euler, One, Quaternion, Rad, Rotation3, Vector3};
use winit::{
    event::{ElementState, MouseScrollDelta},
    keyboard::KeyCode,
};

use crate::camera::{Camera, Direction};

/// Minimum time between two discrete actions (tessellation steps, wireframe toggle).
pub const ACTION_COOLDOWN: f32 = 0.2;

const MOVE_KEYS: [(KeyCode, Direction); 6] = [
    (KeyCode::KeyW, Direction::Forward),
    (KeyCode::KeyS, Direction::Backward),
    (KeyCode::KeyA, Direction::Left),
    (KeyCode::KeyD, Direction::Right),
    (KeyCode::KeyQ, Direction::Down),
    (KeyCode::KeyE, Direction::Up),
];

// (key, axis, sign)
const SPIN_KEYS: [(KeyCode, [f32; 3], f32); 6] = [
    (KeyCode::KeyR, [1.0, 0.0, 0.0], 1.0),
    (KeyCode::KeyF, [1.0, 0.0, 0.0], -1.0),
    (KeyCode::KeyT, [0.0, 1.0, 0.0], 1.0),
    (KeyCode::KeyG, [0.0, 1.0, 0.0], -1.0),
    (KeyCode::KeyY, [0.0, 0.0, 1.0], 1.0),
    (KeyCode::KeyH, [0.0, 0.0, 1.0], -1.0),
];

#[derive(Clone, Debug)]
pub struct Controls {
    pressed: HashSet<KeyCode>,
    camera_speed: f32,
    spin_speed: f32,
    spin: Quaternion<f32>,
    tessellation_level: f32,
    line_mode: bool,
    cooldown: f32,
    last_cursor: Option<(f64, f64)>,
    exit_requested: bool,
}

impl Controls {
    pub fn new(camera_speed: f32, spin_speed: f32, tessellation_level: f32) -> Self {
        Self {
            pressed: HashSet::new(),
            camera_speed,
            spin_speed,
            spin: Quaternion::one(),
            tessellation_level,
            line_mode: false,
            cooldown: 0.0,
            last_cursor: None,
            exit_requested: false,
        }
    }

    pub fn process_key(&mut self, code: KeyCode, state: ElementState) {
        match state {
            ElementState::Pressed => {
                if code == KeyCode::Escape {
                    self.exit_requested = true;
                }
                self.pressed.insert(code);
            }
            ElementState::Released => {
                self.pressed.remove(&code);
            }
        }
    }

    pub fn is_pressed(&self, code: KeyCode) -> bool {
        self.pressed.contains(&code)
    }

    /// Mouse look from absolute cursor positions. The first position after start only
    /// establishes a reference point.
    pub fn process_cursor(&mut self, camera: &mut Camera, x: f64, y: f64) {
        let (last_x, last_y) = self.last_cursor.unwrap_or((x, y));
        self.last_cursor = Some((x, y));
        // window y grows downwards
        camera.process_mouse_movement((x - last_x) as f32, (last_y - y) as f32);
    }

    pub fn process_scroll(&mut self, camera: &mut Camera, delta: &MouseScrollDelta) {
        let lines = match delta {
            MouseScrollDelta::LineDelta(_, y) => *y,
            MouseScrollDelta::PixelDelta(position) => position.y as f32 / 20.0,
        };
        camera.process_mouse_scroll(lines);
    }

    /// Apply one frame of held keys.
    ///
    /// Returns the rotation to apply around the object's origin this frame. The spin is
    /// built as a quaternion from the held rotation keys and handed out as its Euler
    /// angles, whose radian values the object consumes as degrees.
    pub fn update(&mut self, camera: &mut Camera, dt: Duration) -> Vector3<f32> {
        let dt = dt.as_secs_f32();
        self.cooldown = (self.cooldown - dt).max(0.0);

        for (key, direction) in MOVE_KEYS {
            if self.is_pressed(key) {
                camera.move_in(direction, self.camera_speed * dt);
            }
        }

        for (key, axis, sign) in SPIN_KEYS {
            if self.is_pressed(key) {
                let step = Quaternion::from_axis_angle(Vector3::from(axis), Rad(sign * self.spin_speed * dt));
                self.spin = self.spin * step;
            }
        }

        if self.is_pressed(KeyCode::KeyZ) {
            camera.reset();
            self.spin = Quaternion::one();
        }

        self.discrete_action(KeyCode::KeyX, |controls| controls.tessellation_level /= 2.0);
        self.discrete_action(KeyCode::KeyC, |controls| controls.tessellation_level -= 1.0);
        self.discrete_action(KeyCode::KeyV, |controls| controls.tessellation_level += 1.0);
        self.discrete_action(KeyCode::KeyB, |controls| controls.tessellation_level *= 2.0);
        self.discrete_action(KeyCode::KeyN, |controls| controls.line_mode = !controls.line_mode);

        let euler = Euler::from(self.spin);
        // the spin only lasts for the frame it was built in
        self.spin = Quaternion::one();
        Vector3::new(euler.x.0, euler.y.0, euler.z.0)
    }

    fn discrete_action(&mut self, key: KeyCode, action: impl FnOnce(&mut Self)) {
        if self.is_pressed(key) && self.cooldown == 0.0 {
            self.cooldown = ACTION_COOLDOWN;
            action(self);
        }
    }

    /// Requested tessellation level. It is not clamped here; see
    /// [`tessellation_factor`](crate::pipelines::shader::tessellation_factor).
    pub fn tessellation_level(&self) -> f32 {
        self.tessellation_level
    }

    pub fn line_mode(&self) -> bool {
        self.line_mode
    }

    /// Used when the device cannot draw wireframes.
    pub fn set_line_mode(&mut self, line_mode: bool) {
        self.line_mode = line_mode;
    }

    pub fn exit_requested(&self) -> bool {
        self.exit_requested
    }
}
