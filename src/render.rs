//! Render-mode dispatch.
//!
//! A mesh can be drawn as a triangle list, as a point list, or as a patch list that is
//! tessellated before rasterization. [`PrimitiveMode`] selects which one and
//! [`PatchLayout`] validates what a patch looks like. [`encode_frame`] records a whole
//! frame for an object.

use std::fmt;

use crate::{data_structures::object::Object, pipelines::Shader};

/// Control points per patch when none is given.
pub const DEFAULT_PATCH_SIZE: u32 = 25;

/// Upper bound for control points per patch (an 8x8 grid).
pub const MAX_PATCH_SIZE: u32 = 64;

/// Draw topology for a mesh.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PrimitiveMode {
    Triangles,
    Points,
    /// Patches of the given number of control points.
    Patches(u32),
}

impl PrimitiveMode {
    pub fn patches() -> Self {
        PrimitiveMode::Patches(DEFAULT_PATCH_SIZE)
    }
}

impl Default for PrimitiveMode {
    fn default() -> Self {
        PrimitiveMode::Triangles
    }
}

impl fmt::Display for PrimitiveMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PrimitiveMode::Triangles => f.write_str("triangles"),
            PrimitiveMode::Points => f.write_str("points"),
            PrimitiveMode::Patches(n) => write!(f, "patches({})", n),
        }
    }
}

/// A square grid of control points evaluated as a tensor-product Bézier surface.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PatchLayout {
    /// Control points per patch.
    pub control_points: u32,
    /// Control points along one side of the grid.
    pub side: u32,
}

impl PatchLayout {
    /// `None` unless `control_points` is a perfect square between 4 and [`MAX_PATCH_SIZE`].
    pub fn new(control_points: u32) -> Option<Self> {
        if !(4..=MAX_PATCH_SIZE).contains(&control_points) {
            return None;
        }
        let side = (control_points as f32).sqrt().round() as u32;
        (side * side == control_points).then_some(Self {
            control_points,
            side,
        })
    }

    /// Whole patches that fit into `elements` control points; a trailing partial patch
    /// is not drawn.
    pub fn patch_count(&self, elements: u32) -> u32 {
        elements / self.control_points
    }

    /// Vertices emitted per patch when it is split into `level` x `level` quads.
    pub fn vertices_per_patch(level: u32) -> u32 {
        level * level * 6
    }
}

/// Colour and depth views one frame is drawn into.
pub struct FrameTarget<'a> {
    pub color: &'a wgpu::TextureView,
    pub depth: &'a wgpu::TextureView,
    pub clear: wgpu::Color,
}

/// Start a pass on `target` that clears colour and depth.
pub fn begin_frame_pass<'e>(
    encoder: &'e mut wgpu::CommandEncoder,
    target: &FrameTarget<'_>,
) -> wgpu::RenderPass<'e> {
    encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
        label: Some("Render Pass"),
        color_attachments: &[Some(wgpu::RenderPassColorAttachment {
            view: target.color,
            resolve_target: None,
            ops: wgpu::Operations {
                load: wgpu::LoadOp::Clear(target.clear),
                store: wgpu::StoreOp::Store,
            },
            depth_slice: None,
        })],
        depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
            view: target.depth,
            depth_ops: Some(wgpu::Operations {
                load: wgpu::LoadOp::Clear(1.0),
                store: wgpu::StoreOp::Store,
            }),
            stencil_ops: None,
        }),
        occlusion_query_set: None,
        timestamp_writes: None,
        multiview_mask: None,
    })
}

/// Record one frame: clear both attachments, bind the frame uniforms and draw `object`
/// with `mode`. Points are drawn at `point_size` pixels.
pub fn encode_frame(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    shader: &mut Shader,
    object: &mut Object,
    mode: PrimitiveMode,
    point_size: f32,
    target: &FrameTarget<'_>,
) -> wgpu::CommandBuffer {
    let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
        label: Some("Render Encoder"),
    });
    {
        let mut render_pass = begin_frame_pass(&mut encoder, target);
        shader.bind_frame(&mut render_pass);
        match mode {
            PrimitiveMode::Points => object.render_points(queue, &mut render_pass, shader, point_size),
            other => object.render_as(queue, &mut render_pass, shader, other),
        }
    }
    encoder.finish()
}
