//! The shader program: one WGSL module, a pipeline per primitive mode and the uniforms
//! that are set once per frame.
//!
//! Bind group 0 holds the frame uniforms and is bound by the render loop, group 1 holds
//! the material and override textures and is bound by an
//! [`Object`](crate::data_structures::object::Object), group 2 holds the per-mesh model
//! uniform and is bound by [`Mesh`](crate::data_structures::mesh::Mesh). Layouts are
//! rebuilt wherever a bind group is made; wgpu treats identical layouts as compatible.

use cgmath::Vector3;
use wgpu::util::DeviceExt;

use crate::{
    camera::CameraUniform,
    data_structures::{
        texture::DepthBuffer,
        vertex::{MeshVertex, Vertex},
    },
    pipelines::{light::LightUniform, mk_render_pipeline, triangle_list},
    render::PrimitiveMode,
    resources::texture::material_layout,
};

pub const FRAME_GROUP: u32 = 0;
pub const MATERIAL_GROUP: u32 = 1;
pub const MODEL_GROUP: u32 = 2;

/// Upper bound of the tessellation factor handed to the patch pipeline.
pub const MAX_TESSELLATION_LEVEL: u32 = 64;

/// Viewport size and tessellation level.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct RasterUniform {
    viewport: [f32; 2],
    tess_level: u32,
    _padding: u32,
}

/// Clamp a requested (possibly fractional or negative) level to what the patch pipeline
/// draws.
pub fn tessellation_factor(level: f32) -> u32 {
    if !level.is_finite() {
        return 1;
    }
    (level.round().max(1.0) as u32).min(MAX_TESSELLATION_LEVEL)
}

#[derive(Debug)]
struct Pipelines {
    fill: wgpu::RenderPipeline,
    line: Option<wgpu::RenderPipeline>,
}

impl Pipelines {
    fn select(&self, line_mode: bool) -> &wgpu::RenderPipeline {
        match (&self.line, line_mode) {
            (Some(line), true) => line,
            _ => &self.fill,
        }
    }
}

#[derive(Debug)]
pub struct Shader {
    camera_buffer: wgpu::Buffer,
    light_buffer: wgpu::Buffer,
    raster_buffer: wgpu::Buffer,
    light: LightUniform,
    raster: RasterUniform,
    point_size: f32,
    tessellation_level: f32,
    line_mode: bool,
    frame_bind_group: wgpu::BindGroup,
    triangles: Pipelines,
    patches: Pipelines,
    points: wgpu::RenderPipeline,
}

impl Shader {
    /// Build every pipeline for `color_format` targets with a depth buffer of
    /// [`DepthBuffer::FORMAT`]. Wireframe variants are only built when the device was
    /// created with `POLYGON_MODE_LINE`.
    pub fn new(device: &wgpu::Device, color_format: wgpu::TextureFormat) -> Self {
        let camera_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Camera Buffer"),
            contents: bytemuck::cast_slice(&[CameraUniform::new()]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let light = LightUniform::white(Vector3::new(5.0, 5.0, 5.0));
        let light_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Light Buffer"),
            contents: bytemuck::cast_slice(&[light]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let tessellation_level = 1.0;
        let raster = RasterUniform {
            viewport: [1.0, 1.0],
            tess_level: tessellation_factor(tessellation_level),
            _padding: 0,
        };
        let raster_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Raster Buffer"),
            contents: bytemuck::cast_slice(&[raster]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let frame_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            entries: &[
                uniform_entry(0, wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT),
                uniform_entry(1, wgpu::ShaderStages::FRAGMENT),
                uniform_entry(2, wgpu::ShaderStages::VERTEX),
            ],
            label: Some("frame_bind_group_layout"),
        });
        let frame_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout: &frame_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: camera_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: light_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: raster_buffer.as_entire_binding(),
                },
            ],
            label: Some("frame_bind_group"),
        });

        let material_layout = material_layout(device);
        let model_layout = model_layout(device);
        let patch_layout = patch_layout(device);

        let mesh_pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Mesh Pipeline Layout"),
            bind_group_layouts: &[&frame_layout, &material_layout, &model_layout],
            immediate_size: 0,
        });
        let patch_pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Patch Pipeline Layout"),
            bind_group_layouts: &[&frame_layout, &material_layout, &patch_layout],
            immediate_size: 0,
        });

        let module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Mesh Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("mesh.wgsl").into()),
        });

        let line_supported = device.features().contains(wgpu::Features::POLYGON_MODE_LINE);
        if !line_supported {
            log::info!("POLYGON_MODE_LINE unavailable, wireframe rendering disabled");
        }
        let depth = Some(DepthBuffer::FORMAT);
        let build = |label: &str,
                     layout: &wgpu::PipelineLayout,
                     entry: &str,
                     buffers: &[wgpu::VertexBufferLayout],
                     cull: Option<wgpu::Face>,
                     polygon_mode: wgpu::PolygonMode| {
            mk_render_pipeline(
                device,
                label,
                layout,
                &module,
                entry,
                buffers,
                color_format,
                depth,
                triangle_list(cull, polygon_mode),
            )
        };

        let vertex_layout = [MeshVertex::desc()];
        let triangles = Pipelines {
            fill: build(
                "Triangle Pipeline",
                &mesh_pipeline_layout,
                "vs_main",
                &vertex_layout,
                Some(wgpu::Face::Back),
                wgpu::PolygonMode::Fill,
            ),
            line: line_supported.then(|| {
                build(
                    "Triangle Wireframe Pipeline",
                    &mesh_pipeline_layout,
                    "vs_main",
                    &vertex_layout,
                    Some(wgpu::Face::Back),
                    wgpu::PolygonMode::Line,
                )
            }),
        };
        let patches = Pipelines {
            fill: build(
                "Patch Pipeline",
                &patch_pipeline_layout,
                "vs_patch",
                &[],
                None,
                wgpu::PolygonMode::Fill,
            ),
            line: line_supported.then(|| {
                build(
                    "Patch Wireframe Pipeline",
                    &patch_pipeline_layout,
                    "vs_patch",
                    &[],
                    None,
                    wgpu::PolygonMode::Line,
                )
            }),
        };
        let points = build(
            "Point Pipeline",
            &mesh_pipeline_layout,
            "vs_points",
            &[MeshVertex::instance_desc()],
            None,
            wgpu::PolygonMode::Fill,
        );

        Self {
            camera_buffer,
            light_buffer,
            raster_buffer,
            light,
            raster,
            point_size: 1.0,
            tessellation_level,
            line_mode: false,
            frame_bind_group,
            triangles,
            patches,
            points,
        }
    }

    /// Upload `view`, `projection` and `cameraPos`.
    pub fn set_view_projection(&self, queue: &wgpu::Queue, camera: &CameraUniform) {
        queue.write_buffer(&self.camera_buffer, 0, bytemuck::cast_slice(&[*camera]));
    }

    /// Upload `lightPos0`.
    pub fn set_light(&mut self, queue: &wgpu::Queue, position: Vector3<f32>) {
        self.light.set_position(position);
        queue.write_buffer(&self.light_buffer, 0, bytemuck::cast_slice(&[self.light]));
    }

    pub fn set_viewport(&mut self, queue: &wgpu::Queue, width: u32, height: u32) {
        self.raster.viewport = [width.max(1) as f32, height.max(1) as f32];
        self.write_raster(queue);
    }

    /// Point size in pixels for meshes rendered from now on. Each mesh copies the
    /// current size into its own model uniform when it is drawn.
    pub fn set_point_size(&mut self, size: f32) {
        self.point_size = size.max(0.0);
    }

    pub fn point_size(&self) -> f32 {
        self.point_size
    }

    pub fn set_tessellation_level(&mut self, queue: &wgpu::Queue, level: f32) {
        self.tessellation_level = level;
        self.raster.tess_level = tessellation_factor(level);
        self.write_raster(queue);
    }

    /// Quads per patch side that the patch pipeline draws.
    pub fn tessellation_factor(&self) -> u32 {
        self.raster.tess_level
    }

    fn write_raster(&self, queue: &wgpu::Queue) {
        queue.write_buffer(&self.raster_buffer, 0, bytemuck::cast_slice(&[self.raster]));
    }

    /// Switch between wireframe and filled rendering. Returns the mode now in effect,
    /// which stays filled when the device has no line polygon mode.
    pub fn set_line_mode(&mut self, on: bool) -> bool {
        if on && self.triangles.line.is_none() {
            log::warn!("wireframe requested but the device has no POLYGON_MODE_LINE; drawing filled");
            self.line_mode = false;
        } else {
            self.line_mode = on;
        }
        self.line_mode
    }

    pub fn line_mode(&self) -> bool {
        self.line_mode
    }

    pub fn bind_frame(&self, pass: &mut wgpu::RenderPass<'_>) {
        pass.set_bind_group(FRAME_GROUP, &self.frame_bind_group, &[]);
    }

    pub fn pipeline(&self, mode: PrimitiveMode) -> &wgpu::RenderPipeline {
        match mode {
            PrimitiveMode::Triangles => self.triangles.select(self.line_mode),
            PrimitiveMode::Points => &self.points,
            PrimitiveMode::Patches(_) => self.patches.select(self.line_mode),
        }
    }
}

/// Per-mesh bind group for the triangle and point pipelines: the model uniform.
pub fn model_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        entries: &[uniform_entry(0, wgpu::ShaderStages::VERTEX)],
        label: Some("model_bind_group_layout"),
    })
}

/// Per-mesh bind group for the patch pipeline: the model uniform followed by the
/// vertex and index buffers read as storage.
pub fn patch_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        entries: &[
            uniform_entry(0, wgpu::ShaderStages::VERTEX),
            storage_entry(1),
            storage_entry(2),
        ],
        label: Some("patch_bind_group_layout"),
    })
}

fn uniform_entry(binding: u32, visibility: wgpu::ShaderStages) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility,
        ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Uniform,
            has_dynamic_offset: false,
            min_binding_size: None,
        },
        count: None,
    }
}

fn storage_entry(binding: u32) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::VERTEX,
        ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Storage { read_only: true },
            has_dynamic_offset: false,
            min_binding_size: None,
        },
        count: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raster_uniform_is_one_vec4() {
        assert_eq!(std::mem::size_of::<RasterUniform>(), 16);
    }

    #[test]
    fn tessellation_factor_is_clamped() {
        assert_eq!(tessellation_factor(5.0), 5);
        assert_eq!(tessellation_factor(2.5), 3);
        assert_eq!(tessellation_factor(0.0), 1);
        assert_eq!(tessellation_factor(-8.0), 1);
        assert_eq!(tessellation_factor(640.0), MAX_TESSELLATION_LEVEL);
        assert_eq!(tessellation_factor(f32::NAN), 1);
    }
}
