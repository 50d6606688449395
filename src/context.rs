use std::sync::Arc;

use anyhow::Context as _;
use cgmath::Vector3;
use winit::window::Window;

use crate::{
    camera::{Camera, CameraUniform, Projection},
    config::Config,
    data_structures::texture::DepthBuffer,
    pipelines::Shader,
};

/// Features used when the adapter has them. Wireframe rendering needs line polygon mode;
/// without it the viewer draws filled only.
pub const OPTIONAL_FEATURES: wgpu::Features = wgpu::Features::POLYGON_MODE_LINE;

/// Create a device with whatever optional features `adapter` offers.
pub async fn request_device(adapter: &wgpu::Adapter) -> anyhow::Result<(wgpu::Device, wgpu::Queue)> {
    let required_features = adapter.features() & OPTIONAL_FEATURES;
    log::debug!("requesting device with {:?}", required_features);
    adapter
        .request_device(&wgpu::DeviceDescriptor {
            label: Some("illumination device"),
            required_features,
            required_limits: wgpu::Limits::default(),
            experimental_features: wgpu::ExperimentalFeatures::disabled(),
            memory_hints: Default::default(),
            trace: wgpu::Trace::Off,
        })
        .await
        .context("failed to create wgpu device/queue")
}

/// Window, GPU handles, camera and the shader program.
#[derive(Debug)]
pub struct Context {
    pub(crate) window: Arc<Window>,
    pub(crate) depth_texture: DepthBuffer,
    pub surface: wgpu::Surface<'static>,
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    pub config: wgpu::SurfaceConfiguration,
    pub camera: Camera,
    pub projection: Projection,
    pub camera_uniform: CameraUniform,
    pub shader: Shader,
    pub clear_colour: wgpu::Color,
}

impl Context {
    pub async fn new(window: Arc<Window>, settings: &Config) -> anyhow::Result<Self> {
        let size = window.inner_size();

        log::info!("WGPU setup");
        // BackendBit::PRIMARY => Vulkan + Metal + DX12 + Browser WebGPU
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::PRIMARY,
            ..Default::default()
        });

        let surface = instance
            .create_surface(window.clone())
            .context("failed to create wgpu surface")?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .context("failed to find a suitable GPU adapter")?;
        log::info!("using adapter {}", adapter.get_info().name);

        let (device, queue) = request_device(&adapter).await?;

        let surface_caps = surface.get_capabilities(&adapter);
        // The shader writes linear colour and relies on an sRGB target for the conversion.
        let surface_format = surface_caps
            .formats
            .iter()
            .copied()
            .find(|f| f.is_srgb())
            .or_else(|| surface_caps.formats.first().copied())
            .context("no supported surface formats")?;
        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: surface_caps.present_modes[0],
            alpha_mode: surface_caps.alpha_modes[0],
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };

        let mut camera = Camera::looking_forward(settings.camera.position);
        camera.sensitivity = settings.camera.sensitivity;
        let projection = Projection::new(config.width, config.height, 0.1, 100.0);
        let mut camera_uniform = CameraUniform::new();
        camera_uniform.update_view_proj(&camera, &projection);

        let mut shader = Shader::new(&device, config.format);
        shader.set_view_projection(&queue, &camera_uniform);
        shader.set_light(&queue, Vector3::from(settings.render.light_position));
        shader.set_viewport(&queue, config.width, config.height);
        shader.set_point_size(settings.render.point_size);
        shader.set_tessellation_level(&queue, settings.render.tessellation_level);

        let depth_texture =
            DepthBuffer::new(&device, [config.width, config.height], "depth_texture");

        Ok(Self {
            window,
            depth_texture,
            surface,
            device,
            queue,
            config,
            camera,
            projection,
            camera_uniform,
            shader,
            clear_colour: settings.render.clear_colour(),
        })
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.config.width = width;
        self.config.height = height;
        self.projection.resize(width, height);
        self.surface.configure(&self.device, &self.config);
        self.shader.set_viewport(&self.queue, width, height);
        self.depth_texture =
            DepthBuffer::new(&self.device, [width, height], "depth_texture");
    }

    /// Upload the current `view`, `projection` and `cameraPos`.
    pub fn update_camera(&mut self) {
        self.camera_uniform
            .update_view_proj(&self.camera, &self.projection);
        self.shader
            .set_view_projection(&self.queue, &self.camera_uniform);
    }
}
