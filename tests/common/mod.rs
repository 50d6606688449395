#![allow(dead_code)]

use std::{iter, path::PathBuf, sync::Arc, time::Duration};

use cgmath::Vector3;
use illumination::{
    Material, Mesh, Object, PrimitiveMode, Shader, Texture,
    camera::{Camera, CameraUniform, Projection},
    context::request_device,
    data_structures::texture::DepthBuffer,
    render::{FrameTarget, begin_frame_pass, encode_frame},
};

pub const WIDTH: u32 = 64;
pub const HEIGHT: u32 = 64;
pub const FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8UnormSrgb;
pub const BACKGROUND: image::Rgba<u8> = image::Rgba([0, 0, 0, 255]);

/// Set to make pixel tests fail instead of skipping when no adapter is found.
pub const REQUIRE_GPU: &str = "ILLUMINATION_REQUIRE_GPU";

async fn device_on(instance: wgpu::Instance) -> anyhow::Result<(wgpu::Device, wgpu::Queue)> {
    let adapter = instance
        .request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::default(),
            compatible_surface: None,
            force_fallback_adapter: false,
        })
        .await?;
    request_device(&adapter).await
}

/// A device on wgpu's no-op backend. Always available; it validates everything but
/// never executes, so it suits tests that do not read pixels back.
pub async fn noop_device() -> (wgpu::Device, wgpu::Queue) {
    let _ = env_logger::builder().is_test(true).try_init();
    let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
        backends: wgpu::Backends::NOOP,
        backend_options: wgpu::BackendOptions {
            noop: wgpu::NoopBackendOptions { enable: true },
            ..Default::default()
        },
        ..Default::default()
    });
    device_on(instance).await.unwrap()
}

/// A real device without a surface, for tests that read pixels back.
///
/// Without an adapter the test is skipped with a message on stderr, unless
/// [`REQUIRE_GPU`] is set, in which case it fails.
pub async fn gpu() -> Option<(wgpu::Device, wgpu::Queue)> {
    let _ = env_logger::builder().is_test(true).try_init();
    let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
        backends: wgpu::Backends::PRIMARY,
        ..Default::default()
    });
    match device_on(instance).await {
        Ok(gpu) => Some(gpu),
        Err(e) if std::env::var_os(REQUIRE_GPU).is_some() => {
            panic!("{} is set but no GPU is usable: {:#}", REQUIRE_GPU, e)
        }
        Err(e) => {
            eprintln!("SKIPPED: no GPU for pixel readback ({:#}); set {} to fail instead", e, REQUIRE_GPU);
            None
        }
    }
}

/// Wrap `mesh` into an object at `origin` with the default material and white
/// override textures.
pub fn object_at(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    mesh: &Mesh,
    origin: Vector3<f32>,
) -> Object {
    let white = Arc::new(Texture::create_solid(device, queue, [255; 4], "white"));
    Object::new(
        device,
        origin,
        Arc::new(Material::default()),
        white.clone(),
        white,
        std::slice::from_ref(mesh),
    )
    .unwrap()
}

pub fn white_object(device: &wgpu::Device, queue: &wgpu::Queue, mesh: &Mesh) -> Object {
    object_at(device, queue, mesh, Vector3::new(0.0, 0.0, 0.0))
}

/// A unique path under the system temp directory holding `contents`.
pub fn geometry_file(name: &str, contents: &str) -> PathBuf {
    let path = std::env::temp_dir().join(format!(
        "illumination-{}-{}.txt",
        std::process::id(),
        name
    ));
    std::fs::write(&path, contents).unwrap();
    path
}

/// A colour and depth target plus a shader looking at it from `eye` down -z.
pub struct Offscreen {
    pub shader: Shader,
    color: wgpu::Texture,
    color_view: wgpu::TextureView,
    depth: DepthBuffer,
}

impl Offscreen {
    pub fn new(device: &wgpu::Device, queue: &wgpu::Queue, eye: [f32; 3]) -> Self {
        let mut shader = Shader::new(device, FORMAT);
        let camera = Camera::looking_forward(eye);
        let projection = Projection::new(WIDTH, HEIGHT, 0.1, 100.0);
        let mut camera_uniform = CameraUniform::new();
        camera_uniform.update_view_proj(&camera, &projection);
        shader.set_view_projection(queue, &camera_uniform);
        shader.set_light(queue, Vector3::new(5.0, 5.0, 5.0));
        shader.set_viewport(queue, WIDTH, HEIGHT);

        let color = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("offscreen colour"),
            size: Self::extent(),
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::COPY_SRC,
            view_formats: &[],
        });
        let color_view = color.create_view(&wgpu::TextureViewDescriptor::default());
        let depth = DepthBuffer::new(device, [WIDTH, HEIGHT], "offscreen depth");
        Self {
            shader,
            color,
            color_view,
            depth,
        }
    }

    fn extent() -> wgpu::Extent3d {
        wgpu::Extent3d {
            width: WIDTH,
            height: HEIGHT,
            depth_or_array_layers: 1,
        }
    }

    /// Draw `object` with `mode` the way the application does; points are 4 pixels.
    pub fn draw(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        object: &mut Object,
        mode: PrimitiveMode,
    ) {
        let frame = encode_frame(
            device,
            queue,
            &mut self.shader,
            object,
            mode,
            4.0,
            &FrameTarget {
                color: &self.color_view,
                depth: &self.depth.view,
                clear: wgpu::Color::BLACK,
            },
        );
        queue.submit(iter::once(frame));
    }

    /// Open one cleared pass with the frame uniforms bound and let `draw` fill it.
    pub fn draw_with(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        draw: impl FnOnce(&mut wgpu::RenderPass<'_>, &mut Shader),
    ) {
        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("Test Encoder"),
        });
        {
            let target = FrameTarget {
                color: &self.color_view,
                depth: &self.depth.view,
                clear: wgpu::Color::BLACK,
            };
            let mut pass = begin_frame_pass(&mut encoder, &target);
            self.shader.bind_frame(&mut pass);
            draw(&mut pass, &mut self.shader);
        }
        queue.submit(iter::once(encoder.finish()));
    }

    /// Copy the colour attachment back to the CPU.
    pub async fn read(&self, device: &wgpu::Device, queue: &wgpu::Queue) -> image::RgbaImage {
        let u32_size = std::mem::size_of::<u32>() as u32;
        let output_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("offscreen readback"),
            size: (u32_size * WIDTH * HEIGHT) as wgpu::BufferAddress,
            usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
            mapped_at_creation: false,
        });
        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("Readback Encoder"),
        });
        encoder.copy_texture_to_buffer(
            wgpu::TexelCopyTextureInfo {
                aspect: wgpu::TextureAspect::All,
                texture: &self.color,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
            },
            wgpu::TexelCopyBufferInfo {
                buffer: &output_buffer,
                layout: wgpu::TexelCopyBufferLayout {
                    offset: 0,
                    bytes_per_row: Some(u32_size * WIDTH),
                    rows_per_image: Some(HEIGHT),
                },
            },
            Self::extent(),
        );
        queue.submit(iter::once(encoder.finish()));

        let (tx, rx) = futures_intrusive::channel::shared::oneshot_channel();
        let buffer_slice = output_buffer.slice(..);
        buffer_slice.map_async(wgpu::MapMode::Read, move |result| {
            tx.send(result).unwrap();
        });
        device
            .poll(wgpu::PollType::Wait {
                submission_index: None,
                timeout: Some(Duration::from_secs(3)),
            })
            .unwrap();
        rx.receive().await.unwrap().unwrap();
        let data = buffer_slice.get_mapped_range().to_vec();
        output_buffer.unmap();
        image::RgbaImage::from_raw(WIDTH, HEIGHT, data).unwrap()
    }
}

/// Draw `object` once from `eye` and read the result back.
pub async fn render_offscreen(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    object: &mut Object,
    mode: PrimitiveMode,
    eye: [f32; 3],
) -> image::RgbaImage {
    let mut offscreen = Offscreen::new(device, queue, eye);
    offscreen.draw(device, queue, object, mode);
    offscreen.read(device, queue).await
}
