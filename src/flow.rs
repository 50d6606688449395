//! Application event loop.
//!
//! [`run`] reads the settings, opens a window, loads the configured mesh into an
//! [`Object`] and then, every frame:
//! 1. applies held keys through [`Controls`] (camera movement, object spin, render settings)
//! 2. uploads `view`, `projection` and `cameraPos`
//! 3. draws the object in the configured mode
//! 4. presents the frame

use std::{iter, sync::Arc};

use anyhow::Context as _;
use cgmath::{Vector3, Zero};
use instant::Instant;
use winit::{
    application::ApplicationHandler,
    dpi::PhysicalSize,
    event::{KeyEvent, WindowEvent},
    event_loop::{ActiveEventLoop, EventLoop},
    keyboard::PhysicalKey,
    window::Window,
};

use crate::{
    config::{Args, Config},
    context::Context,
    controls::Controls,
    data_structures::{material::Material, mesh::Mesh, object::Object, transform::Transform},
    render::{FrameTarget, PrimitiveMode, encode_frame},
    resources::texture::load_texture_or_white,
};

/// GPU context plus the scene and input state.
#[derive(Debug)]
pub struct AppState {
    pub(crate) ctx: Context,
    object: Object,
    controls: Controls,
    mode: PrimitiveMode,
    point_size: f32,
    is_surface_configured: bool,
}

impl AppState {
    async fn new(window: Arc<Window>, settings: &Config) -> anyhow::Result<Self> {
        let ctx = Context::new(window, settings)
            .await
            .context("cannot create the main context")?;

        let (mesh, issues) = Mesh::from_file(&ctx.device, &settings.mesh, Transform::new())
            .with_context(|| format!("cannot load mesh '{}'", settings.mesh.display()))?;
        if !issues.is_empty() {
            log::warn!(
                "{} line(s) of '{}' were skipped",
                issues.len(),
                settings.mesh.display()
            );
        }

        let texture = Arc::new(load_texture_or_white(
            settings.texture.as_deref(),
            &ctx.device,
            &ctx.queue,
        ));
        let material = Arc::new(Material::from(&settings.material));
        let object = Object::new(
            &ctx.device,
            Vector3::zero(),
            material,
            texture.clone(),
            texture,
            std::slice::from_ref(&mesh),
        )?;

        let controls = Controls::new(
            settings.camera.speed,
            settings.render.spin_speed,
            settings.render.tessellation_level,
        );
        let mode = settings.render.primitive_mode();
        log::info!("rendering '{}' as {}", settings.mesh.display(), mode);

        Ok(Self {
            ctx,
            object,
            controls,
            mode,
            point_size: settings.render.point_size,
            is_surface_configured: false,
        })
    }

    fn resize(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.ctx.resize(width, height);
            self.is_surface_configured = true;
        }
    }

    fn update(&mut self, dt: instant::Duration) {
        let spin = self.controls.update(&mut self.ctx.camera, dt);
        self.object.rotate_around_origin(spin);
        self.ctx.update_camera();

        let ctx = &mut self.ctx;
        ctx.shader
            .set_tessellation_level(&ctx.queue, self.controls.tessellation_level());
        if self.controls.line_mode() != ctx.shader.line_mode() {
            let line_mode = ctx.shader.set_line_mode(self.controls.line_mode());
            self.controls.set_line_mode(line_mode);
        }
    }

    fn render(&mut self) -> Result<(), wgpu::SurfaceError> {
        self.ctx.window.request_redraw();

        // Rendering requires the surface to be configured
        if !self.is_surface_configured {
            return Ok(());
        }

        let output = self.ctx.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let ctx = &mut self.ctx;
        let commands = encode_frame(
            &ctx.device,
            &ctx.queue,
            &mut ctx.shader,
            &mut self.object,
            self.mode,
            self.point_size,
            &FrameTarget {
                color: &view,
                depth: &ctx.depth_texture.view,
                clear: ctx.clear_colour,
            },
        );
        ctx.queue.submit(iter::once(commands));
        output.present();
        Ok(())
    }
}

pub struct App {
    async_runtime: tokio::runtime::Runtime,
    settings: Config,
    state: Option<AppState>,
    last_time: Instant,
}

impl App {
    fn new(settings: Config) -> anyhow::Result<Self> {
        let async_runtime = tokio::runtime::Runtime::new().context("cannot start the async runtime")?;
        Ok(Self {
            async_runtime,
            settings,
            state: None,
            last_time: Instant::now(),
        })
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.state.is_some() {
            return;
        }
        let window_attributes = Window::default_attributes()
            .with_title(self.settings.window.title.clone())
            .with_inner_size(PhysicalSize::new(
                self.settings.window.width,
                self.settings.window.height,
            ));
        let window = match event_loop.create_window(window_attributes) {
            Ok(window) => Arc::new(window),
            Err(e) => {
                log::error!("cannot create a window: {}", e);
                event_loop.exit();
                return;
            }
        };

        match self
            .async_runtime
            .block_on(AppState::new(window, &self.settings))
        {
            Ok(state) => {
                self.state = Some(state);
                self.last_time = Instant::now();
            }
            Err(e) => {
                log::error!("{:#}", e);
                event_loop.exit();
            }
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: winit::window::WindowId,
        event: WindowEvent,
    ) {
        let state = match &mut self.state {
            Some(state) => state,
            None => return,
        };

        match event {
            WindowEvent::CloseRequested => event_loop.exit(),
            WindowEvent::Resized(size) => state.resize(size.width, size.height),
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(code),
                        state: key_state,
                        ..
                    },
                ..
            } => {
                state.controls.process_key(code, key_state);
                if state.controls.exit_requested() {
                    event_loop.exit();
                }
            }
            WindowEvent::CursorMoved { position, .. } => {
                state
                    .controls
                    .process_cursor(&mut state.ctx.camera, position.x, position.y);
            }
            WindowEvent::MouseWheel { delta, .. } => {
                state
                    .controls
                    .process_scroll(&mut state.ctx.camera, &delta);
            }
            WindowEvent::RedrawRequested => {
                let dt = self.last_time.elapsed();
                self.last_time = Instant::now();
                state.update(dt);

                match state.render() {
                    Ok(_) => {}
                    // Reconfigure the surface if it's lost or outdated
                    Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                        let size = state.ctx.window.inner_size();
                        state.resize(size.width, size.height);
                    }
                    Err(e) => {
                        log::error!("Unable to render {}", e);
                    }
                }
            }
            _ => {}
        }
    }
}

pub fn run(args: Args) -> anyhow::Result<()> {
    if let Err(e) = env_logger::try_init() {
        println!("Warning: Could not initialize logger: {}", e);
    };
    let settings = Config::from_args(&args);

    let event_loop = EventLoop::new()?;
    let mut app = App::new(settings)?;
    event_loop.run_app(&mut app)?;

    Ok(())
}
