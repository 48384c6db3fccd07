//! Window, event loop and the per-frame update of the viewer.
//!
//! # Lifecycle
//!
//! Each frame:
//! 1. Window and device events update the cursor, the camera controller and the
//!    viewer controls
//! 2. The camera and the shared model transform are applied to the scene
//! 3. [`PickingPipeline`] runs the id pass, reads the texel under the cursor and
//!    draws the visible pass
//! 4. The window title shows what is picked
//!
//! # Controls
//!
//! | key            | action                                 |
//! |----------------|----------------------------------------|
//! | W A S D        | fly                                    |
//! | Space / LShift | up / down                              |
//! | right drag     | look around                            |
//! | arrows         | rotate the objects                     |
//! | + / -          | scale the objects                      |
//! | R              | reset rotation and scale               |
//! | T              | toggle texturing                       |
//! | B              | toggle Blinn-Phong                     |
//! | L              | cycle directional, point and spot light |

use std::sync::Arc;

use cgmath::Vector3;
use instant::Instant;
use winit::{
    application::ApplicationHandler,
    dpi::{PhysicalPosition, PhysicalSize},
    event::{DeviceEvent, DeviceId, ElementState, KeyEvent, MouseButton, WindowEvent},
    event_loop::{ActiveEventLoop, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::{Window, WindowId},
};

use crate::{
    config::ViewerConfig,
    context::Context,
    frame::FrameContext,
    gpu::GpuBackend,
    pick::PickingPipeline,
    pipelines::light::Shading,
    render::GpuFrame,
    scene::{ModelControls, ObjectId, Scene, StockTextures, stock_scene},
};

const ROTATION_STEP: f32 = 0.1;
const SCALING_STEP: f32 = 0.05;

/// Apply a viewer control key. Returns `false` for keys the viewer does not use.
pub fn apply_key(key: KeyCode, controls: &mut ModelControls, shading: &mut Shading) -> bool {
    match key {
        KeyCode::ArrowLeft => controls.rotate(Vector3::new(0.0, -ROTATION_STEP, 0.0)),
        KeyCode::ArrowRight => controls.rotate(Vector3::new(0.0, ROTATION_STEP, 0.0)),
        KeyCode::ArrowUp => controls.rotate(Vector3::new(-ROTATION_STEP, 0.0, 0.0)),
        KeyCode::ArrowDown => controls.rotate(Vector3::new(ROTATION_STEP, 0.0, 0.0)),
        KeyCode::Equal | KeyCode::NumpadAdd => controls.scale_by(SCALING_STEP),
        KeyCode::Minus | KeyCode::NumpadSubtract => controls.scale_by(-SCALING_STEP),
        KeyCode::KeyR => *controls = ModelControls::default(),
        KeyCode::KeyT => {
            shading.use_texture = !shading.use_texture;
            log::info!("Texturing {}", on_off(shading.use_texture));
        }
        KeyCode::KeyB => {
            shading.light.use_blinn_phong = !shading.light.use_blinn_phong;
            log::info!("Blinn-Phong {}", on_off(shading.light.use_blinn_phong));
        }
        KeyCode::KeyL => {
            shading.light.kind = shading.light.kind.next();
            log::info!("{:?} light", shading.light.kind);
        }
        _ => return false,
    }
    true
}

fn on_off(flag: bool) -> &'static str {
    if flag { "on" } else { "off" }
}

/// What the title shows for the current pick.
pub fn picked_label<B: GpuBackend>(scene: &Scene<B>, picked: Option<ObjectId>) -> &str {
    picked.and_then(|id| scene.name(id)).unwrap_or("N/A")
}

pub struct AppState {
    pub(crate) ctx: Context,
    scene: Scene<wgpu::Device>,
    picking: PickingPipeline,
    controls: ModelControls,
    shading: Shading,
    cursor: Option<PhysicalPosition<f64>>,
    looking: bool,
    title: String,
    label: String,
    is_surface_configured: bool,
}

impl AppState {
    async fn new(window: Arc<Window>, config: &ViewerConfig) -> anyhow::Result<Self> {
        let mut ctx = Context::new(window, config).await?;
        let textures = StockTextures {
            earth: Some(ctx.add_texture(&config.assets, &config.earth_texture).await),
            crate_box: Some(ctx.add_texture(&config.assets, &config.box_texture).await),
        };
        let scene = stock_scene(&ctx.device, config, textures)?;
        log::info!("Scene ready with {} objects", scene.len());

        Ok(Self {
            ctx,
            scene,
            picking: PickingPipeline::new(),
            controls: ModelControls::default(),
            shading: Shading::default(),
            cursor: None,
            looking: false,
            title: config.title.clone(),
            label: String::new(),
            is_surface_configured: false,
        })
    }

    fn resize(&mut self, width: u32, height: u32) {
        if self.ctx.resize(width, height) {
            self.is_surface_configured = true;
        }
    }

    fn frame_context(&self) -> FrameContext {
        FrameContext {
            view: self.ctx.camera.camera.calc_matrix(),
            projection: self.ctx.projection.calc_matrix(),
            eye: self.ctx.camera.camera.position,
            cursor: self.cursor,
            shading: self.shading,
        }
    }

    fn update(&mut self, dt: instant::Duration) {
        let camera = &mut self.ctx.camera;
        camera.controller.update(&mut camera.camera, dt);
        self.controls.apply(&mut self.scene);
    }

    fn render(&mut self, runtime: &tokio::runtime::Runtime) -> Result<(), wgpu::SurfaceError> {
        self.ctx.window.request_redraw();

        // Rendering requires the surface to be configured
        if !self.is_surface_configured {
            return Ok(());
        }

        let output = self.ctx.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let frame = self.frame_context();
        let picked = {
            let mut renderer = GpuFrame::new(&self.ctx, &view, runtime);
            self.picking.render_frame(&mut renderer, &self.scene, &frame)
        };
        output.present();

        match picked {
            Ok(picked) => self.show_pick(picked),
            Err(e) => log::error!("Frame failed: {e:#}"),
        }
        Ok(())
    }

    fn show_pick(&mut self, picked: Option<ObjectId>) {
        let label = picked_label(&self.scene, picked);
        if label != self.label {
            self.label = label.to_string();
            self.ctx
                .window
                .set_title(&format!("{} - picked: {}", self.title, self.label));
        }
    }
}

pub struct App {
    async_runtime: tokio::runtime::Runtime,
    config: ViewerConfig,
    state: Option<AppState>,
    error: Option<anyhow::Error>,
    last_time: Instant,
}

impl App {
    pub fn new(config: ViewerConfig) -> anyhow::Result<Self> {
        Ok(Self {
            async_runtime: tokio::runtime::Runtime::new()?,
            config,
            state: None,
            error: None,
            last_time: Instant::now(),
        })
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, error: anyhow::Error) {
        log::error!("{error:#}");
        self.error = Some(error);
        event_loop.exit();
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.state.is_some() {
            return;
        }
        let window_attributes = Window::default_attributes()
            .with_title(&self.config.title)
            .with_inner_size(PhysicalSize::new(self.config.width, self.config.height));
        let window = match event_loop.create_window(window_attributes) {
            Ok(window) => Arc::new(window),
            Err(e) => return self.fail(event_loop, e.into()),
        };

        match self
            .async_runtime
            .block_on(AppState::new(window, &self.config))
        {
            Ok(state) => {
                state.ctx.window.request_redraw();
                self.state = Some(state);
                self.last_time = Instant::now();
            }
            Err(e) => self.fail(event_loop, e.context("viewer initialisation failed")),
        }
    }

    fn device_event(&mut self, _event_loop: &ActiveEventLoop, _device_id: DeviceId, event: DeviceEvent) {
        let Some(state) = &mut self.state else {
            return;
        };
        if let DeviceEvent::MouseMotion { delta: (dx, dy) } = event {
            if state.looking {
                state.ctx.camera.controller.handle_mouse(dx, dy);
            }
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _window_id: WindowId, event: WindowEvent) {
        let Some(state) = &mut self.state else {
            return;
        };

        state.ctx.camera.controller.handle_window_events(&event);

        match event {
            WindowEvent::CloseRequested => event_loop.exit(),
            WindowEvent::Resized(size) => state.resize(size.width, size.height),
            WindowEvent::CursorMoved { position, .. } => state.cursor = Some(position),
            WindowEvent::CursorLeft { .. } => state.cursor = None,
            WindowEvent::MouseInput {
                state: button_state,
                button: MouseButton::Right,
                ..
            } => state.looking = button_state.is_pressed(),
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(KeyCode::Escape),
                        state: ElementState::Pressed,
                        ..
                    },
                ..
            } => event_loop.exit(),
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(key),
                        state: ElementState::Pressed,
                        repeat,
                        ..
                    },
                ..
            } => {
                // Held keys repeat for the continuous controls only.
                let toggles = matches!(key, KeyCode::KeyT | KeyCode::KeyB | KeyCode::KeyL);
                if !(repeat && toggles) {
                    apply_key(key, &mut state.controls, &mut state.shading);
                }
            }
            WindowEvent::RedrawRequested => {
                let dt = self.last_time.elapsed();
                self.last_time = Instant::now();
                state.update(dt);

                match state.render(&self.async_runtime) {
                    Ok(()) => {}
                    // Reconfigure the surface if it's lost or outdated
                    Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                        let size = state.ctx.window.inner_size();
                        state.resize(size.width, size.height);
                    }
                    Err(e) => log::error!("Unable to render {e}"),
                }
            }
            _ => {}
        }
    }
}

/// Open the viewer window and run until it is closed.
///
/// Errors during setup (window, GPU device, geometry upload) end the program
/// and are returned here.
pub fn run(config: ViewerConfig) -> anyhow::Result<()> {
    if let Err(e) = env_logger::try_init() {
        eprintln!("Warning: Could not initialize logger: {e}");
    }

    let event_loop = EventLoop::new()?;
    let mut app = App::new(config)?;
    event_loop.run_app(&mut app)?;

    match app.error.take() {
        Some(e) => Err(e),
        None => Ok(()),
    }
}
