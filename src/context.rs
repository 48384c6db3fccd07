use std::sync::Arc;

use winit::window::Window;

use crate::{
    camera::{self, CameraResources, Projection},
    config::ViewerConfig,
    data_structures::texture,
    gpu::GpuError,
    pick::PickTarget,
    pipelines::{
        Layouts, Pipelines,
        light::{Shading, ShadingResources},
    },
    render::ObjectUniforms,
    resources::{self, texture::mk_texture_bind_group},
    scene::TextureSlot,
};

/// Everything on the GPU side of the viewer: device, surface, pipelines and
/// the resources their bind groups point at.
#[derive(Debug)]
pub struct Context {
    pub(crate) window: Arc<Window>,
    pub(crate) depth_texture: texture::Texture,
    pub surface: wgpu::Surface<'static>,
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    pub config: wgpu::SurfaceConfiguration,
    pub camera: CameraResources,
    pub projection: Projection,
    pub shading: ShadingResources,
    pub objects: ObjectUniforms,
    pub pipelines: Pipelines,
    pub texture_layout: wgpu::BindGroupLayout,
    pub textures: Vec<wgpu::BindGroup>,
    pub fallback_texture: wgpu::BindGroup,
    pub skybox: wgpu::BindGroup,
    pub pick: PickTarget,
    pub clear_colour: wgpu::Color,
}

impl Context {
    pub async fn new(window: Arc<Window>, viewer: &ViewerConfig) -> anyhow::Result<Self> {
        let size = window.inner_size();

        log::info!("WGPU setup");
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::PRIMARY,
            ..Default::default()
        });

        let surface = instance
            .create_surface(window.clone())
            .map_err(GpuError::from)?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .map_err(GpuError::from)?;
        log::info!("Using adapter {}", adapter.get_info().name);

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: None,
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                memory_hints: Default::default(),
                trace: wgpu::Trace::Off,
                ..Default::default()
            })
            .await
            .map_err(GpuError::from)?;

        let surface_caps = surface.get_capabilities(&adapter);
        // The shaders assume an sRGB surface; anything else renders too dark.
        let surface_format = surface_caps
            .formats
            .iter()
            .copied()
            .find(|f| f.is_srgb())
            .unwrap_or(surface_caps.formats[0]);
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

        let camera = camera::Camera::new((0.0, 0.0, 2.5), cgmath::Deg(-90.0), cgmath::Deg(0.0));
        let projection =
            Projection::new(config.width, config.height, cgmath::Deg(45.0), 0.1, 100.0);
        let camera = CameraResources::new(&device, camera, camera::CameraController::new(2.0, 0.4));

        let depth_texture = texture::Texture::create_depth_texture(
            &device,
            [config.width, config.height],
            "depth_texture",
        );

        let shading = ShadingResources::new(&device, &Shading::default());
        let objects = ObjectUniforms::new(&device);
        let texture_layout = resources::texture::diffuse_layout(&device);
        let cubemap_layout = resources::texture::cubemap_layout(&device);
        let pipelines = Pipelines::new(
            &device,
            config.format,
            &Layouts {
                camera: &camera.bind_group_layout,
                object: &objects.bind_group_layout,
                shading: &shading.bind_group_layout,
                texture: &texture_layout,
                cubemap: &cubemap_layout,
            },
        );

        let fallback = texture::Texture::solid_colour(
            &device,
            &queue,
            resources::FALLBACK_COLOUR,
            "fallback texture",
        );
        let fallback_texture =
            mk_texture_bind_group(&device, &texture_layout, &fallback, "fallback_bind_group");

        let cubemap =
            resources::load_cubemap(&viewer.assets, &viewer.skybox_faces, &device, &queue).await?;
        let skybox = mk_texture_bind_group(&device, &cubemap_layout, &cubemap, "skybox_bind_group");

        // The id target matches the window's pixel buffer when it is created.
        let pick = PickTarget::new(&device, config.width, config.height);

        Ok(Self {
            window,
            depth_texture,
            surface,
            device,
            queue,
            config,
            camera,
            projection,
            shading,
            objects,
            pipelines,
            texture_layout,
            textures: Vec::new(),
            fallback_texture,
            skybox,
            pick,
            clear_colour: wgpu::Color::BLACK,
        })
    }

    /// Load a diffuse texture and return the slot scene objects refer to it by.
    pub async fn add_texture(&mut self, assets: &std::path::Path, file_name: &str) -> TextureSlot {
        let texture = resources::load_texture(assets, file_name, &self.device, &self.queue).await;
        let bind_group =
            mk_texture_bind_group(&self.device, &self.texture_layout, &texture, file_name);
        self.textures.push(bind_group);
        TextureSlot(self.textures.len() - 1)
    }

    pub fn window(&self) -> &Window {
        &self.window
    }

    /// Reconfigure the surface and rebuild everything sized to it.
    ///
    /// Zero-sized windows (minimised) are ignored.
    pub fn resize(&mut self, width: u32, height: u32) -> bool {
        if width == 0 || height == 0 {
            return false;
        }
        self.config.width = width;
        self.config.height = height;
        self.projection.resize(width, height);
        self.surface.configure(&self.device, &self.config);
        self.depth_texture =
            texture::Texture::create_depth_texture(&self.device, [width, height], "depth_texture");
        self.pick = PickTarget::new(&self.device, width, height);
        true
    }
}
