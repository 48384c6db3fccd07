//! Render pipelines and their shaders.
//!
//! Bind group slots are shared between the pipelines:
//!
//! | group | shaded          | pick   | skybox  |
//! |-------|-----------------|--------|---------|
//! | 0     | camera          | camera | camera  |
//! | 1     | object          | object | cubemap |
//! | 2     | light/material  |        |         |
//! | 3     | diffuse texture |        |         |

pub mod basic;
pub mod light;
pub mod pick;
pub mod skybox;

#[derive(Debug)]
pub struct Pipelines {
    pub shaded: wgpu::RenderPipeline,
    pub pick: wgpu::RenderPipeline,
    pub skybox: wgpu::RenderPipeline,
}

/// The bind group layouts the pipelines are built against.
pub struct Layouts<'a> {
    pub camera: &'a wgpu::BindGroupLayout,
    pub object: &'a wgpu::BindGroupLayout,
    pub shading: &'a wgpu::BindGroupLayout,
    pub texture: &'a wgpu::BindGroupLayout,
    pub cubemap: &'a wgpu::BindGroupLayout,
}

impl Pipelines {
    pub fn new(device: &wgpu::Device, color_format: wgpu::TextureFormat, layouts: &Layouts) -> Self {
        Self {
            shaded: basic::mk_shaded_pipeline(
                device,
                color_format,
                layouts.camera,
                layouts.object,
                layouts.shading,
                layouts.texture,
            ),
            pick: pick::mk_pick_pipeline(device, layouts.camera, layouts.object),
            skybox: skybox::mk_skybox_pipeline(device, color_format, layouts.camera, layouts.cubemap),
        }
    }
}
