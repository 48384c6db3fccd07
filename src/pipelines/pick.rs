use wgpu::{BindGroupLayout, PipelineLayout};

use crate::{
    data_structures::vertex::Vertex,
    pick::PickTarget,
    pipelines::basic::{DepthTest, mk_render_pipeline},
};

fn pick_render_pipeline_layout(
    device: &wgpu::Device,
    camera_bind_group_layout: &BindGroupLayout,
    object_bind_group_layout: &BindGroupLayout,
) -> PipelineLayout {
    device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some("Render Pipeline Layout (For picking)"),
        bind_group_layouts: &[camera_bind_group_layout, object_bind_group_layout],
        immediate_size: 0,
    })
}

/// Flat colour, no blending: the id target must hold the exact pick colours.
pub fn mk_pick_pipeline(
    device: &wgpu::Device,
    camera_bind_group_layout: &BindGroupLayout,
    object_bind_group_layout: &BindGroupLayout,
) -> wgpu::RenderPipeline {
    let layout =
        pick_render_pipeline_layout(device, camera_bind_group_layout, object_bind_group_layout);
    let shader = wgpu::ShaderModuleDescriptor {
        label: Some("Pick Shader"),
        source: wgpu::ShaderSource::Wgsl(include_str!("pick.wgsl").into()),
    };
    mk_render_pipeline(
        device,
        "Pick Pipeline",
        &layout,
        PickTarget::FORMAT,
        None,
        Some(DepthTest::opaque()),
        &[Vertex::desc()],
        shader,
    )
}
