//! Draw lists and the renderer the picking pipeline talks to.
//!
//! [`PickingPipeline`](crate::pick::PickingPipeline) never records GPU commands
//! itself. It builds two draw lists per frame, one for the id pass and one for
//! the visible pass, and hands them to a [`FrameRenderer`]. [`GpuFrame`] is the
//! wgpu implementation used by the viewer.
//!
//! # Key types
//!
//! - [`IdDraw`] is one object in the id pass: geometry, model matrix, pick colour
//! - [`ShadedDraw`] is one object in the visible pass, flagged when it is picked
//! - [`ObjectUniforms`] is the dynamic-offset uniform buffer both passes share

use std::iter;

use anyhow::{Context as _, ensure};
use cgmath::Matrix4;

use crate::{
    context::Context,
    data_structures::{
        geometry::GeometryBuffer, pick_id::PickId, transform::ObjectUniform,
    },
    frame::FrameContext,
    gpu::GpuBackend,
    pick::PixelCoord,
    scene::{ObjectId, TextureSlot},
};

/// One pickable object painted in its flat pick colour.
pub struct IdDraw<'a, B: GpuBackend> {
    pub object: ObjectId,
    pub geometry: &'a GeometryBuffer<B>,
    pub model: Matrix4<f32>,
    pub pick_id: PickId,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DrawStyle {
    /// Textured and lit, highlighted when picked.
    Lit,
    /// Cubemap backdrop drawn at the far plane.
    Skybox,
}

pub struct ShadedDraw<'a, B: GpuBackend> {
    pub object: ObjectId,
    pub geometry: &'a GeometryBuffer<B>,
    pub model: Matrix4<f32>,
    pub texture: Option<TextureSlot>,
    pub is_picked: bool,
    pub style: DrawStyle,
}

/// The two passes and the read-back between them.
pub trait FrameRenderer {
    type Backend: GpuBackend;

    /// Size of the offscreen id target in pixels.
    fn pick_target_size(&self) -> (u32, u32);

    /// Clear the id target and paint every draw in its pick colour.
    fn draw_ids(
        &mut self,
        frame: &FrameContext,
        draws: &[IdDraw<'_, Self::Backend>],
    ) -> anyhow::Result<()>;

    /// Read one texel of the id target. Only called with in-bounds coordinates.
    fn read_pixel(&mut self, pixel: PixelCoord) -> anyhow::Result<[u8; 3]>;

    fn draw_shaded(
        &mut self,
        frame: &FrameContext,
        draws: &[ShadedDraw<'_, Self::Backend>],
    ) -> anyhow::Result<()>;
}

/**
 * Per-object uniforms for a whole frame in one buffer.
 *
 * Slot `i` starts at `i * stride`, where the stride is the object uniform size
 * rounded up to the device's dynamic offset alignment.
 */
#[derive(Debug)]
pub struct ObjectUniforms {
    pub buffer: wgpu::Buffer,
    pub bind_group: wgpu::BindGroup,
    pub bind_group_layout: wgpu::BindGroupLayout,
    stride: u32,
    capacity: u32,
}

impl ObjectUniforms {
    pub const CAPACITY: u32 = 32;

    pub fn new(device: &wgpu::Device) -> Self {
        let size = std::mem::size_of::<ObjectUniform>() as u32;
        let stride = aligned_stride(size, device.limits().min_uniform_buffer_offset_alignment);
        let buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Object Uniform Buffer"),
            size: u64::from(stride * Self::CAPACITY),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: true,
                    min_binding_size: wgpu::BufferSize::new(u64::from(size)),
                },
                count: None,
            }],
            label: Some("object_bind_group_layout"),
        });
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout: &bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                    buffer: &buffer,
                    offset: 0,
                    size: wgpu::BufferSize::new(u64::from(size)),
                }),
            }],
            label: Some("object_bind_group"),
        });
        Self {
            buffer,
            bind_group,
            bind_group_layout,
            stride,
            capacity: Self::CAPACITY,
        }
    }

    /// Upload `uniforms` into slots `0..len` and return each slot's dynamic offset.
    pub fn write(
        &self,
        queue: &wgpu::Queue,
        uniforms: &[ObjectUniform],
    ) -> anyhow::Result<Vec<u32>> {
        ensure!(
            uniforms.len() <= self.capacity as usize,
            "{} objects exceed the {} per-frame uniform slots",
            uniforms.len(),
            self.capacity
        );
        let bytes = pack_slots(uniforms, self.stride as usize);
        if !bytes.is_empty() {
            queue.write_buffer(&self.buffer, 0, &bytes);
        }
        Ok((0..uniforms.len() as u32).map(|i| i * self.stride).collect())
    }
}

fn aligned_stride(size: u32, alignment: u32) -> u32 {
    let alignment = alignment.max(1);
    size.div_ceil(alignment) * alignment
}

fn pack_slots(uniforms: &[ObjectUniform], stride: usize) -> Vec<u8> {
    let mut bytes = vec![0u8; uniforms.len() * stride];
    for (slot, uniform) in bytes.chunks_exact_mut(stride).zip(uniforms) {
        let raw = bytemuck::bytes_of(uniform);
        slot[..raw.len()].copy_from_slice(raw);
    }
    bytes
}

/// Renders one frame of the viewer with wgpu.
pub struct GpuFrame<'a> {
    ctx: &'a Context,
    target: &'a wgpu::TextureView,
    runtime: &'a tokio::runtime::Runtime,
}

impl<'a> GpuFrame<'a> {
    pub fn new(
        ctx: &'a Context,
        target: &'a wgpu::TextureView,
        runtime: &'a tokio::runtime::Runtime,
    ) -> Self {
        Self {
            ctx,
            target,
            runtime,
        }
    }

    fn write_camera(&self, frame: &FrameContext) {
        self.ctx
            .camera
            .write(&self.ctx.queue, frame.view, frame.projection, frame.eye);
    }

    fn texture_group(&self, slot: Option<TextureSlot>) -> &wgpu::BindGroup {
        slot.and_then(|slot| self.ctx.textures.get(slot.0))
            .unwrap_or(&self.ctx.fallback_texture)
    }
}

impl FrameRenderer for GpuFrame<'_> {
    type Backend = wgpu::Device;

    fn pick_target_size(&self) -> (u32, u32) {
        self.ctx.pick.size()
    }

    fn draw_ids(
        &mut self,
        frame: &FrameContext,
        draws: &[IdDraw<'_, wgpu::Device>],
    ) -> anyhow::Result<()> {
        self.write_camera(frame);
        let uniforms: Vec<_> = draws
            .iter()
            .map(|draw| ObjectUniform::new(draw.model, Some(draw.pick_id), false))
            .collect();
        let offsets = self.ctx.objects.write(&self.ctx.queue, &uniforms)?;

        let mut encoder = self
            .ctx
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Pick Encoder"),
            });
        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Pick Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &self.ctx.pick.view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::TRANSPARENT),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.ctx.pick.depth.view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                ..Default::default()
            });

            render_pass.set_pipeline(&self.ctx.pipelines.pick);
            render_pass.set_bind_group(0, &self.ctx.camera.bind_group, &[]);
            for (draw, offset) in draws.iter().zip(offsets) {
                render_pass.set_bind_group(1, &self.ctx.objects.bind_group, &[offset]);
                draw.geometry.draw(&mut render_pass);
            }
        }
        self.ctx.queue.submit(iter::once(encoder.finish()));
        Ok(())
    }

    fn read_pixel(&mut self, pixel: PixelCoord) -> anyhow::Result<[u8; 3]> {
        self.ctx
            .pick
            .read_pixel(&self.ctx.device, &self.ctx.queue, self.runtime, pixel)
            .with_context(|| format!("reading pick texel at {pixel}"))
    }

    fn draw_shaded(
        &mut self,
        frame: &FrameContext,
        draws: &[ShadedDraw<'_, wgpu::Device>],
    ) -> anyhow::Result<()> {
        self.write_camera(frame);
        self.ctx.shading.update(&self.ctx.queue, &frame.shading);

        // The skybox only fills what the lit objects left at the far plane.
        let (lit, backdrop): (Vec<_>, Vec<_>) =
            draws.iter().partition(|draw| draw.style == DrawStyle::Lit);
        let uniforms: Vec<_> = lit
            .iter()
            .map(|draw| ObjectUniform::new(draw.model, None, draw.is_picked))
            .collect();
        let offsets = self.ctx.objects.write(&self.ctx.queue, &uniforms)?;

        let mut encoder = self
            .ctx
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });
        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: self.target,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(self.ctx.clear_colour),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.ctx.depth_texture.view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                ..Default::default()
            });

            render_pass.set_pipeline(&self.ctx.pipelines.shaded);
            render_pass.set_bind_group(0, &self.ctx.camera.bind_group, &[]);
            render_pass.set_bind_group(2, &self.ctx.shading.bind_group, &[]);
            for (draw, offset) in lit.iter().zip(offsets) {
                render_pass.set_bind_group(1, &self.ctx.objects.bind_group, &[offset]);
                render_pass.set_bind_group(3, self.texture_group(draw.texture), &[]);
                draw.geometry.draw(&mut render_pass);
            }

            if !backdrop.is_empty() {
                render_pass.set_pipeline(&self.ctx.pipelines.skybox);
                render_pass.set_bind_group(0, &self.ctx.camera.bind_group, &[]);
                render_pass.set_bind_group(1, &self.ctx.skybox, &[]);
                for draw in backdrop {
                    draw.geometry.draw(&mut render_pass);
                }
            }
        }
        self.ctx.queue.submit(iter::once(encoder.finish()));
        Ok(())
    }
}
