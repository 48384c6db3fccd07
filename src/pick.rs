//! Colour-ID object picking.
//!
//! Every pickable object is painted into an offscreen texture in its own flat
//! colour. The texel under the cursor is then copied back to the CPU and
//! compared against each object's [`PickId`](crate::data_structures::pick_id::PickId).
//!
//! The picking pipeline works as follows:
//! 1. Clear the id target to transparent black and draw all pickable objects in their pick colours
//! 2. Convert the cursor to a texel of the id target, skipping the read if it falls outside
//! 3. Copy that single texel into a staging buffer and block until it is mapped
//! 4. Match the sample against the scene, first match wins, no match means nothing is picked
//! 5. Draw the visible pass, flagging the picked object so the shader can highlight it
//!
//! The id target is created at a fixed size. It does not follow the window; the
//! viewer recreates it on resize.

use std::{fmt, iter};

use anyhow::{Context as _, ensure};
use futures_intrusive::channel::shared::{OneshotReceiver, oneshot_channel};
use winit::dpi::PhysicalPosition;

use crate::{
    data_structures::texture::Texture,
    frame::FrameContext,
    render::{DrawStyle, FrameRenderer, IdDraw, ShadedDraw},
    scene::{ObjectId, Scene},
};

/// A texel of the id target. Origin top-left, like the cursor and like wgpu textures.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PixelCoord {
    pub x: u32,
    pub y: u32,
}

impl fmt::Display for PixelCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Map a cursor position onto the id target.
///
/// Returns `None` when there is no cursor, or when it is negative, not finite,
/// or at or beyond the target's width or height.
pub fn cursor_to_pixel(
    cursor: Option<PhysicalPosition<f64>>,
    (width, height): (u32, u32),
) -> Option<PixelCoord> {
    let cursor = cursor?;
    let (x, y) = (cursor.x.floor(), cursor.y.floor());
    if !x.is_finite() || !y.is_finite() || x < 0.0 || y < 0.0 {
        return None;
    }
    if x >= f64::from(width) || y >= f64::from(height) {
        return None;
    }
    Some(PixelCoord {
        x: x as u32,
        y: y as u32,
    })
}

/// The offscreen target of the id pass plus the buffer its texels are read through.
#[derive(Debug)]
pub struct PickTarget {
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
    pub depth: Texture,
    staging: wgpu::Buffer,
    size: (u32, u32),
}

impl PickTarget {
    pub const FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8Unorm;
    const BYTES_PER_TEXEL: u32 = 4;

    pub fn new(device: &wgpu::Device, width: u32, height: u32) -> Self {
        let size = (width.max(1), height.max(1));
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Pick texture"),
            size: wgpu::Extent3d {
                width: size.0,
                height: size.1,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: Self::FORMAT,
            usage: wgpu::TextureUsages::COPY_SRC | wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let depth = Texture::create_depth_texture(device, [size.0, size.1], "Pick depth texture");
        // A single texel, but buffer copies need a 256 byte row pitch.
        let staging = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Pick staging buffer"),
            size: u64::from(wgpu::COPY_BYTES_PER_ROW_ALIGNMENT),
            usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
            mapped_at_creation: false,
        });
        log::debug!("Created pick target of {}x{}", size.0, size.1);

        Self {
            texture,
            view,
            depth,
            staging,
            size,
        }
    }

    pub fn size(&self) -> (u32, u32) {
        self.size
    }

    /// Copy one texel to the CPU. Blocks until the GPU has finished the id pass.
    pub fn read_pixel(
        &self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        runtime: &tokio::runtime::Runtime,
        pixel: PixelCoord,
    ) -> anyhow::Result<[u8; 3]> {
        ensure_texel_in_bounds(pixel, self.size)?;

        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("Pick Read Encoder"),
        });
        encoder.copy_texture_to_buffer(
            wgpu::TexelCopyTextureInfo {
                aspect: wgpu::TextureAspect::All,
                texture: &self.texture,
                mip_level: 0,
                origin: wgpu::Origin3d {
                    x: pixel.x,
                    y: pixel.y,
                    z: 0,
                },
            },
            wgpu::TexelCopyBufferInfo {
                buffer: &self.staging,
                layout: wgpu::TexelCopyBufferLayout {
                    offset: 0,
                    bytes_per_row: Some(wgpu::COPY_BYTES_PER_ROW_ALIGNMENT),
                    rows_per_image: Some(1),
                },
            },
            wgpu::Extent3d {
                width: 1,
                height: 1,
                depth_or_array_layers: 1,
            },
        );
        queue.submit(iter::once(encoder.finish()));

        let staging = StagingRead {
            device,
            buffer: &self.staging,
        };
        let [r, g, b, _] = runtime.block_on(read_texel(&staging))?;
        Ok([r, g, b])
    }
}

/// Fails unless `pixel` lies inside a target of `size`.
pub fn ensure_texel_in_bounds(pixel: PixelCoord, (width, height): (u32, u32)) -> anyhow::Result<()> {
    ensure!(
        pixel.x < width && pixel.y < height,
        "texel {pixel} lies outside the {width}x{height} pick target"
    );
    Ok(())
}

/// The steps of mapping a staging buffer back to the CPU.
trait Readback {
    /// Request the mapping. The receiver resolves once the map callback has run.
    fn map_read(&self) -> OneshotReceiver<Result<(), wgpu::BufferAsyncError>>;
    /// Block until the GPU has finished all submitted work.
    fn wait(&self) -> anyhow::Result<()>;
    /// The first texel of the mapped range.
    fn texel(&self) -> [u8; 4];
    fn unmap(&self);
}

struct StagingRead<'a> {
    device: &'a wgpu::Device,
    buffer: &'a wgpu::Buffer,
}

impl Readback for StagingRead<'_> {
    fn map_read(&self) -> OneshotReceiver<Result<(), wgpu::BufferAsyncError>> {
        let (tx, rx) = oneshot_channel();
        self.buffer
            .slice(..)
            .map_async(wgpu::MapMode::Read, move |result| {
                let _ = tx.send(result);
            });
        rx
    }

    fn wait(&self) -> anyhow::Result<()> {
        self.device.poll(wgpu::PollType::Wait {
            submission_index: None,
            timeout: None,
        })?;
        Ok(())
    }

    fn texel(&self) -> [u8; 4] {
        let data = self.buffer.slice(..).get_mapped_range();
        let mut texel = [0u8; 4];
        texel.copy_from_slice(&data[..PickTarget::BYTES_PER_TEXEL as usize]);
        texel
    }

    fn unmap(&self) {
        self.buffer.unmap();
    }
}

async fn read_texel<R: Readback>(staging: &R) -> anyhow::Result<[u8; 4]> {
    // The mapping has to be requested before polling, otherwise the wait never ends.
    let mapped = staging.map_read();
    if let Err(e) = staging.wait() {
        // A pending map would make the next copy into the buffer invalid.
        staging.unmap();
        return Err(e.context("waiting for the pick read-back"));
    }
    mapped
        .receive()
        .await
        .context("pick buffer mapping was cancelled")??;

    let texel = staging.texel();
    staging.unmap();
    Ok(texel)
}

/// Runs the id pass, the read-back and the visible pass for one frame.
#[derive(Debug, Default)]
pub struct PickingPipeline {
    picked: Option<ObjectId>,
}

impl PickingPipeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// The object picked in the most recent frame.
    pub fn picked(&self) -> Option<ObjectId> {
        self.picked
    }

    /// Render one frame and report which object, if any, is under the cursor.
    pub fn render_frame<R: FrameRenderer>(
        &mut self,
        renderer: &mut R,
        scene: &Scene<R::Backend>,
        frame: &FrameContext,
    ) -> anyhow::Result<Option<ObjectId>> {
        let id_draws: Vec<_> = scene
            .pickable()
            .map(|(object, scene_object, pick_id)| IdDraw {
                object,
                geometry: scene_object.geometry(),
                model: scene_object.model_matrix(),
                pick_id,
            })
            .collect();
        renderer.draw_ids(frame, &id_draws)?;

        let picked = match cursor_to_pixel(frame.cursor, renderer.pick_target_size()) {
            Some(pixel) => {
                let sample = renderer.read_pixel(pixel)?;
                log::trace!("Pick sample at {pixel}: {sample:?}");
                scene.find_by_colour(sample)
            }
            None => None,
        };

        if picked != self.picked {
            match picked.and_then(|id| scene.name(id)) {
                Some(name) => log::info!("Picked {name}"),
                None => log::info!("Nothing picked"),
            }
            self.picked = picked;
        }

        let shaded_draws: Vec<_> = scene
            .objects()
            .map(|(object, scene_object)| ShadedDraw {
                object,
                geometry: scene_object.geometry(),
                model: scene_object.model_matrix(),
                texture: scene_object.texture,
                is_picked: picked == Some(object),
                style: if scene_object.shape().is_skybox() {
                    DrawStyle::Skybox
                } else {
                    DrawStyle::Lit
                },
            })
            .collect();
        renderer.draw_shaded(frame, &shaded_draws)?;

        Ok(picked)
    }
}
