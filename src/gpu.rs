//! The seam between the viewer and the graphics API.
//!
//! Scene geometry never talks to wgpu directly. It allocates through a
//! [`GpuBackend`], releases through [`GpuResource`] and records draws through
//! [`DrawGeometry`]. wgpu implements all three; tests plug in an in-memory
//! backend so that buffer lifecycles and the picking protocol can be exercised
//! without a device.

use wgpu::util::DeviceExt;

/// Errors raised while allocating or configuring GPU resources.
///
/// All of these are fatal for the resource being built. Setup code propagates
/// them so the application aborts before the first frame.
#[derive(Debug, thiserror::Error)]
pub enum GpuError {
    #[error("geometry `{label}` has no vertices or no indices")]
    EmptyGeometry { label: String },
    #[error("buffer `{label}` needs {size} bytes but the device allows at most {max}")]
    BufferTooLarge { label: String, size: u64, max: u64 },
    #[error("geometry `{label}` has {count} indices which does not fit a u32 draw range")]
    IndexOverflow { label: String, count: usize },
    #[error("cannot create the window surface: {0}")]
    Surface(#[from] wgpu::CreateSurfaceError),
    #[error("no compatible GPU adapter found: {0}")]
    Adapter(#[from] wgpu::RequestAdapterError),
    #[error("GPU device request failed: {0}")]
    Device(#[from] wgpu::RequestDeviceError),
}

/// What a buffer is bound as when drawing.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BufferUsage {
    Vertex,
    Index,
}

impl From<BufferUsage> for wgpu::BufferUsages {
    fn from(usage: BufferUsage) -> Self {
        match usage {
            BufferUsage::Vertex => wgpu::BufferUsages::VERTEX,
            BufferUsage::Index => wgpu::BufferUsages::INDEX,
        }
    }
}

/// A GPU object with an explicit release.
///
/// Releasing twice must be harmless; owners still guard against it.
pub trait GpuResource {
    fn release(&self);
}

impl GpuResource for wgpu::Buffer {
    fn release(&self) {
        self.destroy();
    }
}

impl GpuResource for wgpu::Texture {
    fn release(&self) {
        self.destroy();
    }
}

/// Allocates static GPU buffers.
pub trait GpuBackend {
    type Buffer: GpuResource;

    /// Upload `contents` into a new, immutable buffer.
    fn upload_buffer(
        &self,
        label: &str,
        contents: &[u8],
        usage: BufferUsage,
    ) -> Result<Self::Buffer, GpuError>;
}

impl GpuBackend for wgpu::Device {
    type Buffer = wgpu::Buffer;

    fn upload_buffer(
        &self,
        label: &str,
        contents: &[u8],
        usage: BufferUsage,
    ) -> Result<wgpu::Buffer, GpuError> {
        if contents.is_empty() {
            return Err(GpuError::EmptyGeometry {
                label: label.to_string(),
            });
        }
        let size = contents.len() as u64;
        let max = self.limits().max_buffer_size;
        if size > max {
            return Err(GpuError::BufferTooLarge {
                label: label.to_string(),
                size,
                max,
            });
        }
        Ok(self.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(label),
            contents,
            usage: usage.into(),
        }))
    }
}

/// Anything that can record an indexed triangle-list draw of one mesh.
pub trait DrawGeometry<B> {
    fn draw_geometry(&mut self, vertices: &B, indices: &B, index_count: u32);
}

impl DrawGeometry<wgpu::Buffer> for wgpu::RenderPass<'_> {
    fn draw_geometry(&mut self, vertices: &wgpu::Buffer, indices: &wgpu::Buffer, index_count: u32) {
        self.set_vertex_buffer(0, vertices.slice(..));
        self.set_index_buffer(indices.slice(..), wgpu::IndexFormat::Uint32);
        self.draw_indexed(0..index_count, 0, 0..1);
    }
}
