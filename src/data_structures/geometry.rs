//! GPU-resident geometry for one drawable object.
//!
//! A [`GeometryBuffer`] owns exactly one vertex buffer and one index buffer.
//! Both exist together or not at all:
//!
//! ```text
//! Unallocated --initialise--> Ready --release--> Unallocated
//! ```
//!
//! The type is move-only. Dropping it releases the buffers, and releasing an
//! already released buffer does nothing.

use crate::{
    data_structures::vertex::Vertex,
    gpu::{BufferUsage, DrawGeometry, GpuBackend, GpuError, GpuResource},
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BufferState {
    Unallocated,
    Ready,
}

struct GpuBuffers<T> {
    vertices: T,
    indices: T,
}

pub struct GeometryBuffer<B: GpuBackend> {
    buffers: Option<GpuBuffers<B::Buffer>>,
    index_count: u32,
}

impl<B: GpuBackend> GeometryBuffer<B> {
    /// An empty buffer. Nothing is allocated until [`initialise`](Self::initialise).
    pub fn new() -> Self {
        Self {
            buffers: None,
            index_count: 0,
        }
    }

    /// Upload interleaved vertices and 32-bit indices as static GPU buffers.
    ///
    /// Any previous buffers are released first. Empty input is rejected and
    /// leaves the buffer unallocated, so a later `draw` is a no-op even if the
    /// buffer was `Ready` before.
    pub fn initialise(
        &mut self,
        backend: &B,
        label: &str,
        vertices: &[Vertex],
        indices: &[u32],
    ) -> Result<(), GpuError> {
        self.release();

        if vertices.is_empty() || indices.is_empty() {
            return Err(GpuError::EmptyGeometry {
                label: label.to_string(),
            });
        }
        let index_count = u32::try_from(indices.len()).map_err(|_| GpuError::IndexOverflow {
            label: label.to_string(),
            count: indices.len(),
        })?;

        let vertex_buffer = backend.upload_buffer(
            &format!("{label} Vertex Buffer"),
            bytemuck::cast_slice(vertices),
            BufferUsage::Vertex,
        )?;
        let index_buffer = match backend.upload_buffer(
            &format!("{label} Index Buffer"),
            bytemuck::cast_slice(indices),
            BufferUsage::Index,
        ) {
            Ok(buffer) => buffer,
            Err(e) => {
                vertex_buffer.release();
                return Err(e);
            }
        };

        self.buffers = Some(GpuBuffers {
            vertices: vertex_buffer,
            indices: index_buffer,
        });
        self.index_count = index_count;
        log::debug!("Uploaded {label}: {} vertices, {index_count} indices", vertices.len());
        Ok(())
    }

    /// Bind this object's buffers and draw all recorded indices as triangles.
    pub fn draw<P: DrawGeometry<B::Buffer>>(&self, pass: &mut P) {
        match &self.buffers {
            Some(buffers) => pass.draw_geometry(&buffers.vertices, &buffers.indices, self.index_count),
            None => log::warn!("Skipped drawing geometry that was never initialised"),
        }
    }

    /// Free both GPU buffers. Safe to call any number of times.
    pub fn release(&mut self) {
        if let Some(buffers) = self.buffers.take() {
            buffers.indices.release();
            buffers.vertices.release();
        }
        self.index_count = 0;
    }

    pub fn state(&self) -> BufferState {
        match self.buffers {
            Some(_) => BufferState::Ready,
            None => BufferState::Unallocated,
        }
    }

    pub fn is_ready(&self) -> bool {
        self.buffers.is_some()
    }

    pub fn index_count(&self) -> u32 {
        self.index_count
    }
}

impl<B: GpuBackend> Default for GeometryBuffer<B> {
    fn default() -> Self {
        Self::new()
    }
}

impl<B: GpuBackend> Drop for GeometryBuffer<B> {
    fn drop(&mut self) {
        self.release();
    }
}

impl<B: GpuBackend> std::fmt::Debug for GeometryBuffer<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeometryBuffer")
            .field("state", &self.state())
            .field("index_count", &self.index_count)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::{cell::Cell, rc::Rc};

    use super::*;

    #[derive(Default)]
    struct CountingBackend {
        live: Rc<Cell<i32>>,
        fail_on: Option<BufferUsage>,
    }

    struct CountedBuffer {
        live: Rc<Cell<i32>>,
        released: Cell<bool>,
    }

    impl GpuResource for CountedBuffer {
        fn release(&self) {
            if !self.released.replace(true) {
                self.live.set(self.live.get() - 1);
            }
        }
    }

    impl GpuBackend for CountingBackend {
        type Buffer = CountedBuffer;

        fn upload_buffer(
            &self,
            label: &str,
            _: &[u8],
            usage: BufferUsage,
        ) -> Result<CountedBuffer, GpuError> {
            if self.fail_on == Some(usage) {
                return Err(GpuError::BufferTooLarge {
                    label: label.to_string(),
                    size: 1,
                    max: 0,
                });
            }
            self.live.set(self.live.get() + 1);
            Ok(CountedBuffer {
                live: self.live.clone(),
                released: Cell::new(false),
            })
        }
    }

    #[derive(Default)]
    struct Recorder {
        draws: Vec<u32>,
    }

    impl DrawGeometry<CountedBuffer> for Recorder {
        fn draw_geometry(&mut self, _: &CountedBuffer, _: &CountedBuffer, index_count: u32) {
            self.draws.push(index_count);
        }
    }

    fn triangle() -> (Vec<Vertex>, Vec<u32>) {
        let v = |x: f32, y: f32| Vertex::new([x, y, 0.0], [0.0, 0.0, 1.0], [x, y]);
        (vec![v(0.0, 0.0), v(1.0, 0.0), v(0.0, 1.0)], vec![0, 1, 2])
    }

    #[test]
    fn starts_unallocated_and_draws_nothing() {
        let geometry = GeometryBuffer::<CountingBackend>::new();
        let mut recorder = Recorder::default();
        geometry.draw(&mut recorder);
        assert_eq!(geometry.state(), BufferState::Unallocated);
        assert!(recorder.draws.is_empty());
    }

    #[test]
    fn initialise_then_draw_uses_recorded_index_count() {
        let backend = CountingBackend::default();
        let (vertices, indices) = triangle();
        let mut geometry = GeometryBuffer::new();
        geometry.initialise(&backend, "tri", &vertices, &indices).unwrap();

        let mut recorder = Recorder::default();
        geometry.draw(&mut recorder);

        assert!(geometry.is_ready());
        assert_eq!(recorder.draws, vec![3]);
        assert_eq!(backend.live.get(), 2);
    }

    #[test]
    fn empty_input_is_rejected_without_allocating() {
        let backend = CountingBackend::default();
        let mut geometry = GeometryBuffer::new();
        let err = geometry.initialise(&backend, "empty", &[], &[]).unwrap_err();
        assert!(matches!(err, GpuError::EmptyGeometry { .. }));
        assert_eq!(geometry.state(), BufferState::Unallocated);
        assert_eq!(backend.live.get(), 0);
    }

    #[test]
    fn empty_reinitialise_drops_the_old_mesh() {
        let backend = CountingBackend::default();
        let (vertices, indices) = triangle();
        let mut geometry = GeometryBuffer::new();
        geometry.initialise(&backend, "tri", &vertices, &indices).unwrap();

        assert!(geometry.initialise(&backend, "tri", &[], &[]).is_err());

        let mut recorder = Recorder::default();
        geometry.draw(&mut recorder);
        assert_eq!(geometry.state(), BufferState::Unallocated);
        assert!(recorder.draws.is_empty());
        assert_eq!(backend.live.get(), 0);
    }

    #[test]
    fn release_is_idempotent() {
        let backend = CountingBackend::default();
        let (vertices, indices) = triangle();
        let mut geometry = GeometryBuffer::new();
        geometry.initialise(&backend, "tri", &vertices, &indices).unwrap();

        geometry.release();
        geometry.release();

        assert_eq!(geometry.state(), BufferState::Unallocated);
        assert_eq!(geometry.index_count(), 0);
        assert_eq!(backend.live.get(), 0);
    }

    #[test]
    fn reinitialising_replaces_old_buffers() {
        let backend = CountingBackend::default();
        let (vertices, indices) = triangle();
        let mut geometry = GeometryBuffer::new();
        geometry.initialise(&backend, "tri", &vertices, &indices).unwrap();
        geometry.initialise(&backend, "tri", &vertices, &[0, 1, 2, 2, 1, 0]).unwrap();
        assert_eq!(backend.live.get(), 2);
        assert_eq!(geometry.index_count(), 6);
    }

    #[test]
    fn failed_index_upload_frees_the_vertex_buffer() {
        let backend = CountingBackend {
            fail_on: Some(BufferUsage::Index),
            ..Default::default()
        };
        let (vertices, indices) = triangle();
        let mut geometry = GeometryBuffer::new();
        assert!(geometry.initialise(&backend, "tri", &vertices, &indices).is_err());
        assert_eq!(geometry.state(), BufferState::Unallocated);
        assert_eq!(backend.live.get(), 0);
    }

    #[test]
    fn dropping_releases_buffers() {
        let backend = CountingBackend::default();
        let (vertices, indices) = triangle();
        {
            let mut geometry = GeometryBuffer::new();
            geometry.initialise(&backend, "tri", &vertices, &indices).unwrap();
            assert_eq!(backend.live.get(), 2);
        }
        assert_eq!(backend.live.get(), 0);
    }
}
