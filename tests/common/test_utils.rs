#![allow(dead_code)]

use std::{
    cell::{Cell, RefCell},
    rc::Rc,
};

use pick_viewer::{
    ObjectId,
    frame::FrameContext,
    gpu::{BufferUsage, DrawGeometry, GpuBackend, GpuError, GpuResource},
    pick::PixelCoord,
    render::{DrawStyle, FrameRenderer, IdDraw, ShadedDraw},
};
use winit::dpi::PhysicalPosition;

/// An in-memory GPU that only counts how many buffers are alive.
#[derive(Default)]
pub struct MockBackend {
    live: Rc<Cell<usize>>,
    created: Cell<usize>,
    pub fail_on: Cell<Option<BufferUsage>>,
    pub labels: RefCell<Vec<String>>,
}

impl MockBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn live(&self) -> usize {
        self.live.get()
    }

    pub fn created(&self) -> usize {
        self.created.get()
    }
}

pub struct MockBuffer {
    pub id: usize,
    pub usage: BufferUsage,
    pub len: usize,
    live: Rc<Cell<usize>>,
    released: Cell<bool>,
}

impl MockBuffer {
    pub fn is_released(&self) -> bool {
        self.released.get()
    }
}

impl GpuResource for MockBuffer {
    fn release(&self) {
        if !self.released.replace(true) {
            self.live.set(self.live.get() - 1);
        }
    }
}

impl Drop for MockBuffer {
    fn drop(&mut self) {
        self.release();
    }
}

impl GpuBackend for MockBackend {
    type Buffer = MockBuffer;

    fn upload_buffer(
        &self,
        label: &str,
        contents: &[u8],
        usage: BufferUsage,
    ) -> Result<MockBuffer, GpuError> {
        if contents.is_empty() {
            return Err(GpuError::EmptyGeometry {
                label: label.to_string(),
            });
        }
        if self.fail_on.get() == Some(usage) {
            return Err(GpuError::BufferTooLarge {
                label: label.to_string(),
                size: contents.len() as u64,
                max: 0,
            });
        }
        let id = self.created.get();
        self.created.set(id + 1);
        self.live.set(self.live.get() + 1);
        self.labels.borrow_mut().push(label.to_string());
        Ok(MockBuffer {
            id,
            usage,
            len: contents.len(),
            live: self.live.clone(),
            released: Cell::new(false),
        })
    }
}

/// One recorded indexed draw.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RecordedDraw {
    pub vertices: usize,
    pub indices: usize,
    pub index_count: u32,
}

#[derive(Default)]
pub struct MockPass {
    pub draws: Vec<RecordedDraw>,
}

impl DrawGeometry<MockBuffer> for MockPass {
    fn draw_geometry(&mut self, vertices: &MockBuffer, indices: &MockBuffer, index_count: u32) {
        assert!(!vertices.is_released() && !indices.is_released());
        assert_eq!(vertices.usage, BufferUsage::Vertex);
        assert_eq!(indices.usage, BufferUsage::Index);
        self.draws.push(RecordedDraw {
            vertices: vertices.id,
            indices: indices.id,
            index_count,
        });
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct IdRecord {
    pub object: ObjectId,
    pub colour: [u8; 3],
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ShadedRecord {
    pub object: ObjectId,
    pub is_picked: bool,
    pub style: DrawStyle,
}

/// A frame renderer that records both passes and answers read-backs from a closure.
pub struct RecordingRenderer {
    pub size: (u32, u32),
    pixel: Box<dyn Fn(PixelCoord) -> anyhow::Result<[u8; 3]>>,
    pub reads: Vec<PixelCoord>,
    pub id_passes: Vec<Vec<IdRecord>>,
    pub shaded_passes: Vec<Vec<ShadedRecord>>,
    pub pass: MockPass,
}

impl RecordingRenderer {
    pub fn new(size: (u32, u32), pixel: impl Fn(PixelCoord) -> [u8; 3] + 'static) -> Self {
        Self::fallible(size, move |p| Ok(pixel(p)))
    }

    pub fn fallible(
        size: (u32, u32),
        pixel: impl Fn(PixelCoord) -> anyhow::Result<[u8; 3]> + 'static,
    ) -> Self {
        Self {
            size,
            pixel: Box::new(pixel),
            reads: Vec::new(),
            id_passes: Vec::new(),
            shaded_passes: Vec::new(),
            pass: MockPass::default(),
        }
    }

    /// Every read-back returns `colour`.
    pub fn constant(size: (u32, u32), colour: [u8; 3]) -> Self {
        Self::new(size, move |_| colour)
    }

    pub fn last_shaded(&self) -> &[ShadedRecord] {
        self.shaded_passes.last().map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn picked_flags(&self) -> Vec<(ObjectId, bool)> {
        self.last_shaded()
            .iter()
            .map(|record| (record.object, record.is_picked))
            .collect()
    }
}

impl FrameRenderer for RecordingRenderer {
    type Backend = MockBackend;

    fn pick_target_size(&self) -> (u32, u32) {
        self.size
    }

    fn draw_ids(
        &mut self,
        _frame: &FrameContext,
        draws: &[IdDraw<'_, MockBackend>],
    ) -> anyhow::Result<()> {
        let mut records = Vec::new();
        for draw in draws {
            draw.geometry.draw(&mut self.pass);
            records.push(IdRecord {
                object: draw.object,
                colour: draw.pick_id.rgb(),
            });
        }
        self.id_passes.push(records);
        Ok(())
    }

    fn read_pixel(&mut self, pixel: PixelCoord) -> anyhow::Result<[u8; 3]> {
        assert!(
            pixel.x < self.size.0 && pixel.y < self.size.1,
            "read outside the id target: {pixel}"
        );
        self.reads.push(pixel);
        (self.pixel)(pixel)
    }

    fn draw_shaded(
        &mut self,
        _frame: &FrameContext,
        draws: &[ShadedDraw<'_, MockBackend>],
    ) -> anyhow::Result<()> {
        let mut records = Vec::new();
        for draw in draws {
            draw.geometry.draw(&mut self.pass);
            records.push(ShadedRecord {
                object: draw.object,
                is_picked: draw.is_picked,
                style: draw.style,
            });
        }
        self.shaded_passes.push(records);
        Ok(())
    }
}

pub fn frame_with_cursor(x: f64, y: f64) -> FrameContext {
    FrameContext {
        cursor: Some(PhysicalPosition::new(x, y)),
        ..Default::default()
    }
}
