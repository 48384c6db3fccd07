//! Per-frame inputs for the picking pipeline.
//!
//! Everything that used to be loop-scoped mutable state (camera matrices,
//! cursor, light and material) is gathered here once per frame and handed to
//! whoever needs it.

use cgmath::{Matrix4, Point3, SquareMatrix};
use winit::dpi::PhysicalPosition;

use crate::pipelines::light::Shading;

#[derive(Clone, Copy, Debug)]
pub struct FrameContext {
    pub view: Matrix4<f32>,
    pub projection: Matrix4<f32>,
    pub eye: Point3<f32>,
    /// Physical pixels, origin top-left. `None` while the cursor is outside the window.
    pub cursor: Option<PhysicalPosition<f64>>,
    pub shading: Shading,
}

impl Default for FrameContext {
    fn default() -> Self {
        Self {
            view: Matrix4::identity(),
            projection: Matrix4::identity(),
            eye: Point3::new(0.0, 0.0, 0.0),
            cursor: None,
            shading: Shading::default(),
        }
    }
}
