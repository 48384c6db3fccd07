//! pick-viewer
//!
//! A small wgpu scene viewer: a textured earth and a textured box in front of a
//! cubemap skybox. Hovering an object highlights it. Picking works by painting
//! every pickable object in a unique flat colour into an offscreen target and
//! reading back the texel under the cursor.
//!
//! High-level modules
//! - `gpu`: the allocation and draw seam between scene geometry and wgpu
//! - `data_structures`: vertices, geometry buffers, pick ids, transforms, textures
//! - `scene`: procedural shapes and the objects that own their geometry
//! - `pick`: cursor mapping, the offscreen id target and the picking pipeline
//! - `render`: per-frame draw lists and the wgpu frame renderer
//! - `camera`, `pipelines`, `resources`, `context`: the rendering collaborators
//! - `config`, `viewer`: configuration, window and event loop
//!

pub mod camera;
pub mod config;
pub mod context;
pub mod data_structures;
pub mod frame;
pub mod gpu;
pub mod pick;
pub mod pipelines;
pub mod render;
pub mod resources;
pub mod scene;
pub mod viewer;

// Re-exports commonly used types for convenience in downstream code.
pub use config::ViewerConfig;
pub use data_structures::{geometry::GeometryBuffer, pick_id::PickId};
pub use pick::{PickingPipeline, cursor_to_pixel};
pub use scene::{ObjectId, Scene, SceneObject, Shape};
pub use viewer::run;
