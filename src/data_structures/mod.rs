//! Engine data structures: vertices, GPU geometry, pick tags, transforms and textures.
//!
//! - `vertex` is the interleaved vertex format and CPU-side mesh data
//! - `geometry` owns the GPU buffers of one drawable object
//! - `pick_id` is the colour tag that identifies an object in the id pass
//! - `transform` holds model transforms and the per-object shader data
//! - `texture` wraps GPU textures (colour maps, cubemap, depth)

pub mod geometry;
pub mod pick_id;
pub mod texture;
pub mod transform;
pub mod vertex;
