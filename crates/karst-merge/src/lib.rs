//! Greedy geometry compression: volumetric box merging and per-face quad
//! merging over a dense occupancy grid, plus the quad triangulator and the
//! atlas rectangle packer that prepare merged faces for rendering.
#![forbid(unsafe_code)]

pub mod faces;
pub mod pack;
pub mod triangulate;
pub mod volume;

pub use faces::{FaceOptions, FaceQuad, merge_faces};
pub use pack::pack_atlas;
pub use triangulate::{MeshBuild, triangulate};
pub use volume::{VolumeOptions, apply_exposure, merge_volume};
