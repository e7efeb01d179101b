//! Voxel geometry compression and spatial indexing.
//!
//! The crates under this facade form one pipeline: a dense occupancy grid
//! (`karst-grid`) is flood-filled for outside reachability, compressed into
//! maximal boxes or merged face quads (`karst-merge`), indexed by a roped
//! KD-tree (`karst-kdtree`), and queried by the swept-volume collider
//! (`karst-collide`). [`index_grid`] wires the standard path together;
//! callers with unusual needs use the member crates directly.
#![forbid(unsafe_code)]

pub use karst_collide::{Collider, Contact, sphere_contact, sphere_toi};
pub use karst_geom::{Aabb, Axis, Face, IAabb, Vec3, VoxelBox};
pub use karst_grid::{EMPTY, GridBuf, GridError, MAX_DIM, VisibilityMap};
pub use karst_kdtree::{Boundable, KdTree, NodeId};
pub use karst_merge::{
    FaceOptions, FaceQuad, MeshBuild, VolumeOptions, apply_exposure, merge_faces, merge_volume,
    pack_atlas, triangulate,
};

/// Compresses and indexes a grid in one pass: visibility flood fill,
/// volumetric merge, per-box exposure tagging, KD-tree construction.
pub fn index_grid(grid: &GridBuf, opts: &VolumeOptions) -> KdTree<VoxelBox> {
    let t0 = std::time::Instant::now();
    let vis = VisibilityMap::compute(grid);
    let culled;
    let culled_ref = if opts.merge_culled {
        culled = vis.culled_cells(grid);
        Some(culled.as_slice())
    } else {
        None
    };
    let mut boxes = merge_volume(grid, culled_ref, opts);
    apply_exposure(&mut boxes, grid, &vis);
    let tree = KdTree::build(boxes);
    let ms = t0.elapsed().as_millis();
    log::info!(
        target: "perf",
        "ms={} index_grid dims=({}, {}, {}) nodes={}",
        ms,
        grid.sx,
        grid.sy,
        grid.sz,
        tree.node_count()
    );
    tree
}
