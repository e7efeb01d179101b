//! Expands merged face quads into triangle meshes, one build per palette
//! value, with signed-byte normals and atlas UVs.

use hashbrown::HashMap;

use karst_geom::{Axis, Face, Vec3};

use crate::faces::FaceQuad;

#[derive(Default, Clone)]
pub struct MeshBuild {
    pub pos: Vec<f32>,
    /// Per-vertex unit normals as signed bytes, one axis component nonzero.
    pub norm: Vec<i8>,
    pub uv: Vec<f32>,
    pub idx: Vec<u16>,
    /// Per-vertex ambient-occlusion weight (0..=3).
    pub ao: Vec<u8>,
}

impl MeshBuild {
    /// Clears all arrays but retains capacity for reuse across rebuilds.
    #[inline]
    pub fn clear_keep_capacity(&mut self) {
        self.pos.clear();
        self.norm.clear();
        self.uv.clear();
        self.idx.clear();
        self.ao.clear();
    }

    /// Pre-reserve capacity for approximately `n_quads` quads worth of data.
    #[inline]
    pub fn reserve_quads(&mut self, n_quads: usize) {
        self.pos.reserve(n_quads * 4 * 3);
        self.norm.reserve(n_quads * 4 * 3);
        self.uv.reserve(n_quads * 4 * 2);
        self.ao.reserve(n_quads * 4);
        self.idx.reserve(n_quads * 6);
    }

    /// Appends a quad as two triangles. `vs`/`uvs`/`ao` are in
    /// (u0,v0), (u1,v0), (u1,v1), (u0,v1) corner order; winding is fixed up
    /// against the face normal.
    pub fn add_quad(&mut self, face: Face, mut vs: [Vec3; 4], mut uvs: [(f32, f32); 4], mut ao: [u8; 4]) {
        let base = (self.pos.len() / 3) as u32;
        let n = face.normal();
        let e1 = vs[1] - vs[0];
        let e2 = vs[2] - vs[0];
        let cross = Vec3::new(
            e1.y * e2.z - e1.z * e2.y,
            e1.z * e2.x - e1.x * e2.z,
            e1.x * e2.y - e1.y * e2.x,
        );
        if cross.dot(n) < 0.0 {
            vs.swap(1, 3);
            uvs.swap(1, 3);
            ao.swap(1, 3);
        }
        let nb = [n.x as i8, n.y as i8, n.z as i8];
        for i in 0..4 {
            self.pos.extend_from_slice(&[vs[i].x, vs[i].y, vs[i].z]);
            self.norm.extend_from_slice(&nb);
            self.uv.extend_from_slice(&[uvs[i].0, uvs[i].1]);
            self.ao.push(ao[i]);
        }
        self.idx.extend_from_slice(&[
            base as u16,
            (base + 1) as u16,
            (base + 2) as u16,
            base as u16,
            (base + 2) as u16,
            (base + 3) as u16,
        ]);
    }
}

/// Reconstructs a quad corner's grid position from slice-plane coordinates.
#[inline]
fn corner_pos(axis: Axis, d: i32, u: i32, v: i32) -> Vec3 {
    let (x, y, z) = match axis {
        Axis::X => (d, v, u),
        Axis::Y => (u, d, v),
        Axis::Z => (u, v, d),
    };
    Vec3::new(x as f32, y as f32, z as f32)
}

/// Triangulates quads grouped by palette value. UVs point into the atlas
/// region the packer assigned (cell units; callers scale by texel size).
pub fn triangulate(quads: &[FaceQuad]) -> HashMap<u8, MeshBuild> {
    let mut builds: HashMap<u8, MeshBuild> = HashMap::new();
    for q in quads {
        let axis = q.face.axis();
        let vs = [
            corner_pos(axis, q.d, q.u0, q.v0),
            corner_pos(axis, q.d, q.u1, q.v0),
            corner_pos(axis, q.d, q.u1, q.v1),
            corner_pos(axis, q.d, q.u0, q.v1),
        ];
        let (au, av) = (q.atlas[0] as f32, q.atlas[1] as f32);
        let (w, h) = (q.width() as f32, q.height() as f32);
        let uvs = [
            (au, av),
            (au + w, av),
            (au + w, av + h),
            (au, av + h),
        ];
        builds
            .entry(q.value)
            .or_default()
            .add_quad(q.face, vs, uvs, q.ao);
    }
    builds
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::faces::{FaceOptions, merge_faces};
    use karst_grid::GridBuf;

    #[test]
    fn cube_mesh_has_24_vertices_36_indices() {
        let g = GridBuf::from_cells(1, 1, 1, vec![3]).unwrap();
        let quads = merge_faces(&g, &FaceOptions::default());
        let builds = triangulate(&quads);
        assert_eq!(builds.len(), 1);
        let mb = &builds[&3];
        assert_eq!(mb.pos.len(), 24 * 3);
        assert_eq!(mb.idx.len(), 12 * 3);
        assert_eq!(mb.norm.len(), mb.pos.len());
        assert_eq!(mb.ao.len(), 24);
    }

    #[test]
    fn winding_agrees_with_normal() {
        let g = GridBuf::from_cells(2, 1, 1, vec![1, 1]).unwrap();
        let quads = merge_faces(&g, &FaceOptions::default());
        let builds = triangulate(&quads);
        let mb = &builds[&1];
        // Every triangle's geometric normal must point along its vertex normal.
        for t in mb.idx.chunks(3) {
            let p = |i: u16| {
                let i = i as usize * 3;
                Vec3::new(mb.pos[i], mb.pos[i + 1], mb.pos[i + 2])
            };
            let nrm = {
                let i = t[0] as usize * 3;
                Vec3::new(
                    mb.norm[i] as f32,
                    mb.norm[i + 1] as f32,
                    mb.norm[i + 2] as f32,
                )
            };
            let e1 = p(t[1]) - p(t[0]);
            let e2 = p(t[2]) - p(t[0]);
            let cross = Vec3::new(
                e1.y * e2.z - e1.z * e2.y,
                e1.z * e2.x - e1.x * e2.z,
                e1.x * e2.y - e1.y * e2.x,
            );
            assert!(cross.dot(nrm) > 0.0);
        }
    }
}
