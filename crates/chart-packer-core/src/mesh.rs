//! Minimal UV-centric mesh storage.
//!
//! The packing pipeline does not need positions, normals or materials, only
//! per-corner UV coordinates and enough adjacency to walk chart boundaries.
//! Faces live in one arena; charts hold non-owning index lists into it, and
//! each face carries a weak back-reference to its chart slot.

use std::collections::HashMap;

use glam::DVec2;
use tracing::warn;

use crate::model::Box2;

/// Stable identifier of a parameterization region. Survives chart merging:
/// every face remembers the region it originated from.
pub type RegionId = u64;

/// Two corner UVs are welded into one adjacency edge when they agree within
/// this tolerance on both endpoints.
pub const UV_WELD_EPS: f64 = 1e-7;

#[derive(Debug, Clone, Copy)]
pub struct Vertex {
    /// Per-vertex UV alias, kept in sync with the wedge attribute.
    pub uv: DVec2,
    /// Container index stamp.
    pub tex: usize,
}

/// Oriented edge of a face: corners `edge` and `(edge + 1) % 3`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FacePos {
    pub face: usize,
    pub edge: usize,
}

#[derive(Debug, Clone)]
pub struct Face {
    /// Weak back-reference to the owning chart's slot in the chart list.
    pub chart: Option<usize>,
    /// Region this face belonged to before any chart merging upstream.
    pub source_region: RegionId,
    pub vert: [usize; 3],
    /// Per-corner UV coordinates (the authoritative parameterization).
    pub wedge_uv: [DVec2; 3],
    /// Per-corner container index stamp.
    pub wedge_tex: [usize; 3],
    pub(crate) adj: [Option<FacePos>; 3],
}

#[derive(Debug, Clone, Default)]
pub struct Mesh {
    vertices: Vec<Vertex>,
    faces: Vec<Face>,
    stored_wedge: Vec<[DVec2; 3]>,
}

impl Mesh {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_vertex(&mut self, uv: DVec2) -> usize {
        self.vertices.push(Vertex { uv, tex: 0 });
        self.vertices.len() - 1
    }

    /// Adds a triangle. Adjacency is not maintained incrementally; call
    /// [`Mesh::build_adjacency`] once all faces are in.
    pub fn add_face(
        &mut self,
        vert: [usize; 3],
        wedge_uv: [DVec2; 3],
        source_region: RegionId,
    ) -> usize {
        self.faces.push(Face {
            chart: None,
            source_region,
            vert,
            wedge_uv,
            wedge_tex: [0; 3],
            adj: [None; 3],
        });
        self.faces.len() - 1
    }

    #[inline]
    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    #[inline]
    pub fn face(&self, i: usize) -> &Face {
        &self.faces[i]
    }

    #[inline]
    pub fn face_mut(&mut self, i: usize) -> &mut Face {
        &mut self.faces[i]
    }

    #[inline]
    pub fn vertex(&self, i: usize) -> &Vertex {
        &self.vertices[i]
    }

    #[inline]
    pub fn vertex_mut(&mut self, i: usize) -> &mut Vertex {
        &mut self.vertices[i]
    }

    /// Pairs up faces across shared vertex-index edges whose corner UVs
    /// agree within [`UV_WELD_EPS`]. Edges with no UV-matched partner are
    /// borders, which is what makes chart boundaries walkable: faces that
    /// share a 3D edge but live on different parameterization islands stay
    /// disconnected here.
    pub fn build_adjacency(&mut self) {
        for face in &mut self.faces {
            face.adj = [None; 3];
        }

        let mut edge_map: HashMap<(usize, usize), Vec<FacePos>> = HashMap::new();
        for (f, face) in self.faces.iter().enumerate() {
            for e in 0..3 {
                let a = face.vert[e];
                let b = face.vert[(e + 1) % 3];
                let key = (a.min(b), a.max(b));
                edge_map.entry(key).or_default().push(FacePos { face: f, edge: e });
            }
        }

        for positions in edge_map.values() {
            for i in 0..positions.len() {
                for j in (i + 1)..positions.len() {
                    let (pi, pj) = (positions[i], positions[j]);
                    if !self.uv_edges_match(pi, pj) {
                        continue;
                    }
                    // First match wins on non-manifold fans.
                    if self.faces[pi.face].adj[pi.edge].is_none()
                        && self.faces[pj.face].adj[pj.edge].is_none()
                    {
                        self.faces[pi.face].adj[pi.edge] = Some(pj);
                        self.faces[pj.face].adj[pj.edge] = Some(pi);
                    }
                }
            }
        }
    }

    fn uv_edges_match(&self, a: FacePos, b: FacePos) -> bool {
        let fa = &self.faces[a.face];
        let fb = &self.faces[b.face];
        let (a0, a1) = (fa.wedge_uv[a.edge], fa.wedge_uv[(a.edge + 1) % 3]);
        let (b0, b1) = (fb.wedge_uv[b.edge], fb.wedge_uv[(b.edge + 1) % 3]);
        let close = |p: DVec2, q: DVec2| (p - q).abs().max_element() < UV_WELD_EPS;
        // Opposite winding is the manifold case; same winding shows up on
        // mirrored parameterizations.
        (close(a0, b1) && close(a1, b0)) || (close(a0, b0) && close(a1, b1))
    }

    /// True if edge `edge` of face `face` lies on a UV-island boundary.
    #[inline]
    pub fn is_border(&self, face: usize, edge: usize) -> bool {
        self.faces[face].adj[edge].is_none()
    }

    /// Advances a border position to the next border edge around the
    /// boundary loop, rotating around the current edge's destination vertex.
    /// Returns `None` when `step_cap` pivots did not reach a border, which
    /// signals a non-manifold fan to the caller.
    pub(crate) fn next_border(&self, pos: FacePos, step_cap: usize) -> Option<FacePos> {
        debug_assert!(self.is_border(pos.face, pos.edge));
        let mut face = pos.face;
        let mut edge = (pos.edge + 1) % 3;
        for _ in 0..step_cap {
            match self.faces[face].adj[edge] {
                None => return Some(FacePos { face, edge }),
                Some(twin) => {
                    face = twin.face;
                    edge = (twin.edge + 1) % 3;
                }
            }
        }
        None
    }

    /// Snapshots the current wedge UVs into the storage attribute read by
    /// the texel-alignment corrector. The caller takes this snapshot while
    /// the wedge coordinates are still in texel units of the source texture.
    pub fn snapshot_wedge_uvs(&mut self) {
        self.stored_wedge = self.faces.iter().map(|f| f.wedge_uv).collect();
    }

    #[inline]
    pub fn has_stored_wedge_uvs(&self) -> bool {
        self.stored_wedge.len() == self.faces.len()
    }

    #[inline]
    pub fn stored_wedge(&self, face: usize) -> &[DVec2; 3] {
        &self.stored_wedge[face]
    }
}

/// Connected island of mesh faces sharing one UV parameterization.
///
/// Owns a non-owning list of face indices into the mesh arena. The UV
/// bounding box is cached and must be refreshed through
/// [`Chart::parameterization_changed`] whenever face UVs are rewritten.
#[derive(Debug, Clone)]
pub struct Chart {
    pub id: RegionId,
    faces: Vec<usize>,
    uv_box: Box2,
}

impl Chart {
    fn new(id: RegionId, faces: Vec<usize>, mesh: &Mesh) -> Self {
        let uv_box = compute_uv_box(mesh, &faces);
        Self { id, faces, uv_box }
    }

    #[inline]
    pub fn faces(&self) -> &[usize] {
        &self.faces
    }

    #[inline]
    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    /// Cached UV bounding box over all wedge corners.
    #[inline]
    pub fn uv_box(&self) -> Box2 {
        self.uv_box
    }

    /// Drops cached derived state after the faces' UVs were rewritten.
    pub fn parameterization_changed(&mut self, mesh: &Mesh) {
        self.uv_box = compute_uv_box(mesh, &self.faces);
    }
}

fn compute_uv_box(mesh: &Mesh, faces: &[usize]) -> Box2 {
    let mut b = Box2::empty();
    for &f in faces {
        for &uv in &mesh.face(f).wedge_uv {
            b.add(uv);
        }
    }
    b
}

/// Assembles the chart list from `(region id, face indices)` groups and
/// wires each face's weak back-reference to its chart slot.
pub fn build_charts(mesh: &mut Mesh, groups: Vec<(RegionId, Vec<usize>)>) -> Vec<Chart> {
    let mut charts = Vec::with_capacity(groups.len());
    for (slot, (id, faces)) in groups.into_iter().enumerate() {
        for &f in &faces {
            if let Some(prev) = mesh.faces[f].chart {
                warn!(face = f, prev_slot = prev, new_slot = slot, "face reassigned to another chart");
            }
            mesh.faces[f].chart = Some(slot);
        }
        charts.push(Chart::new(id, faces, mesh));
    }
    charts
}
