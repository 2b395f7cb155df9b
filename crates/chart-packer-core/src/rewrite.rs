//! UV rewriting: turns placement transforms into final per-corner UV
//! coordinates normalized to each container.

use glam::DVec2;

use crate::mesh::{Chart, Mesh};
use crate::model::{ChartPlacement, GridSize};

/// Applies `placements` to every chart's face corners.
///
/// Charts without a placement collapse to the origin with container 0 so
/// the mesh stays renderable; placed charts get their transform applied
/// and the result divided by the container's grid extent, landing in
/// `[0, 1]` per axis. Both the wedge attribute and the per-vertex alias
/// are written, and every chart is notified that its parameterization
/// changed.
pub fn apply_placements(
    mesh: &mut Mesh,
    charts: &mut [Chart],
    placements: &[ChartPlacement],
    containers: &[GridSize],
) {
    assert_eq!(
        charts.len(),
        placements.len(),
        "one placement per chart is required"
    );
    for (chart, placement) in charts.iter().zip(placements) {
        match *placement {
            ChartPlacement::Packed { container, transform } => {
                let grid = containers[container];
                for &f in chart.faces() {
                    let face = mesh.face_mut(f);
                    let verts = face.vert;
                    let mut corner_uv = [DVec2::ZERO; 3];
                    for j in 0..3 {
                        let mut p = transform.apply(face.wedge_uv[j]);
                        p.x /= grid.w as f64;
                        p.y /= grid.h as f64;
                        face.wedge_uv[j] = p;
                        face.wedge_tex[j] = container;
                        corner_uv[j] = p;
                    }
                    for j in 0..3 {
                        let v = mesh.vertex_mut(verts[j]);
                        v.uv = corner_uv[j];
                        v.tex = container;
                    }
                }
            }
            _ => {
                for &f in chart.faces() {
                    let face = mesh.face_mut(f);
                    let verts = face.vert;
                    for j in 0..3 {
                        face.wedge_uv[j] = DVec2::ZERO;
                        face.wedge_tex[j] = 0;
                    }
                    for &v in &verts {
                        let vertex = mesh.vertex_mut(v);
                        vertex.uv = DVec2::ZERO;
                        vertex.tex = 0;
                    }
                }
            }
        }
    }

    for chart in charts.iter_mut() {
        chart.parameterization_changed(mesh);
    }
}
