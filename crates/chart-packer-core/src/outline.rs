//! Chart boundary extraction.
//!
//! Walks the border loops of a chart's UV island and selects a canonical
//! closed polygon for the packer. Charts with defective boundaries fall
//! back to their UV bounding box, so every chart with a valid box yields a
//! usable outline.

use glam::DVec2;
use tracing::warn;

use crate::mesh::{Chart, FacePos, Mesh};
use crate::model::{Box2, Outline};

/// Signed area of `poly`; positive for counter-clockwise winding.
pub fn signed_area(poly: &[DVec2]) -> f64 {
    if poly.len() < 3 {
        return 0.0;
    }
    let mut acc = 0.0;
    for (i, &p) in poly.iter().enumerate() {
        let q = poly[(i + 1) % poly.len()];
        acc += p.x * q.y - q.x * p.y;
    }
    acc / 2.0
}

/// Extracts the boundary outline of `chart`.
///
/// Multiple border loops (holes, disconnected islands) reduce to the loop
/// with the most vertices, first found winning ties. The result is oriented
/// counter-clockwise. If no loop closes, or the canonical loop undershoots
/// the chart's own UV bounding box on either axis, the box itself is
/// returned as a 4-point rectangle (non-finite if the chart's UVs are); a
/// chart without faces yields an empty outline.
pub fn extract_outline(mesh: &Mesh, chart: &Chart) -> Outline {
    let step_cap = chart.face_count() * 3 + 1;
    let mut loops: Vec<Outline> = Vec::new();
    let mut visited: Vec<bool> = vec![false; chart.face_count()];
    let local: std::collections::HashMap<usize, usize> = chart
        .faces()
        .iter()
        .enumerate()
        .map(|(i, &f)| (f, i))
        .collect();

    for &f in chart.faces() {
        for e in 0..3 {
            if visited[local[&f]] || !mesh.is_border(f, e) {
                continue;
            }
            let start = FacePos { face: f, edge: e };
            let mut pos = start;
            let mut poly = Outline::new();
            let mut closed = false;
            loop {
                if let Some(&l) = local.get(&pos.face) {
                    visited[l] = true;
                }
                poly.push(mesh.face(pos.face).wedge_uv[pos.edge]);
                match mesh.next_border(pos, step_cap) {
                    Some(next) => pos = next,
                    None => break,
                }
                if pos == start {
                    closed = true;
                    break;
                }
                if poly.len() > step_cap {
                    break;
                }
            }
            if closed {
                loops.push(poly);
            } else {
                warn!(
                    chart = chart.id,
                    face = f,
                    "boundary walk did not close, dropping loop"
                );
            }
        }
    }

    let chart_box = chart.uv_box();
    let maxsz = loops.iter().map(|l| l.len()).max().unwrap_or(0);

    if maxsz > 0 {
        let i = if loops.len() == 1 {
            0
        } else {
            loops.iter().position(|l| l.len() == maxsz).unwrap()
        };
        let mut poly = std::mem::take(&mut loops[i]);
        if signed_area(&poly) < 0.0 {
            poly.reverse();
        }
        let outline_box = Box2::from_points(&poly);
        if outline_box.dim().x >= chart_box.dim().x && outline_box.dim().y >= chart_box.dim().y {
            return poly;
        }
    }

    warn!(
        chart = chart.id,
        faces = chart.face_count(),
        bbox_area = chart_box.area(),
        "could not extract a covering outline, falling back to the UV bounding box"
    );

    if chart.face_count() == 0 {
        return Outline::new();
    }
    vec![
        DVec2::new(chart_box.min.x, chart_box.min.y),
        DVec2::new(chart_box.max.x, chart_box.min.y),
        DVec2::new(chart_box.max.x, chart_box.max.y),
        DVec2::new(chart_box.min.x, chart_box.max.y),
    ]
}
