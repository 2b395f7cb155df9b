//! Texel-grid alignment correction.
//!
//! Packing moves charts by arbitrary translations, which destroys the
//! integer-grid continuity that merged charts were built around. For each
//! chart carrying an anchor face this pass compares the anchor's fractional
//! texel offset before and after packing and translates the whole chart by
//! the difference, restoring subpixel alignment at the anchor.

use std::collections::HashMap;

use glam::DVec2;

use crate::mesh::{Chart, Mesh, RegionId};
use crate::model::{Rotation, TextureSize};

fn vec_angle(a: DVec2, b: DVec2) -> f64 {
    let denom = a.length() * b.length();
    if denom <= 0.0 {
        return 0.0;
    }
    (a.dot(b) / denom).clamp(-1.0, 1.0).acos()
}

/// Quadrant rotation whose image of `d0` has the smallest angular residual
/// to `d1`. Packing only rotates by quadrants, so one of the four candidates
/// recovers the placement orientation.
pub fn align_rotation(d0: DVec2, d1: DVec2) -> Rotation {
    let mut best = Rotation::R0;
    let mut min_residual = f64::INFINITY;
    for rot in Rotation::ALL {
        let residual = vec_angle(rot.apply(d0), d1);
        if residual < min_residual {
            min_residual = residual;
            best = rot;
        }
    }
    best
}

/// Shifts each anchor-bearing chart so the anchor's fractional texel
/// coordinate matches its pre-packing reference.
///
/// `anchors` maps a chart's region id to its anchor face (mesh-global
/// index); `flipped` records, per pre-merge source region, whether the
/// parameterization was mirrored on input. Charts without an anchor are
/// left as placed. The mesh must carry the wedge-UV snapshot taken before
/// packing, in texel units of the source textures.
pub fn integer_shift(
    mesh: &mut Mesh,
    charts: &[Chart],
    texture_sizes: &[TextureSize],
    anchors: &HashMap<RegionId, usize>,
    flipped: &HashMap<RegionId, bool>,
) {
    assert!(
        mesh.has_stored_wedge_uvs(),
        "integer_shift requires a pre-packing wedge UV snapshot"
    );

    for chart in charts {
        let Some(&anchor) = anchors.get(&chart.id) else {
            continue;
        };
        let face = mesh.face(anchor);
        let stored = mesh.stored_wedge(anchor);
        let flip = *flipped.get(&face.source_region).unwrap_or_else(|| {
            panic!(
                "no flip record for source region {} of anchor face {anchor}",
                face.source_region
            )
        });

        let mut d0 = stored[1] - stored[0];
        let d1 = face.wedge_uv[1] - face.wedge_uv[0];
        if flip {
            d0.x = -d0.x;
        }
        let rotation = align_rotation(d0, d1);

        let ti = face.wedge_tex[0];
        assert!(
            ti < texture_sizes.len(),
            "anchor face {anchor} is stamped with container {ti} but only {} texture sizes exist",
            texture_sizes.len()
        );
        let tex = texture_sizes[ti];
        let (tw, th) = (tex.w as f64, tex.h as f64);

        let u0 = stored[0];
        let u1 = face.wedge_uv[0];

        let mut dx = u0.x.fract();
        let mut dy = u0.y.fract();
        if flip {
            dx = 1.0 - dx;
        }
        // The packed chart may sit under any quadrant rotation; the target
        // fraction follows it by swapping and complementing axes.
        match rotation {
            Rotation::R0 => {}
            Rotation::R90 => {
                std::mem::swap(&mut dx, &mut dy);
                dx = 1.0 - dx;
            }
            Rotation::R180 => {
                dx = 1.0 - dx;
                dy = 1.0 - dy;
            }
            Rotation::R270 => {
                std::mem::swap(&mut dx, &mut dy);
                dy = 1.0 - dy;
            }
        }

        let dx1 = (u1.x * tw).fract();
        let dy1 = (u1.y * th).fract();
        let t = DVec2::new((dx - dx1) / tw, (dy - dy1) / th);

        for &f in chart.faces() {
            let face = mesh.face_mut(f);
            let verts = face.vert;
            let mut corner_uv = [DVec2::ZERO; 3];
            for j in 0..3 {
                face.wedge_uv[j] += t;
                corner_uv[j] = face.wedge_uv[j];
            }
            for j in 0..3 {
                mesh.vertex_mut(verts[j]).uv = corner_uv[j];
            }
        }
    }
}
