//! Atlas allocation: drives repeated best-effort packing rounds across one
//! or more grid containers, growing a container when a round places
//! nothing, until every chart is resolved.

use tracing::{debug, error, info, instrument, warn};

use crate::config::{
    AlgoParameters, CostFunction, GROWTH_FACTOR, GUTTER_WIDTH, MAX_CONTAINER_SIZE,
    MAX_PACK_ATTEMPTS, PACKING_GRID_SIZE, PERMUTATION_BATCH_LIMIT, PackParams, RASTER_MAX_DIM,
};
use crate::error::{PackError, Result};
use crate::mesh::{Chart, Mesh};
use crate::model::{Box2, ChartPlacement, GridSize, Outline, PackOutcome, TextureSize};
use crate::oracle::PackingOracle;
use crate::outline::extract_outline;
use crate::rewrite::apply_placements;
use crate::texture::TextureObject;

/// Packs every chart into grid containers and rewrites the mesh UVs.
///
/// Outlines are extracted up front; the loop then repeatedly batches the
/// still-unresolved charts, filters out degenerate ones, and offers the
/// rest to the oracle against the current container. A starved round grows
/// the container by [`GROWTH_FACTOR`] per axis; growth is bounded by
/// [`MAX_PACK_ATTEMPTS`] and [`MAX_CONTAINER_SIZE`]. Exhausting the attempt
/// budget returns [`PackError::AttemptsExhausted`].
///
/// The returned `total_packed` counts skipped charts together with placed
/// ones; see [`PackOutcome::total_packed`].
#[instrument(skip_all)]
pub fn pack_charts(
    mesh: &mut Mesh,
    charts: &mut [Chart],
    textures: &dyn TextureObject,
    oracle: &mut dyn PackingOracle,
    params: &AlgoParameters,
) -> Result<PackOutcome> {
    params.validate()?;

    let outlines: Vec<Outline> = charts.iter().map(|c| extract_outline(mesh, c)).collect();

    let mut containers: Vec<GridSize> = textures
        .relative_sizes()
        .iter()
        .map(|&(rw, rh)| {
            GridSize::new(
                (PACKING_GRID_SIZE as f64 * rw) as u32,
                (PACKING_GRID_SIZE as f64 * rh) as u32,
            )
        })
        .collect();

    let packing_area: u64 = containers.iter().map(|c| c.area()).sum();
    let texture_area: u64 = (0..containers.len())
        .map(|i| textures.texture_size(i).area())
        .sum();
    let target_area = texture_area as f64 * params.resolution_scaling * params.resolution_scaling;

    let mut packing_scale = if target_area > 0.0 {
        (packing_area as f64 / target_area).sqrt()
    } else {
        1.0
    };
    if !packing_scale.is_finite() || packing_scale <= 0.0 {
        warn!(
            packing_scale,
            packing_area, texture_area, "invalid packing scale, resetting to 1.0"
        );
        packing_scale = 1.0;
    }
    info!(packing_scale, packing_area, texture_area, "packing scale factor");

    let mut states: Vec<ChartPlacement> = vec![ChartPlacement::Unresolved; charts.len()];
    let mut texture_sizes: Vec<TextureSize> = Vec::new();
    let mut total_packed = 0usize;
    let mut nc = 0usize; // current container index

    while total_packed < charts.len() {
        if nc >= containers.len() {
            containers.push(GridSize::new(PACKING_GRID_SIZE, PACKING_GRID_SIZE));
        }

        let batch: Vec<usize> = (0..charts.len())
            .filter(|&i| matches!(states[i], ChartPlacement::Unresolved))
            .collect();
        if batch.is_empty() {
            break;
        }

        // Degenerate charts are resolved here and never reach the oracle.
        let mut sendable: Vec<usize> = Vec::with_capacity(batch.len());
        let mut sendable_outlines: Vec<Outline> = Vec::with_capacity(batch.len());
        let mut sendable_areas: Vec<f64> = Vec::with_capacity(batch.len());
        for &i in &batch {
            let outline = &outlines[i];
            if outline.is_empty() {
                warn!(chart = i, "skipping chart with empty outline");
                states[i] = ChartPlacement::SkippedEmptyOutline;
                total_packed += 1;
                continue;
            }
            let bbox = Box2::from_points(outline);
            if !bbox.is_valid() {
                warn!(chart = i, "skipping chart with invalid UV bounding box");
                states[i] = ChartPlacement::SkippedInvalidBbox;
                total_packed += 1;
                continue;
            }
            let scaled = bbox.dim() * packing_scale;
            let diagonal = scaled.length();
            if diagonal > RASTER_MAX_DIM {
                warn!(
                    chart = i,
                    diagonal, "skipping chart whose scaled diagonal exceeds rasterizer limits"
                );
                states[i] = ChartPlacement::SkippedOversized;
                total_packed += 1;
                continue;
            }
            sendable.push(i);
            sendable_outlines.push(outline.clone());
            sendable_areas.push(bbox.area());
        }

        if sendable.is_empty() {
            continue;
        }

        if let Some(slot) = (0..sendable.len()).max_by(|&a, &b| {
            sendable_areas[a]
                .partial_cmp(&sendable_areas[b])
                .unwrap_or(std::cmp::Ordering::Equal)
        }) {
            debug!(
                chart = sendable[slot],
                uv_area = sendable_areas[slot],
                "largest chart in this packing batch"
            );
        }

        let pack_params = PackParams {
            rotation_num: 4,
            gutter_width: GUTTER_WIDTH,
            cost: CostFunction::LowestHorizon,
            double_horizon: false,
            inner_horizon: false,
            permutations: sendable.len() < PERMUTATION_BATCH_LIMIT,
        };

        let mut attempts: u32 = 0;
        let round = loop {
            attempts += 1;
            if attempts > MAX_PACK_ATTEMPTS {
                error!(
                    width = containers[nc].w,
                    height = containers[nc].h,
                    batch = sendable.len(),
                    "packing loop exceeded the attempt budget"
                );
                return Err(PackError::AttemptsExhausted {
                    attempts: MAX_PACK_ATTEMPTS,
                    width: containers[nc].w,
                    height: containers[nc].h,
                    batch: sendable.len(),
                });
            }
            info!(
                charts = sendable.len(),
                width = containers[nc].w,
                height = containers[nc].h,
                attempt = attempts,
                "packing batch into container grid"
            );
            let result = oracle.pack(&sendable_outlines, containers[nc], &pack_params, packing_scale);
            assert_eq!(
                result.placements.len(),
                sendable_outlines.len(),
                "oracle must report one placement slot per attempted outline"
            );
            debug!(packed = result.packed, "packing attempt finished");
            if result.packed > 0 {
                break result;
            }
            warn!(
                charts = sendable.len(),
                "failed to pack any chart in this batch, growing container"
            );
            containers[nc].grow(GROWTH_FACTOR);
            if containers[nc].w > MAX_CONTAINER_SIZE || containers[nc].h > MAX_CONTAINER_SIZE {
                break result;
            }
        };

        total_packed += round.packed;

        if round.packed == 0 {
            // Even the largest permitted container holds nothing; the
            // remaining charts stay unresolved.
            break;
        }

        let texture_scale = 1.0 / packing_scale;
        texture_sizes.push(TextureSize::new(
            (containers[nc].w as f64 * texture_scale) as u32,
            (containers[nc].h as f64 * texture_scale) as u32,
        ));

        for (slot, placement) in round.placements.iter().enumerate() {
            let Some(p) = placement else { continue };
            assert_eq!(
                p.container, 0,
                "oracle placed outline {slot} into container {} but only container 0 was offered",
                p.container
            );
            let chart = sendable[slot];
            assert!(
                matches!(states[chart], ChartPlacement::Unresolved),
                "oracle double-assigned chart {chart}"
            );
            states[chart] = ChartPlacement::Packed {
                container: nc,
                transform: p.transform,
            };
        }
        nc += 1;
    }

    apply_placements(mesh, charts, &states, &containers);

    Ok(PackOutcome {
        total_packed,
        texture_sizes,
        placements: states,
    })
}
