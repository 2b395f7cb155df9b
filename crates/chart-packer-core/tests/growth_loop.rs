use chart_packer_core::prelude::*;
use chart_packer_core::{OraclePlacement, OracleResult};
use glam::DVec2;

fn add_quad(mesh: &mut Mesh, origin: DVec2, size: f64, region: RegionId) -> Vec<usize> {
    let p = [
        origin,
        origin + DVec2::new(size, 0.0),
        origin + DVec2::new(size, size),
        origin + DVec2::new(0.0, size),
    ];
    let v: Vec<usize> = p.iter().map(|&uv| mesh.add_vertex(uv)).collect();
    let f0 = mesh.add_face([v[0], v[1], v[2]], [p[0], p[1], p[2]], region);
    let f1 = mesh.add_face([v[0], v[2], v[3]], [p[0], p[2], p[3]], region);
    vec![f0, f1]
}

/// Places every non-empty outline with an identity transform.
struct PlaceAll;

impl PackingOracle for PlaceAll {
    fn pack(
        &mut self,
        outlines: &[Outline],
        _container: GridSize,
        _params: &PackParams,
        _scale: f64,
    ) -> OracleResult {
        let placements: Vec<Option<OraclePlacement>> = outlines
            .iter()
            .map(|o| {
                (!o.is_empty()).then_some(OraclePlacement {
                    container: 0,
                    transform: Similarity2::identity(),
                })
            })
            .collect();
        OracleResult {
            packed: placements.iter().filter(|p| p.is_some()).count(),
            placements,
        }
    }
}

/// Refuses the first `refusals` invocations, then places everything.
struct RefuseFirst {
    refusals: usize,
    calls: usize,
}

impl PackingOracle for RefuseFirst {
    fn pack(
        &mut self,
        outlines: &[Outline],
        container: GridSize,
        params: &PackParams,
        scale: f64,
    ) -> OracleResult {
        self.calls += 1;
        if self.calls <= self.refusals {
            return OracleResult::refuse_all(outlines.len());
        }
        PlaceAll.pack(outlines, container, params, scale)
    }
}

#[test]
fn three_square_charts_land_in_one_container() {
    let mut mesh = Mesh::new();
    let mut groups = Vec::new();
    for (i, origin) in [DVec2::ZERO, DVec2::new(100.0, 0.0), DVec2::new(0.0, 100.0)]
        .into_iter()
        .enumerate()
    {
        let faces = add_quad(&mut mesh, origin, 64.0, i as RegionId);
        groups.push((i as RegionId, faces));
    }
    mesh.build_adjacency();
    let mut charts = build_charts(&mut mesh, groups);

    let textures = SourceTextures::new(vec![TextureSize::new(1024, 1024)]);
    let mut oracle = SkylineOracle::new();
    let outcome = pack_charts(
        &mut mesh,
        &mut charts,
        &textures,
        &mut oracle,
        &AlgoParameters::default(),
    )
    .unwrap();

    assert_eq!(outcome.total_packed, 3);
    assert_eq!(outcome.placed_count(), 3);
    assert_eq!(outcome.skipped_count(), 0);
    // One 16384 grid at packing scale 16 realizes the source resolution.
    assert_eq!(outcome.texture_sizes, vec![TextureSize::new(1024, 1024)]);
    for placement in &outcome.placements {
        assert_eq!(placement.container(), Some(0));
    }

    for i in 0..mesh.face_count() {
        let face = mesh.face(i);
        for j in 0..3 {
            let uv = face.wedge_uv[j];
            assert!((0.0..=1.0).contains(&uv.x) && (0.0..=1.0).contains(&uv.y));
            assert_eq!(face.wedge_tex[j], 0);
        }
    }
}

#[test]
fn empty_outline_chart_is_skipped_but_counted() {
    let mut mesh = Mesh::new();
    let a = add_quad(&mut mesh, DVec2::ZERO, 32.0, 0);
    let b = add_quad(&mut mesh, DVec2::new(50.0, 0.0), 32.0, 1);
    mesh.build_adjacency();
    let mut charts = build_charts(&mut mesh, vec![(0, a), (1, b), (2, Vec::new())]);

    let textures = SourceTextures::new(vec![TextureSize::new(256, 256)]);
    let mut oracle = PlaceAll;
    let outcome = pack_charts(
        &mut mesh,
        &mut charts,
        &textures,
        &mut oracle,
        &AlgoParameters::default(),
    )
    .unwrap();

    // Skips advance the same counter as placements.
    assert_eq!(outcome.total_packed, 3);
    assert_eq!(outcome.placed_count(), 2);
    assert_eq!(outcome.placements[2], ChartPlacement::SkippedEmptyOutline);
    assert!(outcome.placements[0].is_packed());
    assert!(outcome.placements[1].is_packed());
}

#[test]
fn oversized_chart_never_reaches_the_oracle() {
    struct Recording {
        batches: Vec<usize>,
        max_extent: f64,
    }
    impl PackingOracle for Recording {
        fn pack(
            &mut self,
            outlines: &[Outline],
            container: GridSize,
            params: &PackParams,
            scale: f64,
        ) -> OracleResult {
            self.batches.push(outlines.len());
            for o in outlines {
                let d = Box2::from_points(o).dim();
                self.max_extent = self.max_extent.max(d.x).max(d.y);
            }
            PlaceAll.pack(outlines, container, params, scale)
        }
    }

    let mut mesh = Mesh::new();
    let small = add_quad(&mut mesh, DVec2::ZERO, 64.0, 0);
    // Packing scale is 16 here, so this diagonal lands far past the
    // rasterizer ceiling.
    let huge = add_quad(&mut mesh, DVec2::new(200.0, 0.0), 3000.0, 1);
    mesh.build_adjacency();
    let mut charts = build_charts(&mut mesh, vec![(0, small), (1, huge)]);

    let textures = SourceTextures::new(vec![TextureSize::new(1024, 1024)]);
    let mut oracle = Recording {
        batches: Vec::new(),
        max_extent: 0.0,
    };
    let outcome = pack_charts(
        &mut mesh,
        &mut charts,
        &textures,
        &mut oracle,
        &AlgoParameters::default(),
    )
    .unwrap();

    assert_eq!(outcome.total_packed, 2);
    assert_eq!(outcome.placements[1], ChartPlacement::SkippedOversized);
    assert!(outcome.placements[0].is_packed());
    assert_eq!(oracle.batches, vec![1]);
    assert!(oracle.max_extent < 100.0, "only the small chart was offered");
}

#[test]
fn non_finite_chart_is_skipped_as_invalid_bbox() {
    let mut mesh = Mesh::new();
    let good = add_quad(&mut mesh, DVec2::ZERO, 32.0, 0);
    let p = [
        DVec2::new(50.0, 0.0),
        DVec2::new(f64::INFINITY, 0.0),
        DVec2::new(50.0, 10.0),
    ];
    let v: Vec<usize> = p.iter().map(|&uv| mesh.add_vertex(uv)).collect();
    let bad = vec![mesh.add_face([v[0], v[1], v[2]], p, 1)];
    mesh.build_adjacency();
    let mut charts = build_charts(&mut mesh, vec![(0, good), (1, bad)]);

    let textures = SourceTextures::new(vec![TextureSize::new(256, 256)]);
    let mut oracle = PlaceAll;
    let outcome = pack_charts(
        &mut mesh,
        &mut charts,
        &textures,
        &mut oracle,
        &AlgoParameters::default(),
    )
    .unwrap();

    assert_eq!(outcome.total_packed, 2);
    assert_eq!(outcome.placements[1], ChartPlacement::SkippedInvalidBbox);
    assert!(outcome.placements[0].is_packed());
}

#[test]
fn starved_round_grows_the_container() {
    let mut mesh = Mesh::new();
    let faces = add_quad(&mut mesh, DVec2::ZERO, 64.0, 0);
    mesh.build_adjacency();
    let mut charts = build_charts(&mut mesh, vec![(0, faces)]);

    let textures = SourceTextures::new(vec![TextureSize::new(1024, 1024)]);
    let mut oracle = RefuseFirst {
        refusals: 2,
        calls: 0,
    };
    let outcome = pack_charts(
        &mut mesh,
        &mut charts,
        &textures,
        &mut oracle,
        &AlgoParameters::default(),
    )
    .unwrap();

    assert_eq!(oracle.calls, 3);
    // 16384 grown twice by 10% (integer truncation), realized at scale 16.
    assert_eq!(outcome.texture_sizes, vec![TextureSize::new(1239, 1239)]);
    assert!(outcome.placements[0].is_packed());
}

#[test]
fn attempt_budget_exhaustion_is_a_typed_error() {
    /// Places outline slot 0 on the first call, then refuses forever, which
    /// strands the second chart on a container too small to ever grow past
    /// the attempt budget.
    struct FirstCallOnly {
        calls: usize,
    }
    impl PackingOracle for FirstCallOnly {
        fn pack(
            &mut self,
            outlines: &[Outline],
            _container: GridSize,
            _params: &PackParams,
            _scale: f64,
        ) -> OracleResult {
            self.calls += 1;
            let mut placements = vec![None; outlines.len()];
            if self.calls == 1 {
                placements[0] = Some(OraclePlacement {
                    container: 0,
                    transform: Similarity2::identity(),
                });
            }
            OracleResult {
                packed: if self.calls == 1 { 1 } else { 0 },
                placements,
            }
        }
    }

    let mut mesh = Mesh::new();
    let a = add_quad(&mut mesh, DVec2::ZERO, 64.0, 0);
    let b = add_quad(&mut mesh, DVec2::new(100.0, 0.0), 64.0, 1);
    mesh.build_adjacency();
    let mut charts = build_charts(&mut mesh, vec![(0, a), (1, b)]);

    let textures =
        SourceTextures::new(vec![TextureSize::new(4096, 4096), TextureSize::new(16, 16)]);
    let mut oracle = FirstCallOnly { calls: 0 };
    let err = pack_charts(
        &mut mesh,
        &mut charts,
        &textures,
        &mut oracle,
        &AlgoParameters::default(),
    )
    .unwrap_err();

    match err {
        PackError::AttemptsExhausted {
            attempts, batch, ..
        } => {
            assert_eq!(attempts, 50);
            assert_eq!(batch, 1);
        }
        other => panic!("expected AttemptsExhausted, got {other:?}"),
    }
}

#[test]
fn unpackable_batch_at_size_ceiling_stays_unresolved() {
    struct Never;
    impl PackingOracle for Never {
        fn pack(
            &mut self,
            outlines: &[Outline],
            _container: GridSize,
            _params: &PackParams,
            _scale: f64,
        ) -> OracleResult {
            OracleResult::refuse_all(outlines.len())
        }
    }

    let mut mesh = Mesh::new();
    let faces = add_quad(&mut mesh, DVec2::ZERO, 64.0, 0);
    mesh.build_adjacency();
    let mut charts = build_charts(&mut mesh, vec![(0, faces)]);

    let textures = SourceTextures::new(vec![TextureSize::new(1024, 1024)]);
    let mut oracle = Never;
    let outcome = pack_charts(
        &mut mesh,
        &mut charts,
        &textures,
        &mut oracle,
        &AlgoParameters::default(),
    )
    .unwrap();

    // The 16384 grid crosses the 20000 ceiling after three growth steps,
    // well before the attempt budget, and the batch is abandoned.
    assert_eq!(outcome.total_packed, 0);
    assert_eq!(outcome.placements, vec![ChartPlacement::Unresolved]);
    assert!(outcome.texture_sizes.is_empty());
    // Unresolved charts collapse to the origin.
    let face = mesh.face(0);
    for j in 0..3 {
        assert_eq!(face.wedge_uv[j], DVec2::ZERO);
        assert_eq!(face.wedge_tex[j], 0);
    }
}

#[test]
#[should_panic(expected = "only container 0 was offered")]
fn oracle_reporting_a_foreign_container_fails_fast() {
    struct Misbehaving;
    impl PackingOracle for Misbehaving {
        fn pack(
            &mut self,
            outlines: &[Outline],
            _container: GridSize,
            _params: &PackParams,
            _scale: f64,
        ) -> OracleResult {
            let placements = outlines
                .iter()
                .map(|_| {
                    Some(OraclePlacement {
                        container: 1,
                        transform: Similarity2::identity(),
                    })
                })
                .collect();
            OracleResult {
                packed: outlines.len(),
                placements,
            }
        }
    }

    let mut mesh = Mesh::new();
    let faces = add_quad(&mut mesh, DVec2::ZERO, 16.0, 0);
    mesh.build_adjacency();
    let mut charts = build_charts(&mut mesh, vec![(0, faces)]);

    let textures = SourceTextures::new(vec![TextureSize::new(256, 256)]);
    let mut oracle = Misbehaving;
    let _ = pack_charts(
        &mut mesh,
        &mut charts,
        &textures,
        &mut oracle,
        &AlgoParameters::default(),
    );
}

#[test]
fn invalid_resolution_scaling_is_rejected() {
    let mut mesh = Mesh::new();
    let faces = add_quad(&mut mesh, DVec2::ZERO, 16.0, 0);
    mesh.build_adjacency();
    let mut charts = build_charts(&mut mesh, vec![(0, faces)]);

    let textures = SourceTextures::new(vec![TextureSize::new(256, 256)]);
    let mut oracle = PlaceAll;
    let err = pack_charts(
        &mut mesh,
        &mut charts,
        &textures,
        &mut oracle,
        &AlgoParameters::new(0.0),
    )
    .unwrap_err();
    assert!(matches!(err, PackError::InvalidParameters(_)));
}

#[test]
fn no_charts_is_a_clean_empty_outcome() {
    let mut mesh = Mesh::new();
    mesh.build_adjacency();
    let mut charts: Vec<Chart> = Vec::new();

    let textures = SourceTextures::new(vec![TextureSize::new(256, 256)]);
    let mut oracle = PlaceAll;
    let outcome = pack_charts(
        &mut mesh,
        &mut charts,
        &textures,
        &mut oracle,
        &AlgoParameters::default(),
    )
    .unwrap();

    assert_eq!(outcome.total_packed, 0);
    assert!(outcome.placements.is_empty());
    assert!(outcome.texture_sizes.is_empty());
}
