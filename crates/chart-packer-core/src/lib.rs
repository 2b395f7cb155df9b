//! Core library for packing mesh UV charts into texture atlases.
//!
//! - Outline extraction: closed boundary polygons per chart, with a
//!   bounding-box fallback for defective geometry
//! - Atlas allocation: best-effort packing rounds with container growth,
//!   driven through a replaceable [`PackingOracle`]
//! - UV rewriting: placement transforms applied and normalized per
//!   container
//! - Integer-shift correction: restores texel-grid alignment at anchor
//!   faces after packing
//!
//! Quick example:
//! ```ignore
//! use chart_packer_core::prelude::*;
//!
//! let mut mesh = Mesh::new();
//! // ... add vertices/faces, then:
//! mesh.build_adjacency();
//! let mut charts = build_charts(&mut mesh, groups);
//! let textures = SourceTextures::new(vec![TextureSize::new(1024, 1024)]);
//! let mut oracle = SkylineOracle::new();
//! let outcome = pack_charts(
//!     &mut mesh,
//!     &mut charts,
//!     &textures,
//!     &mut oracle,
//!     &AlgoParameters::default(),
//! )?;
//! println!("containers: {}", outcome.texture_sizes.len());
//! ```

pub mod atlas;
pub mod config;
pub mod error;
pub mod mesh;
pub mod model;
pub mod oracle;
pub mod outline;
pub mod rewrite;
pub mod shift;
pub mod texture;

pub use atlas::*;
pub use config::*;
pub use error::*;
pub use mesh::{Chart, Face, FacePos, Mesh, RegionId, Vertex, build_charts};
pub use model::*;
pub use oracle::{OraclePlacement, OracleResult, PackingOracle};
pub use outline::{extract_outline, signed_area};
pub use rewrite::apply_placements;
pub use shift::{align_rotation, integer_shift};
pub use texture::{SourceTextures, TextureObject};

/// Convenience prelude for common types and functions.
/// Importing `chart_packer_core::prelude::*` brings the primary APIs into scope.
pub mod prelude {
    pub use crate::atlas::pack_charts;
    pub use crate::config::{AlgoParameters, CostFunction, PackParams};
    pub use crate::error::{PackError, Result};
    pub use crate::mesh::{Chart, Mesh, RegionId, build_charts};
    pub use crate::model::{
        Box2, ChartPlacement, GridSize, Outline, PackOutcome, Rotation, Similarity2, TextureSize,
    };
    pub use crate::oracle::{PackingOracle, skyline::SkylineOracle};
    pub use crate::outline::extract_outline;
    pub use crate::rewrite::apply_placements;
    pub use crate::shift::integer_shift;
    pub use crate::texture::{SourceTextures, TextureObject};
}
