use crate::config::PackParams;
use crate::model::{GridSize, Outline, Similarity2};

pub mod skyline;

/// One outline placed by an oracle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OraclePlacement {
    /// Index of the container the outline landed in. The growth loop offers
    /// a single container per invocation, so a conforming oracle always
    /// reports 0 here.
    pub container: usize,
    /// Maps the outline's original UV coordinates into container pixels.
    pub transform: Similarity2,
}

/// Result of one best-effort packing invocation.
#[derive(Debug, Clone)]
pub struct OracleResult {
    /// Number of outlines that received a placement.
    pub packed: usize,
    /// Placement per attempted outline, parallel to the input; `None` for
    /// outlines left behind.
    pub placements: Vec<Option<OraclePlacement>>,
}

impl OracleResult {
    pub fn refuse_all(n: usize) -> Self {
        Self {
            packed: 0,
            placements: vec![None; n],
        }
    }
}

/// Best-effort 2D packer invoked by the growth loop.
///
/// Implementations place as many of `outlines` as they can into one
/// container of `container` grid pixels, scaling UV coordinates by `scale`,
/// and report a transform per placed outline. They must not place two
/// outlines on overlapping regions and must leave unplaceable outlines
/// unassigned rather than fail.
pub trait PackingOracle {
    fn pack(
        &mut self,
        outlines: &[Outline],
        container: GridSize,
        params: &PackParams,
        scale: f64,
    ) -> OracleResult;
}
