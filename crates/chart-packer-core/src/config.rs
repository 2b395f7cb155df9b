use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Side length of the packing grid a container starts from, before the
/// per-container relative-size fraction is applied.
pub const PACKING_GRID_SIZE: u32 = 16384;

/// Hard ceiling on container growth. A batch that cannot pack below this
/// size is abandoned.
pub const MAX_CONTAINER_SIZE: u32 = 20000;

/// Oracle invocations allowed per container round before the run is
/// declared unpackable.
pub const MAX_PACK_ATTEMPTS: u32 = 50;

/// Largest scaled bounding-box diagonal the rasterizing backend can
/// handle (its image dimension limit is 32767).
pub const RASTER_MAX_DIM: f64 = 32766.0;

/// Permutation search is only affordable below this batch size.
pub const PERMUTATION_BATCH_LIMIT: usize = 50;

/// Per-axis container growth applied when an oracle round places nothing.
pub const GROWTH_FACTOR: f64 = 1.1;

/// Pixels of spacing reserved around each placed outline.
pub const GUTTER_WIDTH: u32 = 4;

/// Placement cost functions understood by packing oracles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CostFunction {
    /// Minimize the area trapped below the placed outline.
    MinWastedSpace,
    /// Place at the lowest available horizon (bottom-left).
    LowestHorizon,
    /// Minimize waste, break ties on the lower horizon.
    MixedCost,
}

impl FromStr for CostFunction {
    type Err = ();
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "min_wasted_space" | "minwaste" => Ok(Self::MinWastedSpace),
            "lowest_horizon" | "lowest" => Ok(Self::LowestHorizon),
            "mixed_cost" | "mixed" => Ok(Self::MixedCost),
            _ => Err(()),
        }
    }
}

/// Per-attempt parameter bundle handed to the packing oracle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PackParams {
    /// Number of quadrant rotations the oracle may try (1, 2 or 4).
    #[serde(default = "default_rotation_num")]
    pub rotation_num: u32,
    /// Spacing reserved around each placed outline, in grid pixels.
    #[serde(default = "default_gutter_width")]
    pub gutter_width: u32,
    #[serde(default = "default_cost")]
    pub cost: CostFunction,
    /// Secondary-horizon refinement. Oracles without the concept ignore it.
    #[serde(default)]
    pub double_horizon: bool,
    /// Inner-horizon refinement. Oracles without the concept ignore it.
    #[serde(default)]
    pub inner_horizon: bool,
    /// Try multiple insertion orders instead of a single greedy pass.
    #[serde(default)]
    pub permutations: bool,
}

impl Default for PackParams {
    fn default() -> Self {
        Self {
            rotation_num: default_rotation_num(),
            gutter_width: default_gutter_width(),
            cost: default_cost(),
            double_horizon: false,
            inner_horizon: false,
            permutations: false,
        }
    }
}

fn default_rotation_num() -> u32 {
    4
}
fn default_gutter_width() -> u32 {
    GUTTER_WIDTH
}
fn default_cost() -> CostFunction {
    CostFunction::LowestHorizon
}

/// User-facing knobs of a packing run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlgoParameters {
    /// Multiplier on the source texture resolution when sizing output
    /// atlases; 1.0 reproduces the source resolution.
    #[serde(default = "default_resolution_scaling")]
    pub resolution_scaling: f64,
}

impl AlgoParameters {
    pub fn new(resolution_scaling: f64) -> Self {
        Self { resolution_scaling }
    }

    /// Rejects non-finite or non-positive scaling factors.
    pub fn validate(&self) -> crate::error::Result<()> {
        use crate::error::PackError;

        if !self.resolution_scaling.is_finite() || self.resolution_scaling <= 0.0 {
            return Err(PackError::InvalidParameters(format!(
                "resolution_scaling must be finite and positive, got {}",
                self.resolution_scaling
            )));
        }
        Ok(())
    }
}

impl Default for AlgoParameters {
    fn default() -> Self {
        Self {
            resolution_scaling: default_resolution_scaling(),
        }
    }
}

fn default_resolution_scaling() -> f64 {
    1.0
}
