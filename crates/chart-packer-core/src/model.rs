use glam::DVec2;
use serde::{Deserialize, Serialize};

/// Closed polygon boundary of a chart in UV space, counter-clockwise.
pub type Outline = Vec<DVec2>;

/// Axis-aligned bounding box in UV space.
///
/// A freshly created box is inverted (`min = +inf`, `max = -inf`) so that a
/// box that never absorbed a point reports non-finite extents and fails any
/// `is_finite` filter downstream.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Box2 {
    pub min: DVec2,
    pub max: DVec2,
}

impl Box2 {
    pub fn empty() -> Self {
        Self {
            min: DVec2::splat(f64::INFINITY),
            max: DVec2::splat(f64::NEG_INFINITY),
        }
    }

    pub fn add(&mut self, p: DVec2) {
        self.min = self.min.min(p);
        self.max = self.max.max(p);
    }

    pub fn from_points<'a, I>(points: I) -> Self
    where
        I: IntoIterator<Item = &'a DVec2>,
    {
        let mut b = Self::empty();
        for &p in points {
            b.add(p);
        }
        b
    }

    /// Extent per axis. Negative (or non-finite) for a box without points.
    #[inline]
    pub fn dim(&self) -> DVec2 {
        self.max - self.min
    }

    #[inline]
    pub fn area(&self) -> f64 {
        let d = self.dim();
        d.x * d.y
    }

    /// True if both extents are finite and non-negative.
    pub fn is_valid(&self) -> bool {
        let d = self.dim();
        d.x.is_finite() && d.y.is_finite() && d.x >= 0.0 && d.y >= 0.0
    }
}

impl Default for Box2 {
    fn default() -> Self {
        Self::empty()
    }
}

/// Quadrant rotation. The packing pipeline never rotates by arbitrary
/// angles; restricting placements to these four keeps texel alignment
/// recoverable after packing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Rotation {
    #[default]
    R0,
    R90,
    R180,
    R270,
}

impl Rotation {
    pub const ALL: [Rotation; 4] = [Rotation::R0, Rotation::R90, Rotation::R180, Rotation::R270];

    /// Rotate `p` counter-clockwise about the origin.
    #[inline]
    pub fn apply(self, p: DVec2) -> DVec2 {
        match self {
            Rotation::R0 => p,
            Rotation::R90 => DVec2::new(-p.y, p.x),
            Rotation::R180 => -p,
            Rotation::R270 => DVec2::new(p.y, -p.x),
        }
    }

    #[inline]
    pub fn index(self) -> usize {
        match self {
            Rotation::R0 => 0,
            Rotation::R90 => 1,
            Rotation::R180 => 2,
            Rotation::R270 => 3,
        }
    }

    #[inline]
    pub fn radians(self) -> f64 {
        self.index() as f64 * std::f64::consts::FRAC_PI_2
    }
}

/// Similarity transform mapping a chart's UV outline into a container's
/// pixel-like space: rotate, then scale uniformly, then translate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Similarity2 {
    pub rotation: Rotation,
    pub scale: f64,
    pub translation: DVec2,
}

impl Similarity2 {
    pub fn identity() -> Self {
        Self {
            rotation: Rotation::R0,
            scale: 1.0,
            translation: DVec2::ZERO,
        }
    }

    #[inline]
    pub fn apply(&self, p: DVec2) -> DVec2 {
        self.rotation.apply(p) * self.scale + self.translation
    }
}

impl Default for Similarity2 {
    fn default() -> Self {
        Self::identity()
    }
}

/// Integer grid extent of an atlas container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridSize {
    pub w: u32,
    pub h: u32,
}

impl GridSize {
    pub fn new(w: u32, h: u32) -> Self {
        Self { w, h }
    }

    #[inline]
    pub fn area(&self) -> u64 {
        self.w as u64 * self.h as u64
    }

    /// Grow both extents by `factor`, truncating to the grid.
    pub fn grow(&mut self, factor: f64) {
        self.w = (self.w as f64 * factor) as u32;
        self.h = (self.h as f64 * factor) as u32;
    }
}

/// Realized pixel dimensions of an output texture (container grid divided
/// by the global packing scale).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextureSize {
    pub w: u32,
    pub h: u32,
}

impl TextureSize {
    pub fn new(w: u32, h: u32) -> Self {
        Self { w, h }
    }

    #[inline]
    pub fn area(&self) -> u64 {
        self.w as u64 * self.h as u64
    }
}

/// Terminal (or pending) packing state of one chart.
///
/// Every chart ends a packing run in exactly one of these states. Skipped
/// charts are permanently resolved and never retried; `Unresolved` survives
/// only when the growth loop gives up on a whole batch at the container
/// size ceiling.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartPlacement {
    /// Not yet attempted, or abandoned after container growth stalled.
    Unresolved,
    /// Outline had zero points.
    SkippedEmptyOutline,
    /// Outline bounding box was non-finite or negative.
    SkippedInvalidBbox,
    /// Scaled bounding-box diagonal exceeded the rasterizer size ceiling.
    SkippedOversized,
    /// Placed into `container` under `transform`.
    Packed {
        container: usize,
        transform: Similarity2,
    },
}

impl ChartPlacement {
    #[inline]
    pub fn is_packed(&self) -> bool {
        matches!(self, ChartPlacement::Packed { .. })
    }

    #[inline]
    pub fn is_skipped(&self) -> bool {
        matches!(
            self,
            ChartPlacement::SkippedEmptyOutline
                | ChartPlacement::SkippedInvalidBbox
                | ChartPlacement::SkippedOversized
        )
    }

    /// Container index for packed charts, `None` otherwise.
    pub fn container(&self) -> Option<usize> {
        match self {
            ChartPlacement::Packed { container, .. } => Some(*container),
            _ => None,
        }
    }
}

/// Result of a packing run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PackOutcome {
    /// Count of resolved charts. Permanently skipped charts increment this
    /// counter exactly like successfully placed ones; callers that need the
    /// placed-only count should filter `placements`.
    pub total_packed: usize,
    /// Realized pixel size per container actually used, in container order.
    pub texture_sizes: Vec<TextureSize>,
    /// Final state per input chart, in input order.
    pub placements: Vec<ChartPlacement>,
}

impl PackOutcome {
    /// Number of charts that received an actual placement.
    pub fn placed_count(&self) -> usize {
        self.placements.iter().filter(|p| p.is_packed()).count()
    }

    /// Number of charts permanently skipped for degenerate geometry.
    pub fn skipped_count(&self) -> usize {
        self.placements.iter().filter(|p| p.is_skipped()).count()
    }
}
