//! Built-in bounding-box packing oracle.
//!
//! Places each outline's scaled, gutter-inflated bounding box on a skyline.
//! This is a stand-in for an external rasterizing packer: it never overlaps
//! placements and honors the quadrant-rotation restriction, but it does not
//! nest concave outlines. A bounding box is invariant under 180° rotation,
//! so of the four permitted rotations only two distinct footprints exist
//! and placements carry either `R0` or `R90`.

use glam::DVec2;

use super::{OraclePlacement, OracleResult, PackingOracle};
use crate::config::{CostFunction, PackParams};
use crate::model::{Box2, GridSize, Outline, Rotation, Similarity2};

#[derive(Debug, Clone, Copy)]
struct Rect {
    x: u32,
    y: u32,
    w: u32,
    h: u32,
}

impl Rect {
    fn new(x: u32, y: u32, w: u32, h: u32) -> Self {
        Self { x, y, w, h }
    }
    #[inline]
    fn right(&self) -> u32 {
        self.x + self.w.saturating_sub(1)
    }
    #[inline]
    fn bottom(&self) -> u32 {
        self.y + self.h.saturating_sub(1)
    }
    fn contains(&self, r: &Rect) -> bool {
        r.x >= self.x && r.y >= self.y && r.right() <= self.right() && r.bottom() <= self.bottom()
    }
}

#[derive(Debug, Clone, Copy)]
struct SkylineNode {
    x: u32,
    y: u32,
    w: u32,
}

impl SkylineNode {
    #[inline]
    fn left(&self) -> u32 {
        self.x
    }
    #[inline]
    fn right(&self) -> u32 {
        self.x + self.w.saturating_sub(1)
    }
}

struct SkylineBed {
    border: Rect,
    skylines: Vec<SkylineNode>,
}

impl SkylineBed {
    fn new(container: GridSize) -> Self {
        Self {
            border: Rect::new(0, 0, container.w, container.h),
            skylines: vec![SkylineNode {
                x: 0,
                y: 0,
                w: container.w,
            }],
        }
    }

    fn can_put(&self, mut i: usize, w: u32, h: u32) -> Option<Rect> {
        let mut rect = Rect::new(self.skylines[i].x, 0, w, h);
        let mut width_left = rect.w;
        loop {
            rect.y = rect.y.max(self.skylines[i].y);
            if !self.border.contains(&rect) {
                return None;
            }
            if self.skylines[i].w >= width_left {
                return Some(rect);
            }
            width_left -= self.skylines[i].w;
            i += 1;
            if i >= self.skylines.len() {
                return None;
            }
        }
    }

    fn wasted_area_for(&self, start: usize, r: &Rect) -> u32 {
        let mut area: u32 = 0;
        let mut width_left = r.w;
        let mut i = start;
        let base_y = r.y;
        while width_left > 0 && i < self.skylines.len() {
            let seg = &self.skylines[i];
            let use_w = width_left.min(seg.w);
            if seg.y > base_y {
                area = area.saturating_add((seg.y - base_y) * use_w);
            }
            width_left -= use_w;
            i += 1;
        }
        area
    }

    /// Finds a slot for a `w` x `h` footprint, optionally trying the
    /// transposed footprint as well. Returns the insertion index, the
    /// chosen rect and whether the transposed orientation won.
    fn find(&self, w: u32, h: u32, allow_rot: bool, cost: CostFunction) -> Option<(usize, Rect, bool)> {
        match cost {
            CostFunction::LowestHorizon => self.find_bottom_left(w, h, allow_rot),
            CostFunction::MinWastedSpace | CostFunction::MixedCost => {
                self.find_min_waste(w, h, allow_rot)
            }
        }
    }

    fn find_bottom_left(&self, w: u32, h: u32, allow_rot: bool) -> Option<(usize, Rect, bool)> {
        let mut best_bottom = u32::MAX;
        let mut best_width = u32::MAX;
        let mut best: Option<(usize, Rect, bool)> = None;

        for i in 0..self.skylines.len() {
            if let Some(r) = self.can_put(i, w, h) {
                if r.bottom() < best_bottom
                    || (r.bottom() == best_bottom && self.skylines[i].w < best_width)
                {
                    best_bottom = r.bottom();
                    best_width = self.skylines[i].w;
                    best = Some((i, r, false));
                }
            }
            if allow_rot && w != h {
                if let Some(r) = self.can_put(i, h, w) {
                    if r.bottom() < best_bottom
                        || (r.bottom() == best_bottom && self.skylines[i].w < best_width)
                    {
                        best_bottom = r.bottom();
                        best_width = self.skylines[i].w;
                        best = Some((i, r, true));
                    }
                }
            }
        }
        best
    }

    fn find_min_waste(&self, w: u32, h: u32, allow_rot: bool) -> Option<(usize, Rect, bool)> {
        let mut best_waste = u32::MAX;
        let mut best_bottom = u32::MAX;
        let mut best: Option<(usize, Rect, bool)> = None;

        for i in 0..self.skylines.len() {
            if let Some(r) = self.can_put(i, w, h) {
                let waste = self.wasted_area_for(i, &r);
                if waste < best_waste || (waste == best_waste && r.bottom() < best_bottom) {
                    best_waste = waste;
                    best_bottom = r.bottom();
                    best = Some((i, r, false));
                }
            }
            if allow_rot && w != h {
                if let Some(r) = self.can_put(i, h, w) {
                    let waste = self.wasted_area_for(i, &r);
                    if waste < best_waste || (waste == best_waste && r.bottom() < best_bottom) {
                        best_waste = waste;
                        best_bottom = r.bottom();
                        best = Some((i, r, true));
                    }
                }
            }
        }
        best
    }

    fn split(&mut self, index: usize, rect: &Rect) {
        // Clamp so a placement touching the bottom edge cannot push the
        // skyline past the border.
        let mut new_y = rect.bottom().saturating_add(1);
        if new_y > self.border.bottom() {
            new_y = self.border.bottom();
        }
        let node = SkylineNode {
            x: rect.x,
            y: new_y,
            w: rect.w,
        };
        debug_assert!(node.right() <= self.border.right());

        self.skylines.insert(index, node);

        let i = index + 1;
        while i < self.skylines.len() {
            if self.skylines[i - 1].left() <= self.skylines[i].left() {
                if self.skylines[i].left() <= self.skylines[i - 1].right() {
                    let shrink = self.skylines[i - 1].right() - self.skylines[i].left() + 1;
                    if self.skylines[i].w <= shrink {
                        self.skylines.remove(i);
                    } else {
                        self.skylines[i].x += shrink;
                        self.skylines[i].w -= shrink;
                        break;
                    }
                } else {
                    break;
                }
            } else {
                break;
            }
        }
    }

    fn merge(&mut self) {
        let mut i = 1;
        while i < self.skylines.len() {
            if self.skylines[i - 1].y == self.skylines[i].y {
                let w = self.skylines[i].w;
                self.skylines[i - 1].w = self.skylines[i - 1].w.saturating_add(w);
                self.skylines.remove(i);
            } else {
                i += 1;
            }
        }
    }
}

/// Skyline-based [`PackingOracle`] over outline bounding boxes.
#[derive(Debug, Default)]
pub struct SkylineOracle;

impl SkylineOracle {
    pub fn new() -> Self {
        Self
    }
}

impl PackingOracle for SkylineOracle {
    fn pack(
        &mut self,
        outlines: &[Outline],
        container: GridSize,
        params: &PackParams,
        scale: f64,
    ) -> OracleResult {
        let gutter = params.gutter_width;
        let margin = gutter / 2;
        let allow_rot = params.rotation_num > 1;

        struct Item {
            index: usize,
            bbox: Box2,
            // content footprint in grid pixels, pre-gutter
            cw: u32,
            ch: u32,
        }

        let mut items: Vec<Item> = Vec::with_capacity(outlines.len());
        for (index, outline) in outlines.iter().enumerate() {
            if outline.is_empty() {
                continue;
            }
            let bbox = Box2::from_points(outline);
            if !bbox.is_valid() {
                continue;
            }
            let cw = ((bbox.dim().x * scale).ceil() as u32).max(1);
            let ch = ((bbox.dim().y * scale).ceil() as u32).max(1);
            items.push(Item { index, bbox, cw, ch });
        }

        if params.permutations {
            // Largest footprint first; stable on the original order.
            items.sort_by(|a, b| {
                let aa = a.cw as u64 * a.ch as u64;
                let ba = b.cw as u64 * b.ch as u64;
                ba.cmp(&aa).then(a.index.cmp(&b.index))
            });
        }

        let mut bed = SkylineBed::new(container);
        let mut placements: Vec<Option<OraclePlacement>> = vec![None; outlines.len()];
        let mut packed = 0usize;

        for item in &items {
            let slot_w = item.cw + gutter;
            let slot_h = item.ch + gutter;
            let Some((i, rect, transposed)) = bed.find(slot_w, slot_h, allow_rot, params.cost)
            else {
                continue;
            };
            bed.split(i, &rect);
            bed.merge();

            let content = DVec2::new((rect.x + margin) as f64, (rect.y + margin) as f64);
            let rotation = if transposed { Rotation::R90 } else { Rotation::R0 };
            // Corner of the rotated bbox that lands at the content origin.
            let rot_min = match rotation {
                Rotation::R90 => DVec2::new(-item.bbox.max.y, item.bbox.min.x),
                _ => item.bbox.min,
            };
            placements[item.index] = Some(OraclePlacement {
                container: 0,
                transform: Similarity2 {
                    rotation,
                    scale,
                    translation: content - rot_min * scale,
                },
            });
            packed += 1;
        }

        OracleResult { packed, placements }
    }
}
