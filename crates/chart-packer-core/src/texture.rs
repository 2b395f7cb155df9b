use serde::{Deserialize, Serialize};

use crate::model::TextureSize;

/// Source-texture abstraction the allocator sizes its containers from.
///
/// One output container is seeded per source texture; its target shape is
/// the texture's extent relative to the largest source texture.
pub trait TextureObject {
    /// Relative `(width, height)` fraction per source texture, each in
    /// `(0, 1]`, with the largest texture mapping to `(1.0, 1.0)`.
    fn relative_sizes(&self) -> Vec<(f64, f64)>;

    fn texture_count(&self) -> usize;

    /// Pixel dimensions of source texture `index`.
    fn texture_size(&self, index: usize) -> TextureSize;
}

/// Plain list of source texture dimensions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceTextures {
    sizes: Vec<TextureSize>,
}

impl SourceTextures {
    pub fn new(sizes: Vec<TextureSize>) -> Self {
        Self { sizes }
    }
}

impl TextureObject for SourceTextures {
    fn relative_sizes(&self) -> Vec<(f64, f64)> {
        let max_w = self.sizes.iter().map(|s| s.w).max().unwrap_or(0);
        let max_h = self.sizes.iter().map(|s| s.h).max().unwrap_or(0);
        if max_w == 0 || max_h == 0 {
            return vec![(0.0, 0.0); self.sizes.len()];
        }
        self.sizes
            .iter()
            .map(|s| (s.w as f64 / max_w as f64, s.h as f64 / max_h as f64))
            .collect()
    }

    fn texture_count(&self) -> usize {
        self.sizes.len()
    }

    fn texture_size(&self, index: usize) -> TextureSize {
        self.sizes[index]
    }
}
