//! Texture atlas with shelf placement.

use super::RenderError;

/// A placed rectangle inside the atlas, in texels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AtlasRegion {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

struct Shelf {
    y: u32,
    height: u32,
    cursor_x: u32,
}

/// Shelf-packing texture atlas.
///
/// Regions are placed left-to-right on horizontal shelves; a new shelf opens
/// when no existing one fits. The atlas never evicts. Slot `(0,0)` is a
/// reserved 1x1 white texel that flat-color quads sample, so colored and
/// textured primitives share one pipeline.
pub struct TextureAtlas {
    width: u32,
    height: u32,
    shelves: Vec<Shelf>,
    /// Top of the unshelved area.
    next_y: u32,
    white: AtlasRegion,
}

impl TextureAtlas {
    pub fn new(width: u32, height: u32) -> Self {
        let mut atlas = Self {
            width,
            height,
            shelves: Vec::new(),
            next_y: 0,
            white: AtlasRegion {
                x: 0,
                y: 0,
                width: 0,
                height: 0,
            },
        };
        atlas.white = atlas
            .place(1, 1)
            .expect("atlas too small for the white texel");
        atlas
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// The reserved 1x1 white region backing untextured quads.
    pub fn white(&self) -> AtlasRegion {
        self.white
    }

    /// Place a `w` x `h` region.
    pub fn place(&mut self, w: u32, h: u32) -> Result<AtlasRegion, RenderError> {
        if w == 0 || h == 0 || w > self.width {
            return Err(RenderError::AtlasFull {
                width: w,
                height: h,
            });
        }

        // First shelf tall enough with room left on its row.
        for shelf in &mut self.shelves {
            if shelf.height >= h && shelf.cursor_x + w <= self.width {
                let region = AtlasRegion {
                    x: shelf.cursor_x,
                    y: shelf.y,
                    width: w,
                    height: h,
                };
                shelf.cursor_x += w;
                return Ok(region);
            }
        }

        // Open a new shelf.
        if self.next_y + h > self.height {
            return Err(RenderError::AtlasFull {
                width: w,
                height: h,
            });
        }
        let shelf = Shelf {
            y: self.next_y,
            height: h,
            cursor_x: w,
        };
        self.next_y += h;
        let region = AtlasRegion {
            x: 0,
            y: shelf.y,
            width: w,
            height: h,
        };
        self.shelves.push(shelf);
        Ok(region)
    }

    /// Normalized `[u0, v0, u1, v1]` for a region.
    pub fn uv(&self, region: AtlasRegion) -> [f32; 4] {
        let w = self.width as f32;
        let h = self.height as f32;
        [
            region.x as f32 / w,
            region.y as f32 / h,
            (region.x + region.width) as f32 / w,
            (region.y + region.height) as f32 / h,
        ]
    }

    /// UVs for the white texel, sampled at its center so filtering cannot
    /// bleed in neighbors.
    pub fn white_uv(&self) -> [f32; 4] {
        let u = (self.white.x as f32 + 0.5) / self.width as f32;
        let v = (self.white.y as f32 + 0.5) / self.height as f32;
        [u, v, u, v]
    }
}
