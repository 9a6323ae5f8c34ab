//! Procedurally generated textures, so the renderer runs without asset files.
//!
//! Pixels are `0x00RRGGBB`, the same layout softbuffer presents. A pixel equal
//! to `TRANSPARENT` is skipped when drawing sprites.

/// Number of wall textures at the front of the table.
pub const WALL_TEXTURES: u16 = 3;

pub const TRANSPARENT: u32 = 0;

/// Handle into a `TextureTable`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Deserialize, serde::Serialize)]
#[serde(transparent)]
pub struct TextureId(pub u16);

impl TextureId {
    /// Default enemy sprite in the procedural table.
    pub const GRUNT: TextureId = TextureId(WALL_TEXTURES);

    /// Texture for a wall material id (`>= 1`). Materials past the last wall
    /// texture reuse it.
    #[inline]
    pub fn wall(material: u8) -> Self {
        TextureId((material.max(1) as u16 - 1).min(WALL_TEXTURES - 1))
    }
}

#[inline]
pub fn pack_rgb(r: u8, g: u8, b: u8) -> u32 {
    // BGRA8 in little-endian memory
    (b as u32) | ((g as u32) << 8) | ((r as u32) << 16)
    // Alpha at 0
}

/// Per-channel multiply, `tint` 255 leaves the channel unchanged.
#[inline]
pub fn modulate(color: u32, tint: u32) -> u32 {
    let ch = |shift: u32| (((color >> shift) & 0xFF) * ((tint >> shift) & 0xFF) / 255) << shift;
    ch(16) | ch(8) | ch(0)
}

pub struct Texture {
    pub width: usize,
    pub height: usize,
    pixels: Vec<u32>,
}

impl Texture {
    fn from_fn(width: usize, height: usize, f: impl Fn(usize, usize) -> u32) -> Self {
        let mut pixels = Vec::with_capacity(width * height);
        for y in 0..height {
            for x in 0..width {
                pixels.push(f(x, y));
            }
        }
        Self {
            width,
            height,
            pixels,
        }
    }

    /// Texture column for a hit coordinate in `[0, 1]`, mirrored so that
    /// walking along an edge reads the texture left to right from outside.
    #[inline]
    pub fn column(&self, along: f32) -> usize {
        let w = self.width as f32;
        ((w - w * along) as usize).min(self.width - 1)
    }

    #[inline]
    pub fn texel(&self, x: usize, y: usize) -> u32 {
        self.pixels[y.min(self.height - 1) * self.width + x.min(self.width - 1)]
    }
}

pub struct TextureTable {
    textures: Vec<Texture>,
}

impl TextureTable {
    pub fn procedural() -> Self {
        let brick = Texture::from_fn(64, 64, |x, y| {
            let row = y / 8;
            let offset = if row % 2 == 0 { 0 } else { 8 };
            if y % 8 == 7 || (x + offset) % 16 == 15 {
                pack_rgb(200, 200, 200)
            } else {
                pack_rgb(255, 255, 255)
            }
        });
        let stone = Texture::from_fn(64, 64, |x, y| {
            // cheap hash for a speckled look
            let h = (x as u32).wrapping_mul(73_856_093) ^ (y as u32).wrapping_mul(19_349_663);
            let v = 200 + (h % 56) as u8;
            pack_rgb(v, v, v)
        });
        let panel = Texture::from_fn(64, 64, |x, y| {
            if x % 32 < 2 || y % 32 < 2 {
                pack_rgb(160, 160, 170)
            } else {
                pack_rgb(240, 240, 250)
            }
        });
        let grunt = Texture::from_fn(32, 32, |x, y| {
            let (dx, dy) = (x as i32 - 16, y as i32 - 12);
            let head = dx * dx + dy * dy <= 36;
            let body = (10..=21).contains(&x) && (18..32).contains(&y);
            let eye = y == 11 && (x == 13 || x == 18);
            if eye {
                pack_rgb(20, 20, 20)
            } else if head || body {
                pack_rgb(255, 255, 255)
            } else {
                TRANSPARENT
            }
        });

        Self {
            textures: vec![brick, stone, panel, grunt],
        }
    }

    pub fn len(&self) -> usize {
        self.textures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.textures.is_empty()
    }

    pub fn get(&self, id: TextureId) -> Option<&Texture> {
        self.textures.get(id.0 as usize)
    }
}
