use crate::error::GridError;
use crate::geometry::Vec2;
use crate::intersect::Segment;

/// Static tile map: `0` is empty, anything else is a wall material id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TileGrid {
    width: usize,
    height: usize,
    tiles: Vec<u8>, // row-major, tiles[y * width + x]
}

impl TileGrid {
    pub fn from_rows(rows: &[Vec<u8>]) -> Result<Self, GridError> {
        let width = rows.first().map_or(0, Vec::len);
        if width == 0 {
            return Err(GridError::Empty);
        }
        let mut tiles = Vec::with_capacity(width * rows.len());
        for (row, r) in rows.iter().enumerate() {
            if r.len() != width {
                return Err(GridError::Ragged {
                    row,
                    expected: width,
                    found: r.len(),
                });
            }
            tiles.extend_from_slice(r);
        }
        Ok(Self {
            width,
            height: rows.len(),
            tiles,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Tile at integer cell coordinates; `None` outside the map.
    #[inline]
    pub fn tile(&self, x: i32, y: i32) -> Option<u8> {
        if x < 0 || y < 0 || x as usize >= self.width || y as usize >= self.height {
            return None;
        }
        Some(self.tiles[y as usize * self.width + x as usize])
    }

    /// Tile containing a world-space point.
    #[inline]
    pub fn tile_at(&self, p: Vec2) -> Option<u8> {
        self.tile(p[0].floor() as i32, p[1].floor() as i32)
    }

    #[inline]
    pub fn is_wall(&self, x: i32, y: i32) -> bool {
        self.tile(x, y).is_some_and(|t| t > 0)
    }

    /// True when a point sits on an empty tile inside the map.
    pub fn is_open(&self, p: Vec2) -> bool {
        self.tile_at(p) == Some(0)
    }
}

/// Solid unit square derived from one occupied tile.
///
/// Corners are `[top_left, top_right, bottom_right, bottom_left]` with +y
/// pointing down. The edges run clockwise around the cell, so each edge's
/// `Segment::normal` faces outward.
#[derive(Debug, Clone, PartialEq)]
pub struct WallCell {
    pub cell: (i32, i32),
    pub material: u8,
    pub corners: [Vec2; 4],
    pub edges: [Segment; 4],
}

impl WallCell {
    pub fn new(x: i32, y: i32, material: u8) -> Self {
        let (fx, fy) = (x as f32, y as f32);
        let top_left = [fx, fy];
        let top_right = [fx + 1.0, fy];
        let bottom_right = [fx + 1.0, fy + 1.0];
        let bottom_left = [fx, fy + 1.0];

        Self {
            cell: (x, y),
            material,
            corners: [top_left, top_right, bottom_right, bottom_left],
            edges: [
                Segment::new(top_left, [1.0, 0.0]),      // points right
                Segment::new(top_right, [0.0, 1.0]),     // points down
                Segment::new(bottom_right, [-1.0, 0.0]), // points left
                Segment::new(bottom_left, [0.0, -1.0]),  // points up
            ],
        }
    }
}

/// Tile grid plus the wall geometry built from it at load time.
pub struct World {
    pub grid: TileGrid,
    cells: Vec<Option<WallCell>>,
}

impl World {
    pub fn new(grid: TileGrid) -> Self {
        let mut cells = Vec::with_capacity(grid.width() * grid.height());
        for y in 0..grid.height() as i32 {
            for x in 0..grid.width() as i32 {
                cells.push(match grid.tile(x, y) {
                    Some(m) if m > 0 => Some(WallCell::new(x, y, m)),
                    _ => None,
                });
            }
        }
        Self { grid, cells }
    }

    #[inline]
    pub fn cell(&self, x: i32, y: i32) -> Option<&WallCell> {
        self.grid.tile(x, y)?;
        self.cells[y as usize * self.grid.width() + x as usize].as_ref()
    }

    pub fn wall_count(&self) -> usize {
        self.cells.iter().flatten().count()
    }
}
