//! Software drawing of a cast frame into a `0x00RRGGBB` framebuffer.

use rayon::{
    iter::{IndexedParallelIterator, ParallelIterator},
    slice::ParallelSliceMut,
};

use crate::game::Game;
use crate::geometry::from_angle;
use crate::raycaster::Column;
use crate::texture::{TRANSPARENT, TextureTable, modulate, pack_rgb};

/// Sprites are multiplied by this marker colour
const ENEMY_TINT: u32 = 0x00FF0000;
const MAP_CELL: i32 = 16;
/// Angular spacing of the minimap rays, radians
const MAP_RAY_STEP: f32 = 0.001;
/// Dots drawn per map unit along a minimap ray
const MAP_RAY_DOTS: f32 = 4.0;

/// Vertical strip for one column, resolved to texture space.
#[derive(Clone, Copy)]
struct Strip<'t> {
    top: i32,
    height: i32,
    tex_x: usize,
    texture: &'t crate::texture::Texture,
    tint: u32,
}

impl Strip<'_> {
    #[inline]
    fn sample(&self, y: i32) -> Option<u32> {
        if y < self.top || y >= self.top + self.height {
            return None;
        }
        let v = (y - self.top) as usize * self.texture.height / self.height as usize;
        let texel = self.texture.texel(self.tex_x, v);
        (texel != TRANSPARENT).then(|| modulate(texel, self.tint))
    }
}

fn strips<'t>(columns: &[Column], height: usize, textures: &'t TextureTable) -> Vec<[Option<Strip<'t>>; 2]> {
    let horizon = height as i32 / 2;
    columns
        .iter()
        .map(|c| {
            let wall = c.wall.and_then(|w| {
                let texture = textures.get(w.texture)?;
                Some(Strip {
                    top: horizon - w.height / 2,
                    height: w.height.max(1),
                    tex_x: texture.column(w.along),
                    texture,
                    tint: w.shade,
                })
            });
            let enemy = c.visible_enemy().and_then(|e| {
                let texture = textures.get(e.texture)?;
                Some(Strip {
                    top: horizon - e.height / 2,
                    height: e.height.max(1),
                    tex_x: texture.column(e.along),
                    texture,
                    tint: ENEMY_TINT,
                })
            });
            [wall, enemy]
        })
        .collect()
}

pub fn render_frame(buf: &mut [u32], width: usize, height: usize, game: &Game, textures: &TextureTable) {
    let ceiling = pack_rgb(0, 0, 0);
    let floor = pack_rgb(255, 255, 255);
    let strips = strips(game.columns(), height, textures);
    let mid = height / 2;

    // Rows are independent; each one walks every column strip
    buf.par_chunks_mut(width).enumerate().for_each(|(y, row)| {
        let background = if y < mid { ceiling } else { floor };
        for (x, px) in row.iter_mut().enumerate() {
            *px = background;
            let Some([wall, enemy]) = strips.get(x) else {
                continue;
            };
            if let Some(c) = wall.and_then(|s| s.sample(y as i32)) {
                *px = c;
            }
            if let Some(c) = enemy.and_then(|s| s.sample(y as i32)) {
                *px = c;
            }
        }
    });

    for bar in game.health_bars() {
        fill_rect(buf, width, height, bar.x, bar.y, bar.width, bar.height, pack_rgb(0, 100, 0));
        fill_rect(buf, width, height, bar.x, bar.y, bar.fill_width(), bar.height, pack_rgb(50, 205, 50));
    }

    draw_crosshair(buf, width, height, game.combat.just_fired());

    if game.show_overlay {
        draw_minimap(buf, width, height, game);
    }
}

/// Clipped solid rectangle
pub fn fill_rect(buf: &mut [u32], width: usize, height: usize, x: i32, y: i32, w: i32, h: i32, color: u32) {
    let x0 = x.max(0);
    let y0 = y.max(0);
    let x1 = (x + w).min(width as i32);
    let y1 = (y + h).min(height as i32);
    if x0 >= x1 || y0 >= y1 {
        return;
    }
    for yy in y0..y1 {
        let row = yy as usize * width;
        buf[row + x0 as usize..row + x1 as usize].fill(color);
    }
}

fn draw_crosshair(buf: &mut [u32], width: usize, height: usize, firing: bool) {
    let (cx, cy) = (width as i32 / 2, height as i32 / 2);
    let (arm, color) = if firing {
        (14, pack_rgb(255, 220, 60))
    } else {
        (6, pack_rgb(255, 0, 255))
    };
    fill_rect(buf, width, height, cx - arm, cy - 1, arm * 2 + 1, 2, color);
    fill_rect(buf, width, height, cx - 1, cy - arm, 2, arm * 2 + 1, color);
}

fn draw_minimap(buf: &mut [u32], width: usize, height: usize, game: &Game) {
    let grid = &game.world.grid;
    let top = MAP_CELL; // leave a row free above the map
    let to_px = |v: f32| (v * MAP_CELL as f32) as i32;

    for y in 0..grid.height() as i32 {
        for x in 0..grid.width() as i32 {
            let color = match game.world.cell(x, y) {
                Some(_) => pack_rgb(128, 128, 128),
                None => pack_rgb(255, 255, 255),
            };
            fill_rect(buf, width, height, x * MAP_CELL, top + y * MAP_CELL, MAP_CELL, MAP_CELL, color);
        }
    }

    // rays, sampled finer than the columns and looked up in the cast buffer
    let player = &game.player;
    let columns = game.columns();
    let left = player.angle - player.fov / 2.0;
    let red = pack_rgb(255, 0, 0);
    let mut offset = -player.fov / 2.0;
    while offset < player.fov / 2.0 {
        let angle = player.angle - offset;
        offset += MAP_RAY_STEP;

        let column = (columns.len() as f32 * (angle - left) / player.fov) as i32;
        let reach = match usize::try_from(column).ok().and_then(|c| columns.get(c)) {
            Some(c) => c.ray_distance.unwrap_or(0.0),
            None => 0.0,
        };
        let dir = from_angle(angle);
        let mut travelled = 0.0;
        while travelled < reach {
            let px = to_px(player.pos[0] + dir[0] * travelled);
            let py = top + to_px(player.pos[1] + dir[1] * travelled);
            fill_rect(buf, width, height, px, py, 4, 4, red);
            travelled += 1.0 / MAP_RAY_DOTS;
        }
    }

    for enemy in game.enemies.iter() {
        let x = to_px(enemy.position[0]) - MAP_CELL / 2;
        let y = top + to_px(enemy.position[1]) - MAP_CELL / 2;
        fill_rect(buf, width, height, x, y, MAP_CELL, MAP_CELL, red);
    }

    let (px, py) = (to_px(player.pos[0]) - 2, top + to_px(player.pos[1]) - 2);
    fill_rect(buf, width, height, px, py, 4, 4, pack_rgb(0, 160, 0));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fill_rect_clips_to_buffer() {
        let mut buf = vec![0u32; 4 * 3];
        fill_rect(&mut buf, 4, 3, -2, 1, 4, 10, 7);
        assert_eq!(buf, vec![0, 0, 0, 0, 7, 7, 0, 0, 7, 7, 0, 0]);
    }

    #[test]
    fn empty_rect_draws_nothing() {
        let mut buf = vec![0u32; 4];
        fill_rect(&mut buf, 2, 2, 0, 0, 0, 2, 9);
        fill_rect(&mut buf, 2, 2, 5, 5, 2, 2, 9);
        assert!(buf.iter().all(|&p| p == 0));
    }
}
