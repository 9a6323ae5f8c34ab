//! Per-column raycasting and depth compositing.
//!
//! Every column is a pure function of the frame snapshot. `cast_frame` fans the
//! columns out over rayon, each task writing only its own slot, and returns
//! once all of them are done.

use rayon::iter::{IndexedParallelIterator, IntoParallelRefMutIterator, ParallelIterator};

use crate::entity::Enemy;
use crate::geometry::{Vec2, dot, from_angle, scale};
use crate::intersect::{Hit, nearest_hit};
use crate::march::march;
use crate::player::Player;
use crate::texture::{TextureId, pack_rgb};
use crate::world::World;

/// Per-frame render toggles and constants, copied in before casting.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameSettings {
    pub screen_width: usize,
    pub screen_height: usize,
    pub max_range: f32,
    pub march_step: f32,
    pub fisheye_correction: bool,
    /// Unit light direction
    pub light: Vec2,
}

/// Everything a column reads. Nothing in here is mutated while casting.
#[derive(Clone, Copy)]
pub struct FrameSnapshot<'a> {
    pub world: &'a World,
    pub player: &'a Player,
    pub enemies: &'a [Enemy],
    pub settings: FrameSettings,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WallSample {
    pub height: i32,
    pub distance: f32,
    pub along: f32,
    pub texture: TextureId,
    pub shade: u32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnemySample {
    pub height: i32,
    pub distance: f32,
    pub along: f32,
    pub texture: TextureId,
    /// Index into the frame's enemy slice
    pub index: usize,
}

/// Output slot for one screen column.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Column {
    pub wall: Option<WallSample>,
    pub enemy: Option<EnemySample>,
    /// Nearest of the wall and enemy distances, for the minimap rays.
    pub ray_distance: Option<f32>,
}

impl Column {
    #[inline]
    pub fn wall_height(&self) -> i32 {
        self.wall.map_or(0, |w| w.height)
    }

    #[inline]
    pub fn enemy_height(&self) -> i32 {
        self.enemy.map_or(0, |e| e.height)
    }

    /// The enemy in this column, if it is drawn over the wall.
    ///
    /// Occlusion compares projected heights rather than distances. Under
    /// fisheye correction both share the same cosine, so it only differs from
    /// a depth test through integer truncation.
    #[inline]
    pub fn visible_enemy(&self) -> Option<&EnemySample> {
        self.enemy.as_ref().filter(|e| e.height > self.wall_height())
    }
}

/// Lambertian grey for a wall normal: `dot(n, l) * 88 + 160`.
#[inline]
pub fn shade(normal: Vec2, light: Vec2) -> u32 {
    let v = (dot(normal, light) * 88.0 + 160.0).clamp(0.0, 255.0) as u8;
    pack_rgb(v, v, v)
}

/// Screen height of something `distance` away along a ray `delta` radians off
/// the view axis.
#[inline]
pub fn projected_height(screen_height: usize, distance: f32, delta: f32, fisheye_correction: bool) -> i32 {
    let effective = if fisheye_correction {
        distance * delta.cos()
    } else {
        distance
    };
    (screen_height as f32 / effective) as i32
}

/// Nearest wall edge hit among `cells`, with the material of the winning cell.
pub fn nearest_wall(world: &World, origin: Vec2, ray: Vec2, cells: &[(i32, i32)]) -> Option<(Hit, u8)> {
    let mut best: Option<(Hit, u8)> = None;
    for &(x, y) in cells {
        let Some(cell) = world.cell(x, y) else {
            continue;
        };
        if let Some(hit) = nearest_hit(origin, ray, &cell.edges)
            && best.is_none_or(|(b, _)| hit.distance < b.distance)
        {
            best = Some((hit, cell.material));
        }
    }
    best
}

/// Nearest billboard hit and the index of its enemy.
pub fn nearest_enemy(enemies: &[Enemy], origin: Vec2, ray: Vec2) -> Option<(Hit, usize)> {
    let mut best: Option<(Hit, usize)> = None;
    for (i, enemy) in enemies.iter().enumerate() {
        if let Some(hit) = nearest_hit(origin, ray, [&enemy.billboard()])
            && best.is_none_or(|(b, _)| hit.distance < b.distance)
        {
            best = Some((hit, i));
        }
    }
    best
}

/// Casts the ray for one screen column.
pub fn cast_column(frame: &FrameSnapshot<'_>, column: usize) -> Column {
    let s = &frame.settings;
    let player = frame.player;

    let angle = player.ray_angle(column, s.screen_width);
    let delta = angle - player.angle;
    let dir = from_angle(angle);
    let ray = scale(dir, s.max_range);

    let Some(marched) = march(&frame.world.grid, player.pos, dir, s.max_range, s.march_step) else {
        return Column::default();
    };

    let wall = nearest_wall(frame.world, player.pos, ray, marched.candidates()).map(|(hit, material)| WallSample {
        height: projected_height(s.screen_height, hit.distance, delta, s.fisheye_correction),
        distance: hit.distance,
        along: hit.along,
        texture: TextureId::wall(material),
        shade: shade(hit.normal, s.light),
    });

    let enemy = nearest_enemy(frame.enemies, player.pos, ray).map(|(hit, index)| EnemySample {
        height: projected_height(s.screen_height, hit.distance, delta, s.fisheye_correction),
        distance: hit.distance,
        along: hit.along,
        texture: frame.enemies[index].sprite,
        index,
    });

    let ray_distance = match (wall, enemy) {
        (Some(w), Some(e)) => Some(w.distance.min(e.distance)),
        (Some(w), None) => Some(w.distance),
        (None, Some(e)) => Some(e.distance),
        (None, None) => None,
    };

    Column {
        wall,
        enemy,
        ray_distance,
    }
}

/// Casts every column but the last in parallel into `columns`, which is
/// resized to the screen width. Returns after all columns are written.
pub fn cast_frame(frame: &FrameSnapshot<'_>, columns: &mut Vec<Column>) {
    let width = frame.settings.screen_width;
    let _span = tracing::trace_span!("cast_frame", width).entered();

    columns.clear();
    columns.resize(width, Column::default());

    let cast = width.saturating_sub(1);
    columns[..cast]
        .par_iter_mut()
        .enumerate()
        .for_each(|(x, slot)| *slot = cast_column(frame, x));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::normalize;
    use crate::world::TileGrid;
    use std::f32::consts::FRAC_PI_4;

    const W: usize = 320;
    const H: usize = 240;

    fn world(width: usize, height: usize, walls: &[(usize, usize, u8)]) -> World {
        let mut rows = vec![vec![0u8; width]; height];
        for &(x, y, m) in walls {
            rows[y][x] = m;
        }
        World::new(TileGrid::from_rows(&rows).unwrap())
    }

    fn player(pos: Vec2, angle: f32) -> Player {
        Player {
            pos,
            angle,
            fov: FRAC_PI_4,
            move_speed: 4.0,
            turn_speed: 1.5,
        }
    }

    fn settings(fisheye_correction: bool) -> FrameSettings {
        FrameSettings {
            screen_width: W,
            screen_height: H,
            max_range: 40.0,
            march_step: crate::march::DEFAULT_STEP,
            fisheye_correction,
            light: normalize([1.0, 2.0]),
        }
    }

    #[test]
    fn shade_follows_lambert_term() {
        assert_eq!(shade([1.0, 0.0], [1.0, 0.0]), pack_rgb(248, 248, 248));
        assert_eq!(shade([-1.0, 0.0], [1.0, 0.0]), pack_rgb(72, 72, 72));
        assert_eq!(shade([0.0, 1.0], [1.0, 0.0]), pack_rgb(160, 160, 160));
    }

    #[test]
    fn edge_midpoint_hit() {
        let world = world(6, 6, &[(3, 3, 1)]);
        let p = player([1.5, 3.5], 0.0);
        let frame = FrameSnapshot {
            world: &world,
            player: &p,
            enemies: &[],
            settings: settings(false),
        };

        let col = cast_column(&frame, W / 2);
        let wall = col.wall.unwrap();
        assert!((wall.distance - 1.5).abs() < 1e-4);
        assert_eq!(wall.along, 0.5);
        assert_eq!(wall.texture, TextureId(0));
        assert_eq!(wall.height, (H as f32 / wall.distance) as i32);
        // left face, normal (-1, 0)
        assert_eq!(wall.shade, shade([-1.0, 0.0], normalize([1.0, 2.0])));
        assert_eq!(col.ray_distance, Some(wall.distance));
    }

    #[test]
    fn diagonal_approach_to_single_cell() {
        let world = world(6, 6, &[(3, 3, 1)]);
        // aim from (1, 1) at the middle of the cell's top edge, (3.5, 3)
        let p = player([1.0, 1.0], 2.0f32.atan2(2.5));
        let frame = FrameSnapshot {
            world: &world,
            player: &p,
            enemies: &[],
            settings: settings(false),
        };

        let wall = cast_column(&frame, W / 2).wall.unwrap();
        let expected = (2.5f32 * 2.5 + 2.0 * 2.0).sqrt();
        assert!((wall.distance - expected).abs() < 1e-3);
        assert!((wall.along - 0.5).abs() < 1e-3);
        assert_eq!(wall.shade, shade([0.0, -1.0], normalize([1.0, 2.0])));
    }

    #[test]
    fn single_cell_corner_from_the_diagonal() {
        let world = world(6, 6, &[(3, 3, 1)]);
        // straight at the cell's top-left corner
        let p = player([1.0, 1.0], FRAC_PI_4);
        let frame = FrameSnapshot {
            world: &world,
            player: &p,
            enemies: &[],
            settings: settings(false),
        };

        let wall = cast_column(&frame, W / 2).wall.unwrap();
        assert!((wall.distance - 2.0 * 2f32.sqrt()).abs() < 1e-3);
        // either the top edge at its start or the left edge at its end
        assert!(wall.along < 1e-3 || wall.along > 1.0 - 1e-3);
    }

    #[test]
    fn neighbour_edge_beats_the_marched_cell() {
        // the ray clips the top-right corner of (2, 1) for about 0.05 units,
        // so a coarse march skips it and lands in (3, 1)
        let world = world(6, 3, &[(2, 1, 2), (3, 1, 1)]);
        let origin = [0.5, 0.2];
        let p = player(origin, 0.8f32.atan2(2.45));
        let mut s = settings(false);
        s.march_step = 0.3;

        let marched = march(&world.grid, origin, from_angle(p.angle), s.max_range, s.march_step).unwrap();
        assert_eq!(marched.cell, (3, 1));
        assert!(marched.candidates().contains(&(2, 1)));

        let frame = FrameSnapshot {
            world: &world,
            player: &p,
            enemies: &[],
            settings: s,
        };
        let wall = cast_column(&frame, W / 2).wall.unwrap();
        let expected = (2.45f32 * 2.45 + 0.8 * 0.8).sqrt();
        assert!((wall.distance - expected).abs() < 1e-3);
        assert!((wall.along - 0.95).abs() < 1e-3);
        assert_eq!(wall.texture, TextureId::wall(2));
        // top face of (2, 1)
        assert_eq!(wall.shade, shade([0.0, -1.0], normalize([1.0, 2.0])));
    }

    #[test]
    fn nearest_wall_ignores_candidate_order() {
        let world = world(8, 3, &[(3, 1, 1), (5, 1, 2)]);
        let origin = [0.5, 1.5];
        let ray = [40.0, 0.0];

        let (hit, material) = nearest_wall(&world, origin, ray, &[(5, 1), (3, 1)]).unwrap();
        assert!((hit.distance - 2.5).abs() < 1e-4);
        assert_eq!(material, 1);
    }

    #[test]
    fn no_wall_in_range_leaves_column_empty() {
        let world = world(30, 3, &[(25, 1, 1)]);
        let p = player([0.5, 1.5], 0.0);
        let mut s = settings(false);
        s.max_range = 5.0;
        let enemies = [Enemy::new([2.5, 1.5], 10.0, TextureId::GRUNT)];
        let frame = FrameSnapshot {
            world: &world,
            player: &p,
            enemies: &enemies,
            settings: s,
        };
        assert_eq!(cast_column(&frame, W / 2), Column::default());
    }

    #[test]
    fn enemy_in_front_of_wall() {
        let world = world(8, 5, &[(6, 2, 1)]);
        let p = player([1.5, 2.5], 0.0);
        let mut enemy = Enemy::new([3.5, 2.5], 100.0, TextureId::GRUNT);
        enemy.face(p.pos);
        assert!((enemy.plane[0]).abs() < 1e-6 && (enemy.plane[1] - 1.0).abs() < 1e-6);
        let enemies = [enemy];
        let frame = FrameSnapshot {
            world: &world,
            player: &p,
            enemies: &enemies,
            settings: settings(false),
        };

        let col = cast_column(&frame, W / 2);
        let e = col.enemy.unwrap();
        let w = col.wall.unwrap();
        assert!((e.along - 0.5).abs() < 1e-5);
        assert!((e.distance - 2.0).abs() < 1e-4);
        assert!(e.distance < w.distance);
        assert_eq!(e.index, 0);
        assert_eq!(e.texture, TextureId::GRUNT);
        assert_eq!(col.ray_distance, Some(e.distance));
        assert!(col.visible_enemy().is_some());
    }

    #[test]
    fn enemy_behind_wall_is_not_visible() {
        let world = world(8, 5, &[(3, 2, 1)]);
        let p = player([1.5, 2.5], 0.0);
        let mut enemy = Enemy::new([5.5, 2.5], 100.0, TextureId::GRUNT);
        enemy.face(p.pos);
        let enemies = [enemy];
        let frame = FrameSnapshot {
            world: &world,
            player: &p,
            enemies: &enemies,
            settings: settings(false),
        };

        let col = cast_column(&frame, W / 2);
        assert!(col.enemy.is_some());
        assert!(col.visible_enemy().is_none());
        assert_eq!(col.ray_distance, col.wall.map(|w| w.distance));
    }

    #[test]
    fn fisheye_correction_on_and_off_axis() {
        let wall: Vec<(usize, usize, u8)> = (0..12).map(|y| (8, y, 1)).collect();
        let world = world(12, 12, &wall);
        let p = player([2.5, 5.5], 0.0);
        let plain = FrameSnapshot {
            world: &world,
            player: &p,
            enemies: &[],
            settings: settings(false),
        };
        let corrected = FrameSnapshot {
            settings: settings(true),
            ..plain
        };

        let center = W / 2;
        assert_eq!(
            cast_column(&plain, center).wall_height(),
            cast_column(&corrected, center).wall_height()
        );

        let edge = 10;
        assert!(cast_column(&corrected, edge).wall_height() > cast_column(&plain, edge).wall_height());
    }

    #[test]
    fn projected_height_divides_by_cosine() {
        let plain = projected_height(720, 2.0, 0.3, false);
        let corrected = projected_height(720, 2.0, 0.3, true);
        assert_eq!(plain, 360);
        assert_eq!(corrected, (720.0 / (2.0 * 0.3f32.cos())) as i32);
    }

    #[test]
    fn frame_leaves_last_column_empty() {
        let wall: Vec<(usize, usize, u8)> = (0..6).map(|y| (5, y, 1)).collect();
        let world = world(6, 6, &wall);
        let p = player([1.5, 2.5], 0.0);
        let frame = FrameSnapshot {
            world: &world,
            player: &p,
            enemies: &[],
            settings: settings(false),
        };
        let mut columns = Vec::new();
        cast_frame(&frame, &mut columns);

        assert_eq!(columns.len(), W);
        assert!(columns[..W - 1].iter().all(|c| c.wall.is_some()));
        assert_eq!(columns[W - 1], Column::default());
    }
}
