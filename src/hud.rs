//! Health-bar layout from the finished column buffer.
//!
//! Nothing here touches game state; it turns runs of enemy columns into
//! rectangles for the drawing layer.

use crate::entity::Enemy;
use crate::raycaster::Column;

/// Pixels between the top of a sprite and its health bar
const BAR_LIFT: i32 = 30;
/// Share of the sprite width covered by the bar
const BAR_SCALE: f32 = 0.75;

/// Maximal run of columns showing the same enemy over the wall.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnemySlice {
    pub enemy: usize,
    pub start: usize,
    pub len: usize,
}

impl EnemySlice {
    #[inline]
    pub fn column(&self, i: usize) -> usize {
        self.start + i
    }

    #[inline]
    pub fn mid(&self) -> usize {
        self.column(self.len / 2)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HealthBar {
    pub enemy: usize,
    pub x: i32,
    pub y: i32,
    /// Width of the background bar
    pub width: i32,
    pub height: i32,
    /// hp / max_hp in `[0, 1]`
    pub fill: f32,
}

impl HealthBar {
    /// Width of the foreground bar
    pub fn fill_width(&self) -> i32 {
        (self.width as f32 * self.fill) as i32
    }
}

/// Scans columns left to right and groups visible enemy columns.
pub fn enemy_slices(columns: &[Column]) -> Vec<EnemySlice> {
    let mut slices: Vec<EnemySlice> = Vec::new();
    let mut prev: Option<usize> = None;

    for (x, column) in columns.iter().enumerate() {
        let current = column.visible_enemy().map(|e| e.index);
        match (current, prev) {
            (Some(enemy), Some(p)) if enemy == p => {
                if let Some(last) = slices.last_mut() {
                    last.len += 1;
                }
            }
            (Some(enemy), _) => slices.push(EnemySlice {
                enemy,
                start: x,
                len: 1,
            }),
            (None, _) => {}
        }
        prev = current;
    }

    slices
}

/// Bar rectangle for one slice.
///
/// The sprite's full on-screen width is `1 / delta`, where `delta` is the
/// hit-coordinate step between two neighbouring columns at the slice middle.
pub fn layout_bar(slice: &EnemySlice, columns: &[Column], enemy: &Enemy, screen_height: usize) -> HealthBar {
    let along = |x: usize| columns[x].enemy.map_or(0.0, |e| e.along);

    let mut delta = 1.0;
    if slice.len > 2 {
        let d = along(slice.mid() + 1) - along(slice.mid());
        if d > 0.0 {
            delta = d;
        }
    }
    let sprite_width = 1.0 / delta;

    let anchor = -((along(slice.start) * sprite_width) as i32);
    let mid_height = columns[slice.mid()].enemy_height();

    HealthBar {
        enemy: slice.enemy,
        x: anchor + slice.column(slice.len / 8) as i32,
        y: screen_height as i32 / 2 - mid_height / 2 - BAR_LIFT,
        width: (sprite_width * BAR_SCALE) as i32,
        height: mid_height / 20,
        fill: enemy.health_ratio(),
    }
}

/// Bars for every visible enemy slice. `enemies` must be the list the
/// columns were cast against; dead enemies get no bar.
pub fn health_bars(columns: &[Column], enemies: &[Enemy], screen_height: usize) -> Vec<HealthBar> {
    enemy_slices(columns)
        .iter()
        .filter_map(|slice| {
            let enemy = enemies.get(slice.enemy).filter(|e| !e.is_dead())?;
            Some(layout_bar(slice, columns, enemy, screen_height))
        })
        .collect()
}
