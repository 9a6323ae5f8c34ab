use crate::geometry::{Vec2, length, normalize, scale, sub};
use crate::intersect::Segment;
use crate::texture::TextureId;

#[derive(Debug, Clone, PartialEq)]
pub struct Enemy {
    pub position: Vec2,
    /// Unit billboard direction, perpendicular to the player -> enemy line.
    /// Starts as +x and keeps its last value while the player stands on the
    /// enemy's position.
    pub plane: Vec2,
    pub hp: f32,
    pub max_hp: f32,
    pub sprite: TextureId,
    /// Distance to the player as of the last billboard refresh.
    pub distance: f32,
}

impl Enemy {
    pub fn new(position: Vec2, max_hp: f32, sprite: TextureId) -> Self {
        Self {
            position,
            plane: [1.0, 0.0],
            hp: max_hp,
            max_hp,
            sprite,
            distance: 0.0,
        }
    }

    /// One-unit-wide sprite segment centred on the enemy.
    #[inline]
    pub fn billboard(&self) -> Segment {
        Segment::new(sub(self.position, scale(self.plane, 0.5)), self.plane)
    }

    /// Turn the billboard to face `viewer`.
    pub fn face(&mut self, viewer: Vec2) {
        let to_viewer = sub(viewer, self.position);
        self.distance = length(to_viewer);
        if self.distance > 0.0 {
            self.plane = normalize([to_viewer[1], -to_viewer[0]]);
        }
    }

    pub fn is_dead(&self) -> bool {
        self.hp <= 0.0
    }

    /// Current over max hit points, clamped to `[0, 1]`.
    pub fn health_ratio(&self) -> f32 {
        if self.max_hp > 0.0 {
            (self.hp / self.max_hp).clamp(0.0, 1.0)
        } else {
            0.0
        }
    }
}

/// Owning collection of enemies, addressed by index.
///
/// Indices are only stable within a frame: `remove_dead` compacts the list and
/// must run after every column task has finished reading it.
#[derive(Debug, Clone, Default)]
pub struct Enemies {
    list: Vec<Enemy>,
}

impl Enemies {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn spawn(&mut self, enemy: Enemy) -> usize {
        self.list.push(enemy);
        self.list.len() - 1
    }

    pub fn len(&self) -> usize {
        self.list.len()
    }

    pub fn is_empty(&self) -> bool {
        self.list.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Enemy> {
        self.list.get(index)
    }

    pub fn as_slice(&self) -> &[Enemy] {
        &self.list
    }

    pub fn iter(&self) -> impl Iterator<Item = &Enemy> {
        self.list.iter()
    }

    /// Recompute every billboard against the player position. Call once per
    /// frame, before casting.
    pub fn refresh_billboards(&mut self, player: Vec2) {
        for enemy in &mut self.list {
            enemy.face(player);
        }
    }

    /// Subtracts `amount` hit points; hp may go negative until `remove_dead`.
    pub fn damage(&mut self, index: usize, amount: f32) -> Option<f32> {
        let enemy = self.list.get_mut(index)?;
        enemy.hp -= amount;
        Some(enemy.hp)
    }

    /// Drops every enemy at or below zero hp, returning how many were removed.
    pub fn remove_dead(&mut self) -> usize {
        let before = self.list.len();
        self.list.retain(|e| !e.is_dead());
        before - self.list.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::dot;

    #[test]
    fn billboard_is_unit_and_perpendicular_to_line_of_sight() {
        let mut e = Enemy::new([7.0, 7.0], 100.0, TextureId(0));
        e.face([2.0, 4.0]);

        assert!((length(e.plane) - 1.0).abs() < 1e-6);
        assert!(dot(e.plane, sub([2.0, 4.0], e.position)).abs() < 1e-5);
        assert!((e.distance - 34f32.sqrt()).abs() < 1e-5);
    }

    #[test]
    fn billboard_is_centred_on_position() {
        let mut e = Enemy::new([5.0, 1.0], 100.0, TextureId(0));
        e.face([1.0, 1.0]);
        let seg = e.billboard();
        let mid = [seg.start[0] + seg.dir[0] * 0.5, seg.start[1] + seg.dir[1] * 0.5];
        assert!((mid[0] - 5.0).abs() < 1e-6);
        assert!((mid[1] - 1.0).abs() < 1e-6);
    }

    #[test]
    fn viewer_on_top_keeps_a_unit_plane() {
        let mut e = Enemy::new([4.0, 4.0], 100.0, TextureId(0));
        assert_eq!(length(e.plane), 1.0);
        e.face([4.0, 4.0]);
        assert_eq!(e.plane, [1.0, 0.0]);
        assert_eq!(e.distance, 0.0);

        e.face([4.0, 1.0]);
        let turned = e.plane;
        e.face([4.0, 4.0]);
        assert_eq!(e.plane, turned);
        assert!((length(e.plane) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn remove_dead_drops_zero_and_negative_hp() {
        let mut enemies = Enemies::new();
        let a = enemies.spawn(Enemy::new([1.0, 1.0], 10.0, TextureId(0)));
        let b = enemies.spawn(Enemy::new([2.0, 2.0], 15.0, TextureId(0)));
        enemies.spawn(Enemy::new([3.0, 3.0], 30.0, TextureId(0)));

        assert_eq!(enemies.damage(a, 10.0), Some(0.0));
        assert_eq!(enemies.damage(b, 20.0), Some(-5.0));
        assert_eq!(enemies.damage(9, 1.0), None);

        assert_eq!(enemies.remove_dead(), 2);
        assert_eq!(enemies.len(), 1);
        assert_eq!(enemies.get(0).unwrap().max_hp, 30.0);
    }

    #[test]
    fn health_ratio_is_clamped() {
        let mut e = Enemy::new([0.0, 0.0], 40.0, TextureId(0));
        e.hp = 10.0;
        assert_eq!(e.health_ratio(), 0.25);
        e.hp = -5.0;
        assert_eq!(e.health_ratio(), 0.0);
    }
}
