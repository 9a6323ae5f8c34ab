//! Exact ray/segment intersection.
//!
//! Both the ray and every candidate segment are written in parametric form,
//! `origin + t * ray` and `start + s * dir`, and the 2x2 system is solved with
//! cross products. A hit needs `t` and `s` in `[0, 1]`.

use crate::geometry::{Vec2, cross, length, sub};

/// Directed segment: `start` plus `dir` (the whole segment, not a unit step).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    pub start: Vec2,
    pub dir: Vec2,
}

impl Segment {
    pub const fn new(start: Vec2, dir: Vec2) -> Self {
        Self { start, dir }
    }

    /// Fixed 90 degree rotation of the direction. For the wall edges, which
    /// wind clockwise in screen space, this points out of the cell.
    #[inline]
    pub fn normal(&self) -> Vec2 {
        [self.dir[1], -self.dir[0]]
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hit {
    /// Euclidean distance from the ray origin, `t * |ray|`.
    pub distance: f32,
    pub normal: Vec2,
    /// Position along the hit segment in `[0, 1]`; the texture column.
    pub along: f32,
    /// Index of the winning segment in the candidate list.
    pub segment: usize,
}

/// Solves one ray against one segment, returning `(t, s)`.
///
/// Parallel lines have a zero determinant and yield `None`.
#[inline]
pub fn solve(origin: Vec2, ray: Vec2, seg: &Segment) -> Option<(f32, f32)> {
    let det = cross(ray, seg.dir);
    if det == 0.0 {
        return None;
    }
    let to_start = sub(seg.start, origin);
    let t = cross(to_start, seg.dir) / det;
    let s = cross(to_start, ray) / det;
    if (0.0..=1.0).contains(&t) && (0.0..=1.0).contains(&s) {
        Some((t, s))
    } else {
        None
    }
}

/// Nearest valid hit of `ray` (already scaled to the max range) against any
/// of `segments`.
pub fn nearest_hit<'a, I>(origin: Vec2, ray: Vec2, segments: I) -> Option<Hit>
where
    I: IntoIterator<Item = &'a Segment>,
{
    let ray_len = length(ray);
    let mut best: Option<Hit> = None;

    for (i, seg) in segments.into_iter().enumerate() {
        let Some((t, s)) = solve(origin, ray, seg) else {
            continue;
        };
        let distance = t * ray_len;
        if best.is_none_or(|b| distance < b.distance) {
            best = Some(Hit {
                distance,
                normal: seg.normal(),
                along: s,
                segment: i,
            });
        }
    }

    best
}
