//! Small helpers for 2D vectors stored as `[f32; 2]`.

pub type Vec2 = [f32; 2];

#[inline]
pub fn add(a: Vec2, b: Vec2) -> Vec2 {
    [a[0] + b[0], a[1] + b[1]]
}

#[inline]
pub fn sub(a: Vec2, b: Vec2) -> Vec2 {
    [a[0] - b[0], a[1] - b[1]]
}

#[inline]
pub fn scale(v: Vec2, k: f32) -> Vec2 {
    [v[0] * k, v[1] * k]
}

#[inline]
pub fn dot(a: Vec2, b: Vec2) -> f32 {
    a[0] * b[0] + a[1] * b[1]
}

/// z component of the 3D cross product of `a` and `b`
#[inline]
pub fn cross(a: Vec2, b: Vec2) -> f32 {
    a[0] * b[1] - a[1] * b[0]
}

#[inline]
pub fn length(v: Vec2) -> f32 {
    dot(v, v).sqrt()
}

/// Returns `v` scaled to unit length, or `v` unchanged when it is zero.
#[inline]
pub fn normalize(v: Vec2) -> Vec2 {
    let len = length(v);
    if len > 0.0 { scale(v, 1.0 / len) } else { v }
}

/// Unit vector for a heading in radians (x = cos, y = sin)
#[inline]
pub fn from_angle(angle: f32) -> Vec2 {
    [angle.cos(), angle.sin()]
}

/// Rotate `v` counter-clockwise by `angle` radians
#[inline]
pub fn rotate(v: Vec2, angle: f32) -> Vec2 {
    let (s, c) = angle.sin_cos();
    [c * v[0] - s * v[1], s * v[0] + c * v[1]]
}
