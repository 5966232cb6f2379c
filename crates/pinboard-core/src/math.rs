//! Small geometry helpers on top of kurbo.

use kurbo::{Point, Rect, Vec2};

/// Linear interpolation between `a` and `b`.
pub fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

/// Inverse of [`lerp`]: where `value` sits between `a` and `b`.
pub fn inv_lerp(a: f64, b: f64, value: f64) -> f64 {
    (value - a) / (b - a)
}

/// Point at fractional `anchor` inside `rect` (0,0 = top-left, 1,1 = bottom-right).
pub fn point_in_rect(rect: Rect, anchor: Point) -> Point {
    Point::new(
        lerp(rect.x0, rect.x1, anchor.x),
        lerp(rect.y0, rect.y1, anchor.y),
    )
}

/// Fractional position of `point` inside `rect`.
pub fn anchor_in_rect(rect: Rect, point: Point) -> Point {
    Point::new(
        inv_lerp(rect.x0, rect.x1, point.x),
        inv_lerp(rect.y0, rect.y1, point.y),
    )
}

/// Grow degenerate rectangles to at least one unit on each axis.
pub fn zero_fix(rect: Rect) -> Rect {
    let rect = rect.abs();
    Rect::new(
        rect.x0,
        rect.y0,
        rect.x0 + rect.width().max(1.0),
        rect.y0 + rect.height().max(1.0),
    )
}

/// Component-wise mean of a set of vectors. Zero for an empty set.
pub fn average(vectors: &[Vec2]) -> Vec2 {
    if vectors.is_empty() {
        return Vec2::ZERO;
    }
    let sum = vectors.iter().fold(Vec2::ZERO, |acc, v| acc + *v);
    sum / vectors.len() as f64
}

/// Whether two rectangles overlap or touch.
pub fn collides(a: Rect, b: Rect) -> bool {
    !(a.x1 < b.x0 || a.x0 > b.x1 || a.y1 < b.y0 || a.y0 > b.y1)
}
