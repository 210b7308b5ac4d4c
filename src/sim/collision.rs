//! Collision helpers shared by the games.
//!
//! Everything here is axis-aligned: rectangle overlap with per-entity
//! forgiveness margins, circle against walls and rectangles. A margin shrinks
//! the *visual* box to the lethal box, so near-misses that look like misses
//! are misses.

use glam::Vec2;

/// Axis-aligned rectangle, top-left anchored (canvas coordinates).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub pos: Vec2,
    pub size: Vec2,
}

impl Aabb {
    pub fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self {
            pos: Vec2::new(x, y),
            size: Vec2::new(w, h),
        }
    }

    /// Shrink the box inward by `mx`/`my` on each side.
    pub fn inset(&self, mx: f32, my: f32) -> Aabb {
        Aabb {
            pos: self.pos + Vec2::new(mx, my),
            size: self.size - Vec2::new(mx * 2.0, my * 2.0),
        }
    }

    pub fn center(&self) -> Vec2 {
        self.pos + self.size * 0.5
    }

    pub fn right(&self) -> f32 {
        self.pos.x + self.size.x
    }

    pub fn bottom(&self) -> f32 {
        self.pos.y + self.size.y
    }

    pub fn overlaps(&self, other: &Aabb) -> bool {
        self.pos.x < other.right()
            && self.right() > other.pos.x
            && self.pos.y < other.bottom()
            && self.bottom() > other.pos.y
    }

    pub fn contains(&self, p: Vec2) -> bool {
        p.x >= self.pos.x && p.x <= self.right() && p.y >= self.pos.y && p.y <= self.bottom()
    }
}

/// True when a circle *overlaps* a vertical wall at `wall_x`, approaching
/// from the given side. A center exactly `radius` from the wall is touching,
/// not overlapping: only strict penetration reflects.
pub fn circle_past_wall_left(center_x: f32, radius: f32, wall_x: f32) -> bool {
    center_x - radius < wall_x
}

pub fn circle_past_wall_right(center_x: f32, radius: f32, wall_x: f32) -> bool {
    center_x + radius > wall_x
}

/// Circle vs axis-aligned rectangle overlap (strict).
pub fn circle_overlaps_aabb(center: Vec2, radius: f32, rect: &Aabb) -> bool {
    let closest = center.clamp(rect.pos, rect.pos + rect.size);
    (center - closest).length_squared() < radius * radius
}

/// Reflect `v` off a surface with unit normal `n`.
pub fn reflect(v: Vec2, n: Vec2) -> Vec2 {
    v - 2.0 * v.dot(n) * n
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aabb_overlap_basics() {
        let a = Aabb::new(0.0, 0.0, 10.0, 10.0);
        let b = Aabb::new(9.0, 9.0, 10.0, 10.0);
        let c = Aabb::new(10.0, 0.0, 10.0, 10.0);
        assert!(a.overlaps(&b));
        // Shared edge is touching, not overlapping
        assert!(!a.overlaps(&c));
    }

    #[test]
    fn inset_shrinks_both_sides() {
        let a = Aabb::new(0.0, 0.0, 40.0, 40.0).inset(6.0, 4.0);
        assert_eq!(a.pos, Vec2::new(6.0, 4.0));
        assert_eq!(a.size, Vec2::new(28.0, 32.0));
    }

    #[test]
    fn wall_touch_is_not_overlap() {
        // Center exactly one radius from the wall: touching
        assert!(!circle_past_wall_left(10.0, 10.0, 0.0));
        assert!(!circle_past_wall_right(90.0, 10.0, 100.0));
        // One unit of penetration: overlap
        assert!(circle_past_wall_left(9.0, 10.0, 0.0));
        assert!(circle_past_wall_right(91.0, 10.0, 100.0));
    }

    #[test]
    fn circle_rect_touch_is_not_overlap() {
        let rect = Aabb::new(0.0, 0.0, 10.0, 10.0);
        assert!(!circle_overlaps_aabb(Vec2::new(15.0, 5.0), 5.0, &rect));
        assert!(circle_overlaps_aabb(Vec2::new(14.9, 5.0), 5.0, &rect));
    }

    #[test]
    fn reflect_inverts_normal_component() {
        let v = Vec2::new(3.0, -4.0);
        let r = reflect(v, Vec2::new(0.0, 1.0));
        assert_eq!(r, Vec2::new(3.0, 4.0));
    }
}
