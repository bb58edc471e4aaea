//! Overlap tests between entities and the viewport
//!
//! Everything in the world collides as a circle; tiles are resolved by the
//! map itself.

use glam::Vec2;

use crate::consts::{CULL_MARGIN_X, CULL_MARGIN_Y};

/// Whether two points are closer than `radius`
pub fn circles_overlap(a: Vec2, b: Vec2, radius: f32) -> bool {
    a.distance_squared(b) < radius * radius
}

/// Whether a bullet is still inside the viewport plus the cull margin
pub fn in_play_area(pos: Vec2, viewport: Vec2) -> bool {
    pos.x >= -CULL_MARGIN_X
        && pos.x <= viewport.x + CULL_MARGIN_X
        && pos.y >= -CULL_MARGIN_Y
        && pos.y <= viewport.y + CULL_MARGIN_Y
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overlap_is_strict() {
        let a = Vec2::new(0.0, 0.0);
        assert!(circles_overlap(a, Vec2::new(11.9, 0.0), 12.0));
        assert!(!circles_overlap(a, Vec2::new(12.0, 0.0), 12.0));
        assert!(circles_overlap(a, Vec2::new(6.0, 6.0), 12.0));
    }

    #[test]
    fn test_play_area_margins() {
        let viewport = Vec2::new(800.0, 600.0);
        assert!(in_play_area(Vec2::new(-20.0, -40.0), viewport));
        assert!(in_play_area(Vec2::new(820.0, 640.0), viewport));
        assert!(!in_play_area(Vec2::new(-20.5, 100.0), viewport));
        assert!(!in_play_area(Vec2::new(100.0, 640.5), viewport));
    }
}
