//! Overlap and near-miss tests between the player and lane entities
//!
//! Everything on the road is an axis-aligned box centered on its position,
//! so a hit is a plain AABB overlap. A near miss is a pass inside a thin
//! horizontal ring just outside the combined half-widths.

use glam::Vec2;

use crate::consts::{NEAR_MISS_BAND, NEAR_MISS_INNER_TOLERANCE, NEAR_MISS_MARGIN};

/// Axis-aligned bounding box stored as center + half extents
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub center: Vec2,
    pub half: Vec2,
}

impl Aabb {
    /// Box of the given full `size` centered on `center`
    pub fn new(center: Vec2, size: Vec2) -> Self {
        Self {
            center,
            half: size * 0.5,
        }
    }

    pub fn min(&self) -> Vec2 {
        self.center - self.half
    }

    pub fn max(&self) -> Vec2 {
        self.center + self.half
    }

    /// Strict overlap: boxes that only touch along an edge do not collide
    pub fn overlaps(&self, other: &Aabb) -> bool {
        let (a_min, a_max) = (self.min(), self.max());
        let (b_min, b_max) = (other.min(), other.max());
        a_min.x < b_max.x && a_max.x > b_min.x && a_min.y < b_max.y && a_max.y > b_min.y
    }
}

/// Whether `other` is passing the player closely without touching
///
/// The other box's center must be within `NEAR_MISS_BAND` of the player's
/// vertically, and the horizontal center gap must fall in
/// `(half_sum - tolerance, half_sum + margin)`.
pub fn is_near_miss(player: &Aabb, other: &Aabb) -> bool {
    let dy = other.center.y - player.center.y;
    if dy <= -NEAR_MISS_BAND || dy >= NEAR_MISS_BAND {
        return false;
    }
    let gap = (other.center.x - player.center.x).abs();
    let half_sum = player.half.x + other.half.x;
    gap < half_sum + NEAR_MISS_MARGIN && gap > half_sum - NEAR_MISS_INNER_TOLERANCE
}

#[cfg(test)]
mod tests {
    use super::*;

    fn player_box() -> Aabb {
        Aabb::new(Vec2::new(300.0, 510.0), Vec2::new(70.0, 100.0))
    }

    #[test]
    fn test_overlap_same_lane() {
        let player = player_box();
        let obstacle = Aabb::new(Vec2::new(300.0, 430.0), Vec2::new(70.0, 100.0));
        assert!(player.overlaps(&obstacle));
        assert!(obstacle.overlaps(&player));
    }

    #[test]
    fn test_touching_edges_do_not_overlap() {
        let player = player_box();
        // Exactly one full width to the right: edges touch at x = 335
        let beside = Aabb::new(Vec2::new(370.0, 510.0), Vec2::new(70.0, 100.0));
        assert!(!player.overlaps(&beside));
        // Exactly one full height above
        let above = Aabb::new(Vec2::new(300.0, 410.0), Vec2::new(70.0, 100.0));
        assert!(!player.overlaps(&above));
    }

    #[test]
    fn test_adjacent_lane_is_not_near_miss() {
        // Standard cars one lane apart are 100px apart, outside the 65..95 ring
        let player = player_box();
        let other = Aabb::new(Vec2::new(400.0, 515.0), Vec2::new(70.0, 100.0));
        assert!(!is_near_miss(&player, &other));
    }

    #[test]
    fn test_near_miss_ring() {
        let player = player_box();
        // Half-sum is 70; a gap of 80 is inside the ring
        let close = Aabb::new(Vec2::new(380.0, 505.0), Vec2::new(70.0, 100.0));
        assert!(is_near_miss(&player, &close));

        // Same gap but outside the vertical band
        let early = Aabb::new(Vec2::new(380.0, 480.0), Vec2::new(70.0, 100.0));
        assert!(!is_near_miss(&player, &early));

        // Wide slow car one lane over: half-sum 77.5, gap 100 is inside
        let slow = Aabb::new(Vec2::new(400.0, 510.0), Vec2::new(85.0, 120.0));
        assert!(is_near_miss(&player, &slow));
    }
}
