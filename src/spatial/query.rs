//! Distance, adjacency, angle, and line-of-sight primitives
//!
//! All math here happens within one zone's coordinate space. Cross-zone
//! comparisons return None and are resolved at the perception layer
//! through windows.

use crate::core::config::config;
use crate::core::types::{Vec2, Zone};
use crate::world::objects::Obstacle;

/// Distance between two positions, or None if they are in different zones
pub fn zoned_distance(a: Vec2, zone_a: Zone, b: Vec2, zone_b: Zone) -> Option<f32> {
    if zone_a == zone_b {
        Some(a.distance(&b))
    } else {
        None
    }
}

/// Adjacency within one zone (melee/report/interact range)
pub fn is_adjacent(a: Vec2, zone_a: Zone, b: Vec2, zone_b: Zone) -> bool {
    zoned_distance(a, zone_a, b, zone_b)
        .map(|d| d <= config().adjacency_distance)
        .unwrap_or(false)
}

/// Normalize an angle to [-pi, pi]
pub fn normalize_angle(angle: f32) -> f32 {
    let mut a = angle.rem_euclid(std::f32::consts::TAU);
    if a > std::f32::consts::PI {
        a -= std::f32::consts::TAU;
    }
    a
}

/// Shortest distance from a point to the segment [a, b]
fn point_segment_distance(p: Vec2, a: Vec2, b: Vec2) -> f32 {
    let ab = b - a;
    let len_sq = ab.dot(&ab);
    if len_sq < 1e-8 {
        return p.distance(&a);
    }
    let t = ((p - a).dot(&ab) / len_sq).clamp(0.0, 1.0);
    let closest = a + ab * t;
    p.distance(&closest)
}

/// Does the sight line from `from` to `to` pass through any obstacle?
///
/// Obstacles within `obstacle_clearance` of either endpoint are ignored so
/// a character standing against a tree or wall post is not blinded by it.
pub fn sight_line_blocked(from: Vec2, to: Vec2, obstacles: &[Obstacle]) -> bool {
    let clearance = config().obstacle_clearance;
    obstacles.iter().any(|obstacle| {
        if obstacle.position.distance(&from) <= obstacle.radius + clearance
            || obstacle.position.distance(&to) <= obstacle.radius + clearance
        {
            return false;
        }
        point_segment_distance(obstacle.position, from, to) <= obstacle.radius
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::InteriorId;

    #[test]
    fn test_zoned_distance_rejects_cross_zone() {
        let a = Vec2::new(0.0, 0.0);
        let b = Vec2::new(1.0, 0.0);
        assert_eq!(
            zoned_distance(a, Zone::Exterior, b, Zone::Interior(InteriorId(0))),
            None
        );
        assert!(zoned_distance(a, Zone::Exterior, b, Zone::Exterior).is_some());
    }

    #[test]
    fn test_adjacency_threshold() {
        let a = Vec2::new(0.0, 0.0);
        assert!(is_adjacent(a, Zone::Exterior, Vec2::new(1.2, 0.0), Zone::Exterior));
        assert!(!is_adjacent(a, Zone::Exterior, Vec2::new(1.4, 0.0), Zone::Exterior));
    }

    #[test]
    fn test_normalize_angle_range() {
        assert!((normalize_angle(3.0 * std::f32::consts::PI) - std::f32::consts::PI).abs() < 1e-5);
        assert!((normalize_angle(-std::f32::consts::FRAC_PI_2) + std::f32::consts::FRAC_PI_2).abs() < 1e-5);
    }

    #[test]
    fn test_sight_line_blocked_by_tree_in_the_middle() {
        let tree = Obstacle::tree(Vec2::new(5.0, 0.0));
        assert!(sight_line_blocked(
            Vec2::new(0.0, 0.0),
            Vec2::new(10.0, 0.0),
            &[tree]
        ));
    }

    #[test]
    fn test_sight_line_clear_when_obstacle_is_off_axis() {
        let tree = Obstacle::tree(Vec2::new(5.0, 3.0));
        assert!(!sight_line_blocked(
            Vec2::new(0.0, 0.0),
            Vec2::new(10.0, 0.0),
            &[tree]
        ));
    }

    #[test]
    fn test_obstacle_hugging_endpoint_does_not_blind() {
        // Tree right next to the observer should be ignored
        let tree = Obstacle::tree(Vec2::new(0.3, 0.0));
        assert!(!sight_line_blocked(
            Vec2::new(0.0, 0.0),
            Vec2::new(10.0, 0.0),
            &[tree]
        ));
    }
}
