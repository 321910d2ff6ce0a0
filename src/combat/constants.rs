//! Fixed combat rule constants
//!
//! These define the shape of an attack and are not meant to be tuned per
//! scenario, unlike the values in `core::config`.

/// Half-angle of the attack cone at distance zero (radians)
pub const ATTACK_CONE_BASE_HALF_ANGLE: f32 = 0.35;

/// Half-angle of the attack cone at full weapon reach (radians)
///
/// The effective half-angle interpolates linearly from the base to this
/// as target distance grows from 0 to the weapon's reach.
pub const ATTACK_CONE_FULL_HALF_ANGLE: f32 = 0.9;

/// 8-direction mode: maximum perpendicular deviation from the facing axis
pub const SWING_HALF_WIDTH: f32 = 0.7;

/// Direct melee mode: maximum attacker-to-target distance
pub const MELEE_ATTACK_DISTANCE: f32 = 1.5;

/// Ticks between an attack being declared and its damage resolving
pub const ATTACK_ANIMATION_TICKS: u32 = 6;

/// Ticks a character must wait after attacking before attacking again
pub const ATTACK_COOLDOWN_TICKS: u32 = 12;

/// Effective half-cone angle at a given distance from the attacker
///
/// Monotonic non-decreasing in distance; at zero distance only the base
/// angle applies.
pub fn half_cone_at(distance: f32, reach: f32) -> f32 {
    let t = if reach > 0.0 {
        (distance / reach).clamp(0.0, 1.0)
    } else {
        0.0
    };
    ATTACK_CONE_BASE_HALF_ANGLE + t * (ATTACK_CONE_FULL_HALF_ANGLE - ATTACK_CONE_BASE_HALF_ANGLE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_half_cone_endpoints() {
        assert!((half_cone_at(0.0, 1.2) - ATTACK_CONE_BASE_HALF_ANGLE).abs() < 1e-6);
        assert!((half_cone_at(1.2, 1.2) - ATTACK_CONE_FULL_HALF_ANGLE).abs() < 1e-6);
    }

    proptest! {
        #[test]
        fn half_cone_is_monotonic(d1 in 0.0f32..2.0, d2 in 0.0f32..2.0) {
            let reach = 1.2;
            let (lo, hi) = if d1 <= d2 { (d1, d2) } else { (d2, d1) };
            prop_assert!(half_cone_at(lo, reach) <= half_cone_at(hi, reach) + 1e-6);
        }
    }
}
