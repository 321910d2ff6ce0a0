//! Core type definitions used throughout the codebase

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for characters
///
/// Characters reference each other (intent targets, memory subjects) only
/// through this handle, resolved against the live-character registry each
/// time. Nothing owns a character except the world.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CharacterId(pub Uuid);

impl CharacterId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for CharacterId {
    fn default() -> Self {
        Self::new()
    }
}

/// Game tick counter (simulation time unit)
pub type Tick = u64;

/// Identifier for a building interior
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InteriorId(pub u32);

/// Coordinate space a position lives in
///
/// Every position is either exterior-world or local to one interior.
/// Distance, cone, and combat math must stay within a single zone;
/// comparing across zones is only valid through a window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Zone {
    Exterior,
    Interior(InteriorId),
}

impl Zone {
    pub fn is_interior(&self) -> bool {
        matches!(self, Zone::Interior(_))
    }
}

/// 2D position
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn distance(&self, other: &Self) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }

    pub fn length(&self) -> f32 {
        (self.x * self.x + self.y * self.y).sqrt()
    }

    pub fn dot(&self, other: &Self) -> f32 {
        self.x * other.x + self.y * other.y
    }

    /// Angle of this vector in radians, in (-pi, pi]
    pub fn angle(&self) -> f32 {
        self.y.atan2(self.x)
    }

    pub fn normalize(&self) -> Self {
        let len = self.length();
        if len > 0.0001 {
            Self { x: self.x / len, y: self.y / len }
        } else {
            Self::default()
        }
    }
}

impl std::ops::Add for Vec2 {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self { x: self.x + rhs.x, y: self.y + rhs.y }
    }
}

impl std::ops::Sub for Vec2 {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Self { x: self.x - rhs.x, y: self.y - rhs.y }
    }
}

impl std::ops::Mul<f32> for Vec2 {
    type Output = Self;
    fn mul(self, rhs: f32) -> Self {
        Self { x: self.x * rhs, y: self.y * rhs }
    }
}

/// One of the 8 compass directions a character can face
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Facing {
    North,
    NorthEast,
    East,
    SouthEast,
    South,
    SouthWest,
    West,
    NorthWest,
}

impl Facing {
    /// Unit vector for this facing (y grows southward, matching grid rows)
    pub fn unit(&self) -> Vec2 {
        const DIAG: f32 = std::f32::consts::FRAC_1_SQRT_2;
        match self {
            Facing::North => Vec2::new(0.0, -1.0),
            Facing::NorthEast => Vec2::new(DIAG, -DIAG),
            Facing::East => Vec2::new(1.0, 0.0),
            Facing::SouthEast => Vec2::new(DIAG, DIAG),
            Facing::South => Vec2::new(0.0, 1.0),
            Facing::SouthWest => Vec2::new(-DIAG, DIAG),
            Facing::West => Vec2::new(-1.0, 0.0),
            Facing::NorthWest => Vec2::new(-DIAG, -DIAG),
        }
    }

    /// Snap an arbitrary direction vector to the nearest of the 8 facings
    pub fn from_vector(v: Vec2) -> Self {
        if v.length() < 0.0001 {
            return Facing::South;
        }
        // Octant index from the angle, offset by half an octant so each
        // facing owns the 45-degree wedge centered on it.
        let angle = v.angle();
        let octant = ((angle + std::f32::consts::PI / 8.0)
            .rem_euclid(2.0 * std::f32::consts::PI)
            / (std::f32::consts::PI / 4.0)) as usize
            % 8;
        [
            Facing::East,
            Facing::SouthEast,
            Facing::South,
            Facing::SouthWest,
            Facing::West,
            Facing::NorthWest,
            Facing::North,
            Facing::NorthEast,
        ][octant]
    }

    pub fn is_cardinal(&self) -> bool {
        matches!(
            self,
            Facing::North | Facing::East | Facing::South | Facing::West
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_character_id_equality() {
        let a = CharacterId::new();
        let b = a;
        let c = CharacterId::new();
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_character_id_hash() {
        use std::collections::HashMap;
        let id = CharacterId::new();
        let mut map: HashMap<CharacterId, &str> = HashMap::new();
        map.insert(id, "ada");
        assert_eq!(map.get(&id), Some(&"ada"));
    }

    #[test]
    fn test_vec2_distance() {
        let a = Vec2::new(0.0, 0.0);
        let b = Vec2::new(3.0, 4.0);
        assert!((a.distance(&b) - 5.0).abs() < 1e-6);
    }

    #[test]
    fn test_vec2_normalize_zero_is_safe() {
        let v = Vec2::default().normalize();
        assert_eq!(v.x, 0.0);
        assert_eq!(v.y, 0.0);
    }

    #[test]
    fn test_facing_units_are_unit_length() {
        for facing in [
            Facing::North,
            Facing::NorthEast,
            Facing::East,
            Facing::SouthEast,
            Facing::South,
            Facing::SouthWest,
            Facing::West,
            Facing::NorthWest,
        ] {
            assert!(
                (facing.unit().length() - 1.0).abs() < 1e-6,
                "{:?} unit vector should have length 1",
                facing
            );
        }
    }

    #[test]
    fn test_facing_from_vector_round_trips() {
        for facing in [
            Facing::North,
            Facing::NorthEast,
            Facing::East,
            Facing::SouthEast,
            Facing::South,
            Facing::SouthWest,
            Facing::West,
            Facing::NorthWest,
        ] {
            assert_eq!(
                Facing::from_vector(facing.unit()),
                facing,
                "snapping {:?}'s own unit vector should return it",
                facing
            );
        }
    }

    #[test]
    fn test_zone_interior_flag() {
        assert!(!Zone::Exterior.is_interior());
        assert!(Zone::Interior(InteriorId(0)).is_interior());
    }
}
