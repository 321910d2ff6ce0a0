//! Weapon stats and the bare-hands fallback

use serde::{Deserialize, Serialize};

/// Stats of an equipped weapon
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Weapon {
    pub name: String,
    pub min_damage: i32,
    pub max_damage: i32,
    /// Maximum hit distance; also scales the attack cone
    pub reach: f32,
}

impl Weapon {
    /// Bare hands: what every character falls back to when unarmed
    pub fn fists() -> Self {
        Self {
            name: "fists".into(),
            min_damage: 2,
            max_damage: 5,
            reach: 1.2,
        }
    }

    pub fn sword() -> Self {
        Self {
            name: "sword".into(),
            min_damage: 8,
            max_damage: 14,
            reach: 1.6,
        }
    }

    pub fn spear() -> Self {
        Self {
            name: "spear".into(),
            min_damage: 6,
            max_damage: 12,
            reach: 2.2,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_damage_ranges_are_ordered() {
        for weapon in [Weapon::fists(), Weapon::sword(), Weapon::spear()] {
            assert!(
                weapon.min_damage <= weapon.max_damage,
                "{} has inverted damage range",
                weapon.name
            );
            assert!(weapon.reach > 0.0);
        }
    }
}
