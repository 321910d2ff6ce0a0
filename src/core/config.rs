//! Simulation configuration with documented constants
//!
//! All tunable magic numbers are collected here with explanations of their
//! purpose and how they interact with each other. Fixed rule constants
//! (crime intensities, combat cone angles) live next to the systems that
//! own them.

use serde::{Deserialize, Serialize};

use crate::core::error::Result;

/// Configuration for the simulation systems
///
/// These values have been tuned to produce good emergent behavior.
/// Changing them will affect gameplay pacing and feel.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    // === SPATIAL SYSTEM ===
    /// Size of each cell in the spatial hash grid (world units)
    ///
    /// Should be a fraction of vision_range for optimal query performance.
    pub grid_cell_size: f32,

    /// Distance at which two characters count as adjacent (world units)
    ///
    /// Gates melee-range interactions and reporting face-to-face.
    pub adjacency_distance: f32,

    // === PERCEPTION ===
    /// Maximum distance at which vision can succeed (world units)
    pub vision_range: f32,

    /// Full width of the vision cone, in radians
    ///
    /// A target must lie within half this angle of the facing vector,
    /// unless closer than auto_visible_distance.
    pub vision_cone_angle: f32,

    /// Distance below which a target is visible regardless of facing
    pub auto_visible_distance: f32,

    /// Radius of every character's sound circle (world units)
    ///
    /// Two characters hear each other when their circles overlap, so the
    /// effective hearing distance is twice this value.
    pub sound_radius: f32,

    /// Obstacles closer than this to either endpoint of a sight line are
    /// ignored (prevents a character's own cover from blinding it)
    pub obstacle_clearance: f32,

    /// How close a character must be to a window (on either side) for the
    /// window to mediate cross-zone vision
    pub window_near_distance: f32,

    // === CRIME ===
    /// Flee distance is intensity divided by this
    ///
    /// At 0.5 a murder (intensity 17) is fled to 34 world units.
    pub flee_distance_divisor: f32,

    /// Intensity at or above which non-soldiers care about a crime
    pub serious_crime_threshold: i32,

    /// Effective morality required to care about a crime at all
    pub caring_morality_threshold: i32,

    /// Confidence at or above which a character fights rather than flees
    pub confidence_fight_threshold: i32,

    /// Morality bonus a soldier gets for crimes against its own allegiance
    pub soldier_morality_bonus: i32,

    // === NEEDS ===
    /// Hunger gauge maximum (full)
    pub max_hunger: f32,

    /// Hunger drained per tick
    ///
    /// At 0.007 a character goes from full to the eat threshold in a bit
    /// under a day.
    pub hunger_decay_rate: f32,

    /// Below this hunger a character will eat or cook when it can
    pub hunger_eat_threshold: f32,

    /// Below this hunger a character will forage or steal
    pub hunger_critical_threshold: f32,

    /// Health floor at which a starving character freezes in place
    pub starvation_freeze_health: i32,

    /// While starving, morality erodes once per this many ticks...
    pub starvation_morality_interval: u64,

    /// ...with this probability per interval
    pub starvation_morality_chance: f64,

    // === TIME ===
    /// Ticks in one in-game day
    pub ticks_per_day: u64,

    /// Fraction of the day after which the sleep window begins
    pub sleep_start_fraction: f32,

    // === MOVEMENT (collaborator stub) ===
    /// World units a character moves toward its goal per tick
    pub movement_speed: f32,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            // Spatial
            grid_cell_size: 4.0,
            adjacency_distance: 1.3,

            // Perception
            vision_range: 14.0,
            vision_cone_angle: 2.0 * std::f32::consts::FRAC_PI_3, // 120 degrees
            auto_visible_distance: 1.0,
            sound_radius: 6.0,
            obstacle_clearance: 0.3,
            window_near_distance: 1.5,

            // Crime
            flee_distance_divisor: 0.5,
            serious_crime_threshold: 15,
            caring_morality_threshold: 7,
            confidence_fight_threshold: 7,
            soldier_morality_bonus: 3,

            // Needs
            max_hunger: 100.0,
            hunger_decay_rate: 0.007,
            hunger_eat_threshold: 60.0,
            hunger_critical_threshold: 40.0,
            starvation_freeze_health: 20,
            starvation_morality_interval: 30,
            starvation_morality_chance: 0.5,

            // Time
            ticks_per_day: 15_000,
            sleep_start_fraction: 2.0 / 3.0,

            // Movement
            movement_speed: 1.0,
        }
    }
}

impl SimulationConfig {
    /// Create a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a config from a TOML file, validating it
    pub fn load(path: &std::path::Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&raw)?;
        config
            .validate()
            .map_err(crate::core::error::SimError::InvalidConfig)?;
        Ok(config)
    }

    /// Validate configuration for internal consistency
    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.grid_cell_size > self.vision_range / 3.0 {
            return Err(format!(
                "grid_cell_size ({}) should be <= vision_range / 3 ({:.1})",
                self.grid_cell_size,
                self.vision_range / 3.0
            ));
        }

        if self.vision_cone_angle <= 0.0 || self.vision_cone_angle > std::f32::consts::TAU {
            return Err(format!(
                "vision_cone_angle ({}) must be in (0, 2pi]",
                self.vision_cone_angle
            ));
        }

        if self.flee_distance_divisor <= 0.0 {
            return Err("flee_distance_divisor must be positive".into());
        }

        if self.hunger_critical_threshold >= self.hunger_eat_threshold {
            return Err(format!(
                "hunger_critical_threshold ({}) should be < hunger_eat_threshold ({})",
                self.hunger_critical_threshold, self.hunger_eat_threshold
            ));
        }

        if !(0.0..=1.0).contains(&self.sleep_start_fraction) {
            return Err("sleep_start_fraction must be in [0, 1]".into());
        }

        Ok(())
    }
}

// === GLOBAL CONFIG ACCESS ===

use std::sync::OnceLock;

static CONFIG: OnceLock<SimulationConfig> = OnceLock::new();

/// Get the global simulation config (initializes with defaults if not set)
pub fn config() -> &'static SimulationConfig {
    CONFIG.get_or_init(SimulationConfig::default)
}

/// Set the global simulation config (can only be called once)
///
/// Returns Err if config was already set.
pub fn set_config(config: SimulationConfig) -> std::result::Result<(), SimulationConfig> {
    CONFIG.set(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(SimulationConfig::default().validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_oversized_grid_cell() {
        let mut cfg = SimulationConfig::default();
        cfg.grid_cell_size = cfg.vision_range;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_inverted_hunger_thresholds() {
        let mut cfg = SimulationConfig::default();
        cfg.hunger_critical_threshold = cfg.hunger_eat_threshold + 1.0;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_config_parses_from_toml() {
        let cfg: SimulationConfig =
            toml::from_str("vision_range = 20.0\nsound_radius = 8.0\n").unwrap();
        assert_eq!(cfg.vision_range, 20.0);
        assert_eq!(cfg.sound_radius, 8.0);
        // Unspecified fields fall back to defaults
        assert_eq!(cfg.adjacency_distance, 1.3);
    }
}
