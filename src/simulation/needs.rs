//! Bodily needs: hunger, starvation, stamina, and the sleep window
//!
//! Starvation never kills outright. It erodes health down to the freeze
//! threshold and then freezes the character in place until fed; morality
//! erodes alongside, which is what eventually turns the desperate to theft.

use rand::Rng;

use crate::core::config::config;
use crate::core::types::{CharacterId, Tick, Vec2};
use crate::ecs::world::World;
use crate::entity::character::Item;
use crate::simulation::tick::SimulationEvent;
use crate::world::objects::ObstacleKind;

/// How close a character must stand to a stove to cook at it
pub const STOVE_USE_DISTANCE: f32 = 1.5;

const STAMINA_MAX: f32 = 100.0;
const STAMINA_COMBAT_DRAIN: f32 = 1.0;
const STAMINA_REGEN: f32 = 0.25;
const STAMINA_SLEEP_REGEN: f32 = 0.5;

/// Advance hunger, starvation, and stamina for every living character
pub fn tick_needs(world: &mut World) {
    let cfg = config();
    let tick = world.current_tick;

    for id in world.living_ids() {
        let interval_roll = world.rng.gen_bool(cfg.starvation_morality_chance);
        let Some(character) = world.get_mut(id) else { continue };

        character.hunger = (character.hunger - cfg.hunger_decay_rate).max(0.0);

        if character.hunger <= 0.0 {
            character.starving_ticks += 1;
            if character.starving_ticks % cfg.starvation_morality_interval == 0 {
                if character.health > cfg.starvation_freeze_health {
                    character.health -= 1;
                }
                if interval_roll && character.traits.morality > 0 {
                    character.traits.morality -= 1;
                    tracing::debug!(name = %character.name, morality = character.traits.morality,
                        "starvation eroded morality");
                }
            }
            if character.health <= cfg.starvation_freeze_health && !character.is_frozen {
                character.is_frozen = true;
                character.clear_intent();
                character.goal = None;
                let name = character.name.clone();
                world.log_event(SimulationEvent::StarvationFroze { name, tick });
                continue;
            }
        } else {
            character.starving_ticks = 0;
            if character.is_frozen {
                character.is_frozen = false;
            }
        }

        // Stamina: combat drains, rest restores, sleep restores faster
        let character = match world.get_mut(id) {
            Some(c) => c,
            None => continue,
        };
        let delta = if character.combat_mode {
            -STAMINA_COMBAT_DRAIN
        } else if character.is_sleeping {
            STAMINA_SLEEP_REGEN
        } else {
            STAMINA_REGEN
        };
        character.stamina = (character.stamina + delta).clamp(0.0, STAMINA_MAX);
    }
}

/// Eat one bread if hungry enough to bother; fully restores hunger
pub fn try_eat(world: &mut World, id: CharacterId) -> bool {
    let cfg = config();
    let Some(character) = world.get_mut(id) else {
        return false;
    };
    if character.hunger > cfg.hunger_eat_threshold {
        return false;
    }
    if character.inventory.remove(Item::Bread, 1) == 0 {
        return false;
    }
    character.hunger = cfg.max_hunger;
    character.is_frozen = false;
    character.starving_ticks = 0;
    tracing::debug!(name = %character.name, "ate bread");
    true
}

/// Turn one wheat into bread at a stove within use distance
pub fn try_cook(world: &mut World, id: CharacterId) -> bool {
    let Some(character) = world.get(id) else {
        return false;
    };
    if character.inventory.count(Item::Wheat) == 0 {
        return false;
    }
    if nearest_stove(world, character.position, character.zone).is_none() {
        return false;
    }
    let Some(character) = world.get_mut(id) else {
        return false;
    };
    character.inventory.remove(Item::Wheat, 1);
    character.inventory.add(Item::Bread, 1);
    true
}

/// The closest stove within use distance in the given zone, if any
pub fn nearest_stove(
    world: &World,
    position: Vec2,
    zone: crate::core::types::Zone,
) -> Option<Vec2> {
    world
        .map
        .obstacles_in_zone(zone)
        .iter()
        .filter(|o| o.kind == ObstacleKind::Stove)
        .map(|o| o.position)
        .filter(|p| position.distance(p) <= STOVE_USE_DISTANCE)
        .min_by(|a, b| {
            position
                .distance(a)
                .partial_cmp(&position.distance(b))
                .unwrap_or(std::cmp::Ordering::Equal)
        })
}

/// Is the day far enough along that characters head home to sleep?
pub fn is_sleep_time(tick: Tick) -> bool {
    let cfg = config();
    let day_tick = tick % cfg.ticks_per_day;
    day_tick as f32 >= cfg.ticks_per_day as f32 * cfg.sleep_start_fraction
}
