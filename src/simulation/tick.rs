//! The per-tick pipeline

use crate::core::config::config;
use crate::core::types::{Facing, Tick};
use crate::ecs::world::World;
use crate::entity::intent::IntentAction;
use crate::entity::memory::CrimeType;
use crate::simulation::behavior::dispatch_behavior;
use crate::simulation::needs::tick_needs;

/// Something noteworthy that happened during a tick
///
/// Events are a reporting side channel for the shell and the logs; no
/// simulation logic ever reads them back.
#[derive(Debug, Clone, PartialEq, derive_more::Display)]
pub enum SimulationEvent {
    #[display(fmt = "{} hit {} for {} damage", attacker, victim, damage)]
    AttackHit { attacker: String, victim: String, damage: i32, tick: Tick },
    #[display(fmt = "{} died", name)]
    CharacterDied { name: String, killer: Option<String>, tick: Tick },
    #[display(fmt = "{} committed {}", criminal, crime_type)]
    CrimeCommitted { criminal: String, crime_type: CrimeType, tick: Tick },
    #[display(fmt = "{} witnessed a {}", witness, crime_type)]
    CrimeWitnessed { witness: String, crime_type: CrimeType, tick: Tick },
    #[display(fmt = "{} reported a crime to {}", reporter, soldier)]
    CrimeReported { reporter: String, soldier: String, tick: Tick },
    #[display(fmt = "{} froze from starvation", name)]
    StarvationFroze { name: String, tick: Tick },
}

/// Advance the world by exactly one tick
///
/// The pipeline order is load-bearing:
/// 1. Needs decay and starvation effects
/// 2. Combat-mode flags and attack cooldowns from current intents
/// 3. Pending attack countdown and resolution
/// 4. Death pass (corpses, loot already moved, stale attacks dropped)
/// 5. Farm growth
/// 6. Behavior dispatch (one chain step per living character)
/// 7. Second death pass for anything behavior killed
/// 8. Movement toward goals
/// 9. Spatial grid rebuild
/// 10. Tick counter increment
///
/// Returns the events the tick produced, drained from the world.
pub fn run_simulation_tick(world: &mut World) -> Vec<SimulationEvent> {
    tick_needs(world);

    for character in world.characters_mut() {
        character.combat_mode = character
            .intent()
            .map(|i| i.action == IntentAction::Attack)
            .unwrap_or(false);
        character.attack_cooldown = character.attack_cooldown.saturating_sub(1);
    }

    crate::combat::resolver::process_pending_attacks(world);
    world.process_deaths();

    world.map.advance_farms();
    dispatch_behavior(world);
    world.process_deaths();

    step_movement(world);
    world.rebuild_grid();
    world.current_tick += 1;

    world.drain_events()
}

/// Straight-line movement toward the goal position (pathfinding is a
/// collaborator stub; characters walk through nothing that blocks them)
fn step_movement(world: &mut World) {
    let speed = config().movement_speed;
    for character in world.characters_mut() {
        if !character.is_alive() || character.is_frozen || character.is_sleeping {
            continue;
        }
        let Some(goal) = character.goal else { continue };
        let to_goal = goal - character.position;
        let distance = to_goal.length();
        // Exhausted characters trudge at half speed
        let step = if character.stamina < 20.0 { speed * 0.5 } else { speed };
        if distance <= step {
            character.position = goal;
            character.goal = None;
        } else {
            let direction = to_goal.normalize();
            character.position = character.position + direction * step;
            character.facing = Facing::from_vector(direction);
        }
    }
}
