//! Per-job behavior chains
//!
//! Each job kind owns an ordered list of steps; every tick a character runs
//! the first step whose predicate holds. Threat handling sits above needs,
//! needs above idle work, so a fight interrupts a meal but never the other
//! way round.

use rand::Rng;

use crate::combat::constants::MELEE_ATTACK_DISTANCE;
use crate::combat::resolver::declare_attack;
use crate::core::config::config;
use crate::core::types::{CharacterId, Facing, Vec2, Zone};
use crate::ecs::world::World;
use crate::entity::character::Item;
use crate::entity::intent::{IntentAction, IntentReason};
use crate::entity::job::{JobKind, PatrolPhase, PatrolState};
use crate::entity::memory::{CrimeType, Memory, MemoryKind, MemorySource};
use crate::simulation::crime::{
    find_known_criminal_nearby, find_nearby_defender, flee_distance, get_active_attacker,
    try_report_crimes, witness_theft, CRIME_INTENSITY_ASSAULT, CRIME_INTENSITY_THEFT,
};
use crate::simulation::needs::{is_sleep_time, try_cook, try_eat};
use crate::simulation::perception::can_perceive;
use crate::spatial::query::{is_adjacent, zoned_distance};
use crate::world::objects::FarmCellState;

/// Health floor below which even a soldier retreats
pub const SOLDIER_FLEE_HEALTH: i32 = 10;
/// Chance a soldier pauses to look around on reaching a waypoint
pub const PATROL_CHECK_CHANCE: f64 = 0.3;
/// Length of a checking pause, in ticks
pub const PATROL_CHECK_TICKS: u32 = 20;
/// Within this distance a goal or waypoint counts as reached
pub const ARRIVE_DISTANCE: f32 = 1.0;

const WANDER_CHANCE: f64 = 0.02;
const WANDER_RANGE: f32 = 5.0;

/// One rung of a behavior chain: a predicate and the action it gates
pub struct BehaviorStep {
    pub name: &'static str,
    pub applies: fn(&World, CharacterId) -> bool,
    pub run: fn(&mut World, CharacterId),
}

const VILLAGER_CHAIN: &[BehaviorStep] = &[
    BehaviorStep { name: "frozen", applies: applies_frozen, run: run_hold },
    BehaviorStep { name: "asleep", applies: applies_asleep, run: run_hold },
    BehaviorStep { name: "flee", applies: applies_flee, run: run_flee },
    BehaviorStep { name: "fight_back", applies: applies_fight_back, run: run_fight_back },
    BehaviorStep { name: "combat", applies: applies_in_combat, run: run_combat },
    BehaviorStep { name: "watch", applies: applies_watch, run: run_watch },
    BehaviorStep { name: "flee_criminal", applies: applies_flee_criminal, run: run_flee_criminal },
    BehaviorStep { name: "confront", applies: applies_civil_confront, run: run_confront },
    BehaviorStep { name: "watch_fleeing", applies: applies_watch_fleeing, run: run_watch_fleeing },
    BehaviorStep { name: "report", applies: applies_report, run: run_report },
    BehaviorStep { name: "eat", applies: applies_eat, run: run_eat },
    BehaviorStep { name: "cook", applies: applies_cook, run: run_cook },
    BehaviorStep { name: "sleep", applies: applies_sleep, run: run_sleep },
    BehaviorStep { name: "forage", applies: applies_forage, run: run_forage },
    BehaviorStep { name: "steal", applies: applies_steal, run: run_steal },
    BehaviorStep { name: "wander", applies: applies_always, run: run_wander },
];

const FARMER_CHAIN: &[BehaviorStep] = &[
    BehaviorStep { name: "frozen", applies: applies_frozen, run: run_hold },
    BehaviorStep { name: "asleep", applies: applies_asleep, run: run_hold },
    BehaviorStep { name: "flee", applies: applies_flee, run: run_flee },
    BehaviorStep { name: "fight_back", applies: applies_fight_back, run: run_fight_back },
    BehaviorStep { name: "combat", applies: applies_in_combat, run: run_combat },
    BehaviorStep { name: "watch", applies: applies_watch, run: run_watch },
    BehaviorStep { name: "flee_criminal", applies: applies_flee_criminal, run: run_flee_criminal },
    BehaviorStep { name: "confront", applies: applies_civil_confront, run: run_confront },
    BehaviorStep { name: "watch_fleeing", applies: applies_watch_fleeing, run: run_watch_fleeing },
    BehaviorStep { name: "report", applies: applies_report, run: run_report },
    BehaviorStep { name: "eat", applies: applies_eat, run: run_eat },
    BehaviorStep { name: "cook", applies: applies_cook, run: run_cook },
    BehaviorStep { name: "sleep", applies: applies_sleep, run: run_sleep },
    BehaviorStep { name: "forage", applies: applies_forage, run: run_forage },
    BehaviorStep { name: "steal", applies: applies_steal, run: run_steal },
    BehaviorStep { name: "farm", applies: applies_farm_work, run: run_farm_work },
    BehaviorStep { name: "wander", applies: applies_always, run: run_wander },
];

const SOLDIER_CHAIN: &[BehaviorStep] = &[
    BehaviorStep { name: "frozen", applies: applies_frozen, run: run_hold },
    BehaviorStep { name: "flee_wounded", applies: applies_soldier_flee, run: run_flee },
    BehaviorStep { name: "fight_back", applies: applies_soldier_fight_back, run: run_fight_back },
    BehaviorStep { name: "combat", applies: applies_in_combat, run: run_combat },
    BehaviorStep { name: "confront", applies: applies_confront, run: run_confront },
    BehaviorStep { name: "eat", applies: applies_eat, run: run_eat },
    BehaviorStep { name: "cook", applies: applies_cook, run: run_cook },
    BehaviorStep { name: "patrol", applies: applies_patrol, run: run_patrol },
    BehaviorStep { name: "wander", applies: applies_always, run: run_wander },
];

pub fn chain_for(job: JobKind) -> &'static [BehaviorStep] {
    match job {
        JobKind::Villager => VILLAGER_CHAIN,
        JobKind::Farmer => FARMER_CHAIN,
        JobKind::Soldier => SOLDIER_CHAIN,
    }
}

/// Run the behavior chain for every living character
pub fn dispatch_behavior(world: &mut World) {
    for id in world.living_ids() {
        run_chain(world, id);
    }
}

fn run_chain(world: &mut World, id: CharacterId) {
    // Wake on danger or daybreak before deciding anything
    let should_wake = world
        .get(id)
        .map(|c| {
            c.is_sleeping
                && (!is_sleep_time(world.current_tick) || get_active_attacker(world, id).is_some())
        })
        .unwrap_or(false);
    if should_wake {
        if let Some(character) = world.get_mut(id) {
            character.is_sleeping = false;
        }
    }

    let Some(job) = world.get_living(id).map(|c| c.job) else {
        return;
    };
    for step in chain_for(job) {
        if (step.applies)(world, id) {
            tracing::trace!(?id, step = step.name, "behavior step");
            (step.run)(world, id);
            return;
        }
    }
}

// === PREDICATES ===

fn applies_always(_world: &World, _id: CharacterId) -> bool {
    true
}

fn applies_frozen(world: &World, id: CharacterId) -> bool {
    world.get(id).map(|c| c.is_frozen).unwrap_or(false)
}

fn applies_asleep(world: &World, id: CharacterId) -> bool {
    world.get(id).map(|c| c.is_sleeping).unwrap_or(false)
}

fn applies_flee(world: &World, id: CharacterId) -> bool {
    let Some(character) = world.get(id) else { return false };
    if character
        .intent()
        .map(|i| i.action == IntentAction::Flee)
        .unwrap_or(false)
    {
        return true;
    }
    get_active_attacker(world, id).is_some()
        && character.traits.confidence < config().confidence_fight_threshold
}

fn applies_fight_back(world: &World, id: CharacterId) -> bool {
    let Some(character) = world.get(id) else { return false };
    get_active_attacker(world, id).is_some()
        && character.traits.confidence >= config().confidence_fight_threshold
}

fn applies_soldier_flee(world: &World, id: CharacterId) -> bool {
    let Some(character) = world.get(id) else { return false };
    get_active_attacker(world, id).is_some() && character.health < SOLDIER_FLEE_HEALTH
}

fn applies_soldier_fight_back(world: &World, id: CharacterId) -> bool {
    get_active_attacker(world, id).is_some()
}

fn applies_in_combat(world: &World, id: CharacterId) -> bool {
    world
        .get(id)
        .and_then(|c| c.intent())
        .map(|i| i.action == IntentAction::Attack)
        .unwrap_or(false)
}

fn applies_watch(world: &World, id: CharacterId) -> bool {
    world
        .get(id)
        .and_then(|c| c.intent())
        .map(|i| i.action == IntentAction::Watch)
        .unwrap_or(false)
}

fn applies_flee_criminal(world: &World, id: CharacterId) -> bool {
    let Some(character) = world.get(id) else { return false };
    character.traits.confidence < config().confidence_fight_threshold
        && find_known_criminal_nearby(world, id).is_some()
}

/// A civilian confronts a known criminal only with the morals to care and
/// the nerve to act; soldiers confront unconditionally.
fn applies_civil_confront(world: &World, id: CharacterId) -> bool {
    let Some(character) = world.get(id) else { return false };
    let cfg = config();
    character.traits.morality >= cfg.caring_morality_threshold
        && character.traits.confidence >= cfg.confidence_fight_threshold
        && find_known_criminal_nearby(world, id).is_some()
}

fn applies_confront(world: &World, id: CharacterId) -> bool {
    find_known_criminal_nearby(world, id).is_some()
}

fn applies_watch_fleeing(world: &World, id: CharacterId) -> bool {
    let Some(character) = world.get(id) else { return false };
    let cfg = config();
    character.traits.morality >= cfg.caring_morality_threshold
        && character.traits.confidence >= cfg.confidence_fight_threshold
        && find_fleeing_character(world, id).is_some()
}

fn applies_report(world: &World, id: CharacterId) -> bool {
    let Some(character) = world.get(id) else { return false };
    if character.allegiance.is_none()
        || character.memories().unreported_crimes().next().is_none()
    {
        return false;
    }
    world.living().any(|c| {
        c.id != id
            && c.job.is_soldier()
            && c.allegiance == character.allegiance
            && zoned_distance(character.position, character.zone, c.position, c.zone)
                .map(|d| d <= 2.0 * config().sound_radius)
                .unwrap_or(false)
    })
}

fn applies_eat(world: &World, id: CharacterId) -> bool {
    world
        .get(id)
        .map(|c| c.hunger <= config().hunger_eat_threshold && c.inventory.count(Item::Bread) > 0)
        .unwrap_or(false)
}

fn applies_cook(world: &World, id: CharacterId) -> bool {
    let Some(character) = world.get(id) else { return false };
    character.hunger <= config().hunger_eat_threshold
        && character.inventory.count(Item::Wheat) > 0
        && any_stove_in_zone(world, character.zone)
}

fn applies_sleep(world: &World, id: CharacterId) -> bool {
    is_sleep_time(world.current_tick)
        && world.get(id).map(|c| !c.is_sleeping).unwrap_or(false)
}

fn applies_forage(world: &World, id: CharacterId) -> bool {
    let Some(character) = world.get(id) else { return false };
    character.zone == Zone::Exterior
        && character.hunger <= config().hunger_eat_threshold
        && character.inventory.count(Item::Bread) == 0
        && character.inventory.count(Item::Wheat) == 0
        && find_legal_cell(world, character.position, character.home.as_deref()).is_some()
}

fn applies_steal(world: &World, id: CharacterId) -> bool {
    let cfg = config();
    let Some(character) = world.get(id) else { return false };
    let desperate = character.traits.morality < cfg.caring_morality_threshold
        || character.hunger <= 0.0;
    character.zone == Zone::Exterior
        && character.hunger <= cfg.hunger_critical_threshold
        && character.inventory.count(Item::Bread) == 0
        && character.inventory.count(Item::Wheat) == 0
        && desperate
        && find_steal_cell(world, character.position, character.home.as_deref()).is_some()
}

fn applies_farm_work(world: &World, id: CharacterId) -> bool {
    let Some(character) = world.get(id) else { return false };
    character.zone == Zone::Exterior
        && character.home.is_some()
        && find_own_cell(world, character.position, character.home.as_deref()).is_some()
}

fn applies_patrol(world: &World, _id: CharacterId) -> bool {
    !world.map.patrol_waypoints.is_empty()
}

// === ACTIONS ===

fn run_hold(world: &mut World, id: CharacterId) {
    if let Some(character) = world.get_mut(id) {
        character.goal = None;
    }
}

fn run_flee(world: &mut World, id: CharacterId) {
    let tick = world.current_tick;
    let existing = world
        .get(id)
        .and_then(|c| c.intent())
        .filter(|i| i.action == IntentAction::Flee)
        .copied();

    let (threat, reason) = match existing {
        Some(intent) => (intent.target, intent.reason),
        None => match get_active_attacker(world, id) {
            Some(attacker) => (attacker, IntentReason::Attacked),
            None => return,
        },
    };

    if !world.is_alive(threat) {
        if let Some(character) = world.get_mut(id) {
            character.clear_intent();
            character.goal = None;
        }
        return;
    }

    let perceivable = can_perceive(world, id, threat).is_some();
    if !perceivable && reason.expires_on_perception_loss() {
        if let Some(character) = world.get_mut(id) {
            character.clear_intent();
            character.goal = None;
        }
        return;
    }

    let intensity = threat_intensity(world, id, threat);
    if let Some(character) = world.get_mut(id) {
        character.set_intent(IntentAction::Flee, threat, reason, tick);
    }

    // Far enough away: stop running and keep an eye on the threat instead
    let apart = world.get(id).and_then(|c| {
        let t = world.get(threat)?;
        zoned_distance(c.position, c.zone, t.position, t.zone)
    });
    if apart.map(|d| d >= flee_distance(intensity)).unwrap_or(true) {
        if let Some(character) = world.get_mut(id) {
            character.set_intent(IntentAction::Watch, threat, IntentReason::MonitoringThreat, tick);
            character.goal = None;
        }
        return;
    }

    flee_route(world, id, threat, intensity);
}

/// Pick where to run: toward a defender if one is in sight, otherwise away
fn flee_route(world: &mut World, id: CharacterId, threat: CharacterId, intensity: i32) {
    let Some((pos, zone)) = world.get(id).map(|c| (c.position, c.zone)) else {
        return;
    };
    let Some((threat_pos, threat_zone)) = world.get(threat).map(|c| (c.position, c.zone)) else {
        return;
    };

    if let Some(defender) = find_nearby_defender(world, id, config().vision_range, Some(threat)) {
        if let Some(defender_pos) = world.get(defender).map(|d| d.position) {
            if let Some(character) = world.get_mut(id) {
                character.goal = Some(defender_pos);
                character.facing = Facing::from_vector(defender_pos - pos);
            }
            try_report_crimes(world, id);
            return;
        }
    }

    let goal = match zone {
        Zone::Interior(interior_id) if zone == threat_zone => world
            .map
            .get_interior(interior_id)
            .map(|i| i.farthest_open_point(threat_pos)),
        _ if zone == threat_zone => {
            let away = (pos - threat_pos).normalize();
            Some(pos + away * flee_distance(intensity))
        }
        // Threat seen through a window: no shared space to run through
        _ => None,
    };
    if let Some(character) = world.get_mut(id) {
        character.goal = goal;
        if let Some(g) = goal {
            character.facing = Facing::from_vector(g - pos);
        }
    }
}

fn run_fight_back(world: &mut World, id: CharacterId) {
    let tick = world.current_tick;
    let Some(attacker) = get_active_attacker(world, id) else {
        return;
    };
    if let Some(character) = world.get_mut(id) {
        character.set_intent(IntentAction::Attack, attacker, IntentReason::Attacked, tick);
    }
    engage(world, id, attacker);
}

fn run_combat(world: &mut World, id: CharacterId) {
    let Some(target) = world
        .get(id)
        .and_then(|c| c.intent())
        .filter(|i| i.action == IntentAction::Attack)
        .map(|i| i.target)
    else {
        return;
    };
    engage(world, id, target);
}

/// Close to melee range and declare an attack; drop the intent when the
/// target is dead or can no longer be perceived.
fn engage(world: &mut World, id: CharacterId, target: CharacterId) {
    if !world.is_alive(target) || can_perceive(world, id, target).is_none() {
        if let Some(character) = world.get_mut(id) {
            character.clear_intent();
            character.goal = None;
        }
        return;
    }
    let Some((pos, zone)) = world.get(id).map(|c| (c.position, c.zone)) else {
        return;
    };
    let Some((target_pos, target_zone)) = world.get(target).map(|c| (c.position, c.zone)) else {
        return;
    };
    if zone != target_zone {
        // Perceived through a window; cannot path there
        if let Some(character) = world.get_mut(id) {
            character.goal = None;
        }
        return;
    }

    let distance = pos.distance(&target_pos);
    if let Some(character) = world.get_mut(id) {
        character.facing = Facing::from_vector(target_pos - pos);
        if distance <= MELEE_ATTACK_DISTANCE {
            character.goal = None;
        } else {
            character.goal = Some(target_pos);
        }
    }
    if distance <= MELEE_ATTACK_DISTANCE {
        declare_attack(world, id, Some(target), None, 1.0);
    }
}

fn run_watch(world: &mut World, id: CharacterId) {
    let Some(intent) = world.get(id).and_then(|c| c.intent()).copied() else {
        return;
    };
    let target = intent.target;
    if !world.is_alive(target) {
        if let Some(character) = world.get_mut(id) {
            character.clear_intent();
            character.goal = None;
        }
        return;
    }
    if can_perceive(world, id, target).is_none() {
        if intent.reason.expires_on_perception_loss() {
            if let Some(character) = world.get_mut(id) {
                character.clear_intent();
                character.goal = None;
            }
        }
        return;
    }
    let Some((pos, zone)) = world.get(id).map(|c| (c.position, c.zone)) else {
        return;
    };
    let target_state = world.get(target).map(|c| (c.position, c.zone));
    if let Some(character) = world.get_mut(id) {
        character.goal = None;
        if let Some((target_pos, target_zone)) = target_state {
            if target_zone == zone {
                character.facing = Facing::from_vector(target_pos - pos);
            }
        }
    }
}

fn run_flee_criminal(world: &mut World, id: CharacterId) {
    let tick = world.current_tick;
    let Some((criminal, intensity)) = find_known_criminal_nearby(world, id) else {
        return;
    };
    if let Some(character) = world.get_mut(id) {
        character.set_intent(IntentAction::Flee, criminal, IntentReason::KnownCriminal, tick);
    }
    flee_route(world, id, criminal, intensity);
}

fn run_confront(world: &mut World, id: CharacterId) {
    let tick = world.current_tick;
    let Some((criminal, _)) = find_known_criminal_nearby(world, id) else {
        return;
    };
    if let Some(character) = world.get_mut(id) {
        character.set_intent(IntentAction::Attack, criminal, IntentReason::KnownCriminal, tick);
    }
    engage(world, id, criminal);
}

/// Observational only: keep eyes on whoever is running, set no goal
fn run_watch_fleeing(world: &mut World, id: CharacterId) {
    let tick = world.current_tick;
    let Some(fleeing) = find_fleeing_character(world, id) else {
        return;
    };
    let Some((pos, zone)) = world.get(id).map(|c| (c.position, c.zone)) else {
        return;
    };
    let fleeing_state = world.get(fleeing).map(|c| (c.position, c.zone));
    if let Some(character) = world.get_mut(id) {
        character.set_intent(IntentAction::Watch, fleeing, IntentReason::Bystander, tick);
        character.goal = None;
        if let Some((fleeing_pos, fleeing_zone)) = fleeing_state {
            if fleeing_zone == zone {
                character.facing = Facing::from_vector(fleeing_pos - pos);
            }
        }
    }
}

fn run_report(world: &mut World, id: CharacterId) {
    try_report_crimes(world, id);
}

fn run_eat(world: &mut World, id: CharacterId) {
    try_eat(world, id);
}

fn run_cook(world: &mut World, id: CharacterId) {
    if try_cook(world, id) {
        return;
    }
    // Not in reach yet: head for the nearest stove in this zone
    let Some((pos, zone)) = world.get(id).map(|c| (c.position, c.zone)) else {
        return;
    };
    let stove = world
        .map
        .obstacles_in_zone(zone)
        .iter()
        .filter(|o| o.kind == crate::world::objects::ObstacleKind::Stove)
        .map(|o| o.position)
        .min_by(|a, b| {
            pos.distance(a)
                .partial_cmp(&pos.distance(b))
                .unwrap_or(std::cmp::Ordering::Equal)
        });
    if let Some(character) = world.get_mut(id) {
        character.goal = stove;
        if let Some(s) = stove {
            character.facing = Facing::from_vector(s - pos);
        }
    }
}

fn run_sleep(world: &mut World, id: CharacterId) {
    let Some((pos, zone, home)) = world.get(id).map(|c| (c.position, c.zone, c.home.clone()))
    else {
        return;
    };

    let home_interior = home
        .as_deref()
        .and_then(|name| world.map.interiors.iter().find(|i| i.name == name))
        .map(|i| (i.id, i.door, i.interior_to_world(i.door)));

    match (zone, home_interior) {
        (Zone::Interior(here), Some((home_id, _, _))) if here == home_id => {
            if let Some(character) = world.get_mut(id) {
                character.is_sleeping = true;
                character.goal = None;
            }
        }
        (Zone::Exterior, Some((home_id, door_local, door_world))) => {
            if pos.distance(&door_world) <= ARRIVE_DISTANCE {
                if let Some(character) = world.get_mut(id) {
                    character.zone = Zone::Interior(home_id);
                    character.position = door_local;
                    character.is_sleeping = true;
                    character.goal = None;
                }
            } else if let Some(character) = world.get_mut(id) {
                character.goal = Some(door_world);
                character.facing = Facing::from_vector(door_world - pos);
            }
        }
        // No home to reach: sleep where they stand
        _ => {
            if let Some(character) = world.get_mut(id) {
                character.is_sleeping = true;
                character.goal = None;
            }
        }
    }
}

fn run_forage(world: &mut World, id: CharacterId) {
    let Some((pos, home)) = world.get(id).map(|c| (c.position, c.home.clone())) else {
        return;
    };
    let Some(cell_idx) = find_legal_cell(world, pos, home.as_deref()) else {
        return;
    };
    harvest_or_approach(world, id, cell_idx, false);
}

fn run_steal(world: &mut World, id: CharacterId) {
    let Some((pos, home)) = world.get(id).map(|c| (c.position, c.home.clone())) else {
        return;
    };
    let Some(cell_idx) = find_steal_cell(world, pos, home.as_deref()) else {
        return;
    };
    harvest_or_approach(world, id, cell_idx, true);
}

fn run_farm_work(world: &mut World, id: CharacterId) {
    let Some((pos, home)) = world.get(id).map(|c| (c.position, c.home.clone())) else {
        return;
    };
    let Some(cell_idx) = find_own_cell(world, pos, home.as_deref()) else {
        return;
    };
    harvest_or_approach(world, id, cell_idx, false);
}

/// Walk to a farm cell and harvest it on arrival. Theft additionally
/// stains the thief's conscience and raises a witnessable event.
fn harvest_or_approach(world: &mut World, id: CharacterId, cell_idx: usize, theft: bool) {
    let Some(pos) = world.get(id).map(|c| c.position) else {
        return;
    };
    let (cell_pos, cell_home) = {
        let cell = &world.map.farm_cells[cell_idx];
        (cell.position, cell.home.clone())
    };

    if !is_adjacent(pos, Zone::Exterior, cell_pos, Zone::Exterior) {
        if let Some(character) = world.get_mut(id) {
            character.goal = Some(cell_pos);
            character.facing = Facing::from_vector(cell_pos - pos);
        }
        return;
    }

    if !world.map.farm_cells[cell_idx].harvest() {
        return;
    }
    let tick = world.current_tick;
    if let Some(character) = world.get_mut(id) {
        character.inventory.add(Item::Wheat, 1);
        character.goal = None;
    }

    if theft {
        if let Some(character) = world.get_mut(id) {
            let already = character.memories().iter().any(|m| {
                m.kind == MemoryKind::CommittedCrime && m.crime_type == Some(CrimeType::Theft)
            });
            if !already {
                character.add_memory(
                    Memory::new(
                        MemoryKind::CommittedCrime,
                        id,
                        tick,
                        CRIME_INTENSITY_THEFT,
                        MemorySource::SelfKnowledge,
                    )
                    .with_crime(CrimeType::Theft),
                );
            }
        }
        witness_theft(world, id, cell_pos, Zone::Exterior, cell_home);
    }
}

fn run_patrol(world: &mut World, id: CharacterId) {
    let waypoint_count = world.map.patrol_waypoints.len();
    if waypoint_count == 0 {
        run_wander(world, id);
        return;
    }

    // First patrol tick: start at a waypoint derived from the id so
    // soldiers spread out instead of bunching up
    let needs_state = world.get(id).map(|c| c.patrol.is_none()).unwrap_or(false);
    if needs_state {
        let start = world
            .get(id)
            .map(|c| (c.id.0.as_u128() % waypoint_count as u128) as usize)
            .unwrap_or(0);
        if let Some(character) = world.get_mut(id) {
            character.patrol = Some(PatrolState::new(start, 1));
        }
    }

    let Some(state) = world.get(id).and_then(|c| c.patrol.clone()) else {
        return;
    };

    match state.phase {
        PatrolPhase::Checking => {
            let turn = world.rng.gen_bool(0.2);
            let turn_to = world.rng.gen_range(0..8u8);
            if let Some(character) = world.get_mut(id) {
                character.goal = None;
                if turn {
                    character.facing = facing_by_index(turn_to);
                }
                if let Some(patrol) = character.patrol.as_mut() {
                    patrol.wait_ticks = patrol.wait_ticks.saturating_sub(1);
                    if patrol.wait_ticks == 0 {
                        patrol.advance(waypoint_count);
                        patrol.phase = PatrolPhase::Marching;
                    }
                }
            }
        }
        PatrolPhase::Marching => {
            let waypoint = world.map.patrol_waypoints[state.waypoint_idx % waypoint_count];
            let pos = world.get(id).map(|c| c.position).unwrap_or_default();
            if pos.distance(&waypoint) <= ARRIVE_DISTANCE {
                let pause = world.rng.gen_bool(PATROL_CHECK_CHANCE);
                if let Some(character) = world.get_mut(id) {
                    character.goal = None;
                    if let Some(patrol) = character.patrol.as_mut() {
                        if pause {
                            patrol.phase = PatrolPhase::Checking;
                            patrol.wait_ticks = PATROL_CHECK_TICKS;
                        } else {
                            patrol.advance(waypoint_count);
                        }
                    }
                }
            } else if let Some(character) = world.get_mut(id) {
                character.goal = Some(waypoint);
                character.facing = Facing::from_vector(waypoint - pos);
            }
        }
    }
}

fn run_wander(world: &mut World, id: CharacterId) {
    let has_goal = world.get(id).map(|c| c.goal.is_some()).unwrap_or(false);
    if has_goal {
        return;
    }
    if !world.rng.gen_bool(WANDER_CHANCE) {
        return;
    }
    let dx = world.rng.gen_range(-WANDER_RANGE..WANDER_RANGE);
    let dy = world.rng.gen_range(-WANDER_RANGE..WANDER_RANGE);
    if let Some(character) = world.get_mut(id) {
        let goal = character.position + Vec2::new(dx, dy);
        character.facing = Facing::from_vector(goal - character.position);
        character.goal = Some(goal);
    }
}

// === SHARED LOOKUPS ===

fn threat_intensity(world: &World, id: CharacterId, threat: CharacterId) -> i32 {
    let Some(character) = world.get(id) else {
        return CRIME_INTENSITY_ASSAULT;
    };
    character
        .memories()
        .worst_crime_about(threat)
        .map(|m| m.intensity)
        .or_else(|| {
            character
                .memories()
                .iter()
                .filter(|m| m.kind == MemoryKind::AttackedBy && m.subject == threat)
                .map(|m| m.intensity)
                .next()
        })
        .unwrap_or(CRIME_INTENSITY_ASSAULT)
}

/// Someone perceivable who is currently running from something
fn find_fleeing_character(world: &World, observer: CharacterId) -> Option<CharacterId> {
    world
        .living()
        .filter(|c| c.id != observer)
        .filter(|c| {
            c.intent()
                .map(|i| i.action == IntentAction::Flee)
                .unwrap_or(false)
        })
        .find(|c| can_perceive(world, observer, c.id).is_some())
        .map(|c| c.id)
}

fn any_stove_in_zone(world: &World, zone: Zone) -> bool {
    world
        .map
        .obstacles_in_zone(zone)
        .iter()
        .any(|o| o.kind == crate::world::objects::ObstacleKind::Stove)
}

/// Nearest ready cell this character may harvest without committing theft:
/// unowned, or belonging to their own home
fn find_legal_cell(world: &World, from: Vec2, home: Option<&str>) -> Option<usize> {
    nearest_cell_where(world, from, |cell_home| {
        cell_home.is_none() || cell_home == home
    })
}

/// Nearest ready cell belonging to someone else's home
fn find_steal_cell(world: &World, from: Vec2, home: Option<&str>) -> Option<usize> {
    nearest_cell_where(world, from, |cell_home| {
        cell_home.is_some() && cell_home != home
    })
}

/// Nearest ready cell belonging to this character's own home
fn find_own_cell(world: &World, from: Vec2, home: Option<&str>) -> Option<usize> {
    if home.is_none() {
        return None;
    }
    nearest_cell_where(world, from, |cell_home| cell_home.is_some() && cell_home == home)
}

fn nearest_cell_where(
    world: &World,
    from: Vec2,
    owner_filter: impl Fn(Option<&str>) -> bool,
) -> Option<usize> {
    world
        .map
        .farm_cells
        .iter()
        .enumerate()
        .filter(|(_, c)| c.state == FarmCellState::Ready && owner_filter(c.home.as_deref()))
        .min_by(|(_, a), (_, b)| {
            a.position
                .distance(&from)
                .partial_cmp(&b.position.distance(&from))
                .unwrap_or(std::cmp::Ordering::Equal)
        })
        .map(|(i, _)| i)
}

fn facing_by_index(index: u8) -> Facing {
    [
        Facing::North,
        Facing::NorthEast,
        Facing::East,
        Facing::SouthEast,
        Facing::South,
        Facing::SouthWest,
        Facing::West,
        Facing::NorthWest,
    ][(index % 8) as usize]
}
