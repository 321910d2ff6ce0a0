//! Attack declaration, pending-attack countdown, and hit resolution
//!
//! An attack is declared first and resolves `ATTACK_ANIMATION_TICKS` ticks
//! later against whoever is then inside the hit geometry. Three geometries
//! exist: a direct melee strike at one target, an aimed cone sweep, and an
//! 8-direction swing along the attacker's facing.

use rand::Rng;

use crate::combat::constants::{
    half_cone_at, ATTACK_ANIMATION_TICKS, ATTACK_COOLDOWN_TICKS, MELEE_ATTACK_DISTANCE,
    SWING_HALF_WIDTH,
};
use crate::combat::weapons::Weapon;
use crate::core::config::config;
use crate::core::types::{CharacterId, Vec2};
use crate::ecs::world::World;
use crate::entity::character::Character;
use crate::entity::intent::{IntentAction, IntentReason};
use crate::entity::memory::CrimeType;
use crate::simulation::crime::{committed_crime, witness_crime, CRIME_INTENSITY_ASSAULT};
use crate::simulation::tick::SimulationEvent;
use crate::spatial::query::normalize_angle;

/// A declared attack counting down to resolution
#[derive(Debug, Clone)]
pub struct PendingAttack {
    pub attacker: CharacterId,
    /// Direct melee target; None for cone and swing attacks
    pub target: Option<CharacterId>,
    /// Aim direction in radians for cone attacks; None swings along facing
    pub aim_angle: Option<f32>,
    pub multiplier: f32,
    pub ticks_remaining: u32,
}

/// Result of a resolved melee strike
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MeleeOutcome {
    pub hit: bool,
    pub damage: i32,
    pub killed: bool,
}

const MISS: MeleeOutcome = MeleeOutcome { hit: false, damage: 0, killed: false };

/// Declare an attack, starting its animation countdown
///
/// Refused while the attacker is dead, frozen, or still on cooldown.
pub fn declare_attack(
    world: &mut World,
    attacker: CharacterId,
    target: Option<CharacterId>,
    aim_angle: Option<f32>,
    multiplier: f32,
) -> bool {
    let Some(character) = world.get_living(attacker) else {
        return false;
    };
    if character.attack_cooldown > 0 || character.is_frozen {
        return false;
    }
    world.pending_attacks.push(PendingAttack {
        attacker,
        target,
        aim_angle,
        multiplier,
        ticks_remaining: ATTACK_ANIMATION_TICKS,
    });
    if let Some(character) = world.get_mut(attacker) {
        character.attack_cooldown = ATTACK_COOLDOWN_TICKS;
    }
    tracing::debug!(?attacker, ?target, "attack declared");
    true
}

/// Count down every pending attack and resolve those that reach zero
///
/// Resolution happens against current positions, so a target that moved
/// out of the hit geometry during the countdown is missed.
pub fn process_pending_attacks(world: &mut World) {
    for pending in world.pending_attacks.iter_mut() {
        pending.ticks_remaining = pending.ticks_remaining.saturating_sub(1);
    }

    let (ready, waiting): (Vec<PendingAttack>, Vec<PendingAttack>) = world
        .pending_attacks
        .drain(..)
        .partition(|p| p.ticks_remaining == 0);
    world.pending_attacks = waiting;

    for attack in ready {
        match attack.target {
            Some(target) => {
                resolve_melee_attack(world, attack.attacker, target, attack.multiplier);
            }
            None => {
                resolve_attack(world, attack.attacker, attack.aim_angle, attack.multiplier);
            }
        }
    }
}

/// Resolve an area attack immediately; returns who was hit
///
/// With an aim angle this is a cone sweep whose half-angle widens with
/// distance up to the weapon's reach. Without one it is a straight swing
/// along the attacker's facing: positive projection within reach, within
/// `SWING_HALF_WIDTH` of the axis.
pub fn resolve_attack(
    world: &mut World,
    attacker: CharacterId,
    aim_angle: Option<f32>,
    multiplier: f32,
) -> Vec<CharacterId> {
    let Some(attacker_char) = world.get_living(attacker) else {
        return Vec::new();
    };
    let weapon = attacker_char.weapon.clone().unwrap_or_else(Weapon::fists);
    let origin = attacker_char.position;
    let zone = attacker_char.zone;

    let victims: Vec<CharacterId> = match aim_angle {
        Some(aim) => world
            .living()
            .filter(|c| c.id != attacker && c.zone == zone)
            .filter(|c| {
                let distance = origin.distance(&c.position);
                if distance > weapon.reach {
                    return false;
                }
                // A target at the attacker's own position has no direction
                // to be hit from
                if distance < 1e-3 {
                    return false;
                }
                let offset = normalize_angle((c.position - origin).angle() - aim).abs();
                offset <= half_cone_at(distance, weapon.reach)
            })
            .map(|c| c.id)
            .collect(),
        None => {
            let axis = attacker_char.facing.unit();
            world
                .living()
                .filter(|c| c.id != attacker && c.zone == zone)
                .filter(|c| {
                    let rel = c.position - origin;
                    let proj = rel.dot(&axis);
                    let perp = (rel - axis * proj).length();
                    proj > 0.0 && proj <= weapon.reach && perp < SWING_HALF_WIDTH
                })
                .map(|c| c.id)
                .collect()
        }
    };

    let mut hit = Vec::new();
    for victim in victims {
        let blocked = world
            .get(victim)
            .map(|v| is_blocked(origin, v, weapon.reach))
            .unwrap_or(false);
        if blocked {
            continue;
        }
        let damage = roll_damage(world, &weapon, multiplier);
        apply_hit(world, attacker, victim, damage);
        hit.push(victim);
    }
    hit
}

/// Is the strike from `attacker_pos` inside the target's raised guard cone?
///
/// The guard cone is apexed at the target's own aim angle and sized by the
/// incoming weapon's reach with the same interpolation as the attack cone.
fn is_blocked(attacker_pos: Vec2, target: &Character, reach: f32) -> bool {
    if !target.is_blocking {
        return false;
    }
    let distance = target.position.distance(&attacker_pos);
    let guard = target
        .aim_angle
        .unwrap_or_else(|| target.facing.unit().angle());
    let to_attacker = (attacker_pos - target.position).angle();
    normalize_angle(to_attacker - guard).abs() <= half_cone_at(distance, reach)
}

/// Resolve a direct melee strike immediately
///
/// Hits when the target is within `MELEE_ATTACK_DISTANCE` and inside the
/// attacker's facing cone at that distance. A guard raised toward the
/// attacker negates the hit.
pub fn resolve_melee_attack(
    world: &mut World,
    attacker: CharacterId,
    target: CharacterId,
    multiplier: f32,
) -> MeleeOutcome {
    let Some(attacker_char) = world.get_living(attacker) else {
        return MISS;
    };
    let Some(target_char) = world.get_living(target) else {
        return MISS;
    };
    if attacker_char.zone != target_char.zone {
        return MISS;
    }

    let weapon = attacker_char.weapon.clone().unwrap_or_else(Weapon::fists);
    let distance = attacker_char.position.distance(&target_char.position);
    if distance > MELEE_ATTACK_DISTANCE {
        return MISS;
    }
    if distance >= 1e-3 {
        let facing_angle = attacker_char.facing.unit().angle();
        let to_target = (target_char.position - attacker_char.position).angle();
        if normalize_angle(to_target - facing_angle).abs() > half_cone_at(distance, weapon.reach) {
            return MISS;
        }
    }

    if is_blocked(attacker_char.position, target_char, weapon.reach) {
        tracing::debug!(?attacker, ?target, "strike blocked");
        return MISS;
    }

    let damage = roll_damage(world, &weapon, multiplier);
    let killed = apply_hit(world, attacker, target, damage);
    MeleeOutcome { hit: true, damage, killed }
}

fn roll_damage(world: &mut World, weapon: &Weapon, multiplier: f32) -> i32 {
    let roll = world.rng.gen_range(weapon.min_damage..=weapon.max_damage);
    ((roll as f32) * multiplier).round() as i32
}

/// Apply damage and all of its consequences; returns whether the victim died
///
/// A hit on a known criminal by a non-criminal is justified and records no
/// crime. Everything else records assault, upgraded to murder on a kill,
/// and broadcasts to witnesses.
fn apply_hit(world: &mut World, attacker: CharacterId, victim: CharacterId, damage: i32) -> bool {
    let tick = world.current_tick;
    let Some((attacker_char, victim_char)) = world.get_pair_mut(attacker, victim) else {
        return false;
    };
    if !victim_char.is_alive() {
        return false;
    }

    victim_char.health -= damage;
    victim_char.is_sleeping = false;
    victim_char.clear_bystander_intent();
    victim_char.remember_attack(attacker, tick, CRIME_INTENSITY_ASSAULT);

    let killed = !victim_char.is_alive();
    let justified = attacker_char.knows_criminal(victim) && !attacker_char.is_criminal();
    let attacker_name = attacker_char.name.clone();
    let victim_name = victim_char.name.clone();

    if killed {
        // Loot moves immediately; the corpse keeps only what is left
        attacker_char.inventory.take_all_from(&mut victim_char.inventory);
        if attacker_char.intent().map(|i| i.target) == Some(victim) {
            attacker_char.clear_intent();
        }
    }

    world.log_event(SimulationEvent::AttackHit {
        attacker: attacker_name.clone(),
        victim: victim_name.clone(),
        damage,
        tick,
    });
    tracing::debug!(attacker = %attacker_name, victim = %victim_name, damage, "hit landed");

    if killed {
        world.log_event(SimulationEvent::CharacterDied {
            name: victim_name,
            killer: Some(attacker_name),
            tick,
        });
    }

    let crime = if killed { CrimeType::Murder } else { CrimeType::Assault };
    if !justified {
        committed_crime(world, attacker, crime, victim);
        witness_crime(world, attacker, victim, crime);
    }
    if killed {
        broadcast_violence(world, attacker, victim);
    }
    killed
}

/// Lethal violence unsettles bystanders even when the kill was justified
///
/// Anyone perceiving the killer who has no stronger intent of their own
/// watches if confident, flees if not. Both are bystander intents and
/// expire as soon as the killer is no longer perceived.
pub fn broadcast_violence(world: &mut World, killer: CharacterId, victim: CharacterId) {
    use crate::simulation::perception::can_perceive;

    let tick = world.current_tick;
    let threshold = config().confidence_fight_threshold;
    let bystanders: Vec<CharacterId> = world
        .living_ids()
        .into_iter()
        .filter(|&id| id != killer && id != victim)
        .filter(|&id| can_perceive(world, id, killer).is_some())
        .collect();

    for id in bystanders {
        let Some(bystander) = world.get(id) else { continue };
        let passive = bystander
            .intent()
            .map(|i| i.reason == IntentReason::Bystander)
            .unwrap_or(true);
        if !passive {
            continue;
        }
        let confident = bystander.traits.confidence >= threshold;
        let Some(bystander) = world.get_mut(id) else { continue };
        let action = if confident { IntentAction::Watch } else { IntentAction::Flee };
        bystander.set_intent(action, killer, IntentReason::Bystander, tick);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::{Facing, Vec2, Zone};
    use crate::entity::character::{Character, Traits};
    use crate::entity::memory::MemoryKind;

    fn duelists(world: &mut World) -> (CharacterId, CharacterId) {
        let mut attacker = Character::new("Brant", Vec2::new(0.0, 0.0), Zone::Exterior);
        attacker.facing = Facing::East;
        let victim = Character::new("Marta", Vec2::new(0.8, 0.0), Zone::Exterior);
        (world.spawn(attacker), world.spawn(victim))
    }

    #[test]
    fn test_melee_hit_damage_within_fists_range() {
        let mut world = World::new(3);
        let (attacker, victim) = duelists(&mut world);
        let outcome = resolve_melee_attack(&mut world, attacker, victim, 1.0);
        assert!(outcome.hit);
        assert!(
            (2..=5).contains(&outcome.damage),
            "fists roll 2..=5, got {}",
            outcome.damage
        );
        assert_eq!(world.get(victim).unwrap().health, 100 - outcome.damage);
    }

    #[test]
    fn test_melee_misses_outside_range() {
        let mut world = World::new(3);
        let mut attacker = Character::new("Brant", Vec2::new(0.0, 0.0), Zone::Exterior);
        attacker.facing = Facing::East;
        let attacker = world.spawn(attacker);
        let victim = world.spawn(Character::new("Marta", Vec2::new(3.0, 0.0), Zone::Exterior));
        assert_eq!(resolve_melee_attack(&mut world, attacker, victim, 1.0), MISS);
    }

    #[test]
    fn test_unjustified_hit_records_assault_once() {
        let mut world = World::new(3);
        let (attacker, victim) = duelists(&mut world);
        resolve_melee_attack(&mut world, attacker, victim, 1.0);
        resolve_melee_attack(&mut world, attacker, victim, 1.0);

        let attacker_char = world.get(attacker).unwrap();
        let committed: Vec<_> = attacker_char
            .memories()
            .iter()
            .filter(|m| m.kind == MemoryKind::CommittedCrime)
            .collect();
        assert_eq!(committed.len(), 1, "repeat assaults on one victim record once");
        assert!(world.get(victim).unwrap().memories().has_memory_of(
            MemoryKind::AttackedBy,
            attacker
        ));
    }

    #[test]
    fn test_kill_loots_and_clears_intent() {
        let mut world = World::new(3);
        let (attacker, victim) = duelists(&mut world);
        world
            .get_mut(victim)
            .unwrap()
            .inventory
            .add(crate::entity::character::Item::Coin, 9);
        world.get_mut(victim).unwrap().health = 1;
        world.get_mut(attacker).unwrap().set_intent(
            IntentAction::Attack,
            victim,
            IntentReason::Attacked,
            0,
        );

        let outcome = resolve_melee_attack(&mut world, attacker, victim, 1.0);
        assert!(outcome.killed);
        let attacker_char = world.get(attacker).unwrap();
        assert_eq!(
            attacker_char.inventory.count(crate::entity::character::Item::Coin),
            9
        );
        assert!(attacker_char.intent().is_none(), "intent on the dead must clear");
    }

    #[test]
    fn test_justified_kill_records_no_crime() {
        let mut world = World::new(3);
        let (attacker, victim) = duelists(&mut world);
        {
            use crate::entity::memory::{Memory, MemorySource};
            world.get_mut(attacker).unwrap().add_memory(
                Memory::new(MemoryKind::Crime, victim, 0, 17, MemorySource::Witnessed)
                    .with_crime(CrimeType::Murder),
            );
        }
        world.get_mut(victim).unwrap().health = 1;

        let outcome = resolve_melee_attack(&mut world, attacker, victim, 1.0);
        assert!(outcome.killed);
        assert!(
            !world.get(attacker).unwrap().is_criminal(),
            "killing a known criminal is justified"
        );
    }

    #[test]
    fn test_pending_attack_counts_down_before_resolving() {
        let mut world = World::new(3);
        let (attacker, victim) = duelists(&mut world);
        assert!(declare_attack(&mut world, attacker, Some(victim), None, 1.0));

        for _ in 0..(ATTACK_ANIMATION_TICKS - 1) {
            process_pending_attacks(&mut world);
            assert_eq!(
                world.get(victim).unwrap().health,
                100,
                "no damage during the countdown"
            );
        }
        process_pending_attacks(&mut world);
        assert!(world.get(victim).unwrap().health < 100);
        assert!(world.pending_attacks.is_empty());
    }

    #[test]
    fn test_declare_attack_respects_cooldown() {
        let mut world = World::new(3);
        let (attacker, victim) = duelists(&mut world);
        assert!(declare_attack(&mut world, attacker, Some(victim), None, 1.0));
        assert!(
            !declare_attack(&mut world, attacker, Some(victim), None, 1.0),
            "second declaration inside the cooldown must be refused"
        );
    }

    #[test]
    fn test_guard_raised_toward_the_attacker_blocks_the_strike() {
        let mut world = World::new(3);
        let (attacker, victim) = duelists(&mut world);
        {
            // Attacker sits due west of the victim
            let victim_char = world.get_mut(victim).unwrap();
            victim_char.is_blocking = true;
            victim_char.aim_angle = Some(std::f32::consts::PI);
        }

        let outcome = resolve_melee_attack(&mut world, attacker, victim, 1.0);
        assert!(!outcome.hit, "a guard facing the attacker negates the strike");
        assert_eq!(world.get(victim).unwrap().health, 100);
    }

    #[test]
    fn test_guard_facing_away_does_not_block() {
        let mut world = World::new(3);
        let (attacker, victim) = duelists(&mut world);
        {
            let victim_char = world.get_mut(victim).unwrap();
            victim_char.is_blocking = true;
            victim_char.aim_angle = Some(0.0);
        }

        let outcome = resolve_melee_attack(&mut world, attacker, victim, 1.0);
        assert!(outcome.hit, "a guard turned away from the attacker is useless");
        assert!(world.get(victim).unwrap().health < 100);
    }

    #[test]
    fn test_aimed_cone_excludes_a_target_at_zero_distance() {
        let mut world = World::new(3);
        let attacker = world.spawn(Character::new("Brant", Vec2::new(0.0, 0.0), Zone::Exterior));
        let overlapped =
            world.spawn(Character::new("Under", Vec2::new(0.0, 0.0), Zone::Exterior));
        let ahead = world.spawn(Character::new("Ahead", Vec2::new(0.9, 0.0), Zone::Exterior));

        let hit = resolve_attack(&mut world, attacker, Some(0.0), 1.0);
        assert!(!hit.contains(&overlapped), "no direction to hit a co-located target from");
        assert!(hit.contains(&ahead));
        assert_eq!(world.get(overlapped).unwrap().health, 100);
    }

    #[test]
    fn test_swing_hits_only_in_front() {
        let mut world = World::new(3);
        let mut attacker = Character::new("Brant", Vec2::new(0.0, 0.0), Zone::Exterior);
        attacker.facing = Facing::East;
        let attacker = world.spawn(attacker);
        let ahead = world.spawn(Character::new("Ahead", Vec2::new(0.9, 0.1), Zone::Exterior));
        let behind = world.spawn(Character::new("Behind", Vec2::new(-0.9, 0.0), Zone::Exterior));

        let hit = resolve_attack(&mut world, attacker, None, 1.0);
        assert!(hit.contains(&ahead));
        assert!(!hit.contains(&behind));
        assert_eq!(world.get(behind).unwrap().health, 100);
    }

    #[test]
    fn test_kill_broadcast_sets_bystander_reactions() {
        let mut world = World::new(3);
        let (attacker, victim) = duelists(&mut world);
        // Justified kill: no crime memories compete with the broadcast
        {
            use crate::entity::memory::{Memory, MemorySource};
            world.get_mut(attacker).unwrap().add_memory(
                Memory::new(MemoryKind::Crime, victim, 0, 17, MemorySource::Witnessed)
                    .with_crime(CrimeType::Murder),
            );
        }
        world.get_mut(victim).unwrap().health = 1;

        let mut timid = Character::new("Timid", Vec2::new(3.0, 0.0), Zone::Exterior);
        timid.facing = Facing::West;
        timid.traits = Traits::new(5, 2, 5, 5);
        let timid = world.spawn(timid);

        let mut bold = Character::new("Bold", Vec2::new(0.0, 3.0), Zone::Exterior);
        bold.facing = Facing::North;
        bold.traits = Traits::new(5, 9, 5, 5);
        let bold = world.spawn(bold);

        resolve_melee_attack(&mut world, attacker, victim, 1.0);

        let timid_intent = world.get(timid).unwrap().intent().copied().unwrap();
        assert_eq!(timid_intent.action, IntentAction::Flee);
        assert_eq!(timid_intent.reason, IntentReason::Bystander);

        let bold_intent = world.get(bold).unwrap().intent().copied().unwrap();
        assert_eq!(bold_intent.action, IntentAction::Watch);
        assert_eq!(bold_intent.reason, IntentReason::Bystander);
    }
}
