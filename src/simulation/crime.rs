//! Crime evaluation - who cares, who defends, who flees, who reports
//!
//! Crime intensity is an integer severity that doubles as the event's
//! perceptual/caring radius. Witnessing, caring, and reporting all run
//! through the allegiance-aware rules here.

use ordered_float::OrderedFloat;

use crate::core::config::config;
use crate::core::types::{CharacterId, Zone};
use crate::ecs::world::World;
use crate::entity::character::Character;
use crate::entity::intent::{IntentAction, IntentReason};
use crate::entity::memory::{CrimeType, Memory, MemoryKind, MemorySource};
use crate::simulation::perception::{can_perceive, can_perceive_event};
use crate::simulation::tick::SimulationEvent;
use crate::spatial::query::zoned_distance;

pub const CRIME_INTENSITY_MURDER: i32 = 17;
pub const CRIME_INTENSITY_ASSAULT: i32 = 12;
pub const CRIME_INTENSITY_THEFT: i32 = 10;

/// An attacker memory older than this no longer counts as an active threat
pub const ACTIVE_ATTACKER_MAX_TICKS: u64 = 50;
/// An attacker farther than this no longer counts as an active threat
pub const ACTIVE_ATTACKER_MAX_DISTANCE: f32 = 8.0;

pub fn intensity_of(crime_type: CrimeType) -> i32 {
    match crime_type {
        CrimeType::Murder => CRIME_INTENSITY_MURDER,
        CrimeType::Assault => CRIME_INTENSITY_ASSAULT,
        CrimeType::Theft => CRIME_INTENSITY_THEFT,
    }
}

/// How far a character flees from a crime of this intensity
pub fn flee_distance(intensity: i32) -> f32 {
    intensity as f32 / config().flee_distance_divisor
}

/// Does this character care enough about a crime to react to it?
///
/// Soldiers whose allegiance matches the victim's get a +3 morality bonus
/// and react at any intensity; everyone else needs base morality >= 7 and
/// a serious crime (intensity >= 15).
pub fn will_care_about_crime(
    responder: &Character,
    crime_allegiance: Option<&str>,
    intensity: i32,
) -> bool {
    let cfg = config();
    let allegiance_match = responder.job.is_soldier()
        && responder.allegiance.as_deref().is_some()
        && responder.allegiance.as_deref() == crime_allegiance;

    if allegiance_match {
        responder.traits.morality + cfg.soldier_morality_bonus >= cfg.caring_morality_threshold
    } else {
        responder.traits.morality >= cfg.caring_morality_threshold
            && intensity >= cfg.serious_crime_threshold
    }
}

/// Is this character a general defender (worth fleeing toward)?
pub fn is_general_defender(character: &Character) -> bool {
    let cfg = config();
    character.traits.morality >= cfg.caring_morality_threshold
        && character.traits.confidence >= cfg.confidence_fight_threshold
}

/// Find someone to run to: a same-allegiance soldier within range whom the
/// seeker does not know to be a criminal, or failing that any general
/// defender. Soldiers win when both exist.
pub fn find_nearby_defender(
    world: &World,
    seeker: CharacterId,
    max_distance: f32,
    exclude: Option<CharacterId>,
) -> Option<CharacterId> {
    let seeker_char = world.get_living(seeker)?;

    // Grid prefilter; the zone check below drops coordinate-space collisions
    let nearby: Vec<&Character> = world
        .grid
        .query_radius(seeker_char.position, max_distance, |id| {
            world.get_living(id).map(|c| c.position)
        })
        .into_iter()
        .filter_map(|id| world.get_living(id))
        .filter(|candidate| {
            candidate.id != seeker
                && Some(candidate.id) != exclude
                && !seeker_char.knows_criminal(candidate.id)
                && zoned_distance(
                    seeker_char.position,
                    seeker_char.zone,
                    candidate.position,
                    candidate.zone,
                )
                .map(|d| d <= max_distance)
                .unwrap_or(false)
        })
        .collect();

    let nearest = |candidates: Vec<&Character>| -> Option<CharacterId> {
        candidates
            .into_iter()
            .min_by_key(|c| OrderedFloat(seeker_char.position.distance(&c.position)))
            .map(|c| c.id)
    };

    let soldiers: Vec<&Character> = nearby
        .iter()
        .copied()
        .filter(|c| {
            c.job.is_soldier()
                && seeker_char.allegiance.is_some()
                && c.allegiance == seeker_char.allegiance
        })
        .collect();
    if !soldiers.is_empty() {
        return nearest(soldiers);
    }

    let generals: Vec<&Character> = nearby
        .iter()
        .copied()
        .filter(|c| is_general_defender(c))
        .collect();
    nearest(generals)
}

/// The nearest still-alive, still-perceivable criminal this character
/// remembers and cares about, with the worst known intensity.
pub fn find_known_criminal_nearby(
    world: &World,
    seeker: CharacterId,
) -> Option<(CharacterId, i32)> {
    let seeker_char = world.get_living(seeker)?;

    let mut candidates: Vec<(CharacterId, i32, f32)> = Vec::new();
    let mut seen: Vec<CharacterId> = Vec::new();
    for memory in seeker_char.memories().iter() {
        if memory.kind != MemoryKind::Crime || seen.contains(&memory.subject) {
            continue;
        }
        seen.push(memory.subject);

        let Some(criminal) = world.get_living(memory.subject) else {
            continue;
        };
        if can_perceive(world, seeker, criminal.id).is_none() {
            continue;
        }
        let worst = seeker_char
            .memories()
            .worst_crime_about(criminal.id)
            .map(|m| (m.intensity, m.victim_allegiance.clone()))
            .unwrap_or((memory.intensity, None));
        if !will_care_about_crime(seeker_char, worst.1.as_deref(), worst.0) {
            continue;
        }
        let distance = seeker_char.position.distance(&criminal.position);
        candidates.push((criminal.id, worst.0, distance));
    }

    candidates
        .into_iter()
        .min_by_key(|(_, _, d)| OrderedFloat(*d))
        .map(|(id, intensity, _)| (id, intensity))
}

/// The attacker this character should still be reacting to, if any:
/// remembered recently enough, alive, close enough, and perceivable.
pub fn get_active_attacker(world: &World, victim: CharacterId) -> Option<CharacterId> {
    let victim_char = world.get_living(victim)?;
    let memory = victim_char.memories().latest_attacker()?;
    if world.current_tick.saturating_sub(memory.tick) > ACTIVE_ATTACKER_MAX_TICKS {
        return None;
    }
    let attacker = world.get_living(memory.subject)?;
    let distance = zoned_distance(
        victim_char.position,
        victim_char.zone,
        attacker.position,
        attacker.zone,
    )?;
    if distance > ACTIVE_ATTACKER_MAX_DISTANCE {
        return None;
    }
    can_perceive(world, victim, attacker.id).map(|_| attacker.id)
}

/// Record a crime on the criminal's own conscience
///
/// Idempotent per crime type and victim, so repeated blows in one fight
/// leave a single entry.
pub fn committed_crime(
    world: &mut World,
    criminal: CharacterId,
    crime_type: CrimeType,
    victim: CharacterId,
) {
    let tick = world.current_tick;
    let victim_allegiance = world.get(victim).and_then(|v| v.allegiance.clone());
    let Some(criminal_char) = world.get_mut(criminal) else {
        return;
    };
    let already = criminal_char.memories().iter().any(|m| {
        m.kind == MemoryKind::CommittedCrime
            && m.crime_type == Some(crime_type)
            && m.victim == Some(victim)
    });
    if already {
        return;
    }
    criminal_char.add_memory(
        Memory::new(
            MemoryKind::CommittedCrime,
            criminal,
            tick,
            intensity_of(crime_type),
            MemorySource::SelfKnowledge,
        )
        .with_crime(crime_type)
        .with_victim(victim, victim_allegiance),
    );
    let name = criminal_char.name.clone();
    world.log_event(SimulationEvent::CrimeCommitted { criminal: name, crime_type, tick });
}

/// Record a crime on every character that presently perceives the criminal
/// and set their reactions.
///
/// Carers with the confidence to act attack; the timid flee; confident
/// non-carers just keep an eye on the threat.
pub fn witness_crime(
    world: &mut World,
    criminal: CharacterId,
    victim: CharacterId,
    crime_type: CrimeType,
) {
    let intensity = intensity_of(crime_type);
    let victim_allegiance = world.get(victim).and_then(|v| v.allegiance.clone());
    let tick = world.current_tick;

    // Snapshot witnesses before mutating anyone
    let witnesses: Vec<CharacterId> = world
        .living_ids()
        .into_iter()
        .filter(|&id| id != criminal && id != victim)
        .filter(|&id| can_perceive(world, id, criminal).is_some())
        .collect();

    for witness_id in witnesses {
        let Some(witness) = world.get(witness_id) else { continue };
        // One memory per event per witness
        let already = witness
            .memories()
            .iter()
            .any(|m| m.kind == MemoryKind::Crime && m.subject == criminal && m.tick == tick);
        let cares = will_care_about_crime(witness, victim_allegiance.as_deref(), intensity);
        let confident = witness.traits.confidence >= config().confidence_fight_threshold;

        let Some(witness) = world.get_mut(witness_id) else { continue };
        if !already {
            witness.add_memory(
                Memory::new(MemoryKind::Crime, criminal, tick, intensity, MemorySource::Witnessed)
                    .with_crime(crime_type)
                    .with_victim(victim, victim_allegiance.clone()),
            );
        }

        if cares && confident {
            witness.set_intent(IntentAction::Attack, criminal, IntentReason::WitnessedCrime, tick);
        } else if !confident {
            witness.set_intent(IntentAction::Flee, criminal, IntentReason::WitnessedCrime, tick);
        } else {
            witness.set_intent(
                IntentAction::Watch,
                criminal,
                IntentReason::MonitoringThreat,
                tick,
            );
        }

        let name = witness.name.clone();
        world.log_event(SimulationEvent::CrimeWitnessed {
            witness: name,
            crime_type,
            tick,
        });
    }

    tracing::debug!(?criminal, ?victim, %crime_type, "crime witnessed");
}

/// Theft at a farm cell: an event, not a character-to-character crime.
/// The theft intensity doubles as the event's sound radius.
pub fn witness_theft(
    world: &mut World,
    thief: CharacterId,
    cell_pos: crate::core::types::Vec2,
    cell_zone: Zone,
    victim_allegiance: Option<String>,
) {
    let intensity = CRIME_INTENSITY_THEFT;
    let tick = world.current_tick;

    let witnesses: Vec<CharacterId> = world
        .living_ids()
        .into_iter()
        .filter(|&id| id != thief)
        .filter(|&id| can_perceive_event(world, id, cell_pos, intensity as f32, cell_zone))
        .collect();

    for witness_id in witnesses {
        let Some(witness) = world.get(witness_id) else { continue };
        let already = witness
            .memories()
            .iter()
            .any(|m| m.kind == MemoryKind::Crime && m.subject == thief && m.tick == tick);
        if already {
            continue;
        }
        let Some(witness) = world.get_mut(witness_id) else { continue };
        let mut memory =
            Memory::new(MemoryKind::Crime, thief, tick, intensity, MemorySource::Witnessed)
                .with_crime(CrimeType::Theft);
        memory.victim_allegiance = victim_allegiance.clone();
        witness.add_memory(memory);
        // Theft alone sets no intent; caring characters confront via the
        // known-criminal checks in their behavior chain.
    }
}

/// Pass every unreported crime or attacked-by memory to a same-allegiance
/// soldier within hearing, then let the soldier react.
///
/// Returns true if anything was reported.
pub fn try_report_crimes(world: &mut World, reporter: CharacterId) -> bool {
    let cfg = config();
    let Some(reporter_char) = world.get_living(reporter) else {
        return false;
    };
    if reporter_char.memories().unreported_crimes().next().is_none() {
        return false;
    }
    let reporter_allegiance = reporter_char.allegiance.clone();
    if reporter_allegiance.is_none() {
        return false;
    }
    let reporter_pos = reporter_char.position;
    let reporter_zone = reporter_char.zone;

    // Nearest same-allegiance soldier within double sound radius
    let soldier_id = world
        .living()
        .filter(|c| c.id != reporter && c.job.is_soldier() && c.allegiance == reporter_allegiance)
        .filter(|c| {
            zoned_distance(reporter_pos, reporter_zone, c.position, c.zone)
                .map(|d| d <= 2.0 * cfg.sound_radius)
                .unwrap_or(false)
        })
        .min_by_key(|c| OrderedFloat(reporter_pos.distance(&c.position)))
        .map(|c| c.id);

    let Some(soldier_id) = soldier_id else {
        return false;
    };

    let tick = world.current_tick;
    let reporter_name = world.get(reporter).map(|r| r.name.clone()).unwrap_or_default();
    let soldier_name = world.get(soldier_id).map(|s| s.name.clone()).unwrap_or_default();
    let to_report: Vec<(usize, Memory)> = world
        .get(reporter)
        .map(|r| {
            r.memories()
                .unreported_crimes()
                .map(|(i, m)| (i, m.clone()))
                .collect()
        })
        .unwrap_or_default();

    let mut reported_any = false;
    for (index, memory) in to_report {
        // An attack on the reporter is passed on as an assault against them
        let (crime_type, victim, victim_allegiance) = if memory.kind == MemoryKind::AttackedBy {
            (Some(CrimeType::Assault), Some(reporter), reporter_allegiance.clone())
        } else {
            (memory.crime_type, memory.victim, memory.victim_allegiance.clone())
        };

        // The soldier may already know this crime
        let soldier_knows = world
            .get(soldier_id)
            .map(|s| s.knows_criminal(memory.subject))
            .unwrap_or(true);

        if !soldier_knows {
            if let Some(soldier) = world.get_mut(soldier_id) {
                let mut copy = Memory::new(
                    MemoryKind::Crime,
                    memory.subject,
                    tick,
                    memory.intensity,
                    MemorySource::ToldBy,
                )
                .with_informant(reporter);
                if let Some(crime_type) = crime_type {
                    copy = copy.with_crime(crime_type);
                }
                if let Some(victim) = victim {
                    copy = copy.with_victim(victim, victim_allegiance.clone());
                }
                copy.reported = true; // a soldier holds it; nothing left to report
                soldier.add_memory(copy);
            }
        }

        if let Some(r) = world.get_mut(reporter) {
            r.mark_memory_reported(index);
        }
        reported_any = true;

        // Soldier reaction: attack the criminal if it cares
        let reacts = world
            .get(soldier_id)
            .map(|s| {
                will_care_about_crime(s, victim_allegiance.as_deref(), memory.intensity)
                    && world.is_alive(memory.subject)
            })
            .unwrap_or(false);
        if reacts {
            if let Some(soldier) = world.get_mut(soldier_id) {
                soldier.set_intent(
                    IntentAction::Attack,
                    memory.subject,
                    IntentReason::KnownCriminal,
                    tick,
                );
            }
        }

        world.log_event(SimulationEvent::CrimeReported {
            reporter: reporter_name.clone(),
            soldier: soldier_name.clone(),
            tick,
        });
    }

    reported_any
}
