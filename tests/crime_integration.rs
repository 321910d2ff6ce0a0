//! Crime witnessing, caring, fleeing, and reporting end to end

use hollowvale::core::config::config;
use hollowvale::core::types::{CharacterId, Facing, Vec2, Zone};
use hollowvale::ecs::world::World;
use hollowvale::entity::character::{Character, Traits};
use hollowvale::entity::intent::{IntentAction, IntentReason};
use hollowvale::entity::job::JobKind;
use hollowvale::entity::memory::{CrimeType, Memory, MemoryKind, MemorySource};
use hollowvale::simulation::crime::{
    flee_distance, intensity_of, try_report_crimes, will_care_about_crime,
    CRIME_INTENSITY_ASSAULT, CRIME_INTENSITY_MURDER, CRIME_INTENSITY_THEFT,
};
use hollowvale::combat::resolver::resolve_melee_attack;

fn spawn(world: &mut World, name: &str, pos: Vec2, facing: Facing, traits: Traits) -> CharacterId {
    let mut character = Character::new(name, pos, Zone::Exterior).with_traits(traits);
    character.facing = facing;
    world.spawn(character)
}

/// Murder in the open: the attacker kills a weakened victim with one blow
fn stage_murder(world: &mut World) -> (CharacterId, CharacterId) {
    let attacker = spawn(world, "Brant", Vec2::new(0.0, 0.0), Facing::East, Traits::default());
    let victim = spawn(world, "Vern", Vec2::new(0.8, 0.0), Facing::West, Traits::default());
    world.get_mut(victim).unwrap().health = 1;
    (attacker, victim)
}

#[test]
fn intensities_rank_murder_over_assault_over_theft() {
    assert!(CRIME_INTENSITY_MURDER > CRIME_INTENSITY_ASSAULT);
    assert!(CRIME_INTENSITY_ASSAULT > CRIME_INTENSITY_THEFT);
    assert_eq!(intensity_of(CrimeType::Murder), CRIME_INTENSITY_MURDER);
}

#[test]
fn flee_distance_scales_with_intensity() {
    assert_eq!(flee_distance(CRIME_INTENSITY_MURDER), 34.0);
    assert_eq!(flee_distance(CRIME_INTENSITY_THEFT), 20.0);
}

#[test]
fn a_timid_witness_flees_a_murder() {
    let mut world = World::new(9);
    let (attacker, victim) = stage_murder(&mut world);
    let witness = spawn(
        &mut world,
        "Edda",
        Vec2::new(4.0, 0.0),
        Facing::West,
        Traits::new(5, 3, 5, 5),
    );

    let outcome = resolve_melee_attack(&mut world, attacker, victim, 1.0);
    assert!(outcome.killed);

    let witness_char = world.get(witness).unwrap();
    let memory = witness_char
        .memories()
        .worst_crime_about(attacker)
        .expect("witness remembers the murder");
    assert_eq!(memory.crime_type, Some(CrimeType::Murder));
    assert_eq!(memory.intensity, CRIME_INTENSITY_MURDER);
    assert_eq!(memory.source, MemorySource::Witnessed);

    let intent = witness_char.intent().expect("witness reacts");
    assert_eq!(intent.action, IntentAction::Flee);
    assert_eq!(intent.reason, IntentReason::WitnessedCrime);
    assert_eq!(intent.target, attacker);
}

#[test]
fn a_confident_moral_witness_attacks_the_murderer() {
    let mut world = World::new(9);
    let (attacker, victim) = stage_murder(&mut world);
    let witness = spawn(
        &mut world,
        "Edda",
        Vec2::new(4.0, 0.0),
        Facing::West,
        Traits::new(8, 8, 5, 5),
    );

    resolve_melee_attack(&mut world, attacker, victim, 1.0);

    let intent = world.get(witness).unwrap().intent().expect("witness reacts");
    assert_eq!(intent.action, IntentAction::Attack);
    assert_eq!(intent.reason, IntentReason::WitnessedCrime);
}

#[test]
fn an_oblivious_character_learns_nothing() {
    let mut world = World::new(9);
    let (attacker, victim) = stage_murder(&mut world);
    // Facing away and out of hearing
    let oblivious = spawn(
        &mut world,
        "Far",
        Vec2::new(20.0, 0.0),
        Facing::East,
        Traits::default(),
    );

    resolve_melee_attack(&mut world, attacker, victim, 1.0);

    let character = world.get(oblivious).unwrap();
    assert!(character.memories().is_empty());
    assert!(character.intent().is_none());
}

#[test]
fn the_allegiance_bonus_makes_a_soldier_care_about_minor_crimes() {
    let soldier = Character::new("Garrick", Vec2::default(), Zone::Exterior)
        .with_job(JobKind::Soldier)
        .with_allegiance("hollowvale")
        .with_traits(Traits::new(5, 9, 5, 5));
    // Morality 5 alone cares about nothing, 5 + 3 crosses the threshold
    assert!(will_care_about_crime(&soldier, Some("hollowvale"), CRIME_INTENSITY_THEFT));
    assert!(!will_care_about_crime(&soldier, Some("elsewhere"), CRIME_INTENSITY_THEFT));

    let villager = Character::new("Edda", Vec2::default(), Zone::Exterior)
        .with_allegiance("hollowvale")
        .with_traits(Traits::new(8, 9, 5, 5));
    assert!(
        !will_care_about_crime(&villager, Some("hollowvale"), CRIME_INTENSITY_THEFT),
        "a non-soldier needs a serious crime"
    );
    assert!(will_care_about_crime(&villager, None, CRIME_INTENSITY_MURDER));
}

#[test]
fn reporting_hands_the_memory_to_a_soldier_who_then_acts() {
    let mut world = World::new(9);
    let criminal = spawn(
        &mut world,
        "Sly",
        Vec2::new(30.0, 30.0),
        Facing::South,
        Traits::new(1, 8, 9, 5),
    );
    let reporter = spawn(
        &mut world,
        "Edda",
        Vec2::new(0.0, 0.0),
        Facing::East,
        Traits::new(8, 2, 5, 5),
    );
    world.get_mut(reporter).unwrap().allegiance = Some("hollowvale".into());
    world.get_mut(reporter).unwrap().add_memory(
        Memory::new(MemoryKind::Crime, criminal, 5, CRIME_INTENSITY_THEFT, MemorySource::Witnessed)
            .with_crime(CrimeType::Theft)
            .with_victim(reporter, Some("hollowvale".into())),
    );

    let soldier = world.spawn(
        Character::new("Garrick", Vec2::new(3.0, 0.0), Zone::Exterior)
            .with_job(JobKind::Soldier)
            .with_allegiance("hollowvale")
            .with_traits(Traits::new(5, 9, 5, 5)),
    );

    assert!(try_report_crimes(&mut world, reporter));

    // Reporter's copy is flagged, never removed
    let reporter_char = world.get(reporter).unwrap();
    assert_eq!(reporter_char.memories().unreported_crimes().count(), 0);
    assert_eq!(reporter_char.memories().len(), 1);

    // Soldier holds a told-by copy naming the informant, and reacts
    let soldier_char = world.get(soldier).unwrap();
    let copy = soldier_char
        .memories()
        .worst_crime_about(criminal)
        .expect("soldier learned of the crime");
    assert_eq!(copy.source, MemorySource::ToldBy);
    assert_eq!(copy.informant, Some(reporter));

    let intent = soldier_char.intent().expect("allegiance bonus makes the soldier act");
    assert_eq!(intent.action, IntentAction::Attack);
    assert_eq!(intent.target, criminal);
    assert_eq!(intent.reason, IntentReason::KnownCriminal);
}

#[test]
fn an_assault_victim_reports_its_attacker_to_a_soldier() {
    let mut world = World::new(9);
    let attacker = spawn(
        &mut world,
        "Brant",
        Vec2::new(30.0, 30.0),
        Facing::South,
        Traits::default(),
    );
    let victim = spawn(
        &mut world,
        "Edda",
        Vec2::new(0.0, 0.0),
        Facing::East,
        Traits::new(8, 2, 5, 5),
    );
    world.get_mut(victim).unwrap().allegiance = Some("hollowvale".into());
    world
        .get_mut(victim)
        .unwrap()
        .remember_attack(attacker, 0, CRIME_INTENSITY_ASSAULT);

    let soldier = world.spawn(
        Character::new("Garrick", Vec2::new(3.0, 0.0), Zone::Exterior)
            .with_job(JobKind::Soldier)
            .with_allegiance("hollowvale")
            .with_traits(Traits::new(5, 9, 5, 5)),
    );

    assert!(try_report_crimes(&mut world, victim), "being attacked is reportable");
    assert_eq!(world.get(victim).unwrap().memories().unreported_crimes().count(), 0);

    // The soldier now holds the attack as an assault against the reporter
    let soldier_char = world.get(soldier).unwrap();
    let copy = soldier_char
        .memories()
        .worst_crime_about(attacker)
        .expect("soldier learned of the assault");
    assert_eq!(copy.source, MemorySource::ToldBy);
    assert_eq!(copy.crime_type, Some(CrimeType::Assault));
    assert_eq!(copy.victim, Some(victim));
    assert_eq!(copy.informant, Some(victim));

    let intent = soldier_char
        .intent()
        .expect("an assault on its own allegiance moves the soldier");
    assert_eq!(intent.action, IntentAction::Attack);
    assert_eq!(intent.target, attacker);
    assert_eq!(intent.reason, IntentReason::KnownCriminal);
}

#[test]
fn reporting_needs_a_soldier_within_hearing() {
    let mut world = World::new(9);
    let criminal = spawn(&mut world, "Sly", Vec2::new(30.0, 30.0), Facing::South, Traits::default());
    let reporter = spawn(
        &mut world,
        "Edda",
        Vec2::new(0.0, 0.0),
        Facing::East,
        Traits::new(8, 2, 5, 5),
    );
    world.get_mut(reporter).unwrap().allegiance = Some("hollowvale".into());
    world.get_mut(reporter).unwrap().add_memory(
        Memory::new(MemoryKind::Crime, criminal, 5, CRIME_INTENSITY_THEFT, MemorySource::Witnessed)
            .with_crime(CrimeType::Theft),
    );

    let far = 2.0 * config().sound_radius + 1.0;
    world.spawn(
        Character::new("Garrick", Vec2::new(far, 0.0), Zone::Exterior)
            .with_job(JobKind::Soldier)
            .with_allegiance("hollowvale"),
    );

    assert!(!try_report_crimes(&mut world, reporter));
    assert_eq!(world.get(reporter).unwrap().memories().unreported_crimes().count(), 1);
}
