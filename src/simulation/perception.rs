//! Perception - who can see or hear whom
//!
//! Vision needs range, a facing cone, and a clear sight line; anything
//! closer than one cell is seen regardless of facing. Sound needs only
//! overlapping sound circles. Across zones, windows mediate vision and
//! nothing carries sound.
//!
//! This module is a pure predicate service; it never mutates state.

use crate::core::config::config;
use crate::core::types::{CharacterId, Vec2, Zone};
use crate::ecs::world::World;
use crate::entity::character::Character;
use crate::spatial::query::sight_line_blocked;
use crate::world::objects::Obstacle;
use crate::world::zone::{Interior, Window};

/// How a perception succeeded
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PerceptionMethod {
    Vision,
    Sound,
}

/// Can `observer` perceive `target` right now, and how?
///
/// Vision takes precedence when both senses succeed. Dead or missing
/// characters are imperceptible.
pub fn can_perceive(
    world: &World,
    observer: CharacterId,
    target: CharacterId,
) -> Option<PerceptionMethod> {
    let observer = world.get_living(observer)?;
    let target = world.get_living(target)?;

    if observer.zone == target.zone {
        let obstacles = world.map.obstacles_in_zone(observer.zone);
        if vision_check(
            observer.position,
            observer.facing.unit(),
            target.position,
            obstacles,
        ) {
            return Some(PerceptionMethod::Vision);
        }
        // Sound circles of equal radius overlap at up to twice the radius
        if observer.position.distance(&target.position) <= 2.0 * config().sound_radius {
            return Some(PerceptionMethod::Sound);
        }
        return None;
    }

    // Cross-zone: only window-mediated vision is possible
    if window_vision(world, observer, target) {
        Some(PerceptionMethod::Vision)
    } else {
        None
    }
}

/// Can `witness` perceive an event (a sound/sight source that is not a
/// character) at `event_pos` in `event_zone`?
///
/// Perceived when the witness's vision reaches the event's circle, or the
/// witness's sound circle overlaps it. Events do not cross zones.
pub fn can_perceive_event(
    world: &World,
    witness: CharacterId,
    event_pos: Vec2,
    event_sound_radius: f32,
    event_zone: Zone,
) -> bool {
    let witness = match world.get_living(witness) {
        Some(w) => w,
        None => return false,
    };
    if witness.zone != event_zone {
        return false;
    }

    let distance = witness.position.distance(&event_pos);
    if distance <= config().sound_radius + event_sound_radius {
        return true;
    }

    // Vision against the event's circle: widen the cone test by the
    // angle the circle subtends at this distance.
    let cfg = config();
    if distance > cfg.vision_range {
        return false;
    }
    if distance >= cfg.auto_visible_distance {
        let to_event = (event_pos - witness.position).normalize();
        let cos_angle = witness.facing.unit().dot(&to_event).clamp(-1.0, 1.0);
        let slack = if distance > 1e-3 {
            (event_sound_radius / distance).atan()
        } else {
            0.0
        };
        if cos_angle.acos() > cfg.vision_cone_angle / 2.0 + slack {
            return false;
        }
    }
    !sight_line_blocked(
        witness.position,
        event_pos,
        world.map.obstacles_in_zone(witness.zone),
    )
}

/// Same-zone vision test: range, auto-visibility, facing cone, sight line
fn vision_check(
    observer_pos: Vec2,
    observer_facing: Vec2,
    target_pos: Vec2,
    obstacles: &[Obstacle],
) -> bool {
    let cfg = config();
    let distance = observer_pos.distance(&target_pos);
    if distance > cfg.vision_range {
        return false;
    }

    if distance >= cfg.auto_visible_distance {
        let to_target = (target_pos - observer_pos).normalize();
        let cos_angle = observer_facing.dot(&to_target).clamp(-1.0, 1.0);
        if cos_angle.acos() > cfg.vision_cone_angle / 2.0 {
            return false;
        }
    }

    !sight_line_blocked(observer_pos, target_pos, obstacles)
}

/// Cross-zone vision through a window of the interior involved
///
/// The observer must stand near its own side of the window; the vision
/// cone is then re-rooted at the window, looking through it.
fn window_vision(world: &World, observer: &Character, target: &Character) -> bool {
    match (observer.zone, target.zone) {
        (Zone::Exterior, Zone::Interior(id)) => {
            let Some(interior) = world.map.get_interior(id) else {
                return false;
            };
            interior.windows.iter().any(|window| {
                interior.is_near_window_exterior(window, observer.position)
                    && looks_into_interior(interior, window, target.position)
            })
        }
        (Zone::Interior(id), Zone::Exterior) => {
            let Some(interior) = world.map.get_interior(id) else {
                return false;
            };
            interior.windows.iter().any(|window| {
                interior.is_near_window_interior(window, observer.position)
                    && looks_out_of_interior(world, interior, window, target.position)
            })
        }
        // Interior-to-interior has no connecting window
        _ => false,
    }
}

/// Vision test apexed at the window's interior anchor, facing inward
fn looks_into_interior(interior: &Interior, window: &Window, target_local: Vec2) -> bool {
    let inward = window.facing.unit() * -1.0;
    vision_check(
        window.interior_anchor,
        inward,
        target_local,
        &interior.obstacles,
    )
}

/// Vision test apexed at the window's exterior look point, facing outward
fn looks_out_of_interior(
    world: &World,
    interior: &Interior,
    window: &Window,
    target_world: Vec2,
) -> bool {
    vision_check(
        interior.window_exterior_look(window),
        window.facing.unit(),
        target_world,
        world.map.obstacles_in_zone(Zone::Exterior),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::Facing;
    use crate::entity::character::Character;

    fn spawn_at(world: &mut World, pos: Vec2, facing: Facing) -> CharacterId {
        let mut character = Character::new("test", pos, Zone::Exterior);
        character.facing = facing;
        world.spawn(character)
    }

    #[test]
    fn test_facing_target_in_range_is_visible() {
        let mut world = World::new(1);
        let observer = spawn_at(&mut world, Vec2::new(0.0, 0.0), Facing::East);
        let target = spawn_at(&mut world, Vec2::new(5.0, 0.0), Facing::West);
        assert_eq!(
            can_perceive(&world, observer, target),
            Some(PerceptionMethod::Vision)
        );
    }

    #[test]
    fn test_behind_the_back_falls_to_sound() {
        let mut world = World::new(1);
        let observer = spawn_at(&mut world, Vec2::new(0.0, 0.0), Facing::East);
        // Directly behind, well within double sound radius
        let target = spawn_at(&mut world, Vec2::new(-5.0, 0.0), Facing::East);
        assert_eq!(
            can_perceive(&world, observer, target),
            Some(PerceptionMethod::Sound)
        );
    }

    #[test]
    fn test_point_blank_is_visible_regardless_of_facing() {
        let mut world = World::new(1);
        let observer = spawn_at(&mut world, Vec2::new(0.0, 0.0), Facing::East);
        let target = spawn_at(&mut world, Vec2::new(-0.6, 0.0), Facing::East);
        assert_eq!(
            can_perceive(&world, observer, target),
            Some(PerceptionMethod::Vision)
        );
    }

    #[test]
    fn test_dead_characters_are_imperceptible() {
        let mut world = World::new(1);
        let observer = spawn_at(&mut world, Vec2::new(0.0, 0.0), Facing::East);
        let target = spawn_at(&mut world, Vec2::new(5.0, 0.0), Facing::West);
        world.get_mut(target).unwrap().health = 0;
        assert_eq!(can_perceive(&world, observer, target), None);
    }

    #[test]
    fn test_event_heard_through_overlapping_circles() {
        let mut world = World::new(1);
        // Facing away from the event; hearing alone must carry it
        let witness = spawn_at(&mut world, Vec2::new(0.0, 0.0), Facing::West);
        assert!(can_perceive_event(
            &world,
            witness,
            Vec2::new(10.0, 0.0),
            6.0,
            Zone::Exterior
        ));
        assert!(
            !can_perceive_event(&world, witness, Vec2::new(30.0, 0.0), 6.0, Zone::Exterior),
            "event outside both senses should be missed"
        );
    }
}
