//! Perception rules across a realistic map: cones, sound, obstacles, windows

use hollowvale::core::types::{Facing, InteriorId, Vec2, Zone};
use hollowvale::ecs::world::World;
use hollowvale::entity::character::Character;
use hollowvale::simulation::perception::{can_perceive, PerceptionMethod};
use hollowvale::world::objects::{Obstacle, WorldMap};
use hollowvale::world::zone::{Interior, Window};

fn spawn(world: &mut World, pos: Vec2, zone: Zone, facing: Facing) -> hollowvale::core::types::CharacterId {
    let mut character = Character::new("c", pos, zone);
    character.facing = facing;
    world.spawn(character)
}

fn cottage() -> Interior {
    // Footprint x 10..14, y 20..23; east window at world (13.75, 21.5),
    // exterior look point (14.25, 21.5)
    Interior {
        id: InteriorId(0),
        name: "cottage".into(),
        exterior_origin: Vec2::new(10.0, 20.0),
        exterior_extent: Vec2::new(4.0, 3.0),
        interior_extent: Vec2::new(8.0, 6.0),
        door: Vec2::new(4.0, 5.5),
        windows: vec![Window { facing: Facing::East, interior_anchor: Vec2::new(7.5, 3.0) }],
        obstacles: vec![],
    }
}

#[test]
fn vision_beats_sound_in_front_sound_covers_the_back() {
    let mut world = World::new(1);
    let observer = spawn(&mut world, Vec2::new(0.0, 0.0), Zone::Exterior, Facing::East);
    let in_front = spawn(&mut world, Vec2::new(8.0, 0.0), Zone::Exterior, Facing::West);
    let behind = spawn(&mut world, Vec2::new(-8.0, 0.0), Zone::Exterior, Facing::East);
    let far_behind = spawn(&mut world, Vec2::new(-13.0, 0.0), Zone::Exterior, Facing::East);

    assert_eq!(can_perceive(&world, observer, in_front), Some(PerceptionMethod::Vision));
    assert_eq!(can_perceive(&world, observer, behind), Some(PerceptionMethod::Sound));
    assert_eq!(
        can_perceive(&world, observer, far_behind),
        None,
        "13 units is outside the doubled 6-unit sound radius"
    );
}

#[test]
fn an_obstacle_blocks_sight_but_not_hearing() {
    let mut map = WorldMap::default();
    map.exterior_obstacles.push(Obstacle::tree(Vec2::new(5.0, 0.0)));
    let mut world = World::new(1).with_map(map);

    let observer = spawn(&mut world, Vec2::new(0.0, 0.0), Zone::Exterior, Facing::East);
    let near = spawn(&mut world, Vec2::new(10.0, 0.0), Zone::Exterior, Facing::West);
    assert_eq!(
        can_perceive(&world, observer, near),
        Some(PerceptionMethod::Sound),
        "the tree blocks the sight line, hearing still carries"
    );
}

#[test]
fn an_endpoint_hugging_obstacle_does_not_blind_its_owner() {
    let mut map = WorldMap::default();
    // A tree the observer is standing right next to
    map.exterior_obstacles.push(Obstacle::tree(Vec2::new(0.5, 0.0)));
    let mut world = World::new(1).with_map(map);

    let observer = spawn(&mut world, Vec2::new(0.0, 0.0), Zone::Exterior, Facing::East);
    let target = spawn(&mut world, Vec2::new(8.0, 0.0), Zone::Exterior, Facing::West);
    assert_eq!(can_perceive(&world, observer, target), Some(PerceptionMethod::Vision));
}

#[test]
fn a_window_carries_vision_out_of_an_interior() {
    let mut map = WorldMap::default();
    map.interiors.push(cottage());
    let mut world = World::new(1).with_map(map);
    let inside = Zone::Interior(InteriorId(0));

    // Standing by the window, looking out east
    let observer = spawn(&mut world, Vec2::new(7.0, 3.0), inside, Facing::East);
    let east_of_window = spawn(&mut world, Vec2::new(18.0, 21.5), Zone::Exterior, Facing::West);
    let west_of_building = spawn(&mut world, Vec2::new(5.0, 21.5), Zone::Exterior, Facing::East);

    assert_eq!(
        can_perceive(&world, observer, east_of_window),
        Some(PerceptionMethod::Vision)
    );
    assert_eq!(
        can_perceive(&world, observer, west_of_building),
        None,
        "the window only looks the way it faces"
    );
}

#[test]
fn a_window_carries_vision_into_an_interior() {
    let mut map = WorldMap::default();
    map.interiors.push(cottage());
    let mut world = World::new(1).with_map(map);
    let inside = Zone::Interior(InteriorId(0));

    let peeper = spawn(&mut world, Vec2::new(15.0, 21.5), Zone::Exterior, Facing::West);
    let near_window = spawn(&mut world, Vec2::new(5.5, 3.0), inside, Facing::East);
    assert_eq!(can_perceive(&world, peeper, near_window), Some(PerceptionMethod::Vision));

    // Same exterior position but too far from the window's look point
    let distant = spawn(&mut world, Vec2::new(20.0, 21.5), Zone::Exterior, Facing::West);
    assert_eq!(can_perceive(&world, distant, near_window), None);
}

#[test]
fn sound_never_crosses_a_zone_boundary() {
    let mut map = WorldMap::default();
    map.interiors.push(cottage());
    let mut world = World::new(1).with_map(map);
    let inside = Zone::Interior(InteriorId(0));

    // Adjacent through the south wall, nowhere near the window
    let outside = spawn(&mut world, Vec2::new(12.0, 23.5), Zone::Exterior, Facing::North);
    let interior = spawn(&mut world, Vec2::new(4.0, 5.0), inside, Facing::South);
    assert_eq!(can_perceive(&world, outside, interior), None);
    assert_eq!(can_perceive(&world, interior, outside), None);
}
