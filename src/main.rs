//! Demo shell: build a small village, run it, watch what happens

use std::io::{self, BufRead, Write};

use clap::Parser;
use tracing_subscriber::EnvFilter;

use hollowvale::combat::weapons::Weapon;
use hollowvale::core::config::{set_config, SimulationConfig};
use hollowvale::core::error::Result;
use hollowvale::core::types::{Facing, InteriorId, Vec2, Zone};
use hollowvale::ecs::world::World;
use hollowvale::entity::character::{Character, Traits};
use hollowvale::entity::job::JobKind;
use hollowvale::simulation::tick::run_simulation_tick;
use hollowvale::world::objects::{FarmCell, Obstacle, WorldMap};
use hollowvale::world::zone::{Interior, Window};

#[derive(Parser, Debug)]
#[command(name = "hollowvale", about = "Village simulation behavioral core")]
struct Args {
    /// RNG seed; the same seed replays the same run
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Ticks to run before printing the final status
    #[arg(long, default_value_t = 2000)]
    ticks: u64,

    /// Optional TOML config file overriding the tuned defaults
    #[arg(long)]
    config: Option<std::path::PathBuf>,

    /// Drop into the command shell instead of running to completion
    #[arg(long)]
    interactive: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("hollowvale=info")),
        )
        .init();

    let args = Args::parse();
    if let Some(path) = &args.config {
        let cfg = SimulationConfig::load(path)?;
        if set_config(cfg).is_err() {
            tracing::warn!("config already initialized; file ignored");
        }
    }

    let mut world = demo_world(args.seed);
    if args.interactive {
        run_shell(&mut world)?;
    } else {
        run_batch(&mut world, args.ticks);
    }
    Ok(())
}

fn run_batch(world: &mut World, ticks: u64) {
    for _ in 0..ticks {
        for event in run_simulation_tick(world) {
            println!("[{:>6}] {}", world.current_tick, event);
        }
    }
    print_status(world);
}

fn run_shell(world: &mut World) -> Result<()> {
    println!("commands: tick [n] (t), status (s), quit (q)");
    let stdin = io::stdin();
    loop {
        print!("> ");
        io::stdout().flush()?;
        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        let mut parts = line.split_whitespace();
        match parts.next() {
            Some("tick") | Some("t") => {
                let n: u64 = parts.next().and_then(|s| s.parse().ok()).unwrap_or(1);
                for _ in 0..n {
                    for event in run_simulation_tick(world) {
                        println!("[{:>6}] {}", world.current_tick, event);
                    }
                }
                println!("tick {}", world.current_tick);
            }
            Some("status") | Some("s") => print_status(world),
            Some("quit") | Some("q") => break,
            Some(other) => println!("unknown command: {other}"),
            None => {}
        }
    }
    Ok(())
}

fn print_status(world: &World) {
    println!("tick {} | {} living, {} dead", world.current_tick, world.living().count(), world.corpses.len());
    for character in world.living() {
        let intent = character
            .intent()
            .map(|i| format!("{} ({:?})", i.action, i.reason))
            .unwrap_or_else(|| "-".into());
        println!(
            "  {:<10} {:<9} hp {:>3}  hunger {:>5.1}  pos ({:>5.1},{:>5.1})  intent {}",
            character.name,
            character.job.to_string(),
            character.health,
            character.hunger,
            character.position.x,
            character.position.y,
            intent,
        );
    }
    for corpse in &world.corpses {
        println!("  {:<10} dead since tick {}", corpse.name, corpse.died_tick);
    }
}

/// A small village: a cottage with a window and a stove, a farm, a patrol
/// route, and a handful of characters whose traits make something happen.
fn demo_world(seed: u64) -> World {
    let mut map = WorldMap::default();

    for pos in [Vec2::new(6.0, 9.0), Vec2::new(14.0, 14.0), Vec2::new(22.0, 8.0)] {
        map.exterior_obstacles.push(Obstacle::tree(pos));
    }
    map.exterior_obstacles.push(Obstacle::stove(Vec2::new(12.0, 10.0)));

    map.interiors.push(Interior {
        id: InteriorId(0),
        name: "mill cottage".into(),
        exterior_origin: Vec2::new(20.0, 20.0),
        exterior_extent: Vec2::new(4.0, 3.0),
        interior_extent: Vec2::new(8.0, 6.0),
        door: Vec2::new(4.0, 5.5),
        windows: vec![Window { facing: Facing::East, interior_anchor: Vec2::new(7.5, 3.0) }],
        obstacles: vec![Obstacle::stove(Vec2::new(1.0, 1.0))],
    });

    map.patrol_waypoints = vec![
        Vec2::new(5.0, 5.0),
        Vec2::new(25.0, 5.0),
        Vec2::new(25.0, 25.0),
        Vec2::new(5.0, 25.0),
    ];

    for x in 0..3 {
        let mut cell = FarmCell::new(Vec2::new(7.0 + x as f32 * 1.5, 18.0), 600);
        cell.home = Some("north farm".into());
        map.farm_cells.push(cell);
    }
    map.farm_cells.push(FarmCell::new(Vec2::new(16.0, 22.0), 900));

    let mut world = World::new(seed).with_map(map);

    world.spawn(
        Character::new("Hubert", Vec2::new(8.0, 17.0), Zone::Exterior)
            .with_job(JobKind::Farmer)
            .with_allegiance("hollowvale")
            .with_traits(Traits::new(7, 4, 4, 5)),
    );
    let mut marta = Character::new("Marta", Vec2::new(12.0, 12.0), Zone::Exterior)
        .with_allegiance("hollowvale")
        .with_traits(Traits::new(8, 3, 5, 6));
    marta.home = Some("mill cottage".into());
    world.spawn(marta);
    world.spawn(
        Character::new("Edda", Vec2::new(10.0, 8.0), Zone::Exterior)
            .with_allegiance("hollowvale")
            .with_traits(Traits::new(8, 2, 6, 5)),
    );
    world.spawn(
        Character::new("Garrick", Vec2::new(5.0, 5.0), Zone::Exterior)
            .with_job(JobKind::Soldier)
            .with_allegiance("hollowvale")
            .with_weapon(Weapon::sword())
            .with_traits(Traits::new(8, 9, 4, 4)),
    );
    // The troublemaker: hungry, amoral, and bold enough to act on it
    let mut sly = Character::new("Sly", Vec2::new(18.0, 18.0), Zone::Exterior)
        .with_traits(Traits::new(1, 8, 9, 3));
    sly.hunger = 35.0;
    world.spawn(sly);

    world.rebuild_grid();
    world
}
