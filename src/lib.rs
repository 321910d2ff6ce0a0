//! Hollowvale: the behavioral core of an agent-based village simulation
//!
//! Characters perceive each other through vision cones, sound circles, and
//! windows; remember crimes and report them to soldiers; fight through a
//! tick-counted pending-attack queue; and pick what to do each tick from a
//! priority-ordered behavior chain per job.
//!
//! The crate is deterministic for a given seed: one thread, one seeded RNG
//! owned by the world, no wall-clock time anywhere in the rules.
//!
//! Module map:
//! - [`core`]: ids, vectors, zones, config, errors
//! - [`world`]: static map content - interiors, windows, obstacles, farmland
//! - [`spatial`]: sparse hash grid and geometric queries
//! - [`entity`]: characters, memory, intent, jobs
//! - [`combat`]: weapons and the pending-attack resolver
//! - [`simulation`]: perception, crime, needs, behavior, and the tick loop
//! - [`ecs`]: the world state that owns everything

pub mod combat;
pub mod core;
pub mod ecs;
pub mod entity;
pub mod simulation;
pub mod spatial;
pub mod world;
