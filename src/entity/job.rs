//! Job kinds and per-job state
//!
//! Jobs are a closed enum; each kind maps to an ordered behavior chain in
//! `simulation::behavior`. There is no registry and no lookup by name.

use serde::{Deserialize, Serialize};

/// What a character does for a living
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, derive_more::Display,
)]
pub enum JobKind {
    /// Default behavior: survival, needs, wandering
    #[display(fmt = "villager")]
    Villager,
    /// Villager chain with farm work as the fallback action
    #[display(fmt = "farmer")]
    Farmer,
    /// Never flees above the health floor, confronts criminals, patrols
    #[display(fmt = "soldier")]
    Soldier,
}

impl JobKind {
    pub fn is_soldier(&self) -> bool {
        matches!(self, JobKind::Soldier)
    }
}

/// Phase of a soldier's patrol
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PatrolPhase {
    Marching,
    /// Paused at a waypoint, looking around
    Checking,
}

/// Soldier patrol progress, tick-counted (never wall-clock)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatrolState {
    pub waypoint_idx: usize,
    /// +1 or -1 through the waypoint list
    pub direction: i32,
    pub phase: PatrolPhase,
    /// Remaining ticks of the current checking pause
    pub wait_ticks: u32,
}

impl PatrolState {
    pub fn new(waypoint_idx: usize, direction: i32) -> Self {
        Self {
            waypoint_idx,
            direction,
            phase: PatrolPhase::Marching,
            wait_ticks: 0,
        }
    }

    /// Step to the next waypoint index, wrapping both directions
    pub fn advance(&mut self, waypoint_count: usize) {
        if waypoint_count == 0 {
            return;
        }
        let next = self.waypoint_idx as i64 + self.direction as i64;
        self.waypoint_idx = next.rem_euclid(waypoint_count as i64) as usize;
    }
}
