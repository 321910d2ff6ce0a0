//! The single authoritative "what is this character doing and why" slot

use serde::{Deserialize, Serialize};

use crate::core::types::{CharacterId, Tick};

/// What the character is doing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, derive_more::Display)]
pub enum IntentAction {
    #[display(fmt = "attack")]
    Attack,
    #[display(fmt = "flee")]
    Flee,
    #[display(fmt = "watch")]
    Watch,
    #[display(fmt = "follow")]
    Follow,
}

/// Why the character is doing it
///
/// Bystander-reason intents self-expire once the target can no longer be
/// perceived; the other reasons persist because a memory backs them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IntentReason {
    /// Saw the target commit a crime
    WitnessedCrime,
    /// Was attacked by the target
    Attacked,
    /// Remembers the target as a criminal
    KnownCriminal,
    /// Keeping an eye on a threat from a safe distance
    MonitoringThreat,
    /// Reacting only to violence seen nearby, no knowledge of guilt
    Bystander,
}

impl IntentReason {
    /// Whether this intent evaporates when perception of the target is lost
    pub fn expires_on_perception_loss(&self) -> bool {
        matches!(self, IntentReason::Bystander)
    }
}

/// One character's current intent
///
/// The target is a handle, never an owning reference; it is resolved
/// against the live-character registry on every use.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Intent {
    pub action: IntentAction,
    pub target: CharacterId,
    pub reason: IntentReason,
    pub started_tick: Tick,
}
