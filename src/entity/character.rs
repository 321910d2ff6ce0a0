//! The Character entity: typed fields, guarded intent and memory state
//!
//! Intent and memory are private; all mutation goes through `set_intent`,
//! `clear_intent`, and `add_memory`/`mark_memory_reported`, which is what
//! upholds the one-active-intent and append-plus-flag-only invariants.

use ahash::AHashMap;
use serde::{Deserialize, Serialize};

use crate::combat::weapons::Weapon;
use crate::core::config::config;
use crate::core::types::{CharacterId, Facing, Tick, Vec2, Zone};
use crate::entity::intent::{Intent, IntentAction, IntentReason};
use crate::entity::job::{JobKind, PatrolState};
use crate::entity::memory::{Memory, MemoryKind, MemorySource, MemoryStore};

pub const MAX_HEALTH: i32 = 100;

/// Carryable goods
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, derive_more::Display)]
pub enum Item {
    #[display(fmt = "wheat")]
    Wheat,
    #[display(fmt = "bread")]
    Bread,
    #[display(fmt = "coin")]
    Coin,
}

/// Typed item counts
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Inventory {
    items: AHashMap<Item, u32>,
}

impl Inventory {
    pub fn count(&self, item: Item) -> u32 {
        self.items.get(&item).copied().unwrap_or(0)
    }

    pub fn add(&mut self, item: Item, amount: u32) {
        *self.items.entry(item).or_insert(0) += amount;
    }

    /// Remove up to `amount`; returns how many were actually removed
    pub fn remove(&mut self, item: Item, amount: u32) -> u32 {
        let have = self.count(item);
        let taken = have.min(amount);
        if taken == have {
            self.items.remove(&item);
        } else if taken > 0 {
            self.items.insert(item, have - taken);
        }
        taken
    }

    pub fn is_empty(&self) -> bool {
        self.items.values().all(|&n| n == 0)
    }

    /// Move everything out of `other` into self (loot transfer)
    pub fn take_all_from(&mut self, other: &mut Inventory) {
        for (item, amount) in other.items.drain() {
            *self.items.entry(item).or_insert(0) += amount;
        }
    }
}

/// Personality traits; only morality ever changes after creation
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Traits {
    /// Mutable: erodes under starvation
    pub morality: i32,
    pub confidence: i32,
    pub cunning: i32,
    pub attractiveness: i32,
}

impl Traits {
    pub fn new(morality: i32, confidence: i32, cunning: i32, attractiveness: i32) -> Self {
        Self { morality, confidence, cunning, attractiveness }
    }
}

impl Default for Traits {
    fn default() -> Self {
        Self { morality: 5, confidence: 5, cunning: 5, attractiveness: 5 }
    }
}

/// One simulated person
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Character {
    pub id: CharacterId,
    pub name: String,
    /// Position in the current zone's coordinate space
    pub position: Vec2,
    pub zone: Zone,
    pub facing: Facing,
    pub traits: Traits,
    pub health: i32,
    pub hunger: f32,
    pub stamina: f32,
    pub inventory: Inventory,
    pub weapon: Option<Weapon>,
    /// Raised guard: incoming melee strikes inside the block cone are negated
    pub is_blocking: bool,
    /// Direction of the guard (and of aimed swings), in radians; the facing
    /// angle is used when unset
    pub aim_angle: Option<f32>,
    /// Derived each tick from the current intent
    pub combat_mode: bool,
    pub job: JobKind,
    pub allegiance: Option<String>,
    /// Where the movement stepper should head, in the current zone's space
    pub goal: Option<Vec2>,
    pub home: Option<String>,
    pub is_sleeping: bool,
    /// Starvation freeze: can only wait to be fed
    pub is_frozen: bool,
    /// Ticks until the next attack may be declared
    pub attack_cooldown: u32,
    /// Ticks spent starving, for morality-erosion pacing
    pub starving_ticks: u64,
    pub patrol: Option<PatrolState>,
    intent: Option<Intent>,
    memories: MemoryStore,
}

impl Character {
    pub fn new(name: impl Into<String>, position: Vec2, zone: Zone) -> Self {
        Self {
            id: CharacterId::new(),
            name: name.into(),
            position,
            zone,
            facing: Facing::South,
            traits: Traits::default(),
            health: MAX_HEALTH,
            hunger: config().max_hunger,
            stamina: 100.0,
            inventory: Inventory::default(),
            weapon: None,
            is_blocking: false,
            aim_angle: None,
            combat_mode: false,
            job: JobKind::Villager,
            allegiance: None,
            goal: None,
            home: None,
            is_sleeping: false,
            is_frozen: false,
            attack_cooldown: 0,
            starving_ticks: 0,
            patrol: None,
            intent: None,
            memories: MemoryStore::default(),
        }
    }

    pub fn with_traits(mut self, traits: Traits) -> Self {
        self.traits = traits;
        self
    }

    pub fn with_job(mut self, job: JobKind) -> Self {
        self.job = job;
        self
    }

    pub fn with_allegiance(mut self, allegiance: impl Into<String>) -> Self {
        self.allegiance = Some(allegiance.into());
        self
    }

    pub fn with_weapon(mut self, weapon: Weapon) -> Self {
        self.weapon = Some(weapon);
        self
    }

    pub fn is_alive(&self) -> bool {
        self.health > 0
    }

    // === INTENT (single authoritative slot) ===

    pub fn intent(&self) -> Option<&Intent> {
        self.intent.as_ref()
    }

    /// Replace the active intent. There is never more than one.
    pub fn set_intent(
        &mut self,
        action: IntentAction,
        target: CharacterId,
        reason: IntentReason,
        started_tick: Tick,
    ) {
        self.intent = Some(Intent { action, target, reason, started_tick });
    }

    /// Cancel the active intent; forces re-evaluation next tick
    pub fn clear_intent(&mut self) {
        self.intent = None;
    }

    /// Clear only a passive bystander intent (done when the holder is hit,
    /// so it re-evaluates as a victim instead of an onlooker)
    pub fn clear_bystander_intent(&mut self) {
        if self
            .intent
            .map(|i| i.reason == IntentReason::Bystander)
            .unwrap_or(false)
        {
            self.intent = None;
        }
    }

    // === MEMORY (append plus reported-flag only) ===

    pub fn memories(&self) -> &MemoryStore {
        &self.memories
    }

    pub fn add_memory(&mut self, memory: Memory) {
        self.memories.add(memory);
    }

    pub fn mark_memory_reported(&mut self, index: usize) {
        self.memories.mark_reported(index);
    }

    /// Record being attacked; idempotent per attacker
    pub fn remember_attack(&mut self, attacker: CharacterId, tick: Tick, intensity: i32) {
        if self.memories.has_memory_of(MemoryKind::AttackedBy, attacker) {
            return;
        }
        self.memories.add(Memory::new(
            MemoryKind::AttackedBy,
            attacker,
            tick,
            intensity,
            MemorySource::Experienced,
        ));
    }

    /// Does this character remember the subject committing any crime?
    pub fn knows_criminal(&self, subject: CharacterId) -> bool {
        self.memories.has_memory_of(MemoryKind::Crime, subject)
    }

    /// Has this character knowingly committed a crime?
    pub fn is_criminal(&self) -> bool {
        self.memories
            .iter()
            .any(|m| m.kind == MemoryKind::CommittedCrime)
    }
}
