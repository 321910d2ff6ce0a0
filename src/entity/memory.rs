//! Per-character memory: an append-only log with a mutable reported flag
//!
//! Memories are never edited or pruned after creation; the single
//! exception is `reported`, which flips once when the memory has been
//! passed to a soldier. Holding the store private behind these methods is
//! what enforces that.

use serde::{Deserialize, Serialize};

use crate::core::types::{CharacterId, Tick};

/// What a memory records
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MemoryKind {
    /// Someone else committed a crime (subject = the criminal)
    Crime,
    /// The holder committed a crime (subject = the holder)
    CommittedCrime,
    /// The holder was attacked (subject = the attacker)
    AttackedBy,
}

/// How the holder learned about the event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MemorySource {
    Witnessed,
    Heard,
    ToldBy,
    SelfKnowledge,
    Experienced,
}

/// Category of crime, ordered by severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, derive_more::Display)]
pub enum CrimeType {
    #[display(fmt = "theft")]
    Theft,
    #[display(fmt = "assault")]
    Assault,
    #[display(fmt = "murder")]
    Murder,
}

/// A single remembered event
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Memory {
    pub kind: MemoryKind,
    /// Who this memory is about
    pub subject: CharacterId,
    pub tick: Tick,
    /// Severity; doubles as the event's perceptual/caring radius
    pub intensity: i32,
    pub source: MemorySource,
    /// Whether this memory has been passed on to a soldier
    pub reported: bool,
    pub crime_type: Option<CrimeType>,
    pub victim: Option<CharacterId>,
    pub victim_allegiance: Option<String>,
    /// Who told the holder, for ToldBy memories
    pub informant: Option<CharacterId>,
}

impl Memory {
    pub fn new(
        kind: MemoryKind,
        subject: CharacterId,
        tick: Tick,
        intensity: i32,
        source: MemorySource,
    ) -> Self {
        Self {
            kind,
            subject,
            tick,
            intensity,
            source,
            reported: false,
            crime_type: None,
            victim: None,
            victim_allegiance: None,
            informant: None,
        }
    }

    pub fn with_crime(mut self, crime_type: CrimeType) -> Self {
        self.crime_type = Some(crime_type);
        self
    }

    pub fn with_victim(mut self, victim: CharacterId, allegiance: Option<String>) -> Self {
        self.victim = Some(victim);
        self.victim_allegiance = allegiance;
        self
    }

    pub fn with_informant(mut self, informant: CharacterId) -> Self {
        self.informant = Some(informant);
        self
    }
}

/// Append-only memory log
///
/// Unbounded for the lifetime of the character. Capacity bounding is a
/// deliberate non-feature; see DESIGN.md.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MemoryStore {
    entries: Vec<Memory>,
}

impl MemoryStore {
    pub fn add(&mut self, memory: Memory) {
        self.entries.push(memory);
    }

    pub fn iter(&self) -> impl Iterator<Item = &Memory> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Does the holder already have a memory of this kind about this subject?
    pub fn has_memory_of(&self, kind: MemoryKind, subject: CharacterId) -> bool {
        self.entries
            .iter()
            .any(|m| m.kind == kind && m.subject == subject)
    }

    /// All crime memories about one subject
    pub fn crimes_about(&self, subject: CharacterId) -> impl Iterator<Item = &Memory> {
        self.entries
            .iter()
            .filter(move |m| m.kind == MemoryKind::Crime && m.subject == subject)
    }

    /// The highest-intensity crime memory about one subject
    pub fn worst_crime_about(&self, subject: CharacterId) -> Option<&Memory> {
        self.crimes_about(subject).max_by_key(|m| m.intensity)
    }

    /// Crime and attacked-by memories not yet passed to a soldier
    ///
    /// Being attacked is reportable like a witnessed crime; the holder is
    /// the victim.
    pub fn unreported_crimes(&self) -> impl Iterator<Item = (usize, &Memory)> {
        self.entries.iter().enumerate().filter(|(_, m)| {
            matches!(m.kind, MemoryKind::Crime | MemoryKind::AttackedBy) && !m.reported
        })
    }

    /// Flip the reported flag on one entry (the only permitted mutation)
    pub fn mark_reported(&mut self, index: usize) {
        if let Some(memory) = self.entries.get_mut(index) {
            memory.reported = true;
        }
    }

    /// The most recent AttackedBy memory, if any
    pub fn latest_attacker(&self) -> Option<&Memory> {
        self.entries
            .iter()
            .filter(|m| m.kind == MemoryKind::AttackedBy)
            .max_by_key(|m| m.tick)
    }
}
