//! World state - the single owner of all characters and shared simulation
//! state. Every cross-character reference is a `CharacterId` resolved here.

use ahash::AHashMap;
use rand_chacha::rand_core::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::combat::resolver::PendingAttack;
use crate::core::config::config;
use crate::core::types::{CharacterId, Tick, Vec2, Zone};
use crate::entity::character::{Character, Inventory};
use crate::simulation::tick::SimulationEvent;
use crate::spatial::sparse_hash::SparseHashGrid;
use crate::world::objects::WorldMap;

/// What remains of a dead character
#[derive(Debug, Clone)]
pub struct Corpse {
    pub name: String,
    pub position: Vec2,
    pub zone: Zone,
    /// Whatever the killer did not loot
    pub inventory: Inventory,
    pub died_tick: Tick,
}

/// The simulation world
pub struct World {
    pub current_tick: Tick,
    characters: Vec<Character>,
    id_to_idx: AHashMap<CharacterId, usize>,
    pub corpses: Vec<Corpse>,
    pub map: WorldMap,
    pub grid: SparseHashGrid,
    /// Declared attacks awaiting their animation countdown
    pub pending_attacks: Vec<PendingAttack>,
    pub rng: ChaCha8Rng,
    events: Vec<SimulationEvent>,
}

impl World {
    pub fn new(seed: u64) -> Self {
        Self {
            current_tick: 0,
            characters: Vec::new(),
            id_to_idx: AHashMap::new(),
            corpses: Vec::new(),
            map: WorldMap::default(),
            grid: SparseHashGrid::new(config().grid_cell_size),
            pending_attacks: Vec::new(),
            rng: ChaCha8Rng::seed_from_u64(seed),
            events: Vec::new(),
        }
    }

    pub fn with_map(mut self, map: WorldMap) -> Self {
        self.map = map;
        self
    }

    // === CHARACTERS ===

    pub fn spawn(&mut self, character: Character) -> CharacterId {
        let id = character.id;
        self.id_to_idx.insert(id, self.characters.len());
        self.grid.insert(id, character.position);
        self.characters.push(character);
        id
    }

    /// Look up a living or dying character (still in the live set)
    pub fn get(&self, id: CharacterId) -> Option<&Character> {
        self.id_to_idx.get(&id).map(|&i| &self.characters[i])
    }

    pub fn get_mut(&mut self, id: CharacterId) -> Option<&mut Character> {
        let idx = *self.id_to_idx.get(&id)?;
        Some(&mut self.characters[idx])
    }

    /// Look up only if the character is alive - the check that keeps
    /// same-tick kills from being targeted later in the tick
    pub fn get_living(&self, id: CharacterId) -> Option<&Character> {
        self.get(id).filter(|c| c.is_alive())
    }

    pub fn is_alive(&self, id: CharacterId) -> bool {
        self.get(id).map(|c| c.is_alive()).unwrap_or(false)
    }

    pub fn characters(&self) -> impl Iterator<Item = &Character> {
        self.characters.iter()
    }

    pub fn characters_mut(&mut self) -> impl Iterator<Item = &mut Character> {
        self.characters.iter_mut()
    }

    pub fn living(&self) -> impl Iterator<Item = &Character> {
        self.characters.iter().filter(|c| c.is_alive())
    }

    pub fn living_ids(&self) -> Vec<CharacterId> {
        self.characters
            .iter()
            .filter(|c| c.is_alive())
            .map(|c| c.id)
            .collect()
    }

    pub fn population(&self) -> usize {
        self.characters.len()
    }

    /// Borrow two distinct characters mutably at once
    pub fn get_pair_mut(
        &mut self,
        a: CharacterId,
        b: CharacterId,
    ) -> Option<(&mut Character, &mut Character)> {
        let ia = *self.id_to_idx.get(&a)?;
        let ib = *self.id_to_idx.get(&b)?;
        if ia == ib {
            return None;
        }
        if ia < ib {
            let (left, right) = self.characters.split_at_mut(ib);
            Some((&mut left[ia], &mut right[0]))
        } else {
            let (left, right) = self.characters.split_at_mut(ia);
            Some((&mut right[0], &mut left[ib]))
        }
    }

    // === DEATH ===

    /// Convert every dead character into a corpse, exactly once, and drop
    /// it from the live set. Pending attacks by or against the dead are
    /// discarded.
    pub fn process_deaths(&mut self) {
        let died_tick = self.current_tick;
        let mut removed = Vec::new();
        self.characters.retain_mut(|character| {
            if character.is_alive() {
                return true;
            }
            let mut inventory = Inventory::default();
            inventory.take_all_from(&mut character.inventory);
            removed.push(character.id);
            self.corpses.push(Corpse {
                name: character.name.clone(),
                position: character.position,
                zone: character.zone,
                inventory,
                died_tick,
            });
            false
        });

        if removed.is_empty() {
            return;
        }

        self.pending_attacks.retain(|p| {
            !removed.contains(&p.attacker) && p.target.map(|t| !removed.contains(&t)).unwrap_or(true)
        });

        // Indices shifted; rebuild the registry
        self.id_to_idx = self
            .characters
            .iter()
            .enumerate()
            .map(|(i, c)| (c.id, i))
            .collect();

        for id in &removed {
            tracing::debug!(?id, tick = died_tick, "character died");
        }
    }

    pub fn rebuild_grid(&mut self) {
        let entries: Vec<_> = self
            .characters
            .iter()
            .filter(|c| c.is_alive())
            .map(|c| (c.id, c.position))
            .collect();
        self.grid.rebuild(entries.into_iter());
    }

    // === EVENT LOG (side channel, no logic reads it) ===

    pub fn log_event(&mut self, event: SimulationEvent) {
        self.events.push(event);
    }

    pub fn drain_events(&mut self) -> Vec<SimulationEvent> {
        std::mem::take(&mut self.events)
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::character::Item;

    #[test]
    fn test_spawn_and_lookup() {
        let mut world = World::new(7);
        let id = world.spawn(Character::new("Marta", Vec2::new(1.0, 2.0), Zone::Exterior));
        assert_eq!(world.get(id).unwrap().name, "Marta");
        assert!(world.is_alive(id));
    }

    #[test]
    fn test_death_creates_exactly_one_corpse() {
        let mut world = World::new(7);
        let id = world.spawn(Character::new("Marta", Vec2::default(), Zone::Exterior));
        world.get_mut(id).unwrap().health = 0;
        world.get_mut(id).unwrap().inventory.add(Item::Wheat, 4);

        world.process_deaths();
        world.process_deaths(); // second pass must not duplicate

        assert_eq!(world.corpses.len(), 1);
        assert_eq!(world.corpses[0].inventory.count(Item::Wheat), 4);
        assert!(world.get(id).is_none(), "dead character leaves the live set");
    }

    #[test]
    fn test_get_living_excludes_dying() {
        let mut world = World::new(7);
        let id = world.spawn(Character::new("Marta", Vec2::default(), Zone::Exterior));
        world.get_mut(id).unwrap().health = 0;
        // Not yet processed into a corpse, but already untargetable
        assert!(world.get_living(id).is_none());
        assert!(world.get(id).is_some());
    }

    #[test]
    fn test_get_pair_mut_rejects_same_id() {
        let mut world = World::new(7);
        let id = world.spawn(Character::new("Marta", Vec2::default(), Zone::Exterior));
        assert!(world.get_pair_mut(id, id).is_none());
    }
}
