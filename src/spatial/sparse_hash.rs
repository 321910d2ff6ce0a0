//! Sparse hash grid for efficient spatial queries

use ahash::AHashMap;

use crate::core::types::{CharacterId, Vec2};

/// Sparse hash grid for O(1) neighbor queries
pub struct SparseHashGrid {
    cell_size: f32,
    cells: AHashMap<(i32, i32), Vec<CharacterId>>,
}

impl SparseHashGrid {
    pub fn new(cell_size: f32) -> Self {
        Self {
            cell_size,
            cells: AHashMap::new(),
        }
    }

    #[inline]
    fn cell_coord(&self, pos: Vec2) -> (i32, i32) {
        (
            (pos.x / self.cell_size).floor() as i32,
            (pos.y / self.cell_size).floor() as i32,
        )
    }

    pub fn clear(&mut self) {
        self.cells.clear();
    }

    pub fn insert(&mut self, character: CharacterId, pos: Vec2) {
        let coord = self.cell_coord(pos);
        self.cells.entry(coord).or_default().push(character);
    }

    pub fn remove(&mut self, character: CharacterId, pos: Vec2) {
        let coord = self.cell_coord(pos);
        if let Some(cell) = self.cells.get_mut(&coord) {
            cell.retain(|&c| c != character);
        }
    }

    /// Query all characters in cells overlapping a radius around a point
    pub fn query_area(&self, pos: Vec2, radius: f32) -> impl Iterator<Item = CharacterId> + '_ {
        let reach = (radius / self.cell_size).ceil() as i32;
        let (cx, cy) = self.cell_coord(pos);

        (-reach..=reach).flat_map(move |dx| {
            (-reach..=reach).flat_map(move |dy| {
                self.cells
                    .get(&(cx + dx, cy + dy))
                    .into_iter()
                    .flatten()
                    .copied()
            })
        })
    }

    /// Query characters within an exact radius, resolving positions through
    /// the supplied lookup
    pub fn query_radius(
        &self,
        center: Vec2,
        radius: f32,
        position_of: impl Fn(CharacterId) -> Option<Vec2>,
    ) -> Vec<CharacterId> {
        self.query_area(center, radius)
            .filter(|&c| {
                position_of(c)
                    .map(|pos| center.distance(&pos) <= radius)
                    .unwrap_or(false)
            })
            .collect()
    }

    /// Rebuild grid from positions
    pub fn rebuild(&mut self, characters: impl Iterator<Item = (CharacterId, Vec2)>) {
        self.clear();
        for (character, pos) in characters {
            self.insert(character, pos);
        }
    }
}
