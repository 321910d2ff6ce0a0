//! Static world content: sight-blocking obstacles, farm cells, waypoints

use serde::{Deserialize, Serialize};

use crate::core::types::{InteriorId, Vec2, Zone};
use crate::world::zone::Interior;

/// What kind of fixture blocks sight
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ObstacleKind {
    Tree,
    WallPost,
    Stove,
}

/// A circular sight blocker in one zone's coordinate space
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Obstacle {
    pub kind: ObstacleKind,
    pub position: Vec2,
    pub radius: f32,
}

impl Obstacle {
    pub fn tree(position: Vec2) -> Self {
        Self { kind: ObstacleKind::Tree, position, radius: 0.4 }
    }

    pub fn wall_post(position: Vec2) -> Self {
        Self { kind: ObstacleKind::WallPost, position, radius: 0.5 }
    }

    pub fn stove(position: Vec2) -> Self {
        Self { kind: ObstacleKind::Stove, position, radius: 0.5 }
    }
}

/// Growth stage of a farm cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FarmCellState {
    Growing,
    Ready,
}

/// One tile of cropland (minimal collaborator surface)
///
/// The behavior core only needs to know where ready wheat is; the growth
/// timer exists so long runs keep producing theft opportunities.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FarmCell {
    pub position: Vec2,
    pub state: FarmCellState,
    pub growth_ticks: u64,
    pub ticks_to_ready: u64,
    /// Name of the home area this cell belongs to, if owned
    pub home: Option<String>,
}

impl FarmCell {
    pub fn new(position: Vec2, ticks_to_ready: u64) -> Self {
        Self {
            position,
            state: FarmCellState::Growing,
            growth_ticks: 0,
            ticks_to_ready,
            home: None,
        }
    }

    pub fn advance(&mut self) {
        if self.state == FarmCellState::Growing {
            self.growth_ticks += 1;
            if self.growth_ticks >= self.ticks_to_ready {
                self.state = FarmCellState::Ready;
            }
        }
    }

    /// Take the crop; returns false if nothing was ready
    pub fn harvest(&mut self) -> bool {
        if self.state != FarmCellState::Ready {
            return false;
        }
        self.state = FarmCellState::Growing;
        self.growth_ticks = 0;
        true
    }
}

/// Static map content: obstacles, interiors, patrol route, farmland
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WorldMap {
    /// Sight blockers in the exterior zone (trees, house-wall posts)
    pub exterior_obstacles: Vec<Obstacle>,
    pub interiors: Vec<Interior>,
    /// Waypoints soldiers patrol between, in visiting order
    pub patrol_waypoints: Vec<Vec2>,
    pub farm_cells: Vec<FarmCell>,
}

impl WorldMap {
    pub fn get_interior(&self, id: InteriorId) -> Option<&Interior> {
        self.interiors.iter().find(|i| i.id == id)
    }

    /// Sight blockers for one zone, in that zone's coordinate space
    pub fn obstacles_in_zone(&self, zone: Zone) -> &[Obstacle] {
        match zone {
            Zone::Exterior => &self.exterior_obstacles,
            Zone::Interior(id) => self
                .get_interior(id)
                .map(|i| i.obstacles.as_slice())
                .unwrap_or(&[]),
        }
    }

    /// The interior whose footprint contains a world position, if any
    pub fn interior_at_world_pos(&self, world: Vec2) -> Option<&Interior> {
        self.interiors.iter().find(|i| i.contains_world(world))
    }

    pub fn advance_farms(&mut self) {
        for cell in &mut self.farm_cells {
            cell.advance();
        }
    }

    pub fn nearest_ready_farm_cell(&self, from: Vec2, home: Option<&str>) -> Option<&FarmCell> {
        self.farm_cells
            .iter()
            .filter(|c| c.state == FarmCellState::Ready)
            .filter(|c| home.is_none() || c.home.as_deref() == home)
            .min_by(|a, b| {
                a.position
                    .distance(&from)
                    .partial_cmp(&b.position.distance(&from))
                    .unwrap_or(std::cmp::Ordering::Equal)
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_farm_cell_ripens_and_harvests() {
        let mut cell = FarmCell::new(Vec2::new(1.0, 1.0), 3);
        assert!(!cell.harvest(), "growing cell should not harvest");
        for _ in 0..3 {
            cell.advance();
        }
        assert_eq!(cell.state, FarmCellState::Ready);
        assert!(cell.harvest());
        assert_eq!(cell.state, FarmCellState::Growing, "harvest resets growth");
    }

    #[test]
    fn test_nearest_ready_cell_respects_home_filter() {
        let mut map = WorldMap::default();
        let mut near = FarmCell::new(Vec2::new(1.0, 0.0), 0);
        near.state = FarmCellState::Ready;
        near.home = Some("north farm".into());
        let mut far = FarmCell::new(Vec2::new(5.0, 0.0), 0);
        far.state = FarmCellState::Ready;
        far.home = Some("south farm".into());
        map.farm_cells = vec![near, far];

        let found = map
            .nearest_ready_farm_cell(Vec2::default(), Some("south farm"))
            .expect("south farm has a ready cell");
        assert_eq!(found.position, Vec2::new(5.0, 0.0));
    }
}
