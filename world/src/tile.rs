//! A single cell of the grid.

use atron_mining_core::{AtronId, Coordinate, Icon};

use crate::{WorldError, WorldResult};

/// One grid cell: its fixed coordinate, what is shown on it, the ground
/// beneath any occupant, whether it has been revealed, and who stands on it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Tile {
    coordinate: Coordinate,
    surface: Icon,
    terrain: Icon,
    discovered: bool,
    occupant: Option<AtronId>,
}

impl Tile {
    /// Creates an undiscovered, unoccupied tile showing `icon`.
    ///
    /// A mineral tile records empty ground as its terrain so that exhausting
    /// the deposit leaves open floor behind.
    #[must_use]
    pub fn new(coordinate: Coordinate, icon: Icon) -> Self {
        let terrain = if icon == Icon::Mineral {
            Icon::Empty
        } else {
            icon
        };
        Self {
            coordinate,
            surface: icon,
            terrain,
            discovered: false,
            occupant: None,
        }
    }

    /// Location of the tile on the map.
    #[must_use]
    pub const fn coordinate(&self) -> Coordinate {
        self.coordinate
    }

    /// Icon currently displayed, including any occupant.
    #[must_use]
    pub const fn surface(&self) -> Icon {
        self.surface
    }

    /// Ground beneath any occupant.
    #[must_use]
    pub const fn terrain(&self) -> Icon {
        self.terrain
    }

    /// Whether the tile has been revealed.
    #[must_use]
    pub const fn is_discovered(&self) -> bool {
        self.discovered
    }

    /// Atron standing on the tile, if any.
    #[must_use]
    pub const fn occupant(&self) -> Option<AtronId> {
        self.occupant
    }

    /// Places an atron on the tile.
    ///
    /// Returns `Ok(false)` without changing anything when the surface cannot
    /// be entered or someone already stands here.
    pub fn occupy(&mut self, atron: AtronId, icon: Icon) -> WorldResult<bool> {
        if !self.discovered {
            return Err(WorldError::UndiscoveredTile(self.coordinate));
        }
        if !self.surface.traversable() || self.occupant.is_some() {
            return Ok(false);
        }

        self.occupant = Some(atron);
        self.surface = icon;
        Ok(true)
    }

    /// Removes the occupant and shows the terrain again.
    ///
    /// Returns `Ok(false)` when nobody stands on the tile.
    pub fn unoccupy(&mut self) -> WorldResult<bool> {
        if !self.discovered {
            return Err(WorldError::UndiscoveredTile(self.coordinate));
        }
        if self.occupant.take().is_none() {
            return Ok(false);
        }

        self.surface = self.terrain;
        Ok(true)
    }

    /// Marks the tile as discovered. Tiles are never hidden again.
    pub fn reveal(&mut self) {
        self.discovered = true;
    }

    /// Replaces the displayed icon; traversable icons also become the terrain.
    pub(crate) fn set_surface(&mut self, icon: Icon) {
        self.surface = icon;
        if icon.traversable() {
            self.terrain = icon;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn revealed(icon: Icon) -> Tile {
        let mut tile = Tile::new(Coordinate::new(1, 1), icon);
        tile.reveal();
        tile
    }

    #[test]
    fn undiscovered_tiles_refuse_occupancy_changes() {
        let mut tile = Tile::new(Coordinate::new(2, 3), Icon::Empty);
        assert!(matches!(
            tile.occupy(AtronId::new(1), Icon::Miner),
            Err(WorldError::UndiscoveredTile(_))
        ));
        assert!(matches!(
            tile.unoccupy(),
            Err(WorldError::UndiscoveredTile(_))
        ));
    }

    #[test]
    fn occupy_then_unoccupy_restores_terrain() {
        let mut tile = revealed(Icon::Acid);
        assert!(tile.occupy(AtronId::new(1), Icon::Scout).expect("discovered"));
        assert_eq!(tile.surface(), Icon::Scout);
        assert_eq!(tile.occupant(), Some(AtronId::new(1)));

        assert!(tile.unoccupy().expect("discovered"));
        assert_eq!(tile.surface(), Icon::Acid);
        assert_eq!(tile.occupant(), None);
    }

    #[test]
    fn second_occupant_is_refused() {
        let mut tile = revealed(Icon::Empty);
        assert!(tile.occupy(AtronId::new(1), Icon::Miner).expect("discovered"));
        assert!(!tile.occupy(AtronId::new(2), Icon::Miner).expect("discovered"));
        assert_eq!(tile.occupant(), Some(AtronId::new(1)));
    }

    #[test]
    fn blocked_surfaces_cannot_be_occupied() {
        for icon in [Icon::Wall, Icon::Mineral] {
            let mut tile = revealed(icon);
            assert!(!tile.occupy(AtronId::new(1), Icon::Player).expect("discovered"));
            assert_eq!(tile.surface(), icon);
        }
    }

    #[test]
    fn unoccupy_without_occupant_is_a_no_op() {
        let mut tile = revealed(Icon::Empty);
        assert!(!tile.unoccupy().expect("discovered"));
        assert_eq!(tile.surface(), Icon::Empty);
    }

    #[test]
    fn mineral_tiles_sit_on_empty_ground() {
        let mut tile = revealed(Icon::Mineral);
        assert_eq!(tile.terrain(), Icon::Empty);
        tile.set_surface(Icon::Empty);
        assert_eq!(tile.surface(), Icon::Empty);
    }
}
