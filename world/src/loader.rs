//! Plain-text map files.
//!
//! One character per cell and one row per line. `1`..`9` place a mineral
//! deposit holding that many units, `_` marks the single landing zone, and
//! the remaining terrain symbols map directly onto icons. Rows shorter than
//! the widest one are padded with wall.

use std::{
    collections::{BTreeMap, BTreeSet},
    fs,
    path::Path,
};

use atron_mining_core::{Coordinate, Icon};
use tracing::debug;

use crate::{tile::Tile, MapData, WorldError, WorldResult};

impl MapData {
    /// Loads a map from a text file.
    pub fn from_file(path: impl AsRef<Path>) -> WorldResult<Self> {
        let path = path.as_ref();
        let source = fs::read_to_string(path).map_err(|source| WorldError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let map = Self::parse(&source)?;
        debug!(
            path = %path.display(),
            width = map.width(),
            height = map.height(),
            "loaded map file"
        );
        Ok(map)
    }

    /// Parses a map from its text representation.
    pub fn parse(source: &str) -> WorldResult<Self> {
        let rows: Vec<Vec<char>> = source
            .lines()
            .map(|line| line.trim_end_matches('\r').chars().collect())
            .collect();
        let width = rows.iter().map(Vec::len).max().unwrap_or(0);
        if width == 0 {
            return Err(WorldError::MapLayout("map contains no cells".to_owned()));
        }
        let height = rows.len();

        let to_i32 = |value: usize| {
            i32::try_from(value)
                .map_err(|_| WorldError::MapLayout(format!("dimension {value} is too large")))
        };
        let width_i32 = to_i32(width)?;
        let height_i32 = to_i32(height)?;

        let mut tiles = Vec::with_capacity(width * height);
        let mut minerals = BTreeMap::new();
        let mut acid = BTreeSet::new();
        let mut landing_zone = None;

        for (y, row) in (0..height_i32).zip(&rows) {
            for x in 0..width_i32 {
                let coordinate = Coordinate::new(x, y);
                let symbol = usize::try_from(x)
                    .ok()
                    .and_then(|column| row.get(column))
                    .copied();
                let icon = match symbol {
                    None => Icon::Wall,
                    Some(symbol) => {
                        let format_error = |reason: String| WorldError::MapFormat {
                            line: usize::try_from(y).unwrap_or(0) + 1,
                            column: usize::try_from(x).unwrap_or(0) + 1,
                            reason,
                        };
                        match classify(symbol).map_err(format_error)? {
                            Cell::Mineral(units) => {
                                let _ = minerals.insert(coordinate, units);
                                Icon::Mineral
                            }
                            Cell::Terrain(Icon::DeployZone) => {
                                if let Some(previous) = landing_zone.replace(coordinate) {
                                    return Err(format_error(format!(
                                        "second landing zone, first one at {previous}"
                                    )));
                                }
                                Icon::DeployZone
                            }
                            Cell::Terrain(Icon::Acid) => {
                                let _ = acid.insert(coordinate);
                                Icon::Acid
                            }
                            Cell::Terrain(icon) => icon,
                        }
                    }
                };
                tiles.push(Tile::new(coordinate, icon));
            }
        }

        let landing_zone = landing_zone
            .ok_or_else(|| WorldError::MapLayout("map has no landing zone".to_owned()))?;

        Ok(Self::from_parts(
            width_i32,
            height_i32,
            tiles,
            landing_zone,
            minerals,
            acid,
        ))
    }
}

enum Cell {
    Mineral(u32),
    Terrain(Icon),
}

fn classify(symbol: char) -> Result<Cell, String> {
    if let Some(units) = symbol.to_digit(10) {
        return if units == 0 {
            Err("mineral deposits hold at least one unit".to_owned())
        } else {
            Ok(Cell::Mineral(units))
        };
    }

    match Icon::from_symbol(symbol) {
        Some(icon @ (Icon::Wall | Icon::DeployZone | Icon::Acid | Icon::Empty)) => {
            Ok(Cell::Terrain(icon))
        }
        Some(icon) => Err(format!("{icon:?} cannot appear in a map file")),
        None => Err(format!("unrecognized character {symbol:?}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn digits_become_deposits() {
        let map = MapData::parse("#####\n#_ 7#\n#####\n").expect("valid map");
        let deposit = Coordinate::new(3, 1);
        assert_eq!(map.minerals().get(&deposit), Some(&7));
        assert_eq!(map.tile(deposit).expect("on map").surface(), Icon::Mineral);
        assert_eq!(map.tile(deposit).expect("on map").terrain(), Icon::Empty);
    }

    #[test]
    fn short_rows_are_padded_with_wall() {
        let map = MapData::parse("#####\n#_~\n#####\n").expect("valid map");
        assert_eq!(map.width(), 5);
        assert_eq!(map.height(), 3);
        assert_eq!(
            map.tile(Coordinate::new(4, 1)).expect("on map").surface(),
            Icon::Wall
        );
        assert!(map.is_acid(Coordinate::new(2, 1)));
    }

    #[test]
    fn landing_zone_must_be_unique() {
        assert!(matches!(
            MapData::parse("#####\n# # #\n#####\n"),
            Err(WorldError::MapLayout(_))
        ));
        assert!(matches!(
            MapData::parse("#####\n#_ _#\n#####\n"),
            Err(WorldError::MapFormat {
                line: 2,
                column: 4,
                ..
            })
        ));
    }

    #[test]
    fn display_symbols_are_rejected() {
        for source in ["#_*#", "#_?#", "#_M#", "#_0#", "#_x#"] {
            assert!(
                matches!(MapData::parse(source), Err(WorldError::MapFormat { .. })),
                "{source:?} should not load"
            );
        }
    }

    #[test]
    fn empty_source_is_rejected() {
        assert!(matches!(MapData::parse(""), Err(WorldError::MapLayout(_))));
    }

    #[test]
    fn parsed_tiles_start_hidden() {
        let map = MapData::parse("###\n#_#\n###\n").expect("valid map");
        assert_eq!(map.discovered_tiles().count(), 0);
    }
}
