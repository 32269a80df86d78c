//! Procedural map generation.

use std::collections::{BTreeMap, BTreeSet};

use atron_mining_core::{Coordinate, Icon};
use rand::{seq::SliceRandom, Rng};
use tracing::debug;

use crate::{tile::Tile, MapData, WorldError, WorldResult};

/// Smallest side length picked by [`GenerationConfig::random`].
pub const MIN_DIMENSION: u32 = 10;
/// Largest side length picked by [`GenerationConfig::random`].
pub const MAX_DIMENSION: u32 = 20;
/// Lowest mineral density picked by [`GenerationConfig::random`].
pub const MIN_DENSITY: f64 = 0.1;
/// Highest mineral density picked by [`GenerationConfig::random`].
pub const MAX_DENSITY: f64 = 0.5;
/// Share of the remaining open cells turned into acid by default.
pub const DEFAULT_ACID_DENSITY: f64 = 0.1;

/// Parameters for [`MapData::from_scratch`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GenerationConfig {
    /// Number of columns, including the outer wall.
    pub width: u32,
    /// Number of rows, including the outer wall.
    pub height: u32,
    /// Share of interior cells that receive a mineral deposit.
    pub mineral_density: f64,
    /// Share of the remaining open cells that become acid.
    pub acid_density: f64,
}

impl GenerationConfig {
    /// Creates a configuration with the default acid density.
    #[must_use]
    pub const fn new(width: u32, height: u32, mineral_density: f64) -> Self {
        Self {
            width,
            height,
            mineral_density,
            acid_density: DEFAULT_ACID_DENSITY,
        }
    }

    /// Replaces the acid density.
    #[must_use]
    pub const fn with_acid_density(mut self, acid_density: f64) -> Self {
        self.acid_density = acid_density;
        self
    }

    /// Picks dimensions and mineral density uniformly from their default ranges.
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self::new(
            rng.gen_range(MIN_DIMENSION..=MAX_DIMENSION),
            rng.gen_range(MIN_DIMENSION..=MAX_DIMENSION),
            rng.gen_range(MIN_DENSITY..=MAX_DENSITY),
        )
    }

    /// Ensures the map has an interior and both densities are fractions.
    pub fn validate(&self) -> WorldResult<()> {
        if self.width < 3 || self.height < 3 {
            return Err(WorldError::InvalidConfiguration(format!(
                "map must be at least 3x3 to have an interior, got {}x{}",
                self.width, self.height
            )));
        }
        if i32::try_from(self.width).is_err() || i32::try_from(self.height).is_err() {
            return Err(WorldError::InvalidConfiguration(format!(
                "map dimensions {}x{} are too large",
                self.width, self.height
            )));
        }
        for (name, density) in [
            ("mineral", self.mineral_density),
            ("acid", self.acid_density),
        ] {
            if !(0.0..=1.0).contains(&density) {
                return Err(WorldError::InvalidConfiguration(format!(
                    "{name} density must lie in [0, 1], got {density}"
                )));
            }
        }
        Ok(())
    }
}

impl MapData {
    /// Generates a walled map with a random landing zone, mineral deposits
    /// of 1 to 9 units, and acid pools.
    ///
    /// The mineral count is the density applied to the interior cells; the
    /// acid count is the acid density applied to what remains open.
    pub fn from_scratch<R: Rng + ?Sized>(config: &GenerationConfig, rng: &mut R) -> WorldResult<Self> {
        config.validate()?;
        let width = i32::try_from(config.width)
            .map_err(|_| WorldError::InvalidConfiguration("width overflow".to_owned()))?;
        let height = i32::try_from(config.height)
            .map_err(|_| WorldError::InvalidConfiguration("height overflow".to_owned()))?;

        let mut interior: Vec<Coordinate> = (1..height - 1)
            .flat_map(|y| (1..width - 1).map(move |x| Coordinate::new(x, y)))
            .collect();
        interior.shuffle(rng);

        let Some(landing_zone) = interior.pop() else {
            return Err(WorldError::InvalidConfiguration(
                "map has no interior cell for the landing zone".to_owned(),
            ));
        };

        let total = u64::from(config.width) * u64::from(config.height);
        let walls = 2 * u64::from(config.width) + 2 * u64::from(config.height) - 4;
        let mineral_count = scaled(total - walls, config.mineral_density).min(interior.len());
        let minerals: BTreeMap<Coordinate, u32> = interior
            .drain(..mineral_count)
            .map(|coordinate| (coordinate, rng.gen_range(1..=9)))
            .collect();

        let open = total.saturating_sub(walls + minerals.len() as u64);
        let acid_count = scaled(open, config.acid_density).min(interior.len());
        let acid: BTreeSet<Coordinate> = interior.drain(..acid_count).collect();

        let mut tiles = Vec::with_capacity(usize::try_from(total).unwrap_or(0));
        for y in 0..height {
            for x in 0..width {
                let coordinate = Coordinate::new(x, y);
                let icon = if x == 0 || y == 0 || x == width - 1 || y == height - 1 {
                    Icon::Wall
                } else if coordinate == landing_zone {
                    Icon::DeployZone
                } else if minerals.contains_key(&coordinate) {
                    Icon::Mineral
                } else if acid.contains(&coordinate) {
                    Icon::Acid
                } else {
                    Icon::Empty
                };
                tiles.push(Tile::new(coordinate, icon));
            }
        }

        debug!(
            width,
            height,
            %landing_zone,
            deposits = minerals.len(),
            acid = acid.len(),
            "generated map"
        );
        Ok(Self::from_parts(width, height, tiles, landing_zone, minerals, acid))
    }
}

fn scaled(count: u64, density: f64) -> usize {
    let value = (count as f64 * density).floor();
    if value <= 0.0 {
        0
    } else {
        value as usize
    }
}

#[cfg(test)]
mod tests {
    use rand_chacha::{rand_core::SeedableRng, ChaCha8Rng};

    use super::*;

    #[test]
    fn validation_rejects_tiny_maps_and_bad_densities() {
        assert!(GenerationConfig::new(2, 10, 0.2).validate().is_err());
        assert!(GenerationConfig::new(10, 10, 1.5).validate().is_err());
        assert!(GenerationConfig::new(10, 10, 0.2)
            .with_acid_density(-0.1)
            .validate()
            .is_err());
        assert!(GenerationConfig::new(3, 3, 1.0).validate().is_ok());
    }

    #[test]
    fn random_config_stays_in_default_ranges() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        for _ in 0..32 {
            let config = GenerationConfig::random(&mut rng);
            assert!((MIN_DIMENSION..=MAX_DIMENSION).contains(&config.width));
            assert!((MIN_DIMENSION..=MAX_DIMENSION).contains(&config.height));
            assert!((MIN_DENSITY..=MAX_DENSITY).contains(&config.mineral_density));
            assert!(config.validate().is_ok());
        }
    }

    #[test]
    fn generated_map_is_boxed_in_walls() {
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        let map = MapData::from_scratch(&GenerationConfig::new(12, 10, 0.3), &mut rng)
            .expect("valid config");

        for x in 0..12 {
            assert_eq!(map.tile(Coordinate::new(x, 0)).expect("on map").surface(), Icon::Wall);
            assert_eq!(map.tile(Coordinate::new(x, 9)).expect("on map").surface(), Icon::Wall);
        }
        for y in 0..10 {
            assert_eq!(map.tile(Coordinate::new(0, y)).expect("on map").surface(), Icon::Wall);
            assert_eq!(map.tile(Coordinate::new(11, y)).expect("on map").surface(), Icon::Wall);
        }
        let lz = map.landing_zone();
        assert_eq!(map.tile(lz).expect("on map").surface(), Icon::DeployZone);
    }

    #[test]
    fn deposit_and_acid_counts_follow_densities() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let map = MapData::from_scratch(&GenerationConfig::new(10, 10, 0.5), &mut rng)
            .expect("valid config");

        assert_eq!(map.minerals().len(), 32);
        assert_eq!(map.acid().len(), 3);
        for (coordinate, units) in map.minerals() {
            assert!((1..=9).contains(units));
            assert_eq!(map.tile(*coordinate).expect("on map").surface(), Icon::Mineral);
        }
        for coordinate in map.acid() {
            assert_eq!(map.tile(*coordinate).expect("on map").surface(), Icon::Acid);
        }
    }

    #[test]
    fn full_density_is_capped_by_available_cells() {
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let map = MapData::from_scratch(&GenerationConfig::new(5, 5, 1.0), &mut rng)
            .expect("valid config");
        assert_eq!(map.minerals().len(), 8);
        assert!(map.acid().is_empty());
    }

    #[test]
    fn same_seed_generates_same_map() {
        let config = GenerationConfig::new(15, 12, 0.25);
        let first = MapData::from_scratch(&config, &mut ChaCha8Rng::seed_from_u64(42))
            .expect("valid config");
        let second = MapData::from_scratch(&config, &mut ChaCha8Rng::seed_from_u64(42))
            .expect("valid config");
        assert_eq!(first.to_string(), second.to_string());
    }
}
