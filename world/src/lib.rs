#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative grid engine for Atron mining expeditions.
//!
//! [`MapData`] owns every tile, the landing zone, the mineral ledger, and the
//! acid pools. Atrons are owned by their callers and lent to the map for
//! deployment, movement, and extraction; every resolved effect is pushed into
//! a caller-supplied [`Event`] buffer.

use std::{
    collections::{BTreeMap, BTreeSet},
    fmt,
};

use atron_mining_core::{Context, Coordinate, Direction, Event, Icon};
use tracing::{debug, warn};

mod atron;
mod error;
mod generation;
mod loader;
pub mod navigation;
mod tile;

pub use atron::Atron;
pub use error::{WorldError, WorldResult};
pub use generation::{
    GenerationConfig, DEFAULT_ACID_DENSITY, MAX_DENSITY, MAX_DIMENSION, MIN_DENSITY,
    MIN_DIMENSION,
};
pub use navigation::Pathfinder;
pub use tile::Tile;

/// The grid world: tiles stored row-major plus the ledgers describing them.
#[derive(Clone, Debug)]
pub struct MapData {
    width: i32,
    height: i32,
    tiles: Vec<Tile>,
    landing_zone: Coordinate,
    minerals: BTreeMap<Coordinate, u32>,
    acid: BTreeSet<Coordinate>,
}

impl MapData {
    pub(crate) fn from_parts(
        width: i32,
        height: i32,
        tiles: Vec<Tile>,
        landing_zone: Coordinate,
        minerals: BTreeMap<Coordinate, u32>,
        acid: BTreeSet<Coordinate>,
    ) -> Self {
        Self {
            width,
            height,
            tiles,
            landing_zone,
            minerals,
            acid,
        }
    }

    /// Number of columns.
    #[must_use]
    pub const fn width(&self) -> i32 {
        self.width
    }

    /// Number of rows.
    #[must_use]
    pub const fn height(&self) -> i32 {
        self.height
    }

    /// The single cell where atrons enter and leave the map.
    #[must_use]
    pub const fn landing_zone(&self) -> Coordinate {
        self.landing_zone
    }

    /// Remaining units of every undepleted deposit.
    #[must_use]
    pub const fn minerals(&self) -> &BTreeMap<Coordinate, u32> {
        &self.minerals
    }

    /// Units left in the deposit at `coordinate`, if any.
    #[must_use]
    pub fn mineral_units(&self, coordinate: Coordinate) -> Option<u32> {
        self.minerals.get(&coordinate).copied()
    }

    /// Cells covered in acid.
    #[must_use]
    pub const fn acid(&self) -> &BTreeSet<Coordinate> {
        &self.acid
    }

    /// Whether `coordinate` is an acid pool.
    #[must_use]
    pub fn is_acid(&self, coordinate: Coordinate) -> bool {
        self.acid.contains(&coordinate)
    }

    /// Whether `coordinate` addresses a tile of this map.
    #[must_use]
    pub const fn contains(&self, coordinate: Coordinate) -> bool {
        coordinate.x() >= 0
            && coordinate.y() >= 0
            && coordinate.x() < self.width
            && coordinate.y() < self.height
    }

    /// Tile at `coordinate`, or `None` off the map.
    #[must_use]
    pub fn get(&self, coordinate: Coordinate) -> Option<&Tile> {
        self.index(coordinate).and_then(|index| self.tiles.get(index))
    }

    /// Tile at `coordinate`, falling back to `default` off the map.
    #[must_use]
    pub fn get_or<'a>(&'a self, coordinate: Coordinate, default: &'a Tile) -> &'a Tile {
        self.get(coordinate).unwrap_or(default)
    }

    /// Tile at `coordinate`.
    pub fn tile(&self, coordinate: Coordinate) -> WorldResult<&Tile> {
        self.get(coordinate)
            .ok_or(WorldError::OutOfBounds(coordinate))
    }

    fn tile_mut(&mut self, coordinate: Coordinate) -> WorldResult<&mut Tile> {
        let index = self
            .index(coordinate)
            .ok_or(WorldError::OutOfBounds(coordinate))?;
        self.tiles
            .get_mut(index)
            .ok_or(WorldError::OutOfBounds(coordinate))
    }

    fn index(&self, coordinate: Coordinate) -> Option<usize> {
        if !self.contains(coordinate) {
            return None;
        }
        let x = usize::try_from(coordinate.x()).ok()?;
        let y = usize::try_from(coordinate.y()).ok()?;
        let width = usize::try_from(self.width).ok()?;
        y.checked_mul(width)?.checked_add(x)
    }

    /// Every tile in row-major order.
    pub fn tiles(&self) -> impl Iterator<Item = &Tile> {
        self.tiles.iter()
    }

    /// Tiles that have been revealed, in row-major order.
    pub fn discovered_tiles(&self) -> impl Iterator<Item = &Tile> {
        self.tiles.iter().filter(|tile| tile.is_discovered())
    }

    /// Number of tiles still hidden.
    #[must_use]
    pub fn undiscovered_count(&self) -> usize {
        self.tiles.iter().filter(|tile| !tile.is_discovered()).count()
    }

    /// Reveals a single tile.
    pub fn reveal(&mut self, coordinate: Coordinate) -> WorldResult<()> {
        self.tile_mut(coordinate)?.reveal();
        Ok(())
    }

    /// Reveals `coordinate` and whichever of its neighbours lie on the map.
    fn reveal_around(&mut self, coordinate: Coordinate) -> WorldResult<()> {
        self.reveal(coordinate)?;
        for neighbor in coordinate.cardinals() {
            if let Ok(tile) = self.tile_mut(neighbor) {
                tile.reveal();
            }
        }
        Ok(())
    }

    /// Snapshot of `coordinate` and its neighbours' surfaces.
    ///
    /// Neighbours off the map read as [`Icon::Unknown`].
    pub fn build_context(&self, coordinate: Coordinate) -> WorldResult<Context> {
        let _ = self.tile(coordinate)?;
        let icons = coordinate
            .cardinals()
            .map(|neighbor| self.get(neighbor).map_or(Icon::Unknown, Tile::surface));
        Ok(Context::new(coordinate, icons))
    }

    /// Whether an atron could deploy right now.
    #[must_use]
    pub fn is_landing_zone_free(&self) -> bool {
        self.get(self.landing_zone)
            .map_or(false, |tile| tile.surface() == Icon::DeployZone)
    }

    /// Ground left behind when a deposit at `coordinate` is exhausted.
    #[must_use]
    pub fn ground_at(&self, coordinate: Coordinate) -> Icon {
        if coordinate == self.landing_zone {
            Icon::DeployZone
        } else if self.is_acid(coordinate) {
            Icon::Acid
        } else {
            Icon::Empty
        }
    }

    /// Places `atron` on the landing zone and reveals its surroundings.
    ///
    /// Nothing changes when the atron is destroyed, already deployed, or the
    /// landing zone is taken.
    pub fn deploy_atron(&mut self, atron: &mut Atron, events: &mut Vec<Event>) -> WorldResult<()> {
        if atron.is_destroyed() {
            return Err(WorldError::Destroyed(atron.id()));
        }
        if atron.is_deployed() {
            return Err(WorldError::AlreadyDeployed(atron.id()));
        }
        let landing_zone = self.landing_zone;
        if !self.is_landing_zone_free() {
            return Err(WorldError::LandingZoneOccupied(landing_zone));
        }

        self.reveal_around(landing_zone)?;
        if !self.tile_mut(landing_zone)?.occupy(atron.id(), atron.icon())? {
            return Err(WorldError::LandingZoneOccupied(landing_zone));
        }
        atron.deploy(self.build_context(landing_zone)?)?;

        debug!(atron = %atron.id(), kind = %atron.kind(), "deployed");
        events.push(Event::AtronDeployed {
            atron: atron.id(),
            at: landing_zone,
        });
        Ok(())
    }

    /// Resolves `atron` acting on the adjacent or distant cell `target`.
    ///
    /// Open ground is entered, walls hurt, minerals are mined in place, and
    /// cells held by another atron block the move.
    pub fn move_to(
        &mut self,
        atron: &mut Atron,
        target: Coordinate,
        events: &mut Vec<Event>,
    ) -> WorldResult<()> {
        let from = atron
            .coordinate()
            .ok_or(WorldError::NotDeployed(atron.id()))?;
        let surface = self.tile(target)?.surface();

        match surface {
            icon if icon.is_atron() => {
                events.push(Event::AtronBlocked {
                    atron: atron.id(),
                    at: target,
                });
            }
            Icon::DeployZone | Icon::Acid | Icon::Empty => {
                self.reveal_around(target)?;
                if !self.tile_mut(target)?.occupy(atron.id(), atron.icon())? {
                    events.push(Event::AtronBlocked {
                        atron: atron.id(),
                        at: target,
                    });
                    return Ok(());
                }
                let _ = self.tile_mut(from)?.unoccupy()?;
                atron.relocate(self.build_context(target)?);
                events.push(Event::AtronMoved {
                    atron: atron.id(),
                    from,
                    to: target,
                });
            }
            Icon::Wall => {
                atron.health_mut().count(Icon::Wall.health_cost());
                events.push(Event::WallStruck {
                    atron: atron.id(),
                    at: target,
                    health: atron.health().get(),
                });
            }
            Icon::Mineral => {
                let Some(units) = self.minerals.get_mut(&target) else {
                    return Err(WorldError::UnexpectedSurface {
                        at: target,
                        icon: surface,
                    });
                };
                *units = units.saturating_sub(1);
                let remaining = *units;
                atron.payload_mut().count(1);
                events.push(Event::MineralMined {
                    atron: atron.id(),
                    at: target,
                    remaining,
                });

                if remaining == 0 {
                    let _ = self.minerals.remove(&target);
                    let ground = self.ground_at(target);
                    self.tile_mut(target)?.set_surface(ground);
                    debug!(at = %target, "deposit exhausted");
                    events.push(Event::DepositExhausted { at: target });
                }
                atron.relocate(self.build_context(from)?);
            }
            icon => {
                return Err(WorldError::UnexpectedSurface { at: target, icon });
            }
        }

        Ok(())
    }

    /// Moves `atron` one cell in `direction`; [`Direction::Center`] does nothing.
    pub fn step(
        &mut self,
        atron: &mut Atron,
        direction: Direction,
        events: &mut Vec<Event>,
    ) -> WorldResult<()> {
        if direction == Direction::Center {
            return Ok(());
        }
        let from = atron
            .coordinate()
            .ok_or(WorldError::NotDeployed(atron.id()))?;
        self.move_to(atron, from.translate_one(direction), events)
    }

    /// Advances every deployed atron by its allotted moves.
    ///
    /// Each move first burns atrons standing in acid, removes those left
    /// without health, and then lets the survivors act. Atrons are resolved
    /// in iteration order. Failed moves are logged and skipped.
    pub fn tick<'a, I>(&mut self, atrons: I, events: &mut Vec<Event>)
    where
        I: IntoIterator<Item = &'a mut Atron>,
    {
        for atron in atrons {
            for _ in 0..atron.moves() {
                let Some(at) = atron.coordinate() else {
                    break;
                };

                if self.is_acid(at) {
                    atron.health_mut().count(Icon::Acid.health_cost());
                    events.push(Event::AcidBurned {
                        atron: atron.id(),
                        at,
                        health: atron.health().get(),
                    });
                }
                if atron.is_destroyed() {
                    self.destroy(atron, events);
                    break;
                }

                match self.build_context(at) {
                    Ok(context) => atron.relocate(context),
                    Err(error) => {
                        warn!(atron = %atron.id(), %error, "could not sense surroundings");
                        break;
                    }
                }

                let direction = atron.next_direction();
                if let Err(error) = self.step(atron, direction, events) {
                    warn!(atron = %atron.id(), ?direction, %error, "move ignored");
                }
                if atron.is_destroyed() {
                    self.destroy(atron, events);
                    break;
                }
            }
        }
    }

    fn destroy(&mut self, atron: &mut Atron, events: &mut Vec<Event>) {
        let Some(at) = atron.coordinate() else {
            return;
        };
        if let Err(error) = self.tile_mut(at).and_then(Tile::unoccupy) {
            warn!(atron = %atron.id(), %error, "could not clear tile of destroyed atron");
        }
        match atron.undeploy() {
            Ok(payload_lost) => {
                debug!(atron = %atron.id(), %at, payload_lost, "destroyed");
                events.push(Event::AtronDestroyed {
                    atron: atron.id(),
                    at,
                    payload_lost,
                });
            }
            Err(error) => warn!(atron = %atron.id(), %error, "could not undeploy destroyed atron"),
        }
    }

    /// Extracts an atron standing on the landing zone, returning its payload.
    ///
    /// Fails with [`WorldError::NotAtLandingZone`] anywhere else, leaving the
    /// atron deployed.
    pub fn remove_drone(&mut self, atron: &mut Atron, events: &mut Vec<Event>) -> WorldResult<i64> {
        let at = atron
            .coordinate()
            .ok_or(WorldError::NotDeployed(atron.id()))?;
        if at != self.landing_zone {
            return Err(WorldError::NotAtLandingZone {
                atron: atron.id(),
                at,
            });
        }
        self.undeploy_atron(atron, events)
    }

    /// Withdraws an atron from wherever it stands, returning its payload.
    pub fn undeploy_atron(&mut self, atron: &mut Atron, events: &mut Vec<Event>) -> WorldResult<i64> {
        let at = atron
            .coordinate()
            .ok_or(WorldError::NotDeployed(atron.id()))?;
        let _ = self.tile_mut(at)?.unoccupy()?;
        let payload = atron.undeploy()?;

        debug!(atron = %atron.id(), %at, payload, "extracted");
        events.push(Event::AtronExtracted {
            atron: atron.id(),
            payload,
        });
        Ok(payload)
    }
}

impl fmt::Display for MapData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for tile in &self.tiles {
            if tile.coordinate().x() == 0 && tile.coordinate().y() > 0 {
                writeln!(f)?;
            }
            write!(f, "{}", tile.surface().symbol())?;
        }
        Ok(())
    }
}

/// Read-only views for presentation layers.
pub mod query {
    use atron_mining_core::{Coordinate, Icon};

    use super::MapData;

    /// A revealed tile as presentation layers see it.
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct TileView {
        /// Location of the tile.
        pub coordinate: Coordinate,
        /// Icon currently shown, including any occupant.
        pub icon: Icon,
    }

    /// Revealed tiles in row-major order.
    pub fn discovered_tiles(map: &MapData) -> impl Iterator<Item = TileView> + '_ {
        map.discovered_tiles().map(|tile| TileView {
            coordinate: tile.coordinate(),
            icon: tile.surface(),
        })
    }

    /// Revealed tiles that still show a mineral deposit.
    #[must_use]
    pub fn discovered_minerals(map: &MapData) -> Vec<Coordinate> {
        discovered_tiles(map)
            .filter(|view| view.icon == Icon::Mineral)
            .map(|view| view.coordinate)
            .collect()
    }

    /// Renders the map with hidden tiles drawn as unknown.
    #[must_use]
    pub fn render_discovered(map: &MapData) -> String {
        let mut rendered = String::new();
        for tile in map.tiles() {
            if tile.coordinate().x() == 0 && tile.coordinate().y() > 0 {
                rendered.push('\n');
            }
            let icon = if tile.is_discovered() {
                tile.surface()
            } else {
                Icon::Unknown
            };
            rendered.push(icon.symbol());
        }
        rendered
    }
}
