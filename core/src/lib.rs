#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Atron mining engine.
//!
//! This crate defines the value types that connect adapters, the
//! authoritative grid world, and the dispatch systems. The Overlord emits
//! [`Command`] values describing at most one deploy or return action per tick,
//! the world applies them and resolves movement, and every resolved effect is
//! reported as an [`Event`] that systems consume to update their ledgers.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

mod counter;
mod error;

pub use counter::Counter;
pub use error::CoreError;

/// Canonical banner emitted when an expedition boots.
pub const WELCOME_BANNER: &str = "Atron Mining Expedition";

/// Location of a single grid cell, indexed from the top-left corner.
///
/// Coordinates are signed so that translating off the edge of the map yields a
/// representable value that lookups can reject.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Coordinate {
    x: i32,
    y: i32,
}

impl Coordinate {
    /// Creates a new grid coordinate.
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Zero-based column of the coordinate.
    #[must_use]
    pub const fn x(&self) -> i32 {
        self.x
    }

    /// Zero-based row of the coordinate.
    #[must_use]
    pub const fn y(&self) -> i32 {
        self.y
    }

    /// Offset from this coordinate to `other` as `(dx, dy)`.
    ///
    /// A positive `dx` places `other` to the east, a positive `dy` places it
    /// to the south.
    #[must_use]
    pub const fn difference(self, other: Coordinate) -> (i32, i32) {
        (other.x - self.x, other.y - self.y)
    }

    /// Direction of `other` relative to this coordinate.
    ///
    /// Returns [`Direction::Center`] for the same cell and `None` when the two
    /// coordinates do not share a row or column.
    #[must_use]
    pub fn direction_to(self, other: Coordinate) -> Option<Direction> {
        match self.difference(other) {
            (0, 0) => Some(Direction::Center),
            (dx, 0) if dx > 0 => Some(Direction::East),
            (_, 0) => Some(Direction::West),
            (0, dy) if dy > 0 => Some(Direction::South),
            (0, _) => Some(Direction::North),
            _ => None,
        }
    }

    /// The four cardinal neighbours in north, south, east, west order.
    #[must_use]
    pub const fn cardinals(self) -> [Coordinate; 4] {
        [
            self.translate_one(Direction::North),
            self.translate_one(Direction::South),
            self.translate_one(Direction::East),
            self.translate_one(Direction::West),
        ]
    }

    /// Reports whether `other` is one of the four cardinal neighbours.
    #[must_use]
    pub fn is_adjacent(self, other: Coordinate) -> bool {
        self.manhattan_distance(other) == 1
    }

    /// Moves the coordinate a single cell in the provided direction.
    ///
    /// [`Direction::Center`] returns an unchanged copy.
    #[must_use]
    pub const fn translate_one(self, direction: Direction) -> Coordinate {
        let (dx, dy) = direction.offset();
        self.translate(dx, dy)
    }

    /// Moves the coordinate a single cell in the direction named by `token`.
    pub fn translate_token(self, token: &str) -> Result<Coordinate, CoreError> {
        let direction: Direction = token.parse()?;
        Ok(self.translate_one(direction))
    }

    /// Moves the coordinate by an arbitrary offset, saturating at the edges
    /// of the `i32` range.
    #[must_use]
    pub const fn translate(self, dx: i32, dy: i32) -> Coordinate {
        Coordinate::new(self.x.saturating_add(dx), self.y.saturating_add(dy))
    }

    /// Computes the Manhattan distance between two coordinates.
    #[must_use]
    pub fn manhattan_distance(self, other: Coordinate) -> u32 {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y)
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Movement directions available to atrons.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Movement toward decreasing row indices.
    North,
    /// Movement toward increasing row indices.
    South,
    /// Movement toward increasing column indices.
    East,
    /// Movement toward decreasing column indices.
    West,
    /// No movement.
    Center,
}

impl Direction {
    /// Cardinal directions in the order used by [`Coordinate::cardinals`].
    pub const CARDINALS: [Direction; 4] = [
        Direction::North,
        Direction::South,
        Direction::East,
        Direction::West,
    ];

    /// Column and row offset applied by a single step.
    #[must_use]
    pub const fn offset(self) -> (i32, i32) {
        match self {
            Self::North => (0, -1),
            Self::South => (0, 1),
            Self::East => (1, 0),
            Self::West => (-1, 0),
            Self::Center => (0, 0),
        }
    }

    /// Direction that undoes a step in this direction.
    #[must_use]
    pub const fn opposite(self) -> Direction {
        match self {
            Self::North => Self::South,
            Self::South => Self::North,
            Self::East => Self::West,
            Self::West => Self::East,
            Self::Center => Self::Center,
        }
    }
}

impl FromStr for Direction {
    type Err = CoreError;

    fn from_str(token: &str) -> Result<Self, Self::Err> {
        match token.trim().to_ascii_lowercase().as_str() {
            "north" | "n" => Ok(Self::North),
            "south" | "s" => Ok(Self::South),
            "east" | "e" => Ok(Self::East),
            "west" | "w" => Ok(Self::West),
            "center" | "c" => Ok(Self::Center),
            _ => Err(CoreError::UnknownDirection(token.to_owned())),
        }
    }
}

/// Closed catalog of terrain and occupant kinds that can appear on a tile.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Icon {
    /// Generic drone marker.
    Atron,
    /// Scout drone.
    Scout,
    /// Miner drone.
    Miner,
    /// The human-controlled player.
    Player,
    /// Impassable rock; bumping into it costs health.
    Wall,
    /// The single landing zone where atrons enter and leave the map.
    DeployZone,
    /// A mineral deposit that can be mined from an adjacent tile.
    Mineral,
    /// Corrosive ground that damages atrons standing in it.
    Acid,
    /// Open ground.
    Empty,
    /// A tile whose contents are not known.
    Unknown,
}

impl Icon {
    /// Every icon in the catalog.
    pub const ALL: [Icon; 10] = [
        Icon::Atron,
        Icon::Scout,
        Icon::Miner,
        Icon::Player,
        Icon::Wall,
        Icon::DeployZone,
        Icon::Mineral,
        Icon::Acid,
        Icon::Empty,
        Icon::Unknown,
    ];

    /// Whether an atron may physically enter a tile showing this icon.
    #[must_use]
    pub const fn traversable(self) -> bool {
        matches!(self, Self::DeployZone | Self::Acid | Self::Empty)
    }

    /// Health change applied when entering or residing on this icon.
    ///
    /// Damaging terrain reports a negative value.
    #[must_use]
    pub const fn health_cost(self) -> i64 {
        match self {
            Self::Wall => -1,
            Self::Acid => -3,
            _ => 0,
        }
    }

    /// Whether the icon marks an atron standing on the tile.
    #[must_use]
    pub const fn is_atron(self) -> bool {
        matches!(self, Self::Atron | Self::Scout | Self::Miner | Self::Player)
    }

    /// Character used for this icon in map files and debug dumps.
    #[must_use]
    pub const fn symbol(self) -> char {
        match self {
            Self::Atron => 'A',
            Self::Scout => 'S',
            Self::Miner => 'M',
            Self::Player => 'P',
            Self::Wall => '#',
            Self::DeployZone => '_',
            Self::Mineral => '*',
            Self::Acid => '~',
            Self::Empty => ' ',
            Self::Unknown => '?',
        }
    }

    /// Resolves a map-file character back into its icon.
    #[must_use]
    pub fn from_symbol(symbol: char) -> Option<Icon> {
        Self::ALL.into_iter().find(|icon| icon.symbol() == symbol)
    }

    /// Unicode glyph shown by graphical presentations.
    #[must_use]
    pub const fn glyph(self) -> char {
        match self {
            Self::Atron => '\u{00C4}',
            Self::Scout => '\u{00A7}',
            Self::Miner => '\u{00A3}',
            Self::Player => '\u{20B1}',
            Self::Wall => '\u{039E}',
            Self::DeployZone => '\u{02C5}',
            Self::Mineral => '\u{0275}',
            Self::Acid => '\u{05E1}',
            Self::Empty => ' ',
            Self::Unknown => '\u{02D1}',
        }
    }
}

/// Snapshot of an atron's position and the icons of its four neighbours.
///
/// The snapshot is rebuilt by the world whenever the atron is deployed or
/// moves; it is never updated in place.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Context {
    coord: Coordinate,
    north: Icon,
    south: Icon,
    east: Icon,
    west: Icon,
}

impl Context {
    /// Creates a context from a coordinate and its neighbours in
    /// north, south, east, west order.
    #[must_use]
    pub fn new(coord: Coordinate, [north, south, east, west]: [Icon; 4]) -> Self {
        Self {
            coord,
            north,
            south,
            east,
            west,
        }
    }

    /// Cell the atron occupied when the snapshot was taken.
    #[must_use]
    pub const fn coord(&self) -> Coordinate {
        self.coord
    }

    /// Icon of the neighbour in the given direction.
    ///
    /// Returns `None` for [`Direction::Center`].
    #[must_use]
    pub const fn neighbor(&self, direction: Direction) -> Option<Icon> {
        match direction {
            Direction::North => Some(self.north),
            Direction::South => Some(self.south),
            Direction::East => Some(self.east),
            Direction::West => Some(self.west),
            Direction::Center => None,
        }
    }

    /// Neighbour icons paired with their directions in cardinal order.
    #[must_use]
    pub const fn neighbors(&self) -> [(Direction, Icon); 4] {
        [
            (Direction::North, self.north),
            (Direction::South, self.south),
            (Direction::East, self.east),
            (Direction::West, self.west),
        ]
    }
}

/// Unique identifier assigned to an atron.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AtronId(u32);

impl AtronId {
    /// Creates a new atron identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for AtronId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Variants of atron, distinguished by icon and by who decides their moves.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AtronKind {
    /// Moved by human input.
    Player,
    /// Explores the map and reveals tiles.
    Scout,
    /// Follows a path to a mineral deposit and mines it.
    Miner,
    /// Dispatches drones; never walks the map itself.
    Overlord,
}

impl AtronKind {
    /// Icon drawn on the tile the atron occupies.
    ///
    /// The Overlord shares the landing zone's icon.
    #[must_use]
    pub const fn icon(self) -> Icon {
        match self {
            Self::Player => Icon::Player,
            Self::Scout => Icon::Scout,
            Self::Miner => Icon::Miner,
            Self::Overlord => Icon::DeployZone,
        }
    }

    /// Starting and maximum health.
    #[must_use]
    pub const fn default_health(self) -> i64 {
        match self {
            Self::Player => 100,
            Self::Scout | Self::Miner => 40,
            Self::Overlord => 10,
        }
    }

    /// Maximum mineral payload.
    #[must_use]
    pub const fn default_capacity(self) -> i64 {
        match self {
            Self::Player | Self::Scout | Self::Miner => 10,
            Self::Overlord => 0,
        }
    }

    /// Moves allotted per tick.
    #[must_use]
    pub const fn default_moves(self) -> u32 {
        1
    }

    /// Whether the Overlord commands this kind.
    #[must_use]
    pub const fn is_drone(self) -> bool {
        matches!(self, Self::Scout | Self::Miner)
    }
}

impl fmt::Display for AtronKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Player => "Player",
            Self::Scout => "Scout",
            Self::Miner => "Miner",
            Self::Overlord => "Overlord",
        };
        f.write_str(name)
    }
}

/// Task state of a drone.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DroneState {
    /// Walking toward an assigned destination.
    Traveling,
    /// Mining the assigned deposit.
    Working,
    /// Idle; ready for a new task or for pickup.
    Waiting,
    /// Walking the assigned path back to the landing zone.
    Reversing,
}

/// Actions the Overlord may issue in a single tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Command {
    /// Place the drone on the landing zone.
    Deploy {
        /// Drone to deploy.
        atron: AtronId,
    },
    /// Extract the drone and its payload from the landing zone.
    Return {
        /// Drone to extract.
        atron: AtronId,
    },
    /// Take no action this tick.
    Idle,
}

impl FromStr for Command {
    type Err = CoreError;

    /// Parses the `DEPLOY <id>` / `RETURN <id>` token form.
    ///
    /// An empty string is [`Command::Idle`].
    fn from_str(action: &str) -> Result<Self, Self::Err> {
        let unrecognized = || CoreError::UnrecognizedAction(action.to_owned());
        let mut tokens = action.split_whitespace();
        let Some(verb) = tokens.next() else {
            return Ok(Self::Idle);
        };
        let atron = tokens
            .next()
            .and_then(|id| id.parse::<u32>().ok())
            .map(AtronId::new)
            .ok_or_else(unrecognized)?;
        if tokens.next().is_some() {
            return Err(unrecognized());
        }

        match verb.to_ascii_uppercase().as_str() {
            "DEPLOY" => Ok(Self::Deploy { atron }),
            "RETURN" => Ok(Self::Return { atron }),
            _ => Err(unrecognized()),
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Deploy { atron } => write!(f, "DEPLOY {}", atron.get()),
            Self::Return { atron } => write!(f, "RETURN {}", atron.get()),
            Self::Idle => Ok(()),
        }
    }
}

/// Effects broadcast by the world after resolving actions.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    /// An atron was placed on the landing zone.
    AtronDeployed {
        /// Atron that entered the map.
        atron: AtronId,
        /// Landing zone coordinate.
        at: Coordinate,
    },
    /// An atron moved between two cells.
    AtronMoved {
        /// Atron that moved.
        atron: AtronId,
        /// Cell vacated.
        from: Coordinate,
        /// Cell entered.
        to: Coordinate,
    },
    /// A move was blocked by another atron.
    AtronBlocked {
        /// Atron whose move was blocked.
        atron: AtronId,
        /// Occupied target cell.
        at: Coordinate,
    },
    /// An atron bumped into a wall.
    WallStruck {
        /// Atron that collided.
        atron: AtronId,
        /// Wall cell.
        at: Coordinate,
        /// Health remaining after the collision.
        health: i64,
    },
    /// An atron extracted a unit from a deposit.
    MineralMined {
        /// Atron that mined.
        atron: AtronId,
        /// Deposit cell.
        at: Coordinate,
        /// Units left in the deposit.
        remaining: u32,
    },
    /// The last unit of a deposit was removed.
    DepositExhausted {
        /// Former deposit cell.
        at: Coordinate,
    },
    /// An atron took acid damage.
    AcidBurned {
        /// Atron that was burned.
        atron: AtronId,
        /// Acid cell.
        at: Coordinate,
        /// Health remaining after the damage.
        health: i64,
    },
    /// An atron ran out of health and was removed; its payload is lost.
    AtronDestroyed {
        /// Atron that died.
        atron: AtronId,
        /// Cell where it died.
        at: Coordinate,
        /// Payload that was lost.
        payload_lost: i64,
    },
    /// An atron left the map and delivered its payload.
    AtronExtracted {
        /// Atron that left the map.
        atron: AtronId,
        /// Payload delivered.
        payload: i64,
    },
}
