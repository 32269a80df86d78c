//! Error types raised by the grid engine.

use std::{io, path::PathBuf};

use atron_mining_core::{AtronId, Coordinate, CoreError, Icon};

/// Errors raised while building or mutating the map.
#[derive(Debug, thiserror::Error)]
pub enum WorldError {
    /// A core value could not be constructed.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// Procedural generation or actor parameters are out of range.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// A map file contains a character or cell that cannot be loaded.
    #[error("malformed map at line {line}, column {column}: {reason}")]
    MapFormat {
        /// One-based line of the offending character.
        line: usize,
        /// One-based column of the offending character.
        column: usize,
        /// Description of the problem.
        reason: String,
    },

    /// A map file is structurally unusable as a whole.
    #[error("malformed map: {0}")]
    MapLayout(String),

    /// A map file could not be read.
    #[error("failed to read map file {}", path.display())]
    Io {
        /// File that failed to load.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: io::Error,
    },

    /// A coordinate does not address a tile on the map.
    #[error("coordinate {0} lies outside the map")]
    OutOfBounds(Coordinate),

    /// An undiscovered tile was occupied or vacated.
    #[error("tile {0} has not been discovered")]
    UndiscoveredTile(Coordinate),

    /// The landing zone already holds an atron.
    #[error("landing zone {0} is occupied")]
    LandingZoneOccupied(Coordinate),

    /// Extraction was requested away from the landing zone.
    #[error("atron {atron} at {at} is not on the landing zone")]
    NotAtLandingZone {
        /// Atron that was asked to leave.
        atron: AtronId,
        /// Where it currently stands.
        at: Coordinate,
    },

    /// The atron is not on the map.
    #[error("atron {0} is not deployed")]
    NotDeployed(AtronId),

    /// The atron is already on the map.
    #[error("atron {0} is already deployed")]
    AlreadyDeployed(AtronId),

    /// The atron ran out of health and cannot return to the map.
    #[error("atron {0} has been destroyed")]
    Destroyed(AtronId),

    /// A movement target showed an icon no movement rule covers.
    #[error("unexpected surface {icon:?} at {at}")]
    UnexpectedSurface {
        /// Target cell.
        at: Coordinate,
        /// Icon found there.
        icon: Icon,
    },
}

/// Convenience result type for grid engine operations.
pub type WorldResult<T> = Result<T, WorldError>;
