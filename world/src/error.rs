//! Error taxonomy for loading segments and advancing the world.

use std::io;

use scroll_runner_core::{ConstructError, EntityKind, SegmentId, TileCode, TileCoordinate};
use thiserror::Error;

/// Failure to turn a segment resource into a tile grid.
#[derive(Debug, Error)]
pub enum LoadError {
    /// The segment source could not deliver the resource.
    #[error("segment `{segment}` could not be read")]
    Unavailable {
        /// Segment that was requested.
        segment: SegmentId,
        /// Underlying I/O failure.
        #[source]
        source: io::Error,
    },
    /// The resource does not contain exactly one line per grid row.
    #[error("segment `{segment}` has {found} rows, expected {expected}")]
    RowCount {
        /// Segment being parsed.
        segment: SegmentId,
        /// Required number of rows.
        expected: usize,
        /// Number of rows present.
        found: usize,
    },
    /// A line does not contain exactly one character per grid column.
    #[error("segment `{segment}` row {row} has {found} columns, expected {expected}")]
    ColumnCount {
        /// Segment being parsed.
        segment: SegmentId,
        /// Zero-based row holding the offending line.
        row: usize,
        /// Required number of columns.
        expected: usize,
        /// Number of columns present.
        found: usize,
    },
    /// Strict parsing met a code outside the terrain and marker alphabet.
    #[error("segment `{segment}` contains unknown tile code {code} at {tile}")]
    UnknownTile {
        /// Segment being parsed.
        segment: SegmentId,
        /// Position of the offending code.
        tile: TileCoordinate,
        /// Code that was not recognised.
        code: TileCode,
    },
    /// The configured pool offers no segments to choose from.
    #[error("segment pool is empty")]
    EmptyPool,
}

/// Access to a tile outside the stored grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
#[error("tile {coordinate} lies outside the grid")]
pub struct OutOfBoundsError {
    /// Coordinate that was requested.
    pub coordinate: TileCoordinate,
}

/// Failure to refill the staged grid while scrolling.
#[derive(Debug, Error)]
#[error("failed to refresh the staged grid")]
pub struct SegmentLoadError {
    /// Load failure behind the refresh.
    #[from]
    pub source: LoadError,
}

/// Failure reported by the entity constructor for a marker tile.
#[derive(Debug, Error)]
#[error("failed to construct `{kind}` entity for marker at {tile}")]
pub struct SpawnError {
    /// Kind that was requested.
    pub kind: EntityKind,
    /// Marker tile that triggered the spawn.
    pub tile: TileCoordinate,
    /// Constructor failure.
    #[source]
    pub source: ConstructError,
}

/// Any failure surfaced by constructing the world or applying a command.
#[derive(Debug, Error)]
pub enum WorldError {
    /// A segment could not be loaded during construction.
    #[error(transparent)]
    Load(#[from] LoadError),
    /// The staged grid could not be refreshed during a scroll step.
    #[error(transparent)]
    SegmentLoad(#[from] SegmentLoadError),
    /// An entity could not be constructed for a marker tile.
    #[error(transparent)]
    Spawn(#[from] SpawnError),
    /// A command addressed a tile outside the grid.
    #[error(transparent)]
    OutOfBounds(#[from] OutOfBoundsError),
}
