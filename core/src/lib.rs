#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Scroll Runner tile-map engine.
//!
//! This crate defines the vocabulary that connects the authoritative world,
//! the pure systems and the adapters. Adapters submit [`Command`] values
//! describing desired mutations, the world executes those commands via its
//! `apply` entry point and broadcasts [`Event`] values describing what
//! happened. Systems and adapters read terrain exclusively through the
//! borrowed [`TileView`], which keeps the streaming engine the sole writer.

use std::{error::Error, fmt};

use serde::{Deserialize, Serialize};

/// Side length of a single square tile measured in pixels.
pub const TILE_SIZE: i32 = 32;

/// Number of tile rows in every grid and segment.
pub const ROWS: usize = 20;

/// Number of tile columns in every grid and segment.
pub const COLUMNS: usize = 60;

/// Converts a pixel coordinate into the index of the tile containing it.
///
/// Uses floor rather than truncation so negative coordinates land on the tile
/// to their left: `-1.0` maps to tile `-1`, not `0`.
#[must_use]
pub fn pixels_to_tile(pixels: f64) -> i32 {
    (pixels / f64::from(TILE_SIZE)).floor() as i32
}

/// Converts a tile index into the pixel coordinate of its origin edge.
#[must_use]
pub const fn tile_to_pixels(tile: i32) -> i32 {
    tile * TILE_SIZE
}

/// Single-character code stored in a grid cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TileCode(char);

impl TileCode {
    /// Empty space.
    pub const BLANK: Self = Self(' ');
    /// Solid terrain block.
    pub const BLOCK: Self = Self('B');

    /// Wraps the provided character.
    #[must_use]
    pub const fn new(code: char) -> Self {
        Self(code)
    }

    /// Character backing the code.
    #[must_use]
    pub const fn as_char(&self) -> char {
        self.0
    }

    /// Reports whether the tile is empty space.
    #[must_use]
    pub const fn is_blank(&self) -> bool {
        self.0 == Self::BLANK.0
    }

    /// Reports whether the tile obstructs movement.
    #[must_use]
    pub const fn is_solid(&self) -> bool {
        self.0 == Self::BLOCK.0
    }

    /// Reports whether the code is part of the terrain alphabet rather than an
    /// entity marker.
    #[must_use]
    pub const fn is_terrain(&self) -> bool {
        self.is_blank() || self.is_solid()
    }
}

impl Default for TileCode {
    fn default() -> Self {
        Self::BLANK
    }
}

impl fmt::Display for TileCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.0)
    }
}

/// Location of a tile expressed as signed column and row indices.
///
/// Coordinates outside the grid are legitimate query results that describe
/// the world edge; they are never valid storage locations.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TileCoordinate {
    column: i32,
    row: i32,
}

impl TileCoordinate {
    /// Creates a new tile coordinate.
    #[must_use]
    pub const fn new(column: i32, row: i32) -> Self {
        Self { column, row }
    }

    /// Zero-based column index, negative when left of the grid.
    #[must_use]
    pub const fn column(&self) -> i32 {
        self.column
    }

    /// Zero-based row index, negative when above the grid.
    #[must_use]
    pub const fn row(&self) -> i32 {
        self.row
    }

    /// Reports whether the coordinate addresses a stored tile.
    #[must_use]
    pub fn in_bounds(&self) -> bool {
        self.indices().is_some()
    }

    /// Converts the coordinate into `(row, column)` storage indices.
    #[must_use]
    pub fn indices(&self) -> Option<(usize, usize)> {
        let row = usize::try_from(self.row).ok()?;
        let column = usize::try_from(self.column).ok()?;
        (row < ROWS && column < COLUMNS).then_some((row, column))
    }

    /// Pixel position of the tile's upper-left corner.
    #[must_use]
    pub fn origin(&self) -> PixelPosition {
        PixelPosition::new(
            f64::from(tile_to_pixels(self.column)),
            f64::from(tile_to_pixels(self.row)),
        )
    }
}

impl fmt::Display for TileCoordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(column {}, row {})", self.column, self.row)
    }
}

/// Point in world pixel space.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PixelPosition {
    /// Horizontal coordinate, growing to the right.
    pub x: f64,
    /// Vertical coordinate, growing downwards.
    pub y: f64,
}

impl PixelPosition {
    /// Creates a new pixel position.
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Tile containing the position.
    #[must_use]
    pub fn tile(&self) -> TileCoordinate {
        TileCoordinate::new(pixels_to_tile(self.x), pixels_to_tile(self.y))
    }
}

/// Extent of an entity's bounding box in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PixelSize {
    /// Horizontal extent.
    pub width: f64,
    /// Vertical extent.
    pub height: f64,
}

impl PixelSize {
    /// Creates a new size.
    #[must_use]
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Size of a single tile.
    #[must_use]
    pub fn tile() -> Self {
        Self::new(f64::from(TILE_SIZE), f64::from(TILE_SIZE))
    }
}

/// Axis-aligned bounding box anchored at its upper-left corner.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EntityBox {
    /// Upper-left corner of the box.
    pub position: PixelPosition,
    /// Width and height of the box.
    pub size: PixelSize,
}

impl EntityBox {
    /// Creates a bounding box from its corner and size.
    #[must_use]
    pub const fn new(position: PixelPosition, size: PixelSize) -> Self {
        Self { position, size }
    }
}

/// Borrowed read-only view over a tile grid.
///
/// Holding a view borrows the owning grid immutably, so the streaming engine
/// cannot advance while a reader still looks at the previous tick.
#[derive(Clone, Copy, Debug)]
pub struct TileView<'a> {
    tiles: &'a [[TileCode; COLUMNS]; ROWS],
}

impl<'a> TileView<'a> {
    /// Captures a view backed by the provided rows.
    #[must_use]
    pub const fn new(tiles: &'a [[TileCode; COLUMNS]; ROWS]) -> Self {
        Self { tiles }
    }

    /// Returns the tile at the coordinate, or `None` outside the grid.
    #[must_use]
    pub fn tile(&self, coordinate: TileCoordinate) -> Option<TileCode> {
        let (row, column) = coordinate.indices()?;
        Some(self.tiles[row][column])
    }

    /// Reports whether the coordinate holds a solid tile.
    #[must_use]
    pub fn is_solid(&self, coordinate: TileCoordinate) -> bool {
        self.tile(coordinate).is_some_and(|code| code.is_solid())
    }

    /// Iterator over the rows of the grid, top to bottom.
    pub fn rows(&self) -> impl Iterator<Item = &'a [TileCode; COLUMNS]> + 'a {
        self.tiles.iter()
    }
}

/// Name of an entity kind, such as `coin` or `slime`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityKind(String);

impl EntityKind {
    /// Creates a new kind name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Name of the kind.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Reference to an image resource, resolved by the asset provider.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AssetRef(String);

impl AssetRef {
    /// Creates a new asset reference from a resource path.
    #[must_use]
    pub fn new(path: impl Into<String>) -> Self {
        Self(path.into())
    }

    /// Resource path of the asset.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AssetRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Name of a map segment resource.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SegmentId(String);

impl SegmentId {
    /// Creates a segment identifier from its resource name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Resource name of the segment.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SegmentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Descriptor handed to the entity constructor when a marker tile enters the
/// active grid.
#[derive(Clone, Debug, PartialEq)]
pub struct SpawnRequest {
    /// Kind of entity to construct.
    pub kind: EntityKind,
    /// Tile holding the marker that triggered the spawn. Entities hand this
    /// back through [`Command::ClearTile`] when they are consumed.
    pub tile: TileCoordinate,
    /// Initial pixel position of the entity.
    pub position: PixelPosition,
    /// Image the entity should be drawn with.
    pub asset: AssetRef,
}

/// Dynamic object whose position the world adjusts while scrolling.
pub trait Entity {
    /// Current upper-left corner in world pixels.
    fn position(&self) -> PixelPosition;

    /// Moves the entity to a new position.
    fn set_position(&mut self, position: PixelPosition);

    /// Extent of the entity's bounding box.
    fn size(&self) -> PixelSize;

    /// Bounding box at the current position.
    fn bounds(&self) -> EntityBox {
        EntityBox::new(self.position(), self.size())
    }
}

/// Failure reported by an entity constructor.
pub type ConstructError = Box<dyn Error + Send + Sync>;

/// Entity construction service owned by the surrounding game.
///
/// The constructor carries whatever game context its entities need; calls are
/// synchronous and must not touch the tile grid.
pub trait EntityConstructor {
    /// Entity type produced by the constructor.
    type Entity: Entity;

    /// Builds a live entity for the provided spawn request.
    fn construct(&mut self, request: &SpawnRequest) -> Result<Self::Entity, ConstructError>;
}

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    /// Advances the world by exactly one tile column.
    Scroll,
    /// Resets the tile at the coordinate to blank, typically after the entity
    /// spawned from it was consumed.
    ClearTile {
        /// Tile to clear.
        tile: TileCoordinate,
    },
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    /// Confirms that the active grid advanced by one column.
    Scrolled {
        /// Number of scroll steps completed since construction.
        tick: u64,
    },
    /// Confirms that an entity was constructed from a marker tile.
    EntitySpawned {
        /// Kind of the new entity.
        kind: EntityKind,
        /// Tile holding the marker.
        tile: TileCoordinate,
        /// Asset chosen for the entity.
        asset: AssetRef,
    },
    /// Reports entities dropped after scrolling past the left edge.
    EntitiesEvicted {
        /// Number of entities removed in the step.
        count: usize,
    },
    /// Announces that a fresh segment was loaded into the staged grid.
    SegmentStaged {
        /// Segment that now backs the staged grid.
        segment: SegmentId,
    },
    /// Confirms that a tile was reset to blank.
    TileCleared {
        /// Tile that was cleared.
        tile: TileCoordinate,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{de::DeserializeOwned, Serialize};

    #[test]
    fn tile_round_trip_through_pixels() {
        for tile in -200..200 {
            assert_eq!(pixels_to_tile(f64::from(tile_to_pixels(tile))), tile);
        }
    }

    #[test]
    fn negative_pixels_floor_to_left_tile() {
        assert_eq!(pixels_to_tile(-1.0), -1);
        assert_eq!(pixels_to_tile(-32.0), -1);
        assert_eq!(pixels_to_tile(-32.5), -2);
    }

    #[test]
    fn pixels_inside_tile_map_to_its_origin() {
        assert_eq!(pixels_to_tile(0.0), 0);
        assert_eq!(pixels_to_tile(31.999), 0);
        assert_eq!(pixels_to_tile(32.0), 1);
        assert_eq!(tile_to_pixels(3), 96);
    }

    #[test]
    fn pixel_position_maps_to_containing_tile() {
        assert_eq!(PixelPosition::new(95.9, 32.0).tile(), TileCoordinate::new(2, 1));
        assert_eq!(PixelPosition::new(-0.5, 0.0).tile(), TileCoordinate::new(-1, 0));
        assert_eq!(TileCoordinate::new(7, 3).origin().tile(), TileCoordinate::new(7, 3));
    }

    #[test]
    fn coordinates_outside_grid_have_no_indices() {
        assert_eq!(TileCoordinate::new(0, 0).indices(), Some((0, 0)));
        assert_eq!(TileCoordinate::new(59, 19).indices(), Some((19, 59)));
        assert!(!TileCoordinate::new(-1, 0).in_bounds());
        assert!(!TileCoordinate::new(60, 0).in_bounds());
        assert!(!TileCoordinate::new(0, 20).in_bounds());
    }

    #[test]
    fn view_reports_solid_tiles_only_inside_grid() {
        let mut tiles = [[TileCode::BLANK; COLUMNS]; ROWS];
        tiles[2][3] = TileCode::BLOCK;
        tiles[4][5] = TileCode::new('o');
        let view = TileView::new(&tiles);

        assert!(view.is_solid(TileCoordinate::new(3, 2)));
        assert!(!view.is_solid(TileCoordinate::new(5, 4)));
        assert!(!view.is_solid(TileCoordinate::new(-1, 2)));
        assert_eq!(view.tile(TileCoordinate::new(5, 4)), Some(TileCode::new('o')));
        assert_eq!(view.rows().count(), ROWS);
    }

    #[test]
    fn terrain_codes_are_not_markers() {
        assert!(TileCode::BLANK.is_terrain());
        assert!(TileCode::BLOCK.is_terrain());
        assert!(!TileCode::new('o').is_terrain());
    }

    fn assert_round_trip<T>(value: &T)
    where
        T: Serialize + DeserializeOwned + PartialEq + std::fmt::Debug,
    {
        let bytes = bincode::serialize(value).expect("serialize");
        let restored: T = bincode::deserialize(&bytes).expect("deserialize");
        assert_eq!(&restored, value);
    }

    #[test]
    fn tile_coordinate_round_trips_through_bincode() {
        assert_round_trip(&TileCoordinate::new(-1, 7));
    }

    #[test]
    fn segment_id_round_trips_through_bincode() {
        assert_round_trip(&SegmentId::new("map03.dat"));
    }
}
