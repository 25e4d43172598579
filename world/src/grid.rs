//! Fixed-size tile storage backing the active and staged grids.

use std::fmt;

use scroll_runner_core::{SegmentId, TileCode, TileCoordinate, TileView, COLUMNS, ROWS};

use crate::{
    error::{LoadError, OutOfBoundsError},
    segment::{SegmentParser, SegmentSource},
};

/// Dense ROWS×COLUMNS array of tile codes.
///
/// The storage never grows or shrinks; scrolling moves codes within the
/// existing buffer. Cloning yields an owned snapshot for readers that must
/// outlive the current tick.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TileGrid {
    tiles: [[TileCode; COLUMNS]; ROWS],
}

impl TileGrid {
    /// Creates a grid filled with blank tiles.
    #[must_use]
    pub fn blank() -> Self {
        Self::from_rows([[TileCode::BLANK; COLUMNS]; ROWS])
    }

    /// Wraps pre-built rows.
    #[must_use]
    pub const fn from_rows(tiles: [[TileCode; COLUMNS]; ROWS]) -> Self {
        Self { tiles }
    }

    /// Fetches `segment` from `source` and parses it into a grid.
    pub fn load<S>(
        source: &mut S,
        segment: &SegmentId,
        parser: &SegmentParser,
    ) -> Result<Self, LoadError>
    where
        S: SegmentSource + ?Sized,
    {
        let text = source
            .fetch(segment)
            .map_err(|source| LoadError::Unavailable {
                segment: segment.clone(),
                source,
            })?;
        parser.parse(segment, &text)
    }

    /// Returns the code stored at `coordinate`.
    pub fn tile_at(&self, coordinate: TileCoordinate) -> Result<TileCode, OutOfBoundsError> {
        let (row, column) = indices(coordinate)?;
        Ok(self.tiles[row][column])
    }

    /// Resets the tile at `coordinate` to blank.
    pub fn clear_tile(&mut self, coordinate: TileCoordinate) -> Result<(), OutOfBoundsError> {
        let (row, column) = indices(coordinate)?;
        self.tiles[row][column] = TileCode::BLANK;
        Ok(())
    }

    /// Copies out the codes of column `column`, top to bottom.
    #[must_use]
    pub fn column(&self, column: usize) -> Option<[TileCode; ROWS]> {
        (column < COLUMNS).then(|| std::array::from_fn(|row| self.tiles[row][column]))
    }

    /// Copies out column 0, the next column to leave the grid.
    pub(crate) fn leading_column(&self) -> [TileCode; ROWS] {
        std::array::from_fn(|row| self.tiles[row][0])
    }

    /// Drops column 0, moves every other column one place left and writes
    /// `incoming` into the rightmost column.
    pub fn shift_left_and_append(&mut self, incoming: [TileCode; ROWS]) {
        for (row, code) in self.tiles.iter_mut().zip(incoming) {
            row.copy_within(1.., 0);
            row[COLUMNS - 1] = code;
        }
    }

    /// Borrows a read-only view of the grid.
    #[must_use]
    pub fn view(&self) -> TileView<'_> {
        TileView::new(&self.tiles)
    }

    /// Iterator over every stored tile with its coordinate, in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = (TileCoordinate, TileCode)> + '_ {
        self.tiles.iter().enumerate().flat_map(|(row, codes)| {
            codes
                .iter()
                .enumerate()
                .map(move |(column, code)| (coordinate(column, row), *code))
        })
    }
}

impl Default for TileGrid {
    fn default() -> Self {
        Self::blank()
    }
}

impl fmt::Display for TileGrid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, row) in self.tiles.iter().enumerate() {
            if index > 0 {
                f.write_str("\n")?;
            }
            for code in row {
                write!(f, "{}", code.as_char())?;
            }
        }
        Ok(())
    }
}

/// Builds the coordinate of a stored tile. Grid extents fit comfortably in `i32`.
pub(crate) fn coordinate(column: usize, row: usize) -> TileCoordinate {
    TileCoordinate::new(column as i32, row as i32)
}

fn indices(coordinate: TileCoordinate) -> Result<(usize, usize), OutOfBoundsError> {
    coordinate.indices().ok_or(OutOfBoundsError { coordinate })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn numbered_grid() -> TileGrid {
        let mut tiles = [[TileCode::BLANK; COLUMNS]; ROWS];
        for row in tiles.iter_mut() {
            for (column, code) in row.iter_mut().enumerate() {
                *code = TileCode::new(char::from(b'0' + (column % 10) as u8));
            }
        }
        TileGrid::from_rows(tiles)
    }

    #[test]
    fn shift_moves_every_row() {
        let mut grid = numbered_grid();
        grid.shift_left_and_append([TileCode::BLOCK; ROWS]);

        for row in 0..ROWS as i32 {
            assert_eq!(
                grid.tile_at(TileCoordinate::new(0, row)),
                Ok(TileCode::new('1'))
            );
            assert_eq!(
                grid.tile_at(TileCoordinate::new(58, row)),
                Ok(TileCode::new('9'))
            );
            assert_eq!(
                grid.tile_at(TileCoordinate::new(59, row)),
                Ok(TileCode::BLOCK)
            );
        }
    }

    #[test]
    fn column_copies_top_to_bottom() {
        let mut grid = TileGrid::blank();
        grid.tiles[3][7] = TileCode::new('o');

        let column = grid.column(7).expect("column inside grid");
        assert_eq!(column[3], TileCode::new('o'));
        assert_eq!(column.iter().filter(|code| code.is_blank()).count(), ROWS - 1);
        assert!(grid.column(COLUMNS).is_none());
        assert_eq!(grid.leading_column(), [TileCode::BLANK; ROWS]);
    }

    #[test]
    fn tile_access_rejects_coordinates_outside_grid() {
        let mut grid = TileGrid::blank();
        let outside = TileCoordinate::new(-1, 0);

        assert_eq!(
            grid.tile_at(outside),
            Err(OutOfBoundsError {
                coordinate: outside
            })
        );
        assert!(grid.clear_tile(TileCoordinate::new(0, ROWS as i32)).is_err());
    }

    #[test]
    fn clear_tile_blanks_marker() {
        let mut grid = TileGrid::blank();
        grid.tiles[0][0] = TileCode::new('o');

        grid.clear_tile(TileCoordinate::new(0, 0)).unwrap();
        assert_eq!(grid.tile_at(TileCoordinate::new(0, 0)), Ok(TileCode::BLANK));
    }

    #[test]
    fn display_renders_one_line_per_row() {
        let rendered = TileGrid::blank().to_string();
        let lines: Vec<&str> = rendered.lines().collect();

        assert_eq!(lines.len(), ROWS);
        assert!(lines.iter().all(|line| line.chars().count() == COLUMNS));
    }
}
