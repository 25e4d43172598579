//! Segment resources: where they come from and how they become grids.

use std::{
    collections::{BTreeSet, HashMap},
    fs, io,
    path::{Path, PathBuf},
};

use rand::Rng;
use scroll_runner_core::{SegmentId, TileCode, COLUMNS, ROWS};
use serde::{Deserialize, Serialize};

use crate::{
    error::LoadError,
    grid::{coordinate, TileGrid},
};

const DEFAULT_POOL_SIZE: u32 = 10;

/// Delivers the raw text of named segment resources.
pub trait SegmentSource {
    /// Reads the resource backing `segment`.
    fn fetch(&mut self, segment: &SegmentId) -> io::Result<String>;
}

/// Reads segments from files named after their identifier inside a directory.
#[derive(Clone, Debug)]
pub struct DirectorySource {
    root: PathBuf,
}

impl DirectorySource {
    /// Creates a source rooted at `root`.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Directory the source reads from.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl SegmentSource for DirectorySource {
    fn fetch(&mut self, segment: &SegmentId) -> io::Result<String> {
        fs::read_to_string(self.root.join(segment.as_str()))
    }
}

/// Serves segments held in memory.
#[derive(Clone, Debug, Default)]
pub struct MemorySource {
    segments: HashMap<SegmentId, String>,
}

impl MemorySource {
    /// Creates an empty source.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `text` under `segment`, replacing any previous text.
    pub fn insert(&mut self, segment: SegmentId, text: impl Into<String>) {
        let _ = self.segments.insert(segment, text.into());
    }

    /// Builder-style variant of [`MemorySource::insert`].
    #[must_use]
    pub fn with(mut self, segment: SegmentId, text: impl Into<String>) -> Self {
        self.insert(segment, text);
        self
    }
}

impl SegmentSource for MemorySource {
    fn fetch(&mut self, segment: &SegmentId) -> io::Result<String> {
        self.segments.get(segment).cloned().ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::NotFound,
                format!("no segment named `{segment}`"),
            )
        })
    }
}

/// Pool of interchangeable segments used to refill the staged grid.
///
/// Members are named `map00.dat`, `map01.dat` and so on up to `count - 1`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SegmentPool {
    /// Number of segments in the pool.
    pub count: u32,
}

impl SegmentPool {
    /// Creates a pool with `count` members.
    #[must_use]
    pub const fn new(count: u32) -> Self {
        Self { count }
    }

    /// Identifier of the pool member at `index`.
    #[must_use]
    pub fn segment(&self, index: u32) -> SegmentId {
        SegmentId::new(format!("map{index:02}.dat"))
    }

    /// Iterator over every member of the pool.
    pub fn segments(&self) -> impl Iterator<Item = SegmentId> + '_ {
        (0..self.count).map(|index| self.segment(index))
    }

    /// Picks a member uniformly at random, with replacement.
    pub fn pick<R>(&self, rng: &mut R) -> Result<SegmentId, LoadError>
    where
        R: Rng + ?Sized,
    {
        if self.count == 0 {
            return Err(LoadError::EmptyPool);
        }
        Ok(self.segment(rng.gen_range(0..self.count)))
    }
}

impl Default for SegmentPool {
    fn default() -> Self {
        Self::new(DEFAULT_POOL_SIZE)
    }
}

/// Treatment of codes outside the terrain and marker alphabet.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnknownTilePolicy {
    /// Reject the segment.
    #[default]
    Strict,
    /// Replace the code with a blank tile.
    Lenient,
}

/// Parses segment text into grids, validating shape and alphabet.
#[derive(Clone, Debug)]
pub struct SegmentParser {
    policy: UnknownTilePolicy,
    markers: BTreeSet<TileCode>,
}

impl SegmentParser {
    /// Creates a parser accepting terrain plus the provided marker codes.
    #[must_use]
    pub fn new(policy: UnknownTilePolicy, markers: impl IntoIterator<Item = TileCode>) -> Self {
        Self {
            policy,
            markers: markers.into_iter().collect(),
        }
    }

    /// Parses `text` as the contents of `segment`.
    ///
    /// The text must hold exactly [`ROWS`] lines of exactly [`COLUMNS`]
    /// characters. Both `\n` and `\r\n` terminators are accepted.
    pub fn parse(&self, segment: &SegmentId, text: &str) -> Result<TileGrid, LoadError> {
        let lines: Vec<&str> = text.lines().collect();
        if lines.len() != ROWS {
            return Err(LoadError::RowCount {
                segment: segment.clone(),
                expected: ROWS,
                found: lines.len(),
            });
        }

        let mut tiles = [[TileCode::BLANK; COLUMNS]; ROWS];
        let mut replaced = 0_usize;
        for (row, line) in lines.iter().enumerate() {
            let found = line.chars().count();
            if found != COLUMNS {
                return Err(LoadError::ColumnCount {
                    segment: segment.clone(),
                    row,
                    expected: COLUMNS,
                    found,
                });
            }

            for (column, character) in line.chars().enumerate() {
                let code = TileCode::new(character);
                if self.recognizes(code) {
                    tiles[row][column] = code;
                    continue;
                }

                match self.policy {
                    UnknownTilePolicy::Strict => {
                        return Err(LoadError::UnknownTile {
                            segment: segment.clone(),
                            tile: coordinate(column, row),
                            code,
                        });
                    }
                    UnknownTilePolicy::Lenient => replaced += 1,
                }
            }
        }

        if replaced > 0 {
            log::warn!("segment `{segment}`: treated {replaced} unknown tile codes as blank");
        }

        Ok(TileGrid::from_rows(tiles))
    }

    fn recognizes(&self, code: TileCode) -> bool {
        code.is_terrain() || self.markers.contains(&code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scroll_runner_core::TileCoordinate;

    fn blank_line() -> String {
        " ".repeat(COLUMNS)
    }

    fn text_with(row: usize, line: String) -> String {
        (0..ROWS)
            .map(|index| if index == row { line.clone() } else { blank_line() })
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn parser(policy: UnknownTilePolicy) -> SegmentParser {
        SegmentParser::new(policy, [TileCode::new('o')])
    }

    #[test]
    fn parses_markers_and_blocks() {
        let mut line = String::from("oB");
        line.push_str(&" ".repeat(COLUMNS - 2));
        let grid = parser(UnknownTilePolicy::Strict)
            .parse(&SegmentId::new("test"), &text_with(5, line))
            .expect("well-formed segment");

        assert_eq!(grid.tile_at(TileCoordinate::new(0, 5)), Ok(TileCode::new('o')));
        assert_eq!(grid.tile_at(TileCoordinate::new(1, 5)), Ok(TileCode::BLOCK));
        assert_eq!(grid.tile_at(TileCoordinate::new(2, 5)), Ok(TileCode::BLANK));
    }

    #[test]
    fn accepts_windows_line_endings() {
        let text = vec![blank_line(); ROWS].join("\r\n") + "\r\n";
        assert!(parser(UnknownTilePolicy::Strict)
            .parse(&SegmentId::new("crlf"), &text)
            .is_ok());
    }

    #[test]
    fn rejects_missing_rows() {
        let text = vec![blank_line(); ROWS - 1].join("\n");
        let error = parser(UnknownTilePolicy::Strict)
            .parse(&SegmentId::new("short"), &text)
            .unwrap_err();

        assert!(matches!(
            error,
            LoadError::RowCount {
                expected: ROWS,
                found,
                ..
            } if found == ROWS - 1
        ));
    }

    #[test]
    fn rejects_short_line() {
        let error = parser(UnknownTilePolicy::Strict)
            .parse(&SegmentId::new("narrow"), &text_with(3, " ".repeat(COLUMNS - 1)))
            .unwrap_err();

        assert!(matches!(
            error,
            LoadError::ColumnCount { row: 3, found, .. } if found == COLUMNS - 1
        ));
    }

    #[test]
    fn strict_policy_rejects_unknown_code() {
        let mut line = " ".repeat(COLUMNS - 1);
        line.push('x');
        let error = parser(UnknownTilePolicy::Strict)
            .parse(&SegmentId::new("odd"), &text_with(2, line))
            .unwrap_err();

        assert!(matches!(
            error,
            LoadError::UnknownTile { tile, code, .. }
                if tile == TileCoordinate::new(59, 2) && code == TileCode::new('x')
        ));
    }

    #[test]
    fn lenient_policy_blanks_unknown_code() {
        let mut line = " ".repeat(COLUMNS - 1);
        line.push('x');
        let grid = parser(UnknownTilePolicy::Lenient)
            .parse(&SegmentId::new("odd"), &text_with(2, line))
            .expect("lenient parsing accepts unknown codes");

        assert_eq!(grid.tile_at(TileCoordinate::new(59, 2)), Ok(TileCode::BLANK));
    }

    #[test]
    fn pool_names_follow_two_digit_convention() {
        let pool = SegmentPool::default();
        let names: Vec<String> = pool.segments().map(|id| id.as_str().to_owned()).collect();

        assert_eq!(names.len(), 10);
        assert_eq!(names[0], "map00.dat");
        assert_eq!(names[9], "map09.dat");
    }

    #[test]
    fn empty_pool_cannot_pick() {
        let mut rng = rand::rngs::mock::StepRng::new(0, 1);
        assert!(matches!(
            SegmentPool::new(0).pick(&mut rng),
            Err(LoadError::EmptyPool)
        ));
    }

    #[test]
    fn directory_source_reads_files_under_root() {
        let root = Path::new(env!("CARGO_MANIFEST_DIR")).join("../maps");
        let mut source = DirectorySource::new(&root);
        assert_eq!(source.root(), root.as_path());

        let text = source
            .fetch(&SegmentId::new("start.dat"))
            .expect("demo segment ships with the workspace");
        assert_eq!(text.lines().count(), ROWS);

        let error = source.fetch(&SegmentId::new("missing.dat")).unwrap_err();
        assert_eq!(error.kind(), io::ErrorKind::NotFound);
    }

    #[test]
    fn memory_source_reports_missing_segment() {
        let mut source = MemorySource::new().with(SegmentId::new("a"), "text");

        assert_eq!(source.fetch(&SegmentId::new("a")).unwrap(), "text");
        let error = source.fetch(&SegmentId::new("b")).unwrap_err();
        assert_eq!(error.kind(), io::ErrorKind::NotFound);
    }
}
