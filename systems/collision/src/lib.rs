#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Swept axis-aligned collision queries against static terrain.

use scroll_runner_core::{pixels_to_tile, EntityBox, PixelPosition, TileCoordinate, TileView};

/// Returns the first tile obstructing a move of `entity` to `proposed`.
///
/// The query samples every tile touched by the rectangle that covers both the
/// current box and the box at the proposed position. Columns are scanned in
/// the outer loop and rows in the inner loop, so ties resolve to the leftmost
/// column and then the topmost row. Tiles outside the grid count as
/// obstructions and are reported unclamped, letting callers tell a fall off
/// the world apart from a wall.
#[must_use]
pub fn query_collision(
    tiles: TileView<'_>,
    entity: EntityBox,
    proposed: PixelPosition,
) -> Option<TileCoordinate> {
    let swept = SweptRect::covering(entity, proposed);

    for column in swept.from_column..=swept.to_column {
        for row in swept.from_row..=swept.to_row {
            let coordinate = TileCoordinate::new(column, row);
            if is_world_edge(coordinate) || tiles.is_solid(coordinate) {
                return Some(coordinate);
            }
        }
    }

    None
}

/// Reports whether `coordinate` lies beyond the grid, as opposed to a solid
/// tile inside it.
#[must_use]
pub fn is_world_edge(coordinate: TileCoordinate) -> bool {
    !coordinate.in_bounds()
}

/// Inclusive tile range covered by a move.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct SweptRect {
    from_column: i32,
    from_row: i32,
    to_column: i32,
    to_row: i32,
}

impl SweptRect {
    fn covering(entity: EntityBox, proposed: PixelPosition) -> Self {
        let current = entity.position;
        let size = entity.size;

        // Sub-pixel deltas slip past tile edges without the ceiling.
        let from_column = pixels_to_tile(current.x.min(proposed.x.ceil()));
        let from_row = pixels_to_tile(current.y.min(proposed.y.ceil()));
        let to_column = pixels_to_tile(current.x.max(proposed.x) + size.width - 1.0);
        let to_row = pixels_to_tile(current.y.max(proposed.y) + size.height - 1.0);

        Self {
            from_column,
            from_row,
            to_column,
            to_row,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scroll_runner_core::PixelSize;

    fn tile_box(x: f64, y: f64) -> EntityBox {
        EntityBox::new(PixelPosition::new(x, y), PixelSize::tile())
    }

    #[test]
    fn swept_rect_spans_both_positions() {
        let swept = SweptRect::covering(tile_box(64.0, 64.0), PixelPosition::new(96.0, 64.0));
        assert_eq!(
            swept,
            SweptRect {
                from_column: 2,
                from_row: 2,
                to_column: 3,
                to_row: 2,
            }
        );
    }

    #[test]
    fn swept_rect_rounds_proposed_origin_up() {
        let swept = SweptRect::covering(tile_box(64.0, 64.0), PixelPosition::new(63.2, 64.0));
        assert_eq!(swept.from_column, 2);
        assert_eq!(swept.to_column, 2);
    }

    #[test]
    fn world_edge_detection_matches_grid_extent() {
        assert!(is_world_edge(TileCoordinate::new(-1, 0)));
        assert!(is_world_edge(TileCoordinate::new(60, 0)));
        assert!(is_world_edge(TileCoordinate::new(0, 20)));
        assert!(!is_world_edge(TileCoordinate::new(59, 19)));
    }
}
