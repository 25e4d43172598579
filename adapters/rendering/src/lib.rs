#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Rendering contracts for Scroll Runner adapters.
//!
//! Nothing here draws pixels. The adapter works out which terrain tiles fall
//! inside the current viewport and pairs each with a resolved image handle;
//! a backend turns the resulting [`DrawCall`]s into actual draws.

use std::{collections::HashMap, ops::Range};

use anyhow::{Context, Result as AnyResult};
use glam::IVec2;
use scroll_runner_core::{
    pixels_to_tile, tile_to_pixels, AssetRef, TileCoordinate, TileView, COLUMNS, ROWS,
};

/// Image drawn for every solid terrain tile.
pub const BLOCK_ASSET: &str = "block.gif";

/// Frame geometry supplied by the backend on every render call.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Viewport {
    /// Drawing offset in pixels added to every tile position. Scrolling right
    /// makes the horizontal offset negative.
    pub offset: IVec2,
    /// Frame width and height in pixels.
    pub size: IVec2,
}

impl Viewport {
    /// Creates a viewport from its offset and frame size.
    #[must_use]
    pub const fn new(offset: IVec2, size: IVec2) -> Self {
        Self { offset, size }
    }
}

/// Returns the top-left pixel position of every solid tile inside `viewport`,
/// in row-major order.
#[must_use]
pub fn visible_solid_tiles(tiles: TileView<'_>, viewport: Viewport) -> Vec<IVec2> {
    let columns = visible_range(viewport.offset.x, viewport.size.x, COLUMNS);
    let rows = visible_range(viewport.offset.y, viewport.size.y, ROWS);

    let mut positions = Vec::new();
    for row in rows {
        for column in columns.clone() {
            if tiles.is_solid(TileCoordinate::new(column, row)) {
                positions.push(IVec2::new(
                    tile_to_pixels(column) + viewport.offset.x,
                    tile_to_pixels(row) + viewport.offset.y,
                ));
            }
        }
    }
    positions
}

/// Tile indices along one axis that may overlap a frame of `extent` pixels.
///
/// One extra tile is included so partially visible tiles at the far edge are
/// drawn; both ends are clamped to the grid along this axis only.
fn visible_range(offset: i32, extent: i32, limit: usize) -> Range<i32> {
    let limit = i32::try_from(limit).unwrap_or(i32::MAX);
    let start = pixels_to_tile(-f64::from(offset)).max(0);
    let end = start
        .saturating_add(pixels_to_tile(f64::from(extent)))
        .saturating_add(1)
        .min(limit);
    start..end.max(start)
}

/// Resolves asset references to backend image handles.
pub trait AssetProvider {
    /// Backend-specific drawable handle.
    type Handle;

    /// Loads or looks up the image behind `asset`.
    fn resolve(&mut self, asset: &AssetRef) -> AnyResult<Self::Handle>;
}

/// Single image placement produced for a frame.
#[derive(Debug, PartialEq, Eq)]
pub struct DrawCall<'a, H> {
    /// Image to draw.
    pub image: &'a H,
    /// Screen position of the image's top-left corner.
    pub position: IVec2,
}

/// Produces terrain draw calls using a block image resolved up front.
#[derive(Debug)]
pub struct TerrainRenderer<H> {
    block: H,
}

impl<H> TerrainRenderer<H> {
    /// Resolves the block image through `provider`.
    pub fn new<P>(provider: &mut P) -> AnyResult<Self>
    where
        P: AssetProvider<Handle = H>,
    {
        let block = provider
            .resolve(&AssetRef::new(BLOCK_ASSET))
            .with_context(|| format!("failed to load terrain image `{BLOCK_ASSET}`"))?;
        Ok(Self { block })
    }

    /// Handle used for solid tiles.
    #[must_use]
    pub fn block(&self) -> &H {
        &self.block
    }

    /// Draw calls for every solid tile visible in `viewport`.
    #[must_use]
    pub fn draw_calls(&self, tiles: TileView<'_>, viewport: Viewport) -> Vec<DrawCall<'_, H>> {
        visible_solid_tiles(tiles, viewport)
            .into_iter()
            .map(|position| DrawCall {
                image: &self.block,
                position,
            })
            .collect()
    }
}

/// Caches handles for entity sprites so each asset is resolved once.
#[derive(Debug)]
pub struct SpriteCache<P>
where
    P: AssetProvider,
{
    provider: P,
    handles: HashMap<AssetRef, P::Handle>,
}

impl<P> SpriteCache<P>
where
    P: AssetProvider,
{
    /// Creates an empty cache backed by `provider`.
    #[must_use]
    pub fn new(provider: P) -> Self {
        Self {
            provider,
            handles: HashMap::new(),
        }
    }

    /// Returns the handle for `asset`, resolving it on first use.
    pub fn get(&mut self, asset: &AssetRef) -> AnyResult<&P::Handle> {
        if !self.handles.contains_key(asset) {
            let handle = self
                .provider
                .resolve(asset)
                .with_context(|| format!("failed to load sprite `{asset}`"))?;
            let _ = self.handles.insert(asset.clone(), handle);
        }
        self.handles
            .get(asset)
            .with_context(|| format!("sprite `{asset}` missing from cache"))
    }

    /// Number of distinct sprites resolved so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.handles.len()
    }

    /// Returns `true` when nothing has been resolved yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    /// Provider backing the cache.
    #[must_use]
    pub fn provider(&self) -> &P {
        &self.provider
    }
}
