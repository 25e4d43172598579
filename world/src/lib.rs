#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative tile-map state for Scroll Runner.
//!
//! The world owns two fixed-size grids: the *active* grid that is visible and
//! collidable, and the *staged* grid holding the next segment of terrain.
//! Every [`Command::Scroll`] moves one column from the staged grid into the
//! active grid, spawns entities for the markers it carries, scrolls and
//! evicts tracked entities, and refills the staged grid from a random pool
//! segment once it has been fully consumed.

mod config;
mod error;
mod grid;
mod segment;

use std::fmt;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use scroll_runner_core::{
    Command, Entity, EntityConstructor, Event, SegmentId, TileCode, TileCoordinate, COLUMNS,
    ROWS, TILE_SIZE,
};
use scroll_runner_system_spawning::SpawnRegistry;

pub use config::{Config, SpawnMarkerPolicy};
pub use error::{LoadError, OutOfBoundsError, SegmentLoadError, SpawnError, WorldError};
pub use grid::TileGrid;
pub use segment::{
    DirectorySource, MemorySource, SegmentParser, SegmentPool, SegmentSource, UnknownTilePolicy,
};

/// Number of scroll steps after which the staged grid is exhausted.
const STAGED_LIFETIME: usize = COLUMNS;

/// Counts scroll steps since the staged grid was last refilled.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
struct ScrollState {
    elapsed: usize,
}

impl ScrollState {
    fn advance(&mut self) {
        self.elapsed = self.elapsed.saturating_add(1);
    }

    /// A refresh that failed leaves the counter past the limit so the next
    /// step retries it.
    fn is_exhausted(&self) -> bool {
        self.elapsed >= STAGED_LIFETIME
    }

    fn reset(&mut self) {
        self.elapsed = 0;
    }
}

/// Represents the authoritative Scroll Runner world state.
pub struct World<C, S>
where
    C: EntityConstructor,
{
    config: Config,
    registry: SpawnRegistry,
    parser: SegmentParser,
    source: S,
    constructor: C,
    active: TileGrid,
    staged: TileGrid,
    staged_segment: SegmentId,
    entities: Vec<C::Entity>,
    scroll: ScrollState,
    rng: ChaCha8Rng,
    tick_index: u64,
}

impl<C, S> World<C, S>
where
    C: EntityConstructor,
    S: SegmentSource,
{
    /// Builds a world whose active grid holds `initial`.
    ///
    /// Every marker in the initial segment spawns its entity immediately; the
    /// staged grid is filled from a random pool segment and its markers stay
    /// inert until they scroll in. Any load or spawn failure aborts
    /// construction.
    pub fn new(
        config: Config,
        registry: SpawnRegistry,
        source: S,
        constructor: C,
        initial: &SegmentId,
    ) -> Result<Self, WorldError> {
        let mut spawned = Vec::new();
        Self::load(config, registry, source, constructor, initial, &mut spawned)
    }

    /// Same as [`World::new`], reporting an [`Event::EntitySpawned`] for every
    /// marker of the initial segment in `out_events`.
    pub fn load(
        config: Config,
        registry: SpawnRegistry,
        mut source: S,
        constructor: C,
        initial: &SegmentId,
        out_events: &mut Vec<Event>,
    ) -> Result<Self, WorldError> {
        let mut rng = match config.rng_seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };
        let parser = SegmentParser::new(config.unknown_tiles, registry.codes());

        let active = TileGrid::load(&mut source, initial, &parser)?;
        let staged_segment = config.segment_pool.pick(&mut rng)?;
        let staged = TileGrid::load(&mut source, &staged_segment, &parser)?;

        let mut world = Self {
            config,
            registry,
            parser,
            source,
            constructor,
            active,
            staged,
            staged_segment,
            entities: Vec::new(),
            scroll: ScrollState::default(),
            rng,
            tick_index: 0,
        };

        let markers: Vec<(TileCoordinate, TileCode)> = world
            .active
            .iter()
            .filter(|(_, code)| !code.is_terrain())
            .collect();
        for (tile, code) in markers {
            if let Some(event) = world.spawn_at(tile, code)? {
                out_events.push(event);
            }
        }

        log::info!(
            "world ready: initial segment `{initial}`, staged segment `{}`, {} entities",
            world.staged_segment,
            world.entities.len()
        );
        Ok(world)
    }

    /// Mutable access to the tracked entities, in spawn order.
    pub fn entities_mut(&mut self) -> &mut [C::Entity] {
        &mut self.entities
    }

    /// Segment source backing the world.
    #[must_use]
    pub fn source(&self) -> &S {
        &self.source
    }

    /// Mutable access to the segment source, for example to repair it after a
    /// failed refresh.
    pub fn source_mut(&mut self) -> &mut S {
        &mut self.source
    }

    /// Entity constructor backing the world.
    #[must_use]
    pub fn constructor(&self) -> &C {
        &self.constructor
    }

    fn scroll(&mut self, out_events: &mut Vec<Event>) -> Result<(), WorldError> {
        let incoming = self.staged.leading_column();
        self.active.shift_left_and_append(incoming);

        // A refused marker must not stop the rest of the column from spawning;
        // the column never enters again.
        let mut first_failure = None;
        let column = COLUMNS - 1;
        for (row, code) in incoming.into_iter().enumerate() {
            match self.spawn_at(grid::coordinate(column, row), code) {
                Ok(Some(event)) => out_events.push(event),
                Ok(None) => {}
                Err(error) => {
                    log::warn!("{error}");
                    if first_failure.is_none() {
                        first_failure = Some(error);
                    }
                }
            }
        }

        self.staged.shift_left_and_append([TileCode::BLANK; ROWS]);
        self.scroll_entities(out_events);

        self.scroll.advance();
        self.tick_index = self.tick_index.saturating_add(1);
        out_events.push(Event::Scrolled {
            tick: self.tick_index,
        });

        if self.scroll.is_exhausted() {
            if let Err(error) = self.refresh_staged(out_events) {
                if first_failure.is_none() {
                    return Err(error.into());
                }
                log::warn!("{error}; retrying on the next scroll");
            }
        }

        first_failure.map_or(Ok(()), Err)
    }

    /// Moves every tracked entity one tile left, including those spawned by
    /// the incoming column, and drops those that passed the left edge.
    fn scroll_entities(&mut self, out_events: &mut Vec<Event>) {
        let shift = f64::from(TILE_SIZE);
        for entity in &mut self.entities {
            let mut position = entity.position();
            position.x -= shift;
            entity.set_position(position);
        }

        let before = self.entities.len();
        self.entities.retain(|entity| entity.position().x >= 0.0);
        let count = before - self.entities.len();
        if count > 0 {
            out_events.push(Event::EntitiesEvicted { count });
        }
    }

    fn refresh_staged(&mut self, out_events: &mut Vec<Event>) -> Result<(), SegmentLoadError> {
        let segment = self.config.segment_pool.pick(&mut self.rng)?;
        self.staged = TileGrid::load(&mut self.source, &segment, &self.parser)?;
        self.staged_segment = segment.clone();
        self.scroll.reset();

        log::debug!("staged segment `{segment}` after tick {}", self.tick_index);
        out_events.push(Event::SegmentStaged { segment });
        Ok(())
    }

    fn spawn_at(
        &mut self,
        tile: TileCoordinate,
        code: TileCode,
    ) -> Result<Option<Event>, WorldError> {
        let Some(rule) = self.registry.spawn_rule_for(code) else {
            return Ok(None);
        };
        let request = rule.request(tile, &mut self.rng);

        let entity = self
            .constructor
            .construct(&request)
            .map_err(|source| SpawnError {
                kind: request.kind.clone(),
                tile,
                source,
            })?;
        self.entities.push(entity);

        if self.config.spawn_markers == SpawnMarkerPolicy::Clear {
            self.active.clear_tile(tile)?;
        }

        log::debug!("spawned {} at {tile} using {}", request.kind, request.asset);
        Ok(Some(Event::EntitySpawned {
            kind: request.kind,
            tile,
            asset: request.asset,
        }))
    }
}

impl<C, S> fmt::Debug for World<C, S>
where
    C: EntityConstructor,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("World")
            .field("config", &self.config)
            .field("staged_segment", &self.staged_segment)
            .field("entities", &self.entities.len())
            .field("scroll", &self.scroll)
            .field("tick_index", &self.tick_index)
            .finish_non_exhaustive()
    }
}

/// Applies the provided command to the world.
///
/// Failures are returned to the caller, who decides whether to retry, skip or
/// halt. A scroll step always completes: a refused spawn is reported after
/// the remaining markers of the column were offered to the constructor, and
/// a staged refresh that failed is retried on the next [`Command::Scroll`].
pub fn apply<C, S>(
    world: &mut World<C, S>,
    command: Command,
    out_events: &mut Vec<Event>,
) -> Result<(), WorldError>
where
    C: EntityConstructor,
    S: SegmentSource,
{
    match command {
        Command::Scroll => world.scroll(out_events),
        Command::ClearTile { tile } => {
            world.active.clear_tile(tile)?;
            out_events.push(Event::TileCleared { tile });
            Ok(())
        }
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use scroll_runner_core::{EntityConstructor, SegmentId, TileView};

    use super::{Config, TileGrid, World};

    /// Read-only view of the visible, collidable grid.
    #[must_use]
    pub fn active_tiles<C, S>(world: &World<C, S>) -> TileView<'_>
    where
        C: EntityConstructor,
    {
        world.active.view()
    }

    /// The active grid itself; clone it for a snapshot that outlives the borrow.
    #[must_use]
    pub fn active_grid<C, S>(world: &World<C, S>) -> &TileGrid
    where
        C: EntityConstructor,
    {
        &world.active
    }

    /// The staged grid itself.
    #[must_use]
    pub fn staged_grid<C, S>(world: &World<C, S>) -> &TileGrid
    where
        C: EntityConstructor,
    {
        &world.staged
    }

    /// Segment most recently loaded into the staged grid.
    #[must_use]
    pub fn staged_segment<C, S>(world: &World<C, S>) -> &SegmentId
    where
        C: EntityConstructor,
    {
        &world.staged_segment
    }

    /// Tracked entities in spawn order.
    #[must_use]
    pub fn entities<C, S>(world: &World<C, S>) -> &[C::Entity]
    where
        C: EntityConstructor,
    {
        &world.entities
    }

    /// Scroll steps since the staged grid was last refilled.
    #[must_use]
    pub fn scroll_progress<C, S>(world: &World<C, S>) -> usize
    where
        C: EntityConstructor,
    {
        world.scroll.elapsed
    }

    /// Scroll steps completed since construction.
    #[must_use]
    pub fn tick_index<C, S>(world: &World<C, S>) -> u64
    where
        C: EntityConstructor,
    {
        world.tick_index
    }

    /// Configuration the world was built with.
    #[must_use]
    pub fn config<C, S>(world: &World<C, S>) -> &Config
    where
        C: EntityConstructor,
    {
        &world.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scroll_state_exhausts_after_one_grid_width() {
        let mut state = ScrollState::default();
        for _ in 0..COLUMNS - 1 {
            state.advance();
        }
        assert!(!state.is_exhausted());

        state.advance();
        assert!(state.is_exhausted());

        state.advance();
        assert!(state.is_exhausted(), "a missed refresh stays pending");

        state.reset();
        assert!(!state.is_exhausted());
    }
}
