//! Tunable behaviour of the world, deserialisable from configuration files.

use serde::{Deserialize, Serialize};

use crate::segment::{SegmentPool, UnknownTilePolicy};

/// What happens to a marker tile once its entity has been spawned.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpawnMarkerPolicy {
    /// Leave the marker in the grid. Markers never collide, and they cannot
    /// spawn twice because spawning only happens when a column enters.
    #[default]
    Retain,
    /// Blank the marker as soon as the entity exists.
    Clear,
}

/// Configuration applied when constructing a world.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Treatment of tile codes outside the known alphabet.
    pub unknown_tiles: UnknownTilePolicy,
    /// Treatment of marker tiles after spawning.
    pub spawn_markers: SpawnMarkerPolicy,
    /// Segments used to refill the staged grid.
    pub segment_pool: SegmentPool,
    /// Seed for segment and variant selection. `None` draws from OS entropy.
    pub rng_seed: Option<u64>,
}

impl Config {
    /// Returns the configuration with a fixed random seed.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng_seed = Some(seed);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_stock_game() {
        let config = Config::default();

        assert_eq!(config.unknown_tiles, UnknownTilePolicy::Strict);
        assert_eq!(config.spawn_markers, SpawnMarkerPolicy::Retain);
        assert_eq!(config.segment_pool.count, 10);
        assert_eq!(config.rng_seed, None);
    }

    #[test]
    fn parses_partial_toml() {
        let config: Config = toml::from_str(
            r#"
            unknown_tiles = "lenient"
            rng_seed = 99

            [segment_pool]
            count = 3
            "#,
        )
        .expect("valid configuration");

        assert_eq!(config.unknown_tiles, UnknownTilePolicy::Lenient);
        assert_eq!(config.spawn_markers, SpawnMarkerPolicy::Retain);
        assert_eq!(config.segment_pool.count, 3);
        assert_eq!(config.rng_seed, Some(99));
    }

    #[test]
    fn rejects_unknown_policy_name() {
        let result: Result<Config, _> = toml::from_str(r#"spawn_markers = "explode""#);
        assert!(result.is_err());
    }
}
