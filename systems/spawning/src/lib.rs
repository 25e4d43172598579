#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Spawn registry that turns marker tiles into entity construction requests.
//!
//! The registry is a dispatch table keyed by [`TileCode`]. New entity kinds
//! register a [`SpawnRule`] instead of extending a conditional, and the world
//! consults the table whenever a marker column enters the active grid.

use std::collections::BTreeMap;

use rand::Rng;
use scroll_runner_core::{AssetRef, EntityKind, SpawnRequest, TileCode, TileCoordinate};
use thiserror::Error;

const SLIME_VARIANTS: usize = 4;

/// Reasons a spawn rule cannot be registered.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum RegistrationError {
    /// Blank and block tiles are terrain and never spawn entities.
    #[error("tile code {0} is reserved for terrain")]
    ReservedCode(TileCode),
    /// A rule must offer at least one asset to draw the entity with.
    #[error("spawn rule for `{0}` lists no asset variants")]
    NoVariants(EntityKind),
}

/// Construction rule describing the entity spawned from a marker tile.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SpawnRule {
    kind: EntityKind,
    variants: Vec<AssetRef>,
}

impl SpawnRule {
    /// Creates a rule that always uses the same asset.
    #[must_use]
    pub fn new(kind: EntityKind, asset: AssetRef) -> Self {
        Self {
            kind,
            variants: vec![asset],
        }
    }

    /// Creates a rule that picks one of several assets at random per spawn.
    pub fn with_variants(
        kind: EntityKind,
        variants: Vec<AssetRef>,
    ) -> Result<Self, RegistrationError> {
        if variants.is_empty() {
            return Err(RegistrationError::NoVariants(kind));
        }
        Ok(Self { kind, variants })
    }

    /// Kind of entity the rule constructs.
    #[must_use]
    pub fn kind(&self) -> &EntityKind {
        &self.kind
    }

    /// Assets the rule chooses from.
    #[must_use]
    pub fn variants(&self) -> &[AssetRef] {
        &self.variants
    }

    /// Builds the request for an entity whose marker sits at `tile`.
    ///
    /// Rules with several variants draw one uniformly from `rng`, so the
    /// chosen asset is only reproducible under a seeded generator. Single
    /// variant rules leave the generator untouched.
    pub fn request<R>(&self, tile: TileCoordinate, rng: &mut R) -> SpawnRequest
    where
        R: Rng + ?Sized,
    {
        let index = if self.variants.len() > 1 {
            rng.gen_range(0..self.variants.len())
        } else {
            0
        };

        SpawnRequest {
            kind: self.kind.clone(),
            tile,
            position: tile.origin(),
            asset: self.variants[index].clone(),
        }
    }
}

/// Dispatch table from marker tile codes to spawn rules.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SpawnRegistry {
    rules: BTreeMap<TileCode, SpawnRule>,
}

impl SpawnRegistry {
    /// Creates a registry without any rules.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            rules: BTreeMap::new(),
        }
    }

    /// Creates the registry used by the stock game content.
    ///
    /// | code | kind | asset |
    /// |------|------|-------|
    /// | `o` | coin | `coin.gif` |
    /// | `j` | grandfather | `grandfather.png` |
    /// | `s` | slime | `slime/slime0.png` to `slime/slime3.png` |
    /// | `d` | animal | `animal/animal0.png` |
    /// | `c` | animal | `animal/animal1.png` |
    #[must_use]
    pub fn standard() -> Self {
        let mut registry = Self::empty();
        registry.insert('o', SpawnRule::new(kind("coin"), AssetRef::new("coin.gif")));
        registry.insert(
            'j',
            SpawnRule::new(kind("grandfather"), AssetRef::new("grandfather.png")),
        );
        registry.insert(
            's',
            SpawnRule {
                kind: kind("slime"),
                variants: (0..SLIME_VARIANTS)
                    .map(|index| AssetRef::new(format!("slime/slime{index}.png")))
                    .collect(),
            },
        );
        registry.insert(
            'd',
            SpawnRule::new(kind("animal"), AssetRef::new("animal/animal0.png")),
        );
        registry.insert(
            'c',
            SpawnRule::new(kind("animal"), AssetRef::new("animal/animal1.png")),
        );
        registry
    }

    /// Registers a rule for `code`, returning the rule it replaced.
    pub fn register(
        &mut self,
        code: TileCode,
        rule: SpawnRule,
    ) -> Result<Option<SpawnRule>, RegistrationError> {
        if code.is_terrain() {
            return Err(RegistrationError::ReservedCode(code));
        }
        Ok(self.rules.insert(code, rule))
    }

    /// Looks up the rule for `code`. Terrain and unmapped codes have none.
    #[must_use]
    pub fn spawn_rule_for(&self, code: TileCode) -> Option<&SpawnRule> {
        self.rules.get(&code)
    }

    /// Reports whether `code` belongs to the segment alphabet: terrain or a
    /// registered marker.
    #[must_use]
    pub fn recognizes(&self, code: TileCode) -> bool {
        code.is_terrain() || self.rules.contains_key(&code)
    }

    /// Iterator over the registered marker codes in ascending order.
    pub fn codes(&self) -> impl Iterator<Item = TileCode> + '_ {
        self.rules.keys().copied()
    }

    fn insert(&mut self, code: char, rule: SpawnRule) {
        let _ = self.rules.insert(TileCode::new(code), rule);
    }
}

impl Default for SpawnRegistry {
    fn default() -> Self {
        Self::standard()
    }
}

fn kind(name: &str) -> EntityKind {
    EntityKind::new(name)
}
