//! Windowless stand-ins for the entity and image collaborators.

use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
};

use anyhow::{bail, Result as AnyResult};
use scroll_runner_core::{
    AssetRef, ConstructError, Entity, EntityConstructor, EntityKind, PixelPosition, PixelSize,
    SpawnRequest,
};
use scroll_runner_rendering::{AssetProvider, SpriteCache};

/// Resolves images to file paths, optionally insisting that they exist.
#[derive(Clone, Debug, Default)]
pub(crate) struct FileImages {
    root: Option<PathBuf>,
}

impl FileImages {
    /// Without a root every reference resolves to its relative path unchecked.
    pub(crate) fn new(root: Option<PathBuf>) -> Self {
        Self { root }
    }
}

impl AssetProvider for FileImages {
    type Handle = PathBuf;

    fn resolve(&mut self, asset: &AssetRef) -> AnyResult<PathBuf> {
        let Some(root) = &self.root else {
            return Ok(PathBuf::from(asset.as_str()));
        };

        let path = root.join(asset.as_str());
        if !path.is_file() {
            bail!("image `{}` not found", path.display());
        }
        Ok(path)
    }
}

/// Entity tracked by the headless runner. It never moves on its own.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct Sprite {
    kind: EntityKind,
    image: PathBuf,
    position: PixelPosition,
}

impl Sprite {
    pub(crate) fn kind(&self) -> &EntityKind {
        &self.kind
    }

    pub(crate) fn image(&self) -> &Path {
        &self.image
    }
}

impl Entity for Sprite {
    fn position(&self) -> PixelPosition {
        self.position
    }

    fn set_position(&mut self, position: PixelPosition) {
        self.position = position;
    }

    fn size(&self) -> PixelSize {
        PixelSize::tile()
    }
}

/// Builds [`Sprite`]s, resolving each image once.
#[derive(Debug)]
pub(crate) struct Spawner {
    sprites: SpriteCache<FileImages>,
    spawned: BTreeMap<EntityKind, usize>,
}

impl Spawner {
    pub(crate) fn new(images: FileImages) -> Self {
        Self {
            sprites: SpriteCache::new(images),
            spawned: BTreeMap::new(),
        }
    }

    /// Entities constructed so far, per kind.
    pub(crate) fn spawned(&self) -> &BTreeMap<EntityKind, usize> {
        &self.spawned
    }

    pub(crate) fn images_loaded(&self) -> usize {
        self.sprites.len()
    }
}

impl EntityConstructor for Spawner {
    type Entity = Sprite;

    fn construct(&mut self, request: &SpawnRequest) -> Result<Sprite, ConstructError> {
        let image = self.sprites.get(&request.asset)?.clone();
        *self.spawned.entry(request.kind.clone()).or_default() += 1;

        Ok(Sprite {
            kind: request.kind.clone(),
            image,
            position: request.position,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scroll_runner_core::TileCoordinate;

    fn coin_request() -> SpawnRequest {
        let tile = TileCoordinate::new(2, 3);
        SpawnRequest {
            kind: EntityKind::new("coin"),
            tile,
            position: tile.origin(),
            asset: AssetRef::new("coin.gif"),
        }
    }

    #[test]
    fn unchecked_images_resolve_to_relative_paths() {
        let mut images = FileImages::new(None);
        assert_eq!(
            images.resolve(&AssetRef::new("slime/slime1.png")).unwrap(),
            PathBuf::from("slime/slime1.png")
        );
    }

    #[test]
    fn checked_images_must_exist() {
        let dir = tempfile::tempdir().expect("temporary directory");
        std::fs::write(dir.path().join("coin.gif"), b"GIF89a").unwrap();
        let mut images = FileImages::new(Some(dir.path().to_path_buf()));

        assert_eq!(
            images.resolve(&AssetRef::new("coin.gif")).unwrap(),
            dir.path().join("coin.gif")
        );
        assert!(images.resolve(&AssetRef::new("block.gif")).is_err());
    }

    #[test]
    fn spawner_counts_kinds_and_places_sprites() {
        let mut spawner = Spawner::new(FileImages::default());

        let sprite = spawner.construct(&coin_request()).unwrap();
        let _ = spawner.construct(&coin_request()).unwrap();

        assert_eq!(sprite.kind(), &EntityKind::new("coin"));
        assert_eq!(sprite.position(), PixelPosition::new(64.0, 96.0));
        assert_eq!(sprite.image(), Path::new("coin.gif"));
        assert_eq!(spawner.spawned().get(&EntityKind::new("coin")), Some(&2));
        assert_eq!(spawner.images_loaded(), 1);
    }

    #[test]
    fn missing_image_fails_construction() {
        let dir = tempfile::tempdir().expect("temporary directory");
        let mut spawner = Spawner::new(FileImages::new(Some(dir.path().to_path_buf())));

        let error = spawner.construct(&coin_request()).unwrap_err();
        assert!(error.to_string().contains("coin.gif"));
        assert!(spawner.spawned().is_empty());
    }
}
