//! Sprite library
//!
//! Loaded once at startup; every entity of a kind shares the same
//! definition.

use crate::entity::CreatureKind;
use gloam_sprite::{LoadError, SpriteDefinition, load_path};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

/// Sprite name used for every player
pub const PLAYER_SPRITE: &str = "player";

/// Default sprite directory
pub const DEFAULT_SPRITE_DIR: &str = "sprites";

/// Definitions by sprite name
#[derive(Debug, Clone, Default)]
pub struct SpriteLibrary {
    sprites: HashMap<String, Arc<SpriteDefinition>>,
}

impl SpriteLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load `player.yaml` and one file per creature kind from a directory
    pub fn load_dir(dir: impl AsRef<Path>) -> Result<Self, LoadError> {
        let dir = dir.as_ref();
        let mut library = Self::new();
        let names = std::iter::once(PLAYER_SPRITE)
            .chain(CreatureKind::ALL.iter().map(CreatureKind::sprite_name));

        for name in names {
            let path = sprite_path(dir, name);
            let definition = load_path(&path)?;
            debug!(sprite = name, path = %path.display(), "loaded sprite");
            library.insert(name, definition);
        }

        Ok(library)
    }

    /// Register a definition under a sprite name
    pub fn insert(&mut self, name: impl Into<String>, definition: SpriteDefinition) {
        self.sprites.insert(name.into(), Arc::new(definition));
    }

    pub fn get(&self, name: &str) -> Option<Arc<SpriteDefinition>> {
        self.sprites.get(name).cloned()
    }

    pub fn len(&self) -> usize {
        self.sprites.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sprites.is_empty()
    }
}

/// File a sprite is loaded from
pub fn sprite_path(dir: &Path, name: &str) -> PathBuf {
    dir.join(format!("{name}.yaml"))
}
