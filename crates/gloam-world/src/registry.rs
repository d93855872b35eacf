//! Entity registry

use crate::entity::{Entity, EntityKind};
use crate::error::WorldError;
use crate::library::SpriteLibrary;
use gloam_core::EntityId;
use std::collections::HashMap;
use tracing::debug;

/// All entities known to the client
#[derive(Debug, Clone, PartialEq)]
pub struct EntityRegistry {
    players: HashMap<EntityId, Entity>,
    creatures: HashMap<EntityId, Entity>,
    self_entity: Entity,
}

impl EntityRegistry {
    /// Create a registry holding only the local player
    pub fn new(sprites: &SpriteLibrary) -> Result<Self, WorldError> {
        Ok(Self {
            players: HashMap::new(),
            creatures: HashMap::new(),
            self_entity: Entity::new(EntityId::new(), EntityKind::Player, sprites)?,
        })
    }

    pub fn self_entity(&self) -> &Entity {
        &self.self_entity
    }

    pub fn self_entity_mut(&mut self) -> &mut Entity {
        &mut self.self_entity
    }

    pub fn player(&self, id: &EntityId) -> Option<&Entity> {
        self.players.get(id)
    }

    pub fn creature(&self, id: &EntityId) -> Option<&Entity> {
        self.creatures.get(id)
    }

    pub fn players(&self) -> impl Iterator<Item = &Entity> {
        self.players.values()
    }

    pub fn creatures(&self) -> impl Iterator<Item = &Entity> {
        self.creatures.values()
    }

    /// Every entity, the local player last
    pub fn iter(&self) -> impl Iterator<Item = &Entity> {
        self.creatures
            .values()
            .chain(self.players.values())
            .chain(std::iter::once(&self.self_entity))
    }

    /// Get a player, creating it first if absent
    pub fn upsert_player(
        &mut self,
        id: EntityId,
        sprites: &SpriteLibrary,
    ) -> Result<&mut Entity, WorldError> {
        upsert(&mut self.players, id, sprites, || Ok(EntityKind::Player))
    }

    /// Get a creature, creating it first if absent
    ///
    /// `kind` is resolved only when the creature is new.
    pub fn upsert_creature(
        &mut self,
        id: EntityId,
        kind: Option<&str>,
        sprites: &SpriteLibrary,
    ) -> Result<&mut Entity, WorldError> {
        upsert(&mut self.creatures, id, sprites, || {
            let kind = kind.ok_or(WorldError::MissingField { id, field: "kind" })?;
            Ok(EntityKind::Creature(kind.parse()?))
        })
    }

    /// Remove players; unknown ids are ignored
    pub fn remove_players(&mut self, ids: &[EntityId]) {
        remove(&mut self.players, ids, "player");
    }

    /// Remove creatures; unknown ids are ignored
    pub fn remove_creatures(&mut self, ids: &[EntityId]) {
        remove(&mut self.creatures, ids, "creature");
    }

    /// Advance every animation
    pub fn tick(&mut self, dt: f64) {
        for entity in self
            .creatures
            .values_mut()
            .chain(self.players.values_mut())
        {
            entity.tick(dt);
        }
        self.self_entity.tick(dt);
    }
}

fn upsert<'a>(
    entities: &'a mut HashMap<EntityId, Entity>,
    id: EntityId,
    sprites: &SpriteLibrary,
    kind: impl FnOnce() -> Result<EntityKind, WorldError>,
) -> Result<&'a mut Entity, WorldError> {
    use std::collections::hash_map::Entry;

    match entities.entry(id) {
        Entry::Occupied(entry) => Ok(entry.into_mut()),
        Entry::Vacant(entry) => {
            let entity = Entity::new(id, kind()?, sprites)?;
            debug!(id = %id, kind = ?entity.kind, "new entity");
            Ok(entry.insert(entity))
        }
    }
}

fn remove(entities: &mut HashMap<EntityId, Entity>, ids: &[EntityId], label: &str) {
    for id in ids {
        if entities.remove(id).is_none() {
            debug!(id = %id, "no {label} to remove");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::CreatureKind;

    const SPRITE: &str = "idle:\n  right:\n    - ms: 100\n      cells: [[\"@\"]]\n";

    fn library() -> SpriteLibrary {
        let mut library = SpriteLibrary::new();
        for name in ["player", "blob", "skeleton", "level_exit"] {
            library.insert(name, gloam_sprite::load(SPRITE).unwrap());
        }
        library
    }

    #[test]
    fn test_upsert_creates_once() {
        let sprites = library();
        let mut registry = EntityRegistry::new(&sprites).unwrap();
        let id = EntityId::new();

        registry.upsert_player(id, &sprites).unwrap().position = (3, 3);
        registry.upsert_player(id, &sprites).unwrap();

        assert_eq!(registry.players().count(), 1);
        assert_eq!(registry.player(&id).unwrap().position, (3, 3));
    }

    #[test]
    fn test_creature_kind_resolution() {
        let sprites = library();
        let mut registry = EntityRegistry::new(&sprites).unwrap();
        let id = EntityId::new();

        let err = registry.upsert_creature(id, None, &sprites).unwrap_err();
        assert_eq!(err, WorldError::MissingField { id, field: "kind" });

        let err = registry
            .upsert_creature(id, Some("dragon"), &sprites)
            .unwrap_err();
        assert_eq!(err, WorldError::UnknownEntityKind("dragon".to_string()));
        assert!(registry.creature(&id).is_none());

        registry
            .upsert_creature(id, Some("skeleton"), &sprites)
            .unwrap();
        // known creatures need no kind
        registry.upsert_creature(id, None, &sprites).unwrap();
        assert_eq!(
            registry.creature(&id).unwrap().kind,
            EntityKind::Creature(CreatureKind::Skeleton)
        );
    }

    #[test]
    fn test_remove_unknown_id_is_noop() {
        let sprites = library();
        let mut registry = EntityRegistry::new(&sprites).unwrap();
        let id = EntityId::new();
        registry.upsert_creature(id, Some("blob"), &sprites).unwrap();
        let before = registry.clone();

        registry.remove_creatures(&[EntityId::new()]);
        registry.remove_players(&[id]);
        assert_eq!(registry, before);

        registry.remove_creatures(&[id, id]);
        assert_eq!(registry.creatures().count(), 0);
    }

    #[test]
    fn test_iter_includes_self() {
        let sprites = library();
        let mut registry = EntityRegistry::new(&sprites).unwrap();
        registry.upsert_player(EntityId::new(), &sprites).unwrap();
        registry
            .upsert_creature(EntityId::new(), Some("blob"), &sprites)
            .unwrap();

        let all: Vec<_> = registry.iter().collect();
        assert_eq!(all.len(), 3);
        assert_eq!(all[2].id, registry.self_entity().id);
    }
}
