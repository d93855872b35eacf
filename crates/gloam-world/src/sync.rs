//! World synchronizer
//!
//! The only writer of the room model and the entity registry. Each packet is
//! decoded in full, then applied in one synchronous pass, so readers never
//! observe a half-applied message.

use crate::entity::Entity;
use crate::error::{SyncError, WorldError};
use crate::library::SpriteLibrary;
use crate::protocol::{EntityDelta, Packet, SnapshotDelta};
use crate::registry::EntityRegistry;
use crate::tile::RoomModel;
use gloam_core::{Attr, ColorId};
use tracing::{debug, warn};

/// Damage flash duration
pub const DAMAGE_FLASH_MS: u32 = 100;
/// Damage flash foreground
pub const DAMAGE_FLASH_COLOR: ColorId = ColorId::BRIGHT_RED;

/// Everything the renderer reads
#[derive(Debug, Clone, PartialEq)]
pub struct WorldState {
    pub room: RoomModel,
    pub entities: EntityRegistry,
}

impl WorldState {
    pub fn new(sprites: &SpriteLibrary) -> Result<Self, WorldError> {
        Ok(Self {
            room: RoomModel::new(),
            entities: EntityRegistry::new(sprites)?,
        })
    }
}

/// Applies server packets to the world state
pub struct WorldSynchronizer {
    state: WorldState,
    sprites: SpriteLibrary,
}

impl WorldSynchronizer {
    /// Create a synchronizer with an empty room
    pub fn new(sprites: SpriteLibrary) -> Result<Self, WorldError> {
        Ok(Self {
            state: WorldState::new(&sprites)?,
            sprites,
        })
    }

    pub fn state(&self) -> &WorldState {
        &self.state
    }

    /// Decode and apply one message
    ///
    /// A malformed message is logged and skipped. Entity failures are
    /// returned; the rest of the packet is still applied.
    pub fn handle_message(&mut self, text: &str) -> Result<Vec<WorldError>, SyncError> {
        let packet = Packet::decode(text).inspect_err(|err| {
            warn!(error = %err, "skipping malformed packet");
        })?;
        Ok(self.apply(packet))
    }

    /// Apply a decoded packet
    pub fn apply(&mut self, packet: Packet) -> Vec<WorldError> {
        debug!(packet = packet.kind(), "applying packet");
        match packet {
            Packet::Init(snapshot) => self.apply_delta(snapshot.into()),
            Packet::Update(delta) => self.apply_delta(delta),
            Packet::RemovePlayers(ids) => {
                self.state.entities.remove_players(&ids);
                Vec::new()
            }
            Packet::RemoveCreatures(ids) => {
                self.state.entities.remove_creatures(&ids);
                Vec::new()
            }
        }
    }

    /// Advance every entity's animation
    pub fn tick(&mut self, dt: f64) {
        self.state.entities.tick(dt);
    }

    fn apply_delta(&mut self, delta: SnapshotDelta) -> Vec<WorldError> {
        let mut errors = Vec::new();
        let entities = &mut self.state.entities;

        for tile in &delta.map {
            self.state.room.apply(tile);
        }

        if let Some(update) = &delta.self_entity {
            apply_self(entities.self_entity_mut(), update);
        }

        for (id, update) in &delta.players {
            match entities.upsert_player(*id, &self.sprites) {
                Ok(entity) => entity.apply(update),
                Err(err) => {
                    warn!(id = %id, error = %err, "skipping player");
                    errors.push(err);
                }
            }
        }

        for (id, update) in &delta.creatures {
            match entities.upsert_creature(*id, update.kind.as_deref(), &self.sprites) {
                Ok(entity) => entity.apply(&update.entity),
                Err(err) => {
                    warn!(id = %id, error = %err, "skipping creature");
                    errors.push(err);
                }
            }
        }

        errors
    }
}

/// Update the local player, flashing it when it loses hit points
fn apply_self(entity: &mut Entity, update: &EntityDelta) {
    let previous = entity.hit_points;
    entity.apply(update);

    if let (Some(before), Some(after)) = (previous, entity.hit_points) {
        if after < before {
            debug!(before, after, "self took damage");
            entity
                .animation
                .add_effect(DAMAGE_FLASH_MS, Some(DAMAGE_FLASH_COLOR), Attr::NORMAL, ColorId::BLACK);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::{CreatureKind, EntityKind};
    use crate::protocol::{CreatureDelta, Snapshot, TileDelta};
    use crate::tile::TerrainKind;
    use gloam_core::EntityId;
    use std::collections::HashMap;

    const SPRITE: &str = r#"
idle:
  right:
    - ms: 100
      cells: [["@"]]
walk:
  right:
    - ms: [50, 150]
      random: true
      cells: [["1"]]
    - ms: 100
      cells: [["2"]]
"#;

    fn synchronizer() -> WorldSynchronizer {
        let mut library = SpriteLibrary::new();
        for name in ["player", "blob", "skeleton", "level_exit"] {
            library.insert(name, gloam_sprite::load(SPRITE).unwrap());
        }
        WorldSynchronizer::new(library).unwrap()
    }

    fn hp(hit_points: u32) -> Packet {
        Packet::Update(SnapshotDelta {
            self_entity: Some(EntityDelta::new((0, 0), ColorId(7), true).with_hit_points(hit_points)),
            ..SnapshotDelta::default()
        })
    }

    fn init(player: EntityId, blob: EntityId) -> Packet {
        Packet::Init(Snapshot {
            map: vec![
                TileDelta::new((0, 0), "wall", true, true),
                TileDelta::new((1, 0), "floor", true, false),
            ],
            self_entity: EntityDelta::new((1, 0), ColorId(2), true).with_hit_points(10),
            players: HashMap::from([(
                player,
                EntityDelta::new((4, 4), ColorId(3), true).with_sprite_state("walk"),
            )]),
            creatures: HashMap::from([(
                blob,
                CreatureDelta::new(Some("blob"), EntityDelta::new((2, 2), ColorId(9), true)),
            )]),
        })
    }

    #[test]
    fn test_init_populates_world() {
        let mut sync = synchronizer();
        let player = EntityId::new();
        let blob = EntityId::new();

        assert!(sync.apply(init(player, blob)).is_empty());

        let state = sync.state();
        assert_eq!(state.room.len(), 2);
        assert_eq!(state.room.get((0, 0)).unwrap().terrain, TerrainKind::Wall);
        assert_eq!(state.entities.self_entity().position, (1, 0));
        assert_eq!(state.entities.self_entity().hit_points, Some(10));
        assert_eq!(state.entities.player(&player).unwrap().animation.state_name(), "walk");
        assert_eq!(
            state.entities.creature(&blob).unwrap().kind,
            EntityKind::Creature(CreatureKind::Blob)
        );
    }

    #[test]
    fn test_init_is_idempotent() {
        let mut sync = synchronizer();
        let player = EntityId::new();
        let blob = EntityId::new();

        sync.apply(init(player, blob));
        let first = sync.state().clone();
        sync.apply(init(player, blob));

        assert_eq!(sync.state(), &first);
    }

    #[test]
    fn test_remove_unknown_is_noop() {
        let mut sync = synchronizer();
        sync.apply(init(EntityId::new(), EntityId::new()));
        let before = sync.state().clone();

        assert!(sync.apply(Packet::RemovePlayers(vec![EntityId::new()])).is_empty());
        assert!(sync.apply(Packet::RemoveCreatures(vec![EntityId::new()])).is_empty());
        assert_eq!(sync.state(), &before);
    }

    #[test]
    fn test_removal() {
        let mut sync = synchronizer();
        let player = EntityId::new();
        let blob = EntityId::new();
        sync.apply(init(player, blob));

        sync.apply(Packet::RemovePlayers(vec![player]));
        sync.apply(Packet::RemoveCreatures(vec![blob]));
        assert!(sync.state().entities.player(&player).is_none());
        assert!(sync.state().entities.creature(&blob).is_none());
        // the room is untouched
        assert_eq!(sync.state().room.len(), 2);
    }

    #[test]
    fn test_damage_flash_on_hit_point_drop() {
        let mut sync = synchronizer();
        sync.apply(hp(10));
        assert!(sync.state().entities.self_entity().effect().is_none());

        sync.apply(hp(7));
        let effect = sync.state().entities.self_entity().effect().unwrap();
        assert_eq!(effect.color, Some(DAMAGE_FLASH_COLOR));
        assert_eq!(effect.attr, Attr::NORMAL);
        assert_eq!(effect.bg, ColorId::BLACK);

        // the flash lasts 100ms
        sync.tick(0.125);
        assert!(sync.state().entities.self_entity().effect().is_none());
    }

    #[test]
    fn test_no_flash_when_hit_points_hold_or_rise() {
        let mut sync = synchronizer();
        sync.apply(hp(10));
        sync.apply(hp(10));
        assert!(sync.state().entities.self_entity().effect().is_none());

        sync.apply(hp(12));
        assert!(sync.state().entities.self_entity().effect().is_none());

        // a delta without hit points keeps the last value
        sync.apply(Packet::Update(SnapshotDelta {
            self_entity: Some(EntityDelta::new((0, 1), ColorId(7), true)),
            ..SnapshotDelta::default()
        }));
        assert!(sync.state().entities.self_entity().effect().is_none());
        assert_eq!(sync.state().entities.self_entity().hit_points, Some(12));
    }

    #[test]
    fn test_one_flash_per_drop() {
        let mut sync = synchronizer();
        sync.apply(hp(10));
        sync.apply(hp(7));
        sync.tick(0.0625);

        // unchanged hit points do not restart the flash
        sync.apply(hp(7));
        sync.tick(0.0625);
        assert!(sync.state().entities.self_entity().effect().is_none());
    }

    #[test]
    fn test_bad_entity_does_not_abort_packet() {
        let mut sync = synchronizer();
        let good = EntityId::new();
        let bad = EntityId::new();
        let packet = Packet::Update(SnapshotDelta {
            map: vec![TileDelta::new((5, 5), "floor", true, true)],
            creatures: HashMap::from([
                (
                    good,
                    CreatureDelta::new(Some("skeleton"), EntityDelta::new((1, 1), ColorId(1), true)),
                ),
                (
                    bad,
                    CreatureDelta::new(Some("dragon"), EntityDelta::new((1, 2), ColorId(1), true)),
                ),
            ]),
            ..SnapshotDelta::default()
        });

        let errors = sync.apply(packet);
        assert_eq!(errors, vec![WorldError::UnknownEntityKind("dragon".to_string())]);
        assert!(sync.state().entities.creature(&good).is_some());
        assert!(sync.state().entities.creature(&bad).is_none());
        assert!(sync.state().room.get((5, 5)).is_some());
    }

    #[test]
    fn test_malformed_message_skipped() {
        let mut sync = synchronizer();
        sync.apply(hp(10));
        let before = sync.state().clone();

        let err = sync
            .handle_message(r#"{"type": "update", "data": {"self": {"color": 1}}}"#)
            .unwrap_err();
        assert!(matches!(err, SyncError::MalformedPacket(_)));
        assert_eq!(sync.state(), &before);

        // the next good message still applies
        sync.handle_message(r#"{"type": "update", "data": {"map": [[[0, 0], "wall", [true, false]]]}}"#)
            .unwrap();
        assert_eq!(sync.state().room.len(), 1);
    }

    #[test]
    fn test_tick_advances_entities() {
        let mut sync = synchronizer();
        let player = EntityId::new();
        sync.apply(init(player, EntityId::new()));

        // the first walk frame lasts at most 150ms
        sync.tick(0.25);
        let entity = sync.state().entities.player(&player).unwrap();
        assert_eq!(entity.animation.current().sequence_index(), 1);
    }
}
