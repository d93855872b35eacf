//! Entities mirrored from the server
//!
//! Players and creatures share one representation. Each entity owns its
//! animation runtime; the sprite definition behind it is shared.

use crate::error::WorldError;
use crate::library::{PLAYER_SPRITE, SpriteLibrary};
use crate::protocol::EntityDelta;
use gloam_core::{ColorId, EntityId};
use gloam_sprite::{AnimationState, CellGrid, Direction, EffectStyle};
use std::fmt;
use std::str::FromStr;
use tracing::warn;

/// Creature kinds the client has sprites for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CreatureKind {
    Blob,
    Skeleton,
    LevelExit,
}

impl CreatureKind {
    pub const ALL: [CreatureKind; 3] = [Self::Blob, Self::Skeleton, Self::LevelExit];

    /// Wire name, also the sprite file stem
    pub fn sprite_name(&self) -> &'static str {
        match self {
            Self::Blob => "blob",
            Self::Skeleton => "skeleton",
            Self::LevelExit => "level_exit",
        }
    }
}

impl fmt::Display for CreatureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.sprite_name())
    }
}

impl FromStr for CreatureKind {
    type Err = WorldError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.sprite_name() == s)
            .ok_or_else(|| WorldError::UnknownEntityKind(s.to_string()))
    }
}

/// What an entity is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Player,
    Creature(CreatureKind),
}

impl EntityKind {
    pub fn sprite_name(&self) -> &'static str {
        match self {
            Self::Player => PLAYER_SPRITE,
            Self::Creature(kind) => kind.sprite_name(),
        }
    }

    pub fn is_player(&self) -> bool {
        matches!(self, Self::Player)
    }
}

/// A positioned, animated actor
#[derive(Debug, Clone, PartialEq)]
pub struct Entity {
    pub id: EntityId,
    pub position: (i32, i32),
    pub color: ColorId,
    pub visible: bool,
    pub kind: EntityKind,
    pub animation: AnimationState,
    /// Tracked for players only
    pub hit_points: Option<u32>,
}

impl Entity {
    /// Create an entity with default fields and its kind's sprite
    pub fn new(id: EntityId, kind: EntityKind, sprites: &SpriteLibrary) -> Result<Self, WorldError> {
        let name = kind.sprite_name();
        let definition = sprites
            .get(name)
            .ok_or_else(|| WorldError::MissingSprite(name.to_string()))?;

        Ok(Self {
            id,
            position: (0, 0),
            color: ColorId::WHITE,
            visible: false,
            kind,
            animation: AnimationState::new(definition)?,
            hit_points: None,
        })
    }

    /// Apply delta fields
    ///
    /// Unknown animation names are logged and leave the animation as is.
    pub fn apply(&mut self, delta: &EntityDelta) {
        self.position = delta.coords;
        self.color = delta.color;
        self.visible = delta.is_visible;
        if self.kind.is_player() && delta.hit_points.is_some() {
            self.hit_points = delta.hit_points;
        }

        let direction = match delta.direction.as_deref().map(Direction::from_str) {
            Some(Ok(direction)) => direction,
            Some(Err(err)) => {
                warn!(id = %self.id, error = %err, "ignoring direction");
                self.animation.direction()
            }
            None => self.animation.direction(),
        };
        let state = delta
            .sprite_state
            .clone()
            .unwrap_or_else(|| self.animation.state_name().to_string());

        if let Err(err) = self.animation.switch(&state, direction) {
            warn!(id = %self.id, error = %err, "keeping current animation");
        }
    }

    /// Advance the animation; hidden creatures stay frozen
    pub fn tick(&mut self, dt: f64) {
        if self.visible || self.kind.is_player() {
            self.animation.tick(dt);
        }
    }

    pub fn cells(&self) -> &CellGrid {
        self.animation.cells()
    }

    pub fn effect(&self) -> Option<EffectStyle> {
        self.animation.effect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PLAYER: &str = r#"
idle:
  right:
    - ms: 100
      cells: [["@"]]
walk:
  right:
    - ms: 100
      cells: [["a"]]
    - ms: 100
      cells: [["b"]]
  left:
    - ms: 100
      cells: [["<"]]
"#;

    fn library() -> SpriteLibrary {
        let mut library = SpriteLibrary::new();
        library.insert("player", gloam_sprite::load(PLAYER).unwrap());
        library.insert("blob", gloam_sprite::load(PLAYER).unwrap());
        library
    }

    #[test]
    fn test_creature_kind_names() {
        assert_eq!("blob".parse::<CreatureKind>().unwrap(), CreatureKind::Blob);
        assert_eq!(
            "level_exit".parse::<CreatureKind>().unwrap(),
            CreatureKind::LevelExit
        );
        assert_eq!(
            "dragon".parse::<CreatureKind>(),
            Err(WorldError::UnknownEntityKind("dragon".to_string()))
        );
    }

    #[test]
    fn test_missing_sprite_fails_construction() {
        let err = Entity::new(
            EntityId::new(),
            EntityKind::Creature(CreatureKind::Skeleton),
            &library(),
        )
        .unwrap_err();
        assert_eq!(err, WorldError::MissingSprite("skeleton".to_string()));
    }

    #[test]
    fn test_apply_fields_and_animation() {
        let mut entity = Entity::new(EntityId::new(), EntityKind::Player, &library()).unwrap();
        let delta = EntityDelta::new((4, 2), ColorId(3), true)
            .with_hit_points(9)
            .with_sprite_state("walk")
            .with_direction("left");
        entity.apply(&delta);

        assert_eq!(entity.position, (4, 2));
        assert_eq!(entity.color, ColorId(3));
        assert!(entity.visible);
        assert_eq!(entity.hit_points, Some(9));
        assert_eq!(entity.animation.state_name(), "walk");
        assert_eq!(entity.animation.direction(), Direction::Left);
        assert_eq!(entity.cells().get(0, 0), Some('<'));
    }

    #[test]
    fn test_unknown_state_keeps_animation() {
        let mut entity = Entity::new(EntityId::new(), EntityKind::Player, &library()).unwrap();
        entity.apply(&EntityDelta::new((0, 0), ColorId(1), true).with_sprite_state("dance"));
        assert_eq!(entity.animation.state_name(), "idle");

        entity.apply(&EntityDelta::new((0, 0), ColorId(1), true).with_direction("sideways"));
        assert_eq!(entity.animation.direction(), Direction::Right);
    }

    #[test]
    fn test_creatures_ignore_hit_points() {
        let mut entity = Entity::new(
            EntityId::new(),
            EntityKind::Creature(CreatureKind::Blob),
            &library(),
        )
        .unwrap();
        entity.apply(&EntityDelta::new((1, 1), ColorId(2), true).with_hit_points(5));
        assert_eq!(entity.hit_points, None);
    }

    #[test]
    fn test_hidden_creature_does_not_animate() {
        let mut entity = Entity::new(
            EntityId::new(),
            EntityKind::Creature(CreatureKind::Blob),
            &library(),
        )
        .unwrap();
        entity.apply(&EntityDelta::new((1, 1), ColorId(2), false).with_sprite_state("walk"));

        entity.tick(0.25);
        assert_eq!(entity.animation.current().sequence_index(), 0);

        entity.visible = true;
        entity.tick(0.25);
        assert_eq!(entity.animation.current().sequence_index(), 1);
    }
}
