//! Inbound protocol packets
//!
//! Every message is a JSON object `{"type": ..., "data": ...}`. A packet is
//! decoded completely before anything is applied, so a missing or mistyped
//! required field rejects the whole message.

use crate::error::SyncError;
use gloam_core::{ColorId, EntityId};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A decoded server message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum Packet {
    /// Full snapshot sent on connect
    Init(Snapshot),
    /// Partial snapshot, every field optional
    Update(SnapshotDelta),
    RemovePlayers(Vec<EntityId>),
    RemoveCreatures(Vec<EntityId>),
}

impl Packet {
    /// Decode a packet from message text
    pub fn decode(text: &str) -> Result<Self, SyncError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Packet type name, for logging
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Init(_) => "init",
            Self::Update(_) => "update",
            Self::RemovePlayers(_) => "remove_players",
            Self::RemoveCreatures(_) => "remove_creatures",
        }
    }
}

/// One tile: `[[x, y], terrain, [seen, currently_visible]]`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileDelta(pub (i32, i32), pub String, pub (bool, bool));

impl TileDelta {
    pub fn new(coord: (i32, i32), terrain: impl Into<String>, seen: bool, visible: bool) -> Self {
        Self(coord, terrain.into(), (seen, visible))
    }
}

/// Per-entity fields shared by players and creatures
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityDelta {
    pub coords: (i32, i32),
    pub color: ColorId,
    pub is_visible: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hit_points: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sprite_state: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub direction: Option<String>,
}

impl EntityDelta {
    pub fn new(coords: (i32, i32), color: ColorId, is_visible: bool) -> Self {
        Self {
            coords,
            color,
            is_visible,
            hit_points: None,
            sprite_state: None,
            direction: None,
        }
    }

    pub fn with_hit_points(mut self, hit_points: u32) -> Self {
        self.hit_points = Some(hit_points);
        self
    }

    pub fn with_sprite_state(mut self, state: impl Into<String>) -> Self {
        self.sprite_state = Some(state.into());
        self
    }

    pub fn with_direction(mut self, direction: impl Into<String>) -> Self {
        self.direction = Some(direction.into());
        self
    }
}

/// Creature delta; the kind is only needed when the creature is new
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatureDelta {
    #[serde(default, alias = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(flatten)]
    pub entity: EntityDelta,
}

impl CreatureDelta {
    pub fn new(kind: Option<&str>, entity: EntityDelta) -> Self {
        Self {
            kind: kind.map(str::to_string),
            entity,
        }
    }
}

/// Payload of an `init` packet
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub map: Vec<TileDelta>,
    #[serde(rename = "self")]
    pub self_entity: EntityDelta,
    #[serde(default)]
    pub players: HashMap<EntityId, EntityDelta>,
    #[serde(default)]
    pub creatures: HashMap<EntityId, CreatureDelta>,
}

/// Payload of an `update` packet
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SnapshotDelta {
    #[serde(default)]
    pub map: Vec<TileDelta>,
    #[serde(rename = "self", default, skip_serializing_if = "Option::is_none")]
    pub self_entity: Option<EntityDelta>,
    #[serde(default)]
    pub players: HashMap<EntityId, EntityDelta>,
    #[serde(default)]
    pub creatures: HashMap<EntityId, CreatureDelta>,
}

impl From<Snapshot> for SnapshotDelta {
    fn from(snapshot: Snapshot) -> Self {
        Self {
            map: snapshot.map,
            self_entity: Some(snapshot.self_entity),
            players: snapshot.players,
            creatures: snapshot.creatures,
        }
    }
}
