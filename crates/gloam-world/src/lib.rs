//! Gloam World - local mirror of the game server's world
//!
//! The server streams `init`, `update`, `remove_players` and
//! `remove_creatures` packets. [`WorldSynchronizer`] decodes them and applies
//! them to a [`WorldState`]: a sparse [`RoomModel`] of tiles and an
//! [`EntityRegistry`] of players and creatures, each entity running its own
//! sprite animation.

pub mod entity;
pub mod error;
pub mod library;
pub mod protocol;
pub mod registry;
pub mod sync;
pub mod tile;

pub use entity::{CreatureKind, Entity, EntityKind};
pub use error::{SyncError, WorldError};
pub use library::{DEFAULT_SPRITE_DIR, PLAYER_SPRITE, SpriteLibrary};
pub use protocol::{CreatureDelta, EntityDelta, Packet, Snapshot, SnapshotDelta, TileDelta};
pub use registry::EntityRegistry;
pub use sync::{DAMAGE_FLASH_COLOR, DAMAGE_FLASH_MS, WorldState, WorldSynchronizer};
pub use tile::{RoomModel, TerrainKind, TileState};
