//! Room model
//!
//! A sparse map of tile coordinates. Tiles are only ever created or fully
//! overwritten, never removed.

use crate::protocol::TileDelta;
use gloam_core::Glyph;
use std::collections::HashMap;

/// Terrain of a tile
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TerrainKind {
    Wall,
    Floor,
    /// Terrain this client has no glyph for
    Other(String),
}

impl TerrainKind {
    pub fn from_name(name: &str) -> Self {
        match name {
            "wall" => Self::Wall,
            "floor" => Self::Floor,
            other => Self::Other(other.to_string()),
        }
    }

    pub fn glyph(&self) -> Glyph {
        match self {
            Self::Wall => '#',
            Self::Floor => '.',
            Self::Other(_) => 'X',
        }
    }
}

/// Terrain and visibility of one coordinate
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TileState {
    pub terrain: TerrainKind,
    pub seen: bool,
    pub currently_visible: bool,
}

impl From<&TileDelta> for TileState {
    fn from(delta: &TileDelta) -> Self {
        let TileDelta(_, terrain, (seen, currently_visible)) = delta;
        Self {
            terrain: TerrainKind::from_name(terrain),
            seen: *seen,
            currently_visible: *currently_visible,
        }
    }
}

/// Local mirror of the room geometry
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RoomModel {
    tiles: HashMap<(i32, i32), TileState>,
}

impl RoomModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the tile at the delta's coordinate
    pub fn apply(&mut self, delta: &TileDelta) {
        self.tiles.insert(delta.0, TileState::from(delta));
    }

    pub fn get(&self, coord: (i32, i32)) -> Option<&TileState> {
        self.tiles.get(&coord)
    }

    pub fn tiles(&self) -> impl Iterator<Item = (&(i32, i32), &TileState)> {
        self.tiles.iter()
    }

    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }
}
