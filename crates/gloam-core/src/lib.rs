//! Gloam Core - shared identifiers and display primitives
//!
//! Gloam is a terminal multiplayer game client. The server streams world
//! state, the client mirrors it locally and animates every entity with
//! character-cell sprites.
//!
//! # Architecture
//!
//! ```text
//! Server ──packets──► gloam-api ──► gloam-world ──► gloam-backend-terminal
//!                                       │
//!                                       ▼
//!                                  gloam-sprite
//! ```
//!
//! This crate only holds the small value types every other crate agrees on.

pub mod color;
pub mod id;

// Re-export commonly used types
pub use color::{Attr, ColorId};
pub use id::EntityId;

/// A single character cell of a sprite or tile
pub type Glyph = char;
