//! Gloam Sprite - character-cell sprite animation
//!
//! Sprites are described in YAML files and loaded into immutable
//! [`SpriteDefinition`]s. Every entity plays a definition through its own
//! [`AnimationState`], which sequences frames, draws randomized frame
//! durations and carries a transient [`EffectOverlay`].
//!
//! ```text
//! sprite.yaml ──load──► SpriteDefinition (Arc, shared)
//!                              │
//!              ┌───────────────┼───────────────┐
//!              ▼               ▼               ▼
//!       AnimationState  AnimationState  AnimationState   (one per entity)
//! ```
//!
//! [`HotReloadWatcher`] wraps the loader for the sprite editor: edits are
//! picked up as they are saved and a broken edit never replaces the last
//! good definition.

pub mod animation;
pub mod definition;
pub mod editor;
pub mod effect;
pub mod loader;
pub mod reload;

// Re-export commonly used types
pub use animation::{AnimationError, AnimationState, ResolvedFrame};
pub use definition::{CellGrid, Direction, FrameDuration, FrameSpec, SpriteDefinition};
pub use editor::SpriteEditor;
pub use effect::{EffectOverlay, EffectStyle};
pub use loader::{LoadError, ParseError, load, load_path};
pub use reload::{ChangeEvent, HotReloadWatcher, ReloadConfig, SpriteHandle, WatchError};
