//! Gloam Terminal Backend
//!
//! Renders the world mirror and the sprite editor using character cells
//! and xterm palette colours.
//!
//! Frames are composed off-screen ([`WorldRenderer`], [`EditorView`]) and
//! written by [`TerminalOutput`], which only repaints cells that changed.

pub mod color;
pub mod frame;
pub mod frontend;
pub mod input;
pub mod output;
pub mod renderer;

pub use color::{ColorDepth, ColorMapper};
pub use frame::{TerminalCell, TerminalFrame};
pub use frontend::TerminalFrontend;
pub use input::{EditorCommand, editor_input, game_input, poll_keys};
pub use output::{OutputError, TerminalOutput};
pub use renderer::{EditorView, WorldRenderer};
