//! Terminal frontend for the game session

use crate::input::{game_input, poll_keys};
use crate::output::{OutputError, TerminalOutput};
use crate::renderer::WorldRenderer;
use gloam_api::{Frontend, Input};
use gloam_world::WorldState;

/// Draws the world with crossterm and reads keys from the same terminal
pub struct TerminalFrontend {
    output: TerminalOutput,
    renderer: WorldRenderer,
}

impl TerminalFrontend {
    /// Take over the terminal
    pub fn new(mut output: TerminalOutput, renderer: WorldRenderer) -> Result<Self, OutputError> {
        output.init()?;
        Ok(Self { output, renderer })
    }
}

impl Frontend for TerminalFrontend {
    type Error = OutputError;

    fn draw(&mut self, world: &WorldState) -> Result<(), OutputError> {
        let (width, height) = TerminalOutput::size()?;
        let frame = self.renderer.compose(world, width, height);
        self.output.render(&frame)
    }

    fn poll_input(&mut self) -> Result<Vec<Input>, OutputError> {
        Ok(poll_keys()?.iter().filter_map(game_input).collect())
    }
}
