//! Terminal output handling
//!
//! Handles writing frames to the terminal using crossterm.

use crate::color::{ColorDepth, ColorMapper};
use crate::frame::{TerminalCell, TerminalFrame};
use crossterm::{
    cursor::{Hide, MoveTo, Show},
    execute, queue,
    style::{Attribute, Print, SetAttribute, SetBackgroundColor, SetForegroundColor},
    terminal::{self, Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen},
};
use gloam_core::Attr;
use std::io::{self, Write};
use thiserror::Error;

/// Terminal output errors
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// Terminal output handler
pub struct TerminalOutput {
    /// Whether we're in alternate screen mode
    alternate_screen: bool,
    /// Whether raw mode is on
    raw_mode: bool,
    /// Last frame for diff rendering
    last_frame: Option<TerminalFrame>,
    /// Enable diff rendering (only update changed cells)
    diff_mode: bool,
    colors: ColorMapper,
}

impl TerminalOutput {
    /// Create a new terminal output handler
    pub fn new(depth: ColorDepth) -> Self {
        Self {
            alternate_screen: false,
            raw_mode: false,
            last_frame: None,
            diff_mode: true,
            colors: ColorMapper::new(depth),
        }
    }

    /// Enable or disable diff mode
    pub fn set_diff_mode(&mut self, enabled: bool) {
        self.diff_mode = enabled;
        if !enabled {
            self.last_frame = None;
        }
    }

    /// Initialize the terminal for rendering
    pub fn init(&mut self) -> Result<(), OutputError> {
        let mut stdout = io::stdout();

        execute!(stdout, EnterAlternateScreen, Hide, Clear(ClearType::All))?;
        self.alternate_screen = true;

        terminal::enable_raw_mode()?;
        self.raw_mode = true;

        Ok(())
    }

    /// Cleanup terminal state
    pub fn cleanup(&mut self) -> Result<(), OutputError> {
        let mut stdout = io::stdout();

        if self.raw_mode {
            let _ = terminal::disable_raw_mode();
            self.raw_mode = false;
        }

        if self.alternate_screen {
            execute!(stdout, SetAttribute(Attribute::Reset), Show, LeaveAlternateScreen)?;
            self.alternate_screen = false;
        }

        Ok(())
    }

    /// Render a frame to the terminal
    pub fn render(&mut self, frame: &TerminalFrame) -> Result<(), OutputError> {
        let mut stdout = io::stdout().lock();
        self.render_to(&mut stdout, frame)?;
        stdout.flush()?;
        Ok(())
    }

    /// Render into any writer; a size change forces a full redraw
    pub fn render_to<W: Write>(
        &mut self,
        out: &mut W,
        frame: &TerminalFrame,
    ) -> Result<(), OutputError> {
        let previous = self
            .last_frame
            .take()
            .filter(|last| self.diff_mode && last.width == frame.width && last.height == frame.height);

        match &previous {
            Some(last) => self.render_diff(out, frame, last)?,
            None => {
                queue!(out, Clear(ClearType::All))?;
                self.render_full(out, frame)?;
            }
        }

        if self.diff_mode {
            self.last_frame = Some(frame.clone());
        }

        Ok(())
    }

    /// Render entire frame
    fn render_full<W: Write>(&self, out: &mut W, frame: &TerminalFrame) -> Result<(), OutputError> {
        for y in 0..frame.height {
            queue!(out, MoveTo(0, y as u16))?;
            for x in 0..frame.width {
                if let Some(cell) = frame.get(x, y) {
                    self.print_cell(out, cell)?;
                }
            }
        }

        queue!(out, SetAttribute(Attribute::Reset))?;
        Ok(())
    }

    /// Render only changed cells
    fn render_diff<W: Write>(
        &self,
        out: &mut W,
        frame: &TerminalFrame,
        last: &TerminalFrame,
    ) -> Result<(), OutputError> {
        for (idx, (current, previous)) in frame.cells.iter().zip(&last.cells).enumerate() {
            if current != previous {
                let x = idx as u32 % frame.width;
                let y = idx as u32 / frame.width;
                queue!(out, MoveTo(x as u16, y as u16))?;
                self.print_cell(out, current)?;
            }
        }

        queue!(out, SetAttribute(Attribute::Reset))?;
        Ok(())
    }

    fn print_cell<W: Write>(&self, out: &mut W, cell: &TerminalCell) -> Result<(), OutputError> {
        queue!(
            out,
            SetAttribute(Attribute::Reset),
            SetForegroundColor(self.colors.map_color(cell.fg)),
            SetBackgroundColor(self.colors.map_color(cell.bg))
        )?;
        for attribute in attributes(cell.attr) {
            queue!(out, SetAttribute(attribute))?;
        }
        queue!(out, Print(cell.char))?;
        Ok(())
    }

    /// Get terminal size
    pub fn size() -> Result<(u32, u32), OutputError> {
        let (cols, rows) = terminal::size()?;
        Ok((cols as u32, rows as u32))
    }
}

impl Default for TerminalOutput {
    fn default() -> Self {
        Self::new(ColorDepth::detect())
    }
}

impl Drop for TerminalOutput {
    fn drop(&mut self) {
        let _ = self.cleanup();
    }
}

fn attributes(attr: Attr) -> impl Iterator<Item = Attribute> {
    [
        (Attr::BOLD, Attribute::Bold),
        (Attr::REVERSE, Attribute::Reverse),
        (Attr::UNDERLINE, Attribute::Underlined),
    ]
    .into_iter()
    .filter(move |(flag, _)| attr.contains(*flag))
    .map(|(_, attribute)| attribute)
}
