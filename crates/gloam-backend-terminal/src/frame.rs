//! Terminal frame - 2D grid of palette-coloured cells

use gloam_core::{Attr, ColorId, Glyph};

/// A single terminal cell
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TerminalCell {
    /// The character to display
    pub char: Glyph,
    pub fg: ColorId,
    pub bg: ColorId,
    pub attr: Attr,
}

impl Default for TerminalCell {
    fn default() -> Self {
        Self {
            char: ' ',
            fg: ColorId::WHITE,
            bg: ColorId::BLACK,
            attr: Attr::NORMAL,
        }
    }
}

impl TerminalCell {
    /// Create a new cell with a character
    pub fn new(char: Glyph) -> Self {
        Self {
            char,
            ..Default::default()
        }
    }

    /// Set foreground color
    pub fn with_fg(mut self, fg: ColorId) -> Self {
        self.fg = fg;
        self
    }

    /// Set background color
    pub fn with_bg(mut self, bg: ColorId) -> Self {
        self.bg = bg;
        self
    }

    pub fn with_attr(mut self, attr: Attr) -> Self {
        self.attr = attr;
        self
    }

    /// Check if cell is empty (blank with default colours)
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// A full screen of cells, row-major
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TerminalFrame {
    /// Width in cells
    pub width: u32,
    /// Height in cells
    pub height: u32,
    pub cells: Vec<TerminalCell>,
}

impl TerminalFrame {
    /// Create a new empty terminal frame
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            cells: vec![TerminalCell::default(); (width * height) as usize],
        }
    }

    pub fn get(&self, x: u32, y: u32) -> Option<&TerminalCell> {
        if x < self.width && y < self.height {
            self.cells.get((y * self.width + x) as usize)
        } else {
            None
        }
    }

    /// Set a cell; positions outside the frame are ignored
    pub fn set(&mut self, x: u32, y: u32, cell: TerminalCell) {
        if x < self.width && y < self.height {
            self.cells[(y * self.width + x) as usize] = cell;
        }
    }

    /// Set a cell at a signed position, clipping anything off screen
    pub fn put(&mut self, x: i64, y: i64, cell: TerminalCell) {
        if let (Ok(x), Ok(y)) = (u32::try_from(x), u32::try_from(y)) {
            self.set(x, y, cell);
        }
    }

    /// Draw a string at position
    pub fn draw_str(&mut self, x: u32, y: u32, s: &str, fg: ColorId, attr: Attr) {
        for (i, ch) in s.chars().enumerate() {
            let px = x + i as u32;
            if px < self.width {
                self.set(px, y, TerminalCell::new(ch).with_fg(fg).with_attr(attr));
            }
        }
    }

    /// Text of one row, for inspection
    pub fn row_text(&self, y: u32) -> String {
        (0..self.width)
            .filter_map(|x| self.get(x, y))
            .map(|cell| cell.char)
            .collect()
    }
}
