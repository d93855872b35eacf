//! Color mapping for terminal output
//!
//! Maps palette indices to crossterm colours based on color depth.

use crossterm::style::Color;
use gloam_core::ColorId;

/// Colours the terminal can show
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColorDepth {
    /// Black and white only
    Monochrome,
    /// 16 ANSI colours
    Basic,
    /// xterm 256-colour palette
    #[default]
    Extended,
    /// 24-bit RGB
    TrueColor,
}

impl ColorDepth {
    /// Guess the depth from COLORTERM and TERM
    pub fn detect() -> Self {
        if let Ok(colorterm) = std::env::var("COLORTERM") {
            if colorterm == "truecolor" || colorterm == "24bit" {
                return Self::TrueColor;
            }
        }

        match std::env::var("TERM") {
            Ok(term) if term.contains("256color") => Self::Extended,
            Ok(term) if term == "dumb" => Self::Monochrome,
            _ => Self::Basic,
        }
    }
}

/// Color mapper for terminal output
#[derive(Debug, Clone, Default)]
pub struct ColorMapper {
    depth: ColorDepth,
}

impl ColorMapper {
    /// Create a new color mapper
    pub fn new(depth: ColorDepth) -> Self {
        Self { depth }
    }

    /// Map a palette index to a terminal colour
    pub fn map_color(&self, color: ColorId) -> Color {
        match self.depth {
            ColorDepth::Monochrome => self.to_monochrome(color),
            ColorDepth::Basic => basic(self.to_basic_16(color)),
            ColorDepth::Extended => Color::AnsiValue(color.0),
            ColorDepth::TrueColor => {
                let [r, g, b] = color.to_rgb();
                Color::Rgb { r, g, b }
            }
        }
    }

    fn to_monochrome(&self, color: ColorId) -> Color {
        let [r, g, b] = color.to_rgb();
        let brightness = (r as u16 + g as u16 + b as u16) / 3;
        if brightness > 127 {
            Color::White
        } else {
            Color::Black
        }
    }

    /// Closest of the 16 basic colours
    fn to_basic_16(&self, color: ColorId) -> u8 {
        if color.0 < 16 {
            return color.0;
        }

        let rgb = color.to_rgb();
        (0..16u8)
            .min_by_key(|idx| color_distance(rgb, ColorId(*idx).to_rgb()))
            .unwrap_or(7)
    }

    /// Get color depth
    pub fn depth(&self) -> ColorDepth {
        self.depth
    }
}

fn basic(idx: u8) -> Color {
    match idx {
        0 => Color::Black,
        1 => Color::DarkRed,
        2 => Color::DarkGreen,
        3 => Color::DarkYellow,
        4 => Color::DarkBlue,
        5 => Color::DarkMagenta,
        6 => Color::DarkCyan,
        7 => Color::Grey,
        8 => Color::DarkGrey,
        9 => Color::Red,
        10 => Color::Green,
        11 => Color::Yellow,
        12 => Color::Blue,
        13 => Color::Magenta,
        14 => Color::Cyan,
        _ => Color::White,
    }
}

/// Calculate color distance (squared Euclidean)
fn color_distance(a: [u8; 3], b: [u8; 3]) -> u32 {
    let dr = a[0] as i32 - b[0] as i32;
    let dg = a[1] as i32 - b[1] as i32;
    let db = a[2] as i32 - b[2] as i32;
    (dr * dr + dg * dg + db * db) as u32
}
