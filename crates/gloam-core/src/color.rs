//! Colour and text attribute primitives
//!
//! Colours travel over the wire as xterm-256 palette indices, so they are
//! kept as indices until the terminal backend maps them.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

/// An xterm-256 palette index
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ColorId(pub u8);

impl ColorId {
    pub const BLACK: ColorId = ColorId(0);
    pub const RED: ColorId = ColorId(1);
    pub const MAGENTA: ColorId = ColorId(5);
    pub const WHITE: ColorId = ColorId(7);
    pub const BRIGHT_RED: ColorId = ColorId(196);

    /// Approximate RGB value of this palette entry
    pub fn to_rgb(self) -> [u8; 3] {
        const BASIC: [[u8; 3]; 16] = [
            [0, 0, 0],
            [128, 0, 0],
            [0, 128, 0],
            [128, 128, 0],
            [0, 0, 128],
            [128, 0, 128],
            [0, 128, 128],
            [192, 192, 192],
            [128, 128, 128],
            [255, 0, 0],
            [0, 255, 0],
            [255, 255, 0],
            [0, 0, 255],
            [255, 0, 255],
            [0, 255, 255],
            [255, 255, 255],
        ];

        match self.0 {
            idx @ 0..=15 => BASIC[idx as usize],
            idx @ 16..=231 => {
                // 6x6x6 colour cube
                let level = |v: u8| if v == 0 { 0 } else { 55 + v * 40 };
                let i = idx - 16;
                [level(i / 36), level((i / 6) % 6), level(i % 6)]
            }
            idx => {
                // 24-step grayscale ramp
                let v = 8 + (idx - 232) * 10;
                [v, v, v]
            }
        }
    }
}

impl From<u8> for ColorId {
    fn from(value: u8) -> Self {
        Self(value)
    }
}

bitflags! {
    /// Text attributes applied to a cell
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    pub struct Attr: u32 {
        const BOLD = 1 << 0;
        const NORMAL = 0;
        const REVERSE = 1 << 1;
        const UNDERLINE = 1 << 2;
    }
}
