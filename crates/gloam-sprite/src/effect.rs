//! Transient visual effects layered over a sprite

use gloam_core::{Attr, ColorId};

/// Colour/attribute/background override produced by an active effect
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EffectStyle {
    /// Replacement foreground colour, `None` keeps the entity colour
    pub color: Option<ColorId>,
    pub attr: Attr,
    pub bg: ColorId,
}

/// A short-lived overlay with its own timer
///
/// Lifecycle is independent of frame sequencing: state switches and frame
/// advances never touch it.
#[derive(Debug, Clone, PartialEq)]
pub struct EffectOverlay {
    duration_ms: u32,
    elapsed_s: f64,
    style: EffectStyle,
}

impl EffectOverlay {
    /// Create a new overlay with its timer at zero
    pub fn new(duration_ms: u32, color: Option<ColorId>, attr: Attr, bg: ColorId) -> Self {
        Self {
            duration_ms,
            elapsed_s: 0.0,
            style: EffectStyle { color, attr, bg },
        }
    }

    /// Advance the timer; returns `true` once the overlay has expired
    pub fn advance(&mut self, dt: f64) -> bool {
        self.elapsed_s += dt;
        self.is_expired()
    }

    /// Expired strictly after the duration, never at equality
    pub fn is_expired(&self) -> bool {
        self.elapsed_s * 1000.0 > f64::from(self.duration_ms)
    }

    pub fn duration_ms(&self) -> u32 {
        self.duration_ms
    }

    pub fn elapsed_s(&self) -> f64 {
        self.elapsed_s
    }

    pub fn style(&self) -> EffectStyle {
        self.style
    }
}
