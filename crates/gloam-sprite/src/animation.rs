//! Per-entity animation runtime
//!
//! Wraps a shared, read-only [`SpriteDefinition`] with the mutable playback
//! state: which state/direction is active, the resolved current frame and an
//! optional effect overlay.
//!
//! A [`ResolvedFrame`] only ever comes from entering a frame (construction,
//! wraparound or a forced switch). Apart from its timer it is never mutated.

use crate::definition::{CellGrid, Direction, FrameSpec, SequenceKey, SpriteDefinition};
use crate::effect::{EffectOverlay, EffectStyle};
use gloam_core::{Attr, ColorId};
use std::sync::Arc;
use thiserror::Error;
use tracing::trace;

/// State used for new animations when the definition has it
pub const DEFAULT_STATE: &str = "idle";
/// Direction used for new animations when the definition has it
pub const DEFAULT_DIRECTION: Direction = Direction::Right;

/// Animation errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AnimationError {
    #[error("unknown sprite state: {0}")]
    UnknownState(String),

    #[error("state {state} has no direction {direction}")]
    UnknownDirection { state: String, direction: Direction },

    #[error("sprite definition has no playable sequence")]
    EmptyDefinition,
}

/// A frame instance with a concretely drawn duration and a running timer
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedFrame {
    sequence_index: u32,
    duration_ms: u32,
    elapsed_s: f64,
}

impl ResolvedFrame {
    fn enter(spec: &FrameSpec) -> Self {
        Self {
            sequence_index: spec.sequence_index,
            duration_ms: spec.duration.draw(&mut rand::rng()),
            elapsed_s: 0.0,
        }
    }

    pub fn sequence_index(&self) -> u32 {
        self.sequence_index
    }

    pub fn duration_ms(&self) -> u32 {
        self.duration_ms
    }

    pub fn elapsed_s(&self) -> f64 {
        self.elapsed_s
    }

    fn is_finished(&self) -> bool {
        self.elapsed_s * 1000.0 > f64::from(self.duration_ms)
    }
}

/// Animation state machine for one entity
#[derive(Debug, Clone, PartialEq)]
pub struct AnimationState {
    definition: Arc<SpriteDefinition>,
    state_name: String,
    direction: Direction,
    key: SequenceKey,
    current: ResolvedFrame,
    effect: Option<EffectOverlay>,
}

impl AnimationState {
    /// Start at frame 0 of `idle`/`right`, or the first state and direction
    /// when the definition lacks them
    pub fn new(definition: Arc<SpriteDefinition>) -> Result<Self, AnimationError> {
        let (state, direction) = default_target(&definition)?;
        Self::with_state(definition, &state, direction)
    }

    /// Start at frame 0 of a specific state and direction
    pub fn with_state(
        definition: Arc<SpriteDefinition>,
        state: &str,
        direction: Direction,
    ) -> Result<Self, AnimationError> {
        let key = locate(&definition, state, direction)?;
        let current = ResolvedFrame::enter(&definition.sequence(key)[0]);
        Ok(Self {
            definition,
            state_name: state.to_string(),
            direction,
            key,
            current,
            effect: None,
        })
    }

    /// Advance frame and effect timers by `dt` seconds
    pub fn tick(&mut self, dt: f64) {
        self.current.elapsed_s += dt;
        if self.current.is_finished() {
            let len = self.sequence().len() as u32;
            let next = (self.current.sequence_index + 1) % len;
            trace!(
                state = %self.state_name,
                direction = %self.direction,
                index = next,
                "advancing frame"
            );
            self.enter(next);
        }

        let expired = self.effect.as_mut().is_some_and(|effect| effect.advance(dt));
        if expired {
            self.effect = None;
        }
    }

    /// Switch to another state/direction, restarting at frame 0
    ///
    /// Returns `Ok(false)` when both already match and nothing changed.
    pub fn switch(&mut self, state: &str, direction: Direction) -> Result<bool, AnimationError> {
        if state == self.state_name && direction == self.direction {
            return Ok(false);
        }
        let key = locate(&self.definition, state, direction)?;
        self.state_name = state.to_string();
        self.direction = direction;
        self.key = key;
        self.enter(0);
        Ok(true)
    }

    /// Replace any active overlay with a new one
    pub fn add_effect(&mut self, duration_ms: u32, color: Option<ColorId>, attr: Attr, bg: ColorId) {
        self.effect = Some(EffectOverlay::new(duration_ms, color, attr, bg));
    }

    /// Cells of the current frame
    pub fn cells(&self) -> &CellGrid {
        &self.sequence()[self.current.sequence_index as usize].cells
    }

    /// Style of the active overlay, if any
    pub fn effect(&self) -> Option<EffectStyle> {
        self.effect.as_ref().map(EffectOverlay::style)
    }

    /// Swap in a reloaded definition
    ///
    /// Keeps the current state/direction when the new definition still has
    /// them, otherwise falls back to the defaults. Always re-enters frame 0;
    /// the effect overlay survives.
    pub fn rebind(&mut self, definition: Arc<SpriteDefinition>) -> Result<(), AnimationError> {
        let (state, direction) = match definition.locate(&self.state_name, self.direction) {
            Some(_) => (self.state_name.clone(), self.direction),
            None => default_target(&definition)?,
        };
        let key = locate(&definition, &state, direction)?;
        self.definition = definition;
        self.state_name = state;
        self.direction = direction;
        self.key = key;
        self.enter(0);
        Ok(())
    }

    pub fn state_name(&self) -> &str {
        &self.state_name
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn current(&self) -> &ResolvedFrame {
        &self.current
    }

    pub fn definition(&self) -> &Arc<SpriteDefinition> {
        &self.definition
    }

    fn sequence(&self) -> &[FrameSpec] {
        self.definition.sequence(self.key)
    }

    fn enter(&mut self, index: u32) {
        self.current = ResolvedFrame::enter(&self.sequence()[index as usize]);
    }
}

fn locate(
    definition: &SpriteDefinition,
    state: &str,
    direction: Direction,
) -> Result<SequenceKey, AnimationError> {
    if definition.state(state).is_none() {
        return Err(AnimationError::UnknownState(state.to_string()));
    }
    definition
        .locate(state, direction)
        .ok_or_else(|| AnimationError::UnknownDirection {
            state: state.to_string(),
            direction,
        })
}

fn default_target(definition: &SpriteDefinition) -> Result<(String, Direction), AnimationError> {
    if let Some(state) = definition.state(DEFAULT_STATE) {
        let directions: Vec<Direction> = state.directions.iter().map(|d| d.direction).collect();
        if directions.contains(&DEFAULT_DIRECTION) {
            return Ok((DEFAULT_STATE.to_string(), DEFAULT_DIRECTION));
        }
        if let Some(first) = directions.first() {
            return Ok((DEFAULT_STATE.to_string(), *first));
        }
    }
    definition
        .first()
        .map(|(state, direction)| (state.to_string(), direction))
        .ok_or(AnimationError::EmptyDefinition)
}
