//! Sprite editor model
//!
//! Holds what the editor screen shows: the active state and direction, a
//! running animation of the current definition and the latest load error.
//! File watching is a collaborator handed in at construction.

use crate::animation::AnimationState;
use crate::definition::{CellGrid, Direction};
use crate::reload::{ChangeEvent, HotReloadWatcher};
use std::sync::Arc;
use tracing::debug;

/// Interactive sprite preview with live reload
pub struct SpriteEditor {
    watcher: HotReloadWatcher,
    animation: Option<AnimationState>,
}

impl SpriteEditor {
    /// Create an editor around a watcher
    pub fn new(watcher: HotReloadWatcher) -> Self {
        let mut editor = Self {
            watcher,
            animation: None,
        };
        editor.sync_definition();
        editor
    }

    /// Borrow the watcher, e.g. to start watching
    pub fn watcher_mut(&mut self) -> &mut HotReloadWatcher {
        &mut self.watcher
    }

    /// Feed a change notification; rebinds the preview on success
    pub fn handle_change(&mut self, event: &ChangeEvent) {
        if let Some(Ok(_)) = self.watcher.handle_event(event) {
            self.sync_definition();
        }
    }

    /// Advance the preview animation
    pub fn tick(&mut self, dt: f64) {
        if let Some(animation) = &mut self.animation {
            animation.tick(dt);
        }
    }

    /// Move to the next state, wrapping around, and pick its first direction
    pub fn cycle_state(&mut self) {
        let Some(definition) = self.watcher.current() else {
            return;
        };
        let states: Vec<&str> = definition.state_names().collect();
        let next = match self.active_state() {
            Some(current) => states
                .iter()
                .position(|s| *s == current)
                .map(|idx| (idx + 1) % states.len())
                .unwrap_or(0),
            None => 0,
        };
        let Some(state) = states.get(next) else {
            return;
        };
        let directions = definition.directions(state);
        let direction = self
            .active_direction()
            .filter(|d| directions.contains(d))
            .or_else(|| directions.first().copied());
        if let (Some(animation), Some(direction)) = (&mut self.animation, direction) {
            if let Err(err) = animation.switch(state, direction) {
                debug!(error = %err, state, "state not available");
            }
        }
    }

    /// Select a direction if the active state has it
    pub fn select_direction(&mut self, direction: Direction) {
        if let Some(animation) = &mut self.animation {
            let state = animation.state_name().to_string();
            if let Err(err) = animation.switch(&state, direction) {
                debug!(error = %err, "direction not available");
            }
        }
    }

    /// State names of the active definition
    pub fn states(&self) -> Vec<String> {
        self.watcher
            .current()
            .map(|d| d.state_names().map(str::to_string).collect())
            .unwrap_or_default()
    }

    /// Directions of the active state
    pub fn directions(&self) -> Vec<Direction> {
        match (self.watcher.current(), self.active_state()) {
            (Some(definition), Some(state)) => definition.directions(state),
            _ => Vec::new(),
        }
    }

    pub fn active_state(&self) -> Option<&str> {
        self.animation.as_ref().map(AnimationState::state_name)
    }

    pub fn active_direction(&self) -> Option<Direction> {
        self.animation.as_ref().map(AnimationState::direction)
    }

    /// Cells of the frame being previewed
    pub fn cells(&self) -> Option<&CellGrid> {
        self.animation.as_ref().map(AnimationState::cells)
    }

    /// Latest load error as a single line for inline display
    pub fn error_line(&self) -> Option<String> {
        self.watcher.last_error().map(|err| {
            let mut text = err.to_string().replace('\r', "").replace('\n', " ");
            text.truncate(text.trim_end().len());
            text
        })
    }

    fn sync_definition(&mut self) {
        let Some(definition) = self.watcher.current() else {
            return;
        };
        if self
            .animation
            .as_ref()
            .is_some_and(|a| Arc::ptr_eq(a.definition(), &definition))
        {
            return;
        }
        let rebound = match &mut self.animation {
            Some(animation) => animation.rebind(Arc::clone(&definition)).is_ok(),
            None => false,
        };
        if !rebound {
            self.animation = AnimationState::new(definition).ok();
        }
    }
}
