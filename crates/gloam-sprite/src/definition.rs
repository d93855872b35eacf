//! Sprite definition model
//!
//! A definition is immutable once loaded: states map to directions, each
//! direction holds an ordered sequence of frames.

use gloam_core::Glyph;
use rand::Rng;
use std::fmt;
use std::str::FromStr;

/// Facing direction of a sprite
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    /// All directions, in key order (w, s, a, d)
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];

    /// Name used in sprite files and on the wire
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Up => "up",
            Self::Down => "down",
            Self::Left => "left",
            Self::Right => "right",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error for direction names outside of up/down/left/right
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown direction: {0}")]
pub struct UnknownDirection(pub String);

impl FromStr for Direction {
    type Err = UnknownDirection;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "up" => Ok(Self::Up),
            "down" => Ok(Self::Down),
            "left" => Ok(Self::Left),
            "right" => Ok(Self::Right),
            other => Err(UnknownDirection(other.to_string())),
        }
    }
}

/// How long a frame stays on screen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameDuration {
    /// Always the same number of milliseconds
    Fixed(u32),
    /// Drawn uniformly from `min..=max` every time the frame is entered
    Range { min: u32, max: u32 },
}

impl FrameDuration {
    /// Resolve to a concrete duration in milliseconds
    pub fn draw<R: Rng + ?Sized>(&self, rng: &mut R) -> u32 {
        match *self {
            Self::Fixed(ms) => ms,
            Self::Range { min, max } => rng.random_range(min..=max),
        }
    }
}

/// 2D grid of optional glyphs; `None` cells are transparent
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CellGrid {
    rows: Vec<Vec<Option<Glyph>>>,
}

impl CellGrid {
    /// Create a grid from rows of cells
    pub fn new(rows: Vec<Vec<Option<Glyph>>>) -> Self {
        Self { rows }
    }

    /// Build a grid from text lines, treating spaces as transparent
    pub fn from_lines<S: AsRef<str>>(lines: &[S]) -> Self {
        let rows = lines
            .iter()
            .map(|line| {
                line.as_ref()
                    .chars()
                    .map(|c| if c == ' ' { None } else { Some(c) })
                    .collect()
            })
            .collect();
        Self { rows }
    }

    /// Raw rows
    pub fn rows(&self) -> &[Vec<Option<Glyph>>] {
        &self.rows
    }

    /// Number of rows
    pub fn height(&self) -> usize {
        self.rows.len()
    }

    /// Length of the longest row
    pub fn width(&self) -> usize {
        self.rows.iter().map(Vec::len).max().unwrap_or(0)
    }

    /// Glyph at a position, `None` when transparent or out of range
    pub fn get(&self, x: usize, y: usize) -> Option<Glyph> {
        self.rows.get(y).and_then(|row| row.get(x)).copied().flatten()
    }

    /// Iterate over the opaque cells as `(x, y, glyph)`
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize, Glyph)> + '_ {
        self.rows.iter().enumerate().flat_map(|(y, row)| {
            row.iter()
                .enumerate()
                .filter_map(move |(x, cell)| cell.map(|glyph| (x, y, glyph)))
        })
    }
}

/// One frame of a sequence as written in the sprite file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameSpec {
    pub duration: FrameDuration,
    pub cells: CellGrid,
    /// Position of this frame in its owning sequence
    pub sequence_index: u32,
}

/// Frames for one direction of one state
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectionSequence {
    pub direction: Direction,
    pub frames: Vec<FrameSpec>,
}

/// All directions of one named state
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateTable {
    pub name: String,
    pub directions: Vec<DirectionSequence>,
}

/// Location of a frame sequence inside a definition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SequenceKey {
    state: usize,
    direction: usize,
}

/// Parsed description of every state, direction and frame of a sprite
///
/// Only the loader constructs definitions, so every state has at least one
/// direction and every direction at least one frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpriteDefinition {
    states: Vec<StateTable>,
}

impl SpriteDefinition {
    pub(crate) fn from_validated(states: Vec<StateTable>) -> Self {
        Self { states }
    }

    /// State names in file order
    pub fn state_names(&self) -> impl Iterator<Item = &str> {
        self.states.iter().map(|s| s.name.as_str())
    }

    /// Number of states
    pub fn len(&self) -> usize {
        self.states.len()
    }

    /// Whether the definition has no states (never true for loaded definitions)
    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    /// Look up a state by name
    pub fn state(&self, name: &str) -> Option<&StateTable> {
        self.states.iter().find(|s| s.name == name)
    }

    /// Directions available for a state, in file order
    pub fn directions(&self, state: &str) -> Vec<Direction> {
        self.state(state)
            .map(|s| s.directions.iter().map(|d| d.direction).collect())
            .unwrap_or_default()
    }

    /// Find the sequence for a state and direction
    pub fn locate(&self, state: &str, direction: Direction) -> Option<SequenceKey> {
        let state_idx = self.states.iter().position(|s| s.name == state)?;
        let direction_idx = self.states[state_idx]
            .directions
            .iter()
            .position(|d| d.direction == direction)?;
        Some(SequenceKey {
            state: state_idx,
            direction: direction_idx,
        })
    }

    /// The first state and its first direction
    pub fn first(&self) -> Option<(&str, Direction)> {
        let state = self.states.first()?;
        let direction = state.directions.first()?;
        Some((state.name.as_str(), direction.direction))
    }

    /// Frames for a located sequence
    pub fn sequence(&self, key: SequenceKey) -> &[FrameSpec] {
        &self.states[key.state].directions[key.direction].frames
    }

    /// Frames for a state and direction, if present
    pub fn frames(&self, state: &str, direction: Direction) -> Option<&[FrameSpec]> {
        self.locate(state, direction).map(|key| self.sequence(key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direction_names() {
        for direction in Direction::ALL {
            assert_eq!(direction.as_str().parse::<Direction>().unwrap(), direction);
        }
        assert!("north".parse::<Direction>().is_err());
    }

    #[test]
    fn test_fixed_duration_ignores_rng() {
        let mut rng = rand::rng();
        assert_eq!(FrameDuration::Fixed(200).draw(&mut rng), 200);
    }

    #[test]
    fn test_range_duration_stays_in_bounds() {
        let mut rng = rand::rng();
        let duration = FrameDuration::Range { min: 100, max: 120 };
        for _ in 0..200 {
            let ms = duration.draw(&mut rng);
            assert!((100..=120).contains(&ms));
        }
    }

    #[test]
    fn test_cell_grid_from_lines() {
        let grid = CellGrid::from_lines(&[" o ", "/|\\"]);
        assert_eq!(grid.height(), 2);
        assert_eq!(grid.width(), 3);
        assert_eq!(grid.get(0, 0), None);
        assert_eq!(grid.get(1, 0), Some('o'));
        assert_eq!(grid.get(2, 1), Some('\\'));
        assert_eq!(grid.get(9, 9), None);
        assert_eq!(grid.iter().count(), 4);
    }
}
