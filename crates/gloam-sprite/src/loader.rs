//! Sprite definition loading
//!
//! Sprite files are YAML documents shaped as
//! `state -> direction -> [frame]`:
//!
//! ```yaml
//! idle:
//!   right:
//!     - ms: 200
//!       cells:
//!         - [null, "o", null]
//!         - ["/", "|", "\\"]
//! blink:
//!   right:
//!     - ms: [900, 1600]
//!       random: true
//!       cells: [["o"]]
//! ```
//!
//! [`load`] is a pure function: no caching, no shared parser state. It
//! either returns a fully validated [`SpriteDefinition`] or a [`ParseError`].

use crate::definition::{
    CellGrid, Direction, DirectionSequence, FrameDuration, FrameSpec, SpriteDefinition, StateTable,
};
use serde::de::{MapAccess, Visitor};
use serde::{Deserialize, Deserializer};
use std::fmt;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;

/// A malformed sprite definition
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{}{message}{}", field_prefix(.field.as_deref()), location_suffix(.line, .column))]
pub struct ParseError {
    /// 1-based line, when the YAML parser could locate the problem
    pub line: Option<usize>,
    /// 1-based column, when known
    pub column: Option<usize>,
    /// Dotted path to the offending field, e.g. `walk.right[1].ms`
    pub field: Option<String>,
    pub message: String,
}

impl ParseError {
    fn at_field(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            line: None,
            column: None,
            field: Some(field.into()),
            message: message.into(),
        }
    }
}

fn field_prefix(field: Option<&str>) -> String {
    field.map(|f| format!("{f}: ")).unwrap_or_default()
}

fn location_suffix(line: &Option<usize>, column: &Option<usize>) -> String {
    match (*line, *column) {
        (Some(line), Some(column)) => format!(" (line {line}, column {column})"),
        (Some(line), None) => format!(" (line {line})"),
        _ => String::new(),
    }
}

impl From<serde_yaml::Error> for ParseError {
    fn from(err: serde_yaml::Error) -> Self {
        let location = err.location();
        Self {
            line: location.as_ref().map(|l| l.line()),
            column: location.as_ref().map(|l| l.column()),
            field: None,
            message: err.to_string(),
        }
    }
}

/// Errors from loading a sprite file off disk
#[derive(Debug, Clone, Error)]
pub enum LoadError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: Arc<std::io::Error>,
    },

    #[error("invalid sprite definition in {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: ParseError,
    },
}

/// Parse sprite definition text
pub fn load(source: &str) -> Result<SpriteDefinition, ParseError> {
    let raw: OrderedMap<OrderedMap<Vec<RawFrame>>> = serde_yaml::from_str(source)?;
    validate(raw)
}

/// Read and parse a sprite file
pub fn load_path(path: impl AsRef<Path>) -> Result<SpriteDefinition, LoadError> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path).map_err(|e| LoadError::Io {
        path: path.to_path_buf(),
        source: Arc::new(e),
    })?;
    load(&text).map_err(|e| LoadError::Parse {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Mapping that keeps file order
struct OrderedMap<V>(Vec<(String, V)>);

impl<'de, V: Deserialize<'de>> Deserialize<'de> for OrderedMap<V> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct OrderedVisitor<V>(PhantomData<V>);

        impl<'de, V: Deserialize<'de>> Visitor<'de> for OrderedVisitor<V> {
            type Value = OrderedMap<V>;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a mapping")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
                let mut entries = Vec::with_capacity(map.size_hint().unwrap_or(0));
                while let Some((key, value)) = map.next_entry::<String, V>()? {
                    entries.push((key, value));
                }
                Ok(OrderedMap(entries))
            }
        }

        deserializer.deserialize_map(OrderedVisitor(PhantomData))
    }
}

#[derive(Deserialize)]
struct RawFrame {
    ms: RawMs,
    #[serde(default)]
    random: bool,
    cells: Vec<Vec<Option<String>>>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawMs {
    Fixed(u32),
    Range(Vec<u32>),
}

fn validate(raw: OrderedMap<OrderedMap<Vec<RawFrame>>>) -> Result<SpriteDefinition, ParseError> {
    if raw.0.is_empty() {
        return Err(ParseError::at_field("<root>", "definition has no states"));
    }

    let mut states: Vec<StateTable> = Vec::with_capacity(raw.0.len());
    for (state_name, directions) in raw.0 {
        if states.iter().any(|s| s.name == state_name) {
            return Err(ParseError::at_field(&state_name, "duplicate state"));
        }
        if directions.0.is_empty() {
            return Err(ParseError::at_field(&state_name, "state has no directions"));
        }

        let mut sequences: Vec<DirectionSequence> = Vec::with_capacity(directions.0.len());
        for (direction_name, frames) in directions.0 {
            let field = format!("{}.{}", state_name, direction_name);
            let direction: Direction = direction_name
                .parse()
                .map_err(|e: crate::definition::UnknownDirection| {
                    ParseError::at_field(&field, e.to_string())
                })?;
            if sequences.iter().any(|s| s.direction == direction) {
                return Err(ParseError::at_field(&field, "duplicate direction"));
            }
            if frames.is_empty() {
                return Err(ParseError::at_field(&field, "direction has no frames"));
            }

            let frames = frames
                .into_iter()
                .enumerate()
                .map(|(idx, frame)| validate_frame(&format!("{}[{}]", field, idx), idx, frame))
                .collect::<Result<Vec<_>, _>>()?;

            sequences.push(DirectionSequence { direction, frames });
        }

        states.push(StateTable {
            name: state_name,
            directions: sequences,
        });
    }

    Ok(SpriteDefinition::from_validated(states))
}

fn validate_frame(field: &str, idx: usize, frame: RawFrame) -> Result<FrameSpec, ParseError> {
    let duration = match (frame.ms, frame.random) {
        (RawMs::Fixed(ms), false) => FrameDuration::Fixed(ms),
        (RawMs::Fixed(_), true) => {
            return Err(ParseError::at_field(
                format!("{}.ms", field),
                "random frames need a [min, max] range",
            ));
        }
        (RawMs::Range(range), true) => match range.as_slice() {
            [min, max] if min <= max => FrameDuration::Range {
                min: *min,
                max: *max,
            },
            [_, _] => {
                return Err(ParseError::at_field(
                    format!("{}.ms", field),
                    "range must be ascending",
                ));
            }
            _ => {
                return Err(ParseError::at_field(
                    format!("{}.ms", field),
                    format!("range needs exactly 2 values, got {}", range.len()),
                ));
            }
        },
        (RawMs::Range(_), false) => {
            return Err(ParseError::at_field(
                format!("{}.ms", field),
                "a [min, max] range requires `random: true`",
            ));
        }
    };

    let mut rows = Vec::with_capacity(frame.cells.len());
    for (y, row) in frame.cells.into_iter().enumerate() {
        let mut cells = Vec::with_capacity(row.len());
        for (x, cell) in row.into_iter().enumerate() {
            let glyph = match cell.as_deref() {
                None | Some("") => None,
                Some(text) => {
                    let mut chars = text.chars();
                    match (chars.next(), chars.next()) {
                        (Some(c), None) => Some(c),
                        _ => {
                            return Err(ParseError::at_field(
                                format!("{}.cells[{}][{}]", field, y, x),
                                format!("glyph must be a single character, got {:?}", text),
                            ));
                        }
                    }
                }
            };
            cells.push(glyph);
        }
        rows.push(cells);
    }

    Ok(FrameSpec {
        duration,
        cells: CellGrid::new(rows),
        sequence_index: idx as u32,
    })
}
