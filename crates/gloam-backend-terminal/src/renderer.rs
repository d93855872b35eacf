//! Frame composition
//!
//! Turns the world mirror or the sprite editor model into a
//! [`TerminalFrame`]. Nothing here touches the terminal itself.

use crate::frame::{TerminalCell, TerminalFrame};
use gloam_core::{Attr, ColorId};
use gloam_sprite::{CellGrid, Direction, EffectStyle, SpriteEditor};
use gloam_world::{Entity, WorldState};

/// Tile colour while in view
pub const VISIBLE_TILE: ColorId = ColorId::WHITE;
/// Tile colour once seen but out of view
pub const REMEMBERED_TILE: ColorId = ColorId::MAGENTA;

/// Draws the world centred on the local player
#[derive(Debug, Clone, Default)]
pub struct WorldRenderer {
    show_status: bool,
}

impl WorldRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Show a hit point line in the top left corner
    pub fn with_status(mut self, show: bool) -> Self {
        self.show_status = show;
        self
    }

    pub fn compose(&self, world: &WorldState, width: u32, height: u32) -> TerminalFrame {
        let mut frame = TerminalFrame::new(width, height);
        let me = world.entities.self_entity();
        // room coordinates span all of i32, screen offsets need the wider type
        let origin = (
            i64::from(width / 2) - i64::from(me.position.0),
            i64::from(height / 2) - i64::from(me.position.1),
        );

        for (&(x, y), tile) in world.room.tiles() {
            let fg = if tile.currently_visible {
                VISIBLE_TILE
            } else if tile.seen {
                REMEMBERED_TILE
            } else {
                continue;
            };
            frame.put(
                origin.0 + i64::from(x),
                origin.1 + i64::from(y),
                TerminalCell::new(tile.terrain.glyph()).with_fg(fg),
            );
        }

        for entity in world.entities.iter().filter(|e| e.visible) {
            draw_entity(&mut frame, origin, entity);
        }

        if self.show_status {
            if let Some(hp) = me.hit_points {
                frame.draw_str(0, 0, &format!("HP {hp}"), ColorId::WHITE, Attr::BOLD);
            }
        }

        frame
    }
}

fn draw_entity(frame: &mut TerminalFrame, origin: (i64, i64), entity: &Entity) {
    let at = (
        origin.0 + i64::from(entity.position.0),
        origin.1 + i64::from(entity.position.1),
    );
    draw_cells(frame, at, entity.cells(), entity.color, entity.effect());
}

/// Draw a sprite's cells; blank cells leave what is underneath
fn draw_cells(
    frame: &mut TerminalFrame,
    at: (i64, i64),
    cells: &CellGrid,
    color: ColorId,
    effect: Option<EffectStyle>,
) {
    let cell = match effect {
        Some(style) => TerminalCell::default()
            .with_fg(style.color.unwrap_or(color))
            .with_bg(style.bg)
            .with_attr(style.attr),
        None => TerminalCell::default().with_fg(color),
    };

    for (x, y, glyph) in cells.iter() {
        frame.put(
            at.0 + x as i64,
            at.1 + y as i64,
            TerminalCell { char: glyph, ..cell },
        );
    }
}

/// Draws the sprite editor screen
#[derive(Debug, Clone, Default)]
pub struct EditorView;

impl EditorView {
    const PREVIEW_ROW: u32 = 4;
    const HELP: &'static str = "space: next state  w/a/s/d: direction  q: quit";

    pub fn compose(&self, editor: &SpriteEditor, width: u32, height: u32) -> TerminalFrame {
        let mut frame = TerminalFrame::new(width, height);

        let active_state = editor.active_state();
        let mut x = 0;
        frame.draw_str(x, 0, "states:", ColorId::WHITE, Attr::BOLD);
        x += 8;
        for state in editor.states() {
            let attr = if Some(state.as_str()) == active_state {
                Attr::REVERSE
            } else {
                Attr::NORMAL
            };
            frame.draw_str(x, 0, &state, ColorId::WHITE, attr);
            x += state.chars().count() as u32 + 1;
        }

        let directions = editor.directions();
        let mut x = 0;
        frame.draw_str(x, 1, "directions:", ColorId::WHITE, Attr::BOLD);
        x += 12;
        for direction in Direction::ALL {
            let (fg, attr) = if Some(direction) == editor.active_direction() {
                (ColorId::WHITE, Attr::REVERSE)
            } else if directions.contains(&direction) {
                (ColorId::WHITE, Attr::NORMAL)
            } else {
                (ColorId(8), Attr::NORMAL)
            };
            frame.draw_str(x, 1, direction.as_str(), fg, attr);
            x += direction.as_str().len() as u32 + 1;
        }

        if let Some(cells) = editor.cells() {
            draw_cells(&mut frame, (2, i64::from(Self::PREVIEW_ROW)), cells, ColorId::WHITE, None);
        }

        if height >= 2 {
            if let Some(error) = editor.error_line() {
                frame.draw_str(0, height - 2, &error, ColorId::RED, Attr::BOLD);
            }
        }
        if height >= 1 {
            frame.draw_str(0, height - 1, Self::HELP, ColorId(8), Attr::NORMAL);
        }

        frame
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gloam_core::EntityId;
    use gloam_sprite::{HotReloadWatcher, ReloadConfig};
    use gloam_world::{
        CreatureDelta, EntityDelta, Packet, Snapshot, SpriteLibrary, TileDelta, WorldSynchronizer,
    };
    use std::collections::HashMap;

    const SPRITE: &str = "idle:\n  right:\n    - ms: 100\n      cells: [[\"@\", null]]\n";

    fn world() -> WorldSynchronizer {
        let mut library = SpriteLibrary::new();
        library.insert("player", gloam_sprite::load(SPRITE).unwrap());
        library.insert(
            "blob",
            gloam_sprite::load("idle:\n  right:\n    - ms: 100\n      cells: [[\"o\"]]\n")
                .unwrap(),
        );
        let mut sync = WorldSynchronizer::new(library).unwrap();
        sync.apply(Packet::Init(Snapshot {
            map: vec![
                TileDelta::new((10, 10), "floor", true, true),
                TileDelta::new((11, 10), "floor", true, true),
                TileDelta::new((12, 10), "wall", true, false),
                TileDelta::new((13, 10), "lava", false, false),
            ],
            self_entity: EntityDelta::new((10, 10), ColorId(2), true).with_hit_points(10),
            players: HashMap::new(),
            creatures: HashMap::from([
                (
                    EntityId::new(),
                    CreatureDelta::new(Some("blob"), EntityDelta::new((9, 10), ColorId(3), true)),
                ),
                (
                    EntityId::new(),
                    CreatureDelta::new(Some("blob"), EntityDelta::new((10, 9), ColorId(3), false)),
                ),
            ]),
        }));
        sync
    }

    #[test]
    fn test_world_centred_on_self() {
        let sync = world();
        let frame = WorldRenderer::new().compose(sync.state(), 9, 5);

        // self sits at the centre, its blank cell leaves the floor visible
        let centre = frame.get(4, 2).unwrap();
        assert_eq!(centre.char, '@');
        assert_eq!(centre.fg, ColorId(2));
        assert_eq!(frame.get(5, 2).unwrap().char, '.');
        assert_eq!(frame.get(5, 2).unwrap().fg, VISIBLE_TILE);

        let wall = frame.get(6, 2).unwrap();
        assert_eq!((wall.char, wall.fg), ('#', REMEMBERED_TILE));
        // never seen
        assert!(frame.get(7, 2).unwrap().is_empty());

        assert_eq!(frame.get(3, 2).unwrap().char, 'o');
        // hidden creature
        assert!(frame.get(4, 1).unwrap().is_empty());
    }

    #[test]
    fn test_effect_overrides_style() {
        let mut sync = world();
        sync.apply(Packet::Update(gloam_world::SnapshotDelta {
            self_entity: Some(EntityDelta::new((10, 10), ColorId(2), true).with_hit_points(4)),
            ..Default::default()
        }));

        let frame = WorldRenderer::new().compose(sync.state(), 9, 5);
        let centre = frame.get(4, 2).unwrap();
        assert_eq!(centre.fg, gloam_world::DAMAGE_FLASH_COLOR);
        assert_eq!(centre.bg, ColorId::BLACK);
    }

    #[test]
    fn test_far_coordinates_are_clipped() {
        let mut sync = world();
        sync.apply(Packet::Update(gloam_world::SnapshotDelta {
            map: vec![
                TileDelta::new((i32::MAX, 0), "wall", true, true),
                TileDelta::new((i32::MIN, i32::MAX), "wall", true, true),
            ],
            ..Default::default()
        }));
        let frame = WorldRenderer::new().compose(sync.state(), 80, 24);
        assert_eq!(frame.get(40, 12).unwrap().char, '@');

        // self at the far corner of the room
        sync.apply(Packet::Update(gloam_world::SnapshotDelta {
            self_entity: Some(EntityDelta::new((i32::MIN, i32::MIN), ColorId(2), true)),
            ..Default::default()
        }));
        let frame = WorldRenderer::new().compose(sync.state(), 80, 24);
        assert_eq!(frame.get(40, 12).unwrap().char, '@');
        assert!(!frame.row_text(12).contains('#'));
    }

    #[test]
    fn test_status_line() {
        let sync = world();
        let frame = WorldRenderer::new().with_status(true).compose(sync.state(), 9, 5);
        assert!(frame.row_text(0).starts_with("HP 10"));
    }

    #[test]
    fn test_editor_view() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("sprite.yaml");
        std::fs::write(&path, SPRITE).unwrap();
        let editor = SpriteEditor::new(HotReloadWatcher::new(&path, ReloadConfig::default()));

        let frame = EditorView.compose(&editor, 60, 10);
        assert!(frame.row_text(0).starts_with("states: idle"));
        assert_eq!(frame.get(8, 0).unwrap().attr, Attr::REVERSE);
        assert!(frame.row_text(1).contains("right"));
        assert_eq!(frame.get(2, EditorView::PREVIEW_ROW).unwrap().char, '@');
        assert!(frame.row_text(9).starts_with("space"));

        std::fs::write(&path, "idle: [\n").unwrap();
        let mut editor = editor;
        editor.handle_change(&gloam_sprite::ChangeEvent { path });
        let frame = EditorView.compose(&editor, 60, 10);
        assert_eq!(frame.get(0, 8).unwrap().fg, ColorId::RED);
        // the last good frame is still shown
        assert_eq!(frame.get(2, EditorView::PREVIEW_ROW).unwrap().char, '@');
    }
}
