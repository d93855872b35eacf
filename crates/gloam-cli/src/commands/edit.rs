//! Edit command

use gloam_backend_terminal::{
    ColorDepth, EditorCommand, EditorView, TerminalOutput, editor_input, poll_keys,
};
use gloam_sprite::{HotReloadWatcher, ReloadConfig, SpriteEditor};
use std::path::Path;
use std::time::Duration;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::info;

pub async fn run(
    path: &Path,
    frame_ms: u64,
    depth: ColorDepth,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut editor = SpriteEditor::new(HotReloadWatcher::new(path, ReloadConfig::default()));
    let mut changes = editor.watcher_mut().watch()?;
    info!(path = %path.display(), "editing sprite");

    let mut output = TerminalOutput::new(depth);
    output.init()?;

    let mut ticker = tokio::time::interval(Duration::from_millis(frame_ms));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut last_tick = Instant::now();

    'session: loop {
        tokio::select! {
            Some(event) = changes.recv() => editor.handle_change(&event),
            _ = ticker.tick() => {
                let now = Instant::now();
                editor.tick(now.duration_since(last_tick).as_secs_f64());
                last_tick = now;

                let (width, height) = TerminalOutput::size()?;
                output.render(&EditorView.compose(&editor, width, height))?;

                for key in poll_keys()? {
                    match editor_input(&key) {
                        Some(EditorCommand::Quit) => break 'session,
                        Some(EditorCommand::NextState) => editor.cycle_state(),
                        Some(EditorCommand::Direction(direction)) => {
                            editor.select_direction(direction)
                        }
                        None => {}
                    }
                }
            }
        }
    }

    output.cleanup()?;
    Ok(())
}
