//! Hot reloading of a single sprite file
//!
//! File-change notifications arrive on a background thread owned by
//! `notify`. They are forwarded through a bounded channel and consumed by the
//! editor loop, which calls [`HotReloadWatcher::handle_event`]. The active
//! definition lives behind a lock so handles on other threads always see
//! either the old or the new definition, never a partial one.

use crate::definition::SpriteDefinition;
use crate::loader::{LoadError, load_path};
use notify::{Event, RecommendedWatcher, RecursiveMode, Watcher};
use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError, RwLock};
use thiserror::Error;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// Number of load failures kept for display
pub const ERROR_HISTORY: usize = 1;

/// Watcher configuration
#[derive(Debug, Clone)]
pub struct ReloadConfig {
    /// Capacity of the change event channel
    pub event_buffer: usize,
}

impl Default for ReloadConfig {
    fn default() -> Self {
        Self { event_buffer: 16 }
    }
}

/// Watcher setup errors
#[derive(Debug, Error)]
pub enum WatchError {
    #[error("file watcher failed: {0}")]
    Notify(#[from] notify::Error),

    #[error("sprite path has no file name: {0}")]
    InvalidPath(PathBuf),
}

/// A change notification for some file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeEvent {
    pub path: PathBuf,
}

/// Shared, thread-safe view of the active definition
#[derive(Debug, Clone, Default)]
pub struct SpriteHandle {
    active: Arc<RwLock<Option<Arc<SpriteDefinition>>>>,
}

impl SpriteHandle {
    /// The last successfully loaded definition
    pub fn current(&self) -> Option<Arc<SpriteDefinition>> {
        self.active
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn replace(&self, definition: Arc<SpriteDefinition>) {
        *self.active.write().unwrap_or_else(PoisonError::into_inner) = Some(definition);
    }
}

/// Loader wrapper that reloads one file on change and isolates failures
///
/// A failed load never replaces the active definition; the error is kept in
/// a history of size [`ERROR_HISTORY`] until the next successful load.
pub struct HotReloadWatcher {
    path: PathBuf,
    normalized: PathBuf,
    config: ReloadConfig,
    handle: SpriteHandle,
    errors: Mutex<VecDeque<LoadError>>,
    watcher: Option<RecommendedWatcher>,
}

impl HotReloadWatcher {
    /// Create a watcher and attempt the initial load
    ///
    /// An initial failure is recorded like any other; there is simply no
    /// active definition until the file loads.
    pub fn new(path: impl Into<PathBuf>, config: ReloadConfig) -> Self {
        let path = path.into();
        let normalized = normalize(&path);
        let watcher = Self {
            path,
            normalized,
            config,
            handle: SpriteHandle::default(),
            errors: Mutex::new(VecDeque::with_capacity(ERROR_HISTORY)),
            watcher: None,
        };
        let _ = watcher.reload();
        watcher
    }

    /// Watched file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The last successfully loaded definition
    pub fn current(&self) -> Option<Arc<SpriteDefinition>> {
        self.handle.current()
    }

    /// A cloneable handle for readers on other threads
    pub fn handle(&self) -> SpriteHandle {
        self.handle.clone()
    }

    /// Load the file now, swapping it in on success
    pub fn reload(&self) -> Result<Arc<SpriteDefinition>, LoadError> {
        match load_path(&self.path) {
            Ok(definition) => {
                let definition = Arc::new(definition);
                self.handle.replace(definition.clone());
                self.lock_errors().clear();
                info!(path = %self.path.display(), "sprite reloaded");
                Ok(definition)
            }
            Err(err) => {
                warn!(path = %self.path.display(), error = %err, "sprite reload failed");
                let mut errors = self.lock_errors();
                errors.push_back(err.clone());
                while errors.len() > ERROR_HISTORY {
                    errors.pop_front();
                }
                Err(err)
            }
        }
    }

    /// Reload if the event concerns the watched file
    ///
    /// Returns `None` for events about other files.
    pub fn handle_event(
        &self,
        event: &ChangeEvent,
    ) -> Option<Result<Arc<SpriteDefinition>, LoadError>> {
        if !self.is_watched(&event.path) {
            return None;
        }
        Some(self.reload())
    }

    /// Whether a path refers to the watched file
    pub fn is_watched(&self, path: &Path) -> bool {
        path == self.path || normalize(path) == self.normalized
    }

    /// Recorded load failures, oldest first
    pub fn errors(&self) -> Vec<LoadError> {
        self.lock_errors().iter().cloned().collect()
    }

    /// Most recent load failure since the last successful load
    pub fn last_error(&self) -> Option<LoadError> {
        self.lock_errors().back().cloned()
    }

    /// Start watching the file's directory
    ///
    /// Change events for the watched file are delivered on the returned
    /// channel. Events are dropped while the channel is full; any queued
    /// event already triggers a reload of the latest file contents.
    pub fn watch(&mut self) -> Result<mpsc::Receiver<ChangeEvent>, WatchError> {
        let file_name = self
            .normalized
            .file_name()
            .map(|n| n.to_os_string())
            .ok_or_else(|| WatchError::InvalidPath(self.path.clone()))?;
        let dir = match self.normalized.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
            _ => PathBuf::from("."),
        };

        let (tx, rx) = mpsc::channel(self.config.event_buffer);
        let mut watcher = notify::recommended_watcher(move |res: notify::Result<Event>| match res {
            Ok(event) => {
                if !(event.kind.is_modify() || event.kind.is_create()) {
                    return;
                }
                for path in event.paths {
                    if path.file_name() != Some(file_name.as_os_str()) {
                        continue;
                    }
                    if tx.try_send(ChangeEvent { path }).is_err() {
                        debug!("change event dropped, reload already pending");
                    }
                }
            }
            Err(err) => warn!(error = %err, "file watcher error"),
        })?;
        watcher.watch(&dir, RecursiveMode::NonRecursive)?;
        info!(dir = %dir.display(), "watching for sprite changes");

        self.watcher = Some(watcher);
        Ok(rx)
    }

    fn lock_errors(&self) -> std::sync::MutexGuard<'_, VecDeque<LoadError>> {
        self.errors.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Canonical directory plus file name, so the file itself need not exist
fn normalize(path: &Path) -> PathBuf {
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    match (std::fs::canonicalize(parent), path.file_name()) {
        (Ok(dir), Some(name)) => dir.join(name),
        _ => path.to_path_buf(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const GOOD: &str = "idle:\n  right:\n    - ms: 100\n      cells: [[\"a\"]]\n";
    const OTHER: &str = "idle:\n  right:\n    - ms: 100\n      cells: [[\"b\"]]\n";
    const BROKEN: &str = "idle:\n  right:\n    - cells: [[\"a\"]]\n";

    fn first_glyph(def: &SpriteDefinition) -> Option<char> {
        def.frames("idle", crate::Direction::Right)?[0].cells.get(0, 0)
    }

    #[test]
    fn test_initial_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("sprite.yaml");
        std::fs::write(&path, GOOD).unwrap();

        let watcher = HotReloadWatcher::new(&path, ReloadConfig::default());
        assert!(watcher.current().is_some());
        assert!(watcher.errors().is_empty());
    }

    #[test]
    fn test_initial_failure_is_recorded() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("sprite.yaml");
        std::fs::write(&path, BROKEN).unwrap();

        let watcher = HotReloadWatcher::new(&path, ReloadConfig::default());
        assert!(watcher.current().is_none());
        assert!(matches!(watcher.last_error(), Some(LoadError::Parse { .. })));
    }

    #[test]
    fn test_broken_edit_keeps_last_good() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("sprite.yaml");
        std::fs::write(&path, GOOD).unwrap();
        let watcher = HotReloadWatcher::new(&path, ReloadConfig::default());
        let before = watcher.current().unwrap();

        std::fs::write(&path, BROKEN).unwrap();
        let result = watcher.handle_event(&ChangeEvent { path: path.clone() });

        assert!(matches!(result, Some(Err(_))));
        let after = watcher.current().unwrap();
        assert!(Arc::ptr_eq(&before, &after));
        assert_eq!(watcher.errors().len(), 1);
    }

    #[test]
    fn test_error_history_keeps_only_latest() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("sprite.yaml");
        std::fs::write(&path, GOOD).unwrap();
        let watcher = HotReloadWatcher::new(&path, ReloadConfig::default());

        std::fs::write(&path, BROKEN).unwrap();
        let _ = watcher.reload();
        std::fs::write(&path, "idle: [\n").unwrap();
        let _ = watcher.reload();

        let errors = watcher.errors();
        assert_eq!(errors.len(), ERROR_HISTORY);
        let LoadError::Parse { source, .. } = &errors[0] else {
            panic!("expected parse error");
        };
        assert!(source.line.is_some());
    }

    #[test]
    fn test_successful_reload_swaps_and_clears_errors() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("sprite.yaml");
        std::fs::write(&path, GOOD).unwrap();
        let watcher = HotReloadWatcher::new(&path, ReloadConfig::default());
        let handle = watcher.handle();

        std::fs::write(&path, BROKEN).unwrap();
        let _ = watcher.reload();
        assert!(watcher.last_error().is_some());

        std::fs::write(&path, OTHER).unwrap();
        watcher.reload().unwrap();

        assert!(watcher.errors().is_empty());
        assert_eq!(first_glyph(&handle.current().unwrap()), Some('b'));
    }

    #[test]
    fn test_events_for_other_files_ignored() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("sprite.yaml");
        std::fs::write(&path, GOOD).unwrap();
        let watcher = HotReloadWatcher::new(&path, ReloadConfig::default());

        let event = ChangeEvent {
            path: dir.path().join("other.yaml"),
        };
        assert!(watcher.handle_event(&event).is_none());
    }

    #[test]
    fn test_handle_visible_across_threads() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("sprite.yaml");
        std::fs::write(&path, GOOD).unwrap();
        let watcher = HotReloadWatcher::new(&path, ReloadConfig::default());
        let handle = watcher.handle();

        std::fs::write(&path, OTHER).unwrap();
        watcher.reload().unwrap();

        let glyph = std::thread::spawn(move || first_glyph(&handle.current().unwrap()))
            .join()
            .unwrap();
        assert_eq!(glyph, Some('b'));
    }

    #[tokio::test]
    async fn test_watch_delivers_change_events() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("sprite.yaml");
        std::fs::write(&path, GOOD).unwrap();
        let mut watcher = HotReloadWatcher::new(&path, ReloadConfig::default());
        let mut events = watcher.watch().unwrap();

        std::fs::write(&path, OTHER).unwrap();

        let event = tokio::time::timeout(std::time::Duration::from_secs(5), events.recv())
            .await
            .expect("no change event")
            .unwrap();
        let reloaded = watcher.handle_event(&event).unwrap().unwrap();
        assert_eq!(first_glyph(&reloaded), Some('b'));
    }
}
