//! Source file watcher for the live preview
//!
//! Watches the directory containing a markdown source (editors often replace
//! files by rename) and reports changes to that one file. Debouncing is left
//! to the caller through [`ChangeDebouncer`].

use notify::{Config, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::path::{Path, PathBuf};
use std::sync::mpsc::{channel, Receiver};
use std::time::{Duration, Instant};

/// Events from the source watcher
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WatchEvent {
    /// The source was written or recreated
    Modified(PathBuf),

    /// The source was deleted
    Removed(PathBuf),

    /// Watcher error occurred
    Error(String),
}

/// Watches a single markdown source file
pub struct SourceWatcher {
    _watcher: RecommendedWatcher,
    event_rx: Receiver<notify::Result<Event>>,
    source: PathBuf,
}

impl SourceWatcher {
    /// Start watching `source`
    pub fn new(source: impl AsRef<Path>) -> Result<Self, notify::Error> {
        let source = source
            .as_ref()
            .canonicalize()
            .unwrap_or_else(|_| source.as_ref().to_path_buf());
        let dir = match source.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        };

        let (tx, rx) = channel();
        let mut watcher = RecommendedWatcher::new(
            move |res| {
                let _ = tx.send(res);
            },
            Config::default(),
        )?;
        watcher.watch(&dir, RecursiveMode::NonRecursive)?;
        log::debug!("Watching {} for changes", source.display());

        Ok(Self {
            _watcher: watcher,
            event_rx: rx,
            source,
        })
    }

    pub fn source(&self) -> &Path {
        &self.source
    }

    /// Drain pending events (non-blocking)
    pub fn poll(&self) -> Vec<WatchEvent> {
        let mut events = Vec::new();
        while let Ok(result) = self.event_rx.try_recv() {
            match result {
                Ok(event) => events.extend(self.convert_event(event)),
                Err(e) => events.push(WatchEvent::Error(e.to_string())),
            }
        }
        events
    }

    /// Convert a notify event into ours, ignoring other files
    fn convert_event(&self, event: Event) -> Option<WatchEvent> {
        if !event.paths.iter().any(|p| self.is_source(p)) {
            return None;
        }

        match event.kind {
            EventKind::Create(_) | EventKind::Modify(_) => {
                Some(WatchEvent::Modified(self.source.clone()))
            }
            EventKind::Remove(_) => Some(WatchEvent::Removed(self.source.clone())),
            _ => None,
        }
    }

    fn is_source(&self, path: &Path) -> bool {
        path == self.source || path.file_name() == self.source.file_name() && {
            let parent = path.parent().and_then(|p| p.canonicalize().ok());
            parent.as_deref() == self.source.parent()
        }
    }
}

/// Trailing-edge debouncer: reports ready once changes have stopped for the
/// configured quiet period.
#[derive(Debug)]
pub struct ChangeDebouncer {
    quiet: Duration,
    last_change: Option<Instant>,
}

impl ChangeDebouncer {
    pub fn new(quiet_ms: u64) -> Self {
        Self {
            quiet: Duration::from_millis(quiet_ms),
            last_change: None,
        }
    }

    /// Record a change at `now`
    pub fn touch(&mut self, now: Instant) {
        self.last_change = Some(now);
    }

    /// Whether a change is waiting for the quiet period to pass
    pub fn has_pending(&self) -> bool {
        self.last_change.is_some()
    }

    /// Take the pending change if it has settled
    pub fn take_ready(&mut self, now: Instant) -> bool {
        match self.last_change {
            Some(at) if now.duration_since(at) >= self.quiet => {
                self.last_change = None;
                true
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debouncer_waits_for_quiet_period() {
        let mut debouncer = ChangeDebouncer::new(100);
        let start = Instant::now();
        assert!(!debouncer.take_ready(start));

        debouncer.touch(start);
        assert!(debouncer.has_pending());
        assert!(!debouncer.take_ready(start + Duration::from_millis(50)));

        // a second change restarts the quiet period
        debouncer.touch(start + Duration::from_millis(60));
        assert!(!debouncer.take_ready(start + Duration::from_millis(120)));
        assert!(debouncer.take_ready(start + Duration::from_millis(170)));
        assert!(!debouncer.has_pending());
    }

    #[test]
    fn test_watcher_reports_source_changes_only() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("doc.md");
        std::fs::write(&source, "# One").unwrap();
        let watcher = SourceWatcher::new(&source).unwrap();

        std::fs::write(dir.path().join("other.md"), "ignored").unwrap();
        std::fs::write(&source, "# Two").unwrap();

        let deadline = Instant::now() + Duration::from_secs(5);
        let mut events = Vec::new();
        while Instant::now() < deadline && events.is_empty() {
            std::thread::sleep(Duration::from_millis(50));
            events = watcher.poll();
        }

        assert!(!events.is_empty());
        assert!(events
            .iter()
            .all(|e| matches!(e, WatchEvent::Modified(p) if p == watcher.source())));
    }
}
