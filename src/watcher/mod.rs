//! Live reload of the open document file.
//!
//! Watches the file's parent directory with notify and reports a change once
//! events have settled. Writes made by blockpad itself are announced with
//! [`DocumentWatcher::note_own_write`] so saving does not trigger a reload.
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver};
use std::time::{Duration, Instant};

use notify::{Event, RecommendedWatcher, RecursiveMode, Watcher};
use tracing::{debug, trace, warn};

/// Events seen this soon after an own write are ignored.
const OWN_WRITE_WINDOW: Duration = Duration::from_millis(500);

/// Watches a single document file and emits debounced change notifications.
pub struct DocumentWatcher {
    _watcher: RecommendedWatcher,
    rx: Receiver<notify::Result<Event>>,
    watch_root: PathBuf,
    target_path: PathBuf,
    target_name: Option<OsString>,
    debounce: Duration,
    pending_since: Option<Instant>,
    ignore_until: Option<Instant>,
}

impl DocumentWatcher {
    /// Create a watcher for `path`.
    ///
    /// # Errors
    /// Returns an error if the file watcher cannot be created or the path cannot be watched.
    pub fn new(path: impl AsRef<Path>, debounce: Duration) -> notify::Result<Self> {
        // OS event paths are absolute and canonical.
        let target_path = path
            .as_ref()
            .canonicalize()
            .unwrap_or_else(|_| path.as_ref().to_path_buf());
        let target_name = target_path.file_name().map(std::ffi::OsStr::to_os_string);
        let watch_root = watch_root_for(&target_path);

        let (tx, rx) = mpsc::channel();
        let mut watcher = notify::recommended_watcher(move |res| {
            let _ = tx.send(res);
        })?;
        watcher.watch(&watch_root, RecursiveMode::NonRecursive)?;
        debug!(path = %target_path.display(), "watching document");

        Ok(Self {
            _watcher: watcher,
            rx,
            watch_root,
            target_path,
            target_name,
            debounce,
            pending_since: None,
            ignore_until: None,
        })
    }

    /// The canonical path of the file being watched.
    pub fn target_path(&self) -> &Path {
        &self.target_path
    }

    /// Announce that blockpad is about to write the document itself.
    pub fn note_own_write(&mut self) {
        self.note_own_write_at(Instant::now());
    }

    fn note_own_write_at(&mut self, now: Instant) {
        self.ignore_until = Some(now + OWN_WRITE_WINDOW);
        self.pending_since = None;
    }

    /// Returns true once a debounced external change is ready.
    pub fn take_change_ready(&mut self) -> bool {
        let now = Instant::now();
        let mut relevant = 0u32;
        let mut ignored = 0u32;
        while let Ok(event) = self.rx.try_recv() {
            match event {
                Ok(ev) if self.is_relevant(&ev) => {
                    if self.is_own_write(now) {
                        ignored += 1;
                    } else {
                        relevant += 1;
                    }
                }
                Ok(ev) => trace!(kind = ?ev.kind, paths = ?ev.paths, "irrelevant fs event"),
                Err(err) => warn!(%err, "file watcher error"),
            }
        }
        if relevant > 0 || ignored > 0 {
            debug!(
                relevant,
                ignored,
                target = %self.target_path.display(),
                root = %self.watch_root.display(),
                "document watcher poll"
            );
        }
        if relevant > 0 {
            self.pending_since = Some(now);
        }
        self.settle(now)
    }

    fn is_own_write(&self, now: Instant) -> bool {
        self.ignore_until.is_some_and(|until| now < until)
    }

    fn settle(&mut self, now: Instant) -> bool {
        let Some(pending_since) = self.pending_since else {
            return false;
        };
        if now.duration_since(pending_since) >= self.debounce {
            self.pending_since = None;
            return true;
        }
        false
    }

    fn is_relevant(&self, event: &Event) -> bool {
        event.paths.iter().any(|path| {
            path == &self.watch_root
                || path == &self.target_path
                || self
                    .target_name
                    .as_ref()
                    .is_some_and(|name| path.file_name().is_some_and(|f| f == name))
        })
    }
}

fn watch_root_for(path: &Path) -> PathBuf {
    path.parent()
        .filter(|p| !p.as_os_str().is_empty())
        .map_or_else(|| PathBuf::from("."), Path::to_path_buf)
}
