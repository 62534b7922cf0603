//! Scoped ownership of the running `notify` watcher.

use std::path::PathBuf;
use std::sync::mpsc::Sender;

use notify::{RecommendedWatcher, RecursiveMode, Watcher};
use tracing::{debug, info};

use super::core::Control;
use crate::error::Result;

/// A running watcher subscribed to a set of directories.
///
/// Dropping the session unsubscribes every directory and shuts the engine
/// down, whichever way the dispatch loop was left.
pub(super) struct WatchSession {
    watcher: RecommendedWatcher,
    directories: Vec<PathBuf>,
}

impl WatchSession {
    /// Create the engine and subscribe it, non-recursively, to each directory.
    ///
    /// Raw events are forwarded untouched to `control`; filtering happens on
    /// the worker that owns the receiving end.
    pub(super) fn start(directories: Vec<PathBuf>, control: Sender<Control>) -> Result<Self> {
        let watcher = notify::recommended_watcher(
            move |res: std::result::Result<notify::Event, notify::Error>| {
                // The receiver only goes away once the session is over.
                let _ = control.send(Control::Event(res));
            },
        )?;

        let mut session = Self {
            watcher,
            directories: Vec::with_capacity(directories.len()),
        };
        for dir in directories {
            session.watcher.watch(&dir, RecursiveMode::NonRecursive)?;
            info!(path = %dir.display(), "watching fact directory (non-recursive)");
            session.directories.push(dir);
        }
        Ok(session)
    }

    pub(super) fn directories(&self) -> &[PathBuf] {
        &self.directories
    }
}

impl Drop for WatchSession {
    fn drop(&mut self) {
        for dir in &self.directories {
            if let Err(e) = self.watcher.unwatch(dir) {
                debug!(path = %dir.display(), error = %e, "failed to unwatch fact directory");
            }
        }
        info!(directories = self.directories.len(), "fact watcher stopped");
    }
}
