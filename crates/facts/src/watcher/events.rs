//! Filesystem event classification and per-target dispatch.

use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};

use notify::event::ModifyKind;
use notify::EventKind;
use tracing::{debug, warn};

use super::core::WatchSummary;
use crate::error::{FactError, Result};
use crate::loader::load;
use crate::sink::RecordSink;

/// What happened to a watched path, reduced to the cases the bridge cares about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FsEventKind {
    Created,
    /// Data, metadata or unspecified modification.
    Modified,
    Removed,
    /// Rename in any direction.
    Moved,
    /// Access and unknown events.
    Other,
}

impl From<&EventKind> for FsEventKind {
    fn from(kind: &EventKind) -> Self {
        match kind {
            EventKind::Create(_) => FsEventKind::Created,
            EventKind::Modify(ModifyKind::Name(_)) => FsEventKind::Moved,
            EventKind::Modify(_) => FsEventKind::Modified,
            EventKind::Remove(_) => FsEventKind::Removed,
            EventKind::Access(_) | EventKind::Any | EventKind::Other => FsEventKind::Other,
        }
    }
}

impl fmt::Display for FsEventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FsEventKind::Created => "created",
            FsEventKind::Modified => "modified",
            FsEventKind::Removed => "removed",
            FsEventKind::Moved => "moved",
            FsEventKind::Other => "other",
        };
        f.write_str(name)
    }
}

/// React to one settled event on a watch target.
///
/// Reload failures are logged and counted; the session keeps going. Only a
/// closed queue is returned as an error, since nobody is left to receive.
pub(super) fn handle_change<S: RecordSink + ?Sized>(
    path: &Path,
    kind: FsEventKind,
    sink: &S,
    summary: &mut WatchSummary,
) -> Result<()> {
    match kind {
        FsEventKind::Created | FsEventKind::Modified => match load(path, sink) {
            Ok(records) => {
                summary.reloads += 1;
                summary.records_reloaded += records;
                debug!(path = %path.display(), kind = %kind, records, "reloaded fact file");
            }
            Err(FactError::QueueClosed) => return Err(FactError::QueueClosed),
            Err(e) => {
                summary.reloads_failed += 1;
                warn!(path = %path.display(), kind = %kind, error = %e, "failed to reload fact file");
            }
        },
        // Deletions are never reported downstream.
        FsEventKind::Removed => {}
        // A moved file is not followed under its new name.
        FsEventKind::Moved => {}
        FsEventKind::Other => {}
    }
    Ok(())
}

/// Events waiting for the settle window to pass, one entry per target.
///
/// Each target keeps its first-seen position and the last kind observed.
#[derive(Debug, Default)]
pub(super) struct PendingEvents {
    order: Vec<PathBuf>,
    kinds: HashMap<PathBuf, FsEventKind>,
}

impl PendingEvents {
    pub(super) fn record(&mut self, path: &Path, kind: FsEventKind) {
        if kind == FsEventKind::Other {
            return;
        }
        if self.kinds.insert(path.to_path_buf(), kind).is_none() {
            self.order.push(path.to_path_buf());
        }
    }

    pub(super) fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub(super) fn len(&self) -> usize {
        self.order.len()
    }

    /// Take every pending event in first-seen order.
    pub(super) fn drain(&mut self) -> Vec<(PathBuf, FsEventKind)> {
        let mut kinds = std::mem::take(&mut self.kinds);
        std::mem::take(&mut self.order)
            .into_iter()
            .filter_map(|path| kinds.remove(&path).map(|kind| (path, kind)))
            .collect()
    }
}
