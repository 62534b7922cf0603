//! Watch bridge: initial load of every fact file, then live reloads.
//!
//! A `notify` watcher is subscribed (non-recursively) to each distinct parent
//! directory of the configured files. Its raw events are forwarded over a
//! channel to a blocking worker, which filters them on exact target membership,
//! lets them settle, and re-runs the loader for created or modified targets.
//! Deletions and renames are deliberately ignored.

mod core;
mod events;
mod session;
mod targets;


pub use self::core::{FactWatcher, StopHandle, WatchSummary};
pub use self::events::FsEventKind;
pub use self::targets::WatchTargets;
