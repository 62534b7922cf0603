//! [`FactWatcher`]: initial load, then live reloads on a blocking worker.

use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::time::Instant;

use serde::Serialize;
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, info, trace, warn};

use super::events::{handle_change, FsEventKind, PendingEvents};
use super::session::WatchSession;
use super::targets::WatchTargets;
use crate::config::WatchConfig;
use crate::document::Record;
use crate::error::{FactError, Result};
use crate::loader::load;
use crate::sink::RecordSink;

/// Messages consumed by the dispatch loop.
pub(super) enum Control {
    /// Raw event (or engine error) from `notify`.
    Event(std::result::Result<notify::Event, notify::Error>),
    /// Leave the loop.
    Stop,
}

/// Requests the end of a watch session. Cheap to clone, usable from any thread.
///
/// Stopping before the session starts makes it return right after the initial
/// load; stopping after it ended is a no-op.
#[derive(Clone)]
pub struct StopHandle {
    tx: Sender<Control>,
}

impl StopHandle {
    /// Ask the session to stop. Safe to call before, during or after a session.
    pub fn stop(&self) {
        // Err means the session is already gone.
        let _ = self.tx.send(Control::Stop);
    }
}

/// Counters describing a finished session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct WatchSummary {
    /// Configured fact files.
    pub targets: usize,
    /// Directories subscribed for events.
    pub directories: usize,
    /// Records emitted by the initial load pass.
    pub initial_records: usize,
    /// Successful reloads after an event.
    pub reloads: usize,
    /// Records emitted by those reloads.
    pub records_reloaded: usize,
    /// Reloads that failed (I/O, syntax, shape) and were skipped.
    pub reloads_failed: usize,
}

/// Loads a set of YAML fact files and re-emits their records whenever one of
/// them is created or modified on disk.
///
/// ```no_run
/// use stupid_facts::{FactWatcher, WatchConfig};
///
/// # async fn example() -> stupid_facts::Result<()> {
/// let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
/// let watcher = FactWatcher::new(WatchConfig::new(["facts.yml"]));
/// let stop = watcher.stop_handle();
/// let session = tokio::spawn(watcher.run(tx));
///
/// while let Some(record) = rx.recv().await {
///     println!("{record:?}");
/// #   break;
/// }
/// stop.stop();
/// let _summary = session.await.expect("join")?;
/// # Ok(())
/// # }
/// ```
pub struct FactWatcher {
    config: WatchConfig,
    control_tx: Sender<Control>,
    control_rx: Receiver<Control>,
}

impl FactWatcher {
    pub fn new(config: WatchConfig) -> Self {
        let (control_tx, control_rx) = mpsc::channel();
        Self {
            config,
            control_tx,
            control_rx,
        }
    }

    pub fn config(&self) -> &WatchConfig {
        &self.config
    }

    /// Handle that ends the session started by [`run`](Self::run) or
    /// [`run_blocking`](Self::run_blocking).
    pub fn stop_handle(&self) -> StopHandle {
        StopHandle {
            tx: self.control_tx.clone(),
        }
    }

    /// Run the whole session on tokio's blocking pool and wait for it.
    ///
    /// Records are handed to `queue` from the worker thread. Dropping the
    /// returned future does not end the session; use a [`StopHandle`].
    pub async fn run(self, queue: UnboundedSender<Record>) -> Result<WatchSummary> {
        tokio::task::spawn_blocking(move || self.run_blocking(&queue))
            .await
            .map_err(|e| FactError::Worker(e.to_string()))?
    }

    /// Run the session on the current thread, blocking until stopped.
    ///
    /// With no configured file this returns immediately without creating a
    /// watcher. Otherwise every file is loaded once (any error aborts), then
    /// their parent directories are watched until a stop is requested.
    pub fn run_blocking<S: RecordSink + ?Sized>(self, sink: &S) -> Result<WatchSummary> {
        let FactWatcher {
            config,
            control_tx,
            control_rx,
        } = self;

        let mut targets = WatchTargets::from_cwd(&config.files)?;
        if targets.is_empty() {
            debug!("no fact files configured, nothing to watch");
            return Ok(WatchSummary::default());
        }

        let mut summary = WatchSummary {
            targets: targets.len(),
            ..WatchSummary::default()
        };
        for path in targets.paths() {
            let records = load(path, sink)?;
            summary.initial_records += records;
            debug!(path = %path.display(), records, "loaded fact file");
        }
        targets.add_canonical_aliases();

        let session = WatchSession::start(targets.directories(), control_tx)?;
        summary.directories = session.directories().len();
        info!(
            targets = summary.targets,
            directories = summary.directories,
            initial_records = summary.initial_records,
            "fact watcher started"
        );

        dispatch_loop(&control_rx, &targets, &config, sink, &mut summary)?;
        drop(session);

        info!(
            reloads = summary.reloads,
            records_reloaded = summary.records_reloaded,
            reloads_failed = summary.reloads_failed,
            "fact watch session finished"
        );
        Ok(summary)
    }
}

/// Block on the control channel until a stop arrives.
///
/// With a zero settle window every event is handled as it arrives. Otherwise
/// events are coalesced per target and handled one window after the first
/// of them was recorded. Events outside the targets never move that deadline.
pub(super) fn dispatch_loop<S: RecordSink + ?Sized>(
    control: &Receiver<Control>,
    targets: &WatchTargets,
    config: &WatchConfig,
    sink: &S,
    summary: &mut WatchSummary,
) -> Result<()> {
    let settle = config.debounce();
    let mut pending = PendingEvents::default();
    let mut deadline: Option<Instant> = None;

    loop {
        let message = match deadline {
            None => match control.recv() {
                Ok(message) => message,
                Err(_) => return Ok(()),
            },
            Some(at) => {
                let now = Instant::now();
                if now >= at {
                    flush(&mut pending, sink, summary)?;
                    deadline = None;
                    continue;
                }
                match control.recv_timeout(at - now) {
                    Ok(message) => message,
                    Err(RecvTimeoutError::Timeout) => {
                        flush(&mut pending, sink, summary)?;
                        deadline = None;
                        continue;
                    }
                    Err(RecvTimeoutError::Disconnected) => {
                        flush(&mut pending, sink, summary)?;
                        return Ok(());
                    }
                }
            }
        };

        match message {
            Control::Stop => {
                if !pending.is_empty() {
                    debug!(pending = pending.len(), "stop requested, dropping unsettled events");
                }
                return Ok(());
            }
            Control::Event(Ok(event)) => {
                let kind = FsEventKind::from(&event.kind);
                for path in &event.paths {
                    let Some(target) = targets.matching(path) else {
                        trace!(path = %path.display(), kind = %kind, "ignoring event outside watch targets");
                        continue;
                    };
                    if settle.is_zero() {
                        handle_change(target, kind, sink, summary)?;
                    } else {
                        pending.record(target, kind);
                        if deadline.is_none() && !pending.is_empty() {
                            deadline = Some(Instant::now() + settle);
                        }
                    }
                }
            }
            Control::Event(Err(e)) => {
                warn!(error = %e, "filesystem watcher error");
            }
        }
    }
}

fn flush<S: RecordSink + ?Sized>(
    pending: &mut PendingEvents,
    sink: &S,
    summary: &mut WatchSummary,
) -> Result<()> {
    for (path, kind) in pending.drain() {
        handle_change(&path, kind, sink, summary)?;
    }
    Ok(())
}
