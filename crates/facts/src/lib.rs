//! YAML fact files as an event stream.
//!
//! This crate provides:
//! - A loader that parses a fact file and emits each mapping it contains
//! - A watch bridge that loads every configured file once, then reloads a file
//!   whenever it is created or modified on disk (via `notify`)
//! - A thread-safe hand-off of records from the blocking watch worker into a
//!   tokio unbounded channel owned by the consumer
//!
//! A fact file holds nothing, one mapping, or a list of mappings. Anything else
//! is rejected with [`FactError::Shape`].

pub mod config;
pub mod document;
pub mod error;
pub mod loader;
pub mod sink;
pub mod watcher;

pub use config::WatchConfig;
pub use document::{ParsedDocument, Record};
pub use error::{FactError, Result};
pub use loader::{load, load_str};
pub use sink::RecordSink;
pub use watcher::{FactWatcher, FsEventKind, StopHandle, WatchSummary, WatchTargets};
