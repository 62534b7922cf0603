//! Destinations for loaded fact records.
//!
//! The loader never touches the consumer's queue directly. It hands every
//! record to a [`RecordSink`], which must be callable from any thread without
//! blocking. The tokio unbounded sender is the production sink: records cross
//! from the blocking watch worker into the async consumer by message passing.

use std::sync::Mutex;

use tokio::sync::mpsc::UnboundedSender;

use crate::document::Record;
use crate::error::{FactError, Result};

/// Append-only, thread-safe destination for records.
pub trait RecordSink: Send + Sync {
    /// Append one record without blocking.
    fn put(&self, record: Record) -> Result<()>;
}

impl RecordSink for UnboundedSender<Record> {
    fn put(&self, record: Record) -> Result<()> {
        self.send(record).map_err(|_| FactError::QueueClosed)
    }
}

/// In-memory collector, mostly for tests and one-shot loads.
impl RecordSink for Mutex<Vec<Record>> {
    fn put(&self, record: Record) -> Result<()> {
        self.lock()
            .map_err(|_| FactError::Worker("record collector lock poisoned".to_string()))?
            .push(record);
        Ok(())
    }
}

impl<S: RecordSink + ?Sized> RecordSink for std::sync::Arc<S> {
    fn put(&self, record: Record) -> Result<()> {
        (**self).put(record)
    }
}

impl<S: RecordSink + ?Sized> RecordSink for &S {
    fn put(&self, record: Record) -> Result<()> {
        (**self).put(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_yaml::Value;

    fn record(name: &str) -> Record {
        let mut map = Record::new();
        map.insert(Value::from("name"), Value::from(name));
        map
    }

    #[test]
    fn mutex_vec_collects_in_order() {
        let sink = Mutex::new(Vec::<Record>::new());
        sink.put(record("a")).unwrap();
        sink.put(record("b")).unwrap();
        let got = sink.into_inner().unwrap();
        assert_eq!(got, vec![record("a"), record("b")]);
    }

    #[tokio::test]
    async fn unbounded_sender_hands_off_across_threads() {
        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
        std::thread::spawn(move || {
            tx.put(record("from-thread")).unwrap();
        })
        .join()
        .unwrap();
        assert_eq!(rx.recv().await, Some(record("from-thread")));
    }

    #[test]
    fn poisoned_collector_is_not_a_closed_queue() {
        let sink = Mutex::new(Vec::<Record>::new());
        let _ = std::panic::catch_unwind(|| {
            let _guard = sink.lock().unwrap();
            panic!("writer died holding the lock");
        });
        assert!(sink.is_poisoned());

        let err = sink.put(record("after")).unwrap_err();
        assert!(matches!(err, FactError::Worker(ref msg) if msg.contains("poisoned")), "{err}");
    }

    #[test]
    fn closed_queue_is_reported() {
        let (tx, rx) = tokio::sync::mpsc::unbounded_channel::<Record>();
        drop(rx);
        assert!(matches!(tx.put(record("late")), Err(FactError::QueueClosed)));
    }
}
