//! Snapshot publication.
//!
//! Mutations call [`SnapshotPublisher::refresh`], which only queues a signal
//! and returns. A single background task drains the signals in order, reads
//! the registry, and replaces the value in a `watch` channel. One task doing
//! every read means a published snapshot is never older than the one before
//! it. Signals that pile up while the task is busy collapse into one read,
//! and a read that finds nothing new publishes nothing.
//!
//! The channel holds `None` until the first read completes, so a subscriber
//! never mistakes the not-yet-read registry for an empty one.

use std::sync::Arc;

use tokio::sync::{mpsc, watch};
use tokio_stream::wrappers::WatchStream;
use tokio_stream::StreamExt;
use tracing::{debug, trace};

use crate::api::SnapshotStream;
use crate::note::{sort_newest_first, Note};
use crate::registry::NoteRepository;

/// Keeps subscribers supplied with the latest sorted snapshot.
#[derive(Debug)]
pub(crate) struct SnapshotPublisher {
    refresh: mpsc::UnboundedSender<()>,
    snapshots: watch::Receiver<Option<Vec<Note>>>,
}

impl SnapshotPublisher {
    /// Start the publisher task and queue the initial snapshot.
    ///
    /// Must be called inside a Tokio runtime. The task exits once the
    /// publisher is dropped.
    pub(crate) fn spawn(repository: Arc<dyn NoteRepository>) -> Self {
        let (refresh_tx, mut refresh_rx) = mpsc::unbounded_channel::<()>();
        let (snapshot_tx, snapshot_rx) = watch::channel(None);

        tokio::spawn(async move {
            while refresh_rx.recv().await.is_some() {
                while refresh_rx.try_recv().is_ok() {}

                let mut notes = repository.find_all().await;
                sort_newest_first(&mut notes);
                snapshot_tx.send_if_modified(|current| {
                    if current.as_ref() == Some(&notes) {
                        return false;
                    }
                    debug!("Publishing snapshot of {} notes", notes.len());
                    *current = Some(notes);
                    true
                });
            }
            trace!("Snapshot publisher stopped");
        });

        let publisher = Self {
            refresh: refresh_tx,
            snapshots: snapshot_rx,
        };
        publisher.refresh();
        publisher
    }

    /// Queue a republish without waiting for it.
    pub(crate) fn refresh(&self) {
        if self.refresh.send(()).is_err() {
            debug!("Snapshot publisher is gone; dropping refresh");
        }
    }

    /// A receiver positioned at the latest snapshot, `None` before the first.
    pub(crate) fn receiver(&self) -> watch::Receiver<Option<Vec<Note>>> {
        self.snapshots.clone()
    }

    /// A stream that yields the latest snapshot first, then every change.
    ///
    /// Before the first read the stream waits rather than yielding.
    pub(crate) fn stream(&self) -> SnapshotStream {
        Box::pin(WatchStream::new(self.receiver()).filter_map(|snapshot| snapshot))
    }
}
