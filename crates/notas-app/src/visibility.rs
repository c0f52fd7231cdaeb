//! The visibility pipeline: search query × live active list → visible list.
//!
//! Two inputs, one output. The query is a watch channel of `String`; the
//! active list is the store's live view. A background task recomputes the
//! output whenever either input changes, so the visible list always equals
//! `filter(latest snapshot, latest query)` — a query update re-filters the
//! latest known snapshot immediately, a store update re-filters against the
//! current query immediately, and no stale combination is observable at
//! rest. Filtering never re-sorts; the store's pinned/recency order is
//! preserved.

use std::sync::Arc;

use tokio::sync::watch;
use tracing::debug;

use notas_core::Note;

/// Filter a snapshot by the current query.
///
/// A blank query passes the snapshot through verbatim; otherwise notes
/// whose title or content contains the query case-insensitively survive,
/// in snapshot order.
fn filter_notes(snapshot: &[Note], query: &str) -> Vec<Note> {
    if query.trim().is_empty() {
        snapshot.to_vec()
    } else {
        snapshot.iter().filter(|n| n.matches(query)).cloned().collect()
    }
}

/// Live "visible notes" derivation.
#[derive(Clone)]
pub struct VisibilityPipeline {
    query_tx: Arc<watch::Sender<String>>,
    query_rx: watch::Receiver<String>,
    visible_rx: watch::Receiver<Vec<Note>>,
}

impl VisibilityPipeline {
    /// Build the pipeline over the store's live active list.
    pub fn new(active: watch::Receiver<Vec<Note>>) -> Self {
        let (query_tx, query_rx) = watch::channel(String::new());
        let initial = filter_notes(&active.borrow(), &query_rx.borrow());
        let (visible_tx, visible_rx) = watch::channel(initial);

        let mut active_task = active;
        let mut query_task = query_rx.clone();
        tokio::spawn(async move {
            loop {
                tokio::select! {
                    changed = active_task.changed() => {
                        if changed.is_err() {
                            break; // store watcher gone
                        }
                    }
                    changed = query_task.changed() => {
                        if changed.is_err() {
                            break; // pipeline handle dropped
                        }
                    }
                }
                let visible = {
                    let snapshot = active_task.borrow_and_update();
                    let query = query_task.borrow_and_update();
                    filter_notes(&snapshot, &query)
                };
                debug!(
                    subsystem = "visibility",
                    op = "refresh",
                    result_count = visible.len(),
                    "Visible list recomputed"
                );
                if visible_tx.send(visible).is_err() {
                    break;
                }
            }
        });

        Self {
            query_tx: Arc::new(query_tx),
            query_rx,
            visible_rx,
        }
    }

    /// Replace the current search query.
    pub fn set_query(&self, query: impl Into<String>) {
        // send_replace works even while no task is listening yet.
        self.query_tx.send_replace(query.into());
    }

    /// The current search query.
    pub fn query(&self) -> String {
        self.query_rx.borrow().clone()
    }

    /// Live view of the search query.
    pub fn watch_query(&self) -> watch::Receiver<String> {
        self.query_rx.clone()
    }

    /// Live view of the visible notes.
    pub fn visible(&self) -> watch::Receiver<Vec<Note>> {
        self.visible_rx.clone()
    }
}
