//! Live query subscriptions.
//!
//! Each watcher runs its query once for the initial value, then re-runs it
//! whenever the store broadcasts a relevant [`StoreEvent`], publishing
//! through a `tokio::sync::watch` channel. Watch semantics are
//! latest-value: a slow reader can skip intermediate states but always
//! lands on the result of the most recent write.
//!
//! A lagged broadcast receiver is treated as "something changed" and simply
//! re-queries, so bursts of writes cannot leave a subscription stale.

use std::future::Future;

use tokio::sync::broadcast::error::RecvError;
use tokio::sync::watch;
use tracing::warn;

use notas_core::{Note, NoteStore, Result, StoreEvent};

use crate::notes::SqliteNoteStore;

/// Spawn a live query: run once for the initial value, then refresh on
/// every event accepted by `relevant`.
///
/// The background task exits when the store's event bus closes or every
/// receiver of the returned channel is dropped.
async fn live_query<T, Q, Fut, P>(
    store: SqliteNoteStore,
    run: Q,
    relevant: P,
) -> Result<watch::Receiver<T>>
where
    T: Clone + Send + Sync + 'static,
    Q: Fn(SqliteNoteStore) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<T>> + Send + 'static,
    P: Fn(&StoreEvent) -> bool + Send + Sync + 'static,
{
    // Subscribe before the initial query so a write landing in between
    // still triggers a refresh.
    let mut events = store.events().subscribe();
    let initial = run(store.clone()).await?;
    let (tx, rx) = watch::channel(initial);

    tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(event) if !relevant(&event) => continue,
                Ok(_) | Err(RecvError::Lagged(_)) => {}
                Err(RecvError::Closed) => break,
            }
            match run(store.clone()).await {
                Ok(value) => {
                    if tx.send(value).is_err() {
                        // Every receiver is gone; nothing left to refresh for.
                        break;
                    }
                }
                Err(e) => {
                    // Keep the last good value; the next event retries.
                    warn!(
                        subsystem = "db",
                        component = "watch",
                        op = "refresh",
                        error = %e,
                        "Live query refresh failed"
                    );
                }
            }
        }
    });

    Ok(rx)
}

/// Live view of all active notes, pinned first, then most recently modified.
pub async fn watch_active(store: SqliteNoteStore) -> Result<watch::Receiver<Vec<Note>>> {
    live_query(store, |s| async move { s.list_active().await }, |_| true).await
}

/// Live view of all trashed notes, most recently trashed first.
pub async fn watch_trashed(store: SqliteNoteStore) -> Result<watch::Receiver<Vec<Note>>> {
    live_query(store, |s| async move { s.list_trashed().await }, |_| true).await
}

/// Live view of a single note; `None` once it is deleted.
pub async fn watch_note(store: SqliteNoteStore, id: i64) -> Result<watch::Receiver<Option<Note>>> {
    live_query(
        store,
        move |s| async move { s.get_by_id(id).await },
        move |event| event.note_id() == id,
    )
    .await
}
