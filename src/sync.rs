//! Pulls new timeline batches into the item store.
//!
//! A rate-limited fetch never fails the caller. When nothing has been
//! ingested yet the last persisted batch is used instead (once per session);
//! otherwise the fetch yields an empty batch and the next `show` tries again.

use crate::error::{FeedError, Result};
use crate::feeds::snapshot::SnapshotStore;
use crate::feeds::{FeedClient, RawItem};
use crate::store::ItemStore;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchSource {
    Remote,
    /// Rate limited on a cold store; the last persisted batch was used.
    Snapshot,
    /// Rate limited with nothing to fall back on.
    Throttled,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncReport {
    pub source: BatchSource,
    pub fetched: usize,
    pub ingested: usize,
}

pub struct TimelineSync {
    client: Arc<dyn FeedClient>,
    snapshots: Option<Box<dyn SnapshotStore>>,
    cold_start_tried: bool,
}

impl TimelineSync {
    pub fn new(client: Arc<dyn FeedClient>, snapshots: Option<Box<dyn SnapshotStore>>) -> Self {
        Self {
            client,
            snapshots,
            cold_start_tried: false,
        }
    }

    pub async fn fetch(&mut self, store: &mut ItemStore) -> Result<SyncReport> {
        let cursor = store.cursor();
        tracing::debug!(?cursor, "fetching timeline");

        let (source, mut batch) = match self.client.home_timeline(cursor).await {
            Ok(batch) => {
                self.persist(&batch);
                (BatchSource::Remote, batch)
            }
            Err(FeedError::RateLimited) => match self.cold_start(store) {
                Some(batch) => (BatchSource::Snapshot, batch),
                None => {
                    tracing::warn!("timeline fetch rate limited, nothing ingested");
                    (BatchSource::Throttled, Vec::new())
                }
            },
            Err(e) => return Err(e),
        };

        sort_oldest_first(&mut batch);
        let fetched = batch.len();
        let ingested = store.ingest(batch).len();
        tracing::info!(?source, fetched, ingested, cursor = ?store.cursor(), "timeline synced");

        Ok(SyncReport {
            source,
            fetched,
            ingested,
        })
    }

    fn persist(&self, batch: &[RawItem]) {
        // An empty delta would clobber the last useful snapshot.
        if batch.is_empty() {
            return;
        }
        if let Some(snapshots) = &self.snapshots {
            if let Err(e) = snapshots.save(batch) {
                tracing::warn!(error = %e, "failed to persist timeline snapshot");
            }
        }
    }

    fn cold_start(&mut self, store: &ItemStore) -> Option<Vec<RawItem>> {
        if !store.is_empty() || self.cold_start_tried {
            return None;
        }
        self.cold_start_tried = true;

        let snapshots = self.snapshots.as_ref()?;
        match snapshots.load() {
            Ok(Some(batch)) => {
                tracing::warn!(count = batch.len(), "rate limited on cold start, using snapshot");
                Some(batch)
            }
            Ok(None) => None,
            Err(e) => {
                tracing::warn!(error = %e, "failed to load timeline snapshot");
                None
            }
        }
    }
}

/// Stable sort by each record's own creation time. Records without a
/// parseable timestamp keep their relative order ahead of the rest.
fn sort_oldest_first(batch: &mut [RawItem]) {
    batch.sort_by_key(RawItem::created_at);
}
