//! Periodic status sweep.
//!
//! Promotes PENDING records whose scheduled instant has passed to
//! IN_PROGRESS: events by `pending_until`, brew events by `start_time`.
//! A failure on one record is logged and counted, never fatal for the
//! rest of the batch.

use chrono::{DateTime, Utc};
use doc_store::{DocumentStore, DocumentStoreExt, Filter};
use serde_json::json;

use crate::models::{BrewEvent, Event, EventStatus};
use crate::DomainError;

/// Outcome of one sweep pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize)]
pub struct SweepReport {
    /// Records moved from PENDING to IN_PROGRESS.
    pub promoted: usize,
    /// Records that failed to save and were left as-is.
    pub failed: usize,
}

/// Runs one sweep pass against `now`.
#[tracing::instrument(skip(store))]
pub async fn sweep_due<S: DocumentStore>(
    store: &S,
    now: DateTime<Utc>,
) -> Result<SweepReport, DomainError> {
    let mut report = SweepReport::default();

    let due_filter = |field: &str| {
        Filter::And(vec![
            Filter::eq("status", EventStatus::Pending.as_str()),
            Filter::Lte(field.to_string(), json!(now.to_rfc3339())),
        ])
    };

    let events: Vec<Event> = store.find_records(due_filter("pending_until")).await?;
    for mut event in events {
        event.status = EventStatus::InProgress;
        match store.save_record(&event).await {
            Ok(()) => report.promoted += 1,
            Err(err) => {
                report.failed += 1;
                tracing::warn!(event_id = %event.id, %err, "sweep failed to promote event");
            }
        }
    }

    let brews: Vec<BrewEvent> = store.find_records(due_filter("start_time")).await?;
    for mut brew in brews {
        brew.status = EventStatus::InProgress;
        match store.save_record(&brew).await {
            Ok(()) => report.promoted += 1,
            Err(err) => {
                report.failed += 1;
                tracing::warn!(brew_event_id = %brew.id, %err, "sweep failed to promote brew event");
            }
        }
    }

    metrics::counter!("sweep_promoted").increment(report.promoted as u64);
    metrics::counter!("sweep_failed").increment(report.failed as u64);
    if report.promoted > 0 || report.failed > 0 {
        tracing::info!(promoted = report.promoted, failed = report.failed, "sweep pass done");
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::{Duration, TimeZone};
    use common::{GroupId, ProfileId, UserId};
    use doc_store::{Document, InMemoryDocumentStore, StoreError};
    use uuid::Uuid;

    use crate::models::EventType;

    fn at(hour: u32, minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 8, 29, hour, minute, 0).unwrap()
    }

    async fn seed_event(store: &InMemoryDocumentStore, pending_until: DateTime<Utc>) -> Event {
        let event = Event::new(
            ProfileId::new(),
            GroupId::new(),
            "morning round",
            "",
            EventType::Coffee,
            pending_until,
        );
        store.insert_record(&event).await.unwrap();
        event
    }

    #[tokio::test]
    async fn promotes_events_at_or_past_their_due_time() {
        let store = InMemoryDocumentStore::new();
        let exactly_due = seed_event(&store, at(10, 0)).await;
        let overdue = seed_event(&store, at(9, 30)).await;
        let future = seed_event(&store, at(10, 30)).await;

        let report = sweep_due(&store, at(10, 1)).await.unwrap();
        assert_eq!(report, SweepReport { promoted: 2, failed: 0 });

        // The promoted records are no longer due; a second run is a no-op.
        let report = sweep_due(&store, at(10, 2)).await.unwrap();
        assert_eq!(report, SweepReport::default());

        let get = |id: Uuid| {
            let store = store.clone();
            async move { store.get::<Event>(id).await.unwrap().unwrap() }
        };
        assert_eq!(get(exactly_due.id.as_uuid()).await.status, EventStatus::InProgress);
        assert_eq!(get(overdue.id.as_uuid()).await.status, EventStatus::InProgress);
        assert_eq!(get(future.id.as_uuid()).await.status, EventStatus::Pending);
    }

    #[tokio::test]
    async fn never_touches_terminal_or_running_records() {
        let store = InMemoryDocumentStore::new();
        let mut running = seed_event(&store, at(9, 0)).await;
        running.status = EventStatus::InProgress;
        store.save_record(&running).await.unwrap();
        let mut done = seed_event(&store, at(9, 0)).await;
        done.status = EventStatus::Completed;
        done.completed_at = Some(at(9, 30));
        store.save_record(&done).await.unwrap();

        let report = sweep_due(&store, at(10, 0)).await.unwrap();
        assert_eq!(report, SweepReport::default());

        let done = store.get::<Event>(done.id.as_uuid()).await.unwrap().unwrap();
        assert_eq!(done.status, EventStatus::Completed);
    }

    #[tokio::test]
    async fn promotes_brew_events_by_start_time() {
        let store = InMemoryDocumentStore::new();
        let due = BrewEvent::new(UserId::new(), at(10, 0));
        let future = BrewEvent::new(UserId::new(), at(11, 0));
        store.insert_record(&due).await.unwrap();
        store.insert_record(&future).await.unwrap();

        let report = sweep_due(&store, at(10, 0)).await.unwrap();
        assert_eq!(report.promoted, 1);

        let due = store
            .get::<BrewEvent>(due.id.as_uuid())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(due.status, EventStatus::InProgress);
    }

    /// Store wrapper that fails every `replace` for one record id.
    #[derive(Clone)]
    struct FailingStore {
        inner: InMemoryDocumentStore,
        poisoned: Uuid,
    }

    #[async_trait]
    impl DocumentStore for FailingStore {
        async fn insert(
            &self,
            collection: &'static str,
            document: Document,
        ) -> Result<(), StoreError> {
            self.inner.insert(collection, document).await
        }

        async fn replace(
            &self,
            collection: &'static str,
            document: Document,
        ) -> Result<(), StoreError> {
            if doc_store::doc_id(collection, &document)? == self.poisoned {
                return Err(StoreError::MalformedId {
                    collection: collection.to_string(),
                });
            }
            self.inner.replace(collection, document).await
        }

        async fn find_by_id(
            &self,
            collection: &'static str,
            id: Uuid,
        ) -> Result<Option<Document>, StoreError> {
            self.inner.find_by_id(collection, id).await
        }

        async fn find(
            &self,
            collection: &'static str,
            filter: Filter,
        ) -> Result<Vec<Document>, StoreError> {
            self.inner.find(collection, filter).await
        }
    }

    #[tokio::test]
    async fn one_bad_record_does_not_stop_the_pass() {
        let inner = InMemoryDocumentStore::new();
        let poisoned = seed_event(&inner, at(9, 0)).await;
        let healthy = seed_event(&inner, at(9, 0)).await;
        let store = FailingStore {
            inner: inner.clone(),
            poisoned: poisoned.id.as_uuid(),
        };

        let report = sweep_due(&store, at(10, 0)).await.unwrap();
        assert_eq!(report, SweepReport { promoted: 1, failed: 1 });

        let healthy = inner
            .get::<Event>(healthy.id.as_uuid())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(healthy.status, EventStatus::InProgress);
        let poisoned = inner
            .get::<Event>(poisoned.id.as_uuid())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(poisoned.status, EventStatus::Pending);
    }
}
