//! # Realtime Order & Reservation Lists
//!
//! Keeps in-memory lists of orders and reservations in step with the hosted
//! database's change notifications.
//!
//! ## Event Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Realtime Sync                                     │
//! │                                                                         │
//! │  Hosted DB                                                              │
//! │  postgres_changes ──► JSON payload                                      │
//! │                        { "eventType": "UPDATE", "new": {...} }          │
//! │                              │                                          │
//! │                              ▼                                          │
//! │                  ┌───────────────────────┐                              │
//! │                  │  ChangeFeed<T>        │  broadcast::Sender           │
//! │                  │  publish_json()       │                              │
//! │                  └───────────┬───────────┘                              │
//! │              ┌───────────────┼───────────────┐                          │
//! │              ▼               ▼               ▼                          │
//! │        ┌──────────┐    ┌──────────┐    ┌──────────┐                     │
//! │        │ LiveSync │    │ LiveSync │    │ LiveSync │   one per view      │
//! │        │ (admin)  │    │ (user A) │    │ (user B) │                     │
//! │        └────┬─────┘    └────┬─────┘    └────┬─────┘                     │
//! │             ▼               ▼               ▼                           │
//! │      Arc<RwLock<LiveList<T>>>  newest first, filtered per owner         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Apply Rules
//! ```text
//! ┌─────────────┬──────────────────────────┬───────────────────────────────┐
//! │ Event       │ id already in list       │ id not in list                │
//! ├─────────────┼──────────────────────────┼───────────────────────────────┤
//! │ INSERT      │ replace in place         │ insert, newest first          │
//! │ UPDATE      │ replace in place         │ insert, newest first          │
//! │ DELETE      │ remove                   │ nothing                       │
//! └─────────────┴──────────────────────────┴───────────────────────────────┘
//! ```
//! A record that fails the list's filter is never inserted. An update that
//! makes a listed record fail the filter removes it.

use std::fmt;
use std::sync::Arc;

use bistro_core::{Order, Reservation};
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast::{self, error::RecvError};
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::error::{LiveError, LiveResult};

// =============================================================================
// Live Records
// =============================================================================

/// A row that can be kept in a [`LiveList`].
pub trait LiveRecord: Clone + Send + Sync + 'static {
    fn record_id(&self) -> &str;

    /// Sort key; lists are kept newest first.
    fn created_at(&self) -> DateTime<Utc>;

    /// The customer who owns the row, if any.
    fn owner_id(&self) -> Option<&str>;
}

impl LiveRecord for Order {
    fn record_id(&self) -> &str {
        &self.id
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn owner_id(&self) -> Option<&str> {
        self.user_id.as_deref()
    }
}

impl LiveRecord for Reservation {
    fn record_id(&self) -> &str {
        &self.id
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn owner_id(&self) -> Option<&str> {
        self.user_id.as_deref()
    }
}

// =============================================================================
// Change Events
// =============================================================================

/// Primary key carried by a delete notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordKey {
    pub id: String,
}

/// One change notification from the database.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "eventType", rename_all = "UPPERCASE")]
pub enum ChangeEvent<T> {
    Insert { new: T },
    Update { new: T },
    Delete { old: RecordKey },
}

impl<T: LiveRecord> ChangeEvent<T> {
    /// Id of the affected row.
    pub fn record_id(&self) -> &str {
        match self {
            ChangeEvent::Insert { new } | ChangeEvent::Update { new } => new.record_id(),
            ChangeEvent::Delete { old } => &old.id,
        }
    }

    pub fn delete(id: impl Into<String>) -> Self {
        ChangeEvent::Delete {
            old: RecordKey { id: id.into() },
        }
    }
}

/// What applying an event did to a list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyOutcome {
    Inserted,
    Replaced,
    Removed,
    Ignored,
}

// =============================================================================
// Live List
// =============================================================================

type RecordFilter<T> = Arc<dyn Fn(&T) -> bool + Send + Sync>;

/// An ordered, filtered view of a table.
#[derive(Clone)]
pub struct LiveList<T: LiveRecord> {
    records: Vec<T>,
    filter: Option<RecordFilter<T>>,
    /// Set when events were dropped; cleared by `reset`.
    stale: bool,
}

impl<T: LiveRecord> Default for LiveList<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: LiveRecord> fmt::Debug for LiveList<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LiveList")
            .field("len", &self.records.len())
            .field("filtered", &self.filter.is_some())
            .field("stale", &self.stale)
            .finish()
    }
}

impl<T: LiveRecord> LiveList<T> {
    /// An unfiltered list, as the admin dashboard uses.
    pub fn new() -> Self {
        LiveList {
            records: Vec::new(),
            filter: None,
            stale: false,
        }
    }

    /// A list that only keeps records matching `filter`.
    pub fn with_filter<F>(filter: F) -> Self
    where
        F: Fn(&T) -> bool + Send + Sync + 'static,
    {
        LiveList {
            records: Vec::new(),
            filter: Some(Arc::new(filter)),
            stale: false,
        }
    }

    /// A list of one customer's rows.
    pub fn owned_by(user_id: impl Into<String>) -> Self {
        let user_id = user_id.into();
        Self::with_filter(move |record: &T| record.owner_id() == Some(user_id.as_str()))
    }

    fn accepts(&self, record: &T) -> bool {
        self.filter.as_ref().map_or(true, |f| f(record))
    }

    fn position(&self, id: &str) -> Option<usize> {
        self.records.iter().position(|r| r.record_id() == id)
    }

    fn insert_sorted(&mut self, record: T) {
        let created_at = record.created_at();
        let index = self
            .records
            .partition_point(|r| r.created_at() >= created_at);
        self.records.insert(index, record);
    }

    /// Applies one change event.
    pub fn apply(&mut self, event: ChangeEvent<T>) -> ApplyOutcome {
        match event {
            ChangeEvent::Insert { new } | ChangeEvent::Update { new } => {
                let existing = self.position(new.record_id());
                match (existing, self.accepts(&new)) {
                    (Some(index), true) => {
                        self.records[index] = new;
                        ApplyOutcome::Replaced
                    }
                    (Some(index), false) => {
                        self.records.remove(index);
                        ApplyOutcome::Removed
                    }
                    (None, true) => {
                        self.insert_sorted(new);
                        ApplyOutcome::Inserted
                    }
                    (None, false) => ApplyOutcome::Ignored,
                }
            }
            ChangeEvent::Delete { old } => match self.position(&old.id) {
                Some(index) => {
                    self.records.remove(index);
                    ApplyOutcome::Removed
                }
                None => ApplyOutcome::Ignored,
            },
        }
    }

    /// Replaces the contents with a fresh fetch.
    pub fn reset(&mut self, snapshot: Vec<T>) {
        self.records.clear();
        for record in snapshot {
            if !self.accepts(&record) {
                continue;
            }
            match self.position(record.record_id()) {
                Some(index) => self.records[index] = record,
                None => self.insert_sorted(record),
            }
        }
        self.stale = false;
    }

    pub fn records(&self) -> &[T] {
        &self.records
    }

    pub fn get(&self, id: &str) -> Option<&T> {
        self.records.iter().find(|r| r.record_id() == id)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// True if change events were lost since the last reset.
    pub fn is_stale(&self) -> bool {
        self.stale
    }

    fn mark_stale(&mut self) {
        self.stale = true;
    }
}

// =============================================================================
// Change Feed
// =============================================================================

/// Fan-out of change events for one table.
#[derive(Debug, Clone)]
pub struct ChangeFeed<T> {
    sender: broadcast::Sender<ChangeEvent<T>>,
}

impl<T: LiveRecord + DeserializeOwned> ChangeFeed<T> {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        ChangeFeed { sender }
    }

    /// Sends an event to every subscriber. Returns the subscriber count.
    pub fn publish(&self, event: ChangeEvent<T>) -> LiveResult<usize> {
        self.sender
            .send(event)
            .map_err(|_| LiveError::ChannelClosed)
    }

    /// Decodes a raw notification payload and publishes it.
    pub fn publish_json(&self, payload: &str) -> LiveResult<usize> {
        let event: ChangeEvent<T> = serde_json::from_str(payload)?;
        debug!(id = event.record_id(), "Change notification received");
        self.publish(event)
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ChangeEvent<T>> {
        self.sender.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

// =============================================================================
// Live Sync
// =============================================================================

/// A shared live list fed by a change feed.
#[derive(Debug, Clone)]
pub struct LiveSync<T: LiveRecord> {
    list: Arc<RwLock<LiveList<T>>>,
}

impl<T: LiveRecord> LiveSync<T> {
    pub fn new(list: LiveList<T>) -> Self {
        LiveSync {
            list: Arc::new(RwLock::new(list)),
        }
    }

    /// Replaces the list with an initial fetch.
    pub async fn reset(&self, snapshot: Vec<T>) {
        let mut list = self.list.write().await;
        list.reset(snapshot);
        debug!(len = list.len(), "Live list reset");
    }

    pub async fn apply(&self, event: ChangeEvent<T>) -> ApplyOutcome {
        self.list.write().await.apply(event)
    }

    /// Copy of the current records, newest first.
    pub async fn snapshot(&self) -> Vec<T> {
        self.list.read().await.records().to_vec()
    }

    pub async fn is_stale(&self) -> bool {
        self.list.read().await.is_stale()
    }

    /// Applies events until the feed closes.
    ///
    /// A lagging receiver keeps going; the list is flagged stale so the
    /// caller knows to refetch.
    pub async fn run(self, mut receiver: broadcast::Receiver<ChangeEvent<T>>) {
        info!("Live sync started");

        loop {
            match receiver.recv().await {
                Ok(event) => {
                    let id = event.record_id().to_string();
                    let outcome = self.apply(event).await;
                    debug!(%id, ?outcome, "Change applied");
                }
                Err(RecvError::Lagged(skipped)) => {
                    warn!(skipped, "Live sync lagged behind the change feed");
                    self.list.write().await.mark_stale();
                }
                Err(RecvError::Closed) => break,
            }
        }

        info!("Live sync stopped");
    }

    /// Runs the sync loop on the tokio runtime.
    pub fn spawn(&self, receiver: broadcast::Receiver<ChangeEvent<T>>) -> JoinHandle<()> {
        tokio::spawn(self.clone().run(receiver))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use bistro_core::{OrderStatus, PaymentMethod, ReservationStatus};
    use chrono::TimeZone;

    fn order(id: &str, user: &str, minute: u32) -> Order {
        Order {
            id: id.to_string(),
            user_id: Some(user.to_string()),
            status: OrderStatus::Pending,
            payment_method: PaymentMethod::Delivery,
            subtotal: Some(100.0),
            discount: Some(0.0),
            total: Some(110.0),
            delivery_address: None,
            created_at: Utc.with_ymd_and_hms(2024, 3, 1, 12, minute, 0).unwrap(),
            updated_at: None,
        }
    }

    fn ids(list: &LiveList<Order>) -> Vec<&str> {
        list.records().iter().map(|o| o.id.as_str()).collect()
    }

    #[test]
    fn test_insert_keeps_newest_first() {
        let mut list = LiveList::new();
        list.apply(ChangeEvent::Insert { new: order("a", "u1", 1) });
        list.apply(ChangeEvent::Insert { new: order("c", "u1", 3) });
        list.apply(ChangeEvent::Insert { new: order("b", "u1", 2) });

        assert_eq!(ids(&list), vec!["c", "b", "a"]);
    }

    #[test]
    fn test_duplicate_insert_replaces() {
        let mut list = LiveList::new();
        list.apply(ChangeEvent::Insert { new: order("a", "u1", 1) });

        let mut again = order("a", "u1", 1);
        again.status = OrderStatus::Confirmed;
        assert_eq!(
            list.apply(ChangeEvent::Insert { new: again }),
            ApplyOutcome::Replaced
        );
        assert_eq!(list.len(), 1);
        assert_eq!(list.get("a").unwrap().status, OrderStatus::Confirmed);
    }

    #[test]
    fn test_update_and_delete() {
        let mut list = LiveList::new();
        list.reset(vec![order("a", "u1", 1), order("b", "u1", 2)]);

        let mut ready = order("a", "u1", 1);
        ready.status = OrderStatus::Ready;
        assert_eq!(list.apply(ChangeEvent::Update { new: ready }), ApplyOutcome::Replaced);
        assert_eq!(ids(&list), vec!["b", "a"]);

        assert_eq!(
            list.apply(ChangeEvent::Update { new: order("z", "u1", 9) }),
            ApplyOutcome::Inserted
        );
        assert_eq!(list.apply(ChangeEvent::delete("b")), ApplyOutcome::Removed);
        assert_eq!(list.apply(ChangeEvent::delete("missing")), ApplyOutcome::Ignored);
        assert_eq!(ids(&list), vec!["z", "a"]);
    }

    #[test]
    fn test_owner_filter() {
        let mut list = LiveList::owned_by("u1");
        assert_eq!(
            list.apply(ChangeEvent::Insert { new: order("other", "u2", 1) }),
            ApplyOutcome::Ignored
        );
        list.apply(ChangeEvent::Insert { new: order("mine", "u1", 2) });

        let mut reassigned = order("mine", "u1", 2);
        reassigned.user_id = Some("u2".to_string());
        assert_eq!(
            list.apply(ChangeEvent::Update { new: reassigned }),
            ApplyOutcome::Removed
        );
        assert!(list.is_empty());
    }

    #[test]
    fn test_reset_applies_filter_and_order() {
        let mut list = LiveList::owned_by("u1");
        list.mark_stale();
        list.reset(vec![
            order("a", "u1", 1),
            order("x", "u2", 5),
            order("b", "u1", 4),
            order("a", "u1", 1),
        ]);

        assert_eq!(ids(&list), vec!["b", "a"]);
        assert!(!list.is_stale());
    }

    #[test]
    fn test_event_wire_format() {
        let payload = r#"{
            "eventType": "INSERT",
            "new": {
                "id": "o-1",
                "user_id": "u1",
                "status": "preparing",
                "payment_method": "pickup",
                "subtotal": 200,
                "discount": 30,
                "total_price": 178.5,
                "created_at": "2024-03-01T12:00:00Z"
            }
        }"#;
        let event: ChangeEvent<Order> = serde_json::from_str(payload).unwrap();
        match &event {
            ChangeEvent::Insert { new } => {
                assert_eq!(new.status, OrderStatus::Preparing);
                assert_eq!(new.total, Some(178.5));
            }
            other => panic!("expected insert, got {:?}", other),
        }

        let delete: ChangeEvent<Order> =
            serde_json::from_str(r#"{"eventType":"DELETE","new":{},"old":{"id":"o-1"}}"#).unwrap();
        assert_eq!(delete.record_id(), "o-1");

        let json = serde_json::to_value(ChangeEvent::<Order>::delete("o-2")).unwrap();
        assert_eq!(json["eventType"], "DELETE");
        assert_eq!(json["old"]["id"], "o-2");
    }

    #[test]
    fn test_reservation_is_live_record() {
        let reservation = Reservation {
            id: "r-1".to_string(),
            user_id: None,
            name: "Rahman".to_string(),
            phone: None,
            party_size: 4,
            reserved_for: Utc.with_ymd_and_hms(2024, 3, 2, 19, 0, 0).unwrap(),
            status: ReservationStatus::Confirmed,
            notes: None,
            created_at: Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap(),
        };

        let mut list = LiveList::new();
        list.apply(ChangeEvent::Insert { new: reservation.clone() });
        assert_eq!(list.records(), &[reservation][..]);

        let mine: LiveList<Reservation> = LiveList::owned_by("u1");
        assert!(mine.is_empty());
    }

    #[test]
    fn test_publish_without_subscribers_fails() {
        let feed: ChangeFeed<Order> = ChangeFeed::new(8);
        assert!(matches!(
            feed.publish(ChangeEvent::delete("a")),
            Err(LiveError::ChannelClosed)
        ));
        assert!(matches!(
            feed.publish_json("{\"eventType\":\"TRUNCATE\"}"),
            Err(LiveError::InvalidPayload(_))
        ));
    }

    #[tokio::test]
    async fn test_sync_runs_until_feed_closes() {
        let feed: ChangeFeed<Order> = ChangeFeed::new(16);
        let admin = LiveSync::new(LiveList::new());
        let customer = LiveSync::new(LiveList::owned_by("u1"));
        admin.reset(vec![order("old", "u9", 0)]).await;

        let admin_task = admin.spawn(feed.subscribe());
        let customer_task = customer.spawn(feed.subscribe());
        assert_eq!(feed.subscriber_count(), 2);

        feed.publish(ChangeEvent::Insert { new: order("a", "u1", 1) }).unwrap();
        feed.publish(ChangeEvent::Insert { new: order("b", "u2", 2) }).unwrap();
        feed.publish(ChangeEvent::delete("old")).unwrap();
        drop(feed);

        admin_task.await.unwrap();
        customer_task.await.unwrap();

        let admin_ids: Vec<String> = admin.snapshot().await.into_iter().map(|o| o.id).collect();
        assert_eq!(admin_ids, vec!["b", "a"]);

        let customer_ids: Vec<String> =
            customer.snapshot().await.into_iter().map(|o| o.id).collect();
        assert_eq!(customer_ids, vec!["a"]);
    }

    #[tokio::test]
    async fn test_lagged_sync_marks_stale_and_continues() {
        let feed: ChangeFeed<Order> = ChangeFeed::new(2);
        let sync = LiveSync::new(LiveList::new());
        let receiver = feed.subscribe();

        for minute in 0..5 {
            feed.publish(ChangeEvent::Insert {
                new: order(&format!("o{}", minute), "u1", minute),
            })
            .unwrap();
        }
        drop(feed);

        sync.clone().run(receiver).await;

        assert!(sync.is_stale().await);
        let ids: Vec<String> = sync.snapshot().await.into_iter().map(|o| o.id).collect();
        assert_eq!(ids, vec!["o4", "o3"]);

        sync.reset(Vec::new()).await;
        assert!(!sync.is_stale().await);
    }
}
