//! One cache section: keyed snapshots of a single resource shape.
//!
//! Every entry carries a watch channel so callers can either await a
//! settled result or subscribe to live updates. Requests for the same
//! key are coalesced onto the in-flight one, and each issue gets a
//! per-key sequence number so a completion that raced with a newer
//! request is discarded instead of clobbering fresher data.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::future::Future;
use std::hash::Hash;
use std::pin::Pin;
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::watch;

use crate::api::{ApiError, Tag};

/// Future produced by a [`Fetcher`].
pub type FetchFuture<V> = Pin<Box<dyn Future<Output = Result<V, ApiError>> + Send>>;

/// Reusable request factory stored per entry so invalidation can issue
/// a refetch without the original caller around.
pub type Fetcher<V> = Arc<dyn Fn() -> FetchFuture<V> + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryStatus {
    Idle,
    Loading,
    Success,
    Error,
}

/// Point-in-time view of one entry. `value` is the last successfully
/// fetched value and survives later failures; `error` is the failure of
/// the most recent attempt, if that attempt failed.
#[derive(Debug)]
pub struct QuerySnapshot<V> {
    pub status: QueryStatus,
    pub value: Option<Arc<V>>,
    pub error: Option<ApiError>,
    pub stale: bool,
}

impl<V> QuerySnapshot<V> {
    pub fn idle() -> Self {
        Self {
            status: QueryStatus::Idle,
            value: None,
            error: None,
            stale: false,
        }
    }

    /// Collapses the snapshot for callers that just want data: any
    /// cached value wins, even a stale one, otherwise the last error.
    pub fn into_result(self) -> Result<Arc<V>, ApiError> {
        if let Some(value) = self.value {
            return Ok(value);
        }
        if let Some(error) = self.error {
            return Err(error);
        }
        Err(ApiError::Network("no request has completed yet".to_string()))
    }
}

impl<V> Clone for QuerySnapshot<V> {
    fn clone(&self) -> Self {
        Self {
            status: self.status,
            value: self.value.clone(),
            error: self.error.clone(),
            stale: self.stale,
        }
    }
}

/// Counters for one section, mostly for `status`-style introspection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SectionStats {
    pub entries: usize,
    pub hits: u64,
    pub misses: u64,
    pub discarded: u64,
}

struct Entry<V> {
    snapshot: QuerySnapshot<V>,
    /// Sequence number of the most recently issued request for this key.
    issued: u64,
    /// Highest sequence number that has come back, applied or not.
    completed: u64,
    tx: watch::Sender<QuerySnapshot<V>>,
    refetch: Option<Fetcher<V>>,
}

impl<V> Entry<V> {
    fn idle() -> Self {
        let snapshot = QuerySnapshot::idle();
        let (tx, _rx) = watch::channel(snapshot.clone());
        Self {
            snapshot,
            issued: 0,
            completed: 0,
            tx,
            refetch: None,
        }
    }

    fn watched(&self) -> bool {
        self.tx.receiver_count() > 0
    }
}

struct Inner<K, V> {
    entries: HashMap<K, Entry<V>>,
    by_tag: HashMap<Tag, HashSet<K>>,
    hits: u64,
    misses: u64,
    discarded: u64,
}

/// Cache for one resource shape, keyed by `K`. Clones share state.
pub struct ResourceCache<K, V> {
    label: &'static str,
    inner: Arc<Mutex<Inner<K, V>>>,
}

impl<K, V> Clone for ResourceCache<K, V> {
    fn clone(&self) -> Self {
        Self {
            label: self.label,
            inner: Arc::clone(&self.inner),
        }
    }
}

enum FetchPlan<V> {
    Ready(QuerySnapshot<V>),
    Wait {
        target: u64,
        rx: watch::Receiver<QuerySnapshot<V>>,
    },
    Issue {
        seq: u64,
        rx: watch::Receiver<QuerySnapshot<V>>,
    },
}

impl<K, V> ResourceCache<K, V>
where
    K: Clone + Eq + Hash + fmt::Debug + Send + Sync + 'static,
    V: Send + Sync + 'static,
{
    pub fn new(label: &'static str) -> Self {
        Self {
            label,
            inner: Arc::new(Mutex::new(Inner {
                entries: HashMap::new(),
                by_tag: HashMap::new(),
                hits: 0,
                misses: 0,
                discarded: 0,
            })),
        }
    }

    /// Returns a settled snapshot for `key`, issuing a request through
    /// `fetcher` unless a fresh value is already cached. Concurrent
    /// calls for the same key join the request already in flight.
    ///
    /// `tags` index the entry for invalidation and are recorded when
    /// the request is issued, so an invalidation arriving while the
    /// request is still in flight is not lost.
    pub async fn fetch(
        &self,
        key: K,
        tags: Vec<Tag>,
        fetcher: Fetcher<V>,
        force: bool,
    ) -> QuerySnapshot<V> {
        let plan = {
            let mut guard = self.inner.lock();
            let inner = &mut *guard;
            let entry = inner.entries.entry(key.clone()).or_insert_with(Entry::idle);
            match entry.snapshot.status {
                QueryStatus::Loading => {
                    inner.hits += 1;
                    tracing::debug!(section = self.label, key = ?key, "joining request in flight");
                    FetchPlan::Wait {
                        target: entry.issued,
                        rx: entry.tx.subscribe(),
                    }
                }
                QueryStatus::Success if !force && !entry.snapshot.stale => {
                    inner.hits += 1;
                    FetchPlan::Ready(entry.snapshot.clone())
                }
                _ => {
                    inner.misses += 1;
                    entry.issued += 1;
                    let seq = entry.issued;
                    entry.snapshot.status = QueryStatus::Loading;
                    entry.refetch = Some(fetcher.clone());
                    entry.tx.send_replace(entry.snapshot.clone());
                    let rx = entry.tx.subscribe();
                    for tag in tags {
                        inner.by_tag.entry(tag).or_default().insert(key.clone());
                    }
                    tracing::debug!(section = self.label, key = ?key, seq, "issuing request");
                    FetchPlan::Issue { seq, rx }
                }
            }
        };
        match plan {
            FetchPlan::Ready(snapshot) => snapshot,
            FetchPlan::Wait { target, rx } => self.settled(&key, target, rx).await,
            FetchPlan::Issue { seq, rx } => {
                self.spawn_fetch(key.clone(), seq, fetcher);
                self.settled(&key, seq, rx).await
            }
        }
    }

    /// Current snapshot without issuing anything.
    pub fn peek(&self, key: &K) -> Option<QuerySnapshot<V>> {
        self.inner.lock().entries.get(key).map(|entry| entry.snapshot.clone())
    }

    /// Live feed of snapshot updates for `key`. While at least one
    /// receiver is alive the entry is considered watched and
    /// invalidation refetches instead of dropping it.
    pub fn subscribe(&self, key: &K) -> Option<watch::Receiver<QuerySnapshot<V>>> {
        self.inner.lock().entries.get(key).map(|entry| entry.tx.subscribe())
    }

    /// Marks every entry indexed under `tag`. Watched entries turn
    /// stale and refetch in the background; unobserved ones are simply
    /// dropped and will be fetched again on next use.
    pub fn invalidate(&self, tag: &Tag) {
        let mut spawns: Vec<(K, u64, Fetcher<V>)> = Vec::new();
        {
            let mut guard = self.inner.lock();
            let inner = &mut *guard;
            let keys: Vec<K> = match inner.by_tag.get(tag) {
                Some(keys) => keys.iter().cloned().collect(),
                None => return,
            };
            for key in keys {
                let watched = inner.entries.get(&key).map(Entry::watched).unwrap_or(false);
                if !watched {
                    inner.entries.remove(&key);
                    for indexed in inner.by_tag.values_mut() {
                        indexed.remove(&key);
                    }
                    tracing::debug!(section = self.label, key = ?key, %tag, "dropping unobserved entry");
                    continue;
                }
                let Some(entry) = inner.entries.get_mut(&key) else {
                    continue;
                };
                entry.snapshot.stale = true;
                match entry.refetch.clone() {
                    Some(fetcher) => {
                        entry.issued += 1;
                        entry.snapshot.status = QueryStatus::Loading;
                        entry.tx.send_replace(entry.snapshot.clone());
                        tracing::debug!(
                            section = self.label,
                            key = ?key,
                            %tag,
                            seq = entry.issued,
                            "refetching watched entry"
                        );
                        spawns.push((key.clone(), entry.issued, fetcher));
                    }
                    None => {
                        entry.tx.send_replace(entry.snapshot.clone());
                    }
                }
            }
        }
        for (key, seq, fetcher) in spawns {
            self.spawn_fetch(key, seq, fetcher);
        }
    }

    pub fn stats(&self) -> SectionStats {
        let guard = self.inner.lock();
        SectionStats {
            entries: guard.entries.len(),
            hits: guard.hits,
            misses: guard.misses,
            discarded: guard.discarded,
        }
    }

    fn spawn_fetch(&self, key: K, seq: u64, fetcher: Fetcher<V>) {
        let cache = self.clone();
        tokio::spawn(async move {
            let outcome = (*fetcher)().await;
            cache.apply(&key, seq, outcome);
        });
    }

    /// Lands a completed request. A completion whose sequence number no
    /// longer matches the latest issue for its key lost the race to a
    /// newer request and is thrown away.
    fn apply(&self, key: &K, seq: u64, outcome: Result<V, ApiError>) {
        let mut guard = self.inner.lock();
        let inner = &mut *guard;
        let Some(entry) = inner.entries.get_mut(key) else {
            return;
        };
        if seq != entry.issued {
            entry.completed = entry.completed.max(seq);
            inner.discarded += 1;
            tracing::debug!(
                section = self.label,
                key = ?key,
                seq,
                latest = entry.issued,
                "discarding out of date completion"
            );
            return;
        }
        entry.completed = seq;
        match outcome {
            Ok(value) => {
                entry.snapshot.status = QueryStatus::Success;
                entry.snapshot.value = Some(Arc::new(value));
                entry.snapshot.error = None;
                entry.snapshot.stale = false;
                entry.tx.send_replace(entry.snapshot.clone());
                tracing::debug!(section = self.label, key = ?key, seq, "applied");
            }
            Err(err) => {
                entry.snapshot.status = QueryStatus::Error;
                entry.snapshot.error = Some(err);
                entry.tx.send_replace(entry.snapshot.clone());
                tracing::debug!(section = self.label, key = ?key, seq, "request failed");
            }
        }
    }

    /// Waits until the request with sequence number `target` (or a
    /// newer one) has settled, then returns the resulting snapshot.
    async fn settled(
        &self,
        key: &K,
        target: u64,
        mut rx: watch::Receiver<QuerySnapshot<V>>,
    ) -> QuerySnapshot<V> {
        loop {
            {
                let guard = self.inner.lock();
                match guard.entries.get(key) {
                    Some(entry) => {
                        if entry.completed >= target && entry.snapshot.status != QueryStatus::Loading {
                            return entry.snapshot.clone();
                        }
                    }
                    None => return rx.borrow().clone(),
                }
            }
            if rx.changed().await.is_err() {
                return rx.borrow().clone();
            }
        }
    }
}
