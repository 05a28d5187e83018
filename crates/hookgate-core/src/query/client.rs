// ── Query client ──
//
// Process-local cache keyed by `QueryKey`. Values are type-erased so one
// store holds every resource. Each key carries a generation counter:
// invalidation bumps it, and a fetch only writes back if the generation it
// started under is still current. Generation numbers come from one
// process-wide epoch, so a key whose counter was pruned resumes at the floor
// and can never match a fetch that was orphaned before the prune.

use std::any::Any;
use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use dashmap::DashMap;
use dashmap::mapref::entry::Entry as MapEntry;
use futures_util::FutureExt;
use futures_util::future::{BoxFuture, Shared};
use hookgate_api::Error;
use tokio::sync::watch;
use tokio::time::Instant;
use tracing::{debug, trace};

use super::key::QueryKey;
use super::retry::{RetryPolicy, retry};

type Erased = Arc<dyn Any + Send + Sync>;
type SharedFetch = Shared<BoxFuture<'static, Result<Erased, Error>>>;

/// Freshness window per resource family.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StaleTimes {
    pub providers: Duration,
    pub webhooks: Duration,
    pub logs: Duration,
    pub health: Duration,
}

impl Default for StaleTimes {
    fn default() -> Self {
        Self {
            providers: Duration::from_secs(5 * 60),
            webhooks: Duration::from_secs(2 * 60),
            logs: Duration::from_secs(60),
            health: Duration::from_secs(30),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct QueryConfig {
    pub read_retry: RetryPolicy,
    pub mutation_retry: RetryPolicy,
    /// Entries untouched for longer than this are dropped by
    /// [`QueryClient::collect_garbage`]. `Dashboard` runs it on this period;
    /// zero disables the periodic sweep.
    pub gc_time: Duration,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            read_retry: RetryPolicy::reads(),
            mutation_retry: RetryPolicy::mutations(),
            gc_time: Duration::from_secs(10 * 60),
        }
    }
}

struct Entry {
    value: Option<Erased>,
    error: Option<Error>,
    updated_at: Option<Instant>,
    last_access: Instant,
    invalidated: bool,
}

impl Entry {
    fn empty(now: Instant) -> Self {
        Self {
            value: None,
            error: None,
            updated_at: None,
            last_access: now,
            invalidated: false,
        }
    }
}

struct InFlight {
    generation: u64,
    fut: SharedFetch,
}

struct Inner {
    config: QueryConfig,
    entries: DashMap<QueryKey, Entry>,
    in_flight: DashMap<QueryKey, InFlight>,
    generations: DashMap<QueryKey, u64>,
    /// Last generation handed out. Only grows.
    epoch: AtomicU64,
    /// Generation of every key without its own counter.
    floor: AtomicU64,
    version: watch::Sender<u64>,
}

/// Shared cache store. Clones share the same state.
#[derive(Clone)]
pub struct QueryClient {
    inner: Arc<Inner>,
}

impl std::fmt::Debug for QueryClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueryClient")
            .field("entries", &self.inner.entries.len())
            .field("in_flight", &self.inner.in_flight.len())
            .finish_non_exhaustive()
    }
}

impl Default for QueryClient {
    fn default() -> Self {
        Self::new(QueryConfig::default())
    }
}

impl QueryClient {
    pub fn new(config: QueryConfig) -> Self {
        let (version, _) = watch::channel(0);
        Self {
            inner: Arc::new(Inner {
                config,
                entries: DashMap::new(),
                in_flight: DashMap::new(),
                generations: DashMap::new(),
                epoch: AtomicU64::new(0),
                floor: AtomicU64::new(0),
                version,
            }),
        }
    }

    pub fn config(&self) -> &QueryConfig {
        &self.inner.config
    }

    // ── Reads ────────────────────────────────────────────────────────

    /// Return cached data for `key`, fetching when needed.
    ///
    /// - fresh entry: returned without I/O
    /// - stale entry: returned at once, one background refetch started
    /// - missing or invalidated entry: awaits a (shared) fetch
    pub async fn fetch_query<T, F, Fut>(
        &self,
        key: QueryKey,
        stale_time: Duration,
        fetcher: F,
    ) -> Result<T, Error>
    where
        T: Clone + Send + Sync + 'static,
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T, Error>> + Send + 'static,
    {
        let now = Instant::now();
        let cached = self.inner.entries.get_mut(&key).and_then(|mut entry| {
            entry.last_access = now;
            if entry.invalidated {
                return None;
            }
            let value = downcast::<T>(entry.value.as_ref()?)?;
            let fresh = entry
                .updated_at
                .is_some_and(|at| now.duration_since(at) < stale_time);
            Some((value, fresh))
        });

        match cached {
            Some((value, true)) => {
                trace!(%key, "cache hit");
                Ok(value)
            }
            Some((value, false)) => {
                debug!(%key, "stale, revalidating in background");
                let fut = self.join_or_start(key.clone(), fetcher);
                tokio::spawn(async move {
                    if let Err(e) = fut.await {
                        debug!(%key, error = %e, "background refetch failed");
                    }
                });
                Ok(value)
            }
            None => {
                let erased = self.join_or_start(key.clone(), fetcher).await?;
                downcast::<T>(&erased).ok_or_else(|| {
                    Error::setup(format!("cached value for {key} has an unexpected type"))
                })
            }
        }
    }

    /// Run a write through the mutation retry policy.
    ///
    /// Invalidation is the caller's job and should follow a successful
    /// result before the caller returns.
    pub async fn run_mutation<T, F, Fut>(&self, op: F) -> Result<T, Error>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = Result<T, Error>>,
    {
        retry(&self.inner.config.mutation_retry, op).await
    }

    /// Share the in-flight fetch for `key`, or register a new one.
    fn join_or_start<T, F, Fut>(&self, key: QueryKey, fetcher: F) -> SharedFetch
    where
        T: Send + Sync + 'static,
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T, Error>> + Send + 'static,
    {
        let generation = *self
            .inner
            .generations
            .entry(key.clone())
            .or_insert_with(|| self.inner.floor.load(Ordering::Acquire));
        match self.inner.in_flight.entry(key.clone()) {
            MapEntry::Occupied(mut slot) => {
                if slot.get().generation == generation {
                    trace!(%key, "joining in-flight fetch");
                    return slot.get().fut.clone();
                }
                let fut = self.build_fetch(key, generation, fetcher);
                slot.insert(InFlight {
                    generation,
                    fut: fut.clone(),
                });
                fut
            }
            MapEntry::Vacant(slot) => {
                let fut = self.build_fetch(key, generation, fetcher);
                slot.insert(InFlight {
                    generation,
                    fut: fut.clone(),
                });
                fut
            }
        }
    }

    fn build_fetch<T, F, Fut>(&self, key: QueryKey, generation: u64, fetcher: F) -> SharedFetch
    where
        T: Send + Sync + 'static,
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T, Error>> + Send + 'static,
    {
        let client = self.clone();
        async move {
            debug!(%key, "fetching");
            let result = retry(&client.inner.config.read_retry, &fetcher)
                .await
                .map(|value| Arc::new(value) as Erased);
            client.settle(&key, generation, &result);
            result
        }
        .boxed()
        .shared()
    }

    /// Record a finished fetch, unless an invalidation overtook it.
    fn settle(&self, key: &QueryKey, generation: u64, result: &Result<Erased, Error>) {
        self.inner
            .in_flight
            .remove_if(key, |_, flight| flight.generation == generation);

        if self.generation(key) != generation {
            debug!(%key, "discarding result of superseded fetch");
            return;
        }

        let now = Instant::now();
        let mut entry = self
            .inner
            .entries
            .entry(key.clone())
            .or_insert_with(|| Entry::empty(now));
        match result {
            Ok(value) => {
                entry.value = Some(Arc::clone(value));
                entry.error = None;
                entry.updated_at = Some(now);
                entry.invalidated = false;
            }
            Err(e) => entry.error = Some(e.clone()),
        }
        drop(entry);
        self.bump_version();
    }

    // ── Direct access ────────────────────────────────────────────────

    pub fn get_query_data<T: Clone + 'static>(&self, key: &QueryKey) -> Option<T> {
        let entry = self.inner.entries.get(key)?;
        downcast(entry.value.as_ref()?)
    }

    /// Write `value` as fresh data for `key`.
    pub fn set_query_data<T: Send + Sync + 'static>(&self, key: QueryKey, value: T) {
        let now = Instant::now();
        let mut entry = self
            .inner
            .entries
            .entry(key)
            .or_insert_with(|| Entry::empty(now));
        entry.value = Some(Arc::new(value));
        entry.error = None;
        entry.updated_at = Some(now);
        entry.last_access = now;
        entry.invalidated = false;
        drop(entry);
        self.bump_version();
    }

    /// Last error recorded for `key`, cleared by the next success.
    pub fn query_error(&self, key: &QueryKey) -> Option<Error> {
        self.inner.entries.get(key)?.error.clone()
    }

    pub fn is_fetching(&self, key: &QueryKey) -> bool {
        self.inner.in_flight.contains_key(key)
    }

    pub fn is_invalidated(&self, key: &QueryKey) -> bool {
        self.inner
            .entries
            .get(key)
            .is_some_and(|entry| entry.invalidated)
    }

    // ── Invalidation ─────────────────────────────────────────────────

    /// Mark every entry under `prefix` invalidated and orphan any in-flight
    /// fetch for it. The next read of those keys goes to the network.
    pub fn invalidate(&self, prefix: &QueryKey) -> usize {
        let mut touched = Vec::new();
        for mut entry in self.inner.entries.iter_mut() {
            if entry.key().starts_with(prefix) {
                entry.invalidated = true;
                touched.push(entry.key().clone());
            }
        }
        self.orphan_in_flight(prefix, &mut touched);
        self.bump_generations(&touched);
        debug!(%prefix, keys = touched.len(), "invalidated");
        self.bump_version();
        touched.len()
    }

    /// Evict every entry under `prefix`.
    pub fn remove(&self, prefix: &QueryKey) -> usize {
        let mut removed = Vec::new();
        self.inner.entries.retain(|key, _| {
            if key.starts_with(prefix) {
                removed.push(key.clone());
                false
            } else {
                true
            }
        });
        self.orphan_in_flight(prefix, &mut removed);
        self.bump_generations(&removed);
        self.prune_generations();
        debug!(%prefix, keys = removed.len(), "removed");
        self.bump_version();
        removed.len()
    }

    pub fn clear(&self) {
        let keys: Vec<QueryKey> = self
            .inner
            .entries
            .iter()
            .map(|entry| entry.key().clone())
            .chain(self.inner.in_flight.iter().map(|f| f.key().clone()))
            .collect();
        self.inner.entries.clear();
        self.inner.in_flight.clear();
        self.bump_generations(&keys);
        self.prune_generations();
        self.bump_version();
    }

    /// Drop entries nobody has read within `gc_time`. Returns how many.
    pub fn collect_garbage(&self) -> usize {
        let gc_time = self.inner.config.gc_time;
        let now = Instant::now();
        let before = self.inner.entries.len();
        self.inner.entries.retain(|key, entry| {
            now.duration_since(entry.last_access) <= gc_time
                || self.inner.in_flight.contains_key(key)
        });
        let collected = before.saturating_sub(self.inner.entries.len());
        self.prune_generations();
        if collected > 0 {
            debug!(collected, "garbage collected query entries");
            self.bump_version();
        }
        collected
    }

    pub fn len(&self) -> usize {
        self.inner.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.entries.is_empty()
    }

    /// Version counter bumped on every cache write.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.inner.version.subscribe()
    }

    // ── Internals ────────────────────────────────────────────────────

    fn generation(&self, key: &QueryKey) -> u64 {
        self.inner
            .generations
            .get(key)
            .map_or_else(|| self.inner.floor.load(Ordering::Acquire), |g| *g)
    }

    fn bump_generations(&self, keys: &[QueryKey]) {
        for key in keys {
            let next = self.inner.epoch.fetch_add(1, Ordering::AcqRel) + 1;
            self.inner.generations.insert(key.clone(), next);
        }
    }

    /// Forget counters of keys with neither an entry nor a registered fetch.
    /// Raising the floor to the epoch first keeps orphaned fetches for those
    /// keys from ever settling.
    fn prune_generations(&self) {
        let epoch = self.inner.epoch.load(Ordering::Acquire);
        self.inner.floor.fetch_max(epoch, Ordering::AcqRel);
        self.inner.generations.retain(|key, _| {
            self.inner.entries.contains_key(key) || self.inner.in_flight.contains_key(key)
        });
    }

    fn orphan_in_flight(&self, prefix: &QueryKey, keys: &mut Vec<QueryKey>) {
        self.inner.in_flight.retain(|key, _| {
            if key.starts_with(prefix) {
                if !keys.contains(key) {
                    keys.push(key.clone());
                }
                false
            } else {
                true
            }
        });
    }

    fn bump_version(&self) {
        self.inner.version.send_modify(|v| *v = v.wrapping_add(1));
    }
}

fn downcast<T: Clone + 'static>(value: &Erased) -> Option<T> {
    value.downcast_ref::<T>().cloned()
}
