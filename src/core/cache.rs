//! Concurrency-safe status cache.
//!
//! [`StatusCache`] maps every requested [`FileIdentity`] to its last-known
//! [`FileStatus`] and keeps it fresh through background refresh runs against a backend.
//!
//! # Refresh model
//! - Requested files are seeded as [`FileStatus::Unknown`] immediately; files already
//!   known keep their status until the refresh overwrites it.
//! - At most one worker runs per cache. Its slot is claimed under the mutation lock, so
//!   two callers can never both start one.
//! - A worker resolves its batch in chunks: canonical paths via [`PathResolver`], one
//!   backend request per chunk, then a merge under the lock. Backend I/O happens
//!   outside the lock.
//! - Batches submitted while a worker runs are queued. The running worker drains the
//!   queue before it releases the slot, so late arrivals are always covered by it.
//! - Any failure marks the cache inactive. Listeners get exactly one
//!   [`CacheEvent::Completed`] per worker run, after the slot has been released.

use crate::core::{
    backend::{BackendConnector, Connection, ServerProfile},
    error::{Result, StatusCacheError},
    file_status::FileStatus,
    identity::FileIdentity,
    notice::NoticeSink,
    refresh_slot::{RefreshSlot, SlotTicket},
    resolver::PathResolver,
};
use chrono::{DateTime, Utc};
use std::collections::{HashMap, HashSet, VecDeque};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::{Arc, Condvar, Mutex, MutexGuard, RwLock};

/// Identities per backend request
pub const DEFAULT_CHUNK_SIZE: usize = 5000;

/// Files submitted together for status resolution, plus caller context
#[derive(Debug, Clone, PartialEq)]
pub struct RefreshBatch<C = ()> {
    pub files: Vec<FileIdentity>,
    pub context: C,
}

impl<C> RefreshBatch<C> {
    pub fn new<I, F>(files: I, context: C) -> Self
    where
        I: IntoIterator<Item = F>,
        F: Into<FileIdentity>,
    {
        Self {
            files: files.into_iter().map(Into::into).collect(),
            context,
        }
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

impl RefreshBatch<()> {
    /// Batch without context
    pub fn of<I, F>(files: I) -> Self
    where
        I: IntoIterator<Item = F>,
        F: Into<FileIdentity>,
    {
        Self::new(files, ())
    }
}

/// Progress after one chunk has been merged
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefreshProgress {
    /// 1-based chunk number within the current batch
    pub chunk: usize,
    pub chunks: usize,
    /// Identities of the current batch handled so far
    pub processed: usize,
    pub total: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefreshOutcome {
    Succeeded,
    Failed(String),
}

/// Summary of one finished worker run
#[derive(Debug, Clone)]
pub struct RefreshCompleted<C> {
    /// The batch that started the run first, then batches picked up while it ran
    pub batches: Vec<RefreshBatch<C>>,
    pub outcome: RefreshOutcome,
    pub finished_at: DateTime<Utc>,
}

impl<C> RefreshCompleted<C> {
    pub fn succeeded(&self) -> bool {
        self.outcome == RefreshOutcome::Succeeded
    }

    /// Every identity covered by the run, in submission order
    pub fn identities(&self) -> impl Iterator<Item = &FileIdentity> {
        self.batches.iter().flat_map(|batch| batch.files.iter())
    }
}

#[derive(Debug, Clone)]
pub enum CacheEvent<C> {
    ChunkResolved(RefreshProgress),
    Completed(RefreshCompleted<C>),
}

/// Externally visible lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheState {
    /// Never initialized, or the last refresh failed
    Inactive,
    /// A worker is running
    Refreshing,
    /// Active and no worker running
    Current,
}

/// Handle returned by [`StatusCache::subscribe`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Listener<C> = Arc<dyn Fn(&CacheEvent<C>) + Send + Sync>;

struct CacheInner<C> {
    statuses: HashMap<FileIdentity, FileStatus>,
    active: bool,
    slot: RefreshSlot,
    pending: VecDeque<RefreshBatch<C>>,
    last_refreshed: Option<DateTime<Utc>>,
}

struct Shared<C> {
    inner: Mutex<CacheInner<C>>,
    idle: Condvar,
    listeners: RwLock<Vec<(SubscriptionId, Listener<C>)>>,
    next_subscription: Mutex<u64>,
    resolver: Arc<PathResolver>,
    connector: Arc<dyn BackendConnector>,
    profile: ServerProfile,
    sink: Arc<dyn NoticeSink>,
    chunk_size: usize,
}

/// Authoritative map from file identity to status, fed by background refreshes.
///
/// Cloning yields another handle to the same cache.
pub struct StatusCache<C = ()> {
    shared: Arc<Shared<C>>,
}

impl<C> Clone for StatusCache<C> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<C: Send + Sync + 'static> StatusCache<C> {
    pub fn new(
        resolver: Arc<PathResolver>,
        connector: Arc<dyn BackendConnector>,
        profile: ServerProfile,
        sink: Arc<dyn NoticeSink>,
    ) -> Self {
        Self::with_chunk_size(resolver, connector, profile, sink, DEFAULT_CHUNK_SIZE)
    }

    pub fn with_chunk_size(
        resolver: Arc<PathResolver>,
        connector: Arc<dyn BackendConnector>,
        profile: ServerProfile,
        sink: Arc<dyn NoticeSink>,
        chunk_size: usize,
    ) -> Self {
        Self {
            shared: Arc::new(Shared {
                inner: Mutex::new(CacheInner {
                    statuses: HashMap::new(),
                    active: false,
                    slot: RefreshSlot::new(),
                    pending: VecDeque::new(),
                    last_refreshed: None,
                }),
                idle: Condvar::new(),
                listeners: RwLock::new(Vec::new()),
                next_subscription: Mutex::new(0),
                resolver,
                connector,
                profile,
                sink,
                chunk_size: chunk_size.max(1),
            }),
        }
    }

    /// Clear the map, mark the cache active and start refreshing `batch`.
    ///
    /// Fails with [`StatusCacheError::RefreshInProgress`] while a worker is running;
    /// the running worker is not disturbed.
    pub fn initialize(&self, batch: RefreshBatch<C>) -> Result<()> {
        let mut inner = self.shared.lock_inner();
        if inner.slot.is_occupied() {
            self.shared
                .sink
                .error("Initialize rejected: a refresh is already in progress");
            return Err(StatusCacheError::RefreshInProgress);
        }

        inner.statuses.clear();
        inner.active = true;
        self.shared
            .sink
            .info(&format!("Initializing status cache with {} files", batch.len()));
        self.seed_and_dispatch(inner, batch).map(|_| ())
    }

    /// Seed unknown files and refresh `batch` in the background.
    ///
    /// Returns true if this call started a worker, false if the batch was queued for
    /// the worker already running.
    pub fn add_or_update_background(&self, batch: RefreshBatch<C>) -> Result<bool> {
        let inner = self.shared.lock_inner();
        self.seed_and_dispatch(inner, batch)
    }

    /// Last-known status, [`FileStatus::Unknown`] if the file was never requested
    pub fn lookup(&self, identity: &FileIdentity) -> FileStatus {
        self.shared
            .lock_inner()
            .statuses
            .get(identity)
            .copied()
            .unwrap_or_default()
    }

    /// Block while a refresh runs, then report whether the cache is active
    pub fn wait_until_current(&self) -> bool {
        let mut inner = self.shared.lock_inner();
        while inner.slot.is_occupied() {
            inner = self
                .shared
                .idle
                .wait(inner)
                .unwrap_or_else(|poisoned| poisoned.into_inner());
        }
        inner.active
    }

    /// Active and not refreshing
    pub fn is_current(&self) -> bool {
        let inner = self.shared.lock_inner();
        inner.active && !inner.slot.is_occupied()
    }

    pub fn is_active(&self) -> bool {
        self.shared.lock_inner().active
    }

    pub fn is_refreshing(&self) -> bool {
        self.shared.lock_inner().slot.is_occupied()
    }

    pub fn state(&self) -> CacheState {
        let inner = self.shared.lock_inner();
        if inner.slot.is_occupied() {
            CacheState::Refreshing
        } else if inner.active {
            CacheState::Current
        } else {
            CacheState::Inactive
        }
    }

    /// Drop every entry and mark the cache inactive. A running worker keeps running.
    pub fn clear(&self) {
        let mut inner = self.shared.lock_inner();
        inner.statuses.clear();
        inner.active = false;
    }

    pub fn len(&self) -> usize {
        self.shared.lock_inner().statuses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Sorted copy of the whole map
    pub fn snapshot(&self) -> Vec<(FileIdentity, FileStatus)> {
        let mut entries: Vec<_> = self
            .shared
            .lock_inner()
            .statuses
            .iter()
            .map(|(identity, status)| (identity.clone(), *status))
            .collect();
        entries.sort_by(|a, b| a.0.cmp(&b.0));
        entries
    }

    /// Completion time of the last successful worker run
    pub fn last_refreshed(&self) -> Option<DateTime<Utc>> {
        self.shared.lock_inner().last_refreshed
    }

    /// Number of worker runs started so far
    pub fn refresh_runs(&self) -> u64 {
        self.shared.lock_inner().slot.runs()
    }

    pub fn resolver(&self) -> &Arc<PathResolver> {
        &self.shared.resolver
    }

    pub fn subscribe(
        &self,
        listener: impl Fn(&CacheEvent<C>) + Send + Sync + 'static,
    ) -> SubscriptionId {
        let id = {
            let mut next = self
                .shared
                .next_subscription
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            *next += 1;
            SubscriptionId(*next)
        };
        self.shared
            .listeners
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push((id, Arc::new(listener)));
        id
    }

    /// Returns false if `id` was not subscribed
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut listeners = self
            .shared
            .listeners
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let before = listeners.len();
        listeners.retain(|(existing, _)| *existing != id);
        listeners.len() != before
    }

    fn seed_and_dispatch(
        &self,
        mut inner: MutexGuard<'_, CacheInner<C>>,
        batch: RefreshBatch<C>,
    ) -> Result<bool> {
        for identity in &batch.files {
            inner
                .statuses
                .entry(identity.clone())
                .or_insert(FileStatus::Unknown);
        }

        let Some(ticket) = inner.slot.try_claim() else {
            log::debug!(
                "Refresh in flight; queued {} files for the running worker",
                batch.len()
            );
            inner.pending.push_back(batch);
            return Ok(false);
        };

        let shared = Arc::clone(&self.shared);
        let spawned = std::thread::Builder::new()
            .name("vcs-status-refresh".to_string())
            .spawn(move || shared.run_worker(ticket, batch));

        match spawned {
            Ok(_) => Ok(true),
            Err(e) => {
                // The ticket was dropped together with the unspawned closure
                inner.slot.recover_lost_ticket();
                inner.active = false;
                drop(inner);
                self.shared.idle.notify_all();
                self.shared
                    .sink
                    .error(&format!("Could not start refresh worker: {e}"));
                Err(StatusCacheError::Io(e))
            }
        }
    }
}

impl<C: Send + Sync + 'static> Shared<C> {
    fn lock_inner(&self) -> MutexGuard<'_, CacheInner<C>> {
        self.inner
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn run_worker(self: Arc<Self>, ticket: SlotTicket, first: RefreshBatch<C>) {
        let mut covered = Vec::new();
        let mut failure: Option<StatusCacheError> = None;
        let mut connection: Option<Connection> = None;
        let mut batch = first;

        loop {
            if failure.is_none() {
                let run = catch_unwind(AssertUnwindSafe(|| {
                    self.refresh_batch(&batch, &mut connection)
                }));
                match run {
                    Ok(Ok(())) => {}
                    Ok(Err(e)) => failure = Some(e),
                    Err(payload) => failure = Some(StatusCacheError::worker_panicked(&*payload)),
                }
                if let Some(e) = &failure {
                    self.sink
                        .error(&format!("Status refresh failed, cache is now inactive: {e}"));
                }
            }
            covered.push(batch);

            let mut inner = self.lock_inner();
            if let Some(next) = inner.pending.pop_front() {
                batch = next;
                continue;
            }
            if failure.is_some() {
                inner.active = false;
            } else {
                inner.last_refreshed = Some(Utc::now());
            }
            inner.slot.release(ticket);
            break;
        }

        // Disconnect before anyone is told the run is over
        drop(connection);
        self.idle.notify_all();

        let outcome = match failure {
            None => RefreshOutcome::Succeeded,
            Some(e) => RefreshOutcome::Failed(e.to_string()),
        };
        let files: usize = covered.iter().map(RefreshBatch::len).sum();
        log::debug!(
            "Refresh run finished: {} batches, {} files, {:?}",
            covered.len(),
            files,
            outcome
        );
        self.emit(&CacheEvent::Completed(RefreshCompleted {
            batches: covered,
            outcome,
            finished_at: Utc::now(),
        }));
    }

    fn refresh_batch(
        &self,
        batch: &RefreshBatch<C>,
        connection: &mut Option<Connection>,
    ) -> Result<()> {
        // Duplicates are dropped within a batch only; a later batch asking for the
        // same file again is a fresh request and gets re-queried
        let mut seen = HashSet::new();
        let work: Vec<&FileIdentity> = batch
            .files
            .iter()
            .filter(|identity| seen.insert(*identity))
            .collect();

        let total = work.len();
        let chunks = total.div_ceil(self.chunk_size);
        for (index, chunk) in work.chunks(self.chunk_size).enumerate() {
            let mut outside_root = Vec::new();
            let mut requests = Vec::with_capacity(chunk.len());
            for identity in chunk {
                let resolution = self.resolver.resolve(identity.as_str());
                if resolution.warning.is_some() {
                    outside_root.push(*identity);
                } else {
                    requests.push((*identity, resolution.canonical));
                }
            }

            let answers = if requests.is_empty() {
                HashMap::new()
            } else {
                if connection.is_none() {
                    *connection = Some(Connection::open(self.connector.as_ref(), &self.profile)?);
                }
                let canonical: Vec<String> =
                    requests.iter().map(|(_, path)| path.clone()).collect();
                match connection.as_mut() {
                    Some(open) => open.resolve_statuses(&canonical)?,
                    None => HashMap::new(),
                }
            };

            {
                let mut inner = self.lock_inner();
                for identity in outside_root {
                    inner
                        .statuses
                        .insert(identity.clone(), FileStatus::NotInBackend);
                }
                for (identity, canonical) in &requests {
                    // Paths the backend leaves out are unknown to it
                    let status = answers
                        .get(canonical)
                        .copied()
                        .unwrap_or(FileStatus::NotInBackend);
                    inner.statuses.insert((*identity).clone(), status);
                }
            }

            let progress = RefreshProgress {
                chunk: index + 1,
                chunks,
                processed: (index * self.chunk_size + chunk.len()).min(total),
                total,
            };
            log::debug!(
                "Resolved chunk {}/{} ({} of {} files)",
                progress.chunk,
                progress.chunks,
                progress.processed,
                progress.total
            );
            self.emit(&CacheEvent::ChunkResolved(progress));
        }
        Ok(())
    }

    fn emit(&self, event: &CacheEvent<C>) {
        let listeners: Vec<Listener<C>> = self
            .listeners
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .iter()
            .map(|(_, listener)| Arc::clone(listener))
            .collect();
        for listener in listeners {
            if catch_unwind(AssertUnwindSafe(|| listener(event))).is_err() {
                self.sink.error("A status cache listener panicked");
            }
        }
    }
}
