use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Instant;

use tokio::sync::watch;
use tracing::{debug, warn};

use auditscope_domain::{AuditLogPage, PageSize};

use crate::page_cache::{FetchDecision, PageCache};
use crate::{AdminGrant, AuditLogBackend, CachePolicy, PageFetchState, PageKey};

/// Fetches audit log pages through a shared keyed cache.
///
/// Requests run as detached tasks: a caller that stops waiting (for example
/// after navigating away) does not abort the call, and the result is still
/// stored under the key it was issued for. Concurrent requests for one key
/// collapse onto a single backend call. With stale-while-revalidate, a key
/// that already holds data is returned without waiting for revalidation.
#[derive(Clone)]
pub struct PagedAuditLogFetcher {
    backend: Arc<dyn AuditLogBackend>,
    cache: Arc<Mutex<PageCache>>,
    policy: CachePolicy,
}

impl PagedAuditLogFetcher {
    /// Creates a fetcher with an empty cache.
    #[must_use]
    pub fn new(backend: Arc<dyn AuditLogBackend>, policy: CachePolicy) -> Self {
        Self {
            backend,
            cache: Arc::new(Mutex::new(PageCache::new())),
            policy,
        }
    }

    /// Returns the cache policy in use.
    #[must_use]
    pub fn policy(&self) -> CachePolicy {
        self.policy
    }

    /// Serves a page from cache or fetches it, revalidating stale entries.
    ///
    /// Only a key without usable cached data waits for the backend.
    pub async fn fetch_page(&self, grant: &AdminGrant, key: PageKey) -> PageFetchState {
        self.request(grant, key, false).await
    }

    /// Forces revalidation of a page regardless of freshness and waits for it.
    pub async fn refetch(&self, grant: &AdminGrant, key: PageKey) -> PageFetchState {
        self.request(grant, key, true).await
    }

    /// Returns the current fetch state of a page.
    #[must_use]
    pub fn state(&self, key: PageKey) -> PageFetchState {
        self.lock_cache().state(key)
    }

    /// Returns the most recently fetched total for a page size.
    #[must_use]
    pub fn latest_total(&self, page_size: PageSize) -> Option<u64> {
        self.lock_cache().latest_total(page_size)
    }

    /// Marks one page stale.
    pub fn invalidate(&self, key: PageKey) {
        self.lock_cache().invalidate(key);
    }

    /// Marks every cached page stale.
    pub fn invalidate_all(&self) {
        self.lock_cache().invalidate_all();
    }

    async fn request(&self, _grant: &AdminGrant, key: PageKey, force: bool) -> PageFetchState {
        let (mut done, sender, snapshot) = {
            let mut cache = self.lock_cache();
            let (done, sender) = match cache.begin_fetch(key, self.policy, force, Instant::now()) {
                FetchDecision::Fresh => return cache.state(key),
                FetchDecision::Joined(done) => {
                    debug!(
                        page_index = key.page_index(),
                        page_size = %key.page_size(),
                        "joined in-flight audit log request"
                    );
                    (done, None)
                }
                FetchDecision::Started(sender, done) => (done, Some(sender)),
            };
            (done, sender, cache.state(key))
        };

        if let Some(sender) = sender {
            self.spawn_fetch(key, sender);
        }

        // Cached data is served at once; the revalidation settles in the background.
        if !force && self.policy.stale_while_revalidate && snapshot.data.is_some() {
            return snapshot;
        }

        // The fetch task always signals before its sender goes away.
        let _ = done.wait_for(|finished| *finished).await;

        self.state(key)
    }

    fn spawn_fetch(&self, key: PageKey, sender: watch::Sender<bool>) {
        let backend = Arc::clone(&self.backend);
        let in_flight = InFlightFetch {
            cache: Arc::clone(&self.cache),
            key,
            done: sender,
            settled: false,
        };

        tokio::spawn(async move {
            debug!(
                page_index = key.page_index(),
                page_size = %key.page_size(),
                "fetching audit log page"
            );

            let result = backend
                .get_audit_logs(key.page_index(), key.page_size())
                .await
                .map_err(|error| {
                    warn!(
                        page_index = key.page_index(),
                        page_size = %key.page_size(),
                        error = %error,
                        "failed to fetch audit log page"
                    );
                    error.to_string()
                });

            if let Ok(page) = &result {
                debug!(
                    page_index = key.page_index(),
                    total = page.total,
                    entries = page.entries.len(),
                    "audit log page fetched"
                );
            }

            in_flight.settle(result);
        });
    }

    fn lock_cache(&self) -> MutexGuard<'_, PageCache> {
        lock(&self.cache)
    }
}

/// Completion handle for one spawned fetch.
///
/// Dropping it unsettled (the task panicked or the runtime shut down) records
/// an error for the key, so the entry never stays in flight.
struct InFlightFetch {
    cache: Arc<Mutex<PageCache>>,
    key: PageKey,
    done: watch::Sender<bool>,
    settled: bool,
}

impl InFlightFetch {
    fn settle(mut self, result: Result<AuditLogPage, String>) {
        self.finish(result);
    }

    fn finish(&mut self, result: Result<AuditLogPage, String>) {
        if self.settled {
            return;
        }
        self.settled = true;

        lock(&self.cache).complete(self.key, result, Instant::now());
        self.done.send_replace(true);
    }
}

impl Drop for InFlightFetch {
    fn drop(&mut self) {
        if !self.settled {
            warn!(
                page_index = self.key.page_index(),
                page_size = %self.key.page_size(),
                "audit log fetch task ended before completing"
            );
            self.finish(Err("audit log fetch ended before completing".to_owned()));
        }
    }
}

fn lock(cache: &Mutex<PageCache>) -> MutexGuard<'_, PageCache> {
    cache.lock().unwrap_or_else(PoisonError::into_inner)
}
