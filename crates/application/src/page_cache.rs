use std::collections::HashMap;
use std::time::{Duration, Instant};

use auditscope_core::{AppError, AppResult};
use auditscope_domain::{AuditLogPage, PageSize};
use tokio::sync::watch;

/// Cache key for one fetched page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PageKey {
    page_index: u64,
    page_size: PageSize,
}

impl PageKey {
    /// Creates a key from a zero-based page index.
    #[must_use]
    pub fn new(page_index: u64, page_size: PageSize) -> Self {
        Self {
            page_index,
            page_size,
        }
    }

    /// Creates a key from a 1-based page number as shown to users.
    pub fn for_page_number(page_number: u64, page_size: PageSize) -> AppResult<Self> {
        let page_index = page_number.checked_sub(1).ok_or_else(|| {
            AppError::Validation("page numbers start at 1".to_owned())
        })?;

        Ok(Self::new(page_index, page_size))
    }

    /// Returns the zero-based page index sent to the backend.
    #[must_use]
    pub fn page_index(&self) -> u64 {
        self.page_index
    }

    /// Returns the 1-based page number shown to users.
    #[must_use]
    pub fn page_number(&self) -> u64 {
        self.page_index.saturating_add(1)
    }

    /// Returns the page size of this key.
    #[must_use]
    pub fn page_size(&self) -> PageSize {
        self.page_size
    }
}

/// Freshness rules for cached pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CachePolicy {
    /// Age after which a cached page is revalidated on the next request.
    pub stale_after: Duration,
    /// Keep serving stale data while a revalidation is in flight.
    pub stale_while_revalidate: bool,
}

impl Default for CachePolicy {
    fn default() -> Self {
        Self {
            stale_after: Duration::ZERO,
            stale_while_revalidate: true,
        }
    }
}

/// Snapshot of the fetch lifecycle for one key.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageFetchState {
    /// Last successfully fetched page.
    pub data: Option<AuditLogPage>,
    /// Error of the most recent attempt, cleared by the next success.
    pub error: Option<String>,
    /// When `data` was fetched.
    pub fetched_at: Option<Instant>,
    /// A request for this key is in flight.
    pub is_fetching: bool,
}

impl PageFetchState {
    /// Returns whether the first fetch of this key has not resolved yet.
    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.data.is_none() && self.error.is_none()
    }
}

#[derive(Debug, Default)]
struct CachedPage {
    data: Option<AuditLogPage>,
    error: Option<String>,
    fetched_at: Option<Instant>,
    invalidated: bool,
    in_flight: Option<watch::Receiver<bool>>,
}

impl CachedPage {
    fn is_stale(&self, policy: CachePolicy, now: Instant) -> bool {
        self.invalidated
            || self.fetched_at.is_none_or(|fetched_at| {
                now.saturating_duration_since(fetched_at) >= policy.stale_after
            })
    }

    fn snapshot(&self) -> PageFetchState {
        PageFetchState {
            data: self.data.clone(),
            error: self.error.clone(),
            fetched_at: self.fetched_at,
            is_fetching: self.in_flight.is_some(),
        }
    }
}

/// Result of asking the cache whether a request must be issued.
#[derive(Debug)]
pub(crate) enum FetchDecision {
    /// Cached data is fresh; no request needed.
    Fresh,
    /// A request for the key is already in flight; wait on it.
    Joined(watch::Receiver<bool>),
    /// The caller must issue the request and signal completion.
    Started(watch::Sender<bool>, watch::Receiver<bool>),
}

/// Page cache keyed by page index and page size.
///
/// Results are written back to the key they were requested for, so a late
/// response never lands in another page's slot.
#[derive(Debug, Default)]
pub struct PageCache {
    entries: HashMap<PageKey, CachedPage>,
}

impl PageCache {
    /// Creates an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the fetch state for a key, empty when never requested.
    #[must_use]
    pub fn state(&self, key: PageKey) -> PageFetchState {
        self.entries
            .get(&key)
            .map(CachedPage::snapshot)
            .unwrap_or_default()
    }

    /// Returns the most recently fetched total for a page size.
    #[must_use]
    pub fn latest_total(&self, page_size: PageSize) -> Option<u64> {
        self.entries
            .iter()
            .filter(|(key, _)| key.page_size == page_size)
            .filter_map(|(_, entry)| Some((entry.fetched_at?, entry.data.as_ref()?.total)))
            .max_by_key(|(fetched_at, _)| *fetched_at)
            .map(|(_, total)| total)
    }

    /// Marks a key stale without dropping its data.
    pub fn invalidate(&mut self, key: PageKey) {
        if let Some(entry) = self.entries.get_mut(&key) {
            entry.invalidated = true;
        }
    }

    /// Marks every key stale.
    pub fn invalidate_all(&mut self) {
        for entry in self.entries.values_mut() {
            entry.invalidated = true;
        }
    }

    pub(crate) fn begin_fetch(
        &mut self,
        key: PageKey,
        policy: CachePolicy,
        force: bool,
        now: Instant,
    ) -> FetchDecision {
        let entry = self.entries.entry(key).or_default();

        if let Some(in_flight) = &entry.in_flight {
            return FetchDecision::Joined(in_flight.clone());
        }

        let stale = entry.is_stale(policy, now);
        if !force && !stale && entry.error.is_none() && entry.data.is_some() {
            return FetchDecision::Fresh;
        }

        if stale && !force && !policy.stale_while_revalidate {
            entry.data = None;
            entry.fetched_at = None;
        }

        let (sender, receiver) = watch::channel(false);
        entry.in_flight = Some(receiver.clone());
        FetchDecision::Started(sender, receiver)
    }

    pub(crate) fn complete(
        &mut self,
        key: PageKey,
        result: Result<AuditLogPage, String>,
        now: Instant,
    ) {
        let entry = self.entries.entry(key).or_default();
        entry.in_flight = None;

        match result {
            Ok(page) => {
                entry.data = Some(page);
                entry.error = None;
                entry.fetched_at = Some(now);
                entry.invalidated = false;
            }
            Err(message) => {
                entry.error = Some(message);
            }
        }
    }
}
