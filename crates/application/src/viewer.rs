use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use tracing::debug;

use auditscope_core::{AppError, AppResult};
use auditscope_domain::{PageSize, total_pages};

use crate::{
    AccessGate, AccessStatus, AdminGrant, AuditLogBackend, CachePolicy, PageFetchState, PageKey,
    PagedAuditLogFetcher, ViewState, project,
};

/// Settings fixed for the lifetime of a viewer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ViewerConfig {
    /// Entries per page.
    pub page_size: PageSize,
    /// Freshness rules for cached pages.
    pub cache_policy: CachePolicy,
}

/// Access-gated, paginated controller over a remote audit log.
///
/// Clones share the same gate, cache and page position.
#[derive(Clone)]
pub struct AuditLogViewer {
    gate: AccessGate,
    fetcher: PagedAuditLogFetcher,
    page_size: PageSize,
    current_index: Arc<AtomicU64>,
}

impl AuditLogViewer {
    /// Creates a viewer positioned on page 1. No request is issued yet.
    #[must_use]
    pub fn new(backend: Arc<dyn AuditLogBackend>, config: ViewerConfig) -> Self {
        Self {
            gate: AccessGate::new(Arc::clone(&backend)),
            fetcher: PagedAuditLogFetcher::new(backend, config.cache_policy),
            page_size: config.page_size,
            current_index: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Returns the configured page size.
    #[must_use]
    pub fn page_size(&self) -> PageSize {
        self.page_size
    }

    /// Returns the 1-based current page.
    #[must_use]
    pub fn current_page(&self) -> u64 {
        self.current_key().page_number()
    }

    /// Returns the page count implied by the most recently fetched total.
    #[must_use]
    pub fn total_pages(&self) -> u64 {
        let total = self.fetcher.latest_total(self.page_size).unwrap_or(0);
        total_pages(total, self.page_size)
    }

    /// Returns the access gate outcome so far.
    #[must_use]
    pub fn access_status(&self) -> AccessStatus {
        self.gate.status()
    }

    /// Checks access once and, for admins, loads the current page.
    pub async fn start(&self) -> ViewState {
        self.gate.check_access().await;

        if let Some(grant) = self.gate.admin_grant() {
            self.fetcher.fetch_page(&grant, self.current_key()).await;
        }

        self.view()
    }

    /// Moves to a 1-based page without fetching it.
    ///
    /// Pages outside `1..=total_pages` are rejected and the position is kept.
    pub fn go_to_page(&self, page: u64) -> AppResult<()> {
        let total_pages = self.total_pages();
        let key = PageKey::for_page_number(page, self.page_size)
            .ok()
            .filter(|key| key.page_index() < total_pages);

        let Some(key) = key else {
            debug!(page, total_pages, "rejected audit log navigation");
            return Err(AppError::Validation(format!(
                "page {page} is outside 1..={total_pages}"
            )));
        };

        self.current_index.store(key.page_index(), Ordering::SeqCst);
        Ok(())
    }

    /// Moves one page back.
    pub fn previous_page(&self) -> AppResult<()> {
        let current = self.current_page();
        if current <= 1 {
            return Err(AppError::Validation(
                "already on the first page".to_owned(),
            ));
        }

        self.go_to_page(current - 1)
    }

    /// Moves one page forward.
    pub fn next_page(&self) -> AppResult<()> {
        self.go_to_page(self.current_page().saturating_add(1))
    }

    /// Loads the current page, serving cached data while revalidating.
    ///
    /// The page is captured at call time; navigating while the request is in
    /// flight leaves the result in its own cache slot.
    pub async fn load_current_page(&self) -> AppResult<PageFetchState> {
        let grant = self.require_grant()?;
        Ok(self.fetcher.fetch_page(&grant, self.current_key()).await)
    }

    /// Moves to a page and loads it.
    pub async fn navigate(&self, page: u64) -> AppResult<PageFetchState> {
        self.go_to_page(page)?;
        self.load_current_page().await
    }

    /// Forces revalidation of the current page.
    ///
    /// Calls made while a request for the page is in flight join that request.
    pub async fn refetch(&self) -> AppResult<PageFetchState> {
        let grant = self.require_grant()?;
        Ok(self.fetcher.refetch(&grant, self.current_key()).await)
    }

    /// Returns a viewer with another page size, reset to page 1.
    ///
    /// The access outcome is kept; every cached page is marked stale.
    #[must_use]
    pub fn reconfigure(&self, page_size: PageSize) -> Self {
        self.fetcher.invalidate_all();

        Self {
            gate: self.gate.clone(),
            fetcher: self.fetcher.clone(),
            page_size,
            current_index: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Projects the current view state.
    #[must_use]
    pub fn view(&self) -> ViewState {
        let key = self.current_key();
        project(
            &self.gate.status(),
            &self.fetcher.state(key),
            key.page_number(),
            self.page_size,
        )
    }

    /// Reads the position once; callers derive everything from the one key.
    fn current_key(&self) -> PageKey {
        PageKey::new(self.current_index.load(Ordering::SeqCst), self.page_size)
    }

    fn require_grant(&self) -> AppResult<AdminGrant> {
        self.gate.admin_grant().ok_or_else(|| {
            AppError::Forbidden("audit log access has not been confirmed".to_owned())
        })
    }
}

#[cfg(test)]
mod tests;
