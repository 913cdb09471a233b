use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use tokio::sync::{Mutex, Semaphore};

use auditscope_core::{AppError, AppResult, CallerRole};
use auditscope_domain::{AuditEntry, AuditLogPage, EpochMillis, PageSize};

use crate::AuditLogBackend;

pub(crate) fn entries(count: u64) -> Vec<AuditEntry> {
    (0..count)
        .map(|index| AuditEntry {
            timestamp: EpochMillis::new(1_700_000_000_000 - i64::try_from(index).unwrap_or(0)),
            principal: format!("principal-{index}"),
            action: "CREATE".to_owned(),
            entity: format!("entity-{index}"),
        })
        .collect()
}

pub(crate) fn page_size(value: u64) -> PageSize {
    PageSize::new(value).unwrap_or_else(|_| unreachable!())
}

/// Scriptable backend: roles and pages can be held back, released and failed.
pub(crate) struct FakeAuditLogBackend {
    role: Result<String, String>,
    entries: Vec<AuditEntry>,
    role_gate: Mutex<Option<Arc<Semaphore>>>,
    page_gates: Mutex<HashMap<u64, Arc<Semaphore>>>,
    failing_pages: Mutex<HashSet<u64>>,
    panicking_pages: Mutex<HashSet<u64>>,
    role_calls: AtomicUsize,
    page_calls: Mutex<Vec<u64>>,
}

impl FakeAuditLogBackend {
    pub(crate) fn with_role(role: &str, entry_count: u64) -> Arc<Self> {
        Arc::new(Self::new(Ok(role.to_owned()), entry_count))
    }

    pub(crate) fn admin(entry_count: u64) -> Arc<Self> {
        Self::with_role("admin", entry_count)
    }

    pub(crate) fn failing_role(message: &str) -> Arc<Self> {
        Arc::new(Self::new(Err(message.to_owned()), 0))
    }

    fn new(role: Result<String, String>, entry_count: u64) -> Self {
        Self {
            role,
            entries: entries(entry_count),
            role_gate: Mutex::new(None),
            page_gates: Mutex::new(HashMap::new()),
            failing_pages: Mutex::new(HashSet::new()),
            panicking_pages: Mutex::new(HashSet::new()),
            role_calls: AtomicUsize::new(0),
            page_calls: Mutex::new(Vec::new()),
        }
    }

    pub(crate) async fn hold_role(&self) {
        *self.role_gate.lock().await = Some(Arc::new(Semaphore::new(0)));
    }

    pub(crate) async fn release_role(&self) {
        if let Some(gate) = self.role_gate.lock().await.as_ref() {
            gate.add_permits(1);
        }
    }

    pub(crate) async fn hold_page(&self, page_index: u64) {
        self.page_gates
            .lock()
            .await
            .insert(page_index, Arc::new(Semaphore::new(0)));
    }

    pub(crate) async fn release_page(&self, page_index: u64) {
        if let Some(gate) = self.page_gates.lock().await.get(&page_index) {
            gate.add_permits(1);
        }
    }

    pub(crate) async fn fail_page(&self, page_index: u64) {
        self.failing_pages.lock().await.insert(page_index);
    }

    pub(crate) async fn recover_page(&self, page_index: u64) {
        self.failing_pages.lock().await.remove(&page_index);
    }

    /// Makes the next request for the page panic inside the backend.
    pub(crate) async fn panic_once_on_page(&self, page_index: u64) {
        self.panicking_pages.lock().await.insert(page_index);
    }

    pub(crate) fn role_calls(&self) -> usize {
        self.role_calls.load(Ordering::SeqCst)
    }

    pub(crate) async fn page_calls(&self) -> Vec<u64> {
        self.page_calls.lock().await.clone()
    }
}

async fn pass(gate: Option<Arc<Semaphore>>) {
    if let Some(gate) = gate {
        if let Ok(permit) = gate.acquire().await {
            permit.forget();
        }
    }
}

#[async_trait]
impl AuditLogBackend for FakeAuditLogBackend {
    async fn get_my_role(&self) -> AppResult<CallerRole> {
        self.role_calls.fetch_add(1, Ordering::SeqCst);
        let gate = self.role_gate.lock().await.clone();
        pass(gate).await;

        self.role
            .clone()
            .map(CallerRole::new)
            .map_err(AppError::Remote)
    }

    async fn get_audit_logs(&self, page: u64, page_size: PageSize) -> AppResult<AuditLogPage> {
        self.page_calls.lock().await.push(page);
        let gate = self.page_gates.lock().await.get(&page).cloned();
        pass(gate).await;

        if self.panicking_pages.lock().await.remove(&page) {
            panic!("backend bug while serving page {page}");
        }

        if self.failing_pages.lock().await.contains(&page) {
            return Err(AppError::Remote(format!("page {page} unavailable")));
        }

        let size = usize::try_from(page_size.get()).unwrap_or(usize::MAX);
        let offset = usize::try_from(page).unwrap_or(usize::MAX).saturating_mul(size);

        Ok(AuditLogPage {
            total: u64::try_from(self.entries.len()).unwrap_or(u64::MAX),
            entries: self.entries.iter().skip(offset).take(size).cloned().collect(),
        })
    }
}
