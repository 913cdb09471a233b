use async_trait::async_trait;
use tokio::sync::RwLock;

use auditscope_application::AuditLogBackend;
use auditscope_core::{AppResult, CallerRole};
use auditscope_domain::{AuditEntry, AuditLogPage, PageSize};

/// In-memory audit log backend for local development and tests.
///
/// Entries are kept newest first, the order the remote service returns them.
pub struct InMemoryAuditLogBackend {
    role: RwLock<CallerRole>,
    entries: RwLock<Vec<AuditEntry>>,
}

impl InMemoryAuditLogBackend {
    /// Creates a backend that reports `role` for the caller.
    #[must_use]
    pub fn new(role: CallerRole, entries: Vec<AuditEntry>) -> Self {
        let mut entries = entries;
        entries.sort_by(|left, right| right.timestamp.cmp(&left.timestamp));

        Self {
            role: RwLock::new(role),
            entries: RwLock::new(entries),
        }
    }

    /// Changes the role reported for the caller.
    pub async fn set_role(&self, role: CallerRole) {
        *self.role.write().await = role;
    }

    /// Records a new entry, keeping newest-first order.
    pub async fn record(&self, entry: AuditEntry) {
        let mut entries = self.entries.write().await;
        let position = entries.partition_point(|existing| existing.timestamp > entry.timestamp);
        entries.insert(position, entry);
    }
}

#[async_trait]
impl AuditLogBackend for InMemoryAuditLogBackend {
    async fn get_my_role(&self) -> AppResult<CallerRole> {
        Ok(self.role.read().await.clone())
    }

    async fn get_audit_logs(&self, page: u64, page_size: PageSize) -> AppResult<AuditLogPage> {
        let entries = self.entries.read().await;
        let size = usize::try_from(page_size.get()).unwrap_or(usize::MAX);
        let offset = usize::try_from(page)
            .unwrap_or(usize::MAX)
            .saturating_mul(size);

        Ok(AuditLogPage {
            total: u64::try_from(entries.len()).unwrap_or(u64::MAX),
            entries: entries.iter().skip(offset).take(size).cloned().collect(),
        })
    }
}
