use async_trait::async_trait;

use auditscope_core::{AppResult, CallerRole};
use auditscope_domain::{AuditLogPage, PageSize};

/// Port for the remote service that owns the audit log.
#[async_trait]
pub trait AuditLogBackend: Send + Sync {
    /// Resolves the role of the current caller.
    async fn get_my_role(&self) -> AppResult<CallerRole>;

    /// Returns one page of audit entries, `page` being zero-based.
    async fn get_audit_logs(&self, page: u64, page_size: PageSize) -> AppResult<AuditLogPage>;
}
