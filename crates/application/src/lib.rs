//! Access-gated, paginated audit log viewing: ports, gate, cache, fetcher
//! and view state projection.

#![forbid(unsafe_code)]

mod access_gate;
mod audit_log_ports;
mod page_cache;
mod paged_fetcher;
mod view_state;
mod viewer;

#[cfg(test)]
mod test_support;

pub use access_gate::{AccessGate, AccessStatus, AdminGrant};
pub use audit_log_ports::AuditLogBackend;
pub use page_cache::{CachePolicy, PageCache, PageFetchState, PageKey};
pub use paged_fetcher::PagedAuditLogFetcher;
pub use view_state::{AUDIT_LOG_COLUMNS, PaginationControl, ViewState, project};
pub use viewer::{AuditLogViewer, ViewerConfig};
