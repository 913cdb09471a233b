//! Audit log records, pagination math and display helpers.

#![forbid(unsafe_code)]

mod audit;
mod display;
mod pagination;

pub use audit::{AuditEntry, AuditLogPage, EpochMillis};
pub use display::{
    ActionTone, AuditLogRow, DEFAULT_PRINCIPAL_DISPLAY_LEN, format_timestamp, format_timestamp_in,
    truncate_principal,
};
pub use pagination::{MAX_UNCOMPRESSED_PAGES, PageSize, PageWindowItem, page_window, total_pages};
