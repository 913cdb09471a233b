//! Infrastructure adapters for the audit log backend port.

#![forbid(unsafe_code)]

mod env_config;
mod http_audit_log_backend;
mod in_memory_audit_log_backend;

pub use env_config::{
    HttpBackendConfig, load_http_backend_config, load_viewer_config, process_env,
};
pub use http_audit_log_backend::HttpAuditLogBackend;
pub use in_memory_audit_log_backend::InMemoryAuditLogBackend;
