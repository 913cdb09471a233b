use std::sync::Arc;

use auditscope_core::CallerRole;
use tokio::sync::OnceCell;
use tracing::{info, warn};

use crate::AuditLogBackend;

/// Outcome of the one-time role check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccessStatus {
    /// The role check has not resolved yet.
    Pending,
    /// The caller has a role other than admin.
    Denied {
        /// Role reported by the backend.
        role: CallerRole,
    },
    /// The role check failed. Terminal for this gate.
    Error {
        /// Failure description.
        message: String,
    },
    /// The caller is an admin.
    Confirmed {
        /// Role reported by the backend.
        role: CallerRole,
    },
}

impl AccessStatus {
    /// Returns whether data fetches may be issued.
    #[must_use]
    pub fn is_confirmed(&self) -> bool {
        matches!(self, Self::Confirmed { .. })
    }
}

/// Proof that the access gate confirmed an admin caller.
///
/// Only [`AccessGate::admin_grant`] can mint one, so every page fetch is
/// statically tied to a confirmed role check.
#[derive(Debug, Clone, Copy)]
pub struct AdminGrant {
    _sealed: (),
}

/// Issues exactly one role check per gate and memoises the outcome.
///
/// A fresh gate means a fresh check; clones share the same outcome. Failures
/// are never retried, so a late success cannot silently follow a displayed
/// error.
#[derive(Clone)]
pub struct AccessGate {
    backend: Arc<dyn AuditLogBackend>,
    status: Arc<OnceCell<AccessStatus>>,
}

impl AccessGate {
    /// Creates a gate that has not checked access yet.
    #[must_use]
    pub fn new(backend: Arc<dyn AuditLogBackend>) -> Self {
        Self {
            backend,
            status: Arc::new(OnceCell::new()),
        }
    }

    /// Runs the role check on first call; later and concurrent calls share it.
    pub async fn check_access(&self) -> AccessStatus {
        self.status
            .get_or_init(|| async {
                match self.backend.get_my_role().await {
                    Ok(role) if role.is_admin() => {
                        info!(role = %role, "audit log access confirmed");
                        AccessStatus::Confirmed { role }
                    }
                    Ok(role) => {
                        warn!(role = %role, "audit log access denied");
                        AccessStatus::Denied { role }
                    }
                    Err(error) => {
                        warn!(error = %error, "failed to verify audit log role");
                        AccessStatus::Error {
                            message: error.to_string(),
                        }
                    }
                }
            })
            .await
            .clone()
    }

    /// Returns the current outcome without triggering a check.
    #[must_use]
    pub fn status(&self) -> AccessStatus {
        self.status.get().cloned().unwrap_or(AccessStatus::Pending)
    }

    /// Returns a fetch grant when the caller is a confirmed admin.
    #[must_use]
    pub fn admin_grant(&self) -> Option<AdminGrant> {
        self.status
            .get()
            .filter(|status| status.is_confirmed())
            .map(|_| AdminGrant { _sealed: () })
    }
}
