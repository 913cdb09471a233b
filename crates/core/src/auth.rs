use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

/// Role value that unlocks the audit log.
pub const ADMIN_ROLE: &str = "admin";

/// Role classification reported by the remote service for the current caller.
///
/// Values are backend-defined. Only the exact value `"admin"` is privileged;
/// every other string, including different casing and unknown future roles,
/// is treated as non-privileged.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CallerRole(String);

impl CallerRole {
    /// Wraps a role value as reported by the backend.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Returns the raw role value.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// Returns whether this role may read the audit log.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.0 == ADMIN_ROLE
    }
}

impl Display for CallerRole {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "{}", self.0)
    }
}
