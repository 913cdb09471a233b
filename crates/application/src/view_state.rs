use auditscope_core::CallerRole;
use auditscope_domain::{AuditEntry, PageSize, PageWindowItem, page_window, total_pages};

use crate::{AccessStatus, PageFetchState};

/// Column headers of the audit log table, also used for loading skeletons.
pub const AUDIT_LOG_COLUMNS: [&str; 4] = ["Timestamp", "Principal", "Action", "Entity"];

/// Navigation control shown when there is more than one page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaginationControl {
    /// 1-based current page.
    pub current_page: u64,
    /// Number of pages.
    pub total_pages: u64,
    /// Compressed page-number sequence.
    pub window: Vec<PageWindowItem>,
    /// Whether "previous" is enabled.
    pub has_previous: bool,
    /// Whether "next" is enabled.
    pub has_next: bool,
}

impl PaginationControl {
    /// Builds the control for a page position.
    #[must_use]
    pub fn new(current_page: u64, total_pages: u64) -> Self {
        Self {
            current_page,
            total_pages,
            window: page_window(current_page, total_pages),
            has_previous: current_page > 1,
            has_next: current_page < total_pages,
        }
    }
}

/// Everything a renderer needs to draw the audit log view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewState {
    /// The role check is in flight.
    RoleLoading {
        /// Skeleton rows to draw.
        skeleton_rows: u64,
    },
    /// The role check failed. No retry is offered.
    RoleError {
        /// Failure description.
        message: String,
    },
    /// The caller is not an admin.
    RoleDenied {
        /// Role reported for the caller.
        role: CallerRole,
    },
    /// The current page has not been fetched yet.
    DataLoading {
        /// Skeleton rows to draw.
        skeleton_rows: u64,
        /// 1-based current page.
        current_page: u64,
    },
    /// The latest fetch of the current page failed. Retry via refetch.
    DataError {
        /// Failure description.
        message: String,
        /// 1-based current page.
        current_page: u64,
        /// A retry is in flight.
        refreshing: bool,
    },
    /// The fetch succeeded but there is nothing to show.
    DataEmpty {
        /// Number of entries across all pages.
        total: u64,
        /// 1-based current page.
        current_page: u64,
        /// Number of pages.
        total_pages: u64,
        /// A background revalidation is in flight.
        refreshing: bool,
    },
    /// Entries are available for the current page.
    DataReady {
        /// Entries of the current page.
        entries: Vec<AuditEntry>,
        /// Number of entries across all pages.
        total: u64,
        /// 1-based current page.
        current_page: u64,
        /// Number of pages.
        total_pages: u64,
        /// A background revalidation is in flight.
        refreshing: bool,
        /// Present only when there is more than one page.
        pagination: Option<PaginationControl>,
    },
}

impl ViewState {
    /// Short, distinct message for this state.
    #[must_use]
    pub fn headline(&self) -> &'static str {
        match self {
            Self::RoleLoading { .. } => "Verifying access…",
            Self::RoleError { .. } => "Failed to verify role",
            Self::RoleDenied { .. } => "Access Restricted",
            Self::DataLoading { .. } => "Loading…",
            Self::DataError { .. } => "Failed to load audit log",
            Self::DataEmpty { .. } => "No audit log entries found",
            Self::DataReady { .. } => "Audit log",
        }
    }

    /// Longer explanation shown under the headline, where one applies.
    #[must_use]
    pub fn detail(&self) -> Option<String> {
        match self {
            Self::RoleError { .. } => Some(
                "Could not determine your access level. Please try refreshing the page."
                    .to_owned(),
            ),
            Self::RoleDenied { .. } => Some(
                "This view is only available to administrators. Required role: admin."
                    .to_owned(),
            ),
            Self::DataError { message, .. } => Some(message.clone()),
            _ => None,
        }
    }

    /// Toolbar summary such as "23 total entries — Page 3 of 3".
    #[must_use]
    pub fn summary(&self) -> Option<String> {
        match self {
            Self::DataEmpty {
                total,
                current_page,
                total_pages,
                ..
            }
            | Self::DataReady {
                total,
                current_page,
                total_pages,
                ..
            } => Some(format!(
                "{} total entries — Page {current_page} of {total_pages}",
                group_thousands(*total)
            )),
            _ => None,
        }
    }

    /// Returns whether a user-triggered retry is offered.
    #[must_use]
    pub fn offers_retry(&self) -> bool {
        matches!(self, Self::DataError { .. })
    }

    /// Returns whether a request for the current page is in flight while
    /// something other than a loading skeleton is shown.
    #[must_use]
    pub fn is_refreshing(&self) -> bool {
        match self {
            Self::DataError { refreshing, .. }
            | Self::DataEmpty { refreshing, .. }
            | Self::DataReady { refreshing, .. } => *refreshing,
            _ => false,
        }
    }

    /// Returns the pagination control, if it should be shown.
    #[must_use]
    pub fn pagination(&self) -> Option<&PaginationControl> {
        match self {
            Self::DataReady { pagination, .. } => pagination.as_ref(),
            _ => None,
        }
    }
}

/// Derives the view state from the access outcome and the current page's
/// fetch state. Pure; call again whenever either input changes.
#[must_use]
pub fn project(
    access: &AccessStatus,
    fetch: &PageFetchState,
    current_page: u64,
    page_size: PageSize,
) -> ViewState {
    match access {
        AccessStatus::Pending => ViewState::RoleLoading {
            skeleton_rows: page_size.get(),
        },
        AccessStatus::Error { message } => ViewState::RoleError {
            message: message.clone(),
        },
        AccessStatus::Denied { role } => ViewState::RoleDenied { role: role.clone() },
        AccessStatus::Confirmed { .. } => project_data(fetch, current_page, page_size),
    }
}

fn project_data(fetch: &PageFetchState, current_page: u64, page_size: PageSize) -> ViewState {
    if let Some(message) = &fetch.error {
        return ViewState::DataError {
            message: message.clone(),
            current_page,
            refreshing: fetch.is_fetching,
        };
    }

    let Some(page) = &fetch.data else {
        return ViewState::DataLoading {
            skeleton_rows: page_size.get(),
            current_page,
        };
    };

    let total_pages = total_pages(page.total, page_size);
    if page.is_empty() {
        return ViewState::DataEmpty {
            total: page.total,
            current_page,
            total_pages,
            refreshing: fetch.is_fetching,
        };
    }

    ViewState::DataReady {
        entries: page.entries.clone(),
        total: page.total,
        current_page,
        total_pages,
        refreshing: fetch.is_fetching,
        pagination: (total_pages > 1).then(|| PaginationControl::new(current_page, total_pages)),
    }
}

fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);

    for (index, digit) in digits.chars().enumerate() {
        if index > 0 && (digits.len() - index) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    grouped
}
