use std::fmt::{Display, Formatter};

use auditscope_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};

/// Page counts up to this value are shown without ellipsis compression.
pub const MAX_UNCOMPRESSED_PAGES: u64 = 7;

/// Validated, positive number of entries per page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u64", into = "u64")]
pub struct PageSize(u64);

impl PageSize {
    /// Entries per page when the caller does not configure one.
    pub const DEFAULT: Self = Self(10);

    /// Creates a page size, rejecting zero.
    pub fn new(value: u64) -> AppResult<Self> {
        if value == 0 {
            return Err(AppError::Validation(
                "page size must be greater than zero".to_owned(),
            ));
        }

        Ok(Self(value))
    }

    /// Returns the number of entries per page.
    #[must_use]
    pub fn get(&self) -> u64 {
        self.0
    }
}

impl Default for PageSize {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl TryFrom<u64> for PageSize {
    type Error = AppError;

    fn try_from(value: u64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<PageSize> for u64 {
    fn from(value: PageSize) -> Self {
        value.0
    }
}

impl Display for PageSize {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

/// One slot of the navigation page window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PageWindowItem {
    /// A concrete 1-based page number.
    Page(u64),
    /// A gap of one or more hidden pages.
    Ellipsis,
}

/// Returns the number of pages needed for `total` records, never less than one.
#[must_use]
pub fn total_pages(total: u64, page_size: PageSize) -> u64 {
    total.div_ceil(page_size.get()).max(1)
}

/// Computes the compressed page-number sequence shown around `current`.
///
/// First and last pages are always present, as are the current page and its
/// direct neighbours. Gaps collapse into at most two ellipsis markers.
#[must_use]
pub fn page_window(current: u64, total_pages: u64) -> Vec<PageWindowItem> {
    if total_pages <= MAX_UNCOMPRESSED_PAGES {
        return (1..=total_pages).map(PageWindowItem::Page).collect();
    }

    let mut items = vec![PageWindowItem::Page(1)];
    if current > 3 {
        items.push(PageWindowItem::Ellipsis);
    }

    let start = current.saturating_sub(1).max(2);
    let end = current.saturating_add(1).min(total_pages - 1);
    items.extend((start..=end).map(PageWindowItem::Page));

    if current < total_pages - 2 {
        items.push(PageWindowItem::Ellipsis);
    }
    items.push(PageWindowItem::Page(total_pages));

    items
}
