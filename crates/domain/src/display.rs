use chrono::{DateTime, Local, TimeZone, Utc};

use crate::{AuditEntry, EpochMillis};

/// Longest principal rendered without truncation.
pub const DEFAULT_PRINCIPAL_DISPLAY_LEN: usize = 28;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Visual emphasis for an action verb.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionTone {
    /// Removal or refusal, e.g. `DELETE`, `REVOKE`.
    Destructive,
    /// Creation or grant, e.g. `CREATE`, `LOGIN`.
    Positive,
    /// In-place change, e.g. `UPDATE`, `EDIT`.
    Modification,
    /// Anything else.
    Neutral,
}

impl ActionTone {
    /// Classifies an action verb by keyword, case-insensitively.
    #[must_use]
    pub fn classify(action: &str) -> Self {
        const DESTRUCTIVE: &[&str] = &["DELETE", "REMOVE", "REVOKE", "DENIED"];
        const POSITIVE: &[&str] = &["CREATE", "ADD", "GRANT", "LOGIN"];
        const MODIFICATION: &[&str] = &["UPDATE", "MODIFY", "EDIT", "CHANGE"];

        let action = action.to_uppercase();
        let matches_any = |keywords: &[&str]| keywords.iter().any(|word| action.contains(word));

        if matches_any(DESTRUCTIVE) {
            Self::Destructive
        } else if matches_any(POSITIVE) {
            Self::Positive
        } else if matches_any(MODIFICATION) {
            Self::Modification
        } else {
            Self::Neutral
        }
    }
}

/// Display-ready projection of one audit entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditLogRow {
    /// Local date/time string.
    pub timestamp: String,
    /// Principal shortened for table cells.
    pub principal: String,
    /// Untruncated principal, e.g. for tooltips.
    pub principal_full: String,
    /// Action verb as recorded.
    pub action: String,
    /// Emphasis for the action verb.
    pub action_tone: ActionTone,
    /// Action target.
    pub entity: String,
}

impl AuditEntry {
    /// Builds the table row for this entry using the local time zone.
    #[must_use]
    pub fn display_row(&self) -> AuditLogRow {
        AuditLogRow {
            timestamp: format_timestamp(self.timestamp),
            principal: truncate_principal(&self.principal, DEFAULT_PRINCIPAL_DISPLAY_LEN),
            principal_full: self.principal.clone(),
            action: self.action.clone(),
            action_tone: ActionTone::classify(&self.action),
            entity: self.entity.clone(),
        }
    }
}

/// Formats a timestamp as local date/time.
#[must_use]
pub fn format_timestamp(timestamp: EpochMillis) -> String {
    format_timestamp_in(timestamp, &Local)
}

/// Formats a timestamp in the given zone, falling back to the raw millisecond
/// value when it lies outside the representable calendar range.
#[must_use]
pub fn format_timestamp_in<Tz: TimeZone>(timestamp: EpochMillis, zone: &Tz) -> String
where
    Tz::Offset: std::fmt::Display,
{
    DateTime::<Utc>::from_timestamp_millis(timestamp.as_millis())
        .map(|utc| utc.with_timezone(zone).format(TIMESTAMP_FORMAT).to_string())
        .unwrap_or_else(|| timestamp.to_string())
}

/// Shortens a principal to `head...tail` when longer than `max_len` characters.
#[must_use]
pub fn truncate_principal(principal: &str, max_len: usize) -> String {
    let length = principal.chars().count();
    if length <= max_len {
        return principal.to_owned();
    }

    let half = max_len.saturating_sub(3) / 2;
    let head: String = principal.chars().take(half).collect();
    let tail: String = principal.chars().skip(length - half).collect();

    format!("{head}...{tail}")
}
