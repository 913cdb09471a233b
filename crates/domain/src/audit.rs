use std::fmt::{Display, Formatter};

use serde::{Deserialize, Deserializer, Serialize};

/// Milliseconds since the Unix epoch as reported by the audit service.
///
/// The wire value may be a JSON number or a decimal string, since big-integer
/// transports commonly stringify values that do not fit a double.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct EpochMillis(i64);

impl EpochMillis {
    /// Creates a timestamp from milliseconds since the epoch.
    #[must_use]
    pub fn new(value: i64) -> Self {
        Self(value)
    }

    /// Returns the millisecond value.
    #[must_use]
    pub fn as_millis(&self) -> i64 {
        self.0
    }
}

impl Display for EpochMillis {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

impl<'de> Deserialize<'de> for EpochMillis {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = match WireInteger::deserialize(deserializer)? {
            WireInteger::Signed(value) => value,
            WireInteger::Unsigned(value) => i64::try_from(value).map_err(|_| {
                serde::de::Error::custom(format!("timestamp {value} exceeds i64 milliseconds"))
            })?,
            WireInteger::Text(value) => value.trim().parse::<i64>().map_err(|error| {
                serde::de::Error::custom(format!("invalid timestamp '{value}': {error}"))
            })?,
        };

        Ok(Self(value))
    }
}

/// One immutable audit record owned by the remote service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditEntry {
    /// When the action happened.
    pub timestamp: EpochMillis,
    /// Identifier of the acting principal.
    pub principal: String,
    /// Action verb.
    pub action: String,
    /// Target of the action.
    pub entity: String,
}

/// One page of audit records plus the total record count across all pages.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AuditLogPage {
    /// Number of records across all pages.
    #[serde(deserialize_with = "deserialize_total")]
    pub total: u64,
    /// Records of this page in service-defined order.
    #[serde(default)]
    pub entries: Vec<AuditEntry>,
}

impl AuditLogPage {
    /// Returns whether there is nothing to show for this page.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.total == 0 || self.entries.is_empty()
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum WireInteger {
    Signed(i64),
    Unsigned(u64),
    Text(String),
}

fn deserialize_total<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    match WireInteger::deserialize(deserializer)? {
        WireInteger::Signed(value) => u64::try_from(value)
            .map_err(|_| serde::de::Error::custom(format!("total must not be negative: {value}"))),
        WireInteger::Unsigned(value) => Ok(value),
        WireInteger::Text(value) => value.trim().parse::<u64>().map_err(|error| {
            serde::de::Error::custom(format!("invalid total '{value}': {error}"))
        }),
    }
}
