//! Work-order drafts produced by the dispatch path.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use thiserror::Error;

/// Urgency bucket of a work order.
///
/// Ordered from most to least urgent, so sorting a list of drafts by
/// priority puts emergencies first.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Emergency,
    High,
    Medium,
    Low,
}

impl Priority {
    /// Lowercase name as stored in the database (`"emergency"`, `"high"`, ...).
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Emergency => "emergency",
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
        }
    }
}

impl Default for Priority {
    /// Emails without any priority marker are treated as medium, never low.
    fn default() -> Self {
        Self::Medium
    }
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lifecycle status of a work order. Drafts always start as pending;
/// later transitions are driven by [`StatusUpdate`](super::status::StatusUpdate)s
/// against the stored record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkOrderStatus {
    #[default]
    Pending,
}

/// A work order extracted from one dispatch email.
///
/// `wo_number` is the idempotency key: callers must not store two drafts
/// with the same number.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct WorkOrderDraft {
    /// CBRE work-order number (`C2959324`, `P2919408`). Never empty.
    pub wo_number: String,

    /// Building name, truncated to the configured limit.
    pub building: String,

    /// Street address with dangling commas removed.
    pub address: String,

    pub city: String,

    /// Two-letter state code.
    pub state: String,

    pub priority: Priority,

    /// `Date Entered:` from the email, or the parse time when absent or invalid.
    pub date_entered: DateTime<Utc>,

    /// Problem (or PM) description, truncated to the configured limit.
    pub description: String,

    pub requestor: String,

    /// Digits and dashes only.
    pub requestor_phone: String,

    /// Not-to-exceed amount in USD; zero when the email carries none.
    pub nte: Decimal,

    /// Synthesized audit text, one fact per line.
    pub comments: String,

    pub status: WorkOrderStatus,

    /// `true` for Preventive-Maintenance dispatches.
    pub is_pm: bool,
}

/// Why an email produced no record.
///
/// Not an error: callers skip the email (usually marking it read) and move on.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    /// Neither the subject nor the body contains a work-order number.
    #[error("no work order number found")]
    NoWorkOrderNumber,

    /// The status label is not one we know how to interpret.
    #[error("unrecognized status label '{0}'")]
    UnknownLabel(String),
}
