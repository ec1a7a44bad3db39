//! Data models for the moderation queue
//!
//! Items are seeded externally (a JSON array of [`Item`] records) and are
//! never created or deleted by the engine; only their [`Status`] changes.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Error;

// =============================================================================
// ItemId
// =============================================================================

/// Stable, unique identifier of a reported item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(pub u64);

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for ItemId {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl FromStr for ItemId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<u64>()
            .map(Self)
            .map_err(|_| Error::InvalidArgument(format!("not an item id: {s:?}")))
    }
}

// =============================================================================
// Status
// =============================================================================

/// Moderation status of an item.
///
/// Legal moves are `pending -> approved`, `pending -> rejected` and
/// `{approved, rejected} -> pending`. There is no direct
/// `approved <-> rejected` move.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    #[default]
    Pending,
    Approved,
    Rejected,
}

impl Status {
    /// All statuses in tab order.
    pub const ALL: [Self; 3] = [Self::Pending, Self::Approved, Self::Rejected];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }

    /// Whether an operator affordance may move an item from `self` to `target`.
    #[must_use]
    pub const fn can_transition_to(self, target: Self) -> bool {
        matches!(
            (self, target),
            (Self::Pending, Self::Approved | Self::Rejected)
                | (Self::Approved | Self::Rejected, Self::Pending)
        )
    }

    /// Notification variant used when items are moved to this status.
    #[must_use]
    pub const fn variant(self) -> Variant {
        match self {
            Self::Approved => Variant::Success,
            Self::Rejected => Variant::Error,
            Self::Pending => Variant::Info,
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Status {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pending" => Ok(Self::Pending),
            "approved" | "approve" => Ok(Self::Approved),
            "rejected" | "reject" => Ok(Self::Rejected),
            other => Err(Error::InvalidArgument(format!(
                "unknown status {other:?} (expected pending, approved or rejected)"
            ))),
        }
    }
}

// =============================================================================
// Variant
// =============================================================================

/// Classification of a notification and of the undo snapshot that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Variant {
    Success,
    Error,
    #[default]
    Info,
}

// =============================================================================
// Item
// =============================================================================

/// A reported piece of content awaiting a moderation decision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub id: ItemId,
    pub title: String,
    pub author: String,
    #[serde(default)]
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    pub report_reason: String,
    pub reported_at: DateTime<Utc>,
    #[serde(default = "default_report_count")]
    pub report_count: u32,
    #[serde(default)]
    pub status: Status,
}

const fn default_report_count() -> u32 {
    1
}

impl Item {
    /// A pending item with placeholder metadata.
    #[must_use]
    pub fn new(id: u64, title: impl Into<String>) -> Self {
        Self {
            id: ItemId(id),
            title: title.into(),
            author: String::new(),
            content: String::new(),
            image: None,
            report_reason: String::new(),
            reported_at: DateTime::<Utc>::UNIX_EPOCH,
            report_count: default_report_count(),
            status: Status::Pending,
        }
    }

    #[must_use]
    pub const fn with_status(mut self, status: Status) -> Self {
        self.status = status;
        self
    }

    #[must_use]
    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.author = author.into();
        self
    }

    #[must_use]
    pub fn with_report(mut self, reason: impl Into<String>, at: DateTime<Utc>) -> Self {
        self.report_reason = reason.into();
        self.reported_at = at;
        self
    }
}

/// Parse a JSON array of items.
pub fn parse_items(json: &str) -> crate::Result<Vec<Item>> {
    Ok(serde_json::from_str(json)?)
}

// =============================================================================
// StatusCounts
// =============================================================================

/// Number of items per status across the whole store.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusCounts {
    pub pending: usize,
    pub approved: usize,
    pub rejected: usize,
}

impl StatusCounts {
    pub const fn bump(&mut self, status: Status) {
        match status {
            Status::Pending => self.pending += 1,
            Status::Approved => self.approved += 1,
            Status::Rejected => self.rejected += 1,
        }
    }

    #[must_use]
    pub const fn get(&self, status: Status) -> usize {
        match status {
            Status::Pending => self.pending,
            Status::Approved => self.approved,
            Status::Rejected => self.rejected,
        }
    }

    #[must_use]
    pub const fn total(&self) -> usize {
        self.pending + self.approved + self.rejected
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn adjacency_rule() {
        use Status::{Approved, Pending, Rejected};
        assert!(Pending.can_transition_to(Approved));
        assert!(Pending.can_transition_to(Rejected));
        assert!(Approved.can_transition_to(Pending));
        assert!(Rejected.can_transition_to(Pending));

        assert!(!Approved.can_transition_to(Rejected));
        assert!(!Rejected.can_transition_to(Approved));
        for s in Status::ALL {
            assert!(!s.can_transition_to(s), "{s} -> {s} must not be offered");
        }
    }

    #[test]
    fn status_parses_verbs_and_nouns() {
        assert_eq!("approve".parse::<Status>().unwrap(), Status::Approved);
        assert_eq!(" Rejected ".parse::<Status>().unwrap(), Status::Rejected);
        assert_eq!("pending".parse::<Status>().unwrap(), Status::Pending);
        let err = "spam".parse::<Status>().unwrap_err();
        assert_eq!(err.error_type(), "INVALID_ARGUMENT");
    }

    #[test]
    fn item_json_defaults() {
        let json = r#"[{
            "id": 7,
            "title": "Spam link",
            "author": "mallory",
            "report_reason": "spam",
            "reported_at": "2024-01-01T00:00:00Z"
        }]"#;
        let items = parse_items(json).unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].id, ItemId(7));
        assert_eq!(items[0].status, Status::Pending);
        assert_eq!(items[0].report_count, 1);
        assert!(items[0].image.is_none());
        assert!(items[0].content.is_empty());
    }

    #[test]
    fn unknown_status_value_is_rejected() {
        let json = r#"[{"id": 1, "title": "t", "author": "a", "report_reason": "r",
            "reported_at": "2024-01-01T00:00:00Z", "status": "flagged"}]"#;
        let err = parse_items(json).unwrap_err();
        assert_eq!(err.error_type(), "TYPE_ERROR");
    }

    #[test]
    fn counts_bump_and_total() {
        let mut counts = StatusCounts::default();
        counts.bump(Status::Pending);
        counts.bump(Status::Pending);
        counts.bump(Status::Rejected);
        assert_eq!(counts.get(Status::Pending), 2);
        assert_eq!(counts.get(Status::Approved), 0);
        assert_eq!(counts.total(), 3);
    }

    #[test]
    fn variant_follows_target_status() {
        assert_eq!(Status::Approved.variant(), Variant::Success);
        assert_eq!(Status::Rejected.variant(), Variant::Error);
        assert_eq!(Status::Pending.variant(), Variant::Info);
    }
}
