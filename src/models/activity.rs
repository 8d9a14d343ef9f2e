use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::Display;

use super::{ActivityId, ProductId, UserId};

/// What a user did with a product
///
/// Labels the service does not recognise are kept as `Unknown` so that a single
/// malformed record never makes the whole activity log unreadable.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ActivityKind {
    Viewed,
    AddedToCart,
    Purchased,
    Unknown(String),
}

impl ActivityKind {
    /// Storage and wire label of the action
    pub fn as_str(&self) -> &str {
        match self {
            ActivityKind::Viewed => "viewed",
            ActivityKind::AddedToCart => "added_to_cart",
            ActivityKind::Purchased => "purchased",
            ActivityKind::Unknown(label) => label,
        }
    }
}

impl From<&str> for ActivityKind {
    fn from(label: &str) -> Self {
        match label {
            "viewed" => ActivityKind::Viewed,
            "added_to_cart" => ActivityKind::AddedToCart,
            // Older records label purchases as "ordered"
            "purchased" | "ordered" => ActivityKind::Purchased,
            other => ActivityKind::Unknown(other.to_string()),
        }
    }
}

impl From<String> for ActivityKind {
    fn from(label: String) -> Self {
        ActivityKind::from(label.as_str())
    }
}

impl From<ActivityKind> for String {
    fn from(kind: ActivityKind) -> Self {
        kind.as_str().to_string()
    }
}

impl Display for ActivityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An immutable log entry of a user interacting with a product
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ActivityRecord {
    pub id: ActivityId,
    pub user_id: UserId,
    pub product_id: ProductId,
    pub action: ActivityKind,
    pub timestamp: DateTime<Utc>,
}

impl ActivityRecord {
    /// Creates a record stamped with the current time
    pub fn new(user_id: UserId, product_id: ProductId, action: ActivityKind) -> Self {
        Self {
            id: ActivityId::new(),
            user_id,
            product_id,
            action,
            timestamp: Utc::now(),
        }
    }
}
