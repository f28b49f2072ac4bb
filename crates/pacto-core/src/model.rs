use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Conversation phase of a user.
///
/// `SetupDaily` → `SetupMonthly` → `Active`; a reset command sends any
/// phase back to `SetupDaily` without touching stored goals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    SetupDaily,
    SetupMonthly,
    Active,
}

impl Phase {
    /// Stable string form used in the store.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SetupDaily => "SETUP_DAILY",
            Self::SetupMonthly => "SETUP_MONTHLY",
            Self::Active => "ACTIVE",
        }
    }

    /// Parse the stored string form.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "SETUP_DAILY" => Some(Self::SetupDaily),
            "SETUP_MONTHLY" => Some(Self::SetupMonthly),
            "ACTIVE" => Some(Self::Active),
            _ => None,
        }
    }

    /// Whether this phase is still collecting the initial goal lists.
    pub fn is_setup(&self) -> bool {
        matches!(self, Self::SetupDaily | Self::SetupMonthly)
    }
}

/// A registered user, keyed by normalized channel address.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub name: String,
    pub phase: Phase,
}

/// Cadence of a goal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GoalCategory {
    Daily,
    Monthly,
}

impl GoalCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Daily => "daily",
            Self::Monthly => "monthly",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "daily" => Some(Self::Daily),
            "monthly" => Some(Self::Monthly),
            _ => None,
        }
    }
}

/// A user-declared goal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Goal {
    pub id: String,
    pub owner_id: String,
    pub description: String,
    pub category: GoalCategory,
}

/// A dated boolean outcome for a goal, as read back from the store.
///
/// At most one record exists per (goal, date); writes for an existing pair
/// are no-ops.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressRecord {
    pub goal_id: String,
    pub description: String,
    pub date: NaiveDate,
    pub achieved: bool,
}
