use std::collections::HashSet;

use chrono::{DateTime, Duration, NaiveTime, Utc};

/// Chat platform user id of an operator.
pub type OperatorId = i64;

/// Distribution state of a code. `Used` is terminal except through a bulk reset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodeStatus {
    Unused,
    Used,
}

impl CodeStatus {
    pub fn from_is_used(is_used: bool) -> Self {
        if is_used { Self::Used } else { Self::Unused }
    }

    pub fn is_used(self) -> bool {
        matches!(self, Self::Used)
    }
}

/// A stored single-use code.
#[derive(Debug, Clone)]
pub struct Code {
    pub id: i64,
    pub value: String,
    pub status: CodeStatus,
    pub uploaded_by: OperatorId,
    pub uploaded_at: DateTime<Utc>,
    pub used_by: Option<OperatorId>,
    pub used_at: Option<DateTime<Utc>>,
}

/// Registry entry for an operator, used to render friendly names in reports.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: OperatorId,
    pub display_name: String,
    pub handle: Option<String>,
    pub updated_at: DateTime<Utc>,
}

/// Result of a batch insert. `inserted + duplicates` equals the number of submitted values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct InsertOutcome {
    pub inserted: u64,
    pub duplicates: u64,
}

/// Result of reverting every used code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResetOutcome {
    pub reset: u64,
    pub unused: u64,
}

/// Time window for usage accounting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UsageScope {
    #[default]
    AllTime,
    /// The current UTC calendar day.
    Today,
}

impl UsageScope {
    pub fn from_kebab(s: &str) -> Option<Self> {
        match s {
            "all-time" | "all" => Some(Self::AllTime),
            "today" | "day" => Some(Self::Today),
            _ => None,
        }
    }

    pub fn as_kebab(self) -> &'static str {
        match self {
            Self::AllTime => "all-time",
            Self::Today => "today",
        }
    }

    /// Half-open `[start, end)` window on `used_at`, or `None` for all-time.
    pub fn window(self, now: DateTime<Utc>) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
        match self {
            Self::AllTime => None,
            Self::Today => {
                let start = now.date_naive().and_time(NaiveTime::MIN).and_utc();
                Some((start, start + Duration::days(1)))
            }
        }
    }
}

/// Per-operator distribution count, joined with the user registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UsageEntry {
    pub user_id: OperatorId,
    pub display_name: Option<String>,
    pub handle: Option<String>,
    pub count: u64,
}

impl UsageEntry {
    /// Friendly name: display name, then `@handle`, then the raw id.
    pub fn label(&self) -> String {
        if let Some(name) = self.display_name.as_deref().filter(|n| !n.trim().is_empty()) {
            return name.to_owned();
        }
        if let Some(handle) = self.handle.as_deref().filter(|h| !h.is_empty()) {
            return format!("@{handle}");
        }
        self.user_id.to_string()
    }
}

/// Drop repeated values, keeping the first occurrence of each (case-sensitive).
pub fn dedup_preserving_order(codes: &[String]) -> Vec<String> {
    let mut seen = HashSet::with_capacity(codes.len());
    let mut unique = Vec::with_capacity(codes.len());
    for code in codes {
        if seen.insert(code.as_str()) {
            unique.push(code.clone());
        }
    }
    unique
}

/// Maximum number of rows per multi-row INSERT (SQLite bind-parameter budget).
pub const INSERT_CHUNK_SIZE: usize = 500;
