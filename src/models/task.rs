use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Largest task id a list may carry (2^53 - 1, the exact-integer limit of
/// JSON numbers in most readers)
pub const MAX_TASK_ID: i64 = 9_007_199_254_740_991;

/// Task priority
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    Medium,
    High,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "low" => Some(Priority::Low),
            "medium" => Some(Priority::Medium),
            "high" => Some(Priority::High),
            _ => None,
        }
    }
}

impl Default for Priority {
    fn default() -> Self {
        Priority::Low
    }
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A checklist item owned by exactly one task
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subtask {
    pub text: String,
    pub completed: bool,
}

impl Subtask {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            completed: false,
        }
    }
}

/// Task model
///
/// Field order matches the exported JSON document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: i64,
    pub text: String,
    #[serde(with = "due_date")]
    pub date: Option<NaiveDate>,
    pub priority: Priority,
    pub category: String,
    pub completed: bool,
    pub subtasks: Vec<Subtask>,
}

impl Task {
    /// Create a new, incomplete task with no subtasks
    pub fn new(id: i64, text: String) -> Self {
        Self {
            id,
            text,
            date: None,
            priority: Priority::default(),
            category: String::new(),
            completed: false,
            subtasks: Vec::new(),
        }
    }

    /// Check if the task is due on the given day and still open
    pub fn is_due_on(&self, day: NaiveDate) -> bool {
        !self.completed && self.date == Some(day)
    }
}

/// Split a comma-separated subtask list into incomplete subtasks.
///
/// Entries are trimmed and empty entries are dropped; input order is kept.
pub fn parse_subtasks(input: &str) -> Vec<Subtask> {
    input
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(Subtask::new)
        .collect()
}

/// Due dates travel as `YYYY-MM-DD`, with the empty string meaning "no date".
mod due_date {
    use chrono::NaiveDate;
    use serde::{de, Deserialize, Deserializer, Serializer};

    const FORMAT: &str = "%Y-%m-%d";

    pub fn serialize<S>(date: &Option<NaiveDate>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match date {
            Some(d) => serializer.serialize_str(&d.format(FORMAT).to_string()),
            None => serializer.serialize_str(""),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        if raw.is_empty() {
            return Ok(None);
        }
        NaiveDate::parse_from_str(&raw, FORMAT)
            .map(Some)
            .map_err(|_| de::Error::custom(format!("invalid date '{}', expected YYYY-MM-DD", raw)))
    }
}
