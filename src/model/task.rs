use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use super::empty_as_none;

/// A task (the remote source calls these "items")
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub project_id: String,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub section_id: Option<String>,
    pub content: String,
    #[serde(default)]
    pub description: String,
    /// 1 (normal) through 4 (urgent)
    #[serde(default = "default_priority")]
    pub priority: u8,
    #[serde(default, alias = "child_order")]
    pub order: i32,
    #[serde(default, alias = "is_collapsed")]
    pub collapsed: bool,
    /// Completion timestamp as sent by the remote (`None` while open)
    #[serde(default, deserialize_with = "empty_as_none")]
    pub completed_at: Option<String>,
    /// Label names (labels are joined by name)
    #[serde(default)]
    pub labels: Vec<String>,
    #[serde(default)]
    pub duration: Option<Duration>,
    #[serde(default)]
    pub due: Option<Due>,
}

fn default_priority() -> u8 {
    1
}

impl Task {
    pub fn new(
        id: impl Into<String>,
        project_id: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Task {
            id: id.into(),
            project_id: project_id.into(),
            section_id: None,
            content: content.into(),
            description: String::new(),
            priority: default_priority(),
            order: 0,
            collapsed: false,
            completed_at: None,
            labels: Vec::new(),
            duration: None,
            due: None,
        }
    }

    pub fn in_section(mut self, section_id: impl Into<String>) -> Self {
        self.section_id = Some(section_id.into());
        self
    }

    pub fn completed(mut self, at: impl Into<String>) -> Self {
        self.completed_at = Some(at.into());
        self
    }

    pub fn with_labels(mut self, labels: &[&str]) -> Self {
        self.labels = labels.iter().map(|l| l.to_string()).collect();
        self
    }

    pub fn is_completed(&self) -> bool {
        self.completed_at.as_deref().is_some_and(|s| !s.is_empty())
    }
}

/// Estimated task duration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Duration {
    pub amount: u32,
    /// `minute` or `day`
    pub unit: String,
}

/// Due-date descriptor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Due {
    /// `YYYY-MM-DD`, or a full datetime for timed dues in older payloads
    pub date: String,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub datetime: Option<String>,
    #[serde(default)]
    pub is_recurring: bool,
    /// The natural-language form the user typed (`every monday`)
    #[serde(default)]
    pub string: String,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub timezone: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub lang: Option<String>,
}

/// How a due date is expressed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DueKind {
    /// A calendar date with no time component
    Date,
    /// A specific point in time
    DateTime,
    /// A repeating schedule described by `Due::string`
    Recurring,
}

impl Due {
    pub fn on(date: impl Into<String>) -> Self {
        Due {
            date: date.into(),
            datetime: None,
            is_recurring: false,
            string: String::new(),
            timezone: None,
            lang: None,
        }
    }

    pub fn kind(&self) -> DueKind {
        if self.is_recurring {
            DueKind::Recurring
        } else if self.datetime.is_some() || self.date.contains('T') {
            DueKind::DateTime
        } else {
            DueKind::Date
        }
    }

    /// The calendar date of the (next) occurrence, if parseable
    pub fn naive_date(&self) -> Option<NaiveDate> {
        let head = self.date.get(..10)?;
        NaiveDate::parse_from_str(head, "%Y-%m-%d").ok()
    }

    /// The exact time of a timed due, ignoring any trailing `Z` or offset
    pub fn naive_datetime(&self) -> Option<NaiveDateTime> {
        let raw = self.datetime.as_deref().unwrap_or(&self.date);
        let head = raw.get(..19)?;
        NaiveDateTime::parse_from_str(head, "%Y-%m-%dT%H:%M:%S").ok()
    }
}

/// A due date as typed on the command line.
///
/// Exactly one form is ever sent when creating a task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DueInput {
    /// `YYYY-MM-DD`
    Date(NaiveDate),
    /// `YYYY-MM-DD[T ]HH:MM[:SS]`
    DateTime(NaiveDateTime),
    /// Anything else, left to the server's natural-language parser
    Natural { string: String, lang: String },
}

const DATETIME_INPUT_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
];

impl DueInput {
    /// Classify user input. Blank input means no due date.
    pub fn parse(input: &str) -> Option<DueInput> {
        let input = input.trim();
        if input.is_empty() {
            return None;
        }
        if let Ok(date) = NaiveDate::parse_from_str(input, "%Y-%m-%d") {
            return Some(DueInput::Date(date));
        }
        for format in DATETIME_INPUT_FORMATS {
            if let Ok(datetime) = NaiveDateTime::parse_from_str(input, format) {
                return Some(DueInput::DateTime(datetime));
            }
        }
        Some(DueInput::Natural {
            string: input.to_string(),
            lang: "en".to_string(),
        })
    }
}
