// Data models for the dashboard collections

use crate::record::Record;
use chrono::{DateTime, Duration, Utc, Weekday};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Coursework task with a deadline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub title: String,
    pub course: String,
    pub deadline: DateTime<Utc>,
    pub description: String,
    #[serde(default)]
    pub completed: bool,
    #[serde(default, alias = "completedDate", skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
}

impl Task {
    pub fn new(
        title: impl Into<String>,
        course: impl Into<String>,
        deadline: DateTime<Utc>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            course: course.into(),
            deadline,
            description: description.into(),
            completed: false,
            completed_at: None,
        }
    }

    /// Mark as done at `now`. completed_at is set iff completed.
    pub fn complete(&mut self, now: DateTime<Utc>) {
        self.completed = true;
        self.completed_at = Some(now);
    }

    /// Completed more than `ttl` before `now`
    pub fn is_expired(&self, now: DateTime<Utc>, ttl: Duration) -> bool {
        match (self.completed, self.completed_at) {
            (true, Some(at)) => now - at > ttl,
            _ => false,
        }
    }

    pub fn is_overdue(&self, now: DateTime<Utc>) -> bool {
        !self.completed && self.deadline < now
    }

    /// Display state, driven by `completed` alone
    pub fn status(&self, now: DateTime<Utc>) -> TaskStatus {
        if self.completed {
            TaskStatus::Done { at: self.completed_at }
        } else if self.is_overdue(now) {
            TaskStatus::Overdue
        } else {
            TaskStatus::Pending {
                hours_left: (self.deadline - now).num_hours(),
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskStatus {
    Done { at: Option<DateTime<Utc>> },
    Overdue,
    Pending { hours_left: i64 },
}

impl Record for Task {
    fn collection_name() -> &'static str {
        "tasks"
    }
}

/// Free-form note
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    pub title: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

impl Note {
    pub fn new(title: impl Into<String>, content: impl Into<String>, created_at: DateTime<Utc>) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
            created_at,
        }
    }

    /// First `len` characters, with "..." appended when truncated
    pub fn preview(&self, len: usize) -> String {
        if self.content.chars().count() > len {
            let head: String = self.content.chars().take(len).collect();
            format!("{}...", head)
        } else {
            self.content.clone()
        }
    }
}

impl Record for Note {
    fn collection_name() -> &'static str {
        "notes"
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    Exam,
    Assignment,
    Holiday,
    #[serde(other)]
    Other,
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventKind::Exam => write!(f, "exam"),
            EventKind::Assignment => write!(f, "assignment"),
            EventKind::Holiday => write!(f, "holiday"),
            EventKind::Other => write!(f, "other"),
        }
    }
}

impl std::str::FromStr for EventKind {
    type Err = eyre::Report;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "exam" => Ok(EventKind::Exam),
            "assignment" => Ok(EventKind::Assignment),
            "holiday" => Ok(EventKind::Holiday),
            "other" | "event" => Ok(EventKind::Other),
            _ => Err(eyre::eyre!(
                "Invalid event type: {} (expected exam, assignment, holiday or other)",
                s
            )),
        }
    }
}

/// Calendar entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalendarEvent {
    pub title: String,
    #[serde(rename = "type")]
    pub kind: EventKind,
    pub date: DateTime<Utc>,
}

/// Time left until an event, or that it has passed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeStatus {
    Past,
    Remaining { days: i64, hours: i64 },
}

impl fmt::Display for TimeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimeStatus::Past => write!(f, "passed"),
            TimeStatus::Remaining { days, hours } => write!(f, "{}d {}h left", days, hours),
        }
    }
}

impl CalendarEvent {
    pub fn new(title: impl Into<String>, kind: EventKind, date: DateTime<Utc>) -> Self {
        Self {
            title: title.into(),
            kind,
            date,
        }
    }

    pub fn is_past(&self, now: DateTime<Utc>) -> bool {
        self.date < now
    }

    pub fn time_until(&self, now: DateTime<Utc>) -> TimeStatus {
        let diff = self.date - now;
        if diff < Duration::zero() {
            return TimeStatus::Past;
        }
        TimeStatus::Remaining {
            days: diff.num_days(),
            hours: diff.num_hours() % 24,
        }
    }
}

impl Record for CalendarEvent {
    fn collection_name() -> &'static str {
        "events"
    }
}

/// One class slot within a day
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Course {
    pub name: String,
    /// Free text, e.g. "08:00-10:00"
    pub time: String,
    pub room: String,
}

impl Course {
    pub fn new(name: impl Into<String>, time: impl Into<String>, room: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            time: time.into(),
            room: room.into(),
        }
    }
}

/// A weekday and its courses. Days are seeded once and never added or removed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleDay {
    pub id: u32,
    pub day: String,
    #[serde(default)]
    pub courses: Vec<Course>,
}

const SEED_DAYS: [&str; 5] = ["Monday", "Tuesday", "Wednesday", "Thursday", "Friday"];

impl ScheduleDay {
    pub fn add_course(&mut self, course: Course) {
        self.courses.push(course);
    }

    pub fn update_course(&mut self, index: usize, course: Course) -> bool {
        match self.courses.get_mut(index) {
            Some(slot) => {
                *slot = course;
                true
            }
            None => false,
        }
    }

    pub fn delete_course(&mut self, index: usize) -> bool {
        if index < self.courses.len() {
            self.courses.remove(index);
            true
        } else {
            false
        }
    }

    /// Weekday named by `day`. Accepts English names and the Indonesian
    /// names older dashboards were seeded with.
    pub fn weekday(&self) -> Option<Weekday> {
        let name = self.day.trim();
        if let Ok(wd) = name.parse::<Weekday>() {
            return Some(wd);
        }
        match name.to_lowercase().as_str() {
            "senin" => Some(Weekday::Mon),
            "selasa" => Some(Weekday::Tue),
            "rabu" => Some(Weekday::Wed),
            "kamis" => Some(Weekday::Thu),
            "jumat" => Some(Weekday::Fri),
            "sabtu" => Some(Weekday::Sat),
            "minggu" => Some(Weekday::Sun),
            _ => None,
        }
    }
}

impl Record for ScheduleDay {
    fn collection_name() -> &'static str {
        "schedule"
    }

    fn seed() -> Vec<Self> {
        SEED_DAYS
            .iter()
            .zip(1..)
            .map(|(day, id)| ScheduleDay {
                id,
                day: day.to_string(),
                courses: Vec::new(),
            })
            .collect()
    }
}

/// Owner of the dashboard. Stored as the only element of its collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub name: String,
    #[serde(alias = "nim")]
    pub student_id: String,
    pub program: String,
}

impl UserProfile {
    pub fn initial(&self) -> Option<char> {
        self.name.chars().next().and_then(|c| c.to_uppercase().next())
    }
}

impl Record for UserProfile {
    fn collection_name() -> &'static str {
        "user"
    }
}
