// Read-only dashboard summaries

use crate::models::{CalendarEvent, Note, ScheduleDay, Task};
use crate::provider::Provider;
use crate::store::Store;
use chrono::{DateTime, Datelike, Utc, Weekday};
use eyre::Result;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchedulePreview {
    Today { weekday: Weekday, courses: usize },
    NoClasses { weekday: Weekday },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TasksPreview {
    NoTasks,
    NextDeadline { course: String, hours: i64 },
    Completed { done: usize, total: usize },
    NoneCompleted { total: usize },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CalendarPreview {
    NoEvents,
    NextEvent { title: String, hours: i64 },
    Count(usize),
}

/// The four dashboard cards
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dashboard {
    pub schedule: SchedulePreview,
    pub tasks: TasksPreview,
    pub notes: usize,
    pub calendar: CalendarPreview,
}

impl fmt::Display for SchedulePreview {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SchedulePreview::Today { weekday, courses } => write!(f, "{}: {} course(s)", weekday, courses),
            SchedulePreview::NoClasses { weekday } => write!(f, "{}: no classes", weekday),
        }
    }
}

impl fmt::Display for TasksPreview {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TasksPreview::NoTasks => write!(f, "no tasks"),
            TasksPreview::NextDeadline { course, hours } => write!(f, "deadline: {} ({}h)", course, hours),
            TasksPreview::Completed { done, total } => write!(f, "{}/{} tasks completed", done, total),
            TasksPreview::NoneCompleted { total } => write!(f, "{} tasks (none completed)", total),
        }
    }
}

impl fmt::Display for CalendarPreview {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CalendarPreview::NoEvents => write!(f, "no events"),
            CalendarPreview::NextEvent { title, hours } => write!(f, "{} ({}h)", title, hours),
            CalendarPreview::Count(n) => write!(f, "{} event(s)", n),
        }
    }
}

pub fn schedule_preview(days: &[ScheduleDay], now: DateTime<Utc>) -> SchedulePreview {
    let weekday = now.weekday();
    match days.iter().find(|d| d.weekday() == Some(weekday)) {
        Some(day) if !day.courses.is_empty() => SchedulePreview::Today {
            weekday,
            courses: day.courses.len(),
        },
        _ => SchedulePreview::NoClasses { weekday },
    }
}

pub fn tasks_preview(tasks: &[Task], now: DateTime<Utc>) -> TasksPreview {
    if tasks.is_empty() {
        return TasksPreview::NoTasks;
    }

    let next = tasks
        .iter()
        .filter(|t| !t.completed && t.deadline > now)
        .min_by_key(|t| t.deadline);

    if let Some(task) = next {
        return TasksPreview::NextDeadline {
            course: task.course.clone(),
            hours: (task.deadline - now).num_hours(),
        };
    }

    let done = tasks.iter().filter(|t| t.completed).count();
    if done > 0 {
        TasksPreview::Completed {
            done,
            total: tasks.len(),
        }
    } else {
        TasksPreview::NoneCompleted { total: tasks.len() }
    }
}

pub fn calendar_preview(events: &[CalendarEvent], now: DateTime<Utc>) -> CalendarPreview {
    if events.is_empty() {
        return CalendarPreview::NoEvents;
    }

    match events.iter().filter(|e| e.date > now).min_by_key(|e| e.date) {
        Some(event) => CalendarPreview::NextEvent {
            title: event.title.clone(),
            hours: (event.date - now).num_hours(),
        },
        None => CalendarPreview::Count(events.len()),
    }
}

/// Events ordered by date, earliest first. Indices into the stored
/// collection are returned alongside so callers can edit or delete.
pub fn events_by_date(events: Vec<CalendarEvent>) -> Vec<(usize, CalendarEvent)> {
    let mut indexed: Vec<(usize, CalendarEvent)> = events.into_iter().enumerate().collect();
    indexed.sort_by_key(|(_, e)| e.date);
    indexed
}

impl<P: Provider> Store<P> {
    /// Summaries for the dashboard at the store's current time
    pub fn dashboard(&self) -> Result<Dashboard> {
        let now = self.now();
        Ok(Dashboard {
            schedule: schedule_preview(&self.list::<ScheduleDay>()?, now),
            tasks: tasks_preview(&self.list::<Task>()?, now),
            notes: self.list::<Note>()?.len(),
            calendar: calendar_preview(&self.list::<CalendarEvent>()?, now),
        })
    }

    /// Stored events sorted by date, with their stored indices
    pub fn upcoming_events(&self) -> Result<Vec<(usize, CalendarEvent)>> {
        Ok(events_by_date(self.list::<CalendarEvent>()?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::models::{Course, EventKind};
    use crate::provider::MemoryProvider;
    use crate::record::Record;
    use chrono::{Duration, TimeZone};

    // Monday
    fn monday() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 10, 8, 0, 0).unwrap()
    }

    #[test]
    fn test_schedule_preview() {
        let mut days = ScheduleDay::seed();
        assert_eq!(
            schedule_preview(&days, monday()),
            SchedulePreview::NoClasses { weekday: Weekday::Mon }
        );

        days[0].add_course(Course::new("Algorithms", "08:00-10:00", "A1"));
        assert_eq!(
            schedule_preview(&days, monday()),
            SchedulePreview::Today {
                weekday: Weekday::Mon,
                courses: 1
            }
        );

        let saturday = monday() + Duration::days(5);
        assert_eq!(
            schedule_preview(&days, saturday),
            SchedulePreview::NoClasses { weekday: Weekday::Sat }
        );
    }

    #[test]
    fn test_tasks_preview_next_deadline() {
        let now = monday();
        let tasks = vec![
            Task::new("Late", "CS100", now - Duration::hours(1), ""),
            Task::new("Far", "CS200", now + Duration::hours(48), ""),
            Task::new("Near", "CS300", now + Duration::hours(5), ""),
        ];
        assert_eq!(
            tasks_preview(&tasks, now),
            TasksPreview::NextDeadline {
                course: "CS300".to_string(),
                hours: 5
            }
        );
    }

    #[test]
    fn test_tasks_preview_fallbacks() {
        let now = monday();
        assert_eq!(tasks_preview(&[], now), TasksPreview::NoTasks);

        let mut done = Task::new("Done", "CS", now + Duration::hours(3), "");
        done.complete(now);
        let overdue = Task::new("Overdue", "CS", now - Duration::hours(3), "");

        assert_eq!(
            tasks_preview(&[done, overdue.clone()], now),
            TasksPreview::Completed { done: 1, total: 2 }
        );
        assert_eq!(tasks_preview(&[overdue], now), TasksPreview::NoneCompleted { total: 1 });
    }

    #[test]
    fn test_calendar_preview() {
        let now = monday();
        assert_eq!(calendar_preview(&[], now), CalendarPreview::NoEvents);

        let past = CalendarEvent::new("Old", EventKind::Other, now - Duration::days(1));
        assert_eq!(calendar_preview(&[past.clone()], now), CalendarPreview::Count(1));

        let soon = CalendarEvent::new("UTS", EventKind::Exam, now + Duration::hours(30));
        let later = CalendarEvent::new("UAS", EventKind::Exam, now + Duration::days(30));
        assert_eq!(
            calendar_preview(&[later, past, soon], now),
            CalendarPreview::NextEvent {
                title: "UTS".to_string(),
                hours: 30
            }
        );
    }

    #[test]
    fn test_events_by_date_keeps_indices() {
        let now = monday();
        let events = vec![
            CalendarEvent::new("C", EventKind::Other, now + Duration::days(3)),
            CalendarEvent::new("A", EventKind::Other, now + Duration::days(1)),
            CalendarEvent::new("B", EventKind::Other, now + Duration::days(2)),
        ];
        let sorted = events_by_date(events);
        let order: Vec<(usize, &str)> = sorted.iter().map(|(i, e)| (*i, e.title.as_str())).collect();
        assert_eq!(order, vec![(1, "A"), (2, "B"), (0, "C")]);
    }

    #[test]
    fn test_store_dashboard() {
        let clock = ManualClock::new(monday());
        let mut store = Store::new(MemoryProvider::new()).with_clock(clock);
        store.add_course(1, Course::new("Algorithms", "08:00-10:00", "A1")).unwrap();
        store.add(Task::new("Essay", "CS101", monday() + Duration::hours(10), "")).unwrap();
        store.add_note("Ideas", "...").unwrap();

        let dashboard = store.dashboard().unwrap();
        assert_eq!(dashboard.schedule.to_string(), "Mon: 1 course(s)");
        assert_eq!(dashboard.tasks.to_string(), "deadline: CS101 (10h)");
        assert_eq!(dashboard.notes, 1);
        assert_eq!(dashboard.calendar, CalendarPreview::NoEvents);
    }
}
