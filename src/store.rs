// Generic collection store over a key-value provider

use crate::clock::{Clock, SystemClock};
use crate::models::{Course, Note, ScheduleDay, Task, UserProfile};
use crate::provider::{Provider, validate_key};
use crate::record::Record;
use chrono::{DateTime, Duration, Utc};
use eyre::{Context, Result, eyre};
use serde::Deserialize;
use tracing::{debug, info, warn};

pub const DEFAULT_KEY_PREFIX: &str = "dashboard_";

/// Tunables for a `Store`
#[derive(Debug, Clone)]
pub struct StoreOptions {
    /// Prepended to the collection name to form the provider key
    pub key_prefix: String,
    /// Completed tasks older than this are removed by `sweep_tasks`
    pub sweep_after: Duration,
    /// Run `sweep_tasks` once from `open`
    pub sweep_on_open: bool,
}

impl Default for StoreOptions {
    fn default() -> Self {
        Self {
            key_prefix: DEFAULT_KEY_PREFIX.to_string(),
            sweep_after: Duration::hours(24),
            sweep_on_open: true,
        }
    }
}

/// Stored value shape. Older dashboards wrote singletons as a bare object.
#[derive(Deserialize)]
#[serde(untagged)]
enum Stored<T> {
    Many(Vec<T>),
    One(T),
}

impl StoreOptions {
    /// Reject a prefix that cannot form a key and a non-positive sweep window
    pub fn validate(&self) -> Result<()> {
        if !self.key_prefix.is_empty() {
            validate_key(&self.key_prefix).wrap_err("Invalid key prefix")?;
        }
        if self.sweep_after <= Duration::zero() {
            return Err(eyre!("Sweep window must be positive, got {}", self.sweep_after));
        }
        Ok(())
    }
}

/// Persisted mapping from collection name to an ordered sequence of records
pub struct Store<P: Provider> {
    provider: P,
    clock: Box<dyn Clock>,
    options: StoreOptions,
}

impl<P: Provider> Store<P> {
    /// Wrap a provider with default options and the system clock. Does not sweep.
    pub fn new(provider: P) -> Self {
        Self {
            provider,
            clock: Box::new(SystemClock),
            options: StoreOptions::default(),
        }
    }

    /// Open a store with the system clock, sweeping expired tasks if configured
    pub fn open(provider: P, options: StoreOptions) -> Result<Self> {
        Self::open_with_clock(provider, options, SystemClock)
    }

    pub fn open_with_clock(provider: P, options: StoreOptions, clock: impl Clock + 'static) -> Result<Self> {
        options.validate()?;

        let mut store = Self {
            provider,
            clock: Box::new(clock),
            options,
        };

        if store.options.sweep_on_open {
            let removed = store.sweep_tasks()?;
            if removed > 0 {
                info!(removed, "Swept expired tasks on open");
            }
        }

        Ok(store)
    }

    /// Replace the clock, e.g. with a `ManualClock` in tests
    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    pub fn options(&self) -> &StoreOptions {
        &self.options
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    fn key<T: Record>(&self) -> String {
        format!("{}{}", self.options.key_prefix, T::collection_name())
    }

    // ========================================================================
    // Generic collection API
    // ========================================================================

    /// All records of a collection, or its seed when nothing usable is stored
    pub fn list<T: Record>(&self) -> Result<Vec<T>> {
        let key = self.key::<T>();
        let raw = self.provider.get(&key).wrap_err_with(|| format!("Failed to read {}", key))?;

        let Some(raw) = raw else {
            debug!(collection = T::collection_name(), "list: nothing stored, using seed");
            return Ok(T::seed());
        };

        match serde_json::from_str::<Stored<T>>(&raw) {
            Ok(Stored::Many(records)) => Ok(records),
            Ok(Stored::One(record)) => {
                debug!(collection = T::collection_name(), "list: single stored object");
                Ok(vec![record])
            }
            Err(e) => {
                warn!(
                    collection = T::collection_name(),
                    key = %key,
                    error = %e,
                    "Stored value is malformed, using seed"
                );
                Ok(T::seed())
            }
        }
    }

    /// Overwrite a collection with a single provider write
    pub fn replace<T: Record>(&mut self, records: &[T]) -> Result<()> {
        let key = self.key::<T>();
        let json = serde_json::to_string(records)
            .wrap_err_with(|| format!("Failed to serialize {}", T::collection_name()))?;

        self.provider
            .set(&key, &json)
            .wrap_err_with(|| format!("Failed to write {}", key))?;

        debug!(collection = T::collection_name(), count = records.len(), "replace: persisted");
        Ok(())
    }

    /// Append a record
    pub fn add<T: Record>(&mut self, record: T) -> Result<()> {
        let mut records = self.list::<T>()?;
        records.push(record);
        self.replace(&records)
    }

    /// Replace the record at `index`. Returns false without writing if out of bounds.
    pub fn update_at<T: Record>(&mut self, index: usize, record: T) -> Result<bool> {
        self.modify_at(index, |slot: &mut T| *slot = record)
    }

    /// Remove the record at `index`. Returns false without writing if out of bounds.
    pub fn delete_at<T: Record>(&mut self, index: usize) -> Result<bool> {
        let mut records = self.list::<T>()?;
        if index >= records.len() {
            debug!(collection = T::collection_name(), index, "delete_at: out of bounds");
            return Ok(false);
        }
        records.remove(index);
        self.replace(&records)?;
        Ok(true)
    }

    /// Apply `f` to the record at `index` and persist
    pub fn modify_at<T, F>(&mut self, index: usize, f: F) -> Result<bool>
    where
        T: Record,
        F: FnOnce(&mut T),
    {
        let mut records = self.list::<T>()?;
        let Some(slot) = records.get_mut(index) else {
            debug!(collection = T::collection_name(), index, "modify_at: out of bounds");
            return Ok(false);
        };
        f(slot);
        self.replace(&records)?;
        Ok(true)
    }

    // ========================================================================
    // Tasks
    // ========================================================================

    /// Mark the task at `index` completed now
    pub fn complete_task(&mut self, index: usize) -> Result<bool> {
        let now = self.now();
        self.modify_at(index, |task: &mut Task| task.complete(now))
    }

    /// Change a task's details, keeping its completion state
    pub fn edit_task(
        &mut self,
        index: usize,
        title: &str,
        course: &str,
        deadline: DateTime<Utc>,
        description: &str,
    ) -> Result<bool> {
        self.modify_at(index, |task: &mut Task| {
            task.title = title.to_string();
            task.course = course.to_string();
            task.deadline = deadline;
            task.description = description.to_string();
        })
    }

    /// Remove tasks completed longer ago than `sweep_after`.
    /// Writes only when something was removed. Returns the number removed.
    pub fn sweep_tasks(&mut self) -> Result<usize> {
        let now = self.now();
        let ttl = self.options.sweep_after;

        let tasks = self.list::<Task>()?;
        let before = tasks.len();
        let kept: Vec<Task> = tasks.into_iter().filter(|t| !t.is_expired(now, ttl)).collect();
        let removed = before - kept.len();

        if removed > 0 {
            self.replace(&kept)?;
            info!(removed, "Auto-removed completed tasks");
        }

        Ok(removed)
    }

    // ========================================================================
    // Notes
    // ========================================================================

    /// Add a note stamped with the current time
    pub fn add_note(&mut self, title: &str, content: &str) -> Result<()> {
        let note = Note::new(title, content, self.now());
        self.add(note)
    }

    /// Change a note's title and content, keeping created_at
    pub fn edit_note(&mut self, index: usize, title: &str, content: &str) -> Result<bool> {
        self.modify_at(index, |note: &mut Note| {
            note.title = title.to_string();
            note.content = content.to_string();
        })
    }

    // ========================================================================
    // Schedule
    // ========================================================================

    fn modify_day<F>(&mut self, day_id: u32, f: F) -> Result<bool>
    where
        F: FnOnce(&mut ScheduleDay) -> bool,
    {
        let mut days = self.list::<ScheduleDay>()?;
        let Some(day) = days.iter_mut().find(|d| d.id == day_id) else {
            debug!(day_id, "schedule: unknown day");
            return Ok(false);
        };
        if !f(day) {
            return Ok(false);
        }
        self.replace(&days)?;
        Ok(true)
    }

    pub fn add_course(&mut self, day_id: u32, course: Course) -> Result<bool> {
        self.modify_day(day_id, |day| {
            day.add_course(course);
            true
        })
    }

    pub fn update_course(&mut self, day_id: u32, course_index: usize, course: Course) -> Result<bool> {
        self.modify_day(day_id, |day| day.update_course(course_index, course))
    }

    pub fn delete_course(&mut self, day_id: u32, course_index: usize) -> Result<bool> {
        self.modify_day(day_id, |day| day.delete_course(course_index))
    }

    // ========================================================================
    // Profile
    // ========================================================================

    pub fn profile(&self) -> Result<Option<UserProfile>> {
        Ok(self.list::<UserProfile>()?.into_iter().next())
    }

    pub fn set_profile(&mut self, profile: UserProfile) -> Result<()> {
        self.replace(&[profile])
    }
}
