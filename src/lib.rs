// dashstore - Persisted collections for a personal student dashboard

pub mod clock;
pub mod config;
pub mod models;
pub mod preview;
pub mod provider;
pub mod record;
pub mod store;

// Re-export main types for convenience
pub use clock::{Clock, ManualClock, SystemClock, parse_timestamp};
pub use config::{Backend, Config};
pub use models::{CalendarEvent, Course, EventKind, Note, ScheduleDay, Task, TaskStatus, TimeStatus, UserProfile};
pub use preview::Dashboard;
pub use provider::{FileProvider, MemoryProvider, Provider, SqliteProvider};
pub use record::Record;
pub use store::{Store, StoreOptions};
