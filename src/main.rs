use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use colored::Colorize;
use dashstore::{
    Backend, CalendarEvent, Config, Course, EventKind, Note, Provider, ScheduleDay, Store, Task, TaskStatus, UserProfile,
    parse_timestamp,
};
use eyre::{Result, eyre};
use std::path::PathBuf;
use std::thread;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::EnvFilter;

type AppStore = Store<Box<dyn Provider>>;

#[derive(Parser)]
#[command(name = "dashstore")]
#[command(about = "Schedule, tasks, notes and calendar for a student dashboard")]
#[command(version = env!("GIT_DESCRIBE"))]
struct Cli {
    /// Path to the config file (default: <config dir>/dashstore/config.yaml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Persistence backend, overrides the config file
    #[arg(short, long, value_enum)]
    backend: Option<Backend>,

    /// Data directory, overrides the config file
    #[arg(short, long)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Coursework tasks
    Task {
        #[command(subcommand)]
        action: TaskCmd,
    },

    /// Notes
    Note {
        #[command(subcommand)]
        action: NoteCmd,
    },

    /// Calendar events
    Event {
        #[command(subcommand)]
        action: EventCmd,
    },

    /// Weekly class schedule
    Schedule {
        #[command(subcommand)]
        action: ScheduleCmd,
    },

    /// User profile
    Profile {
        #[command(subcommand)]
        action: ProfileCmd,
    },

    /// Show the dashboard summary
    Dashboard,
}

#[derive(Subcommand)]
enum TaskCmd {
    List,
    Add {
        title: String,
        course: String,
        #[arg(value_parser = parse_time)]
        deadline: DateTime<Utc>,
        #[arg(default_value = "")]
        description: String,
    },
    Edit {
        index: usize,
        title: String,
        course: String,
        #[arg(value_parser = parse_time)]
        deadline: DateTime<Utc>,
        #[arg(default_value = "")]
        description: String,
    },
    /// Mark a task completed
    Done { index: usize },
    Rm { index: usize },
    /// Remove tasks completed more than the configured window ago
    Sweep {
        /// Keep running, sweeping every N seconds
        #[arg(long)]
        every: Option<u64>,
    },
}

#[derive(Subcommand)]
enum NoteCmd {
    List,
    Add { title: String, content: String },
    Edit { index: usize, title: String, content: String },
    Rm { index: usize },
}

#[derive(Subcommand)]
enum EventCmd {
    List,
    Add {
        title: String,
        #[arg(value_parser = parse_time)]
        date: DateTime<Utc>,
        /// exam, assignment, holiday or other
        #[arg(short, long, default_value = "other", value_parser = parse_kind)]
        kind: EventKind,
    },
    Edit {
        index: usize,
        title: String,
        #[arg(value_parser = parse_time)]
        date: DateTime<Utc>,
        #[arg(short, long, default_value = "other", value_parser = parse_kind)]
        kind: EventKind,
    },
    Rm { index: usize },
}

#[derive(Subcommand)]
enum ScheduleCmd {
    List,
    Add {
        day_id: u32,
        name: String,
        time: String,
        room: String,
    },
    Edit {
        day_id: u32,
        index: usize,
        name: String,
        time: String,
        room: String,
    },
    Rm { day_id: u32, index: usize },
}

#[derive(Subcommand)]
enum ProfileCmd {
    Show,
    Set {
        name: String,
        student_id: String,
        program: String,
    },
}

fn parse_time(s: &str) -> Result<DateTime<Utc>, String> {
    parse_timestamp(s).map_err(|e| e.to_string())
}

fn parse_kind(s: &str) -> Result<EventKind, String> {
    s.parse().map_err(|e: eyre::Report| e.to_string())
}

fn main() -> Result<()> {
    // Setup tracing, stderr only so listings stay clean
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(backend) = cli.backend {
        config.backend = backend;
    }
    if let Some(data_dir) = cli.data_dir {
        config.data_dir = data_dir;
    }
    info!(backend = ?config.backend, data_dir = %config.data_dir.display(), "Opening store");

    let mut store = Store::open(config.open_provider()?, config.store_options()?)?;

    match cli.command {
        Commands::Task { action } => run_task(&mut store, action),
        Commands::Note { action } => run_note(&mut store, action),
        Commands::Event { action } => run_event(&mut store, action),
        Commands::Schedule { action } => run_schedule(&mut store, action),
        Commands::Profile { action } => run_profile(&mut store, action),
        Commands::Dashboard => run_dashboard(&store),
    }
}

fn check(found: bool, what: &str) -> Result<()> {
    if found {
        println!("{}", "OK".green());
        Ok(())
    } else {
        Err(eyre!("No such {}", what))
    }
}

fn fmt_time(t: DateTime<Utc>) -> String {
    t.format("%Y-%m-%d %H:%M").to_string()
}

fn run_task(store: &mut AppStore, action: TaskCmd) -> Result<()> {
    match action {
        TaskCmd::List => {
            let now = store.now();
            let tasks = store.list::<Task>()?;
            if tasks.is_empty() {
                println!("{}", "No tasks".dimmed());
            }
            for (i, task) in tasks.iter().enumerate() {
                let status = match task.status(now) {
                    TaskStatus::Done { at: Some(at) } => format!("done {}", fmt_time(at)).green(),
                    TaskStatus::Done { at: None } => "done".green(),
                    TaskStatus::Overdue => "overdue".red(),
                    TaskStatus::Pending { hours_left } => format!("{}h left", hours_left).yellow(),
                };
                let title = if task.completed {
                    task.title.strikethrough()
                } else {
                    task.title.bold()
                };
                println!("[{}] {} ({}) due {} - {}", i, title, task.course, fmt_time(task.deadline), status);
                if !task.description.is_empty() {
                    println!("    {}", task.description);
                }
            }
            Ok(())
        }
        TaskCmd::Add {
            title,
            course,
            deadline,
            description,
        } => {
            store.add(Task::new(title, course, deadline, description))?;
            check(true, "task")
        }
        TaskCmd::Edit {
            index,
            title,
            course,
            deadline,
            description,
        } => check(store.edit_task(index, &title, &course, deadline, &description)?, "task"),
        TaskCmd::Done { index } => check(store.complete_task(index)?, "task"),
        TaskCmd::Rm { index } => check(store.delete_at::<Task>(index)?, "task"),
        TaskCmd::Sweep { every } => loop {
            let removed = store.sweep_tasks()?;
            println!("Removed {} completed task(s)", removed);
            match every {
                Some(secs) => thread::sleep(Duration::from_secs(secs.max(1))),
                None => return Ok(()),
            }
        },
    }
}

fn run_note(store: &mut AppStore, action: NoteCmd) -> Result<()> {
    match action {
        NoteCmd::List => {
            let notes = store.list::<Note>()?;
            if notes.is_empty() {
                println!("{}", "No notes".dimmed());
            }
            for (i, note) in notes.iter().enumerate() {
                println!("[{}] {} {}", i, note.title.bold(), fmt_time(note.created_at).dimmed());
                println!("    {}", note.preview(50));
            }
            Ok(())
        }
        NoteCmd::Add { title, content } => {
            store.add_note(&title, &content)?;
            check(true, "note")
        }
        NoteCmd::Edit { index, title, content } => check(store.edit_note(index, &title, &content)?, "note"),
        NoteCmd::Rm { index } => check(store.delete_at::<Note>(index)?, "note"),
    }
}

fn run_event(store: &mut AppStore, action: EventCmd) -> Result<()> {
    match action {
        EventCmd::List => {
            let now = store.now();
            let events = store.upcoming_events()?;
            if events.is_empty() {
                println!("{}", "No events".dimmed());
            }
            for (i, event) in events {
                let status = event.time_until(now).to_string();
                let status = if event.is_past(now) { status.dimmed() } else { status.cyan() };
                println!(
                    "[{}] {} [{}] {} - {}",
                    i,
                    event.title.bold(),
                    event.kind,
                    fmt_time(event.date),
                    status
                );
            }
            Ok(())
        }
        EventCmd::Add { title, date, kind } => {
            store.add(CalendarEvent::new(title, kind, date))?;
            check(true, "event")
        }
        EventCmd::Edit {
            index,
            title,
            date,
            kind,
        } => check(store.update_at(index, CalendarEvent::new(title, kind, date))?, "event"),
        EventCmd::Rm { index } => check(store.delete_at::<CalendarEvent>(index)?, "event"),
    }
}

fn run_schedule(store: &mut AppStore, action: ScheduleCmd) -> Result<()> {
    match action {
        ScheduleCmd::List => {
            for day in store.list::<ScheduleDay>()? {
                println!("{} {}", format!("({})", day.id).dimmed(), day.day.bold());
                if day.courses.is_empty() {
                    println!("    {}", "no classes".dimmed());
                }
                for (i, course) in day.courses.iter().enumerate() {
                    println!("    [{}] {} {} @ {}", i, course.time, course.name, course.room);
                }
            }
            Ok(())
        }
        ScheduleCmd::Add {
            day_id,
            name,
            time,
            room,
        } => check(store.add_course(day_id, Course::new(name, time, room))?, "day"),
        ScheduleCmd::Edit {
            day_id,
            index,
            name,
            time,
            room,
        } => check(
            store.update_course(day_id, index, Course::new(name, time, room))?,
            "course",
        ),
        ScheduleCmd::Rm { day_id, index } => check(store.delete_course(day_id, index)?, "course"),
    }
}

fn run_profile(store: &mut AppStore, action: ProfileCmd) -> Result<()> {
    match action {
        ProfileCmd::Show => {
            match store.profile()? {
                Some(p) => {
                    let initial = p.initial().map(String::from).unwrap_or_default();
                    println!("{} {}", format!("[{}]", initial).bold(), p.name);
                    println!("    {} - {}", p.student_id, p.program);
                }
                None => println!("{}", "No profile set".dimmed()),
            }
            Ok(())
        }
        ProfileCmd::Set {
            name,
            student_id,
            program,
        } => {
            store.set_profile(UserProfile {
                name,
                student_id,
                program,
            })?;
            check(true, "profile")
        }
    }
}

fn run_dashboard(store: &AppStore) -> Result<()> {
    let dashboard = store.dashboard()?;
    if let Some(profile) = store.profile()? {
        println!("{}\n", profile.name.bold());
    }
    println!("{:<10} {}", "Schedule".cyan(), dashboard.schedule);
    println!("{:<10} {}", "Tasks".cyan(), dashboard.tasks);
    println!("{:<10} total notes: {}", "Notes".cyan(), dashboard.notes);
    println!("{:<10} {}", "Calendar".cyan(), dashboard.calendar);
    Ok(())
}
