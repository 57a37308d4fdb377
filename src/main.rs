use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use std::error::Error;
use std::io::{self, Write};
use std::path::PathBuf;

mod export;
mod internal_error;
mod schedule;
mod store;
mod tasks;
mod timer;
mod views;

use internal_error::InternalResult;
use store::{SqliteBackend, Store};
use tasks::data::Priority;
use tasks::repo::StudyData;
use tasks::sync::{DailyTaskUpdate, WeeklyTaskUpdate};

#[derive(Parser)]
#[command(name = "studytrack", about = "Personal study-progress tracker")]
struct Cli {
    /// Store location.
    #[arg(long, default_value = "studytrack.db")]
    db: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Objective progress overview.
    Dashboard,
    /// Weekly planner.
    Weekly {
        #[command(subcommand)]
        command: WeeklyCommand,
    },
    /// Today's task list.
    Daily {
        #[command(subcommand)]
        command: DailyCommand,
    },
    /// Interactive pomodoro countdown.
    Timer {
        /// Objective completed sessions are logged against.
        #[arg(long)]
        objective: Option<String>,
        /// Work interval in minutes (1-120).
        #[arg(long, default_value_t = timer::DEFAULT_WORK_MINUTES)]
        work: u32,
        /// Break interval in minutes (1-60).
        #[arg(long = "break", default_value_t = timer::DEFAULT_BREAK_MINUTES)]
        break_minutes: u32,
    },
    /// Write progress to a file.
    Export {
        #[command(subcommand)]
        command: ExportCommand,
    },
    /// Toggle colored output.
    Color {
        #[arg(value_enum)]
        mode: ColorMode,
    },
}

#[derive(Subcommand)]
enum WeeklyCommand {
    List,
    Add {
        #[arg(long)]
        objective: String,
        #[arg(long)]
        title: String,
        #[arg(long, default_value = "")]
        description: String,
        /// Due date, YYYY-MM-DD.
        #[arg(long)]
        due: NaiveDate,
        #[arg(long, value_enum, default_value_t = Priority::Medium)]
        priority: Priority,
    },
    Toggle {
        id: String,
    },
    Edit {
        id: String,
        #[arg(long)]
        objective: Option<String>,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        due: Option<NaiveDate>,
        #[arg(long, value_enum)]
        priority: Option<Priority>,
    },
    Delete {
        id: String,
        /// Skip the confirmation prompt.
        #[arg(long)]
        yes: bool,
    },
    /// Populate the weekly planner with the fixed exam-prep schedule.
    SeedExamPrep,
}

#[derive(Subcommand)]
enum DailyCommand {
    List,
    Add {
        #[arg(long)]
        objective: String,
        #[arg(long)]
        title: String,
    },
    Toggle {
        id: String,
    },
    Edit {
        id: String,
        #[arg(long)]
        objective: Option<String>,
        #[arg(long)]
        title: Option<String>,
    },
    Delete {
        id: String,
        #[arg(long)]
        yes: bool,
    },
    /// Add minutes spent to a task.
    LogTime {
        id: String,
        minutes: u32,
    },
}

#[derive(Subcommand)]
enum ExportCommand {
    /// Tabular export, one row per record.
    Csv {
        #[arg(long, default_value = ".")]
        dir: PathBuf,
    },
    /// Printable HTML report.
    Report {
        #[arg(long, default_value = ".")]
        dir: PathBuf,
    },
}

#[derive(ValueEnum, Clone, Copy, PartialEq, Eq)]
enum ColorMode {
    On,
    Off,
}

fn confirm(prompt: &str) -> InternalResult<bool> {
    print!("{} [y/N] ", prompt);
    io::stdout().flush()?;

    let mut line = String::new();
    io::stdin().read_line(&mut line)?;

    Ok(matches!(line.trim(), "y" | "Y" | "yes"))
}

fn run_weekly(data: &mut StudyData, command: WeeklyCommand) -> InternalResult<()> {
    match command {
        WeeklyCommand::List => {
            print!(
                "{}",
                views::weekly_list(&data.objectives, &data.weekly_tasks, data.color_output())
            );
        }
        WeeklyCommand::Add {
            objective,
            title,
            description,
            due,
            priority,
        } => {
            let id = data.add_weekly_task(&objective, &title, &description, due, priority)?;
            println!("added weekly task {}", id);
        }
        WeeklyCommand::Toggle { id } => data.toggle_weekly_task(&id)?,
        WeeklyCommand::Edit {
            id,
            objective,
            title,
            description,
            due,
            priority,
        } => {
            let updates = WeeklyTaskUpdate {
                objective_id: objective,
                title,
                description,
                completed: None,
                due_date: due,
                priority,
            };
            data.update_weekly_task(&id, &updates)?;
        }
        WeeklyCommand::Delete { id, yes } => {
            if yes || confirm(&format!("delete weekly task {} and its daily mirror?", id))? {
                data.delete_weekly_task(&id)?;
            }
        }
        WeeklyCommand::SeedExamPrep => {
            let added = data.add_weekly_tasks(schedule::exam_prep_tasks()?)?;
            println!("added {} scheduled tasks", added);
        }
    }

    Ok(())
}

fn run_daily(data: &mut StudyData, command: DailyCommand) -> InternalResult<()> {
    match command {
        DailyCommand::List => {
            print!(
                "{}",
                views::daily_list(&data.objectives, &data.daily_tasks, data.color_output())
            );
        }
        DailyCommand::Add { objective, title } => {
            let id = data.add_daily_task(&objective, &title)?;
            println!("added daily task {}", id);
        }
        DailyCommand::Toggle { id } => data.toggle_daily_task(&id)?,
        DailyCommand::Edit {
            id,
            objective,
            title,
        } => {
            let updates = DailyTaskUpdate {
                objective_id: objective,
                title,
            };
            data.update_daily_task(&id, &updates)?;
        }
        DailyCommand::Delete { id, yes } => {
            let linked = data
                .daily_tasks
                .iter()
                .any(|t| t.id == id && t.weekly_task_id.is_some());
            let prompt = if linked {
                format!("delete daily task {} and its weekly parent?", id)
            } else {
                format!("delete daily task {}?", id)
            };

            if yes || confirm(&prompt)? {
                data.delete_daily_task(&id)?;
            }
        }
        DailyCommand::LogTime { id, minutes } => data.log_time(&id, minutes)?,
    }

    Ok(())
}

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    let backend = SqliteBackend::open(&cli.db)?;
    let mut store = Store::new(Box::new(backend));
    store.subscribe(|key| debug!(key, "collection written"));

    let mut data = StudyData::load(store)?;

    match cli.command {
        Command::Dashboard => {
            print!(
                "{}",
                views::dashboard(&data.objectives, &data.sessions, data.color_output())
            );
        }
        Command::Weekly { command } => run_weekly(&mut data, command)?,
        Command::Daily { command } => run_daily(&mut data, command)?,
        Command::Timer {
            objective,
            work,
            break_minutes,
        } => timer::run(&mut data, objective, work, break_minutes)?,
        Command::Export { command } => {
            let path = match command {
                ExportCommand::Csv { dir } => {
                    export::export_csv(&data.objectives, &data.weekly_tasks, &data.daily_tasks, &dir)?
                }
                ExportCommand::Report { dir } => export::export_report(
                    &data.objectives,
                    &data.weekly_tasks,
                    &data.daily_tasks,
                    &dir,
                )?,
            };
            println!("wrote {}", path.display());
        }
        Command::Color { mode } => data.set_color_output(mode == ColorMode::On)?,
    }

    Ok(())
}
