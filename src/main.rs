/// Main entry point for the habit tracker CLI
///
/// This file sets up logging, parses command line arguments, opens the
/// database and dispatches the requested command.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::info;

use habit_tracker::{ensure_database_dir, AppError, GenerationConfig, HabitId, HabitTracker, ServiceError};

/// Get the default database path with robust fallback strategy
fn get_default_database_path() -> Result<PathBuf, AppError> {
    // Try various locations in order of preference
    let potential_paths = [
        dirs::home_dir().map(|mut p| {
            p.push(".habit_tracker");
            p
        }),
        dirs::data_dir().map(|mut p| {
            p.push("habit_tracker");
            p
        }),
        dirs::config_dir().map(|mut p| {
            p.push("habit_tracker");
            p
        }),
        std::env::current_dir().ok().map(|mut p| {
            p.push(".habit_tracker");
            p
        }),
    ];

    for potential_path in potential_paths.iter().flatten() {
        if std::fs::create_dir_all(potential_path).is_ok() {
            let test_file = potential_path.join(".test_write");
            if std::fs::write(&test_file, "test").is_ok() {
                let _ = std::fs::remove_file(&test_file);
                return Ok(potential_path.join("habits.db"));
            }
        }
    }

    let mut temp_path = std::env::temp_dir();
    temp_path.push("habit_tracker");
    std::fs::create_dir_all(&temp_path)?;
    temp_path.push("habits.db");

    tracing::warn!("Using temporary directory for database: {}", temp_path.display());
    Ok(temp_path)
}

/// Track daily habits, streaks and motivational insights
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the SQLite database file
    /// If not provided, uses a default location in the user's home directory
    #[arg(long, global = true)]
    database: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    debug: bool,

    /// Enable verbose output (implies debug)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create an account and sign in
    Register { email: String, password: String },
    /// Sign in to an existing account
    Login { email: String, password: String },
    /// Sign out
    Logout,
    /// Show the signed-in user
    Whoami,
    /// Add a new habit
    Add {
        name: String,
        #[arg(short, long, default_value = "General")]
        category: String,
    },
    /// List habits with today's status
    List,
    /// Delete a habit and its history
    Delete { habit_id: String },
    /// Mark a habit as done today
    Done { habit_id: String },
    /// Show today's progress and streaks
    Stats,
    /// Show motivational insights
    Insights {
        /// Ignore the cached insight
        #[arg(long)]
        refresh: bool,
    },
}

/// Print a short notice for a failed habit operation
fn report(action: &str, err: AppError) -> ExitCode {
    match err {
        AppError::Service(ServiceError::AuthRequired) => {
            eprintln!("Please sign in first: habit-tracker login <email> <password>");
        }
        AppError::Service(ServiceError::Domain(e)) => eprintln!("{}", e),
        AppError::Service(ServiceError::HabitNotFound(id)) => eprintln!("No habit with id {}", id),
        AppError::Auth(e) => eprintln!("{}", e),
        other => {
            tracing::error!("Failed to {}: {}", action, other);
            eprintln!("Could not {}. Please try again.", action);
        }
    }
    ExitCode::FAILURE
}

async fn run(app: &HabitTracker, command: Command) -> Result<(), AppError> {
    match command {
        Command::Register { email, password } => {
            let user = app.auth().register(&email, &password).await?;
            println!("Welcome! Signed in as {}", user);
        }
        Command::Login { email, password } => {
            let user = app.auth().sign_in(&email, &password).await?;
            println!("Signed in as {}", user);
        }
        Command::Logout => {
            app.auth().sign_out().await?;
            println!("Signed out");
        }
        Command::Whoami => match app.auth().current_user() {
            Some(user) => println!("{}", user),
            None => println!("Not signed in"),
        },
        Command::Add { name, category } => {
            let habit = app.service().create_habit(&name, &category).await?;
            println!("Created {} [{}] {}", habit.name, habit.category, habit.id);
        }
        Command::List => {
            let habits = app.service().habits().await?;
            if habits.is_empty() {
                println!("No habits yet. Add one with: habit-tracker add <name>");
            }
            for habit in habits {
                let done = app.service().is_completed_today(&habit.id).await?;
                let mark = if done { "✓" } else { " " };
                println!("[{}] {}  {} ({})", mark, habit.id, habit.name, habit.category);
            }
        }
        Command::Delete { habit_id } => {
            app.service().delete_habit(&HabitId::from(habit_id)).await?;
            println!("Habit deleted");
        }
        Command::Done { habit_id } => {
            let completion = app.service().complete_habit(&HabitId::from(habit_id)).await?;
            println!("Done for {}", completion.date);
        }
        Command::Stats => {
            let stats = app.service().stats().await?;
            println!(
                "Today: {}/{} habits ({}%)",
                stats.progress.completed_today, stats.progress.total_habits, stats.progress.percentage
            );
            for habit in stats.habits {
                println!(
                    "  {}: streak {} (best {}), {}% since created",
                    habit.name, habit.current_streak, habit.longest_streak, habit.completion_rate
                );
            }
        }
        Command::Insights { refresh } => {
            if refresh {
                if let Err(e) = app.refresh_insights().await {
                    tracing::warn!("Could not clear insight cache: {}", e);
                }
            }
            println!("{}", app.insights().await?);
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    let args = Args::parse();

    // Set up logging based on command line flags
    let log_level = if args.verbose {
        "debug"
    } else if args.debug {
        "info"
    } else {
        "warn"
    };

    tracing_subscriber::fmt()
        .with_env_filter(format!("habit_tracker={}", log_level))
        .with_writer(std::io::stderr) // Keep stdout for command output
        .init();

    let db_path = match args.database {
        Some(path) => {
            ensure_database_dir(&path)?;
            path
        }
        None => get_default_database_path()?,
    };

    info!("Using database at: {}", db_path.display());

    let config = GenerationConfig::from_env();
    let app = HabitTracker::open(db_path, &config).await?;

    let action = match &args.command {
        Command::Register { .. } => "register",
        Command::Login { .. } => "sign in",
        Command::Logout => "sign out",
        Command::Whoami => "read the session",
        Command::Add { .. } => "create the habit",
        Command::List => "load your habits",
        Command::Delete { .. } => "delete the habit",
        Command::Done { .. } => "record the completion",
        Command::Stats => "load statistics",
        Command::Insights { .. } => "load insights",
    };

    match run(&app, args.command).await {
        Ok(()) => Ok(ExitCode::SUCCESS),
        Err(e) => Ok(report(action, e)),
    }
}
