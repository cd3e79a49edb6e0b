//! Taskboard CLI - terminal client for the Taskboard API.
//!
//! # Usage
//!
//! ```bash
//! # Log in (prompts for the password) and open the dashboard
//! taskboard login -u ana
//! taskboard dashboard
//!
//! # Manage resources
//! taskboard projects list
//! taskboard tasks status 7 completed
//! taskboard alerts mark-seen
//!
//! # End the session
//! taskboard logout
//! ```
//!
//! # Environment Variables
//!
//! - `TASKBOARD_API_URL` - Base URL of the API (required)
//! - `TASKBOARD_SESSION_FILE` - Where the session token is kept
//! - `TASKBOARD_CORRUPT_TOKEN` - `purge` (default) or `keep` an unreadable token
//!
//! See [`telemetry`] for logging and error tracking settings.

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::error::Error;
use std::io::{self, Write};
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use taskboard_client::{ActiveView, session_file_from_env};
use taskboard_core::Email;

mod commands;
mod telemetry;

use commands::Context;
use commands::alerts::AlertCommand;
use commands::projects::ProjectCommand;
use commands::tasks::TaskCommand;
use commands::users::UserCommand;

#[derive(Parser)]
#[command(name = "taskboard")]
#[command(author, version, about = "Taskboard command-line client")]
struct Cli {
    /// Session file to use instead of the configured one
    #[arg(long, global = true)]
    session_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Log in and keep the session
    Login {
        #[arg(short, long)]
        username: String,
        /// Password (prompted for when omitted)
        #[arg(short, long)]
        password: Option<String>,
    },
    /// Create an account
    Register {
        #[arg(short, long)]
        username: String,
        #[arg(short, long)]
        email: Email,
        /// Password (prompted for when omitted)
        #[arg(short, long)]
        password: Option<String>,
    },
    /// Forget the session
    Logout,
    /// Show who is logged in
    Whoami,
    /// Show the dashboard
    Dashboard {
        /// View to open instead of the default for your role
        #[arg(long)]
        view: Option<ActiveView>,
        /// Mark all visible alerts as seen afterwards
        #[arg(long)]
        mark_seen: bool,
    },
    /// Manage users
    Users {
        #[command(subcommand)]
        action: UserCommand,
    },
    /// Manage projects
    Projects {
        #[command(subcommand)]
        action: ProjectCommand,
    },
    /// Manage tasks
    Tasks {
        #[command(subcommand)]
        action: TaskCommand,
    },
    /// Read and manage alerts
    Alerts {
        #[command(subcommand)]
        action: AlertCommand,
    },
}

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();

    let telemetry_config = telemetry::TelemetryConfig::from_env();
    let _sentry_guard = telemetry::init_sentry(&telemetry_config);
    telemetry::init_tracing(&telemetry_config);

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        report(&mut io::stderr().lock(), e.as_ref());
        std::process::exit(1);
    }
}

/// Show a failed command's error on the terminal and send it to Sentry.
fn report(out: &mut impl Write, error: &(dyn Error + 'static)) {
    tracing::debug!(error = %error, "Command failed");
    sentry::capture_error(error);
    let _ = writeln!(out, "error: {error}");
}

async fn run(cli: Cli) -> Result<(), Box<dyn Error>> {
    let session_file = cli.session_file;
    let context = || Context::from_env(session_file.as_deref());

    let stdout = io::stdout();
    let mut out = stdout.lock();

    match cli.command {
        Commands::Login { username, password } => {
            commands::auth::login(&context()?, &mut out, &username, password).await?;
        }
        Commands::Register {
            username,
            email,
            password,
        } => {
            commands::auth::register(&context()?, &mut out, &username, &email, password).await?;
        }
        // Needs no API configuration
        Commands::Logout => {
            let path = session_file.clone().unwrap_or_else(session_file_from_env);
            commands::auth::logout(&path, &mut out)?;
        }
        Commands::Whoami => commands::auth::whoami(&context()?, &mut out)?,
        Commands::Dashboard { view, mark_seen } => {
            commands::dashboard::show(&context()?, &mut out, view, mark_seen).await?;
        }
        Commands::Users { action } => commands::users::run(&context()?, &mut out, action).await?,
        Commands::Projects { action } => {
            commands::projects::run(&context()?, &mut out, action).await?;
        }
        Commands::Tasks { action } => commands::tasks::run(&context()?, &mut out, action).await?,
        Commands::Alerts { action } => {
            commands::alerts::run(&context()?, &mut out, action).await?;
        }
    }

    out.flush()?;
    Ok(())
}
