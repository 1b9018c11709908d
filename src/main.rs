//! # tb - Taskboard
//!
//! A terminal task board with a four-level work item hierarchy
//! (Epic → Story → Task → Subtask) plus bugs and features.
//!
//! ## Key Features
//!
//! - **Dashboard**: counts per status and the to-do / in-progress lists of the active project
//! - **Kanban Board**: one column per status; cards move between neighbouring columns
//! - **My Tasks**: the current user's tasks across all projects, bucketed by due date
//! - **Hierarchy**: collapsible epic tree with type badges, story points and assignees
//! - **Settings**: current user and default project, saved to `~/.taskboard/config.json`
//!
//! The store is seeded with demo data on every start and lives in memory only;
//! nothing but the settings file is written to disk.
//!
//! ## Quick Start
//!
//! ```bash
//! # Launch the interactive UI
//! tb ui
//!
//! # Print the board of the second project
//! tb board --project 2
//!
//! # Show a task with its ancestors and subtree
//! tb view "Email verification"
//!
//! # Pin "today" for reproducible due-date buckets
//! tb my-tasks --today 2023-04-20
//! ```

use clap::Parser;

pub mod cli;
pub mod cmd;
pub mod config;
pub mod error;
pub mod fields;
pub mod fixtures;
pub mod logging;
pub mod project;
pub mod store;
pub mod task;
pub mod views;
pub mod tui {
    pub mod app;
    pub mod board;
    pub mod colors;
    pub mod enums;
    pub mod hierarchy;
    pub mod input;
    pub mod run;
    pub mod task_form;
    pub mod utils;
}

use cli::Cli;
use cmd::*;
use config::{settings_path, Settings};
use error::Result;

fn main() {
    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    if let Commands::Completions { shell } = cli.command {
        cmd_completions(shell);
        return Ok(());
    }

    let path = settings_path(cli.config.as_deref());
    let mut settings = Settings::load(&path)?;
    settings.apply(&cli.overrides());

    if !matches!(cli.command, Commands::Ui) {
        logging::init_stderr(&settings.log_level);
    }

    let mut session = Session::new(settings, path, cli.today.as_deref())?;

    match cli.command {
        Commands::Ui => cmd_ui(session),
        Commands::Dashboard => cmd_dashboard(&session),
        Commands::Board => cmd_board(&session),
        Commands::MyTasks => cmd_my_tasks(&session),
        Commands::Hierarchy { expand_all } => cmd_hierarchy(&session, expand_all),
        Commands::View { id } => cmd_view(&session, &id),
        Commands::Projects => cmd_projects(&session),
        Commands::Users => cmd_users(&session),
        Commands::Settings { set_user, set_project, save } => {
            cmd_settings(&mut session, set_user, set_project, save)
        }
        Commands::Export { output } => cmd_export(&session, output.as_deref()),
        Commands::Completions { .. } => Ok(()),
    }
}
