use std::path::PathBuf;

use clap::Parser;

use crate::cmd::Commands;
use crate::config::Overrides;

/// Kanban task board with an epic > story > task > subtask hierarchy.
/// Tasks start from built-in demo data; only settings are stored on disk.
#[derive(Parser)]
#[command(name = "tb", version, about = "Kanban task board and hierarchy viewer")]
pub struct Cli {
    /// Path to the settings file (default: ~/.taskboard/config.json).
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Active project id, overriding the saved default.
    #[arg(long, global = true)]
    pub project: Option<String>,

    /// Current user id, overriding the saved setting.
    #[arg(long, global = true)]
    pub user: Option<String>,

    /// Treat this date as today: YYYY-MM-DD, "tomorrow", "in 3d", ...
    #[arg(long, global = true)]
    pub today: Option<String>,

    /// Log filter, e.g. "info" or "taskboard=debug".
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    pub fn overrides(&self) -> Overrides {
        Overrides {
            user: self.user.clone(),
            project: self.project.clone(),
            log_level: self.log_level.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["tb", "board", "--project", "2", "--today", "2023-04-20"]).unwrap();
        assert!(matches!(cli.command, Commands::Board));
        let o = cli.overrides();
        assert_eq!(o.project.as_deref(), Some("2"));
        assert_eq!(o.user, None);
        assert_eq!(cli.today.as_deref(), Some("2023-04-20"));
    }

    #[test]
    fn test_hierarchy_expand_flag() {
        let cli = Cli::try_parse_from(["tb", "hierarchy", "--expand-all"]).unwrap();
        assert!(matches!(cli.command, Commands::Hierarchy { expand_all: true }));
    }
}
