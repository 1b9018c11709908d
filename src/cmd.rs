//! Command implementations for the CLI interface.
//!
//! Every printing command reads one of the views over the seeded store, so
//! the CLI and the TUI always agree on what a screen contains.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

use chrono::{Local, NaiveDate};
use clap::Subcommand;
use clap_complete::{generate, Shell};
use tracing::info;

use crate::config::Settings;
use crate::error::{Error, Result};
use crate::fields::Status;
use crate::fixtures::demo_store;
use crate::logging;
use crate::store::*;
use crate::task::{Task, TaskId};
use crate::tui::app::App;
use crate::tui::run::run_tui;
use crate::views::{board_columns, dashboard, expandable_ids, flatten_hierarchy, my_tasks, DueBucket};

#[derive(Subcommand)]
pub enum Commands {
    /// Launch the interactive UI interface.
    Ui,

    /// Print the dashboard of the active project.
    Dashboard,

    /// Print the kanban board of the active project.
    Board,

    /// Print the current user's tasks grouped by due date.
    MyTasks,

    /// Print the epic hierarchy of the active project.
    Hierarchy {
        /// Show every level instead of epics only.
        #[arg(long)]
        expand_all: bool,
    },

    /// View a single task by ID or title.
    View {
        /// Task ID or title to view
        id: String,
    },

    /// List projects.
    Projects,

    /// List users.
    Users,

    /// Show or change settings.
    Settings {
        /// Set the current user id.
        #[arg(long)]
        set_user: Option<String>,
        /// Set the default project id.
        #[arg(long)]
        set_project: Option<String>,
        /// Write the settings file.
        #[arg(long)]
        save: bool,
    },

    /// Export the seeded store as JSON.
    Export {
        /// Output file path (default: stdout).
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Generate shell completion scripts.
    Completions {
        /// Shell type.
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Everything a command works on: settings, the seeded store and the date
/// treated as today.
pub struct Session {
    pub store: TaskStore,
    pub settings: Settings,
    pub settings_path: PathBuf,
    pub today: NaiveDate,
}

impl Session {
    /// Seed the store and activate the configured project. `today` accepts the
    /// same forms as due dates, relative to the local date.
    pub fn new(settings: Settings, settings_path: PathBuf, today: Option<&str>) -> Result<Self> {
        let local_today = Local::now().date_naive();
        let today = match today {
            Some(s) => parse_due_input(s, local_today).ok_or_else(|| Error::InvalidDate(s.to_string()))?,
            None => local_today,
        };

        let mut store = demo_store();
        if store.user(&settings.current_user).is_none() {
            return Err(Error::UnknownUser(settings.current_user.clone()));
        }
        if !store.set_current_project(Some(&settings.default_project)) {
            return Err(Error::UnknownProject(settings.default_project.clone()));
        }

        Ok(Session {
            store,
            settings,
            settings_path,
            today,
        })
    }
}

/// Launch the terminal user interface.
pub fn cmd_ui(session: Session) -> Result<()> {
    logging::init_ui(&session.settings.log_level, session.settings.log_file.as_deref())?;
    let app = App::new(session.store, session.settings, session.settings_path, session.today);
    run_tui(app)
}

/// Print tasks as a table.
pub fn print_table(tasks: &[&Task], today: NaiveDate) {
    println!(
        "{:<5} {:<8} {:<12} {:<7} {:<10} {:<14} {}",
        "ID", "Type", "Status", "Pri", "Due", "Assignee", "Title [tags]"
    );
    for t in tasks {
        let tags = if t.tags.is_empty() {
            String::new()
        } else {
            format!(" [{}]", t.tags.join(","))
        };
        let assignee = t.assignee.as_ref().map(|u| u.name.as_str()).unwrap_or("-");
        println!(
            "{:<5} {:<8} {:<12} {:<7} {:<10} {:<14} {}{}",
            t.id,
            format_task_type(t.task_type),
            format_status(t.status),
            format_priority(t.priority),
            format_due_relative(t.due_date, today),
            truncate(assignee, 14),
            t.title,
            tags
        );
    }
}

/// Print the dashboard: counts, then the to-do and in-progress lists.
pub fn cmd_dashboard(session: &Session) -> Result<()> {
    let summary = dashboard(&session.store);
    println!("{}", summary.title);
    println!(
        "Total: {}  In progress: {}  In review: {}  Completed: {}",
        summary.total(),
        summary.in_progress.len(),
        summary.review,
        summary.done
    );
    println!();
    println!("To Do ({})", summary.todo.len());
    if summary.todo.is_empty() {
        println!("  No tasks to do");
    } else {
        print_table(&summary.todo, session.today);
    }
    println!();
    println!("In Progress ({})", summary.in_progress.len());
    if summary.in_progress.is_empty() {
        println!("  No tasks in progress");
    } else {
        print_table(&summary.in_progress, session.today);
    }
    Ok(())
}

/// Print the board one column after another.
pub fn cmd_board(session: &Session) -> Result<()> {
    let show_done = session.settings.show_done_on_board;
    for column in board_columns(&session.store) {
        if column.status == Status::Done && !show_done {
            println!("== {} (hidden) ==", format_status(column.status));
            continue;
        }
        println!("== {} ({}) ==", format_status(column.status), column.tasks.len());
        for t in &column.tasks {
            let owner = t.assignee.as_ref().map(|u| u.name.as_str()).unwrap_or("Unassigned");
            println!(
                "  #{:<4} {:<8} {:<7} {:<14} {}",
                t.id,
                format_task_type(t.task_type),
                format_priority(t.priority),
                truncate(owner, 14),
                t.title
            );
        }
    }
    Ok(())
}

/// Print the current user's tasks, grouped by due date.
pub fn cmd_my_tasks(session: &Session) -> Result<()> {
    let user = session
        .store
        .user(&session.settings.current_user)
        .ok_or_else(|| Error::UnknownUser(session.settings.current_user.clone()))?;
    let view = my_tasks(&session.store, &user.id, session.today);
    match view.bucket(DueBucket::Overdue).len() {
        0 => println!("My Tasks - {}", user.name),
        n => println!("My Tasks - {} ({} overdue)", user.name, n),
    }
    for (bucket, tasks) in view.visible() {
        println!();
        println!("{} ({})", bucket.label(), tasks.len());
        if tasks.is_empty() {
            if let Some(text) = bucket.empty_text() {
                println!("  {}", text);
            }
        } else {
            print_table(tasks, session.today);
        }
    }
    Ok(())
}

/// Print the epic tree of the active project.
pub fn cmd_hierarchy(session: &Session, expand_all: bool) -> Result<()> {
    let expanded: HashSet<TaskId> = if expand_all {
        expandable_ids(&session.store)
    } else {
        HashSet::new()
    };
    let rows = flatten_hierarchy(&session.store, &expanded);
    if rows.is_empty() {
        println!("No epics in this project.");
        return Ok(());
    }
    println!(
        "{:<5} {:<12} {:<7} {:<6} {:<14} {:<8} {}",
        "ID", "Status", "Pri", "Pts", "Assignee", "Due", "Title"
    );
    for row in rows {
        let Some(t) = session.store.get(row.id) else {
            continue;
        };
        let marker = match (row.has_children, row.expanded) {
            (false, _) => "  ",
            (true, false) => "▸ ",
            (true, true) => "▾ ",
        };
        println!(
            "{:<5} {:<12} {:<7} {:<6} {:<14} {:<8} {}{}{} ({})",
            t.id,
            format_status(t.status),
            format_priority(t.priority),
            t.story_points.map(|p| p.to_string()).unwrap_or_else(|| "-".into()),
            truncate(t.assignee.as_ref().map(|u| u.name.as_str()).unwrap_or("-"), 14),
            t.due_date.map(format_due_short).unwrap_or_else(|| "-".into()),
            "  ".repeat(row.depth),
            marker,
            t.title,
            format_task_type(t.task_type)
        );
    }
    Ok(())
}

/// Print every detail of one task, its ancestors and its subtree.
pub fn cmd_view(session: &Session, id: &str) -> Result<()> {
    let store = &session.store;
    let task_id = resolve_task_identifier(id, store)?;
    let task = store.get(task_id).ok_or_else(|| Error::TaskNotFound(id.to_string()))?;
    let today = session.today;

    println!("ID:           {}", task.id);
    println!("Title:        {}", task.title);
    println!("Type:         {}", format_task_type(task.task_type));
    println!("Status:       {}", format_status(task.status));
    println!("Priority:     {}", format_priority(task.priority));
    println!(
        "Project:      {}",
        store
            .projects
            .iter()
            .find(|p| p.contains(task.id))
            .map(|p| p.display_name())
            .unwrap_or_else(|| "-".into())
    );
    println!("Assignee:     {}", task.assignee.as_ref().map(|u| u.name.as_str()).unwrap_or("Unassigned"));
    println!("Reporter:     {}", task.reporter.as_ref().map(|u| u.name.as_str()).unwrap_or("-"));
    println!(
        "Due:          {}",
        match task.due_date {
            Some(d) => format!("{d} ({})", format_due_relative(Some(d), today)),
            None => "-".into(),
        }
    );
    println!("Story points: {}", task.story_points.map(|p| p.to_string()).unwrap_or_else(|| "-".into()));
    println!("Tags:         {}", if task.tags.is_empty() { "-".into() } else { task.tags.join(",") });
    if let Some(branch) = &task.branch {
        println!("Branch:       {}", branch);
    }
    if !task.sprints.is_empty() {
        println!("Sprints:      {}", task.sprints.join(","));
    }
    if let Some(tt) = &task.time_tracking {
        let minutes = |m: Option<u32>| m.map(format_minutes).unwrap_or_else(|| "-".into());
        println!(
            "Time:         {} estimated, {} logged, {} remaining",
            minutes(tt.original_estimate),
            minutes(tt.time_spent),
            minutes(tt.remaining_estimate)
        );
    }
    println!("Created UTC:  {}", task.created_at.to_rfc3339());
    println!("Updated UTC:  {}", task.updated_at.to_rfc3339());
    println!(
        "Description:\n{}\n",
        if task.description.is_empty() { "-" } else { task.description.as_str() }
    );

    let chain = store.collect_ancestors(task_id);
    if chain.is_empty() {
        println!("Ancestors: -");
    } else {
        println!(
            "Ancestors (closest first): {}",
            chain.iter().map(|i| i.to_string()).collect::<Vec<_>>().join(" -> ")
        );
    }

    println!("Children:");
    let child_map = build_children_map(&store.tasks);
    if child_map.contains_key(&task_id) {
        fn dfs(id: TaskId, child_map: &BTreeMap<TaskId, Vec<TaskId>>, store: &TaskStore, depth: usize) {
            if let Some(children) = child_map.get(&id) {
                for &c in children {
                    if let Some(t) = store.get(c) {
                        println!("{}- {} [{}] (#{})", "  ".repeat(depth), t.title, format_status(t.status), t.id);
                        dfs(c, child_map, store, depth + 1);
                    }
                }
            }
        }
        dfs(task_id, &child_map, store, 1);
    } else {
        println!("  -");
    }
    Ok(())
}

/// List projects with their task counts. The active one is starred.
pub fn cmd_projects(session: &Session) -> Result<()> {
    let active = session.store.current_project().map(|p| p.id.as_str());
    println!("  {:<4} {:<6} {:<26} {:<6} {:<14} {}", "ID", "Key", "Name", "Tasks", "Lead", "Sprint");
    for p in &session.store.projects {
        let marker = if Some(p.id.as_str()) == active { "*" } else { " " };
        let sprint = p
            .active_sprint()
            .map(|s| format!("{} ({})", s.name, format_sprint_status(s.status)))
            .unwrap_or_else(|| "-".into());
        println!(
            "{} {:<4} {:<6} {:<26} {:<6} {:<14} {}",
            marker,
            p.id,
            p.key.as_deref().unwrap_or("-"),
            truncate(&p.name, 26),
            p.task_ids.len(),
            truncate(p.lead.as_ref().map(|u| u.name.as_str()).unwrap_or("-"), 14),
            sprint
        );
    }
    Ok(())
}

/// List users with the number of open tasks assigned to each.
pub fn cmd_users(session: &Session) -> Result<()> {
    let mut open: HashMap<&str, usize> = HashMap::new();
    for t in &session.store.tasks {
        if let Some(u) = &t.assignee {
            if t.status != Status::Done {
                *open.entry(u.id.as_str()).or_default() += 1;
            }
        }
    }
    println!("  {:<4} {:<16} {}", "ID", "Name", "Open tasks");
    for u in &session.store.users {
        let marker = if u.id == session.settings.current_user { "*" } else { " " };
        println!("{} {:<4} {:<16} {}", marker, u.id, u.name, open.get(u.id.as_str()).copied().unwrap_or(0));
    }
    Ok(())
}

/// Show settings, applying and optionally saving changes first.
pub fn cmd_settings(
    session: &mut Session,
    set_user: Option<String>,
    set_project: Option<String>,
    save: bool,
) -> Result<()> {
    if let Some(user) = set_user {
        if session.store.user(&user).is_none() {
            return Err(Error::UnknownUser(user));
        }
        session.settings.current_user = user;
    }
    if let Some(project) = set_project {
        if !session.store.set_current_project(Some(&project)) {
            return Err(Error::UnknownProject(project));
        }
        session.settings.default_project = project;
    }

    let s = &session.settings;
    println!("Settings file:    {}", session.settings_path.display());
    println!("Current user:     {}", s.current_user);
    println!("Default project:  {}", s.default_project);
    println!("Show done column: {}", s.show_done_on_board);
    println!("Log level:        {}", s.log_level);
    println!(
        "Log file:         {}",
        s.log_file.as_ref().map(|p| p.display().to_string()).unwrap_or_else(|| "-".into())
    );

    if save {
        s.save(&session.settings_path)?;
        info!(path = %session.settings_path.display(), "settings saved");
        println!("Saved.");
    }
    Ok(())
}

/// Write the store as pretty JSON to `output`, or stdout.
pub fn cmd_export(session: &Session, output: Option<&Path>) -> Result<()> {
    let json = serde_json::to_string_pretty(&session.store)?;
    match output {
        Some(path) => {
            fs::write(path, json)?;
            info!(path = %path.display(), tasks = session.store.tasks.len(), "exported");
            println!("Exported {} tasks to {}", session.store.tasks.len(), path.display());
        }
        None => println!("{}", json),
    }
    Ok(())
}

/// Generate shell completion scripts.
pub fn cmd_completions(shell: Shell) {
    use clap::CommandFactory;
    use crate::cli::Cli;

    let mut app = Cli::command();
    let app_name = app.get_name().to_string();
    generate(shell, &mut app, app_name, &mut std::io::stdout());
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session() -> Session {
        let dir = std::env::temp_dir().join("taskboard-cmd-tests");
        Session::new(Settings::default(), dir.join("config.json"), Some("2023-04-20")).unwrap()
    }

    #[test]
    fn test_session_uses_given_today_and_project() {
        let s = session();
        assert_eq!(s.today, NaiveDate::from_ymd_opt(2023, 4, 20).unwrap());
        assert_eq!(s.store.current_project().unwrap().id, "1");
    }

    #[test]
    fn test_my_tasks_at_last_representable_date() {
        let mut s = session();
        s.today = NaiveDate::MAX;
        assert!(cmd_my_tasks(&s).is_ok());
        s.today = NaiveDate::MIN;
        assert!(cmd_my_tasks(&s).is_ok());
    }

    #[test]
    fn test_session_rejects_unknown_ids() {
        let mut settings = Settings::default();
        settings.default_project = "9".into();
        let err = Session::new(settings, PathBuf::from("x.json"), None).err().unwrap();
        assert!(matches!(err, Error::UnknownProject(p) if p == "9"));

        let mut settings = Settings::default();
        settings.current_user = "42".into();
        let err = Session::new(settings, PathBuf::from("x.json"), None).err().unwrap();
        assert!(matches!(err, Error::UnknownUser(_)));

        let err = Session::new(Settings::default(), PathBuf::from("x.json"), Some("someday"))
            .err()
            .unwrap();
        assert!(matches!(err, Error::InvalidDate(_)));

        let err = Session::new(Settings::default(), PathBuf::from("x.json"), Some("in 9999999999999d"))
            .err()
            .unwrap();
        assert!(matches!(err, Error::InvalidDate(_)));
    }

    #[test]
    fn test_view_unknown_task_fails() {
        let s = session();
        assert!(matches!(cmd_view(&s, "999"), Err(Error::TaskNotFound(_))));
        assert!(cmd_view(&s, "email verification").is_ok());
    }

    #[test]
    fn test_settings_save_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");
        let mut s = Session::new(Settings::default(), path.clone(), Some("2023-04-20")).unwrap();

        cmd_settings(&mut s, Some("3".into()), Some("2".into()), true).unwrap();
        assert_eq!(s.store.current_project().unwrap().id, "2");

        let loaded = Settings::load(&path).unwrap();
        assert_eq!(loaded.current_user, "3");
        assert_eq!(loaded.default_project, "2");
    }

    #[test]
    fn test_settings_rejects_unknown_user() {
        let mut s = session();
        let err = cmd_settings(&mut s, Some("nobody".into()), None, false).err().unwrap();
        assert!(matches!(err, Error::UnknownUser(_)));
        assert_eq!(s.settings.current_user, "1");
    }

    #[test]
    fn test_export_round_trips_store() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("export.json");
        let s = session();
        cmd_export(&s, Some(&path)).unwrap();

        let data = fs::read_to_string(&path).unwrap();
        let back: TaskStore = serde_json::from_str(&data).unwrap();
        assert_eq!(back.tasks.len(), 10);
        assert_eq!(back.get(9).unwrap().parent_id, Some(8));
        assert_eq!(back.current_project().unwrap().id, "1");
    }

    #[test]
    fn test_printing_commands_succeed() {
        let s = session();
        cmd_dashboard(&s).unwrap();
        cmd_board(&s).unwrap();
        cmd_my_tasks(&s).unwrap();
        cmd_hierarchy(&s, true).unwrap();
        cmd_projects(&s).unwrap();
        cmd_users(&s).unwrap();
    }
}
