//! Main application logic for the terminal user interface.
//!
//! This module contains the `App` struct which owns the task store, handles
//! user input, renders the five screens and the overlays drawn on top of
//! them (task detail, create/edit form, delete confirmation, help).

use std::path::PathBuf;
use std::time::Duration;

use chrono::NaiveDate;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::{
    backend::Backend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table, TableState, Tabs, Wrap},
    Frame, Terminal,
};
use tracing::{debug, info};

use crate::{
    config::Settings,
    error::Result,
    fields::{Status, TaskType},
    store::{
        format_due_relative, format_due_short, format_minutes, format_priority, format_status,
        format_task_type, TaskStore,
    },
    task::{Task, TaskId},
    tui::{
        board::BoardState,
        colors::{priority_color, status_color, text_on, type_color, AMBER, DARK_GREEN, DARK_RED, GOLD, PURPLE},
        enums::{AppState, Screen, SettingsRow},
        hierarchy::HierarchyState,
        input::InputField,
        task_form::{
            TaskForm, ASSIGNEE_GLOBAL_ORDER, BRANCH_GLOBAL_ORDER, DESCRIPTION_GLOBAL_ORDER,
            DUE_GLOBAL_ORDER, PARENT_GLOBAL_ORDER, PRIORITY_GLOBAL_ORDER, STATUS_GLOBAL_ORDER,
            STORY_POINTS_GLOBAL_ORDER, TAGS_GLOBAL_ORDER, TITLE_GLOBAL_ORDER, TYPE_GLOBAL_ORDER,
        },
        utils::{centered_rect, cursor_in_box},
    },
    views::{dashboard, my_tasks, DueBucket},
};

/// Main application state for the terminal user interface.
pub struct App {
    store: TaskStore,
    settings: Settings,
    settings_path: PathBuf,
    today: NaiveDate,
    screen: Screen,
    state: AppState,
    /// State to return to when a form or confirmation closes.
    return_state: AppState,
    status_message: String,
    dashboard_selected: usize,
    my_tasks_selected: usize,
    board: BoardState,
    hierarchy: HierarchyState,
    settings_row: usize,
    task_form: TaskForm,
    detail_task: Option<TaskId>,
    editing_task: Option<TaskId>,
    confirm_delete: Option<TaskId>,
}

impl App {
    pub fn new(store: TaskStore, settings: Settings, settings_path: PathBuf, today: NaiveDate) -> Self {
        let task_form = TaskForm::new(&store.users);
        let mut app = App {
            store,
            settings,
            settings_path,
            today,
            screen: Screen::Dashboard,
            state: AppState::Main,
            return_state: AppState::Main,
            status_message: String::new(),
            dashboard_selected: 0,
            my_tasks_selected: 0,
            board: BoardState::default(),
            hierarchy: HierarchyState::default(),
            settings_row: 0,
            task_form,
            detail_task: None,
            editing_task: None,
            confirm_delete: None,
        };
        app.clamp_selections();
        app
    }

    pub fn store(&self) -> &TaskStore {
        &self.store
    }

    fn show_done(&self) -> bool {
        self.settings.show_done_on_board
    }

    fn set_status_message(&mut self, msg: String) {
        self.status_message = msg;
    }

    fn clear_status_message(&mut self) {
        self.status_message.clear();
    }

    /// To-do tasks followed by in-progress tasks, as listed on the dashboard.
    fn dashboard_ids(&self) -> Vec<TaskId> {
        let summary = dashboard(&self.store);
        summary
            .todo
            .iter()
            .chain(summary.in_progress.iter())
            .map(|t| t.id)
            .collect()
    }

    /// Task ids of the My Tasks screen in display order.
    fn my_task_ids(&self) -> Vec<TaskId> {
        my_tasks(&self.store, &self.settings.current_user, self.today)
            .visible()
            .flat_map(|(_, tasks)| tasks.iter().map(|t| t.id))
            .collect()
    }

    /// The task under the cursor on the current screen.
    fn selected_task(&self) -> Option<TaskId> {
        match self.screen {
            Screen::Dashboard => self.dashboard_ids().get(self.dashboard_selected).copied(),
            Screen::MyTasks => self.my_task_ids().get(self.my_tasks_selected).copied(),
            Screen::Board => self.board.selected_task(&self.store, self.show_done()),
            Screen::Hierarchy => self.hierarchy.selected_task(&self.store),
            Screen::Settings => None,
        }
    }

    fn clamp_selections(&mut self) {
        let n = self.dashboard_ids().len();
        self.dashboard_selected = self.dashboard_selected.min(n.saturating_sub(1));
        let n = self.my_task_ids().len();
        self.my_tasks_selected = self.my_tasks_selected.min(n.saturating_sub(1));
        let show_done = self.show_done();
        self.board.clamp_selection(&self.store, show_done);
        self.hierarchy.clamp_selection(&self.store);
    }

    /// Point every screen's selection at `id` where it is listed.
    fn follow(&mut self, id: TaskId) {
        if let Some(i) = self.dashboard_ids().iter().position(|&t| t == id) {
            self.dashboard_selected = i;
        }
        if let Some(i) = self.my_task_ids().iter().position(|&t| t == id) {
            self.my_tasks_selected = i;
        }
        let show_done = self.show_done();
        self.board.follow(id, &self.store, show_done);
        self.hierarchy.reveal(&self.store, id);
        self.clamp_selections();
    }

    /// Cycle the active project: each project in turn, then all tasks.
    fn cycle_project(&mut self) {
        let ids: Vec<String> = self.store.projects.iter().map(|p| p.id.clone()).collect();
        let next = match self.store.current_project() {
            None => ids.first().cloned(),
            Some(current) => {
                let pos = ids.iter().position(|id| *id == current.id).unwrap_or(0);
                ids.get(pos + 1).cloned()
            }
        };
        self.store.set_current_project(next.as_deref());
        self.board = BoardState::default();
        self.hierarchy.table_state.select(None);
        self.clamp_selections();
        let name = self
            .store
            .current_project()
            .map(|p| p.display_name())
            .unwrap_or_else(|| "All Tasks".to_string());
        info!(project = %name, "switched project");
        self.set_status_message(format!("Project: {}", name));
    }

    /// Advance the task to the next status, wrapping from done to backlog.
    fn cycle_status(&mut self, id: TaskId) {
        let Some(task) = self.store.get(id) else {
            return;
        };
        let next = Status::ALL[(task.status.column_index() + 1) % Status::ALL.len()];
        if self.store.update_task_status(id, next) {
            let title = self.store.get(id).map(|t| t.title.clone()).unwrap_or_default();
            self.set_status_message(format!(
                "Task updated: '{}' has been updated ({}).",
                title,
                format_status(next)
            ));
            self.follow(id);
        }
    }

    fn open_detail(&mut self, id: TaskId) {
        self.detail_task = Some(id);
        self.state = AppState::TaskDetail;
    }

    /// Open the create form preset for the current screen.
    fn open_add_form(&mut self) {
        let users = self.store.users.clone();
        self.task_form = match self.screen {
            Screen::Board => {
                TaskForm::with_defaults(&users, self.board.selected_status(), TaskType::Task, None, None)
            }
            Screen::Hierarchy => TaskForm::with_defaults(&users, Status::Todo, TaskType::Epic, None, None),
            Screen::MyTasks => TaskForm::with_defaults(
                &users,
                Status::Todo,
                TaskType::Task,
                None,
                Some(self.settings.current_user.as_str()),
            ),
            _ => TaskForm::new(&users),
        };
        self.editing_task = None;
        self.return_state = self.state;
        self.state = AppState::AddTask;
    }

    /// Open the create form for a child of `parent` with the next type down.
    fn open_add_child_form(&mut self, parent: TaskId) {
        let Some(task) = self.store.get(parent) else {
            return;
        };
        let child_type = task.task_type.child_type();
        self.task_form = TaskForm::with_defaults(&self.store.users, Status::Todo, child_type, Some(parent), None);
        self.editing_task = None;
        self.return_state = self.state;
        self.state = AppState::AddTask;
    }

    fn open_edit_form(&mut self, id: TaskId) {
        let Some(task) = self.store.get(id) else {
            return;
        };
        self.task_form = TaskForm::from_task(task, &self.store.users);
        self.editing_task = Some(id);
        self.return_state = self.state;
        self.state = AppState::EditTask;
    }

    fn open_confirm_delete(&mut self, id: TaskId) {
        self.confirm_delete = Some(id);
        self.return_state = self.state;
        self.state = AppState::Confirm;
    }

    fn handle_main_input(&mut self, key: KeyEvent) -> bool {
        let code = key.code;
        let modifiers = key.modifiers;
        match code {
            KeyCode::Char('q') | KeyCode::Esc => return true,
            KeyCode::Char(c @ '1'..='5') => {
                let i = c as usize - '1' as usize;
                self.screen = Screen::ALL[i];
            }
            KeyCode::Tab => self.screen = self.screen.cycle(true),
            KeyCode::BackTab => self.screen = self.screen.cycle(false),
            KeyCode::Char('h') | KeyCode::Char('?') | KeyCode::F(1) => {
                self.return_state = AppState::Main;
                self.state = AppState::Help;
            }
            KeyCode::Char('p') => self.cycle_project(),
            _ => match self.screen {
                Screen::Dashboard => self.handle_dashboard_input(code),
                Screen::Board => self.handle_board_input(code, modifiers),
                Screen::MyTasks => self.handle_my_tasks_input(code),
                Screen::Hierarchy => self.handle_hierarchy_input(code),
                Screen::Settings => self.handle_settings_input(code),
            },
        }
        false
    }

    /// Keys that act on the selected task the same way on every list screen.
    fn handle_task_action(&mut self, code: KeyCode) {
        match code {
            KeyCode::Char('a') => self.open_add_form(),
            KeyCode::Enter => {
                if let Some(id) = self.selected_task() {
                    self.open_detail(id);
                }
            }
            KeyCode::Char('e') => {
                if let Some(id) = self.selected_task() {
                    self.open_edit_form(id);
                }
            }
            KeyCode::Char('d') => {
                if let Some(id) = self.selected_task() {
                    self.open_confirm_delete(id);
                }
            }
            KeyCode::Char('s') => {
                if let Some(id) = self.selected_task() {
                    self.cycle_status(id);
                }
            }
            _ => {}
        }
    }

    fn handle_dashboard_input(&mut self, code: KeyCode) {
        let len = self.dashboard_ids().len();
        match code {
            KeyCode::Up | KeyCode::Char('k') => {
                self.dashboard_selected = self.dashboard_selected.saturating_sub(1);
            }
            KeyCode::Down | KeyCode::Char('j') => {
                if self.dashboard_selected + 1 < len {
                    self.dashboard_selected += 1;
                }
            }
            _ => self.handle_task_action(code),
        }
    }

    fn handle_my_tasks_input(&mut self, code: KeyCode) {
        let len = self.my_task_ids().len();
        match code {
            KeyCode::Up | KeyCode::Char('k') => {
                self.my_tasks_selected = self.my_tasks_selected.saturating_sub(1);
            }
            KeyCode::Down | KeyCode::Char('j') => {
                if self.my_tasks_selected + 1 < len {
                    self.my_tasks_selected += 1;
                }
            }
            _ => self.handle_task_action(code),
        }
    }

    fn handle_board_input(&mut self, code: KeyCode, modifiers: KeyModifiers) {
        let show_done = self.show_done();
        match code {
            KeyCode::Left if modifiers.contains(KeyModifiers::CONTROL) => self.move_card(false),
            KeyCode::Right if modifiers.contains(KeyModifiers::CONTROL) => self.move_card(true),
            KeyCode::Char('<') => self.move_card(false),
            KeyCode::Char('>') => self.move_card(true),
            KeyCode::Left => self.board.select_column(false, &self.store, show_done),
            KeyCode::Right => self.board.select_column(true, &self.store, show_done),
            KeyCode::Up | KeyCode::Char('k') => self.board.select_card(false, &self.store, show_done),
            KeyCode::Down | KeyCode::Char('j') => self.board.select_card(true, &self.store, show_done),
            KeyCode::Char('t') => {
                self.settings.show_done_on_board = !show_done;
                self.board.clamp_selection(&self.store, !show_done);
                self.set_status_message(if show_done {
                    "Done column hidden".to_string()
                } else {
                    "Done column shown".to_string()
                });
            }
            _ => self.handle_task_action(code),
        }
    }

    fn move_card(&mut self, forward: bool) {
        let show_done = self.show_done();
        if let Some((id, status)) = self.board.move_selected(forward, &mut self.store, show_done) {
            let title = self.store.get(id).map(|t| t.title.clone()).unwrap_or_default();
            self.set_status_message(format!(
                "Task updated: '{}' has been updated ({}).",
                title,
                format_status(status)
            ));
        }
    }

    fn handle_hierarchy_input(&mut self, code: KeyCode) {
        match code {
            KeyCode::Up | KeyCode::Char('k') => self.hierarchy.select_next(false, &self.store),
            KeyCode::Down | KeyCode::Char('j') => self.hierarchy.select_next(true, &self.store),
            KeyCode::Right | KeyCode::Char(' ') => {
                self.hierarchy.expand_selected(&self.store);
            }
            KeyCode::Left => self.hierarchy.collapse_selected(&self.store),
            KeyCode::Char('+') => {
                if let Some(id) = self.hierarchy.selected_task(&self.store) {
                    self.open_add_child_form(id);
                }
            }
            _ => self.handle_task_action(code),
        }
    }

    fn handle_settings_input(&mut self, code: KeyCode) {
        let rows = SettingsRow::ALL.len();
        match code {
            KeyCode::Up | KeyCode::Char('k') => self.settings_row = self.settings_row.saturating_sub(1),
            KeyCode::Down | KeyCode::Char('j') => self.settings_row = (self.settings_row + 1).min(rows - 1),
            KeyCode::Left => self.change_setting(false),
            KeyCode::Right | KeyCode::Char(' ') | KeyCode::Enter => self.change_setting(true),
            KeyCode::Char('w') => self.save_settings(),
            _ => {}
        }
    }

    fn change_setting(&mut self, forward: bool) {
        fn step<T>(items: &[T], current: Option<usize>, forward: bool) -> Option<&T> {
            let n = items.len();
            if n == 0 {
                return None;
            }
            let i = current.unwrap_or(0);
            let next = if forward { (i + 1) % n } else { (i + n - 1) % n };
            items.get(next)
        }

        match SettingsRow::ALL[self.settings_row.min(SettingsRow::ALL.len() - 1)] {
            SettingsRow::CurrentUser => {
                let pos = self.store.users.iter().position(|u| u.id == self.settings.current_user);
                if let Some(user) = step(&self.store.users, pos, forward) {
                    self.settings.current_user = user.id.clone();
                    self.my_tasks_selected = 0;
                }
            }
            SettingsRow::DefaultProject => {
                let pos = self
                    .store
                    .projects
                    .iter()
                    .position(|p| p.id == self.settings.default_project);
                if let Some(project) = step(&self.store.projects, pos, forward) {
                    self.settings.default_project = project.id.clone();
                    let id = project.id.clone();
                    self.store.set_current_project(Some(&id));
                    self.board = BoardState::default();
                    self.hierarchy.table_state.select(None);
                }
            }
            SettingsRow::ShowDone => {
                self.settings.show_done_on_board = !self.settings.show_done_on_board;
            }
        }
        self.clamp_selections();
    }

    fn save_settings(&mut self) {
        match self.settings.save(&self.settings_path) {
            Ok(()) => {
                info!(path = %self.settings_path.display(), "settings saved");
                self.set_status_message(format!("Settings saved to {}", self.settings_path.display()));
            }
            Err(e) => self.set_status_message(format!("Error saving settings: {}", e)),
        }
    }

    fn handle_detail_input(&mut self, code: KeyCode) -> bool {
        let Some(id) = self.detail_task else {
            self.state = AppState::Main;
            return false;
        };
        match code {
            KeyCode::Esc | KeyCode::Char('q') => {
                self.detail_task = None;
                self.state = AppState::Main;
            }
            KeyCode::Char('e') => self.open_edit_form(id),
            KeyCode::Char('d') => self.open_confirm_delete(id),
            KeyCode::Char('s') => self.cycle_status(id),
            KeyCode::Char('p') => match self.store.parent_of(id).map(|t| t.id) {
                Some(parent) => self.detail_task = Some(parent),
                None => self.set_status_message("Task has no parent".to_string()),
            },
            KeyCode::Char('c') => {
                let first_child = self.store.children_of(id).first().map(|t| t.id);
                match first_child {
                    Some(child) => self.detail_task = Some(child),
                    None => self.set_status_message("Task has no children".to_string()),
                }
            }
            KeyCode::Char('+') => self.open_add_child_form(id),
            _ => {}
        }
        false
    }

    fn handle_form_input(&mut self, code: KeyCode, modifiers: KeyModifiers) -> bool {
        match code {
            KeyCode::Char('u') if modifiers.contains(KeyModifiers::CONTROL) => {
                let current = self.task_form.current_field;
                if let Some(field) = self.task_form.text_field_mut(current) {
                    field.clear();
                }
            }
            KeyCode::Esc => {
                self.state = self.return_state;
                self.editing_task = None;
            }
            KeyCode::Tab | KeyCode::Down => self.task_form.next_field(),
            KeyCode::BackTab | KeyCode::Up => self.task_form.prev_field(),
            KeyCode::Left => self.task_form.handle_left_right(false),
            KeyCode::Right => self.task_form.handle_left_right(true),
            KeyCode::Home => {
                let current = self.task_form.current_field;
                if let Some(field) = self.task_form.text_field_mut(current) {
                    field.move_home();
                }
            }
            KeyCode::End => {
                let current = self.task_form.current_field;
                if let Some(field) = self.task_form.text_field_mut(current) {
                    field.move_end();
                }
            }
            KeyCode::Backspace => self.task_form.handle_backspace(),
            KeyCode::Delete => self.task_form.handle_delete(),
            KeyCode::Enter => {
                let result = match self.editing_task {
                    Some(id) => self.submit_edit(id),
                    None => self.submit_new(),
                };
                if let Err(e) = result {
                    debug!(error = %e, "form rejected");
                    self.set_status_message(format!("Error: {}", e));
                }
            }
            KeyCode::Char(c) => self.task_form.handle_char(c),
            _ => {}
        }
        false
    }

    fn submit_new(&mut self) -> Result<()> {
        let new = self.task_form.to_new_task(&self.store, self.today)?;
        let title = new.title.clone();
        let id = self.store.add_task(new);
        self.follow(id);
        self.state = AppState::Main;
        self.set_status_message(format!("Task created: '{}' has been added to your tasks.", title));
        Ok(())
    }

    fn submit_edit(&mut self, id: TaskId) -> Result<()> {
        let Some(task) = self.store.get(id) else {
            self.state = AppState::Main;
            return Ok(());
        };
        let updated = self.task_form.apply_to(task, &self.store, self.today)?;
        let title = updated.title.clone();
        self.store.update_task(updated);
        self.editing_task = None;
        self.follow(id);
        self.state = self.return_state;
        self.set_status_message(format!("Task updated: '{}' has been updated.", title));
        Ok(())
    }

    fn handle_confirm_input(&mut self, code: KeyCode) -> bool {
        match code {
            KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => {
                if let Some(id) = self.confirm_delete.take() {
                    self.delete_task(id);
                }
                self.detail_task = None;
                self.state = AppState::Main;
            }
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                self.confirm_delete = None;
                self.state = self.return_state;
            }
            _ => {}
        }
        false
    }

    fn delete_task(&mut self, id: TaskId) {
        let title = self.store.get(id).map(|t| t.title.clone()).unwrap_or_default();
        let removed = self.store.delete_task(id);
        if removed.is_empty() {
            return;
        }
        self.clamp_selections();
        let extra = removed.len() - 1;
        if extra > 0 {
            self.set_status_message(format!(
                "Task deleted: '{}' and {} sub-item{} have been removed.",
                title,
                extra,
                if extra == 1 { "" } else { "s" }
            ));
        } else {
            self.set_status_message(format!("Task deleted: '{}' has been removed.", title));
        }
    }

    fn handle_help_input(&mut self, _code: KeyCode) -> bool {
        self.state = self.return_state;
        false
    }

    /// Apply one key press. Returns true if the application should quit.
    pub fn handle_key(&mut self, key: KeyEvent) -> bool {
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            return true;
        }
        self.clear_status_message();

        match self.state {
            AppState::Main => self.handle_main_input(key),
            AppState::TaskDetail => self.handle_detail_input(key.code),
            AppState::AddTask | AppState::EditTask => self.handle_form_input(key.code, key.modifiers),
            AppState::Help => self.handle_help_input(key.code),
            AppState::Confirm => self.handle_confirm_input(key.code),
        }
    }

    /// Poll for and handle keyboard events based on current application state.
    ///
    /// Returns true if the application should quit.
    fn handle_input(&mut self) -> Result<bool> {
        if event::poll(Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    return Ok(self.handle_key(key));
                }
            }
        }
        Ok(false)
    }

    /// Render the header with screen tabs and the active project.
    fn render_header(&self, f: &mut Frame, area: Rect) {
        let titles: Vec<Line> = Screen::ALL
            .iter()
            .enumerate()
            .map(|(i, s)| Line::from(format!("{} {}", i + 1, s.title())))
            .collect();

        let project = self
            .store
            .current_project()
            .map(|p| p.display_name())
            .unwrap_or_else(|| "All Tasks".to_string());
        let user = self
            .store
            .user(&self.settings.current_user)
            .map(|u| u.name.as_str())
            .unwrap_or("-");

        let tabs = Tabs::new(titles)
            .select(self.screen.index())
            .block(Block::default().borders(Borders::ALL).title(Line::from(vec![
                Span::styled("TASKBOARD", Style::default().add_modifier(Modifier::BOLD)),
                Span::raw("  "),
                Span::styled(
                    format!("Project: {}  User: {}", project, user),
                    Style::default().fg(Color::Cyan).add_modifier(Modifier::ITALIC),
                ),
            ])))
            .highlight_style(Style::default().fg(GOLD).add_modifier(Modifier::BOLD));

        f.render_widget(tabs, area);
    }

    fn render_dashboard(&self, f: &mut Frame, area: Rect) {
        let summary = dashboard(&self.store);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(4), Constraint::Min(0)])
            .split(area);

        let cards = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Ratio(1, 4); 4])
            .split(chunks[0]);

        let stats = [
            ("Total Tasks", summary.total(), Color::Blue),
            ("In Progress", summary.in_progress.len(), AMBER),
            ("In Review", summary.review, PURPLE),
            ("Completed", summary.done, DARK_GREEN),
        ];
        for ((label, count, color), &card) in stats.iter().zip(cards.iter()) {
            let p = Paragraph::new(Line::from(Span::styled(
                count.to_string(),
                Style::default().fg(*color).add_modifier(Modifier::BOLD),
            )))
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::ALL).title(*label));
            f.render_widget(p, card);
        }

        let lists = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
            .split(chunks[1]);

        let todo_len = summary.todo.len();
        let (todo_sel, progress_sel) = if self.dashboard_selected < todo_len {
            (Some(self.dashboard_selected), None)
        } else {
            (None, Some(self.dashboard_selected - todo_len))
        };

        self.render_task_table(f, lists[0], &format!("To Do ({})", todo_len), &summary.todo, todo_sel, "No tasks to do");
        self.render_task_table(
            f,
            lists[1],
            &format!("In Progress ({})", summary.in_progress.len()),
            &summary.in_progress,
            progress_sel,
            "No tasks in progress",
        );

        if summary.title == "All Tasks" {
            let hint = Paragraph::new("No project selected - press 'p' to pick one")
                .style(Style::default().fg(Color::DarkGray))
                .alignment(Alignment::Center);
            f.render_widget(hint, Rect { height: 1, y: chunks[1].y + chunks[1].height / 2, ..chunks[1] });
        }
    }

    fn render_task_table(
        &self,
        f: &mut Frame,
        area: Rect,
        title: &str,
        tasks: &[&Task],
        selected: Option<usize>,
        empty_text: &str,
    ) {
        let rows: Vec<Row> = if tasks.is_empty() {
            vec![Row::new(vec![Cell::from(empty_text.to_string())]).style(Style::default().fg(Color::DarkGray))]
        } else {
            tasks.iter().map(|t| self.task_row(t)).collect()
        };

        let widths = [
            Constraint::Min(20),
            Constraint::Length(8),
            Constraint::Length(8),
            Constraint::Length(10),
        ];
        let header = Row::new(["Title", "Type", "Priority", "Due"].iter().map(|h| {
            Cell::from(*h).style(Style::default().add_modifier(Modifier::BOLD))
        }));

        let table = Table::new(rows, widths)
            .header(header)
            .block(Block::default().borders(Borders::ALL).title(title.to_string()))
            .row_highlight_style(Style::default().bg(Color::Gray).fg(Color::Black))
            .highlight_symbol(">> ");

        let mut state = TableState::default();
        state.select(selected.filter(|_| !tasks.is_empty()));
        f.render_stateful_widget(table, area, &mut state);
    }

    fn task_row<'a>(&self, task: &'a Task) -> Row<'a> {
        let due_style = match task.due_date {
            Some(d) if d < self.today && task.status != Status::Done => Style::default().fg(Color::Red),
            _ => Style::default(),
        };
        Row::new(vec![
            Cell::from(task.title.as_str()),
            Cell::from(format_task_type(task.task_type)).style(Style::default().fg(type_color(task.task_type))),
            Cell::from(format_priority(task.priority)).style(Style::default().fg(priority_color(task.priority))),
            Cell::from(task.due_date.map(format_due_short).unwrap_or_else(|| "-".into())).style(due_style),
        ])
    }

    fn render_my_tasks(&self, f: &mut Frame, area: Rect) {
        let view = my_tasks(&self.store, &self.settings.current_user, self.today);

        let mut rows = Vec::new();
        let mut selected_row = None;
        let mut task_index = 0;
        for (bucket, tasks) in view.visible() {
            let header_style = if *bucket == DueBucket::Overdue {
                Style::default().fg(Color::Red).add_modifier(Modifier::BOLD)
            } else {
                Style::default().add_modifier(Modifier::BOLD)
            };
            rows.push(Row::new(vec![Cell::from(format!("{} ({})", bucket.label(), tasks.len()))]).style(header_style));
            if tasks.is_empty() {
                if let Some(text) = bucket.empty_text() {
                    rows.push(Row::new(vec![Cell::from(format!("  {}", text))]).style(Style::default().fg(Color::DarkGray)));
                }
            }
            for task in tasks {
                if task_index == self.my_tasks_selected {
                    selected_row = Some(rows.len());
                }
                task_index += 1;
                let status = Cell::from(format_status(task.status)).style(Style::default().fg(status_color(task.status)));
                rows.push(Row::new(vec![
                    Cell::from(format!("  {}", task.title)),
                    status,
                    Cell::from(format_priority(task.priority)).style(Style::default().fg(priority_color(task.priority))),
                    Cell::from(format_due_relative(task.due_date, self.today)),
                ]));
            }
        }

        let user = self
            .store
            .user(&self.settings.current_user)
            .map(|u| u.name.clone())
            .unwrap_or_else(|| self.settings.current_user.clone());

        let widths = [
            Constraint::Min(30),
            Constraint::Length(12),
            Constraint::Length(9),
            Constraint::Length(10),
        ];
        let table = Table::new(rows, widths)
            .block(Block::default().borders(Borders::ALL).title(format!("My Tasks - {}", user)))
            .row_highlight_style(Style::default().bg(Color::Gray).fg(Color::Black))
            .highlight_symbol(">> ");

        let mut state = TableState::default();
        state.select(selected_row);
        f.render_stateful_widget(table, area, &mut state);
    }

    fn render_settings(&self, f: &mut Frame, area: Rect) {
        let user = self
            .store
            .user(&self.settings.current_user)
            .map(|u| format!("{} ({})", u.name, u.id))
            .unwrap_or_else(|| self.settings.current_user.clone());
        let project = self
            .store
            .project(&self.settings.default_project)
            .map(|p| p.display_name())
            .unwrap_or_else(|| self.settings.default_project.clone());

        let mut text = Vec::new();
        for (i, row) in SettingsRow::ALL.iter().enumerate() {
            let (label, value) = match row {
                SettingsRow::CurrentUser => ("Current user", user.clone()),
                SettingsRow::DefaultProject => ("Default project", project.clone()),
                SettingsRow::ShowDone => (
                    "Show done column",
                    if self.settings.show_done_on_board { "yes" } else { "no" }.to_string(),
                ),
            };
            let style = if i == self.settings_row {
                Style::default().fg(GOLD).add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };
            text.push(Line::from(vec![
                Span::styled(format!("{:<18}", label), Style::default().add_modifier(Modifier::BOLD)),
                Span::styled(format!("< {} >", value), style),
            ]));
        }
        text.push(Line::from(""));
        text.push(Line::from(format!("Settings file: {}", self.settings_path.display())));
        text.push(Line::from(format!("Log level:     {}", self.settings.log_level)));
        text.push(Line::from(format!(
            "Log file:      {}",
            self.settings
                .log_file
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| "-".to_string())
        )));
        text.push(Line::from(""));
        text.push(Line::from("↑/↓ select  ←/→ change  w save"));

        let paragraph = Paragraph::new(text)
            .block(Block::default().borders(Borders::ALL).title("Settings"))
            .wrap(Wrap { trim: false });
        f.render_widget(paragraph, area);
    }

    /// Render the detailed view of a single task.
    fn render_task_detail(&self, f: &mut Frame, area: Rect) {
        let Some(task) = self.detail_task.and_then(|id| self.store.get(id)) else {
            return;
        };
        let area = centered_rect(80, 85, area);
        f.render_widget(Clear, area);

        let bold = Style::default().add_modifier(Modifier::BOLD);
        let field = |label: &str, value: String| {
            Line::from(vec![Span::styled(format!("{}: ", label), bold), Span::raw(value)])
        };
        let badge_color = type_color(task.task_type);

        let mut text = vec![
            Line::from(vec![
                Span::styled(
                    format!(" {} ", format_task_type(task.task_type)),
                    Style::default().bg(badge_color).fg(text_on(badge_color)),
                ),
                Span::raw(format!(" #{} ", task.id)),
                Span::styled(task.title.clone(), bold),
            ]),
            Line::from(""),
            Line::from(vec![
                Span::styled("Status: ", bold),
                Span::styled(format_status(task.status), Style::default().fg(status_color(task.status))),
                Span::raw("   "),
                Span::styled("Priority: ", bold),
                Span::styled(format_priority(task.priority), Style::default().fg(priority_color(task.priority))),
            ]),
            field(
                "Assignee",
                task.assignee.as_ref().map(|u| u.name.clone()).unwrap_or_else(|| "Unassigned".into()),
            ),
            field("Reporter", task.reporter.as_ref().map(|u| u.name.clone()).unwrap_or_else(|| "-".into())),
            field(
                "Due",
                match task.due_date {
                    Some(d) => format!("{} ({})", d, format_due_relative(Some(d), self.today)),
                    None => "-".to_string(),
                },
            ),
            field("Story points", task.story_points.map(|p| p.to_string()).unwrap_or_else(|| "-".into())),
            field("Tags", if task.tags.is_empty() { "-".into() } else { task.tags.join(", ") }),
        ];

        if let Some(branch) = &task.branch {
            text.push(field("Branch", branch.clone()));
        }
        if !task.sprints.is_empty() {
            text.push(field("Sprints", task.sprints.join(", ")));
        }
        if !task.components.is_empty() {
            text.push(field("Components", task.components.join(", ")));
        }
        if let Some(tt) = &task.time_tracking {
            let minutes = |m: Option<u32>| m.map(format_minutes).unwrap_or_else(|| "-".into());
            text.push(field(
                "Time",
                format!(
                    "{} estimated, {} logged, {} remaining",
                    minutes(tt.original_estimate),
                    minutes(tt.time_spent),
                    minutes(tt.remaining_estimate)
                ),
            ));
        }
        text.push(field("Created", task.created_at.format("%Y-%m-%d %H:%M").to_string()));
        text.push(field("Updated", task.updated_at.format("%Y-%m-%d %H:%M").to_string()));

        text.push(Line::from(""));
        match self.store.parent_of(task.id) {
            Some(parent) => text.push(Line::from(vec![
                Span::styled("Parent: ", bold),
                Span::styled(format!("#{} - {}", parent.id, parent.title), Style::default().fg(Color::Blue)),
                Span::raw(" (Press 'p' to go to parent)"),
            ])),
            None => text.push(field("Parent", "-".into())),
        }

        let children = self.store.children_of(task.id);
        if children.is_empty() {
            text.push(field("Children", "-".into()));
        } else {
            text.push(Line::from(vec![
                Span::styled("Children: ", bold),
                Span::raw("(Press 'c' to open the first child)"),
            ]));
            for child in children.iter().take(5) {
                text.push(Line::from(vec![
                    Span::raw("  "),
                    Span::styled(
                        format!("#{} - {} [{}]", child.id, child.title, format_status(child.status)),
                        Style::default().fg(Color::Blue),
                    ),
                ]));
            }
            if children.len() > 5 {
                text.push(Line::from(format!("  ... and {} more", children.len() - 5)));
            }
        }

        text.push(Line::from(""));
        text.push(Line::from(Span::styled("Description:", bold)));
        text.push(Line::from(if task.description.is_empty() {
            "-".to_string()
        } else {
            task.description.clone()
        }));

        if !task.comments.is_empty() {
            text.push(Line::from(""));
            text.push(Line::from(Span::styled(format!("Comments ({}):", task.comments.len()), bold)));
            for c in &task.comments {
                text.push(Line::from(format!("  {}: {}", c.author.name, c.content)));
            }
        }

        let paragraph = Paragraph::new(text)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title("Task Details - [e]dit, [d]elete, [s]tatus, [p]arent, [c]hild, [+] child, [Esc] back"),
            )
            .wrap(Wrap { trim: true });

        f.render_widget(paragraph, area);
    }

    /// Render the task creation or editing form.
    fn render_task_form(&self, f: &mut Frame, area: Rect, is_edit: bool) {
        let area = centered_rect(90, 90, area);
        f.render_widget(Clear, area);

        let outer = Block::default()
            .borders(Borders::ALL)
            .title(if is_edit { "Edit Task" } else { "New Task" });
        let inner = outer.inner(area);
        f.render_widget(outer, area);

        let main_chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
            .split(inner);
        let left = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(3); 6])
            .split(main_chunks[0]);
        let right = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Length(3),
                Constraint::Length(3),
                Constraint::Length(3),
                Constraint::Length(3),
                Constraint::Min(3),
            ])
            .split(main_chunks[1]);

        let form = &self.task_form;
        let current = form.current_field;

        let text_inputs: [(usize, &str, &InputField, Rect); 7] = [
            (TITLE_GLOBAL_ORDER, "Title", &form.title, left[0]),
            (DESCRIPTION_GLOBAL_ORDER, "Description", &form.description, left[1]),
            (DUE_GLOBAL_ORDER, "Due (YYYY-MM-DD, today, in 3d, fri)", &form.due, right[0]),
            (TAGS_GLOBAL_ORDER, "Tags (comma separated)", &form.tags, right[1]),
            (STORY_POINTS_GLOBAL_ORDER, "Story points", &form.story_points, right[2]),
            (PARENT_GLOBAL_ORDER, "Parent id", &form.parent, right[3]),
            (BRANCH_GLOBAL_ORDER, "Branch", &form.branch, right[4]),
        ];
        for (index, label, input, chunk) in text_inputs.iter() {
            let style = if *index == current { Style::default().fg(GOLD) } else { Style::default() };
            let p = Paragraph::new(input.value.as_str())
                .block(Block::default().borders(Borders::ALL).title(*label).border_style(style));
            f.render_widget(p, *chunk);
        }

        let assignee = form
            .selected_assignee()
            .map(|u| u.name.clone())
            .unwrap_or_else(|| "Unassigned".to_string());
        let selectors = [
            (TYPE_GLOBAL_ORDER, "Type (←/→)", format_task_type(form.selected_type()).to_string(), left[2]),
            (STATUS_GLOBAL_ORDER, "Status (←/→)", format_status(form.selected_status()).to_string(), left[3]),
            (PRIORITY_GLOBAL_ORDER, "Priority (←/→)", format_priority(form.selected_priority()).to_string(), left[4]),
            (ASSIGNEE_GLOBAL_ORDER, "Assignee (←/→)", assignee, left[5]),
        ];
        for (index, label, value, chunk) in selectors {
            let style = if index == current { Style::default().fg(GOLD) } else { Style::default() };
            let p = Paragraph::new(format!("< {} >", value))
                .block(Block::default().borders(Borders::ALL).title(label).border_style(style))
                .alignment(Alignment::Center);
            f.render_widget(p, chunk);
        }

        let help_text = if is_edit {
            "Tab/↑↓: Navigate  ←→: Change selectors  Ctrl+U: Clear field  Enter: Save  Esc: Cancel"
        } else {
            "Tab/↑↓: Navigate  ←→: Change selectors  Ctrl+U: Clear field  Enter: Create  Esc: Cancel"
        };
        let instructions = Paragraph::new(help_text)
            .block(Block::default().borders(Borders::ALL).title("Instructions"))
            .wrap(Wrap { trim: true });
        f.render_widget(instructions, right[5]);

        if let Some((_, _, field, chunk)) = text_inputs.iter().find(|(i, ..)| *i == current) {
            f.set_cursor_position(cursor_in_box(*chunk, field.cursor_column()));
        }
    }

    /// Render the help screen with keyboard shortcuts and usage instructions.
    fn render_help(&self, f: &mut Frame, area: Rect) {
        let area = centered_rect(70, 90, area);
        f.render_widget(Clear, area);
        let bold = Style::default().add_modifier(Modifier::BOLD);

        let help_text = vec![
            Line::from(Span::styled("Taskboard Help", bold)),
            Line::from(""),
            Line::from(Span::styled("Everywhere:", bold)),
            Line::from("  1-5, Tab      Switch screen"),
            Line::from("  p             Cycle active project"),
            Line::from("  ↑/↓           Select task"),
            Line::from("  Enter         View task details"),
            Line::from("  a             Add new task"),
            Line::from("  e             Edit selected task"),
            Line::from("  d             Delete selected task and its sub-items"),
            Line::from("  s             Cycle task status"),
            Line::from("  h/?/F1        Show this help"),
            Line::from("  q/Ctrl+C/Esc  Quit"),
            Line::from(""),
            Line::from(Span::styled("Board:", bold)),
            Line::from("  ←/→           Select column"),
            Line::from("  Ctrl+←/→, </> Move card to neighbouring column"),
            Line::from("  t             Show/hide the done column"),
            Line::from(""),
            Line::from(Span::styled("Hierarchy:", bold)),
            Line::from("  →/Space       Expand"),
            Line::from("  ←             Collapse or go to parent"),
            Line::from("  a             New epic"),
            Line::from("  +             Add child of the next type down"),
            Line::from(""),
            Line::from(Span::styled("Settings:", bold)),
            Line::from("  ←/→           Change value"),
            Line::from("  w             Save settings file"),
            Line::from(""),
            Line::from(Span::styled("Due Date Formats:", bold)),
            Line::from("  YYYY-MM-DD, today, tomorrow, eow, eom, in 3d, in 2w, fri, next mon"),
        ];

        let paragraph = Paragraph::new(help_text)
            .block(Block::default().borders(Borders::ALL).title("Help - Press any key to return"))
            .wrap(Wrap { trim: true });

        f.render_widget(paragraph, area);
    }

    /// Render a confirmation dialog for deleting a task.
    fn render_confirm(&self, f: &mut Frame, area: Rect) {
        let Some(task) = self.confirm_delete.and_then(|id| self.store.get(id)) else {
            return;
        };
        let descendants = self.store.descendants_of(task.id).len();

        let block = Block::default()
            .title("Delete Task")
            .borders(Borders::ALL)
            .style(Style::default().bg(DARK_RED));

        let area = centered_rect(50, 30, area);
        f.render_widget(Clear, area);

        let mut text = vec![
            Line::from(""),
            Line::from(Span::styled(
                "Are you sure you want to delete:",
                Style::default().add_modifier(Modifier::BOLD),
            )),
            Line::from(format!("#{} {}", task.id, task.title)),
        ];
        if descendants > 0 {
            text.push(Line::from(format!(
                "This also deletes {} sub-item{}.",
                descendants,
                if descendants == 1 { "" } else { "s" }
            )));
        }
        text.extend([
            Line::from(""),
            Line::from("This action cannot be undone."),
            Line::from(""),
            Line::from("Press 'y' to confirm, 'n' to cancel"),
        ]);

        let paragraph = Paragraph::new(text)
            .block(block)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true });

        f.render_widget(paragraph, area);
    }

    /// Render the status bar at the bottom of the screen.
    fn render_status_bar(&self, f: &mut Frame, area: Rect) {
        let status_text = if !self.status_message.is_empty() {
            self.status_message.clone()
        } else {
            match self.state {
                AppState::Main => format!(
                    "{} | {} tasks in project | Press 'h' for help",
                    self.screen.title(),
                    self.store.project_tasks().len()
                ),
                AppState::TaskDetail => "Task Details".to_string(),
                AppState::AddTask => "Add New Task".to_string(),
                AppState::EditTask => "Edit Task".to_string(),
                AppState::Help => "Help".to_string(),
                AppState::Confirm => "Confirm Delete".to_string(),
            }
        };

        let bg = if self.status_message.starts_with("Error") { DARK_RED } else { PURPLE };
        let status = Paragraph::new(status_text)
            .style(Style::default().bg(bg).fg(text_on(bg)))
            .alignment(Alignment::Left);

        f.render_widget(status, area);
    }

    /// Main render function that dispatches to appropriate view renderers.
    fn render(&mut self, f: &mut Frame) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(3), Constraint::Min(0), Constraint::Length(1)])
            .split(f.area());

        self.render_header(f, chunks[0]);

        let show_done = self.show_done();
        match self.screen {
            Screen::Dashboard => self.render_dashboard(f, chunks[1]),
            Screen::Board => self.board.render(f, chunks[1], &self.store, show_done),
            Screen::MyTasks => self.render_my_tasks(f, chunks[1]),
            Screen::Hierarchy => self.hierarchy.render(f, chunks[1], &self.store, self.today),
            Screen::Settings => self.render_settings(f, chunks[1]),
        }

        match self.state {
            AppState::Main => {}
            AppState::TaskDetail => self.render_task_detail(f, chunks[1]),
            AppState::AddTask => self.render_task_form(f, chunks[1], false),
            AppState::EditTask => self.render_task_form(f, chunks[1], true),
            AppState::Help => self.render_help(f, chunks[1]),
            AppState::Confirm => {
                if self.return_state == AppState::TaskDetail {
                    self.render_task_detail(f, chunks[1]);
                }
                self.render_confirm(f, chunks[1]);
            }
        }

        self.render_status_bar(f, chunks[2]);
    }

    /// Main event loop for the TUI application.
    ///
    /// Handles rendering and input processing until the user exits.
    pub fn run<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<()> {
        loop {
            terminal.draw(|f| self.render(f))?;

            if self.handle_input()? {
                break;
            }
        }
        Ok(())
    }
}
