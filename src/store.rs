//! In-memory task store and hierarchy utilities.
//!
//! This module provides the `TaskStore` that holds every task, user and project
//! for the lifetime of the process, together with helpers for walking the task
//! tree, resolving user input, and formatting values for display.
//!
//! Nothing here touches the disk: the store is seeded from fixtures at startup
//! and discarded on exit.

use std::collections::{BTreeMap, HashMap, HashSet};

use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::fields::*;
use crate::project::Project;
use crate::task::{NewTask, Task, TaskId, User};

/// Process-local store for tasks, users and projects.
///
/// Tasks live in one list in insertion order. Projects reference tasks by id;
/// the active project receives newly added tasks and scopes the status queries.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct TaskStore {
    pub tasks: Vec<Task>,
    pub users: Vec<User>,
    pub projects: Vec<Project>,
    current_project: Option<String>,
}

impl TaskStore {
    /// Build a store from seed data. The first project becomes active.
    pub fn new(users: Vec<User>, tasks: Vec<Task>, projects: Vec<Project>) -> Self {
        let current_project = projects.first().map(|p| p.id.clone());
        TaskStore {
            tasks,
            users,
            projects,
            current_project,
        }
    }

    /// Generate the next available task ID.
    pub fn next_id(&self) -> TaskId {
        self.tasks.iter().map(|t| t.id).max().unwrap_or(0) + 1
    }

    /// Create an index mapping task IDs to their positions in the tasks vector.
    pub fn index(&self) -> HashMap<TaskId, usize> {
        self.tasks.iter().enumerate().map(|(i, t)| (t.id, i)).collect()
    }

    /// Get a task by ID.
    pub fn get(&self, id: TaskId) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    /// Get a mutable reference to a task by ID.
    pub fn get_mut(&mut self, id: TaskId) -> Option<&mut Task> {
        self.tasks.iter_mut().find(|t| t.id == id)
    }

    pub fn user(&self, id: &str) -> Option<&User> {
        self.users.iter().find(|u| u.id == id)
    }

    pub fn project(&self, id: &str) -> Option<&Project> {
        self.projects.iter().find(|p| p.id == id)
    }

    /// The active project, if any.
    pub fn current_project(&self) -> Option<&Project> {
        self.current_project.as_deref().and_then(|id| self.project(id))
    }

    fn current_project_mut(&mut self) -> Option<&mut Project> {
        let id = self.current_project.clone()?;
        self.projects.iter_mut().find(|p| p.id == id)
    }

    /// Switch the active project. `None` clears it. Returns false and leaves the
    /// selection unchanged when the id is unknown.
    pub fn set_current_project(&mut self, id: Option<&str>) -> bool {
        match id {
            None => {
                self.current_project = None;
                true
            }
            Some(id) if self.project(id).is_some() => {
                debug!(project_id = id, "active project changed");
                self.current_project = Some(id.to_string());
                true
            }
            Some(id) => {
                debug!(project_id = id, "ignoring unknown project");
                false
            }
        }
    }

    /// Tasks of the active project in project order. Empty without an active project.
    pub fn project_tasks(&self) -> Vec<&Task> {
        match self.current_project() {
            Some(project) => project.task_ids.iter().filter_map(|&id| self.get(id)).collect(),
            None => Vec::new(),
        }
    }

    /// Add a task, stamping the current time. See [`TaskStore::add_task_at`].
    pub fn add_task(&mut self, data: NewTask) -> TaskId {
        self.add_task_at(data, Utc::now())
    }

    /// Add a task created at `now`.
    ///
    /// The task is appended to the task list and to the active project, and its
    /// id is appended to the parent's `children_ids` when a parent is given.
    pub fn add_task_at(&mut self, data: NewTask, now: DateTime<Utc>) -> TaskId {
        let id = self.next_id();
        let mut task = Task::from_new(id, data, now);
        task.tags = dedup_tags(&task.tags);
        let parent_id = task.parent_id;
        let title = task.title.clone();

        self.tasks.push(task);

        if let Some(project) = self.current_project_mut() {
            project.task_ids.push(id);
        }

        if let Some(pid) = parent_id {
            match self.get_mut(pid) {
                Some(parent) => {
                    if !parent.children_ids.contains(&id) {
                        parent.children_ids.push(id);
                    }
                }
                None => warn!(task_id = id, parent_id = pid, "parent not found, task left unlinked"),
            }
        }

        info!(task_id = id, title = %title, "task created");
        id
    }

    /// Replace a task, stamping the current time. See [`TaskStore::update_task_at`].
    pub fn update_task(&mut self, task: Task) -> bool {
        self.update_task_at(task, Utc::now())
    }

    /// Replace the stored task with the same id and set `updated_at` to `now`.
    ///
    /// `children_ids` and `created_at` are kept from the stored record. A changed
    /// `parent_id` moves the task between parents; a parent that does not exist,
    /// is the task itself, or is one of its descendants is refused and the old
    /// parent kept. Returns false when no task has that id.
    pub fn update_task_at(&mut self, task: Task, now: DateTime<Utc>) -> bool {
        let Some(idx) = self.tasks.iter().position(|t| t.id == task.id) else {
            debug!(task_id = task.id, "update ignored, task not found");
            return false;
        };

        let id = task.id;
        let old_parent = self.tasks[idx].parent_id;
        let mut updated = task;
        updated.children_ids = self.tasks[idx].children_ids.clone();
        updated.created_at = self.tasks[idx].created_at;
        updated.updated_at = now;
        updated.tags = dedup_tags(&updated.tags);

        if let Some(new_parent) = updated.parent_id.filter(|&p| Some(p) != old_parent) {
            if let Err(reason) = self.check_parent(id, new_parent) {
                warn!(task_id = id, parent_id = new_parent, %reason, "reparent refused");
                updated.parent_id = old_parent;
            }
        }
        let new_parent = updated.parent_id;

        self.tasks[idx] = updated;

        if new_parent != old_parent {
            if let Some(old) = old_parent.and_then(|p| self.get_mut(p)) {
                old.children_ids.retain(|&c| c != id);
            }
            if let Some(new) = new_parent.and_then(|p| self.get_mut(p)) {
                if !new.children_ids.contains(&id) {
                    new.children_ids.push(id);
                }
            }
        }

        info!(task_id = id, "task updated");
        true
    }

    /// Check that `parent` may become the parent of `child`.
    pub fn check_parent(&self, child: TaskId, parent: TaskId) -> Result<()> {
        if child == parent {
            return Err(Error::InvalidParent("a task cannot be its own parent".into()));
        }
        if self.get(parent).is_none() {
            return Err(Error::InvalidParent(format!("task {} does not exist", parent)));
        }
        if self.descendants_of(child).contains(&parent) {
            return Err(Error::InvalidParent(format!(
                "task {} is a descendant of task {}",
                parent, child
            )));
        }
        Ok(())
    }

    /// Delete a task and every descendant.
    ///
    /// Removes them from the task list and from all projects, and removes the
    /// deleted id from its former parent's `children_ids`. Returns the removed
    /// ids, the requested task first and then its descendants depth-first.
    /// An unknown id removes nothing.
    pub fn delete_task(&mut self, id: TaskId) -> Vec<TaskId> {
        if self.get(id).is_none() {
            debug!(task_id = id, "delete ignored, task not found");
            return Vec::new();
        }

        let mut removed = vec![id];
        removed.extend(self.descendants_of(id));

        let ids: HashSet<TaskId> = removed.iter().copied().collect();
        self.remove_ids(&ids);

        info!(task_id = id, removed = removed.len(), "task deleted");
        removed
    }

    /// Remove tasks by IDs and clean up every reference to them.
    fn remove_ids(&mut self, ids: &HashSet<TaskId>) {
        self.tasks.retain(|t| !ids.contains(&t.id));
        for project in self.projects.iter_mut() {
            project.task_ids.retain(|id| !ids.contains(id));
        }
        for t in self.tasks.iter_mut() {
            t.children_ids.retain(|c| !ids.contains(c));
            if t.parent_id.is_some_and(|p| ids.contains(&p)) {
                t.parent_id = None;
            }
        }
    }

    /// Change the status of a task. No-op for unknown ids.
    pub fn update_task_status(&mut self, id: TaskId, status: Status) -> bool {
        self.update_task_status_at(id, status, Utc::now())
    }

    pub fn update_task_status_at(&mut self, id: TaskId, status: Status, now: DateTime<Utc>) -> bool {
        let Some(mut task) = self.get(id).cloned() else {
            debug!(task_id = id, "status change ignored, task not found");
            return false;
        };
        task.status = status;
        self.update_task_at(task, now)
    }

    /// Tasks of the active project with the given status, in project order.
    pub fn get_tasks_by_status(&self, status: Status) -> Vec<&Task> {
        self.project_tasks()
            .into_iter()
            .filter(|t| t.status == status)
            .collect()
    }

    /// Direct children of a task in `children_ids` order.
    pub fn children_of(&self, id: TaskId) -> Vec<&Task> {
        self.get(id)
            .map(|t| t.children_ids.iter().filter_map(|&c| self.get(c)).collect())
            .unwrap_or_default()
    }

    pub fn parent_of(&self, id: TaskId) -> Option<&Task> {
        self.get(id).and_then(|t| t.parent_id).and_then(|p| self.get(p))
    }

    /// All descendants of a task, depth-first over `children_ids`.
    pub fn descendants_of(&self, id: TaskId) -> Vec<TaskId> {
        let mut seen = HashSet::new();
        let mut out = Vec::new();
        seen.insert(id);
        self.collect_descendants(id, &mut seen, &mut out);
        out
    }

    fn collect_descendants(&self, id: TaskId, seen: &mut HashSet<TaskId>, out: &mut Vec<TaskId>) {
        if let Some(task) = self.get(id) {
            for &child in &task.children_ids {
                if seen.insert(child) {
                    out.push(child);
                    self.collect_descendants(child, seen, out);
                }
            }
        }
    }

    /// Ancestor chain from the direct parent upwards.
    pub fn collect_ancestors(&self, mut id: TaskId) -> Vec<TaskId> {
        let index = self.index();
        let mut chain = Vec::new();
        while let Some(t) = index.get(&id).and_then(|&i| self.tasks.get(i)) {
            match t.parent_id {
                Some(p) if !chain.contains(&p) => {
                    chain.push(p);
                    id = p;
                }
                _ => break,
            }
        }
        chain
    }
}

/// Build a map of parent task IDs to their children's IDs from `parent_id` links.
pub fn build_children_map(tasks: &[Task]) -> BTreeMap<TaskId, Vec<TaskId>> {
    let mut map: BTreeMap<TaskId, Vec<TaskId>> = BTreeMap::new();
    for t in tasks {
        if let Some(p) = t.parent_id {
            map.entry(p).or_default().push(t.id);
        }
    }
    map
}

/// Resolve a task identifier (either ID or title) to a task ID.
/// Titles match case-insensitively; more than one match is an error.
pub fn resolve_task_identifier(identifier: &str, store: &TaskStore) -> Result<TaskId> {
    let identifier = identifier.trim();
    if let Ok(id) = identifier.parse::<TaskId>() {
        return match store.get(id) {
            Some(_) => Ok(id),
            None => Err(Error::TaskNotFound(identifier.to_string())),
        };
    }

    let wanted = identifier.to_lowercase();
    let matches: Vec<TaskId> = store
        .tasks
        .iter()
        .filter(|t| t.title.to_lowercase() == wanted)
        .map(|t| t.id)
        .collect();

    match matches.len() {
        0 => Err(Error::TaskNotFound(identifier.to_string())),
        1 => Ok(matches[0]),
        _ => Err(Error::AmbiguousTask {
            identifier: identifier.to_string(),
            matches,
        }),
    }
}

/// Drop empty and repeated tags, keeping first-seen order.
pub fn dedup_tags(tags: &[String]) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for tag in tags {
        let tag = tag.trim();
        if !tag.is_empty() && !out.iter().any(|t| t == tag) {
            out.push(tag.to_string());
        }
    }
    out
}

/// Split comma-separated tag input into a tag list.
pub fn split_tags(input: &str) -> Vec<String> {
    let parts: Vec<String> = input.split(',').map(|s| s.to_string()).collect();
    dedup_tags(&parts)
}

/// Parse human-readable due date input relative to `today`.
///
/// Supports:
/// - "today", "tomorrow", "yesterday"
/// - "monday", "next friday", "this sunday", ...
/// - "end of week", "end of month"
/// - "in 3d", "in 2w", "in 1m"
/// - "YYYY-MM-DD" format
pub fn parse_due_input(s: &str, today: NaiveDate) -> Option<NaiveDate> {
    let s = s.trim().to_lowercase();

    match s.as_str() {
        "today" => return Some(today),
        "tomorrow" => return add_days(today, 1),
        "yesterday" => return add_days(today, -1),
        "end of week" | "eow" => return start_end_of_week(today).map(|(_, end)| end),
        "end of month" | "eom" => {
            let (year, month) = if today.month() == 12 {
                (today.year() + 1, 1)
            } else {
                (today.year(), today.month() + 1)
            };
            let first_of_next = NaiveDate::from_ymd_opt(year, month, 1)?;
            return first_of_next.pred_opt();
        }
        _ => {}
    }

    // "in X" patterns; out-of-range amounts yield None
    if let Some(rest) = s.strip_prefix("in ") {
        if let Some(nd) = rest.strip_suffix('d') {
            if let Ok(days) = nd.trim().parse::<i64>() {
                return add_days(today, days);
            }
        }
        if let Some(nw) = rest.strip_suffix('w') {
            if let Ok(weeks) = nw.trim().parse::<i64>() {
                return Duration::try_weeks(weeks).and_then(|d| today.checked_add_signed(d));
            }
        }
        if let Some(nm) = rest.strip_suffix('m') {
            if let Ok(months) = nm.trim().parse::<i64>() {
                // Approximate: 30 days per month
                return add_days(today, months.checked_mul(30)?);
            }
        }
    }

    let weekdays = [
        ("monday", 0), ("tuesday", 1), ("wednesday", 2), ("thursday", 3),
        ("friday", 4), ("saturday", 5), ("sunday", 6),
        ("mon", 0), ("tue", 1), ("wed", 2), ("thu", 3),
        ("fri", 4), ("sat", 5), ("sun", 6),
    ];

    let current_day = today.weekday().num_days_from_monday() as i64;
    for (day_name, target_day) in weekdays {
        let days_ahead = (target_day + 7 - current_day) % 7;
        if s == day_name || s == format!("this {}", day_name) {
            return add_days(today, days_ahead);
        }
        if s == format!("next {}", day_name) {
            let days_to_add = if days_ahead == 0 { 7 } else { days_ahead + 7 };
            return add_days(today, days_to_add);
        }
    }

    NaiveDate::parse_from_str(&s, "%Y-%m-%d").ok()
}

/// `date` shifted by `days`, or None outside the calendar range.
fn add_days(date: NaiveDate, days: i64) -> Option<NaiveDate> {
    Duration::try_days(days).and_then(|d| date.checked_add_signed(d))
}

/// Start and end dates of the ISO week (Monday to Sunday) containing `today`.
pub fn start_end_of_week(today: NaiveDate) -> Option<(NaiveDate, NaiveDate)> {
    let weekday = today.weekday().num_days_from_monday() as i64;
    let start = add_days(today, -weekday)?;
    Some((start, add_days(start, 6)?))
}

/// Format a due date relative to today ("today", "tomorrow", "in 3d", "2d late").
pub fn format_due_relative(due: Option<NaiveDate>, today: NaiveDate) -> String {
    match due {
        None => "-".into(),
        Some(d) => {
            let days = (d - today).num_days();
            match days {
                0 => "today".into(),
                1 => "tomorrow".into(),
                n if n > 1 => format!("in {}d", n),
                n => format!("{}d late", -n),
            }
        }
    }
}

/// Short calendar form, e.g. "Apr 15".
pub fn format_due_short(due: NaiveDate) -> String {
    due.format("%b %-d").to_string()
}

/// Format a task status for display.
pub fn format_status(s: Status) -> &'static str {
    match s {
        Status::Backlog => "Backlog",
        Status::Todo => "To Do",
        Status::InProgress => "In Progress",
        Status::Review => "Review",
        Status::Done => "Done",
    }
}

/// Format a priority for display.
pub fn format_priority(p: Priority) -> &'static str {
    match p {
        Priority::Low => "Low",
        Priority::Medium => "Medium",
        Priority::High => "High",
        Priority::Urgent => "Urgent",
    }
}

/// Format a task type for display.
pub fn format_task_type(t: TaskType) -> &'static str {
    match t {
        TaskType::Epic => "Epic",
        TaskType::Story => "Story",
        TaskType::Task => "Task",
        TaskType::Subtask => "Subtask",
        TaskType::Bug => "Bug",
        TaskType::Feature => "Feature",
    }
}

pub fn format_sprint_status(s: SprintStatus) -> &'static str {
    match s {
        SprintStatus::Future => "Future",
        SprintStatus::Active => "Active",
        SprintStatus::Completed => "Completed",
    }
}

/// Format a minute count as "1h 30m".
pub fn format_minutes(minutes: u32) -> String {
    match (minutes / 60, minutes % 60) {
        (0, m) => format!("{}m", m),
        (h, 0) => format!("{}h", h),
        (h, m) => format!("{}h {}m", h, m),
    }
}

/// Truncate a string to a maximum width, adding ellipsis if needed.
pub fn truncate(s: &str, width: usize) -> String {
    if s.chars().count() <= width {
        s.to_string()
    } else {
        let mut out: String = s.chars().take(width.saturating_sub(1)).collect();
        out.push('…');
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, day, 9, 0, 0).unwrap()
    }

    /// Store with one project holding an epic > story > task > subtask chain
    /// plus a lone bug.
    fn sample_store() -> TaskStore {
        let users = vec![User::new("1", "John Doe", "https://i.pravatar.cc/150?img=1")];
        let projects = vec![
            Project::new("1", "Website Redesign", ""),
            Project::new("2", "Mobile App", ""),
        ];
        let mut store = TaskStore::new(users, Vec::new(), projects);
        let epic = store.add_task_at(NewTask::new("Epic").with_type(TaskType::Epic), at(1));
        let story = store.add_task_at(
            NewTask::new("Story").with_type(TaskType::Story).with_parent(epic),
            at(1),
        );
        let task = store.add_task_at(
            NewTask::new("Task").with_parent(story).with_status(Status::InProgress),
            at(1),
        );
        store.add_task_at(
            NewTask::new("Subtask").with_type(TaskType::Subtask).with_parent(task),
            at(1),
        );
        store.add_task_at(
            NewTask::new("Bug").with_type(TaskType::Bug).with_status(Status::Done),
            at(1),
        );
        store
    }

    #[test]
    fn test_add_assigns_id_timestamps_and_project() {
        let mut store = sample_store();
        let before = store.tasks.len();
        let id = store.add_task_at(NewTask::new("New Test Task"), at(5));

        assert_eq!(id, 6);
        assert_eq!(store.tasks.len(), before + 1);
        let task = store.tasks.last().unwrap();
        assert_eq!(task.title, "New Test Task");
        assert_eq!(task.created_at, at(5));
        assert_eq!(task.updated_at, at(5));
        assert!(store.current_project().unwrap().contains(id));
        assert!(!store.project("2").unwrap().contains(id));
    }

    #[test]
    fn test_add_with_parent_backfills_children() {
        let mut store = sample_store();
        let id = store.add_task_at(NewTask::new("Second story").with_parent(1), at(2));
        assert_eq!(store.get(1).unwrap().children_ids, vec![2, id]);
        assert_eq!(store.get(id).unwrap().parent_id, Some(1));
    }

    #[test]
    fn test_add_with_missing_parent_keeps_task() {
        let mut store = sample_store();
        let id = store.add_task_at(NewTask::new("Orphan").with_parent(99), at(2));
        assert!(store.get(id).is_some());
        assert!(store.tasks.iter().all(|t| !t.children_ids.contains(&id)));
    }

    #[test]
    fn test_add_without_project_only_appends_task() {
        let mut store = sample_store();
        store.set_current_project(None);
        let id = store.add_task_at(NewTask::new("Loose"), at(2));
        assert!(store.get(id).is_some());
        assert!(store.projects.iter().all(|p| !p.contains(id)));
    }

    #[test]
    fn test_add_dedups_tags() {
        let mut store = sample_store();
        let mut new = NewTask::new("Tagged");
        new.tags = vec!["ui".into(), " ui ".into(), "".into(), "design".into()];
        let id = store.add_task_at(new, at(2));
        assert_eq!(store.get(id).unwrap().tags, vec!["ui", "design"]);
    }

    #[test]
    fn test_update_bumps_updated_at_only() {
        let mut store = sample_store();
        let mut task = store.get(5).unwrap().clone();
        task.title = "Renamed bug".into();
        task.created_at = at(20);

        assert!(store.update_task_at(task, at(9)));
        let stored = store.get(5).unwrap();
        assert_eq!(stored.title, "Renamed bug");
        assert_eq!(stored.created_at, at(1));
        assert_eq!(stored.updated_at, at(9));
    }

    #[test]
    fn test_update_missing_is_noop() {
        let mut store = sample_store();
        let mut ghost = store.get(5).unwrap().clone();
        ghost.id = 42;
        let snapshot = store.tasks.clone();
        assert!(!store.update_task_at(ghost, at(9)));
        assert_eq!(store.tasks, snapshot);
    }

    #[test]
    fn test_update_keeps_stored_children() {
        let mut store = sample_store();
        let mut epic = store.get(1).unwrap().clone();
        epic.children_ids.clear();
        store.update_task_at(epic, at(3));
        assert_eq!(store.get(1).unwrap().children_ids, vec![2]);
    }

    #[test]
    fn test_update_reparent_moves_link() {
        let mut store = sample_store();
        let mut bug = store.get(5).unwrap().clone();
        bug.parent_id = Some(2);
        store.update_task_at(bug, at(3));
        assert_eq!(store.get(2).unwrap().children_ids, vec![3, 5]);

        let mut bug = store.get(5).unwrap().clone();
        bug.parent_id = Some(1);
        store.update_task_at(bug, at(4));
        assert_eq!(store.get(2).unwrap().children_ids, vec![3]);
        assert_eq!(store.get(1).unwrap().children_ids, vec![2, 5]);

        let mut bug = store.get(5).unwrap().clone();
        bug.parent_id = None;
        store.update_task_at(bug, at(5));
        assert_eq!(store.get(1).unwrap().children_ids, vec![2]);
        assert_eq!(store.get(5).unwrap().parent_id, None);
    }

    #[test]
    fn test_update_refuses_cycle() {
        let mut store = sample_store();
        let mut epic = store.get(1).unwrap().clone();
        epic.parent_id = Some(4);
        epic.title = "Still updated".into();
        assert!(store.update_task_at(epic, at(3)));

        let stored = store.get(1).unwrap();
        assert_eq!(stored.parent_id, None);
        assert_eq!(stored.title, "Still updated");
        assert!(store.get(4).unwrap().children_ids.is_empty());
    }

    #[test]
    fn test_delete_cascades_to_descendants() {
        let mut store = sample_store();
        let removed = store.delete_task(2);

        assert_eq!(removed, vec![2, 3, 4]);
        for id in [2, 3, 4] {
            assert!(store.get(id).is_none());
            assert!(!store.current_project().unwrap().contains(id));
        }
        assert!(store.get(1).is_some());
        assert!(store.get(5).is_some());
    }

    #[test]
    fn test_delete_child_unlinks_from_parent() {
        let mut store = sample_store();
        store.delete_task(4);
        assert!(store.get(3).unwrap().children_ids.is_empty());
        assert_eq!(store.get(2).unwrap().children_ids, vec![3]);
    }

    #[test]
    fn test_delete_root_removes_whole_tree() {
        let mut store = sample_store();
        let removed = store.delete_task(1);
        assert_eq!(removed, vec![1, 2, 3, 4]);
        assert_eq!(store.tasks.len(), 1);
        assert_eq!(store.current_project().unwrap().task_ids, vec![5]);
    }

    #[test]
    fn test_delete_missing_is_noop() {
        let mut store = sample_store();
        assert!(store.delete_task(77).is_empty());
        assert_eq!(store.tasks.len(), 5);
    }

    #[test]
    fn test_update_status() {
        let mut store = sample_store();
        assert!(store.update_task_status_at(1, Status::Review, at(7)));
        let epic = store.get(1).unwrap();
        assert_eq!(epic.status, Status::Review);
        assert_eq!(epic.updated_at, at(7));
        assert!(!store.update_task_status(99, Status::Done));
    }

    #[test]
    fn test_tasks_by_status_filters_active_project() {
        let mut store = sample_store();
        for status in Status::ALL {
            for task in store.get_tasks_by_status(status) {
                assert_eq!(task.status, status);
            }
        }
        let todo: Vec<TaskId> = store.get_tasks_by_status(Status::Todo).iter().map(|t| t.id).collect();
        assert_eq!(todo, vec![1, 2, 4]);

        store.set_current_project(Some("2"));
        assert!(store.get_tasks_by_status(Status::Todo).is_empty());

        store.set_current_project(None);
        assert!(store.get_tasks_by_status(Status::Done).is_empty());
    }

    #[test]
    fn test_set_current_project_rejects_unknown() {
        let mut store = sample_store();
        assert!(!store.set_current_project(Some("nope")));
        assert_eq!(store.current_project().unwrap().id, "1");
    }

    #[test]
    fn test_tree_queries() {
        let store = sample_store();
        assert_eq!(store.descendants_of(1), vec![2, 3, 4]);
        assert_eq!(store.collect_ancestors(4), vec![3, 2, 1]);
        assert_eq!(store.parent_of(3).unwrap().id, 2);
        assert_eq!(store.children_of(2).iter().map(|t| t.id).collect::<Vec<_>>(), vec![3]);

        let map = build_children_map(&store.tasks);
        assert_eq!(map[&1], vec![2]);
        assert!(!map.contains_key(&5));
    }

    #[test]
    fn test_check_parent() {
        let store = sample_store();
        assert!(store.check_parent(5, 1).is_ok());
        assert!(matches!(store.check_parent(1, 1), Err(Error::InvalidParent(_))));
        assert!(matches!(store.check_parent(1, 3), Err(Error::InvalidParent(_))));
        assert!(matches!(store.check_parent(5, 50), Err(Error::InvalidParent(_))));
    }

    #[test]
    fn test_resolve_task_identifier() {
        let mut store = sample_store();
        assert_eq!(resolve_task_identifier("3", &store).unwrap(), 3);
        assert_eq!(resolve_task_identifier("story", &store).unwrap(), 2);
        assert!(matches!(
            resolve_task_identifier("99", &store),
            Err(Error::TaskNotFound(_))
        ));

        store.add_task_at(NewTask::new("Story"), at(2));
        match resolve_task_identifier("Story", &store) {
            Err(Error::AmbiguousTask { matches, .. }) => assert_eq!(matches, vec![2, 6]),
            other => panic!("expected ambiguity, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_due_input() {
        // 2024-03-13 is a Wednesday
        let today = NaiveDate::from_ymd_opt(2024, 3, 13).unwrap();
        let d = |y, m, day| NaiveDate::from_ymd_opt(y, m, day);

        assert_eq!(parse_due_input("today", today), d(2024, 3, 13));
        assert_eq!(parse_due_input("Tomorrow", today), d(2024, 3, 14));
        assert_eq!(parse_due_input("in 3d", today), d(2024, 3, 16));
        assert_eq!(parse_due_input("in 2w", today), d(2024, 3, 27));
        assert_eq!(parse_due_input("friday", today), d(2024, 3, 15));
        assert_eq!(parse_due_input("wed", today), d(2024, 3, 13));
        assert_eq!(parse_due_input("next wednesday", today), d(2024, 3, 20));
        assert_eq!(parse_due_input("eow", today), d(2024, 3, 17));
        assert_eq!(parse_due_input("end of month", today), d(2024, 3, 31));
        assert_eq!(parse_due_input("2024-12-25", today), d(2024, 12, 25));
        assert_eq!(parse_due_input("someday", today), None);
        assert_eq!(parse_due_input("in 3é", today), None);
        assert_eq!(parse_due_input("in 9999999999999d", today), None);
        assert_eq!(parse_due_input("in 9999999999999w", today), None);
        assert_eq!(parse_due_input("in 9223372036854775807m", today), None);
        assert_eq!(parse_due_input("in 3 d", today), d(2024, 3, 16));
    }

    #[test]
    fn test_parse_due_input_at_calendar_edge() {
        assert_eq!(parse_due_input("tomorrow", NaiveDate::MAX), None);
        assert_eq!(parse_due_input("yesterday", NaiveDate::MIN), None);
        assert_eq!(parse_due_input("in 1d", NaiveDate::MAX), None);
        assert_eq!(parse_due_input("today", NaiveDate::MAX), Some(NaiveDate::MAX));
    }

    #[test]
    fn test_formatting_helpers() {
        let today = NaiveDate::from_ymd_opt(2024, 3, 13).unwrap();
        assert_eq!(format_due_relative(None, today), "-");
        assert_eq!(format_due_relative(Some(today), today), "today");
        assert_eq!(format_due_relative(today.succ_opt(), today), "tomorrow");
        assert_eq!(format_due_relative(today.pred_opt(), today), "1d late");
        assert_eq!(format_due_short(today), "Mar 13");
        assert_eq!(format_minutes(90), "1h 30m");
        assert_eq!(format_minutes(120), "2h");
        assert_eq!(format_minutes(45), "45m");
        assert_eq!(truncate("Redesign dashboard UI", 8), "Redesig…");
        assert_eq!(split_tags("bug, frontend,,bug"), vec!["bug", "frontend"]);
    }
}
