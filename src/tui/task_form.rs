//! Task form handling for the terminal user interface.
//!
//! This module provides the `TaskForm` structure used to create and edit
//! tasks, including field ordering, selector cycling and conversion of the
//! entered text into task values.

use chrono::NaiveDate;

use crate::{
    error::{Error, Result},
    fields::{Priority, Status, TaskType},
    store::{parse_due_input, split_tags, TaskStore},
    task::{NewTask, Task, TaskId, User},
    tui::input::InputField,
};

/// Global order constants for task editing view fields.
pub const TITLE_GLOBAL_ORDER: usize = 0;
pub const DESCRIPTION_GLOBAL_ORDER: usize = 1;
pub const TYPE_GLOBAL_ORDER: usize = 2;
pub const STATUS_GLOBAL_ORDER: usize = 3;
pub const PRIORITY_GLOBAL_ORDER: usize = 4;
pub const ASSIGNEE_GLOBAL_ORDER: usize = 5;
pub const DUE_GLOBAL_ORDER: usize = 6;
pub const TAGS_GLOBAL_ORDER: usize = 7;
pub const STORY_POINTS_GLOBAL_ORDER: usize = 8;
pub const PARENT_GLOBAL_ORDER: usize = 9;
pub const BRANCH_GLOBAL_ORDER: usize = 10;

const FIELD_COUNT: usize = 11;

/// Task form for editing fields
pub struct TaskForm {
    pub title: InputField,
    pub description: InputField,
    pub due: InputField,
    pub tags: InputField,
    pub story_points: InputField,
    pub parent: InputField,
    pub branch: InputField,
    pub task_type: usize,
    pub status: usize,
    pub priority: usize,
    /// Index into `assignees`; 0 is unassigned.
    pub assignee: usize,
    pub current_field: usize,
    pub assignees: Vec<Option<User>>,
}

fn step(index: usize, len: usize, forward: bool) -> usize {
    if len == 0 {
        0
    } else if forward {
        (index + 1) % len
    } else {
        (index + len - 1) % len
    }
}

impl TaskForm {
    /// Empty form: to-do, medium priority task, unassigned.
    pub fn new(users: &[User]) -> Self {
        let mut assignees = vec![None];
        assignees.extend(users.iter().cloned().map(Some));
        let mut form = Self {
            title: InputField::new(),
            description: InputField::new(),
            due: InputField::new(),
            tags: InputField::new(),
            story_points: InputField::new(),
            parent: InputField::new(),
            branch: InputField::new(),
            task_type: 0,
            status: 0,
            priority: 0,
            assignee: 0,
            current_field: TITLE_GLOBAL_ORDER,
            assignees,
        };
        form.set_type(TaskType::Task);
        form.set_status(Status::Todo);
        form.set_priority(Priority::Medium);
        form.update_active_field();
        form
    }

    /// Empty form preset for the place it was opened from.
    pub fn with_defaults(
        users: &[User],
        status: Status,
        task_type: TaskType,
        parent: Option<TaskId>,
        assignee: Option<&str>,
    ) -> Self {
        let mut form = Self::new(users);
        form.set_status(status);
        form.set_type(task_type);
        if let Some(pid) = parent {
            form.parent = InputField::with_value(&pid.to_string());
        }
        if let Some(uid) = assignee {
            form.set_assignee(uid);
        }
        form
    }

    /// Create a task form populated from an existing task.
    pub fn from_task(task: &Task, users: &[User]) -> Self {
        let mut form = Self::new(users);
        form.title = InputField::with_value(&task.title);
        form.description = InputField::with_value(&task.description);
        form.due = InputField::with_value(&task.due_date.map(|d| d.to_string()).unwrap_or_default());
        form.tags = InputField::with_value(&task.tags.join(", "));
        form.story_points =
            InputField::with_value(&task.story_points.map(|p| p.to_string()).unwrap_or_default());
        form.parent = InputField::with_value(&task.parent_id.map(|p| p.to_string()).unwrap_or_default());
        form.branch = InputField::with_value(task.branch.as_deref().unwrap_or_default());
        form.set_type(task.task_type);
        form.set_status(task.status);
        form.set_priority(task.priority);
        if let Some(user) = &task.assignee {
            form.set_assignee(&user.id);
        }
        form.update_active_field();
        form
    }

    fn set_type(&mut self, t: TaskType) {
        self.task_type = TaskType::ALL.iter().position(|&k| k == t).unwrap_or(0);
    }

    fn set_status(&mut self, s: Status) {
        self.status = s.column_index();
    }

    fn set_priority(&mut self, p: Priority) {
        self.priority = Priority::ALL.iter().position(|&x| x == p).unwrap_or(0);
    }

    fn set_assignee(&mut self, user_id: &str) {
        if let Some(i) = self
            .assignees
            .iter()
            .position(|u| u.as_ref().is_some_and(|u| u.id == user_id))
        {
            self.assignee = i;
        }
    }

    pub fn selected_type(&self) -> TaskType {
        TaskType::ALL[self.task_type % TaskType::ALL.len()]
    }

    pub fn selected_status(&self) -> Status {
        Status::ALL[self.status % Status::ALL.len()]
    }

    pub fn selected_priority(&self) -> Priority {
        Priority::ALL[self.priority % Priority::ALL.len()]
    }

    pub fn selected_assignee(&self) -> Option<&User> {
        self.assignees.get(self.assignee).and_then(|u| u.as_ref())
    }

    /// The text field at `index`, if that position is a text field.
    pub fn text_field_mut(&mut self, index: usize) -> Option<&mut InputField> {
        match index {
            TITLE_GLOBAL_ORDER => Some(&mut self.title),
            DESCRIPTION_GLOBAL_ORDER => Some(&mut self.description),
            DUE_GLOBAL_ORDER => Some(&mut self.due),
            TAGS_GLOBAL_ORDER => Some(&mut self.tags),
            STORY_POINTS_GLOBAL_ORDER => Some(&mut self.story_points),
            PARENT_GLOBAL_ORDER => Some(&mut self.parent),
            BRANCH_GLOBAL_ORDER => Some(&mut self.branch),
            _ => None,
        }
    }

    /// Move to the next field in the form.
    pub fn next_field(&mut self) {
        self.current_field = (self.current_field + 1) % FIELD_COUNT;
        self.update_active_field();
    }

    /// Move to the previous field in the form.
    pub fn prev_field(&mut self) {
        self.current_field = (self.current_field + FIELD_COUNT - 1) % FIELD_COUNT;
        self.update_active_field();
    }

    /// Update which field is currently active for editing.
    pub fn update_active_field(&mut self) {
        let current = self.current_field;
        for i in 0..FIELD_COUNT {
            if let Some(field) = self.text_field_mut(i) {
                field.active = i == current;
            }
        }
    }

    /// Handle character input for the currently active field.
    pub fn handle_char(&mut self, c: char) {
        let current = self.current_field;
        if let Some(field) = self.text_field_mut(current) {
            field.handle_char(c);
        } else if c == ' ' {
            self.handle_left_right(true);
        }
    }

    /// Handle backspace input for the currently active field.
    pub fn handle_backspace(&mut self) {
        let current = self.current_field;
        if let Some(field) = self.text_field_mut(current) {
            field.handle_backspace();
        }
    }

    pub fn handle_delete(&mut self) {
        let current = self.current_field;
        if let Some(field) = self.text_field_mut(current) {
            field.handle_delete();
        }
    }

    /// Handle left/right arrow keys for cursor movement or selector changes.
    pub fn handle_left_right(&mut self, right: bool) {
        match self.current_field {
            TYPE_GLOBAL_ORDER => self.task_type = step(self.task_type, TaskType::ALL.len(), right),
            STATUS_GLOBAL_ORDER => self.status = step(self.status, Status::ALL.len(), right),
            PRIORITY_GLOBAL_ORDER => self.priority = step(self.priority, Priority::ALL.len(), right),
            ASSIGNEE_GLOBAL_ORDER => self.assignee = step(self.assignee, self.assignees.len(), right),
            i => {
                if let Some(field) = self.text_field_mut(i) {
                    if right {
                        field.move_cursor_right();
                    } else {
                        field.move_cursor_left();
                    }
                }
            }
        }
    }

    fn parse_due(&self, today: NaiveDate) -> Result<Option<NaiveDate>> {
        match self.due.non_empty() {
            None => Ok(None),
            Some(text) => parse_due_input(&text, today)
                .map(Some)
                .ok_or(Error::InvalidDate(text)),
        }
    }

    fn parse_story_points(&self) -> Result<Option<u32>> {
        match self.story_points.non_empty() {
            None => Ok(None),
            Some(text) => text
                .parse::<u32>()
                .map(Some)
                .map_err(|_| Error::InvalidStoryPoints(text)),
        }
    }

    /// Parse the parent field. `own_id` is the task being edited, if any.
    fn parse_parent(&self, store: &TaskStore, own_id: Option<TaskId>) -> Result<Option<TaskId>> {
        let Some(text) = self.parent.non_empty() else {
            return Ok(None);
        };
        let pid = text
            .parse::<TaskId>()
            .map_err(|_| Error::InvalidParent(format!("'{}' is not a task id", text)))?;
        match own_id {
            Some(id) => store.check_parent(id, pid)?,
            None if store.get(pid).is_none() => {
                return Err(Error::InvalidParent(format!("task {} does not exist", pid)))
            }
            None => {}
        }
        Ok(Some(pid))
    }

    fn title(&self) -> Result<String> {
        self.title.non_empty().ok_or(Error::EmptyTitle)
    }

    /// Validate the form and build a draft for the store.
    pub fn to_new_task(&self, store: &TaskStore, today: NaiveDate) -> Result<NewTask> {
        let mut new = NewTask::new(&self.title()?)
            .with_type(self.selected_type())
            .with_status(self.selected_status());
        if let Some(pid) = self.parse_parent(store, None)? {
            new = new.with_parent(pid);
        }
        new.description = self.description.value.trim().to_string();
        new.priority = self.selected_priority();
        new.assignee = self.selected_assignee().cloned();
        new.due_date = self.parse_due(today)?;
        new.tags = split_tags(&self.tags.value);
        new.story_points = self.parse_story_points()?;
        new.branch = self.branch.non_empty();
        Ok(new)
    }

    /// Validate the form and return `task` with the entered values applied.
    pub fn apply_to(&self, task: &Task, store: &TaskStore, today: NaiveDate) -> Result<Task> {
        let mut updated = task.clone();
        updated.title = self.title()?;
        updated.description = self.description.value.trim().to_string();
        updated.task_type = self.selected_type();
        updated.status = self.selected_status();
        updated.priority = self.selected_priority();
        updated.assignee = self.selected_assignee().cloned();
        updated.due_date = self.parse_due(today)?;
        updated.tags = split_tags(&self.tags.value);
        updated.story_points = self.parse_story_points()?;
        updated.parent_id = self.parse_parent(store, Some(task.id))?;
        updated.branch = self.branch.non_empty();
        Ok(updated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::demo_store;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2023, 4, 20).unwrap()
    }

    fn type_text(form: &mut TaskForm, text: &str) {
        for c in text.chars() {
            form.handle_char(c);
        }
    }

    #[test]
    fn test_new_form_defaults() {
        let store = demo_store();
        let form = TaskForm::new(&store.users);
        assert_eq!(form.selected_type(), TaskType::Task);
        assert_eq!(form.selected_status(), Status::Todo);
        assert_eq!(form.selected_priority(), Priority::Medium);
        assert!(form.selected_assignee().is_none());
        assert!(form.title.active);
    }

    #[test]
    fn test_to_new_task_parses_fields() {
        let store = demo_store();
        let mut form = TaskForm::with_defaults(&store.users, Status::Review, TaskType::Subtask, Some(9), Some("2"));
        type_text(&mut form, "Plain-text variant");
        form.current_field = DUE_GLOBAL_ORDER;
        type_text(&mut form, "tomorrow");
        form.current_field = TAGS_GLOBAL_ORDER;
        type_text(&mut form, "email, email, copy");
        form.current_field = STORY_POINTS_GLOBAL_ORDER;
        type_text(&mut form, "2");

        let new = form.to_new_task(&store, today()).unwrap();
        assert_eq!(new.title, "Plain-text variant");
        assert_eq!(new.status, Status::Review);
        assert_eq!(new.task_type, TaskType::Subtask);
        assert_eq!(new.parent_id, Some(9));
        assert_eq!(new.assignee.unwrap().name, "Jane Smith");
        assert_eq!(new.due_date, NaiveDate::from_ymd_opt(2023, 4, 21));
        assert_eq!(new.tags, vec!["email", "copy"]);
        assert_eq!(new.story_points, Some(2));
    }

    #[test]
    fn test_validation_errors() {
        let store = demo_store();
        let mut form = TaskForm::new(&store.users);
        assert!(matches!(form.to_new_task(&store, today()), Err(Error::EmptyTitle)));

        type_text(&mut form, "x");
        form.due = InputField::with_value("someday");
        assert!(matches!(form.to_new_task(&store, today()), Err(Error::InvalidDate(_))));

        form.due.clear();
        form.story_points = InputField::with_value("lots");
        assert!(matches!(form.to_new_task(&store, today()), Err(Error::InvalidStoryPoints(_))));

        form.story_points.clear();
        form.parent = InputField::with_value("404");
        assert!(matches!(form.to_new_task(&store, today()), Err(Error::InvalidParent(_))));
    }

    #[test]
    fn test_apply_to_refuses_descendant_parent() {
        let store = demo_store();
        let epic = store.get(7).unwrap();
        let mut form = TaskForm::from_task(epic, &store.users);
        assert_eq!(form.title.value, "Customer onboarding revamp");
        assert_eq!(form.selected_assignee().unwrap().id, "2");

        form.parent = InputField::with_value("10");
        assert!(matches!(form.apply_to(epic, &store, today()), Err(Error::InvalidParent(_))));

        form.parent.clear();
        form.current_field = PRIORITY_GLOBAL_ORDER;
        form.handle_left_right(true);
        let updated = form.apply_to(epic, &store, today()).unwrap();
        assert_eq!(updated.priority, Priority::Urgent);
        assert_eq!(updated.children_ids, epic.children_ids);
    }

    #[test]
    fn test_field_navigation_wraps() {
        let store = demo_store();
        let mut form = TaskForm::new(&store.users);
        form.prev_field();
        assert_eq!(form.current_field, BRANCH_GLOBAL_ORDER);
        assert!(form.branch.active);
        assert!(!form.title.active);
        form.next_field();
        assert_eq!(form.current_field, TITLE_GLOBAL_ORDER);
    }

    #[test]
    fn test_selectors_cycle() {
        let store = demo_store();
        let mut form = TaskForm::new(&store.users);
        form.current_field = ASSIGNEE_GLOBAL_ORDER;
        form.handle_left_right(false);
        assert_eq!(form.selected_assignee().unwrap().name, "Alex Johnson");
        form.handle_char(' ');
        assert!(form.selected_assignee().is_none());
    }
}
