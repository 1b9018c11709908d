//! Task data structure and related records.
//!
//! This module defines the core `Task` struct that represents a single work item
//! with its hierarchy links, timing, and collaboration metadata, along with the
//! `NewTask` draft used to create one.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::fields::*;

pub type TaskId = u64;

/// A person who can be assigned to, report, or watch a task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub name: String,
    pub avatar: String,
}

impl User {
    pub fn new(id: &str, name: &str, avatar: &str) -> Self {
        User {
            id: id.to_string(),
            name: name.to_string(),
            avatar: avatar.to_string(),
        }
    }

    /// First letter of the name, used where an avatar cannot be shown.
    pub fn initial(&self) -> char {
        self.name.chars().next().unwrap_or('?')
    }
}

/// Time tracking figures, all in minutes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeTracking {
    pub original_estimate: Option<u32>,
    pub remaining_estimate: Option<u32>,
    pub time_spent: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    pub id: u64,
    pub author: User,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attachment {
    pub id: u64,
    pub name: String,
    pub url: String,
    /// Size in bytes.
    pub size: u64,
    pub uploaded_by: User,
    pub uploaded_at: DateTime<Utc>,
}

/// One recorded field change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryItem {
    pub id: u64,
    pub user: User,
    pub timestamp: DateTime<Utc>,
    pub field: String,
    pub old_value: serde_json::Value,
    pub new_value: serde_json::Value,
}

/// A work item.
///
/// Tasks form a tree through `parent_id` / `children_ids` (epic > story > task > subtask).
/// The store keeps both directions consistent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub title: String,
    pub description: String,
    pub status: Status,
    pub priority: Priority,
    #[serde(rename = "type")]
    pub task_type: TaskType,
    pub assignee: Option<User>,
    pub reporter: Option<User>,
    pub due_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub tags: Vec<String>,
    pub story_points: Option<u32>,
    pub parent_id: Option<TaskId>,
    #[serde(default)]
    pub children_ids: Vec<TaskId>,
    pub time_tracking: Option<TimeTracking>,
    pub branch: Option<String>,
    #[serde(default)]
    pub components: Vec<String>,
    #[serde(default)]
    pub labels: Vec<String>,
    #[serde(default)]
    pub watchers: Vec<User>,
    #[serde(default)]
    pub comments: Vec<Comment>,
    #[serde(default)]
    pub attachments: Vec<Attachment>,
    #[serde(default)]
    pub history: Vec<HistoryItem>,
    #[serde(default)]
    pub sprints: Vec<String>,
}

impl Task {
    /// Build a stored task from a draft, stamping id and timestamps.
    pub fn from_new(id: TaskId, new: NewTask, now: DateTime<Utc>) -> Self {
        Task {
            id,
            title: new.title,
            description: new.description,
            status: new.status,
            priority: new.priority,
            task_type: new.task_type,
            assignee: new.assignee,
            reporter: new.reporter,
            due_date: new.due_date,
            created_at: now,
            updated_at: now,
            tags: new.tags,
            story_points: new.story_points,
            parent_id: new.parent_id,
            children_ids: Vec::new(),
            time_tracking: new.time_tracking,
            branch: new.branch,
            components: new.components,
            labels: new.labels,
            watchers: new.watchers,
            comments: Vec::new(),
            attachments: Vec::new(),
            history: Vec::new(),
            sprints: new.sprints,
        }
    }

    pub fn is_assigned_to(&self, user_id: &str) -> bool {
        self.assignee.as_ref().is_some_and(|u| u.id == user_id)
    }
}

/// Everything needed to create a task; the store assigns id and timestamps
/// and owns `children_ids`.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTask {
    pub title: String,
    pub description: String,
    pub status: Status,
    pub priority: Priority,
    pub task_type: TaskType,
    pub assignee: Option<User>,
    pub reporter: Option<User>,
    pub due_date: Option<NaiveDate>,
    pub tags: Vec<String>,
    pub story_points: Option<u32>,
    pub parent_id: Option<TaskId>,
    pub time_tracking: Option<TimeTracking>,
    pub branch: Option<String>,
    pub components: Vec<String>,
    pub labels: Vec<String>,
    pub watchers: Vec<User>,
    pub sprints: Vec<String>,
}

impl NewTask {
    /// A to-do, medium priority task with the given title.
    pub fn new(title: &str) -> Self {
        NewTask {
            title: title.to_string(),
            description: String::new(),
            status: Status::Todo,
            priority: Priority::Medium,
            task_type: TaskType::Task,
            assignee: None,
            reporter: None,
            due_date: None,
            tags: Vec::new(),
            story_points: None,
            parent_id: None,
            time_tracking: None,
            branch: None,
            components: Vec::new(),
            labels: Vec::new(),
            watchers: Vec::new(),
            sprints: Vec::new(),
        }
    }

    pub fn with_type(mut self, task_type: TaskType) -> Self {
        self.task_type = task_type;
        self
    }

    pub fn with_status(mut self, status: Status) -> Self {
        self.status = status;
        self
    }

    pub fn with_parent(mut self, parent_id: TaskId) -> Self {
        self.parent_id = Some(parent_id);
        self
    }
}
