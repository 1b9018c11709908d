//! Enumerations and field types for work items.
//!
//! This module defines the structured values used to categorise tasks:
//! workflow status, priority, the item type that drives the hierarchy,
//! and the lifecycle of sprints.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Workflow status. Each status is one kanban column.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, ValueEnum, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum Status {
    Backlog,
    Todo,
    InProgress,
    Review,
    Done,
}

impl Status {
    /// Column order on the board.
    pub const ALL: [Status; 5] = [
        Status::Backlog,
        Status::Todo,
        Status::InProgress,
        Status::Review,
        Status::Done,
    ];

    /// Position of this status in [`Status::ALL`].
    pub fn column_index(self) -> usize {
        Status::ALL.iter().position(|&s| s == self).unwrap_or(0)
    }

    /// The neighbouring status to the left (`forward == false`) or right.
    /// Returns `None` at either end of the board.
    pub fn neighbour(self, forward: bool) -> Option<Status> {
        let idx = self.column_index();
        if forward {
            Status::ALL.get(idx + 1).copied()
        } else {
            idx.checked_sub(1).map(|i| Status::ALL[i])
        }
    }
}

/// Priority classification for task importance.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, ValueEnum, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "kebab-case")]
pub enum Priority {
    Low,
    Medium,
    High,
    Urgent,
}

impl Priority {
    pub const ALL: [Priority; 4] = [Priority::Low, Priority::Medium, Priority::High, Priority::Urgent];
}

/// Kind of work item. Epic, story, task and subtask form the hierarchy;
/// bugs and features sit at task level.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, ValueEnum, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum TaskType {
    Epic,
    Story,
    Task,
    Subtask,
    Bug,
    Feature,
}

impl TaskType {
    pub const ALL: [TaskType; 6] = [
        TaskType::Epic,
        TaskType::Story,
        TaskType::Task,
        TaskType::Subtask,
        TaskType::Bug,
        TaskType::Feature,
    ];

    /// Type offered when adding a child underneath an item of this type.
    pub fn child_type(self) -> TaskType {
        match self {
            TaskType::Epic => TaskType::Story,
            TaskType::Story => TaskType::Task,
            TaskType::Task => TaskType::Subtask,
            _ => TaskType::Task,
        }
    }
}

/// Sprint lifecycle.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, ValueEnum, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum SprintStatus {
    Future,
    Active,
    Completed,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_neighbours() {
        assert_eq!(Status::Backlog.neighbour(false), None);
        assert_eq!(Status::Backlog.neighbour(true), Some(Status::Todo));
        assert_eq!(Status::Review.neighbour(true), Some(Status::Done));
        assert_eq!(Status::Done.neighbour(true), None);
        assert_eq!(Status::InProgress.neighbour(false), Some(Status::Todo));
    }

    #[test]
    fn test_child_type_follows_hierarchy() {
        assert_eq!(TaskType::Epic.child_type(), TaskType::Story);
        assert_eq!(TaskType::Story.child_type(), TaskType::Task);
        assert_eq!(TaskType::Task.child_type(), TaskType::Subtask);
        assert_eq!(TaskType::Subtask.child_type(), TaskType::Task);
        assert_eq!(TaskType::Bug.child_type(), TaskType::Task);
    }

    #[test]
    fn test_status_serialises_kebab_case() {
        let json = serde_json::to_string(&Status::InProgress).unwrap();
        assert_eq!(json, "\"in-progress\"");
        let back: Status = serde_json::from_str("\"review\"").unwrap();
        assert_eq!(back, Status::Review);
    }
}
