//! Projects and sprints.
//!
//! A project groups tasks under a name and a short key (e.g. `WR`). The store
//! keeps one task list; a project references its tasks by id in insertion order.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::fields::SprintStatus;
use crate::task::{TaskId, User};

/// A time-boxed iteration inside a project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sprint {
    pub id: String,
    pub name: String,
    pub goal: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub status: SprintStatus,
}

/// A named collection of tasks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub id: String,
    pub name: String,
    pub description: String,
    pub task_ids: Vec<TaskId>,
    pub key: Option<String>,
    pub lead: Option<User>,
    #[serde(default)]
    pub components: Vec<String>,
    #[serde(default)]
    pub sprints: Vec<Sprint>,
}

impl Project {
    /// Create an empty project. The key is derived from the name.
    pub fn new(id: &str, name: &str, description: &str) -> Self {
        Project {
            id: id.to_string(),
            name: name.to_string(),
            description: description.to_string(),
            task_ids: Vec::new(),
            key: Some(derive_project_key(name)),
            lead: None,
            components: Vec::new(),
            sprints: Vec::new(),
        }
    }

    pub fn contains(&self, id: TaskId) -> bool {
        self.task_ids.contains(&id)
    }

    pub fn active_sprint(&self) -> Option<&Sprint> {
        self.sprints.iter().find(|s| s.status == SprintStatus::Active)
    }

    /// Display name with key prefix when one is set, e.g. `[WR] Website Redesign`.
    pub fn display_name(&self) -> String {
        match &self.key {
            Some(key) if !key.is_empty() => format!("[{}] {}", key, self.name),
            _ => self.name.clone(),
        }
    }
}

/// Derive an upper-case project key from the initials of each word.
/// Falls back to the first three alphanumeric characters for single words.
pub fn derive_project_key(name: &str) -> String {
    let words: Vec<&str> = name
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .collect();

    match words.len() {
        0 => String::new(),
        1 => words[0].chars().take(3).collect::<String>().to_uppercase(),
        _ => words
            .iter()
            .filter_map(|w| w.chars().next())
            .collect::<String>()
            .to_uppercase(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derive_project_key() {
        assert_eq!(derive_project_key("Website Redesign"), "WR");
        assert_eq!(derive_project_key("Mobile App Development"), "MAD");
        assert_eq!(derive_project_key("infrastructure"), "INF");
        assert_eq!(derive_project_key("  api-gateway  "), "AG");
        assert_eq!(derive_project_key(""), "");
    }

    #[test]
    fn test_display_name_uses_key() {
        let project = Project::new("1", "Website Redesign", "");
        assert_eq!(project.display_name(), "[WR] Website Redesign");

        let mut keyless = Project::new("2", "Ops", "");
        keyless.key = None;
        assert_eq!(keyless.display_name(), "Ops");
    }
}
